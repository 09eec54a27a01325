//! `skarb-recon` — Income-declaration reconciliation engine.
//!
//! Pure engine crate: receives a built table, returns a cleaned table
//! plus diagnostics. No CLI or IO dependencies.

pub mod aggregate;
pub mod config;
pub mod dedup;
pub mod diagnostics;
pub mod error;
pub mod pipeline;

pub use aggregate::Combined;
pub use config::ReconPolicy;
pub use diagnostics::Diagnostics;
pub use error::ReconError;
pub use pipeline::{run, Reconciled};
