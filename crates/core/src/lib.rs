//! `skarb-core` — Domain types for registry income tables.
//!
//! Pure type crate: column codes, cell values, and the per-file table
//! the reconciliation passes operate on. No IO dependencies.

pub mod column;
pub mod table;

pub use column::ColumnCode;
pub use table::{Row, Table, Value};
