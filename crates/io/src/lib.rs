// File I/O operations: registry XML in, reconciled CSV out.

pub mod error;
pub mod export;
pub mod import;
pub mod xml;

pub use error::ImportError;
