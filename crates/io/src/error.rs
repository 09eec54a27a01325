use std::fmt;

/// Structural import failures. Row-level anomalies are not errors; the
/// reconciliation passes recover them and report via diagnostics.
#[derive(Debug)]
pub enum ImportError {
    /// File could not be read from disk.
    Io(String),
    /// XML could not be parsed at all.
    Parse(String),
    /// Document parsed but the declaration body element is absent.
    MissingBody,
    /// Required columns missing from the observed set (uppercased tokens).
    InsufficientSchema { missing: Vec<String> },
    /// File parsed and the schema is complete, but no data rows exist.
    NoRecords,
    /// Export write failure.
    Write(String),
}

impl fmt::Display for ImportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(msg) => write!(f, "cannot read file: {msg}"),
            Self::Parse(msg) => write!(f, "cannot parse XML: {msg}"),
            Self::MissingBody => write!(f, "no DECLARBODY element in document"),
            Self::InsufficientSchema { missing } => {
                write!(f, "missing required columns: {}", missing.join(", "))
            }
            Self::NoRecords => write!(f, "file contains no data rows"),
            Self::Write(msg) => write!(f, "cannot write output: {msg}"),
        }
    }
}

impl std::error::Error for ImportError {}
