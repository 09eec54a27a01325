use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML policy parse / deserialization error.
    PolicyParse(String),
    /// Every row was eliminated during cleaning. Carries the accumulated
    /// diagnostics so callers can surface what removed them. Distinct
    /// from a structural import failure: the file itself was readable.
    NoValidRecords { diagnostics: String },
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PolicyParse(msg) => write!(f, "policy parse error: {msg}"),
            Self::NoValidRecords { .. } => write!(f, "no valid records after cleaning"),
        }
    }
}

impl std::error::Error for ReconError {}
