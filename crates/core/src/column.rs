use std::fmt;

use serde::{Deserialize, Serialize};

/// The closed set of column codes carried by the registry export.
///
/// Tag suffixes observed during extraction are open strings; they are
/// converted to this enumeration at the import boundary and never travel
/// further as raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnCode {
    /// Person ordinal within the export
    G2s,
    /// Taxpayer identifier (RNOKPP)
    G3s,
    /// Registry lookup response code
    G4s,
    /// Person type
    G5,
    /// Employer (tax agent) code
    G6s,
    /// Employer (tax agent) name
    G7s,
    /// Income amount
    G8,
    /// Tax amount
    G9,
    /// Income type code
    G10,
    /// Reporting quarter
    G11,
    /// Reporting year
    G12,
}

impl ColumnCode {
    pub const COUNT: usize = 11;

    /// All codes, in export column order. Every one is required for import.
    pub const ALL: [ColumnCode; Self::COUNT] = [
        ColumnCode::G2s,
        ColumnCode::G3s,
        ColumnCode::G4s,
        ColumnCode::G5,
        ColumnCode::G6s,
        ColumnCode::G7s,
        ColumnCode::G8,
        ColumnCode::G9,
        ColumnCode::G10,
        ColumnCode::G11,
        ColumnCode::G12,
    ];

    /// The lowercase tag suffix this column appears under in the export.
    pub fn token(self) -> &'static str {
        match self {
            ColumnCode::G2s => "g2s",
            ColumnCode::G3s => "g3s",
            ColumnCode::G4s => "g4s",
            ColumnCode::G5 => "g5",
            ColumnCode::G6s => "g6s",
            ColumnCode::G7s => "g7s",
            ColumnCode::G8 => "g8",
            ColumnCode::G9 => "g9",
            ColumnCode::G10 => "g10",
            ColumnCode::G11 => "g11",
            ColumnCode::G12 => "g12",
        }
    }

    /// Parse a lowercase tag suffix into a known column code.
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL.iter().find(|c| c.token() == token).copied()
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ColumnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}
