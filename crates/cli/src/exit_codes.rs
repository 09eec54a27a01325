//! CLI Exit Code Registry
//!
//! Single source of truth for all CLI exit codes. Exit codes are part of
//! the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Code | Description                                          |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error (unspecified)                          |
//! | 2    | CLI usage error (bad args, unreadable policy file)   |
//! | 3    | XML parse failure (unreadable file)                  |
//! | 4    | Insufficient schema (required columns missing)       |
//! | 5    | File parsed but contains no data rows                |
//! | 6    | No valid records left after cleaning                 |
//! | 7    | Policy TOML failed to parse                          |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// The XML could not be parsed at all (malformed document or missing
/// DECLARBODY). No partial table was produced.
pub const EXIT_PARSE: u8 = 3;

/// Required columns missing from the export; cleaning never started.
pub const EXIT_SCHEMA: u8 = 4;

/// Well-formed file with a complete schema but zero data rows.
pub const EXIT_NO_RECORDS: u8 = 5;

/// Every row was eliminated during cleaning. Distinct from `EXIT_PARSE`:
/// the file was readable, its contents just reconciled away.
pub const EXIT_NO_VALID_RECORDS: u8 = 6;

/// Reconciliation policy TOML failed to parse.
pub const EXIT_POLICY: u8 = 7;
