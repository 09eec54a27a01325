//! Schema validation and table building.
//!
//! The open string-keyed column set from the extractor stops here: after
//! validation every cell is addressed by [`ColumnCode`].

use std::collections::BTreeSet;
use std::path::Path;

use skarb_core::{ColumnCode, Table, Value};

use crate::error::ImportError;
use crate::xml::{self, Extract};

/// Check that the observed token set covers every required column.
///
/// Runs before the row count is trusted: a malformed export can carry
/// nonzero rows under the wrong columns.
pub fn check_columns(observed: &BTreeSet<String>) -> Result<(), ImportError> {
    let missing: Vec<String> = ColumnCode::ALL
        .iter()
        .filter(|code| !observed.contains(code.token()))
        .map(|code| code.token().to_uppercase())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(ImportError::InsufficientSchema { missing })
    }
}

/// Allocate `max_row` all-null rows and populate them from the cell list.
/// Later cells for the same (row, column) address overwrite earlier ones.
/// Tokens outside the known column set are dropped.
pub fn build_table(extract: &Extract) -> Table {
    let mut table = Table::with_row_count(extract.max_row);
    for cell in &extract.cells {
        let Some(code) = ColumnCode::parse(&cell.code) else {
            continue;
        };
        let value = match &cell.value {
            Some(text) => Value::Text(text.clone()),
            None => Value::Null,
        };
        table.rows_mut()[(cell.row - 1) as usize].set(code, value);
    }
    table
}

/// Parse, validate, and build the raw (uncleaned) table for one file.
pub fn import_table(path: &Path) -> Result<Table, ImportError> {
    let text = xml::read_file_as_utf8(path)?;
    import_table_from_str(&text)
}

pub fn import_table_from_str(text: &str) -> Result<Table, ImportError> {
    let extract = xml::extract_cells(text)?;
    check_columns(&extract.columns)?;
    if extract.max_row == 0 {
        return Err(ImportError::NoRecords);
    }
    Ok(build_table(&extract))
}
