//! Single-tax declaration deduplication.
//!
//! Sole-proprietor reports for 1, 6, 9 and 12 months of the same year
//! overlap: a longer period includes every shorter one. Per
//! (taxpayer, year), only the longest report present survives, and it is
//! recoded to the canonical annual code so downstream grouping treats all
//! single-tax income as one type.

use std::collections::BTreeMap;

use skarb_core::{ColumnCode, Row, Table, Value};

use crate::diagnostics::{list_rows, Diagnostics};

/// Person-level declaration summary; never a real income record.
pub const SUMMARY_CODE: i64 = 888;

/// Single-tax report codes, shortest to longest period. Numeric order
/// matches period length, so the largest code present wins.
pub const SINGLE_TAX_1M: i64 = 503;
pub const SINGLE_TAX_6M: i64 = 506;
pub const SINGLE_TAX_9M: i64 = 509;
/// Canonical annual code; dedup survivors are recoded to this.
pub const SINGLE_TAX_ANNUAL: i64 = 512;

pub const SINGLE_TAX_CODES: [i64; 4] = [
    SINGLE_TAX_1M,
    SINGLE_TAX_6M,
    SINGLE_TAX_9M,
    SINGLE_TAX_ANNUAL,
];

pub fn is_single_tax(code: i64) -> bool {
    SINGLE_TAX_CODES.contains(&code)
}

/// Dedup scope: taxpayer id plus reporting year. Rows with no readable
/// year still group (under `None`) so a year-less pair dedups rather than
/// silently double-counting.
type GroupKey = (String, Option<i64>);

fn group_key(row: &Row) -> Option<(GroupKey, i64)> {
    let code = row.int(ColumnCode::G10)?;
    if !is_single_tax(code) {
        return None;
    }
    let taxpayer = row.text(ColumnCode::G3s)?.trim();
    if taxpayer.is_empty() {
        return None;
    }
    let year = row.int(ColumnCode::G12);
    Some(((taxpayer.to_string(), year), code))
}

/// Drop reports superseded by a longer period, then recode every surviving
/// single-tax row to the annual code.
///
/// Idempotent: a second run finds at most one code per group, already
/// canonical, and removes nothing.
pub fn dedup_declarations(mut table: Table, diag: &mut Diagnostics) -> Table {
    // Longest period present per (taxpayer, year).
    let mut longest: BTreeMap<GroupKey, i64> = BTreeMap::new();
    for row in table.rows() {
        if let Some((key, code)) = group_key(row) {
            let entry = longest.entry(key).or_insert(code);
            if code > *entry {
                *entry = code;
            }
        }
    }

    let mut removed: Vec<u32> = Vec::new();
    table.retain(|row| match group_key(row) {
        Some((key, code)) if code < longest[&key] => {
            removed.push(row.source_row);
            false
        }
        _ => true,
    });
    if !removed.is_empty() {
        removed.sort_unstable();
        diag.note(format!(
            "removed {} single-tax reports superseded by a longer period (rows: {})",
            removed.len(),
            list_rows(&removed)
        ));
    }

    for row in table.rows_mut() {
        if let Some(code) = row.int(ColumnCode::G10) {
            if is_single_tax(code) && code != SINGLE_TAX_ANNUAL {
                row.set(ColumnCode::G10, Value::Int(SINGLE_TAX_ANNUAL));
            }
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn declaration(source_row: u32, taxpayer: &str, year: i64, code: i64) -> Row {
        let mut row = Row::new(source_row);
        row.set(ColumnCode::G3s, Value::Text(taxpayer.into()));
        row.set(ColumnCode::G12, Value::Text(year.to_string()));
        row.set(ColumnCode::G10, Value::Text(code.to_string()));
        row
    }

    fn table_of(rows: Vec<Row>) -> Table {
        let mut table = Table::new();
        for row in rows {
            table.push(row);
        }
        table
    }

    #[test]
    fn annual_supersedes_all_shorter_periods() {
        let table = table_of(vec![
            declaration(1, "A", 2022, SINGLE_TAX_1M),
            declaration(2, "A", 2022, SINGLE_TAX_6M),
            declaration(3, "A", 2022, SINGLE_TAX_9M),
            declaration(4, "A", 2022, SINGLE_TAX_ANNUAL),
        ]);
        let mut diag = Diagnostics::new();
        let table = dedup_declarations(table, &mut diag);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].source_row, 4);
        assert!(!diag.is_empty());
    }

    #[test]
    fn six_month_supersedes_one_month_and_is_recoded() {
        let table = table_of(vec![
            declaration(1, "A", 2022, SINGLE_TAX_1M),
            declaration(2, "A", 2022, SINGLE_TAX_6M),
        ]);
        let mut diag = Diagnostics::new();
        let table = dedup_declarations(table, &mut diag);
        assert_eq!(table.len(), 1);
        assert_eq!(table.rows()[0].source_row, 2);
        assert_eq!(
            table.rows()[0].int(ColumnCode::G10),
            Some(SINGLE_TAX_ANNUAL),
            "survivor recoded to the canonical annual code"
        );
    }

    #[test]
    fn scope_is_per_taxpayer_and_year() {
        let table = table_of(vec![
            declaration(1, "A", 2021, SINGLE_TAX_6M),
            declaration(2, "A", 2022, SINGLE_TAX_1M),
            declaration(3, "B", 2022, SINGLE_TAX_1M),
        ]);
        let mut diag = Diagnostics::new();
        let table = dedup_declarations(table, &mut diag);
        // No group has more than one report; nothing removed.
        assert_eq!(table.len(), 3);
        assert!(diag.is_empty());
        for row in table.rows() {
            assert_eq!(row.int(ColumnCode::G10), Some(SINGLE_TAX_ANNUAL));
        }
    }

    #[test]
    fn regular_income_rows_untouched() {
        let mut row = declaration(1, "A", 2022, 101);
        row.set(ColumnCode::G10, Value::Int(101));
        let table = table_of(vec![row, declaration(2, "A", 2022, SINGLE_TAX_9M)]);
        let mut diag = Diagnostics::new();
        let table = dedup_declarations(table, &mut diag);
        assert_eq!(table.len(), 2);
        assert_eq!(table.rows()[0].int(ColumnCode::G10), Some(101));
    }

    #[test]
    fn idempotent() {
        let table = table_of(vec![
            declaration(1, "A", 2022, SINGLE_TAX_1M),
            declaration(2, "A", 2022, SINGLE_TAX_9M),
            declaration(3, "B", 2022, SINGLE_TAX_ANNUAL),
        ]);
        let mut diag = Diagnostics::new();
        let once = dedup_declarations(table, &mut diag);
        let mut second_diag = Diagnostics::new();
        let twice = dedup_declarations(once.clone(), &mut second_diag);
        assert_eq!(once, twice);
        assert!(second_diag.is_empty(), "second run is a no-op");
    }
}
