//! The ordered cleaning passes converting a raw table into a report-ready
//! table.
//!
//! Order is load-bearing: later passes assume earlier postconditions.
//! Dedup runs on raw codes before imputation and coercion; the emptiness
//! guard runs before profit so derived columns are never computed on an
//! empty table. Each pass is a pure `Table -> Table` step appending to the
//! shared diagnostics accumulator, so every pass is testable on its own.

use skarb_core::{ColumnCode, Row, Table, Value};

use crate::config::ReconPolicy;
use crate::dedup::{self, SUMMARY_CODE};
use crate::diagnostics::{list_rows, Diagnostics};
use crate::error::ReconError;

/// Output of a completed single-file reconciliation. The table is
/// read-only input to reporting from here on.
#[derive(Debug)]
pub struct Reconciled {
    pub table: Table,
    pub diagnostics: Diagnostics,
}

/// Run every pass in order against a freshly built table.
pub fn run(policy: &ReconPolicy, table: Table) -> Result<Reconciled, ReconError> {
    let mut diag = Diagnostics::new();

    let table = drop_summary_rows(table, &mut diag);
    let table = drop_missing_taxpayers(table, &mut diag);
    let table = filter_failed_lookups(table, policy, &mut diag);
    let table = dedup::dedup_declarations(table, &mut diag);
    let table = recover_sole_proprietors(table, policy, &mut diag);
    let table = impute_default_quarter(table, policy, &mut diag);
    let table = impute_scalars(table, policy, &mut diag);
    let table = coerce_types(table);

    if table.is_empty() {
        diag.note("no valid records after cleaning");
        return Err(ReconError::NoValidRecords {
            diagnostics: diag.to_string(),
        });
    }

    let table = compute_profit(table);
    Ok(Reconciled {
        table,
        diagnostics: diag,
    })
}

fn taxpayer_id(row: &Row) -> Option<&str> {
    row.text(ColumnCode::G3s)
        .map(str::trim)
        .filter(|id| !id.is_empty())
}

/// Pass 1: drop person-level declaration summary rows (code 888). They
/// describe the act of declaring, not income.
pub fn drop_summary_rows(mut table: Table, diag: &mut Diagnostics) -> Table {
    let mut removed = Vec::new();
    table.retain(|row| {
        if row.int(ColumnCode::G10) == Some(SUMMARY_CODE) {
            removed.push(row.source_row);
            false
        } else {
            true
        }
    });
    if !removed.is_empty() {
        diag.note(format!(
            "dropped {} declaration summary rows, code 888 (rows: {})",
            removed.len(),
            list_rows(&removed)
        ));
    }
    table
}

/// Pass 2: rows with no taxpayer identifier cannot be attributed to
/// anyone; drop them.
pub fn drop_missing_taxpayers(mut table: Table, diag: &mut Diagnostics) -> Table {
    let mut removed = Vec::new();
    table.retain(|row| {
        if taxpayer_id(row).is_none() {
            removed.push(row.source_row);
            false
        } else {
            true
        }
    });
    if !removed.is_empty() {
        diag.note(format!(
            "removed {} rows with a missing taxpayer id (rows: {})",
            removed.len(),
            list_rows(&removed)
        ));
    }
    table
}

/// Pass 3: a failure response code means the registry returned nothing for
/// that person — every row of that taxpayer goes, not just the flagged
/// one. Null response codes get the default success code first.
pub fn filter_failed_lookups(
    mut table: Table,
    policy: &ReconPolicy,
    diag: &mut Diagnostics,
) -> Table {
    for row in table.rows_mut() {
        if row.get(ColumnCode::G4s).is_null() {
            row.set(ColumnCode::G4s, Value::Int(policy.default_response));
        }
    }

    // Taxpayer -> first failing code, in row order.
    let mut failed: Vec<(String, i64)> = Vec::new();
    for row in table.rows() {
        let Some(code) = row.int(ColumnCode::G4s) else {
            continue;
        };
        if !policy.is_failure(code) {
            continue;
        }
        let Some(id) = taxpayer_id(row) else {
            continue;
        };
        if !failed.iter().any(|(p, _)| p.as_str() == id) {
            failed.push((id.to_string(), code));
        }
    }
    if failed.is_empty() {
        return table;
    }

    diag.note("rows indicate a negative registry response:");
    for (id, code) in &failed {
        let rows: Vec<u32> = table
            .rows()
            .iter()
            .filter(|row| taxpayer_id(row) == Some(id.as_str()))
            .map(|row| row.source_row)
            .collect();
        let reason = policy
            .failure_message(*code)
            .unwrap_or("unrecognized response code");
        diag.note(format!(
            "- taxpayer {id}: {reason} (removed rows: {})",
            list_rows(&rows)
        ));
        table.retain(|row| taxpayer_id(row) != Some(id.as_str()));
    }
    table
}

/// Pass 5: single-tax declarations have no external payer; the taxpayer
/// is their own employer.
pub fn recover_sole_proprietors(
    mut table: Table,
    policy: &ReconPolicy,
    diag: &mut Diagnostics,
) -> Table {
    let mut count = 0usize;
    for row in table.rows_mut() {
        let Some(code) = row.int(ColumnCode::G10) else {
            continue;
        };
        if !dedup::is_single_tax(code) {
            continue;
        }
        let id = row.get(ColumnCode::G3s).clone();
        row.set(ColumnCode::G6s, id);
        row.set(
            ColumnCode::G7s,
            Value::Text(policy.own_business_label.clone()),
        );
        count += 1;
    }
    if count > 0 {
        diag.note(format!(
            "assigned own-business employer fields on {count} single-tax rows"
        ));
    }
    table
}

/// Pass 6: annual/aggregate declarations carry no natural quarter.
pub fn impute_default_quarter(
    mut table: Table,
    policy: &ReconPolicy,
    diag: &mut Diagnostics,
) -> Table {
    let fixed = fill_nulls(&mut table, ColumnCode::G11, || {
        Value::Int(policy.default_quarter)
    });
    if !fixed.is_empty() {
        diag.note(format!(
            "missing quarter in {} rows, defaulted to quarter {} (rows: {})",
            fixed.len(),
            policy.default_quarter,
            list_rows(&fixed)
        ));
    }
    table
}

/// Pass 7: recoverable scalar gaps. Each substitution is counted and
/// reported with the affected source row numbers.
pub fn impute_scalars(mut table: Table, policy: &ReconPolicy, diag: &mut Diagnostics) -> Table {
    let fixed = fill_nulls(&mut table, ColumnCode::G8, || Value::Number(0.0));
    if !fixed.is_empty() {
        diag.note(format!(
            "missing income amounts in {} rows, replaced with 0.00 (rows: {})",
            fixed.len(),
            list_rows(&fixed)
        ));
    }

    let fixed = fill_nulls(&mut table, ColumnCode::G9, || Value::Number(0.0));
    if !fixed.is_empty() {
        diag.note(format!(
            "missing tax amounts in {} rows, replaced with 0.00 (rows: {})",
            fixed.len(),
            list_rows(&fixed)
        ));
    }

    let fixed = fill_nulls(&mut table, ColumnCode::G7s, || {
        Value::Text(policy.missing_employer_name.clone())
    });
    if !fixed.is_empty() {
        diag.note(format!(
            "missing employer names in {} rows, replaced with \"{}\" (rows: {})",
            fixed.len(),
            policy.missing_employer_name,
            list_rows(&fixed)
        ));
    }

    let fixed = fill_nulls(&mut table, ColumnCode::G10, || {
        Value::Int(policy.other_income_code)
    });
    if !fixed.is_empty() {
        diag.note(format!(
            "missing income types in {} rows, replaced with code {} (rows: {})",
            fixed.len(),
            policy.other_income_code,
            list_rows(&fixed)
        ));
    }

    table
}

fn fill_nulls(table: &mut Table, code: ColumnCode, make: impl Fn() -> Value) -> Vec<u32> {
    let mut fixed = Vec::new();
    for row in table.rows_mut() {
        if row.get(code).is_null() {
            row.set(code, make());
            fixed.push(row.source_row);
        }
    }
    fixed
}

/// Pass 8: narrow designated columns to their numeric types. Values that
/// do not parse are left untouched rather than dropped.
pub fn coerce_types(mut table: Table) -> Table {
    const INT_COLUMNS: [ColumnCode; 5] = [
        ColumnCode::G4s,
        ColumnCode::G5,
        ColumnCode::G10,
        ColumnCode::G11,
        ColumnCode::G12,
    ];
    const AMOUNT_COLUMNS: [ColumnCode; 2] = [ColumnCode::G8, ColumnCode::G9];

    for row in table.rows_mut() {
        for code in INT_COLUMNS {
            if row.get(code).is_null() {
                continue;
            }
            if let Some(i) = row.int(code) {
                row.set(code, Value::Int(i));
            }
        }
        for code in AMOUNT_COLUMNS {
            if row.get(code).is_null() {
                continue;
            }
            if let Some(f) = row.number(code) {
                row.set(code, Value::Number(f));
            }
        }
    }
    table
}

/// Pass 10: `profit = income - tax`, rounded to two decimal places,
/// computed once after all row-level cleaning is final.
pub fn compute_profit(mut table: Table) -> Table {
    for row in table.rows_mut() {
        row.profit = match (
            row.number(ColumnCode::G8),
            row.number(ColumnCode::G9),
        ) {
            (Some(income), Some(tax)) => Some(round2(income - tax)),
            _ => None,
        };
    }
    table
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
