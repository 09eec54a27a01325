//! CSV export of reconciled tables.
//!
//! Reporting collaborators consume the table read-only; export never
//! mutates it.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};

use skarb_core::{ColumnCode, Row, Table, Value};

use crate::error::ImportError;

/// Export view order. Service columns (g4s, g5) are import-time plumbing
/// and are not part of the report; profit slots in after the tax column.
const LEADING_COLUMNS: [ColumnCode; 4] = [
    ColumnCode::G2s,
    ColumnCode::G3s,
    ColumnCode::G6s,
    ColumnCode::G7s,
];
const TRAILING_COLUMNS: [ColumnCode; 3] = [ColumnCode::G10, ColumnCode::G11, ColumnCode::G12];

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    /// Render amounts as `12 300.50` instead of `12300.5`.
    pub pretty_amounts: bool,
    /// Omit the computed profit column.
    pub skip_profit: bool,
    /// Income-type code → display label. Codes without a label are
    /// written as-is.
    pub labels: BTreeMap<i64, String>,
}

/// Write the reconciled table as CSV with the fixed internal column codes
/// as the header row.
pub fn write_csv<W: std::io::Write>(
    out: W,
    table: &Table,
    options: &ExportOptions,
) -> Result<(), ImportError> {
    let mut writer = csv::Writer::from_writer(out);

    let mut header: Vec<&str> = LEADING_COLUMNS.iter().map(|c| c.token()).collect();
    header.push(ColumnCode::G8.token());
    header.push(ColumnCode::G9.token());
    if !options.skip_profit {
        header.push("profit");
    }
    header.extend(TRAILING_COLUMNS.iter().map(|c| c.token()));
    writer
        .write_record(&header)
        .map_err(|e| ImportError::Write(e.to_string()))?;

    for row in table.rows() {
        let record = render_row(row, options);
        writer
            .write_record(&record)
            .map_err(|e| ImportError::Write(e.to_string()))?;
    }
    writer.flush().map_err(|e| ImportError::Write(e.to_string()))
}

pub fn export_csv(path: &Path, table: &Table, options: &ExportOptions) -> Result<(), ImportError> {
    let file = File::create(path).map_err(|e| ImportError::Write(e.to_string()))?;
    write_csv(file, table, options)
}

/// One CSV per taxpayer, written beside the requested path as
/// `<stem>_<taxpayer>.csv`. Returns the paths written, in taxpayer
/// first-seen order.
pub fn export_split_by_taxpayer(
    path: &Path,
    table: &Table,
    options: &ExportOptions,
) -> Result<Vec<PathBuf>, ImportError> {
    let stem = path.file_stem().unwrap_or_default().to_string_lossy();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut written = Vec::new();
    for taxpayer in table.taxpayers() {
        let mut subset = Table::new();
        for row in table.rows() {
            if row.text(ColumnCode::G3s).map(str::trim) == Some(taxpayer.as_str()) {
                subset.push(row.clone());
            }
        }
        let target = path.with_file_name(format!("{stem}_{taxpayer}{extension}"));
        export_csv(&target, &subset, options)?;
        written.push(target);
    }
    Ok(written)
}

fn render_row(row: &Row, options: &ExportOptions) -> Vec<String> {
    let mut record: Vec<String> = LEADING_COLUMNS
        .iter()
        .map(|code| row.get(*code).to_string())
        .collect();
    record.push(render_amount(row.get(ColumnCode::G8), options.pretty_amounts));
    record.push(render_amount(row.get(ColumnCode::G9), options.pretty_amounts));
    if !options.skip_profit {
        let profit = match row.profit {
            Some(p) if options.pretty_amounts => format_amount(p),
            Some(p) => format!("{p:.2}"),
            None => String::new(),
        };
        record.push(profit);
    }
    for code in TRAILING_COLUMNS {
        let value = row.get(code);
        let text = if code == ColumnCode::G10 {
            match value.as_int().and_then(|c| options.labels.get(&c)) {
                Some(label) => label.clone(),
                None => value.to_string(),
            }
        } else {
            value.to_string()
        };
        record.push(text);
    }
    record
}

fn render_amount(value: &Value, pretty: bool) -> String {
    match value.as_number() {
        Some(amount) if pretty => format_amount(amount),
        Some(amount) => format!("{amount:.2}"),
        None => value.to_string(),
    }
}

/// `1234567.5` → `1 234 567.50`: space thousands separator, dot decimals,
/// always two decimal places.
pub fn format_amount(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as i64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }
    format!("{}{grouped}.{fraction:02}", if negative { "-" } else { "" })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> Table {
        let mut table = Table::with_row_count(2);
        {
            let row = &mut table.rows_mut()[0];
            row.set(ColumnCode::G2s, Value::Text("1".into()));
            row.set(ColumnCode::G3s, Value::Text("1111111111".into()));
            row.set(ColumnCode::G6s, Value::Text("222".into()));
            row.set(ColumnCode::G7s, Value::Text("ACME".into()));
            row.set(ColumnCode::G8, Value::Number(12000.0));
            row.set(ColumnCode::G9, Value::Number(1200.0));
            row.set(ColumnCode::G10, Value::Int(101));
            row.set(ColumnCode::G11, Value::Int(4));
            row.set(ColumnCode::G12, Value::Int(2022));
            row.profit = Some(10800.0);
        }
        {
            let row = &mut table.rows_mut()[1];
            row.set(ColumnCode::G3s, Value::Text("2222222222".into()));
            row.set(ColumnCode::G8, Value::Number(500.5));
            row.set(ColumnCode::G9, Value::Number(0.0));
            row.profit = Some(500.5);
        }
        table
    }

    fn csv_lines(table: &Table, options: &ExportOptions) -> Vec<String> {
        let mut out = Vec::new();
        write_csv(&mut out, table, options).unwrap();
        String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn header_uses_internal_codes() {
        let lines = csv_lines(&sample_table(), &ExportOptions::default());
        assert_eq!(lines[0], "g2s,g3s,g6s,g7s,g8,g9,profit,g10,g11,g12");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn amounts_rendered_with_two_decimals() {
        let lines = csv_lines(&sample_table(), &ExportOptions::default());
        assert_eq!(lines[1], "1,1111111111,222,ACME,12000.00,1200.00,10800.00,101,4,2022");
        assert!(lines[2].contains("500.50"));
    }

    #[test]
    fn skip_profit_removes_the_column() {
        let options = ExportOptions {
            skip_profit: true,
            ..ExportOptions::default()
        };
        let lines = csv_lines(&sample_table(), &options);
        assert_eq!(lines[0], "g2s,g3s,g6s,g7s,g8,g9,g10,g11,g12");
    }

    #[test]
    fn labels_replace_income_type_codes() {
        let mut labels = BTreeMap::new();
        labels.insert(101, "salary".to_string());
        let options = ExportOptions {
            labels,
            ..ExportOptions::default()
        };
        let lines = csv_lines(&sample_table(), &options);
        assert!(lines[1].contains(",salary,"));
        // Unlabeled rows keep the raw value (here: null renders empty).
        assert!(!lines[2].contains("salary"));
    }

    #[test]
    fn pretty_amount_formatting() {
        assert_eq!(format_amount(12300.5), "12 300.50");
        assert_eq!(format_amount(1234567.891), "1 234 567.89");
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(-4500.0), "-4 500.00");
        assert_eq!(format_amount(999.0), "999.00");
    }

    #[test]
    fn split_by_taxpayer_writes_one_file_each() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("report.csv");
        let written =
            export_split_by_taxpayer(&base, &sample_table(), &ExportOptions::default()).unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("report_1111111111.csv"));
        let body = std::fs::read_to_string(&written[1]).unwrap();
        assert!(body.contains("2222222222"));
        assert!(!body.contains("1111111111"));
    }
}
