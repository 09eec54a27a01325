use std::fmt;

use serde::Serialize;

use crate::column::ColumnCode;

// ---------------------------------------------------------------------------
// Value
// ---------------------------------------------------------------------------

/// A single table slot. Extraction produces `Null`/`Text`; the coercion
/// pass narrows to `Int`/`Number` where the raw text parses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Text(String),
    Int(i64),
    Number(f64),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whole-number reading regardless of coercion state: `Int(512)`,
    /// `Number(512.0)` and `Text("512")` all read as 512.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            Value::Number(f) if f.fract() == 0.0 => Some(*f as i64),
            Value::Text(s) => {
                let t = s.trim();
                t.parse::<i64>().ok().or_else(|| {
                    t.parse::<f64>()
                        .ok()
                        .filter(|f| f.fract() == 0.0)
                        .map(|f| f as i64)
                })
            }
            _ => None,
        }
    }

    /// Floating-point reading. Accepts a comma decimal separator, which
    /// some registry exports use for amounts.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(f) => Some(*f),
            Value::Int(i) => Some(*i as f64),
            Value::Text(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
            Value::Null => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Text(s) => f.write_str(s),
            Value::Int(i) => write!(f, "{i}"),
            Value::Number(n) => write!(f, "{n}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Row
// ---------------------------------------------------------------------------

/// One declaration line. `source_row` is the 1-based ROWNUM carried from
/// the export, kept so diagnostics can reference source line numbers after
/// rows have been dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub source_row: u32,
    values: [Value; ColumnCode::COUNT],
    /// Derived `income - tax`, set by the final pipeline pass only.
    pub profit: Option<f64>,
}

impl Row {
    /// A fresh all-null row.
    pub fn new(source_row: u32) -> Self {
        Row {
            source_row,
            values: std::array::from_fn(|_| Value::Null),
            profit: None,
        }
    }

    pub fn get(&self, code: ColumnCode) -> &Value {
        &self.values[code.index()]
    }

    pub fn set(&mut self, code: ColumnCode, value: Value) {
        self.values[code.index()] = value;
    }

    pub fn int(&self, code: ColumnCode) -> Option<i64> {
        self.get(code).as_int()
    }

    pub fn number(&self, code: ColumnCode) -> Option<f64> {
        self.get(code).as_number()
    }

    pub fn text(&self, code: ColumnCode) -> Option<&str> {
        self.get(code).as_text()
    }
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// The per-file working record set. Created empty, populated once from the
/// extracted cells, mutated in place by each reconciliation pass, then
/// read-only input to reporting.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-sized table: rows numbered 1..=count, every slot null.
    pub fn with_row_count(count: u32) -> Self {
        Table {
            rows: (1..=count).map(Row::new).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Row] {
        &mut self.rows
    }

    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    pub fn retain<F: FnMut(&Row) -> bool>(&mut self, f: F) {
        self.rows.retain(f);
    }

    /// Distinct taxpayer identifiers in first-seen order.
    pub fn taxpayers(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for row in &self.rows {
            if let Some(id) = row.text(ColumnCode::G3s) {
                let id = id.trim();
                if !id.is_empty() && !seen.iter().any(|s| s == id) {
                    seen.push(id.to_string());
                }
            }
        }
        seen
    }
}
