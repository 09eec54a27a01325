//! Multi-file aggregation.
//!
//! Holds already-reconciled per-file tables by composition. File-scoped
//! operations (parse, schema check, dedup) are not part of this type's
//! surface, so they cannot be re-run against the aggregate; they must have
//! happened per file before a table arrives here.

use skarb_core::{Row, Table};

use crate::diagnostics::Diagnostics;
use crate::pipeline::Reconciled;

/// One reconciled source file inside a combined dataset.
#[derive(Debug)]
pub struct SourceTable {
    pub label: String,
    pub table: Table,
}

/// Row-wise concatenation of reconciled tables: file-arrival order first,
/// source row order within each file.
#[derive(Debug, Default)]
pub struct Combined {
    sources: Vec<SourceTable>,
    diagnostics: Diagnostics,
}

impl Combined {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one reconciled file. Its diagnostics are folded into the
    /// overall report under the file's label.
    pub fn push(&mut self, label: impl Into<String>, reconciled: Reconciled) {
        let label = label.into();
        let Reconciled { table, diagnostics } = reconciled;
        if !diagnostics.is_empty() {
            self.diagnostics.note(format!("{label}:"));
            self.diagnostics.merge(diagnostics);
        }
        self.sources.push(SourceTable { label, table });
    }

    /// Record a per-file structural failure without aborting the import;
    /// one bad file must not prevent others from being aggregated.
    pub fn push_failure(&mut self, label: impl Into<String>, message: impl Into<String>) {
        self.diagnostics
            .note(format!("{}: {}", label.into(), message.into()));
    }

    pub fn file_count(&self) -> usize {
        self.sources.len()
    }

    pub fn row_count(&self) -> usize {
        self.sources.iter().map(|s| s.table.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    pub fn sources(&self) -> &[SourceTable] {
        &self.sources
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Rows with their source label, in aggregate order.
    pub fn rows(&self) -> impl Iterator<Item = (&str, &Row)> {
        self.sources.iter().flat_map(|source| {
            source
                .table
                .rows()
                .iter()
                .map(move |row| (source.label.as_str(), row))
        })
    }

    /// Concatenated copy for export. File-level passes already ran per
    /// source; none are applied here.
    pub fn to_table(&self) -> Table {
        let mut out = Table::new();
        for source in &self.sources {
            for row in source.table.rows() {
                out.push(row.clone());
            }
        }
        out
    }
}
