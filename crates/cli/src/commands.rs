//! `skarb` command implementations: convert, merge, validate.

use std::path::{Path, PathBuf};

use skarb_io::export::{self, ExportOptions};
use skarb_io::import;
use skarb_io::ImportError;
use skarb_recon::{pipeline, Combined, ReconError, ReconPolicy, Reconciled};

use crate::exit_codes::{
    EXIT_ERROR, EXIT_NO_RECORDS, EXIT_NO_VALID_RECORDS, EXIT_PARSE, EXIT_POLICY, EXIT_SCHEMA,
    EXIT_USAGE,
};
use crate::CliError;

/// Shared flags of the converting commands.
#[derive(Debug, Default, Clone)]
pub struct OutputOptions {
    pub output: Option<PathBuf>,
    pub split: bool,
    pub pretty_amounts: bool,
    pub no_profit: bool,
    pub labels: bool,
    pub policy: Option<PathBuf>,
    pub json: bool,
}

fn import_exit_code(err: &ImportError) -> u8 {
    match err {
        ImportError::Io(_) | ImportError::Write(_) => EXIT_ERROR,
        ImportError::Parse(_) | ImportError::MissingBody => EXIT_PARSE,
        ImportError::InsufficientSchema { .. } => EXIT_SCHEMA,
        ImportError::NoRecords => EXIT_NO_RECORDS,
    }
}

pub fn load_policy(path: Option<&Path>) -> Result<ReconPolicy, CliError> {
    match path {
        None => Ok(ReconPolicy::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path).map_err(|e| CliError {
                code: EXIT_USAGE,
                message: format!("cannot read policy {}: {e}", path.display()),
                hint: None,
            })?;
            ReconPolicy::from_toml(&text).map_err(|e| CliError {
                code: EXIT_POLICY,
                message: e.to_string(),
                hint: None,
            })
        }
    }
}

/// Import and reconcile one file. The "no valid records" failure carries
/// the accumulated diagnostics as the hint so callers can surface why the
/// rows disappeared.
pub fn reconcile_file(path: &Path, policy: &ReconPolicy) -> Result<Reconciled, CliError> {
    let table = import::import_table(path).map_err(|e| CliError {
        code: import_exit_code(&e),
        message: e.to_string(),
        hint: None,
    })?;
    pipeline::run(policy, table).map_err(|e| match e {
        ReconError::NoValidRecords { diagnostics } => CliError {
            code: EXIT_NO_VALID_RECORDS,
            message: "no valid records after cleaning".to_string(),
            hint: Some(diagnostics),
        },
        other => CliError {
            code: EXIT_POLICY,
            message: other.to_string(),
            hint: None,
        },
    })
}

fn export_options(policy: &ReconPolicy, opts: &OutputOptions) -> ExportOptions {
    ExportOptions {
        pretty_amounts: opts.pretty_amounts,
        skip_profit: opts.no_profit,
        labels: if opts.labels {
            policy.label_map()
        } else {
            Default::default()
        },
    }
}

fn export_err(err: ImportError) -> CliError {
    CliError {
        code: EXIT_ERROR,
        message: err.to_string(),
        hint: None,
    }
}

pub fn cmd_convert(input: PathBuf, opts: OutputOptions) -> Result<(), CliError> {
    let policy = load_policy(opts.policy.as_deref())?;
    let reconciled = reconcile_file(&input, &policy)?;

    if !reconciled.diagnostics.is_empty() {
        eprintln!("{}", reconciled.diagnostics);
    }

    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| input.with_extension("csv"));
    let export_opts = export_options(&policy, &opts);

    let written: Vec<PathBuf> = if opts.split {
        export::export_split_by_taxpayer(&output, &reconciled.table, &export_opts)
            .map_err(export_err)?
    } else {
        export::export_csv(&output, &reconciled.table, &export_opts).map_err(export_err)?;
        vec![output]
    };

    let taxpayers = reconciled.table.taxpayers().len();
    if opts.json {
        let summary = serde_json::json!({
            "file": input.display().to_string(),
            "rows": reconciled.table.len(),
            "taxpayers": taxpayers,
            "outputs": written.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
            "diagnostics": reconciled.diagnostics.lines(),
            "run_at": chrono::Utc::now().to_rfc3339(),
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
    } else {
        let outputs: Vec<String> = written.iter().map(|p| p.display().to_string()).collect();
        println!(
            "{}: {} rows ({} taxpayers) -> {}",
            input.display(),
            reconciled.table.len(),
            taxpayers,
            outputs.join(", ")
        );
    }
    Ok(())
}

/// Per-file outcome reported through the merge progress callback.
#[derive(Debug)]
pub enum FileOutcome {
    Reconciled { rows: usize },
    Failed { message: String },
}

/// Reconcile each file independently and fold the results into one
/// dataset. A structurally bad file lands in the combined diagnostics and
/// the rest proceed. The callback fires after each file completes;
/// advisory only, not part of the correctness contract.
pub fn merge_files(
    paths: &[PathBuf],
    policy: &ReconPolicy,
    mut on_file: impl FnMut(&Path, &FileOutcome),
) -> Combined {
    let mut combined = Combined::new();
    for path in paths {
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let outcome = match reconcile_file(path, policy) {
            Ok(reconciled) => {
                let rows = reconciled.table.len();
                combined.push(label, reconciled);
                FileOutcome::Reconciled { rows }
            }
            Err(err) => {
                let message = match &err.hint {
                    Some(detail) => format!("{}\n{detail}", err.message),
                    None => err.message.clone(),
                };
                combined.push_failure(label, &message);
                FileOutcome::Failed { message }
            }
        };
        on_file(path, &outcome);
    }
    combined
}

pub fn cmd_merge(inputs: Vec<PathBuf>, opts: OutputOptions) -> Result<(), CliError> {
    if inputs.is_empty() {
        return Err(CliError::args("merge requires at least one input file"));
    }
    let policy = load_policy(opts.policy.as_deref())?;

    let combined = merge_files(&inputs, &policy, |path, outcome| match outcome {
        FileOutcome::Reconciled { rows } => eprintln!("{}: {rows} rows", path.display()),
        FileOutcome::Failed { message } => eprintln!("{}: failed: {message}", path.display()),
    });

    if !combined.diagnostics().is_empty() {
        eprintln!("{}", combined.diagnostics());
    }
    if combined.is_empty() {
        return Err(CliError {
            code: EXIT_NO_VALID_RECORDS,
            message: "no valid records in any input file".to_string(),
            hint: None,
        });
    }

    let output = opts
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from("combined.csv"));
    let table = combined.to_table();
    export::export_csv(&output, &table, &export_options(&policy, &opts)).map_err(export_err)?;

    if opts.json {
        let summary = serde_json::json!({
            "files": combined.file_count(),
            "rows": combined.row_count(),
            "output": output.display().to_string(),
            "diagnostics": combined.diagnostics().lines(),
            "run_at": chrono::Utc::now().to_rfc3339(),
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
    } else {
        println!(
            "{} files, {} rows -> {}",
            combined.file_count(),
            combined.row_count(),
            output.display()
        );
    }
    Ok(())
}

pub fn cmd_validate(input: PathBuf, json: bool) -> Result<(), CliError> {
    let table = import::import_table(&input).map_err(|e| CliError {
        code: import_exit_code(&e),
        message: format!("{}: {e}", input.display()),
        hint: None,
    })?;
    if json {
        let summary = serde_json::json!({
            "file": input.display().to_string(),
            "rows": table.len(),
            "schema": "complete",
        });
        println!("{}", serde_json::to_string_pretty(&summary).unwrap_or_default());
    } else {
        println!(
            "{}: ok, {} data rows, schema complete",
            input.display(),
            table.len()
        );
    }
    Ok(())
}
