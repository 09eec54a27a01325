// Skarb CLI - registry XML export conversion

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use skarb_cli::commands::{cmd_convert, cmd_merge, cmd_validate, OutputOptions};
use skarb_cli::exit_codes::EXIT_SUCCESS;
use skarb_cli::CliError;

#[derive(Parser)]
#[command(name = "skarb")]
#[command(about = "Convert tax registry XML exports into clean CSV tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single registry XML export to CSV
    #[command(after_help = "\
Examples:
  skarb convert response.xml
  skarb convert response.xml -o incomes.csv --pretty-amounts --labels
  skarb convert response.xml --split
  skarb convert response.xml --policy recon.toml --json")]
    Convert {
        /// Registry XML export file
        input: PathBuf,

        /// Output CSV path (defaults to the input path with a .csv extension)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Write one CSV per taxpayer instead of a single file
        #[arg(long)]
        split: bool,

        /// Format amounts with thousands separators (12 345.67)
        #[arg(long)]
        pretty_amounts: bool,

        /// Omit the computed profit column
        #[arg(long)]
        no_profit: bool,

        /// Replace known income type codes with text labels
        #[arg(long)]
        labels: bool,

        /// Reconciliation policy TOML (defaults are built in)
        #[arg(long, env = "SKARB_POLICY")]
        policy: Option<PathBuf>,

        /// Print a JSON run summary to stdout
        #[arg(long)]
        json: bool,
    },

    /// Reconcile several exports and concatenate them into one CSV
    #[command(after_help = "\
Examples:
  skarb merge q1.xml q2.xml q3.xml q4.xml
  skarb merge *.xml -o year.csv --pretty-amounts
  skarb merge a.xml b.xml --policy recon.toml --json")]
    Merge {
        /// Registry XML export files, aggregated in argument order
        inputs: Vec<PathBuf>,

        /// Output CSV path (defaults to combined.csv)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Format amounts with thousands separators (12 345.67)
        #[arg(long)]
        pretty_amounts: bool,

        /// Omit the computed profit column
        #[arg(long)]
        no_profit: bool,

        /// Replace known income type codes with text labels
        #[arg(long)]
        labels: bool,

        /// Reconciliation policy TOML (defaults are built in)
        #[arg(long, env = "SKARB_POLICY")]
        policy: Option<PathBuf>,

        /// Print a JSON run summary to stdout
        #[arg(long)]
        json: bool,
    },

    /// Check that a file parses and carries the full column schema
    #[command(after_help = "\
Examples:
  skarb validate response.xml
  skarb validate response.xml --json")]
    Validate {
        /// Registry XML export file
        input: PathBuf,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        None => {
            eprintln!("Usage: skarb <command> [options]");
            eprintln!("       skarb --help for more information");
            Ok(())
        }
        Some(Commands::Convert {
            input,
            output,
            split,
            pretty_amounts,
            no_profit,
            labels,
            policy,
            json,
        }) => cmd_convert(
            input,
            OutputOptions {
                output,
                split,
                pretty_amounts,
                no_profit,
                labels,
                policy,
                json,
            },
        ),
        Some(Commands::Merge {
            inputs,
            output,
            pretty_amounts,
            no_profit,
            labels,
            policy,
            json,
        }) => cmd_merge(
            inputs,
            OutputOptions {
                output,
                split: false,
                pretty_amounts,
                no_profit,
                labels,
                policy,
                json,
            },
        ),
        Some(Commands::Validate { input, json }) => cmd_validate(input, json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError {
            code,
            message,
            hint,
        }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}
