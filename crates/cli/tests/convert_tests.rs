// End-to-end tests for `skarb convert` and `skarb validate`, driven
// through the library entry points against real XML fixtures on disk.
// Run with: cargo test -p skarb-cli --test convert_tests

use std::path::{Path, PathBuf};

use skarb_cli::commands::{cmd_convert, cmd_validate, reconcile_file, OutputOptions};
use skarb_cli::exit_codes::{EXIT_NO_VALID_RECORDS, EXIT_PARSE, EXIT_SCHEMA};
use skarb_recon::ReconPolicy;

// ---------------------------------------------------------------------------
// Fixture builders
// ---------------------------------------------------------------------------

fn cell(code: &str, row: u32, value: &str) -> String {
    let tag = format!("T1RXXXX{}", code.to_uppercase());
    format!("<{tag} ROWNUM=\"{row}\">{value}</{tag}>")
}

/// One complete data row: every required column populated.
fn full_row(row: u32, taxpayer: &str, income_type: i64, income: &str, tax: &str) -> String {
    [
        cell("g2s", row, &row.to_string()),
        cell("g3s", row, taxpayer),
        cell("g4s", row, "1"),
        cell("g5", row, "1"),
        cell("g6s", row, "3344556677"),
        cell("g7s", row, "ACME LLC"),
        cell("g8", row, income),
        cell("g9", row, tax),
        cell("g10", row, &income_type.to_string()),
        cell("g11", row, "1"),
        cell("g12", row, "2022"),
    ]
    .join("\n    ")
}

fn document(body: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <DECLAR>\n\
         <DECLARHEAD><TIN>0000000000</TIN></DECLARHEAD>\n\
         <DECLARBODY>\n    {body}\n</DECLARBODY>\n\
         </DECLAR>"
    )
}

fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}

// ---------------------------------------------------------------------------
// convert
// ---------------------------------------------------------------------------

#[test]
fn convert_single_tax_year_to_one_clean_row() {
    let dir = tempfile::tempdir().unwrap();
    // Summary row, a 1-month single-tax report, and the annual report of
    // the same taxpayer and year. Only the annual report should survive.
    let body = [
        full_row(1, "1234567890", 888, "0", "0"),
        full_row(2, "1234567890", 503, "1000", "100"),
        full_row(3, "1234567890", 512, "12000", "1200"),
    ]
    .join("\n    ");
    let input = write_fixture(dir.path(), "response.xml", &document(&body));
    let output = dir.path().join("out.csv");

    cmd_convert(
        input,
        OutputOptions {
            output: Some(output.clone()),
            ..OutputOptions::default()
        },
    )
    .unwrap();

    let csv = std::fs::read_to_string(&output).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "g2s,g3s,g6s,g7s,g8,g9,profit,g10,g11,g12");
    assert_eq!(
        lines[1],
        "3,1234567890,1234567890,OWN BUSINESS ACTIVITY INCOME,12000.00,1200.00,10800.00,512,1,2022"
    );
}

#[test]
fn convert_defaults_output_to_input_with_csv_extension() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        dir.path(),
        "response.xml",
        &document(&full_row(1, "1234567890", 101, "100", "10")),
    );

    cmd_convert(input.clone(), OutputOptions::default()).unwrap();

    assert!(input.with_extension("csv").is_file());
}

#[test]
fn convert_split_writes_one_file_per_taxpayer() {
    let dir = tempfile::tempdir().unwrap();
    let body = [
        full_row(1, "1111111111", 101, "100", "10"),
        full_row(2, "2222222222", 101, "200", "20"),
    ]
    .join("\n    ");
    let input = write_fixture(dir.path(), "two.xml", &document(&body));
    let output = dir.path().join("report.csv");

    cmd_convert(
        input,
        OutputOptions {
            output: Some(output),
            split: true,
            ..OutputOptions::default()
        },
    )
    .unwrap();

    let first = std::fs::read_to_string(dir.path().join("report_1111111111.csv")).unwrap();
    let second = std::fs::read_to_string(dir.path().join("report_2222222222.csv")).unwrap();
    assert!(first.contains("1111111111"));
    assert!(!first.contains("2222222222"));
    assert!(second.contains("2222222222"));
}

#[test]
fn convert_pretty_amounts_and_labels() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        dir.path(),
        "big.xml",
        &document(&full_row(1, "1234567890", 101, "1234567.891", "123456.79")),
    );
    let output = dir.path().join("pretty.csv");

    cmd_convert(
        input,
        OutputOptions {
            output: Some(output.clone()),
            pretty_amounts: true,
            labels: true,
            ..OutputOptions::default()
        },
    )
    .unwrap();

    let csv = std::fs::read_to_string(&output).unwrap();
    assert!(csv.contains("1 234 567.89"));
    assert!(csv.contains("123 456.79"));
    assert!(csv.contains("salary"), "code 101 replaced by its label");
}

// ---------------------------------------------------------------------------
// Failure exit codes
// ---------------------------------------------------------------------------

#[test]
fn missing_body_maps_to_parse_exit() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        dir.path(),
        "headless.xml",
        "<?xml version=\"1.0\"?><DECLAR><DECLARHEAD/></DECLAR>",
    );
    let err = reconcile_file(&input, &ReconPolicy::default()).unwrap_err();
    assert_eq!(err.code, EXIT_PARSE);
}

#[test]
fn incomplete_schema_maps_to_schema_exit() {
    let dir = tempfile::tempdir().unwrap();
    let body = [
        cell("g3s", 1, "1234567890"),
        cell("g8", 1, "100"),
        cell("g9", 1, "10"),
    ]
    .join("\n    ");
    let input = write_fixture(dir.path(), "partial.xml", &document(&body));
    let err = reconcile_file(&input, &ReconPolicy::default()).unwrap_err();
    assert_eq!(err.code, EXIT_SCHEMA);
    assert!(err.message.contains("G10"), "missing columns named: {}", err.message);
}

#[test]
fn file_that_cleans_to_nothing_maps_to_no_valid_records_exit() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        dir.path(),
        "summaries.xml",
        &document(&full_row(1, "1234567890", 888, "0", "0")),
    );
    let err = reconcile_file(&input, &ReconPolicy::default()).unwrap_err();
    assert_eq!(err.code, EXIT_NO_VALID_RECORDS);
    let hint = err.hint.expect("diagnostics carried in the hint");
    assert!(hint.contains("888"));
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn validate_accepts_a_complete_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(
        dir.path(),
        "ok.xml",
        &document(&full_row(1, "1234567890", 101, "100", "10")),
    );
    cmd_validate(input, false).unwrap();
}

#[test]
fn validate_rejects_an_incomplete_file() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "bad.xml", &document(&cell("g3s", 1, "x")));
    let err = cmd_validate(input, false).unwrap_err();
    assert_eq!(err.code, EXIT_SCHEMA);
}
