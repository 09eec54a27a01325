//! Registry XML extraction: decode the file, walk DECLARBODY, collect
//! every valid (row, column, value) cell.

use std::collections::BTreeSet;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::ImportError;

/// Container element holding all per-row cell elements.
const BODY_TAG: &[u8] = b"DECLARBODY";
/// Data-row tags start with this structural prefix.
const ROW_TAG_PREFIX: &str = "T1R";
/// Literal splitting a cell tag into structural prefix and column token.
const CELL_MARKER: &str = "xxxx";

/// One (row, column, value) fact read from the export. Immutable once
/// extracted; `code` is still an open string token at this stage.
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub row: u32,
    pub code: String,
    pub value: Option<String>,
}

/// Everything the extractor learned from one file.
#[derive(Debug, Default)]
pub struct Extract {
    pub cells: Vec<Cell>,
    /// Distinct column tokens seen on valid cells.
    pub columns: BTreeSet<String>,
    /// Highest ROWNUM observed; becomes the table row count.
    pub max_row: u32,
}

/// Split a cell tag on the marker. Valid only when the marker occurs
/// exactly once and leaves a non-empty lowercase suffix.
pub fn column_token(tag: &str) -> Option<String> {
    let lower = tag.to_ascii_lowercase();
    let parts: Vec<&str> = lower.split(CELL_MARKER).collect();
    if parts.len() != 2 {
        return None;
    }
    let token = parts[1].trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

/// Read a file and decode it to UTF-8, honoring the encoding declared in
/// the XML prolog. Registry exports commonly declare windows-1251.
pub fn read_file_as_utf8(path: &Path) -> Result<String, ImportError> {
    let bytes = std::fs::read(path).map_err(|e| ImportError::Io(e.to_string()))?;
    Ok(decode_xml_bytes(&bytes))
}

fn decode_xml_bytes(bytes: &[u8]) -> String {
    if let Some((encoding, bom_len)) = encoding_rs::Encoding::for_bom(bytes) {
        let (text, _) = encoding.decode_without_bom_handling(&bytes[bom_len..]);
        return text.into_owned();
    }
    if let Some(label) = declared_encoding(bytes) {
        if let Some(encoding) = encoding_rs::Encoding::for_label(label.as_bytes()) {
            let (text, _) = encoding.decode_without_bom_handling(bytes);
            return text.into_owned();
        }
    }
    String::from_utf8_lossy(bytes).into_owned()
}

/// Pull the encoding label out of the XML declaration, if any.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]).to_lowercase();
    let start = head.find("encoding=")? + "encoding=".len();
    let rest = &head[start..];
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let rest = &rest[1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

/// Walk the document and collect every valid cell under DECLARBODY.
///
/// Distinguishes "could not read" (`Err`) from "read but empty"
/// (`Ok` with `max_row == 0`): malformed XML and a missing body element
/// are parse failures, a well-formed body with no data rows is not.
pub fn extract_cells(xml: &str) -> Result<Extract, ImportError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut extract = Extract::default();
    let mut in_body = false;
    let mut body_seen = false;
    // Cell element currently open, awaiting its text content.
    let mut current: Option<Cell> = None;

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => {
                if e.name().as_ref() == BODY_TAG {
                    in_body = true;
                    body_seen = true;
                } else if in_body {
                    current = open_cell(e, &mut extract);
                }
            }
            Ok(Event::Empty(ref e)) => {
                if in_body {
                    if let Some(cell) = open_cell(e, &mut extract) {
                        close_cell(&mut extract, cell);
                    }
                }
            }
            Ok(Event::Text(ref e)) => {
                if let Some(cell) = current.as_mut() {
                    let text = e.xml_content().unwrap_or_default().trim().to_string();
                    if !text.is_empty() {
                        cell.value = Some(text);
                    }
                }
            }
            Ok(Event::End(ref e)) => {
                if e.name().as_ref() == BODY_TAG {
                    in_body = false;
                } else if let Some(cell) = current.take() {
                    close_cell(&mut extract, cell);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(ImportError::Parse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    if !body_seen {
        return Err(ImportError::MissingBody);
    }
    Ok(extract)
}

/// Recognize a data-row element: `T1R` prefix plus a nonzero ROWNUM.
/// The max row number is tracked for every data row, valid cell or not.
fn open_cell(e: &BytesStart<'_>, extract: &mut Extract) -> Option<Cell> {
    let name = String::from_utf8_lossy(e.name().as_ref()).to_string();
    if !name.starts_with(ROW_TAG_PREFIX) {
        return None;
    }
    let row = rownum_attr(e)?;
    if row > extract.max_row {
        extract.max_row = row;
    }
    let code = column_token(&name)?;
    Some(Cell {
        row,
        code,
        value: None,
    })
}

fn close_cell(extract: &mut Extract, cell: Cell) {
    extract.columns.insert(cell.code.clone());
    extract.cells.push(cell);
}

/// Missing or zero ROWNUM means "not a data row".
fn rownum_attr(e: &BytesStart<'_>) -> Option<u32> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == b"ROWNUM" {
            return String::from_utf8_lossy(&attr.value)
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0);
        }
    }
    None
}
