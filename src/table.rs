//! CSV reading and writing.
//!
//! Just enough RFC 4180 for the sync workflow: quoted fields, doubled
//! quotes, embedded line breaks and CRLF input. Output always uses `\n`
//! line endings and the configured [`QuoteStyle`].

use std::fs;
use std::path::Path;

use crate::config::QuoteStyle;
use crate::sync::atomic_write;

/// One parsed record.
pub type Row = Vec<String>;

/// Errors from reading or writing tables.
#[derive(Debug, thiserror::Error)]
pub enum TableError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unterminated quoted field starting on line {line}")]
    UnterminatedQuote { line: usize },

    /// Quote style `none` cannot represent this field.
    #[error("Field {field:?} on row {row} needs quoting, but the quote style is 'none'")]
    UnquotableField { row: usize, field: String },
}

/// Parse CSV text into rows.
///
/// A blank line yields an empty row. A trailing line break does not.
///
/// # Errors
///
/// Returns an error if a quoted field is never closed.
pub fn parse(input: &str) -> Result<Vec<Row>, TableError> {
    let mut rows = Vec::new();
    let mut row: Row = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut row_started = false;
    let mut line = 1;
    let mut quote_line = 0;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                quote_line = line;
                row_started = true;
            }
            ',' => {
                row.push(std::mem::take(&mut field));
                row_started = true;
            }
            '\r' if chars.peek() == Some(&'\n') => {}
            '\n' | '\r' => {
                line += 1;
                if row_started {
                    row.push(std::mem::take(&mut field));
                }
                rows.push(std::mem::take(&mut row));
                row_started = false;
            }
            _ => {
                field.push(c);
                row_started = true;
            }
        }
    }

    if in_quotes {
        return Err(TableError::UnterminatedQuote { line: quote_line });
    }
    if row_started {
        row.push(field);
        rows.push(row);
    }

    Ok(rows)
}

fn is_numeric(field: &str) -> bool {
    field
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
        && field.parse::<f64>().is_ok()
}

fn needs_quotes(field: &str) -> bool {
    field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
}

fn push_field(out: &mut String, field: &str, style: QuoteStyle) -> bool {
    let quote = match style {
        QuoteStyle::Minimal => needs_quotes(field),
        QuoteStyle::All => true,
        QuoteStyle::NonNumeric => !is_numeric(field) || needs_quotes(field),
        QuoteStyle::None if needs_quotes(field) => return false,
        QuoteStyle::None => false,
    };

    if quote {
        out.push('"');
        out.push_str(&field.replace('"', "\"\""));
        out.push('"');
    } else {
        out.push_str(field);
    }
    true
}

/// Render rows as CSV text.
///
/// # Errors
///
/// Returns [`TableError::UnquotableField`] if the style is
/// [`QuoteStyle::None`] and a field holds a delimiter, a quote or a line
/// break.
pub fn render(rows: &[Row], style: QuoteStyle) -> Result<String, TableError> {
    let mut out = String::new();
    for (index, row) in rows.iter().enumerate() {
        for (i, field) in row.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            if !push_field(&mut out, field, style) {
                return Err(TableError::UnquotableField {
                    row: index + 1,
                    field: field.clone(),
                });
            }
        }
        out.push('\n');
    }
    Ok(out)
}

/// Pad every row with empty fields up to the widest row.
///
/// Returns `true` if any row was extended.
pub fn pad_rows(rows: &mut [Row]) -> bool {
    let width = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut changed = false;
    for row in rows.iter_mut() {
        if row.len() < width {
            row.resize(width, String::new());
            changed = true;
        }
    }
    changed
}

/// Read and parse a CSV file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is malformed.
pub fn read_file(path: &Path) -> Result<Vec<Row>, TableError> {
    let content = fs::read_to_string(path)?;
    parse(&content)
}

/// Write rows to a CSV file atomically.
///
/// # Errors
///
/// Returns an error if a field cannot be rendered in `style` or the file
/// cannot be written. Nothing is written in the first case.
pub fn write_file(path: &Path, rows: &[Row], style: QuoteStyle) -> Result<(), TableError> {
    atomic_write(path, render(rows, style)?)?;
    Ok(())
}

/// Count the records in a CSV file.
///
/// Uses the real parser so quoted line breaks are not miscounted.
/// Returns 0 if the file is missing or malformed.
pub fn count_rows(path: &Path) -> usize {
    read_file(path).map(|rows| rows.len()).unwrap_or(0)
}

/// Pad the rows of a CSV file in place.
///
/// The file is only rewritten when padding changed something, so
/// rectangular files keep their exact bytes.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or written.
pub fn pad_file(path: &Path, style: QuoteStyle) -> Result<bool, TableError> {
    let mut rows = read_file(path)?;
    if !pad_rows(&mut rows) {
        return Ok(false);
    }
    write_file(path, &rows, style)?;
    Ok(true)
}
