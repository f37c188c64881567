//! CSV encoding and decoding for spreadsheet exports.
//!
//! The encoder produces the same text the spreadsheet export has always
//! published: cells joined with `,`, rows joined with `\n`, no trailing
//! newline. A cell is wrapped in double quotes (with inner quotes doubled)
//! only when it contains a comma, a double quote, or a newline.
//!
//! ## Decoder Quote Handling
//!
//! The decoder is a line-oriented scanner that flips an `in_quotes` flag on
//! every `"`. It does **not** treat a doubled quote inside a quoted field as
//! a literal quote, so a cell such as `say "hi"` encodes to
//! `"say ""hi"""` but decodes back to `say hi`. This matches the CSV files
//! already published by the site, which are read back by the same rule.
//!
//! Because input is split on `\n` first, a quoted cell that contains a
//! newline is decoded as two separate lines.

use indexmap::IndexMap;

/// A single decoded CSV row.
pub type Row = Vec<String>;

/// One data row keyed by header name, in header order.
pub type Record = IndexMap<String, String>;

/// Whether a cell needs quote-wrapping on output.
fn needs_quotes(cell: &str) -> bool {
    cell.contains(',') || cell.contains('"') || cell.contains('\n')
}

/// Encode one cell, quoting and doubling inner quotes when required.
pub fn encode_cell(cell: &str) -> String {
    if needs_quotes(cell) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// Encode a grid of cells as CSV text.
pub fn encode<R, C>(rows: &[R]) -> String
where
    R: AsRef<[C]>,
    C: AsRef<str>,
{
    rows.iter()
        .map(|row| {
            row.as_ref()
                .iter()
                .map(|cell| encode_cell(cell.as_ref()))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Decode a single line into fields.
///
/// An empty line yields one empty field.
pub fn decode_line(line: &str) -> Row {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    fields.push(current);
    fields
}

/// Decode CSV text into rows, one per `\n`-separated line.
pub fn decode(text: &str) -> Vec<Row> {
    text.split('\n').map(decode_line).collect()
}

/// True when every cell in the row is empty or whitespace.
pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

/// Split CSV text into header-keyed records.
///
/// The first line is the header (field names trimmed). Each later line is
/// trimmed; blank lines are skipped, and so are lines that decode to fewer
/// fields than the header. Extra trailing fields are ignored.
pub fn records(text: &str) -> Vec<Record> {
    let mut lines = text.split('\n');
    let header: Vec<String> = match lines.next() {
        Some(line) => decode_line(line)
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => return Vec::new(),
    };

    let mut out = Vec::new();
    for (index, line) in lines.enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let cells = decode_line(line);
        if cells.len() < header.len() {
            tracing::debug!(
                line = index + 2,
                fields = cells.len(),
                expected = header.len(),
                "skipping short row"
            );
            continue;
        }
        out.push(header.iter().cloned().zip(cells).collect());
    }
    out
}
