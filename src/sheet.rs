//! Spreadsheet sources: materialize a named sheet as rows of string cells.
//!
//! Two sources are supported:
//!
//! - [`Workbook`]: an `.xlsx`, `.xlsm`, `.xlsb`, `.xls` or `.ods` file read
//!   through calamine. Read-only.
//! - [`CsvSheets`]: a directory holding one `<sheet name>.csv` per sheet.
//!   Writable, so `setup` can import the published data into it. Sheet files
//!   are standard CSV: quoted cells may span lines and `""` is a literal
//!   quote. The lossy codec in [`crate::csv`] is only for published files.
//!
//! ## Cell Coercion
//!
//! Cells become strings the way the spreadsheet export always has: empty
//! cells, `FALSE` and numeric zero all become `""`; whole floats print
//! without a fractional part (`2800.0` → `"2800"`); everything else uses
//! its display form.
//!
//! Non-whole floats use Rust's shortest round-trip form (`0.1 + 0.2` →
//! `"0.30000000000000004"`), and floats at or above `1e21` print in full
//! rather than in exponent notation. Sheet values never get that large.

use std::path::{Path, PathBuf};

use calamine::{Data, Reader, open_workbook_auto};
use thiserror::Error;

use crate::csv::{self, Row};

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("workbook error: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("CSV sheet error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("sheet not found: {0}")]
    SheetNotFound(String),
    #[error("unsupported sheet source: {}", .0.display())]
    Unsupported(PathBuf),
    #[error("sheet source is read-only: {}", .0.display())]
    ReadOnly(PathBuf),
}

/// Anything that can hand back the materialized rows of a named sheet.
pub trait SheetSource {
    /// All rows of the sheet, header first. A missing sheet is
    /// [`SheetError::SheetNotFound`]; an empty sheet is `Ok(vec![])`.
    fn rows(&self, sheet: &str) -> Result<Vec<Row>, SheetError>;

    /// Replace the sheet's contents. Read-only sources refuse.
    fn write_rows(&self, sheet: &str, rows: &[Row]) -> Result<(), SheetError>;
}

/// Read a sheet and encode it as CSV text.
pub fn sheet_to_csv(source: &dyn SheetSource, sheet: &str) -> Result<String, SheetError> {
    let rows = source.rows(sheet)?;
    Ok(csv::encode(&rows))
}

/// Pick a source implementation for a path: directories are [`CsvSheets`],
/// known workbook extensions are [`Workbook`].
pub fn open_source(path: &Path) -> Result<Box<dyn SheetSource>, SheetError> {
    if path.is_dir() {
        return Ok(Box::new(CsvSheets::new(path)));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());
    match ext.as_deref() {
        Some("xlsx" | "xlsm" | "xlsb" | "xls" | "ods") => Ok(Box::new(Workbook::new(path))),
        _ => Err(SheetError::Unsupported(path.to_path_buf())),
    }
}

// ============================================================================
// Workbook
// ============================================================================

/// A spreadsheet file read through calamine. Opened on each read so the
/// file can be edited between runs.
#[derive(Debug, Clone)]
pub struct Workbook {
    path: PathBuf,
}

impl Workbook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SheetSource for Workbook {
    fn rows(&self, sheet: &str) -> Result<Vec<Row>, SheetError> {
        let mut workbook = open_workbook_auto(&self.path)?;
        let index = workbook
            .sheet_names()
            .iter()
            .position(|name| name == sheet)
            .ok_or_else(|| SheetError::SheetNotFound(sheet.to_string()))?;
        let range = workbook
            .worksheet_range_at(index)
            .ok_or_else(|| SheetError::SheetNotFound(sheet.to_string()))??;

        Ok(range
            .rows()
            .map(|row| row.iter().map(cell_to_string).collect())
            .collect())
    }

    fn write_rows(&self, _sheet: &str, _rows: &[Row]) -> Result<(), SheetError> {
        Err(SheetError::ReadOnly(self.path.clone()))
    }
}

/// Coerce one workbook cell to its exported string form.
pub fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Bool(false) => String::new(),
        Data::Int(0) => String::new(),
        Data::Float(f) if *f == 0.0 => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// CSV directory
// ============================================================================

/// A directory of `<sheet>.csv` files standing in for a workbook.
#[derive(Debug, Clone)]
pub struct CsvSheets {
    dir: PathBuf,
}

impl CsvSheets {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn sheet_path(&self, sheet: &str) -> PathBuf {
        self.dir.join(format!("{sheet}.csv"))
    }
}

impl SheetSource for CsvSheets {
    fn rows(&self, sheet: &str) -> Result<Vec<Row>, SheetError> {
        let path = self.sheet_path(sheet);
        if !path.exists() {
            return Err(SheetError::SheetNotFound(sheet.to_string()));
        }
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;
        reader
            .records()
            .map(|record| -> Result<Row, SheetError> {
                Ok(record?.iter().map(str::to_string).collect())
            })
            .collect()
    }

    fn write_rows(&self, sheet: &str, rows: &[Row]) -> Result<(), SheetError> {
        std::fs::create_dir_all(&self.dir)?;
        let mut writer = ::csv::WriterBuilder::new()
            .flexible(true)
            .from_path(self.sheet_path(sheet))?;
        for row in rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}
