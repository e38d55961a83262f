//! Spreadsheet Loader Module
//! Reads CSV input with Polars and Excel workbooks with calamine.
//!
//! Both paths produce a headerless DataFrame of string cells so that the
//! cleaner owns all numeric coercion; schema inference is disabled on
//! purpose.

use calamine::{open_workbook_auto, Reader};
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to read table: {0}")]
    Table(#[from] PolarsError),
    #[error("Failed to open workbook: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("Workbook contains no worksheets")]
    EmptyWorkbook,
    #[error("Unsupported input format: {0}")]
    UnsupportedFormat(String),
}

/// Handles spreadsheet loading for the analysis pipeline.
pub struct DataLoader;

impl DataLoader {
    /// Read a spreadsheet into a raw string table, dispatching on extension.
    /// The header row is dropped; all remaining rows are data rows.
    pub fn read_table(path: &Path) -> Result<DataFrame, LoaderError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        match extension.as_str() {
            "csv" => Self::read_csv(path),
            "xlsx" | "xls" | "xlsb" | "ods" => Self::read_workbook(path),
            other => Err(LoaderError::UnsupportedFormat(other.to_string())),
        }
    }

    fn read_csv(path: &Path) -> Result<DataFrame, LoaderError> {
        // Headerless read with inference off: positions identify fields, and
        // every cell must arrive as a string for the cleaner to coerce.
        let df = LazyCsvReader::new(path)
            .with_has_header(false)
            .with_infer_schema_length(Some(0))
            .with_ignore_errors(true)
            .finish()?
            .collect()?;

        // Drop the header row; the row window counts data rows only.
        Ok(df.slice(1, df.height().saturating_sub(1)))
    }

    fn read_workbook(path: &Path) -> Result<DataFrame, LoaderError> {
        let mut workbook = open_workbook_auto(path)?;
        let sheet = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or(LoaderError::EmptyWorkbook)?;
        let range = workbook
            .worksheet_range(&sheet)
            .ok_or(LoaderError::EmptyWorkbook)??;

        let width = range.width();
        let rows: Vec<_> = range.rows().skip(1).collect(); // skip header row

        let columns: Vec<Column> = (0..width)
            .map(|c| {
                let cells: Vec<Option<String>> = rows
                    .iter()
                    .map(|row| row.get(c).and_then(Self::cell_to_string))
                    .collect();
                Column::new(format!("column_{}", c + 1).into(), cells)
            })
            .collect();

        Ok(DataFrame::new(columns)?)
    }

    /// Stringify one workbook cell; empty and error cells become null.
    fn cell_to_string(cell: &calamine::DataType) -> Option<String> {
        match cell {
            calamine::DataType::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            calamine::DataType::Float(f) => Some(f.to_string()),
            calamine::DataType::Int(i) => Some(i.to_string()),
            calamine::DataType::DateTime(f) => Some(f.to_string()),
            calamine::DataType::Bool(b) => Some((*b as i64).to_string()),
            _ => None,
        }
    }
}
