//! Data module - spreadsheet loading and record cleaning

mod cleaner;
mod loader;

pub use cleaner::{CleanError, CleanReport, ProjectRecord, RecordCleaner};
pub use loader::{DataLoader, LoaderError};
