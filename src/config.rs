//! Analysis Configuration Module
//! Declarative column mapping and run parameters for the pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Zero-based column positions of the semantic fields in the source sheet.
///
/// The source workbooks identify fields by position, not by header name: the
/// headers carry merged and duplicated labels that cannot be matched
/// reliably, so the mapping is kept as one declarative table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    pub department: usize,
    pub user_count: usize,
    pub levelized_cost: usize,
    pub generation: usize,
    pub subsidy: usize,
    pub solar_fraction: usize,
    pub biomass_fraction: usize,
    pub diesel_fraction: usize,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            department: 5,       // F
            user_count: 8,       // I
            levelized_cost: 33,  // AH, mCOP/kWh
            generation: 29,      // AD, kWh
            subsidy: 20,         // U, mCOP
            solar_fraction: 23,  // X
            biomass_fraction: 24, // Y
            diesel_fraction: 25, // Z
        }
    }
}

impl ColumnMap {
    /// (position, field name) pairs in record-field order.
    pub fn bindings(&self) -> [(usize, &'static str); 8] {
        [
            (self.department, "department"),
            (self.user_count, "user_count"),
            (self.levelized_cost, "levelized_cost"),
            (self.generation, "generation"),
            (self.subsidy, "subsidy"),
            (self.solar_fraction, "solar_fraction"),
            (self.biomass_fraction, "biomass_fraction"),
            (self.diesel_fraction, "diesel_fraction"),
        ]
    }

    /// Highest referenced position; the sheet needs at least this + 1 columns.
    pub fn max_position(&self) -> usize {
        self.bindings()
            .iter()
            .map(|(pos, _)| *pos)
            .max()
            .unwrap_or(0)
    }
}

/// Parameters of one analysis run, passed explicitly into the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub columns: ColumnMap,
    /// Fraction of cost covered by subsidy rather than charged to the user.
    pub subsidy_ratio: f64,
    /// Data rows skipped after the header; the source sheets put a
    /// sub-header row of units first.
    pub data_row_start: usize,
    /// Number of data rows consumed after the skip.
    pub data_row_count: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMap::default(),
            subsidy_ratio: 0.5,
            data_row_start: 1,
            data_row_count: 1301,
        }
    }
}

impl AnalysisConfig {
    /// Load overrides from a JSON file, falling back to defaults when the
    /// file is absent or malformed.
    pub fn load_or_default(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(config) => {
                    log::info!("loaded analysis config from {}", path.display());
                    config
                }
                Err(e) => {
                    log::warn!("ignoring malformed config {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }
}
