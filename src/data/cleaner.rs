//! Record Cleaner Module
//! Binds fixed column positions to semantic fields and filters invalid rows.

use crate::config::AnalysisConfig;
use polars::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Input has {found} columns but the column map needs at least {needed}")]
    TooFewColumns { found: usize, needed: usize },
}

/// One cleaned row of the input table.
///
/// Invariants: `department` is non-empty, `user_count > 0`, and every
/// numeric field parsed successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectRecord {
    pub department: String,
    pub user_count: f64,
    /// Levelized cost of energy, in thousands of COP per kWh.
    pub levelized_cost: f64,
    /// Generation over the project lifetime, kWh.
    pub generation: f64,
    /// Subsidy, in thousands of COP.
    pub subsidy: f64,
    pub solar_fraction: f64,
    pub biomass_fraction: f64,
    pub diesel_fraction: f64,
}

/// Row-drop accounting for one cleaning pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub rows_in: usize,
    pub rows_kept: usize,
    pub dropped_empty_department: usize,
    pub dropped_no_users: usize,
    pub dropped_unparsable: usize,
}

/// Turns the raw string table into strongly typed records.
pub struct RecordCleaner;

impl RecordCleaner {
    /// Apply the row window, bind columns by position, coerce numerics, and
    /// filter rows that violate the record invariants.
    ///
    /// A coercion failure in any numeric field drops the whole row, so no
    /// missing value can ever reach a sum downstream.
    pub fn clean(
        df: &DataFrame,
        config: &AnalysisConfig,
    ) -> Result<(Vec<ProjectRecord>, CleanReport), CleanError> {
        let map = &config.columns;
        let needed = map.max_position() + 1;
        if df.width() < needed {
            return Err(CleanError::TooFewColumns {
                found: df.width(),
                needed,
            });
        }

        // Row window: the source sheets put a sub-header row of units first.
        let window = df.slice(config.data_row_start as i64, config.data_row_count);

        let departments = Self::column_at(&window, map.department)?.clone();
        let users = Self::numeric_at(&window, map.user_count)?;
        let costs = Self::numeric_at(&window, map.levelized_cost)?;
        let generations = Self::numeric_at(&window, map.generation)?;
        let subsidies = Self::numeric_at(&window, map.subsidy)?;
        let solar = Self::numeric_at(&window, map.solar_fraction)?;
        let biomass = Self::numeric_at(&window, map.biomass_fraction)?;
        let diesel = Self::numeric_at(&window, map.diesel_fraction)?;

        let height = window.height();
        let mut records = Vec::with_capacity(height);
        let mut report = CleanReport {
            rows_in: height,
            ..Default::default()
        };

        for i in 0..height {
            let dept_value = departments.get(i)?;
            let department = if dept_value.is_null() {
                String::new()
            } else {
                dept_value
                    .to_string()
                    .trim_matches('"')
                    .trim()
                    .to_string()
            };
            if department.is_empty() {
                report.dropped_empty_department += 1;
                continue;
            }

            let Some(user_count) = Self::value_at(&users, i) else {
                report.dropped_unparsable += 1;
                continue;
            };
            if user_count <= 0.0 {
                report.dropped_no_users += 1;
                continue;
            }

            let (
                Some(levelized_cost),
                Some(generation),
                Some(subsidy),
                Some(solar_fraction),
                Some(biomass_fraction),
                Some(diesel_fraction),
            ) = (
                Self::value_at(&costs, i),
                Self::value_at(&generations, i),
                Self::value_at(&subsidies, i),
                Self::value_at(&solar, i),
                Self::value_at(&biomass, i),
                Self::value_at(&diesel, i),
            )
            else {
                report.dropped_unparsable += 1;
                continue;
            };

            records.push(ProjectRecord {
                department,
                user_count,
                levelized_cost,
                generation,
                subsidy,
                solar_fraction,
                biomass_fraction,
                diesel_fraction,
            });
        }

        report.rows_kept = records.len();
        log::info!(
            "cleaned {} rows: kept {}, dropped {} empty-department, {} zero-user, {} unparsable",
            report.rows_in,
            report.rows_kept,
            report.dropped_empty_department,
            report.dropped_no_users,
            report.dropped_unparsable
        );

        Ok((records, report))
    }

    fn column_at(df: &DataFrame, idx: usize) -> Result<&Column, CleanError> {
        df.select_at_idx(idx).ok_or(CleanError::TooFewColumns {
            found: df.width(),
            needed: idx + 1,
        })
    }

    /// Coerce a column to Float64; unparsable cells become null, matching
    /// the `errors='coerce'` behavior of the source workbook tooling.
    fn numeric_at(df: &DataFrame, idx: usize) -> Result<Float64Chunked, CleanError> {
        let column = Self::column_at(df, idx)?;
        Ok(column.cast(&DataType::Float64)?.f64()?.clone())
    }

    fn value_at(ca: &Float64Chunked, i: usize) -> Option<f64> {
        ca.get(i).filter(|v| !v.is_nan())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AnalysisConfig, ColumnMap};

    /// Build a raw table with the given rows placed at the default mapped
    /// positions (department, users, cost, generation, subsidy, solar,
    /// biomass, diesel); empty strings become null cells.
    fn sheet(rows: &[[&str; 8]]) -> DataFrame {
        let map = ColumnMap::default();
        let width = map.max_position() + 1;
        let mut cells: Vec<Vec<Option<String>>> = vec![vec![None; rows.len()]; width];
        for (r, row) in rows.iter().enumerate() {
            for ((pos, _), value) in map.bindings().iter().zip(row.iter()) {
                if !value.is_empty() {
                    cells[*pos][r] = Some((*value).to_string());
                }
            }
        }
        let columns = cells
            .into_iter()
            .enumerate()
            .map(|(i, values)| Column::new(format!("column_{}", i + 1).into(), values))
            .collect();
        DataFrame::new(columns).unwrap()
    }

    fn full_window() -> AnalysisConfig {
        AnalysisConfig {
            data_row_start: 0,
            data_row_count: usize::MAX,
            ..Default::default()
        }
    }

    #[test]
    fn keeps_valid_rows_with_typed_fields() {
        let df = sheet(&[["Choco", "10", "0.5", "100", "0.2", "1", "0", "0"]]);
        let (records, report) = RecordCleaner::clean(&df, &full_window()).unwrap();
        assert_eq!(report.rows_kept, 1);
        assert_eq!(
            records[0],
            ProjectRecord {
                department: "Choco".to_string(),
                user_count: 10.0,
                levelized_cost: 0.5,
                generation: 100.0,
                subsidy: 0.2,
                solar_fraction: 1.0,
                biomass_fraction: 0.0,
                diesel_fraction: 0.0,
            }
        );
    }

    #[test]
    fn drops_empty_department_and_nonpositive_users() {
        let df = sheet(&[
            ["", "10", "0.5", "100", "0.2", "1", "0", "0"],
            ["   ", "10", "0.5", "100", "0.2", "1", "0", "0"],
            ["Cauca", "0", "0.5", "100", "0.2", "1", "0", "0"],
            ["Cauca", "-3", "0.5", "100", "0.2", "1", "0", "0"],
            ["Cauca", "5", "0.5", "100", "0.2", "1", "0", "0"],
        ]);
        let (records, report) = RecordCleaner::clean(&df, &full_window()).unwrap();
        assert_eq!(report.rows_in, 5);
        assert_eq!(report.dropped_empty_department, 2);
        assert_eq!(report.dropped_no_users, 2);
        assert_eq!(report.rows_kept, 1);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn coercion_failure_drops_the_whole_row() {
        let df = sheet(&[
            ["Narino", "10", "n/a", "100", "0.2", "1", "0", "0"],
            ["Narino", "10", "0.5", "", "0.2", "1", "0", "0"],
            ["Narino", "abc", "0.5", "100", "0.2", "1", "0", "0"],
            ["Narino", "10", "0.5", "100", "0.2", "1", "0", "0"],
        ]);
        let (records, report) = RecordCleaner::clean(&df, &full_window()).unwrap();
        assert_eq!(report.dropped_unparsable, 3);
        assert_eq!(report.rows_kept, 1);
        assert_eq!(records[0].levelized_cost, 0.5);
    }

    #[test]
    fn row_window_is_applied_before_filters() {
        let df = sheet(&[
            ["Units", "", "", "", "", "", "", ""],
            ["Guainia", "8", "0.4", "50", "0.1", "0", "1", "0"],
            ["Vaupes", "4", "0.6", "30", "0.1", "0", "0", "1"],
        ]);
        let config = AnalysisConfig {
            data_row_start: 1,
            data_row_count: 1,
            ..Default::default()
        };
        let (records, report) = RecordCleaner::clean(&df, &config).unwrap();
        assert_eq!(report.rows_in, 1);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].department, "Guainia");
    }

    /// One CSV line with the given fields at the default mapped positions.
    fn csv_line(row: &[&str; 8]) -> String {
        let map = ColumnMap::default();
        let mut cells = vec![String::new(); map.max_position() + 1];
        for ((pos, _), value) in map.bindings().iter().zip(row.iter()) {
            cells[*pos] = (*value).to_string();
        }
        cells.join(",")
    }

    #[test]
    fn csv_pipeline_end_to_end() {
        use crate::agg::Aggregator;
        use crate::data::DataLoader;

        let width = ColumnMap::default().max_position() + 1;
        let lines = [
            vec!["h"; width].join(","),
            vec!["unit"; width].join(","),
            csv_line(&["Choco", "10", "0.5", "100", "0.2", "1", "0", "0"]),
            csv_line(&["Choco", "20", "0.8", "200", "0.4", "0", "1", "0"]),
            csv_line(&["", "5", "0.6", "50", "0.1", "1", "0", "0"]),
        ];
        let dir = std::env::temp_dir().join("gridmix_pipeline_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("projects.csv");
        std::fs::write(&path, lines.join("\n")).unwrap();

        // Default config: the header is dropped by the loader, the
        // sub-header row by the row window.
        let config = AnalysisConfig::default();
        let df = DataLoader::read_table(&path).unwrap();
        let (records, report) = RecordCleaner::clean(&df, &config).unwrap();
        assert_eq!(report.rows_in, 3);
        assert_eq!(report.rows_kept, 2);
        assert_eq!(report.dropped_empty_department, 1);

        let aggregates = Aggregator::aggregate(&records, config.subsidy_ratio);
        assert_eq!(aggregates.len(), 1);
        assert_eq!(aggregates[0].department, "Choco");
        assert!((aggregates[0].weighted_cost - 700.0).abs() < 1e-9);
        assert!((aggregates[0].generation_per_user - 10.0).abs() < 1e-9);
    }

    #[test]
    fn too_few_columns_is_a_typed_error() {
        let df = DataFrame::new(vec![Column::new(
            "column_1".into(),
            vec![Some("x".to_string())],
        )])
        .unwrap();
        let err = RecordCleaner::clean(&df, &full_window()).unwrap_err();
        assert!(matches!(
            err,
            CleanError::TooFewColumns {
                found: 1,
                needed: 34
            }
        ));
    }
}
