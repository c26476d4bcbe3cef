//! Preprocessing pipeline implementation

use super::{
    ColumnScaling, MissingStrategy, Normalization, PreprocessedData, PreprocessingConfig,
};
use crate::analysis::profiler::{compute_stats, nearest_rank};
use crate::analysis::relationships::detect_outliers;
use crate::data::{column_values, CellValue, ColumnInfo, ColumnType, Record};
use crate::error::Result;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Runs the fixed pipeline: missing-value resolution, outlier-row removal,
/// categorical encoding, numeric scaling.
#[derive(Debug, Clone)]
pub struct DataPreprocessor {
    config: PreprocessingConfig,
}

impl DataPreprocessor {
    pub fn new(config: PreprocessingConfig) -> Self {
        Self { config }
    }

    /// Transforms the dataset according to the configuration. The input is
    /// never mutated; the output carries the artifacts needed to replay the
    /// same transform.
    pub fn run(&self, records: &[Record], columns: &[ColumnInfo]) -> Result<PreprocessedData> {
        let mut rows: Vec<Record> = records.to_vec();
        let mut removed_rows = 0usize;

        removed_rows += self.resolve_missing(&mut rows, columns);
        debug!(rows = rows.len(), removed = removed_rows, "missing values resolved");

        if self.config.remove_outliers {
            removed_rows += self.remove_outlier_rows(&mut rows, columns);
            debug!(rows = rows.len(), removed = removed_rows, "outlier rows removed");
        }

        let encodings = if self.config.encode_categories {
            self.encode_categories(&mut rows, columns)
        } else {
            HashMap::new()
        };

        let scaling = self.scale(&mut rows, columns, &encodings);
        debug!(
            encoded = encodings.len(),
            scaled = scaling.len(),
            "preprocessing complete"
        );

        Ok(PreprocessedData {
            records: rows,
            encodings,
            scaling,
            removed_rows,
        })
    }

    /// Stage 1. Returns the number of rows dropped (only under `Remove`).
    fn resolve_missing(&self, rows: &mut Vec<Record>, columns: &[ColumnInfo]) -> usize {
        if self.config.missing_strategy == MissingStrategy::Remove {
            let before = rows.len();
            rows.retain(|row| {
                columns.iter().all(|c| {
                    row.get(&c.name)
                        .map(|v| !v.is_missing())
                        .unwrap_or(false)
                })
            });
            return before - rows.len();
        }

        for column in columns {
            let values = column_values(rows, &column.name);
            let fill = self.fill_value(&values, column);
            let Some(fill) = fill else { continue };
            for row in rows.iter_mut() {
                let missing = row
                    .get(&column.name)
                    .map(|v| v.is_missing())
                    .unwrap_or(true);
                if missing {
                    row.insert(column.name.clone(), fill.clone());
                }
            }
        }
        0
    }

    /// Replacement value for one column under the configured strategy.
    /// Non-numeric columns always fall back to the mode.
    fn fill_value(&self, values: &[CellValue], column: &ColumnInfo) -> Option<CellValue> {
        let numeric = column.column_type == ColumnType::Number;
        match (self.config.missing_strategy, numeric) {
            (MissingStrategy::Mean, true) => {
                let valid: Vec<f64> = values.iter().filter_map(CellValue::as_finite_f64).collect();
                (!valid.is_empty())
                    .then(|| CellValue::Number(valid.iter().sum::<f64>() / valid.len() as f64))
            }
            (MissingStrategy::Median, true) => {
                let mut valid: Vec<f64> =
                    values.iter().filter_map(CellValue::as_finite_f64).collect();
                if valid.is_empty() {
                    return None;
                }
                valid.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
                Some(CellValue::Number(nearest_rank(&valid, 0.5)))
            }
            _ => compute_stats(values, column.column_type).mode,
        }
    }

    /// Stage 2: drops rows holding a value outside any numeric column's IQR
    /// fences, each column judged independently against post-imputation data.
    fn remove_outlier_rows(&self, rows: &mut Vec<Record>, columns: &[ColumnInfo]) -> usize {
        let mut doomed: HashSet<usize> = HashSet::new();

        for column in columns.iter().filter(|c| c.column_type == ColumnType::Number) {
            let mut positions = Vec::new();
            let mut values = Vec::new();
            for (i, row) in rows.iter().enumerate() {
                if let Some(v) = row.get(&column.name).and_then(CellValue::as_finite_f64) {
                    positions.push(i);
                    values.push(v);
                }
            }
            let report = detect_outliers(&values);
            for (&v, &row_idx) in values.iter().zip(positions.iter()) {
                if v < report.lower_bound || v > report.upper_bound {
                    doomed.insert(row_idx);
                }
            }
        }

        let before = rows.len();
        let mut index = 0usize;
        rows.retain(|_| {
            let keep = !doomed.contains(&index);
            index += 1;
            keep
        });
        before - rows.len()
    }

    /// Stage 3: replaces text categories with integer codes assigned in
    /// first-seen order. Missing cells are left untouched so codes never
    /// represent "missing".
    fn encode_categories(
        &self,
        rows: &mut [Record],
        columns: &[ColumnInfo],
    ) -> HashMap<String, HashMap<String, i64>> {
        let mut encodings = HashMap::new();

        for column in columns.iter().filter(|c| c.column_type == ColumnType::Text) {
            let mut table: HashMap<String, i64> = HashMap::new();
            for row in rows.iter_mut() {
                let Some(cell) = row.get(&column.name) else { continue };
                if cell.is_missing() {
                    continue;
                }
                let key = cell.display_key();
                let next = table.len() as i64;
                let code = *table.entry(key).or_insert(next);
                row.insert(column.name.clone(), CellValue::Number(code as f64));
            }
            encodings.insert(column.name.clone(), table);
        }

        encodings
    }

    /// Stage 4: scales every column that is numeric at this point (original
    /// number columns plus freshly encoded ones). Constant columns map to 0
    /// through the `range > 0` / `std > 0` guards.
    fn scale(
        &self,
        rows: &mut [Record],
        columns: &[ColumnInfo],
        encodings: &HashMap<String, HashMap<String, i64>>,
    ) -> HashMap<String, ColumnScaling> {
        let mut scaling = HashMap::new();
        if self.config.normalization == Normalization::None {
            return scaling;
        }

        for column in columns {
            let numeric_now = column.column_type == ColumnType::Number
                || encodings.contains_key(&column.name);
            if !numeric_now {
                continue;
            }

            let valid: Vec<f64> = rows
                .iter()
                .filter_map(|r| r.get(&column.name).and_then(CellValue::as_finite_f64))
                .collect();
            if valid.is_empty() {
                continue;
            }

            let n = valid.len() as f64;
            let min = valid.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = valid.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            let mean = valid.iter().sum::<f64>() / n;
            let std = (valid.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n).sqrt();
            scaling.insert(column.name.clone(), ColumnScaling { min, max, mean, std });

            for row in rows.iter_mut() {
                let Some(v) = row.get(&column.name).and_then(CellValue::as_finite_f64) else {
                    continue;
                };
                let scaled = match self.config.normalization {
                    Normalization::MinMax => {
                        let range = max - min;
                        if range > 0.0 {
                            (v - min) / range
                        } else {
                            0.0
                        }
                    }
                    Normalization::ZScore => {
                        if std > 0.0 {
                            (v - mean) / std
                        } else {
                            0.0
                        }
                    }
                    Normalization::None => v,
                };
                row.insert(column.name.clone(), CellValue::Number(scaled));
            }
        }

        scaling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number_column(name: &str) -> ColumnInfo {
        ColumnInfo::new(name, ColumnType::Number, true)
    }

    fn text_column(name: &str) -> ColumnInfo {
        ColumnInfo::new(name, ColumnType::Text, true)
    }

    fn rows_of(name: &str, cells: Vec<CellValue>) -> Vec<Record> {
        cells
            .into_iter()
            .map(|v| {
                let mut r = Record::new();
                r.insert(name.to_string(), v);
                r
            })
            .collect()
    }

    #[test]
    fn test_mean_imputation() {
        let records = rows_of(
            "a",
            vec![CellValue::Number(1.0), CellValue::Null, CellValue::Number(3.0)],
        );
        let prep = DataPreprocessor::new(
            PreprocessingConfig::new().with_missing_strategy(MissingStrategy::Mean),
        );
        let out = prep.run(&records, &[number_column("a")]).unwrap();
        assert_eq!(out.records[1]["a"], CellValue::Number(2.0));
        assert_eq!(out.removed_rows, 0);
    }

    #[test]
    fn test_median_imputation() {
        let records = rows_of(
            "a",
            vec![
                CellValue::Number(1.0),
                CellValue::Number(2.0),
                CellValue::Number(9.0),
                CellValue::Null,
            ],
        );
        let prep = DataPreprocessor::new(
            PreprocessingConfig::new().with_missing_strategy(MissingStrategy::Median),
        );
        let out = prep.run(&records, &[number_column("a")]).unwrap();
        // nearest-rank median of [1,2,9] is index floor(3*0.5)=1 -> 2
        assert_eq!(out.records[3]["a"], CellValue::Number(2.0));
    }

    #[test]
    fn test_remove_strategy_counts_rows() {
        let records = rows_of(
            "a",
            vec![CellValue::Number(1.0), CellValue::Null, CellValue::Number(3.0)],
        );
        let prep = DataPreprocessor::new(
            PreprocessingConfig::new().with_missing_strategy(MissingStrategy::Remove),
        );
        let out = prep.run(&records, &[number_column("a")]).unwrap();
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.removed_rows, 1);
    }

    #[test]
    fn test_mode_imputation_on_text() {
        let records = rows_of(
            "c",
            vec![
                CellValue::Text("a".into()),
                CellValue::Text("b".into()),
                CellValue::Text("a".into()),
                CellValue::Null,
            ],
        );
        let prep = DataPreprocessor::new(
            PreprocessingConfig::new()
                .with_missing_strategy(MissingStrategy::Mode)
                .with_encode_categories(false),
        );
        let out = prep.run(&records, &[text_column("c")]).unwrap();
        assert_eq!(out.records[3]["c"], CellValue::Text("a".into()));
    }

    #[test]
    fn test_outlier_row_removal() {
        let mut cells: Vec<CellValue> = (1..=9).map(|v| CellValue::Number(v as f64)).collect();
        cells.push(CellValue::Number(100.0));
        let records = rows_of("a", cells);
        let prep = DataPreprocessor::new(PreprocessingConfig::new().with_remove_outliers(true));
        let out = prep.run(&records, &[number_column("a")]).unwrap();
        assert_eq!(out.records.len(), 9);
        assert_eq!(out.removed_rows, 1);
    }

    #[test]
    fn test_encoding_first_seen_order() {
        let records = rows_of(
            "c",
            vec![
                CellValue::Text("red".into()),
                CellValue::Text("blue".into()),
                CellValue::Text("red".into()),
                CellValue::Text("green".into()),
            ],
        );
        let prep = DataPreprocessor::new(PreprocessingConfig::new());
        let out = prep.run(&records, &[text_column("c")]).unwrap();
        let table = &out.encodings["c"];
        assert_eq!(table["red"], 0);
        assert_eq!(table["blue"], 1);
        assert_eq!(table["green"], 2);
        assert_eq!(out.records[2]["c"], CellValue::Number(0.0));
    }

    #[test]
    fn test_zscore_scaling() {
        let records = rows_of(
            "a",
            (1..=10).map(|v| CellValue::Number(v as f64)).collect(),
        );
        let prep = DataPreprocessor::new(
            PreprocessingConfig::new().with_normalization(Normalization::ZScore),
        );
        let out = prep.run(&records, &[number_column("a")]).unwrap();
        let scaled: Vec<f64> = out
            .records
            .iter()
            .map(|r| r["a"].coerce_f64())
            .collect();
        let mean = scaled.iter().sum::<f64>() / scaled.len() as f64;
        let std = (scaled.iter().map(|v| (v - mean).powi(2)).sum::<f64>()
            / scaled.len() as f64)
            .sqrt();
        assert!(mean.abs() < 1e-9);
        assert!((std - 1.0).abs() < 1e-9);
        assert!(out.scaling.contains_key("a"));
    }

    #[test]
    fn test_constant_column_scales_to_zero() {
        let records = rows_of("a", vec![CellValue::Number(5.0); 6]);
        let prep = DataPreprocessor::new(
            PreprocessingConfig::new().with_normalization(Normalization::ZScore),
        );
        let out = prep.run(&records, &[number_column("a")]).unwrap();
        assert!(out
            .records
            .iter()
            .all(|r| r["a"] == CellValue::Number(0.0)));
    }

    #[test]
    fn test_minmax_scaling_range() {
        let records = rows_of(
            "a",
            vec![
                CellValue::Number(10.0),
                CellValue::Number(20.0),
                CellValue::Number(30.0),
            ],
        );
        let prep = DataPreprocessor::new(
            PreprocessingConfig::new().with_normalization(Normalization::MinMax),
        );
        let out = prep.run(&records, &[number_column("a")]).unwrap();
        assert_eq!(out.records[0]["a"], CellValue::Number(0.0));
        assert_eq!(out.records[1]["a"], CellValue::Number(0.5));
        assert_eq!(out.records[2]["a"], CellValue::Number(1.0));
    }
}
