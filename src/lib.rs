//! DataPilot - exploratory analysis and small-scale model training
//!
//! This crate profiles tabular record datasets (type inference, descriptive
//! statistics, correlation, outlier and trend detection, rule-based insights),
//! prepares them for modeling (imputation, outlier filtering, categorical
//! encoding, scaling) and trains one of eleven small in-memory model families
//! behind a single dispatching engine.

pub mod analysis;
pub mod data;
pub mod error;
pub mod preprocessing;
pub mod training;

pub use error::{DataPilotError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::analysis::{
        analyze_dataset, generate_insights, DatasetAnalysis, Insight, InsightKind, Severity,
    };
    pub use crate::data::{CellValue, ColumnInfo, ColumnStats, ColumnType, Record};
    pub use crate::error::{DataPilotError, Result};
    pub use crate::preprocessing::{
        DataPreprocessor, MissingStrategy, Normalization, PreprocessedData, PreprocessingConfig,
    };
    pub use crate::training::{
        train_model, validate_config, ConfigValidation, ModelConfig, ModelType, TrainingResult,
    };
}
