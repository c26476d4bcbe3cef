//! Integration test: training pipeline end-to-end

use datapilot::data::{CellValue, ColumnInfo, ColumnType, Record};
use datapilot::error::DataPilotError;
use datapilot::training::{
    train_model, train_test_split, validate_config, ModelConfig, ModelType,
};
use std::collections::HashSet;

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn record(pairs: &[(&str, CellValue)]) -> Record {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

/// 60 rows, y = 2x + 3 with x centered in [-1, 1).
fn regression_dataset() -> (Vec<Record>, Vec<ColumnInfo>) {
    let records = (0..60)
        .map(|i| {
            let x = (i as f64 - 30.0) / 30.0;
            record(&[
                ("x", CellValue::Number(x)),
                ("y", CellValue::Number(2.0 * x + 3.0)),
            ])
        })
        .collect();
    let columns = vec![
        ColumnInfo::new("x", ColumnType::Number, false),
        ColumnInfo::new("y", ColumnType::Number, false),
    ];
    (records, columns)
}

/// 60 rows in two well-separated clusters with a binary label.
fn classification_dataset() -> (Vec<Record>, Vec<ColumnInfo>) {
    let records = (0..60)
        .map(|i| {
            let jitter = (i % 5) as f64 * 0.1;
            let (center, label) = if i % 2 == 0 { (-3.0, 0.0) } else { (3.0, 1.0) };
            record(&[
                ("f1", CellValue::Number(center + jitter)),
                ("f2", CellValue::Number(center - jitter)),
                ("label", CellValue::Number(label)),
            ])
        })
        .collect();
    let columns = vec![
        ColumnInfo::new("f1", ColumnType::Number, false),
        ColumnInfo::new("f2", ColumnType::Number, false),
        ColumnInfo::new("label", ColumnType::Number, false),
    ];
    (records, columns)
}

#[test]
fn test_split_determinism() {
    let (test_a, train_a) = train_test_split(100, 0.25, 12345);
    let (test_b, train_b) = train_test_split(100, 0.25, 12345);
    assert_eq!(test_a, test_b);
    assert_eq!(train_a, train_b);
    assert_eq!(test_a.len(), 25);
    assert_eq!(train_a.len(), 75);
}

#[test]
fn test_linear_regression_converges_end_to_end() {
    init_tracing();
    let (records, columns) = regression_dataset();
    let config = ModelConfig::new(ModelType::LinearRegression, "y")
        .with_features(&["x"])
        .with_seed(42);

    let result = train_model(&records, &columns, &config, None).unwrap();
    assert!(result.metrics["r2"] > 0.95, "r2 = {}", result.metrics["r2"]);
    assert_eq!(result.test_accuracy, result.metrics.get("r2").copied());
}

#[test]
fn test_every_trainer_matches_partition_size() {
    init_tracing();
    let (records, columns) = classification_dataset();
    let supervised = [
        ModelType::LinearRegression,
        ModelType::LogisticRegression,
        ModelType::DecisionTree,
        ModelType::RandomForest,
        ModelType::GradientBoosting,
        ModelType::XGBoost,
        ModelType::Svm,
        ModelType::Knn,
        ModelType::NaiveBayes,
        ModelType::NeuralNetwork,
    ];
    for model_type in supervised {
        let config = ModelConfig::new(model_type, "label")
            .with_features(&["f1", "f2"])
            .with_seed(7);
        let result = train_model(&records, &columns, &config, None).unwrap();
        assert_eq!(result.predictions.len(), 12, "{model_type}");
        assert_eq!(
            result.actual_values.as_ref().map(Vec::len),
            Some(12),
            "{model_type}"
        );
        assert_eq!(result.model_type, model_type);
    }

    let config = ModelConfig::new(ModelType::KMeans, "")
        .with_features(&["f1", "f2"])
        .with_seed(7);
    let result = train_model(&records, &columns, &config, None).unwrap();
    assert_eq!(result.predictions.len(), 12);
    assert!(result.actual_values.is_none());
}

#[test]
fn test_classifiers_separate_clusters() {
    let (records, columns) = classification_dataset();
    for model_type in [
        ModelType::LogisticRegression,
        ModelType::Knn,
        ModelType::NaiveBayes,
        ModelType::Svm,
    ] {
        let config = ModelConfig::new(model_type, "label")
            .with_features(&["f1", "f2"])
            .with_seed(3);
        let result = train_model(&records, &columns, &config, None).unwrap();
        assert!(
            result.metrics["accuracy"] > 0.9,
            "{model_type}: {:?}",
            result.metrics
        );
    }
}

#[test]
fn test_feature_importance_keyed_by_features() {
    let (records, columns) = classification_dataset();
    for model_type in [
        ModelType::DecisionTree,
        ModelType::RandomForest,
        ModelType::GradientBoosting,
        ModelType::XGBoost,
        ModelType::NeuralNetwork,
    ] {
        let config = ModelConfig::new(model_type, "label")
            .with_features(&["f1", "f2"])
            .with_seed(3);
        let result = train_model(&records, &columns, &config, None).unwrap();
        let importance = result.feature_importance.expect(model_type.as_str());
        assert_eq!(importance.len(), 2, "{model_type}");
        assert!(importance.contains_key("f1") && importance.contains_key("f2"));
        assert!(importance.values().all(|&v| v >= 0.0), "{model_type}");
    }
}

#[test]
fn test_kmeans_three_blobs() {
    init_tracing();
    let centers = [(0.0, 0.0), (20.0, 20.0), (40.0, 0.0)];
    let records: Vec<Record> = (0..60)
        .map(|i| {
            let (cx, cy) = centers[i % 3];
            let jitter = (i / 3) as f64 * 0.02;
            record(&[
                ("f1", CellValue::Number(cx + jitter)),
                ("f2", CellValue::Number(cy - jitter)),
            ])
        })
        .collect();
    let columns = vec![
        ColumnInfo::new("f1", ColumnType::Number, false),
        ColumnInfo::new("f2", ColumnType::Number, false),
    ];
    let config = ModelConfig::new(ModelType::KMeans, "")
        .with_features(&["f1", "f2"])
        .with_seed(9);

    let result = train_model(&records, &columns, &config, None).unwrap();
    assert_eq!(result.metrics["clusters"], 3.0);
    let labels: HashSet<i64> = result.predictions.iter().map(|&p| p as i64).collect();
    assert_eq!(labels.len(), 3);
    assert!(
        result.metrics["inertia"] < 1.0,
        "inertia = {}",
        result.metrics["inertia"]
    );
}

#[test]
fn test_kmeans_validation_rejects_single_numeric_feature() {
    let records: Vec<Record> = (0..30)
        .map(|i| {
            record(&[
                ("f1", CellValue::Number(i as f64)),
                ("city", CellValue::Text("north".into())),
            ])
        })
        .collect();
    let columns = vec![
        ColumnInfo::new("f1", ColumnType::Number, false),
        ColumnInfo::new("city", ColumnType::Text, false),
    ];
    let config = ModelConfig::new(ModelType::KMeans, "").with_features(&["f1", "city"]);

    let report = validate_config(&records, &columns, &config);
    assert!(!report.is_valid);
    assert!(report.errors.iter().any(|e| e.contains("numeric")));

    let err = train_model(&records, &columns, &config, None).unwrap_err();
    assert!(matches!(err, DataPilotError::ValidationError(_)));
}

#[test]
fn test_result_serializes_as_document() {
    let (records, columns) = regression_dataset();
    let config = ModelConfig::new(ModelType::LinearRegression, "y")
        .with_features(&["x"])
        .with_seed(42);
    let result = train_model(&records, &columns, &config, None).unwrap();

    let json = serde_json::to_string(&result).unwrap();
    assert!(json.contains("\"linear_regression\""));
    let back: datapilot::training::TrainingResult = serde_json::from_str(&json).unwrap();
    assert_eq!(back.predictions, result.predictions);
}

#[test]
fn test_progress_ordering_end_to_end() {
    let (records, columns) = classification_dataset();
    let config = ModelConfig::new(ModelType::RandomForest, "label")
        .with_features(&["f1", "f2"])
        .with_seed(1);

    let mut seen: Vec<f64> = Vec::new();
    {
        let mut callback = |p: f64| seen.push(p);
        train_model(&records, &columns, &config, Some(&mut callback)).unwrap();
    }
    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(*seen.last().unwrap(), 100.0);
}
