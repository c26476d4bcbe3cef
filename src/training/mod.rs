//! Model training module
//!
//! Provides the deterministic train/test splitter, configuration validation,
//! the dispatching engine and the eleven model family trainers:
//! - Linear and logistic regression
//! - Decision tree (degenerate majority stub) and Random Forest
//! - Gradient boosting (stumps) and xgboost-style boosted trees
//! - Support Vector Machine
//! - K-Nearest Neighbors
//! - Gaussian Naive Bayes
//! - Neural network (frozen random projection + linear head)
//! - K-means clustering

mod config;
mod decision_tree;
mod engine;
mod gradient_boosting;
mod kmeans;
mod knn;
mod linear;
mod metrics;
mod naive_bayes;
mod neural_network;
mod random_forest;
mod split;
mod svm;
mod xgboost;

pub use config::{validate_config, ConfigValidation, ModelConfig, ModelType};
pub use engine::train_model;
pub use metrics::{Progress, TrainingResult};
pub use split::{train_test_split, Lcg};
