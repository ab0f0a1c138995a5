//! Core library for the wattcast power-consumption forecaster
//!
//! This crate provides:
//! - Training data loading with CSV schema auto-detection
//! - Temporal feature extraction shared by training and scoring
//! - A gradient-boosting consumption model and its persistence
//! - Hourly forecast sequencing
//! - The stdin scoring protocol and known-object whitelist

pub mod dataset;
pub mod error;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod protocol;
pub mod whitelist;

pub use error::RequestParseError;
pub use models::*;
pub use predictor::{
    ConsumptionModel, FeatureExtractor, ForecastSequencer, ModelManifest, Predictor,
    DEFAULT_BUDGET,
};
pub use whitelist::ObjectWhitelist;
