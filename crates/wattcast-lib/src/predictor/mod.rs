//! Consumption prediction engine

mod features;
mod forecast;
mod gbm;

pub use features::FeatureExtractor;
pub use forecast::{ForecastIter, ForecastSequencer};
pub use gbm::{ConsumptionModel, ModelManifest, DEFAULT_BUDGET};

use crate::models::FeatureRecord;
use anyhow::Result;

/// Trait for scoring implementations.
///
/// The trainer behind it is an opaque collaborator; callers only ever see
/// feature records in, predicted kWh out.
pub trait Predictor: Send + Sync {
    /// Predict consumption for one feature record. `object_id` is required
    /// by models trained on multi-entity data and ignored otherwise.
    fn predict(&self, object_id: Option<&str>, record: &FeatureRecord) -> Result<f64>;
}
