//! Gradient-boosting consumption model
//!
//! Thin wrapper around the `perpetual` booster: turns observations into
//! the fixed-layout numeric matrix the trainer expects, and persists the
//! fitted booster together with the manifest describing that layout so
//! scoring always rebuilds rows the same way training did.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use perpetual::objective::Objective;
use perpetual::{Matrix, PerpetualBooster};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{FeatureExtractor, Predictor};
use crate::dataset::TrainingSet;
use crate::models::{FeatureRecord, Observation, SchemaKind};

/// Default fitting budget handed to the booster.
pub const DEFAULT_BUDGET: f32 = 0.5;

/// Describes how a trained model's feature matrix is laid out.
///
/// Persisted inside the model artifact; scoring consults it to rebuild
/// rows in exactly the training-time column order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelManifest {
    pub schema: SchemaKind,
    /// Column names in matrix order.
    pub feature_names: Vec<String>,
    /// Categorical vocabulary for the object-id column, in first-seen
    /// order. Empty for single-entity schemas.
    pub object_ids: Vec<String>,
    pub trained_rows: usize,
    pub budget: f32,
}

impl ModelManifest {
    fn for_training_set(set: &TrainingSet, budget: f32) -> Result<Self> {
        if set.is_empty() {
            bail!("training set is empty");
        }
        let (feature_names, object_ids) = match set.schema {
            SchemaKind::MultiEntity => (
                vec![
                    "object_id".to_string(),
                    "month".to_string(),
                    "day".to_string(),
                    "hour".to_string(),
                    "temp_outside".to_string(),
                    "temp_inside".to_string(),
                ],
                set.distinct_object_ids(),
            ),
            SchemaKind::Decomposed | SchemaKind::Instant => (
                vec!["month".to_string(), "day".to_string(), "hour".to_string()],
                Vec::new(),
            ),
        };
        Ok(Self {
            schema: set.schema,
            feature_names,
            object_ids,
            trained_rows: set.len(),
            budget,
        })
    }

    fn has_temperatures(&self) -> bool {
        self.schema == SchemaKind::MultiEntity
    }
}

/// A trained consumption regressor plus the manifest needed to score with it.
#[derive(Serialize, Deserialize)]
pub struct ConsumptionModel {
    manifest: ModelManifest,
    booster: PerpetualBooster,
}

impl ConsumptionModel {
    /// Fit a squared-loss booster on the whole training set.
    pub fn train(set: &TrainingSet, budget: f32) -> Result<Self> {
        let manifest = ModelManifest::for_training_set(set, budget)?;
        let extractor = FeatureExtractor::new();

        let mut y = Vec::with_capacity(set.len());
        let mut rows = Vec::with_capacity(set.len());
        for observation in &set.observations {
            y.push(
                observation
                    .consumption
                    .context("training observation has no consumption value")?,
            );
            rows.push(feature_row(
                &manifest,
                observation.object_id.as_deref(),
                &extractor.extract(observation),
            )?);
        }

        let cols = manifest.feature_names.len();
        let flat = to_column_major(&rows, cols);
        let matrix = Matrix::new(&flat, rows.len(), cols);

        // The object-id column holds vocabulary indices, not magnitudes.
        let categorical = match manifest.schema {
            SchemaKind::MultiEntity => Some(HashSet::from([0usize])),
            _ => None,
        };

        info!(
            rows = rows.len(),
            features = cols,
            budget,
            "fitting consumption model"
        );
        let mut booster = PerpetualBooster::default().set_objective(Objective::SquaredLoss);
        booster
            .fit(
                &matrix,
                &y,
                budget,
                None,
                None,
                None,
                categorical,
                None,
                None,
                None,
                None,
            )
            .context("booster fit failed")?;

        Ok(Self { manifest, booster })
    }

    /// Score one feature record.
    pub fn predict_record(&self, object_id: Option<&str>, record: &FeatureRecord) -> Result<f64> {
        let row = feature_row(&self.manifest, object_id, record)?;
        let matrix = Matrix::new(&row, 1, row.len());
        self.booster
            .predict(&matrix, false)
            .into_iter()
            .next()
            .context("booster returned no prediction")
    }

    /// Score a batch of observations in one matrix pass.
    pub fn predict_many(&self, observations: &[Observation]) -> Result<Vec<f64>> {
        let extractor = FeatureExtractor::new();
        let mut rows = Vec::with_capacity(observations.len());
        for observation in observations {
            rows.push(feature_row(
                &self.manifest,
                observation.object_id.as_deref(),
                &extractor.extract(observation),
            )?);
        }
        let cols = self.manifest.feature_names.len();
        let flat = to_column_major(&rows, cols);
        let matrix = Matrix::new(&flat, rows.len(), cols);
        debug!(rows = rows.len(), "scoring batch");
        Ok(self.booster.predict(&matrix, true))
    }

    pub fn manifest(&self) -> &ModelManifest {
        &self.manifest
    }

    pub fn schema(&self) -> SchemaKind {
        self.manifest.schema
    }

    /// Whether scoring requests must carry an object id.
    pub fn expects_object_id(&self) -> bool {
        self.manifest.schema == SchemaKind::MultiEntity
    }

    /// Persist manifest and booster as a single JSON artifact.
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string(self).context("failed to serialize model")?;
        fs::write(path, raw)
            .with_context(|| format!("failed to write model to {}", path.display()))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read model from {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse model file {}", path.display()))
    }
}

impl Predictor for ConsumptionModel {
    fn predict(&self, object_id: Option<&str>, record: &FeatureRecord) -> Result<f64> {
        self.predict_record(object_id, record)
    }
}

/// Build one matrix row in manifest column order.
///
/// Absent temperatures become NaN, which the booster treats as missing.
fn feature_row(
    manifest: &ModelManifest,
    object_id: Option<&str>,
    record: &FeatureRecord,
) -> Result<Vec<f64>> {
    let mut row = Vec::with_capacity(manifest.feature_names.len());
    if manifest.schema == SchemaKind::MultiEntity {
        let id = object_id.context("this model requires an object id")?;
        let index = manifest
            .object_ids
            .iter()
            .position(|known| known == id)
            .with_context(|| format!("object id '{id}' was not seen during training"))?;
        row.push(index as f64);
    }
    row.push(f64::from(record.month));
    row.push(f64::from(record.day));
    row.push(f64::from(record.hour));
    if manifest.has_temperatures() {
        row.push(record.temp_outside.unwrap_or(f64::NAN));
        row.push(record.temp_inside.unwrap_or(f64::NAN));
    }
    Ok(row)
}

fn to_column_major(rows: &[Vec<f64>], cols: usize) -> Vec<f64> {
    let mut flat = Vec::with_capacity(rows.len() * cols);
    for col in 0..cols {
        for row in rows {
            flat.push(row[col]);
        }
    }
    flat
}
