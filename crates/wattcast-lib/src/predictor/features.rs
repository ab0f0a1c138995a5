//! Feature extraction for model training and scoring
//!
//! Maps raw observations onto the flat month/day/hour (+ temperature)
//! record the regressor consumes. Training and inference share this one
//! derivation; the calendar decomposition rule must stay identical on both
//! sides or prediction quality degrades without any visible error.

use crate::models::{FeatureRecord, Observation, TimeKey};
use chrono::{Datelike, Timelike};

/// Extracts model-ready features from raw observations.
///
/// Pure and stateless: safe to call from any number of threads, and two
/// extractions of the same observation always agree.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Derive the feature record for one observation.
    ///
    /// Instants are decomposed by calendar; pre-decomposed triples are
    /// copied verbatim. Range validation belongs to the input-parsing
    /// boundary, not here.
    pub fn extract(&self, observation: &Observation) -> FeatureRecord {
        let (month, day, hour) = match observation.time {
            TimeKey::Decomposed { month, day, hour } => (month, day, hour),
            TimeKey::Instant(instant) => (instant.month(), instant.day(), instant.hour()),
        };

        FeatureRecord {
            month,
            day,
            hour,
            temp_outside: observation.temp_outside,
            temp_inside: observation.temp_inside,
        }
    }
}
