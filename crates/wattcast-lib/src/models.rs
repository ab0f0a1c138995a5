//! Core data models for wattcast

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Which CSV layout a training set (and therefore a trained model) uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchemaKind {
    /// `ObjectId,Month,Day,Hour[,TempOutside,TempInside],Consumption`
    MultiEntity,
    /// `Month,Day,Hour,ConsumptionKwh` (single entity, pre-decomposed time)
    Decomposed,
    /// `Timestamp,ConsumptionKwh` (single entity, one instant per row)
    Instant,
}

/// The time component of an observation.
///
/// Exactly one shape is populated per row, depending on the input schema:
/// either the source already decomposed the timestamp into month/day/hour
/// columns, or it carries a single instant that we decompose ourselves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TimeKey {
    Decomposed { month: u32, day: u32, hour: u32 },
    Instant(NaiveDateTime),
}

/// One row of historical or inference input data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub object_id: Option<String>,
    pub time: TimeKey,
    pub temp_outside: Option<f64>,
    pub temp_inside: Option<f64>,
    /// Present on training rows, absent on inference rows.
    pub consumption: Option<f64>,
}

impl Observation {
    /// Observation for a synthesized instant (forecast steps).
    pub fn at_instant(instant: NaiveDateTime) -> Self {
        Self {
            object_id: None,
            time: TimeKey::Instant(instant),
            temp_outside: None,
            temp_inside: None,
            consumption: None,
        }
    }

    /// Observation for an already-decomposed month/day/hour triple.
    pub fn at_parts(month: u32, day: u32, hour: u32) -> Self {
        Self {
            object_id: None,
            time: TimeKey::Decomposed { month, day, hour },
            temp_outside: None,
            temp_inside: None,
            consumption: None,
        }
    }
}

/// Model-ready representation of one observation.
///
/// Constructed fresh per observation at both training and inference time
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub temp_outside: Option<f64>,
    pub temp_inside: Option<f64>,
}
