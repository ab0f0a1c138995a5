//! Training data loading
//!
//! Reads the historical consumption CSV and auto-detects which of the
//! schema variants is in use from the header row. Any malformed training
//! row aborts the load; partial training sets are never returned.

use std::collections::HashSet;
use std::fs::File;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::NaiveDateTime;
use csv::StringRecord;
use tracing::info;

use crate::models::{Observation, SchemaKind, TimeKey};

// Header aliases observed across the schema variants.
const OBJECT_ID_NAMES: &[&str] = &["ObjectId"];
const MONTH_NAMES: &[&str] = &["Month", "Timestamp_Month"];
const DAY_NAMES: &[&str] = &["Day", "Timestamp_Day"];
const HOUR_NAMES: &[&str] = &["Hour", "Timestamp_Hour"];
const TIMESTAMP_NAMES: &[&str] = &["Timestamp"];
const TEMP_OUTSIDE_NAMES: &[&str] = &["TempOutside", "Temp_outside"];
const TEMP_INSIDE_NAMES: &[&str] = &["TempInside", "Temp_inside"];
const CONSUMPTION_NAMES: &[&str] = &["Consumption", "ConsumptionKwh", "Consumption_kWh"];

/// A fully loaded, schema-tagged set of training observations.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub schema: SchemaKind,
    pub observations: Vec<Observation>,
}

impl TrainingSet {
    /// Load a header-bearing CSV file, detecting the schema from its
    /// column names.
    pub fn from_csv(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open training data {}", path.display()))?;
        let mut reader = csv::Reader::from_reader(file);
        let headers = reader
            .headers()
            .context("failed to read CSV header row")?
            .clone();
        let columns = Columns::detect(&headers)?;

        let mut observations = Vec::new();
        for (i, result) in reader.records().enumerate() {
            // Row numbers in diagnostics are 1-based and skip the header.
            let row = i + 2;
            let record = result.with_context(|| format!("failed to read CSV row {row}"))?;
            observations.push(
                columns
                    .observation(&record)
                    .with_context(|| format!("bad training data at row {row}"))?,
            );
        }

        info!(
            rows = observations.len(),
            schema = ?columns.schema,
            "loaded training data"
        );
        Ok(Self {
            schema: columns.schema,
            observations,
        })
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Distinct object ids in first-seen order.
    pub fn distinct_object_ids(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        for observation in &self.observations {
            if let Some(id) = &observation.object_id {
                if seen.insert(id.clone()) {
                    ids.push(id.clone());
                }
            }
        }
        ids
    }

    /// Split off every `every`-th row as a holdout set for evaluation.
    /// `every < 2` keeps everything in the training part.
    pub fn split_holdout(&self, every: usize) -> (TrainingSet, TrainingSet) {
        let mut train = Vec::new();
        let mut holdout = Vec::new();
        for (i, observation) in self.observations.iter().cloned().enumerate() {
            if every >= 2 && i % every == every - 1 {
                holdout.push(observation);
            } else {
                train.push(observation);
            }
        }
        (
            TrainingSet {
                schema: self.schema,
                observations: train,
            },
            TrainingSet {
                schema: self.schema,
                observations: holdout,
            },
        )
    }
}

/// Parse a timestamp in either of the supported text layouts.
pub fn parse_instant(raw: &str) -> Result<NaiveDateTime> {
    let trimmed = raw.trim();
    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S"))
        .with_context(|| format!("invalid timestamp '{raw}'"))
}

/// Resolved column positions for one detected schema.
struct Columns {
    schema: SchemaKind,
    time: TimeColumns,
    object_id: Option<usize>,
    temp_outside: Option<usize>,
    temp_inside: Option<usize>,
    consumption: usize,
}

enum TimeColumns {
    Instant(usize),
    Decomposed { month: usize, day: usize, hour: usize },
}

impl Columns {
    fn detect(headers: &StringRecord) -> Result<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim().eq_ignore_ascii_case(n)))
        };

        let consumption = find(CONSUMPTION_NAMES)
            .context("CSV header has no consumption column")?;
        let object_id = find(OBJECT_ID_NAMES);

        let time = match (object_id, find(TIMESTAMP_NAMES)) {
            // An object-id column forces the decomposed layout even if a
            // stray timestamp column is also present.
            (None, Some(timestamp)) => TimeColumns::Instant(timestamp),
            _ => match (find(MONTH_NAMES), find(DAY_NAMES), find(HOUR_NAMES)) {
                (Some(month), Some(day), Some(hour)) => {
                    TimeColumns::Decomposed { month, day, hour }
                }
                _ => bail!("CSV header has neither a timestamp column nor month/day/hour columns"),
            },
        };

        let schema = match (&object_id, &time) {
            (Some(_), _) => SchemaKind::MultiEntity,
            (None, TimeColumns::Instant(_)) => SchemaKind::Instant,
            (None, TimeColumns::Decomposed { .. }) => SchemaKind::Decomposed,
        };

        Ok(Self {
            schema,
            time,
            object_id,
            temp_outside: find(TEMP_OUTSIDE_NAMES),
            temp_inside: find(TEMP_INSIDE_NAMES),
            consumption,
        })
    }

    fn observation(&self, record: &StringRecord) -> Result<Observation> {
        let time = match self.time {
            TimeColumns::Instant(idx) => {
                TimeKey::Instant(parse_instant(self.field(record, idx)?)?)
            }
            TimeColumns::Decomposed { month, day, hour } => TimeKey::Decomposed {
                month: self.int_field(record, month, "month")?,
                day: self.int_field(record, day, "day")?,
                hour: self.int_field(record, hour, "hour")?,
            },
        };

        let object_id = match self.object_id {
            Some(idx) => {
                let raw = self.field(record, idx)?.trim();
                if raw.is_empty() {
                    bail!("empty object id");
                }
                Some(raw.to_string())
            }
            None => None,
        };

        let consumption: f64 = {
            let raw = self.field(record, self.consumption)?;
            raw.trim()
                .parse()
                .with_context(|| format!("invalid consumption value '{raw}'"))?
        };

        Ok(Observation {
            object_id,
            time,
            temp_outside: self.optional_float(record, self.temp_outside, "outside temperature")?,
            temp_inside: self.optional_float(record, self.temp_inside, "inside temperature")?,
            consumption: Some(consumption),
        })
    }

    fn field<'r>(&self, record: &'r StringRecord, idx: usize) -> Result<&'r str> {
        record
            .get(idx)
            .with_context(|| format!("row has no field at column {idx}"))
    }

    fn int_field(&self, record: &StringRecord, idx: usize, name: &str) -> Result<u32> {
        let raw = self.field(record, idx)?;
        raw.trim()
            .parse()
            .with_context(|| format!("invalid {name} value '{raw}'"))
    }

    /// An absent column or an empty field is `None`; a non-empty field
    /// must parse.
    fn optional_float(
        &self,
        record: &StringRecord,
        idx: Option<usize>,
        name: &str,
    ) -> Result<Option<f64>> {
        match idx.and_then(|i| record.get(i)).map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => raw
                .parse()
                .map(Some)
                .with_context(|| format!("invalid {name} value '{raw}'")),
        }
    }
}
