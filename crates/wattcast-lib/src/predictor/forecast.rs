//! Hourly forecast sequencing
//!
//! Walks a fixed number of future hours from an anchor instant and pairs
//! each synthesized instant with its feature record.

use super::FeatureExtractor;
use crate::models::{FeatureRecord, Observation};
use chrono::{Duration, NaiveDateTime};

/// Generates the ordered sequence of feature records to score for a
/// forecast run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastSequencer {
    extractor: FeatureExtractor,
}

impl ForecastSequencer {
    pub fn new() -> Self {
        Self {
            extractor: FeatureExtractor::new(),
        }
    }

    /// Lazily yield `steps` entries, one hour apart, starting one hour
    /// after `start`. The anchor itself is never part of the sequence.
    pub fn generate(&self, start: NaiveDateTime, steps: usize) -> ForecastIter {
        ForecastIter {
            extractor: self.extractor,
            current: start,
            remaining: steps,
        }
    }
}

/// Finite, restartable iterator over forecast steps.
#[derive(Debug, Clone)]
pub struct ForecastIter {
    extractor: FeatureExtractor,
    current: NaiveDateTime,
    remaining: usize,
}

impl Iterator for ForecastIter {
    type Item = (NaiveDateTime, FeatureRecord);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;
        self.current += Duration::hours(1);
        let record = self.extractor.extract(&Observation::at_instant(self.current));
        Some((self.current, record))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for ForecastIter {}
