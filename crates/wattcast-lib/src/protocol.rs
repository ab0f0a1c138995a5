//! Inference-time stdin protocol
//!
//! One observation per line, comma separated: `objectId,month,day,hour`
//! for models trained on multi-entity data, `month,day,hour` otherwise.
//! A blank line ends the session. Malformed lines are recoverable;
//! unknown object ids are dropped without comment.

use anyhow::Result;
use tracing::debug;

use crate::error::RequestParseError;
use crate::models::{Observation, TimeKey};
use crate::predictor::{FeatureExtractor, Predictor};
use crate::whitelist::ObjectWhitelist;

/// Parse one scoring-request line into an observation.
///
/// This is the input-validation boundary: month/day/hour are range-checked
/// here so the extractor downstream can stay a total function.
pub fn parse_request(
    line: &str,
    expects_object_id: bool,
) -> Result<Observation, RequestParseError> {
    let fields: Vec<&str> = line.split(',').collect();
    let expected = if expects_object_id { 4 } else { 3 };
    if fields.len() != expected {
        return Err(RequestParseError::FieldCount {
            expected,
            got: fields.len(),
        });
    }

    let offset = expected - 3;
    let object_id = expects_object_id.then(|| fields[0].trim().to_string());
    let month = int_in_range(fields[offset], "month", 1, 12)?;
    let day = int_in_range(fields[offset + 1], "day", 1, 31)?;
    let hour = int_in_range(fields[offset + 2], "hour", 0, 23)?;

    Ok(Observation {
        object_id,
        time: TimeKey::Decomposed { month, day, hour },
        temp_outside: None,
        temp_inside: None,
        consumption: None,
    })
}

fn int_in_range(
    raw: &str,
    field: &'static str,
    min: i64,
    max: i64,
) -> Result<u32, RequestParseError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| RequestParseError::NotAnInteger {
            field,
            value: raw.trim().to_string(),
        })?;
    if value < min || value > max {
        return Err(RequestParseError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(value as u32)
}

/// What handling one input line produced.
#[derive(Debug)]
pub enum LineOutcome {
    /// The line parsed, passed the whitelist, and was scored.
    Scored {
        object_id: Option<String>,
        prediction: f64,
    },
    /// The line could not be parsed; report and continue.
    Rejected(RequestParseError),
    /// Unknown object id; dropped silently.
    Filtered,
    /// Blank line: end of session.
    End,
}

/// Line-at-a-time scoring state machine.
pub struct ScoringSession<'a> {
    expects_object_id: bool,
    whitelist: Option<&'a ObjectWhitelist>,
    extractor: FeatureExtractor,
}

impl<'a> ScoringSession<'a> {
    pub fn new(expects_object_id: bool, whitelist: Option<&'a ObjectWhitelist>) -> Self {
        Self {
            expects_object_id,
            whitelist,
            extractor: FeatureExtractor::new(),
        }
    }

    /// Handle one input line. Only predictor failures are fatal; every
    /// input problem maps to a non-error outcome.
    pub fn handle_line(&self, line: &str, predictor: &dyn Predictor) -> Result<LineOutcome> {
        if line.trim().is_empty() {
            return Ok(LineOutcome::End);
        }

        let observation = match parse_request(line, self.expects_object_id) {
            Ok(observation) => observation,
            Err(err) => return Ok(LineOutcome::Rejected(err)),
        };

        if let (Some(whitelist), Some(id)) = (self.whitelist, observation.object_id.as_deref()) {
            if !whitelist.contains(id) {
                debug!(object_id = id, "dropping request for unknown object id");
                return Ok(LineOutcome::Filtered);
            }
        }

        let record = self.extractor.extract(&observation);
        let prediction = predictor.predict(observation.object_id.as_deref(), &record)?;
        Ok(LineOutcome::Scored {
            object_id: observation.object_id,
            prediction,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FeatureRecord;

    struct FixedPredictor(f64);

    impl Predictor for FixedPredictor {
        fn predict(&self, _object_id: Option<&str>, _record: &FeatureRecord) -> Result<f64> {
            Ok(self.0)
        }
    }

    #[test]
    fn test_parse_three_field_line() {
        let observation = parse_request("11,1,3", false).unwrap();
        assert_eq!(observation.object_id, None);
        assert_eq!(observation.time, TimeKey::Decomposed { month: 11, day: 1, hour: 3 });
    }

    #[test]
    fn test_parse_four_field_line() {
        let observation = parse_request("house-7,12,24,18", true).unwrap();
        assert_eq!(observation.object_id.as_deref(), Some("house-7"));
        assert_eq!(observation.time, TimeKey::Decomposed { month: 12, day: 24, hour: 18 });
    }

    #[test]
    fn test_wrong_field_count() {
        assert_eq!(
            parse_request("1,2", false),
            Err(RequestParseError::FieldCount { expected: 3, got: 2 })
        );
        assert_eq!(
            parse_request("1,2,3", true),
            Err(RequestParseError::FieldCount { expected: 4, got: 3 })
        );
    }

    #[test]
    fn test_non_integer_field() {
        assert_eq!(
            parse_request("abc,1,2", false),
            Err(RequestParseError::NotAnInteger {
                field: "month",
                value: "abc".to_string()
            })
        );
    }

    #[test]
    fn test_out_of_range_fields() {
        assert!(matches!(
            parse_request("13,1,0", false),
            Err(RequestParseError::OutOfRange { field: "month", value: 13, .. })
        ));
        assert!(matches!(
            parse_request("12,32,0", false),
            Err(RequestParseError::OutOfRange { field: "day", .. })
        ));
        assert!(matches!(
            parse_request("12,31,24", false),
            Err(RequestParseError::OutOfRange { field: "hour", .. })
        ));
    }

    #[test]
    fn test_blank_line_ends_session() {
        let session = ScoringSession::new(false, None);
        let predictor = FixedPredictor(1.0);
        assert!(matches!(session.handle_line("", &predictor).unwrap(), LineOutcome::End));
        assert!(matches!(session.handle_line("   ", &predictor).unwrap(), LineOutcome::End));
    }

    #[test]
    fn test_malformed_lines_are_recoverable() {
        let session = ScoringSession::new(false, None);
        let predictor = FixedPredictor(1.0);
        assert!(matches!(
            session.handle_line("abc,1,2", &predictor).unwrap(),
            LineOutcome::Rejected(RequestParseError::NotAnInteger { .. })
        ));
        assert!(matches!(
            session.handle_line("1,2", &predictor).unwrap(),
            LineOutcome::Rejected(RequestParseError::FieldCount { .. })
        ));
        // The session keeps scoring after rejects.
        assert!(matches!(
            session.handle_line("11,1,3", &predictor).unwrap(),
            LineOutcome::Scored { .. }
        ));
    }

    #[test]
    fn test_unknown_object_id_is_filtered_silently() {
        let whitelist = ObjectWhitelist::from_ids(["house-1".to_string()]);
        let session = ScoringSession::new(true, Some(&whitelist));
        let predictor = FixedPredictor(2.5);

        assert!(matches!(
            session.handle_line("house-9,11,1,3", &predictor).unwrap(),
            LineOutcome::Filtered
        ));
        match session.handle_line("house-1,11,1,3", &predictor).unwrap() {
            LineOutcome::Scored { object_id, prediction } => {
                assert_eq!(object_id.as_deref(), Some("house-1"));
                assert_eq!(prediction, 2.5);
            }
            other => panic!("expected scored outcome, got {other:?}"),
        }
    }
}
