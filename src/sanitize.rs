//! Input validation, cleaning and placeholder synthesis.

use crate::core::{Observation, SeriesInput, Timeline, Timestamp};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, Days, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;

/// Placeholder series used when the raw input is too short to be useful.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisPlan {
    /// Raw inputs with fewer entries than this are replaced.
    pub threshold: usize,
    /// Number of synthesized points.
    pub length: usize,
    /// `Dated` starts at 2024-01-01, anything else uses indices from 0.
    pub timeline: Timeline,
    /// Seed for reproducible noise; `None` draws from entropy.
    pub seed: Option<u64>,
}

impl Default for SynthesisPlan {
    fn default() -> Self {
        Self {
            threshold: 5,
            length: 100,
            timeline: Timeline::Dated,
            seed: None,
        }
    }
}

impl SynthesisPlan {
    const NOISE_STD: f64 = 2.0;
    const BASE_LEVEL: f64 = 100.0;

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_length(mut self, length: usize) -> Self {
        self.length = length;
        self
    }

    pub fn with_timeline(mut self, timeline: Timeline) -> Self {
        self.timeline = timeline;
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn start_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
    }

    /// Generate `100 + i + N(0, 2)` over the configured timeline.
    pub fn synthesize(&self) -> SeriesInput {
        let mut rng: StdRng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let start = Self::start_date();

        let observations = (0..self.length)
            .map(|i| {
                let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
                let u2: f64 = rng.gen();
                let noise = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
                let value = Self::BASE_LEVEL + i as f64 + Self::NOISE_STD * noise;

                let ts = match self.timeline {
                    Timeline::Dated => start.checked_add_days(Days::new(i as u64)).map(Timestamp::Date),
                    _ => Some(Timestamp::Index(i as i64)),
                };
                Observation::new(ts, value)
            })
            .collect();

        SeriesInput::from_observations(observations, true)
    }
}

/// Turns raw request entries into a [`SeriesInput`].
#[derive(Debug, Clone)]
pub struct SeriesSanitizer {
    min_required: usize,
    synthesis: SynthesisPlan,
}

impl SeriesSanitizer {
    pub fn new(min_required: usize, synthesis: SynthesisPlan) -> Self {
        Self {
            min_required,
            synthesis,
        }
    }

    pub fn min_required(&self) -> usize {
        self.min_required
    }

    /// Clean `raw` or substitute a synthetic series when it is too short.
    ///
    /// Fails with [`ForecastError::InsufficientData`] when fewer than
    /// `min_required` observations survive cleaning.
    pub fn clean(&self, raw: &[Value]) -> Result<SeriesInput> {
        if raw.len() < self.synthesis.threshold {
            tracing::warn!(
                raw = raw.len(),
                threshold = self.synthesis.threshold,
                length = self.synthesis.length,
                "input too short, substituting synthetic series"
            );
            return Ok(self.synthesis.synthesize());
        }

        let observations: Vec<Observation> = raw
            .iter()
            .enumerate()
            .filter_map(|(i, entry)| {
                let obs = parse_observation(entry);
                if obs.is_none() {
                    tracing::debug!(index = i, "discarding invalid observation");
                }
                obs
            })
            .collect();

        let series = SeriesInput::from_observations(observations, false);
        if series.len() < self.min_required {
            return Err(ForecastError::InsufficientData {
                needed: self.min_required,
                got: series.len(),
            });
        }

        tracing::debug!(
            raw = raw.len(),
            kept = series.len(),
            timeline = ?series.timeline(),
            "cleaned input series"
        );
        Ok(series)
    }
}

/// Parse one `{ "ds"?: ..., "y": ... }` entry.
///
/// Returns `None` for anything that must be discarded: non-objects, missing
/// or non-numeric `y`, non-finite or non-positive values, and `ds` values
/// that cannot be read as a date or an integer index.
pub fn parse_observation(entry: &Value) -> Option<Observation> {
    let object = entry.as_object()?;
    let value = parse_value(object.get("y")?)?;
    if !value.is_finite() || value <= 0.0 {
        return None;
    }

    let timestamp = match object.get("ds") {
        None | Some(Value::Null) => None,
        Some(ds) => Some(parse_timestamp(ds)?),
    };
    Some(Observation::new(timestamp, value))
}

fn parse_value(y: &Value) -> Option<f64> {
    match y {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn parse_timestamp(ds: &Value) -> Option<Timestamp> {
    match ds {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(Timestamp::Index(i));
            }
            let f = n.as_f64()?;
            (f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .then(|| Timestamp::Index(f as i64))
        }
        Value::String(s) => parse_date(s.trim()).map(Timestamp::Date),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|dt| dt.date())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sanitizer(min_required: usize) -> SeriesSanitizer {
        SeriesSanitizer::new(min_required, SynthesisPlan::default().with_seed(Some(7)))
    }

    #[test]
    fn discards_invalid_entries() {
        let raw = vec![
            json!({"y": 10.0}),
            json!({"y": "11.5"}),
            json!({"y": -3.0}),
            json!({"y": 0}),
            json!({"y": "abc"}),
            json!({"x": 1.0}),
            json!(42),
            json!({"y": null}),
            json!({"y": 12.0}),
            json!({"y": 13.0}),
            json!({"y": 14.0}),
        ];
        let series = sanitizer(5).clean(&raw).unwrap();
        assert_eq!(series.values(), &[10.0, 11.5, 12.0, 13.0, 14.0]);
        assert_eq!(series.timeline(), Timeline::Implicit);
        assert!(!series.is_synthetic());
    }

    #[test]
    fn too_few_survivors_is_insufficient_data() {
        let raw = vec![
            json!({"y": 1.0}),
            json!({"y": -1.0}),
            json!({"y": "nan"}),
            json!({"y": 2.0}),
            json!({"y": 3.0}),
            json!({"y": 0.0}),
        ];
        let err = sanitizer(5).clean(&raw).unwrap_err();
        assert_eq!(err, ForecastError::InsufficientData { needed: 5, got: 3 });
    }

    #[test]
    fn dated_entries_are_sorted_and_deduplicated() {
        let raw = vec![
            json!({"ds": "2024-01-03", "y": 3.0}),
            json!({"ds": "2024-01-01T00:00:00Z", "y": 1.0}),
            json!({"ds": "2024-01-02 12:30:00", "y": 2.0}),
            json!({"ds": "2024-01-03", "y": 99.0}),
            json!({"ds": "2024-01-04", "y": 4.0}),
            json!({"ds": "2024-01-05", "y": 5.0}),
        ];
        let series = sanitizer(5).clean(&raw).unwrap();
        assert_eq!(series.timeline(), Timeline::Dated);
        assert_eq!(series.values(), &[1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn unparseable_ds_discards_the_entry() {
        assert!(parse_observation(&json!({"ds": "yesterday", "y": 5.0})).is_none());
        assert!(parse_observation(&json!({"ds": true, "y": 5.0})).is_none());
        assert_eq!(
            parse_observation(&json!({"ds": 3, "y": 5.0})),
            Some(Observation::new(Some(Timestamp::Index(3)), 5.0))
        );
        assert_eq!(
            parse_observation(&json!({"ds": 4.0, "y": 5.0})),
            Some(Observation::new(Some(Timestamp::Index(4)), 5.0))
        );
        assert!(parse_observation(&json!({"ds": 4.5, "y": 5.0})).is_none());
    }

    #[test]
    fn short_input_is_synthesized() {
        let raw = vec![json!({"y": 1.0}), json!({"y": 2.0})];
        let series = sanitizer(5).clean(&raw).unwrap();
        assert!(series.is_synthetic());
        assert_eq!(series.len(), 100);
        assert_eq!(series.timeline(), Timeline::Dated);
        assert_eq!(
            series.timestamps()[0],
            Timestamp::Date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        );
    }

    #[test]
    fn seeded_synthesis_is_reproducible() {
        let plan = SynthesisPlan::default()
            .with_timeline(Timeline::Indexed)
            .with_seed(Some(42));
        let a = plan.synthesize();
        let b = plan.synthesize();
        assert_eq!(a, b);
        assert_eq!(a.timeline(), Timeline::Indexed);
        // Noise of sd 2 around 100 + i stays well within a few units.
        assert!(a.values().iter().enumerate().all(|(i, v)| (v - 100.0 - i as f64).abs() < 12.0));
    }
}
