//! Cleaned input series and its timeline.

use chrono::{Days, NaiveDate};
use serde::Serialize;

/// Position of an observation on its timeline.
///
/// Serializes untagged, so dates appear as `"2024-01-31"` and indices as
/// plain integers in the `ds` field of the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Timestamp {
    /// Calendar day.
    Date(NaiveDate),
    /// Integer period index.
    Index(i64),
}

impl Timestamp {
    fn timeline(&self) -> Timeline {
        match self {
            Timestamp::Date(_) => Timeline::Dated,
            Timestamp::Index(_) => Timeline::Indexed,
        }
    }

    /// Move forward by `steps` periods (days for dates).
    pub fn advance(&self, steps: u64) -> Option<Timestamp> {
        match self {
            Timestamp::Date(d) => d.checked_add_days(Days::new(steps)).map(Timestamp::Date),
            Timestamp::Index(i) => i64::try_from(steps)
                .ok()
                .and_then(|s| i.checked_add(s))
                .map(Timestamp::Index),
        }
    }
}

/// Kind of ordering carried by a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeline {
    /// Every observation has a calendar date.
    Dated,
    /// Every observation has an integer index.
    Indexed,
    /// No usable timestamps; input order is the ordering.
    Implicit,
}

/// A single cleaned observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub timestamp: Option<Timestamp>,
    pub value: f64,
}

impl Observation {
    pub fn new(timestamp: Option<Timestamp>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Strictly positive, ordered and deduplicated series ready for fitting.
///
/// Construct through [`SeriesInput::from_observations`], which decides the
/// timeline: timestamps are honoured only when every observation carries one
/// of the same kind, otherwise the series falls back to input order.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesInput {
    values: Vec<f64>,
    /// Empty for [`Timeline::Implicit`].
    timestamps: Vec<Timestamp>,
    timeline: Timeline,
    synthetic: bool,
}

impl SeriesInput {
    /// Order and deduplicate observations.
    ///
    /// With a uniform timeline the observations are stably sorted by
    /// timestamp and later duplicates of a timestamp are dropped.
    pub fn from_observations(observations: Vec<Observation>, synthetic: bool) -> Self {
        let timeline = uniform_timeline(&observations);

        if timeline == Timeline::Implicit {
            return Self {
                values: observations.iter().map(|o| o.value).collect(),
                timestamps: Vec::new(),
                timeline,
                synthetic,
            };
        }

        let mut stamped: Vec<(Timestamp, f64)> = observations
            .into_iter()
            .filter_map(|o| o.timestamp.map(|ts| (ts, o.value)))
            .collect();
        stamped.sort_by_key(|(ts, _)| *ts);
        stamped.dedup_by_key(|(ts, _)| *ts);

        let (timestamps, values) = stamped.into_iter().unzip();
        Self {
            values,
            timestamps,
            timeline,
            synthetic,
        }
    }

    /// Build an implicit-order series straight from values.
    pub fn from_values(values: Vec<f64>) -> Self {
        Self {
            values,
            timestamps: Vec::new(),
            timeline: Timeline::Implicit,
            synthetic: false,
        }
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn timestamps(&self) -> &[Timestamp] {
        &self.timestamps
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn timeline(&self) -> Timeline {
        self.timeline
    }

    /// Whether the series was synthesized instead of taken from the request.
    pub fn is_synthetic(&self) -> bool {
        self.synthetic
    }

    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Timestamps for the `horizon` periods following the series.
    ///
    /// Dated and indexed series continue from their last timestamp; an
    /// implicit series continues the positional index `n, n + 1, ...`.
    pub fn future_timestamps(&self, horizon: usize) -> Vec<Timestamp> {
        match self.timestamps.last() {
            Some(last) => (1..=horizon as u64)
                .map(|step| last.advance(step).unwrap_or(*last))
                .collect(),
            None => {
                let n = self.values.len() as i64;
                (0..horizon as i64).map(|k| Timestamp::Index(n + k)).collect()
            }
        }
    }
}

fn uniform_timeline(observations: &[Observation]) -> Timeline {
    let mut kinds = observations.iter().map(|o| o.timestamp.map(|ts| ts.timeline()));
    match kinds.next() {
        Some(Some(first)) if kinds.all(|k| k == Some(first)) => first,
        _ => Timeline::Implicit,
    }
}
