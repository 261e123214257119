//! Observation adapter
//!
//! Parses observation JSON, validates each record and produces a time-ordered
//! copy for the segmenter. The caller's slice is never reordered.

use crate::error::ComputeError;
use crate::types::ActivityObservation;
use chrono::{DateTime, Utc};
use log::warn;

/// Closed time range a report covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AnalysisWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ComputeError> {
        if end < start {
            return Err(ComputeError::InvalidWindow(format!(
                "window end {} is before window start {}",
                end.to_rfc3339(),
                start.to_rfc3339()
            )));
        }
        Ok(Self { start, end })
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// Parse a JSON array of observations
pub fn parse_observations(json: &str) -> Result<Vec<ActivityObservation>, ComputeError> {
    serde_json::from_str(json)
        .map_err(|e| ComputeError::ParseError(format!("Failed to parse observations: {}", e)))
}

/// Validate observations and return them sorted by capture time
///
/// Equal timestamps keep their input order.
pub fn prepare_observations(
    observations: &[ActivityObservation],
    window: &AnalysisWindow,
) -> Result<Vec<ActivityObservation>, ComputeError> {
    for obs in observations {
        validate_observation(obs, window)?;
    }

    let mut sorted = observations.to_vec();
    if !is_sorted(&sorted) {
        warn!(
            "observations were not ordered by captured_at; sorting a copy of {} records",
            sorted.len()
        );
        sorted.sort_by_key(|o| o.captured_at);
    }

    // Invariant check on the sorted copy; sorting above guarantees it holds.
    if let Some(pair) = sorted
        .windows(2)
        .find(|pair| pair[1].captured_at < pair[0].captured_at)
    {
        return Err(ComputeError::validation(
            "captured_at",
            format!(
                "observation {} is earlier than its predecessor {}",
                pair[1].id, pair[0].id
            ),
        ));
    }

    Ok(sorted)
}

fn validate_observation(
    obs: &ActivityObservation,
    window: &AnalysisWindow,
) -> Result<(), ComputeError> {
    if obs.id.trim().is_empty() {
        return Err(ComputeError::validation(
            "id",
            format!("observation captured at {} has no id", obs.captured_at.to_rfc3339()),
        ));
    }
    if obs.source_app.trim().is_empty() {
        return Err(ComputeError::validation(
            "source_app",
            format!("observation {} has no source app", obs.id),
        ));
    }
    if !window.contains(obs.captured_at) {
        return Err(ComputeError::validation(
            "captured_at",
            format!(
                "observation {} at {} is outside the analysis window",
                obs.id,
                obs.captured_at.to_rfc3339()
            ),
        ));
    }
    Ok(())
}

fn is_sorted(observations: &[ActivityObservation]) -> bool {
    observations
        .windows(2)
        .all(|pair| pair[0].captured_at <= pair[1].captured_at)
}
