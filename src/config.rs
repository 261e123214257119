//! Analysis configuration
//!
//! Every threshold the pipeline uses lives here so callers and tests can probe
//! boundary behavior without touching the stages themselves.

use crate::error::ComputeError;
use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

/// Tunable thresholds for segmentation, scoring and rule evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Largest gap (seconds) between observations that still continues a session
    pub max_gap_seconds: i64,
    /// Minimum focus score for a session to count as deep work
    pub deep_work_focus_threshold: f64,
    /// Minimum duration (seconds) for a session to count as deep work
    pub deep_work_min_duration_seconds: i64,
    /// Hourly weighted focus needed for a temporal "peak window" pattern
    pub productive_hour_threshold: f64,
    /// Hourly weighted focus needed for an hour to be listed as productive
    pub efficient_hour_threshold: f64,
    /// Hours with weighted focus below this are listed as distracted
    pub distracted_hour_threshold: f64,
    /// Meeting share (%) above which meetings are considered to crowd out coding
    pub meeting_crowding_threshold_pct: f64,
    /// Context switches per minute above which a session is "high switching"
    pub high_switch_rate_per_min: f64,
    /// Number of high-switching sessions needed for the switching pattern
    pub min_high_switch_sessions: usize,
    /// Daily hours above which an overwork anomaly is raised
    pub overwork_hours: f64,
    /// Daily hours below which (and above zero) an underwork anomaly is raised
    pub underwork_hours: f64,
    /// Daily deep-work target in hours
    pub deep_work_target_hours: f64,
    /// Consecutive productive hours that count as a highlight
    pub peak_streak_hours: usize,
    /// Session focus score that counts as a highlight
    pub high_focus_session_threshold: f64,
    /// Offset applied to UTC timestamps when bucketing by hour-of-day and date
    pub utc_offset_minutes: i32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_gap_seconds: 300,
            deep_work_focus_threshold: 7.0,
            deep_work_min_duration_seconds: 1500,
            productive_hour_threshold: 7.5,
            efficient_hour_threshold: 7.0,
            distracted_hour_threshold: 5.0,
            meeting_crowding_threshold_pct: 30.0,
            high_switch_rate_per_min: 2.0,
            min_high_switch_sessions: 3,
            overwork_hours: 10.0,
            underwork_hours: 4.0,
            deep_work_target_hours: 4.0,
            peak_streak_hours: 3,
            high_focus_session_threshold: 8.0,
            utc_offset_minutes: 0,
        }
    }
}

impl AnalysisConfig {
    /// Load a configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, ComputeError> {
        let config: AnalysisConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that thresholds are usable
    pub fn validate(&self) -> Result<(), ComputeError> {
        if self.max_gap_seconds < 0 {
            return Err(ComputeError::InvalidConfig(
                "max_gap_seconds must be non-negative".to_string(),
            ));
        }
        if self.deep_work_min_duration_seconds < 0 {
            return Err(ComputeError::InvalidConfig(
                "deep_work_min_duration_seconds must be non-negative".to_string(),
            ));
        }

        let focus_thresholds = [
            ("deep_work_focus_threshold", self.deep_work_focus_threshold),
            ("productive_hour_threshold", self.productive_hour_threshold),
            ("efficient_hour_threshold", self.efficient_hour_threshold),
            ("distracted_hour_threshold", self.distracted_hour_threshold),
            (
                "high_focus_session_threshold",
                self.high_focus_session_threshold,
            ),
        ];
        for (name, value) in focus_thresholds {
            if !(0.0..=10.0).contains(&value) {
                return Err(ComputeError::InvalidConfig(format!(
                    "{name} must be within 0-10, got {value}"
                )));
            }
        }

        if !(0.0..=100.0).contains(&self.meeting_crowding_threshold_pct) {
            return Err(ComputeError::InvalidConfig(format!(
                "meeting_crowding_threshold_pct must be within 0-100, got {}",
                self.meeting_crowding_threshold_pct
            )));
        }

        let non_negative = [
            ("high_switch_rate_per_min", self.high_switch_rate_per_min),
            ("overwork_hours", self.overwork_hours),
            ("underwork_hours", self.underwork_hours),
            ("deep_work_target_hours", self.deep_work_target_hours),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ComputeError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.utc_offset().is_none() {
            return Err(ComputeError::InvalidConfig(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )));
        }

        Ok(())
    }

    /// Fixed offset used for local hour and date bucketing
    pub fn utc_offset(&self) -> Option<FixedOffset> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
    }

    /// Local offset, falling back to UTC for an unvalidated config
    pub(crate) fn offset_or_utc(&self) -> FixedOffset {
        self.utc_offset().unwrap_or_else(|| Utc.fix())
    }
}
