//! Core types for the daily review pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: observations, work sessions, allocation and efficiency metrics,
//! patterns, insights and the final report.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// One timestamped record of which application was in the foreground
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityObservation {
    /// Caller-assigned observation identifier
    pub id: String,
    /// Capture time (UTC)
    pub captured_at: DateTime<Utc>,
    /// Foreground application name as reported by the capture layer
    pub source_app: String,
    /// Project the capture layer associated with this observation, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
}

impl ActivityObservation {
    pub fn new(id: impl Into<String>, captured_at: DateTime<Utc>, source_app: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            captured_at,
            source_app: source_app.into(),
            project_id: None,
        }
    }

    pub fn with_project(mut self, project_id: impl Into<String>) -> Self {
        self.project_id = Some(project_id.into());
        self
    }
}

/// Kind of work a session was spent on, inferred from its dominant app
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityType {
    Coding,
    Meeting,
    Research,
    Writing,
    Design,
    Communication,
    Other,
}

impl ActivityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityType::Coding => "coding",
            ActivityType::Meeting => "meeting",
            ActivityType::Research => "research",
            ActivityType::Writing => "writing",
            ActivityType::Design => "design",
            ActivityType::Communication => "communication",
            ActivityType::Other => "other",
        }
    }
}

impl fmt::Display for ActivityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A merged run of temporally and semantically related observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkSession {
    pub id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Whole seconds between start and end
    pub duration_seconds: i64,
    pub activity_type: ActivityType,
    pub project_id: Option<String>,
    /// Focus score (0-10, 2 decimals)
    pub focus_score: f64,
    /// Seconds attributed to each app
    pub app_breakdown: BTreeMap<String, f64>,
    pub context_switches: u32,
    /// Number of observations folded into the session
    pub total_activities: u32,
    /// Number of distinct apps seen in the session
    pub unique_apps: u32,
    pub source_observation_ids: Vec<String>,
}

impl WorkSession {
    /// Context switches per minute, with duration floored at one minute
    pub fn switch_rate_per_min(&self) -> f64 {
        self.context_switches as f64 / (self.duration_seconds as f64 / 60.0).max(1.0)
    }
}

/// Aggregate for a single breakdown key
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllocationBucket {
    /// Seconds
    pub total_time: f64,
    pub session_count: u32,
    /// Share of total work time (0-100, 2 decimals)
    pub percentage: f64,
}

/// Per-app aggregate; `TimeAllocation::by_app` keeps these sorted by time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppUsage {
    pub app: String,
    /// Seconds
    pub total_time: f64,
    pub session_count: u32,
    pub percentage: f64,
}

/// Summary of the longest session of the day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LongestSession {
    pub session_id: String,
    pub duration_seconds: i64,
    pub activity_type: ActivityType,
    pub start_time: DateTime<Utc>,
    pub focus_score: f64,
}

/// Time allocation breakdowns for one day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeAllocation {
    /// Seconds
    pub total_work_time: i64,
    pub total_work_hours: f64,
    pub total_sessions: u32,
    pub by_activity_type: BTreeMap<ActivityType, AllocationBucket>,
    pub by_project: BTreeMap<String, AllocationBucket>,
    /// Keyed by local start hour (0-23)
    pub by_hour: BTreeMap<u32, AllocationBucket>,
    pub by_app: Vec<AppUsage>,
    pub longest_session: Option<LongestSession>,
    /// Seconds
    pub average_session_duration: f64,
    pub average_session_minutes: f64,
}

/// Letter grade for the day's efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EfficiencyRating {
    S,
    A,
    B,
    C,
    D,
    #[serde(rename = "N/A")]
    NotApplicable,
}

impl EfficiencyRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            EfficiencyRating::S => "S",
            EfficiencyRating::A => "A",
            EfficiencyRating::B => "B",
            EfficiencyRating::C => "C",
            EfficiencyRating::D => "D",
            EfficiencyRating::NotApplicable => "N/A",
        }
    }

    pub fn is_top_tier(&self) -> bool {
        matches!(self, EfficiencyRating::S | EfficiencyRating::A)
    }

    pub fn is_low_tier(&self) -> bool {
        matches!(self, EfficiencyRating::C | EfficiencyRating::D)
    }
}

impl fmt::Display for EfficiencyRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weighted focus for one hour of the day
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyEfficiency {
    /// Seconds
    pub total_time: f64,
    pub session_count: u32,
    pub average_focus: f64,
}

/// Weighted focus for one activity type
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActivityEfficiency {
    /// Seconds
    pub total_time: f64,
    pub average_focus: f64,
}

/// Focus and deep-work metrics for one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyMetrics {
    pub average_focus_score: f64,
    /// Seconds
    pub deep_work_time: i64,
    pub deep_work_hours: f64,
    /// Seconds
    pub shallow_work_time: i64,
    pub shallow_work_hours: f64,
    pub deep_work_percentage: f64,
    pub efficiency_rating: EfficiencyRating,
    pub productive_hours: BTreeSet<u32>,
    pub distracted_hours: BTreeSet<u32>,
    pub hourly_efficiency: BTreeMap<u32, HourlyEfficiency>,
    pub efficiency_by_activity: BTreeMap<ActivityType, ActivityEfficiency>,
    pub deep_work_session_count: u32,
    pub shallow_work_session_count: u32,
}

impl Default for EfficiencyMetrics {
    fn default() -> Self {
        Self {
            average_focus_score: 0.0,
            deep_work_time: 0,
            deep_work_hours: 0.0,
            shallow_work_time: 0,
            shallow_work_hours: 0.0,
            deep_work_percentage: 0.0,
            efficiency_rating: EfficiencyRating::NotApplicable,
            productive_hours: BTreeSet::new(),
            distracted_hours: BTreeSet::new(),
            hourly_efficiency: BTreeMap::new(),
            efficiency_by_activity: BTreeMap::new(),
            deep_work_session_count: 0,
            shallow_work_session_count: 0,
        }
    }
}

/// Pattern family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternType {
    Temporal,
    Causal,
    Anomaly,
}

impl PatternType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PatternType::Temporal => "temporal",
            PatternType::Causal => "causal",
            PatternType::Anomaly => "anomaly",
        }
    }
}

/// A detected behavioral regularity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    pub id: String,
    pub pattern_type: PatternType,
    /// Stable semantic key, identical for the same finding on different days
    pub fingerprint: String,
    pub title: String,
    pub description: String,
    /// Confidence (0-1)
    pub confidence: f64,
    pub frequency: String,
    pub evidence: Vec<String>,
    pub first_detected: DateTime<Utc>,
    pub last_confirmed: DateTime<Utc>,
    pub metadata: serde_json::Value,
}

/// Insight category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightCategory {
    Efficiency,
    TimeManagement,
    Health,
}

/// Lifecycle state of an insight; the pipeline only emits `New`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightStatus {
    New,
    Acknowledged,
    Dismissed,
}

/// An actionable recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub id: String,
    pub category: InsightCategory,
    pub title: String,
    pub content: String,
    pub action_items: Vec<String>,
    /// Priority (1-10)
    pub priority: u8,
    /// Impact (0-10)
    pub impact_score: f64,
    pub related_patterns: Vec<String>,
    pub status: InsightStatus,
}

/// Complete review for one subject over one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyReport {
    /// Local calendar date of the window start
    pub date: NaiveDate,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub work_sessions: Vec<WorkSession>,
    pub time_allocation: TimeAllocation,
    pub efficiency_metrics: EfficiencyMetrics,
    pub patterns: Vec<Pattern>,
    pub insights: Vec<Insight>,
    pub summary: String,
}
