//! Pattern mining
//!
//! Detects three families of patterns from one day's sessions and metrics:
//! temporal (peak focus hour ranges), causal (co-occurring conditions) and
//! anomaly (out-of-range daily totals). Causal and anomaly checks are plain
//! data records in [`PATTERN_RULES`], evaluated in order.

use crate::config::AnalysisConfig;
use crate::efficiency::hourly_focus;
use crate::provenance::{prefixed_id, Clock, IdSource};
use crate::stats::{mean, percentage, round_dp, WeightedMean};
use crate::types::{
    ActivityType, EfficiencyMetrics, Pattern, PatternType, TimeAllocation, WorkSession,
};
use log::debug;
use serde_json::json;

/// Confidence of every temporal pattern
pub const TEMPORAL_CONFIDENCE: f64 = 0.8;

/// Everything a rule may look at
pub struct MiningInputs<'a> {
    pub sessions: &'a [WorkSession],
    pub allocation: &'a TimeAllocation,
    pub efficiency: &'a EfficiencyMetrics,
    pub config: &'a AnalysisConfig,
}

impl MiningInputs<'_> {
    fn activity_share(&self, activity: ActivityType) -> f64 {
        let time = self
            .allocation
            .by_activity_type
            .get(&activity)
            .map(|b| b.total_time)
            .unwrap_or(0.0);
        percentage(time, self.allocation.total_work_time as f64)
    }

    fn total_hours(&self) -> f64 {
        self.allocation.total_work_time as f64 / 3600.0
    }
}

/// What a rule reports when it fires
pub struct PatternFinding {
    pub title: String,
    pub description: String,
    pub evidence: Vec<String>,
    pub metadata: serde_json::Value,
}

/// A causal or anomaly check
pub struct PatternRule {
    pub pattern_type: PatternType,
    /// Stable condition name, used in the pattern fingerprint
    pub key: &'static str,
    pub confidence: f64,
    pub frequency: &'static str,
    pub detect: fn(&MiningInputs) -> Option<PatternFinding>,
}

pub const PATTERN_RULES: &[PatternRule] = &[
    PatternRule {
        pattern_type: PatternType::Causal,
        key: "meeting_crowding",
        confidence: 0.75,
        frequency: "daily",
        detect: detect_meeting_crowding,
    },
    PatternRule {
        pattern_type: PatternType::Causal,
        key: "frequent_switching",
        confidence: 0.85,
        frequency: "daily",
        detect: detect_frequent_switching,
    },
    PatternRule {
        pattern_type: PatternType::Anomaly,
        key: "overwork",
        confidence: 0.9,
        frequency: "occasional",
        detect: detect_overwork,
    },
    PatternRule {
        pattern_type: PatternType::Anomaly,
        key: "underwork",
        confidence: 0.7,
        frequency: "occasional",
        detect: detect_underwork,
    },
];

fn detect_meeting_crowding(inputs: &MiningInputs) -> Option<PatternFinding> {
    let threshold = inputs.config.meeting_crowding_threshold_pct;
    let meeting_pct = inputs.activity_share(ActivityType::Meeting);
    let coding_pct = inputs.activity_share(ActivityType::Coding);

    if !(meeting_pct > threshold && coding_pct < threshold) {
        return None;
    }

    Some(PatternFinding {
        title: "Meetings crowd out coding time".to_string(),
        description: format!(
            "Meetings took {:.1}% of tracked time while coding got only {:.1}%.",
            meeting_pct, coding_pct
        ),
        evidence: vec![
            format!("Meeting share: {:.1}%", meeting_pct),
            format!("Coding share: {:.1}%", coding_pct),
        ],
        metadata: json!({
            "meeting_percentage": round_dp(meeting_pct, 1),
            "coding_percentage": round_dp(coding_pct, 1),
            "threshold_pct": threshold,
        }),
    })
}

fn detect_frequent_switching(inputs: &MiningInputs) -> Option<PatternFinding> {
    let limit = inputs.config.high_switch_rate_per_min;
    let switching: Vec<&WorkSession> = inputs
        .sessions
        .iter()
        .filter(|s| s.switch_rate_per_min() > limit)
        .collect();

    if switching.is_empty() || switching.len() < inputs.config.min_high_switch_sessions {
        return None;
    }

    let focus_scores: Vec<f64> = switching.iter().map(|s| s.focus_score).collect();
    let average_focus = mean(&focus_scores);

    Some(PatternFinding {
        title: "Frequent switching correlates with low focus".to_string(),
        description: format!(
            "{} sessions switched apps more than {} times per minute; their focus averaged {:.2}/10.",
            switching.len(),
            limit,
            average_focus
        ),
        evidence: vec![
            format!("{} high-switching sessions", switching.len()),
            format!("Average focus of those sessions: {:.2}", average_focus),
        ],
        metadata: json!({
            "session_count": switching.len(),
            "average_focus": round_dp(average_focus, 2),
            "session_ids": switching.iter().map(|s| s.id.clone()).collect::<Vec<_>>(),
        }),
    })
}

fn detect_overwork(inputs: &MiningInputs) -> Option<PatternFinding> {
    let hours = inputs.total_hours();
    if hours <= inputs.config.overwork_hours {
        return None;
    }

    Some(PatternFinding {
        title: format!("Overwork: {:.1} hours tracked", hours),
        description: format!(
            "Tracked work time exceeded {} hours, which raises the risk of fatigue.",
            inputs.config.overwork_hours
        ),
        evidence: vec![format!("Total tracked time: {:.2}h", hours)],
        metadata: json!({
            "total_hours": round_dp(hours, 2),
            "limit_hours": inputs.config.overwork_hours,
        }),
    })
}

fn detect_underwork(inputs: &MiningInputs) -> Option<PatternFinding> {
    let hours = inputs.total_hours();
    let overworked = hours > inputs.config.overwork_hours;
    if overworked || hours <= 0.0 || hours >= inputs.config.underwork_hours {
        return None;
    }

    Some(PatternFinding {
        title: format!("Underwork: only {:.1} hours tracked", hours),
        description: format!(
            "Tracked work time stayed under {} hours.",
            inputs.config.underwork_hours
        ),
        evidence: vec![format!("Total tracked time: {:.2}h", hours)],
        metadata: json!({
            "total_hours": round_dp(hours, 2),
            "floor_hours": inputs.config.underwork_hours,
        }),
    })
}

/// Contiguous run of qualifying hours, `end_hour` exclusive
#[derive(Debug, Clone, Copy, PartialEq)]
struct HourRange {
    start_hour: u32,
    end_hour: u32,
    focus: WeightedMean,
    session_count: u32,
}

/// Merge qualifying hours into contiguous ranges
fn peak_ranges(inputs: &MiningInputs) -> Vec<HourRange> {
    let threshold = inputs.config.productive_hour_threshold;
    let mut ranges: Vec<HourRange> = Vec::new();

    for (hour, (focus, session_count)) in hourly_focus(inputs.sessions, inputs.config) {
        if focus.weight() <= 0.0 || focus.value() < threshold {
            continue;
        }
        match ranges.last_mut() {
            Some(range) if range.end_hour == hour => {
                range.end_hour = hour + 1;
                range.focus.merge(&focus);
                range.session_count += session_count;
            }
            _ => ranges.push(HourRange {
                start_hour: hour,
                end_hour: hour + 1,
                focus,
                session_count,
            }),
        }
    }
    ranges
}

fn temporal_patterns(
    inputs: &MiningInputs,
    ids: &mut dyn IdSource,
    clock: &dyn Clock,
) -> Vec<Pattern> {
    let now = clock.now();
    peak_ranges(inputs)
        .into_iter()
        .map(|range| {
            let window = format!("{:02}:00-{:02}:00", range.start_hour, range.end_hour);
            let average_focus = range.focus.value();
            Pattern {
                id: prefixed_id(ids, "pattern"),
                pattern_type: PatternType::Temporal,
                fingerprint: format!("temporal:{:02}-{:02}", range.start_hour, range.end_hour),
                title: format!("Peak focus window {window}"),
                description: format!(
                    "Focus stayed at or above {} between {window}.",
                    inputs.config.productive_hour_threshold
                ),
                confidence: TEMPORAL_CONFIDENCE,
                frequency: "daily".to_string(),
                evidence: vec![
                    format!("Average focus {:.2}/10 during {window}", average_focus),
                    format!("{} sessions started in this window", range.session_count),
                ],
                first_detected: now,
                last_confirmed: now,
                metadata: json!({
                    "start_hour": range.start_hour,
                    "end_hour": range.end_hour,
                    "average_focus": round_dp(average_focus, 2),
                    "session_count": range.session_count,
                }),
            }
        })
        .collect()
}

/// Detect all patterns for the day
pub fn mine_patterns(
    inputs: &MiningInputs,
    ids: &mut dyn IdSource,
    clock: &dyn Clock,
) -> Vec<Pattern> {
    let mut patterns = temporal_patterns(inputs, ids, clock);
    let now = clock.now();

    for rule in PATTERN_RULES {
        if let Some(finding) = (rule.detect)(inputs) {
            patterns.push(Pattern {
                id: prefixed_id(ids, "pattern"),
                pattern_type: rule.pattern_type,
                fingerprint: format!("{}:{}", rule.pattern_type.as_str(), rule.key),
                title: finding.title,
                description: finding.description,
                confidence: rule.confidence,
                frequency: rule.frequency.to_string(),
                evidence: finding.evidence,
                first_detected: now,
                last_confirmed: now,
                metadata: finding.metadata,
            });
        }
    }

    debug!("mined {} patterns", patterns.len());
    patterns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::allocation::analyze_time_allocation;
    use crate::efficiency::calculate_efficiency;
    use crate::provenance::{FixedClock, SequentialIdSource};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn session(
        hour: u32,
        minute: u32,
        minutes: i64,
        activity_type: ActivityType,
        focus_score: f64,
        context_switches: u32,
    ) -> WorkSession {
        let start = Utc.with_ymd_and_hms(2025, 1, 21, hour, minute, 0).unwrap();
        WorkSession {
            id: format!("s-{hour}-{minute}"),
            start_time: start,
            end_time: start + Duration::minutes(minutes),
            duration_seconds: minutes * 60,
            activity_type,
            project_id: None,
            focus_score,
            app_breakdown: BTreeMap::new(),
            context_switches,
            total_activities: 1,
            unique_apps: 1,
            source_observation_ids: vec![],
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 21, 23, 0, 0).unwrap()
    }

    fn mine(sessions: &[WorkSession]) -> Vec<Pattern> {
        let config = AnalysisConfig::default();
        let allocation = analyze_time_allocation(sessions, &config);
        let efficiency = calculate_efficiency(sessions, &config);
        let inputs = MiningInputs {
            sessions,
            allocation: &allocation,
            efficiency: &efficiency,
            config: &config,
        };
        let mut ids = SequentialIdSource::new();
        mine_patterns(&inputs, &mut ids, &FixedClock(now()))
    }

    fn of_type(patterns: &[Pattern], pattern_type: PatternType) -> Vec<&Pattern> {
        patterns.iter().filter(|p| p.pattern_type == pattern_type).collect()
    }

    #[test]
    fn test_no_sessions_no_patterns() {
        assert!(mine(&[]).is_empty());
    }

    #[test]
    fn test_adjacent_peak_hours_merge() {
        let sessions = vec![
            session(9, 0, 50, ActivityType::Coding, 9.0, 1),
            session(10, 0, 50, ActivityType::Coding, 8.0, 1),
            session(11, 0, 50, ActivityType::Coding, 5.0, 10),
            session(14, 0, 50, ActivityType::Coding, 7.5, 2),
            session(15, 0, 50, ActivityType::Meeting, 6.0, 2),
        ];
        let patterns = mine(&sessions);
        let temporal = of_type(&patterns, PatternType::Temporal);

        assert_eq!(temporal.len(), 2);
        assert_eq!(temporal[0].title, "Peak focus window 09:00-11:00");
        assert_eq!(temporal[0].fingerprint, "temporal:09-11");
        assert_eq!(temporal[0].confidence, 0.8);
        assert_eq!(temporal[0].metadata["average_focus"], 8.5);
        assert_eq!(temporal[0].metadata["session_count"], 2);
        assert!(temporal[0].evidence[0].contains("8.50"));
        assert_eq!(temporal[1].fingerprint, "temporal:14-15");
        assert_eq!(temporal[0].first_detected, now());
        assert_eq!(temporal[0].last_confirmed, now());
    }

    #[test]
    fn test_meeting_crowding() {
        let sessions = vec![
            session(9, 0, 120, ActivityType::Meeting, 8.0, 0),
            session(13, 0, 60, ActivityType::Coding, 8.0, 0),
            session(15, 0, 120, ActivityType::Research, 8.0, 0),
        ];
        let patterns = mine(&sessions);
        let causal = of_type(&patterns, PatternType::Causal);

        assert_eq!(causal.len(), 1);
        assert_eq!(causal[0].fingerprint, "causal:meeting_crowding");
        assert_eq!(causal[0].confidence, 0.75);
        assert!(causal[0].title.to_lowercase().contains("meeting"));
    }

    #[test]
    fn test_meeting_crowding_needs_low_coding() {
        let sessions = vec![
            session(9, 0, 120, ActivityType::Meeting, 8.0, 0),
            session(13, 0, 180, ActivityType::Coding, 8.0, 0),
        ];
        let patterns = mine(&sessions);
        assert!(of_type(&patterns, PatternType::Causal).is_empty());
    }

    #[test]
    fn test_frequent_switching_needs_three_sessions() {
        // 30 switches in 10 minutes = 3/min
        let two = vec![
            session(9, 0, 10, ActivityType::Coding, 4.0, 30),
            session(10, 0, 10, ActivityType::Coding, 2.0, 30),
            session(11, 0, 10, ActivityType::Coding, 9.0, 1),
        ];
        assert!(of_type(&mine(&two), PatternType::Causal).is_empty());

        let mut three = two.clone();
        three.push(session(12, 0, 10, ActivityType::Coding, 3.0, 30));
        let patterns = mine(&three);
        let causal = of_type(&patterns, PatternType::Causal);

        assert_eq!(causal.len(), 1);
        assert_eq!(causal[0].confidence, 0.85);
        assert!(causal[0].title.to_lowercase().contains("switching"));
        assert!(causal[0].evidence[1].contains("3.00"));
    }

    #[test]
    fn test_overwork_anomaly() {
        // 11 hours of tracked time
        let sessions = vec![
            session(7, 0, 300, ActivityType::Coding, 8.0, 0),
            session(12, 30, 360, ActivityType::Coding, 8.0, 0),
        ];
        let patterns = mine(&sessions);
        let anomalies = of_type(&patterns, PatternType::Anomaly);

        assert_eq!(anomalies.len(), 1);
        assert!(anomalies[0].title.to_lowercase().contains("overwork"));
        assert_eq!(anomalies[0].confidence, 0.9);
        assert_eq!(anomalies[0].fingerprint, "anomaly:overwork");
    }

    #[test]
    fn test_underwork_anomaly() {
        let sessions = vec![session(9, 0, 90, ActivityType::Coding, 8.0, 0)];
        let patterns = mine(&sessions);
        let anomalies = of_type(&patterns, PatternType::Anomaly);

        assert_eq!(anomalies.len(), 1);
        assert!(anomalies[0].title.to_lowercase().contains("underwork"));
        assert_eq!(anomalies[0].confidence, 0.7);
    }

    #[test]
    fn test_anomalies_mutually_exclusive_under_odd_config() {
        let config = AnalysisConfig {
            overwork_hours: 1.0,
            underwork_hours: 4.0,
            ..AnalysisConfig::default()
        };
        let sessions = vec![session(9, 0, 120, ActivityType::Coding, 8.0, 0)];
        let allocation = analyze_time_allocation(&sessions, &config);
        let efficiency = calculate_efficiency(&sessions, &config);
        let inputs = MiningInputs {
            sessions: &sessions,
            allocation: &allocation,
            efficiency: &efficiency,
            config: &config,
        };
        let patterns = mine_patterns(&inputs, &mut SequentialIdSource::new(), &FixedClock(now()));
        let anomalies = of_type(&patterns, PatternType::Anomaly);

        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].fingerprint, "anomaly:overwork");
    }

    #[test]
    fn test_zero_time_day_has_no_anomaly() {
        let sessions = vec![session(9, 0, 0, ActivityType::Coding, 10.0, 0)];
        assert!(of_type(&mine(&sessions), PatternType::Anomaly).is_empty());
    }

    #[test]
    fn test_pattern_ids_are_sequential() {
        let sessions = vec![session(9, 0, 90, ActivityType::Coding, 9.0, 0)];
        let patterns = mine(&sessions);
        let ids: Vec<&str> = patterns.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["pattern-1", "pattern-2"]);
    }
}
