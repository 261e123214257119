//! Efficiency scoring
//!
//! Duration-weighted focus, deep vs shallow work classification, per-hour and
//! per-activity efficiency, and the letter rating ladder.

use crate::allocation::local_hour;
use crate::config::AnalysisConfig;
use crate::stats::{percentage, round_dp, WeightedMean};
use crate::types::{
    ActivityEfficiency, ActivityType, EfficiencyMetrics, EfficiencyRating, HourlyEfficiency,
    WorkSession,
};
use log::debug;
use std::collections::{BTreeMap, BTreeSet};

/// Rating ladder, evaluated top-down: (rating, min deep-work %, min average focus)
const RATING_LADDER: &[(EfficiencyRating, f64, f64)] = &[
    (EfficiencyRating::S, 60.0, 8.0),
    (EfficiencyRating::A, 40.0, 7.0),
    (EfficiencyRating::B, 20.0, 6.0),
    (EfficiencyRating::C, 10.0, 5.0),
];

/// Highest tier whose thresholds are both met, `D` otherwise
pub fn rate_efficiency(deep_work_percentage: f64, average_focus: f64) -> EfficiencyRating {
    RATING_LADDER
        .iter()
        .find(|(_, min_deep, min_focus)| {
            deep_work_percentage >= *min_deep && average_focus >= *min_focus
        })
        .map(|(rating, _, _)| *rating)
        .unwrap_or(EfficiencyRating::D)
}

/// Whether a session counts as deep work
pub fn is_deep_work(session: &WorkSession, config: &AnalysisConfig) -> bool {
    session.focus_score >= config.deep_work_focus_threshold
        && session.duration_seconds >= config.deep_work_min_duration_seconds
}

/// Duration-weighted focus per local start hour (unrounded)
pub fn hourly_focus(sessions: &[WorkSession], config: &AnalysisConfig) -> BTreeMap<u32, (WeightedMean, u32)> {
    let mut hours: BTreeMap<u32, (WeightedMean, u32)> = BTreeMap::new();
    for session in sessions {
        let entry = hours.entry(local_hour(session.start_time, config)).or_default();
        entry.0.add(session.focus_score, session.duration_seconds as f64);
        entry.1 += 1;
    }
    hours
}

/// Compute efficiency metrics for the day's sessions
pub fn calculate_efficiency(sessions: &[WorkSession], config: &AnalysisConfig) -> EfficiencyMetrics {
    if sessions.is_empty() {
        return EfficiencyMetrics::default();
    }

    let mut overall = WeightedMean::default();
    let mut deep_work_time = 0i64;
    let mut shallow_work_time = 0i64;
    let mut deep_work_session_count = 0u32;
    let mut shallow_work_session_count = 0u32;
    let mut by_activity: BTreeMap<ActivityType, WeightedMean> = BTreeMap::new();

    for session in sessions {
        let duration = session.duration_seconds as f64;
        overall.add(session.focus_score, duration);
        by_activity
            .entry(session.activity_type)
            .or_default()
            .add(session.focus_score, duration);

        if is_deep_work(session, config) {
            deep_work_time += session.duration_seconds;
            deep_work_session_count += 1;
        } else {
            shallow_work_time += session.duration_seconds;
            shallow_work_session_count += 1;
        }
    }

    let total_time = (deep_work_time + shallow_work_time) as f64;
    let average_focus = overall.value();
    let deep_work_percentage = percentage(deep_work_time as f64, total_time);
    let efficiency_rating = rate_efficiency(deep_work_percentage, average_focus);

    let mut productive_hours = BTreeSet::new();
    let mut distracted_hours = BTreeSet::new();
    let mut hourly_efficiency = BTreeMap::new();

    for (hour, (focus, session_count)) in hourly_focus(sessions, config) {
        // An hour with no tracked time averages 0 and so counts as distracted.
        let average = focus.value();
        if average >= config.efficient_hour_threshold {
            productive_hours.insert(hour);
        }
        if average < config.distracted_hour_threshold {
            distracted_hours.insert(hour);
        }
        hourly_efficiency.insert(
            hour,
            HourlyEfficiency {
                total_time: focus.weight(),
                session_count,
                average_focus: round_dp(average, 2),
            },
        );
    }

    let efficiency_by_activity = by_activity
        .into_iter()
        .map(|(activity, focus)| {
            (
                activity,
                ActivityEfficiency {
                    total_time: focus.weight(),
                    average_focus: round_dp(focus.value(), 2),
                },
            )
        })
        .collect();

    debug!(
        "efficiency: rating {} avg focus {:.2} deep {:.1}%",
        efficiency_rating, average_focus, deep_work_percentage
    );

    EfficiencyMetrics {
        average_focus_score: round_dp(average_focus, 2),
        deep_work_time,
        deep_work_hours: round_dp(deep_work_time as f64 / 3600.0, 2),
        shallow_work_time,
        shallow_work_hours: round_dp(shallow_work_time as f64 / 3600.0, 2),
        deep_work_percentage: round_dp(deep_work_percentage, 1),
        efficiency_rating,
        productive_hours,
        distracted_hours,
        hourly_efficiency,
        efficiency_by_activity,
        deep_work_session_count,
        shallow_work_session_count,
    }
}
