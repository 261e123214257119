//! Time allocation analysis
//!
//! Pure aggregation of sessions into breakdowns by activity type, project,
//! local start hour and app.

use crate::config::AnalysisConfig;
use crate::stats::{percentage, ratio, round_dp};
use crate::types::{AllocationBucket, AppUsage, LongestSession, TimeAllocation, WorkSession};
use chrono::{DateTime, Timelike, Utc};
use log::debug;
use std::collections::BTreeMap;

/// Key used for sessions without a project
pub const UNASSIGNED_PROJECT: &str = "unassigned";

/// Local hour-of-day (0-23) for a timestamp
pub fn local_hour(at: DateTime<Utc>, config: &AnalysisConfig) -> u32 {
    at.with_timezone(&config.offset_or_utc()).hour()
}

/// Aggregate sessions into time allocation breakdowns
pub fn analyze_time_allocation(sessions: &[WorkSession], config: &AnalysisConfig) -> TimeAllocation {
    if sessions.is_empty() {
        return TimeAllocation::default();
    }

    let total_work_time: i64 = sessions.iter().map(|s| s.duration_seconds).sum();
    let total_sessions = sessions.len() as u32;
    let total = total_work_time as f64;

    let mut by_activity_type = BTreeMap::new();
    let mut by_project = BTreeMap::new();
    let mut by_hour = BTreeMap::new();
    let mut by_app: BTreeMap<String, AllocationBucket> = BTreeMap::new();

    for session in sessions {
        let duration = session.duration_seconds as f64;
        add_to(&mut by_activity_type, session.activity_type, duration);

        let project = session
            .project_id
            .clone()
            .unwrap_or_else(|| UNASSIGNED_PROJECT.to_string());
        add_to(&mut by_project, project, duration);

        add_to(&mut by_hour, local_hour(session.start_time, config), duration);

        for (app, seconds) in &session.app_breakdown {
            add_to(&mut by_app, app.clone(), *seconds);
        }
    }

    finish_percentages(&mut by_activity_type, total);
    finish_percentages(&mut by_project, total);
    finish_percentages(&mut by_hour, total);
    finish_percentages(&mut by_app, total);

    let mut apps: Vec<AppUsage> = by_app
        .into_iter()
        .map(|(app, bucket)| AppUsage {
            app,
            total_time: bucket.total_time,
            session_count: bucket.session_count,
            percentage: bucket.percentage,
        })
        .collect();
    // Stable sort keeps the name order from the map on equal time.
    apps.sort_by(|a, b| b.total_time.total_cmp(&a.total_time));

    let average_session_duration = ratio(total, total_sessions as f64);

    let allocation = TimeAllocation {
        total_work_time,
        total_work_hours: round_dp(total / 3600.0, 2),
        total_sessions,
        by_activity_type,
        by_project,
        by_hour,
        by_app: apps,
        longest_session: longest_session(sessions),
        average_session_duration: round_dp(average_session_duration, 2),
        average_session_minutes: round_dp(average_session_duration / 60.0, 1),
    };

    debug!(
        "time allocation: {}s across {} sessions, {} activity types, {} apps",
        allocation.total_work_time,
        allocation.total_sessions,
        allocation.by_activity_type.len(),
        allocation.by_app.len()
    );
    allocation
}

fn add_to<K: Ord>(buckets: &mut BTreeMap<K, AllocationBucket>, key: K, seconds: f64) {
    let bucket = buckets.entry(key).or_default();
    bucket.total_time += seconds;
    bucket.session_count += 1;
}

fn finish_percentages<K>(buckets: &mut BTreeMap<K, AllocationBucket>, total: f64) {
    for bucket in buckets.values_mut() {
        bucket.percentage = round_dp(percentage(bucket.total_time, total), 2);
        bucket.total_time = round_dp(bucket.total_time, 2);
    }
}

/// Longest session; the first one wins on equal duration
fn longest_session(sessions: &[WorkSession]) -> Option<LongestSession> {
    let mut longest: Option<&WorkSession> = None;
    for session in sessions {
        if longest.map_or(true, |l| session.duration_seconds > l.duration_seconds) {
            longest = Some(session);
        }
    }
    longest.map(|s| LongestSession {
        session_id: s.id.clone(),
        duration_seconds: s.duration_seconds,
        activity_type: s.activity_type,
        start_time: s.start_time,
        focus_score: s.focus_score,
    })
}
