//! Session segmentation
//!
//! Folds time-ordered observations into work sessions. A single accumulator
//! stays open while consecutive observations arrive within the gap threshold
//! and belong to related apps; anything else closes it.

use crate::apps::{infer_activity_type, is_related};
use crate::config::AnalysisConfig;
use crate::provenance::{prefixed_id, IdSource};
use crate::stats::round_dp;
use crate::types::{ActivityObservation, WorkSession};
use chrono::{DateTime, Utc};
use log::debug;
use std::collections::BTreeMap;

/// Open session being built from consecutive observations
#[derive(Debug, Clone)]
struct SessionAccumulator {
    start_time: DateTime<Utc>,
    last_activity_time: DateTime<Utc>,
    current_app: String,
    app_times: BTreeMap<String, f64>,
    /// Apps in first-seen order, for tie-breaking
    app_order: Vec<String>,
    observation_ids: Vec<String>,
    project_ids: Vec<String>,
    context_switches: u32,
}

impl SessionAccumulator {
    fn open(obs: &ActivityObservation) -> Self {
        let mut acc = Self {
            start_time: obs.captured_at,
            last_activity_time: obs.captured_at,
            current_app: obs.source_app.clone(),
            app_times: BTreeMap::new(),
            app_order: Vec::new(),
            observation_ids: Vec::new(),
            project_ids: Vec::new(),
            context_switches: 0,
        };
        acc.note_app(&obs.source_app);
        acc.record(obs);
        acc
    }

    /// Whether `obs` continues this session
    fn accepts(&self, obs: &ActivityObservation, max_gap_seconds: i64) -> bool {
        let gap = seconds_between(self.last_activity_time, obs.captured_at);
        gap <= max_gap_seconds as f64 && is_related(&self.current_app, &obs.source_app)
    }

    fn merge(&mut self, obs: &ActivityObservation) {
        // Elapsed time belongs to the app that was in front until now.
        let elapsed = seconds_between(self.last_activity_time, obs.captured_at);
        *self.app_times.entry(self.current_app.clone()).or_insert(0.0) += elapsed;
        self.last_activity_time = obs.captured_at;

        if obs.source_app != self.current_app {
            self.context_switches += 1;
            self.current_app = obs.source_app.clone();
            self.note_app(&obs.source_app);
        }

        self.record(obs);
    }

    fn note_app(&mut self, app: &str) {
        if !self.app_times.contains_key(app) {
            self.app_times.insert(app.to_string(), 0.0);
            self.app_order.push(app.to_string());
        }
    }

    fn record(&mut self, obs: &ActivityObservation) {
        self.observation_ids.push(obs.id.clone());
        if let Some(project) = &obs.project_id {
            self.project_ids.push(project.clone());
        }
    }

    fn finalize(self, ids: &mut dyn IdSource) -> WorkSession {
        let duration_seconds = (self.last_activity_time - self.start_time).num_seconds();
        let focus_score = focus_score(self.context_switches, duration_seconds);
        let activity_type = infer_activity_type(&self.app_times, &self.app_order);
        let project_id = most_frequent(&self.project_ids);

        WorkSession {
            id: prefixed_id(ids, "worksession"),
            start_time: self.start_time,
            end_time: self.last_activity_time,
            duration_seconds,
            activity_type,
            project_id,
            focus_score,
            total_activities: self.observation_ids.len() as u32,
            unique_apps: self.app_order.len() as u32,
            app_breakdown: self.app_times,
            context_switches: self.context_switches,
            source_observation_ids: self.observation_ids,
        }
    }
}

/// Focus score from switching frequency
///
/// Formula: `clamp(10 - switches / max(duration_minutes, 1) * 2, 0, 10)`,
/// rounded to 2 decimals.
pub fn focus_score(context_switches: u32, duration_seconds: i64) -> f64 {
    let duration_minutes = (duration_seconds as f64 / 60.0).max(1.0);
    let switch_rate = context_switches as f64 / duration_minutes;
    round_dp((10.0 - switch_rate * 2.0).clamp(0.0, 10.0), 2)
}

/// Group time-ordered observations into work sessions
///
/// `observations` must already be sorted by `captured_at` (see
/// [`crate::adapter::prepare_observations`]).
pub fn segment_sessions(
    observations: &[ActivityObservation],
    config: &AnalysisConfig,
    ids: &mut dyn IdSource,
) -> Vec<WorkSession> {
    let mut sessions = Vec::new();
    let mut current: Option<SessionAccumulator> = None;

    for obs in observations {
        current = match current.take() {
            None => Some(SessionAccumulator::open(obs)),
            Some(mut acc) if acc.accepts(obs, config.max_gap_seconds) => {
                acc.merge(obs);
                Some(acc)
            }
            Some(acc) => {
                sessions.push(acc.finalize(ids));
                Some(SessionAccumulator::open(obs))
            }
        };
    }

    if let Some(acc) = current {
        sessions.push(acc.finalize(ids));
    }

    debug!(
        "segmented {} observations into {} sessions",
        observations.len(),
        sessions.len()
    );
    sessions
}

fn seconds_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_milliseconds() as f64 / 1000.0
}

/// Most common value; ties go to the first value reaching the top count
fn most_frequent(values: &[String]) -> Option<String> {
    let mut counts: Vec<(&String, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }

    let mut best: Option<(&String, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apps::is_related;
    use crate::provenance::SequentialIdSource;
    use crate::types::ActivityType;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 21, 9, 0, 0).unwrap()
    }

    fn obs(id: &str, minutes: i64, app: &str) -> ActivityObservation {
        ActivityObservation::new(id, base() + Duration::minutes(minutes), app)
    }

    fn segment(observations: &[ActivityObservation]) -> Vec<WorkSession> {
        let mut ids = SequentialIdSource::new();
        segment_sessions(observations, &AnalysisConfig::default(), &mut ids)
    }

    fn alternating_coding() -> Vec<ActivityObservation> {
        (0..18)
            .map(|i| {
                let app = if i % 2 == 0 { "VSCode" } else { "Terminal" };
                obs(&format!("m{i}"), i * 5, app)
            })
            .collect()
    }

    #[test]
    fn test_alternating_coding_is_one_focused_session() {
        let sessions = segment(&alternating_coding());

        assert_eq!(sessions.len(), 1);
        let session = &sessions[0];
        assert_eq!(session.activity_type, ActivityType::Coding);
        assert_eq!(session.duration_seconds, 85 * 60);
        assert_eq!(session.context_switches, 17);
        assert_eq!(session.total_activities, 18);
        assert_eq!(session.unique_apps, 2);
        assert!(session.focus_score >= 7.0);
        // 17 switches over 85 minutes
        assert_eq!(session.focus_score, 9.6);
        assert_eq!(session.app_breakdown["VSCode"], 45.0 * 60.0);
        assert_eq!(session.app_breakdown["Terminal"], 40.0 * 60.0);
        assert_eq!(session.id, "worksession-1");
    }

    #[test]
    fn test_single_observation_is_zero_duration_session() {
        let sessions = segment(&[obs("only", 0, "Figma")]);

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].duration_seconds, 0);
        assert_eq!(sessions[0].start_time, sessions[0].end_time);
        assert_eq!(sessions[0].focus_score, 10.0);
        assert_eq!(sessions[0].activity_type, ActivityType::Design);
        assert_eq!(sessions[0].source_observation_ids, vec!["only".to_string()]);
    }

    #[test]
    fn test_empty_input_yields_no_sessions() {
        assert!(segment(&[]).is_empty());
    }

    #[test]
    fn test_gap_over_threshold_splits() {
        let sessions = segment(&[obs("a", 0, "VSCode"), obs("b", 6, "VSCode")]);
        assert_eq!(sessions.len(), 2);
    }

    #[test]
    fn test_gap_at_threshold_merges() {
        let sessions = segment(&[obs("a", 0, "VSCode"), obs("b", 5, "VSCode")]);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].duration_seconds, 300);
    }

    #[test]
    fn test_unrelated_app_splits() {
        let sessions = segment(&[
            obs("a", 0, "VSCode"),
            obs("b", 1, "VSCode"),
            obs("c", 2, "Slack"),
            obs("d", 3, "Zoom"),
        ]);
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].source_observation_ids, vec!["a", "b"]);
        assert_eq!(sessions[1].source_observation_ids, vec!["c", "d"]);
        assert_eq!(sessions[1].activity_type, ActivityType::Communication);
    }

    #[test]
    fn test_custom_gap_threshold() {
        let config = AnalysisConfig {
            max_gap_seconds: 600,
            ..AnalysisConfig::default()
        };
        let mut ids = SequentialIdSource::new();
        let sessions = segment_sessions(
            &[obs("a", 0, "VSCode"), obs("b", 8, "VSCode")],
            &config,
            &mut ids,
        );
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_breakdown_covers_duration() {
        let apps = ["VSCode", "Chrome", "Terminal", "VSCode", "Chrome", "VSCode"];
        let observations: Vec<_> = (0..30)
            .map(|i| obs(&format!("m{i}"), i * 2, apps[i as usize % apps.len()]))
            .collect();

        for session in segment(&observations) {
            let covered: f64 = session.app_breakdown.values().sum();
            assert!((covered - session.duration_seconds as f64).abs() < 1.0);
        }
    }

    #[test]
    fn test_consecutive_sessions_respect_gap_rule() {
        let observations = vec![
            obs("a", 0, "VSCode"),
            obs("b", 3, "Chrome"),
            obs("c", 4, "Slack"),
            obs("d", 20, "Slack"),
            obs("e", 22, "Figma"),
            obs("f", 25, "Sketch"),
        ];
        let sessions = segment(&observations);
        let last_app = |s: &WorkSession| {
            let id = s.source_observation_ids.last().unwrap();
            observations.iter().find(|o| &o.id == id).unwrap().source_app.clone()
        };
        let first_app = |s: &WorkSession| {
            let id = &s.source_observation_ids[0];
            observations.iter().find(|o| &o.id == id).unwrap().source_app.clone()
        };

        for pair in sessions.windows(2) {
            let gap = (pair[1].start_time - pair[0].end_time).num_seconds();
            assert!(gap > 300 || !is_related(&last_app(&pair[0]), &first_app(&pair[1])));
        }
        assert_eq!(sessions.len(), 4);
    }

    #[test]
    fn test_frequent_switching_lowers_focus() {
        let apps = ["VSCode", "Chrome", "Terminal"];
        let high: Vec<_> = (0..12).map(|i| obs(&format!("h{i}"), i * 5, "VSCode")).collect();
        let low: Vec<_> = (0..12)
            .map(|i| {
                let at = base() + Duration::hours(2) + Duration::seconds(i * 20);
                ActivityObservation::new(format!("l{i}"), at, apps[i as usize % apps.len()])
            })
            .collect();

        let high_sessions = segment(&high);
        let low_sessions = segment(&low);
        assert_eq!(low_sessions.len(), 1);

        // 11 switches over 220 seconds
        assert_eq!(high_sessions[0].focus_score, 10.0);
        assert_eq!(low_sessions[0].focus_score, 4.0);
    }

    #[test]
    fn test_focus_score_formula() {
        assert_eq!(focus_score(0, 3600), 10.0);
        // 3 switches in 20 seconds: rate uses the one-minute floor
        assert_eq!(focus_score(3, 20), 4.0);
        assert_eq!(focus_score(30, 300), 0.0);
        assert_eq!(focus_score(1, 90), 8.67);
    }

    #[test]
    fn test_session_project_is_most_frequent() {
        let observations = vec![
            obs("a", 0, "VSCode").with_project("alpha"),
            obs("b", 1, "VSCode").with_project("beta"),
            obs("c", 2, "VSCode").with_project("beta"),
            obs("d", 3, "VSCode"),
        ];
        let sessions = segment(&observations);
        assert_eq!(sessions[0].project_id.as_deref(), Some("beta"));
    }

    #[test]
    fn test_project_tie_goes_to_first_seen() {
        let values = vec!["x".to_string(), "y".to_string()];
        assert_eq!(most_frequent(&values).as_deref(), Some("x"));
        assert_eq!(most_frequent(&[]), None);
    }
}
