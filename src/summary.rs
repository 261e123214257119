//! Narrative summary
//!
//! Renders the day's outputs into a fixed-layout text report. The output only
//! depends on its inputs; nothing here reads the clock.

use crate::config::AnalysisConfig;
use crate::types::{
    ActivityType, AllocationBucket, EfficiencyMetrics, Insight, Pattern, PatternType,
    TimeAllocation, WorkSession,
};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Recommendations used when no insight was generated
pub const GENERIC_RECOMMENDATIONS: &[&str] = &[
    "Plan your most important task before starting work",
    "Reserve one uninterrupted block for focused work",
    "Review today's time allocation at the end of the day",
];

/// Everything the summary draws on
pub struct SummaryInputs<'a> {
    pub date: NaiveDate,
    pub sessions: &'a [WorkSession],
    pub allocation: &'a TimeAllocation,
    pub efficiency: &'a EfficiencyMetrics,
    pub patterns: &'a [Pattern],
    pub insights: &'a [Insight],
    pub config: &'a AnalysisConfig,
}

impl SummaryInputs<'_> {
    fn deep_work_hours(&self) -> f64 {
        self.efficiency.deep_work_time as f64 / 3600.0
    }
}

/// Compose the narrative for one day
pub fn compose_summary(inputs: &SummaryInputs) -> String {
    let mut lines = vec![format!("Daily review for {}", inputs.date)];

    if inputs.sessions.is_empty() {
        lines.push("No tracked activity.".to_string());
        lines.push(String::new());
        lines.extend(recommendation_section(inputs.insights));
        return lines.join("\n");
    }

    let allocation = inputs.allocation;
    lines.push(format!(
        "{} work sessions, {:.1}h tracked, average session {:.1} min.",
        allocation.total_sessions,
        allocation.total_work_time as f64 / 3600.0,
        allocation.average_session_minutes
    ));
    lines.push(String::new());

    lines.push("Top activities:".to_string());
    for (rank, (activity, bucket)) in top_activities(allocation, 3).into_iter().enumerate() {
        lines.push(format!(
            "  {}. {}: {:.1}h ({:.1}%)",
            rank + 1,
            activity,
            bucket.total_time / 3600.0,
            bucket.percentage
        ));
    }
    lines.push(String::new());

    let efficiency = inputs.efficiency;
    lines.push(format!(
        "Efficiency: rating {}, average focus {:.2}/10, deep work {:.1}h ({:.1}% of tracked time).",
        efficiency.efficiency_rating,
        efficiency.average_focus_score,
        inputs.deep_work_hours(),
        efficiency.deep_work_percentage
    ));
    lines.push(String::new());

    lines.push("Highlights:".to_string());
    lines.extend(bullets(highlights(inputs)));
    lines.push(String::new());

    lines.push("Areas for improvement:".to_string());
    lines.extend(bullets(improvements(inputs)));
    lines.push(String::new());

    lines.extend(recommendation_section(inputs.insights));
    lines.join("\n")
}

fn bullets(items: Vec<String>) -> Vec<String> {
    if items.is_empty() {
        return vec!["  - Nothing notable".to_string()];
    }
    items.into_iter().map(|item| format!("  - {item}")).collect()
}

/// Activity types by time, largest first; ties by name
fn top_activities(allocation: &TimeAllocation, n: usize) -> Vec<(ActivityType, &AllocationBucket)> {
    let mut activities: Vec<(ActivityType, &AllocationBucket)> = allocation
        .by_activity_type
        .iter()
        .map(|(activity, bucket)| (*activity, bucket))
        .collect();
    activities.sort_by(|a, b| {
        b.1.total_time
            .total_cmp(&a.1.total_time)
            .then_with(|| a.0.as_str().cmp(b.0.as_str()))
    });
    activities.truncate(n);
    activities
}

/// Longest run of consecutive hours as `(start, length)`
fn longest_streak(hours: &BTreeSet<u32>) -> Option<(u32, usize)> {
    let mut best: Option<(u32, usize)> = None;
    let mut current: Option<(u32, usize)> = None;

    for &hour in hours {
        current = match current {
            Some((start, len)) if start + len as u32 == hour => Some((start, len + 1)),
            _ => Some((hour, 1)),
        };
        if let Some((start, len)) = current {
            if best.map_or(true, |(_, best_len)| len > best_len) {
                best = Some((start, len));
            }
        }
    }
    best
}

fn highlights(inputs: &SummaryInputs) -> Vec<String> {
    let config = inputs.config;
    let efficiency = inputs.efficiency;
    let mut items = Vec::new();

    if let Some((start, len)) = longest_streak(&efficiency.productive_hours) {
        if len >= config.peak_streak_hours {
            items.push(format!(
                "Sustained focus for {len} consecutive hours ({:02}:00-{:02}:00)",
                start,
                start + len as u32
            ));
        }
    }

    if inputs.deep_work_hours() >= config.deep_work_target_hours {
        items.push(format!("{:.1}h of deep work", inputs.deep_work_hours()));
    }

    if efficiency.efficiency_rating.is_top_tier() {
        items.push(format!(
            "Efficiency rating {}",
            efficiency.efficiency_rating
        ));
    }

    let best = inputs
        .sessions
        .iter()
        .filter(|s| s.focus_score >= config.high_focus_session_threshold)
        .fold(None::<&WorkSession>, |best, s| match best {
            Some(b) if b.focus_score >= s.focus_score => Some(b),
            _ => Some(s),
        });
    if let Some(session) = best {
        let local = session.start_time.with_timezone(&config.offset_or_utc());
        items.push(format!(
            "Best session: {} at {} with focus {:.1}/10",
            session.activity_type,
            local.format("%H:%M"),
            session.focus_score
        ));
    }

    items
}

fn improvements(inputs: &SummaryInputs) -> Vec<String> {
    let config = inputs.config;
    let efficiency = inputs.efficiency;
    let mut items = Vec::new();

    if inputs.deep_work_hours() < config.deep_work_target_hours {
        items.push(format!(
            "Deep work was {:.1}h, below the {}h target",
            inputs.deep_work_hours(),
            config.deep_work_target_hours
        ));
    }

    if efficiency.distracted_hours.len() >= 2 {
        let listed = efficiency
            .distracted_hours
            .iter()
            .map(|h| format!("{h:02}:00"))
            .collect::<Vec<_>>()
            .join(", ");
        items.push(format!(
            "{} low-focus hours ({listed})",
            efficiency.distracted_hours.len()
        ));
    }

    if efficiency.efficiency_rating.is_low_tier() {
        items.push(format!(
            "Efficiency rating {}",
            efficiency.efficiency_rating
        ));
    }

    items.extend(
        inputs
            .patterns
            .iter()
            .filter(|p| matches!(p.pattern_type, PatternType::Causal | PatternType::Anomaly))
            .map(|p| p.title.clone()),
    );

    items
}

fn recommendation_section(insights: &[Insight]) -> Vec<String> {
    let mut lines = vec!["Tomorrow's recommendations:".to_string()];

    let mut ranked: Vec<&Insight> = insights.iter().collect();
    ranked.sort_by(|a, b| b.priority.cmp(&a.priority));
    let mut picks: Vec<String> = ranked
        .into_iter()
        .take(3)
        .filter_map(|insight| insight.action_items.first().cloned())
        .collect();

    if picks.is_empty() {
        picks = GENERIC_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect();
    }

    for (i, pick) in picks.iter().enumerate() {
        lines.push(format!("  {}. {pick}", i + 1));
    }
    lines
}
