//! Insight generation
//!
//! Turns patterns and efficiency metrics into prioritized recommendations.
//! Each rule in [`INSIGHT_RULES`] carries a fixed category, priority and
//! impact; rules run in table order.

use crate::config::AnalysisConfig;
use crate::provenance::{prefixed_id, IdSource};
use crate::types::{
    EfficiencyMetrics, EfficiencyRating, Insight, InsightCategory, InsightStatus, Pattern,
    PatternType,
};
use log::debug;

/// Everything an insight rule may look at
pub struct InsightInputs<'a> {
    pub patterns: &'a [Pattern],
    pub efficiency: &'a EfficiencyMetrics,
    pub config: &'a AnalysisConfig,
}

impl InsightInputs<'_> {
    fn has_sessions(&self) -> bool {
        self.efficiency.efficiency_rating != EfficiencyRating::NotApplicable
    }

    /// Patterns of one type whose title mentions `keyword`
    fn patterns_matching(&self, pattern_type: PatternType, keyword: &str) -> Vec<&Pattern> {
        self.patterns
            .iter()
            .filter(|p| p.pattern_type == pattern_type && p.title.to_lowercase().contains(keyword))
            .collect()
    }
}

/// Rule output before ids and fixed scores are attached
pub struct InsightDraft {
    pub title: String,
    pub content: String,
    pub action_items: Vec<String>,
    pub related_patterns: Vec<String>,
}

/// One insight rule
pub struct InsightRule {
    pub category: InsightCategory,
    pub priority: u8,
    pub impact_score: f64,
    pub build: fn(&InsightInputs) -> Vec<InsightDraft>,
}

pub const INSIGHT_RULES: &[InsightRule] = &[
    InsightRule {
        category: InsightCategory::Efficiency,
        priority: 8,
        impact_score: 8.0,
        build: peak_window,
    },
    InsightRule {
        category: InsightCategory::Efficiency,
        priority: 7,
        impact_score: 7.5,
        build: deep_work_shortfall,
    },
    InsightRule {
        category: InsightCategory::Efficiency,
        priority: 9,
        impact_score: 8.5,
        build: low_rating,
    },
    InsightRule {
        category: InsightCategory::TimeManagement,
        priority: 8,
        impact_score: 7.0,
        build: meeting_load,
    },
    InsightRule {
        category: InsightCategory::TimeManagement,
        priority: 7,
        impact_score: 7.5,
        build: context_switching,
    },
    InsightRule {
        category: InsightCategory::Health,
        priority: 9,
        impact_score: 9.0,
        build: overwork,
    },
    InsightRule {
        category: InsightCategory::Health,
        priority: 5,
        impact_score: 5.0,
        build: underwork,
    },
    InsightRule {
        category: InsightCategory::Health,
        priority: 6,
        impact_score: 6.0,
        build: scattered_hours,
    },
];

fn checklist(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn peak_window(inputs: &InsightInputs) -> Vec<InsightDraft> {
    let Some(pattern) = inputs
        .patterns
        .iter()
        .find(|p| p.pattern_type == PatternType::Temporal)
    else {
        return Vec::new();
    };

    let start = pattern.metadata["start_hour"].as_u64().unwrap_or(0);
    let end = pattern.metadata["end_hour"].as_u64().unwrap_or(0);
    let window = format!("{start:02}:00-{end:02}:00");

    vec![InsightDraft {
        title: format!("Schedule demanding work for {window}"),
        content: format!(
            "Your focus peaked between {window}. Reserving this window for the hardest task of the day makes the most of it."
        ),
        action_items: vec![
            format!("Block {window} on your calendar for deep work"),
            format!("Move meetings and messages out of {window}"),
            "Pick tomorrow's hardest task before the window starts".to_string(),
        ],
        related_patterns: vec![pattern.id.clone()],
    }]
}

fn deep_work_shortfall(inputs: &InsightInputs) -> Vec<InsightDraft> {
    let target = inputs.config.deep_work_target_hours;
    let deep_hours = inputs.efficiency.deep_work_time as f64 / 3600.0;
    if !inputs.has_sessions() || deep_hours >= target {
        return Vec::new();
    }

    vec![InsightDraft {
        title: format!("Deep work below the {target}h target"),
        content: format!(
            "Only {:.1}h of today's work qualified as deep work (focus of at least {} for {} minutes or more).",
            deep_hours,
            inputs.config.deep_work_focus_threshold,
            inputs.config.deep_work_min_duration_seconds / 60
        ),
        action_items: checklist(&[
            "Plan two uninterrupted 90-minute blocks",
            "Silence notifications during focus blocks",
            "Batch small tasks into a single shallow-work slot",
        ]),
        related_patterns: Vec::new(),
    }]
}

fn low_rating(inputs: &InsightInputs) -> Vec<InsightDraft> {
    let rating = inputs.efficiency.efficiency_rating;
    if !rating.is_low_tier() {
        return Vec::new();
    }

    vec![InsightDraft {
        title: format!("Efficiency rating {rating}: protect longer focus sessions"),
        content: format!(
            "Average focus was {:.2}/10 with {:.1}% of time in deep work.",
            inputs.efficiency.average_focus_score, inputs.efficiency.deep_work_percentage
        ),
        action_items: checklist(&[
            "Work in 25-minute focus blocks with short breaks",
            "Close chat and email while working on a single task",
            "Review which interruptions cost the most time today",
        ]),
        related_patterns: Vec::new(),
    }]
}

/// One insight per pattern of `pattern_type` whose title mentions `keyword`
fn from_patterns(
    inputs: &InsightInputs,
    pattern_type: PatternType,
    keyword: &str,
    title: &str,
    action_items: &[&str],
) -> Vec<InsightDraft> {
    inputs
        .patterns_matching(pattern_type, keyword)
        .into_iter()
        .map(|pattern| InsightDraft {
            title: title.to_string(),
            content: pattern.description.clone(),
            action_items: checklist(action_items),
            related_patterns: vec![pattern.id.clone()],
        })
        .collect()
}

fn meeting_load(inputs: &InsightInputs) -> Vec<InsightDraft> {
    from_patterns(
        inputs,
        PatternType::Causal,
        "meeting",
        "Reclaim time from meetings",
        &[
            "Decline meetings without a clear agenda",
            "Group meetings into one half of the day",
            "Shorten default meeting length to 25 minutes",
        ],
    )
}

fn context_switching(inputs: &InsightInputs) -> Vec<InsightDraft> {
    from_patterns(
        inputs,
        PatternType::Causal,
        "switching",
        "Cut down on context switching",
        &[
            "Check messages at fixed times",
            "Keep only the apps for the current task open",
            "Finish one task before starting the next",
        ],
    )
}

fn overwork(inputs: &InsightInputs) -> Vec<InsightDraft> {
    from_patterns(
        inputs,
        PatternType::Anomaly,
        "overwork",
        "Long day: plan recovery",
        &[
            "Set a hard stop time for tomorrow",
            "Take a 10-minute break every 90 minutes",
            "Move non-urgent work to later in the week",
        ],
    )
}

fn underwork(inputs: &InsightInputs) -> Vec<InsightDraft> {
    from_patterns(
        inputs,
        PatternType::Anomaly,
        "underwork",
        "Light day: check what got in the way",
        &[
            "Write down what interrupted today's plan",
            "Schedule a first focus block early tomorrow",
        ],
    )
}

fn scattered_hours(inputs: &InsightInputs) -> Vec<InsightDraft> {
    let hours = &inputs.efficiency.distracted_hours;
    if hours.len() < 2 {
        return Vec::new();
    }

    let listed = hours
        .iter()
        .map(|h| format!("{h:02}:00"))
        .collect::<Vec<_>>()
        .join(", ");

    vec![InsightDraft {
        title: "Several low-focus hours".to_string(),
        content: format!("Focus dropped below {} during {listed}.", inputs.config.distracted_hour_threshold),
        action_items: checklist(&[
            "Take a short walk before the first low-focus hour",
            "Use low-focus hours for routine tasks",
            "Check sleep and meal timing around these hours",
        ]),
        related_patterns: Vec::new(),
    }]
}

/// Run every insight rule in table order
pub fn generate_insights(inputs: &InsightInputs, ids: &mut dyn IdSource) -> Vec<Insight> {
    let mut insights = Vec::new();
    for rule in INSIGHT_RULES {
        for draft in (rule.build)(inputs) {
            insights.push(Insight {
                id: prefixed_id(ids, "insight"),
                category: rule.category,
                title: draft.title,
                content: draft.content,
                action_items: draft.action_items,
                priority: rule.priority,
                impact_score: rule.impact_score,
                related_patterns: draft.related_patterns,
                status: InsightStatus::New,
            });
        }
    }
    debug!("generated {} insights", insights.len());
    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provenance::SequentialIdSource;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::collections::BTreeSet;

    fn pattern(id: &str, pattern_type: PatternType, title: &str, metadata: serde_json::Value) -> Pattern {
        let now = Utc.with_ymd_and_hms(2025, 1, 21, 23, 0, 0).unwrap();
        Pattern {
            id: id.to_string(),
            pattern_type,
            fingerprint: format!("{}:test", pattern_type.as_str()),
            title: title.to_string(),
            description: format!("{title} description"),
            confidence: 0.8,
            frequency: "daily".to_string(),
            evidence: vec![],
            first_detected: now,
            last_confirmed: now,
            metadata,
        }
    }

    fn metrics(rating: EfficiencyRating, deep_work_time: i64) -> EfficiencyMetrics {
        EfficiencyMetrics {
            efficiency_rating: rating,
            deep_work_time,
            average_focus_score: 7.2,
            deep_work_percentage: 50.0,
            ..EfficiencyMetrics::default()
        }
    }

    fn run(patterns: &[Pattern], efficiency: &EfficiencyMetrics) -> Vec<Insight> {
        let config = AnalysisConfig::default();
        let inputs = InsightInputs {
            patterns,
            efficiency,
            config: &config,
        };
        generate_insights(&inputs, &mut SequentialIdSource::new())
    }

    #[test]
    fn test_no_data_no_insights() {
        assert!(run(&[], &EfficiencyMetrics::default()).is_empty());
    }

    #[test]
    fn test_peak_window_uses_first_temporal_pattern() {
        let patterns = vec![
            pattern(
                "pattern-1",
                PatternType::Temporal,
                "Peak focus window 09:00-11:00",
                json!({"start_hour": 9, "end_hour": 11}),
            ),
            pattern(
                "pattern-2",
                PatternType::Temporal,
                "Peak focus window 14:00-15:00",
                json!({"start_hour": 14, "end_hour": 15}),
            ),
        ];
        let insights = run(&patterns, &metrics(EfficiencyRating::A, 5 * 3600));

        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].category, InsightCategory::Efficiency);
        assert_eq!(insights[0].related_patterns, vec!["pattern-1".to_string()]);
        assert_eq!(insights[0].priority, 8);
        assert!(insights[0].action_items[0].contains("09:00-11:00"));
        assert_eq!(insights[0].status, InsightStatus::New);
    }

    #[test]
    fn test_deep_work_shortfall_and_low_rating() {
        let insights = run(&[], &metrics(EfficiencyRating::D, 3600));
        let titles: Vec<&str> = insights.iter().map(|i| i.title.as_str()).collect();

        assert_eq!(insights.len(), 2);
        assert!(titles[0].starts_with("Deep work below"));
        assert!(titles[1].starts_with("Efficiency rating D"));
        assert_eq!(insights[1].priority, 9);
        assert_eq!(insights[1].impact_score, 8.5);
    }

    #[test]
    fn test_causal_patterns_map_to_time_management() {
        let patterns = vec![
            pattern("p1", PatternType::Causal, "Meetings crowd out coding time", json!({})),
            pattern(
                "p2",
                PatternType::Causal,
                "Frequent switching correlates with low focus",
                json!({}),
            ),
        ];
        let insights = run(&patterns, &metrics(EfficiencyRating::S, 5 * 3600));

        assert_eq!(insights.len(), 2);
        assert!(insights.iter().all(|i| i.category == InsightCategory::TimeManagement));
        assert_eq!(insights[0].related_patterns, vec!["p1".to_string()]);
        assert_eq!(insights[0].action_items.len(), 3);
        assert_eq!(insights[1].related_patterns, vec!["p2".to_string()]);
    }

    #[test]
    fn test_health_rules() {
        let patterns = vec![pattern(
            "p1",
            PatternType::Anomaly,
            "Overwork: 11.0 hours tracked",
            json!({}),
        )];
        let mut efficiency = metrics(EfficiencyRating::B, 5 * 3600);
        efficiency.distracted_hours = BTreeSet::from([14, 16]);
        let insights = run(&patterns, &efficiency);

        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].title, "Long day: plan recovery");
        assert_eq!(insights[0].priority, 9);
        assert_eq!(insights[1].title, "Several low-focus hours");
        assert!(insights[1].content.contains("14:00, 16:00"));
        assert!(insights.iter().all(|i| i.category == InsightCategory::Health));
    }

    #[test]
    fn test_underwork_rule() {
        let patterns = vec![pattern(
            "p1",
            PatternType::Anomaly,
            "Underwork: only 1.5 hours tracked",
            json!({}),
        )];
        let insights = run(&patterns, &metrics(EfficiencyRating::S, 5 * 3600));
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].priority, 5);
    }

    #[test]
    fn test_single_distracted_hour_is_quiet() {
        let mut efficiency = metrics(EfficiencyRating::B, 5 * 3600);
        efficiency.distracted_hours = BTreeSet::from([14]);
        assert!(run(&[], &efficiency).is_empty());
    }

    #[test]
    fn test_rule_scores_within_bounds() {
        for rule in INSIGHT_RULES {
            assert!((1..=10).contains(&rule.priority));
            assert!((0.0..=10.0).contains(&rule.impact_score));
        }
    }
}
