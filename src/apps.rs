//! Application catalog
//!
//! Fixed keyword groups used to decide whether two apps belong to the same
//! line of work and to infer a session's activity type. Matching is a
//! case-insensitive substring test against the app name.

use crate::types::ActivityType;
use std::collections::BTreeMap;

/// Semantic app group used by the relatedness relation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppGroup {
    Coding,
    Browser,
    Communication,
    Design,
    Office,
}

const CODING_APPS: &[&str] = &["vscode", "code", "pycharm", "intellij", "vim", "terminal", "iterm"];
const BROWSER_APPS: &[&str] = &["chrome", "safari", "firefox", "edge"];
const COMMUNICATION_APPS: &[&str] = &["slack", "teams", "zoom", "discord", "wechat", "telegram"];
const DESIGN_APPS: &[&str] = &["figma", "sketch", "photoshop", "illustrator"];
const OFFICE_APPS: &[&str] = &["word", "excel", "powerpoint", "notion", "obsidian", "pages"];

const GROUPS: &[(AppGroup, &[&str])] = &[
    (AppGroup::Coding, CODING_APPS),
    (AppGroup::Browser, BROWSER_APPS),
    (AppGroup::Communication, COMMUNICATION_APPS),
    (AppGroup::Design, DESIGN_APPS),
    (AppGroup::Office, OFFICE_APPS),
];

/// Keyword lists for activity inference, checked in order
const ACTIVITY_KEYWORDS: &[(ActivityType, &[&str])] = &[
    (
        ActivityType::Coding,
        &["vscode", "code", "pycharm", "intellij", "vim", "terminal"],
    ),
    (ActivityType::Meeting, &["zoom", "teams", "meet", "skype"]),
    (ActivityType::Research, &["chrome", "safari", "firefox", "edge"]),
    (
        ActivityType::Writing,
        &["notion", "obsidian", "word", "pages", "docs"],
    ),
    (
        ActivityType::Design,
        &["figma", "sketch", "photoshop", "illustrator"],
    ),
    (
        ActivityType::Communication,
        &["slack", "wechat", "telegram", "discord"],
    ),
];

fn matches_any(app_lower: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|k| app_lower.contains(k))
}

/// Groups an app belongs to (an app may match more than one)
pub fn groups_of(app: &str) -> Vec<AppGroup> {
    let lower = app.to_lowercase();
    GROUPS
        .iter()
        .filter(|(_, keywords)| matches_any(&lower, keywords))
        .map(|(group, _)| *group)
        .collect()
}

/// Whether two apps belong to the same line of work
///
/// The same app is always related to itself. Apps sharing a group are
/// related; coding tools and browsers are always related to each other
/// (documentation lookups).
pub fn is_related(app_a: &str, app_b: &str) -> bool {
    if app_a.eq_ignore_ascii_case(app_b) {
        return true;
    }

    let groups_a = groups_of(app_a);
    let groups_b = groups_of(app_b);

    if groups_a.iter().any(|g| groups_b.contains(g)) {
        return true;
    }

    let coding_browser = |x: &[AppGroup], y: &[AppGroup]| {
        x.contains(&AppGroup::Coding) && y.contains(&AppGroup::Browser)
    };
    coding_browser(&groups_a, &groups_b) || coding_browser(&groups_b, &groups_a)
}

/// Activity type for a single app name
pub fn classify_app(app: &str) -> ActivityType {
    let lower = app.to_lowercase();
    ACTIVITY_KEYWORDS
        .iter()
        .find(|(_, keywords)| matches_any(&lower, keywords))
        .map(|(activity, _)| *activity)
        .unwrap_or(ActivityType::Other)
}

/// App with the most attributed time; ties go to the first app in `order`
pub fn dominant_app<'a>(app_times: &BTreeMap<String, f64>, order: &'a [String]) -> Option<&'a str> {
    let mut best: Option<(&str, f64)> = None;
    for app in order {
        let time = app_times.get(app).copied().unwrap_or(0.0);
        match best {
            Some((_, best_time)) if time <= best_time => {}
            _ => best = Some((app.as_str(), time)),
        }
    }
    best.map(|(app, _)| app)
}

/// Infer the activity type from per-app time
pub fn infer_activity_type(app_times: &BTreeMap<String, f64>, order: &[String]) -> ActivityType {
    dominant_app(app_times, order)
        .map(classify_app)
        .unwrap_or(ActivityType::Other)
}
