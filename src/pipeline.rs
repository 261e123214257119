//! Pipeline orchestration
//!
//! This module provides the public API for the daily review. It runs the
//! stages in order: adapter → segmenter → allocation → efficiency →
//! patterns → insights → summary.

use crate::adapter::{parse_observations, prepare_observations, AnalysisWindow};
use crate::allocation::analyze_time_allocation;
use crate::config::AnalysisConfig;
use crate::efficiency::calculate_efficiency;
use crate::error::ComputeError;
use crate::insights::{generate_insights, InsightInputs};
use crate::patterns::{mine_patterns, MiningInputs};
use crate::provenance::{Clock, IdSource, SequentialIdSource, SystemClock, UuidIdSource};
use crate::segmenter::segment_sessions;
use crate::summary::{compose_summary, SummaryInputs};
use crate::types::{ActivityObservation, DailyReport};
use chrono::{DateTime, Utc};
use log::{debug, info};

/// Build the daily report for one analysis window.
///
/// Identifiers are numbered from 1 on every call, so the same input always
/// yields the same ids. Detection timestamps come from the wall clock. Use
/// [`DailyReviewProcessor::new`] for UUID identifiers.
///
/// # Example
/// ```ignore
/// let report = segment_and_analyze(&observations, start, end, &AnalysisConfig::default())?;
/// println!("{}", report.summary);
/// ```
pub fn segment_and_analyze(
    observations: &[ActivityObservation],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    config: &AnalysisConfig,
) -> Result<DailyReport, ComputeError> {
    run_pipeline(
        observations,
        window_start,
        window_end,
        config,
        &mut SequentialIdSource::new(),
        &SystemClock,
    )
}

/// Serialize a report as pretty-printed JSON
pub fn encode_report(report: &DailyReport) -> Result<String, ComputeError> {
    Ok(serde_json::to_string_pretty(report)?)
}

/// Run every stage of the pipeline.
///
/// Pipeline stages:
/// 1. Adapter - validate and order observations within the window
/// 2. Segmenter - group observations into work sessions
/// 3. Allocation - where the time went
/// 4. Efficiency - focus, deep work and rating
/// 5. Patterns - temporal, causal and anomaly detection
/// 6. Insights - recommendations from patterns and metrics
/// 7. Summary - plain-text review
fn run_pipeline(
    observations: &[ActivityObservation],
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    config: &AnalysisConfig,
    ids: &mut dyn IdSource,
    clock: &dyn Clock,
) -> Result<DailyReport, ComputeError> {
    config.validate()?;
    let window = AnalysisWindow::new(window_start, window_end)?;

    // Stage 1: Validate and order
    let ordered = prepare_observations(observations, &window)?;
    debug!("adapter: {} observations accepted", ordered.len());

    // Stage 2: Segment
    let work_sessions = segment_sessions(&ordered, config, ids);

    // Stage 3-4: Aggregate
    let time_allocation = analyze_time_allocation(&work_sessions, config);
    let efficiency_metrics = calculate_efficiency(&work_sessions, config);

    // Stage 5: Patterns
    let patterns = mine_patterns(
        &MiningInputs {
            sessions: &work_sessions,
            allocation: &time_allocation,
            efficiency: &efficiency_metrics,
            config,
        },
        ids,
        clock,
    );

    // Stage 6: Insights
    let insights = generate_insights(
        &InsightInputs {
            patterns: &patterns,
            efficiency: &efficiency_metrics,
            config,
        },
        ids,
    );

    // Stage 7: Summary
    let date = window_start.with_timezone(&config.offset_or_utc()).date_naive();
    let summary = compose_summary(&SummaryInputs {
        date,
        sessions: &work_sessions,
        allocation: &time_allocation,
        efficiency: &efficiency_metrics,
        patterns: &patterns,
        insights: &insights,
        config,
    });

    info!(
        "daily review {}: {} sessions, {:.2}h tracked, rating {}, {} patterns, {} insights",
        date,
        work_sessions.len(),
        time_allocation.total_work_hours,
        efficiency_metrics.efficiency_rating,
        patterns.len(),
        insights.len()
    );

    Ok(DailyReport {
        date,
        window_start,
        window_end,
        generated_at: clock.now(),
        work_sessions,
        time_allocation,
        efficiency_metrics,
        patterns,
        insights,
        summary,
    })
}

/// Reusable processor holding a configuration and its id/clock sources.
///
/// Identifiers keep advancing across calls, so two reports from the same
/// processor never share record ids.
pub struct DailyReviewProcessor {
    config: AnalysisConfig,
    ids: Box<dyn IdSource>,
    clock: Box<dyn Clock>,
}

impl Default for DailyReviewProcessor {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}

impl DailyReviewProcessor {
    /// Create a processor with UUID identifiers and the system clock
    pub fn new(config: AnalysisConfig) -> Self {
        Self::with_sources(config, Box::new(UuidIdSource), Box::new(SystemClock))
    }

    /// Create a processor with explicit id and clock sources
    pub fn with_sources(
        config: AnalysisConfig,
        ids: Box<dyn IdSource>,
        clock: Box<dyn Clock>,
    ) -> Self {
        Self { config, ids, clock }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Analyze already-parsed observations
    pub fn analyze(
        &mut self,
        observations: &[ActivityObservation],
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<DailyReport, ComputeError> {
        run_pipeline(
            observations,
            window_start,
            window_end,
            &self.config,
            self.ids.as_mut(),
            self.clock.as_ref(),
        )
    }

    /// Parse a JSON array of observations and analyze it
    pub fn analyze_json(
        &mut self,
        json: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<DailyReport, ComputeError> {
        let observations = parse_observations(json)?;
        self.analyze(&observations, window_start, window_end)
    }
}
