//! Growth Review - deterministic daily productivity review
//!
//! Turns a day's captured foreground-app observations into a structured
//! report through a deterministic pipeline: observation adaptation → session
//! segmentation → time allocation → efficiency scoring → pattern mining →
//! insight generation → text summary.
//!
//! Identifiers and detection timestamps are injected through
//! [`IdSource`] and [`Clock`], so identical inputs with fixed sources produce
//! byte-identical reports.

pub mod adapter;
pub mod allocation;
pub mod apps;
pub mod config;
pub mod efficiency;
pub mod error;
pub mod insights;
pub mod patterns;
pub mod pipeline;
pub mod provenance;
pub mod segmenter;
pub mod stats;
pub mod summary;
pub mod types;

pub use adapter::AnalysisWindow;
pub use config::AnalysisConfig;
pub use error::ComputeError;
pub use pipeline::{encode_report, segment_and_analyze, DailyReviewProcessor};
pub use provenance::{Clock, FixedClock, IdSource, SequentialIdSource, SystemClock, UuidIdSource};
pub use types::{
    ActivityObservation, ActivityType, DailyReport, EfficiencyMetrics, EfficiencyRating, Insight,
    InsightCategory, Pattern, PatternType, TimeAllocation, WorkSession,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
