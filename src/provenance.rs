//! Identifier and clock sources
//!
//! Record identifiers and detection timestamps are injected rather than drawn
//! from process-wide state, so independent runs never share counters and tests
//! can pin both to fixed values.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Source of unique record identifiers
pub trait IdSource {
    /// Produce the next identifier (without any record-type prefix)
    fn next_id(&mut self) -> String;
}

/// Random v4 UUID identifiers
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIdSource;

impl IdSource for UuidIdSource {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

/// Monotonic counter identifiers (`1`, `2`, ...), for reproducible output
#[derive(Debug, Default, Clone)]
pub struct SequentialIdSource {
    next: u64,
}

impl SequentialIdSource {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdSource for SequentialIdSource {
    fn next_id(&mut self) -> String {
        self.next += 1;
        self.next.to_string()
    }
}

/// Source of the "detected at" timestamp
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to a single instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Prefixed identifier, e.g. `worksession-<id>`
pub(crate) fn prefixed_id(ids: &mut dyn IdSource, prefix: &str) -> String {
    format!("{prefix}-{}", ids.next_id())
}
