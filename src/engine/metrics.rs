//! Detection metrics.
//!
//! Timings are collected per stage so a slow rule file shows up as a slow
//! stage rather than a slow call. They are returned by
//! `EntityRecognizer::find_entity_info_with_metrics` and
//! `DateTimeRecognizer::detect_with_metrics`; the plain entry points discard
//! them.

use std::time::Duration;

/// Timing and output count for one stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StageMetrics {
    pub duration: Duration,
    /// Number of items the stage produced.
    pub produced: usize,
}

/// Timings for one run of the date/time recognizer.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DateMetrics {
    pub total: Duration,
    /// Primary engines plus sub-rule expansion.
    pub primary: StageMetrics,
    pub clear: StageMetrics,
    pub past: StageMetrics,
    /// Final filter; `produced` is the number of surviving matches.
    pub filter: StageMetrics,
}

/// Timings for one `find_entity_info` call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DetectMetrics {
    pub total: Duration,
    /// Full-width normalisation.
    pub normalize: Duration,
    pub phone: StageMetrics,
    pub date: DateMetrics,
}
