//! Date and time recognition.
//!
//! A [`DateTimeRecognizer`] is assembled from [`DateTimeRuleData`] for one
//! locale. Detection runs in stages:
//!
//! ```text
//! text ──> universal ─┐
//!          locale ────┼─> sub-rule expansion ──> matches ─┐
//!          backup ────┘   (arena of sub engines)          │
//!                                                          ├─> DateTimeFilter ──> Vec<MatchedDateTime>
//! text ──> clear engine ──────────────────────> clears ───┤
//! text ──> past engine  ──────────────────────> pasts  ───┘
//! ```
//!
//! Rule ids are numeric strings whose range decides the kind of a match (see
//! [`DateTimeKind::from_rule_id`]) and its base priority when matches overlap.
//! The filter then merges neighbours into date ranges, date-times and periods,
//! and finally drops matches covered by a clear rule or qualified by a past
//! marker.

#[path = "datetime/filter.rs"]
mod filter;
#[path = "datetime/matched.rs"]
mod matched;
#[path = "datetime/recognizer.rs"]
mod recognizer;
#[path = "datetime/rule_data.rs"]
mod rule_data;

pub use filter::DateTimeFilter;
pub use matched::{DateTimeKind, MatchedDateTime};
pub use recognizer::DateTimeRecognizer;
pub use rule_data::{DateTimeRuleData, DefaultLocale, NamedPattern, RuleEntry};
