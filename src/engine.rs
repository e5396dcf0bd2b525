//! Generic multi-rule regex engine.
//!
//! Both recognizers are built from the same parts: a [`RuleSet`] of
//! [`PatternRule`]s is compiled once into an immutable [`RuleEngine`], which
//! can then be shared across threads and asked for every match in a text.
//!
//! ## How the parts work together
//!
//! ```text
//! RuleSet { rules, params, params_backup, fragments }
//!     │
//!     │  RuleSet::expand          (rule_set.rs)
//!     │    [param_NAME] -> (?:\bA\b|\bB\b)
//!     │    [sub_NAME]   -> (?:fragment)
//!     v
//! CompiledPattern::new            (pattern.rs)
//!     - case folding, backtrack limit
//!     - failures logged, rule skipped
//!     │
//!     v
//! RuleEngine::match_text          (rules_engine.rs)
//!     - input capped at max_input_len
//!     - every rule in order, leftmost-first, non-overlapping
//!     - empty matches dropped
//!     │
//!     v
//! Vec<RuleMatch { span, rule_id, sub_rule }>
//! ```
//!
//! The engine does no ordering or de-duplication across rules; whichever
//! recognizer consumes the matches does that.
//!
//! ## Responsibilities by module
//!
//! - `pattern.rs`: thin wrapper over `fancy_regex` (lookaround support) with
//!   find / full-match / capture helpers that never panic.
//! - `rule_set.rs`: rule and rule set types plus placeholder expansion.
//! - `rules_engine.rs`: compilation and matching.
//! - `metrics.rs`: optional per-stage timings.

#[path = "engine/metrics.rs"]
mod metrics;
#[path = "engine/pattern.rs"]
mod pattern;
#[path = "engine/rule_set.rs"]
mod rule_set;
#[path = "engine/rules_engine.rs"]
mod rules_engine;

pub use metrics::{DateMetrics, DetectMetrics, StageMetrics};
pub use pattern::CompiledPattern;
pub use rule_set::{PatternRule, RuleCategory, RuleSet};
pub use rules_engine::{RuleEngine, RuleMatch};
