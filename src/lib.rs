//! Rule-driven recognition of dates, times and phone numbers in free text.
//!
//! Everything is driven by JSON rule data: per-locale regex rules for
//! dates/times and per-region rules for phone numbers. No model, no network;
//! the same input and the same rules always give the same spans.
//!
//! ```text
//! text ──> NormalizedText ──┬──> PhoneNumberMatcher ──> phone entities
//!                           │      (mask, candidates, codes, positive rules)
//!                           └──> DateTimeRecognizer ──> date entities
//!                                  (universal / locale / backup engines,
//!                                   sub rules, DateTimeFilter)
//! ```
//!
//! Most callers only need [`EntityRecognizer`]:
//!
//! ```no_run
//! use entity_recognizer::{EntityRecognizer, RecognizerConfig};
//!
//! let config = RecognizerConfig { rules_dir: Some("data".into()), ..Default::default() };
//! let recognizer = EntityRecognizer::from_config(config)?;
//! for entity in recognizer.find_entity_info("call 400-810-8000 on 2024-01-05") {
//!     println!("{} {}..{} {}", entity.kind, entity.begin, entity.end, entity.body);
//! }
//! # Ok::<(), entity_recognizer::RuleDataError>(())
//! ```

#[macro_use]
mod macros;
mod api;
mod config;
mod datetime;
mod engine;
mod error;
mod loader;
mod phone;
mod text;

pub use api::{DEFAULT_RULES_DIR, Detection, Entity, EntityKind, EntityRecognizer};
pub use config::{DEFAULT_BACKTRACK_LIMIT, DEFAULT_MAX_INPUT_LEN, EngineLimits, EntityKinds, RecognizerConfig};
pub use datetime::{
    DateTimeFilter, DateTimeKind, DateTimeRecognizer, DateTimeRuleData, DefaultLocale, MatchedDateTime, NamedPattern,
    RuleEntry,
};
pub use engine::{
    CompiledPattern, DateMetrics, DetectMetrics, PatternRule, RuleCategory, RuleEngine, RuleMatch, RuleSet,
    StageMetrics,
};
pub use error::{PatternError, PhoneLibraryError, RuleDataError};
pub use loader::RuleDataLoader;
#[cfg(feature = "phonenumber")]
pub use phone::PhonenumberCrate;
pub use phone::{
    BorderEntry, BorderKind, CodeEntry, FindNumberRules, HandleKind, MatchedPhone, ParsedNumber,
    PhoneBoundaryRefiner, PhoneCandidate, PhoneCandidateValidator, PhoneNumberLibrary, PhoneNumberMatcher,
    PhoneRuleData, PositiveEntry, RegexEntry, ValidKind,
};
pub use text::{InputTraits, NormalizedText, OffsetUnit};

/// Half-open byte range `[begin, end)` into the text being matched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Span {
    pub begin: usize,
    pub end: usize,
}

impl Span {
    pub fn new(begin: usize, end: usize) -> Self {
        Span { begin, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.begin)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.begin
    }

    /// `other` lies inside `self` (bounds included).
    pub fn contains(&self, other: &Span) -> bool {
        self.begin <= other.begin && other.end <= self.end
    }

    /// The spans overlap without either containing the other.
    pub fn crosses(&self, other: &Span) -> bool {
        (self.begin < other.begin && other.begin < self.end && self.end < other.end)
            || (other.begin < self.begin && self.begin < other.end && other.end < self.end)
    }

    /// Move both ends right by `by` bytes.
    pub fn shift(self, by: usize) -> Span {
        Span { begin: self.begin + by, end: self.end + by }
    }
}
