//! Phone number recognition.
//!
//! Raw candidates come from the `number` find rule and an external
//! [`PhoneNumberLibrary`]; everything here is the heuristic layer on top:
//!
//! ```text
//! text ──> negative rules mask (length preserving, 'A')
//!        │
//!        v
//!      find rule `number` ──> PhoneCandidate { span, raw, parsed }
//!        │
//!        ├─ border rules       (veto on a ±10 char window)
//!        ├─ PhoneCandidateValidator   (numbering-plan digit heuristics)
//!        ├─ valid number? ──> accepted, masked
//!        └─ PhoneBoundaryRefiner      (first positive rule that yields spans)
//!        │
//!        v
//!      find rule `short` on the masked text ──> possible short numbers
//!        │
//!        v
//!      de-duplicate, strip a leading unbalanced bracket ──> Vec<MatchedPhone>
//! ```
//!
//! A region without rule data only keeps candidates the library considers
//! valid, plus short numbers.
//!
//! Offsets are byte offsets into the text handed to the matcher.

#[path = "phone/library.rs"]
mod library;
#[path = "phone/matcher.rs"]
mod matcher;
#[path = "phone/refiner.rs"]
mod refiner;
#[path = "phone/rule_data.rs"]
mod rule_data;
#[path = "phone/validator.rs"]
mod validator;

#[cfg(feature = "phonenumber")]
pub use library::PhonenumberCrate;
pub use library::{ParsedNumber, PhoneNumberLibrary};
pub use matcher::PhoneNumberMatcher;
pub use refiner::{HandleKind, PhoneBoundaryRefiner};
pub use rule_data::{BorderEntry, BorderKind, CodeEntry, FindNumberRules, PhoneRuleData, PositiveEntry, RegexEntry};
pub use validator::{PhoneCandidateValidator, ValidKind};

use crate::Span;

/// An unconfirmed number found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneCandidate {
    pub span: Span,
    /// Text of the span as matched, separators and brackets included.
    pub raw: String,
    pub parsed: Option<ParsedNumber>,
}

impl PhoneCandidate {
    pub fn new(begin: usize, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        PhoneCandidate { span: Span::new(begin, begin + raw.len()), raw, parsed: None }
    }

    pub fn with_parsed(mut self, parsed: ParsedNumber) -> Self {
        self.parsed = Some(parsed);
        self
    }
}

/// A confirmed phone number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedPhone {
    pub span: Span,
    pub content: String,
}

impl MatchedPhone {
    pub fn new(span: Span, content: impl Into<String>) -> Self {
        MatchedPhone { span, content: content.into() }
    }

    /// The `[0, 1)` marker produced by gating-only positive rules.
    pub fn is_placeholder(&self) -> bool {
        self.content.is_empty()
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::{ParsedNumber, PhoneNumberLibrary};
    use crate::error::PhoneLibraryError;
    use std::collections::HashSet;

    /// Deterministic stand-in for a numbering-plan library: numbers are valid
    /// when their digits are listed.
    #[derive(Debug, Default)]
    pub struct FakeLibrary {
        valid: HashSet<String>,
        short: HashSet<String>,
    }

    impl FakeLibrary {
        pub fn new(valid: &[&str], short: &[&str]) -> Self {
            FakeLibrary {
                valid: valid.iter().map(|s| s.to_string()).collect(),
                short: short.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    fn digits(s: &str) -> String {
        s.chars().filter(char::is_ascii_digit).collect()
    }

    impl PhoneNumberLibrary for FakeLibrary {
        fn parse(&self, number: &str, region: &str) -> Result<ParsedNumber, PhoneLibraryError> {
            let national = digits(number);
            if national.is_empty() {
                return Err(PhoneLibraryError::NotANumber(number.to_string()));
            }
            if national.len() > 17 {
                return Err(PhoneLibraryError::TooLong);
            }
            Ok(ParsedNumber {
                country_code: 86,
                national_number: national.parse().map_err(|_| PhoneLibraryError::TooLong)?,
                raw_input: number.to_string(),
                region: region.to_string(),
            })
        }

        fn is_valid_number(&self, number: &ParsedNumber) -> bool {
            self.valid.contains(&digits(&number.raw_input))
        }

        fn is_valid_short_number(&self, number: &ParsedNumber) -> bool {
            self.short.contains(&digits(&number.raw_input))
        }

        fn is_possible_short_number_for_region(&self, number: &ParsedNumber, _region: &str) -> bool {
            self.short.contains(&digits(&number.raw_input))
        }
    }
}
