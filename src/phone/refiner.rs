//! Boundary correction for accepted candidates.
//!
//! Each positive rule pairs a pattern with a [`HandleKind`]. The pattern first
//! acts as a gate (it must match the candidate or the message), then the
//! handler decides which spans to report.

use super::{MatchedPhone, PhoneCandidate, PhoneNumberLibrary};
use crate::Span;
use crate::engine::CompiledPattern;
use crate::text::{slice, starts_with_bracket, strip_one_bracket};
use serde::Deserialize;

pub const DEFAULT_SLANT_REGION: &str = "CN";

pub const DEFAULT_BLANK_EXCLUSIONS: [&str; 1] = ["5201314"];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum HandleKind {
    /// Gate only: reports the `[0, 1)` placeholder.
    #[default]
    Default,
    /// The candidate itself, minus a leading bracket.
    Operator,
    /// The rule's match inside the candidate, unless it is a known non-number.
    Blank,
    /// Two short numbers separated by `/` or `|`.
    Slant,
    /// A longer match in the message that starts with the candidate.
    StartWithMobile,
    /// A longer match in the message that ends with the candidate.
    EndWithMobile,
}

#[derive(Debug, Clone)]
pub struct PhoneBoundaryRefiner {
    pattern: CompiledPattern,
    handle: HandleKind,
    slant_region: String,
    blank_exclusions: Vec<String>,
}

impl PhoneBoundaryRefiner {
    pub fn new(pattern: CompiledPattern, handle: HandleKind) -> Self {
        PhoneBoundaryRefiner {
            pattern,
            handle,
            slant_region: DEFAULT_SLANT_REGION.to_string(),
            blank_exclusions: DEFAULT_BLANK_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Region used to parse the halves of a slash-separated pair.
    pub fn with_slant_region(mut self, region: impl Into<String>) -> Self {
        self.slant_region = region.into();
        self
    }

    /// Exact strings the `Blank` handler never reports.
    pub fn with_blank_exclusions(mut self, exclusions: Vec<String>) -> Self {
        self.blank_exclusions = exclusions;
        self
    }

    pub fn handle(&self) -> HandleKind {
        self.handle
    }

    /// Zero, one or two corrected spans for `candidate`, in `message` offsets.
    pub fn refine(
        &self,
        candidate: &PhoneCandidate,
        message: &str,
        library: &dyn PhoneNumberLibrary,
    ) -> Vec<MatchedPhone> {
        let gated =
            self.pattern.is_match(strip_one_bracket(&candidate.raw)) || self.pattern.is_match(message);
        if !gated {
            return Vec::new();
        }
        match self.handle {
            HandleKind::Default => vec![MatchedPhone::new(Span::new(0, 1), "")],
            HandleKind::Operator => self.operator(candidate),
            HandleKind::Blank => self.blank(candidate),
            HandleKind::Slant => self.slant(candidate, library),
            HandleKind::StartWithMobile => self.around_mobile(candidate, message, true),
            HandleKind::EndWithMobile => self.around_mobile(candidate, message, false),
        }
    }

    fn operator(&self, candidate: &PhoneCandidate) -> Vec<MatchedPhone> {
        let raw = candidate.raw.as_str();
        let skip = usize::from(starts_with_bracket(raw));
        let span = Span::new(candidate.span.begin + skip, candidate.span.end);
        vec![MatchedPhone::new(span, &raw[skip..])]
    }

    fn blank(&self, candidate: &PhoneCandidate) -> Vec<MatchedPhone> {
        let raw = candidate.raw.as_str();
        let Some(found) = self.pattern.find(raw) else {
            return Vec::new();
        };
        let repeated_threes = fancy_regex!(r"(?<![-\d])(23{6,7})(?![-\d])").is_match(raw).unwrap_or(false);
        if repeated_threes || self.blank_exclusions.iter().any(|e| e == raw) {
            log::debug!("blank rule drops non-number '{raw}'");
            return Vec::new();
        }
        let begin = if starts_with_bracket(raw) { candidate.span.begin } else { candidate.span.begin + found.begin };
        vec![MatchedPhone::new(Span::new(begin, candidate.span.begin + found.end), raw)]
    }

    fn slant(&self, candidate: &PhoneCandidate, library: &dyn PhoneNumberLibrary) -> Vec<MatchedPhone> {
        let raw = candidate.raw.as_str();
        let Some(found) = self.pattern.find(raw) else {
            return Vec::new();
        };
        let halves = self.short_halves(raw, library);
        let shift = if halves.len() == 2 && found.begin == 1 { 0 } else { found.begin };
        halves
            .into_iter()
            .filter_map(|half| {
                let begin = candidate.span.begin + half.span.begin + shift;
                let end = candidate.span.begin + half.span.end;
                (begin < end).then(|| MatchedPhone::new(Span::new(begin, end), half.content))
            })
            .collect()
    }

    /// Halves around the last separator that are valid short numbers, in
    /// `raw` offsets.
    fn short_halves(&self, raw: &str, library: &dyn PhoneNumberLibrary) -> Vec<MatchedPhone> {
        let Some(split) = raw.rfind(['/', '|']) else {
            return Vec::new();
        };
        let halves = [Span::new(0, split), Span::new(split + 1, raw.len())];
        halves
            .into_iter()
            .filter_map(|span| {
                let half = slice(raw, span.begin, span.end);
                match library.parse(half, &self.slant_region) {
                    Ok(parsed) if library.is_valid_short_number(&parsed) => Some(MatchedPhone::new(span, half)),
                    Ok(_) => None,
                    Err(err) => {
                        log::debug!("slant half '{half}' not parsed: {err}");
                        None
                    }
                }
            })
            .collect()
    }

    fn around_mobile(&self, candidate: &PhoneCandidate, message: &str, at_start: bool) -> Vec<MatchedPhone> {
        let raw = candidate.raw.as_str();
        if raw.is_empty() {
            return Vec::new();
        }
        self.pattern
            .find_all(message)
            .into_iter()
            .filter_map(|m| {
                let matched = slice(message, m.begin, m.end);
                if at_start && matched.starts_with(raw) {
                    Some(Span::new(m.begin, m.begin + raw.len()))
                } else if !at_start && matched.ends_with(raw) {
                    Some(Span::new(m.end - raw.len(), m.end))
                } else {
                    None
                }
            })
            .map(|span| MatchedPhone::new(span, raw))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineLimits;
    use crate::error::PhoneLibraryError;
    use crate::phone::ParsedNumber;
    use crate::phone::test_support::FakeLibrary;

    fn refiner(pattern: &str, handle: HandleKind) -> PhoneBoundaryRefiner {
        PhoneBoundaryRefiner::new(CompiledPattern::new(pattern, false, &EngineLimits::default()).unwrap(), handle)
    }

    fn spans(found: &[MatchedPhone]) -> Vec<(usize, usize)> {
        found.iter().map(|m| (m.span.begin, m.span.end)).collect()
    }

    fn candidate_in(message: &str, raw: &str) -> PhoneCandidate {
        PhoneCandidate::new(message.find(raw).unwrap(), raw)
    }

    #[test]
    fn gate_must_match_candidate_or_message() {
        let lib = FakeLibrary::default();
        let r = refiner(r"\bhotline\b", HandleKind::Operator);
        let message = "call 95588 today";
        assert!(r.refine(&candidate_in(message, "95588"), message, &lib).is_empty());

        let message = "hotline 95588";
        assert_eq!(spans(&r.refine(&candidate_in(message, "95588"), message, &lib)), vec![(8, 13)]);
    }

    #[test]
    fn default_is_a_placeholder() {
        let lib = FakeLibrary::default();
        let message = "dial 10086";
        let found = refiner(r"\d+", HandleKind::Default).refine(&candidate_in(message, "10086"), message, &lib);
        assert_eq!(spans(&found), vec![(0, 1)]);
        assert!(found[0].is_placeholder());
    }

    #[test]
    fn operator_skips_the_opening_bracket() {
        let lib = FakeLibrary::default();
        let message = "operator: (1008612345 ext";
        let found = refiner(r"\d{5,}", HandleKind::Operator).refine(
            &candidate_in(message, "(1008612345"),
            message,
            &lib,
        );
        assert_eq!(spans(&found), vec![(11, 21)]);
        assert_eq!(found[0].content, "1008612345");
    }

    #[test]
    fn blank_rejects_known_non_numbers() {
        let lib = FakeLibrary::default();
        let r = refiner(r"\d{3} ?\d{4}", HandleKind::Blank);
        for noise in ["5201314", "2333333", "23333333"] {
            let message = format!("haha {noise}");
            assert!(r.refine(&candidate_in(&message, noise), &message, &lib).is_empty(), "{noise}");
        }
        let message = "room 12-2333333";
        assert_eq!(spans(&r.refine(&candidate_in(message, "12-2333333"), message, &lib)), vec![(8, 15)]);

        let message = "tel (021 5555";
        assert_eq!(spans(&r.refine(&candidate_in(message, "(021 5555"), message, &lib)), vec![(4, 13)]);

        let custom = refiner(r"\d{7}", HandleKind::Blank).with_blank_exclusions(vec!["1234567".into()]);
        let message = "pin 1234567 ok 5201314";
        assert!(custom.refine(&candidate_in(message, "1234567"), message, &lib).is_empty());
        assert_eq!(spans(&custom.refine(&candidate_in(message, "5201314"), message, &lib)), vec![(15, 22)]);
    }

    #[test]
    fn slant_keeps_valid_short_halves() {
        let lib = FakeLibrary::new(&[], &["67890"]);
        let r = refiner(r"\d{5}/\d{5}", HandleKind::Slant);
        let message = "call 12345/67890 now";
        let found = r.refine(&candidate_in(message, "12345/67890"), message, &lib);
        assert_eq!(spans(&found), vec![(11, 16)]);
        assert_eq!(found[0].content, "67890");

        let both = FakeLibrary::new(&[], &["12345", "67890"]);
        let message = "call 12345|67890";
        assert!(r.refine(&candidate_in(message, "12345|67890"), message, &both).is_empty());
        let pipe = refiner(r"\d{5}\|\d{5}", HandleKind::Slant);
        assert_eq!(spans(&pipe.refine(&candidate_in(message, "12345|67890"), message, &both)), vec![(5, 10), (11, 16)]);

        let message = "no separator 12345";
        assert!(r.refine(&candidate_in(message, "12345"), message, &both).is_empty());
    }

    #[test]
    fn slant_region_is_configurable() {
        #[derive(Debug)]
        struct RegionLibrary;
        impl PhoneNumberLibrary for RegionLibrary {
            fn parse(&self, number: &str, region: &str) -> Result<ParsedNumber, PhoneLibraryError> {
                if region != "HK" {
                    return Err(PhoneLibraryError::UnknownRegion(region.to_string()));
                }
                Ok(ParsedNumber {
                    country_code: 852,
                    national_number: number.parse().unwrap_or(0),
                    raw_input: number.to_string(),
                    region: region.to_string(),
                })
            }
            fn is_valid_number(&self, _: &ParsedNumber) -> bool {
                false
            }
            fn is_valid_short_number(&self, _: &ParsedNumber) -> bool {
                true
            }
            fn is_possible_short_number_for_region(&self, _: &ParsedNumber, _: &str) -> bool {
                true
            }
        }
        let message = "999/112";
        let candidate = PhoneCandidate::new(0, message);
        let r = refiner(r"\d+/\d+", HandleKind::Slant);
        assert!(r.refine(&candidate, message, &RegionLibrary).is_empty());
        let hk = r.with_slant_region("HK");
        assert_eq!(spans(&hk.refine(&candidate, message, &RegionLibrary)), vec![(0, 3), (4, 7)]);
    }

    #[test]
    fn mobile_prefix_and_suffix_runs() {
        let lib = FakeLibrary::default();
        let message = "tel: 13812345678-800 or 010-13812345678";
        let mobile = "13812345678";

        let start = refiner(r"\d{11}-\d{3}", HandleKind::StartWithMobile);
        let found = start.refine(&PhoneCandidate::new(5, mobile), message, &lib);
        assert_eq!(spans(&found), vec![(5, 16)]);

        let end = refiner(r"\d{3}-\d{11}", HandleKind::EndWithMobile);
        let found = end.refine(&PhoneCandidate::new(28, mobile), message, &lib);
        assert_eq!(spans(&found), vec![(28, 39)]);
    }
}
