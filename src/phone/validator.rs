//! Numbering-plan heuristics that accept or reject a candidate.

use super::PhoneCandidate;
use crate::Span;
use crate::text::{count_digits, slice, starts_with_bracket, tail};
use serde::Deserialize;

/// Service-number prefixes allowed in front of a long `1…` dialing string.
static SERVICE_PREFIXES: [&str; 5] = ["11808", "17909", "12593", "17951", "17911"];

static TOLL_FREE_PREFIXES: [&str; 2] = ["400", "800"];

/// Which check a `codes` rule applies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
pub enum ValidKind {
    /// Accept everything.
    #[default]
    Default,
    /// Reject a number glued to a two-capital-letter code.
    PreSuf,
    /// Digit-count rules on the normalised number.
    Code,
    /// Digit-count rules on the raw matched string.
    Rawstr,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PhoneCandidateValidator {
    kind: ValidKind,
}

impl PhoneCandidateValidator {
    pub fn new(kind: ValidKind) -> Self {
        PhoneCandidateValidator { kind }
    }

    pub fn kind(&self) -> ValidKind {
        self.kind
    }

    /// `message` is the text the candidate's span points into.
    pub fn validate(&self, candidate: &PhoneCandidate, message: &str) -> bool {
        match self.kind {
            ValidKind::Default => true,
            ValidKind::PreSuf => Self::validate_affixes(candidate, message),
            ValidKind::Code => Self::validate_code(&candidate.raw),
            ValidKind::Rawstr => Self::validate_raw(&candidate.raw),
        }
    }

    pub fn validate_code(raw: &str) -> bool {
        let mut number = strip_extension(raw);
        if starts_with_bracket(number) {
            number = resolve_leading_bracket(number);
        }
        number_valid(number)
    }

    pub fn validate_raw(raw: &str) -> bool {
        let mut number = strip_extension(raw);
        if starts_with_bracket(number) {
            number = &number[1..];
        }
        let digits = count_digits(number);
        let eight_without_trunk = !number.starts_with('0') && digits == 8;
        !(eight_without_trunk || digits <= 4)
    }

    /// Only one side is looked at: the prefix when there is one, otherwise the
    /// suffix.
    pub fn validate_affixes(candidate: &PhoneCandidate, message: &str) -> bool {
        let Span { begin, end } = candidate.span;
        if begin >= 1 {
            return !capital_code(slice(message, 0, begin).chars().rev());
        }
        if end < message.len() {
            return !capital_code(tail(message, end).chars());
        }
        true
    }
}

fn strip_extension(raw: &str) -> &str {
    let trimmed = raw.trim();
    match trimmed.find(";ext=") {
        Some(index) => &trimmed[..index],
        None => raw,
    }
}

/// `(12345)67` is an area code in brackets followed by a short tail: keep the
/// bracket content. Anything else just loses the opening bracket.
fn resolve_leading_bracket(number: &str) -> &str {
    let close = if number.starts_with('(') { ')' } else { ']' };
    let Some(index) = number.find(close) else {
        return &number[1..];
    };
    let inside = count_digits(&number[..index]);
    let outside = count_digits(&number[index..]);
    if inside > 4 && (outside == 1 || outside == 2) { &number[1..index] } else { &number[1..] }
}

fn has_trunk_prefix(number: &str) -> bool {
    number.starts_with(['0', '1', '+'])
}

fn has_toll_free_prefix(number: &str) -> bool {
    TOLL_FREE_PREFIXES.iter().any(|p| number.starts_with(p))
}

fn number_valid(number: &str) -> bool {
    let mut chars = number.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    let digits = count_digits(number);
    if first == '1' && digits > 11 {
        return SERVICE_PREFIXES.iter().any(|p| number.starts_with(p));
    }
    if first == '0' && digits > 12 && chars.next() != Some('0') {
        return false;
    }
    if has_toll_free_prefix(number) && digits != 10 {
        return false;
    }
    if !has_trunk_prefix(number) && !has_toll_free_prefix(number) && digits >= 9 {
        return number.trim_start().starts_with(['9', '1']);
    }
    digits > 4
}

/// Whether `chars`, read away from the number, open with a one or two
/// letter capital code such as `ID` that is not part of a longer word.
fn capital_code(chars: impl Iterator<Item = char>) -> bool {
    for (i, c) in chars.enumerate() {
        if i == 0 && !c.is_uppercase() {
            return false;
        }
        if i < 2 && c.is_alphabetic() {
            if c.is_uppercase() {
                continue;
            }
            return false;
        }
        if c == '-' || c == '\'' {
            return false;
        }
        return !c.is_alphabetic();
    }
    true
}
