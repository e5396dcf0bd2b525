use super::refiner::PhoneBoundaryRefiner;
use super::rule_data::{BorderKind, PhoneRuleData, RegexEntry};
use super::validator::PhoneCandidateValidator;
use super::{MatchedPhone, PhoneCandidate, PhoneNumberLibrary};
use crate::Span;
use crate::config::EngineLimits;
use crate::engine::CompiledPattern;
use crate::text::{self, count_digits, is_open_bracket, slice};
use std::collections::HashSet;

/// Characters of context each side of a candidate that border rules see.
const BORDER_WINDOW: usize = 10;

/// Minimum digits for a find-rule hit to become a candidate.
const MIN_CANDIDATE_DIGITS: usize = 5;

#[derive(Debug, Clone)]
struct BorderRule {
    pattern: CompiledPattern,
    kind: BorderKind,
}

impl BorderRule {
    /// False when a border match around `candidate` vetoes it.
    fn allows(&self, candidate: &PhoneCandidate, text: &str) -> bool {
        let Span { begin, end } = candidate.span;
        let window_begin = chars_before(text, begin, BORDER_WINDOW);
        let window_end = chars_after(text, end, BORDER_WINDOW);
        for found in self.pattern.find_all(slice(text, window_begin, window_end)) {
            let border = found.shift(window_begin);
            let contains = border.begin <= begin && end <= border.end;
            let vetoed = match self.kind {
                BorderKind::Contain => contains,
                BorderKind::ContainOrIntersect => contains || border.crosses(&candidate.span),
            };
            if vetoed {
                log::debug!("border rule '{}' vetoes '{}'", self.pattern.source(), candidate.raw);
                return false;
            }
        }
        true
    }
}

/// Phone number matcher for one region.
///
/// Built once from [`PhoneRuleData`]; the numbering-plan library is passed to
/// each call so one matcher can serve several library backends.
#[derive(Debug, Clone)]
pub struct PhoneNumberMatcher {
    region: String,
    fixed: bool,
    masks: Vec<CompiledPattern>,
    borders: Vec<BorderRule>,
    validators: Vec<PhoneCandidateValidator>,
    refiners: Vec<PhoneBoundaryRefiner>,
    short_short: Option<CompiledPattern>,
    number: Option<CompiledPattern>,
    short: Option<CompiledPattern>,
    limits: EngineLimits,
}

impl PhoneNumberMatcher {
    pub fn new(data: &PhoneRuleData, region: &str, limits: EngineLimits) -> Self {
        let compile_entry = |entry: &RegexEntry, what: &str| compile(&entry.pattern, entry.case_insensitive, what, &limits);
        let masks = data.masking_rules().filter_map(|entry| compile_entry(entry, "negative")).collect();
        let borders = data
            .border
            .iter()
            .filter_map(|entry| {
                let pattern = compile(&entry.pattern, entry.case_insensitive, "border", &limits)?;
                Some(BorderRule { pattern, kind: entry.kind })
            })
            .collect();
        let validators = data.codes.iter().map(|code| PhoneCandidateValidator::new(code.valid)).collect();
        let refiners = data
            .positive
            .iter()
            .filter_map(|entry| {
                let pattern = compile(&entry.pattern, entry.case_insensitive, "positive", &limits)?;
                Some(
                    PhoneBoundaryRefiner::new(pattern, entry.handle)
                        .with_slant_region(data.slant_region())
                        .with_blank_exclusions(data.blank_exclusions()),
                )
            })
            .collect();
        let find = &data.find_number;
        let number = find.number.as_ref().and_then(|e| compile_entry(e, "find_number.number"));
        if number.is_none() {
            log::warn!("[{region}] no usable find_number.number rule; only short numbers will be found");
        }
        PhoneNumberMatcher {
            region: region.to_string(),
            fixed: data.is_fixed,
            masks,
            borders,
            validators,
            refiners,
            short_short: find.short_short.as_ref().and_then(|e| compile_entry(e, "find_number.short_short")),
            number,
            short: find.short.as_ref().and_then(|e| compile_entry(e, "find_number.short")),
            limits,
        }
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Whether region-specific rules drive the matcher.
    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Confirmed phone numbers in `text`, in discovery order.
    pub fn find_numbers(&self, text: &str, library: &dyn PhoneNumberLibrary) -> Vec<MatchedPhone> {
        let text = text::truncate(text, self.limits.max_input_len);
        if text.is_empty() {
            return Vec::new();
        }
        if !self.fixed {
            return self.find_without_rules(text, library);
        }
        let mut filtered = self.mask_negatives(text);
        let mut found = self.possible_numbers(text, &mut filtered, library);
        found.extend(self.short_numbers(&filtered, library));
        finish(found)
    }

    fn find_without_rules(&self, text: &str, library: &dyn PhoneNumberLibrary) -> Vec<MatchedPhone> {
        let mut found: Vec<MatchedPhone> = self
            .candidates(text, library)
            .into_iter()
            .filter(|c| c.parsed.as_ref().is_some_and(|p| library.is_valid_number(p)))
            .map(|c| MatchedPhone::new(c.span, c.raw))
            .collect();
        found.extend(self.short_numbers(text, library));
        finish(found)
    }

    fn mask_negatives(&self, text: &str) -> String {
        let mut filtered = text.to_string();
        for pattern in &self.masks {
            let spans = pattern.find_all(&filtered);
            for span in spans {
                text::mask(&mut filtered, span.begin, span.end);
            }
        }
        filtered
    }

    /// Find-rule hits that parse; a hit the library rejects as a whole is
    /// retried segment by segment on spaces and slashes.
    fn candidates(&self, filtered: &str, library: &dyn PhoneNumberLibrary) -> Vec<PhoneCandidate> {
        let Some(number) = &self.number else {
            return Vec::new();
        };
        let mut candidates = Vec::new();
        for span in number.find_all(filtered) {
            let hit = slice(filtered, span.begin, span.end);
            if let Some(candidate) = self.candidate(hit, span.begin, library) {
                candidates.push(candidate);
                continue;
            }
            if !hit.contains([' ', '/']) {
                continue;
            }
            let mut offset = span.begin;
            for segment in hit.split([' ', '/']) {
                candidates.extend(self.candidate(segment, offset, library));
                offset += segment.len() + 1;
            }
        }
        candidates
    }

    fn candidate(&self, number: &str, begin: usize, library: &dyn PhoneNumberLibrary) -> Option<PhoneCandidate> {
        if count_digits(number) < MIN_CANDIDATE_DIGITS {
            return None;
        }
        let parsed = match library.parse(number, &self.region) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::debug!("[{}] '{number}' not parsed: {err}", self.region);
                return None;
            }
        };
        let delimited = number.contains([' ', '/']);
        if delimited && !library.is_valid_number(&parsed) {
            return None;
        }
        Some(PhoneCandidate::new(begin, number).with_parsed(parsed))
    }

    fn possible_numbers(
        &self,
        src: &str,
        filtered: &mut String,
        library: &dyn PhoneNumberLibrary,
    ) -> Vec<MatchedPhone> {
        let mut result = Vec::new();
        for candidate in self.candidates(filtered, library) {
            if !self.borders.iter().all(|rule| rule.allows(&candidate, filtered)) {
                continue;
            }
            if self.validators.is_empty() || !self.validators.iter().all(|v| v.validate(&candidate, src)) {
                continue;
            }
            let valid = candidate.parsed.as_ref().is_some_and(|p| library.is_valid_number(p));
            if valid {
                let pair = self.short_short.as_ref().is_some_and(|p| p.is_match(without_bracket(&candidate.raw)));
                if !pair {
                    text::mask(filtered, candidate.span.begin, candidate.span.end);
                    result.push(MatchedPhone::new(candidate.span, candidate.raw.clone()));
                    if self.short_short.is_some() {
                        continue;
                    }
                }
            }
            for refined in self.refine(&candidate, filtered, library) {
                text::mask(filtered, refined.span.begin, refined.span.end);
                result.push(refined);
            }
        }
        result
    }

    /// Spans from the first positive rule that reports any. Gate-only
    /// placeholders end the search without contributing a span.
    fn refine(&self, candidate: &PhoneCandidate, filtered: &str, library: &dyn PhoneNumberLibrary) -> Vec<MatchedPhone> {
        for refiner in &self.refiners {
            let found = refiner.refine(candidate, filtered, library);
            if !found.is_empty() {
                return found.into_iter().filter(|m| !m.is_placeholder()).collect();
            }
        }
        Vec::new()
    }

    fn short_numbers(&self, filtered: &str, library: &dyn PhoneNumberLibrary) -> Vec<MatchedPhone> {
        let Some(short) = &self.short else {
            return Vec::new();
        };
        short
            .find_all(filtered)
            .into_iter()
            .filter_map(|span| {
                let hit = slice(filtered, span.begin, span.end);
                let parsed = library.parse(hit, &self.region).ok()?;
                library
                    .is_possible_short_number_for_region(&parsed, &self.region)
                    .then(|| MatchedPhone::new(span, hit))
            })
            .collect()
    }
}

fn compile(pattern: &str, case_insensitive: bool, what: &str, limits: &EngineLimits) -> Option<CompiledPattern> {
    if pattern.is_empty() {
        return None;
    }
    match CompiledPattern::new(pattern, case_insensitive, limits) {
        Ok(compiled) => Some(compiled),
        Err(err) => {
            log::warn!("{what} rule '{pattern}' skipped: {err}");
            None
        }
    }
}

fn without_bracket(raw: &str) -> &str {
    raw.strip_prefix(is_open_bracket).unwrap_or(raw)
}

/// Keep the first result per span and drop a leading unbalanced bracket.
fn finish(found: Vec<MatchedPhone>) -> Vec<MatchedPhone> {
    let mut seen = HashSet::new();
    found
        .into_iter()
        .filter(|m| seen.insert(m.span))
        .map(|mut m| {
            if text::has_one_bracket(&m.content) {
                m.span.begin += 1;
                m.content.remove(0);
            }
            m
        })
        .collect()
}

fn chars_before(text: &str, offset: usize, count: usize) -> usize {
    text.get(..offset)
        .and_then(|head| head.char_indices().rev().nth(count - 1))
        .map_or(0, |(index, _)| index)
}

fn chars_after(text: &str, offset: usize, count: usize) -> usize {
    text.get(offset..)
        .and_then(|rest| rest.char_indices().nth(count))
        .map_or(text.len(), |(index, _)| offset + index)
}
