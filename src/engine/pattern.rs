//! Compiled regex wrapper.
//!
//! Rule data is written against an ICU-flavoured dialect (lookbehind,
//! lookahead, `\b`), so patterns compile with `fancy_regex`. Every search
//! returns plain values: a runtime failure (usually the backtrack limit) is
//! logged and treated as "no more matches".

use crate::Span;
use crate::config::EngineLimits;
use fancy_regex::{Regex, RegexBuilder};

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    source: String,
    regex: Regex,
}

impl CompiledPattern {
    pub fn new(pattern: &str, case_insensitive: bool, limits: &EngineLimits) -> Result<Self, fancy_regex::Error> {
        let effective = if case_insensitive { format!("(?i){pattern}") } else { pattern.to_string() };
        let regex = RegexBuilder::new(&effective).backtrack_limit(limits.backtrack_limit).build()?;
        Ok(CompiledPattern { source: pattern.to_string(), regex })
    }

    /// Compile a pattern that must cover its whole input.
    pub fn anchored(pattern: &str, case_insensitive: bool, limits: &EngineLimits) -> Result<Self, fancy_regex::Error> {
        let mut compiled = Self::new(&format!("^(?:{pattern})$"), case_insensitive, limits)?;
        compiled.source = pattern.to_string();
        Ok(compiled)
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Leftmost match.
    pub fn find(&self, text: &str) -> Option<Span> {
        match self.regex.find(text) {
            Ok(found) => found.map(|m| Span::new(m.start(), m.end())),
            Err(err) => {
                log::warn!("pattern '{}' aborted: {err}", self.source);
                None
            }
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.find(text).is_some()
    }

    /// All non-overlapping matches, leftmost-first.
    pub fn find_all(&self, text: &str) -> Vec<Span> {
        let mut spans = Vec::new();
        for found in self.regex.find_iter(text) {
            match found {
                Ok(m) => spans.push(Span::new(m.start(), m.end())),
                Err(err) => {
                    log::warn!("pattern '{}' aborted after {} matches: {err}", self.source, spans.len());
                    break;
                }
            }
        }
        spans
    }

    /// Span of the leftmost match and the text of capture `group` within it.
    pub fn capture<'t>(&self, text: &'t str, group: usize) -> Option<(Span, &'t str)> {
        match self.regex.captures(text) {
            Ok(Some(caps)) => {
                let whole = caps.get(0)?;
                let inner = caps.get(group).map(|m| m.as_str()).unwrap_or("");
                Some((Span::new(whole.start(), whole.end()), inner))
            }
            Ok(None) => None,
            Err(err) => {
                log::warn!("pattern '{}' aborted: {err}", self.source);
                None
            }
        }
    }
}
