//! Rule compilation and matching.

use super::pattern::CompiledPattern;
use super::rule_set::{PatternRule, RuleSet};
use crate::Span;
use crate::config::EngineLimits;
use crate::error::PatternError;
use crate::text;
use std::sync::Arc;

/// One hit of one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleMatch {
    pub span: Span,
    pub rule_id: Arc<str>,
    /// Sub-rule set linked from the rule that matched.
    pub sub_rule: Option<Arc<str>>,
}

#[derive(Debug, Clone)]
struct CompiledRule {
    id: Arc<str>,
    sub_rule: Option<Arc<str>>,
    pattern: CompiledPattern,
}

/// Immutable, thread-shareable matcher over a compiled [`RuleSet`].
#[derive(Debug, Clone)]
pub struct RuleEngine {
    name: String,
    rules: Vec<CompiledRule>,
    limits: EngineLimits,
    skipped: usize,
}

impl RuleEngine {
    /// Compile every rule of `set`. Rules that fail to expand or compile are
    /// logged and left out; the engine is still usable.
    pub fn new(set: &RuleSet, limits: EngineLimits) -> Self {
        let mut rules = Vec::with_capacity(set.rules.len());
        let mut skipped = 0;
        for rule in &set.rules {
            match compile_rule(set, rule, &limits) {
                Ok(Some(compiled)) => rules.push(compiled),
                Ok(None) => {
                    skipped += 1;
                }
                Err(err) => {
                    log::warn!("[{}] {err}", set.name);
                    skipped += 1;
                }
            }
        }
        log::debug!("[{}] compiled {} rules ({} skipped)", set.name, rules.len(), skipped);
        RuleEngine { name: set.name.clone(), rules, limits, skipped }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of usable rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Number of rules dropped at construction.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Every match of every rule, rules in declaration order.
    ///
    /// No ordering or de-duplication across rules is applied.
    pub fn match_text(&self, text: &str) -> Vec<RuleMatch> {
        let text = self.bounded(text);
        let mut matches = Vec::new();
        if text.is_empty() {
            return matches;
        }
        for rule in &self.rules {
            for span in rule.pattern.find_all(text) {
                if span.is_empty() {
                    continue;
                }
                matches.push(RuleMatch { span, rule_id: rule.id.clone(), sub_rule: rule.sub_rule.clone() });
            }
        }
        matches
    }

    /// Leftmost match of the first rule (in order) that matches at all.
    pub fn first_match(&self, text: &str) -> Option<RuleMatch> {
        let text = self.bounded(text);
        self.rules.iter().find_map(|rule| {
            rule.pattern
                .find_all(text)
                .into_iter()
                .find(|span| !span.is_empty())
                .map(|span| RuleMatch { span, rule_id: rule.id.clone(), sub_rule: rule.sub_rule.clone() })
        })
    }

    fn bounded<'t>(&self, text: &'t str) -> &'t str {
        let capped = text::truncate(text, self.limits.max_input_len);
        if capped.len() < text.len() {
            log::debug!("[{}] input of {} bytes capped at {}", self.name, text.len(), capped.len());
        }
        capped
    }
}

fn compile_rule(set: &RuleSet, rule: &PatternRule, limits: &EngineLimits) -> Result<Option<CompiledRule>, PatternError> {
    if rule.regex.is_empty() {
        log::debug!("[{}] rule '{}' has an empty pattern", set.name, rule.id);
        return Ok(None);
    }
    let expanded = match set.expand(&rule.regex) {
        Ok(expanded) => expanded,
        Err(placeholder) => {
            log::warn!("[{}] rule '{}' references undefined {placeholder}", set.name, rule.id);
            return Ok(None);
        }
    };
    let pattern = CompiledPattern::new(&expanded, rule.case_insensitive, limits)
        .map_err(|source| PatternError { id: rule.id.clone(), source: Box::new(source) })?;
    Ok(Some(CompiledRule {
        id: Arc::from(rule.id.as_str()),
        sub_rule: rule.linked_sub_rule.as_deref().map(Arc::from),
        pattern,
    }))
}
