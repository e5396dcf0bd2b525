//! Rules and rule sets.
//!
//! Patterns may reference two kinds of placeholder that are expanded before
//! compilation:
//!
//! - `[param_NAME]`: a `|`-separated word list from the parameter table
//!   (falling back to the backup table). Each alternative gets the locale
//!   delimiter on both sides unless it already carries a `\b` (or ends with a
//!   `.`), so `Mon|Tue.` becomes `(?:\bMon\b|\bTue.)`.
//! - `[sub_NAME]`: a shared regex fragment, inlined as `(?:fragment)`.
//!
//! Fragments may themselves contain placeholders; expansion repeats until none
//! are left or the nesting limit is reached.

use serde::Deserialize;
use std::collections::HashMap;

const DEFAULT_DELIMITER: &str = r"\b";
const MAX_EXPANSION_DEPTH: usize = 8;

/// Which stage of a recognizer a rule feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Universal,
    Locale,
    Sub,
    Filter,
    Past,
}

/// One regex plus the metadata the recognizers need.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternRule {
    /// Numeric rule ids carry meaning (see `datetime::DateTimeKind`), but any
    /// string is accepted.
    pub id: String,
    pub regex: String,
    pub case_insensitive: bool,
    pub category: RuleCategory,
    /// Sub-rule set that refines this rule's matches.
    pub linked_sub_rule: Option<String>,
    /// Declared priority bonus used when overlapping matches compete.
    pub level: Option<i32>,
}

impl PatternRule {
    pub fn new(id: impl Into<String>, regex: impl Into<String>, category: RuleCategory) -> Self {
        PatternRule {
            id: id.into(),
            regex: regex.into(),
            case_insensitive: false,
            category,
            linked_sub_rule: None,
            level: None,
        }
    }

    pub fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    pub fn linked_to(mut self, sub_rule: impl Into<String>) -> Self {
        self.linked_sub_rule = Some(sub_rule.into());
        self
    }

    pub fn with_level(mut self, level: i32) -> Self {
        self.level = Some(level);
        self
    }
}

/// An ordered, named collection of rules and the tables their patterns share.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    pub name: String,
    pub rules: Vec<PatternRule>,
    pub params: HashMap<String, String>,
    pub params_backup: HashMap<String, String>,
    pub fragments: HashMap<String, String>,
    /// Word delimiter wrapped around parameter alternatives; `\b` when unset.
    pub delimiter: Option<String>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>) -> Self {
        RuleSet { name: name.into(), ..Default::default() }
    }

    pub fn with_rules(mut self, rules: impl IntoIterator<Item = PatternRule>) -> Self {
        self.rules.extend(rules);
        self
    }

    pub fn push(&mut self, rule: PatternRule) {
        self.rules.push(rule);
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).or_else(|| self.params_backup.get(name)).map(String::as_str)
    }

    /// Expand every placeholder in `pattern`.
    ///
    /// Returns the name of the first placeholder that has no definition.
    pub fn expand(&self, pattern: &str) -> Result<String, String> {
        let placeholder = regex!(r"\[(param|sub)_([A-Za-z0-9_]+)\]");
        let mark = self.delimiter.as_deref().unwrap_or(DEFAULT_DELIMITER);

        let mut current = pattern.to_string();
        for _ in 0..MAX_EXPANSION_DEPTH {
            if !placeholder.is_match(&current) {
                return Ok(current);
            }
            let mut missing: Option<String> = None;
            let next = placeholder.replace_all(&current, |caps: &regex::Captures| {
                let kind = &caps[1];
                let name = &caps[2];
                let value = match kind {
                    "param" => self.param(name).map(|v| delimited(v, mark)),
                    _ => self.fragments.get(name).cloned(),
                };
                match value {
                    Some(v) => format!("(?:{v})"),
                    None => {
                        missing.get_or_insert_with(|| caps[0].to_string());
                        caps[0].to_string()
                    }
                }
            });
            if let Some(name) = missing {
                return Err(name);
            }
            current = next.into_owned();
        }
        match placeholder.find(&current) {
            Some(m) => Err(m.as_str().to_string()),
            None => Ok(current),
        }
    }
}

/// `Sat|Mon.` -> `\bSat\b|\bMon.` for the default delimiter.
fn delimited(value: &str, mark: &str) -> String {
    value
        .split('|')
        .map(|part| {
            let mut out = String::with_capacity(part.len() + 2 * mark.len());
            if !part.starts_with(r"\b") {
                out.push_str(mark);
            }
            out.push_str(part);
            if !part.ends_with(r"\b") && !part.ends_with('.') {
                out.push_str(mark);
            }
            out
        })
        .collect::<Vec<_>>()
        .join("|")
}
