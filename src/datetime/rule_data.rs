//! Serialized date/time rule data.
//!
//! One JSON document per locale plus a shared `common.json`; documents are
//! merged in load order, later keys winning. A minimal locale file:
//!
//! ```text
//! {
//!   "universe_rules": [{ "id": "20001", "pattern": "\\d{4}-\\d{1,2}-\\d{1,2}" }],
//!   "param": { "weekday": "Mon|Tue|Wed" },
//!   "patterns": { "period": { "pattern": "\\s*(?:-|to)\\s*", "case_insensitive": true } }
//! }
//! ```

use crate::engine::{PatternRule, RuleCategory, RuleSet};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};

/// Parameter that switches the priority of the three short-date layouts.
const SHORT_DATE_LEVEL_PARAM: &str = "mark_ShortDateLevel";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuleEntry {
    pub id: String,
    pub pattern: String,
    #[serde(default)]
    pub case_insensitive: bool,
    #[serde(default)]
    pub level: Option<i32>,
    /// Sub-rule set refining this rule's matches; defaults to the set keyed by
    /// this rule's own id when one exists.
    #[serde(default)]
    pub sub_rule: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NamedPattern {
    pub pattern: String,
    #[serde(default)]
    pub case_insensitive: bool,
}

/// Locale fallbacks declared by the common document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DefaultLocale {
    /// Used when no file exists for the requested locale.
    pub locale: Option<String>,
    /// Supplies backup parameters and backup locale rules.
    pub backup: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DateTimeRuleData {
    pub universe_rules: Vec<RuleEntry>,
    pub locale_rules: Vec<RuleEntry>,
    /// Filled from the backup locale by the loader.
    #[serde(skip)]
    pub locale_rules_backup: Vec<RuleEntry>,
    pub sub_rules_map: BTreeMap<String, Vec<RuleEntry>>,
    /// Shared fragments referenced as `[sub_NAME]`.
    pub sub_rules: HashMap<String, String>,
    pub filter_rules: Vec<RuleEntry>,
    pub past_rules: Vec<RuleEntry>,
    /// Word lists referenced as `[param_NAME]`.
    pub param: HashMap<String, String>,
    #[serde(skip)]
    pub param_backup: HashMap<String, String>,
    /// Word delimiter per locale.
    pub delimiter: HashMap<String, String>,
    /// Per locale, the separators allowed between two chained dates.
    #[serde(alias = "isRelDates")]
    pub is_rel_dates: HashMap<String, String>,
    pub default_locale: DefaultLocale,
    /// `datetime`, `period` and `brackets` joiner patterns.
    pub patterns: HashMap<String, NamedPattern>,
}

impl DateTimeRuleData {
    /// Overlay `other` on top of `self`.
    pub fn merge(&mut self, other: DateTimeRuleData) {
        merge_entries(&mut self.universe_rules, other.universe_rules);
        merge_entries(&mut self.locale_rules, other.locale_rules);
        merge_entries(&mut self.locale_rules_backup, other.locale_rules_backup);
        for (key, entries) in other.sub_rules_map {
            merge_entries(self.sub_rules_map.entry(key).or_default(), entries);
        }
        merge_entries(&mut self.filter_rules, other.filter_rules);
        merge_entries(&mut self.past_rules, other.past_rules);
        self.sub_rules.extend(other.sub_rules);
        self.param.extend(other.param);
        self.param_backup.extend(other.param_backup);
        self.delimiter.extend(other.delimiter);
        self.is_rel_dates.extend(other.is_rel_dates);
        self.patterns.extend(other.patterns);
        if other.default_locale.locale.is_some() {
            self.default_locale.locale = other.default_locale.locale;
        }
        if other.default_locale.backup.is_some() {
            self.default_locale.backup = other.default_locale.backup;
        }
    }

    /// Take parameters and locale rules from the backup locale's data.
    pub fn apply_backup(&mut self, backup: DateTimeRuleData) {
        self.param_backup.extend(backup.param);
        merge_entries(&mut self.locale_rules_backup, backup.locale_rules);
    }

    /// Declared rule levels, adjusted by the short-date layout parameter.
    pub fn levels(&self) -> HashMap<String, i32> {
        let mut levels = HashMap::new();
        let all = self
            .universe_rules
            .iter()
            .chain(&self.locale_rules)
            .chain(&self.locale_rules_backup)
            .chain(self.sub_rules_map.values().flatten())
            .chain(&self.filter_rules)
            .chain(&self.past_rules);
        for entry in all {
            if let Some(level) = entry.level {
                levels.insert(entry.id.clone(), level);
            }
        }
        let layout: &[(&str, i32)] = match self.param.get(SHORT_DATE_LEVEL_PARAM).map(String::as_str) {
            Some("ymd") => &[("20016", 1), ("20014", 3), ("20015", 2)],
            Some("mdy") => &[("20016", 2), ("20014", 3), ("20015", 1)],
            _ => &[],
        };
        for (id, level) in layout {
            levels.insert((*id).to_string(), *level);
        }
        levels
    }

    pub(crate) fn rule_set(
        &self,
        name: &str,
        entries: &[RuleEntry],
        category: RuleCategory,
        locale: &str,
        params: Params,
    ) -> RuleSet {
        let rules = entries.iter().map(|entry| {
            let mut rule = PatternRule::new(entry.id.clone(), entry.pattern.clone(), category);
            rule.case_insensitive = entry.case_insensitive;
            rule.level = entry.level;
            if matches!(category, RuleCategory::Universal | RuleCategory::Locale) {
                rule.linked_sub_rule = entry
                    .sub_rule
                    .clone()
                    .or_else(|| self.sub_rules_map.contains_key(&entry.id).then(|| entry.id.clone()));
            }
            rule
        });
        let mut set = RuleSet::new(name).with_rules(rules);
        match params {
            Params::Both => {
                set.params = self.param.clone();
                set.params_backup = self.param_backup.clone();
            }
            Params::PrimaryOnly => set.params = self.param.clone(),
            Params::BackupOnly => set.params = self.param_backup.clone(),
        }
        if category != RuleCategory::Past {
            set.fragments = self.sub_rules.clone();
        }
        set.delimiter = self.delimiter.get(locale).cloned();
        set
    }
}

/// Which parameter tables a rule set sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Params {
    Both,
    PrimaryOnly,
    BackupOnly,
}

/// Replace entries with the same id, append the rest in order.
fn merge_entries(into: &mut Vec<RuleEntry>, from: Vec<RuleEntry>) {
    for entry in from {
        match into.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => *slot = entry,
            None => into.push(entry),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn data(value: serde_json::Value) -> DateTimeRuleData {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn later_documents_override_by_id() {
        let mut base = data(json!({
            "universe_rules": [{"id": "20001", "pattern": "a"}, {"id": "20002", "pattern": "b"}],
            "param": {"weekday": "Mon"},
            "default_locale": {"locale": "en", "backup": "en"}
        }));
        base.merge(data(json!({
            "universe_rules": [{"id": "20002", "pattern": "B"}, {"id": "20003", "pattern": "c"}],
            "param": {"weekday": "Lun"},
            "default_locale": {"backup": "fr"}
        })));
        let ids: Vec<_> = base.universe_rules.iter().map(|e| (e.id.as_str(), e.pattern.as_str())).collect();
        assert_eq!(ids, vec![("20001", "a"), ("20002", "B"), ("20003", "c")]);
        assert_eq!(base.param["weekday"], "Lun");
        assert_eq!(base.default_locale.locale.as_deref(), Some("en"));
        assert_eq!(base.default_locale.backup.as_deref(), Some("fr"));
    }

    #[test]
    fn short_date_layout_sets_levels() {
        let d = data(json!({
            "universe_rules": [{"id": "20014", "pattern": "x", "level": 9}, {"id": "20100", "pattern": "y", "level": 4}],
            "param": {"mark_ShortDateLevel": "mdy"}
        }));
        let levels = d.levels();
        assert_eq!(levels["20016"], 2);
        assert_eq!(levels["20014"], 3);
        assert_eq!(levels["20015"], 1);
        assert_eq!(levels["20100"], 4);
    }

    #[test]
    fn rule_sets_link_sub_rules_and_pick_params() {
        let mut d = data(json!({
            "universe_rules": [
                {"id": "20030", "pattern": "p"},
                {"id": "20031", "pattern": "q", "sub_rule": "shared"},
                {"id": "20032", "pattern": "r"}
            ],
            "sub_rules_map": {"20030": [{"id": "20040", "pattern": "s"}]},
            "sub_rules": {"d": "\\d"},
            "param": {"a": "1"},
            "delimiter": {"zh": ""}
        }));
        d.param_backup.insert("b".into(), "2".into());

        let set = d.rule_set("u", &d.universe_rules, RuleCategory::Universal, "zh", Params::Both);
        let links: Vec<_> = set.rules.iter().map(|r| r.linked_sub_rule.as_deref()).collect();
        assert_eq!(links, vec![Some("20030"), Some("shared"), None]);
        assert!(set.params.contains_key("a") && set.params_backup.contains_key("b"));
        assert_eq!(set.delimiter.as_deref(), Some(""));

        let past = d.rule_set("p", &d.universe_rules, RuleCategory::Past, "en", Params::BackupOnly);
        assert!(past.fragments.is_empty());
        assert!(past.params.contains_key("b") && past.params_backup.is_empty());
        assert!(past.rules.iter().all(|r| r.linked_sub_rule.is_none()));
    }
}
