use super::filter::DateTimeFilter;
use super::matched::MatchedDateTime;
use super::rule_data::{DateTimeRuleData, Params};
use crate::config::EngineLimits;
use crate::engine::{DateMetrics, RuleCategory, RuleEngine, StageMetrics};
use crate::text::slice;
use std::collections::HashMap;
use std::time::Instant;

/// Date/time recognizer for one locale.
///
/// Immutable after construction; `detect` can be called from many threads.
#[derive(Debug, Clone)]
pub struct DateTimeRecognizer {
    locale: String,
    /// Universal, then locale, then locale-backup (the latter two only when
    /// they have rules).
    primary: Vec<RuleEngine>,
    sub_engines: Vec<RuleEngine>,
    sub_index: HashMap<String, usize>,
    clear: RuleEngine,
    past: RuleEngine,
    filter: DateTimeFilter,
}

impl DateTimeRecognizer {
    pub fn new(data: &DateTimeRuleData, locale: &str, limits: EngineLimits) -> Self {
        let mut primary = Vec::with_capacity(3);
        let universal = data.rule_set("universal", &data.universe_rules, RuleCategory::Universal, locale, Params::Both);
        primary.push(RuleEngine::new(&universal, limits));
        if !data.locale_rules.is_empty() {
            let set =
                data.rule_set(locale, &data.locale_rules, RuleCategory::Locale, locale, Params::PrimaryOnly);
            primary.push(RuleEngine::new(&set, limits));
        }
        if !data.locale_rules_backup.is_empty() {
            let set = data.rule_set(
                "locale-backup",
                &data.locale_rules_backup,
                RuleCategory::Locale,
                locale,
                Params::BackupOnly,
            );
            primary.push(RuleEngine::new(&set, limits));
        }

        let mut sub_engines = Vec::with_capacity(data.sub_rules_map.len());
        let mut sub_index = HashMap::with_capacity(data.sub_rules_map.len());
        for (key, entries) in &data.sub_rules_map {
            let set = data.rule_set(&format!("sub:{key}"), entries, RuleCategory::Sub, locale, Params::Both);
            sub_index.insert(key.clone(), sub_engines.len());
            sub_engines.push(RuleEngine::new(&set, limits));
        }

        let clear = data.rule_set("clear", &data.filter_rules, RuleCategory::Filter, locale, Params::Both);
        let past = data.rule_set("past", &data.past_rules, RuleCategory::Past, locale, Params::Both);

        log::debug!(
            "[{locale}] date recognizer: {} primary engines, {} sub engines",
            primary.len(),
            sub_engines.len()
        );
        DateTimeRecognizer {
            locale: locale.to_string(),
            primary,
            sub_engines,
            sub_index,
            clear: RuleEngine::new(&clear, limits),
            past: RuleEngine::new(&past, limits),
            filter: DateTimeFilter::new(data, locale, &limits),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Date and time expressions in `text`, ordered by start.
    pub fn detect(&self, text: &str) -> Vec<MatchedDateTime> {
        self.detect_with_metrics(text).0
    }

    pub fn detect_with_metrics(&self, text: &str) -> (Vec<MatchedDateTime>, DateMetrics) {
        let mut metrics = DateMetrics::default();
        if text.is_empty() {
            return (Vec::new(), metrics);
        }
        let started = Instant::now();

        let stage = Instant::now();
        let matches = self.primary_matches(text);
        metrics.primary = StageMetrics { duration: stage.elapsed(), produced: matches.len() };

        let stage = Instant::now();
        let clears: Vec<MatchedDateTime> = self.clear.match_text(text).into_iter().map(Into::into).collect();
        metrics.clear = StageMetrics { duration: stage.elapsed(), produced: clears.len() };

        let stage = Instant::now();
        let pasts: Vec<MatchedDateTime> = self.past.match_text(text).into_iter().map(Into::into).collect();
        metrics.past = StageMetrics { duration: stage.elapsed(), produced: pasts.len() };

        let stage = Instant::now();
        let result = self.filter.filter(text, matches, &clears, &pasts);
        metrics.filter = StageMetrics { duration: stage.elapsed(), produced: result.len() };

        metrics.total = started.elapsed();
        (result, metrics)
    }

    /// Primary engines in order, each match replaced by its sub-rule matches
    /// when its rule links a sub-rule set.
    fn primary_matches(&self, text: &str) -> Vec<MatchedDateTime> {
        let mut matches = Vec::new();
        for engine in &self.primary {
            for found in engine.match_text(text) {
                let Some(sub) = found.sub_rule.as_deref() else {
                    matches.push(found.into());
                    continue;
                };
                let Some(&index) = self.sub_index.get(sub) else {
                    log::debug!("[{}] rule '{}' links missing sub-rule set '{sub}'", self.locale, found.rule_id);
                    continue;
                };
                let window = slice(text, found.span.begin, found.span.end);
                for inner in self.sub_engines[index].match_text(window) {
                    let mut refined = MatchedDateTime::from(inner);
                    refined.span = refined.span.shift(found.span.begin);
                    matches.push(refined);
                }
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Span;
    use crate::datetime::DateTimeKind;
    use serde_json::json;

    fn recognizer(value: serde_json::Value) -> DateTimeRecognizer {
        let data: DateTimeRuleData = serde_json::from_value(value).unwrap();
        DateTimeRecognizer::new(&data, "en", EngineLimits::default())
    }

    fn spans(found: &[MatchedDateTime]) -> Vec<(usize, usize)> {
        found.iter().map(|m| (m.begin(), m.end())).collect()
    }

    #[test]
    fn sub_rules_refine_or_drop_parents() {
        let r = recognizer(json!({
            "universe_rules": [{"id": "20030", "pattern": "\\d{1,2}/\\d{1,2}(?:/\\d{2,4})?"}],
            "sub_rules_map": {"20030": [{"id": "20031", "pattern": "\\d{1,2}/\\d{1,2}/\\d{4}"}]}
        }));
        let found = r.detect("ratio 3/4 and due 5/12/2024");
        assert_eq!(spans(&found), vec![(18, 27)]);
        assert_eq!(&*found[0].rule_id, "20031");
    }

    #[test]
    fn missing_sub_engine_drops_the_match() {
        let r = recognizer(json!({
            "universe_rules": [{"id": "20030", "pattern": "\\d+", "sub_rule": "nowhere"}, {"id": "20001", "pattern": "May"}]
        }));
        assert_eq!(spans(&r.detect("May 12")), vec![(0, 3)]);
    }

    #[test]
    fn locale_and_backup_engines_are_optional() {
        let mut data: DateTimeRuleData = serde_json::from_value(json!({
            "universe_rules": [{"id": "20001", "pattern": "\\d{4}-\\d{2}-\\d{2}"}],
            "locale_rules": [{"id": "20002", "pattern": "[param_month] \\d{1,2}", "case_insensitive": true}],
            "param": {"month": "Jan|Feb"}
        }))
        .unwrap();
        data.param_backup.insert("month".into(), "janv.|févr.".into());
        data.locale_rules_backup.push(crate::datetime::RuleEntry {
            id: "20003".into(),
            pattern: "[param_month] \\d{1,2}".into(),
            case_insensitive: false,
            level: None,
            sub_rule: None,
        });
        let r = DateTimeRecognizer::new(&data, "en", EngineLimits::default());
        assert_eq!(r.primary.len(), 3);
        let found = r.detect("JAN 5, then janv. 6 and 2024-02-01");
        assert_eq!(spans(&found), vec![(0, 5), (12, 20), (25, 35)]);

        let only_universal = recognizer(json!({"universe_rules": [{"id": "20001", "pattern": "x"}]}));
        assert_eq!(only_universal.primary.len(), 1);
    }

    #[test]
    fn empty_text_and_metrics() {
        let r = recognizer(json!({
            "universe_rules": [{"id": "30001", "pattern": "\\d{1,2}:\\d{2}"}],
            "past_rules": [{"id": "100", "pattern": "\\bbefore\\s+"}]
        }));
        assert!(r.detect("").is_empty());
        let (found, metrics) = r.detect_with_metrics("before 10:30 and 11:00");
        assert_eq!(spans(&found), vec![(17, 22)]);
        assert_eq!(found[0].kind, DateTimeKind::Time);
        assert_eq!(metrics.primary.produced, 2);
        assert_eq!(metrics.past.produced, 1);
        assert_eq!(metrics.filter.produced, 1);
        assert_eq!(found[0].span, Span::new(17, 22));
    }
}
