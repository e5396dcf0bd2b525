use crate::Span;
use crate::engine::RuleMatch;
use std::sync::Arc;
use strum::{AsRefStr, Display};

/// Semantic class of a date/time match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum DateTimeKind {
    /// Rule id is not a number.
    Null,
    DateTime,
    Date,
    Time,
    TimePeriod,
    Week,
    Today,
}

impl DateTimeKind {
    /// Kind implied by a rule id.
    ///
    /// | ids           | kind                                       |
    /// |---------------|--------------------------------------------|
    /// | 10000..=19999 | `DateTime`                                 |
    /// | 20000..=29999 | `Date` (`Week` for 20009/20011/21026, `Today` for 20010) |
    /// | 30000..=39999 | `Time`                                     |
    /// | other numbers | `TimePeriod`                               |
    pub fn from_rule_id(id: &str) -> Self {
        let Ok(key) = id.trim().parse::<i64>() else {
            return DateTimeKind::Null;
        };
        match key {
            20009 | 20011 | 21026 => DateTimeKind::Week,
            20010 => DateTimeKind::Today,
            20000..=29999 => DateTimeKind::Date,
            30000..=39999 => DateTimeKind::Time,
            10000..=19999 => DateTimeKind::DateTime,
            _ => DateTimeKind::TimePeriod,
        }
    }

    /// Day-like kinds that can be chained into a combined date.
    pub fn is_day(self) -> bool {
        matches!(self, DateTimeKind::Date | DateTimeKind::Today | DateTimeKind::Week)
    }
}

/// One date/time expression found in a text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchedDateTime {
    pub span: Span,
    /// Id of the rule that produced the match (the first one, after merges).
    pub rule_id: Arc<str>,
    pub kind: DateTimeKind,
    time_period: bool,
}

impl MatchedDateTime {
    pub fn new(span: Span, rule_id: impl Into<Arc<str>>) -> Self {
        let rule_id = rule_id.into();
        let kind = DateTimeKind::from_rule_id(&rule_id);
        MatchedDateTime { span, rule_id, kind, time_period: false }
    }

    pub fn begin(&self) -> usize {
        self.span.begin
    }

    pub fn end(&self) -> usize {
        self.span.end
    }

    /// Kind implied by the originating rule, ignoring any merge.
    pub fn rule_kind(&self) -> DateTimeKind {
        DateTimeKind::from_rule_id(&self.rule_id)
    }

    /// Numeric rule id, or 0.
    pub fn rule_number(&self) -> i64 {
        self.rule_id.trim().parse().unwrap_or(0)
    }

    /// Explicitly flagged, or produced by a 5xxxx period rule.
    pub fn is_time_period(&self) -> bool {
        self.time_period || (50000..=59999).contains(&self.rule_number())
    }

    pub(crate) fn set_time_period(&mut self, flag: bool) {
        self.time_period = flag;
    }
}

impl From<RuleMatch> for MatchedDateTime {
    fn from(m: RuleMatch) -> Self {
        MatchedDateTime::new(m.span, m.rule_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_from_rule_ids() {
        let cases = [
            ("10003", DateTimeKind::DateTime),
            ("20001", DateTimeKind::Date),
            ("20009", DateTimeKind::Week),
            ("20010", DateTimeKind::Today),
            ("21026", DateTimeKind::Week),
            ("29999", DateTimeKind::Date),
            ("30000", DateTimeKind::Time),
            ("40001", DateTimeKind::TimePeriod),
            ("9999", DateTimeKind::TimePeriod),
            ("abc", DateTimeKind::Null),
        ];
        for (id, kind) in cases {
            assert_eq!(DateTimeKind::from_rule_id(id), kind, "rule id {id}");
        }
        assert_eq!(DateTimeKind::TimePeriod.to_string(), "time_period");
    }

    #[test]
    fn time_period_flag() {
        let mut m = MatchedDateTime::new(Span::new(0, 3), "50001");
        assert!(m.is_time_period());
        m = MatchedDateTime::new(Span::new(0, 3), "30001");
        assert!(!m.is_time_period());
        m.set_time_period(true);
        assert!(m.is_time_period());
        assert_eq!(MatchedDateTime::new(Span::new(0, 1), "x").rule_number(), 0);
    }
}
