//! Final filtering of date/time matches.
//!
//! Raw engine output overlaps and is fragmented: "May 5 at 10:30" arrives as a
//! date and a time, "10:00 - 11:30" as two times. The filter resolves that in
//! four passes:
//!
//! 1. **Overlay**: crossing or identical spans keep the higher level, nested
//!    spans keep the outer one, then matches are ordered by start.
//! 2. **Date period**: chained days are combined, dates and times joined by a
//!    locale joiner become date-times, pairs joined by a period separator
//!    become periods, and comma-separated date/time pairs are merged.
//! 3. **Clear**: matches lying inside a clear-rule span are dropped.
//! 4. **Past**: a date adjacent to a past marker is dropped (markers with ids
//!    below 200 precede the date, the rest follow it).
//!
//! Level of a rule = base by id range (1xxxx: 10, 2xxxx-3xxxx: 20, else 30)
//! plus the declared level (default 1).

use super::matched::{DateTimeKind, MatchedDateTime};
use super::rule_data::DateTimeRuleData;
use crate::config::EngineLimits;
use crate::engine::CompiledPattern;
use crate::text::{slice, tail};
use std::collections::HashMap;

const DEFAULT_LEVEL: i32 = 1;
/// Past markers with a smaller id sit before the date they cancel.
const PAST_BEFORE_LIMIT: i64 = 200;

/// How many following matches a date was combined with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combine {
    None,
    Two,
    Three,
}

#[derive(Debug, Clone)]
pub struct DateTimeFilter {
    locale: String,
    levels: HashMap<String, i32>,
    rel_dates: Option<String>,
    datetime: Option<CompiledPattern>,
    period: Option<CompiledPattern>,
    brackets: Option<CompiledPattern>,
}

impl DateTimeFilter {
    pub fn new(data: &DateTimeRuleData, locale: &str, limits: &EngineLimits) -> Self {
        let compile = |key: &str, anchored: bool| {
            let named = data.patterns.get(key)?;
            let built = if anchored {
                CompiledPattern::anchored(&named.pattern, named.case_insensitive, limits)
            } else {
                CompiledPattern::new(&named.pattern, named.case_insensitive, limits)
            };
            match built {
                Ok(p) => Some(p),
                Err(err) => {
                    log::warn!("[{locale}] '{key}' joiner pattern is invalid: {err}");
                    None
                }
            }
        };
        DateTimeFilter {
            locale: locale.to_string(),
            levels: data.levels(),
            rel_dates: data.is_rel_dates.get(locale).cloned(),
            datetime: compile("datetime", true),
            period: compile("period", true),
            brackets: compile("brackets", false),
        }
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    /// Run every pass over `matches`.
    pub fn filter(
        &self,
        text: &str,
        matches: Vec<MatchedDateTime>,
        clears: &[MatchedDateTime],
        pasts: &[MatchedDateTime],
    ) -> Vec<MatchedDateTime> {
        let matches = self.filter_overlay(matches);
        let matches = self.filter_date(text, matches);
        let matches = self.filter_date_time(text, matches);
        let matches = self.filter_period(text, matches);
        let matches = self.filter_date_time_punc(text, matches);
        let matches = filter_by_clears(matches, clears);
        filter_by_pasts(matches, pasts)
    }

    fn level(&self, rule_id: &str) -> i32 {
        let key: i64 = rule_id.trim().parse().unwrap_or(0);
        let base = match key {
            10000..=19999 => 10,
            20000..=39999 => 20,
            _ => 30,
        };
        base + self.levels.get(rule_id).copied().unwrap_or(DEFAULT_LEVEL)
    }

    fn filter_overlay(&self, matches: Vec<MatchedDateTime>) -> Vec<MatchedDateTime> {
        if matches.is_empty() {
            return matches;
        }
        let mut kept: Vec<MatchedDateTime> = Vec::with_capacity(matches.len());
        for candidate in matches {
            let mut valid = true;
            let mut j = 0;
            while j < kept.len() {
                let current = &kept[j];
                if current.span != candidate.span && !current.span.crosses(&candidate.span) {
                    j += 1;
                    continue;
                }
                if self.level(&current.rule_id) >= self.level(&candidate.rule_id) {
                    valid = false;
                    j += 1;
                } else {
                    kept.remove(j);
                }
            }
            if valid {
                kept.push(candidate);
            }
        }

        let mut outer: Vec<MatchedDateTime> = Vec::with_capacity(kept.len());
        for candidate in kept {
            let mut valid = true;
            let mut j = 0;
            while j < outer.len() {
                let current = &outer[j];
                let (cb, ce, b, e) = (current.begin(), current.end(), candidate.begin(), candidate.end());
                if (cb > b && ce <= e) || (cb == b && ce < e) {
                    outer.remove(j);
                    continue;
                }
                if cb <= b && ce >= e {
                    valid = false;
                }
                j += 1;
            }
            if valid {
                outer.push(candidate);
            }
        }
        outer.sort_by_key(MatchedDateTime::begin);
        outer
    }

    /// Chain up to three day-like matches; every day-like match leaves as `Date`.
    fn filter_date(&self, text: &str, matches: Vec<MatchedDateTime>) -> Vec<MatchedDateTime> {
        let mut result = Vec::with_capacity(matches.len());
        let mut i = 0;
        while i < matches.len() {
            let mut current = matches[i].clone();
            current.kind = current.rule_kind();
            if !current.kind.is_day() {
                result.push(current);
                i += 1;
                continue;
            }
            let following = &matches[i + 1..matches.len().min(i + 3)];
            let combine =
                if following.is_empty() { Combine::None } else { self.nest_dates(text, &current, following, None) };
            current.kind = DateTimeKind::Date;
            match combine {
                Combine::None => {
                    result.push(current);
                    i += 1;
                    continue;
                }
                Combine::Two => i += 1,
                Combine::Three => i += 2,
            }
            self.extend_to_closing_bracket(text, &matches[i], &mut current);
            result.push(current);
            i += 1;
        }
        result
    }

    fn nest_dates(
        &self,
        text: &str,
        current: &MatchedDateTime,
        following: &[MatchedDateTime],
        previous: Option<DateTimeKind>,
    ) -> Combine {
        let next = &following[0];
        let next_kind = next.rule_kind();
        if !next_kind.is_day() || next_kind == current.rule_kind() || Some(next_kind) == previous {
            return Combine::None;
        }
        let gap = slice(text, current.end(), next.begin());
        let rel = self.is_rel_dates(gap);
        let opens_bracket = gap.trim() == "(";
        if !rel && !opens_bracket {
            return Combine::None;
        }

        let is_three = following.len() > 1
            && self.nest_dates(text, next, &following[1..], Some(current.rule_kind())) == Combine::Two;

        let mut bracketed = false;
        if opens_bracket {
            let Some(brackets) = &self.brackets else {
                log::warn!("[{}] no 'brackets' pattern, bracketed dates are not combined", self.locale);
                return Combine::None;
            };
            if let Some((_, inner)) = brackets.capture(tail(text, current.end()), 1) {
                let end = if is_three { following[1].end() } else { next.end() };
                bracketed = !inner.is_empty() && inner.trim() == slice(text, next.begin(), end).trim();
            }
        }

        match (rel || bracketed, is_three) {
            (false, _) => Combine::None,
            (true, true) => Combine::Three,
            (true, false) => Combine::Two,
        }
    }

    /// A blank gap, or a comma where the locale allows one.
    fn is_rel_dates(&self, gap: &str) -> bool {
        let trimmed = gap.trim();
        trimmed.is_empty() || (trimmed == "," && self.rel_dates.as_deref().is_some_and(|s| s.contains(',')))
    }

    /// Stretch `current` to the end of `last`, plus a closing `)` when the
    /// combination opened one.
    fn extend_to_closing_bracket(&self, text: &str, last: &MatchedDateTime, current: &mut MatchedDateTime) {
        let mut add = 0;
        let open = tail(text, current.end()).find('(').map(|p| p + current.end());
        if open.is_some_and(|left| left < last.begin()) {
            if let Some(close) = tail(text, last.end()).find(')').map(|p| p + last.end()) {
                if slice(text, last.end(), close + 1).trim() == ")" {
                    add = close + 1 - last.end();
                }
            }
        }
        current.span.end = last.end() + add;
    }

    fn filter_date_time(&self, text: &str, mut matches: Vec<MatchedDateTime>) -> Vec<MatchedDateTime> {
        if matches.is_empty() {
            return matches;
        }
        let Some(joiner_pattern) = &self.datetime else {
            log::warn!("[{}] no 'datetime' pattern, dates and times are not joined", self.locale);
            return matches;
        };
        let mut idx = 1;
        let mut last = 0;
        while idx < matches.len() {
            let mut removed = false;
            if is_date_time_pair(&matches[last], &matches[idx]) {
                let (l, c) = (matches[last].kind, matches[idx].kind);
                let joiner = slice(text, matches[last].end(), matches[idx].begin());
                if joiner.trim().is_empty() || joiner_pattern.is_match(joiner) {
                    matches[last].span.end = matches[idx].end();
                    matches[last].kind = if is_plain_date_time(l, c) {
                        DateTimeKind::DateTime
                    } else {
                        DateTimeKind::TimePeriod
                    };
                    matches.remove(idx);
                    removed = true;
                } else {
                    removed = self.join_bracketed(text, &mut matches, idx, last);
                }
            }
            if !removed {
                last = idx;
                idx += 1;
            }
        }
        matches
    }

    /// `10:30 (May 5)` or `(May 5) 10:30`.
    fn join_bracketed(&self, text: &str, matches: &mut Vec<MatchedDateTime>, idx: usize, last: usize) -> bool {
        let (l, c) = (matches[last].kind, matches[idx].kind);
        if l == DateTimeKind::Time {
            let Some(brackets) = &self.brackets else {
                return false;
            };
            let after = tail(text, matches[last].end());
            let Some((found, inner)) = brackets.capture(after, 1) else {
                return false;
            };
            let current_text = slice(text, matches[idx].begin(), matches[idx].end());
            if !inner.is_empty() && inner.trim() == current_text.trim() {
                matches[last].span.end += found.end;
                matches[last].kind = DateTimeKind::DateTime;
                matches.remove(idx);
                return true;
            }
        } else if l == DateTimeKind::Date && c == DateTimeKind::Time {
            let before = slice(text, 0, matches[last].begin());
            let between = slice(text, matches[last].end(), matches[idx].begin());
            if before.trim_end().ends_with('(') && between.trim() == ")" {
                if let Some(open) = before.rfind('(') {
                    matches[last].span.begin = open;
                    matches[last].span.end = matches[idx].end();
                    matches[last].kind = DateTimeKind::DateTime;
                    matches.remove(idx);
                    return true;
                }
            }
        }
        false
    }

    fn filter_period(&self, text: &str, mut matches: Vec<MatchedDateTime>) -> Vec<MatchedDateTime> {
        if matches.is_empty() {
            return matches;
        }
        let Some(period) = &self.period else {
            log::warn!("[{}] no 'period' pattern, periods are not joined", self.locale);
            return matches;
        };
        let mut idx = 1;
        let mut current = 0;
        while idx < matches.len() {
            let (c, n) = (matches[current].kind, matches[idx].kind);
            let same_kind =
                c == n && matches!(c, DateTimeKind::Date | DateTimeKind::Time | DateTimeKind::DateTime);
            if same_kind || (c == DateTimeKind::DateTime && n == DateTimeKind::Time) {
                let between = slice(text, matches[current].end(), matches[idx].begin());
                if period.is_match(between) {
                    matches[current].span.end = matches[idx].end();
                    matches[current].kind = DateTimeKind::TimePeriod;
                    matches[current].set_time_period(c == DateTimeKind::Time);
                    matches.remove(idx);
                    continue;
                }
            }
            current = idx;
            idx += 1;
        }
        matches
    }

    fn filter_date_time_punc(&self, text: &str, mut matches: Vec<MatchedDateTime>) -> Vec<MatchedDateTime> {
        let mut idx = 1;
        let mut current = 0;
        while idx < matches.len() {
            if is_date_time_pair(&matches[current], &matches[idx]) {
                let between = slice(text, matches[current].end(), matches[idx].begin()).trim();
                if between == "," || between == "，" {
                    let (c, l) = (matches[current].kind, matches[idx].kind);
                    matches[current].span.end = matches[idx].end();
                    matches[current].kind = if (c == DateTimeKind::Date && l == DateTimeKind::Time)
                        || c == DateTimeKind::Time
                    {
                        DateTimeKind::DateTime
                    } else {
                        DateTimeKind::TimePeriod
                    };
                    matches.remove(idx);
                    continue;
                }
            }
            current = idx;
            idx += 1;
        }
        matches
    }
}

/// Date followed by a time (or time period), or the reverse.
fn is_date_time_pair(first: &MatchedDateTime, second: &MatchedDateTime) -> bool {
    use DateTimeKind::{Date, Time, TimePeriod};
    match (first.kind, second.kind) {
        (Date, Time) | (Time, Date) => true,
        (Date, TimePeriod) => second.is_time_period(),
        (TimePeriod, Date) => first.is_time_period(),
        _ => false,
    }
}

fn is_plain_date_time(first: DateTimeKind, second: DateTimeKind) -> bool {
    matches!(
        (first, second),
        (DateTimeKind::Date, DateTimeKind::Time) | (DateTimeKind::Time, DateTimeKind::Date)
    )
}

fn filter_by_clears(mut matches: Vec<MatchedDateTime>, clears: &[MatchedDateTime]) -> Vec<MatchedDateTime> {
    if clears.is_empty() {
        return matches;
    }
    matches.retain(|m| !clears.iter().any(|clear| clear.span.contains(&m.span)));
    matches
}

fn filter_by_pasts(mut matches: Vec<MatchedDateTime>, pasts: &[MatchedDateTime]) -> Vec<MatchedDateTime> {
    for past in pasts {
        let before = past.rule_number() < PAST_BEFORE_LIMIT;
        let adjacent = matches.iter().position(|m| {
            if before { past.end() == m.begin() } else { past.begin() == m.end() }
        });
        if let Some(pos) = adjacent {
            matches.remove(pos);
        }
    }
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Span;
    use serde_json::json;

    fn filter_with(value: serde_json::Value) -> DateTimeFilter {
        let data: DateTimeRuleData = serde_json::from_value(value).unwrap();
        DateTimeFilter::new(&data, "en", &EngineLimits::default())
    }

    fn default_filter() -> DateTimeFilter {
        filter_with(json!({
            "patterns": {
                "datetime": {"pattern": "\\s*(?:at|@)\\s*", "case_insensitive": true},
                "period": {"pattern": "\\s*(?:-|~|to|until)\\s*", "case_insensitive": true},
                "brackets": {"pattern": "^\\s*\\(([^)]*)\\)"}
            },
            "is_rel_dates": {"en": ","}
        }))
    }

    fn m(begin: usize, end: usize, id: &str) -> MatchedDateTime {
        MatchedDateTime::new(Span::new(begin, end), id)
    }

    fn spans(matches: &[MatchedDateTime]) -> Vec<(usize, usize, DateTimeKind)> {
        matches.iter().map(|m| (m.begin(), m.end(), m.kind)).collect()
    }

    #[test]
    fn overlay_keeps_outer_and_higher_level() {
        let f = default_filter();
        // 2024-01-05 10:30 seen as a date-time, a date and a time.
        let out = f.filter_overlay(vec![m(0, 10, "20001"), m(11, 16, "30001"), m(0, 16, "10001")]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].span, Span::new(0, 16));

        // Crossing spans: the 4xxxx rule (base 30) beats the date (base 20).
        let out = f.filter_overlay(vec![m(0, 8, "20001"), m(5, 12, "40001")]);
        assert_eq!(out.iter().map(|m| &*m.rule_id).collect::<Vec<_>>(), vec!["40001"]);
    }

    #[test]
    fn declared_levels_break_ties() {
        let f = filter_with(json!({
            "universe_rules": [{"id": "20002", "pattern": "x", "level": 5}]
        }));
        let out = f.filter_overlay(vec![m(0, 5, "20001"), m(0, 5, "20002")]);
        assert_eq!(&*out[0].rule_id, "20002");
        let out = f.filter_overlay(vec![m(0, 5, "20003"), m(0, 5, "20001")]);
        assert_eq!(&*out[0].rule_id, "20003");
    }

    #[test]
    fn date_and_time_join_into_date_time() {
        let text = "Meet on 2024-01-05 at 10:30 please";
        let out = default_filter().filter(text, vec![m(8, 18, "20001"), m(22, 27, "30001")], &[], &[]);
        assert_eq!(spans(&out), vec![(8, 27, DateTimeKind::DateTime)]);
    }

    #[test]
    fn two_times_form_a_period() {
        let text = "10:00 - 11:30";
        let out = default_filter().filter(text, vec![m(0, 5, "30001"), m(8, 13, "30001")], &[], &[]);
        assert_eq!(spans(&out), vec![(0, 13, DateTimeKind::TimePeriod)]);
        assert!(out[0].is_time_period());
    }

    #[test]
    fn chained_days_combine() {
        // "Friday Jan 5" -> week + date with a blank gap.
        let text = "on Friday Jan 5 ok";
        let out = default_filter().filter(text, vec![m(3, 9, "20009"), m(10, 15, "20002")], &[], &[]);
        assert_eq!(spans(&out), vec![(3, 15, DateTimeKind::Date)]);

        // Two dates of the same kind stay apart.
        let text = "Jan 5 Jan 6";
        let out = default_filter().filter(text, vec![m(0, 5, "20002"), m(6, 11, "20002")], &[], &[]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn bracketed_day_combines_and_absorbs_bracket() {
        let text = "Friday (Jan 5) noon";
        let out = default_filter().filter(text, vec![m(0, 6, "20009"), m(8, 13, "20002")], &[], &[]);
        assert_eq!(spans(&out), vec![(0, 14, DateTimeKind::Date)]);
    }

    #[test]
    fn comma_between_days_needs_locale_permission() {
        let text = "Friday, Jan 5";
        let matches = vec![m(0, 6, "20009"), m(8, 13, "20002")];
        assert_eq!(default_filter().filter(text, matches.clone(), &[], &[]).len(), 1);
        let strict = filter_with(json!({}));
        assert_eq!(strict.filter(text, matches, &[], &[]).len(), 2);
    }

    #[test]
    fn time_followed_by_bracketed_date() {
        let text = "10:30 (Jan 5)";
        let out = default_filter().filter(text, vec![m(0, 5, "30001"), m(7, 12, "20002")], &[], &[]);
        assert_eq!(spans(&out), vec![(0, 13, DateTimeKind::DateTime)]);
    }

    #[test]
    fn bracketed_date_then_time() {
        let text = "(Jan 5) 10:30";
        let out = default_filter().filter(text, vec![m(1, 6, "20002"), m(8, 13, "30001")], &[], &[]);
        assert_eq!(spans(&out), vec![(0, 13, DateTimeKind::DateTime)]);
    }

    #[test]
    fn comma_joins_date_and_time() {
        let text = "Jan 5, 10:30";
        let strict = filter_with(json!({}));
        let out = strict.filter(text, vec![m(0, 5, "20002"), m(7, 12, "30001")], &[], &[]);
        assert_eq!(spans(&out), vec![(0, 12, DateTimeKind::DateTime)]);
    }

    #[test]
    fn clears_and_pasts() {
        let f = default_filter();
        let clears = [m(0, 18, "1")];
        let out = f.filter("version 2024-01-05 x", vec![m(8, 18, "20001")], &clears, &[]);
        assert!(out.is_empty());

        let text = "last tuesday, tuesday next";
        let pasts = [m(0, 5, "100"), m(21, 26, "200")];
        let out = filter_by_pasts(vec![m(5, 12, "20009"), m(14, 21, "20009")], &pasts);
        assert!(out.is_empty(), "{text}");
    }

    #[test]
    fn missing_patterns_skip_their_pass() {
        let f = filter_with(json!({}));
        let text = "10:00 - 11:30";
        let out = f.filter(text, vec![m(0, 5, "30001"), m(8, 13, "30001")], &[], &[]);
        assert_eq!(out.len(), 2);
    }
}
