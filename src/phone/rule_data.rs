//! Serialized phone rule data.
//!
//! One JSON document per region plus a shared `common.json`, merged region
//! first. Tags are closed enums: an unknown `handle`, `valid` or `kind` fails
//! the load instead of silently falling back.
//!
//! ```text
//! {
//!   "negative": [{ "pattern": "\\d+(?:\\.\\d+)?%" }],
//!   "border":   [{ "pattern": "[A-Z]{2}\\d+", "kind": "CONTAIN" }],
//!   "codes":    [{ "valid": "Code" }],
//!   "positive": [{ "pattern": "\\d{5}/\\d{5}", "handle": "Slant" }],
//!   "find_number": { "number": { "pattern": "\\+?[\\d\\- ]{5,}" }, "short": { "pattern": "\\b\\d{3,6}\\b" } }
//! }
//! ```

use super::refiner::{DEFAULT_BLANK_EXCLUSIONS, DEFAULT_SLANT_REGION, HandleKind};
use super::validator::ValidKind;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegexEntry {
    pub pattern: String,
    #[serde(default)]
    pub case_insensitive: bool,
}

/// How a border match vetoes a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BorderKind {
    /// The border match covers the whole candidate.
    Contain,
    /// The border match covers or partially overlaps the candidate.
    ContainOrIntersect,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BorderEntry {
    pub pattern: String,
    #[serde(default)]
    pub case_insensitive: bool,
    pub kind: BorderKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct CodeEntry {
    pub valid: ValidKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PositiveEntry {
    pub pattern: String,
    #[serde(default)]
    pub case_insensitive: bool,
    #[serde(default)]
    pub handle: HandleKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FindNumberRules {
    /// `short/short` pairs that must go through the positive rules even when
    /// the library accepts the whole candidate.
    pub short_short: Option<RegexEntry>,
    /// Candidate numbers.
    pub number: Option<RegexEntry>,
    /// Short numbers looked for in the masked text.
    pub short: Option<RegexEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PhoneRuleData {
    /// Treat `common` rules as negative rules.
    pub common_exit: bool,
    pub negative: Vec<RegexEntry>,
    pub common: Vec<RegexEntry>,
    pub border: Vec<BorderEntry>,
    pub codes: Vec<CodeEntry>,
    pub positive: Vec<PositiveEntry>,
    pub find_number: FindNumberRules,
    pub slant_region: Option<String>,
    pub blank_exclusions: Option<Vec<String>>,
    /// Whether region-specific data was found; set by the loader.
    #[serde(skip)]
    pub is_fixed: bool,
}

impl PhoneRuleData {
    /// Append `other` (loaded after `self`). Scalars already set in `self` win.
    pub fn merge(&mut self, other: PhoneRuleData) {
        self.common_exit |= other.common_exit;
        self.negative.extend(other.negative);
        self.common.extend(other.common);
        self.border.extend(other.border);
        self.codes.extend(other.codes);
        self.positive.extend(other.positive);
        let find = &mut self.find_number;
        find.short_short = find.short_short.take().or(other.find_number.short_short);
        find.number = find.number.take().or(other.find_number.number);
        find.short = find.short.take().or(other.find_number.short);
        if self.slant_region.is_none() {
            self.slant_region = other.slant_region;
        }
        if self.blank_exclusions.is_none() {
            self.blank_exclusions = other.blank_exclusions;
        }
        self.is_fixed |= other.is_fixed;
    }

    /// Negative rules, followed by the common rules when `common_exit` is set.
    pub fn masking_rules(&self) -> impl Iterator<Item = &RegexEntry> {
        let common: &[RegexEntry] = if self.common_exit { &self.common } else { &[] };
        self.negative.iter().chain(common)
    }

    pub fn slant_region(&self) -> &str {
        self.slant_region.as_deref().unwrap_or(DEFAULT_SLANT_REGION)
    }

    pub fn blank_exclusions(&self) -> Vec<String> {
        match &self.blank_exclusions {
            Some(list) => list.clone(),
            None => DEFAULT_BLANK_EXCLUSIONS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn region_then_common() {
        let mut region: PhoneRuleData = serde_json::from_value(json!({
            "common_exit": true,
            "negative": [{"pattern": "a"}],
            "codes": [{"valid": "Code"}],
            "positive": [{"pattern": "p", "handle": "Slant"}],
            "find_number": {"number": {"pattern": "n"}, "short": {"pattern": "s"}}
        }))
        .unwrap();
        let common: PhoneRuleData = serde_json::from_value(json!({
            "common": [{"pattern": "c", "case_insensitive": true}],
            "codes": [{"valid": "PreSuf"}],
            "find_number": {"short_short": {"pattern": "ss"}, "short": {"pattern": "ignored"}},
            "slant_region": "HK"
        }))
        .unwrap();
        region.merge(common);

        let masks: Vec<_> = region.masking_rules().map(|r| r.pattern.as_str()).collect();
        assert_eq!(masks, vec!["a", "c"]);
        assert_eq!(region.codes, vec![CodeEntry { valid: ValidKind::Code }, CodeEntry { valid: ValidKind::PreSuf }]);
        assert_eq!(region.find_number.short.as_ref().unwrap().pattern, "s");
        assert_eq!(region.find_number.short_short.as_ref().unwrap().pattern, "ss");
        assert_eq!(region.positive[0].handle, HandleKind::Slant);
        assert_eq!(region.slant_region(), "HK");
        assert_eq!(region.blank_exclusions(), vec!["5201314".to_string()]);
    }

    #[test]
    fn common_rules_only_mask_with_common_exit() {
        let data: PhoneRuleData = serde_json::from_value(json!({"common": [{"pattern": "c"}]})).unwrap();
        assert_eq!(data.masking_rules().count(), 0);
        assert_eq!(data.slant_region(), "CN");
    }

    #[test]
    fn unknown_tags_are_rejected() {
        let bad_handle = serde_json::from_value::<PhoneRuleData>(json!({"positive": [{"pattern": "p", "handle": "Typo"}]}));
        assert!(bad_handle.is_err());
        let bad_kind = serde_json::from_value::<PhoneRuleData>(json!({"border": [{"pattern": "p", "kind": "contain"}]}));
        assert!(bad_kind.is_err());
        let bad_valid = serde_json::from_value::<PhoneRuleData>(json!({"codes": [{"valid": "code"}]}));
        assert!(bad_valid.is_err());
        let border: BorderEntry =
            serde_json::from_value(json!({"pattern": "p", "kind": "CONTAIN_OR_INTERSECT"})).unwrap();
        assert_eq!(border.kind, BorderKind::ContainOrIntersect);
    }
}
