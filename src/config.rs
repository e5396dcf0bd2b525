//! Recognizer configuration.
//!
//! A [`RecognizerConfig`] can be built in code or deserialised from JSON; every
//! field has a default so a partial document is enough:
//!
//! ```text
//! { "locale": "en", "region": "CN", "kinds": ["date"], "offset_unit": "utf16" }
//! ```

use crate::text::OffsetUnit;
use bitflags::bitflags;
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;

/// Default cap on the number of input bytes a rule engine scans.
pub const DEFAULT_MAX_INPUT_LEN: usize = 64 * 1024;
/// Default backtracking budget for one regex search.
pub const DEFAULT_BACKTRACK_LIMIT: usize = 1_000_000;

bitflags! {
    /// Which recognizers run.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EntityKinds: u8 {
        const PHONE = 1 << 0;
        const DATE  = 1 << 1;
    }
}

impl Default for EntityKinds {
    fn default() -> Self {
        EntityKinds::all()
    }
}

impl<'de> Deserialize<'de> for EntityKinds {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        let mut kinds = EntityKinds::empty();
        for name in names {
            kinds |= match name.as_str() {
                "phone_number" | "phone" => EntityKinds::PHONE,
                "date" | "datetime" => EntityKinds::DATE,
                other => {
                    return Err(serde::de::Error::unknown_variant(other, &["phone_number", "date"]));
                }
            };
        }
        Ok(kinds)
    }
}

/// Bounds applied to every rule engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineLimits {
    /// Inputs longer than this are scanned up to the limit only.
    pub max_input_len: usize,
    /// Backtracking steps allowed per regex search before it is abandoned.
    pub backtrack_limit: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        EngineLimits { max_input_len: DEFAULT_MAX_INPUT_LEN, backtrack_limit: DEFAULT_BACKTRACK_LIMIT }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RecognizerConfig {
    /// Language used to pick date/time rule data, e.g. `"en"`.
    pub locale: String,
    /// Region used to pick phone rule data and to parse numbers, e.g. `"CN"`.
    pub region: String,
    /// Directory holding `datetime/` and `phonenumber/` rule data.
    pub rules_dir: Option<PathBuf>,
    pub kinds: EntityKinds,
    pub offset_unit: OffsetUnit,
    /// Fold full-width punctuation and alphanumerics before matching.
    pub normalize_full_width: bool,
    pub limits: EngineLimits,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        RecognizerConfig {
            locale: "en".to_string(),
            region: "CN".to_string(),
            rules_dir: None,
            kinds: EntityKinds::default(),
            offset_unit: OffsetUnit::default(),
            normalize_full_width: true,
            limits: EngineLimits::default(),
        }
    }
}

impl RecognizerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = RecognizerConfig::from_json(r#"{"locale":"zh","kinds":["date"],"offset_unit":"utf16"}"#).unwrap();
        assert_eq!(cfg.locale, "zh");
        assert_eq!(cfg.region, "CN");
        assert_eq!(cfg.kinds, EntityKinds::DATE);
        assert_eq!(cfg.offset_unit, OffsetUnit::Utf16);
        assert!(cfg.normalize_full_width);
        assert_eq!(cfg.limits, EngineLimits::default());
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(RecognizerConfig::from_json(r#"{"kinds":["email"]}"#).is_err());
    }
}
