//! Rule data on disk.
//!
//! ```text
//! <rules_dir>/
//!   datetime/common.json     shared by every locale, loaded first
//!   datetime/<locale>.json
//!   phonenumber/common.json  loaded after the region file
//!   phonenumber/<REGION>.json
//! ```

use crate::datetime::DateTimeRuleData;
use crate::error::RuleDataError;
use crate::phone::PhoneRuleData;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

const DATETIME_DIR: &str = "datetime";
const PHONE_DIR: &str = "phonenumber";
const COMMON_FILE: &str = "common.json";

#[derive(Debug, Clone)]
pub struct RuleDataLoader {
    root: PathBuf,
}

impl RuleDataLoader {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, RuleDataError> {
        let root = root.into();
        if !root.is_dir() {
            return Err(RuleDataError::MissingDirectory(root));
        }
        Ok(RuleDataLoader { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Date/time rules for `locale`, falling back to the common document's
    /// default locale. Returns the locale actually loaded.
    pub fn load_datetime(&self, locale: &str) -> Result<(String, DateTimeRuleData), RuleDataError> {
        let dir = self.root.join(DATETIME_DIR);
        let mut data: DateTimeRuleData = read_optional(&dir.join(COMMON_FILE))?.unwrap_or_default();

        let resolved = match read_optional::<DateTimeRuleData>(&locale_file(&dir, locale))? {
            Some(own) => {
                data.merge(own);
                locale.to_string()
            }
            None => {
                let Some(fallback) = data.default_locale.locale.clone() else {
                    return Err(RuleDataError::MissingLocale { locale: locale.to_string() });
                };
                let Some(own) = read_optional::<DateTimeRuleData>(&locale_file(&dir, &fallback))? else {
                    return Err(RuleDataError::MissingLocale { locale: locale.to_string() });
                };
                log::info!("no datetime rules for '{locale}', using '{fallback}'");
                data.merge(own);
                fallback
            }
        };

        if let Some(backup) = data.default_locale.backup.clone().filter(|b| *b != resolved) {
            match read_optional::<DateTimeRuleData>(&locale_file(&dir, &backup))? {
                Some(backup_data) => data.apply_backup(backup_data),
                None => log::warn!("backup locale '{backup}' has no datetime rules"),
            }
        }
        log::debug!("loaded datetime rules for '{resolved}' from {}", dir.display());
        Ok((resolved, data))
    }

    /// Phone rules for `region`. Without a region file the data is not
    /// "fixed" and only the common document applies.
    pub fn load_phone(&self, region: &str) -> Result<PhoneRuleData, RuleDataError> {
        let dir = self.root.join(PHONE_DIR);
        let mut data = match read_optional::<PhoneRuleData>(&locale_file(&dir, region))? {
            Some(mut own) => {
                own.is_fixed = true;
                own
            }
            None => {
                log::debug!("no phone rules for region '{region}'");
                PhoneRuleData::default()
            }
        };
        if let Some(common) = read_optional(&dir.join(COMMON_FILE))? {
            data.merge(common);
        }
        Ok(data)
    }
}

fn locale_file(dir: &Path, name: &str) -> PathBuf {
    dir.join(format!("{name}.json"))
}

/// `Ok(None)` when the file does not exist.
fn read_optional<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, RuleDataError> {
    if !path.is_file() {
        return Ok(None);
    }
    let raw = std::fs::read_to_string(path).map_err(|source| RuleDataError::Io { path: path.to_path_buf(), source })?;
    let parsed =
        serde_json::from_str(&raw).map_err(|source| RuleDataError::Json { path: path.to_path_buf(), source })?;
    Ok(Some(parsed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    #[test]
    fn missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = RuleDataLoader::new(dir.path().join("nope")).unwrap_err();
        assert!(matches!(err, RuleDataError::MissingDirectory(_)));
    }

    #[test]
    fn locale_falls_back_and_backup_applies() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "datetime/common.json",
            r#"{"default_locale": {"locale": "en", "backup": "fr"}, "universe_rules": [{"id": "20001", "pattern": "x"}]}"#,
        );
        write(dir.path(), "datetime/en.json", r#"{"locale_rules": [{"id": "20002", "pattern": "y"}], "param": {"m": "Jan"}}"#);
        write(dir.path(), "datetime/fr.json", r#"{"locale_rules": [{"id": "20003", "pattern": "z"}], "param": {"m": "janv."}}"#);
        let loader = RuleDataLoader::new(dir.path()).unwrap();

        let (locale, data) = loader.load_datetime("de").unwrap();
        assert_eq!(locale, "en");
        assert_eq!(data.universe_rules.len(), 1);
        assert_eq!(data.locale_rules[0].id, "20002");
        assert_eq!(data.param["m"], "Jan");
        assert_eq!(data.param_backup["m"], "janv.");
        assert_eq!(data.locale_rules_backup[0].id, "20003");

        let (locale, data) = loader.load_datetime("fr").unwrap();
        assert_eq!(locale, "fr");
        assert!(data.locale_rules_backup.is_empty());
    }

    #[test]
    fn missing_locale_without_default() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "datetime/common.json", "{}");
        let loader = RuleDataLoader::new(dir.path()).unwrap();
        assert!(matches!(loader.load_datetime("xx"), Err(RuleDataError::MissingLocale { .. })));
    }

    #[test]
    fn malformed_json_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "phonenumber/CN.json", r#"{"positive": [{"pattern": "p", "handle": "Nope"}]}"#);
        let loader = RuleDataLoader::new(dir.path()).unwrap();
        match loader.load_phone("CN") {
            Err(RuleDataError::Json { path, .. }) => assert!(path.ends_with("phonenumber/CN.json")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn phone_region_file_marks_data_fixed() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "phonenumber/CN.json", r#"{"codes": [{"valid": "Code"}]}"#);
        write(dir.path(), "phonenumber/common.json", r#"{"find_number": {"short": {"pattern": "\\d{3,6}"}}}"#);
        let loader = RuleDataLoader::new(dir.path()).unwrap();

        let cn = loader.load_phone("CN").unwrap();
        assert!(cn.is_fixed);
        assert_eq!(cn.codes.len(), 1);
        assert!(cn.find_number.short.is_some());

        let us = loader.load_phone("US").unwrap();
        assert!(!us.is_fixed);
        assert!(us.find_number.short.is_some());
    }
}
