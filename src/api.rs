use crate::config::{EntityKinds, RecognizerConfig};
use crate::datetime::{DateTimeKind, DateTimeRecognizer, DateTimeRuleData, MatchedDateTime};
use crate::engine::{DetectMetrics, StageMetrics};
use crate::error::RuleDataError;
use crate::loader::RuleDataLoader;
use crate::phone::{MatchedPhone, PhoneNumberLibrary, PhoneNumberMatcher, PhoneRuleData};
use crate::text::{InputTraits, NormalizedText, slice};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use strum::{AsRefStr, Display};

/// Rule data directory used when the configuration names none.
pub const DEFAULT_RULES_DIR: &str = "data";

/// What an [`Entity`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum EntityKind {
    PhoneNumber,
    Date,
}

/// A recognised entity.
///
/// `begin`/`end` point into the caller's text (not the normalised one) and
/// are expressed in the configured [`crate::OffsetUnit`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entity {
    pub kind: EntityKind,
    /// Slice of the caller's text that matched.
    pub body: String,
    pub begin: usize,
    /// Exclusive.
    pub end: usize,
    /// Id of the date rule that produced the entity.
    pub rule: Option<String>,
    /// Semantic class of a date entity.
    pub date_kind: Option<DateTimeKind>,
}

/// Result of [`EntityRecognizer::find_entity_info_with_metrics`].
#[derive(Debug, Clone)]
pub struct Detection {
    pub entities: Vec<Entity>,
    pub metrics: DetectMetrics,
}

/// Phone and date recognition over one configuration.
///
/// Cheap to share between threads; every call is independent.
#[derive(Debug, Clone)]
pub struct EntityRecognizer {
    config: RecognizerConfig,
    dates: Option<DateTimeRecognizer>,
    phones: Option<PhoneNumberMatcher>,
    library: Option<Arc<dyn PhoneNumberLibrary>>,
}

impl EntityRecognizer {
    /// Build from rule data already in memory. A missing document disables
    /// the matching recognizer.
    pub fn new(
        config: RecognizerConfig,
        dates: Option<&DateTimeRuleData>,
        phones: Option<&PhoneRuleData>,
    ) -> Self {
        let dates = dates.map(|data| DateTimeRecognizer::new(data, &config.locale, config.limits));
        let phones = phones.map(|data| PhoneNumberMatcher::new(data, &config.region, config.limits));
        EntityRecognizer { config, dates, phones, library: default_library() }
    }

    /// Load the rule data for the configured locale and region from
    /// `config.rules_dir`. Only the enabled kinds are loaded.
    pub fn from_config(config: RecognizerConfig) -> Result<Self, RuleDataError> {
        let root = config.rules_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_RULES_DIR));
        let loader = RuleDataLoader::new(root)?;

        let dates = if config.kinds.contains(EntityKinds::DATE) {
            let (locale, data) = loader.load_datetime(&config.locale)?;
            Some(DateTimeRecognizer::new(&data, &locale, config.limits))
        } else {
            None
        };
        let phones = if config.kinds.contains(EntityKinds::PHONE) {
            let data = loader.load_phone(&config.region)?;
            Some(PhoneNumberMatcher::new(&data, &config.region, config.limits))
        } else {
            None
        };
        Ok(EntityRecognizer { config, dates, phones, library: default_library() })
    }

    /// Use `library` for phone parsing and validity checks.
    pub fn with_phone_library(mut self, library: Arc<dyn PhoneNumberLibrary>) -> Self {
        self.library = Some(library);
        self
    }

    pub fn config(&self) -> &RecognizerConfig {
        &self.config
    }

    pub fn date_recognizer(&self) -> Option<&DateTimeRecognizer> {
        self.dates.as_ref()
    }

    pub fn phone_matcher(&self) -> Option<&PhoneNumberMatcher> {
        self.phones.as_ref()
    }

    /// Phone numbers first, then dates, each group ordered by start.
    pub fn find_entity_info(&self, text: &str) -> Vec<Entity> {
        self.run(text, self.config.kinds).entities
    }

    /// Like [`Self::find_entity_info`], with per-stage timings.
    pub fn find_entity_info_with_metrics(&self, text: &str) -> Detection {
        self.run(text, self.config.kinds)
    }

    pub fn detect_dates(&self, text: &str) -> Vec<Entity> {
        self.run(text, self.config.kinds & EntityKinds::DATE).entities
    }

    pub fn detect_phone_numbers(&self, text: &str) -> Vec<Entity> {
        self.run(text, self.config.kinds & EntityKinds::PHONE).entities
    }

    fn run(&self, text: &str, kinds: EntityKinds) -> Detection {
        let mut metrics = DetectMetrics::default();
        if text.is_empty() || kinds.is_empty() {
            return Detection { entities: Vec::new(), metrics };
        }
        let started = Instant::now();
        let traits = InputTraits::scan(text);

        let stage = Instant::now();
        let normalized = if self.config.normalize_full_width && traits.contains(InputTraits::HAS_FULL_WIDTH) {
            NormalizedText::new(text)
        } else {
            NormalizedText::passthrough(text)
        };
        metrics.normalize = stage.elapsed();

        let mut entities = Vec::new();
        if kinds.contains(EntityKinds::PHONE) && traits.contains(InputTraits::HAS_DIGITS) {
            match (&self.phones, &self.library) {
                (Some(matcher), Some(library)) => {
                    let stage = Instant::now();
                    let found = matcher.find_numbers(normalized.as_str(), library.as_ref());
                    metrics.phone = StageMetrics { duration: stage.elapsed(), produced: found.len() };
                    entities.extend(found.iter().map(|phone| self.phone_entity(text, &normalized, phone)));
                }
                (Some(_), None) => log::debug!("no phone library configured, skipping phone numbers"),
                _ => {}
            }
        }

        if let Some(recognizer) = self.dates.as_ref().filter(|_| kinds.contains(EntityKinds::DATE)) {
            let (found, date_metrics) = recognizer.detect_with_metrics(normalized.as_str());
            metrics.date = date_metrics;
            entities.extend(found.iter().map(|date| self.date_entity(text, &normalized, date)));
        }

        metrics.total = started.elapsed();
        log::debug!("{} entities in {:?}", entities.len(), metrics.total);
        Detection { entities, metrics }
    }

    fn phone_entity(&self, text: &str, normalized: &NormalizedText, phone: &MatchedPhone) -> Entity {
        let (begin, end, body) = self.locate(text, normalized, phone.span.begin, phone.span.end);
        Entity { kind: EntityKind::PhoneNumber, body, begin, end, rule: None, date_kind: None }
    }

    fn date_entity(&self, text: &str, normalized: &NormalizedText, date: &MatchedDateTime) -> Entity {
        let (begin, end, body) = self.locate(text, normalized, date.begin(), date.end());
        Entity { kind: EntityKind::Date, body, begin, end, rule: Some(date.rule_id.to_string()), date_kind: Some(date.kind) }
    }

    /// Normalised byte offsets to caller offsets plus the matched slice.
    fn locate(&self, text: &str, normalized: &NormalizedText, begin: usize, end: usize) -> (usize, usize, String) {
        let begin = normalized.to_original(begin);
        let end = normalized.to_original(end);
        let unit = self.config.offset_unit;
        (unit.convert(text, begin), unit.convert(text, end), slice(text, begin, end).to_string())
    }
}

#[cfg(feature = "phonenumber")]
fn default_library() -> Option<Arc<dyn PhoneNumberLibrary>> {
    Some(Arc::new(crate::phone::PhonenumberCrate))
}

#[cfg(not(feature = "phonenumber"))]
fn default_library() -> Option<Arc<dyn PhoneNumberLibrary>> {
    None
}
