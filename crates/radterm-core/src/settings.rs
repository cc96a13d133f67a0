//! Global settings loaded from TOML.
//!
//! - `init_custom(toml_content)` sets a custom TOML before first `settings()` call
//! - `settings()` returns `&'static Settings` (lazy-init singleton)
//! - Default values are embedded via `include_str!("default_settings.toml")`

use std::sync::OnceLock;
use std::time::Duration;

use serde::Deserialize;

use crate::record::{Source, Status};

pub const DEFAULT_SETTINGS_TOML: &str = include_str!("default_settings.toml");

/// Environment variable that takes precedence over `lookup.api_key`.
pub const API_KEY_ENV: &str = "DECS_API_KEY";

static CUSTOM_TOML: OnceLock<String> = OnceLock::new();

/// Set custom TOML before first `settings()` call.
pub fn init_custom(toml_content: String) -> Result<(), SettingsError> {
    parse_settings_toml(&toml_content)?;
    CUSTOM_TOML
        .set(toml_content)
        .map_err(|_| SettingsError::AlreadyInitialized)
}

/// Get or initialize the global settings singleton.
pub fn settings() -> &'static Settings {
    static INSTANCE: OnceLock<Settings> = OnceLock::new();
    INSTANCE.get_or_init(|| {
        let toml_str = CUSTOM_TOML
            .get()
            .map(|s| s.as_str())
            .unwrap_or(DEFAULT_SETTINGS_TOML);
        parse_settings_toml(toml_str).expect("settings TOML must be valid")
    })
}

/// Returns the embedded default settings TOML content.
pub fn default_toml() -> &'static str {
    DEFAULT_SETTINGS_TOML
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("TOML parse error: {0}")]
    Parse(String),
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("settings already initialized")]
    AlreadyInitialized,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub thresholds: ThresholdSettings,
    pub confidence: ConfidenceSettings,
    pub source_weights: SourceWeights,
    pub status_weights: StatusWeights,
    pub scoring: ScoringSettings,
    pub lookup: LookupSettings,
    pub relevance: RelevanceSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ThresholdSettings {
    pub ok: f64,
    pub ambiguous: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConfidenceSettings {
    pub override_manual: f64,
    #[serde(rename = "override")]
    pub override_: f64,
    pub dict: f64,
    pub dict_partial: f64,
    pub suspicious_radical_cap: f64,
    pub verbose_generic_cap: f64,
    pub decs: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceWeights {
    pub override_manual: f64,
    #[serde(rename = "override")]
    pub override_: f64,
    pub dict: f64,
    pub dict_partial: f64,
    pub rule_suffix: f64,
    pub decs_api: f64,
    pub unknown: f64,
}

impl SourceWeights {
    pub fn weight(&self, source: Source) -> f64 {
        match source {
            Source::OverrideManual => self.override_manual,
            Source::Override => self.override_,
            Source::Dict => self.dict,
            Source::DictPartial => self.dict_partial,
            Source::RuleSuffix => self.rule_suffix,
            Source::DecsApi => self.decs_api,
            Source::Rule | Source::Normalizer | Source::None => self.unknown,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatusWeights {
    pub ok: f64,
    pub ambiguous: f64,
    pub needs_review: f64,
    pub other: f64,
}

impl StatusWeights {
    pub fn weight(&self, status: Status) -> f64 {
        match status {
            Status::Ok => self.ok,
            Status::Ambiguous => self.ambiguous,
            Status::NeedsReview => self.needs_review,
            Status::KeepEn | Status::Untranslated => self.other,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringSettings {
    pub noop_penalty: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LookupSettings {
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    pub requests_per_second: f64,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub backoff_base: f64,
    pub backoff_max: f64,
    #[serde(default)]
    pub max_elapsed_secs: u64,
}

impl LookupSettings {
    /// `DECS_API_KEY` when set and non-empty, else the configured key.
    pub fn resolved_api_key(&self) -> String {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .unwrap_or_else(|| self.api_key.clone())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// `None` when the per-term retry budget is unbounded.
    pub fn max_elapsed(&self) -> Option<Duration> {
        (self.max_elapsed_secs > 0).then(|| Duration::from_secs(self.max_elapsed_secs))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelevanceSettings {
    pub exact_descriptor: u32,
    pub exact_synonym: u32,
    pub descriptor_token: u32,
    pub synonym_token: u32,
    pub descriptor_substring: u32,
}

pub fn parse_settings_toml(toml_str: &str) -> Result<Settings, SettingsError> {
    let s: Settings = toml::from_str(toml_str).map_err(|e| SettingsError::Parse(e.to_string()))?;
    validate(&s)?;
    Ok(s)
}

fn validate(s: &Settings) -> Result<(), SettingsError> {
    macro_rules! check_unit {
        ($section:ident . $field:ident) => {
            if !(0.0..=1.0).contains(&s.$section.$field) {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field))
                        .trim_end_matches('_')
                        .to_string(),
                    reason: "must be within [0, 1]".to_string(),
                });
            }
        };
    }
    macro_rules! check_positive {
        ($section:ident . $field:ident) => {
            if s.$section.$field.is_nan() || s.$section.$field <= 0.0 {
                return Err(SettingsError::InvalidValue {
                    field: concat!(stringify!($section), ".", stringify!($field))
                        .trim_end_matches('_')
                        .to_string(),
                    reason: "must be positive".to_string(),
                });
            }
        };
    }

    check_unit!(thresholds.ok);
    check_unit!(thresholds.ambiguous);
    if s.thresholds.ambiguous > s.thresholds.ok {
        return Err(SettingsError::InvalidValue {
            field: "thresholds.ambiguous".to_string(),
            reason: "must not exceed thresholds.ok".to_string(),
        });
    }

    check_unit!(confidence.override_manual);
    check_unit!(confidence.override_);
    check_unit!(confidence.dict);
    check_unit!(confidence.dict_partial);
    check_unit!(confidence.suspicious_radical_cap);
    check_unit!(confidence.verbose_generic_cap);
    check_unit!(confidence.decs);

    check_positive!(source_weights.override_manual);
    check_positive!(source_weights.override_);
    check_positive!(source_weights.dict);
    check_positive!(source_weights.dict_partial);
    check_positive!(source_weights.rule_suffix);
    check_positive!(source_weights.decs_api);
    check_positive!(source_weights.unknown);

    check_positive!(status_weights.ok);
    check_positive!(status_weights.ambiguous);
    check_positive!(status_weights.needs_review);
    check_positive!(status_weights.other);

    if s.scoring.noop_penalty < 0.0 {
        return Err(SettingsError::InvalidValue {
            field: "scoring.noop_penalty".to_string(),
            reason: "must be non-negative".to_string(),
        });
    }

    check_positive!(lookup.requests_per_second);
    check_positive!(lookup.backoff_base);
    check_positive!(lookup.backoff_max);
    if s.lookup.max_retries == 0 {
        return Err(SettingsError::InvalidValue {
            field: "lookup.max_retries".to_string(),
            reason: "must be positive".to_string(),
        });
    }
    if !s.lookup.base_url.starts_with("http://") && !s.lookup.base_url.starts_with("https://") {
        return Err(SettingsError::InvalidValue {
            field: "lookup.base_url".to_string(),
            reason: "must be an http(s) URL".to_string(),
        });
    }

    let r = &s.relevance;
    let ordered = r.exact_descriptor >= r.exact_synonym
        && r.exact_synonym >= r.descriptor_token
        && r.descriptor_token >= r.synonym_token
        && r.synonym_token >= r.descriptor_substring
        && r.descriptor_substring > 0;
    if !ordered {
        return Err(SettingsError::InvalidValue {
            field: "relevance".to_string(),
            reason: "scores must be positive and non-increasing from exact_descriptor to descriptor_substring"
                .to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_replaced(from: &str, to: &str) -> String {
        assert!(DEFAULT_SETTINGS_TOML.contains(from), "missing {from}");
        DEFAULT_SETTINGS_TOML.replacen(from, to, 1)
    }

    #[test]
    fn parse_default_toml() {
        let s = parse_settings_toml(DEFAULT_SETTINGS_TOML).unwrap();
        assert!((s.thresholds.ok - 0.85).abs() < f64::EPSILON);
        assert!((s.thresholds.ambiguous - 0.60).abs() < f64::EPSILON);
        assert!((s.confidence.override_manual - 0.99).abs() < f64::EPSILON);
        assert!((s.confidence.decs - 0.92).abs() < f64::EPSILON);
        assert!((s.source_weights.weight(Source::OverrideManual) - 1.30).abs() < f64::EPSILON);
        assert!((s.source_weights.weight(Source::Rule) - 0.70).abs() < f64::EPSILON);
        assert!((s.status_weights.weight(Status::KeepEn) - 0.50).abs() < f64::EPSILON);
        assert!((s.scoring.noop_penalty - 0.5).abs() < f64::EPSILON);
        assert_eq!(s.lookup.max_retries, 4);
        assert_eq!(s.lookup.timeout(), Duration::from_secs(10));
        assert_eq!(s.lookup.max_elapsed(), None);
        assert_eq!(s.relevance.exact_descriptor, 10);
        assert_eq!(s.relevance.descriptor_substring, 2);
    }

    #[test]
    fn global_settings_match_default() {
        assert_eq!(settings().lookup.base_url, "https://api.bvsalud.org/decs/v2");
    }

    #[test]
    fn error_threshold_out_of_range() {
        let toml = with_replaced("ok = 0.85", "ok = 1.5");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(matches!(err, SettingsError::InvalidValue { .. }));
        assert!(err.to_string().contains("thresholds.ok"));
    }

    #[test]
    fn error_ambiguous_above_ok() {
        let toml = with_replaced("ambiguous = 0.60", "ambiguous = 0.90");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("thresholds.ambiguous"));
    }

    #[test]
    fn error_zero_rate() {
        let toml = with_replaced("requests_per_second = 20.0", "requests_per_second = 0.0");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("lookup.requests_per_second"));
    }

    #[test]
    fn error_relevance_order() {
        let toml = with_replaced("exact_synonym = 9", "exact_synonym = 11");
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("relevance"));
    }

    #[test]
    fn error_bad_url() {
        let toml = with_replaced(
            "base_url = \"https://api.bvsalud.org/decs/v2\"",
            "base_url = \"ftp://example\"",
        );
        let err = parse_settings_toml(&toml).unwrap_err();
        assert!(err.to_string().contains("lookup.base_url"));
    }

    #[test]
    fn error_invalid_toml() {
        let err = parse_settings_toml("not valid toml {{{").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }
}
