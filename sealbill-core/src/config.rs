//! Configuration and locale selection.
use crate::render::LayoutMetrics;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    path::{Path, PathBuf},
    str::FromStr,
};
use thiserror::Error;

/// BCP 47-ish language tag used to pick translations and date formats.
///
/// Tags are normalized to lowercase with `-` separators, so `fr_CA` and
/// `fr-ca` are the same locale.
///
/// # Examples
/// ```rust
/// use std::str::FromStr;
/// use sealbill_core::config::Locale;
///
/// let locale = Locale::from_str("fr_CA")?;
/// assert_eq!(locale.as_str(), "fr-ca");
/// assert_eq!(locale.primary_language(), "fr");
/// # Ok::<(), sealbill_core::config::LocaleParseError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Locale(String);

/// Error returned when parsing a [`Locale`] from a string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocaleParseError {
    #[error("invalid locale tag: {input:?}")]
    Invalid { input: String },
}

impl FromStr for Locale {
    type Err = LocaleParseError;
    fn from_str(tag: &str) -> Result<Locale, LocaleParseError> {
        let normalized = tag.trim().replace('_', "-").to_ascii_lowercase();
        let valid = !normalized.is_empty()
            && normalized.split('-').all(|subtag| {
                (1..=8).contains(&subtag.len())
                    && subtag.chars().all(|c| c.is_ascii_alphanumeric())
            });
        if !valid {
            return Err(LocaleParseError::Invalid {
                input: tag.to_string(),
            });
        }
        Ok(Locale(normalized))
    }
}

impl TryFrom<String> for Locale {
    type Error = LocaleParseError;
    fn try_from(value: String) -> Result<Self, LocaleParseError> {
        value.parse()
    }
}

impl From<Locale> for String {
    fn from(value: Locale) -> Self {
        value.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Locale {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The language subtag, e.g. `fr` for `fr-ca`.
    pub fn primary_language(&self) -> &str {
        self.0.split('-').next().unwrap_or(&self.0)
    }
}

// "en" is the fallback every catalog ships with
impl Default for Locale {
    fn default() -> Self {
        Locale("en".to_string())
    }
}

/// Errors raised while loading or checking configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid page geometry: {0}")]
    Geometry(String),
}

/// Rendering configuration: fallback locale and page geometry.
///
/// # Examples
/// ```rust
/// use sealbill_core::config::Config;
///
/// let config = Config::from_json_str(r#"{ "locale": "fr", "layout": { "lineHeight": 12.0 } }"#)?;
/// assert_eq!(config.locale().as_str(), "fr");
/// assert_eq!(config.layout().line_height, 12.0);
/// # Ok::<(), sealbill_core::config::ConfigError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    locale: Locale,
    layout: LayoutMetrics,
}

impl Config {
    pub fn new(locale: Locale, layout: LayoutMetrics) -> Self {
        Self { locale, layout }
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_json::from_str(json)?;
        config.layout.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Locale used when an invoice's own locale has no translation.
    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn layout(&self) -> &LayoutMetrics {
        &self.layout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_rejects_garbage() {
        for bad in ["", "  ", "en--us", "fr/ca", "abcdefghi"] {
            assert!(Locale::from_str(bad).is_err(), "{bad:?} should not parse");
        }
    }

    #[test]
    fn locale_deserializes_through_parser() {
        let locale: Locale = serde_json::from_str("\"EN_gb\"").expect("valid tag");
        assert_eq!(locale.as_str(), "en-gb");
        assert!(serde_json::from_str::<Locale>("\"!!\"").is_err());
    }

    #[test]
    fn config_rejects_impossible_geometry() {
        let err = Config::from_json_str(r#"{ "layout": { "printableBottom": 2000.0 } }"#)
            .expect_err("printable area below the page");
        assert!(matches!(err, ConfigError::Geometry(_)));
    }

    #[test]
    fn missing_config_file_reports_path() {
        let err = Config::from_json_file(Path::new("/nonexistent/sealbill.json"))
            .expect_err("missing file");
        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("sealbill.json")),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
