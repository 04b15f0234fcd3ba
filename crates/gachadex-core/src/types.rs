use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Display language for bilingual fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Vi,
}

impl Language {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Vi => "vi",
        }
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Self::En),
            "vi" => Ok(Self::Vi),
            other => Err(Error::Config(format!(
                "unsupported language '{other}' (expected 'en' or 'vi')"
            ))),
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A bilingual text pair. Both variants are always populated on values
/// produced by normalization; see `normalize` for the fallback policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub vi: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, vi: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            vi: vi.into(),
        }
    }

    /// The variant for the requested display language.
    #[must_use]
    pub fn resolve(&self, lang: Language) -> &str {
        match lang {
            Language::En => &self.en,
            Language::Vi => &self.vi,
        }
    }

    /// The primary (English) variant, used as the ranking key.
    #[must_use]
    pub fn primary(&self) -> &str {
        &self.en
    }
}

/// Record kind tag. Ids are unique within a kind, not across kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Character,
    Weapon,
}

impl SuggestionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Weapon => "weapon",
        }
    }
}

impl fmt::Display for SuggestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified, kind-tagged search result. Immutable once constructed;
/// updates are full replacements, never partial mutation.
///
/// Kind-specific attributes are carried through from the source record
/// unchanged: `role`/`element`/`weapon` for characters, `type`/`rarity`/
/// `description` for weapons. Fields that do not apply to a kind stay
/// `None` and are skipped on serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: String,
    pub kind: SuggestionKind,
    pub name: LocalizedText,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// One-line summary derived from kind-specific attributes.
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weapon: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub weapon_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<LocalizedText>,
}

impl Suggestion {
    /// Display name for the requested language.
    #[must_use]
    pub fn display_name(&self, lang: Language) -> &str {
        self.name.resolve(lang)
    }
}

/// Which kinds a search surfaced, recorded per analytics event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchCategory {
    Character,
    Weapon,
    Both,
}

impl SearchCategory {
    /// Derive the category from a result list: a single kind maps to that
    /// kind, anything mixed (or empty) counts as `Both`.
    #[must_use]
    pub fn of(results: &[Suggestion]) -> Self {
        let mut has_character = false;
        let mut has_weapon = false;
        for s in results {
            match s.kind {
                SuggestionKind::Character => has_character = true,
                SuggestionKind::Weapon => has_weapon = true,
            }
        }
        match (has_character, has_weapon) {
            (true, false) => Self::Character,
            (false, true) => Self::Weapon,
            _ => Self::Both,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Character => "character",
            Self::Weapon => "weapon",
            Self::Both => "both",
        }
    }
}

impl fmt::Display for SearchCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a search session ended without the user acting on a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbandonReason {
    NoResults,
    TooManyResults,
    UserNavigation,
    Timeout,
}

impl AbandonReason {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NoResults => "no_results",
            Self::TooManyResults => "too_many_results",
            Self::UserNavigation => "user_navigation",
            Self::Timeout => "timeout",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchEvent {
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub result_count: usize,
    pub latency_ms: u64,
    pub category: SearchCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbandonmentEvent {
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub time_spent_ms: u64,
    pub results_shown: usize,
    pub category: SearchCategory,
    pub reason: AbandonReason,
}
