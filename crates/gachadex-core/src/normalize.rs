//! Raw document parsing and normalization into [`Suggestion`] values.
//!
//! Documents arrive from two places with the same loose shape: the bundled
//! snapshot and the remote document store. Every field is optional at the
//! wire level, so this module is the single place that decides what a
//! usable record is. Records that survive come out as fully populated
//! `Suggestion`s; everything questionable is reported as a [`RecordIssue`]
//! instead of being silently blanked.
//!
//! Policy:
//! - name missing in both languages: record excluded;
//! - name missing in one language: kept, the present variant is copied
//!   across, reported as patched;
//! - id missing: fall back to the slug; with neither, the record is
//!   excluded (it could not be deduplicated or navigated to);
//! - slug missing: kept with an empty slug, reported.

use std::fmt;

use serde::Deserialize;
use tracing::warn;

use crate::types::{Language, LocalizedText, Suggestion, SuggestionKind};

/// Separator between subtitle components.
pub const SUBTITLE_SEPARATOR: &str = " • ";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawLocalizedText {
    pub en: Option<String>,
    pub vi: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSlug {
    pub current: Option<String>,
}

/// Character document as stored: every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawCharacter {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<RawLocalizedText>,
    pub slug: Option<RawSlug>,
    pub image: Option<String>,
    pub splash: Option<String>,
    pub role: Option<String>,
    pub element: Option<String>,
    pub weapon: Option<String>,
    pub rarity: Option<String>,
}

/// Weapon document as stored: every field optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawWeapon {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<RawLocalizedText>,
    pub slug: Option<RawSlug>,
    pub image: Option<String>,
    #[serde(rename = "type")]
    pub weapon_type: Option<String>,
    pub rarity: Option<String>,
    pub description: Option<RawLocalizedText>,
}

/// What went wrong (or was repaired) while normalizing one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// Name missing in both languages; record excluded.
    MissingName,
    /// Name missing in the given language; the other variant was copied.
    PatchedName(Language),
    /// Neither id nor slug present; record excluded.
    MissingId,
    /// Slug missing; record kept with an empty slug.
    MissingSlug,
}

/// A per-record data-quality finding produced during normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordIssue {
    pub kind: SuggestionKind,
    /// Best available identifier for the offending record.
    pub record: String,
    pub issue: IssueKind,
}

impl fmt::Display for RecordIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.issue {
            IssueKind::MissingName => {
                write!(f, "{} '{}': name missing, excluded", self.kind, self.record)
            },
            IssueKind::PatchedName(lang) => write!(
                f,
                "{} '{}': {} name missing, copied from the other language",
                self.kind, self.record, lang
            ),
            IssueKind::MissingId => {
                write!(f, "{} '{}': no id or slug, excluded", self.kind, self.record)
            },
            IssueKind::MissingSlug => {
                write!(f, "{} '{}': slug missing", self.kind, self.record)
            },
        }
    }
}

/// Outcome of normalizing a batch of raw records.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub suggestions: Vec<Suggestion>,
    pub issues: Vec<RecordIssue>,
}

impl NormalizedBatch {
    /// Log every issue at warn level. Callers decide when (the static
    /// cache logs once per load, the fallback path once per fetch).
    pub fn log_issues(&self) {
        for issue in &self.issues {
            warn!("record normalization: {issue}");
        }
    }
}

/// Join present, non-empty components with the subtitle separator.
///
/// Absent components are omitted entirely, so the result never carries a
/// dangling separator or a literal "null"/"undefined" placeholder.
#[must_use]
pub fn compose_subtitle<'a>(components: &[Option<&'a str>]) -> String {
    let present: Vec<&str> = components
        .iter()
        .filter_map(|c| c.filter(|s| !s.trim().is_empty()))
        .collect();
    present.join(SUBTITLE_SEPARATOR)
}

fn resolve_name(
    raw: Option<RawLocalizedText>,
    kind: SuggestionKind,
    record: &str,
    issues: &mut Vec<RecordIssue>,
) -> Option<LocalizedText> {
    let raw = raw.unwrap_or_default();
    let en = raw.en.filter(|s| !s.trim().is_empty());
    let vi = raw.vi.filter(|s| !s.trim().is_empty());

    match (en, vi) {
        (Some(en), Some(vi)) => Some(LocalizedText { en, vi }),
        (Some(en), None) => {
            issues.push(RecordIssue {
                kind,
                record: record.to_string(),
                issue: IssueKind::PatchedName(Language::Vi),
            });
            Some(LocalizedText {
                vi: en.clone(),
                en,
            })
        },
        (None, Some(vi)) => {
            issues.push(RecordIssue {
                kind,
                record: record.to_string(),
                issue: IssueKind::PatchedName(Language::En),
            });
            Some(LocalizedText {
                en: vi.clone(),
                vi,
            })
        },
        (None, None) => {
            issues.push(RecordIssue {
                kind,
                record: record.to_string(),
                issue: IssueKind::MissingName,
            });
            None
        },
    }
}

fn resolve_identity(
    id: Option<String>,
    slug: Option<RawSlug>,
    kind: SuggestionKind,
    issues: &mut Vec<RecordIssue>,
) -> Option<(String, String)> {
    let id = id.filter(|s| !s.trim().is_empty());
    let slug = slug
        .and_then(|s| s.current)
        .filter(|s| !s.trim().is_empty());

    match (id, slug) {
        (Some(id), Some(slug)) => Some((id, slug)),
        (Some(id), None) => {
            issues.push(RecordIssue {
                kind,
                record: id.clone(),
                issue: IssueKind::MissingSlug,
            });
            Some((id, String::new()))
        },
        (None, Some(slug)) => Some((slug.clone(), slug)),
        (None, None) => {
            issues.push(RecordIssue {
                kind,
                record: "<unknown>".to_string(),
                issue: IssueKind::MissingId,
            });
            None
        },
    }
}

fn map_character(raw: RawCharacter, issues: &mut Vec<RecordIssue>) -> Option<Suggestion> {
    let kind = SuggestionKind::Character;
    let (id, slug) = resolve_identity(raw.id, raw.slug, kind, issues)?;
    let name = resolve_name(raw.name, kind, &id, issues)?;

    let subtitle = compose_subtitle(&[
        raw.role.as_deref(),
        raw.element.as_deref(),
        raw.weapon.as_deref(),
    ]);

    Some(Suggestion {
        id,
        kind,
        name,
        slug,
        image: raw.image.or(raw.splash),
        subtitle,
        role: raw.role,
        element: raw.element,
        weapon: raw.weapon,
        weapon_type: None,
        rarity: raw.rarity,
        description: None,
    })
}

fn map_weapon(raw: RawWeapon, issues: &mut Vec<RecordIssue>) -> Option<Suggestion> {
    let kind = SuggestionKind::Weapon;
    let (id, slug) = resolve_identity(raw.id, raw.slug, kind, issues)?;
    let name = resolve_name(raw.name, kind, &id, issues)?;

    let subtitle = compose_subtitle(&[raw.weapon_type.as_deref(), raw.rarity.as_deref()]);

    let description = raw.description.and_then(|d| {
        let en = d.en.filter(|s| !s.trim().is_empty());
        let vi = d.vi.filter(|s| !s.trim().is_empty());
        match (en, vi) {
            (Some(en), Some(vi)) => Some(LocalizedText { en, vi }),
            (Some(text), None) | (None, Some(text)) => Some(LocalizedText {
                en: text.clone(),
                vi: text,
            }),
            (None, None) => None,
        }
    });

    Some(Suggestion {
        id,
        kind,
        name,
        slug,
        image: raw.image,
        subtitle,
        role: None,
        element: None,
        weapon: None,
        weapon_type: raw.weapon_type,
        rarity: raw.rarity,
        description,
    })
}

/// Normalize a batch of character documents.
pub fn normalize_characters(raw: impl IntoIterator<Item = RawCharacter>) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for record in raw {
        if let Some(suggestion) = map_character(record, &mut batch.issues) {
            batch.suggestions.push(suggestion);
        }
    }
    batch
}

/// Normalize a batch of weapon documents.
pub fn normalize_weapons(raw: impl IntoIterator<Item = RawWeapon>) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();
    for record in raw {
        if let Some(suggestion) = map_weapon(record, &mut batch.issues) {
            batch.suggestions.push(suggestion);
        }
    }
    batch
}
