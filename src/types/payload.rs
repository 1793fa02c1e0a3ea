use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use super::character::{Character, optional_timestamp};
use crate::progress::ReadinessTag;
use crate::util;

/// Marker the server embeds in `is_extraction_ready` for the "maybe" tier.
pub const EXTRACTOR_MAYBE_MARKER: &str = "skillfarm-skill-extractor-maybe";
/// Marker the server embeds in `is_extraction_ready` for the "ready" tier.
pub const EXTRACTOR_READY_MARKER: &str = "skillfarm-skill-extractor";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("entry {name:?}: progress {raw:?} carries no percentage")]
    MissingPercent { name: String, raw: String },
    #[error("entry {name:?}: progress {value} is not a finite percentage")]
    InvalidPercent { name: String, value: String },
    #[error("entry has no character name")]
    MissingName,
}

// ---------------------------------------------------------------------------
// Roster endpoint
// ---------------------------------------------------------------------------

/// One group of the roster: the skill names offered for filtering plus the
/// characters sharing that list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterGroup {
    pub skills: Vec<String>,
    pub characters: Vec<Character>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RosterPayload {
    pub groups: Vec<RosterGroup>,
}

impl RosterPayload {
    pub fn characters(&self) -> impl Iterator<Item = &Character> {
        self.groups.iter().flat_map(|g| g.characters.iter())
    }

    pub fn character(&self, character_id: u64) -> Option<&Character> {
        self.characters().find(|c| c.character_id == character_id)
    }

    /// Skill names the filter editor may offer for this character.
    pub fn known_skills(&self, character_id: u64) -> &[String] {
        self.groups
            .iter()
            .find(|g| g.characters.iter().any(|c| c.character_id == character_id))
            .map_or(&[], |g| g.skills.as_slice())
    }
}

// ---------------------------------------------------------------------------
// Detail endpoint
// ---------------------------------------------------------------------------

/// `progress` arrives either as a bare number or as a rendered bar fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressField {
    Percent(f64),
    Html(String),
}

impl ProgressField {
    pub fn percent(&self, name: &str) -> Result<f64, PayloadError> {
        let value = match self {
            Self::Percent(v) => *v,
            Self::Html(raw) => {
                util::last_percentage(raw).ok_or_else(|| PayloadError::MissingPercent {
                    name: name.to_owned(),
                    raw: raw.clone(),
                })?
            }
        };
        if !value.is_finite() {
            return Err(PayloadError::InvalidPercent {
                name: name.to_owned(),
                value: value.to_string(),
            });
        }
        Ok(value.clamp(0.0, 100.0))
    }
}

/// `is_filter` arrives either as a bool or as a rendered status icon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagField {
    Bool(bool),
    Html(String),
}

impl FlagField {
    pub fn is_set(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Html(raw) => {
                let lower = raw.to_lowercase();
                lower == "true" || lower.contains("fa-check") || lower.contains("text-success")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailCharacter {
    #[serde(default)]
    pub character_html: String,
    #[serde(default)]
    pub character_id: Option<u64>,
    #[serde(default)]
    pub character_name: Option<String>,
    #[serde(default)]
    pub notification: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailFields {
    pub progress: ProgressField,
    #[serde(default)]
    pub is_extraction_ready: String,
    #[serde(default, with = "optional_timestamp")]
    pub last_update: Option<DateTime<Utc>>,
    pub is_filter: FlagField,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailEntry {
    pub character: DetailCharacter,
    pub details: DetailFields,
    #[serde(default)]
    pub actions: String,
}

impl DetailEntry {
    pub fn display_name(&self) -> Result<String, PayloadError> {
        if let Some(name) = self.character.character_name.as_deref()
            && !name.trim().is_empty()
        {
            return Ok(name.trim().to_owned());
        }
        let stripped = util::strip_html(&self.character.character_html);
        if stripped.is_empty() {
            return Err(PayloadError::MissingName);
        }
        Ok(stripped)
    }

    /// Character id, falling back to the one embedded in the action URLs.
    pub fn character_id(&self) -> Option<u64> {
        self.character
            .character_id
            .or_else(|| util::path_id_after(&self.actions, "switch_alarm/"))
            .or_else(|| util::path_id_after(&self.actions, "skillset/"))
    }

    /// Alarm state, falling back to the icon color in the character cell.
    pub fn notification(&self) -> bool {
        self.character.notification.unwrap_or_else(|| {
            let html = self.character.character_html.to_lowercase();
            html.contains("fa-bullhorn") && html.contains("green")
        })
    }

    /// Convert the extraction token into a readiness tier, once, at the boundary.
    pub fn readiness(&self) -> Option<ReadinessTag> {
        let token = &self.details.is_extraction_ready;
        if token.contains(EXTRACTOR_MAYBE_MARKER) {
            Some(ReadinessTag::Maybe)
        } else if token.contains(EXTRACTOR_READY_MARKER) {
            Some(ReadinessTag::Ready)
        } else if self.details.is_filter.is_set() {
            Some(ReadinessTag::NotReady)
        } else {
            None
        }
    }
}

/// Entries keyed arbitrarily by the server; an empty list is accepted too.
fn entries<'de, D>(deserializer: D) -> Result<Vec<DetailEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Keyed(IndexMap<String, DetailEntry>),
        List(Vec<DetailEntry>),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Keyed(map) => map.into_values().collect(),
        Raw::List(list) => list,
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailsPayload {
    #[serde(deserialize_with = "entries")]
    pub details: Vec<DetailEntry>,
    #[serde(deserialize_with = "entries")]
    pub inactive: Vec<DetailEntry>,
}
