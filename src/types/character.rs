use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::skillset::parse_skillset;
use crate::util::{parse_timestamp, split_roman_suffix};

// ---------------------------------------------------------------------------
// Lenient field deserializers
// ---------------------------------------------------------------------------

/// Deserialize an optional timestamp; `null`, `""` and `"-"` mean absent.
pub(crate) mod optional_timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw {
            None => Ok(None),
            Some(s) => super::parse_timestamp(&s).map_err(serde::de::Error::custom),
        }
    }

    #[allow(clippy::ref_option)]
    pub fn serialize<S>(value: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }
}

/// The roster sends the skill-set filter comma-joined; lists are accepted too.
mod skillset_field {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Joined(String),
        List(Vec<String>),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Option<Raw> = Option::deserialize(deserializer)?;
        Ok(match raw {
            None => Vec::new(),
            Some(Raw::Joined(s)) => super::parse_skillset(&s),
            Some(Raw::List(items)) => super::parse_skillset(&items.join(",")),
        })
    }
}

// ---------------------------------------------------------------------------
// Roster records
// ---------------------------------------------------------------------------

/// A trained (or partially trained) skill on a character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(alias = "skill")]
    pub name: String,
    pub level: u8,
    pub trained_sp: u64,
    pub end_sp: u64,
    pub start_sp: u64,
}

/// One step of a character's training queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawQueueEntry")]
pub struct SkillQueueEntry {
    pub name: String,
    pub finished_level: Option<u8>,
    pub start_sp: u64,
    pub trained_sp: u64,
    pub end_sp: u64,
    #[serde(with = "optional_timestamp")]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(with = "optional_timestamp")]
    pub finish_date: Option<DateTime<Utc>>,
}

/// Queue entry as sent. The server may fold the target level into the
/// name (`"Cybernetics V"`) instead of sending `finished_level`.
#[derive(Deserialize)]
struct RawQueueEntry {
    #[serde(alias = "skill")]
    name: String,
    #[serde(default)]
    finished_level: Option<u8>,
    start_sp: u64,
    trained_sp: u64,
    end_sp: u64,
    #[serde(default, with = "optional_timestamp")]
    start_date: Option<DateTime<Utc>>,
    #[serde(default, with = "optional_timestamp")]
    finish_date: Option<DateTime<Utc>>,
}

impl From<RawQueueEntry> for SkillQueueEntry {
    fn from(raw: RawQueueEntry) -> Self {
        let (name, finished_level) = match raw.finished_level {
            Some(level) => (raw.name.trim().to_owned(), Some(level)),
            None => {
                let (base, level) = split_roman_suffix(&raw.name);
                (base.to_owned(), level)
            }
        };
        Self {
            name,
            finished_level,
            start_sp: raw.start_sp,
            trained_sp: raw.trained_sp,
            end_sp: raw.end_sp,
            start_date: raw.start_date,
            finish_date: raw.finish_date,
        }
    }
}

impl SkillQueueEntry {
    /// No skill points recorded since this step began.
    pub fn is_fresh(&self) -> bool {
        self.trained_sp == self.start_sp
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub character_id: u64,
    pub character_name: String,
    #[serde(default)]
    pub notification: bool,
    #[serde(default, with = "optional_timestamp")]
    pub last_update: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "skillset_field::deserialize")]
    pub skillset: Vec<String>,
    pub skills: Vec<Skill>,
    pub skillqueue: Vec<SkillQueueEntry>,
}

impl Character {
    pub fn skill(&self, name: &str) -> Option<&Skill> {
        self.skills.iter().find(|s| s.name == name)
    }

    pub fn queued(&self, name: &str) -> impl Iterator<Item = &SkillQueueEntry> {
        self.skillqueue.iter().filter(move |e| e.name == name)
    }

    pub fn has_filter(&self) -> bool {
        !self.skillset.is_empty()
    }
}
