use serde::Deserialize;

use crate::color::Color;

/// Deserialize an `Option<Color>` from a TOML string value.
pub(crate) mod color_de {
    use serde::{self, Deserialize, Deserializer};

    use crate::color::Color;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Color>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: Option<String> = Option::deserialize(deserializer)?;
        match s {
            None => Ok(None),
            Some(s) => Color::parse(&s, "<theme>")
                .map(Some)
                .map_err(serde::de::Error::custom),
        }
    }
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub defaults: Defaults,
    pub labels: Labels,
    pub theme: Theme,
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// Where the table rows come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSource {
    /// The server-rendered detail endpoint.
    #[default]
    Details,
    /// Rows computed locally from the raw roster.
    Roster,
}

/// Endpoints and credentials. Paths are joined onto `base_url`;
/// `{character_id}` is substituted.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub base_url: String,
    pub details_path: String,
    pub roster_path: String,
    pub alarm_path: String,
    pub mark_as_read_path: String,
    pub skillset_path: String,
    /// Anti-forgery token sent with every form post.
    pub csrf_token: Option<String>,
    /// Session cookie value for an authenticated server session.
    pub session_cookie: Option<String>,
    /// Character whose roster the read endpoints return.
    pub character_id: u64,
    pub table_source: TableSource,
    /// Roster characters not updated within this many days are inactive.
    pub inactive_days: u32,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/skillfarm/".to_owned(),
            details_path: "api/character/{character_id}/details/".to_owned(),
            roster_path: "api/character/{character_id}/skillfarm/".to_owned(),
            alarm_path: "switch_alarm/{character_id}/".to_owned(),
            mark_as_read_path: "mark_as_read/{character_id}/".to_owned(),
            skillset_path: "skillset/{character_id}/".to_owned(),
            csrf_token: None,
            session_cookie: None,
            character_id: 0,
            table_source: TableSource::Details,
            inactive_days: 3,
            timeout_secs: 30,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub page_size: usize,
    pub date_format: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            page_size: 25,
            date_format: "%Y-%m-%d %H:%M".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Operator-facing strings. `{}` in a template is replaced by a name.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub details_tab: String,
    pub inactive_tab: String,
    pub not_updated: String,
    pub no_rows: String,
    pub loading: String,
    pub confirm_toggle_alarm: String,
    pub confirm_toggle_all: String,
    pub confirm_mark_as_read: String,
    pub confirm_save_skillset: String,
    pub readiness_ready: String,
    pub readiness_maybe: String,
    pub readiness_not_ready: String,
    pub filter_active: String,
    pub filter_inactive: String,
    pub mastered: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            details_tab: "Details".to_owned(),
            inactive_tab: "Inactive".to_owned(),
            not_updated: "not updated".to_owned(),
            no_rows: "No characters".to_owned(),
            loading: "Loading...".to_owned(),
            confirm_toggle_alarm: "Are you sure you want to toggle the alarm for {}?".to_owned(),
            confirm_toggle_all: "Are you sure you want to toggle all alarms?".to_owned(),
            confirm_mark_as_read: "Are you sure you want to toggle mark as read for {}?"
                .to_owned(),
            confirm_save_skillset: "Save the skill set for {}?".to_owned(),
            readiness_ready: "Extraction ready".to_owned(),
            readiness_maybe: "Maybe ready".to_owned(),
            readiness_not_ready: "Not ready".to_owned(),
            filter_active: "\u{2713}".to_owned(),
            filter_inactive: "\u{2717}".to_owned(),
            mastered: "\u{2605}".to_owned(),
        }
    }
}

impl Labels {
    /// Substitute `name` for the first `{}` in `template`.
    pub fn format(template: &str, name: &str) -> String {
        template.replacen("{}", name, 1)
    }
}

// ---------------------------------------------------------------------------
// Theme
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub colors: ColorsTheme,
    pub table: TableTheme,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TableTheme {
    pub show_separator: bool,
}

impl Default for TableTheme {
    fn default() -> Self {
        Self {
            show_separator: true,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ColorsTheme {
    pub text: TextColors,
    pub background: BgColors,
    pub border: BorderColors,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TextColors {
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub primary: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub secondary: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub faint: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub warning: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub success: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub error: Option<Color>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BgColors {
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub selected: Option<Color>,
    /// Rows whose readiness is "maybe".
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub row_warning: Option<Color>,
    /// Rows that are extraction ready.
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub row_alert: Option<Color>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BorderColors {
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub primary: Option<Color>,
    #[serde(default, deserialize_with = "color_de::deserialize")]
    pub faint: Option<Color>,
}
