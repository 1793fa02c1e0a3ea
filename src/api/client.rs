use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue, REFERER};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::types::ServerConfig;
use crate::confirm::Submission;
use crate::types::{DetailsPayload, RosterPayload};

const USER_AGENT: &str = concat!("skillfarm-board/", env!("CARGO_PKG_VERSION"));
const CSRF_HEADER: &str = "X-CSRFToken";

/// One `{value, text}` option of the skill-set form's multi-select.
#[derive(Debug, Serialize)]
struct SelectedSkill<'a> {
    value: &'a str,
    text: &'a str,
}

/// HTTP access to the skillfarm server: two read endpoints, two form posts.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    server: ServerConfig,
}

impl ApiClient {
    pub fn new(server: &ServerConfig) -> Result<Self> {
        // Ignore the error: a provider may already be installed.
        let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

        let mut headers = HeaderMap::new();
        if let Some(cookie) = cookie_header(server) {
            headers.insert(
                COOKIE,
                HeaderValue::from_str(&cookie).context("session cookie is not a valid header")?,
            );
        }
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(server.timeout_secs.max(1)))
            .build()
            .context("building HTTP client")?;
        Ok(Self {
            http,
            server: server.clone(),
        })
    }

    /// Absolute URL for a configured path, with `{character_id}` filled in.
    pub fn url(&self, path: &str, character_id: u64) -> String {
        let path = path.replace("{character_id}", &character_id.to_string());
        if path.starts_with("http://") || path.starts_with("https://") {
            return path;
        }
        format!(
            "{}/{}",
            self.server.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn fetch_details(&self) -> Result<DetailsPayload> {
        let url = self.url(&self.server.details_path, self.server.character_id);
        self.get_json(&url).await
    }

    pub async fn fetch_roster(&self) -> Result<RosterPayload> {
        let url = self.url(&self.server.roster_path, self.server.character_id);
        self.get_json(&url).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(url, "GET");
        let body = self
            .http
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))?
            .text()
            .await
            .with_context(|| format!("reading body of {url}"))?;
        serde_json::from_str(&body).with_context(|| format!("decoding payload from {url}"))
    }

    /// Post the form behind `submission`. The outcome shows up in the next
    /// fetch; only transport and HTTP errors are reported here.
    pub async fn submit(&self, submission: &Submission) -> Result<()> {
        let id = submission.target_id();
        let token = self.server.csrf_token.clone().unwrap_or_default();
        let mut form: Vec<(&str, String)> = vec![
            ("csrfmiddlewaretoken", token.clone()),
            ("character_id", id.to_string()),
            ("confirm", "yes".to_owned()),
        ];
        let path = match submission {
            Submission::ToggleAlarm { .. } | Submission::ToggleAllAlarms => &self.server.alarm_path,
            Submission::MarkAsRead { .. } => &self.server.mark_as_read_path,
            Submission::SaveSkillset { skills, .. } => {
                let selected: Vec<SelectedSkill<'_>> = skills
                    .iter()
                    .filter(|s| !s.trim().is_empty())
                    .map(|s| SelectedSkill { value: s, text: s })
                    .collect();
                form.push((
                    "selected_skills",
                    serde_json::to_string(&selected).context("encoding selected skills")?,
                ));
                &self.server.skillset_path
            }
        };
        let url = self.url(path, id);
        tracing::debug!(url = %url, ?submission, "POST");

        self.http
            .post(&url)
            .header(CSRF_HEADER, token)
            .header(REFERER, self.server.base_url.as_str())
            .form(&form)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?
            .error_for_status()
            .with_context(|| format!("POST {url}"))?;
        Ok(())
    }
}

fn cookie_header(server: &ServerConfig) -> Option<String> {
    let mut parts = Vec::new();
    if let Some(session) = server.session_cookie.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("sessionid={session}"));
    }
    if let Some(token) = server.csrf_token.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("csrftoken={token}"));
    }
    (!parts.is_empty()).then(|| parts.join("; "))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> ApiClient {
        let server = ServerConfig {
            base_url: base_url.to_owned(),
            ..ServerConfig::default()
        };
        ApiClient::new(&server).unwrap()
    }

    #[test]
    fn url_joins_base_and_substitutes_id() {
        let c = client("https://auth.example.org/skillfarm/");
        assert_eq!(
            c.url("/switch_alarm/{character_id}/", 0),
            "https://auth.example.org/skillfarm/switch_alarm/0/"
        );
        assert_eq!(
            c.url("https://other.example.org/x/{character_id}", 7),
            "https://other.example.org/x/7"
        );
    }

    #[test]
    fn cookie_header_combines_session_and_token() {
        let server = ServerConfig {
            session_cookie: Some("abc".to_owned()),
            csrf_token: Some("tok".to_owned()),
            ..ServerConfig::default()
        };
        assert_eq!(
            cookie_header(&server).as_deref(),
            Some("sessionid=abc; csrftoken=tok")
        );
        assert!(cookie_header(&ServerConfig::default()).is_none());
    }
}
