use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    #[serde(default)]
    pub config: RepoConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<AuthSession>,
}

/// The repository whose issues back the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// User or organization that owns the repository
    #[serde(default)]
    pub owner: String,

    /// Repository name
    #[serde(default = "default_repo")]
    pub repo: String,
}

impl Default for RepoConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: default_repo(),
        }
    }
}

fn default_repo() -> String {
    "ai-prompts-gallery".to_string()
}

impl RepoConfig {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// Both owner and repo are set; no remote call is made otherwise.
    pub fn is_complete(&self) -> bool {
        !self.owner.trim().is_empty() && !self.repo.trim().is_empty()
    }

    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }
}

/// A login that was checked against the repository's collaborator list.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthSession {
    pub login: String,
    pub token: String,
}

// Keeps the token out of logs and panics.
impl fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSession")
            .field("login", &self.login)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl State {
    /// Validate values a hand-edited state file may get wrong.
    pub fn validate(&self) -> anyhow::Result<()> {
        validate_name("owner", &self.config.owner, true)?;
        validate_name("repo", &self.config.repo, false)?;

        if let Some(session) = &self.session {
            if session.login.trim().is_empty() {
                anyhow::bail!("session.login must not be empty");
            }
            if session.token.trim().is_empty() {
                anyhow::bail!("session.token must not be empty");
            }
        }

        Ok(())
    }
}

fn validate_name(field: &str, value: &str, allow_empty: bool) -> anyhow::Result<()> {
    if value.is_empty() {
        if allow_empty {
            return Ok(());
        }
        anyhow::bail!("config.{field} must not be empty");
    }
    if value.contains('/') || value.chars().any(char::is_whitespace) {
        anyhow::bail!("config.{field} '{value}' must not contain '/' or whitespace");
    }
    Ok(())
}
