use crate::codec::{NewPrompt, Prompt};
use crate::config::RepoConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

/// A personal access token. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

/// The account a token belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    pub login: String,
}

/// An image to attach to a new prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self> {
        let bytes = tokio::fs::read(path).await.map_err(|source| Error::ImageRead {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        Ok(Self { filename, bytes })
    }
}

/// Remote issue tracker holding the gallery.
///
/// Read paths take an optional credential (anonymous reads work on public
/// repositories). Write and identity paths require one.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Check the repository exists and is visible. Never fails.
    async fn verify_repository(&self, config: &RepoConfig) -> bool;

    /// Check `login` is a collaborator of the repository. Never fails.
    async fn verify_collaborator(
        &self,
        config: &RepoConfig,
        credential: &Credential,
        login: &str,
    ) -> bool;

    /// Resolve the token's account.
    ///
    /// A rejected token is `Error::AuthenticationFailed`; an unreachable
    /// service is `Ok(None)`.
    async fn fetch_identity(&self, credential: &Credential) -> Result<Option<Identity>>;

    /// List open prompt issues, skipping any that fail to decode.
    async fn list_records(
        &self,
        config: &RepoConfig,
        credential: Option<&Credential>,
    ) -> Result<Vec<Prompt>>;

    /// Open a new prompt issue.
    async fn create_record(
        &self,
        config: &RepoConfig,
        credential: &Credential,
        prompt: &NewPrompt,
    ) -> Result<()>;

    /// Commit an image into the repository and return its download URL.
    async fn upload_image(
        &self,
        config: &RepoConfig,
        credential: &Credential,
        image: &ImageUpload,
    ) -> Result<String>;

    /// Close a prompt issue. Closed issues drop out of `list_records`.
    async fn close_record(
        &self,
        config: &RepoConfig,
        credential: &Credential,
        number: u64,
    ) -> Result<()>;
}

/// Factory function to create the gateway for an API base URL
pub fn create_gateway(api_base: &str) -> Result<Box<dyn Gateway>> {
    Ok(Box::new(crate::gateway::github::GitHubGateway::new(
        api_base,
    )?))
}
