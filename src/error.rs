use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Repository is not configured. Set it with: prompt-gallery config --owner <owner> --repo <repo>")]
    NotConfigured,

    #[error("Repository {owner}/{repo} could not be verified. Check the owner and repository names")]
    RepositoryUnavailable { owner: String, repo: String },

    #[error("Authentication failed: the token was rejected by GitHub")]
    AuthenticationFailed,

    #[error("Could not reach GitHub to verify the token. Check your network and try again")]
    IdentityUnavailable,

    #[error("'{login}' is not a collaborator of {owner}/{repo}")]
    NotCollaborator { login: String, owner: String, repo: String },

    #[error("Please log in first: prompt-gallery login <token>")]
    LoginRequired,

    #[error("Failed to load prompts: {reason}")]
    LoadFailed { reason: String },

    #[error("GitHub rejected the request: {message}")]
    Rejected { message: String },

    #[error("Failed to upload image {filename}: {reason}")]
    UploadFailed { filename: String, reason: String },

    #[error("Failed to close issue #{number}: {reason}")]
    CloseFailed { number: u64, reason: String },

    #[error("Prompt #{number} not found")]
    PromptNotFound { number: u64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to read image: {path}")]
    ImageRead { path: PathBuf, source: std::io::Error },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),
}
