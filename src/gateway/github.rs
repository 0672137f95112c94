use crate::codec::{self, NewPrompt, Prompt, PROMPT_LABEL};
use crate::config::RepoConfig;
use crate::error::{Error, Result};
use crate::gateway::traits::{Credential, Gateway, Identity, ImageUpload};
use async_trait::async_trait;
use base64::Engine as _;
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, instrument, warn};

pub const GITHUB_API_BASE: &str = "https://api.github.com";

const ACCEPT_V3: &str = "application/vnd.github.v3+json";

/// Issues fetched per listing. Only the first page is read.
pub const PAGE_SIZE: u32 = 100;

/// Repository directory that uploaded images are committed to.
pub const IMAGE_DIR: &str = "assets/images";

pub struct GitHubGateway {
    client: Client,
    api_base: String,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

#[derive(Deserialize)]
struct FileResponse {
    content: FileContent,
}

#[derive(Deserialize)]
struct FileContent {
    download_url: Option<String>,
}

impl GitHubGateway {
    pub fn new(api_base: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V3));

        let client = Client::builder()
            .user_agent(concat!("prompt-gallery/", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn repo_url(&self, config: &RepoConfig) -> Result<String> {
        if !config.is_complete() {
            return Err(Error::NotConfigured);
        }
        Ok(format!(
            "{}/repos/{}/{}",
            self.api_base, config.owner, config.repo
        ))
    }

    fn request(&self, method: Method, url: &str, credential: Option<&Credential>) -> RequestBuilder {
        let builder = self.client.request(method, url);
        match credential {
            Some(credential) => {
                builder.header(AUTHORIZATION, format!("token {}", credential.expose()))
            }
            None => builder,
        }
    }
}

/// Status line plus GitHub's `message` field when the body carries one.
async fn rejection(response: Response) -> String {
    let status = response.status();
    match response.json::<ApiErrorBody>().await {
        Ok(ApiErrorBody {
            message: Some(message),
        }) => message,
        _ => format!("HTTP {status}"),
    }
}

/// `<millis>_<name>` with characters that are unsafe in a URL path replaced.
pub fn image_filename(original: &str, millis: i64) -> String {
    let name: String = original
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("{millis}_{name}")
}

#[async_trait]
impl Gateway for GitHubGateway {
    #[instrument(skip(self), fields(repo = %config.slug()))]
    async fn verify_repository(&self, config: &RepoConfig) -> bool {
        let Ok(url) = self.repo_url(config) else {
            return false;
        };
        match self.request(Method::GET, &url, None).send().await {
            Ok(response) => {
                debug!(status = %response.status(), "Repository probe");
                response.status().is_success()
            }
            Err(e) => {
                warn!(error = %e, "Repository probe failed");
                false
            }
        }
    }

    #[instrument(skip(self, credential), fields(repo = %config.slug()))]
    async fn verify_collaborator(
        &self,
        config: &RepoConfig,
        credential: &Credential,
        login: &str,
    ) -> bool {
        let Ok(repo_url) = self.repo_url(config) else {
            return false;
        };
        let url = format!("{repo_url}/collaborators/{login}");
        match self.request(Method::GET, &url, Some(credential)).send().await {
            Ok(response) => {
                debug!(status = %response.status(), "Collaborator check");
                response.status().is_success()
            }
            Err(e) => {
                warn!(error = %e, "Collaborator check failed");
                false
            }
        }
    }

    #[instrument(skip(self, credential))]
    async fn fetch_identity(&self, credential: &Credential) -> Result<Option<Identity>> {
        let url = format!("{}/user", self.api_base);
        let response = match self.request(Method::GET, &url, Some(credential)).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Identity lookup could not reach GitHub");
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "Token rejected");
            return Err(Error::AuthenticationFailed);
        }

        let identity: Identity = response.json().await?;
        debug!(login = %identity.login, "Token resolved");
        Ok(Some(identity))
    }

    #[instrument(skip(self, credential), fields(repo = %config.slug(), authenticated = credential.is_some()))]
    async fn list_records(
        &self,
        config: &RepoConfig,
        credential: Option<&Credential>,
    ) -> Result<Vec<Prompt>> {
        let url = format!("{}/issues", self.repo_url(config)?);
        let response = self
            .request(Method::GET, &url, credential)
            .query(&[
                ("labels", PROMPT_LABEL.to_string()),
                ("state", "open".to_string()),
                ("per_page", PAGE_SIZE.to_string()),
            ])
            .send()
            .await
            .map_err(|e| Error::LoadFailed {
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(Error::LoadFailed {
                reason: rejection(response).await,
            });
        }

        let values: Vec<serde_json::Value> =
            response.json().await.map_err(|e| Error::LoadFailed {
                reason: e.to_string(),
            })?;

        let decoded = codec::decode_batch(values, &config.owner);
        for failure in &decoded.failures {
            warn!(error = %failure, "Skipping undecodable issue");
        }
        debug!(
            count = decoded.prompts.len(),
            skipped = decoded.failures.len(),
            "Loaded prompts"
        );

        Ok(decoded.prompts)
    }

    #[instrument(skip(self, credential, prompt), fields(repo = %config.slug(), title = %prompt.title))]
    async fn create_record(
        &self,
        config: &RepoConfig,
        credential: &Credential,
        prompt: &NewPrompt,
    ) -> Result<()> {
        let url = format!("{}/issues", self.repo_url(config)?);
        let issue = codec::encode(prompt, &config.owner);

        let response = self
            .request(Method::POST, &url, Some(credential))
            .json(&issue)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Error::Rejected {
                message: rejection(response).await,
            });
        }

        info!("Created prompt issue");
        Ok(())
    }

    #[instrument(skip(self, credential, image), fields(repo = %config.slug(), file = %image.filename, size = image.bytes.len()))]
    async fn upload_image(
        &self,
        config: &RepoConfig,
        credential: &Credential,
        image: &ImageUpload,
    ) -> Result<String> {
        let filename = image_filename(&image.filename, Utc::now().timestamp_millis());
        let url = format!("{}/contents/{IMAGE_DIR}/{filename}", self.repo_url(config)?);
        let content = base64::engine::general_purpose::STANDARD.encode(&image.bytes);

        let upload_failed = |reason: String| Error::UploadFailed {
            filename: filename.clone(),
            reason,
        };

        let response = self
            .request(Method::PUT, &url, Some(credential))
            .json(&json!({
                "message": format!("Upload image {filename}"),
                "content": content,
            }))
            .send()
            .await
            .map_err(|e| upload_failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(upload_failed(rejection(response).await));
        }

        let file: FileResponse = response
            .json()
            .await
            .map_err(|e| upload_failed(e.to_string()))?;
        let download_url = file
            .content
            .download_url
            .ok_or_else(|| upload_failed("response has no download_url".to_string()))?;

        info!(url = %download_url, "Uploaded image");
        Ok(download_url)
    }

    #[instrument(skip(self, credential), fields(repo = %config.slug()))]
    async fn close_record(
        &self,
        config: &RepoConfig,
        credential: &Credential,
        number: u64,
    ) -> Result<()> {
        let url = format!("{}/issues/{number}", self.repo_url(config)?);

        let response = self
            .request(Method::PATCH, &url, Some(credential))
            .json(&json!({ "state": "closed" }))
            .send()
            .await
            .map_err(|e| Error::CloseFailed {
                number,
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(Error::CloseFailed {
                number,
                reason: rejection(response).await,
            });
        }

        info!("Closed prompt issue");
        Ok(())
    }
}
