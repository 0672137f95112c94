pub mod filter;

pub use filter::{categories, Filter, Stats};

use crate::codec::{NewPrompt, Prompt};
use crate::config::{self, AuthSession, RepoConfig, State};
use crate::error::{Error, Result};
use crate::gateway::{Credential, Gateway, ImageUpload};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Shared view of the store's loading flag.
#[derive(Debug, Clone, Default)]
pub struct LoadingFlag(Arc<AtomicBool>);

impl LoadingFlag {
    pub fn get(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn raise(&self) -> LoadingGuard {
        self.0.store(true, Ordering::SeqCst);
        LoadingGuard(self.clone())
    }
}

/// Lowers the loading flag when dropped, whatever path the fetch took.
struct LoadingGuard(LoadingFlag);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0 .0.store(false, Ordering::SeqCst);
    }
}

/// Session and prompt cache for one gallery client.
///
/// Every mutation goes through the gateway and is followed by a full
/// refresh; the remote issue list is the only source of truth.
pub struct Store {
    gateway: Box<dyn Gateway>,
    state: State,
    state_path: Option<PathBuf>,
    records: Vec<Prompt>,
    connected: bool,
    loading: LoadingFlag,
}

impl Store {
    /// Rehydrate configuration and session from the state file.
    pub fn open(gateway: Box<dyn Gateway>) -> Result<Self> {
        let path = config::state_path()?;
        Self::open_at(gateway, path)
    }

    pub fn open_at(gateway: Box<dyn Gateway>, path: PathBuf) -> Result<Self> {
        let state = config::load_from(&path)?;
        debug!(
            path = %path.display(),
            repo = %state.config.slug(),
            logged_in = state.session.is_some(),
            "Loaded state"
        );
        let mut store = Self::new(gateway, state);
        store.state_path = Some(path);
        Ok(store)
    }

    /// A store that keeps its state in memory only.
    pub fn new(gateway: Box<dyn Gateway>, state: State) -> Self {
        Self {
            gateway,
            state,
            state_path: None,
            records: Vec::new(),
            connected: false,
            loading: LoadingFlag::default(),
        }
    }

    pub fn gateway(&self) -> &dyn Gateway {
        self.gateway.as_ref()
    }

    pub fn config(&self) -> &RepoConfig {
        &self.state.config
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.state.session.as_ref()
    }

    pub fn records(&self) -> &[Prompt] {
        &self.records
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn is_loading(&self) -> bool {
        self.loading.get()
    }

    pub fn loading_flag(&self) -> LoadingFlag {
        self.loading.clone()
    }

    fn credential(&self) -> Option<Credential> {
        self.state
            .session
            .as_ref()
            .map(|s| Credential::new(s.token.clone()))
    }

    fn require_credential(&self) -> Result<Credential> {
        self.credential().ok_or(Error::LoginRequired)
    }

    fn persist(&self) -> Result<()> {
        if let Some(path) = &self.state_path {
            config::save_to(path, &self.state)?;
        }
        Ok(())
    }

    /// Replace the repository configuration. Does not fetch.
    #[instrument(skip(self))]
    pub fn configure(&mut self, config: RepoConfig) -> Result<()> {
        self.state.config = config;
        self.persist()?;
        info!(repo = %self.state.config.slug(), "Configuration saved");
        Ok(())
    }

    /// Verify a token and its collaborator status, then start a session.
    ///
    /// Both checks must pass; otherwise no session is stored.
    #[instrument(skip(self, token))]
    pub async fn login(&mut self, token: &str) -> Result<()> {
        let repo = &self.state.config;
        if !repo.is_complete() {
            return Err(Error::NotConfigured);
        }

        let credential = Credential::new(token);
        let identity = self
            .gateway
            .fetch_identity(&credential)
            .await?
            .ok_or(Error::IdentityUnavailable)?;

        if !self
            .gateway
            .verify_collaborator(repo, &credential, &identity.login)
            .await
        {
            warn!(login = %identity.login, "Login rejected: not a collaborator");
            return Err(Error::NotCollaborator {
                login: identity.login,
                owner: repo.owner.clone(),
                repo: repo.repo.clone(),
            });
        }

        info!(login = %identity.login, "Logged in");
        self.state.session = Some(AuthSession {
            login: identity.login,
            token: token.to_string(),
        });
        self.persist()
    }

    /// End the session. Cached prompts stay readable.
    #[instrument(skip(self))]
    pub fn logout(&mut self) -> Result<()> {
        if let Some(session) = self.state.session.take() {
            info!(login = %session.login, "Logged out");
        }
        self.persist()
    }

    /// Reload the prompt cache from the tracker.
    ///
    /// On failure the previous prompts are kept and the store reports
    /// itself disconnected.
    #[instrument(skip(self))]
    pub async fn refresh(&mut self) -> Result<()> {
        let _loading = self.loading.raise();

        let result = if self.state.config.is_complete() {
            let credential = self.credential();
            self.gateway
                .list_records(&self.state.config, credential.as_ref())
                .await
        } else {
            Err(Error::NotConfigured)
        };

        match result {
            Ok(records) => {
                debug!(count = records.len(), "Cache replaced");
                self.records = records;
                self.connected = true;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, kept = self.records.len(), "Refresh failed");
                self.connected = false;
                Err(e)
            }
        }
    }

    /// Create a prompt, uploading its image first when one is given.
    #[instrument(skip(self, prompt, image), fields(title = %prompt.title))]
    pub async fn create(&mut self, mut prompt: NewPrompt, image: Option<ImageUpload>) -> Result<()> {
        let credential = self.require_credential()?;
        prompt.validate()?;

        if let Some(image) = image {
            let url = self
                .gateway
                .upload_image(&self.state.config, &credential, &image)
                .await?;
            prompt.image_url = Some(url);
        }

        self.gateway
            .create_record(&self.state.config, &credential, &prompt)
            .await?;

        self.refresh().await
    }

    /// Remove a prompt by closing its issue.
    #[instrument(skip(self))]
    pub async fn remove(&mut self, number: u64) -> Result<()> {
        let credential = self.require_credential()?;

        self.gateway
            .close_record(&self.state.config, &credential, number)
            .await?;

        self.refresh().await
    }

    pub fn find(&self, number: u64) -> Option<&Prompt> {
        self.records.iter().find(|p| p.number == number)
    }
}
