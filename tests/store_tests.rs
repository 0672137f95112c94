use async_trait::async_trait;
use prompt_gallery::codec::{AiModel, NewPrompt, Prompt};
use prompt_gallery::config::{self, AuthSession, RepoConfig, State};
use prompt_gallery::gateway::{Credential, Gateway, Identity, ImageUpload};
use prompt_gallery::store::{categories, Filter, LoadingFlag, Stats, Store};
use prompt_gallery::{Error, Result};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

/// Gateway double that records every call and replays scripted listings.
#[derive(Clone, Default)]
struct FakeGateway {
    inner: Arc<Mutex<Fake>>,
}

#[derive(Default)]
struct Fake {
    calls: Vec<String>,
    identity: Option<String>,
    identity_rejected: bool,
    collaborators: Vec<String>,
    listings: VecDeque<Result<Vec<Prompt>>>,
    created: Vec<NewPrompt>,
    closed: Vec<u64>,
    tokens_seen: Vec<Option<String>>,
    loading: Option<LoadingFlag>,
    loading_seen: Vec<bool>,
}

impl FakeGateway {
    fn with(f: impl FnOnce(&mut Fake)) -> Self {
        let gateway = Self::default();
        f(&mut gateway.inner.lock().unwrap());
        gateway
    }

    fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn push_listing(&self, listing: Result<Vec<Prompt>>) {
        self.inner.lock().unwrap().listings.push_back(listing);
    }

    fn record(&self, call: &str) {
        self.inner.lock().unwrap().calls.push(call.to_string());
    }
}

#[async_trait]
impl Gateway for FakeGateway {
    async fn verify_repository(&self, _config: &RepoConfig) -> bool {
        self.record("verify_repository");
        true
    }

    async fn verify_collaborator(
        &self,
        _config: &RepoConfig,
        _credential: &Credential,
        login: &str,
    ) -> bool {
        self.record("verify_collaborator");
        self.inner
            .lock()
            .unwrap()
            .collaborators
            .iter()
            .any(|c| c == login)
    }

    async fn fetch_identity(&self, _credential: &Credential) -> Result<Option<Identity>> {
        self.record("fetch_identity");
        let fake = self.inner.lock().unwrap();
        if fake.identity_rejected {
            return Err(Error::AuthenticationFailed);
        }
        Ok(fake.identity.clone().map(|login| Identity { login }))
    }

    async fn list_records(
        &self,
        _config: &RepoConfig,
        credential: Option<&Credential>,
    ) -> Result<Vec<Prompt>> {
        self.record("list_records");
        let mut fake = self.inner.lock().unwrap();
        fake.tokens_seen
            .push(credential.map(|c| c.expose().to_string()));
        if let Some(flag) = fake.loading.clone() {
            fake.loading_seen.push(flag.get());
        }
        fake.listings.pop_front().unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn create_record(
        &self,
        _config: &RepoConfig,
        _credential: &Credential,
        prompt: &NewPrompt,
    ) -> Result<()> {
        self.record("create_record");
        self.inner.lock().unwrap().created.push(prompt.clone());
        Ok(())
    }

    async fn upload_image(
        &self,
        _config: &RepoConfig,
        _credential: &Credential,
        image: &ImageUpload,
    ) -> Result<String> {
        self.record("upload_image");
        Ok(format!("https://raw.example.com/{}", image.filename))
    }

    async fn close_record(
        &self,
        _config: &RepoConfig,
        _credential: &Credential,
        number: u64,
    ) -> Result<()> {
        self.record("close_record");
        self.inner.lock().unwrap().closed.push(number);
        Ok(())
    }
}

fn prompt(number: u64, title: &str, category: &str) -> Prompt {
    Prompt {
        id: number.to_string(),
        number,
        title: title.to_string(),
        model: AiModel::Flux,
        category: category.to_string(),
        prompt: format!("{title} prompt text"),
        image_url: None,
        tags: vec!["calm".to_string()],
        created_at: "2024-05-01".to_string(),
        author: "octocat".to_string(),
    }
}

fn configured() -> State {
    State {
        config: RepoConfig::new("octocat", "gallery"),
        session: None,
    }
}

fn logged_in() -> State {
    State {
        session: Some(AuthSession {
            login: "octocat".to_string(),
            token: "ghp_test".to_string(),
        }),
        ..configured()
    }
}

fn store(gateway: &FakeGateway, state: State) -> Store {
    Store::new(Box::new(gateway.clone()), state)
}

#[tokio::test]
async fn test_starts_empty_and_offline() {
    let gateway = FakeGateway::default();
    let store = store(&gateway, configured());

    assert!(store.records().is_empty());
    assert!(!store.is_connected());
    assert!(!store.is_loading());
    assert!(store.session().is_none());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_refresh_replaces_cache() {
    let gateway = FakeGateway::default();
    gateway.push_listing(Ok(vec![prompt(1, "a", "风景"), prompt(2, "b", "人物")]));
    gateway.push_listing(Ok(vec![prompt(3, "c", "风景")]));
    let mut store = store(&gateway, configured());

    assert_ok!(store.refresh().await);
    assert_eq!(store.records().len(), 2);
    assert!(store.is_connected());

    assert_ok!(store.refresh().await);
    assert_eq!(store.records().len(), 1);
    assert_eq!(store.records()[0].number, 3);
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_failed_refresh_keeps_cache() {
    let gateway = FakeGateway::default();
    gateway.push_listing(Ok(vec![prompt(1, "a", "风景")]));
    gateway.push_listing(Err(Error::LoadFailed {
        reason: "HTTP 502 Bad Gateway".to_string(),
    }));
    let mut store = store(&gateway, configured());

    assert_ok!(store.refresh().await);
    let err = assert_err!(store.refresh().await);

    assert!(matches!(err, Error::LoadFailed { .. }));
    assert_eq!(store.records().len(), 1);
    assert!(!store.is_connected());
    assert!(!store.is_loading());
}

#[tokio::test]
async fn test_refresh_without_configuration_makes_no_call() {
    let gateway = FakeGateway::default();
    let mut store = store(&gateway, State::default());

    let err = assert_err!(store.refresh().await);
    assert!(matches!(err, Error::NotConfigured));
    assert!(!store.is_connected());
    assert!(!store.is_loading());
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_refresh_uses_session_token() {
    let gateway = FakeGateway::default();
    let mut anonymous = store(&gateway, configured());
    assert_ok!(anonymous.refresh().await);

    let mut authed = store(&gateway, logged_in());
    assert_ok!(authed.refresh().await);

    let seen = gateway.inner.lock().unwrap().tokens_seen.clone();
    assert_eq!(seen, vec![None, Some("ghp_test".to_string())]);
}

#[tokio::test]
async fn test_loading_flag_raised_during_fetch() {
    let gateway = FakeGateway::default();
    gateway.push_listing(Ok(vec![prompt(1, "a", "风景")]));
    gateway.push_listing(Err(Error::LoadFailed {
        reason: "HTTP 502 Bad Gateway".to_string(),
    }));
    let mut store = store(&gateway, configured());
    let flag = store.loading_flag();
    gateway.inner.lock().unwrap().loading = Some(flag.clone());
    assert!(!flag.get());

    assert_ok!(store.refresh().await);
    assert!(!flag.get());

    assert_err!(store.refresh().await);
    assert!(!flag.get());
    assert!(!store.is_loading());

    assert_eq!(gateway.inner.lock().unwrap().loading_seen, vec![true, true]);
}

#[tokio::test]
async fn test_login_collaborator() {
    let gateway = FakeGateway::with(|f| {
        f.identity = Some("octocat".to_string());
        f.collaborators = vec!["octocat".to_string()];
    });
    let mut store = store(&gateway, configured());

    assert_ok!(store.login("ghp_test").await);

    let session = store.session().unwrap();
    assert_eq!(session.login, "octocat");
    assert_eq!(session.token, "ghp_test");
    assert_eq!(gateway.calls(), vec!["fetch_identity", "verify_collaborator"]);
}

#[tokio::test]
async fn test_login_non_collaborator_is_rejected() {
    let gateway = FakeGateway::with(|f| {
        f.identity = Some("stranger".to_string());
        f.collaborators = vec!["octocat".to_string()];
    });
    let mut store = store(&gateway, configured());

    let err = assert_err!(store.login("ghp_other").await);

    assert!(matches!(err, Error::NotCollaborator { ref login, .. } if login == "stranger"));
    assert!(err.to_string().contains("not a collaborator"));
    assert!(store.session().is_none());
}

#[tokio::test]
async fn test_login_bad_token() {
    let gateway = FakeGateway::with(|f| f.identity_rejected = true);
    let mut store = store(&gateway, configured());

    let err = assert_err!(store.login("nope").await);
    assert!(matches!(err, Error::AuthenticationFailed));
    assert!(store.session().is_none());
    assert_eq!(gateway.calls(), vec!["fetch_identity"]);
}

#[tokio::test]
async fn test_login_unreachable() {
    let gateway = FakeGateway::default();
    let mut store = store(&gateway, configured());

    let err = assert_err!(store.login("ghp_test").await);
    assert!(matches!(err, Error::IdentityUnavailable));
    assert!(store.session().is_none());
}

#[tokio::test]
async fn test_logout_keeps_cache() {
    let gateway = FakeGateway::default();
    gateway.push_listing(Ok(vec![prompt(1, "a", "风景")]));
    let mut store = store(&gateway, logged_in());
    assert_ok!(store.refresh().await);

    assert_ok!(store.logout());

    assert!(store.session().is_none());
    assert_eq!(store.records().len(), 1);
}

#[tokio::test]
async fn test_create_requires_session() {
    let gateway = FakeGateway::default();
    let mut store = store(&gateway, configured());

    let image = ImageUpload::new("fox.png", vec![1, 2, 3]);
    let err = assert_err!(store.create(NewPrompt::default(), Some(image)).await);

    assert!(matches!(err, Error::LoginRequired));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_remove_requires_session() {
    let gateway = FakeGateway::default();
    let mut store = store(&gateway, configured());

    let err = assert_err!(store.remove(3).await);

    assert!(matches!(err, Error::LoginRequired));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_create_uploads_then_creates_then_refreshes() {
    let gateway = FakeGateway::default();
    gateway.push_listing(Ok(vec![prompt(9, "Sunset", "风景")]));
    let mut store = store(&gateway, logged_in());

    let new = NewPrompt {
        title: "Sunset".to_string(),
        model: AiModel::Flux,
        category: "风景".to_string(),
        prompt: "a sunset over mountains".to_string(),
        image_url: None,
        tags: vec![],
    };
    let image = ImageUpload::new("sunset.png", vec![1, 2, 3]);

    assert_ok!(store.create(new, Some(image)).await);

    assert_eq!(
        gateway.calls(),
        vec!["upload_image", "create_record", "list_records"]
    );
    let created = gateway.inner.lock().unwrap().created.clone();
    assert_eq!(
        created[0].image_url.as_deref(),
        Some("https://raw.example.com/sunset.png")
    );
    assert_eq!(store.records().len(), 1);
    assert!(store.is_connected());
}

#[tokio::test]
async fn test_create_rejects_invalid_prompt_before_any_call() {
    let gateway = FakeGateway::default();
    let mut store = store(&gateway, logged_in());

    let new = NewPrompt {
        title: "Sunset".to_string(),
        category: "风景\nimage_url: http://x".to_string(),
        prompt: "a sunset".to_string(),
        ..NewPrompt::default()
    };
    let image = ImageUpload::new("sunset.png", vec![1, 2, 3]);
    let err = assert_err!(store.create(new, Some(image)).await);

    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_create_without_image_skips_upload() {
    let gateway = FakeGateway::default();
    let mut store = store(&gateway, logged_in());

    assert_ok!(store.create(NewPrompt::default(), None).await);
    assert_eq!(gateway.calls(), vec!["create_record", "list_records"]);
}

#[tokio::test]
async fn test_remove_closes_then_refreshes() {
    let gateway = FakeGateway::default();
    gateway.push_listing(Ok(vec![prompt(1, "a", "风景"), prompt(2, "b", "风景")]));
    gateway.push_listing(Ok(vec![prompt(1, "a", "风景")]));
    let mut store = store(&gateway, logged_in());
    assert_ok!(store.refresh().await);

    assert_ok!(store.remove(2).await);

    assert_eq!(gateway.inner.lock().unwrap().closed, vec![2]);
    assert_eq!(
        gateway.calls(),
        vec!["list_records", "close_record", "list_records"]
    );
    assert!(store.find(2).is_none());
    assert!(store.find(1).is_some());
}

#[tokio::test]
async fn test_configure_does_not_fetch() {
    let gateway = FakeGateway::default();
    let mut store = store(&gateway, State::default());

    assert_ok!(store.configure(RepoConfig::new("octocat", "gallery")));

    assert_eq!(store.config().slug(), "octocat/gallery");
    assert!(gateway.calls().is_empty());
}

#[tokio::test]
async fn test_state_is_persisted_and_rehydrated() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("state.toml");
    let gateway = FakeGateway::with(|f| {
        f.identity = Some("octocat".to_string());
        f.collaborators = vec!["octocat".to_string()];
    });

    let mut first = Store::open_at(Box::new(gateway.clone()), path.clone()).unwrap();
    assert_ok!(first.configure(RepoConfig::new("octocat", "gallery")));
    assert_ok!(first.login("ghp_test").await);

    let second = Store::open_at(Box::new(gateway.clone()), path.clone()).unwrap();
    assert_eq!(second.config().slug(), "octocat/gallery");
    assert_eq!(second.session().map(|s| s.login.as_str()), Some("octocat"));

    let mut third = second;
    assert_ok!(third.logout());
    assert!(config::load_from(&path).unwrap().session.is_none());
}

#[test]
fn test_filter() {
    let mut sunset = prompt(1, "Sunset", "风景");
    sunset.tags = vec!["Orange".to_string()];
    let mut portrait = prompt(2, "Portrait", "人物");
    portrait.model = AiModel::Doubao;
    let prompts = vec![sunset, portrait];

    let all = Filter::default();
    assert_eq!(all.apply(&prompts).len(), 2);

    let by_tag = Filter {
        search: "orange".to_string(),
        ..Filter::default()
    };
    assert_eq!(by_tag.apply(&prompts)[0].number, 1);

    let by_text = Filter {
        search: "PORTRAIT PROMPT".to_string(),
        ..Filter::default()
    };
    assert_eq!(by_text.apply(&prompts)[0].number, 2);

    let by_model = Filter {
        model: Some(AiModel::Doubao),
        ..Filter::default()
    };
    assert_eq!(by_model.apply(&prompts).len(), 1);

    let no_match = Filter {
        model: Some(AiModel::Flux),
        category: Some("人物".to_string()),
        ..Filter::default()
    };
    assert!(no_match.apply(&prompts).is_empty());
}

#[test]
fn test_stats_and_categories() {
    let prompts = vec![
        prompt(1, "a", "风景"),
        prompt(2, "b", "人物"),
        prompt(3, "c", "风景"),
    ];

    let stats = Stats::of(&prompts);
    assert_eq!(stats.total, 3);
    assert_eq!(stats.models, 4);
    assert_eq!(stats.categories, 2);

    let mut expected = vec!["人物".to_string(), "风景".to_string()];
    expected.sort();
    assert_eq!(categories(&prompts), expected);
}
