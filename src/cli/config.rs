use crate::config::RepoConfig;
use crate::error::{Error, Result};
use clap::Args;
use tracing::info;

#[derive(Args)]
pub struct ConfigArgs {
    /// Repository owner (user or organization)
    #[arg(long)]
    pub owner: Option<String>,

    /// Repository name
    #[arg(long)]
    pub repo: Option<String>,
}

pub async fn run(args: ConfigArgs) -> Result<()> {
    let mut store = super::open_store()?;

    if args.owner.is_none() && args.repo.is_none() {
        let config = store.config();
        println!("Owner: {}", display_or_unset(&config.owner));
        println!("Repo:  {}", display_or_unset(&config.repo));
        return Ok(());
    }

    let current = store.config().clone();
    let candidate = RepoConfig::new(
        args.owner.unwrap_or(current.owner),
        args.repo.unwrap_or(current.repo),
    );

    if !candidate.is_complete() {
        return Err(Error::NotConfigured);
    }

    // Only a repository that answers is saved
    if !store.gateway().verify_repository(&candidate).await {
        return Err(Error::RepositoryUnavailable {
            owner: candidate.owner,
            repo: candidate.repo,
        });
    }

    store.configure(candidate)?;
    println!("Saved repository: {}", store.config().slug());

    store.refresh().await?;
    info!(count = store.records().len(), "Loaded prompts after configuration change");
    println!("Loaded {} prompts", store.records().len());

    Ok(())
}

fn display_or_unset(value: &str) -> &str {
    if value.is_empty() {
        "(not set)"
    } else {
        value
    }
}
