use crate::error::Result;
use crate::store::Stats;
use owo_colors::OwoColorize;

pub async fn run() -> Result<()> {
    let mut store = super::open_store()?;

    let config = store.config();
    if config.is_complete() {
        println!("Repository: {}", config.slug());
    } else {
        println!("Repository: {}", "not configured".yellow());
    }

    match store.session() {
        Some(session) => println!("Session: logged in as {}", session.login),
        None => println!("Session: read-only (not logged in)"),
    }

    if !store.config().is_complete() {
        return Ok(());
    }

    match store.refresh().await {
        Ok(()) => {
            let stats = Stats::of(store.records());
            println!("Connection: {}", "connected".green());
            println!("  Prompts: {}", stats.total);
            println!("  Categories: {}", stats.categories);
        }
        Err(e) => {
            println!("Connection: {}", "offline".red());
            println!("  {}", e);
        }
    }

    Ok(())
}
