pub mod config;
pub mod create;
pub mod delete;
pub mod edit;
pub mod list;
pub mod login;
pub mod logs;
pub mod status;

use crate::gateway::{create_gateway, GITHUB_API_BASE};
use crate::store::Store;
use anyhow::Result;
use clap::{Parser, Subcommand};

/// Overrides the GitHub API base URL (GitHub Enterprise, tests).
pub const API_BASE_ENV: &str = "PROMPT_GALLERY_API_BASE";

#[derive(Parser)]
#[command(name = "prompt-gallery")]
#[command(about = "A prompt gallery backed by GitHub issues")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging to terminal
    #[arg(long, global = true)]
    pub verbose: bool,

    /// Override config directory (for testing)
    #[arg(long, global = true)]
    pub config_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show or change the backing repository
    #[command(visible_alias = "cfg")]
    Config(config::ConfigArgs),

    /// Log in with a GitHub token (collaborators only)
    Login(login::LoginArgs),

    /// Forget the stored token
    Logout,

    /// List prompts in the gallery
    #[command(visible_aliases = ["ls"])]
    List(list::ListArgs),

    /// Show one prompt in full
    Show(list::ShowArgs),

    /// Add a prompt to the gallery
    #[command(visible_aliases = ["new", "add"])]
    Create(create::CreateArgs),

    /// Remove a prompt (closes its issue)
    #[command(visible_aliases = ["del", "remove", "rm"])]
    Delete(delete::DeleteArgs),

    /// Show configuration, session and connectivity
    Status,

    /// View log files
    Logs(logs::LogsArgs),

    /// Edit the state file
    Edit,

    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    /// Export global flags to the environment before anything reads it.
    pub fn apply_overrides(&self) {
        if let Some(config_dir) = &self.config_dir {
            std::env::set_var("PROMPT_GALLERY_CONFIG_DIR", config_dir);
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Config(args) => config::run(args).await.map_err(Into::into),
        Commands::Login(args) => login::run(args).await.map_err(Into::into),
        Commands::Logout => login::logout().map_err(Into::into),
        Commands::List(args) => list::run(args).await.map_err(Into::into),
        Commands::Show(args) => list::show(args).await.map_err(Into::into),
        Commands::Create(args) => create::run(args).await.map_err(Into::into),
        Commands::Delete(args) => delete::run(args).await.map_err(Into::into),
        Commands::Status => status::run().await.map_err(Into::into),
        Commands::Logs(args) => logs::run(args).map_err(Into::into),
        Commands::Edit => edit::run().map_err(Into::into),
        Commands::Completions { shell } => generate_completions(shell),
    }
}

/// Open the store against the configured API base
pub fn open_store() -> crate::Result<Store> {
    let api_base = std::env::var(API_BASE_ENV).unwrap_or_else(|_| GITHUB_API_BASE.to_string());
    Store::open(create_gateway(&api_base)?)
}

/// Generate shell completions
pub fn generate_completions(shell: clap_complete::Shell) -> Result<()> {
    use clap::CommandFactory;
    use std::io;
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "prompt-gallery", &mut io::stdout());
    Ok(())
}
