use crate::error::{Error, Result};
use clap::Args;
use std::io::{self, Write};

#[derive(Args)]
pub struct LoginArgs {
    /// Personal access token (prompted for when omitted)
    #[arg(env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

pub async fn run(args: LoginArgs) -> Result<()> {
    let mut store = super::open_store()?;

    let token = match args.token {
        Some(token) => token,
        None => read_token()?,
    };
    let token = token.trim();
    if token.is_empty() {
        return Err(Error::AuthenticationFailed);
    }

    store.login(token).await?;
    if let Some(session) = store.session() {
        println!("Logged in as {}", session.login);
    }

    if let Err(e) = store.refresh().await {
        eprintln!("Logged in, but prompts could not be loaded: {}", e);
    }

    Ok(())
}

pub fn logout() -> Result<()> {
    let mut store = super::open_store()?;
    let was_logged_in = store.session().is_some();
    store.logout()?;

    if was_logged_in {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

fn read_token() -> Result<String> {
    print!("GitHub token: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input)
}
