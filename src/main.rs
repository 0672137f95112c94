use clap::Parser;
use prompt_gallery::cli::{self, Cli};
use prompt_gallery::logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    cli.apply_overrides();

    // Initialize logging before running any command
    logging::init(cli.verbose)?;

    cli::run(cli).await
}
