use clap::Args;
use crate::error::Result;
use std::io::{self, IsTerminal, Write};
use tracing::info;

#[derive(Args)]
pub struct DeleteArgs {
    /// Issue number of the prompt to remove
    pub number: u64,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

pub async fn run(args: DeleteArgs) -> Result<()> {
    let mut store = super::open_store()?;

    if !args.yes && io::stdin().is_terminal() && !confirm(args.number)? {
        println!("Cancelled");
        return Ok(());
    }

    store.remove(args.number).await?;
    info!(number = args.number, "Prompt removed");
    println!("Deleted prompt: #{}", args.number);

    Ok(())
}

fn confirm(number: u64) -> Result<bool> {
    print!("Delete prompt #{}? [y/N] ", number);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim(), "y" | "Y" | "yes"))
}
