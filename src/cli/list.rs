use crate::codec::{AiModel, Prompt};
use crate::error::{Error, Result};
use crate::store::{categories, Filter, Stats};
use clap::Args;
use owo_colors::OwoColorize;

/// Prompt text longer than this is cut in list output.
const PREVIEW_CHARS: usize = 150;

#[derive(Args)]
pub struct ListArgs {
    /// Search titles, prompt text and tags
    #[arg(short, long, default_value = "")]
    pub search: String,

    /// Only prompts for this model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Only prompts in this category
    #[arg(short, long)]
    pub category: Option<String>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Issue number of the prompt
    pub number: u64,

    /// Print only the prompt text (for piping)
    #[arg(long)]
    pub raw: bool,
}

pub async fn run(args: ListArgs) -> Result<()> {
    let mut store = super::open_store()?;
    store.refresh().await?;

    let filter = Filter {
        search: args.search,
        model: args.model.as_deref().map(AiModel::parse),
        category: args.category,
    };
    let prompts = filter.apply(store.records());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&prompts)?);
        return Ok(());
    }

    let stats = Stats::of(store.records());
    println!(
        "{} prompts, {} models, {} categories ({})",
        stats.total,
        stats.models,
        stats.categories,
        categories(store.records()).join(", ")
    );

    if prompts.is_empty() {
        println!("\nNo prompts match.");
        return Ok(());
    }

    for prompt in prompts {
        print_summary(prompt);
    }

    Ok(())
}

pub async fn show(args: ShowArgs) -> Result<()> {
    let mut store = super::open_store()?;
    store.refresh().await?;

    let prompt = store
        .find(args.number)
        .ok_or(Error::PromptNotFound {
            number: args.number,
        })?;

    if args.raw {
        println!("{}", prompt.prompt);
        return Ok(());
    }

    println!("{} {}", format!("#{}", prompt.number).dimmed(), prompt.title.bold());
    println!("  Model:    {}", prompt.model.cyan());
    println!("  Category: {}", prompt.category.magenta());
    if !prompt.tags.is_empty() {
        println!("  Tags:     {}", prompt.tags.join(", "));
    }
    if let Some(url) = &prompt.image_url {
        println!("  Image:    {}", url);
    }
    println!("  Author:   {}", prompt.author);
    println!("  Created:  {}", created_label(prompt));
    println!();
    println!("{}", prompt.prompt);

    Ok(())
}

fn print_summary(prompt: &Prompt) {
    println!();
    println!(
        "{} {}  [{}] [{}]",
        format!("#{}", prompt.number).dimmed(),
        prompt.title.bold(),
        prompt.model.cyan(),
        prompt.category.magenta()
    );
    if !prompt.tags.is_empty() {
        println!("  tags: {}", prompt.tags.join(", "));
    }
    println!("  {}", preview(&prompt.prompt));
    println!("  {} · {}", prompt.author, created_label(prompt));
}

fn preview(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() > PREVIEW_CHARS {
        let cut: String = flat.chars().take(PREVIEW_CHARS).collect();
        format!("{}…", cut)
    } else {
        flat
    }
}

fn created_label(prompt: &Prompt) -> String {
    prompt
        .created_date()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| prompt.created_at.clone())
}
