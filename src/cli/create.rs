use crate::codec::{AiModel, NewPrompt, AI_MODELS, DEFAULT_CATEGORIES};
use crate::error::{Error, Result};
use crate::gateway::ImageUpload;
use clap::Args;
use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use tracing::info;

#[derive(Args)]
pub struct CreateArgs {
    /// Prompt title
    #[arg(short, long)]
    pub title: String,

    /// Target model (z-image, flux, nano banana, 豆包, or any other name)
    #[arg(short, long, default_value = AI_MODELS[0])]
    pub model: String,

    /// Category, e.g. 风景 or 人物
    #[arg(short, long)]
    pub category: String,

    /// Comma-separated tags
    #[arg(long, default_value = "")]
    pub tags: String,

    /// Prompt text (read from stdin when omitted)
    #[arg(short, long)]
    pub prompt: Option<String>,

    /// Image to upload alongside the prompt
    #[arg(short, long)]
    pub image: Option<PathBuf>,
}

pub async fn run(args: CreateArgs) -> Result<()> {
    let mut store = super::open_store()?;

    // Fail before reading stdin or the image
    if store.session().is_none() {
        return Err(Error::LoginRequired);
    }

    let text = match args.prompt {
        Some(text) => text,
        None => read_stdin()?,
    };

    let title = args.title.trim();
    let category = args.category.trim();
    let text = text.trim();
    if title.is_empty() || category.is_empty() || text.is_empty() {
        return Err(Error::InvalidInput(format!(
            "title, category and prompt text are required (common categories: {})",
            DEFAULT_CATEGORIES.join(", ")
        )));
    }

    let prompt = NewPrompt {
        title: title.to_string(),
        model: AiModel::parse(args.model.trim()),
        category: category.to_string(),
        prompt: text.to_string(),
        image_url: None,
        tags: parse_tags(&args.tags),
    };

    let image = match &args.image {
        Some(path) => Some(ImageUpload::from_path(path).await?),
        None => None,
    };

    store.create(prompt, image).await?;
    info!(title = %title, "Prompt created");
    println!("Created prompt: {}", title);

    Ok(())
}

fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_stdin() -> Result<String> {
    let mut stdin = io::stdin();
    if stdin.is_terminal() {
        eprintln!("Enter the prompt text, then press Ctrl-D:");
    }
    let mut text = String::new();
    stdin.read_to_string(&mut text)?;
    Ok(text)
}
