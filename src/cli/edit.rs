use crate::config;
use crate::error::{Error, Result};
use anyhow::Context;
use sha2::{Digest, Sha256};
use std::io::{self, IsTerminal, Write};
use std::path::Path;
use std::process::Command;

/// Get the user's preferred editor from environment variables
/// Priority: VISUAL > EDITOR > vi
fn get_editor() -> String {
    std::env::var("VISUAL")
        .or_else(|_| std::env::var("EDITOR"))
        .unwrap_or_else(|_| "vi".to_string())
}

/// Compute SHA256 hash of a file
fn hash_file(path: &Path) -> anyhow::Result<String> {
    let content = std::fs::read(path)
        .with_context(|| format!("Failed to read file for hashing: {}", path.display()))?;

    Ok(hex::encode(Sha256::digest(&content)))
}

fn open_editor(editor: &str, path: &Path) -> Result<()> {
    let status = Command::new(editor)
        .arg(path)
        .status()
        .with_context(|| format!("Failed to run editor: {}", editor))?;

    if !status.success() {
        return Err(Error::ConfigError(format!(
            "Editor exited with error status: {}",
            status
        )));
    }
    Ok(())
}

/// Ask whether to edit again after a failed check
fn prompt_edit_again() -> Result<bool> {
    print!("\nEdit again to fix errors? [Y/n] ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(!matches!(input.trim(), "n" | "N" | "no"))
}

/// Run the edit command
pub fn run() -> Result<()> {
    let state_path = config::state_path()?;

    // Create state file with defaults if it doesn't exist
    if !state_path.exists() {
        config::save_default()?;
        println!("Created default state file at: {}", state_path.display());
    }

    let hash_before =
        hash_file(&state_path).context("Failed to hash state file before editing")?;

    let editor = get_editor();
    open_editor(&editor, &state_path)?;

    let hash_after = hash_file(&state_path).context("Failed to hash state file after editing")?;
    if hash_before == hash_after {
        println!("No changes made to state file");
        return Ok(());
    }

    loop {
        let problem = match config::load_from(&state_path) {
            Ok(state) => match state.validate() {
                Ok(()) => break,
                Err(e) => format!("State validation failed: {}", e),
            },
            Err(e) => format!("State parsing failed: {:#}", e),
        };
        eprintln!("\n{}", problem);

        if !io::stdin().is_terminal() || !prompt_edit_again()? {
            return Err(Error::ConfigError(format!(
                "{}. Please fix manually: {}",
                problem,
                state_path.display()
            )));
        }

        open_editor(&editor, &state_path)?;
    }

    println!(
        "State saved and validated successfully: {}",
        state_path.display()
    );
    Ok(())
}
