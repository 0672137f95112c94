pub mod schema;

pub use schema::{AuthSession, RepoConfig, State};

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

pub fn load_from(path: &Path) -> Result<State> {
    if path.exists() {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read state from {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse state from {}", path.display()))
    } else {
        // Return default state
        Ok(State::default())
    }
}

pub fn state_path() -> Result<PathBuf> {
    Ok(config_dir()?.join("state.toml"))
}

pub fn ensure_config_dir() -> Result<PathBuf> {
    let config_dir = config_dir()?;
    std::fs::create_dir_all(&config_dir).with_context(|| {
        format!(
            "Failed to create config directory: {}",
            config_dir.display()
        )
    })?;
    Ok(config_dir)
}

pub fn config_dir() -> Result<PathBuf> {
    // Check for override from environment (set by --config-dir flag)
    if let Ok(override_dir) = std::env::var("PROMPT_GALLERY_CONFIG_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    Ok(dirs::config_dir()
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?
        .join("prompt-gallery"))
}

/// Save state to disk
pub fn save(state: &State) -> Result<()> {
    ensure_config_dir()?;
    save_to(&state_path()?, state)
}

/// Save state to a specific file. Last write wins.
pub fn save_to(path: &Path, state: &State) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    let content = toml::to_string_pretty(state).context("Failed to serialize state to TOML")?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write state to {}", path.display()))?;

    // The file may hold a token
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("Failed to set permissions on {}", path.display()))?;
    }

    Ok(())
}

/// Create state file with default values if it doesn't exist
pub fn save_default() -> Result<()> {
    let state_path = state_path()?;

    if !state_path.exists() {
        save(&State::default())?;
    }

    Ok(())
}
