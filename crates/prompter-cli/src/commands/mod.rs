pub mod config;
pub mod run;
pub mod stats;

use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use prompter_core::{AppConfig, Script};

/// Read the script from `path`, then the configured script, then the built-in demo
pub async fn load_script(path: Option<&Path>, config: &AppConfig) -> Result<Script> {
    let path = match path {
        Some(path) => Some(path.to_path_buf()),
        None => config.script_path(),
    };

    match path {
        Some(path) => {
            let text = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("Failed to read script {}", path.display()))?;
            info!(path = %path.display(), "Read script");
            Ok(Script::new(text))
        }
        None => Ok(Script::default()),
    }
}
