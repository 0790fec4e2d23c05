use anyhow::{Context, Result};
use mathorbit_game::QuizConfig;
use std::path::Path;

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Load and validate a quiz configuration file, or fall back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<QuizConfig> {
    let Some(path) = path else {
        return Ok(QuizConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config = QuizConfig::from_json(&raw)
        .with_context(|| format!("invalid config {}", path.display()))?;
    log::info!("loaded quiz config from {}", path.display());
    Ok(config)
}
