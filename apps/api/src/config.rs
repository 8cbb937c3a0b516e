use std::path::PathBuf;

use anyhow::{bail, Context, Result};

use crate::analysis::fit_scoring::DEFAULT_FUZZY_THRESHOLD;

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Every variable has a default; invalid values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub fuzzy_threshold: f64,
    pub max_upload_bytes: usize,
    pub vocabulary_path: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "8080".to_string())
            .parse::<u16>()
            .context("PORT must be a valid port number")?;

        let fuzzy_threshold = match lookup("FUZZY_MATCH_THRESHOLD") {
            Some(raw) => raw
                .parse::<f64>()
                .context("FUZZY_MATCH_THRESHOLD must be a number")?,
            None => DEFAULT_FUZZY_THRESHOLD,
        };
        if !(fuzzy_threshold > 0.0 && fuzzy_threshold <= 1.0) {
            bail!("FUZZY_MATCH_THRESHOLD must be in (0, 1], got {fuzzy_threshold}");
        }

        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(raw) => raw
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a positive integer")?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };

        Ok(Config {
            port,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            fuzzy_threshold,
            max_upload_bytes,
            vocabulary_path: lookup("SKILL_VOCABULARY_PATH")
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}
