use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

use crate::matching::MatcherConfig;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub taxonomy_path: PathBuf,
    pub synonyms_path: Option<PathBuf>,
    pub matcher: MatcherConfig,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = MatcherConfig::default();
        let matcher = MatcherConfig {
            token_overlap: unit_interval("MATCH_TOKEN_OVERLAP", defaults.token_overlap)?,
            fuzzy_similarity: unit_interval("MATCH_FUZZY_SIMILARITY", defaults.fuzzy_similarity)?,
            min_score: unit_interval("MATCH_MIN_SCORE", defaults.min_score)?,
            max_results: optional_env("MATCH_MAX_RESULTS", defaults.max_results)?,
            builtin_synonyms: optional_env("USE_BUILTIN_SYNONYMS", defaults.builtin_synonyms)?,
        };
        if matcher.max_results == 0 {
            bail!("MATCH_MAX_RESULTS must be at least 1");
        }

        Ok(Config {
            taxonomy_path: PathBuf::from(require_env("TAXONOMY_PATH")?),
            synonyms_path: std::env::var("SYNONYMS_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
            matcher,
            port: optional_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

/// A threshold in (0, 1].
fn unit_interval(key: &str, default: f64) -> Result<f64> {
    let value: f64 = optional_env(key, default)?;
    if !(value > 0.0 && value <= 1.0) {
        bail!("{key} must be in (0, 1], got {value}");
    }
    Ok(value)
}
