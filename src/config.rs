use anyhow::{bail, Context, Result};
use std::path::PathBuf;

/// Default API address when `API_URL` is unset
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Default directory for the persisted authentication record
pub const DEFAULT_STORAGE_PATH: &str = ".cms-admin";

#[derive(Debug, Clone)]
pub struct Config {
    // Backend
    pub api_url: String,

    // Session persistence
    pub auth_storage_path: PathBuf,

    // UI label language ("en" or "uz")
    pub locale: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let api_url = std::env::var("API_URL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let api_url = normalize_base_url(&api_url).context("API_URL is not a valid base URL")?;

        let locale = std::env::var("LOCALE").unwrap_or_else(|_| "en".to_string());
        if !matches!(locale.as_str(), "en" | "uz") {
            bail!("LOCALE must be 'en' or 'uz', got '{}'", locale);
        }

        Ok(Self {
            api_url,
            auth_storage_path: std::env::var("AUTH_STORAGE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_STORAGE_PATH)),
            locale,
        })
    }

    /// Config pointing at a given API address, everything else defaulted
    pub fn for_api(api_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            auth_storage_path: PathBuf::from(DEFAULT_STORAGE_PATH),
            locale: "en".to_string(),
        }
    }
}

/// Trim trailing slashes and make sure the address parses as an absolute URL.
fn normalize_base_url(raw: &str) -> Result<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    reqwest::Url::parse(trimmed).with_context(|| format!("Failed to parse '{}'", trimmed))?;
    Ok(trimmed.to_string())
}
