//! Client configuration resolved from CLI arguments and their environment
//! variables. A relative API URL such as `/api` is the dev-proxy mode and is
//! resolved against the configured origin; an absolute URL is used as is.
//! Values are public; tokens never live here.

use anyhow::{anyhow, Context, Result};
use std::{path::PathBuf, time::Duration};
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_ORIGIN: &str = "http://localhost:3000";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    /// `None` keeps the session in memory only.
    pub session_file: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

/// Raw, possibly empty inputs before normalization.
#[derive(Clone, Debug, Default)]
pub struct ConfigInput {
    pub api_url: Option<String>,
    pub origin: Option<String>,
    pub session_file: Option<String>,
    pub timeout_secs: Option<u64>,
    pub ephemeral: bool,
}

impl AppConfig {
    /// # Errors
    /// Returns an error if the API URL or origin cannot be parsed.
    pub fn resolve(input: ConfigInput) -> Result<Self> {
        let api_url = input
            .api_url
            .as_deref()
            .and_then(normalize_value)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let origin = input
            .origin
            .as_deref()
            .and_then(normalize_value)
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string());

        let session_file = if input.ephemeral {
            None
        } else {
            input
                .session_file
                .as_deref()
                .and_then(normalize_value)
                .map(PathBuf::from)
                .or_else(crate::session::FileStorage::default_path)
        };

        Ok(Self {
            api_base_url: resolve_base_url(&api_url, &origin)?,
            session_file,
            timeout: input
                .timeout_secs
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        })
    }
}

/// Joins a relative API path onto `origin`; absolute URLs pass through.
///
/// # Errors
/// Returns an error if either value is not a valid URL.
pub fn resolve_base_url(api_url: &str, origin: &str) -> Result<String> {
    if let Ok(url) = Url::parse(api_url) {
        return Ok(url.as_str().trim_end_matches('/').to_string());
    }

    if !api_url.starts_with('/') {
        return Err(anyhow!(
            "API URL must be absolute or start with '/': {api_url}"
        ));
    }

    let origin = Url::parse(origin).with_context(|| format!("invalid origin: {origin}"))?;
    let joined = origin
        .join(api_url)
        .with_context(|| format!("invalid API path: {api_url}"))?;

    Ok(joined.as_str().trim_end_matches('/').to_string())
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
