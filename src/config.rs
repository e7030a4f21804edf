use std::time::Duration;

use anyhow::Context;

pub const DEFAULT_API_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent";
pub const DEFAULT_MAX_TOKENS: u32 = 500;
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Settings for the remote narrative service, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct NarratorConfig {
    pub api_url: String,
    pub api_key: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub timeout: Duration,
}

impl NarratorConfig {
    /// Returns `None` when no API key is configured.
    pub fn from_env() -> anyhow::Result<Option<Self>> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Option<Self>>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = match lookup("GEMINI_API_KEY") {
            Some(key) if !key.trim().is_empty() => key.trim().to_string(),
            _ => return Ok(None),
        };

        let api_url = lookup("GEMINI_API_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let max_tokens = match lookup("GEMINI_MAX_TOKENS") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("GEMINI_MAX_TOKENS is not a number: {value}"))?,
            None => DEFAULT_MAX_TOKENS,
        };

        let temperature = match lookup("GEMINI_TEMPERATURE") {
            Some(value) => value
                .trim()
                .parse()
                .with_context(|| format!("GEMINI_TEMPERATURE is not a number: {value}"))?,
            None => DEFAULT_TEMPERATURE,
        };

        Ok(Some(Self {
            api_url,
            api_key,
            max_tokens,
            temperature,
            timeout: timeout_from_lookup(&lookup)?,
        }))
    }
}

pub fn narrative_timeout() -> anyhow::Result<Duration> {
    timeout_from_lookup(&|key: &str| std::env::var(key).ok())
}

fn timeout_from_lookup<F>(lookup: &F) -> anyhow::Result<Duration>
where
    F: Fn(&str) -> Option<String>,
{
    let secs = match lookup("NARRATIVE_TIMEOUT_SECS") {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .with_context(|| format!("NARRATIVE_TIMEOUT_SECS is not a number: {value}"))?,
        None => DEFAULT_TIMEOUT_SECS,
    };
    Ok(Duration::from_secs(secs.max(1)))
}
