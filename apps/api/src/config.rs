use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

const DEFAULT_GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_YOUTUBE_API_URL: &str = "https://www.googleapis.com/youtube/v3";
const DEFAULT_BACKEND_API_URL: &str = "http://127.0.0.1:8000/api";
const DEFAULT_SESSION_STORE_PATH: &str = ".ascend/session.json";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub gemini_api_key: String,
    pub gemini_api_url: String,
    /// Extra attempts on 429/5xx from the inference service. Zero by default.
    pub inference_max_retries: u32,
    pub backend_api_url: String,
    pub session_store_path: PathBuf,
    /// Absent key means demo videos are served instead of live search results.
    pub youtube_api_key: Option<String>,
    pub youtube_api_url: String,
    pub course_cache_ttl: Duration,
    pub video_cache_ttl: Duration,
    /// Seed for the placeholder generator used by course synthesis.
    pub content_seed: Option<u64>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            gemini_api_key: require_env("GEMINI_API_KEY")?,
            gemini_api_url: env_or("GEMINI_API_URL", DEFAULT_GEMINI_API_URL),
            inference_max_retries: parse_env("INFERENCE_MAX_RETRIES", 0)?,
            backend_api_url: env_or("BACKEND_API_URL", DEFAULT_BACKEND_API_URL),
            session_store_path: PathBuf::from(env_or(
                "SESSION_STORE_PATH",
                DEFAULT_SESSION_STORE_PATH,
            )),
            youtube_api_key: std::env::var("YOUTUBE_API_KEY")
                .ok()
                .filter(|key| !key.trim().is_empty() && key != "demo"),
            youtube_api_url: env_or("YOUTUBE_API_URL", DEFAULT_YOUTUBE_API_URL),
            course_cache_ttl: Duration::from_secs(parse_env("COURSE_CACHE_TTL_SECS", 3600)?),
            video_cache_ttl: Duration::from_secs(parse_env("VIDEO_CACHE_TTL_SECS", 1800)?),
            content_seed: match std::env::var("CONTENT_SEED") {
                Ok(raw) => Some(
                    raw.parse::<u64>()
                        .context("CONTENT_SEED must be an unsigned integer")?,
                ),
                Err(_) => None,
            },
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value: '{raw}'")),
        Err(_) => Ok(default),
    }
}
