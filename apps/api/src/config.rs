use std::str::FromStr;

use anyhow::{Context, Result};

use crate::extraction::pipeline::PipelineSettings;
use crate::extraction::resolver::NameRules;
use crate::ner_client::{DEFAULT_API_URL, DEFAULT_MODEL};

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Hugging Face token. Without it the entity tagger is disabled.
    pub hf_api_token: Option<String>,
    pub ner_model: String,
    pub ner_api_url: String,
    pub ner_timeout_secs: u64,
    pub ner_window_chars: usize,
    pub heading_lines: usize,
    pub name_min_score: f32,
    pub cgpa_default_scale: f32,
    /// Shortest normalized text intake accepts (image-only PDFs yield nothing).
    pub min_text_chars: usize,
    pub max_upload_bytes: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            hf_api_token: optional_env("HF_API_TOKEN"),
            ner_model: optional_env("NER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            ner_api_url: optional_env("NER_API_URL")
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            ner_timeout_secs: parse_env("NER_TIMEOUT_SECS", 30)?,
            ner_window_chars: parse_env("NER_WINDOW_CHARS", 1000)?,
            heading_lines: parse_env("HEADING_LINES", 5)?,
            name_min_score: parse_env("NAME_MIN_SCORE", 0.75)?,
            cgpa_default_scale: parse_env("CGPA_DEFAULT_SCALE", 10.0)?,
            min_text_chars: parse_env("MIN_TEXT_CHARS", 20)?,
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?,
        })
    }

    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            ner_window_chars: self.ner_window_chars,
            name_rules: NameRules {
                heading_lines: self.heading_lines,
                min_score: self.name_min_score,
            },
            cgpa_default_scale: self.cgpa_default_scale,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let settings = PipelineSettings::default();
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            hf_api_token: None,
            ner_model: DEFAULT_MODEL.to_string(),
            ner_api_url: DEFAULT_API_URL.to_string(),
            ner_timeout_secs: 30,
            ner_window_chars: settings.ner_window_chars,
            heading_lines: settings.name_rules.heading_lines,
            name_min_score: settings.name_rules.min_score,
            cgpa_default_scale: settings.cgpa_default_scale,
            min_text_chars: 20,
            max_upload_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Unset or blank variables count as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
    }
}
