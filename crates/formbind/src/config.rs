// File: src/config.rs
// Purpose: Application-wide settings (pagination, caching, uploads, formatting)

use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Application configuration
///
/// Built once at startup and passed to whatever needs it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub pagination: PaginationConfig,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub upload: UploadConfig,

    #[serde(default)]
    pub formatting: FormattingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginationConfig {
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,

    #[serde(default = "default_page_size_options")]
    pub page_size_options: Vec<u32>,
}

/// Client-side cache timings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// How long fetched data counts as fresh
    #[serde(default = "default_stale_time_secs")]
    pub stale_time_secs: u64,

    /// How long unused data is kept before it is dropped
    #[serde(default = "default_gc_time_secs")]
    pub gc_time_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    #[serde(default = "default_allowed_mime_types")]
    pub allowed_mime_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormattingConfig {
    /// chrono strftime syntax
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default = "default_currency_locale")]
    pub currency_locale: String,

    #[serde(default = "default_currency_code")]
    pub currency_code: String,
}

// Default values
fn default_page_size() -> u32 {
    10
}

fn default_page_size_options() -> Vec<u32> {
    vec![10, 20, 50, 100]
}

fn default_stale_time_secs() -> u64 {
    5 * 60
}

fn default_gc_time_secs() -> u64 {
    10 * 60
}

fn default_max_file_size() -> u64 {
    5 * 1024 * 1024
}

fn default_allowed_mime_types() -> Vec<String> {
    vec![
        "image/jpeg".to_string(),
        "image/png".to_string(),
        "image/webp".to_string(),
        "application/pdf".to_string(),
    ]
}

fn default_date_format() -> String {
    "%Y-%m-%d".to_string()
}

fn default_currency_locale() -> String {
    "en-US".to_string()
}

fn default_currency_code() -> String {
    "USD".to_string()
}

// Default implementations
impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            page_size_options: default_page_size_options(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time_secs: default_stale_time_secs(),
            gc_time_secs: default_gc_time_secs(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            allowed_mime_types: default_allowed_mime_types(),
        }
    }
}

impl Default for FormattingConfig {
    fn default() -> Self {
        Self {
            date_format: default_date_format(),
            currency_locale: default_currency_locale(),
            currency_code: default_currency_code(),
        }
    }
}

impl PaginationConfig {
    /// `requested` if it is one of the offered sizes, otherwise the default
    pub fn page_size(&self, requested: Option<u32>) -> u32 {
        requested
            .filter(|size| self.page_size_options.contains(size))
            .unwrap_or(self.default_page_size)
    }
}

impl CacheConfig {
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_time_secs)
    }
}

impl UploadConfig {
    pub fn is_allowed_type(&self, mime_type: &str) -> bool {
        self.allowed_mime_types
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(mime_type))
    }

    /// Message-style result so it can back a schema `custom` rule
    pub fn check_file(&self, size: u64, mime_type: &str) -> Result<(), String> {
        if !self.is_allowed_type(mime_type) {
            return Err(format!("File type {} is not allowed", mime_type));
        }
        if size > self.max_file_size {
            return Err(format!(
                "File must be at most {:.1} MB",
                self.max_file_size as f64 / (1024.0 * 1024.0)
            ));
        }
        Ok(())
    }
}

impl FormattingConfig {
    /// Falls back to ISO 8601 if the configured pattern cannot be rendered
    pub fn format_date(&self, date: NaiveDate) -> String {
        let mut out = String::new();
        if write!(out, "{}", date.format(&self.date_format)).is_err() {
            return date.to_string();
        }
        out
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // Missing or empty file means defaults
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {:?}", path))?;

        tracing::debug!(path = ?path, "config loaded");
        Ok(config)
    }

    /// Load configuration from default path (./formbind.toml)
    pub fn load_default() -> Result<Self> {
        Self::load("formbind.toml")
    }

    /// Reject settings that contradict each other
    pub fn validate(&self) -> Result<()> {
        let pagination = &self.pagination;
        if pagination.default_page_size == 0 {
            bail!("pagination.default_page_size must be greater than 0");
        }
        if !pagination
            .page_size_options
            .contains(&pagination.default_page_size)
        {
            bail!(
                "pagination.default_page_size ({}) must be one of page_size_options {:?}",
                pagination.default_page_size,
                pagination.page_size_options
            );
        }

        if self.cache.gc_time_secs < self.cache.stale_time_secs {
            bail!("cache.gc_time_secs must not be shorter than cache.stale_time_secs");
        }

        if self.upload.allowed_mime_types.is_empty() {
            bail!("upload.allowed_mime_types must not be empty");
        }

        if StrftimeItems::new(&self.formatting.date_format).any(|item| matches!(item, Item::Error)) {
            bail!(
                "formatting.date_format {:?} is not a valid format",
                self.formatting.date_format
            );
        }

        Ok(())
    }
}
