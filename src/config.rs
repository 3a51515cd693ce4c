use crate::i18n::Language;
use anyhow::{Context, Result};
use std::time::Duration;
use url::Url;

/// Default emoji CDN used to render flags as images.
pub const DEFAULT_TWEMOJI_BASE: &str = "https://cdn.jsdelivr.net/gh/twitter/twemoji@14.0.2/assets/";

#[derive(Debug, Clone)]
pub struct Config {
    // Site
    pub site_url: Option<Url>,
    pub sections_path: String,
    pub service_worker_path: String,

    // Localization
    pub default_lang: Language,
    pub preferences_file: String,
    /// `None` renders flags as emoji text instead of CDN images
    pub twemoji_base: Option<String>,

    // Widgets
    pub slider_interval: Duration,
    pub lazy_root_margin_px: f64,
    pub scroll_top_threshold_px: f64,
    pub anchor_offset_px: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            site_url: None,
            sections_path: "data/sections.json".to_string(),
            service_worker_path: "/assets/sw.js".to_string(),
            default_lang: Language::default_language(),
            preferences_file: ".site-preferences.json".to_string(),
            twemoji_base: Some(DEFAULT_TWEMOJI_BASE.to_string()),
            slider_interval: Duration::from_millis(4000),
            lazy_root_margin_px: 200.0,
            scroll_top_threshold_px: 400.0,
            anchor_offset_px: 80.0,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            // Site
            site_url: match std::env::var("SITE_URL") {
                Ok(raw) if !raw.trim().is_empty() => Some(
                    Url::parse(raw.trim()).with_context(|| format!("SITE_URL is not a valid URL: {}", raw))?,
                ),
                _ => None,
            },
            sections_path: std::env::var("SECTIONS_PATH").unwrap_or(defaults.sections_path),
            service_worker_path: std::env::var("SERVICE_WORKER_PATH")
                .unwrap_or(defaults.service_worker_path),

            // Localization
            default_lang: match std::env::var("DEFAULT_LANG") {
                Ok(code) => Language::from_code(code.trim()).context("DEFAULT_LANG must be a supported language")?,
                Err(_) => defaults.default_lang,
            },
            preferences_file: std::env::var("PREFERENCES_FILE").unwrap_or(defaults.preferences_file),
            twemoji_base: match std::env::var("TWEMOJI_BASE") {
                Ok(base) if base.trim().is_empty() => None,
                Ok(base) => Some(base),
                Err(_) => defaults.twemoji_base,
            },

            // Widgets
            slider_interval: std::env::var("SLIDER_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.slider_interval),
            lazy_root_margin_px: std::env::var("LAZY_ROOT_MARGIN_PX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.lazy_root_margin_px),
            scroll_top_threshold_px: std::env::var("SCROLL_TOP_THRESHOLD_PX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.scroll_top_threshold_px),
            anchor_offset_px: std::env::var("ANCHOR_OFFSET_PX")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.anchor_offset_px),
        })
    }
}
