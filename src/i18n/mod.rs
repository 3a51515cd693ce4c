//! Internationalization (i18n) module for the localized site.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for supported languages and their display attributes
//! - `language`: Validated `Language` type
//! - `storage`: Client-side preference storage (`selectedLang`)
//! - `resolver`: Picks the active language from URL, storage and default
//! - `document`: Parsed `lang/<code>.json` documents with tagged leaf values
//! - `loader`: Fetches translation documents over HTTP
//! - `injector`: Writes translations into `data-i18n` elements
//! - `seo`: Rewrites title, meta tags and language links
//! - `metrics`: Localization counters
//!
//! # Example
//!
//! ```rust,ignore
//! use site_enhancer::i18n::{resolve_language, Language, MemoryStore};
//!
//! let mut store = MemoryStore::with_selected("en");
//! let active = resolve_language(Some("fr"), &mut store, Language::default_language());
//! assert_eq!(active, Language::FRENCH);
//! ```

mod document;
mod injector;
mod language;
mod loader;
mod metrics;
mod registry;
mod resolver;
mod seo;
pub mod storage;

pub use document::{SeoMetadata, TranslationDocument, TranslationNode, TranslationValue};
pub use injector::{inject_translations, InjectionReport, KEY_ATTR, TARGET_ATTR};
pub use language::{region_flag_emoji, Language};
pub use loader::{translation_path, LoadError, TranslationLoader};
pub use metrics::{LocalizationMetrics, MetricsReport};
pub use registry::{LanguageConfig, LanguageRegistry};
pub use resolver::resolve_language;
pub use seo::{append_standard_meta_tags, inject_seo};
pub use storage::{FileStore, MemoryStore, PreferenceStore, SELECTED_LANG_KEY};
