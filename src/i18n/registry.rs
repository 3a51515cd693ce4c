//! Language registry: Single source of truth for all supported languages.
//!
//! The registry is immutable after first access. It is initialised lazily with
//! `OnceLock` and shared by every component that needs display attributes or
//! membership checks.

use std::sync::OnceLock;

/// Display attributes and settings for a supported language.
#[derive(Debug, Clone)]
pub struct LanguageConfig {
    /// Short language code used in URLs and file names (e.g., "en", "mk")
    pub code: &'static str,

    /// ISO 3166 region code used to render the flag (e.g., "gb" for English)
    pub flag_code: &'static str,

    /// Short label shown in the selector (e.g., "EN")
    pub abbr: &'static str,

    /// Native display name (e.g., "Deutsch", "Македонски")
    pub name: &'static str,

    /// Whether this is the fallback language (only one should be true)
    pub is_default: bool,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageConfig>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language configuration by its code.
    ///
    /// Matching is exact: `"EN"` and `" en"` are not supported codes.
    pub fn get_by_code(&self, code: &str) -> Option<&LanguageConfig> {
        self.languages.iter().find(|lang| lang.code == code)
    }

    /// Get all supported languages, in declaration order.
    ///
    /// This order is also the order in which alternate links are emitted.
    pub fn list(&self) -> &[LanguageConfig] {
        &self.languages
    }

    /// Get the default language configuration.
    ///
    /// # Panics
    /// Panics if the registry does not declare exactly one default
    /// language. The table is static, so this is a programming error caught
    /// by the tests below.
    pub fn default_language(&self) -> &LanguageConfig {
        let defaults: Vec<_> = self
            .languages
            .iter()
            .filter(|lang| lang.is_default)
            .collect();

        match defaults.len() {
            0 => panic!("No default language found in registry"),
            1 => defaults[0],
            _ => panic!("Multiple default languages found in registry"),
        }
    }
}

/// Default language configurations.
fn default_languages() -> Vec<LanguageConfig> {
    vec![
        LanguageConfig {
            code: "en",
            flag_code: "gb",
            abbr: "EN",
            name: "English",
            is_default: false,
        },
        LanguageConfig {
            code: "fr",
            flag_code: "fr",
            abbr: "FR",
            name: "Français",
            is_default: false,
        },
        LanguageConfig {
            code: "mk",
            flag_code: "mk",
            abbr: "MK",
            name: "Македонски",
            is_default: true,
        },
        LanguageConfig {
            code: "de",
            flag_code: "de",
            abbr: "DE",
            name: "Deutsch",
            is_default: false,
        },
    ]
}
