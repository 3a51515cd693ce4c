//! Language type: a code validated against the registry.

use crate::i18n::{LanguageConfig, LanguageRegistry};
use anyhow::{bail, Result};
use std::fmt;

/// First regional indicator symbol (🇦). Region letters are offsets from it.
const REGIONAL_INDICATOR_A: u32 = 0x1F1E6;

/// A validated, supported language.
///
/// Only codes present in the registry can be turned into a
/// `Language`, so holding one is proof of membership in the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Language {
    /// Language code (e.g., "en", "mk")
    code: &'static str,
}

impl Language {
    pub const ENGLISH: Language = Language { code: "en" };
    pub const FRENCH: Language = Language { code: "fr" };
    pub const MACEDONIAN: Language = Language { code: "mk" };
    pub const GERMAN: Language = Language { code: "de" };

    /// Create a Language from a language code string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the code is supported
    /// * `Err` if the code is unknown
    pub fn from_code(code: &str) -> Result<Language> {
        match LanguageRegistry::get().get_by_code(code) {
            Some(config) => Ok(Language { code: config.code }),
            None => bail!("Unknown language code: '{}'", code),
        }
    }

    /// The registry's default language.
    pub fn default_language() -> Language {
        Language {
            code: LanguageRegistry::get().default_language().code,
        }
    }

    /// Every supported language, in registry order.
    pub fn all() -> Vec<Language> {
        LanguageRegistry::get()
            .list()
            .iter()
            .map(|config| Language { code: config.code })
            .collect()
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    /// Get the full language configuration from the registry.
    ///
    /// # Panics
    /// Panics if the code is not in the registry, which cannot happen for a
    /// `Language` built through `from_code` or the constants.
    pub fn config(&self) -> &'static LanguageConfig {
        LanguageRegistry::get()
            .get_by_code(self.code)
            .expect("Language code should always be valid")
    }

    /// Native display name (e.g., "Français").
    pub fn name(&self) -> &'static str {
        self.config().name
    }

    /// Short selector label (e.g., "FR").
    pub fn abbr(&self) -> &'static str {
        self.config().abbr
    }

    /// Region code used for the flag (e.g., "gb" for English).
    pub fn flag_code(&self) -> &'static str {
        self.config().flag_code
    }

    pub fn is_default(&self) -> bool {
        self.config().is_default
    }

    /// Flag emoji for this language's region, as a pair of regional indicators.
    pub fn flag_emoji(&self) -> String {
        region_flag_emoji(self.flag_code())
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code)
    }
}

/// Map a two-letter region code to its flag emoji.
///
/// Non-ASCII-letter characters are skipped rather than mapped to garbage
/// code points.
pub fn region_flag_emoji(region: &str) -> String {
    region
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .filter_map(|c| {
            let offset = c.to_ascii_uppercase() as u32 - 'A' as u32;
            char::from_u32(REGIONAL_INDICATOR_A + offset)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_match_registry() {
        assert_eq!(Language::from_code("en").unwrap(), Language::ENGLISH);
        assert_eq!(Language::from_code("fr").unwrap(), Language::FRENCH);
        assert_eq!(Language::from_code("mk").unwrap(), Language::MACEDONIAN);
        assert_eq!(Language::from_code("de").unwrap(), Language::GERMAN);
    }

    #[test]
    fn test_from_code_invalid() {
        let result = Language::from_code("xx");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Unknown"));
    }

    #[test]
    fn test_from_code_empty() {
        assert!(Language::from_code("").is_err());
    }

    #[test]
    fn test_default_language() {
        let default = Language::default_language();
        assert_eq!(default, Language::MACEDONIAN);
        assert!(default.is_default());
    }

    #[test]
    fn test_all_languages() {
        let codes: Vec<_> = Language::all().iter().map(|l| l.code()).collect();
        assert_eq!(codes, vec!["en", "fr", "mk", "de"]);
    }

    #[test]
    fn test_display_attributes() {
        assert_eq!(Language::GERMAN.abbr(), "DE");
        assert_eq!(Language::GERMAN.name(), "Deutsch");
        assert_eq!(Language::ENGLISH.flag_code(), "gb");
    }

    #[test]
    fn test_display_is_code() {
        assert_eq!(Language::FRENCH.to_string(), "fr");
    }

    #[test]
    fn test_flag_emoji() {
        assert_eq!(Language::ENGLISH.flag_emoji(), "🇬🇧");
        assert_eq!(Language::MACEDONIAN.flag_emoji(), "🇲🇰");
        assert_eq!(region_flag_emoji("DE"), "🇩🇪");
    }

    #[test]
    fn test_flag_emoji_skips_non_letters() {
        assert_eq!(region_flag_emoji("f-r"), "🇫🇷");
        assert_eq!(region_flag_emoji(""), "");
    }
}
