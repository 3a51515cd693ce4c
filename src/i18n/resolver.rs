//! Active-language resolution.

use crate::i18n::storage::{PreferenceStore, SELECTED_LANG_KEY};
use crate::i18n::Language;
use tracing::debug;

/// Resolve the active language from the URL parameter, the stored
/// preference, and a default.
///
/// Preference order is URL, then store, then `default`. Each candidate must be
/// a supported code; anything else falls through to the next source. This is
/// a total function: it never fails.
///
/// When the URL names a supported language that differs from the stored one,
/// the store is updated so the choice sticks for later page loads.
pub fn resolve_language(
    url_lang: Option<&str>,
    store: &mut dyn PreferenceStore,
    default: Language,
) -> Language {
    let stored = store.get(SELECTED_LANG_KEY);
    let from_url = url_lang.and_then(|code| Language::from_code(code).ok());

    if let Some(lang) = from_url {
        if stored.as_deref() != Some(lang.code()) {
            debug!(
                "URL language '{}' overrides stored preference {:?}",
                lang, stored
            );
            store.set(SELECTED_LANG_KEY, lang.code());
        }
        return lang;
    }

    if let Some(code) = url_lang {
        debug!("Ignoring unsupported URL language '{}'", code);
    }

    stored
        .as_deref()
        .and_then(|code| Language::from_code(code).ok())
        .unwrap_or(default)
}
