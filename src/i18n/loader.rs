//! Translation document fetching.

use crate::i18n::{Language, TranslationDocument};
use thiserror::Error;
use tracing::{debug, info};
use url::Url;

/// Why a translation document could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("invalid translation URL for '{lang}': {source}")]
    InvalidUrl {
        lang: String,
        #[source]
        source: url::ParseError,
    },

    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("{url} is not a valid translation document: {source}")]
    Parse {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Relative location of a language's document.
pub fn translation_path(lang: Language) -> String {
    format!("lang/{}.json", lang.code())
}

/// Fetches `lang/<code>.json` relative to the page URL.
///
/// No caching: every call is one request.
#[derive(Debug, Clone)]
pub struct TranslationLoader {
    client: reqwest::Client,
}

impl TranslationLoader {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Resolve the document URL for `lang` against the page URL.
    pub fn document_url(page_url: &Url, lang: Language) -> Result<Url, LoadError> {
        page_url
            .join(&translation_path(lang))
            .map_err(|source| LoadError::InvalidUrl {
                lang: lang.code().to_string(),
                source,
            })
    }

    /// Fetch and parse the translation document for `lang`.
    pub async fn load(&self, page_url: &Url, lang: Language) -> Result<TranslationDocument, LoadError> {
        let url = Self::document_url(page_url, lang)?;
        debug!("Fetching translations from {}", url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| LoadError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|source| LoadError::Transport {
            url: url.to_string(),
            source,
        })?;

        let document = TranslationDocument::from_json(&body).map_err(|source| LoadError::Parse {
            url: url.to_string(),
            source,
        })?;

        info!(
            "Loaded translations for {} (document langCode '{}')",
            lang, document.lang_code
        );
        Ok(document)
    }
}
