//! Offline-support registration.
//!
//! The worker script is probed with a HEAD request first so sites that do not
//! ship one never attempt a registration.

use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub script_url: Url,
    pub scope: Url,
}

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("invalid service worker path '{path}': {source}")]
    InvalidUrl {
        path: String,
        #[source]
        source: url::ParseError,
    },

    #[error("probe of {url} failed: {source}")]
    Probe {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("registration of {url} rejected: {reason}")]
    Rejected { url: String, reason: String },
}

/// The host's service worker registry.
pub trait ServiceWorkerContainer {
    fn register(&mut self, script_url: &Url) -> Result<Registration, RegistrationError>;
}

/// Container that accepts every script, scoped to the script's directory.
#[derive(Debug, Default)]
pub struct InMemoryContainer {
    registrations: Vec<Registration>,
}

impl InMemoryContainer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }
}

impl ServiceWorkerContainer for InMemoryContainer {
    fn register(&mut self, script_url: &Url) -> Result<Registration, RegistrationError> {
        let scope = script_url.join("./").map_err(|e| RegistrationError::Rejected {
            url: script_url.to_string(),
            reason: e.to_string(),
        })?;
        let registration = Registration {
            script_url: script_url.clone(),
            scope,
        };
        self.registrations.push(registration.clone());
        Ok(registration)
    }
}

async fn try_register(
    client: &reqwest::Client,
    page_url: &Url,
    script_path: &str,
    container: &mut dyn ServiceWorkerContainer,
) -> Result<Option<Registration>, RegistrationError> {
    let script_url = page_url
        .join(script_path)
        .map_err(|source| RegistrationError::InvalidUrl {
            path: script_path.to_string(),
            source,
        })?;
    debug!("Probing service worker script {}", script_url);

    let response = client
        .head(script_url.clone())
        .send()
        .await
        .map_err(|source| RegistrationError::Probe {
            url: script_url.to_string(),
            source,
        })?;

    if !response.status().is_success() {
        warn!(
            "Service worker script {} not found (HTTP {}), skipping registration",
            script_url,
            response.status().as_u16()
        );
        return Ok(None);
    }

    container.register(&script_url).map(Some)
}

/// Probe and register the worker script. Never fails the page: every
/// problem is logged as a warning and yields `None`.
pub async fn register_service_worker(
    client: &reqwest::Client,
    page_url: &Url,
    script_path: &str,
    container: &mut dyn ServiceWorkerContainer,
) -> Option<Registration> {
    match try_register(client, page_url, script_path, container).await {
        Ok(Some(registration)) => {
            info!("Service worker registered with scope {}", registration.scope);
            Some(registration)
        }
        Ok(None) => None,
        Err(e) => {
            warn!("Service worker registration failed: {}", e);
            None
        }
    }
}
