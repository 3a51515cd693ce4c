//! Page-ready bootstrap and event routing.

use crate::config::Config;
use crate::events::{ComponentRegistry, DispatchOutcome, PageEvent};
use crate::i18n::{
    inject_seo, inject_translations, resolve_language, Language, LocalizationMetrics, TranslationLoader,
};
use crate::page::Page;
use crate::sections::{fetch_sections, has_main_content, render_sections};
use crate::service_worker::{register_service_worker, Registration, ServiceWorkerContainer};
use crate::widgets::{
    highlight_active_language, render_current_language, render_option_flags, AnchorScroll, FocusOutline,
    LanguageSelector, LazyLoader, Lightbox, MobileMenu, ScrollToTop, Slider, SmoothScroll,
};
use std::time::Duration;
use tracing::{debug, error, info};

/// The enhancement layer attached to one page.
pub struct App {
    config: Config,
    client: reqwest::Client,
    loader: TranslationLoader,
    registry: ComponentRegistry,
    active: Language,
    metrics: LocalizationMetrics,
    registration: Option<Registration>,
}

impl App {
    pub fn new(config: Config, client: reqwest::Client) -> Self {
        Self {
            active: config.default_lang,
            loader: TranslationLoader::new(client.clone()),
            config,
            client,
            registry: ComponentRegistry::new(),
            metrics: LocalizationMetrics::new(),
            registration: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn active_language(&self) -> Language {
        self.active
    }

    pub fn metrics(&self) -> &LocalizationMetrics {
        &self.metrics
    }

    /// Names of mounted components, in mount order.
    pub fn components(&self) -> Vec<&'static str> {
        self.registry.names()
    }

    pub fn registration(&self) -> Option<&Registration> {
        self.registration.as_ref()
    }

    /// Run the page-ready sequence. Running it again (after a navigation)
    /// first tears down the components of the previous page.
    pub async fn page_ready(&mut self, page: &mut Page, container: &mut dyn ServiceWorkerContainer) {
        self.registry.unmount_all(page);

        // 1. Language
        let url_lang = page.query_param("lang");
        self.active = resolve_language(url_lang.as_deref(), page.storage_mut(), self.config.default_lang);
        page.strip_query_param("lang");
        info!("Active language: {}", self.active);

        // 2. Navigation and selector
        self.registry.mount(page, Box::new(MobileMenu::new()));

        let twemoji_base = self.config.twemoji_base.clone();
        render_current_language(page, self.active, twemoji_base.as_deref());
        render_option_flags(page, twemoji_base.as_deref());
        highlight_active_language(page, self.active);
        self.registry.mount(page, Box::new(LanguageSelector::new(self.active)));

        // 3. Remote content
        let page_url = page.url().clone();
        let wants_sections = has_main_content(&page.document);
        let translations = self.loader.load(&page_url, self.active);
        let sections = async {
            if wants_sections {
                Some(fetch_sections(&self.client, &page_url, &self.config.sections_path).await)
            } else {
                None
            }
        };
        let (translations, sections) = futures::join!(translations, sections);

        match sections {
            Some(Ok(list)) => {
                render_sections(&mut page.document, &list);
            }
            Some(Err(e)) => error!("Section injection failed: {:#}", e),
            None => debug!("No #main-content, skipping sections"),
        }

        match translations {
            Ok(document) => {
                self.metrics.record_document_loaded();
                let base_url = page.base_url();
                inject_seo(&mut page.document, &document.seo, &document.lang_code, &base_url);
                let report = inject_translations(&mut page.document, &document);
                self.metrics.record_injection(&report);
            }
            Err(e) => {
                error!("Failed to load translations: {}", e);
                self.metrics.record_load_failure();
            }
        }

        // 4. Widgets
        self.registry.mount(page, Box::new(Slider::new(self.config.slider_interval)));
        self.registry
            .mount(page, Box::new(LazyLoader::new(self.config.lazy_root_margin_px)));
        self.registry.mount(page, Box::new(SmoothScroll::new()));
        self.registry
            .mount(page, Box::new(ScrollToTop::new(self.config.scroll_top_threshold_px)));
        match Lightbox::from_document(&page.document) {
            Some(lightbox) => {
                self.registry.mount(page, Box::new(lightbox));
            }
            None => debug!("No gallery on this page, lightbox not mounted"),
        }
        self.registry
            .mount(page, Box::new(AnchorScroll::new(self.config.anchor_offset_px)));
        self.registry.mount(page, Box::new(FocusOutline::new()));

        // 5. Offline support
        self.registration = None;
        if page.capabilities.service_worker {
            self.registration = register_service_worker(
                &self.client,
                page.url(),
                &self.config.service_worker_path,
                container,
            )
            .await;
        }

        info!(
            "Initialization complete ({} components, language {})",
            self.registry.len(),
            self.active
        );
    }

    pub fn dispatch(&mut self, page: &mut Page, event: &PageEvent) -> DispatchOutcome {
        self.registry.dispatch(page, event)
    }

    /// Advance the page clock, delivering each due timer as an event.
    /// Timers scheduled by handlers fire within the same call when due.
    pub fn advance_time(&mut self, page: &mut Page, by: Duration) {
        let target = page.timers.now() + by;
        while let Some(due) = page.timers.next_due().filter(|&due| due <= target) {
            let step = due.saturating_sub(page.timers.now());
            for id in page.timers.advance(step) {
                self.registry.dispatch(page, &PageEvent::Timer(id));
            }
        }
        let rest = target.saturating_sub(page.timers.now());
        page.timers.advance(rest);
    }

    /// Unmount every component, cancelling their timers.
    pub fn teardown(&mut self, page: &mut Page) {
        self.registry.unmount_all(page);
    }
}
