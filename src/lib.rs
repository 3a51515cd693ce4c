//! Localization and UI enhancement layer for a static multi-language site.
//!
//! The layer runs against a [`page::Page`]: an in-memory document plus the
//! browsing context around it (URL, history, storage, viewport, timers). The
//! host builds the page, calls [`app::App::page_ready`], then forwards user
//! events and elapsed time to the returned app.

pub mod app;
pub mod config;
pub mod dom;
pub mod events;
pub mod i18n;
pub mod page;
pub mod sections;
pub mod service_worker;
pub mod widgets;
