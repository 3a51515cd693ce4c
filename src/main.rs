use anyhow::{Context, Result};
use site_enhancer::app::App;
use site_enhancer::config::Config;
use site_enhancer::dom::Document;
use site_enhancer::events::PageEvent;
use site_enhancer::i18n::{append_standard_meta_tags, FileStore};
use site_enhancer::page::Page;
use site_enhancer::service_worker::InMemoryContainer;
use tracing::info;
use url::Url;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("site_enhancer=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;

    // A URL on the command line wins over SITE_URL
    let site_url = match std::env::args().nth(1) {
        Some(arg) => Url::parse(&arg).with_context(|| format!("Invalid site URL argument: {}", arg))?,
        None => config
            .site_url
            .clone()
            .context("No site URL: set SITE_URL or pass a URL argument")?,
    };

    info!("Running page-ready for {}", site_url);

    let store = FileStore::open(&config.preferences_file)
        .with_context(|| format!("Failed to open preferences file {}", config.preferences_file))?;

    let mut document = Document::new();
    append_standard_meta_tags(&mut document);
    let mut page = Page::new(site_url, document, Box::new(store));

    let client = reqwest::Client::new();
    let mut app = App::new(config, client);
    let mut container = InMemoryContainer::new();
    app.page_ready(&mut page, &mut container).await;
    app.dispatch(&mut page, &PageEvent::Load);

    if let Some(url) = page.pending_navigation() {
        info!("Page requested navigation to {}", url);
    }
    info!("Final URL: {}", page.url());

    println!("{}", page.document.outer_html(page.document.head()));
    println!("{}", serde_json::to_string_pretty(&app.metrics().report())?);

    Ok(())
}
