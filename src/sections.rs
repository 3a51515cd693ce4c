use crate::dom::Document;
use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};
use url::Url;

const MAIN_CONTENT_ID: &str = "main-content";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SectionImage {
    pub src: String,
    #[serde(default)]
    pub alt: String,
}

/// One entry of the sections file. Text fields are trusted markup.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SectionData {
    pub id: String,
    #[serde(default)]
    pub class: Option<String>,
    pub title: String,
    pub text: String,
    #[serde(default)]
    pub img: Option<SectionImage>,
}

impl SectionData {
    fn markup(&self) -> String {
        let mut html = format!("<h2>{}</h2><p>{}</p>", self.title, self.text);
        if let Some(img) = &self.img {
            html.push_str(&format!("<img src=\"{}\" alt=\"{}\">", img.src, img.alt));
        }
        html
    }
}

/// Whether the page has a container for injected sections.
pub fn has_main_content(doc: &Document) -> bool {
    doc.element_by_id(MAIN_CONTENT_ID).is_some()
}

/// Fetch the section list at `path`, relative to the page URL.
pub async fn fetch_sections(client: &reqwest::Client, page_url: &Url, path: &str) -> Result<Vec<SectionData>> {
    let url = page_url
        .join(path)
        .with_context(|| format!("Invalid sections path: {}", path))?;
    debug!("Fetching sections from {}", url);

    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("Failed to fetch {}", url))?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("{} returned HTTP {}", url, status);
    }

    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read {}", url))?;

    serde_json::from_str(&body).with_context(|| format!("{} is not a valid section list", url))
}

/// Append one `<section>` per entry to `#main-content`. Entries whose id is
/// already in the document are skipped. Returns how many were appended.
pub fn render_sections(doc: &mut Document, sections: &[SectionData]) -> usize {
    let Some(main) = doc.element_by_id(MAIN_CONTENT_ID) else {
        return 0;
    };

    let mut appended = 0;
    for section in sections {
        if doc.element_by_id(&section.id).is_some() {
            debug!("Section #{} already present, skipping", section.id);
            continue;
        }
        let class = section.class.as_deref().unwrap_or("");
        let node = doc.append_element(main, "section", &[("id", section.id.as_str()), ("class", class)]);
        doc.set_inner_html(node, &section.markup());
        appended += 1;
    }

    info!("Injected {} section(s)", appended);
    appended
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::{
        matchers::{method, path},
        Mock, MockServer, ResponseTemplate,
    };

    const SECTIONS_JSON: &str = r#"[
        {"id": "about", "class": "section-light", "title": "About", "text": "We <em>build</em> things."},
        {"id": "gallery", "title": "Gallery", "text": "Photos", "img": {"src": "/img/g.jpg", "alt": "Lake"}}
    ]"#;

    fn page_with_main() -> Document {
        let mut doc = Document::new();
        let body = doc.body();
        doc.append_element(body, "main", &[("id", "main-content")]);
        doc
    }

    #[test]
    fn test_render_sections() {
        let mut doc = page_with_main();
        let sections: Vec<SectionData> = serde_json::from_str(SECTIONS_JSON).unwrap();

        assert_eq!(render_sections(&mut doc, &sections), 2);

        let about = doc.element_by_id("about").unwrap();
        assert_eq!(doc.attr(about, "class"), Some("section-light"));
        assert_eq!(doc.inner_html(about), "<h2>About</h2><p>We <em>build</em> things.</p>");

        let gallery = doc.element_by_id("gallery").unwrap();
        assert_eq!(doc.attr(gallery, "class"), Some(""));
        assert_eq!(
            doc.inner_html(gallery),
            "<h2>Gallery</h2><p>Photos</p><img src=\"/img/g.jpg\" alt=\"Lake\">"
        );
    }

    #[test]
    fn test_render_skips_existing_ids() {
        let mut doc = page_with_main();
        let sections: Vec<SectionData> = serde_json::from_str(SECTIONS_JSON).unwrap();
        let main = doc.element_by_id("main-content").unwrap();
        doc.append_element(main, "section", &[("id", "gallery")]);

        assert_eq!(render_sections(&mut doc, &sections), 1);
        assert_eq!(render_sections(&mut doc, &sections), 0);

        assert_eq!(doc.query_all(|d, n| d.tag(n) == Some("section")).len(), 2);
        let gallery = doc.element_by_id("gallery").unwrap();
        assert_eq!(doc.inner_html(gallery), "");
    }

    #[test]
    fn test_render_without_main_content() {
        let mut doc = Document::new();
        let sections: Vec<SectionData> = serde_json::from_str(SECTIONS_JSON).unwrap();
        assert!(!has_main_content(&doc));
        assert_eq!(render_sections(&mut doc, &sections), 0);
        assert!(doc.element_by_id("about").is_none());
    }

    #[tokio::test]
    async fn test_fetch_sections_relative_to_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/site/data/sections.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(SECTIONS_JSON))
            .mount(&server)
            .await;

        let page_url = Url::parse(&format!("{}/site/index.html", server.uri())).unwrap();
        let sections = fetch_sections(&reqwest::Client::new(), &page_url, "data/sections.json")
            .await
            .unwrap();

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].img.as_ref().map(|i| i.alt.as_str()), Some("Lake"));
    }

    #[tokio::test]
    async fn test_fetch_sections_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/missing.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/broken.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let page_url = Url::parse(&format!("{}/", server.uri())).unwrap();

        let err = fetch_sections(&client, &page_url, "data/missing.json").await.unwrap_err();
        assert!(err.to_string().contains("404"));

        let err = fetch_sections(&client, &page_url, "data/broken.json").await.unwrap_err();
        assert!(err.to_string().contains("not a valid section list"));
    }
}
