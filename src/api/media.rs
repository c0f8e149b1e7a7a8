// src/api/media.rs
//! Best-effort side fetches: image placeholder probing and Open Graph
//! scraping for bookmark previews.
//!
//! Both collaborators are behind capability traits so the fetcher can be
//! tested without the network and hosts can substitute their own
//! services. Failures here never abort a fetch — the worst case is a
//! missing annotation.

use crate::error::AppError;
use crate::model::{BookmarkPreview, ImagePlaceholder};
use crate::types::ValidatedUrl;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// The ability to probe an image for a low-resolution placeholder and
/// its natural dimensions.
#[async_trait::async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<ImagePlaceholder, AppError>;
}

/// The ability to scrape link metadata for a bookmark preview.
#[async_trait::async_trait]
pub trait LinkPreviewService: Send + Sync {
    async fn preview(&self, url: &str) -> Result<BookmarkPreview, AppError>;
}

/// HTTP client for a placeholder service that answers
/// `GET <endpoint>?url=<image>` with `{ base64, width, height }`.
pub struct PlaceholderClient {
    client: reqwest::Client,
    endpoint: ValidatedUrl,
}

#[derive(Debug, Deserialize)]
struct PlaceholderResponse {
    #[serde(default)]
    base64: String,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

impl PlaceholderClient {
    pub fn new(endpoint: ValidatedUrl) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint,
        }
    }
}

#[async_trait::async_trait]
impl MediaProbe for PlaceholderClient {
    async fn probe(&self, url: &str) -> Result<ImagePlaceholder, AppError> {
        let response = self
            .client
            .get(self.endpoint.as_str())
            .query(&[("url", url)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AppError::MalformedResponse(format!(
                "placeholder service returned {} for {}",
                response.status(),
                url
            )));
        }

        let body: PlaceholderResponse = response.json().await?;
        Ok(ImagePlaceholder {
            base64: body.base64,
            width: body.width,
            height: body.height,
        })
    }
}

/// Scrapes Open Graph metadata straight from a page's HTML.
pub struct OpenGraphClient {
    client: reqwest::Client,
}

impl OpenGraphClient {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for OpenGraphClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl LinkPreviewService for OpenGraphClient {
    async fn preview(&self, url: &str) -> Result<BookmarkPreview, AppError> {
        let validated = ValidatedUrl::parse(url)?;
        let response = self.client.get(validated.as_str()).send().await?;

        if !response.status().is_success() {
            return Err(AppError::MalformedResponse(format!(
                "link preview target returned {} for {}",
                response.status(),
                url
            )));
        }

        let html = response.text().await?;
        Ok(parse_open_graph(&validated, &html))
    }
}

/// Collapses runs of whitespace (including newlines) and trims.
fn clean_text(text: &str) -> Option<String> {
    let cleaned = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn meta_content(html: &str, property: &str) -> Option<String> {
    // Both attribute orders occur in the wild.
    let patterns = [
        format!(
            r#"<meta[^>]*(?:property|name)=["']{}["'][^>]*content=["']([^"']*)["']"#,
            regex::escape(property)
        ),
        format!(
            r#"<meta[^>]*content=["']([^"']*)["'][^>]*(?:property|name)=["']{}["']"#,
            regex::escape(property)
        ),
    ];

    for pattern in &patterns {
        if let Some(found) = Regex::new(pattern)
            .ok()
            .and_then(|re| re.captures(html))
            .and_then(|c| c.get(1))
        {
            return clean_text(found.as_str());
        }
    }
    None
}

static ICON_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<link[^>]*rel=["'](?:shortcut )?icon["'][^>]*href=["']([^"']+)["']"#)
        .expect("favicon regex must compile")
});

fn favicon_href(html: &str) -> Option<String> {
    ICON_REGEX
        .captures(html)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Assembles a preview from whatever Open Graph tags the page exposes.
/// Relative favicon paths are resolved against the page origin.
fn parse_open_graph(url: &ValidatedUrl, html: &str) -> BookmarkPreview {
    let favicon = favicon_href(html).and_then(|href| {
        if href.starts_with("http") {
            Some(href)
        } else {
            url.as_url().join(&href).ok().map(String::from)
        }
    });

    BookmarkPreview {
        url: url.as_str().to_string(),
        title: meta_content(html, "og:title")
            .or_else(|| extract_title_tag(html)),
        description: meta_content(html, "og:description")
            .or_else(|| meta_content(html, "description")),
        favicon,
        image: meta_content(html, "og:image"),
    }
}

static TITLE_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<title[^>]*>([^<]*)</title>").expect("title regex must compile"));

fn extract_title_tag(html: &str) -> Option<String> {
    TITLE_REGEX
        .captures(html)
        .and_then(|c| c.get(1))
        .and_then(|m| clean_text(m.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTML: &str = r#"<html><head>
        <title>Fallback
            Title</title>
        <meta property="og:title" content="An Example" />
        <meta content="Described  here" property="og:description"/>
        <meta property="og:image" content="https://example.com/og.png">
        <link rel="icon" href="/favicon.ico">
    </head><body></body></html>"#;

    #[test]
    fn scrapes_open_graph_tags() {
        let url = ValidatedUrl::parse("https://example.com/post").unwrap();
        let preview = parse_open_graph(&url, HTML);

        assert_eq!(preview.title.as_deref(), Some("An Example"));
        assert_eq!(preview.description.as_deref(), Some("Described here"));
        assert_eq!(preview.image.as_deref(), Some("https://example.com/og.png"));
        assert_eq!(
            preview.favicon.as_deref(),
            Some("https://example.com/favicon.ico")
        );
    }

    #[test]
    fn falls_back_to_the_title_tag() {
        let url = ValidatedUrl::parse("https://example.com/").unwrap();
        let html = "<html><head><title>Only\n a title</title></head></html>";
        let preview = parse_open_graph(&url, html);

        assert_eq!(preview.title.as_deref(), Some("Only a title"));
        assert!(preview.description.is_none());
        assert!(preview.image.is_none());
    }

    #[test]
    fn clean_text_collapses_whitespace() {
        assert_eq!(clean_text("  a\n  b\t c ").as_deref(), Some("a b c"));
        assert_eq!(clean_text("   "), None);
    }
}
