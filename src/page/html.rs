// src/page/html.rs
// =============================================================================
// This module fetches a web page and lists the href of every <a> element.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// We also use the `url` crate to resolve relative hrefs into absolute URLs
// the same way a browser's `anchor.href` property does:
// - Relative hrefs are joined with the document base URL
// - The base URL is the page's final URL after redirects, or the
//   <base href> element if the page has one
// - An href that can't be resolved is kept as written; the checker will
//   classify it
// - An <a> without an href gives None
// =============================================================================

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use super::PageSource;
use crate::checker::RawLink;
use crate::config::CheckerConfig;

/// Downloads pages over HTTP.
///
/// Owns its own HTTP client; everything it holds is released when the value
/// is dropped, on success or failure.
pub struct HtmlPage {
    client: Client,
}

// The page itself may sit behind a few redirects (http -> https, trailing
// slash, ...) whatever limit is set for probing its links
const PAGE_MAX_REDIRECTS: usize = 10;

impl HtmlPage {
    // The page fetch shares the probe timeout and User-Agent
    pub fn new(config: &CheckerConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(PAGE_MAX_REDIRECTS))
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

impl PageSource for HtmlPage {
    async fn raw_links(&self, page_url: &str) -> Result<Vec<RawLink>> {
        let url =
            Url::parse(page_url).map_err(|e| anyhow!("Invalid URL '{}': {}", page_url, e))?;

        let (final_url, html) = fetch_page(&self.client, url.clone())
            .await
            .with_context(|| format!("Failed to fetch {}", page_url))?;

        if final_url != url {
            tracing::info!(%final_url, "page was redirected");
        }

        extract_raw_links(&html, &final_url)
    }
}

// Fetches a web page and returns its final URL and HTML content
async fn fetch_page(client: &Client, url: Url) -> Result<(Url, String)> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        bail!("HTTP {}", response.status());
    }

    let final_url = response.url().clone();
    let html = response.text().await?;
    Ok((final_url, html))
}

/// Lists one raw link per `<a>` element, in document order.
pub fn extract_raw_links(html: &str, page_url: &Url) -> Result<Vec<RawLink>> {
    let document = Html::parse_document(html);

    let anchors = parse_selector("a")?;
    let base_elements = parse_selector("base[href]")?;

    // Only the first <base href> counts, like in a browser
    let base = document
        .select(&base_elements)
        .next()
        .and_then(|element| element.value().attr("href"))
        .and_then(|href| page_url.join(href).ok())
        .unwrap_or_else(|| page_url.clone());

    let links: Vec<RawLink> = document
        .select(&anchors)
        .map(|element| {
            element
                .value()
                .attr("href")
                .map(|href| resolve_href(&base, href))
        })
        .collect();

    Ok(links)
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| anyhow!("Invalid selector '{}': {:?}", selector, e))
}

// Resolves a possibly-relative href against the base URL
//
// Examples:
//   base = "https://example.com/page"
//   href = "/docs"             -> "https://example.com/docs"
//   href = "../other"          -> "https://example.com/other"
//   href = "#top"              -> "https://example.com/page#top"
//   href = "mailto:a@b.test"   -> "mailto:a@b.test"
//   href = "http://[broken"    -> "http://[broken" (kept as written)
fn resolve_href(base: &Url, href: &str) -> String {
    match base.join(href) {
        Ok(url) => url.to_string(),
        Err(_) => href.to_string(),
    }
}
