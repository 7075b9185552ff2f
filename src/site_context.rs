use std::time::Duration;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::warn;
use url::Url;

use crate::error::{AppError, Result};

const SITEMAP_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_SCRAPED_LINKS: usize = 10;

static ANCHOR_SELECTOR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("a").expect("Failed to parse anchor selector")
});

/// Best-effort page listing for the visitor's site, used to enrich the
/// final user turn. Tries `{base}/sitemap.xml` first; when the sitemap is
/// missing or empty, falls back to scraping anchor links off the root page.
///
/// Every failure is logged and collapses to an empty string so the chat
/// turn always proceeds.
pub async fn fetch_site_context(client: &Client, website_url: &str) -> String {
    match site_pages(client, website_url).await {
        Ok(context) => context,
        Err(err) => {
            warn!("Could not fetch sitemap or pages for {}: {}", website_url, err);
            String::new()
        }
    }
}

async fn site_pages(client: &Client, website_url: &str) -> Result<String> {
    let base = Url::parse(website_url)
        .map_err(|e| AppError::FetchError(format!("Invalid website URL: {}", e)))?;
    let sitemap_url = base
        .join("/sitemap.xml")
        .map_err(|e| AppError::FetchError(format!("Invalid sitemap URL: {}", e)))?;

    let body = client
        .get(sitemap_url)
        .timeout(SITEMAP_TIMEOUT)
        .send()
        .await?
        .text()
        .await?;

    let urls = sitemap_locations(&body);
    if !urls.is_empty() {
        return Ok(format!(
            "Here are some pages found from {}:\n{}",
            website_url,
            urls.join("\n")
        ));
    }

    // Sitemap parsed but listed nothing (or was not XML at all): scrape the
    // root page for anchors instead.
    let html = client.get(base.clone()).send().await?.text().await?;
    let links = anchor_links(&html, &base);
    Ok(format!("Some pages found:\n{}", links.join("\n")))
}

/// Pull every `urlset > url > loc` value out of a sitemap document.
/// Unparsable input yields an empty list, which callers treat the same as
/// an empty sitemap.
fn sitemap_locations(body: &str) -> Vec<String> {
    let document = match roxmltree::Document::parse(body) {
        Ok(document) => document,
        Err(_) => return Vec::new(),
    };

    let root = document.root_element();
    if !root.has_tag_name("urlset") {
        return Vec::new();
    }

    root.children()
        .filter(|node| node.has_tag_name("url"))
        .filter_map(|node| {
            node.children()
                .find(|child| child.has_tag_name("loc"))
                .and_then(|loc| loc.text())
        })
        .map(|loc| loc.trim().to_string())
        .filter(|loc| !loc.is_empty())
        .collect()
}

/// Collect up to `MAX_SCRAPED_LINKS` anchor hrefs from a page, resolved
/// against the base URL. Hrefs that do not resolve are skipped.
fn anchor_links(html: &str, base: &Url) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .filter_map(|href| base.join(href).ok())
        .map(|url| url.to_string())
        .take(MAX_SCRAPED_LINKS)
        .collect()
}
