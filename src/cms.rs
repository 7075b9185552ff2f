use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use crate::error::{AppError, Result};

/// One page or blog post as listed by the CMS.
///
/// The CMS calls the display title `htmlTitle`; it is serialized back into
/// prompts as plain `title`.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ContentRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub language: String,
    #[serde(default, alias = "htmlTitle")]
    pub title: String,
    #[serde(
        default,
        rename = "publishDate",
        skip_serializing_if = "Option::is_none"
    )]
    pub publish_date: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
struct ListingResponse {
    #[serde(default)]
    results: Vec<ContentRecord>,
}

/// Client for the CMS content-listing API.
#[derive(Clone)]
pub struct CmsClient {
    client: Client,
    base_url: String,
    access_token: String,
}

impl CmsClient {
    pub fn new(client: Client, base_url: String, access_token: String) -> Self {
        Self {
            client,
            base_url,
            access_token,
        }
    }

    /// List published (or scheduled) site pages.
    pub async fn fetch_pages(&self) -> Result<Vec<ContentRecord>> {
        self.fetch_listing(
            "/cms/v3/pages/site-pages",
            &[
                ("state__in", "PUBLISHED_OR_SCHEDULED"),
                ("property", "name,slug,language,htmlTitle"),
            ],
        )
        .await
    }

    /// List blog posts, newest first as the CMS returns them.
    pub async fn fetch_posts(&self) -> Result<Vec<ContentRecord>> {
        self.fetch_listing(
            "/cms/v3/blogs/posts",
            &[
                ("property", "name,slug,language,htmlTitle,publishDate"),
                ("limit", "1000"),
            ],
        )
        .await
    }

    async fn fetch_listing(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<ContentRecord>> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .query(query)
            .bearer_auth(&self.access_token)
            .send()
            .await?;

        // A 401 must not masquerade as an empty listing, or a bad token
        // would wipe the cache.
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::FetchError(format!("{} returned {}", path, status)));
        }

        let listing: ListingResponse = response.json().await?;
        Ok(listing.results)
    }
}
