use std::sync::{Arc, RwLock};
use async_trait::async_trait;
use tracing::{info, warn};

use crate::cms::{CmsClient, ContentRecord};
use crate::error::Result;

/// Where cached content comes from. The CMS client is the production
/// implementation; tests swap in fakes.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn fetch_pages(&self) -> Result<Vec<ContentRecord>>;
    async fn fetch_posts(&self) -> Result<Vec<ContentRecord>>;
}

#[async_trait]
impl ContentSource for CmsClient {
    async fn fetch_pages(&self) -> Result<Vec<ContentRecord>> {
        CmsClient::fetch_pages(self).await
    }

    async fn fetch_posts(&self) -> Result<Vec<ContentRecord>> {
        CmsClient::fetch_posts(self).await
    }
}

/// A complete view of both collections at one point in time.
#[derive(Clone, Default)]
pub struct CacheSnapshot {
    pub pages: Arc<Vec<ContentRecord>>,
    pub posts: Arc<Vec<ContentRecord>>,
}

/// Process-wide cache of CMS content.
///
/// Each collection sits behind its own lock and is only ever replaced
/// wholesale, so readers observe either the previous complete collection or
/// the next one, never a partial refresh.
#[derive(Default)]
pub struct ContentCache {
    pages: RwLock<Arc<Vec<ContentRecord>>>,
    posts: RwLock<Arc<Vec<ContentRecord>>>,
}

impl ContentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> CacheSnapshot {
        CacheSnapshot {
            pages: Arc::clone(&self.pages.read().unwrap()),
            posts: Arc::clone(&self.posts.read().unwrap()),
        }
    }

    /// Refresh both collections from the source.
    ///
    /// A failed fetch leaves that collection at its previous value; the
    /// other collection is refreshed independently. Never fails the caller.
    pub async fn refresh(&self, source: &dyn ContentSource) {
        match source.fetch_pages().await {
            Ok(pages) => {
                info!(count = pages.len(), "refreshed page cache");
                *self.pages.write().unwrap() = Arc::new(pages);
            }
            Err(err) => warn!("failed to refresh pages, keeping previous: {}", err),
        }

        match source.fetch_posts().await {
            Ok(posts) => {
                info!(count = posts.len(), "refreshed post cache");
                *self.posts.write().unwrap() = Arc::new(posts);
            }
            Err(err) => warn!("failed to refresh posts, keeping previous: {}", err),
        }
    }
}

/// Refresh the cache now and then on every tick of the fixed interval.
///
/// Runs until process exit. One task drives all refreshes, so they never
/// overlap even when a refresh outlasts the interval.
pub async fn run_refresh_loop(
    cache: Arc<ContentCache>,
    source: impl ContentSource,
    period: std::time::Duration,
) {
    let mut ticker = tokio::time::interval(period);
    loop {
        // The first tick fires immediately and doubles as the startup warm-up.
        ticker.tick().await;
        cache.refresh(&source).await;
    }
}
