pub mod api;
pub mod cache;
pub mod cms;
pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod prompt;
pub mod site_context;

use std::sync::Arc;
use std::time::Duration;

use cache::ContentCache;
use config::Config;
use error::{AppError, Result};
use prompt::PromptStore;

/// Application state that will be shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    /// Shared client to reuse connections. No overall timeout: sitemap
    /// fetches set their own, completion calls run as long as the API takes.
    pub http: reqwest::Client,
    pub cache: Arc<ContentCache>,
    pub prompts: Arc<PromptStore>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::ClientBuilder::new()
            .connect_timeout(Duration::from_secs(5))
            .pool_max_idle_per_host(10)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        let prompts = Arc::new(PromptStore::new(config.prompt_path.clone()));

        Ok(AppState {
            config: Arc::new(config),
            http,
            cache: Arc::new(ContentCache::new()),
            prompts,
        })
    }
}
