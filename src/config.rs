use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use crate::error::{AppError, Result};

pub const DEFAULT_CMS_BASE_URL: &str = "https://api.hubapi.com";

#[derive(Clone)]
pub struct Config {
    pub server_addr: SocketAddr,
    pub openai_api_key: String,
    pub cms_access_token: String,
    pub cms_base_url: String,
    pub prompt_path: PathBuf,
    pub cache_refresh_interval: Duration,
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load environment variables from .env file if it exists
        dotenv::dotenv().ok();

        let openai_api_key = env::var("OPENAI_API_KEY")?;
        let cms_access_token = env::var("HUBSPOT_ACCESS_TOKEN")?;
        let cms_base_url = env::var("HUBSPOT_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_CMS_BASE_URL.to_string());

        // Load server configuration with defaults
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = env::var("PORT").unwrap_or_else(|_| "10000".to_string());
        let port = port.parse::<u16>().map_err(|e| AppError::ConfigError(format!("Invalid port: {}", e)))?;
        let ip = IpAddr::from_str(&host).map_err(|e| AppError::ConfigError(format!("Invalid host address: {}", e)))?;

        let server_addr = SocketAddr::new(ip, port);

        let prompt_path = env::var("PROMPT_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("prompt/system_prompt.txt"));

        let refresh_hours = env::var("CACHE_REFRESH_HOURS").unwrap_or_else(|_| "6".to_string());
        let refresh_hours = refresh_hours
            .parse::<u64>()
            .map_err(|e| AppError::ConfigError(format!("Invalid refresh interval: {}", e)))?;
        if refresh_hours == 0 {
            return Err(AppError::ConfigError(
                "CACHE_REFRESH_HOURS must be at least 1".to_string(),
            ));
        }
        let cache_refresh_interval = Duration::from_secs(refresh_hours * 60 * 60);

        Ok(Config {
            server_addr,
            openai_api_key,
            cms_access_token,
            cms_base_url,
            prompt_path,
            cache_refresh_interval,
        })
    }
}
