use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use chat_widget_api::{
    api::routes::create_router,
    cache::run_refresh_loop,
    cms::CmsClient,
    config::Config,
    AppState,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,chat_widget_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::load()?;
    let server_addr = config.server_addr;

    // Create application state
    let app_state = AppState::new(config)?;

    // Warm the content cache now and keep it fresh on the fixed interval
    let cms = CmsClient::new(
        app_state.http.clone(),
        app_state.config.cms_base_url.clone(),
        app_state.config.cms_access_token.clone(),
    );
    tokio::spawn(run_refresh_loop(
        app_state.cache.clone(),
        cms,
        app_state.config.cache_refresh_interval,
    ));

    // Build the router with routes
    let app = create_router(app_state);

    let listener = TcpListener::bind(server_addr).await?;
    tracing::info!("Listening on {}", server_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
