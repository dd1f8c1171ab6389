use actix_web::{middleware, web, App, HttpServer};
use account_server::{configure, AppState, Settings};
use dotenv::dotenv;
use std::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> account_server::Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    let config = Settings::new()?;
    info!("Configuration loaded successfully ({})", config.environment);

    let state = web::Data::new(AppState::new(config.clone()).await?);

    let listener = TcpListener::bind(format!("{}:{}", config.server.host, config.server.port))?;
    info!("Starting server at {}:{}", config.server.host, config.server.port);

    let app_state = state.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(app_state.clone())
            .configure(configure)
    })
    .listen(listener)?
    .workers(config.server.workers as usize)
    .run()
    .await?;

    info!("Server stopped, closing user store");
    state.shutdown().await;

    Ok(())
}
