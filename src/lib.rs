pub mod auth;
pub mod config;
pub mod db;
pub mod error;

use std::sync::Arc;
use actix_web::{web, HttpResponse};
use tracing::{info, warn};

pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;
pub use config::Settings;

pub use auth::{AuthService, Session, SessionData, SessionStore};
pub use db::{User, UserProfile, UserRepository, UserStore};

/// Liveness probe. Does not touch storage.
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy"
    }))
}

/// Registers every route. Shared by the server binary and the tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .service(
            web::scope("/api")
                .app_data(json_config())
                .route("/register", web::post().to(auth::handlers::register))
                .route("/login", web::post().to(auth::handlers::login))
                .route("/logout", web::post().to(auth::handlers::logout))
                .route("/check-auth", web::get().to(auth::handlers::check_auth)),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        warn!("Rejected request body: {}", err);
        AppError::ValidationError("Invalid request body".into()).into()
    })
}

/// Application state shared across all components
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db: UserRepository,
    pub auth_service: Arc<AuthService>,
    pub sessions: Arc<SessionStore>,
}

impl AppState {
    /// Opens the user store, creating the table if needed, and generates
    /// this process's session signing key.
    pub async fn new(config: Settings) -> Result<Self> {
        let db = UserRepository::connect(&config.database.url, config.database.max_connections).await?;
        db.init_schema().await?;
        info!("User store ready with {} accounts", db.count_users().await?);

        let auth_service = AuthService::new(Arc::new(db.clone()), config.auth.bcrypt_cost);

        Ok(Self {
            config: Arc::new(config),
            db,
            auth_service: Arc::new(auth_service),
            sessions: Arc::new(SessionStore::new()),
        })
    }

    pub async fn shutdown(&self) {
        self.db.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DatabaseError;

    #[tokio::test]
    async fn test_app_state_creation() {
        let config = Settings::ephemeral().expect("Failed to load test config");
        let state = AppState::new(config).await.expect("Failed to create state");

        assert_eq!(state.db.count_users().await.unwrap(), 0);
        state.shutdown().await;
    }

    #[tokio::test]
    async fn test_app_state_unreachable_database() {
        let mut config = Settings::ephemeral().expect("Failed to load test config");
        config.database.url = "sqlite:///nonexistent-directory/nested/users.db".to_string();

        let state = AppState::new(config).await;
        assert!(matches!(
            state,
            Err(AppError::DatabaseError(DatabaseError::ConnectionError(_)))
        ));
    }

    #[tokio::test]
    async fn test_app_state_clone() {
        let config = Settings::ephemeral().expect("Failed to load test config");
        let state = AppState::new(config).await.expect("Failed to create state");

        let cloned = state.clone();

        assert!(Arc::ptr_eq(&state.config, &cloned.config));
        assert!(Arc::ptr_eq(&state.auth_service, &cloned.auth_service));
        assert!(Arc::ptr_eq(&state.sessions, &cloned.sessions));
    }
}
