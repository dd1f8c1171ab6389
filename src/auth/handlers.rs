use actix_web::{web, HttpResponse};
use tracing::{info, warn};

use crate::auth::session::{Session, SessionData};
use crate::auth::types::{AuthResponse, CheckAuthResponse, LoginRequest, MessageResponse, RegisterRequest};
use crate::AppState;
use crate::Result;

pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let username = req.username.as_deref().unwrap_or_default();
    info!("Received registration request for username: {}", username);

    let user = match state.auth_service.register(&req).await {
        Ok(user) => user,
        Err(e) => {
            warn!("Registration failed for username: {}: {}", username, e);
            return Err(e);
        }
    };

    let cookie = state.sessions.issue(&SessionData::from(&user))?;
    info!("Registration successful for user id: {}", user.id);

    Ok(HttpResponse::Created().cookie(cookie).json(AuthResponse {
        message: "Registration successful".to_string(),
        user,
    }))
}

pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let username = req.username.as_deref().unwrap_or_default();
    info!("Received login request for username: {}", username);

    let user = match state.auth_service.login(&req).await {
        Ok(user) => user,
        Err(e) => {
            warn!("Login failed for username: {}: {}", username, e);
            return Err(e);
        }
    };

    let cookie = state.sessions.issue(&SessionData::from(&user))?;
    info!("Login successful for user id: {}", user.id);

    Ok(HttpResponse::Ok().cookie(cookie).json(AuthResponse {
        message: "Login successful".to_string(),
        user,
    }))
}

/// Always succeeds, with or without a session.
pub async fn logout(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok()
        .cookie(state.sessions.clear())
        .json(MessageResponse {
            message: "Logout successful".to_string(),
        })
}

pub async fn check_auth(
    session: Session,
    state: web::Data<AppState>,
) -> Result<HttpResponse> {
    let Session(Some(data)) = session else {
        return Ok(HttpResponse::Ok().json(CheckAuthResponse::anonymous()));
    };

    match state.auth_service.current_user(&data).await? {
        Some(user) => {
            // Refresh so an active client keeps its session alive.
            let cookie = state.sessions.issue(&SessionData::from(&user))?;
            Ok(HttpResponse::Ok()
                .cookie(cookie)
                .json(CheckAuthResponse::authenticated(user)))
        }
        None => {
            info!("Session refers to missing user id: {}", data.user_id);
            Ok(HttpResponse::Ok()
                .cookie(state.sessions.clear())
                .json(CheckAuthResponse::anonymous()))
        }
    }
}
