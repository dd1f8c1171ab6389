use serde::{Deserialize, Serialize};

use crate::db::UserProfile;

/// Body of `POST /api/register`. Fields are optional here so that a missing
/// field is reported as a validation failure rather than a parse failure.
#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Body of `POST /api/login`.
#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct CheckAuthResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

impl CheckAuthResponse {
    pub fn authenticated(user: UserProfile) -> Self {
        Self {
            authenticated: true,
            user: Some(user),
        }
    }

    pub fn anonymous() -> Self {
        Self {
            authenticated: false,
            user: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_and_null_fields_deserialize_to_none() {
        let req: RegisterRequest =
            serde_json::from_value(json!({ "username": "alice", "email": null })).unwrap();
        assert_eq!(req.username.as_deref(), Some("alice"));
        assert!(req.email.is_none());
        assert!(req.password.is_none());
    }

    #[test]
    fn test_anonymous_check_auth_has_no_user_key() {
        let json = serde_json::to_value(CheckAuthResponse::anonymous()).unwrap();
        assert_eq!(json, json!({ "authenticated": false }));
    }
}
