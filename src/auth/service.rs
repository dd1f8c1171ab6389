use std::sync::Arc;

use crate::auth::password::{hash_password, verify_password};
use crate::auth::session::SessionData;
use crate::auth::types::{LoginRequest, RegisterRequest};
use crate::db::{UserProfile, UserStore};
use crate::error::{AppError, AuthError};
use crate::Result;

/// Empty strings count as missing, like absent or `null` fields.
fn required(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|value| !value.is_empty())
}

pub struct AuthService {
    users: Arc<dyn UserStore>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, bcrypt_cost: u32) -> Self {
        Self { users, bcrypt_cost }
    }

    /// Creates an account. Input is validated before storage is touched;
    /// a taken username or email fails with `DatabaseError::Duplicate`.
    pub async fn register(&self, req: &RegisterRequest) -> Result<UserProfile> {
        let (Some(username), Some(email), Some(password)) = (
            required(&req.username),
            required(&req.email),
            required(&req.password),
        ) else {
            return Err(AppError::ValidationError("All fields are required".into()));
        };

        let password_hash = hash_password(password, self.bcrypt_cost).await?;
        let id = self.users.create_user(username, email, &password_hash).await?;

        Ok(UserProfile {
            id,
            username: username.to_string(),
            email: email.to_string(),
        })
    }

    /// Checks a username and password. Unknown users and wrong passwords
    /// fail identically.
    pub async fn login(&self, req: &LoginRequest) -> Result<UserProfile> {
        let (Some(username), Some(password)) = (required(&req.username), required(&req.password))
        else {
            return Err(AppError::ValidationError(
                "Username and password are required".into(),
            ));
        };

        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash).await? {
            return Err(AuthError::InvalidCredentials.into());
        }

        Ok(user.into())
    }

    /// Looks the session's user up again; `None` if the account is gone.
    pub async fn current_user(&self, session: &SessionData) -> Result<Option<UserProfile>> {
        let user = self.users.find_by_id(session.user_id).await?;
        Ok(user.map(UserProfile::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::MockUserStore;
    use crate::db::User;
    use crate::error::DatabaseError;

    fn register_request(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: Some(username.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn login_request(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: Some(username.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn stored_alice() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            email: "a@x.com".to_string(),
            password_hash: bcrypt::hash("p1", 4).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_register_with_missing_fields_never_touches_storage() {
        let mut store = MockUserStore::new();
        store.expect_create_user().never();
        let service = AuthService::new(Arc::new(store), 4);

        let partial = [
            RegisterRequest::default(),
            register_request("", "a@x.com", "p1"),
            register_request("alice", "", "p1"),
            register_request("alice", "a@x.com", ""),
            RegisterRequest {
                password: None,
                ..register_request("alice", "a@x.com", "p1")
            },
        ];

        for req in &partial {
            let err = service.register(req).await.unwrap_err();
            assert!(
                matches!(err, AppError::ValidationError(ref msg) if msg == "All fields are required"),
                "unexpected error for {:?}: {}",
                req,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_register_stores_a_verifiable_hash() {
        let mut store = MockUserStore::new();
        store
            .expect_create_user()
            .withf(|username, email, password_hash| {
                username.to_string() == "alice"
                    && email.to_string() == "a@x.com"
                    && bcrypt::verify("p1", &password_hash.to_string()).unwrap_or(false)
            })
            .times(1)
            .returning(|_, _, _| Ok(1));
        let service = AuthService::new(Arc::new(store), 4);

        let user = service
            .register(&register_request("alice", "a@x.com", "p1"))
            .await
            .unwrap();

        assert_eq!(
            user,
            UserProfile {
                id: 1,
                username: "alice".to_string(),
                email: "a@x.com".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_register_propagates_conflict() {
        let mut store = MockUserStore::new();
        store
            .expect_create_user()
            .returning(|_, _, _| Err(AppError::DatabaseError(DatabaseError::Duplicate)));
        let service = AuthService::new(Arc::new(store), 4);

        let err = service
            .register(&register_request("alice", "a@x.com", "p1"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DatabaseError(DatabaseError::Duplicate)));
    }

    #[tokio::test]
    async fn test_login_with_missing_fields_never_touches_storage() {
        let mut store = MockUserStore::new();
        store.expect_find_by_username().never();
        let service = AuthService::new(Arc::new(store), 4);

        for req in [LoginRequest::default(), login_request("alice", ""), login_request("", "p1")] {
            let err = service.login(&req).await.unwrap_err();
            assert!(matches!(
                err,
                AppError::ValidationError(ref msg) if msg == "Username and password are required"
            ));
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let mut store = MockUserStore::new();
        store
            .expect_find_by_username()
            .returning(|_| Ok(Some(stored_alice())));
        let service = AuthService::new(Arc::new(store), 4);

        let user = service.login(&login_request("alice", "p1")).await.unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.email, "a@x.com");
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let mut store = MockUserStore::new();
        store
            .expect_find_by_username()
            .returning(|username| {
                if username.to_string() == "alice" {
                    Ok(Some(stored_alice()))
                } else {
                    Ok(None)
                }
            });
        let service = AuthService::new(Arc::new(store), 4);

        let wrong_password = service.login(&login_request("alice", "wrong")).await.unwrap_err();
        let unknown_user = service.login(&login_request("mallory", "p1")).await.unwrap_err();

        assert!(matches!(wrong_password, AppError::AuthError(AuthError::InvalidCredentials)));
        assert!(matches!(unknown_user, AppError::AuthError(AuthError::InvalidCredentials)));
        assert_eq!(wrong_password.public_message(), unknown_user.public_message());
    }

    #[tokio::test]
    async fn test_current_user_for_deleted_account() {
        let mut store = MockUserStore::new();
        store.expect_find_by_id().returning(|_| Ok(None));
        let service = AuthService::new(Arc::new(store), 4);

        let session = SessionData {
            user_id: 1,
            username: "alice".to_string(),
        };
        assert!(service.current_user(&session).await.unwrap().is_none());
    }
}
