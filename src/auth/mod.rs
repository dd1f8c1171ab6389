//! Account authentication.
//!
//! Credential validation and password hashing live in the service; sessions
//! are signed tokens held entirely in a client cookie, so logging out only
//! needs to tell the client to drop it.

pub mod handlers;
mod password;
mod service;
mod session;
pub mod types;

pub use password::{hash_password, verify_password};
pub use service::AuthService;
pub use session::{Session, SessionData, SessionStore, SESSION_COOKIE_NAME, SESSION_LIFETIME_DAYS};
