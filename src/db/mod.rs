//! Persistence for user accounts.
//!
//! A single `users` table holds every account. Uniqueness of usernames and
//! emails is enforced by the table itself, not by the application.

pub mod models;
pub mod repository;

pub use models::{User, UserProfile};
pub use repository::{UserRepository, UserStore};
