use bcrypt::BcryptError;

use crate::error::AppError;
use crate::Result;

/// Longest password bcrypt can digest without dropping bytes.
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hashes `password` with bcrypt. The result embeds the algorithm, cost and
/// salt, so it is all that needs storing. Passwords bcrypt would truncate
/// are rejected.
pub async fn hash_password(password: &str, cost: u32) -> Result<String> {
    let password = password.to_owned();
    let hashed = tokio::task::spawn_blocking(move || bcrypt::non_truncating_hash(password, cost))
        .await
        .map_err(|e| AppError::InternalError(format!("hashing task failed: {}", e)))?;

    match hashed {
        Ok(hash) => Ok(hash),
        Err(BcryptError::Truncation(_)) => Err(AppError::ValidationError(format!(
            "Password must be at most {} bytes",
            MAX_PASSWORD_BYTES
        ))),
        Err(e) => Err(e.into()),
    }
}

/// A password too long to have been registered never matches.
pub async fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let password = password.to_owned();
    let password_hash = password_hash.to_owned();
    let verified = tokio::task::spawn_blocking(move || {
        bcrypt::non_truncating_verify(password, &password_hash)
    })
    .await
    .map_err(|e| AppError::InternalError(format!("verification task failed: {}", e)))?;

    match verified {
        Ok(matches) => Ok(matches),
        Err(BcryptError::Truncation(_)) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
