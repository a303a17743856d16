use crate::error::AppError;
use bcrypt::{hash, verify};
use tokio::sync::OnceCell;

const BCRYPT_COST: u32 = 12;

/// Hash of a throwaway password, verified against when there is no stored hash to check.
static DECOY_HASH: OnceCell<String> = OnceCell::const_new();

pub fn hash_password(password: &str) -> Result<String, AppError> {
    Ok(hash(password, BCRYPT_COST)?)
}

pub fn verify_password(password: &str, hashed_password: &str) -> Result<bool, AppError> {
    verify(password, hashed_password)
        .map_err(|e| AppError::InternalServerError(format!("Failed to verify password: {}", e)))
}

/// [`hash_password`] on the blocking pool, keeping bcrypt off the async workers.
pub async fn hash_password_blocking(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::InternalServerError(format!("Password hashing task failed: {}", e)))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(
    password: String,
    hashed_password: String,
) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hashed_password))
        .await
        .map_err(|e| {
            AppError::InternalServerError(format!("Password verification task failed: {}", e))
        })?
}

/// Spends the same bcrypt work as [`verify_password_blocking`] without a real hash to check,
/// so callers take as long on an unknown account as on a wrong password. Never matches.
pub async fn verify_decoy_blocking(password: String) -> Result<bool, AppError> {
    let decoy = DECOY_HASH
        .get_or_try_init(|| hash_password_blocking("decoy-password".to_string()))
        .await?;
    verify_password_blocking(password, decoy.clone()).await?;
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_is_salted_and_verifies() {
        let first = hash_password("laundry-day-42").unwrap();
        let second = hash_password("laundry-day-42").unwrap();

        assert_ne!(first, second);
        assert!(first.starts_with("$2"));
        assert!(verify_password("laundry-day-42", &first).unwrap());
        assert!(!verify_password("laundry-day-43", &second).unwrap());
    }

    #[test]
    fn test_malformed_hash_never_verifies() {
        // bcrypt reports some malformed hashes as errors and others as mismatches.
        let result = verify_password("laundry-day-42", "not-a-bcrypt-hash");
        assert!(!matches!(result, Ok(true)));
    }

    #[actix_rt::test]
    async fn test_blocking_helpers() {
        let hashed = hash_password_blocking("secret-pass".to_string()).await.unwrap();
        assert!(verify_password_blocking("secret-pass".to_string(), hashed.clone())
            .await
            .unwrap());
        assert!(!verify_password_blocking("other-pass".to_string(), hashed)
            .await
            .unwrap());
    }

    #[actix_rt::test]
    async fn test_decoy_never_matches() {
        assert!(!verify_decoy_blocking("decoy-password".to_string()).await.unwrap());
        assert!(!verify_decoy_blocking("anything-else".to_string()).await.unwrap());
        assert!(DECOY_HASH.get().is_some_and(|hash| hash.starts_with("$2")));
    }
}
