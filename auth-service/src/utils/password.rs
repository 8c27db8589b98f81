use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, Secret};

/// Argon2id with a fresh random salt; the salt is embedded in the PHC string.
pub fn hash_password(password: &Secret<String>) -> Result<String, anyhow::Error> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.expose_secret().as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
}

/// `Ok(false)` on a mismatch; `Err` only when the stored hash is malformed.
pub fn verify_password(password: &Secret<String>, stored_hash: &str) -> Result<bool, anyhow::Error> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))?;

    Ok(Argon2::default()
        .verify_password(password.expose_secret().as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(raw: &str) -> Secret<String> {
        Secret::new(raw.to_string())
    }

    #[test]
    fn hash_is_argon2_phc_string() {
        let hash = hash_password(&secret("s3cret-pass")).unwrap();
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn verify_accepts_only_the_original_password() {
        let hash = hash_password(&secret("s3cret-pass")).unwrap();

        assert!(verify_password(&secret("s3cret-pass"), &hash).unwrap());
        assert!(!verify_password(&secret("other-pass"), &hash).unwrap());
    }

    #[test]
    fn same_password_gets_distinct_salts() {
        let first = hash_password(&secret("s3cret-pass")).unwrap();
        let second = hash_password(&secret("s3cret-pass")).unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password(&secret("x"), "not-a-hash").is_err());
    }
}
