/// Password hashing with Argon2id
///
/// Stored hashes are PHC strings, so the parameters travel with the hash and
/// verification needs no configuration.
///
/// | Parameter   | Value  |
/// |-------------|--------|
/// | memory      | 64 MiB |
/// | iterations  | 3      |
/// | parallelism | 4      |
/// | output      | 32 B   |
///
/// # Example
///
/// ```
/// use coursetrack_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("hunter22")?;
/// assert!(verify_password("hunter22", &hash)?);
/// assert!(!verify_password("hunter23", &hash)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, ParamsBuilder, Version,
};

/// Shortest accepted password, counted in characters
pub const MIN_PASSWORD_LENGTH: usize = 6;

pub const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters long";

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashError(String),

    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// The stored hash is not a parseable PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params: Params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes `password` with a fresh random salt
///
/// # Errors
///
/// Returns `PasswordError::HashError` if the hasher rejects the input
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let hash = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(e.to_string()))?;

    Ok(hash.to_string())
}

/// Checks `password` against a stored PHC hash
///
/// A mismatch is `Ok(false)`. Only a malformed hash or an internal failure
/// produces an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(e.to_string())),
    }
}

/// Enforces the minimum password length
///
/// Length is measured in Unicode scalar values, not bytes.
///
/// ```
/// use coursetrack_shared::auth::password::validate_password_length;
///
/// assert!(validate_password_length("abcdef").is_ok());
/// assert!(validate_password_length("abc").is_err());
/// ```
pub fn validate_password_length(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(PASSWORD_TOO_SHORT);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_format() {
        let hash = hash_password("secret1").expect("Hash should succeed");

        assert!(hash.starts_with("$argon2id$"));
        assert!(hash.contains("v=19"));
        assert!(hash.contains("m=65536"));
        assert!(hash.contains("t=3"));
        assert!(hash.contains("p=4"));
    }

    #[test]
    fn test_same_password_different_salts() {
        let a = hash_password("secret1").expect("Hash should succeed");
        let b = hash_password("secret1").expect("Hash should succeed");
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("secret1").expect("Hash should succeed");

        assert!(verify_password("secret1", &hash).expect("Verify should succeed"));
        assert!(!verify_password("secret2", &hash).expect("Verify should succeed"));
        assert!(!verify_password("", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_verify_password_rejects_garbage_hash() {
        assert!(matches!(
            verify_password("secret1", "not-a-hash"),
            Err(PasswordError::InvalidHash(_))
        ));
    }

    #[test]
    fn test_verify_password_hash_without_output() {
        // parses as PHC but carries no hash, so nothing can match it
        assert!(matches!(
            verify_password("secret1", "$argon2id$invalid"),
            Ok(false)
        ));
    }

    #[test]
    fn test_verify_unicode_password() {
        let hash = hash_password("pässwörd-密码").expect("Hash should succeed");
        assert!(verify_password("pässwörd-密码", &hash).expect("Verify should succeed"));
    }

    #[test]
    fn test_password_length_boundary() {
        assert_eq!(validate_password_length("12345"), Err(PASSWORD_TOO_SHORT));
        assert!(validate_password_length("123456").is_ok());
        assert!(validate_password_length("").is_err());
    }

    #[test]
    fn test_password_length_counts_characters() {
        // six characters, twelve bytes
        assert!(validate_password_length("éééééé").is_ok());
        assert!(validate_password_length("éééée").is_err());
    }
}
