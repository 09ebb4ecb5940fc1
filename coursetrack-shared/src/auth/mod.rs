/// Authentication and authorization
///
/// # Modules
///
/// - [`password`]: Argon2id hashing and the password length rule
/// - [`credentials`]: normalization and validation of account input
/// - [`session`]: signed-cookie sessions over a pluggable [`session::SessionStore`]
/// - [`authorization`]: the `require_auth` / `require_ownership` guard
///
/// # Example
///
/// ```no_run
/// use coursetrack_shared::auth::credentials::Registration;
/// use coursetrack_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let input = Registration::new("ada@example.com", "secret1", "Ada", "Lovelace");
/// input.check()?;
///
/// let hash = hash_password(&input.password)?;
/// assert!(verify_password("secret1", &hash)?);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod credentials;
pub mod password;
pub mod session;
