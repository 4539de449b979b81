//! Argon2id password hasher.
//!
//! Defaults follow the OWASP Password Storage parameters: m=19456 (19 MiB),
//! t=2, p=1.

use argon2::password_hash::SaltString;
use argon2::password_hash::rand_core::OsRng;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version};
use engeserv_application::PasswordHasher as PasswordHasherPort;
use engeserv_core::{AppError, AppResult};
use tracing::warn;

const MEMORY_COST_KIB: u32 = 19_456;
const TIME_COST: u32 = 2;
const PARALLELISM: u32 = 1;

/// Argon2id password hasher.
#[derive(Clone)]
pub struct Argon2PasswordHasher {
    argon2: Argon2<'static>,
}

impl Argon2PasswordHasher {
    /// Creates a hasher with the recommended parameters.
    #[must_use]
    pub fn new() -> Self {
        Self::with_params(MEMORY_COST_KIB, TIME_COST, PARALLELISM)
            .unwrap_or_else(|_| Self::from(Params::default()))
    }

    /// Creates a hasher with explicit cost parameters.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> AppResult<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|error| AppError::Validation(format!("invalid argon2 parameters: {error}")))?;

        Ok(Self::from(params))
    }
}

impl From<Params> for Argon2PasswordHasher {
    fn from(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        }
    }
}

impl Default for Argon2PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasherPort for Argon2PasswordHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|error| AppError::Internal(format!("failed to hash password: {error}")))
    }

    /// A stored hash that does not parse counts as a mismatch.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        let Ok(parsed_hash) = PasswordHash::new(hash) else {
            warn!("stored password hash is not in PHC format");
            return Ok(false);
        };

        match self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
        {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(error) => Err(AppError::Internal(format!(
                "password verification failed: {error}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use engeserv_application::PasswordHasher as PasswordHasherPort;
    use engeserv_core::AppResult;

    use super::Argon2PasswordHasher;

    fn fast_hasher() -> AppResult<Argon2PasswordHasher> {
        Argon2PasswordHasher::with_params(1024, 1, 1)
    }

    #[test]
    fn hashes_verify_only_the_original_password() -> AppResult<()> {
        let hasher = fast_hasher()?;
        let hash = hasher.hash_password("concreto armado")?;

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("concreto armado", &hash)?);
        assert!(!hasher.verify_password("concreto protendido", &hash)?);
        Ok(())
    }

    #[test]
    fn same_password_gets_distinct_salts() -> AppResult<()> {
        let hasher = fast_hasher()?;
        assert_ne!(
            hasher.hash_password("concreto armado")?,
            hasher.hash_password("concreto armado")?
        );
        Ok(())
    }

    #[test]
    fn malformed_stored_hash_is_a_mismatch() -> AppResult<()> {
        assert!(!fast_hasher()?.verify_password("qualquer", "not-a-phc-string")?);
        Ok(())
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        assert!(Argon2PasswordHasher::with_params(1, 0, 0).is_err());
    }
}
