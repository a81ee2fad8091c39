use crate::error::Result;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString},
    Argon2,
};

lazy_static::lazy_static! {
    // Verified against when no account matches, so a failed login costs the
    // same whether or not the email exists.
    static ref DUMMY_HASH: String = PasswordHasher::hash("orgman-timing-equalizer")
        .expect("Argon2 must hash a fixed password");
}

pub struct PasswordHasher;

impl PasswordHasher {
    /// Hash a password using Argon2id
    pub fn hash(password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let password_hash = argon2.hash_password(password.as_bytes(), &salt)?.to_string();

        Ok(password_hash)
    }

    /// Verify a password against a hash
    pub fn verify(password: &str, hash: &str) -> Result<bool> {
        let parsed_hash = PasswordHash::new(hash)?;

        let argon2 = Argon2::default();

        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(_) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    /// Burn one verification's worth of work. Always reports a mismatch.
    pub fn verify_dummy(password: &str) -> bool {
        if let Err(e) = Self::verify(password, &DUMMY_HASH) {
            tracing::error!("Dummy password verification failed: {}", e);
        }
        false
    }

    /// Check if a password needs rehashing (algorithm params changed)
    pub fn needs_rehash(hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(h) => h,
            Err(_) => return true, // Invalid hash format, needs rehash
        };

        parsed_hash.algorithm != argon2::Algorithm::Argon2id.ident()
    }
}
