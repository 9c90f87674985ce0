use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder,
};
use async_trait::async_trait;
use deadpool_postgres::Pool;
use rand::rngs::OsRng;
use rand::RngCore;
use zeroize::Zeroize;

use crate::error::{AppError, Result};
use crate::models::user::Identity;
use crate::repositories::user as user_repo;

/// The memory cost for Argon2 in MB.
const ARGON2_MEMORY_MB: u32 = 19;
/// The number of iterations for Argon2.
const ARGON2_ITERATIONS: u32 = 3;
/// The parallelism factor for Argon2.
const ARGON2_PARALLELISM: u32 = 2;

/// Hashes a password using Argon2id.
///
/// # Arguments
///
/// * `password` - The password to hash.
///
/// # Returns
///
/// A `Result` containing the hashed password.
pub fn hash_password(password: &str) -> Result<String> {
    let mut password_bytes = password.as_bytes().to_vec();

    let mut salt_bytes = [0u8; 16];
    OsRng.fill_bytes(&mut salt_bytes);

    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| AppError::Internal(format!("Salt encoding error: {}", e)))?;

    let argon2 = Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        ParamsBuilder::new()
            .m_cost(ARGON2_MEMORY_MB * 1024)
            .t_cost(ARGON2_ITERATIONS)
            .p_cost(ARGON2_PARALLELISM)
            .build()
            .map_err(|e| AppError::Internal(format!("Argon2 params: {}", e)))?,
    );

    let password_hash = argon2
        .hash_password(&password_bytes, &salt)
        .map_err(|e| AppError::Internal(format!("Argon2 hash error: {}", e)))?
        .to_string();

    password_bytes.zeroize();
    Ok(password_hash)
}

/// Verifies a password against a stored hash.
///
/// Constant-time by construction; the comparison happens inside Argon2.
///
/// # Arguments
///
/// * `password` - The password to verify.
/// * `hash` - The hash to verify against.
///
/// # Returns
///
/// A `Result` containing `true` if the password is valid, `false` otherwise.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let mut password_bytes = password.as_bytes().to_vec();
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| AppError::Internal(format!("Hash parse error: {}", e)))?;
    let argon2 = Argon2::default();
    let result = argon2
        .verify_password(&password_bytes, &parsed_hash)
        .is_ok();

    password_bytes.zeroize();
    Ok(result)
}

/// Maps identity lookups and password checks onto a backing store.
///
/// Callers never see the stored hash; `verify` hands back the identity
/// with the secret scrubbed, or `InvalidCredentials` with no hint as to
/// which half failed.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Verifies an email/password pair against the store.
    async fn verify(&self, email: &str, password: &str) -> Result<Identity>;
}

/// The PostgreSQL-backed credential store.
pub struct PgCredentialStore {
    pool: Pool,
}

impl PgCredentialStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn verify(&self, email: &str, password: &str) -> Result<Identity> {
        // Exact-match lookup; inactive accounts fail the same way as
        // unknown emails.
        let identity = user_repo::find_active_by_email(&self.pool, email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password, &identity.password_hash)? {
            return Err(AppError::InvalidCredentials);
        }

        tracing::info!("✅ User authenticated: {}", identity.id);
        Ok(identity.sans_secret())
    }
}

/// Creates a new identity with the `user` role.
///
/// # Arguments
///
/// * `pool` - The database connection pool.
/// * `email` - The account email, unique.
/// * `password` - The plaintext password, hashed before storage.
/// * `first_name` / `last_name` - Display names.
///
/// # Returns
///
/// A `Result` containing the created `Identity`, secret scrubbed.
pub async fn create_identity(
    pool: &Pool,
    email: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
) -> Result<Identity> {
    tracing::debug!("🔐 Creating account: {}", email);
    let hashed_password = hash_password(password)?;

    let identity = user_repo::create(pool, email, &hashed_password, first_name, last_name).await?;

    tracing::info!("✅ Account created with ID: {}", identity.id);
    Ok(identity.sans_secret())
}
