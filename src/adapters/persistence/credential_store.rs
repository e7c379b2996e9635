use argon2::{
    Argon2, PasswordHash, PasswordVerifier,
    password_hash::{PasswordHasher, SaltString, rand_core},
};
use async_trait::async_trait;
use base64::Engine;
use chrono::{Duration, NaiveDateTime, Utc};
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult, RuleViolation};
use crate::application::password_policy::check_password;
use crate::application::use_cases::auth::{CredentialStore, PasswordVerification};
use crate::domain::entities::user::{Claim, Identity};

pub const MAX_FAILED_LOGINS: i32 = 5;
pub const LOCKOUT_MINUTES: i64 = 15;
pub const TICKET_TTL_HOURS: i64 = 24;

pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow, Debug)]
struct UserRow {
    id: Uuid,
    email: String,
    user_name: String,
    password_hash: String,
    email_confirmed: bool,
    failed_logins: i32,
    locked_until: Option<NaiveDateTime>,
    created_at: Option<NaiveDateTime>,
}

impl UserRow {
    fn into_identity(self) -> Identity {
        Identity {
            id: self.id,
            email: self.email,
            user_name: self.user_name,
            email_confirmed: self.email_confirmed,
            created_at: self.created_at,
        }
    }
}

const SELECT_USER: &str = "SELECT id, email, user_name, password_hash, email_confirmed, \
     failed_logins, locked_until, created_at FROM users";

async fn fetch_by_email(pool: &PgPool, email: &str) -> AppResult<Option<UserRow>> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE LOWER(email) = LOWER($1)"))
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Identity>> {
        Ok(fetch_by_email(&self.pool, email).await?.map(UserRow::into_identity))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(UserRow::into_identity))
    }

    async fn create(&self, email: &str, password: &str) -> AppResult<Identity> {
        let mut violations = check_password(password);
        if fetch_by_email(&self.pool, email).await?.is_some() {
            violations.push(duplicate_email(email));
        }
        if !violations.is_empty() {
            return Err(AppError::Validation(violations));
        }

        let password_hash = compute_password_hash(password.to_string()).await?;
        let id = Uuid::new_v4();
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (id, email, user_name, password_hash, email_confirmed) \
             VALUES ($1, $2, $2, $3, TRUE) \
             RETURNING id, email, user_name, password_hash, email_confirmed, \
                       failed_logins, locked_until, created_at",
        )
        .bind(id)
        .bind(email)
        .bind(&password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Unique-index race after the pre-check.
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint().is_some() {
                    return AppError::Validation(vec![duplicate_email(email)]);
                }
            }
            AppError::from(e)
        })?;

        Ok(row.into_identity())
    }

    async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<PasswordVerification> {
        let Some(row) = fetch_by_email(&self.pool, email).await? else {
            return Ok(PasswordVerification::Invalid);
        };

        let now = Utc::now().naive_utc();
        if row.locked_until.is_some_and(|until| until > now) {
            return Ok(PasswordVerification::LockedOut);
        }

        let matches =
            verify_password_hash(row.password_hash.clone(), password.to_string()).await?;
        if matches {
            sqlx::query("UPDATE users SET failed_logins = 0, locked_until = NULL WHERE id = $1")
                .bind(row.id)
                .execute(&self.pool)
                .await?;
            return Ok(PasswordVerification::Verified(row.into_identity()));
        }

        let failed = row.failed_logins + 1;
        if failed >= MAX_FAILED_LOGINS {
            let until = now + Duration::minutes(LOCKOUT_MINUTES);
            sqlx::query("UPDATE users SET failed_logins = 0, locked_until = $2 WHERE id = $1")
                .bind(row.id)
                .bind(until)
                .execute(&self.pool)
                .await?;
        } else {
            sqlx::query("UPDATE users SET failed_logins = $2 WHERE id = $1")
                .bind(row.id)
                .bind(failed)
                .execute(&self.pool)
                .await?;
        }
        Ok(PasswordVerification::Invalid)
    }

    async fn generate_reset_code(&self, identity: &Identity) -> AppResult<String> {
        let raw = generate_code();
        let code_hash = hash_code(&raw);
        let expires_at = (Utc::now() + Duration::hours(TICKET_TTL_HOURS)).naive_utc();
        sqlx::query(
            "INSERT INTO password_reset_tickets (id, user_id, code_hash, expires_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(Uuid::new_v4())
        .bind(identity.id)
        .bind(&code_hash)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(raw)
    }

    async fn reset_password(
        &self,
        identity: &Identity,
        code: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let code_hash = hash_code(code);
        let now = Utc::now().naive_utc();

        let mut tx = self.pool.begin().await?;

        let ticket_id: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM password_reset_tickets \
             WHERE user_id = $1 AND code_hash = $2 \
               AND consumed_at IS NULL AND expires_at > $3 \
             FOR UPDATE",
        )
        .bind(identity.id)
        .bind(&code_hash)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((ticket_id,)) = ticket_id else {
            return Err(AppError::Validation(vec![invalid_token()]));
        };

        let violations = check_password(new_password);
        if !violations.is_empty() {
            return Err(AppError::Validation(violations));
        }

        let password_hash = compute_password_hash(new_password.to_string()).await?;
        sqlx::query("UPDATE users SET password_hash = $2, updated_at = $3 WHERE id = $1")
            .bind(identity.id)
            .bind(&password_hash)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE password_reset_tickets SET consumed_at = $2 WHERE id = $1")
            .bind(ticket_id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_claims(&self, identity: &Identity) -> AppResult<Vec<Claim>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            "SELECT claim_type, claim_value FROM user_claims \
             WHERE user_id = $1 ORDER BY position",
        )
        .bind(identity.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(claim_type, value)| Claim { claim_type, value })
            .collect())
    }

    async fn get_roles(&self, identity: &Identity) -> AppResult<Vec<String>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT role FROM user_roles WHERE user_id = $1 ORDER BY role",
        )
        .bind(identity.id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|(role,)| role).collect())
    }
}

pub(crate) fn duplicate_email(email: &str) -> RuleViolation {
    RuleViolation::new(
        "DuplicateEmail",
        format!("Email '{}' is already taken.", email),
    )
}

pub(crate) fn invalid_token() -> RuleViolation {
    RuleViolation::new("InvalidToken", "Invalid token.")
}

/// Random single-use reset code. The store persists only its hash.
pub(crate) fn generate_code() -> String {
    use rand::RngCore;
    let mut bytes = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

pub(crate) fn hash_code(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    hex::encode(hasher.finalize())
}

async fn compute_password_hash(password: String) -> AppResult<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(rand_core::OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AppError::Internal(e.to_string()))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?
}

async fn verify_password_hash(expected_hash: String, candidate: String) -> AppResult<bool> {
    tokio::task::spawn_blocking(move || {
        let parsed =
            PasswordHash::new(&expected_hash).map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))?
}
