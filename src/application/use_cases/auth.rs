use std::sync::Arc;

use async_trait::async_trait;
use time::Duration;
use tracing::instrument;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult, RuleViolation};
use crate::application::jwt::{self, LoginResponse, TokenSigner};
use crate::application::validators::is_valid_email;
use crate::domain::entities::user::{Claim, Identity};

/// Outcome of a password check against the store. The store owns the lockout
/// policy; the core only translates the outcome.
#[derive(Debug)]
pub enum PasswordVerification {
    Verified(Identity),
    LockedOut,
    Invalid,
}

/// Persistence and verification layer for identities, passwords and reset
/// tickets. Implementations must provide per-identity atomicity for password
/// and ticket mutations.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Identity>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>>;
    /// Creates a pre-confirmed account. Duplicate emails and policy failures
    /// come back as `AppError::Validation` listing every violated rule.
    async fn create(&self, email: &str, password: &str) -> AppResult<Identity>;
    async fn verify_password(&self, email: &str, password: &str)
    -> AppResult<PasswordVerification>;
    /// Mints a single-use reset code bound to the identity. Outstanding codes
    /// stay valid; each is independently consumable once.
    async fn generate_reset_code(&self, identity: &Identity) -> AppResult<String>;
    /// Validates the code and, if valid, atomically sets the new password and
    /// consumes the ticket. Expired, mismatched or replayed codes and weak
    /// passwords come back as `AppError::Validation`.
    async fn reset_password(
        &self,
        identity: &Identity,
        code: &str,
        new_password: &str,
    ) -> AppResult<()>;
    async fn get_claims(&self, identity: &Identity) -> AppResult<Vec<Claim>>;
    async fn get_roles(&self, identity: &Identity) -> AppResult<Vec<String>>;
}

#[derive(Clone)]
pub struct AuthUseCases {
    store: Arc<dyn CredentialStore>,
    signer: Arc<TokenSigner>,
    token_ttl: Duration,
}

impl AuthUseCases {
    pub fn new(store: Arc<dyn CredentialStore>, signer: Arc<TokenSigner>, token_ttl: Duration) -> Self {
        Self {
            store,
            signer,
            token_ttl,
        }
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> AppResult<Identity> {
        let email = email.trim();
        let mut violations = Vec::new();
        if !is_valid_email(email) {
            violations.push(RuleViolation::new(
                "InvalidEmail",
                format!("Email '{}' is invalid.", email),
            ));
        }
        if password.is_empty() {
            violations.push(RuleViolation::new(
                "PasswordRequired",
                "The Password field is required.",
            ));
        }
        if !violations.is_empty() {
            return Err(AppError::Validation(violations));
        }

        self.store.create(email, password).await
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<LoginResponse> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AppError::InvalidCredentials);
        }

        match self.store.verify_password(email, password).await? {
            PasswordVerification::Verified(identity) => {
                self.issue_credential(&identity).await
            }
            PasswordVerification::LockedOut => Err(AppError::LockedOut),
            PasswordVerification::Invalid => Err(AppError::InvalidCredentials),
        }
    }

    /// Tokens are self-contained and never revoked, so logout is a pure
    /// signal; the transport layer drops its session cookie.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        tracing::info!("session signed out");
    }

    async fn issue_credential(&self, identity: &Identity) -> AppResult<LoginResponse> {
        let native_claims = self.store.get_claims(identity).await?;
        let roles = self.store.get_roles(identity).await?;
        jwt::issue(identity, &native_claims, &roles, &self.signer, self.token_ttl)
    }
}
