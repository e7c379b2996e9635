use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::application::use_cases::auth::CredentialStore;
use crate::application::validators::is_valid_email;

/// Out-of-band delivery of reset links. Transport only; the workflow prepares
/// the payload.
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send_reset_email(&self, to: &str, callback_url: &str) -> AppResult<()>;
}

/// Association between a reset code and the identity it was minted for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetTicket {
    pub code: String,
    pub email: String,
    pub user_id: String,
}

#[derive(Clone)]
pub struct PasswordResetUseCases {
    store: Arc<dyn CredentialStore>,
    notifier: Arc<dyn NotificationSender>,
    app_origin: Url,
}

impl PasswordResetUseCases {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        notifier: Arc<dyn NotificationSender>,
        app_origin: Url,
    ) -> Self {
        Self {
            store,
            notifier,
            app_origin,
        }
    }

    /// Phase 1: mints a reset ticket for the given email and hands the code
    /// back to the caller. Unknown emails are reported by name; repeated
    /// requests each mint a fresh ticket and never fail on outstanding ones.
    #[instrument(skip(self))]
    pub async fn request_reset(&self, email: &str) -> AppResult<ResetTicket> {
        let email = email.trim();
        if !is_valid_email(email) {
            return Err(AppError::validation_single(
                "InvalidEmail",
                &format!("Email '{}' is invalid.", email),
            ));
        }

        let identity = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Usuário '{}' não encontrado.", email)))?;

        let code = self.store.generate_reset_code(&identity).await?;
        Ok(ResetTicket {
            code,
            email: identity.email,
            user_id: identity.id.to_string(),
        })
    }

    /// Retrieves the ticket association for a caller that already holds the
    /// code from phase 1. Shape-level only: the ticket is neither validated
    /// against the store nor consumed.
    #[instrument(skip(self, code))]
    pub async fn lookup_by_id(&self, user_id: &str, code: &str) -> AppResult<ResetTicket> {
        let not_found = || AppError::NotFound(format!("Usuário ID '{}' não encontrado.", user_id));

        let id = Uuid::parse_str(user_id).map_err(|_| not_found())?;
        let identity = self.store.find_by_id(id).await?.ok_or_else(not_found)?;

        Ok(ResetTicket {
            code: code.to_string(),
            email: identity.email,
            user_id: user_id.to_string(),
        })
    }

    /// Phase 2: validates the code and commits the new password. The store
    /// consumes the ticket and writes the password atomically, so a replayed
    /// code can never authorize a second change.
    #[instrument(skip(self, code, new_password))]
    pub async fn confirm_reset(&self, email: &str, code: &str, new_password: &str) -> AppResult<()> {
        let email = email.trim();
        let identity = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Usuário {} não encontrado.", email)))?;

        self.store.reset_password(&identity, code, new_password).await
    }

    /// Emails a reset link instead of returning the code. Kept as the
    /// delivery hook for the notification sender; the request-reset route
    /// currently returns the code directly and does not call this.
    #[instrument(skip(self))]
    pub async fn send_reset_link(&self, email: &str) -> AppResult<()> {
        let email = email.trim();
        let identity = self
            .store
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Usuário '{}' não encontrado.", email)))?;

        let code = self.store.generate_reset_code(&identity).await?;

        let mut callback_url = self
            .app_origin
            .join("reset-password")
            .map_err(|e| AppError::Internal(e.to_string()))?;
        callback_url
            .query_pairs_mut()
            .append_pair("user_id", &identity.id.to_string())
            .append_pair("code", &code);

        self.notifier
            .send_reset_email(&identity.email, callback_url.as_str())
            .await
    }
}
