//! In-memory implementations of the credential store and notification
//! sender. Same policy surface as the Postgres adapter (lockout counters,
//! hashed single-use tickets), with SHA-256 in place of argon2 so the test
//! suite stays fast.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::adapters::persistence::credential_store::{
    LOCKOUT_MINUTES, MAX_FAILED_LOGINS, TICKET_TTL_HOURS, duplicate_email, generate_code,
    hash_code, invalid_token,
};
use crate::app_error::{AppError, AppResult};
use crate::application::password_policy::check_password;
use crate::application::use_cases::auth::{CredentialStore, PasswordVerification};
use crate::application::use_cases::password_reset::NotificationSender;
use crate::domain::entities::user::{Claim, Identity};

struct StoredUser {
    identity: Identity,
    password_hash: String,
    failed_logins: i32,
    locked_until: Option<NaiveDateTime>,
    claims: Vec<Claim>,
    roles: Vec<String>,
}

struct StoredTicket {
    user_id: Uuid,
    code_hash: String,
    expires_at: NaiveDateTime,
    consumed_at: Option<NaiveDateTime>,
}

#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: Mutex<HashMap<Uuid, StoredUser>>,
    tickets: Mutex<Vec<StoredTicket>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches identity-native claims and roles to an existing account.
    pub fn seed_claims_and_roles(&self, email: &str, claims: Vec<Claim>, roles: Vec<String>) {
        let mut users = self.users.lock().unwrap();
        let user = users
            .values_mut()
            .find(|u| u.identity.email.eq_ignore_ascii_case(email))
            .expect("seed_claims_and_roles: unknown email");
        user.claims = claims;
        user.roles = roles;
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Identity>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.identity.email.eq_ignore_ascii_case(email))
            .map(|u| u.identity.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Identity>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(&id)
            .map(|u| u.identity.clone()))
    }

    async fn create(&self, email: &str, password: &str) -> AppResult<Identity> {
        let mut users = self.users.lock().unwrap();

        let mut violations = check_password(password);
        if users
            .values()
            .any(|u| u.identity.email.eq_ignore_ascii_case(email))
        {
            violations.push(duplicate_email(email));
        }
        if !violations.is_empty() {
            return Err(AppError::Validation(violations));
        }

        let identity = Identity {
            id: Uuid::new_v4(),
            email: email.to_string(),
            user_name: email.to_string(),
            email_confirmed: true,
            created_at: Some(Utc::now().naive_utc()),
        };
        users.insert(
            identity.id,
            StoredUser {
                identity: identity.clone(),
                password_hash: hash_code(password),
                failed_logins: 0,
                locked_until: None,
                claims: Vec::new(),
                roles: Vec::new(),
            },
        );
        Ok(identity)
    }

    async fn verify_password(
        &self,
        email: &str,
        password: &str,
    ) -> AppResult<PasswordVerification> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users
            .values_mut()
            .find(|u| u.identity.email.eq_ignore_ascii_case(email))
        else {
            return Ok(PasswordVerification::Invalid);
        };

        let now = Utc::now().naive_utc();
        if user.locked_until.is_some_and(|until| until > now) {
            return Ok(PasswordVerification::LockedOut);
        }

        if user.password_hash == hash_code(password) {
            user.failed_logins = 0;
            user.locked_until = None;
            return Ok(PasswordVerification::Verified(user.identity.clone()));
        }

        user.failed_logins += 1;
        if user.failed_logins >= MAX_FAILED_LOGINS {
            user.failed_logins = 0;
            user.locked_until = Some(now + Duration::minutes(LOCKOUT_MINUTES));
        }
        Ok(PasswordVerification::Invalid)
    }

    async fn generate_reset_code(&self, identity: &Identity) -> AppResult<String> {
        let raw = generate_code();
        self.tickets.lock().unwrap().push(StoredTicket {
            user_id: identity.id,
            code_hash: hash_code(&raw),
            expires_at: (Utc::now() + Duration::hours(TICKET_TTL_HOURS)).naive_utc(),
            consumed_at: None,
        });
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

        let mut tickets = self.tickets.lock().unwrap();
        let Some(ticket) = tickets.iter_mut().find(|t| {
            t.user_id == identity.id
                && t.code_hash == code_hash
                && t.consumed_at.is_none()
                && t.expires_at > now
        }) else {
            return Err(AppError::Validation(vec![invalid_token()]));
        };

        let violations = check_password(new_password);
        if !violations.is_empty() {
            return Err(AppError::Validation(violations));
        }

        ticket.consumed_at = Some(now);
        self.users
            .lock()
            .unwrap()
            .get_mut(&identity.id)
            .expect("ticket references a known user")
            .password_hash = hash_code(new_password);
        Ok(())
    }

    async fn get_claims(&self, identity: &Identity) -> AppResult<Vec<Claim>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(&identity.id)
            .map(|u| u.claims.clone())
            .unwrap_or_default())
    }

    async fn get_roles(&self, identity: &Identity) -> AppResult<Vec<String>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .get(&identity.id)
            .map(|u| u.roles.clone())
            .unwrap_or_default())
    }
}

#[derive(Debug, Clone)]
pub struct SentResetEmail {
    pub to: String,
    pub callback_url: String,
}

/// Notification sender that records instead of delivering.
#[derive(Default)]
pub struct CapturingEmailSender {
    sent: Mutex<Vec<SentResetEmail>>,
}

impl CapturingEmailSender {
    pub fn captured(&self) -> Vec<SentResetEmail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationSender for CapturingEmailSender {
    async fn send_reset_email(&self, to: &str, callback_url: &str) -> AppResult<()> {
        self.sent.lock().unwrap().push(SentResetEmail {
            to: to.to_string(),
            callback_url: callback_url.to_string(),
        });
        Ok(())
    }
}
