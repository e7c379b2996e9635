//! Builder that assembles an `AppState` from in-memory mocks for HTTP tests.

use std::sync::Arc;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;
use url::Url;

use crate::adapters::http::app_state::AppState;
use crate::application::jwt::TokenSigner;
use crate::application::use_cases::{
    auth::{AuthUseCases, CredentialStore},
    password_reset::PasswordResetUseCases,
};
use crate::infra::config::AppConfig;
use crate::test_utils::{CapturingEmailSender, InMemoryCredentialStore};

pub fn test_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".to_string(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        jwt_secret: SecretString::from("http-test-signing-secret-0123456789".to_string()),
        jwt_issuer: "central-auth".to_string(),
        jwt_audience: "https://localhost".to_string(),
        token_ttl: Duration::hours(2),
        app_origin: Url::parse("http://localhost:3000").unwrap(),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        resend_api_key: SecretString::from("re_test_unused".to_string()),
        email_from: "no-reply@central.example.com".to_string(),
    }
}

pub struct TestAppStateBuilder {
    store: Arc<InMemoryCredentialStore>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemoryCredentialStore::new()),
        }
    }

    pub async fn with_user(self, email: &str, password: &str) -> Self {
        self.store
            .create(email, password)
            .await
            .expect("test user must satisfy the password policy");
        self
    }

    pub fn build(
        self,
    ) -> (
        AppState,
        Arc<InMemoryCredentialStore>,
        Arc<CapturingEmailSender>,
    ) {
        let config = test_config();
        let signer = Arc::new(
            TokenSigner::new(
                config.jwt_secret.clone(),
                config.jwt_issuer.clone(),
                config.jwt_audience.clone(),
            )
            .expect("test signing secret is non-empty"),
        );

        let store = self.store.clone() as Arc<dyn CredentialStore>;
        let notifier = Arc::new(CapturingEmailSender::default());

        let auth_use_cases = AuthUseCases::new(store.clone(), signer, config.token_ttl);
        let password_reset_use_cases = PasswordResetUseCases::new(
            store,
            notifier.clone(),
            config.app_origin.clone(),
        );

        let app_state = AppState {
            config: Arc::new(config),
            auth_use_cases: Arc::new(auth_use_cases),
            password_reset_use_cases: Arc::new(password_reset_use_cases),
        };
        (app_state, self.store, notifier)
    }
}
