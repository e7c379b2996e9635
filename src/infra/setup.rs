use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::adapters::{
    email::resend::ResendEmailSender, http::app_state::AppState,
    persistence::PostgresCredentialStore,
};
use crate::application::jwt::TokenSigner;
use crate::application::use_cases::{
    auth::{AuthUseCases, CredentialStore},
    password_reset::PasswordResetUseCases,
};
use crate::infra::{config::AppConfig, db::init_db};

pub async fn init_app_state() -> anyhow::Result<AppState> {
    let config = AppConfig::from_env();

    // A missing or empty signing key aborts startup; it is never a
    // per-request error.
    let signer = Arc::new(TokenSigner::new(
        config.jwt_secret.clone(),
        config.jwt_issuer.clone(),
        config.jwt_audience.clone(),
    )?);

    let pool = init_db(&config.database_url).await?;
    let store = Arc::new(PostgresCredentialStore::new(pool)) as Arc<dyn CredentialStore>;

    let notifier = Arc::new(ResendEmailSender::new(
        config.resend_api_key.clone(),
        config.email_from.clone(),
    ));

    let auth_use_cases = AuthUseCases::new(store.clone(), signer, config.token_ttl);
    let password_reset_use_cases =
        PasswordResetUseCases::new(store, notifier, config.app_origin.clone());

    Ok(AppState {
        config: Arc::new(config),
        auth_use_cases: Arc::new(auth_use_cases),
        password_reset_use_cases: Arc::new(password_reset_use_cases),
    })
}

pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "central_auth=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer().with_target(false).with_level(true).pretty();

    // File (structured JSON logs)
    let file = File::create("app.log").expect("cannot create log file");
    let json_layer = fmt::layer()
        .json()
        .with_writer(file)
        .with_current_span(true)
        .with_span_list(true);

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();
}
