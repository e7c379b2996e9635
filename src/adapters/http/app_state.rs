use std::sync::Arc;

use crate::application::use_cases::auth::AuthUseCases;
use crate::application::use_cases::password_reset::PasswordResetUseCases;
use crate::infra::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_use_cases: Arc<AuthUseCases>,
    pub password_reset_use_cases: Arc<PasswordResetUseCases>,
}
