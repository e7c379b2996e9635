use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::Serialize;

use crate::app_error::{AppError, AppResult};
use crate::application::use_cases::password_reset::NotificationSender;

#[derive(Clone)]
pub struct ResendEmailSender {
    client: Client,
    api_key: secrecy::SecretString,
    from: String,
}

impl ResendEmailSender {
    pub fn new(api_key: secrecy::SecretString, from: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            from,
        }
    }
}

#[derive(Serialize)]
struct ResendReq<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[async_trait]
impl NotificationSender for ResendEmailSender {
    async fn send_reset_email(&self, to: &str, callback_url: &str) -> AppResult<()> {
        let html = format!(
            "<p>Para redefinir sua senha, <a href=\"{}\">clique aqui</a>.</p>",
            callback_url
        );
        let body = ResendReq {
            from: &self.from,
            to: [to],
            subject: "Redefinição de senha",
            html: &html,
        };
        self.client
            .post("https://api.resend.com/emails")
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?
            .error_for_status()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(())
    }
}
