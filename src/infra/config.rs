use std::env;
use std::net::SocketAddr;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;
use url::Url;

pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Symmetric signing key; validated non-empty when the signer is built.
    pub jwt_secret: SecretString,
    pub jwt_issuer: String,
    pub jwt_audience: String,
    pub token_ttl: Duration,
    pub app_origin: Url,
    pub cors_origin: HeaderValue,
    pub resend_api_key: SecretString,
    pub email_from: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let jwt_secret =
            SecretString::from(env::var("JWT_SECRET").expect("JWT_SECRET must be set"));
        let resend_api_key =
            SecretString::from(env::var("RESEND_API_KEY").expect("RESEND_API_KEY must be set"));

        let token_ttl_hours: i64 = env::var("TOKEN_TTL_HOURS")
            .unwrap_or("2".to_string())
            .parse()
            .expect("TOKEN_TTL_HOURS must be a valid number");

        let jwt_issuer = env::var("JWT_ISSUER").unwrap_or("central-auth".to_string());
        let jwt_audience = env::var("JWT_AUDIENCE").unwrap_or("https://localhost".to_string());

        let bind_addr: SocketAddr = env::var("BIND_ADDR")
            .unwrap_or("127.0.0.1:3001".to_string())
            .parse()
            .expect("BIND_ADDR must be a valid socket address");

        let app_origin: Url = env::var("APP_ORIGIN")
            .unwrap_or("http://localhost:3000".to_string())
            .parse()
            .expect("APP_ORIGIN must be a valid URL");

        let cors_origin: HeaderValue = env::var("CORS_ORIGIN")
            .unwrap_or("http://localhost:3000".to_string())
            .parse()
            .expect("CORS_ORIGIN must be a valid header value");

        let email_from =
            env::var("EMAIL_FROM").unwrap_or("no-reply@central.example.com".to_string());

        Self {
            database_url,
            bind_addr,
            jwt_secret,
            jwt_issuer,
            jwt_audience,
            token_ttl: Duration::hours(token_ttl_hours),
            app_origin,
            cors_origin,
            resend_api_key,
            email_from,
        }
    }
}
