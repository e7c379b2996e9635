use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::user::{Claim, Identity, claim_types};

/// Process-wide signing configuration. Loaded once at startup, validated,
/// then read-only for the process lifetime. An empty secret is a startup
/// failure, not a per-request one.
pub struct TokenSigner {
    secret: SecretString,
    pub issuer: String,
    pub audience: String,
}

impl TokenSigner {
    pub fn new(secret: SecretString, issuer: String, audience: String) -> AppResult<Self> {
        if secret.expose_secret().trim().is_empty() {
            return Err(AppError::Signing("JWT secret must not be empty".into()));
        }
        Ok(Self {
            secret,
            issuer,
            audience,
        })
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(self.secret.expose_secret().as_bytes())
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(self.secret.expose_secret().as_bytes())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JwtClaims {
    pub sub: String,
    pub email: String,
    pub unique_name: String,
    pub iss: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
    /// Full ordered claim list, mirrored into the response body.
    pub claims: Vec<Claim>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserToken {
    pub id: String,
    pub email: String,
    pub claims: Vec<Claim>,
}

/// Wire shape of an issued credential.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub expires_in: i64,
    pub user: UserToken,
}

/// Builds the ordered claim set for an identity: identity-native claims
/// first, then the synthesized subject/email/username claims, then one role
/// claim per role in store order.
pub fn build_claims(identity: &Identity, native: &[Claim], roles: &[String]) -> Vec<Claim> {
    let mut claims = native.to_vec();
    claims.push(Claim::new(claim_types::SUB, identity.id.to_string()));
    claims.push(Claim::new(claim_types::EMAIL, &identity.email));
    claims.push(Claim::new(claim_types::UNIQUE_NAME, &identity.user_name));
    for role in roles {
        claims.push(Claim::new(claim_types::ROLE, role));
    }
    claims
}

/// Mints a signed, time-bounded credential for a verified identity.
/// CPU-bound only; safe to call concurrently, the signer is read-only.
pub fn issue(
    identity: &Identity,
    native_claims: &[Claim],
    roles: &[String],
    signer: &TokenSigner,
    ttl: Duration,
) -> AppResult<LoginResponse> {
    let claims = build_claims(identity, native_claims, roles);
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let exp = now + ttl.whole_seconds();

    let payload = JwtClaims {
        sub: identity.id.to_string(),
        email: identity.email.clone(),
        unique_name: identity.user_name.clone(),
        iss: signer.issuer.clone(),
        aud: signer.audience.clone(),
        iat: now,
        exp,
        claims: claims.clone(),
    };

    let header = Header::new(Algorithm::HS256);
    let access_token = encode(&header, &payload, &signer.encoding_key())
        .map_err(|e| AppError::Signing(e.to_string()))?;

    Ok(LoginResponse {
        access_token,
        expires_in: ttl.whole_seconds(),
        user: UserToken {
            id: identity.id.to_string(),
            email: identity.email.clone(),
            claims,
        },
    })
}

pub fn verify(token: &str, signer: &TokenSigner) -> AppResult<JwtClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&signer.issuer]);
    validation.set_audience(&[&signer.audience]);
    decode::<JwtClaims>(token, &signer.decoding_key(), &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::InvalidCredentials)
}
