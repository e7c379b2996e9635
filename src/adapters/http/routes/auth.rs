//! Registration, login and logout routes.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::{Deserialize, Serialize};

use crate::adapters::http::app_state::AppState;
use crate::app_error::{AppError, AppResult};

pub(crate) const SESSION_COOKIE: &str = "access_token";

#[derive(Deserialize)]
struct RegisterPayload {
    email: String,
    password: String,
}

#[derive(Clone, Serialize, Deserialize)]
struct LoginPayload {
    email: String,
    password: String,
}

/// POST /api/auth/register
async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> AppResult<impl IntoResponse> {
    app_state
        .auth_use_cases
        .register(&payload.email, &payload.password)
        .await?;
    Ok("Usuário Cadastrado com sucesso!")
}

/// POST /api/auth/login
///
/// A locked-out account answers 400 echoing the submitted payload; wrong
/// password and unknown email are indistinguishable (404, uniform text).
async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<axum::response::Response> {
    match app_state
        .auth_use_cases
        .login(&payload.email, &payload.password)
        .await
    {
        Ok(credential) => Ok(Json(credential).into_response()),
        Err(AppError::LockedOut) => {
            Ok((StatusCode::BAD_REQUEST, Json(payload)).into_response())
        }
        Err(other) => Err(other),
    }
}

/// POST /api/auth/logout
///
/// Tokens are self-contained and never revoked; logout only drops the
/// transport session cookie.
async fn logout(State(app_state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    app_state.auth_use_cases.logout();
    let jar = jar.remove(Cookie::from(SESSION_COOKIE));
    (jar, StatusCode::OK)
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
}
