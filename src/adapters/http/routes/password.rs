//! Two-phase password recovery routes.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use crate::adapters::http::app_state::AppState;
use crate::app_error::AppResult;

#[derive(Deserialize)]
struct ForgotPasswordPayload {
    email: String,
}

#[derive(Deserialize)]
struct ResetLookupParams {
    user_id: Option<String>,
    code: Option<String>,
}

#[derive(Deserialize)]
struct ResetConfirmPayload {
    email: String,
    code: String,
    password: String,
}

/// POST /api/auth/forgot-password
///
/// Returns the minted code to the caller; email dispatch is a separate,
/// currently-inactive path.
async fn forgot_password(
    State(app_state): State<AppState>,
    Json(payload): Json<ForgotPasswordPayload>,
) -> AppResult<impl IntoResponse> {
    let ticket = app_state
        .password_reset_use_cases
        .request_reset(&payload.email)
        .await?;
    Ok(Json(ticket))
}

/// GET /api/auth/reset-password?user_id=..&code=..
///
/// Returns the ticket association for a caller that already holds the code.
/// Never consumes the ticket.
async fn reset_password_lookup(
    State(app_state): State<AppState>,
    Query(params): Query<ResetLookupParams>,
) -> AppResult<axum::response::Response> {
    let (Some(user_id), Some(code)) = (params.user_id, params.code) else {
        return Ok(
            (StatusCode::BAD_REQUEST, "Não foi possível resetar a senha").into_response(),
        );
    };

    let ticket = app_state
        .password_reset_use_cases
        .lookup_by_id(&user_id, &code)
        .await?;
    Ok(Json(ticket).into_response())
}

/// POST /api/auth/reset-password/confirm
async fn reset_password_confirm(
    State(app_state): State<AppState>,
    Json(payload): Json<ResetConfirmPayload>,
) -> AppResult<impl IntoResponse> {
    app_state
        .password_reset_use_cases
        .confirm_reset(&payload.email, &payload.code, &payload.password)
        .await?;
    Ok("Senha alterada com sucesso!")
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/forgot-password", post(forgot_password))
        .route(
            "/reset-password",
            get(reset_password_lookup),
        )
        .route("/reset-password/confirm", post(reset_password_confirm))
}
