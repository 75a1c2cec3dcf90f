use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use backend_application::commands::auth_commands;
use backend_application::queries::auth_queries;
use backend_application::AppState;
use backend_domain::{SessionGrant, SignInRequest, SignUpRequest, User};

use crate::error::HttpError;
use crate::middleware::{authenticate, clear_session_cookie, session_cookie, ApiJson};

pub async fn register(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignUpRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let grant = auth_commands::sign_up(&state, payload).await?;
    Ok((StatusCode::CREATED, with_cookie(&state, grant)))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<SignInRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let grant = auth_commands::sign_in(&state, payload).await?;
    Ok(with_cookie(&state, grant))
}

pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_session_cookie(&state.config))],
    )
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<User>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let user = auth_queries::current_user(&state, &principal).await?;
    Ok(Json(user))
}

fn with_cookie(state: &AppState, grant: SessionGrant) -> impl IntoResponse {
    let cookie = session_cookie(&state.config, &grant.token, grant.expires_at);
    ([(header::SET_COOKIE, cookie)], Json(grant))
}
