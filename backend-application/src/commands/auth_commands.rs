use chrono::{Duration, Utc};
use tracing::{error, info};
use validator::ValidateEmail;

use backend_domain::{
    normalize_email, normalize_optional_text, SessionGrant, SignInRequest, SignUpRequest, User,
    UserId,
};

use crate::auth::{hash_password, issue_session_token, verify_password, MIN_PASSWORD_LEN};
use crate::{AppError, AppState};

pub async fn sign_up(state: &AppState, request: SignUpRequest) -> Result<SessionGrant, AppError> {
    let email = normalize_email(&request.email);
    if email.is_empty() || !email.validate_email() {
        return Err(AppError::Validation(
            "email is not a valid email address".to_string(),
        ));
    }
    let name = normalize_optional_text(Some(&request.name))
        .ok_or_else(|| AppError::Validation("name is required".to_string()))?;
    if request.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let user = User {
        id: UserId::new(),
        email,
        name,
        password_hash: hash_password(&request.password)?,
        created_at: Utc::now(),
    };
    let inserted = state.user_repo.insert_user(&user).await.map_err(|err| {
        error!("failed to insert user: {}", err);
        AppError::Internal(err)
    })?;
    if !inserted {
        return Err(AppError::Conflict("email is already registered".to_string()));
    }
    info!(user_id = %user.id, "user registered");
    grant_session(state, user)
}

pub async fn sign_in(state: &AppState, request: SignInRequest) -> Result<SessionGrant, AppError> {
    let email = normalize_email(&request.email);
    let user = state
        .user_repo
        .find_user_by_email(&email)
        .await
        .map_err(AppError::Internal)?;
    match user {
        Some(user) if verify_password(&request.password, &user.password_hash) => {
            info!(user_id = %user.id, "user signed in");
            grant_session(state, user)
        }
        _ => Err(AppError::Unauthenticated),
    }
}

fn grant_session(state: &AppState, user: User) -> Result<SessionGrant, AppError> {
    let ttl = i64::try_from(state.config.session_ttl_minutes).unwrap_or(i64::MAX / 60);
    let expires_at = Utc::now() + Duration::minutes(ttl);
    let token = issue_session_token(&state.config.session_secret, user.id, expires_at)?;
    Ok(SessionGrant {
        token,
        expires_at,
        user,
    })
}
