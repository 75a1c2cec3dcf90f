use backend_domain::{Principal, User};

use crate::{AppError, AppState};

/// A valid token for a user that no longer exists is treated as no session.
pub async fn current_user(state: &AppState, principal: &Principal) -> Result<User, AppError> {
    state
        .user_repo
        .find_user(principal.user_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::Unauthenticated)
}
