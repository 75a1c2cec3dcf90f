use chrono::Utc;
use tracing::{error, info};

use backend_domain::{
    check_registration_target, parse_registration, CreateRegistrationRequest, RegistrationView,
};

use crate::{AppError, AppState};

/// Public submission. The registration and every attendee are stored
/// together or not at all.
pub async fn create_registration(
    state: &AppState,
    request: CreateRegistrationRequest,
) -> Result<RegistrationView, AppError> {
    let draft = parse_registration(&request).map_err(|err| {
        state.metrics.record_registration_rejected();
        AppError::from(err)
    })?;

    let event = state
        .event_repo
        .find_event(draft.event_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::not_found("event"))?;
    let purchase_item = match draft.purchase_item_id {
        Some(id) => state
            .event_repo
            .find_purchase_item(id)
            .await
            .map_err(AppError::Internal)?,
        None => None,
    };
    check_registration_target(&draft, &event, purchase_item.as_ref()).map_err(|err| {
        state.metrics.record_registration_rejected();
        AppError::from(err)
    })?;

    let (registration, attendees) = draft.into_records(Utc::now());
    state
        .registration_repo
        .create_registration(&registration, &attendees)
        .await
        .map_err(|err| {
            error!("failed to store registration: {}", err);
            AppError::Internal(err)
        })?;
    state.metrics.record_registration();
    info!(
        registration_id = %registration.id,
        event_id = %event.id,
        attendees = attendees.len(),
        "registration created"
    );

    Ok(RegistrationView {
        check_in_url: state
            .config
            .check_in_url(registration.registration_key.as_str()),
        registration,
        attendees,
    })
}
