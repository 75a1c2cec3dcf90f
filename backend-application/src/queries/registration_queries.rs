use backend_domain::{
    EventId, Principal, Registration, RegistrationDetails, RegistrationId, RegistrationKey,
    RegistrationRef, RegistrationSummary, RegistrationView,
};

use crate::auth::load_member_event;
use crate::queries::event_queries::load_event_references;
use crate::{AppError, AppState};

/// Public read; possession of the key is the credential.
pub async fn get_registration_by_key(
    state: &AppState,
    registration_key: &str,
) -> Result<RegistrationDetails, AppError> {
    let key =
        RegistrationKey::parse(registration_key).ok_or_else(|| AppError::not_found("registration"))?;
    let registration = find(state, &RegistrationRef::Key(key)).await?;
    let event = state
        .event_repo
        .find_event(registration.event_id)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::not_found("event"))?;
    let attendees = state
        .registration_repo
        .list_attendees(registration.id)
        .await
        .map_err(AppError::Internal)?;
    let purchase_item = match registration.purchase_item_id {
        Some(id) => state
            .event_repo
            .find_purchase_item(id)
            .await
            .map_err(AppError::Internal)?,
        None => None,
    };
    let (location, organizer, bank_account) = load_event_references(state, &event).await?;

    Ok(RegistrationDetails {
        check_in_url: state
            .config
            .check_in_url(registration.registration_key.as_str()),
        registration,
        attendees,
        event,
        purchase_item,
        location,
        organizer,
        bank_account,
    })
}

pub async fn get_registration(
    state: &AppState,
    principal: &Principal,
    registration_id: RegistrationId,
) -> Result<RegistrationView, AppError> {
    let registration = find(state, &RegistrationRef::Id(registration_id)).await?;
    load_member_event(state, principal, registration.event_id).await?;
    to_view(state, registration).await
}

pub async fn list_event_registrations(
    state: &AppState,
    principal: &Principal,
    event_id: EventId,
) -> Result<Vec<RegistrationSummary>, AppError> {
    let event = load_member_event(state, principal, event_id).await?;
    state
        .registration_repo
        .list_registrations_for_event(event.id)
        .await
        .map_err(AppError::Internal)
}

pub(crate) async fn find(
    state: &AppState,
    target: &RegistrationRef,
) -> Result<Registration, AppError> {
    state
        .registration_repo
        .find_registration(target)
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::not_found("registration"))
}

pub(crate) async fn to_view(
    state: &AppState,
    registration: Registration,
) -> Result<RegistrationView, AppError> {
    let attendees = state
        .registration_repo
        .list_attendees(registration.id)
        .await
        .map_err(AppError::Internal)?;
    Ok(RegistrationView {
        check_in_url: state
            .config
            .check_in_url(registration.registration_key.as_str()),
        registration,
        attendees,
    })
}
