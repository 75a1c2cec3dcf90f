use tracing::error;

use backend_domain::{
    BankAccount, Event, EventDetail, EventId, EventStatus, Location, Organizer, Principal,
    PublicEventView, PublicKey, TeamId,
};

use crate::auth::{load_member_event, load_member_team};
use crate::{AppError, AppState};

pub async fn list_team_events(
    state: &AppState,
    principal: &Principal,
    team_id: TeamId,
) -> Result<Vec<Event>, AppError> {
    let team = load_member_team(state, principal, team_id).await?;
    state
        .event_repo
        .list_events_for_team(team.id)
        .await
        .map_err(|err| {
            error!("failed to list events: {}", err);
            AppError::Internal(err)
        })
}

pub async fn get_event(
    state: &AppState,
    principal: &Principal,
    event_id: EventId,
) -> Result<EventDetail, AppError> {
    let event = load_member_event(state, principal, event_id).await?;
    let purchase_items = state
        .event_repo
        .list_purchase_items(event.id)
        .await
        .map_err(AppError::Internal)?;
    Ok(EventDetail {
        event,
        purchase_items,
    })
}

/// Only published events are visible through their public key.
pub async fn get_public_event(
    state: &AppState,
    public_key: &str,
) -> Result<PublicEventView, AppError> {
    let key = PublicKey::parse(public_key).ok_or_else(|| AppError::not_found("event"))?;
    let event = state
        .event_repo
        .find_event_by_public_key(&key)
        .await
        .map_err(AppError::Internal)?
        .filter(|event| event.status == EventStatus::Published)
        .ok_or_else(|| AppError::not_found("event"))?;
    let purchase_items = state
        .event_repo
        .list_purchase_items(event.id)
        .await
        .map_err(AppError::Internal)?;
    let (location, organizer, bank_account) = load_event_references(state, &event).await?;
    Ok(PublicEventView {
        event,
        purchase_items,
        location,
        organizer,
        bank_account,
    })
}

pub async fn load_event_references(
    state: &AppState,
    event: &Event,
) -> Result<(Option<Location>, Option<Organizer>, Option<BankAccount>), AppError> {
    let location = match event.location_id {
        Some(id) => state
            .resource_repo
            .find_location(id)
            .await
            .map_err(AppError::Internal)?,
        None => None,
    };
    let organizer = match event.organizer_id {
        Some(id) => state
            .resource_repo
            .find_organizer(id)
            .await
            .map_err(AppError::Internal)?,
        None => None,
    };
    let bank_account = match event.bank_account_id {
        Some(id) => state
            .resource_repo
            .find_bank_account(id)
            .await
            .map_err(AppError::Internal)?,
        None => None,
    };
    Ok((location, organizer, bank_account))
}

pub async fn list_locations(
    state: &AppState,
    principal: &Principal,
    team_id: TeamId,
) -> Result<Vec<Location>, AppError> {
    let team = load_member_team(state, principal, team_id).await?;
    state
        .resource_repo
        .list_locations(team.id)
        .await
        .map_err(AppError::Internal)
}

pub async fn list_organizers(
    state: &AppState,
    principal: &Principal,
    team_id: TeamId,
) -> Result<Vec<Organizer>, AppError> {
    let team = load_member_team(state, principal, team_id).await?;
    state
        .resource_repo
        .list_organizers(team.id)
        .await
        .map_err(AppError::Internal)
}

pub async fn list_bank_accounts(
    state: &AppState,
    principal: &Principal,
    team_id: TeamId,
) -> Result<Vec<BankAccount>, AppError> {
    let team = load_member_team(state, principal, team_id).await?;
    state
        .resource_repo
        .list_bank_accounts(team.id)
        .await
        .map_err(AppError::Internal)
}
