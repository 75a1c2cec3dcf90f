use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;

use backend_application::commands::event_commands;
use backend_application::queries::event_queries;
use backend_application::AppState;
use backend_domain::{
    BankAccount, CreateBankAccountRequest, CreateEventRequest, CreateLocationRequest,
    CreateOrganizerRequest, CreatePurchaseItemRequest, Event, EventDetail, EventId, Location,
    Organizer, PublicEventView, PurchaseItem, TeamId, UpdateEventRequest,
};

use crate::error::HttpError;
use crate::handlers::parse_id;
use crate::middleware::{authenticate, ApiJson};

pub async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_id): Path<String>,
    ApiJson(payload): ApiJson<CreateEventRequest>,
) -> Result<(StatusCode, Json<Event>), HttpError> {
    let principal = authenticate(&state, &headers)?;
    let team_id: TeamId = parse_id(&team_id, "team")?;
    let event = event_commands::create_event(&state, &principal, team_id, payload).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn list_events(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_id): Path<String>,
) -> Result<Json<Vec<Event>>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let team_id: TeamId = parse_id(&team_id, "team")?;
    let events = event_queries::list_team_events(&state, &principal, team_id).await?;
    Ok(Json(events))
}

pub async fn get_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
) -> Result<Json<EventDetail>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let event_id: EventId = parse_id(&event_id, "event")?;
    let detail = event_queries::get_event(&state, &principal, event_id).await?;
    Ok(Json(detail))
}

pub async fn update_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
    ApiJson(payload): ApiJson<UpdateEventRequest>,
) -> Result<Json<Event>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let event_id: EventId = parse_id(&event_id, "event")?;
    let event = event_commands::update_event(&state, &principal, event_id, payload).await?;
    Ok(Json(event))
}

pub async fn add_purchase_item(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
    ApiJson(payload): ApiJson<CreatePurchaseItemRequest>,
) -> Result<(StatusCode, Json<PurchaseItem>), HttpError> {
    let principal = authenticate(&state, &headers)?;
    let event_id: EventId = parse_id(&event_id, "event")?;
    let item = event_commands::add_purchase_item(&state, &principal, event_id, payload).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Public page; no session needed.
pub async fn get_public_event(
    State(state): State<AppState>,
    Path(public_key): Path<String>,
) -> Result<Json<PublicEventView>, HttpError> {
    let view = event_queries::get_public_event(&state, &public_key).await?;
    Ok(Json(view))
}

pub async fn create_location(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_id): Path<String>,
    ApiJson(payload): ApiJson<CreateLocationRequest>,
) -> Result<(StatusCode, Json<Location>), HttpError> {
    let principal = authenticate(&state, &headers)?;
    let team_id: TeamId = parse_id(&team_id, "team")?;
    let location = event_commands::create_location(&state, &principal, team_id, payload).await?;
    Ok((StatusCode::CREATED, Json(location)))
}

pub async fn list_locations(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_id): Path<String>,
) -> Result<Json<Vec<Location>>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let team_id: TeamId = parse_id(&team_id, "team")?;
    Ok(Json(
        event_queries::list_locations(&state, &principal, team_id).await?,
    ))
}

pub async fn create_organizer(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_id): Path<String>,
    ApiJson(payload): ApiJson<CreateOrganizerRequest>,
) -> Result<(StatusCode, Json<Organizer>), HttpError> {
    let principal = authenticate(&state, &headers)?;
    let team_id: TeamId = parse_id(&team_id, "team")?;
    let organizer = event_commands::create_organizer(&state, &principal, team_id, payload).await?;
    Ok((StatusCode::CREATED, Json(organizer)))
}

pub async fn list_organizers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_id): Path<String>,
) -> Result<Json<Vec<Organizer>>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let team_id: TeamId = parse_id(&team_id, "team")?;
    Ok(Json(
        event_queries::list_organizers(&state, &principal, team_id).await?,
    ))
}

pub async fn create_bank_account(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_id): Path<String>,
    ApiJson(payload): ApiJson<CreateBankAccountRequest>,
) -> Result<(StatusCode, Json<BankAccount>), HttpError> {
    let principal = authenticate(&state, &headers)?;
    let team_id: TeamId = parse_id(&team_id, "team")?;
    let account =
        event_commands::create_bank_account(&state, &principal, team_id, payload).await?;
    Ok((StatusCode::CREATED, Json(account)))
}

pub async fn list_bank_accounts(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(team_id): Path<String>,
) -> Result<Json<Vec<BankAccount>>, HttpError> {
    let principal = authenticate(&state, &headers)?;
    let team_id: TeamId = parse_id(&team_id, "team")?;
    Ok(Json(
        event_queries::list_bank_accounts(&state, &principal, team_id).await?,
    ))
}
