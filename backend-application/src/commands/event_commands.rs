use chrono::Utc;
use tracing::info;

use backend_domain::{
    normalize_optional_text, BankAccount, BankAccountId, CreateBankAccountRequest,
    CreateEventRequest, CreateLocationRequest, CreateOrganizerRequest, CreatePurchaseItemRequest,
    Event, EventId, EventStatus, Location, LocationId, Organizer, OrganizerId, Principal,
    PublicKey, PurchaseItem, PurchaseItemId, TeamId, UpdateEventRequest,
};

use crate::auth::{load_member_event, load_member_team};
use crate::{AppError, AppState};

pub async fn create_event(
    state: &AppState,
    principal: &Principal,
    team_id: TeamId,
    request: CreateEventRequest,
) -> Result<Event, AppError> {
    let team = load_member_team(state, principal, team_id).await?;
    let title = required(&request.title, "title")?;
    check_schedule(request.starts_at, request.ends_at)?;
    check_references(
        state,
        team.id,
        request.location_id,
        request.organizer_id,
        request.bank_account_id,
    )
    .await?;

    let event = Event {
        id: EventId::new(),
        team_id: team.id,
        public_key: PublicKey::generate(),
        title,
        description: normalize_optional_text(request.description.as_deref()),
        starts_at: request.starts_at,
        ends_at: request.ends_at,
        status: EventStatus::Draft,
        location_id: request.location_id,
        organizer_id: request.organizer_id,
        bank_account_id: request.bank_account_id,
        created_at: Utc::now(),
        updated_at: None,
    };
    state
        .event_repo
        .insert_event(&event)
        .await
        .map_err(AppError::Internal)?;
    info!(event_id = %event.id, team_id = %team.id, "event created");
    Ok(event)
}

pub async fn update_event(
    state: &AppState,
    principal: &Principal,
    event_id: EventId,
    request: UpdateEventRequest,
) -> Result<Event, AppError> {
    let mut event = load_member_event(state, principal, event_id).await?;

    if let Some(title) = &request.title {
        event.title = required(title, "title")?;
    }
    if let Some(description) = &request.description {
        event.description = normalize_optional_text(Some(description));
    }
    if request.starts_at.is_some() {
        event.starts_at = request.starts_at;
    }
    if request.ends_at.is_some() {
        event.ends_at = request.ends_at;
    }
    if let Some(status) = &request.status {
        event.status = status
            .parse::<EventStatus>()
            .map_err(|err| AppError::Validation(err.to_string()))?;
    }
    if request.location_id.is_some() {
        event.location_id = request.location_id;
    }
    if request.organizer_id.is_some() {
        event.organizer_id = request.organizer_id;
    }
    if request.bank_account_id.is_some() {
        event.bank_account_id = request.bank_account_id;
    }
    check_schedule(event.starts_at, event.ends_at)?;
    check_references(
        state,
        event.team_id,
        request.location_id,
        request.organizer_id,
        request.bank_account_id,
    )
    .await?;

    event.updated_at = Some(Utc::now());
    state
        .event_repo
        .update_event(&event)
        .await
        .map_err(AppError::Internal)?;
    info!(event_id = %event.id, status = %event.status.as_str(), "event updated");
    Ok(event)
}

pub async fn add_purchase_item(
    state: &AppState,
    principal: &Principal,
    event_id: EventId,
    request: CreatePurchaseItemRequest,
) -> Result<PurchaseItem, AppError> {
    let event = load_member_event(state, principal, event_id).await?;
    let name = required(&request.name, "name")?;
    if request.price <= 0 {
        return Err(AppError::Validation("price must be a positive integer".to_string()));
    }
    let item = PurchaseItem {
        id: PurchaseItemId::new(),
        event_id: event.id,
        name,
        description: normalize_optional_text(request.description.as_deref()),
        price: request.price,
        created_at: Utc::now(),
    };
    state
        .event_repo
        .insert_purchase_item(&item)
        .await
        .map_err(AppError::Internal)?;
    Ok(item)
}

pub async fn create_location(
    state: &AppState,
    principal: &Principal,
    team_id: TeamId,
    request: CreateLocationRequest,
) -> Result<Location, AppError> {
    let team = load_member_team(state, principal, team_id).await?;
    let location = Location {
        id: LocationId::new(),
        team_id: team.id,
        name: required(&request.name, "name")?,
        address: normalize_optional_text(request.address.as_deref()),
        map_url: normalize_optional_text(request.map_url.as_deref()),
        created_at: Utc::now(),
    };
    state
        .resource_repo
        .insert_location(&location)
        .await
        .map_err(AppError::Internal)?;
    Ok(location)
}

pub async fn create_organizer(
    state: &AppState,
    principal: &Principal,
    team_id: TeamId,
    request: CreateOrganizerRequest,
) -> Result<Organizer, AppError> {
    let team = load_member_team(state, principal, team_id).await?;
    let organizer = Organizer {
        id: OrganizerId::new(),
        team_id: team.id,
        name: required(&request.name, "name")?,
        contact_email: normalize_optional_text(request.contact_email.as_deref()),
        contact_phone: normalize_optional_text(request.contact_phone.as_deref()),
        created_at: Utc::now(),
    };
    state
        .resource_repo
        .insert_organizer(&organizer)
        .await
        .map_err(AppError::Internal)?;
    Ok(organizer)
}

pub async fn create_bank_account(
    state: &AppState,
    principal: &Principal,
    team_id: TeamId,
    request: CreateBankAccountRequest,
) -> Result<BankAccount, AppError> {
    let team = load_member_team(state, principal, team_id).await?;
    let account = BankAccount {
        id: BankAccountId::new(),
        team_id: team.id,
        bank_name: required(&request.bank_name, "bankName")?,
        account_name: required(&request.account_name, "accountName")?,
        account_number: required(&request.account_number, "accountNumber")?,
        created_at: Utc::now(),
    };
    state
        .resource_repo
        .insert_bank_account(&account)
        .await
        .map_err(AppError::Internal)?;
    Ok(account)
}

fn required(value: &str, field: &str) -> Result<String, AppError> {
    normalize_optional_text(Some(value))
        .ok_or_else(|| AppError::Validation(format!("{} is required", field)))
}

fn check_schedule(
    starts_at: Option<chrono::DateTime<Utc>>,
    ends_at: Option<chrono::DateTime<Utc>>,
) -> Result<(), AppError> {
    match (starts_at, ends_at) {
        (Some(start), Some(end)) if end < start => Err(AppError::Validation(
            "endsAt must not be before startsAt".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Referenced rows must exist and belong to the event's team.
async fn check_references(
    state: &AppState,
    team_id: TeamId,
    location_id: Option<LocationId>,
    organizer_id: Option<OrganizerId>,
    bank_account_id: Option<BankAccountId>,
) -> Result<(), AppError> {
    if let Some(id) = location_id {
        let location = state
            .resource_repo
            .find_location(id)
            .await
            .map_err(AppError::Internal)?;
        if location.map(|row| row.team_id) != Some(team_id) {
            return Err(AppError::Validation(
                "locationId does not belong to this team".to_string(),
            ));
        }
    }
    if let Some(id) = organizer_id {
        let organizer = state
            .resource_repo
            .find_organizer(id)
            .await
            .map_err(AppError::Internal)?;
        if organizer.map(|row| row.team_id) != Some(team_id) {
            return Err(AppError::Validation(
                "organizerId does not belong to this team".to_string(),
            ));
        }
    }
    if let Some(id) = bank_account_id {
        let account = state
            .resource_repo
            .find_bank_account(id)
            .await
            .map_err(AppError::Internal)?;
        if account.map(|row| row.team_id) != Some(team_id) {
            return Err(AppError::Validation(
                "bankAccountId does not belong to this team".to_string(),
            ));
        }
    }
    Ok(())
}
