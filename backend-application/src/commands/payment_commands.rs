use chrono::Utc;
use tracing::{info, warn};

use backend_domain::{
    PaymentCommand, PaymentConfirmationNotice, PaymentEvidence, PaymentEvidenceRequest,
    PaymentStatus, PaymentStatusRequest, PaymentTransition, PaymentUpdate, Principal,
    Registration, RegistrationId, RegistrationKey, RegistrationRef,
};

use crate::auth::load_member_event;
use crate::{AppError, AppState};

/// Key holder reports payment. Moves `pending` to `reported` when evidence is set.
pub async fn submit_payment_evidence(
    state: &AppState,
    registration_key: &str,
    request: PaymentEvidenceRequest,
) -> Result<Registration, AppError> {
    let key =
        RegistrationKey::parse(registration_key).ok_or_else(|| AppError::not_found("registration"))?;
    let command = PaymentCommand::SubmitEvidence(PaymentEvidence::from(request));
    let registration = run_payment_command(state, RegistrationRef::Key(key), command).await?;
    state.metrics.record_evidence();
    Ok(registration)
}

/// Team member override; any status is accepted.
pub async fn set_payment_status(
    state: &AppState,
    principal: &Principal,
    registration_id: RegistrationId,
    request: PaymentStatusRequest,
) -> Result<Registration, AppError> {
    authorize_registration(state, principal, registration_id).await?;
    let status = request
        .payment_status
        .parse::<PaymentStatus>()
        .map_err(|err| AppError::Validation(err.to_string()))?;
    run_payment_command(
        state,
        RegistrationRef::Id(registration_id),
        PaymentCommand::Override(status),
    )
    .await
}

/// Team member accepts reported evidence. Anything but `reported` is a conflict.
pub async fn confirm_payment(
    state: &AppState,
    principal: &Principal,
    registration_id: RegistrationId,
) -> Result<Registration, AppError> {
    authorize_registration(state, principal, registration_id).await?;
    run_payment_command(
        state,
        RegistrationRef::Id(registration_id),
        PaymentCommand::Confirm,
    )
    .await
}

async fn authorize_registration(
    state: &AppState,
    principal: &Principal,
    registration_id: RegistrationId,
) -> Result<(), AppError> {
    let registration = state
        .registration_repo
        .find_registration(&RegistrationRef::Id(registration_id))
        .await
        .map_err(AppError::Internal)?
        .ok_or_else(|| AppError::not_found("registration"))?;
    load_member_event(state, principal, registration.event_id).await?;
    Ok(())
}

async fn run_payment_command(
    state: &AppState,
    target: RegistrationRef,
    command: PaymentCommand,
) -> Result<Registration, AppError> {
    let update = state
        .registration_repo
        .apply_payment_command(&target, &command, Utc::now())
        .await
        .map_err(AppError::Internal)?;
    let (registration, transition) = match update {
        PaymentUpdate::NotFound => return Err(AppError::not_found("registration")),
        PaymentUpdate::Refused(err) => return Err(AppError::Conflict(err.to_string())),
        PaymentUpdate::Applied {
            registration,
            transition,
        } => (registration, transition),
    };

    log_transition(&registration, &command, &transition);
    if transition.status_changed() {
        state.metrics.record_status_change();
    }
    if transition.sends_confirmation() {
        dispatch_confirmation(state, &registration).await;
    }
    Ok(registration)
}

fn log_transition(
    registration: &Registration,
    command: &PaymentCommand,
    transition: &PaymentTransition,
) {
    info!(
        registration_id = %registration.id,
        command = command.name(),
        from = %transition.from,
        to = %transition.to,
        "payment status applied"
    );
}

/// Gathers event details for the email and hands it off. Lookup failures
/// only thin out the message.
async fn dispatch_confirmation(state: &AppState, registration: &Registration) {
    let event = match state.event_repo.find_event(registration.event_id).await {
        Ok(event) => event,
        Err(err) => {
            warn!(registration_id = %registration.id, "event lookup for confirmation failed: {}", err);
            None
        }
    };
    let location_name = match event.as_ref().and_then(|event| event.location_id) {
        Some(id) => match state.resource_repo.find_location(id).await {
            Ok(location) => location.map(|location| location.name),
            Err(err) => {
                warn!(registration_id = %registration.id, "location lookup for confirmation failed: {}", err);
                None
            }
        },
        None => None,
    };

    let notice = PaymentConfirmationNotice {
        registration_id: registration.id,
        registration_key: registration.registration_key.clone(),
        contact_name: registration.contact_name.clone(),
        contact_email: registration.contact_email.clone(),
        total_amount: registration.total_amount,
        event_title: event.as_ref().map(|event| event.title.clone()),
        event_starts_at: event.as_ref().and_then(|event| event.starts_at),
        location_name,
        registration_url: state
            .config
            .registration_url(registration.registration_key.as_str()),
    };
    state.notification_service.spawn_payment_confirmation(notice);
}
