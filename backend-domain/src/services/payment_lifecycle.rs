use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::entities::{PaymentEvidence, Registration};
use crate::value_objects::PaymentStatus;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentCommand {
    /// Key holder reports screenshot and/or note.
    SubmitEvidence(PaymentEvidence),
    /// Team member sets any status, no table enforced.
    Override(PaymentStatus),
    /// Team member accepts reported evidence.
    Confirm,
}

impl PaymentCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitEvidence(_) => "submit_evidence",
            Self::Override(_) => "override",
            Self::Confirm => "confirm",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentEffect {
    SendConfirmation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentTransition {
    pub from: PaymentStatus,
    pub to: PaymentStatus,
    pub effects: Vec<PaymentEffect>,
}

impl PaymentTransition {
    pub fn status_changed(&self) -> bool {
        self.from != self.to
    }

    pub fn sends_confirmation(&self) -> bool {
        self.effects.contains(&PaymentEffect::SendConfirmation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("payment is {0}; only reported payments can be confirmed")]
    NotReported(PaymentStatus),
}

/// Applies one command to a registration in place.
///
/// Callers hold the row lock for the whole read-apply-write so two commands
/// on the same registration never interleave.
pub fn apply_payment_command(
    registration: &mut Registration,
    command: &PaymentCommand,
    now: DateTime<Utc>,
) -> Result<PaymentTransition, LifecycleError> {
    let from = registration.payment_status;
    let to = match command {
        PaymentCommand::SubmitEvidence(evidence) => {
            evidence
                .screenshot_url
                .apply_to(&mut registration.payment_screenshot_url);
            evidence.note.apply_to(&mut registration.payment_note);
            if from == PaymentStatus::Pending && evidence.sets_any() {
                PaymentStatus::Reported
            } else {
                from
            }
        }
        PaymentCommand::Override(status) => *status,
        PaymentCommand::Confirm => {
            if from != PaymentStatus::Reported {
                return Err(LifecycleError::NotReported(from));
            }
            PaymentStatus::Confirmed
        }
    };

    registration.payment_status = to;
    registration.updated_at = Some(now);

    let mut effects = Vec::new();
    if to == PaymentStatus::Confirmed && from != PaymentStatus::Confirmed {
        effects.push(PaymentEffect::SendConfirmation);
    }
    Ok(PaymentTransition { from, to, effects })
}
