use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::entities::{
    Attendee, AttendeeScope, BankAccount, Event, Location, Organizer, PurchaseItem, Registration,
    RegistrationSummary, Team, User,
};
use crate::services::{CheckInOutcome, LifecycleError, PaymentCommand, PaymentTransition};
use crate::value_objects::{
    AttendeeId, BankAccountId, EventId, LocationId, OrganizerId, PublicKey, PurchaseItemId,
    RegistrationId, RegistrationKey, TeamId, UserId,
};

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Returns `false` when the email is already taken.
    async fn insert_user(&self, user: &User) -> anyhow::Result<bool>;
    async fn find_user(&self, id: UserId) -> anyhow::Result<Option<User>>;
    async fn find_user_by_email(&self, email: &str) -> anyhow::Result<Option<User>>;
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Creates the team with `owner` as its first member.
    async fn create_team(&self, team: &Team, owner: UserId) -> anyhow::Result<()>;
    async fn find_team(&self, id: TeamId) -> anyhow::Result<Option<Team>>;
    async fn list_teams_for_user(&self, user_id: UserId) -> anyhow::Result<Vec<Team>>;
    async fn is_member(&self, team_id: TeamId, user_id: UserId) -> anyhow::Result<bool>;
    /// Returns `false` when the user already belongs to the team.
    async fn add_member(&self, team_id: TeamId, user_id: UserId) -> anyhow::Result<bool>;
    async fn list_members(&self, team_id: TeamId) -> anyhow::Result<Vec<User>>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn ensure_schema(&self) -> anyhow::Result<()>;
    async fn ping(&self) -> anyhow::Result<()>;

    async fn insert_event(&self, event: &Event) -> anyhow::Result<()>;
    async fn update_event(&self, event: &Event) -> anyhow::Result<()>;
    async fn find_event(&self, id: EventId) -> anyhow::Result<Option<Event>>;
    async fn find_event_by_public_key(&self, key: &PublicKey) -> anyhow::Result<Option<Event>>;
    async fn list_events_for_team(&self, team_id: TeamId) -> anyhow::Result<Vec<Event>>;

    async fn insert_purchase_item(&self, item: &PurchaseItem) -> anyhow::Result<()>;
    async fn find_purchase_item(&self, id: PurchaseItemId)
        -> anyhow::Result<Option<PurchaseItem>>;
    async fn list_purchase_items(&self, event_id: EventId) -> anyhow::Result<Vec<PurchaseItem>>;
}

/// Locations, organizers and bank accounts owned by a team.
#[async_trait]
pub trait TeamResourceRepository: Send + Sync {
    async fn insert_location(&self, location: &Location) -> anyhow::Result<()>;
    async fn find_location(&self, id: LocationId) -> anyhow::Result<Option<Location>>;
    async fn list_locations(&self, team_id: TeamId) -> anyhow::Result<Vec<Location>>;

    async fn insert_organizer(&self, organizer: &Organizer) -> anyhow::Result<()>;
    async fn find_organizer(&self, id: OrganizerId) -> anyhow::Result<Option<Organizer>>;
    async fn list_organizers(&self, team_id: TeamId) -> anyhow::Result<Vec<Organizer>>;

    async fn insert_bank_account(&self, account: &BankAccount) -> anyhow::Result<()>;
    async fn find_bank_account(&self, id: BankAccountId) -> anyhow::Result<Option<BankAccount>>;
    async fn list_bank_accounts(&self, team_id: TeamId) -> anyhow::Result<Vec<BankAccount>>;
}

#[derive(Debug, Clone)]
pub enum RegistrationRef {
    Id(RegistrationId),
    Key(RegistrationKey),
}

#[derive(Debug, Clone)]
pub enum PaymentUpdate {
    NotFound,
    Refused(LifecycleError),
    Applied {
        registration: Registration,
        transition: PaymentTransition,
    },
}

#[async_trait]
pub trait RegistrationRepository: Send + Sync {
    /// Inserts the registration and all its attendees, or nothing.
    async fn create_registration(
        &self,
        registration: &Registration,
        attendees: &[Attendee],
    ) -> anyhow::Result<()>;
    async fn find_registration(
        &self,
        target: &RegistrationRef,
    ) -> anyhow::Result<Option<Registration>>;
    async fn list_registrations_for_event(
        &self,
        event_id: EventId,
    ) -> anyhow::Result<Vec<RegistrationSummary>>;
    async fn list_attendees(&self, registration_id: RegistrationId)
        -> anyhow::Result<Vec<Attendee>>;
    /// Runs a lifecycle command under the row lock and persists the result.
    async fn apply_payment_command(
        &self,
        target: &RegistrationRef,
        command: &PaymentCommand,
        now: DateTime<Utc>,
    ) -> anyhow::Result<PaymentUpdate>;
}

#[async_trait]
pub trait AttendeeRepository: Send + Sync {
    async fn find_attendee_scope(&self, id: AttendeeId) -> anyhow::Result<Option<AttendeeScope>>;
    /// Set-if-unset in one step; `None` when the attendee does not exist.
    async fn mark_checked_in(
        &self,
        id: AttendeeId,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<CheckInOutcome>>;
}
