// Process-local store used when no database is configured, and by tests

use std::collections::HashSet;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use backend_domain::ports::{
    AttendeeRepository, EventRepository, PaymentUpdate, RegistrationRef, RegistrationRepository,
    TeamRepository, TeamResourceRepository, UserRepository,
};
use backend_domain::{
    apply_payment_command, check_in, normalize_email, Attendee, AttendeeId, AttendeeScope,
    BankAccount, BankAccountId, CheckInOutcome, Event, EventId, Location, LocationId, Organizer,
    OrganizerId, PaymentCommand, PublicKey, PurchaseItem, PurchaseItemId, Registration,
    RegistrationId, RegistrationSummary, Team, TeamId, User, UserId,
};

#[derive(Default)]
struct MemoryData {
    users: Vec<User>,
    teams: Vec<Team>,
    memberships: HashSet<(TeamId, UserId)>,
    events: Vec<Event>,
    purchase_items: Vec<PurchaseItem>,
    locations: Vec<Location>,
    organizers: Vec<Organizer>,
    bank_accounts: Vec<BankAccount>,
    registrations: Vec<Registration>,
    attendees: Vec<Attendee>,
}

impl MemoryData {
    fn registration_mut(&mut self, target: &RegistrationRef) -> Option<&mut Registration> {
        self.registrations.iter_mut().find(|row| match target {
            RegistrationRef::Id(id) => row.id == *id,
            RegistrationRef::Key(key) => row.registration_key == *key,
        })
    }
}

/// Every operation runs under one lock, which gives the same
/// read-decide-write atomicity as the row locks in Postgres.
#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<MemoryData>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn registration_count(&self) -> usize {
        self.data.lock().await.registrations.len()
    }

    pub async fn attendee_count(&self) -> usize {
        self.data.lock().await.attendees.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert_user(&self, user: &User) -> Result<bool> {
        let mut data = self.data.lock().await;
        let email = normalize_email(&user.email);
        if data.users.iter().any(|row| normalize_email(&row.email) == email) {
            return Ok(false);
        }
        data.users.push(user.clone());
        Ok(true)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let data = self.data.lock().await;
        Ok(data.users.iter().find(|row| row.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let email = normalize_email(email);
        let data = self.data.lock().await;
        Ok(data
            .users
            .iter()
            .find(|row| normalize_email(&row.email) == email)
            .cloned())
    }
}

#[async_trait]
impl TeamRepository for MemoryStore {
    async fn create_team(&self, team: &Team, owner: UserId) -> Result<()> {
        let mut data = self.data.lock().await;
        data.teams.push(team.clone());
        data.memberships.insert((team.id, owner));
        Ok(())
    }

    async fn find_team(&self, id: TeamId) -> Result<Option<Team>> {
        let data = self.data.lock().await;
        Ok(data.teams.iter().find(|row| row.id == id).cloned())
    }

    async fn list_teams_for_user(&self, user_id: UserId) -> Result<Vec<Team>> {
        let data = self.data.lock().await;
        Ok(data
            .teams
            .iter()
            .filter(|team| data.memberships.contains(&(team.id, user_id)))
            .cloned()
            .collect())
    }

    async fn is_member(&self, team_id: TeamId, user_id: UserId) -> Result<bool> {
        let data = self.data.lock().await;
        Ok(data.memberships.contains(&(team_id, user_id)))
    }

    async fn add_member(&self, team_id: TeamId, user_id: UserId) -> Result<bool> {
        let mut data = self.data.lock().await;
        Ok(data.memberships.insert((team_id, user_id)))
    }

    async fn list_members(&self, team_id: TeamId) -> Result<Vec<User>> {
        let data = self.data.lock().await;
        Ok(data
            .users
            .iter()
            .filter(|user| data.memberships.contains(&(team_id, user.id)))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn ensure_schema(&self) -> Result<()> {
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn insert_event(&self, event: &Event) -> Result<()> {
        self.data.lock().await.events.push(event.clone());
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        let mut data = self.data.lock().await;
        if let Some(row) = data.events.iter_mut().find(|row| row.id == event.id) {
            *row = event.clone();
        }
        Ok(())
    }

    async fn find_event(&self, id: EventId) -> Result<Option<Event>> {
        let data = self.data.lock().await;
        Ok(data.events.iter().find(|row| row.id == id).cloned())
    }

    async fn find_event_by_public_key(&self, key: &PublicKey) -> Result<Option<Event>> {
        let data = self.data.lock().await;
        Ok(data.events.iter().find(|row| row.public_key == *key).cloned())
    }

    async fn list_events_for_team(&self, team_id: TeamId) -> Result<Vec<Event>> {
        let data = self.data.lock().await;
        Ok(data
            .events
            .iter()
            .filter(|row| row.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn insert_purchase_item(&self, item: &PurchaseItem) -> Result<()> {
        self.data.lock().await.purchase_items.push(item.clone());
        Ok(())
    }

    async fn find_purchase_item(&self, id: PurchaseItemId) -> Result<Option<PurchaseItem>> {
        let data = self.data.lock().await;
        Ok(data.purchase_items.iter().find(|row| row.id == id).cloned())
    }

    async fn list_purchase_items(&self, event_id: EventId) -> Result<Vec<PurchaseItem>> {
        let data = self.data.lock().await;
        Ok(data
            .purchase_items
            .iter()
            .filter(|row| row.event_id == event_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TeamResourceRepository for MemoryStore {
    async fn insert_location(&self, location: &Location) -> Result<()> {
        self.data.lock().await.locations.push(location.clone());
        Ok(())
    }

    async fn find_location(&self, id: LocationId) -> Result<Option<Location>> {
        let data = self.data.lock().await;
        Ok(data.locations.iter().find(|row| row.id == id).cloned())
    }

    async fn list_locations(&self, team_id: TeamId) -> Result<Vec<Location>> {
        let data = self.data.lock().await;
        Ok(data
            .locations
            .iter()
            .filter(|row| row.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn insert_organizer(&self, organizer: &Organizer) -> Result<()> {
        self.data.lock().await.organizers.push(organizer.clone());
        Ok(())
    }

    async fn find_organizer(&self, id: OrganizerId) -> Result<Option<Organizer>> {
        let data = self.data.lock().await;
        Ok(data.organizers.iter().find(|row| row.id == id).cloned())
    }

    async fn list_organizers(&self, team_id: TeamId) -> Result<Vec<Organizer>> {
        let data = self.data.lock().await;
        Ok(data
            .organizers
            .iter()
            .filter(|row| row.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn insert_bank_account(&self, account: &BankAccount) -> Result<()> {
        self.data.lock().await.bank_accounts.push(account.clone());
        Ok(())
    }

    async fn find_bank_account(&self, id: BankAccountId) -> Result<Option<BankAccount>> {
        let data = self.data.lock().await;
        Ok(data.bank_accounts.iter().find(|row| row.id == id).cloned())
    }

    async fn list_bank_accounts(&self, team_id: TeamId) -> Result<Vec<BankAccount>> {
        let data = self.data.lock().await;
        Ok(data
            .bank_accounts
            .iter()
            .filter(|row| row.team_id == team_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RegistrationRepository for MemoryStore {
    async fn create_registration(
        &self,
        registration: &Registration,
        attendees: &[Attendee],
    ) -> Result<()> {
        let mut data = self.data.lock().await;
        if data
            .registrations
            .iter()
            .any(|row| row.registration_key == registration.registration_key)
        {
            anyhow::bail!("registration key collision");
        }
        data.registrations.push(registration.clone());
        data.attendees.extend_from_slice(attendees);
        Ok(())
    }

    async fn find_registration(&self, target: &RegistrationRef) -> Result<Option<Registration>> {
        let mut data = self.data.lock().await;
        Ok(data.registration_mut(target).map(|row| row.clone()))
    }

    async fn list_registrations_for_event(
        &self,
        event_id: EventId,
    ) -> Result<Vec<RegistrationSummary>> {
        let data = self.data.lock().await;
        Ok(data
            .registrations
            .iter()
            .filter(|row| row.event_id == event_id)
            .map(|row| {
                let attendees = data
                    .attendees
                    .iter()
                    .filter(|attendee| attendee.registration_id == row.id);
                let (total, checked_in) = attendees.fold((0u32, 0u32), |(total, done), a| {
                    (total + 1, done + u32::from(a.checked_in))
                });
                RegistrationSummary {
                    registration: row.clone(),
                    attendee_count: total,
                    checked_in_count: checked_in,
                }
            })
            .collect())
    }

    async fn list_attendees(&self, registration_id: RegistrationId) -> Result<Vec<Attendee>> {
        let data = self.data.lock().await;
        Ok(data
            .attendees
            .iter()
            .filter(|row| row.registration_id == registration_id)
            .cloned()
            .collect())
    }

    async fn apply_payment_command(
        &self,
        target: &RegistrationRef,
        command: &PaymentCommand,
        now: DateTime<Utc>,
    ) -> Result<PaymentUpdate> {
        let mut data = self.data.lock().await;
        let Some(row) = data.registration_mut(target) else {
            return Ok(PaymentUpdate::NotFound);
        };
        // Work on a copy so a refused command leaves the row untouched.
        let mut registration = row.clone();
        match apply_payment_command(&mut registration, command, now) {
            Ok(transition) => {
                *row = registration.clone();
                Ok(PaymentUpdate::Applied {
                    registration,
                    transition,
                })
            }
            Err(err) => Ok(PaymentUpdate::Refused(err)),
        }
    }
}

#[async_trait]
impl AttendeeRepository for MemoryStore {
    async fn find_attendee_scope(&self, id: AttendeeId) -> Result<Option<AttendeeScope>> {
        let data = self.data.lock().await;
        let Some(attendee) = data.attendees.iter().find(|row| row.id == id) else {
            return Ok(None);
        };
        let scope = data
            .registrations
            .iter()
            .find(|row| row.id == attendee.registration_id)
            .and_then(|registration| {
                data.events
                    .iter()
                    .find(|event| event.id == registration.event_id)
            })
            .map(|event| AttendeeScope {
                attendee: attendee.clone(),
                event_id: event.id,
                team_id: event.team_id,
            });
        Ok(scope)
    }

    async fn mark_checked_in(
        &self,
        id: AttendeeId,
        now: DateTime<Utc>,
    ) -> Result<Option<CheckInOutcome>> {
        let mut data = self.data.lock().await;
        let Some(attendee) = data.attendees.iter_mut().find(|row| row.id == id) else {
            return Ok(None);
        };
        let outcome = if check_in(attendee, now) {
            CheckInOutcome::CheckedIn(attendee.clone())
        } else {
            CheckInOutcome::AlreadyCheckedIn(attendee.clone())
        };
        Ok(Some(outcome))
    }
}
