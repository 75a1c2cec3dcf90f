// Postgres-backed repositories

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgArguments, PgPool, PgPoolOptions};
use sqlx::query::QueryAs;
use sqlx::{FromRow, Postgres};
use tracing::info;
use uuid::Uuid;

use backend_domain::ports::{
    AttendeeRepository, EventRepository, PaymentUpdate, RegistrationRef, RegistrationRepository,
    TeamRepository, TeamResourceRepository, UserRepository,
};
use backend_domain::{
    apply_payment_command, Attendee, AttendeeId, AttendeeScope, BankAccount, BankAccountId,
    CheckInOutcome, DbConfig, Event, EventId, Location, LocationId, Organizer, OrganizerId,
    PaymentCommand, PublicKey, PurchaseItem, PurchaseItemId, Registration, RegistrationId,
    RegistrationKey, RegistrationSummary, Team, TeamId, User, UserId,
};

const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS users (
        id UUID PRIMARY KEY,
        email TEXT NOT NULL UNIQUE,
        name TEXT NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS teams (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS team_members (
        team_id UUID NOT NULL REFERENCES teams(id),
        user_id UUID NOT NULL REFERENCES users(id),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        PRIMARY KEY (team_id, user_id)
    )"#,
    r#"CREATE TABLE IF NOT EXISTS locations (
        id UUID PRIMARY KEY,
        team_id UUID NOT NULL REFERENCES teams(id),
        name TEXT NOT NULL,
        address TEXT,
        map_url TEXT,
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS organizers (
        id UUID PRIMARY KEY,
        team_id UUID NOT NULL REFERENCES teams(id),
        name TEXT NOT NULL,
        contact_email TEXT,
        contact_phone TEXT,
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS bank_accounts (
        id UUID PRIMARY KEY,
        team_id UUID NOT NULL REFERENCES teams(id),
        bank_name TEXT NOT NULL,
        account_name TEXT NOT NULL,
        account_number TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS events (
        id UUID PRIMARY KEY,
        team_id UUID NOT NULL REFERENCES teams(id),
        public_key TEXT NOT NULL UNIQUE,
        title TEXT NOT NULL,
        description TEXT,
        starts_at TIMESTAMPTZ,
        ends_at TIMESTAMPTZ,
        status TEXT NOT NULL CHECK (status IN ('draft', 'published', 'closed')),
        location_id UUID REFERENCES locations(id),
        organizer_id UUID REFERENCES organizers(id),
        bank_account_id UUID REFERENCES bank_accounts(id),
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ
    )"#,
    r#"CREATE TABLE IF NOT EXISTS purchase_items (
        id UUID PRIMARY KEY,
        event_id UUID NOT NULL REFERENCES events(id),
        name TEXT NOT NULL,
        description TEXT,
        price BIGINT NOT NULL CHECK (price > 0),
        created_at TIMESTAMPTZ NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS registrations (
        id UUID PRIMARY KEY,
        registration_key TEXT NOT NULL UNIQUE,
        event_id UUID NOT NULL REFERENCES events(id),
        contact_name TEXT NOT NULL,
        contact_phone TEXT NOT NULL,
        contact_email TEXT NOT NULL,
        purchase_item_id UUID REFERENCES purchase_items(id),
        total_amount BIGINT NOT NULL CHECK (total_amount > 0),
        payment_method TEXT,
        payment_status TEXT NOT NULL
            CHECK (payment_status IN ('pending', 'reported', 'confirmed', 'rejected')),
        payment_screenshot_url TEXT,
        payment_note TEXT,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ
    )"#,
    r#"CREATE TABLE IF NOT EXISTS attendees (
        id UUID PRIMARY KEY,
        registration_id UUID NOT NULL REFERENCES registrations(id) ON DELETE CASCADE,
        name TEXT NOT NULL,
        role TEXT NOT NULL,
        checked_in BOOLEAN NOT NULL DEFAULT FALSE,
        checked_in_at TIMESTAMPTZ,
        created_at TIMESTAMPTZ NOT NULL,
        updated_at TIMESTAMPTZ,
        CHECK (checked_in = (checked_in_at IS NOT NULL))
    )"#,
    "CREATE INDEX IF NOT EXISTS registrations_event_idx ON registrations (event_id)",
    "CREATE INDEX IF NOT EXISTS attendees_registration_idx ON attendees (registration_id)",
];

const EVENT_COLUMNS: &str = "id, team_id, public_key, title, description, starts_at, ends_at, \
     status, location_id, organizer_id, bank_account_id, created_at, updated_at";
const REGISTRATION_COLUMNS: &str = "id, registration_key, event_id, contact_name, contact_phone, \
     contact_email, purchase_item_id, total_amount, payment_method, payment_status, \
     payment_screenshot_url, payment_note, created_at, updated_at";
const ATTENDEE_COLUMNS: &str =
    "id, registration_id, name, role, checked_in, checked_in_at, created_at, updated_at";

pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(config: &DbConfig) -> Result<Self> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow!("database_url is not configured"))?;
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(url)
            .await
            .context("failed to connect to postgres")?;
        Ok(Self::new(pool))
    }
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    name: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId(row.id),
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct TeamRow {
    id: Uuid,
    name: String,
    created_at: DateTime<Utc>,
}

impl From<TeamRow> for Team {
    fn from(row: TeamRow) -> Self {
        Team {
            id: TeamId(row.id),
            name: row.name,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct EventRow {
    id: Uuid,
    team_id: Uuid,
    public_key: String,
    title: String,
    description: Option<String>,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
    status: String,
    location_id: Option<Uuid>,
    organizer_id: Option<Uuid>,
    bank_account_id: Option<Uuid>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<EventRow> for Event {
    type Error = anyhow::Error;

    fn try_from(row: EventRow) -> Result<Self> {
        Ok(Event {
            id: EventId(row.id),
            team_id: TeamId(row.team_id),
            public_key: PublicKey::from_stored(row.public_key),
            title: row.title,
            description: row.description,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            status: row.status.parse()?,
            location_id: row.location_id.map(LocationId),
            organizer_id: row.organizer_id.map(OrganizerId),
            bank_account_id: row.bank_account_id.map(BankAccountId),
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct PurchaseItemRow {
    id: Uuid,
    event_id: Uuid,
    name: String,
    description: Option<String>,
    price: i64,
    created_at: DateTime<Utc>,
}

impl From<PurchaseItemRow> for PurchaseItem {
    fn from(row: PurchaseItemRow) -> Self {
        PurchaseItem {
            id: PurchaseItemId(row.id),
            event_id: EventId(row.event_id),
            name: row.name,
            description: row.description,
            price: row.price,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct LocationRow {
    id: Uuid,
    team_id: Uuid,
    name: String,
    address: Option<String>,
    map_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<LocationRow> for Location {
    fn from(row: LocationRow) -> Self {
        Location {
            id: LocationId(row.id),
            team_id: TeamId(row.team_id),
            name: row.name,
            address: row.address,
            map_url: row.map_url,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct OrganizerRow {
    id: Uuid,
    team_id: Uuid,
    name: String,
    contact_email: Option<String>,
    contact_phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<OrganizerRow> for Organizer {
    fn from(row: OrganizerRow) -> Self {
        Organizer {
            id: OrganizerId(row.id),
            team_id: TeamId(row.team_id),
            name: row.name,
            contact_email: row.contact_email,
            contact_phone: row.contact_phone,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct BankAccountRow {
    id: Uuid,
    team_id: Uuid,
    bank_name: String,
    account_name: String,
    account_number: String,
    created_at: DateTime<Utc>,
}

impl From<BankAccountRow> for BankAccount {
    fn from(row: BankAccountRow) -> Self {
        BankAccount {
            id: BankAccountId(row.id),
            team_id: TeamId(row.team_id),
            bank_name: row.bank_name,
            account_name: row.account_name,
            account_number: row.account_number,
            created_at: row.created_at,
        }
    }
}

#[derive(FromRow)]
struct RegistrationRow {
    id: Uuid,
    registration_key: String,
    event_id: Uuid,
    contact_name: String,
    contact_phone: String,
    contact_email: String,
    purchase_item_id: Option<Uuid>,
    total_amount: i64,
    payment_method: Option<String>,
    payment_status: String,
    payment_screenshot_url: Option<String>,
    payment_note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<RegistrationRow> for Registration {
    type Error = anyhow::Error;

    fn try_from(row: RegistrationRow) -> Result<Self> {
        Ok(Registration {
            id: RegistrationId(row.id),
            registration_key: RegistrationKey::from_stored(row.registration_key),
            event_id: EventId(row.event_id),
            contact_name: row.contact_name,
            contact_phone: row.contact_phone,
            contact_email: row.contact_email,
            purchase_item_id: row.purchase_item_id.map(PurchaseItemId),
            total_amount: row.total_amount,
            payment_method: row.payment_method.map(|value| value.parse()).transpose()?,
            payment_status: row.payment_status.parse()?,
            payment_screenshot_url: row.payment_screenshot_url,
            payment_note: row.payment_note,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct RegistrationSummaryRow {
    #[sqlx(flatten)]
    registration: RegistrationRow,
    attendee_count: i64,
    checked_in_count: i64,
}

#[derive(FromRow)]
struct AttendeeRow {
    id: Uuid,
    registration_id: Uuid,
    name: String,
    role: String,
    checked_in: bool,
    checked_in_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<AttendeeRow> for Attendee {
    type Error = anyhow::Error;

    fn try_from(row: AttendeeRow) -> Result<Self> {
        Ok(Attendee {
            id: AttendeeId(row.id),
            registration_id: RegistrationId(row.registration_id),
            name: row.name,
            role: row.role.parse()?,
            checked_in: row.checked_in,
            checked_in_at: row.checked_in_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct AttendeeScopeRow {
    #[sqlx(flatten)]
    attendee: AttendeeRow,
    event_id: Uuid,
    team_id: Uuid,
}

fn select_registration<'q>(
    sql: &'q str,
    target: &'q RegistrationRef,
) -> QueryAs<'q, Postgres, RegistrationRow, PgArguments> {
    let query = sqlx::query_as::<_, RegistrationRow>(sql);
    match target {
        RegistrationRef::Id(id) => query.bind(id.0),
        RegistrationRef::Key(key) => query.bind(key.as_str()),
    }
}

fn registration_lookup_sql(target: &RegistrationRef, lock: bool) -> String {
    let column = match target {
        RegistrationRef::Id(_) => "id",
        RegistrationRef::Key(_) => "registration_key",
    };
    format!(
        "SELECT {} FROM registrations WHERE {} = $1{}",
        REGISTRATION_COLUMNS,
        column,
        if lock { " FOR UPDATE" } else { "" }
    )
}

fn count(value: i64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

#[async_trait]
impl UserRepository for PostgresStore {
    async fn insert_user(&self, user: &User) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO users (id, email, name, password_hash, created_at) \
             VALUES ($1, $2, $3, $4, $5) ON CONFLICT (email) DO NOTHING",
        )
        .bind(user.id.0)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn find_user(&self, id: UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }
}

#[async_trait]
impl TeamRepository for PostgresStore {
    async fn create_team(&self, team: &Team, owner: UserId) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("INSERT INTO teams (id, name, created_at) VALUES ($1, $2, $3)")
            .bind(team.id.0)
            .bind(&team.name)
            .bind(team.created_at)
            .execute(&mut *tx)
            .await?;
        sqlx::query("INSERT INTO team_members (team_id, user_id) VALUES ($1, $2)")
            .bind(team.id.0)
            .bind(owner.0)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }

    async fn find_team(&self, id: TeamId) -> Result<Option<Team>> {
        let row =
            sqlx::query_as::<_, TeamRow>("SELECT id, name, created_at FROM teams WHERE id = $1")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(Team::from))
    }

    async fn list_teams_for_user(&self, user_id: UserId) -> Result<Vec<Team>> {
        let rows = sqlx::query_as::<_, TeamRow>(
            "SELECT t.id, t.name, t.created_at FROM teams t \
             JOIN team_members m ON m.team_id = t.id \
             WHERE m.user_id = $1 ORDER BY t.created_at",
        )
        .bind(user_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Team::from).collect())
    }

    async fn is_member(&self, team_id: TeamId, user_id: UserId) -> Result<bool> {
        let found: Option<i32> = sqlx::query_scalar(
            "SELECT 1 FROM team_members WHERE team_id = $1 AND user_id = $2",
        )
        .bind(team_id.0)
        .bind(user_id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(found.is_some())
    }

    async fn add_member(&self, team_id: TeamId, user_id: UserId) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO team_members (team_id, user_id) VALUES ($1, $2) \
             ON CONFLICT (team_id, user_id) DO NOTHING",
        )
        .bind(team_id.0)
        .bind(user_id.0)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn list_members(&self, team_id: TeamId) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.email, u.name, u.password_hash, u.created_at FROM users u \
             JOIN team_members m ON m.user_id = u.id \
             WHERE m.team_id = $1 ORDER BY m.created_at",
        )
        .bind(team_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(User::from).collect())
    }
}

#[async_trait]
impl EventRepository for PostgresStore {
    async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        info!("database schema ready");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert_event(&self, event: &Event) -> Result<()> {
        sqlx::query(&format!(
            "INSERT INTO events ({EVENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)"
        ))
        .bind(event.id.0)
        .bind(event.team_id.0)
        .bind(event.public_key.as_str())
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.status.as_str())
        .bind(event.location_id.map(|id| id.0))
        .bind(event.organizer_id.map(|id| id.0))
        .bind(event.bank_account_id.map(|id| id.0))
        .bind(event.created_at)
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update_event(&self, event: &Event) -> Result<()> {
        sqlx::query(
            "UPDATE events SET title = $2, description = $3, starts_at = $4, ends_at = $5, \
             status = $6, location_id = $7, organizer_id = $8, bank_account_id = $9, \
             updated_at = $10 WHERE id = $1",
        )
        .bind(event.id.0)
        .bind(&event.title)
        .bind(&event.description)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.status.as_str())
        .bind(event.location_id.map(|id| id.0))
        .bind(event.organizer_id.map(|id| id.0))
        .bind(event.bank_account_id.map(|id| id.0))
        .bind(event.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_event(&self, id: EventId) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Event::try_from).transpose()
    }

    async fn find_event_by_public_key(&self, key: &PublicKey) -> Result<Option<Event>> {
        let row = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE public_key = $1"
        ))
        .bind(key.as_str())
        .fetch_optional(&self.pool)
        .await?;
        row.map(Event::try_from).transpose()
    }

    async fn list_events_for_team(&self, team_id: TeamId) -> Result<Vec<Event>> {
        let rows = sqlx::query_as::<_, EventRow>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE team_id = $1 \
             ORDER BY starts_at DESC NULLS LAST, created_at DESC"
        ))
        .bind(team_id.0)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Event::try_from).collect()
    }

    async fn insert_purchase_item(&self, item: &PurchaseItem) -> Result<()> {
        sqlx::query(
            "INSERT INTO purchase_items (id, event_id, name, description, price, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(item.id.0)
        .bind(item.event_id.0)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_purchase_item(&self, id: PurchaseItemId) -> Result<Option<PurchaseItem>> {
        let row = sqlx::query_as::<_, PurchaseItemRow>(
            "SELECT id, event_id, name, description, price, created_at \
             FROM purchase_items WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(PurchaseItem::from))
    }

    async fn list_purchase_items(&self, event_id: EventId) -> Result<Vec<PurchaseItem>> {
        let rows = sqlx::query_as::<_, PurchaseItemRow>(
            "SELECT id, event_id, name, description, price, created_at \
             FROM purchase_items WHERE event_id = $1 ORDER BY created_at",
        )
        .bind(event_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(PurchaseItem::from).collect())
    }
}

#[async_trait]
impl TeamResourceRepository for PostgresStore {
    async fn insert_location(&self, location: &Location) -> Result<()> {
        sqlx::query(
            "INSERT INTO locations (id, team_id, name, address, map_url, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(location.id.0)
        .bind(location.team_id.0)
        .bind(&location.name)
        .bind(&location.address)
        .bind(&location.map_url)
        .bind(location.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_location(&self, id: LocationId) -> Result<Option<Location>> {
        let row = sqlx::query_as::<_, LocationRow>(
            "SELECT id, team_id, name, address, map_url, created_at FROM locations WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Location::from))
    }

    async fn list_locations(&self, team_id: TeamId) -> Result<Vec<Location>> {
        let rows = sqlx::query_as::<_, LocationRow>(
            "SELECT id, team_id, name, address, map_url, created_at FROM locations \
             WHERE team_id = $1 ORDER BY name",
        )
        .bind(team_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Location::from).collect())
    }

    async fn insert_organizer(&self, organizer: &Organizer) -> Result<()> {
        sqlx::query(
            "INSERT INTO organizers (id, team_id, name, contact_email, contact_phone, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(organizer.id.0)
        .bind(organizer.team_id.0)
        .bind(&organizer.name)
        .bind(&organizer.contact_email)
        .bind(&organizer.contact_phone)
        .bind(organizer.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_organizer(&self, id: OrganizerId) -> Result<Option<Organizer>> {
        let row = sqlx::query_as::<_, OrganizerRow>(
            "SELECT id, team_id, name, contact_email, contact_phone, created_at \
             FROM organizers WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Organizer::from))
    }

    async fn list_organizers(&self, team_id: TeamId) -> Result<Vec<Organizer>> {
        let rows = sqlx::query_as::<_, OrganizerRow>(
            "SELECT id, team_id, name, contact_email, contact_phone, created_at \
             FROM organizers WHERE team_id = $1 ORDER BY name",
        )
        .bind(team_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Organizer::from).collect())
    }

    async fn insert_bank_account(&self, account: &BankAccount) -> Result<()> {
        sqlx::query(
            "INSERT INTO bank_accounts \
             (id, team_id, bank_name, account_name, account_number, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(account.id.0)
        .bind(account.team_id.0)
        .bind(&account.bank_name)
        .bind(&account.account_name)
        .bind(&account.account_number)
        .bind(account.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_bank_account(&self, id: BankAccountId) -> Result<Option<BankAccount>> {
        let row = sqlx::query_as::<_, BankAccountRow>(
            "SELECT id, team_id, bank_name, account_name, account_number, created_at \
             FROM bank_accounts WHERE id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(BankAccount::from))
    }

    async fn list_bank_accounts(&self, team_id: TeamId) -> Result<Vec<BankAccount>> {
        let rows = sqlx::query_as::<_, BankAccountRow>(
            "SELECT id, team_id, bank_name, account_name, account_number, created_at \
             FROM bank_accounts WHERE team_id = $1 ORDER BY bank_name",
        )
        .bind(team_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(BankAccount::from).collect())
    }
}

#[async_trait]
impl RegistrationRepository for PostgresStore {
    async fn create_registration(
        &self,
        registration: &Registration,
        attendees: &[Attendee],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query(&format!(
            "INSERT INTO registrations ({REGISTRATION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)"
        ))
        .bind(registration.id.0)
        .bind(registration.registration_key.as_str())
        .bind(registration.event_id.0)
        .bind(&registration.contact_name)
        .bind(&registration.contact_phone)
        .bind(&registration.contact_email)
        .bind(registration.purchase_item_id.map(|id| id.0))
        .bind(registration.total_amount)
        .bind(registration.payment_method.map(|method| method.as_str()))
        .bind(registration.payment_status.as_str())
        .bind(&registration.payment_screenshot_url)
        .bind(&registration.payment_note)
        .bind(registration.created_at)
        .bind(registration.updated_at)
        .execute(&mut *tx)
        .await?;

        for attendee in attendees {
            sqlx::query(&format!(
                "INSERT INTO attendees ({ATTENDEE_COLUMNS}) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)"
            ))
            .bind(attendee.id.0)
            .bind(attendee.registration_id.0)
            .bind(&attendee.name)
            .bind(attendee.role.as_str())
            .bind(attendee.checked_in)
            .bind(attendee.checked_in_at)
            .bind(attendee.created_at)
            .bind(attendee.updated_at)
            .execute(&mut *tx)
            .await?;
        }
        // Dropping the transaction on any error above rolls everything back.
        tx.commit().await?;
        Ok(())
    }

    async fn find_registration(&self, target: &RegistrationRef) -> Result<Option<Registration>> {
        let sql = registration_lookup_sql(target, false);
        let row = select_registration(&sql, target)
            .fetch_optional(&self.pool)
            .await?;
        row.map(Registration::try_from).transpose()
    }

    async fn list_registrations_for_event(
        &self,
        event_id: EventId,
    ) -> Result<Vec<RegistrationSummary>> {
        let columns = REGISTRATION_COLUMNS
            .split(", ")
            .map(|column| format!("r.{}", column.trim()))
            .collect::<Vec<_>>()
            .join(", ");
        let rows = sqlx::query_as::<_, RegistrationSummaryRow>(&format!(
            "SELECT {columns}, \
             COUNT(a.id) AS attendee_count, \
             COUNT(a.id) FILTER (WHERE a.checked_in) AS checked_in_count \
             FROM registrations r LEFT JOIN attendees a ON a.registration_id = r.id \
             WHERE r.event_id = $1 GROUP BY r.id ORDER BY r.created_at"
        ))
        .bind(event_id.0)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| {
                Ok(RegistrationSummary {
                    registration: Registration::try_from(row.registration)?,
                    attendee_count: count(row.attendee_count),
                    checked_in_count: count(row.checked_in_count),
                })
            })
            .collect()
    }

    async fn list_attendees(&self, registration_id: RegistrationId) -> Result<Vec<Attendee>> {
        let rows = sqlx::query_as::<_, AttendeeRow>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE registration_id = $1 \
             ORDER BY created_at, id"
        ))
        .bind(registration_id.0)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Attendee::try_from).collect()
    }

    async fn apply_payment_command(
        &self,
        target: &RegistrationRef,
        command: &PaymentCommand,
        now: DateTime<Utc>,
    ) -> Result<PaymentUpdate> {
        let mut tx = self.pool.begin().await?;
        let sql = registration_lookup_sql(target, true);
        let Some(row) = select_registration(&sql, target)
            .fetch_optional(&mut *tx)
            .await?
        else {
            tx.rollback().await?;
            return Ok(PaymentUpdate::NotFound);
        };
        let mut registration = Registration::try_from(row)?;

        let transition = match apply_payment_command(&mut registration, command, now) {
            Ok(transition) => transition,
            Err(err) => {
                tx.rollback().await?;
                return Ok(PaymentUpdate::Refused(err));
            }
        };

        sqlx::query(
            "UPDATE registrations SET payment_status = $2, payment_screenshot_url = $3, \
             payment_note = $4, updated_at = $5 WHERE id = $1",
        )
        .bind(registration.id.0)
        .bind(registration.payment_status.as_str())
        .bind(&registration.payment_screenshot_url)
        .bind(&registration.payment_note)
        .bind(registration.updated_at)
        .execute(&mut *tx)
        .await?;
        tx.commit().await?;

        Ok(PaymentUpdate::Applied {
            registration,
            transition,
        })
    }
}

#[async_trait]
impl AttendeeRepository for PostgresStore {
    async fn find_attendee_scope(&self, id: AttendeeId) -> Result<Option<AttendeeScope>> {
        let row = sqlx::query_as::<_, AttendeeScopeRow>(
            "SELECT a.id, a.registration_id, a.name, a.role, a.checked_in, a.checked_in_at, \
             a.created_at, a.updated_at, e.id AS event_id, e.team_id \
             FROM attendees a \
             JOIN registrations r ON r.id = a.registration_id \
             JOIN events e ON e.id = r.event_id \
             WHERE a.id = $1",
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|row| {
            Ok(AttendeeScope {
                attendee: Attendee::try_from(row.attendee)?,
                event_id: EventId(row.event_id),
                team_id: TeamId(row.team_id),
            })
        })
        .transpose()
    }

    async fn mark_checked_in(
        &self,
        id: AttendeeId,
        now: DateTime<Utc>,
    ) -> Result<Option<CheckInOutcome>> {
        // Only the caller whose UPDATE matched gets a row back.
        let updated = sqlx::query_as::<_, AttendeeRow>(&format!(
            "UPDATE attendees SET checked_in = TRUE, checked_in_at = $2, updated_at = $2 \
             WHERE id = $1 AND checked_in = FALSE RETURNING {ATTENDEE_COLUMNS}"
        ))
        .bind(id.0)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        if let Some(row) = updated {
            return Ok(Some(CheckInOutcome::CheckedIn(Attendee::try_from(row)?)));
        }

        let existing = sqlx::query_as::<_, AttendeeRow>(&format!(
            "SELECT {ATTENDEE_COLUMNS} FROM attendees WHERE id = $1"
        ))
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;
        existing
            .map(|row| Attendee::try_from(row).map(CheckInOutcome::AlreadyCheckedIn))
            .transpose()
    }
}
