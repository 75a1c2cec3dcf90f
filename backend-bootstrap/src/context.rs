use std::sync::Arc;

use anyhow::Result;
use tracing::{info, warn};

use backend_application::{AppState, Metrics};
use backend_domain::ports::{
    AttendeeRepository, EventRepository, NotificationService, RegistrationRepository,
    TeamRepository, TeamResourceRepository, UserRepository,
};
use backend_infrastructure::{
    build_mailer, AppConfig, DefaultHealthService, DefaultNotificationService, MemoryStore,
    PostgresStore,
};

pub struct AppContext {
    pub state: AppState,
}

struct Stores {
    users: Arc<dyn UserRepository>,
    teams: Arc<dyn TeamRepository>,
    events: Arc<dyn EventRepository>,
    resources: Arc<dyn TeamResourceRepository>,
    registrations: Arc<dyn RegistrationRepository>,
    attendees: Arc<dyn AttendeeRepository>,
}

impl Stores {
    fn from_store<S>(store: Arc<S>) -> Self
    where
        S: UserRepository
            + TeamRepository
            + EventRepository
            + TeamResourceRepository
            + RegistrationRepository
            + AttendeeRepository
            + 'static,
    {
        Self {
            users: store.clone(),
            teams: store.clone(),
            events: store.clone(),
            resources: store.clone(),
            registrations: store.clone(),
            attendees: store,
        }
    }
}

impl AppContext {
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let runtime_config = config.to_runtime_config();
        let db_config = config.to_db_config();
        let mail_config = config.to_mail_config()?;

        let stores = if db_config.database_url.is_some() {
            let store = Arc::new(PostgresStore::connect(&db_config).await?);
            store.ensure_schema().await?;
            info!("using postgres store");
            Stores::from_store(store)
        } else {
            warn!("database_url is not set; registrations are kept in memory only");
            Stores::from_store(Arc::new(MemoryStore::new()))
        };

        let metrics = Arc::new(Metrics::default());
        let mailer = build_mailer(&mail_config)?;
        info!(transport = mailer.transport_name(), "mail transport ready");
        let notification_service: Arc<dyn NotificationService> =
            Arc::new(DefaultNotificationService::new(mailer, metrics.clone()));
        let health_service = Arc::new(DefaultHealthService::new(
            stores.events.clone(),
            notification_service.clone(),
        ));

        let state = AppState {
            config: runtime_config,
            user_repo: stores.users,
            team_repo: stores.teams,
            event_repo: stores.events,
            resource_repo: stores.resources,
            registration_repo: stores.registrations,
            attendee_repo: stores.attendees,
            notification_service,
            health_service,
            metrics,
        };

        Ok(Self { state })
    }
}
