use std::sync::Arc;

use backend_domain::ports::{
    AttendeeRepository, EventRepository, HealthCheckService, NotificationService,
    RegistrationRepository, TeamRepository, TeamResourceRepository, UserRepository,
};
use backend_domain::RuntimeConfig;

use crate::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub config: RuntimeConfig,
    pub user_repo: Arc<dyn UserRepository>,
    pub team_repo: Arc<dyn TeamRepository>,
    pub event_repo: Arc<dyn EventRepository>,
    pub resource_repo: Arc<dyn TeamResourceRepository>,
    pub registration_repo: Arc<dyn RegistrationRepository>,
    pub attendee_repo: Arc<dyn AttendeeRepository>,
    pub notification_service: Arc<dyn NotificationService>,
    pub health_service: Arc<dyn HealthCheckService>,
    pub metrics: Arc<Metrics>,
}
