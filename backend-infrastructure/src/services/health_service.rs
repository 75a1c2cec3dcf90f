use std::sync::Arc;

use async_trait::async_trait;
use backend_domain::ports::{EventRepository, HealthCheckService, NotificationService};

pub struct DefaultHealthService {
    event_repo: Arc<dyn EventRepository>,
    notification_service: Arc<dyn NotificationService>,
}

impl DefaultHealthService {
    pub fn new(
        event_repo: Arc<dyn EventRepository>,
        notification_service: Arc<dyn NotificationService>,
    ) -> Self {
        Self {
            event_repo,
            notification_service,
        }
    }
}

#[async_trait]
impl HealthCheckService for DefaultHealthService {
    async fn check_database(&self) -> anyhow::Result<bool> {
        self.event_repo.ping().await.map(|_| true)
    }

    async fn check_mail_transport(&self) -> anyhow::Result<bool> {
        self.notification_service
            .check_transport()
            .await
            .map(|_| true)
    }
}
