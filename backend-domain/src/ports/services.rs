use async_trait::async_trait;

use crate::entities::{NotificationDeliveryRecord, OutboundEmail, PaymentConfirmationNotice};

#[async_trait]
pub trait Mailer: Send + Sync {
    fn transport_name(&self) -> &'static str;
    async fn send(&self, email: &OutboundEmail) -> anyhow::Result<()>;
    /// Reachability probe for the ops endpoint; sends nothing.
    async fn check(&self) -> anyhow::Result<()>;
}

/// Best-effort outbound notifications. Spawning never fails the caller.
#[async_trait]
pub trait NotificationService: Send + Sync {
    fn spawn_payment_confirmation(&self, notice: PaymentConfirmationNotice);
    async fn list_deliveries(&self, limit: usize) -> Vec<NotificationDeliveryRecord>;
    async fn check_transport(&self) -> anyhow::Result<()>;
    fn transport_name(&self) -> &'static str;
}

#[async_trait]
pub trait HealthCheckService: Send + Sync {
    async fn check_database(&self) -> anyhow::Result<bool>;
    async fn check_mail_transport(&self) -> anyhow::Result<bool>;
}
