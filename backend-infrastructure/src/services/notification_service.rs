use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use backend_application::Metrics;
use backend_domain::ports::{Mailer, NotificationService};
use backend_domain::{NotificationDeliveryRecord, PaymentConfirmationNotice};

const MAX_DELIVERY_RECORDS: usize = 200;

/// Sends on a spawned task so the triggering request never waits on mail.
pub struct DefaultNotificationService {
    mailer: Arc<dyn Mailer>,
    metrics: Arc<Metrics>,
    deliveries: Arc<Mutex<VecDeque<NotificationDeliveryRecord>>>,
}

impl DefaultNotificationService {
    pub fn new(mailer: Arc<dyn Mailer>, metrics: Arc<Metrics>) -> Self {
        Self {
            mailer,
            metrics,
            deliveries: Arc::new(Mutex::new(VecDeque::new())),
        }
    }
}

#[async_trait]
impl NotificationService for DefaultNotificationService {
    fn spawn_payment_confirmation(&self, notice: PaymentConfirmationNotice) {
        let mailer = self.mailer.clone();
        let metrics = self.metrics.clone();
        let deliveries = self.deliveries.clone();
        tokio::spawn(async move {
            let email = notice.to_email();
            let result = mailer.send(&email).await;
            metrics.record_notification(result.is_ok());
            let error = match &result {
                Ok(()) => {
                    info!(registration_id = %notice.registration_id, "payment confirmation sent");
                    None
                }
                Err(err) => {
                    warn!(
                        registration_id = %notice.registration_id,
                        "payment confirmation email failed: {}", err
                    );
                    Some(err.to_string())
                }
            };
            let mut records = deliveries.lock().await;
            records.push_back(NotificationDeliveryRecord {
                registration_id: notice.registration_id,
                recipient: email.to,
                transport: mailer.transport_name().to_string(),
                success: error.is_none(),
                error,
                attempted_at: Utc::now(),
            });
            while records.len() > MAX_DELIVERY_RECORDS {
                records.pop_front();
            }
        });
    }

    async fn list_deliveries(&self, limit: usize) -> Vec<NotificationDeliveryRecord> {
        let records = self.deliveries.lock().await;
        records.iter().rev().take(limit).cloned().collect()
    }

    async fn check_transport(&self) -> anyhow::Result<()> {
        self.mailer.check().await
    }

    fn transport_name(&self) -> &'static str {
        self.mailer.transport_name()
    }
}
