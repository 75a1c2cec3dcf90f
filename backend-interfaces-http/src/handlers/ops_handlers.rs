use axum::extract::{Query, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use tokio::time::{timeout, Duration};
use tracing::error;

use backend_application::AppState;
use backend_domain::NotificationDeliveryRecord;

use crate::error::HttpError;
use crate::middleware::authorize_ops;

#[derive(serde::Serialize)]
struct MailStatus {
    status: String,
    transport: String,
}

#[derive(serde::Deserialize)]
pub struct DeliveryQuery {
    pub limit: Option<usize>,
}

pub async fn mail_transport_check(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let transport = state.notification_service.transport_name().to_string();
    if !authorize_ops(&state.config, &headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(MailStatus {
                status: "unauthorized".to_string(),
                transport,
            }),
        )
            .into_response();
    }

    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let (status_code, status) = match timeout(
        Duration::from_secs(timeout_secs),
        state.health_service.check_mail_transport(),
    )
    .await
    {
        Ok(Ok(_)) => (StatusCode::OK, "ok"),
        Ok(Err(err)) => {
            error!("mail transport check failed: {}", err);
            (StatusCode::SERVICE_UNAVAILABLE, "error")
        }
        Err(_) => {
            error!("mail transport check timeout after {}s", timeout_secs);
            (StatusCode::SERVICE_UNAVAILABLE, "timeout")
        }
    };
    (
        status_code,
        Json(MailStatus {
            status: status.to_string(),
            transport,
        }),
    )
        .into_response()
}

pub async fn list_notification_deliveries(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<DeliveryQuery>,
) -> Result<Json<Vec<NotificationDeliveryRecord>>, HttpError> {
    if !authorize_ops(&state.config, &headers) {
        return Err(HttpError::Unauthenticated);
    }
    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let deliveries = state.notification_service.list_deliveries(limit).await;
    Ok(Json(deliveries))
}

pub async fn health_live() -> StatusCode {
    StatusCode::OK
}

pub async fn health_ready(State(state): State<AppState>) -> StatusCode {
    let timeout_secs = state.config.request_timeout_seconds.max(1);
    let timeout_duration = Duration::from_secs(timeout_secs);
    match timeout(timeout_duration, state.health_service.check_database()).await {
        Ok(Ok(true)) => StatusCode::OK,
        Ok(Ok(false)) => StatusCode::SERVICE_UNAVAILABLE,
        Ok(Err(err)) => {
            error!("ready check failed: {}", err);
            StatusCode::SERVICE_UNAVAILABLE
        }
        Err(_) => {
            error!("ready check timeout after {}s", timeout_secs);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

pub async fn metrics_prometheus(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorize_ops(&state.config, &headers) {
        return (StatusCode::UNAUTHORIZED, "unauthorized".to_string()).into_response();
    }
    let payload = state.metrics.render_prometheus();
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/plain; version=0.0.4; charset=utf-8"),
    );
    (headers, payload).into_response()
}
