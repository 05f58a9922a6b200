//! # Request Handlers
//!
//! Axum request handlers for the storefront API. Response bodies keep the
//! Japanese messages the storefront displays.

use crate::notify::NotificationWebhookHandler;
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use shop_core::{
    ContactMessage, Email, Mailer, OrderRequest, ReservationRequest, Row, ShopError, ShopResult,
};
use shop_mail::templates;
use shop_stripe::dispatch_webhook_event;
use tracing::{error, info, instrument};

const CHECKOUT_FAILED: &str = "決済セッションの作成に失敗しました";
const PURCHASE_DONE: &str = "購入処理が完了しました";
const PURCHASE_FAILED: &str = "購入処理中にエラーが発生しました";
const RESERVATION_DONE: &str = "予約処理が完了しました";
const RESERVATION_FAILED: &str = "予約処理中にエラーが発生しました";
const CONTACT_SENT: &str = "メールが送信されました。";
const DATA_FETCHED: &str = "データを取得しました！";
const DATA_FAILED: &str = "データ取得に失敗しました";

const MISSING_SIGNATURE: &str = "No stripe-signature header value was provided.";

// =============================================================================
// Response Types
// =============================================================================

/// Create checkout response
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutSessionResponse {
    pub session_id: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Outcome of the mail endpoints
#[derive(Debug, Serialize)]
pub struct MailResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MailResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
            error: None,
        }
    }

    pub fn error(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            error: Some(error.into()),
        }
    }
}

/// `/api/data` response
#[derive(Debug, Serialize)]
pub struct DataResponse {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Vec<Row>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

type Rejection<T> = (StatusCode, Json<T>);

fn internal<T>(body: T) -> Rejection<T> {
    (StatusCode::INTERNAL_SERVER_ERROR, Json(body))
}

/// Plain-text `Webhook Error: <reason>` with the error's status
fn webhook_rejection(err: ShopError) -> (StatusCode, String) {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, format!("Webhook Error: {}", err))
}

/// Send mails in order, stopping at the first failure
async fn send_all(mailer: &dyn Mailer, emails: &[Email]) -> ShopResult<()> {
    for email in emails {
        mailer.send(email).await?;
    }
    Ok(())
}

// =============================================================================
// Handlers
// =============================================================================

pub async fn root() -> &'static str {
    "Hello, API Server!"
}

/// Health check endpoint
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "flower-shop",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Create a hosted checkout session for one product
#[instrument(skip(state, order), fields(product = %order.product.id))]
pub async fn create_checkout_session(
    State(state): State<AppState>,
    Json(order): Json<OrderRequest>,
) -> Result<Json<CheckoutSessionResponse>, Rejection<ErrorResponse>> {
    info!(
        "Creating checkout: product={}, price={}",
        order.product.name, order.product.price
    );

    let session = state
        .payments
        .create_checkout(&order, &state.urls)
        .await
        .map_err(|e| {
            error!("Failed to create checkout: {}", e);
            internal(ErrorResponse::new(CHECKOUT_FAILED))
        })?;

    info!("Created checkout session: {}", session.session_id);

    Ok(Json(CheckoutSessionResponse {
        session_id: session.session_id,
    }))
}

/// Mail the purchase confirmation and the shop notice
#[instrument(skip(state, order), fields(method = order.payment.tag()))]
pub async fn send_purchase(
    State(state): State<AppState>,
    Json(order): Json<OrderRequest>,
) -> Result<Json<MailResponse>, Rejection<MailResponse>> {
    let emails = [
        templates::purchase_confirmation(&order),
        templates::purchase_notice(&order, &state.recipients.admin),
    ];

    send_all(state.mailer.as_ref(), &emails).await.map_err(|e| {
        error!("Failed to send purchase mails: {}", e);
        internal(MailResponse::failed(PURCHASE_FAILED))
    })?;

    Ok(Json(MailResponse::ok(PURCHASE_DONE)))
}

/// Mail the reservation confirmation and the shop notice
#[instrument(skip(state, reservation), fields(kind = reservation.kind_label()))]
pub async fn send_reservation(
    State(state): State<AppState>,
    Json(reservation): Json<ReservationRequest>,
) -> Result<Json<MailResponse>, Rejection<MailResponse>> {
    let emails = [
        templates::reservation_confirmation(&reservation),
        templates::reservation_notice(&reservation, &state.recipients.admin),
    ];

    send_all(state.mailer.as_ref(), &emails).await.map_err(|e| {
        error!("Failed to send reservation mails: {}", e);
        internal(MailResponse::failed(RESERVATION_FAILED))
    })?;

    Ok(Json(MailResponse::ok(RESERVATION_DONE)))
}

/// Forward a contact form message to the shop
#[instrument(skip(state, message))]
pub async fn send_email(
    State(state): State<AppState>,
    Json(message): Json<ContactMessage>,
) -> Result<Json<MailResponse>, Rejection<MailResponse>> {
    let mut emails = vec![templates::contact_message(
        &message,
        &state.recipients.receiver,
    )];
    if state.config.contact_copy_to_sender {
        emails.push(templates::contact_copy(&message));
    }

    send_all(state.mailer.as_ref(), &emails).await.map_err(|e| {
        error!("Failed to send contact mail: {}", e);
        internal(MailResponse::error(e.to_string()))
    })?;

    Ok(Json(MailResponse::ok(CONTACT_SENT)))
}

/// Handle Stripe webhook
#[instrument(skip(state, headers, body))]
pub async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<serde_json::Value>, (StatusCode, String)> {
    let signature = headers
        .get("stripe-signature")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| {
            webhook_rejection(ShopError::WebhookVerificationFailed(
                MISSING_SIGNATURE.to_string(),
            ))
        })?;

    let event = state
        .payments
        .verify_webhook(&body, signature)
        .await
        .map_err(|e| {
            error!("Webhook verification failed: {}", e);
            webhook_rejection(e)
        })?;

    info!(
        "Received webhook: type={:?}, id={}",
        event.event_type, event.event_id
    );

    let handler = NotificationWebhookHandler::new(state.mailer.clone(), &state.recipients.admin);
    if let Err(e) = dispatch_webhook_event(&handler, event).await {
        error!("Webhook handler error: {}", e);
    }

    Ok(Json(serde_json::json!({ "received": true })))
}

/// Every row of the backing table
#[instrument(skip(state))]
pub async fn api_data(
    State(state): State<AppState>,
) -> Result<Json<DataResponse>, Rejection<DataResponse>> {
    let rows = state.table.fetch_all().await.map_err(|e: ShopError| {
        error!("Failed to read table: {}", e);
        internal(DataResponse {
            message: DATA_FAILED.to_string(),
            data: None,
            error: Some(e.to_string()),
        })
    })?;

    Ok(Json(DataResponse {
        message: DATA_FETCHED.to_string(),
        data: Some(rows),
        error: None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mail_response_shapes() {
        let ok = serde_json::to_value(MailResponse::ok(PURCHASE_DONE)).unwrap();
        assert_eq!(ok, serde_json::json!({"success": true, "message": PURCHASE_DONE}));

        let err = serde_json::to_value(MailResponse::error("smtp down")).unwrap();
        assert_eq!(err, serde_json::json!({"success": false, "error": "smtp down"}));
    }

    #[test]
    fn test_webhook_rejection_status() {
        let (status, body) = webhook_rejection(ShopError::WebhookVerificationFailed(
            "Timestamp outside the tolerance zone".into(),
        ));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, "Webhook Error: Timestamp outside the tolerance zone");

        let (status, _) = webhook_rejection(ShopError::Internal("HMAC key rejected".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_checkout_response_is_camel_case() {
        let body = serde_json::to_value(CheckoutSessionResponse {
            session_id: "cs_test_1".into(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"sessionId": "cs_test_1"}));
    }
}
