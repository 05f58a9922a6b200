//! # Stripe Webhook Handling
//!
//! Typed view of `checkout.session.completed` and a handler trait the API
//! layer implements to react to verified events.

use async_trait::async_trait;
use shop_core::{OrderRequest, ShopError, ShopResult, WebhookEvent, WebhookEventType};
use std::collections::HashMap;
use tracing::{debug, info};

/// Parsed checkout.session.completed event data
#[derive(Debug, Clone)]
pub struct CheckoutCompletedData {
    pub session_id: String,
    pub payment_intent_id: Option<String>,
    pub customer_email: Option<String>,
    pub amount_total: i64,
    pub payment_status: String,
    pub metadata: HashMap<String, String>,
}

impl CheckoutCompletedData {
    /// Parse from a webhook event
    pub fn from_event(event: &WebhookEvent) -> ShopResult<Self> {
        let obj = event
            .raw_data
            .as_ref()
            .and_then(|raw| raw.as_object())
            .ok_or_else(|| ShopError::WebhookParseError("Missing session object".to_string()))?;

        let session_id = event
            .session_id
            .clone()
            .ok_or_else(|| ShopError::WebhookParseError("Missing session id".to_string()))?;

        let payment_status = obj
            .get("payment_status")
            .and_then(|v| v.as_str())
            .unwrap_or("unknown")
            .to_string();

        let metadata = obj
            .get("metadata")
            .and_then(|m| m.as_object())
            .map(|m| {
                m.iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            session_id,
            payment_intent_id: event.payment_intent_id.clone(),
            customer_email: event.customer_email.clone(),
            amount_total: event.amount_paid.unwrap_or(0),
            payment_status,
            metadata,
        })
    }

    /// Check if payment was successful
    pub fn is_paid(&self) -> bool {
        self.payment_status == "paid"
    }

    /// The order attached at session creation. The session's customer email
    /// wins over the metadata copy.
    pub fn order(&self) -> OrderRequest {
        let mut order = OrderRequest::from_metadata(&self.metadata);
        if let Some(email) = &self.customer_email {
            order.email = email.clone();
        }
        order
    }
}

/// Webhook event handler trait
///
/// Implement this trait to react to verified events.
#[async_trait]
#[allow(unused_variables)]
pub trait WebhookHandler: Send + Sync {
    /// Called when a checkout session is completed
    async fn on_checkout_completed(&self, data: CheckoutCompletedData) -> ShopResult<()> {
        info!(
            "Checkout completed: session={}, amount={}",
            data.session_id, data.amount_total
        );
        Ok(())
    }

    /// Called for every other event type
    async fn on_unhandled_event(&self, event: &WebhookEvent) -> ShopResult<()> {
        info!("Unhandled webhook event type: {:?}", event.event_type);
        Ok(())
    }
}

/// Dispatch a webhook event to the appropriate handler method
pub async fn dispatch_webhook_event(
    handler: &dyn WebhookHandler,
    event: WebhookEvent,
) -> ShopResult<()> {
    debug!("Dispatching webhook event {}", event.event_id);
    match &event.event_type {
        WebhookEventType::CheckoutCompleted => {
            let data = CheckoutCompletedData::from_event(&event)?;
            handler.on_checkout_completed(data).await
        }
        WebhookEventType::Other(_) => handler.on_unhandled_event(&event).await,
    }
}
