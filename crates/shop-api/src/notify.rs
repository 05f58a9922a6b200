//! # Payment Notifications
//!
//! Webhook handler that mails the customer receipt and the shop notice when
//! a hosted checkout completes.

use async_trait::async_trait;
use shop_core::{BoxedMailer, ShopResult, Yen};
use shop_mail::templates;
use shop_stripe::{CheckoutCompletedData, WebhookHandler};
use tracing::{error, info, warn};

pub struct NotificationWebhookHandler {
    mailer: BoxedMailer,
    admin_email: String,
}

impl NotificationWebhookHandler {
    pub fn new(mailer: BoxedMailer, admin_email: impl Into<String>) -> Self {
        Self {
            mailer,
            admin_email: admin_email.into(),
        }
    }
}

#[async_trait]
impl WebhookHandler for NotificationWebhookHandler {
    /// Mail failures never fail the webhook; the admin notice is skipped
    /// when the customer receipt could not be sent.
    async fn on_checkout_completed(&self, data: CheckoutCompletedData) -> ShopResult<()> {
        if !data.is_paid() {
            warn!(
                "Checkout {} completed with payment_status={}",
                data.session_id, data.payment_status
            );
        }

        let order = data.order();
        let amount = Yen(u64::try_from(data.amount_total).unwrap_or(0));
        let payment_id = data.payment_intent_id.clone().unwrap_or_default();

        let receipt = templates::payment_completed_confirmation(&order, amount);
        if let Err(e) = self.mailer.send(&receipt).await {
            error!("Failed to send payment receipt for {}: {}", data.session_id, e);
            return Ok(());
        }

        let notice =
            templates::payment_completed_notice(&order, amount, &payment_id, &self.admin_email);
        if let Err(e) = self.mailer.send(&notice).await {
            error!("Failed to send payment notice for {}: {}", data.session_id, e);
            return Ok(());
        }

        info!(
            "Payment mails sent: session={}, amount={}",
            data.session_id, amount
        );
        Ok(())
    }
}
