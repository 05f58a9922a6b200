//! # Stripe Checkout Sessions
//!
//! Implementation of the Stripe Checkout Sessions API for single-product
//! orders shipped within Japan.

use crate::config::StripeConfig;
use crate::signature::{verify_signature, DEFAULT_TOLERANCE_SECS};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use shop_core::{
    CheckoutSession, CheckoutUrls, OrderRequest, PaymentStrategy, ShopError, ShopResult,
    WebhookEvent, WebhookEventType, Yen,
};
use std::collections::HashMap;
use tracing::{debug, error, info, instrument, warn};

const PROVIDER: &str = "stripe";

/// Countries the shop delivers to
const SHIPPING_COUNTRIES: &[&str] = &["JP"];

/// Free standard delivery offered on every order
const SHIPPING_DISPLAY_NAME: &str = "通常配送";
const DELIVERY_MIN_BUSINESS_DAYS: u32 = 3;
const DELIVERY_MAX_BUSINESS_DAYS: u32 = 5;

/// Stripe Checkout Session strategy
///
/// Uses Stripe's hosted checkout page; card data never reaches this server.
pub struct StripeCheckoutStrategy {
    config: StripeConfig,
    client: Client,
}

impl StripeCheckoutStrategy {
    /// Create a new Stripe checkout strategy
    pub fn new(config: StripeConfig) -> ShopResult<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| ShopError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "Stripe client ready: mode={}",
            if config.is_test_mode() { "test" } else { "live" }
        );

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> ShopResult<Self> {
        let config = StripeConfig::from_env()?;
        Self::new(config)
    }

    /// Form parameters for `POST /v1/checkout/sessions`
    fn build_form_params(order: &OrderRequest, urls: &CheckoutUrls) -> Vec<(String, String)> {
        let product = &order.product;
        let rate = "shipping_options[0][shipping_rate_data]";

        let mut params: Vec<(String, String)> = vec![
            ("mode".into(), "payment".into()),
            ("payment_method_types[0]".into(), "card".into()),
            ("line_items[0][price_data][currency]".into(), Yen::CURRENCY.into()),
            (
                "line_items[0][price_data][product_data][name]".into(),
                product.name.clone(),
            ),
            (
                "line_items[0][price_data][product_data][description]".into(),
                product.description(),
            ),
            (
                "line_items[0][price_data][unit_amount]".into(),
                product.price.amount().to_string(),
            ),
            ("line_items[0][quantity]".into(), "1".into()),
            ("success_url".into(), urls.success_url()),
            ("cancel_url".into(), urls.cancel_url()),
        ];

        if !order.email.is_empty() {
            params.push(("customer_email".into(), order.email.clone()));
        }

        for (i, country) in SHIPPING_COUNTRIES.iter().enumerate() {
            params.push((
                format!("shipping_address_collection[allowed_countries][{}]", i),
                country.to_string(),
            ));
        }

        params.extend([
            (format!("{}[type]", rate), "fixed_amount".to_string()),
            (format!("{}[fixed_amount][amount]", rate), "0".to_string()),
            (
                format!("{}[fixed_amount][currency]", rate),
                Yen::CURRENCY.to_string(),
            ),
            (
                format!("{}[display_name]", rate),
                SHIPPING_DISPLAY_NAME.to_string(),
            ),
            (
                format!("{}[delivery_estimate][minimum][unit]", rate),
                "business_day".to_string(),
            ),
            (
                format!("{}[delivery_estimate][minimum][value]", rate),
                DELIVERY_MIN_BUSINESS_DAYS.to_string(),
            ),
            (
                format!("{}[delivery_estimate][maximum][unit]", rate),
                "business_day".to_string(),
            ),
            (
                format!("{}[delivery_estimate][maximum][value]", rate),
                DELIVERY_MAX_BUSINESS_DAYS.to_string(),
            ),
        ]);

        for (key, value) in order.to_metadata() {
            params.push((format!("metadata[{}]", key), value));
        }

        params
    }
}

#[async_trait]
impl PaymentStrategy for StripeCheckoutStrategy {
    #[instrument(skip(self, order, urls), fields(product_id = %order.product.id))]
    async fn create_checkout(
        &self,
        order: &OrderRequest,
        urls: &CheckoutUrls,
    ) -> ShopResult<CheckoutSession> {
        let form_params = Self::build_form_params(order, urls);

        debug!(
            "Creating Stripe checkout session: product={}, amount={}",
            order.product.name, order.product.price
        );

        let url = format!("{}/v1/checkout/sessions", self.config.api_base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.config.auth_header())
            .header("Stripe-Version", &self.config.api_version)
            .form(&form_params)
            .send()
            .await
            .map_err(|e| ShopError::NetworkError(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ShopError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Stripe API error: status={}, body={}", status, body);

            let message = serde_json::from_str::<StripeErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {}: {}", status, body));

            return Err(ShopError::ProviderError {
                provider: PROVIDER.to_string(),
                message,
            });
        }

        let session_response: StripeCheckoutSessionResponse = serde_json::from_str(&body)
            .map_err(|e| {
                ShopError::Serialization(format!("Failed to parse Stripe response: {}", e))
            })?;

        info!("Created Stripe checkout session: id={}", session_response.id);

        Ok(CheckoutSession {
            session_id: session_response.id,
            provider: PROVIDER.to_string(),
            checkout_url: session_response.url,
            expires_at: session_response
                .expires_at
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            metadata: session_response.metadata,
            created_at: Utc::now(),
        })
    }

    #[instrument(skip(self, payload, signature))]
    async fn verify_webhook(&self, payload: &[u8], signature: &str) -> ShopResult<WebhookEvent> {
        verify_signature(
            payload,
            signature,
            &self.config.webhook_secret,
            DEFAULT_TOLERANCE_SECS,
            Utc::now().timestamp(),
        )?;

        let value: serde_json::Value = serde_json::from_slice(payload).map_err(|e| {
            ShopError::WebhookParseError(format!("Failed to parse webhook: {}", e))
        })?;

        // A signed body is acknowledged even when its envelope is unfamiliar
        let event: StripeWebhookEvent = serde_json::from_value(value).unwrap_or_else(|e| {
            warn!("Unrecognized webhook envelope: {}", e);
            StripeWebhookEvent::default()
        });

        debug!("Verified Stripe webhook: type={}", event.event_type);

        Ok(event.into_webhook_event())
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER
    }
}

// =============================================================================
// Stripe API Types
// =============================================================================

#[derive(Debug, Deserialize)]
struct StripeCheckoutSessionResponse {
    id: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    expires_at: Option<i64>,
    #[serde(default)]
    metadata: HashMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct StripeErrorResponse {
    error: StripeError,
}

#[derive(Debug, Deserialize)]
struct StripeError {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StripeWebhookEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    created: Option<i64>,
    data: StripeEventData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StripeEventData {
    object: serde_json::Value,
}

impl StripeWebhookEvent {
    fn into_webhook_event(self) -> WebhookEvent {
        let object = self.data.object.as_object();
        let field = |key: &str| object.and_then(|o| o.get(key));
        let str_field = |key: &str| field(key).and_then(|v| v.as_str()).map(String::from);

        let event_type = match self.event_type.as_str() {
            "checkout.session.completed" => WebhookEventType::CheckoutCompleted,
            other => WebhookEventType::Other(other.to_string()),
        };

        let customer_email = str_field("customer_email").or_else(|| {
            field("customer_details")
                .and_then(|cd| cd.get("email"))
                .and_then(|v| v.as_str())
                .map(String::from)
        });

        WebhookEvent {
            event_id: self.id,
            event_type,
            provider: PROVIDER.to_string(),
            session_id: str_field("id"),
            payment_intent_id: str_field("payment_intent"),
            customer_email,
            amount_paid: field("amount_total").and_then(|v| v.as_i64()),
            timestamp: self
                .created
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .unwrap_or_else(Utc::now),
            raw_data: Some(self.data.object).filter(|o| !o.is_null()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::signature_header;
    use serde_json::json;
    use shop_core::{metadata_keys, ProductSnapshot};
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

    const WEBHOOK_SECRET: &str = "whsec_unit";

    fn sample_order() -> OrderRequest {
        OrderRequest {
            name: "山田 花子".into(),
            email: "hanako@example.com".into(),
            phone: "090-1234-5678".into(),
            address: "1-2-3 桜町".into(),
            postal_code: "150-0001".into(),
            city: "渋谷区".into(),
            product: ProductSnapshot::new("7", "季節のブーケ", "ブーケ", 5500u64, "M"),
            ..Default::default()
        }
    }

    fn strategy_for(server: &MockServer) -> StripeCheckoutStrategy {
        let config =
            StripeConfig::new("sk_test_unit", WEBHOOK_SECRET).with_api_base_url(server.uri());
        StripeCheckoutStrategy::new(config).unwrap()
    }

    /// Mimics Stripe: the created session carries back the submitted metadata
    struct EchoSession;

    impl Respond for EchoSession {
        fn respond(&self, request: &Request) -> ResponseTemplate {
            let form: Vec<(String, String)> = serde_urlencoded::from_bytes(&request.body).unwrap();
            let metadata: serde_json::Map<String, serde_json::Value> = form
                .into_iter()
                .filter_map(|(k, v)| {
                    k.strip_prefix("metadata[")
                        .and_then(|rest| rest.strip_suffix(']'))
                        .map(|key| (key.to_string(), json!(v)))
                })
                .collect();

            ResponseTemplate::new(200).set_body_json(json!({
                "id": "cs_test_a1b2c3",
                "object": "checkout.session",
                "url": "https://checkout.stripe.com/c/pay/cs_test_a1b2c3",
                "expires_at": 1_900_000_000,
                "metadata": metadata
            }))
        }
    }

    #[test]
    fn test_form_params() {
        let order = sample_order();
        let urls = CheckoutUrls::new("https://salone-new-flower.vercel.app");
        let params: HashMap<String, String> =
            StripeCheckoutStrategy::build_form_params(&order, &urls).into_iter().collect();

        assert_eq!(params["mode"], "payment");
        assert_eq!(params["line_items[0][price_data][currency]"], "jpy");
        assert_eq!(params["line_items[0][price_data][unit_amount]"], "5500");
        assert_eq!(
            params["line_items[0][price_data][product_data][description]"],
            "ブーケ - M"
        );
        assert_eq!(params["customer_email"], "hanako@example.com");
        assert_eq!(params["shipping_address_collection[allowed_countries][0]"], "JP");
        assert_eq!(
            params["shipping_options[0][shipping_rate_data][display_name]"],
            "通常配送"
        );
        assert_eq!(
            params["success_url"],
            "https://salone-new-flower.vercel.app/success?session_id={CHECKOUT_SESSION_ID}"
        );
        for key in metadata_keys::ALL {
            assert!(params.contains_key(&format!("metadata[{}]", key)));
        }
    }

    #[tokio::test]
    async fn test_create_checkout_echoes_metadata() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .and(header("Authorization", "Bearer sk_test_unit"))
            .and(body_string_contains("mode=payment"))
            .respond_with(EchoSession)
            .expect(1)
            .mount(&server)
            .await;

        let order = sample_order();
        let urls = CheckoutUrls::new("https://salone-new-flower.vercel.app");
        let session = strategy_for(&server)
            .create_checkout(&order, &urls)
            .await
            .unwrap();

        assert_eq!(session.session_id, "cs_test_a1b2c3");
        assert_eq!(session.provider, "stripe");
        assert!(session.expires_at.is_some());

        let submitted: HashMap<String, String> = order.to_metadata().into_iter().collect();
        assert_eq!(session.metadata, submitted);
        assert_eq!(OrderRequest::from_metadata(&session.metadata).city, "渋谷区");
    }

    #[tokio::test]
    async fn test_create_checkout_provider_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/checkout/sessions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "Invalid integer: -1", "type": "invalid_request_error" }
            })))
            .mount(&server)
            .await;

        let urls = CheckoutUrls::new("https://salone-new-flower.vercel.app");
        let err = strategy_for(&server)
            .create_checkout(&sample_order(), &urls)
            .await
            .unwrap_err();

        match err {
            ShopError::ProviderError { provider, message } => {
                assert_eq!(provider, "stripe");
                assert_eq!(message, "Invalid integer: -1");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_verify_webhook_parses_completed_session() {
        let server = MockServer::start().await;
        let strategy = strategy_for(&server);

        let payload = json!({
            "id": "evt_123",
            "type": "checkout.session.completed",
            "created": 1_700_000_000,
            "data": { "object": {
                "id": "cs_test_a1b2c3",
                "customer_email": "hanako@example.com",
                "amount_total": 5500,
                "payment_intent": "pi_987",
                "metadata": { "customerName": "山田 花子" }
            }}
        })
        .to_string();
        let sig = signature_header(WEBHOOK_SECRET, payload.as_bytes(), Utc::now().timestamp())
            .unwrap();

        let event = strategy.verify_webhook(payload.as_bytes(), &sig).await.unwrap();

        assert_eq!(event.event_type, WebhookEventType::CheckoutCompleted);
        assert_eq!(event.session_id.as_deref(), Some("cs_test_a1b2c3"));
        assert_eq!(event.customer_email.as_deref(), Some("hanako@example.com"));
        assert_eq!(event.payment_intent_id.as_deref(), Some("pi_987"));
        assert_eq!(event.amount_paid, Some(5500));
    }

    #[tokio::test]
    async fn test_verify_webhook_rejects_bad_signature() {
        let server = MockServer::start().await;
        let strategy = strategy_for(&server);

        let payload = br#"{"id":"evt_1","type":"charge.refunded","created":0,"data":{"object":{}}}"#;
        let sig = signature_header("whsec_wrong", payload, Utc::now().timestamp()).unwrap();

        let err = strategy.verify_webhook(payload, &sig).await.unwrap_err();
        assert!(matches!(err, ShopError::WebhookVerificationFailed(_)));
    }

    #[tokio::test]
    async fn test_verify_webhook_accepts_minimal_envelope() {
        let server = MockServer::start().await;
        let strategy = strategy_for(&server);

        let payload = br#"{"id":"evt_min","type":"customer.created","data":{"object":{"id":"cus_1"}}}"#;
        let sig = signature_header(WEBHOOK_SECRET, payload, Utc::now().timestamp()).unwrap();

        let event = strategy.verify_webhook(payload, &sig).await.unwrap();
        assert_eq!(event.event_id, "evt_min");
        assert_eq!(
            event.event_type,
            WebhookEventType::Other("customer.created".to_string())
        );
        assert_eq!(event.session_id.as_deref(), Some("cus_1"));
    }

    #[tokio::test]
    async fn test_verify_webhook_tolerates_odd_shapes() {
        let server = MockServer::start().await;
        let strategy = strategy_for(&server);

        for payload in [
            &br#"{"id":"evt_null","type":"invoice.paid","data":{"object":null}}"#[..],
            &br#"{"id":7,"type":["not","a","string"]}"#[..],
            &b"[]"[..],
        ] {
            let sig = signature_header(WEBHOOK_SECRET, payload, Utc::now().timestamp()).unwrap();
            let event = strategy.verify_webhook(payload, &sig).await.unwrap();

            assert!(matches!(event.event_type, WebhookEventType::Other(_)));
            assert!(event.raw_data.is_none());
        }
    }

    #[tokio::test]
    async fn test_verify_webhook_rejects_non_json() {
        let server = MockServer::start().await;
        let strategy = strategy_for(&server);

        let payload = b"not json";
        let sig = signature_header(WEBHOOK_SECRET, payload, Utc::now().timestamp()).unwrap();

        let err = strategy.verify_webhook(payload, &sig).await.unwrap_err();
        assert!(matches!(err, ShopError::WebhookParseError(_)));
    }
}
