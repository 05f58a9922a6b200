//! # Order Types
//!
//! Order request, payment method, checkout session and webhook event types.

use crate::product::{ProductSnapshot, Yen};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Metadata keys attached to a checkout session and read back from the
/// `checkout.session.completed` webhook.
pub mod metadata_keys {
    pub const CUSTOMER_NAME: &str = "customerName";
    pub const CUSTOMER_EMAIL: &str = "customerEmail";
    pub const CUSTOMER_PHONE: &str = "customerPhone";
    pub const CUSTOMER_ADDRESS: &str = "customerAddress";
    pub const CUSTOMER_POSTAL_CODE: &str = "customerPostalCode";
    pub const CUSTOMER_CITY: &str = "customerCity";
    pub const PRODUCT_ID: &str = "productId";
    pub const PRODUCT_NAME: &str = "productName";
    pub const PRODUCT_TYPE: &str = "productType";
    pub const PRODUCT_SIZE: &str = "productSize";
    pub const PRODUCT_PRICE: &str = "productPrice";

    /// Every key written by [`super::OrderRequest::to_metadata`]
    pub const ALL: &[&str] = &[
        CUSTOMER_NAME,
        CUSTOMER_EMAIL,
        CUSTOMER_PHONE,
        CUSTOMER_ADDRESS,
        CUSTOMER_POSTAL_CODE,
        CUSTOMER_CITY,
        PRODUCT_ID,
        PRODUCT_NAME,
        PRODUCT_TYPE,
        PRODUCT_SIZE,
        PRODUCT_PRICE,
    ];
}

/// Credit card fields entered on the storefront's order form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CardDetails {
    pub card_number: String,
    pub card_name: String,
    pub card_expiry: String,
}

/// Bank transfer fields entered on the storefront's order form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BankDetails {
    pub bank_name: String,
    pub account_holder: String,
    pub account_number: String,
}

/// How the customer chose to pay.
///
/// On the wire this is the `paymentMethod` tag (`credit`, `bank`, `cod`)
/// plus a `paymentDetails` object whose shape depends on the tag. Unknown
/// or missing tags deserialize to [`PaymentMethod::Unspecified`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PaymentFields", into = "PaymentFields")]
pub enum PaymentMethod {
    Credit(CardDetails),
    Bank(BankDetails),
    CashOnDelivery,
    #[default]
    Unspecified,
}

impl PaymentMethod {
    /// Wire tag for this method
    pub fn tag(&self) -> &'static str {
        match self {
            PaymentMethod::Credit(_) => "credit",
            PaymentMethod::Bank(_) => "bank",
            PaymentMethod::CashOnDelivery => "cod",
            PaymentMethod::Unspecified => "",
        }
    }
}

/// Wire shape of [`PaymentMethod`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentFields {
    #[serde(rename = "paymentMethod", default, skip_serializing_if = "String::is_empty")]
    pub method: String,
    #[serde(
        rename = "paymentDetails",
        default,
        skip_serializing_if = "serde_json::Value::is_null"
    )]
    pub details: serde_json::Value,
}

impl From<PaymentFields> for PaymentMethod {
    fn from(fields: PaymentFields) -> Self {
        match fields.method.as_str() {
            "credit" => {
                PaymentMethod::Credit(serde_json::from_value(fields.details).unwrap_or_default())
            }
            "bank" => {
                PaymentMethod::Bank(serde_json::from_value(fields.details).unwrap_or_default())
            }
            "cod" => PaymentMethod::CashOnDelivery,
            _ => PaymentMethod::Unspecified,
        }
    }
}

impl From<PaymentMethod> for PaymentFields {
    fn from(method: PaymentMethod) -> Self {
        let tag = method.tag().to_string();
        let details = match method {
            PaymentMethod::Credit(card) => serde_json::to_value(card).unwrap_or_default(),
            PaymentMethod::Bank(bank) => serde_json::to_value(bank).unwrap_or_default(),
            PaymentMethod::CashOnDelivery | PaymentMethod::Unspecified => serde_json::Value::Null,
        };
        PaymentFields {
            method: tag,
            details,
        }
    }
}

/// An order as submitted by the storefront checkout form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub postal_code: String,
    pub city: String,

    /// Payment method tag and details (absent for hosted checkout)
    #[serde(flatten)]
    pub payment: PaymentMethod,

    pub product: ProductSnapshot,
}

impl OrderRequest {
    /// Flatten the order into session metadata for later retrieval by the
    /// webhook. Payment details are never written to the provider.
    pub fn to_metadata(&self) -> BTreeMap<String, String> {
        use metadata_keys::*;

        [
            (CUSTOMER_NAME, self.name.clone()),
            (CUSTOMER_EMAIL, self.email.clone()),
            (CUSTOMER_PHONE, self.phone.clone()),
            (CUSTOMER_ADDRESS, self.address.clone()),
            (CUSTOMER_POSTAL_CODE, self.postal_code.clone()),
            (CUSTOMER_CITY, self.city.clone()),
            (PRODUCT_ID, self.product.id.clone()),
            (PRODUCT_NAME, self.product.name.clone()),
            (PRODUCT_TYPE, self.product.product_type.clone()),
            (PRODUCT_SIZE, self.product.size.clone()),
            (PRODUCT_PRICE, self.product.price.amount().to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// Rebuild the order from session metadata. Missing keys become empty
    /// strings; the payment method is left unspecified.
    pub fn from_metadata(metadata: &HashMap<String, String>) -> Self {
        use metadata_keys::*;

        let get = |key: &str| metadata.get(key).cloned().unwrap_or_default();

        Self {
            name: get(CUSTOMER_NAME),
            email: get(CUSTOMER_EMAIL),
            phone: get(CUSTOMER_PHONE),
            address: get(CUSTOMER_ADDRESS),
            postal_code: get(CUSTOMER_POSTAL_CODE),
            city: get(CUSTOMER_CITY),
            payment: PaymentMethod::Unspecified,
            product: ProductSnapshot {
                id: get(PRODUCT_ID),
                name: get(PRODUCT_NAME),
                product_type: get(PRODUCT_TYPE),
                price: Yen(get(PRODUCT_PRICE).parse().unwrap_or(0)),
                size: get(PRODUCT_SIZE),
            },
        }
    }
}

/// A checkout session created by a payment provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSession {
    /// Provider's session ID
    pub session_id: String,

    /// Provider name (e.g., "stripe")
    pub provider: String,

    /// URL of the hosted payment page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkout_url: Option<String>,

    /// When the session expires
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,

    /// Metadata as echoed back by the provider
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl CheckoutSession {
    pub fn new(session_id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            provider: provider.into(),
            checkout_url: None,
            expires_at: None,
            metadata: HashMap::new(),
            created_at: Utc::now(),
        }
    }
}

/// Webhook event types the shop reacts to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WebhookEventType {
    /// Checkout session completed (payment collected)
    CheckoutCompleted,
    /// Any other event, acknowledged and ignored
    Other(String),
}

/// A verified webhook event
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookEvent {
    /// Event ID from provider
    pub event_id: String,

    /// Event type
    pub event_type: WebhookEventType,

    /// Provider name
    pub provider: String,

    /// Related session ID (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Related payment intent ID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,

    /// Customer email
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_email: Option<String>,

    /// Amount paid (in smallest unit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_paid: Option<i64>,

    /// The event's data object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<serde_json::Value>,

    /// Timestamp
    pub timestamp: DateTime<Utc>,
}
