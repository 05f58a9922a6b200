//! # Product Types
//!
//! Product snapshot sent by the storefront with every order or reservation.
//! The shop only sells in Japanese yen, so prices are whole yen.

use serde::{de::Error as _, Deserialize, Deserializer, Serialize};

/// Amount in Japanese yen (JPY has no minor unit, so this is also the
/// smallest currency unit Stripe expects).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Yen(pub u64);

impl Yen {
    /// ISO 4217 code used with the payment provider
    pub const CURRENCY: &'static str = "jpy";

    /// Amount in the smallest currency unit
    pub fn amount(&self) -> u64 {
        self.0
    }

    /// Digits grouped by thousands, without the currency symbol ("12,000")
    pub fn grouped(&self) -> String {
        let digits = self.0.to_string();
        let mut out = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                out.push(',');
            }
            out.push(ch);
        }
        out
    }
}

impl std::fmt::Display for Yen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "¥{}", self.grouped())
    }
}

impl From<u64> for Yen {
    fn from(amount: u64) -> Self {
        Yen(amount)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Whole(u64),
    Float(f64),
}

/// Whole non-negative amounts only; `5500.0` is accepted as `5500`
impl<'de> Deserialize<'de> for Yen {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match AmountRepr::deserialize(deserializer)? {
            AmountRepr::Whole(n) => Ok(Yen(n)),
            AmountRepr::Float(f) if f >= 0.0 && f.fract() == 0.0 && f < u64::MAX as f64 => {
                Ok(Yen(f as u64))
            }
            AmountRepr::Float(f) => Err(D::Error::custom(format!(
                "price must be a whole non-negative number of yen, got {}",
                f
            ))),
        }
    }
}

/// Product as displayed on the storefront at the time of the request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductSnapshot {
    /// Product identifier (numeric ids from the frontend are stringified)
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,

    /// Display name
    pub name: String,

    /// Product type (bouquet, arrangement, lesson, ...)
    #[serde(rename = "type")]
    pub product_type: String,

    /// Unit price
    pub price: Yen,

    /// Size label
    pub size: String,
}

impl ProductSnapshot {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        product_type: impl Into<String>,
        price: impl Into<Yen>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            product_type: product_type.into(),
            price: price.into(),
            size: size.into(),
        }
    }

    /// Line item description shown on the hosted checkout page
    pub fn description(&self) -> String {
        format!("{} - {}", self.product_type, self.size)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Signed(i64),
    Unsigned(u64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Text(s) => s,
        IdRepr::Signed(n) => n.to_string(),
        IdRepr::Unsigned(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_yen_display() {
        assert_eq!(Yen(0).to_string(), "¥0");
        assert_eq!(Yen(500).to_string(), "¥500");
        assert_eq!(Yen(5000).to_string(), "¥5,000");
        assert_eq!(Yen(1234567).to_string(), "¥1,234,567");
    }

    #[test]
    fn test_product_from_frontend_json() {
        let product: ProductSnapshot = serde_json::from_value(json!({
            "id": 12,
            "name": "ローズブーケ",
            "type": "ブーケ",
            "price": 5500,
            "size": "M"
        }))
        .unwrap();

        assert_eq!(product.id, "12");
        assert_eq!(product.product_type, "ブーケ");
        assert_eq!(product.price, Yen(5500));
        assert_eq!(product.description(), "ブーケ - M");
    }

    #[test]
    fn test_string_id_and_missing_fields() {
        let product: ProductSnapshot =
            serde_json::from_value(json!({ "id": "rose-01", "name": "Rose" })).unwrap();

        assert_eq!(product.id, "rose-01");
        assert_eq!(product.size, "");
        assert_eq!(product.price, Yen(0));
    }

    #[test]
    fn test_negative_price_rejected() {
        let result: Result<ProductSnapshot, _> =
            serde_json::from_value(json!({ "name": "Rose", "price": -100 }));
        assert!(result.is_err());
    }

    #[test]
    fn test_integral_float_price_accepted() {
        let product: ProductSnapshot =
            serde_json::from_value(json!({ "name": "Rose", "price": 5500.0 })).unwrap();
        assert_eq!(product.price, Yen(5500));

        assert_eq!(serde_json::to_value(product.price).unwrap(), json!(5500));
    }

    #[test]
    fn test_fractional_price_rejected() {
        let err = serde_json::from_value::<Yen>(json!(5500.5)).unwrap_err();
        assert!(err.to_string().contains("whole non-negative"));

        assert!(serde_json::from_value::<Yen>(json!(-100)).is_err());
        assert!(serde_json::from_value::<Yen>(json!(-0.5)).is_err());
        assert!(serde_json::from_value::<Yen>(json!("5500")).is_err());
    }
}
