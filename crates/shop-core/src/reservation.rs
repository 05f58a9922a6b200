//! # Reservation and Contact Types

use crate::product::ProductSnapshot;
use serde::{Deserialize, Serialize};

/// A reservation for a flower arrangement lesson or for picking up a product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReservationRequest {
    pub name: String,
    pub email: String,
    pub phone: String,

    /// Desired date (and optionally time) as sent by the booking form
    pub date: String,

    /// `true` for a lesson, `false` for a product reservation
    pub is_lesson: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductSnapshot>,
}

impl ReservationRequest {
    /// Label shown in the notification mails
    pub fn kind_label(&self) -> &'static str {
        if self.is_lesson {
            "レッスン"
        } else {
            "商品予約"
        }
    }
}

/// Message from the storefront's contact form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lesson_reservation_without_product() {
        let reservation: ReservationRequest = serde_json::from_value(json!({
            "name": "佐藤",
            "email": "sato@example.com",
            "phone": "03-0000-0000",
            "date": "2024-01-20",
            "isLesson": true
        }))
        .unwrap();

        assert!(reservation.product.is_none());
        assert_eq!(reservation.kind_label(), "レッスン");
    }

    #[test]
    fn test_product_reservation() {
        let reservation: ReservationRequest = serde_json::from_value(json!({
            "name": "佐藤",
            "date": "2024-01-20",
            "product": { "id": "b-1", "name": "胡蝶蘭", "type": "鉢物", "price": 22000, "size": "L" }
        }))
        .unwrap();

        assert!(!reservation.is_lesson);
        assert_eq!(reservation.kind_label(), "商品予約");
        assert_eq!(reservation.product.unwrap().name, "胡蝶蘭");
    }
}
