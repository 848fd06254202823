//! The order entity, its closed status enumerations, and business order-id
//! generation.

use std::fmt;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::cache::{Draft, Patch, Record};
use crate::error::ValidationError;

/// Fulfillment status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Preparing,
    Ready,
    Delivered,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Preparing => write!(f, "preparing"),
            Self::Ready => write!(f, "ready"),
            Self::Delivered => write!(f, "delivered"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Payment status of an order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Paid => write!(f, "paid"),
            Self::Failed => write!(f, "failed"),
            Self::Refunded => write!(f, "refunded"),
        }
    }
}

/// One line of an order. `subtotal` is fixed at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OrderItem {
    pub cake_id: String,
    pub cake_name: String,
    pub quantity: u32,
    pub price: f64,
    pub subtotal: f64,
}

impl OrderItem {
    /// Builds a line with `subtotal = quantity * price`.
    #[must_use]
    pub fn new(
        cake_id: impl Into<String>,
        cake_name: impl Into<String>,
        quantity: u32,
        price: f64,
    ) -> Self {
        Self {
            cake_id: cake_id.into(),
            cake_name: cake_name.into(),
            quantity,
            price,
            subtotal: f64::from(quantity) * price,
        }
    }
}

/// Generates a business order id: uppercase alphabetic prefix from the cake
/// name (non-alphabetic characters stripped, at most 5 characters), serial
/// zero-padded to 3 digits, `-`, then the unix timestamp in seconds.
///
/// Deterministic given the same inputs, e.g. `("Choco Fudge #1", 1,
/// 1703520000)` yields `CHOCO001-1703520000`.
#[must_use]
pub fn generate_order_id(cake_name: &str, serial: u32, unix_secs: i64) -> String {
    let prefix: String = cake_name
        .chars()
        .filter(char::is_ascii_alphabetic)
        .map(|c| c.to_ascii_uppercase())
        .take(5)
        .collect();
    format!("{prefix}{serial:03}-{unix_secs}")
}

/// A customer order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Order {
    /// Backend-assigned key.
    pub id: String,
    /// Business id, see [`generate_order_id`].
    pub order_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub deliverable: bool,
    pub delivery_address: String,
    pub payment_status: PaymentStatus,
    pub payment: f64,
    pub payment_method: String,
    pub notes: String,
    pub status: OrderStatus,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Record for Order {
    const COLLECTION: &'static str = "orders";

    type Draft = OrderDraft;
    type Patch = OrderPatch;

    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> i64 {
        self.created_at
    }

    fn apply_patch(&mut self, patch: &OrderPatch) {
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(payment_status) = patch.payment_status {
            self.payment_status = payment_status;
        }
        if let Some(payment) = patch.payment {
            self.payment = payment;
        }
        if let Some(payment_method) = &patch.payment_method {
            self.payment_method = payment_method.clone();
        }
        if let Some(deliverable) = patch.deliverable {
            self.deliverable = deliverable;
        }
        if let Some(delivery_address) = &patch.delivery_address {
            self.delivery_address = delivery_address.clone();
        }
        if let Some(notes) = &patch.notes {
            self.notes = notes.clone();
        }
    }

    fn touch(&mut self, at_millis: i64) {
        self.updated_at = at_millis;
    }
}

/// Creation input for an order. New orders start pending with pending payment.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub order_id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub items: Vec<OrderItem>,
    pub total_amount: f64,
    pub deliverable: bool,
    pub delivery_address: String,
    pub payment_status: PaymentStatus,
    pub payment: f64,
    pub payment_method: String,
    pub notes: String,
    pub status: OrderStatus,
}

impl OrderDraft {
    /// Builds a pending order. The business id is derived from the first
    /// item's cake name (`ORDER` when the name carries no alphabetic
    /// characters) and the total from the item subtotals.
    #[must_use]
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
        user_email: impl Into<String>,
        items: Vec<OrderItem>,
        delivery_address: impl Into<String>,
    ) -> Self {
        let seed_name = items
            .first()
            .map(|item| item.cake_name.as_str())
            .filter(|name| name.chars().any(|c| c.is_ascii_alphabetic()))
            .unwrap_or("ORDER");
        let order_id = generate_order_id(seed_name, 1, Utc::now().timestamp());
        let total_amount = items.iter().map(|item| item.subtotal).sum();
        Self {
            order_id,
            user_id: user_id.into(),
            user_name: user_name.into(),
            user_email: user_email.into(),
            items,
            total_amount,
            deliverable: true,
            delivery_address: delivery_address.into(),
            payment_status: PaymentStatus::Pending,
            payment: 0.0,
            payment_method: String::new(),
            notes: String::new(),
            status: OrderStatus::Pending,
        }
    }

    /// Sets customer notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    /// Sets the payment method.
    #[must_use]
    pub fn with_payment_method(mut self, method: impl Into<String>) -> Self {
        self.payment_method = method.into();
        self
    }
}

impl Draft for OrderDraft {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::EmptyField { field: "user_id" });
        }
        if self.items.is_empty() {
            return Err(ValidationError::NoOrderItems);
        }
        for item in &self.items {
            if item.quantity == 0 {
                return Err(ValidationError::ZeroQuantityItem {
                    cake_name: item.cake_name.clone(),
                });
            }
            if item.price < 0.0 {
                return Err(ValidationError::NegativePrice { value: item.price });
            }
        }
        Ok(())
    }
}

/// Partial update for an order. Items are immutable once placed.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deliverable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl OrderPatch {
    /// Sets the fulfillment status.
    #[must_use]
    pub const fn with_status(mut self, status: OrderStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Sets the payment status.
    #[must_use]
    pub const fn with_payment_status(mut self, payment_status: PaymentStatus) -> Self {
        self.payment_status = Some(payment_status);
        self
    }

    /// Sets customer notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

impl Patch for OrderPatch {
    fn validate(&self) -> Result<(), ValidationError> {
        if let Some(payment) = self.payment {
            if payment < 0.0 {
                return Err(ValidationError::NegativePrice { value: payment });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_id_is_deterministic_and_formatted() {
        let id = generate_order_id("Choco Fudge #1", 1, 1_703_520_000);
        assert_eq!(id, "CHOCO001-1703520000");
        assert_eq!(id, generate_order_id("Choco Fudge #1", 1, 1_703_520_000));

        // Short names keep whatever alphabetic characters exist.
        assert_eq!(generate_order_id("B-52", 7, 42), "B007-42");
        // Serial padding is three digits wide.
        assert_eq!(generate_order_id("Velvet", 12, 1), "VELVE012-1");
    }

    #[test]
    fn test_item_subtotal_and_draft_total() {
        let items = vec![
            OrderItem::new("c1", "Choco", 2, 10.0),
            OrderItem::new("c2", "Velvet", 1, 15.0),
        ];
        assert_eq!(items[0].subtotal, 20.0);

        let draft = OrderDraft::new("u1", "Ada", "ada@example.com", items, "12 Main St");
        assert_eq!(draft.total_amount, 35.0);
        assert_eq!(draft.status, OrderStatus::Pending);
        assert_eq!(draft.payment_status, PaymentStatus::Pending);
        assert!(draft.order_id.starts_with("CHOCO001-"));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_draft_validation() {
        let empty = OrderDraft::new("u1", "Ada", "a@b.c", Vec::new(), "addr");
        assert!(matches!(empty.validate(), Err(ValidationError::NoOrderItems)));
        assert!(empty.order_id.starts_with("ORDER001-"));

        let zero_qty = OrderDraft::new(
            "u1",
            "Ada",
            "a@b.c",
            vec![OrderItem::new("c1", "Choco", 0, 10.0)],
            "addr",
        );
        assert!(matches!(
            zero_qty.validate(),
            Err(ValidationError::ZeroQuantityItem { .. })
        ));

        let no_user = OrderDraft::new(
            "",
            "Ada",
            "a@b.c",
            vec![OrderItem::new("c1", "Choco", 1, 10.0)],
            "addr",
        );
        assert!(no_user.validate().is_err());
    }

    #[test]
    fn test_status_serde_round_trip() {
        assert_eq!(
            serde_json::to_string(&OrderStatus::Preparing).unwrap(),
            "\"preparing\""
        );
        let status: PaymentStatus = serde_json::from_str("\"refunded\"").unwrap();
        assert_eq!(status, PaymentStatus::Refunded);
        assert!(serde_json::from_str::<OrderStatus>("\"shipped\"").is_err());
    }
}
