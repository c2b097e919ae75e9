//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use storeroom_core::{ClientId, Email, OrderId, PaymentStatus, ProductId, StoreId};

use super::PostalAddress;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub store_id: StoreId,
    pub is_paid: bool,
    pub phone: String,
    pub address: String,
    pub client_id: Option<ClientId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A product resolved for checkout, with the price that will be charged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
}

/// One row of the console's order table.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderListing {
    pub id: OrderId,
    pub phone: String,
    pub address: String,
    /// Product names, comma separated.
    pub products: String,
    pub total_price: Decimal,
    pub formatted_total_price: String,
    pub is_paid: bool,
    pub status: PaymentStatus,
    pub created_at: String,
}

/// What a completed checkout session tells us about the buyer.
#[derive(Debug, Clone)]
pub struct CheckoutCompletion {
    pub order_id: OrderId,
    pub email: Option<Email>,
    pub name: Option<String>,
    pub phone: String,
    pub address: PostalAddress,
}

/// Result of applying a completed checkout to its order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FulfillmentOutcome {
    /// Order marked paid and stock decremented.
    Fulfilled {
        order_id: OrderId,
        archived: Vec<ProductId>,
    },
    /// Order was already paid; nothing changed.
    AlreadyPaid,
    /// No such order.
    OrderNotFound,
}
