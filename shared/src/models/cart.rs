//! Cart Model (in-memory, per user)

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub menu_item_id: i64,
    pub name: String,
    pub unit_price: f64,
    pub quantity: i32,
    pub note: Option<String>,
}

/// Cart snapshot returned to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub item_count: i32,
    pub subtotal: f64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemAdd {
    pub menu_item_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i32,
    pub note: Option<String>,
}

fn default_quantity() -> i32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartItemUpdate {
    pub quantity: i32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CartCheckout {
    pub table_id: Option<i64>,
    pub customer_name: Option<String>,
    #[serde(default)]
    pub order_type: crate::models::OrderType,
    pub note: Option<String>,
}
