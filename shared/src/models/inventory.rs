//! Inventory Model

use serde::{Deserialize, Serialize};

/// Stock item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InventoryItem {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    pub quantity: f64,
    pub unit: String,
    pub reorder_level: f64,
    pub cost_per_unit: Option<f64>,
    pub supplier: Option<String>,
    pub updated_at: i64,
}

impl InventoryItem {
    /// Same rule as the low-stock listing
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.reorder_level
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItemCreate {
    pub name: String,
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub reorder_level: f64,
    pub cost_per_unit: Option<f64>,
    pub supplier: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryItemUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub reorder_level: Option<f64>,
    pub cost_per_unit: Option<f64>,
    pub supplier: Option<String>,
}

/// Relative stock movement (deliveries positive, usage/waste negative)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryAdjust {
    pub delta: f64,
    pub reason: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: f64, reorder_level: f64) -> InventoryItem {
        InventoryItem {
            id: 1,
            name: "Flour".to_string(),
            category: None,
            quantity,
            unit: "kg".to_string(),
            reorder_level,
            cost_per_unit: None,
            supplier: None,
            updated_at: 0,
        }
    }

    #[test]
    fn low_stock_includes_reorder_level() {
        assert!(item(2.0, 5.0).is_low_stock());
        assert!(item(5.0, 5.0).is_low_stock());
        assert!(!item(5.5, 5.0).is_low_stock());
    }
}
