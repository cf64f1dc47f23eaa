//! Menu Models (menu items and dietary options)

use serde::{Deserialize, Serialize};

/// Dietary option (vegan, gluten-free, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DietaryOption {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietaryOptionCreate {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietaryOptionUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub preparation_minutes: Option<i32>,
    pub created_at: i64,
    pub updated_at: i64,
    /// Loaded from the join table, not a column
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub dietary_options: Vec<DietaryOption>,
}

/// Create menu item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub category: String,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
    pub preparation_minutes: Option<i32>,
    #[serde(default)]
    pub dietary_option_ids: Vec<i64>,
}

/// Update menu item payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MenuItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub is_available: Option<bool>,
    pub preparation_minutes: Option<i32>,
    /// Replaces all links when present
    pub dietary_option_ids: Option<Vec<i64>>,
}

/// Availability toggle payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemAvailability {
    pub is_available: bool,
}

/// Menu list filter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MenuQuery {
    pub category: Option<String>,
    pub available: Option<bool>,
    /// Dietary option id
    pub dietary: Option<i64>,
}
