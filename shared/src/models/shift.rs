//! Shift Model (staff scheduling)

use serde::{Deserialize, Serialize};

/// Scheduled shift of one staff member
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Shift {
    pub id: i64,
    pub user_id: i64,
    /// Display name of the assignee (joined)
    pub user_name: String,
    /// Station or duty, e.g. "bar", "grill"
    pub position: Option<String>,
    /// Epoch milliseconds
    pub start_time: i64,
    /// Epoch milliseconds, always after `start_time`
    pub end_time: i64,
    pub note: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftCreate {
    pub user_id: i64,
    pub position: Option<String>,
    pub start_time: i64,
    pub end_time: i64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftUpdate {
    pub user_id: Option<i64>,
    pub position: Option<String>,
    pub start_time: Option<i64>,
    pub end_time: Option<i64>,
    pub note: Option<String>,
}

/// `from`/`to` bound `start_time` (inclusive / exclusive)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ShiftQuery {
    pub user_id: Option<i64>,
    pub from: Option<i64>,
    pub to: Option<i64>,
}
