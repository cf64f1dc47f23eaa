//! Reservation Model

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Largest party accepted by a single reservation
pub const MAX_PARTY_SIZE: i32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Seated,
    Completed,
    Cancelled,
    NoShow,
}

impl ReservationStatus {
    /// Whether a reservation in this status still holds its table slot
    pub fn holds_table(&self) -> bool {
        !matches!(self, ReservationStatus::Cancelled | ReservationStatus::NoShow)
    }

    /// Statuses in which the booking customer may still edit the reservation
    pub fn editable_by_owner(&self) -> bool {
        matches!(self, ReservationStatus::Pending | ReservationStatus::Confirmed)
    }
}

/// Reservation entity
///
/// `date` is `YYYY-MM-DD`, `time` is `HH:MM` (24h).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub user_id: Option<i64>,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub party_size: i32,
    pub date: String,
    pub time: String,
    pub table_id: i64,
    pub status: ReservationStatus,
    pub special_requests: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create reservation payload
///
/// Without `table_id` the smallest free table that fits is assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub party_size: i32,
    pub date: NaiveDate,
    pub time: String,
    pub table_id: Option<i64>,
    pub special_requests: Option<String>,
}

/// Update reservation payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReservationUpdate {
    pub customer_name: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    pub party_size: Option<i32>,
    pub date: Option<NaiveDate>,
    pub time: Option<String>,
    pub table_id: Option<i64>,
    pub special_requests: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationStatusUpdate {
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReservationQuery {
    pub date: Option<NaiveDate>,
    pub status: Option<ReservationStatus>,
}

/// Availability lookup parameters
#[derive(Debug, Clone, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    pub party_size: i32,
}

/// One bookable slot in an availability answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// `HH:MM`
    pub time: String,
    pub available: bool,
    /// Number of free tables that fit the party
    pub available_tables: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_and_no_show_release_the_table() {
        assert!(ReservationStatus::Pending.holds_table());
        assert!(ReservationStatus::Seated.holds_table());
        assert!(ReservationStatus::Completed.holds_table());
        assert!(!ReservationStatus::Cancelled.holds_table());
        assert!(!ReservationStatus::NoShow.holds_table());
    }

    #[test]
    fn status_serializes_screaming_snake() {
        let json = serde_json::to_string(&ReservationStatus::NoShow).unwrap();
        assert_eq!(json, "\"NO_SHOW\"");
    }
}
