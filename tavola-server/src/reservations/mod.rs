//! Reservation slot rules
//!
//! Bookable times are fixed 30-minute slots from 11:00 through 21:30. A
//! table is taken for a slot when a reservation for that exact date and
//! time holds it (any status except `CANCELLED` / `NO_SHOW`).

use chrono::{NaiveDate, NaiveTime, Timelike};
use shared::error::{AppError, ErrorCode};
use shared::models::{DiningTable, MAX_PARTY_SIZE, TimeSlot};
use std::collections::HashSet;

/// First bookable slot (11:00)
pub const FIRST_SLOT_MINUTES: u32 = 11 * 60;
/// Last bookable slot (21:30); the restaurant closes at 22:00
pub const LAST_SLOT_MINUTES: u32 = 21 * 60 + 30;
pub const SLOT_INTERVAL_MINUTES: u32 = 30;

/// All slot labels in order, `"11:00"` .. `"21:30"`
pub fn time_slots() -> Vec<String> {
    (FIRST_SLOT_MINUTES..=LAST_SLOT_MINUTES)
        .step_by(SLOT_INTERVAL_MINUTES as usize)
        .map(|m| format!("{:02}:{:02}", m / 60, m % 60))
        .collect()
}

/// Parse `HH:MM` (or `HH:MM:SS`) and return the canonical slot label
///
/// Times between slots or outside opening hours are rejected.
pub fn normalize_slot(time: &str) -> Result<String, AppError> {
    let parsed = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(time.trim(), "%H:%M:%S"))
        .map_err(|_| {
            AppError::with_message(ErrorCode::InvalidTimeSlot, format!("Invalid time: {time}"))
                .with_detail("time", time)
        })?;

    let minutes = parsed.hour() * 60 + parsed.minute();
    let on_grid = parsed.second() == 0 && minutes % SLOT_INTERVAL_MINUTES == 0;
    if !on_grid || !(FIRST_SLOT_MINUTES..=LAST_SLOT_MINUTES).contains(&minutes) {
        return Err(AppError::new(ErrorCode::InvalidTimeSlot)
            .with_detail("time", time)
            .with_detail("first", "11:00")
            .with_detail("last", "21:30"));
    }
    Ok(format!("{:02}:{:02}", minutes / 60, minutes % 60))
}

pub fn validate_party_size(party_size: i32) -> Result<(), AppError> {
    if !(1..=MAX_PARTY_SIZE).contains(&party_size) {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("party_size must be between 1 and {MAX_PARTY_SIZE}"),
        )
        .with_detail("field", "party_size"));
    }
    Ok(())
}

pub fn ensure_not_past(date: NaiveDate, today: NaiveDate) -> Result<(), AppError> {
    if date < today {
        return Err(AppError::new(ErrorCode::ReservationInPast).with_detail("date", date.to_string()));
    }
    Ok(())
}

/// Smallest table that seats the party and is not in `booked`
///
/// `tables` must already be ordered by capacity.
pub fn pick_table<'a>(
    tables: &'a [DiningTable],
    booked: &HashSet<i64>,
    party_size: i32,
) -> Option<&'a DiningTable> {
    tables
        .iter()
        .filter(|t| t.capacity >= party_size && !booked.contains(&t.id))
        .min_by_key(|t| (t.capacity, t.number))
}

/// Slot-by-slot availability for one day
///
/// `bookings` are `(table_id, time)` pairs of reservations that hold a table.
pub fn compute_availability(
    tables: &[DiningTable],
    bookings: &[(i64, String)],
    party_size: i32,
) -> Vec<TimeSlot> {
    let fitting: Vec<&DiningTable> = tables.iter().filter(|t| t.capacity >= party_size).collect();

    time_slots()
        .into_iter()
        .map(|slot| {
            let booked: HashSet<i64> = bookings
                .iter()
                .filter(|(_, time)| *time == slot)
                .map(|(table_id, _)| *table_id)
                .collect();
            let free = fitting.iter().filter(|t| !booked.contains(&t.id)).count();
            TimeSlot {
                time: slot,
                available: free > 0,
                available_tables: free,
            }
        })
        .collect()
}
