//! Data models
//!
//! Shared between the server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflakes.

pub mod cart;
pub mod dining_table;
pub mod inventory;
pub mod menu;
pub mod order;
pub mod reservation;
pub mod shift;
pub mod user;

pub use cart::*;
pub use dining_table::*;
pub use inventory::*;
pub use menu::*;
pub use order::*;
pub use reservation::*;
pub use shift::*;
pub use user::*;
