//! Shared types for Tavola
//!
//! Domain models, auth DTOs, the unified error system and small helpers
//! used by the server and its API clients.

pub mod client;
pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use error::{AppError, AppResult, ErrorCategory, ErrorCode, ErrorResponse};
pub use serde::{Deserialize, Serialize};
