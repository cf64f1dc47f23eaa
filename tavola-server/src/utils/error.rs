//! 统一错误处理
//!
//! 所有错误类型来自 `shared::error`，这里只做 re-export，
//! 让处理器可以写 `crate::utils::AppError`。
//!
//! ```ignore
//! Err(AppError::new(ErrorCode::TableNotFound))
//! ```

pub use shared::error::{AppError, AppResult, ErrorCategory, ErrorCode, ErrorResponse};
