//! Tavola Server - 餐厅点餐与预订后端
//!
//! # 架构概述
//!
//! - **数据库** (`db`): 嵌入式 SQLite (sqlx)，启动时自动迁移
//! - **认证** (`auth`): JWT + Argon2，基于角色的权限
//! - **HTTP API** (`api`): RESTful 接口
//! - **购物车** (`cart`): 进程内 DashMap，闲置过期
//!
//! # 模块结构
//!
//! ```text
//! tavola-server/src/
//! ├── core/          # 配置、状态、错误、后台任务
//! ├── auth/          # JWT 认证、权限
//! ├── api/           # HTTP 路由和处理器
//! ├── db/            # 数据库层
//! ├── cart/          # 内存购物车
//! ├── reservations/  # 预订时段规则
//! ├── order_money/   # 金额计算 (Decimal)
//! └── utils/         # 工具函数
//! ```

pub mod api;
pub mod auth;
pub mod cart;
pub mod core;
pub mod db;
pub mod order_money;
pub mod reservations;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ErrorCategory, ErrorCode, ErrorResponse};

// Re-export logger functions
pub use utils::logger::init_logger_with_file;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
  ______
 /_  __/___ __   ______  / /___ _
  / / / __ `/ | / / __ \/ / __ `/
 / / / /_/ /| |/ / /_/ / / /_/ /
/_/  \__,_/ |___/\____/_/\__,_/
    "#
    );
}
