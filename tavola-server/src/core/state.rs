use std::sync::Arc;

use shared::models::UserRole;
use sqlx::SqlitePool;

use crate::auth::{JwtService, hash_password};
use crate::cart::CartStore;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, ServerError};
use crate::db::DbService;
use crate::db::repository::user::{self, NewUser};

/// 服务器状态 - 持有所有服务的引用
///
/// Cloned into every handler; all fields are cheap to clone.
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub carts: Arc<CartStore>,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let carts = Arc::new(CartStore::new(config.cart_ttl_minutes));
        Self {
            config,
            pool,
            jwt_service,
            carts,
        }
    }

    /// 初始化服务器状态
    ///
    /// 1. 打开数据库并执行迁移
    /// 2. 创建 JWT 服务和购物车存储
    /// 3. 没有管理员时创建初始管理员
    pub async fn initialize(config: &Config) -> Result<Self, ServerError> {
        let db = DbService::new(&config.database_path)
            .await
            .map_err(|e| ServerError::Database(e.message))?;

        let state = Self::new(config.clone(), db.pool);
        state.bootstrap_admin().await?;
        Ok(state)
    }

    async fn bootstrap_admin(&self) -> Result<(), ServerError> {
        let admins = user::count_by_role(&self.pool, UserRole::Admin)
            .await
            .map_err(|e| ServerError::Database(e.to_string()))?;
        if admins > 0 {
            return Ok(());
        }

        let Some(password) = self.config.admin_password.as_deref() else {
            tracing::warn!("No admin account exists and ADMIN_PASSWORD is not set");
            return Ok(());
        };

        let hash_pass = hash_password(password)
            .map_err(|e| ServerError::Internal(format!("Failed to hash admin password: {e}")))?;
        let admin = user::create(
            &self.pool,
            NewUser {
                username: self.config.admin_username.clone(),
                hash_pass,
                email: None,
                display_name: "Administrator".to_string(),
                phone: None,
                role: UserRole::Admin,
            },
        )
        .await
        .map_err(|e| ServerError::Database(e.to_string()))?;

        tracing::info!(username = %admin.username, "Bootstrap admin account created");
        Ok(())
    }

    /// 注册后台任务 (购物车过期清理)
    pub fn start_background_tasks(&self, tasks: &mut BackgroundTasks) {
        let carts = self.carts.clone();
        let token = tasks.shutdown_token();
        let period = std::time::Duration::from_secs(self.config.cart_sweep_interval_secs.max(1));

        tasks.spawn("cart_sweeper", TaskKind::Periodic, async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let removed = carts.sweep_expired(shared::util::now_millis());
                        if removed > 0 {
                            tracing::info!(removed, remaining = carts.len(), "Expired carts removed");
                        }
                    }
                }
            }
        });
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}
