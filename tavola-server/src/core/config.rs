use crate::auth::{JwtConfig, JwtError};

/// Development-only admin password, refused outside `development`
const DEV_ADMIN_PASSWORD: &str = "admin123";

/// 服务器配置
///
/// # 环境变量
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | ENVIRONMENT | development | 运行环境 |
/// | HTTP_PORT | 3000 | HTTP 服务端口 |
/// | DATABASE_PATH | data/tavola.db | SQLite 文件 |
/// | JWT_SECRET | 开发环境随机生成 | 签名密钥 (>= 32 字符) |
/// | CART_TTL_MINUTES | 120 | 购物车闲置过期时间 |
/// | CART_SWEEP_INTERVAL_SECS | 300 | 购物车清理周期 |
/// | ADMIN_USERNAME | admin | 初始管理员 |
/// | ADMIN_PASSWORD | 仅开发环境有默认值 | 初始管理员密码 |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_DIR | 未设置 | 日志文件目录 |
/// | CORS_ALLOW_ORIGIN | * | CORS 来源 |
#[derive(Debug, Clone)]
pub struct Config {
    /// 运行环境: development | staging | production
    pub environment: String,
    pub http_port: u16,
    pub database_path: String,
    /// JWT 认证配置
    pub jwt: JwtConfig,
    pub cart_ttl_minutes: i64,
    pub cart_sweep_interval_secs: u64,
    pub admin_username: String,
    pub admin_password: Option<String>,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub cors_allow_origin: String,
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Result<Self, JwtError> {
        let environment =
            std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let admin_password = std::env::var("ADMIN_PASSWORD").ok().or_else(|| {
            (environment == "development").then(|| DEV_ADMIN_PASSWORD.to_string())
        });

        Ok(Self {
            http_port: env_parse("HTTP_PORT", 3000),
            database_path: std::env::var("DATABASE_PATH")
                .unwrap_or_else(|_| "data/tavola.db".to_string()),
            jwt: JwtConfig::from_env(&environment)?,
            cart_ttl_minutes: env_parse("CART_TTL_MINUTES", 120),
            cart_sweep_interval_secs: env_parse("CART_SWEEP_INTERVAL_SECS", 300),
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string()),
            admin_password,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|s| !s.is_empty()),
            cors_allow_origin: std::env::var("CORS_ALLOW_ORIGIN").unwrap_or_else(|_| "*".to_string()),
            environment,
        })
    }

    /// Config for an isolated instance (tests, tooling)
    pub fn for_database(database_path: impl Into<String>) -> Self {
        Self {
            environment: "test".to_string(),
            http_port: 0,
            database_path: database_path.into(),
            jwt: JwtConfig::ephemeral(),
            cart_ttl_minutes: 120,
            cart_sweep_interval_secs: 300,
            admin_username: "admin".to_string(),
            admin_password: Some(DEV_ADMIN_PASSWORD.to_string()),
            log_level: "debug".to_string(),
            log_dir: None,
            cors_allow_origin: "*".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn for_database_defaults() {
        let config = Config::for_database("/tmp/x.db");
        assert_eq!(config.database_path, "/tmp/x.db");
        assert_eq!(config.cart_ttl_minutes, 120);
        assert!(config.admin_password.is_some());
        assert_eq!(config.environment, "test");
        assert!(config.jwt.secret.len() >= crate::auth::jwt::MIN_SECRET_LEN);
    }
}
