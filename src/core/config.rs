//! 环境变量配置 / Environment configuration
//!
//! | 变量 | 默认值 | 说明 |
//! |------|--------|------|
//! | `SHOP_ENV` | `development` | 运行环境 development/production |
//! | `WORK_DIR` | `/var/lib/shop-server` | 数据目录 |
//! | `HOLD_MINUTES` | `15` | 预订保留时长（分钟） |
//! | `SWEEP_INTERVAL_SECS` | `300` | 过期清理间隔（秒） |
//! | `LOW_STOCK_THRESHOLD` | `5` | 低库存提醒阈值 |
//! | `SEED_DEMO_CATALOG` | `false` | 首次启动载入演示商品 |
//! | `LOG_DIR` | 无 | 日志目录，缺省仅控制台输出 |
//!
//! 无法解析的值回退到默认值 / Unparseable values fall back to defaults.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: String,
    pub work_dir: String,
    pub hold_minutes: i64,
    pub sweep_interval_secs: u64,
    pub low_stock_threshold: i32,
    pub seed_demo_catalog: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self {
            environment: env_or("SHOP_ENV", "development"),
            work_dir: env_or("WORK_DIR", "/var/lib/shop-server"),
            hold_minutes: env_parse("HOLD_MINUTES", 15),
            sweep_interval_secs: env_parse("SWEEP_INTERVAL_SECS", 300),
            low_stock_threshold: env_parse("LOW_STOCK_THRESHOLD", 5),
            seed_demo_catalog: env_bool("SEED_DEMO_CATALOG", false),
            log_dir: std::env::var("LOG_DIR").ok(),
        }
    }

    /// Defaults with an explicit data directory (used by tests)
    pub fn with_work_dir(work_dir: impl Into<String>) -> Self {
        Self {
            environment: "development".to_string(),
            work_dir: work_dir.into(),
            hold_minutes: 15,
            sweep_interval_secs: 300,
            low_stock_threshold: 5,
            seed_demo_catalog: false,
            log_dir: None,
        }
    }

    pub fn database_path(&self) -> PathBuf {
        Path::new(&self.work_dir).join("shop.redb")
    }

    pub fn ensure_work_dir(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)
    }

    pub fn hold_window_millis(&self) -> i64 {
        self.hold_minutes * 60 * 1000
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        !self.is_production()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(v.to_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => default,
    }
}
