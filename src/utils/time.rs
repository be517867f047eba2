//! 时间工具
//!
//! 所有持久化时间戳统一为 Unix 毫秒 (i64)。

use chrono::{DateTime, Utc};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// UTC 当日零点（毫秒），用于"今日"统计窗口
pub fn day_start_millis(now_ms: i64) -> i64 {
    DateTime::<Utc>::from_timestamp_millis(now_ms)
        .and_then(|dt| dt.date_naive().and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().timestamp_millis())
        .unwrap_or(now_ms)
}

/// 毫秒时间戳格式化为可读时间（日志用）
pub fn format_millis(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| ms.to_string())
}
