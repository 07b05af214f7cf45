//! 时间工具函数 — 业务时区转换
//!
//! 排队按门店本地日历日分桶（"YYYY-MM-DD"），跨日永不混排。
//! 所有"今天"的判定统一经过这里，repository 层只接收现成的 ymd 字符串。

use chrono::NaiveDate;
use chrono_tz::Tz;

/// 当前本地日期（业务时区）
pub fn current_date(tz: Tz) -> NaiveDate {
    chrono::Utc::now().with_timezone(&tz).date_naive()
}

/// 当前业务日 "YYYY-MM-DD"（业务时区）
///
/// 用作 counters / tickets / booth_status 的日分桶键。
pub fn current_ymd(tz: Tz) -> String {
    format_ymd(current_date(tz))
}

/// NaiveDate → "YYYY-MM-DD"
pub fn format_ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
