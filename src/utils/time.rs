use chrono::Utc;

/// Formats seconds as `m:ss`, clamping negative input to zero.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    format!("{}:{:02}", total / 60, total % 60)
}

pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
