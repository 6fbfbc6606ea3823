use anyhow::{Context, Result};
use chrono::{Local, NaiveTime};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_secs(1);

pub fn parse_time_of_day(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s, "%H:%M")
        .with_context(|| format!("invalid schedule time {:?}, expected HH:MM", s))
}

/// Blocks until the local time-of-day reaches `target`, polling once per
/// second. Returns immediately when the target is already past. Same-day gate
/// only: a target earlier than now is treated as "already past", not as
/// "tomorrow".
pub async fn await_time_of_day(target: NaiveTime) {
    while Local::now().time() < target {
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}
