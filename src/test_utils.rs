//! Shared test utilities for noticewindow.
//!
//! Fixed instants so tests never depend on the wall clock.

#![cfg(test)]

use crate::models::Timestamp;
use chrono::{Duration, TimeZone, Utc};

/// 2024-05-01 09:00:00 UTC, the `T` that test windows are built around.
pub fn base_time() -> Timestamp {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
        .single()
        .expect("base test time is unambiguous")
}

/// `T + secs` (negative for instants before `T`).
pub fn at(secs: i64) -> Timestamp {
    base_time() + Duration::seconds(secs)
}
