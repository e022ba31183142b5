use crate::constants::MAX_TICK_PERIOD_MS;
use crate::error::AppError;
use crate::models::Interval;
use std::time::Duration;

/// Validate the tick period in milliseconds.
/// Returns Ok(period) if valid.
pub fn validate_tick_period_ms(period_ms: u64) -> Result<Duration, AppError> {
    if period_ms == 0 {
        return Err(AppError::InvalidInput {
            field: "tickPeriodMs",
            reason: "must be positive".into(),
        });
    }
    if period_ms > MAX_TICK_PERIOD_MS {
        return Err(AppError::InvalidInput {
            field: "tickPeriodMs",
            reason: format!("cannot exceed {MAX_TICK_PERIOD_MS} ms"),
        });
    }
    Ok(Duration::from_millis(period_ms))
}

/// Validate that the end date is not before the start date.
///
/// Half-filled intervals pass; they are simply never in range.
pub fn validate_interval(interval: &Interval) -> Result<(), AppError> {
    if interval.is_valid() {
        Ok(())
    } else {
        Err(AppError::InvalidInput {
            field: "endDate",
            reason: "end date must be after the start date".into(),
        })
    }
}
