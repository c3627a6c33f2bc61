//! Stay pricing
//!
//! A stay covers an inclusive date range; the total is the per-day rate
//! times the day count, computed in fixed-point decimal arithmetic. The
//! result carries the scale of the rate (typically 2 decimal places).

use chrono::NaiveDate;
use rentora_core::{AppError, AppResult};
use rust_decimal::Decimal;

/// Inclusive day count of a stay: `(end - start) + 1`
///
/// Fails with `InvalidDateRange` when `end` is before `start`.
pub fn stay_days(start: NaiveDate, end: NaiveDate) -> AppResult<i64> {
    if end < start {
        return Err(AppError::InvalidDateRange { start, end });
    }
    Ok((end - start).num_days() + 1)
}

/// Total price of a stay: `rate_per_day * stay_days(start, end)`
pub fn quote(rate_per_day: Decimal, start: NaiveDate, end: NaiveDate) -> AppResult<Decimal> {
    let days = stay_days(start, end)?;
    Ok(rate_per_day * Decimal::from(days))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_count_is_inclusive() {
        assert_eq!(
            stay_days(date(2024, 1, 1), date(2024, 1, 5)).unwrap(),
            5
        );
        // a one-day stay still costs one day
        assert_eq!(
            stay_days(date(2024, 1, 1), date(2024, 1, 1)).unwrap(),
            1
        );
        // across a month boundary
        assert_eq!(
            stay_days(date(2024, 1, 30), date(2024, 2, 2)).unwrap(),
            4
        );
    }

    #[test]
    fn test_quote() {
        assert_eq!(
            quote(dec!(120.00), date(2024, 1, 1), date(2024, 1, 5)).unwrap(),
            dec!(600.00)
        );
        assert_eq!(
            quote(dec!(99.95), date(2024, 1, 1), date(2024, 1, 1)).unwrap(),
            dec!(99.95)
        );
        // scale of the rate is preserved
        assert_eq!(
            quote(dec!(0.10), date(2024, 1, 1), date(2024, 1, 3)).unwrap(),
            dec!(0.30)
        );
    }

    #[test]
    fn test_end_before_start() {
        let err = stay_days(date(2024, 1, 10), date(2024, 1, 5)).unwrap_err();
        assert_eq!(err.error_code(), "invalid_date_range");

        let err = quote(dec!(50.00), date(2024, 1, 10), date(2024, 1, 5)).unwrap_err();
        assert_eq!(err.error_code(), "invalid_date_range");
    }
}
