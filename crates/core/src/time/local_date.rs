use anyhow::Context;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// The farmer's calendar date. An explicit `YYYY-MM-DD` wins over the clock.
pub fn resolve_today(
    today_arg: Option<&str>,
    now_utc: DateTime<Utc>,
    utc_offset_minutes: i32,
) -> anyhow::Result<NaiveDate> {
    if let Some(s) = today_arg {
        return NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .with_context(|| format!("invalid date {s:?}; expected YYYY-MM-DD"));
    }

    let offset = FixedOffset::east_opt(utc_offset_minutes * 60)
        .with_context(|| format!("invalid UTC offset: {utc_offset_minutes} minutes"))?;
    Ok(now_utc.with_timezone(&offset).date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn explicit_date_wins() {
        let now = Utc.with_ymd_and_hms(2026, 1, 3, 8, 0, 0).unwrap();
        let d = resolve_today(Some("2025-11-20"), now, 330).unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2025, 11, 20).unwrap());
    }

    #[test]
    fn rolls_over_at_local_midnight() {
        // 2026-05-31 19:00 UTC = 2026-06-01 00:30 IST
        let now = Utc.with_ymd_and_hms(2026, 5, 31, 19, 0, 0).unwrap();
        assert_eq!(
            resolve_today(None, now, 330).unwrap(),
            NaiveDate::from_ymd_opt(2026, 6, 1).unwrap()
        );
        assert_eq!(
            resolve_today(None, now, 0).unwrap(),
            NaiveDate::from_ymd_opt(2026, 5, 31).unwrap()
        );
    }

    #[test]
    fn rejects_malformed_dates() {
        let now = Utc.with_ymd_and_hms(2026, 1, 3, 8, 0, 0).unwrap();
        assert!(resolve_today(Some("20260103"), now, 330).is_err());
    }
}
