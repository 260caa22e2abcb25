//! Extraction date range resolution

use crate::config::DateRangeConfig;
use crate::domain::{DateRange, ExtractionPolicy, Result, SyncError};
use chrono::Days;

impl ExtractionPolicy {
    /// Build a policy from the `[date_range]` configuration section
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] for an unknown `type` or a
    /// missing field required by the selected type.
    pub fn from_config(config: &DateRangeConfig) -> Result<Self> {
        let missing = |field: &str| {
            SyncError::Configuration(format!(
                "date_range.{field} is required when type = '{}'",
                config.range_type
            ))
        };

        match config.range_type.as_str() {
            "date_range" => Ok(ExtractionPolicy::ExplicitRange {
                start_date: config.start_date.ok_or_else(|| missing("start_date"))?,
                end_date: config.end_date.ok_or_else(|| missing("end_date"))?,
            }),
            "days" => Ok(ExtractionPolicy::TrailingWindow {
                end_date: config.end_date.ok_or_else(|| missing("end_date"))?,
                max_days: config
                    .max_days_extraction
                    .ok_or_else(|| missing("max_days_extraction"))?,
            }),
            other => Err(SyncError::Configuration(format!(
                "Unknown date_range.type '{other}'. Must be one of: date_range, days"
            ))),
        }
    }
}

/// Turns an [`ExtractionPolicy`] into a concrete [`DateRange`]
///
/// Pure: the wall clock is never consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateRangeResolver;

impl DateRangeResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `policy` to an inclusive date range
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Configuration`] when an explicit range does not
    /// have `start_date < end_date`, or a trailing window reaches before the
    /// earliest representable date.
    pub fn resolve(&self, policy: &ExtractionPolicy) -> Result<DateRange> {
        let range = match *policy {
            ExtractionPolicy::ExplicitRange {
                start_date,
                end_date,
            } => {
                if start_date >= end_date {
                    return Err(SyncError::Configuration(format!(
                        "start_date ({start_date}) must be earlier than end_date ({end_date})"
                    )));
                }
                DateRange::new(start_date, end_date)
            }
            ExtractionPolicy::TrailingWindow { end_date, max_days } => {
                let start_date = end_date
                    .checked_sub_days(Days::new(u64::from(max_days)))
                    .ok_or_else(|| {
                        SyncError::Configuration(format!(
                            "max_days_extraction {max_days} reaches before the earliest supported date"
                        ))
                    })?;
                DateRange::new(start_date, end_date)
            }
        };

        tracing::info!(
            policy = policy.kind(),
            start_date = %range.start_date(),
            end_date = %range.end_date(),
            "Resolved extraction date range"
        );

        Ok(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use test_case::test_case;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_explicit_range_verbatim() {
        let policy = ExtractionPolicy::ExplicitRange {
            start_date: date(2024, 1, 1),
            end_date: date(2024, 1, 31),
        };
        let range = DateRangeResolver::new().resolve(&policy).unwrap();
        assert_eq!(range.start_date(), date(2024, 1, 1));
        assert_eq!(range.end_date(), date(2024, 1, 31));
    }

    #[test_case(date(2024, 1, 31), date(2024, 1, 1) ; "reversed")]
    #[test_case(date(2024, 1, 15), date(2024, 1, 15) ; "equal")]
    fn test_explicit_range_rejects_bad_order(start: NaiveDate, end: NaiveDate) {
        let policy = ExtractionPolicy::ExplicitRange {
            start_date: start,
            end_date: end,
        };
        let err = DateRangeResolver::new().resolve(&policy).unwrap_err();
        assert!(err.is_configuration());
    }

    #[test_case(0, date(2024, 3, 10) ; "zero days is a single day")]
    #[test_case(1, date(2024, 3, 9) ; "one day")]
    #[test_case(7, date(2024, 3, 3) ; "one week")]
    #[test_case(10, date(2024, 2, 29) ; "crosses leap day")]
    #[test_case(365, date(2023, 3, 11) ; "one year")]
    fn test_trailing_window(max_days: u32, expected_start: NaiveDate) {
        let policy = ExtractionPolicy::TrailingWindow {
            end_date: date(2024, 3, 10),
            max_days,
        };
        let range = DateRangeResolver::new().resolve(&policy).unwrap();
        assert_eq!(range.start_date(), expected_start);
        assert_eq!(range.end_date(), date(2024, 3, 10));
    }

    #[test]
    fn test_trailing_window_underflow() {
        let policy = ExtractionPolicy::TrailingWindow {
            end_date: NaiveDate::MIN,
            max_days: 1,
        };
        assert!(DateRangeResolver::new().resolve(&policy).is_err());
    }

    #[test]
    fn test_policy_from_config() {
        let mut config = DateRangeConfig {
            range_type: "days".to_string(),
            start_date: None,
            end_date: Some(date(2024, 1, 31)),
            max_days_extraction: Some(7),
        };
        assert_eq!(
            ExtractionPolicy::from_config(&config).unwrap(),
            ExtractionPolicy::TrailingWindow {
                end_date: date(2024, 1, 31),
                max_days: 7
            }
        );

        config.range_type = "date_range".to_string();
        let err = ExtractionPolicy::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("start_date"));

        config.range_type = "months".to_string();
        assert!(ExtractionPolicy::from_config(&config).unwrap_err().is_configuration());
    }
}
