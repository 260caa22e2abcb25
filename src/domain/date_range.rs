//! Date range and extraction policy types

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Date format used by BigQuery sharded table suffixes
pub const PARTITION_SUFFIX_FORMAT: &str = "%Y%m%d";

/// Inclusive calendar date range bounding one extraction
///
/// Produced once per run by the resolver and never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start_date: NaiveDate,
    end_date: NaiveDate,
}

impl DateRange {
    pub(crate) fn new(start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// First day of the range (inclusive)
    pub fn start_date(&self) -> NaiveDate {
        self.start_date
    }

    /// Last day of the range (inclusive)
    pub fn end_date(&self) -> NaiveDate {
        self.end_date
    }

    /// Number of calendar days covered, both ends included
    pub fn num_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days() + 1
    }

    /// Start date as a partition suffix (`YYYYMMDD`)
    pub fn start_suffix(&self) -> String {
        self.start_date.format(PARTITION_SUFFIX_FORMAT).to_string()
    }

    /// End date as a partition suffix (`YYYYMMDD`)
    pub fn end_suffix(&self) -> String {
        self.end_date.format(PARTITION_SUFFIX_FORMAT).to_string()
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start_date, self.end_date)
    }
}

/// How the extraction date range is computed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionPolicy {
    /// Explicit start and end dates (`type = "date_range"`)
    ExplicitRange {
        start_date: NaiveDate,
        end_date: NaiveDate,
    },
    /// A window of `max_days` days ending at `end_date` (`type = "days"`)
    TrailingWindow { end_date: NaiveDate, max_days: u32 },
}

impl ExtractionPolicy {
    /// Configuration name of the policy kind
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractionPolicy::ExplicitRange { .. } => "date_range",
            ExtractionPolicy::TrailingWindow { .. } => "days",
        }
    }
}
