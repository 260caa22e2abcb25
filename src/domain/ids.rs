//! Identifier types with validation
//!
//! Newtype wrappers for names that end up interpolated into SQL text, either
//! in the BigQuery range query or in DuckDB DDL. Each type validates its
//! characters on construction so the query builders never see quoting
//! characters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Destination table name
///
/// Must start with a letter or underscore and contain only ASCII letters,
/// digits and underscores.
///
/// # Examples
///
/// ```
/// use bqsync::domain::ids::TableName;
/// use std::str::FromStr;
///
/// let table = TableName::from_str("events_raw").unwrap();
/// assert_eq!(table.as_str(), "events_raw");
/// assert!(TableName::from_str("drop table x;").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    /// Creates a new TableName from a string
    pub fn new(name: impl Into<String>) -> Result<Self, String> {
        let name = name.into();
        let mut chars = name.chars();
        match chars.next() {
            None => return Err("Table name cannot be empty".to_string()),
            Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
                return Err(format!(
                    "Invalid table name '{name}': must start with a letter or underscore"
                ))
            }
            _ => {}
        }
        if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!(
                "Invalid table name '{name}': only letters, digits and underscores are allowed"
            ));
        }
        Ok(Self(name))
    }

    /// Returns the table name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the name as a double-quoted SQL identifier
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

/// Google Cloud project identifier
///
/// Lowercase letters, digits and hyphens, optionally prefixed by a
/// `domain.tld:` scope for legacy domain-scoped projects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ProjectId(String);

impl ProjectId {
    /// Creates a new ProjectId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Project ID cannot be empty".to_string());
        }
        let valid = id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '-' | '.' | ':'));
        if !valid {
            return Err(format!(
                "Invalid project ID '{id}': only lowercase letters, digits, '-', '.' and ':' are allowed"
            ));
        }
        Ok(Self(id))
    }

    /// Returns the project ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// BigQuery dataset identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DatasetId(String);

impl DatasetId {
    /// Creates a new DatasetId from a string
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.is_empty() {
            return Err("Dataset ID cannot be empty".to_string());
        }
        if id.len() > 1024 {
            return Err("Dataset ID cannot exceed 1024 characters".to_string());
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(format!(
                "Invalid dataset ID '{id}': only letters, digits and underscores are allowed"
            ));
        }
        Ok(Self(id))
    }

    /// Returns the dataset ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_id_traits {
    ($($ty:ident),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }

            impl FromStr for $ty {
                type Err = String;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::new(s)
                }
            }

            impl TryFrom<String> for $ty {
                type Error = String;

                fn try_from(s: String) -> Result<Self, Self::Error> {
                    Self::new(s)
                }
            }

            impl From<$ty> for String {
                fn from(id: $ty) -> Self {
                    id.0
                }
            }

            impl AsRef<str> for $ty {
                fn as_ref(&self) -> &str {
                    &self.0
                }
            }
        )*
    };
}

impl_id_traits!(TableName, ProjectId, DatasetId);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_name_valid() {
        assert!(TableName::new("events").is_ok());
        assert!(TableName::new("_staging_2024").is_ok());
        assert_eq!(TableName::new("events_raw").unwrap().quoted(), "\"events_raw\"");
    }

    #[test]
    fn test_table_name_invalid() {
        assert!(TableName::new("").is_err());
        assert!(TableName::new("1events").is_err());
        assert!(TableName::new("events; drop").is_err());
        assert!(TableName::new("events\"x").is_err());
    }

    #[test]
    fn test_project_id() {
        assert!(ProjectId::new("my-project-123").is_ok());
        assert!(ProjectId::new("example.com:my-project").is_ok());
        assert!(ProjectId::new("My_Project").is_err());
        assert!(ProjectId::new("proj`; --").is_err());
        assert!(ProjectId::new("  ").is_err());
    }

    #[test]
    fn test_dataset_id() {
        assert!(DatasetId::new("analytics_123456").is_ok());
        assert!(DatasetId::new("analytics-123").is_err());
        assert!(DatasetId::new("").is_err());
    }

    #[test]
    fn test_serde_validates() {
        let ok: TableName = serde_json::from_str("\"events\"").unwrap();
        assert_eq!(ok.as_str(), "events");
        assert!(serde_json::from_str::<TableName>("\"bad name\"").is_err());
    }
}
