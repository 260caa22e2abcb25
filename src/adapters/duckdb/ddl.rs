//! Arrow schema to DuckDB DDL

use crate::domain::ids::TableName;
use crate::domain::{Result, SyncError};
use duckdb::arrow::datatypes::{DataType, Schema};

/// Quote an identifier for DuckDB, doubling embedded quotes
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// DuckDB column type for an Arrow data type
///
/// Returns `None` for types with no DuckDB equivalent.
pub fn duckdb_type(data_type: &DataType) -> Option<String> {
    let sql = match data_type {
        DataType::Boolean => "BOOLEAN".to_string(),
        DataType::Int8 => "TINYINT".to_string(),
        DataType::Int16 => "SMALLINT".to_string(),
        DataType::Int32 => "INTEGER".to_string(),
        DataType::Int64 => "BIGINT".to_string(),
        DataType::UInt8 => "UTINYINT".to_string(),
        DataType::UInt16 => "USMALLINT".to_string(),
        DataType::UInt32 => "UINTEGER".to_string(),
        DataType::UInt64 => "UBIGINT".to_string(),
        DataType::Float16 | DataType::Float32 => "FLOAT".to_string(),
        DataType::Float64 => "DOUBLE".to_string(),
        DataType::Utf8 | DataType::LargeUtf8 => "VARCHAR".to_string(),
        DataType::Binary | DataType::LargeBinary => "BLOB".to_string(),
        DataType::Date32 => "DATE".to_string(),
        DataType::Time64(_) => "TIME".to_string(),
        // The appender writes timestamps without a zone; keep the column type in step
        DataType::Timestamp(_, _) => "TIMESTAMP".to_string(),
        DataType::Decimal128(precision, scale) => format!("DECIMAL({precision}, {scale})"),
        DataType::List(item) | DataType::LargeList(item) => {
            format!("{}[]", duckdb_type(item.data_type())?)
        }
        DataType::Struct(fields) => {
            let members = fields
                .iter()
                .map(|f| Some(format!("{} {}", quote_identifier(f.name()), duckdb_type(f.data_type())?)))
                .collect::<Option<Vec<_>>>()?;
            format!("STRUCT({})", members.join(", "))
        }
        _ => return None,
    };
    Some(sql)
}

/// `CREATE TABLE` statement with the columns of `schema`, in order
///
/// # Errors
///
/// Returns [`SyncError::Database`] naming the first column whose type has
/// no DuckDB equivalent.
pub fn create_table_sql(table: &TableName, schema: &Schema) -> Result<String> {
    if schema.fields().is_empty() {
        return Err(SyncError::Database(format!(
            "Cannot create table '{table}' from a batch without columns"
        )));
    }

    let columns = schema
        .fields()
        .iter()
        .map(|field| {
            let sql_type = duckdb_type(field.data_type()).ok_or_else(|| {
                SyncError::Database(format!(
                    "Column '{}' has type {} which has no DuckDB equivalent",
                    field.name(),
                    field.data_type()
                ))
            })?;
            Ok(format!("{} {}", quote_identifier(field.name()), sql_type))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(format!(
        "CREATE TABLE {} ({})",
        table.quoted(),
        columns.join(", ")
    ))
}
