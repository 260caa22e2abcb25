//! Conversion of BigQuery JSON result pages into Arrow record batches
//!
//! BigQuery returns every scalar cell as a JSON string (or null). Repeated
//! columns are arrays of `{"v": ...}` and RECORD columns are `{"f": [...]}`
//! objects, nested arbitrarily. Every Arrow field produced here is nullable.

use super::models::{TableFieldSchema, TableRow};
use crate::domain::{RemoteQueryError, Result, SyncError};
use base64::{engine::general_purpose, Engine as _};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use duckdb::arrow::array::{
    ArrayRef, BinaryBuilder, BooleanBuilder, ListArray, PrimitiveBuilder, StringBuilder,
    StructArray,
};
use duckdb::arrow::buffer::{NullBuffer, OffsetBuffer};
use duckdb::arrow::datatypes::{
    ArrowPrimitiveType, DataType, Date32Type, Field, FieldRef, Fields, Float64Type, Int64Type,
    Schema, SchemaRef, Time64MicrosecondType, TimeUnit, TimestampMicrosecondType,
};
use duckdb::arrow::record_batch::{RecordBatch, RecordBatchOptions};
use serde_json::Value;
use std::borrow::Cow;
use std::sync::Arc;

static NULL: Value = Value::Null;

/// Build the Arrow schema for a BigQuery result schema
///
/// # Errors
///
/// Returns [`RemoteQueryError::UnsupportedType`] for a column type with no
/// Arrow mapping.
pub fn arrow_schema(fields: &[TableFieldSchema]) -> Result<SchemaRef> {
    let fields = fields.iter().map(arrow_field).collect::<Result<Vec<_>>>()?;
    Ok(Arc::new(Schema::new(fields)))
}

fn arrow_field(field: &TableFieldSchema) -> Result<Field> {
    let base = base_data_type(field)?;
    let data_type = if field.is_repeated() {
        DataType::List(Arc::new(Field::new("item", base, true)))
    } else {
        base
    };
    Ok(Field::new(&field.name, data_type, true))
}

fn base_data_type(field: &TableFieldSchema) -> Result<DataType> {
    let data_type = match field.field_type.to_ascii_uppercase().as_str() {
        "STRING" | "GEOGRAPHY" | "JSON" | "NUMERIC" | "BIGNUMERIC" | "INTERVAL" | "RANGE" => {
            DataType::Utf8
        }
        "BYTES" => DataType::Binary,
        "INTEGER" | "INT64" => DataType::Int64,
        "FLOAT" | "FLOAT64" => DataType::Float64,
        "BOOLEAN" | "BOOL" => DataType::Boolean,
        "TIMESTAMP" | "DATETIME" => DataType::Timestamp(TimeUnit::Microsecond, None),
        "DATE" => DataType::Date32,
        "TIME" => DataType::Time64(TimeUnit::Microsecond),
        "RECORD" | "STRUCT" => {
            let children = field
                .fields
                .iter()
                .map(arrow_field)
                .collect::<Result<Vec<_>>>()?;
            DataType::Struct(Fields::from(children))
        }
        other => {
            return Err(RemoteQueryError::UnsupportedType {
                column: field.name.clone(),
                field_type: other.to_string(),
            }
            .into())
        }
    };
    Ok(data_type)
}

/// Convert one page of rows into a record batch with the given schema
///
/// `schema` must have been produced by [`arrow_schema`] from `fields`.
pub fn rows_to_record_batch(
    schema: &SchemaRef,
    fields: &[TableFieldSchema],
    rows: &[TableRow],
) -> Result<RecordBatch> {
    let mut columns = Vec::with_capacity(fields.len());
    for (index, (field, arrow)) in fields.iter().zip(schema.fields().iter()).enumerate() {
        let values: Vec<&Value> = rows
            .iter()
            .map(|row| row.f.get(index).map(|cell| &cell.v).unwrap_or(&NULL))
            .collect();
        columns.push(build_column(field, arrow.data_type(), &values)?);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(rows.len()));
    Ok(RecordBatch::try_new_with_options(
        schema.clone(),
        columns,
        &options,
    )?)
}

/// Unwrap the `{"v": x}` envelope used for repeated items and record fields
fn cell_value(value: &Value) -> &Value {
    match value {
        Value::Object(map) if map.len() == 1 => map.get("v").unwrap_or(value),
        _ => value,
    }
}

fn build_column(
    field: &TableFieldSchema,
    data_type: &DataType,
    values: &[&Value],
) -> Result<ArrayRef> {
    match data_type {
        DataType::List(item) if field.is_repeated() => build_list(field, item, values),
        _ => build_single(field, data_type, values),
    }
}

fn build_list(field: &TableFieldSchema, item: &FieldRef, values: &[&Value]) -> Result<ArrayRef> {
    let mut lengths = Vec::with_capacity(values.len());
    let mut items: Vec<&Value> = Vec::new();

    for value in values {
        match cell_value(value) {
            Value::Null => lengths.push(0),
            Value::Array(elements) => {
                lengths.push(elements.len());
                items.extend(elements.iter().map(cell_value));
            }
            other => return Err(invalid_cell(field, other)),
        }
    }

    let child = build_single(field, item.data_type(), &items)?;
    let array = ListArray::try_new(item.clone(), OffsetBuffer::from_lengths(lengths), child, None)?;
    Ok(Arc::new(array))
}

fn build_single(field: &TableFieldSchema, data_type: &DataType, values: &[&Value]) -> Result<ArrayRef> {
    match data_type {
        DataType::Utf8 => {
            let mut builder = StringBuilder::with_capacity(values.len(), values.len() * 16);
            for value in values {
                builder.append_option(scalar_text(field, value)?);
            }
            Ok(Arc::new(builder.finish()))
        }
        DataType::Binary => {
            let mut builder = BinaryBuilder::with_capacity(values.len(), values.len() * 16);
            for value in values {
                match scalar_text(field, value)? {
                    Some(text) => {
                        let bytes = general_purpose::STANDARD
                            .decode(text.as_bytes())
                            .map_err(|e| invalid_value(field, &text, e))?;
                        builder.append_value(bytes);
                    }
                    None => builder.append_null(),
                }
            }
            Ok(Arc::new(builder.finish()))
        }
        DataType::Boolean => {
            let mut builder = BooleanBuilder::with_capacity(values.len());
            for value in values {
                let parsed = match scalar_text(field, value)? {
                    Some(text) => Some(parse_bool(field, &text)?),
                    None => None,
                };
                builder.append_option(parsed);
            }
            Ok(Arc::new(builder.finish()))
        }
        DataType::Int64 => build_primitive::<Int64Type, _>(field, values, |text| {
            text.parse::<i64>().map_err(|e| invalid_value(field, text, e))
        }),
        DataType::Float64 => build_primitive::<Float64Type, _>(field, values, |text| parse_float(field, text)),
        DataType::Timestamp(TimeUnit::Microsecond, None) => {
            if field.field_type.eq_ignore_ascii_case("DATETIME") {
                build_primitive::<TimestampMicrosecondType, _>(field, values, |text| {
                    parse_datetime_micros(field, text)
                })
            } else {
                build_primitive::<TimestampMicrosecondType, _>(field, values, |text| {
                    parse_timestamp_micros(field, text)
                })
            }
        }
        DataType::Date32 => build_primitive::<Date32Type, _>(field, values, |text| parse_date_days(field, text)),
        DataType::Time64(TimeUnit::Microsecond) => {
            build_primitive::<Time64MicrosecondType, _>(field, values, |text| parse_time_micros(field, text))
        }
        DataType::Struct(children) => build_struct(field, children, values),
        other => Err(RemoteQueryError::UnsupportedType {
            column: field.name.clone(),
            field_type: other.to_string(),
        }
        .into()),
    }
}

fn build_struct(field: &TableFieldSchema, children: &Fields, values: &[&Value]) -> Result<ArrayRef> {
    let mut validity = Vec::with_capacity(values.len());
    let mut records: Vec<Option<&Vec<Value>>> = Vec::with_capacity(values.len());

    for value in values {
        match cell_value(value) {
            Value::Null => {
                validity.push(false);
                records.push(None);
            }
            Value::Object(map) => match map.get("f") {
                Some(Value::Array(cells)) => {
                    validity.push(true);
                    records.push(Some(cells));
                }
                _ => return Err(invalid_cell(field, value)),
            },
            other => return Err(invalid_cell(field, other)),
        }
    }

    let mut arrays = Vec::with_capacity(children.len());
    for (index, (child_schema, child_field)) in field.fields.iter().zip(children.iter()).enumerate() {
        let child_values: Vec<&Value> = records
            .iter()
            .map(|record| {
                record
                    .and_then(|cells| cells.get(index))
                    .map(cell_value)
                    .unwrap_or(&NULL)
            })
            .collect();
        arrays.push(build_column(child_schema, child_field.data_type(), &child_values)?);
    }

    let nulls = if validity.iter().all(|valid| *valid) {
        None
    } else {
        Some(NullBuffer::from(validity))
    };
    let array = StructArray::try_new(children.clone(), arrays, nulls)?;
    Ok(Arc::new(array))
}

fn build_primitive<T, F>(field: &TableFieldSchema, values: &[&Value], parse: F) -> Result<ArrayRef>
where
    T: ArrowPrimitiveType,
    F: Fn(&str) -> Result<T::Native>,
{
    let mut builder = PrimitiveBuilder::<T>::with_capacity(values.len());
    for value in values {
        match scalar_text(field, value)? {
            Some(text) => builder.append_value(parse(&text)?),
            None => builder.append_null(),
        }
    }
    Ok(Arc::new(builder.finish()))
}

/// Text of a scalar cell; `None` for null
fn scalar_text<'a>(field: &TableFieldSchema, value: &'a Value) -> Result<Option<Cow<'a, str>>> {
    match cell_value(value) {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(Cow::Borrowed(s.as_str()))),
        Value::Number(n) => Ok(Some(Cow::Owned(n.to_string()))),
        Value::Bool(b) => Ok(Some(Cow::Owned(b.to_string()))),
        other => Err(invalid_cell(field, other)),
    }
}

fn parse_bool(field: &TableFieldSchema, text: &str) -> Result<bool> {
    match text {
        "true" | "TRUE" | "True" => Ok(true),
        "false" | "FALSE" | "False" => Ok(false),
        _ => Err(invalid_value(field, text, "expected true or false")),
    }
}

fn parse_float(field: &TableFieldSchema, text: &str) -> Result<f64> {
    match text {
        "NaN" => Ok(f64::NAN),
        "Infinity" => Ok(f64::INFINITY),
        "-Infinity" => Ok(f64::NEG_INFINITY),
        _ => text.parse::<f64>().map_err(|e| invalid_value(field, text, e)),
    }
}

/// TIMESTAMP cells are int64 microseconds; older encodings use float seconds
fn parse_timestamp_micros(field: &TableFieldSchema, text: &str) -> Result<i64> {
    if let Ok(micros) = text.parse::<i64>() {
        return Ok(micros);
    }
    text.parse::<f64>()
        .map(|seconds| (seconds * 1_000_000.0).round() as i64)
        .map_err(|e| invalid_value(field, text, e))
}

fn parse_datetime_micros(field: &TableFieldSchema, text: &str) -> Result<i64> {
    NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|dt| dt.and_utc().timestamp_micros())
        .map_err(|e| invalid_value(field, text, e))
}

fn parse_date_days(field: &TableFieldSchema, text: &str) -> Result<i32> {
    let date =
        NaiveDate::parse_from_str(text, "%Y-%m-%d").map_err(|e| invalid_value(field, text, e))?;
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)
        .ok_or_else(|| invalid_value(field, text, "epoch out of range"))?;
    i32::try_from((date - epoch).num_days()).map_err(|e| invalid_value(field, text, e))
}

fn parse_time_micros(field: &TableFieldSchema, text: &str) -> Result<i64> {
    let time =
        NaiveTime::parse_from_str(text, "%H:%M:%S%.f").map_err(|e| invalid_value(field, text, e))?;
    Ok(i64::from(time.num_seconds_from_midnight()) * 1_000_000
        + i64::from(time.nanosecond() / 1_000))
}

fn invalid_value(field: &TableFieldSchema, text: &str, reason: impl std::fmt::Display) -> SyncError {
    RemoteQueryError::InvalidResponse(format!(
        "column '{}' ({}): cannot parse '{}': {}",
        field.name, field.field_type, text, reason
    ))
    .into()
}

fn invalid_cell(field: &TableFieldSchema, value: &Value) -> SyncError {
    RemoteQueryError::InvalidResponse(format!(
        "column '{}' ({}): unexpected cell {}",
        field.name, field.field_type, value
    ))
    .into()
}
