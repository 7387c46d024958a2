//! Source readers for the three student-records inputs. Each reader yields
//! untyped [`RawRecord`]s in source order; interpretation of columns belongs
//! to the normalizer.

use crate::domain::model::RawRecord;
use crate::utils::error::{EtlError, Result};
use std::collections::HashMap;
use std::path::Path;

/// Reads the `student` and `acad_prog` tables from the relational snapshot.
pub async fn read_snapshot(path: &str) -> Result<(Vec<RawRecord>, Vec<RawRecord>)> {
    let conn = rusqlite::Connection::open_with_flags(
        path,
        rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
    )?;

    let students = read_table(&conn, "student")?;
    let programs = read_table(&conn, "acad_prog")?;

    tracing::debug!(
        "Snapshot read: {} student rows, {} acad_prog rows",
        students.len(),
        programs.len()
    );

    Ok((students, programs))
}

fn read_table(conn: &rusqlite::Connection, table: &str) -> Result<Vec<RawRecord>> {
    let mut stmt = conn.prepare(&format!("SELECT * FROM {}", table))?;
    let column_count = stmt.column_count();
    let columns: Vec<String> = (0..column_count)
        .map(|i| stmt.column_name(i).unwrap_or("?").to_string())
        .collect();

    let mut records = Vec::new();
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let mut data = HashMap::new();
        for (i, column) in columns.iter().enumerate() {
            let value = match row.get_ref(i) {
                Ok(rusqlite::types::ValueRef::Null) => serde_json::Value::Null,
                Ok(rusqlite::types::ValueRef::Integer(n)) => serde_json::json!(n),
                Ok(rusqlite::types::ValueRef::Real(f)) => serde_json::Number::from_f64(f)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
                Ok(rusqlite::types::ValueRef::Text(t)) => {
                    serde_json::Value::String(String::from_utf8_lossy(t).into_owned())
                }
                Ok(rusqlite::types::ValueRef::Blob(_)) => serde_json::Value::Null,
                Err(_) => serde_json::Value::Null,
            };
            data.insert(column.clone(), value);
        }
        records.push(RawRecord::new(data));
    }

    Ok(records)
}

/// Reads the pipe-delimited enrollment stream. All fields are kept as
/// strings; credit-hour casting happens in the normalizer.
pub async fn read_delimited(path: &str) -> Result<Vec<RawRecord>> {
    let content = tokio::fs::read_to_string(path).await?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'|')
        .has_headers(true)
        .flexible(true)
        .from_reader(content.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let mut data = HashMap::new();
        for (i, header) in headers.iter().enumerate() {
            let value = row
                .get(i)
                .map(|v| serde_json::Value::String(v.to_string()))
                .unwrap_or(serde_json::Value::Null);
            data.insert(header.clone(), value);
        }
        records.push(RawRecord::new(data));
    }

    tracing::debug!("Delimited read: {} enrollment rows", records.len());

    Ok(records)
}

/// Reads the department reference file: a JSON array of objects.
pub async fn read_departments(path: &str) -> Result<Vec<RawRecord>> {
    let content = tokio::fs::read_to_string(path).await?;
    let value: serde_json::Value = serde_json::from_str(&content)?;

    let items = match value {
        serde_json::Value::Array(items) => items,
        other => {
            return Err(EtlError::ProcessingError {
                message: format!(
                    "Department reference file must be a JSON array, found {}",
                    json_type_name(&other)
                ),
            })
        }
    };

    let mut records = Vec::new();
    for item in items {
        match item {
            serde_json::Value::Object(obj) => {
                records.push(RawRecord::new(obj.into_iter().collect()));
            }
            other => {
                return Err(EtlError::ProcessingError {
                    message: format!(
                        "Department entries must be JSON objects, found {}",
                        json_type_name(&other)
                    ),
                })
            }
        }
    }

    tracing::debug!("Department reference read: {} rows", records.len());

    Ok(records)
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Pre-flight check that every input file exists, so a missing source is
/// reported by name before any load starts.
pub fn check_input_files(inputs: &[(&str, &str)]) -> Result<()> {
    let missing: Vec<&str> = inputs
        .iter()
        .filter(|(_, path)| !Path::new(path).exists())
        .map(|(name, _)| *name)
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(EtlError::PreconditionError {
            message: format!("missing required input files: {}", missing.join(", ")),
        })
    }
}
