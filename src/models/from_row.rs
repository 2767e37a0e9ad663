use rusqlite::types::Type;
use rusqlite::Row;
use serde::de::DeserializeOwned;

pub trait FromSqliteRow: Sized {
    fn from_row(row: &Row) -> rusqlite::Result<Self>;
}

/// Read a nullable TEXT column holding JSON and deserialize it.
pub fn json_column<T: DeserializeOwned>(row: &Row, name: &str) -> rusqlite::Result<Option<T>> {
    let raw: Option<String> = row.get(name)?;
    match raw {
        Some(text) => serde_json::from_str(&text).map(Some).map_err(|e| {
            let idx = row.as_ref().column_index(name).unwrap_or_default();
            rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
        }),
        None => Ok(None),
    }
}
