//! Result mapper: native driver rows to normalized [`Row`]s.

mod coerce;

use std::sync::Arc;

pub use coerce::{coerce_scalar, infer_logical_type, is_null_text, parse_loose_datetime, EPOCH_YEAR};

use crate::dialect::ROW_NUMBER_COLUMN;
use crate::driver::Session;
use crate::error::{Error, Result};
use crate::types::{ColumnInfo, ColumnMetadata, LobKind, LobValue, NativeValue, Row, Value};

/// Query name hint asking for writable LOB handles instead of LOB contents.
pub const WRITABLE_LOB_QUERY: &str = "Writable Large Object";

/// Turn a database column name into a row key.
///
/// Names stored in the database's default (upper) case are lowercased;
/// names carrying any lowercase letter were quoted on creation and are kept
/// as they are.
pub fn normalize_column_name(name: &str) -> String {
    if name.chars().any(|c| c.is_lowercase()) {
        name.to_string()
    } else {
        name.to_lowercase()
    }
}

/// How LOB columns are materialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobMode {
    /// Read the full contents.
    Read,
    /// Return the locator so the caller can write through it.
    Writable,
}

impl LobMode {
    /// Pick the mode from a query name hint.
    pub fn from_hint(name_hint: Option<&str>) -> Self {
        match name_hint {
            Some(WRITABLE_LOB_QUERY) => LobMode::Writable,
            _ => LobMode::Read,
        }
    }
}

/// Maps the raw rows of one cursor.
#[derive(Debug, Clone)]
pub struct RowMapper {
    column_info: Arc<ColumnInfo>,
    /// Per raw column: whether it appears in mapped rows.
    projected: Vec<bool>,
    lob_mode: LobMode,
}

impl RowMapper {
    /// Create a mapper for a cursor's columns.
    pub fn new(columns: &[ColumnMetadata], lob_mode: LobMode) -> Self {
        let projected: Vec<bool> = columns
            .iter()
            .map(|c| !c.name.eq_ignore_ascii_case(ROW_NUMBER_COLUMN))
            .collect();
        let names = columns
            .iter()
            .zip(&projected)
            .filter(|(_, keep)| **keep)
            .map(|(c, _)| normalize_column_name(&c.name))
            .collect();
        Self {
            column_info: Arc::new(ColumnInfo::new(names)),
            projected,
            lob_mode,
        }
    }

    /// Normalized column names shared by the mapped rows.
    pub fn column_info(&self) -> &Arc<ColumnInfo> {
        &self.column_info
    }

    /// Map one raw row, reading LOB contents through `session` when needed.
    pub async fn map_row<S: Session>(&self, raw: Vec<NativeValue>, session: &mut S) -> Result<Row> {
        if raw.len() != self.projected.len() {
            return Err(Error::unexpected(format!(
                "row has {} values for {} columns",
                raw.len(),
                self.projected.len()
            )));
        }

        let mut values = Vec::with_capacity(self.column_info.len());
        for (native, keep) in raw.into_iter().zip(&self.projected) {
            if !keep {
                continue;
            }
            let value = match native {
                NativeValue::Lob(lob) => match self.lob_mode {
                    LobMode::Writable => Value::Lob(lob),
                    LobMode::Read => read_lob_contents(lob, session).await?,
                },
                other => map_scalar(other)?,
            };
            values.push(value);
        }
        Ok(Row::new(values, Arc::clone(&self.column_info)))
    }
}

/// Map a non-LOB native value.
pub fn map_scalar(native: NativeValue) -> Result<Value> {
    let value = match native {
        NativeValue::Null => Value::Null,
        NativeValue::Text(s) => Value::String(s),
        NativeValue::Number(s) => map_number(&s)?,
        NativeValue::Date(dt) | NativeValue::Timestamp(dt) => Value::date_or_datetime(dt),
        NativeValue::Raw(bytes) => Value::Binary(bytes),
        NativeValue::Lob(lob) => Value::Lob(lob),
    };
    Ok(value)
}

fn map_number(text: &str) -> Result<Value> {
    let t = text.trim();
    if let Ok(n) = t.parse::<i64>() {
        return Ok(Value::Integer(n));
    }
    t.parse::<f64>()
        .map(Value::Float)
        .map_err(|_| Error::type_conversion(format!("invalid NUMBER text: {:?}", text)))
}

async fn read_lob_contents<S: Session>(lob: LobValue, session: &mut S) -> Result<Value> {
    let kind = lob.kind();
    let bytes = match lob.data {
        Some(data) => data,
        None => session
            .read_lob(&lob.locator)
            .await
            .map_err(Error::into_resource)?,
    };
    match kind {
        LobKind::Blob => Ok(Value::Binary(bytes)),
        LobKind::Clob => String::from_utf8(bytes)
            .map(Value::String)
            .map_err(|e| Error::resource(format!("CLOB is not valid UTF-8: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::constants::{ORA_TYPE_NUM_NUMBER, ORA_TYPE_NUM_VARCHAR};
    use chrono::NaiveDate;

    #[test]
    fn test_normalize_column_name() {
        assert_eq!(normalize_column_name("FIRST_NAME"), "first_name");
        assert_eq!(normalize_column_name("ID"), "id");
        assert_eq!(normalize_column_name("firstName"), "firstName");
        assert_eq!(normalize_column_name("Mixed_CASE"), "Mixed_CASE");
        assert_eq!(normalize_column_name("COUNT(*)"), "count(*)");
    }

    #[test]
    fn test_lob_mode_from_hint() {
        assert_eq!(LobMode::from_hint(Some(WRITABLE_LOB_QUERY)), LobMode::Writable);
        assert_eq!(LobMode::from_hint(Some("User Load")), LobMode::Read);
        assert_eq!(LobMode::from_hint(None), LobMode::Read);
    }

    #[test]
    fn test_mapper_drops_row_number_column() {
        let columns = vec![
            ColumnMetadata::new("ID", ORA_TYPE_NUM_NUMBER),
            ColumnMetadata::new("NAME", ORA_TYPE_NUM_VARCHAR),
            ColumnMetadata::new("RAW_RNUM_", ORA_TYPE_NUM_NUMBER),
        ];
        let mapper = RowMapper::new(&columns, LobMode::Read);
        assert_eq!(mapper.column_info().names, vec!["id", "name"]);
    }

    #[test]
    fn test_map_scalar() {
        assert_eq!(map_scalar(NativeValue::Null).unwrap(), Value::Null);
        assert_eq!(
            map_scalar(NativeValue::Number("17".into())).unwrap(),
            Value::Integer(17)
        );
        assert_eq!(
            map_scalar(NativeValue::Number("1.25".into())).unwrap(),
            Value::Float(1.25)
        );
        assert!(map_scalar(NativeValue::Number("x".into())).is_err());

        let day = NaiveDate::from_ymd_opt(2023, 7, 1).unwrap();
        assert_eq!(
            map_scalar(NativeValue::Date(day.and_hms_opt(0, 0, 0).unwrap())).unwrap(),
            Value::Date(day)
        );
        let ts = day.and_hms_opt(8, 30, 0).unwrap();
        assert_eq!(
            map_scalar(NativeValue::Timestamp(ts)).unwrap(),
            Value::DateTime(ts)
        );
    }
}
