//! Column binders: how a cursor defines its fetch buffers, per Oracle type.
//!
//! Some native drivers fetch `LONG` columns with a tiny default buffer and
//! `TIMESTAMP` columns as a type the adapter cannot downgrade to a date. A
//! [`BinderSet`] handed to `Session::open_cursor` tells the driver how to
//! define those columns instead.

use std::collections::HashMap;
use std::sync::Arc;

use super::constants::{ORA_TYPE_NUM_LONG, ORA_TYPE_NUM_TIMESTAMP};
use crate::types::ColumnMetadata;

/// Maximum size a `LONG` column is fetched with.
pub const LONG_FETCH_SIZE: u32 = 65535;

/// How a column's fetch buffer should be defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefineAs {
    /// Fetch as character data up to `max_size` bytes.
    Text { max_size: u32 },
    /// Fetch as a DATE container.
    Date,
}

/// Chooses a fetch definition for a column.
pub trait ColumnBinder: Send + Sync {
    /// Definition for `column`, or `None` to keep the driver's default.
    fn define(&self, column: &ColumnMetadata) -> Option<DefineAs>;
}

impl<F> ColumnBinder for F
where
    F: Fn(&ColumnMetadata) -> Option<DefineAs> + Send + Sync,
{
    fn define(&self, column: &ColumnMetadata) -> Option<DefineAs> {
        self(column)
    }
}

/// Column binders keyed by Oracle type number.
#[derive(Clone, Default)]
pub struct BinderSet {
    binders: HashMap<u16, Arc<dyn ColumnBinder>>,
}

impl BinderSet {
    /// Create an empty binder set (driver defaults everywhere).
    pub fn new() -> Self {
        Self::default()
    }

    /// Binders this adapter relies on: `LONG` as text, `TIMESTAMP` as `DATE`.
    pub fn oracle_defaults() -> Self {
        Self::new()
            .with(ORA_TYPE_NUM_LONG, |_: &ColumnMetadata| {
                Some(DefineAs::Text {
                    max_size: LONG_FETCH_SIZE,
                })
            })
            .with(ORA_TYPE_NUM_TIMESTAMP, |_: &ColumnMetadata| {
                Some(DefineAs::Date)
            })
    }

    /// Register (or replace) the binder for a type number.
    pub fn with(mut self, type_num: u16, binder: impl ColumnBinder + 'static) -> Self {
        self.binders.insert(type_num, Arc::new(binder));
        self
    }

    /// Definition for a column, `None` when no binder claims its type.
    pub fn define(&self, column: &ColumnMetadata) -> Option<DefineAs> {
        self.binders
            .get(&column.oracle_type)
            .and_then(|binder| binder.define(column))
    }

    /// Definitions for every column of a cursor, in column order.
    pub fn define_all(&self, columns: &[ColumnMetadata]) -> Vec<Option<DefineAs>> {
        columns.iter().map(|c| self.define(c)).collect()
    }
}

impl std::fmt::Debug for BinderSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<_> = self.binders.keys().collect();
        keys.sort();
        f.debug_struct("BinderSet").field("types", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::constants::{ORA_TYPE_NUM_DATE, ORA_TYPE_NUM_VARCHAR};

    #[test]
    fn test_oracle_defaults() {
        let binders = BinderSet::oracle_defaults();
        let columns = vec![
            ColumnMetadata::new("NOTES", ORA_TYPE_NUM_LONG),
            ColumnMetadata::new("UPDATED", ORA_TYPE_NUM_TIMESTAMP),
            ColumnMetadata::new("NAME", ORA_TYPE_NUM_VARCHAR),
        ];
        assert_eq!(
            binders.define_all(&columns),
            vec![
                Some(DefineAs::Text {
                    max_size: LONG_FETCH_SIZE
                }),
                Some(DefineAs::Date),
                None
            ]
        );
    }

    #[test]
    fn test_custom_binder_replaces_default() {
        let binders = BinderSet::oracle_defaults().with(ORA_TYPE_NUM_LONG, |c: &ColumnMetadata| {
            (c.name == "BIG").then_some(DefineAs::Text { max_size: 1 << 20 })
        });

        let big = ColumnMetadata::new("BIG", ORA_TYPE_NUM_LONG);
        let small = ColumnMetadata::new("SMALL", ORA_TYPE_NUM_LONG);
        assert_eq!(
            binders.define(&big),
            Some(DefineAs::Text { max_size: 1 << 20 })
        );
        assert_eq!(binders.define(&small), None);
        assert_eq!(
            binders.define(&ColumnMetadata::new("D", ORA_TYPE_NUM_DATE)),
            None
        );
    }
}
