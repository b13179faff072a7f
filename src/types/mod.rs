//! Data types flowing between the driver, the mapper and callers.

mod column;
mod index;
mod lob;
mod metadata;
mod native;
mod row;
mod value;

pub use column::{ColumnDescriptor, LogicalType};
pub use index::IndexDescriptor;
pub use lob::{LobKind, LobLocator, LobValue};
pub use metadata::ColumnMetadata;
pub use native::NativeValue;
pub use row::{ColumnInfo, Row};
pub use value::Value;
