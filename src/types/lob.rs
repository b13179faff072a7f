//! LOB (Large Object) handles for CLOB and BLOB columns.
//!
//! The driver returns LOB columns in one of two shapes:
//! 1. **Prefetched**: the data arrives inline with the row, next to the locator
//! 2. **Locator only**: the data must be read through `Session::read_lob`
//!
//! Writable handles (see [`crate::mapper::WRITABLE_LOB_QUERY`]) are always
//! locator-only from the caller's point of view: the bytes go back through
//! `Session::write_lob`.

/// Kind of large object behind a locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LobKind {
    /// Binary large object.
    Blob,
    /// Character large object.
    Clob,
}

impl LobKind {
    /// The SQL constructor producing an empty LOB of this kind.
    pub fn empty_constructor(&self) -> &'static str {
        match self {
            LobKind::Blob => "EMPTY_BLOB()",
            LobKind::Clob => "EMPTY_CLOB()",
        }
    }

    /// Resolve a LOB kind from a declared column type (`BLOB`, `CLOB`, `NCLOB`).
    pub fn from_type_name(type_name: &str) -> Option<Self> {
        let upper = type_name.to_ascii_uppercase();
        if upper.contains("BLOB") {
            Some(LobKind::Blob)
        } else if upper.contains("CLOB") {
            Some(LobKind::Clob)
        } else {
            None
        }
    }
}

/// LOB locator handle returned by the driver.
///
/// The locator is an opaque byte sequence identifying one LOB in the
/// database; only the driver interprets it.
#[derive(Debug, Clone, PartialEq)]
pub struct LobLocator {
    /// Kind of LOB this locator points at.
    pub kind: LobKind,
    /// Raw locator bytes from the driver.
    pub locator: Vec<u8>,
    /// Total size of the LOB in characters (CLOB) or bytes (BLOB).
    pub size: u64,
    /// Recommended chunk size for read/write operations.
    pub chunk_size: u32,
}

impl LobLocator {
    /// Create a new LOB locator.
    pub fn new(kind: LobKind, locator: Vec<u8>, size: u64, chunk_size: u32) -> Self {
        Self {
            kind,
            locator,
            size,
            chunk_size,
        }
    }

    /// Check if this locator refers to a BLOB.
    pub fn is_blob(&self) -> bool {
        self.kind == LobKind::Blob
    }
}

/// LOB value that may contain prefetched data or just a locator.
#[derive(Debug, Clone, PartialEq)]
pub struct LobValue {
    /// The LOB locator (always present).
    pub locator: LobLocator,
    /// Prefetched data: UTF-8 text for CLOB, raw bytes for BLOB.
    pub data: Option<Vec<u8>>,
}

impl LobValue {
    /// Create a LOB value with prefetched data.
    pub fn with_data(locator: LobLocator, data: Vec<u8>) -> Self {
        Self {
            locator,
            data: Some(data),
        }
    }

    /// Create a LOB value with only a locator (data must be read separately).
    pub fn locator_only(locator: LobLocator) -> Self {
        Self {
            locator,
            data: None,
        }
    }

    /// Check if the LOB data was prefetched.
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    /// Get the prefetched data as bytes.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        self.data.as_deref()
    }

    /// Get the LOB kind.
    pub fn kind(&self) -> LobKind {
        self.locator.kind
    }

    /// Get the LOB size in characters (CLOB) or bytes (BLOB).
    pub fn size(&self) -> u64 {
        self.locator.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lob_kind_from_type_name() {
        assert_eq!(LobKind::from_type_name("BLOB"), Some(LobKind::Blob));
        assert_eq!(LobKind::from_type_name("clob"), Some(LobKind::Clob));
        assert_eq!(LobKind::from_type_name("NCLOB"), Some(LobKind::Clob));
        assert_eq!(LobKind::from_type_name("VARCHAR2"), None);
    }

    #[test]
    fn test_empty_constructor() {
        assert_eq!(LobKind::Blob.empty_constructor(), "EMPTY_BLOB()");
        assert_eq!(LobKind::Clob.empty_constructor(), "EMPTY_CLOB()");
    }

    #[test]
    fn test_lob_value_with_data() {
        let locator = LobLocator::new(LobKind::Clob, vec![1, 2, 3, 4], 5, 8192);
        let value = LobValue::with_data(locator, b"hello".to_vec());

        assert!(value.has_data());
        assert_eq!(value.as_bytes(), Some(b"hello".as_slice()));
        assert_eq!(value.size(), 5);
        assert_eq!(value.kind(), LobKind::Clob);
    }

    #[test]
    fn test_lob_value_locator_only() {
        let locator = LobLocator::new(LobKind::Blob, vec![1, 2, 3, 4], 1000000, 8192);
        let value = LobValue::locator_only(locator);

        assert!(!value.has_data());
        assert!(value.locator.is_blob());
        assert_eq!(value.size(), 1000000);
    }
}
