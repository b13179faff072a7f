//! Oracle data type numbers as reported in cursor column metadata.

pub const ORA_TYPE_NUM_VARCHAR: u16 = 1;
pub const ORA_TYPE_NUM_NUMBER: u16 = 2;
pub const ORA_TYPE_NUM_BINARY_INTEGER: u16 = 3;
pub const ORA_TYPE_NUM_LONG: u16 = 8;
pub const ORA_TYPE_NUM_ROWID: u16 = 11;
pub const ORA_TYPE_NUM_DATE: u16 = 12;
pub const ORA_TYPE_NUM_RAW: u16 = 23;
pub const ORA_TYPE_NUM_LONG_RAW: u16 = 24;
pub const ORA_TYPE_NUM_CHAR: u16 = 96;
pub const ORA_TYPE_NUM_BINARY_FLOAT: u16 = 100;
pub const ORA_TYPE_NUM_BINARY_DOUBLE: u16 = 101;
pub const ORA_TYPE_NUM_CLOB: u16 = 112;
pub const ORA_TYPE_NUM_BLOB: u16 = 113;
pub const ORA_TYPE_NUM_TIMESTAMP: u16 = 180;
pub const ORA_TYPE_NUM_TIMESTAMP_TZ: u16 = 181;
pub const ORA_TYPE_NUM_TIMESTAMP_LTZ: u16 = 231;

/// Declared type name for an Oracle type number, `None` for types this
/// adapter does not describe.
pub fn type_name(type_num: u16) -> Option<&'static str> {
    let name = match type_num {
        ORA_TYPE_NUM_VARCHAR => "VARCHAR2",
        ORA_TYPE_NUM_NUMBER => "NUMBER",
        ORA_TYPE_NUM_BINARY_INTEGER => "BINARY_INTEGER",
        ORA_TYPE_NUM_LONG => "LONG",
        ORA_TYPE_NUM_ROWID => "ROWID",
        ORA_TYPE_NUM_DATE => "DATE",
        ORA_TYPE_NUM_RAW => "RAW",
        ORA_TYPE_NUM_LONG_RAW => "LONG RAW",
        ORA_TYPE_NUM_CHAR => "CHAR",
        ORA_TYPE_NUM_BINARY_FLOAT => "BINARY_FLOAT",
        ORA_TYPE_NUM_BINARY_DOUBLE => "BINARY_DOUBLE",
        ORA_TYPE_NUM_CLOB => "CLOB",
        ORA_TYPE_NUM_BLOB => "BLOB",
        ORA_TYPE_NUM_TIMESTAMP => "TIMESTAMP",
        ORA_TYPE_NUM_TIMESTAMP_TZ => "TIMESTAMP WITH TIME ZONE",
        ORA_TYPE_NUM_TIMESTAMP_LTZ => "TIMESTAMP WITH LOCAL TIME ZONE",
        _ => return None,
    };
    Some(name)
}
