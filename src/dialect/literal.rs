//! Identifier and literal quoting.

use crate::types::{ColumnDescriptor, Value};

/// Words Oracle rejects as unquoted identifiers.
const RESERVED_WORDS: &[&str] = &[
    "access", "add", "all", "alter", "and", "any", "as", "asc", "audit", "between", "by", "char",
    "check", "cluster", "column", "comment", "compress", "connect", "create", "current", "date",
    "decimal", "default", "delete", "desc", "distinct", "drop", "else", "exclusive", "exists",
    "file", "float", "for", "from", "grant", "group", "having", "identified", "immediate", "in",
    "increment", "index", "initial", "insert", "integer", "intersect", "into", "is", "level",
    "like", "lock", "long", "maxextents", "minus", "mlslabel", "mode", "modify", "noaudit",
    "nocompress", "not", "nowait", "null", "number", "of", "offline", "on", "online", "option",
    "or", "order", "pctfree", "prior", "public", "raw", "rename", "resource", "revoke", "row",
    "rowid", "rownum", "rows", "select", "session", "set", "share", "size", "smallint", "start",
    "successful", "synonym", "sysdate", "table", "then", "to", "trigger", "uid", "union",
    "unique", "update", "user", "validate", "values", "varchar", "varchar2", "view", "whenever",
    "where", "with",
];

/// Whether `name` can be written bare and still resolve to itself.
///
/// Unquoted identifiers are folded to upper case by the database, so only
/// lower-case names made of `[a-z0-9_$#]`, starting with a letter and not
/// reserved, are left alone.
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    starts_with_letter
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '$' | '#'))
        && !RESERVED_WORDS.contains(&name)
}

/// Quote an identifier unless it is plain (see [`is_plain_identifier`]).
pub fn quote_identifier(name: &str) -> String {
    if is_plain_identifier(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

/// Quote a possibly schema-qualified table name (`owner.table`) part by part.
pub fn quote_table_name(name: &str) -> String {
    name.split('.')
        .map(quote_identifier)
        .collect::<Vec<_>>()
        .join(".")
}

/// Escape a string for use inside single quotes.
pub fn quote_string(s: &str) -> String {
    s.replace('\'', "''")
}

/// Render a value as an Oracle SQL literal.
///
/// When `column` is a LOB column, non-null values become an empty LOB
/// constructor; the real contents are written afterwards through the
/// locator (see `Connection::write_lobs`).
pub fn quote_literal(value: &Value, column: Option<&ColumnDescriptor>) -> String {
    if let Some(kind) = column.and_then(|c| c.lob_kind()) {
        if !value.is_null() {
            return kind.empty_constructor().to_string();
        }
    }

    match value {
        Value::Null => "NULL".to_string(),
        Value::Boolean(true) => "1".to_string(),
        Value::Boolean(false) => "0".to_string(),
        Value::Integer(n) => n.to_string(),
        Value::Float(x) if x.is_finite() => x.to_string(),
        Value::String(s) => format!("'{}'", quote_string(s)),
        Value::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
        Value::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S")),
        Value::Binary(bytes) => format!("'{}'", hex(bytes)),
        Value::Json(json) => format!("'{}'", quote_string(&json.to_string())),
        other => format!("'{}'", quote_string(&other.to_string())),
    }
}

/// Read back a string literal produced by [`quote_literal`].
///
/// Returns `None` when `literal` is not a single well-formed quoted string
/// (missing quotes, or a lone quote inside).
pub fn unquote_literal(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\'' {
            if chars.next() != Some('\'') {
                return None;
            }
        }
        out.push(c);
    }
    Some(out)
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02X}", b)).collect()
}
