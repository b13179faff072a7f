//! LIMIT/OFFSET emulation with nested `ROWNUM` selects.
//!
//! `ROWNUM` is assigned as rows pass the WHERE clause of the query block that
//! references it, so `WHERE ROWNUM > 10` in a single block never matches.
//! The rewrite numbers rows in a middle block and filters on that number in
//! an outer one:
//!
//! ```text
//! SELECT * FROM (
//!     SELECT raw_sql_.*, ROWNUM raw_rnum_ FROM (<original>) raw_sql_
//!     WHERE ROWNUM <= offset + limit
//! ) WHERE raw_rnum_ > offset
//! ```
//!
//! The `raw_rnum_` column is dropped again by the result mapper.

use tracing::trace;

/// Synthetic row-number column introduced by the rewrite.
pub const ROW_NUMBER_COLUMN: &str = "raw_rnum_";

/// A pagination directive. `None` and `0` both mean "absent".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    /// Maximum number of rows.
    pub limit: Option<u64>,
    /// Rows to skip.
    pub offset: Option<u64>,
}

impl Pagination {
    /// Create a directive.
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self { limit, offset }
    }

    fn effective_limit(&self) -> Option<u64> {
        self.limit.filter(|l| *l > 0)
    }

    fn effective_offset(&self) -> u64 {
        self.offset.unwrap_or(0)
    }

    /// Whether the directive leaves the query unchanged.
    pub fn is_empty(&self) -> bool {
        self.effective_limit().is_none() && self.effective_offset() == 0
    }

    /// Strip a trailing portable `LIMIT n [OFFSET m]` or `OFFSET m` clause.
    ///
    /// Returns the statement without the clause and the directive found
    /// (empty when there was none).
    pub fn extract(sql: &str) -> (String, Pagination) {
        let body = sql.trim_end().trim_end_matches(';').trim_end();
        let mut pagination = Pagination::default();

        let body = match split_trailing_clause(body, "OFFSET") {
            Some((rest, offset)) => {
                pagination.offset = Some(offset);
                rest
            }
            None => body,
        };
        let body = match split_trailing_clause(body, "LIMIT") {
            Some((rest, limit)) => {
                pagination.limit = Some(limit);
                rest
            }
            None => body,
        };

        if pagination.limit.is_none() && pagination.offset.is_none() {
            (sql.to_string(), pagination)
        } else {
            (body.to_string(), pagination)
        }
    }

    /// Apply this directive to `sql`.
    pub fn apply(&self, sql: &str) -> String {
        let offset = self.effective_offset();
        let rewritten = match self.effective_limit() {
            None if offset == 0 => return sql.to_string(),
            None => format!(
                "SELECT * FROM (SELECT raw_sql_.*, ROWNUM {rn} FROM ({sql}) raw_sql_) WHERE {rn} > {offset}",
                rn = ROW_NUMBER_COLUMN,
            ),
            Some(limit) => format!(
                "SELECT * FROM (SELECT raw_sql_.*, ROWNUM {rn} FROM ({sql}) raw_sql_ WHERE ROWNUM <= {ceiling}) WHERE {rn} > {offset}",
                rn = ROW_NUMBER_COLUMN,
                ceiling = offset.saturating_add(limit),
            ),
        };
        trace!(%rewritten, "paginated query");
        rewritten
    }
}

/// Rewrite `sql` so it returns at most `limit` rows after skipping `offset`.
pub fn rewrite_pagination(sql: &str, limit: Option<u64>, offset: Option<u64>) -> String {
    Pagination::new(limit, offset).apply(sql)
}

/// Split `<rest> <KEYWORD> <n>` off the end of `sql`.
fn split_trailing_clause<'a>(sql: &'a str, keyword: &str) -> Option<(&'a str, u64)> {
    let (rest, number) = sql.rsplit_once(char::is_whitespace)?;
    let n = number.parse::<u64>().ok()?;
    let rest = rest.trim_end();
    let (before, word) = rest.rsplit_once(char::is_whitespace)?;
    if word.eq_ignore_ascii_case(keyword) {
        Some((before.trim_end(), n))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQL: &str = "SELECT * FROM users ORDER BY id";

    #[test]
    fn test_limit_and_offset() {
        assert_eq!(
            rewrite_pagination(SQL, Some(10), Some(20)),
            "SELECT * FROM (SELECT raw_sql_.*, ROWNUM raw_rnum_ FROM (SELECT * FROM users ORDER BY id) raw_sql_ WHERE ROWNUM <= 30) WHERE raw_rnum_ > 20"
        );
    }

    #[test]
    fn test_limit_only() {
        let sql = rewrite_pagination(SQL, Some(5), None);
        assert!(sql.contains("WHERE ROWNUM <= 5"));
        assert!(sql.ends_with("WHERE raw_rnum_ > 0"));
    }

    #[test]
    fn test_offset_only_has_no_ceiling() {
        let sql = rewrite_pagination(SQL, None, Some(3));
        assert!(!sql.contains("ROWNUM <="));
        assert!(sql.ends_with("WHERE raw_rnum_ > 3"));
    }

    #[test]
    fn test_zero_is_unmodified() {
        assert_eq!(rewrite_pagination(SQL, Some(0), Some(0)), SQL);
        assert_eq!(rewrite_pagination(SQL, None, None), SQL);
        assert_eq!(rewrite_pagination(SQL, Some(0), None), SQL);
        assert!(Pagination::new(Some(0), Some(0)).is_empty());
    }

    #[test]
    fn test_extract() {
        let (sql, p) = Pagination::extract("SELECT * FROM t LIMIT 10 OFFSET 5;");
        assert_eq!(sql, "SELECT * FROM t");
        assert_eq!(p, Pagination::new(Some(10), Some(5)));

        let (sql, p) = Pagination::extract("select * from t limit 3");
        assert_eq!(sql, "select * from t");
        assert_eq!(p, Pagination::new(Some(3), None));

        let (sql, p) = Pagination::extract("SELECT * FROM t OFFSET 7");
        assert_eq!(sql, "SELECT * FROM t");
        assert_eq!(p, Pagination::new(None, Some(7)));
    }

    #[test]
    fn test_extract_without_directive() {
        let (sql, p) = Pagination::extract("SELECT limit FROM t");
        assert_eq!(sql, "SELECT limit FROM t");
        assert!(p.is_empty());

        let (sql, p) = Pagination::extract("SELECT * FROM t WHERE n = 4");
        assert_eq!(sql, "SELECT * FROM t WHERE n = 4");
        assert!(p.is_empty());
    }
}
