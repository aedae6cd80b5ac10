/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Pool exhaustion, dial failure or a broken connection.
    #[error("connection error: {0}")]
    Connection(String),
    /// Error reported by the server for a statement.
    #[error("sql error {code} ({state}): {message}")]
    Sql {
        /// MySQL error number.
        code: u16,
        /// SQLSTATE value.
        state: String,
        /// Error message text from the server.
        message: String,
    },
    /// The statement did not finish before its deadline.
    #[error("context deadline exceeded after {timeout_sec}s")]
    DeadlineExceeded { timeout_sec: i64 },
    /// A single-row statement returned no row.
    #[error("no result for query. sql=[{sql}]")]
    NoRows { sql: String },
    /// Column-to-field assignment stopped at `index`.
    #[error("Scan error on column index {index}, name {column:?}: {reason}")]
    Scan {
        index: usize,
        column: String,
        reason: String,
    },
    /// Response decoding or row-shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
    /// Invalid engine options.
    #[error("config error: {0}")]
    Config(String),
}

impl DbError {
    /// Returns `true` when the statement was cancelled by its deadline.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self, Self::DeadlineExceeded { .. })
    }

    /// Returns `true` for the expected "no row" condition.
    pub fn is_no_rows(&self) -> bool {
        matches!(self, Self::NoRows { .. })
    }
}

#[cfg(test)]
mod tests {
    use crate::DbError;

    #[test]
    fn scan_error_message_names_column_index() {
        let err = DbError::Scan {
            index: 43,
            column: "SQL_Remaining_Delay".to_owned(),
            reason: "converting NULL to string is unsupported".to_owned(),
        };
        assert_eq!(
            err.to_string(),
            "Scan error on column index 43, name \"SQL_Remaining_Delay\": converting NULL to string is unsupported"
        );
    }

    #[test]
    fn predicates_match_their_variants() {
        assert!(DbError::DeadlineExceeded { timeout_sec: 2 }.is_deadline_exceeded());
        assert!(DbError::NoRows {
            sql: "SHOW MASTER STATUS".to_owned()
        }
        .is_no_rows());
        assert!(!DbError::Connection("refused".to_owned()).is_deadline_exceeded());
    }
}
