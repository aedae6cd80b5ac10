//! Seams between the engine and the database driver.
//!
//! [`crate::MySqlBackend`] is the production implementation; anything that
//! can hand out connections and transactions can stand in for it.

use async_trait::async_trait;

use crate::{ExecResult, Params, Result, RowSet};

/// One physical connection, or a handle pinned to one.
#[async_trait]
pub trait Connection: Send {
    /// Runs a row-returning statement.
    async fn query(&mut self, sql: &str, params: &Params) -> Result<RowSet>;

    /// Runs a statement that returns no rows.
    async fn exec(&mut self, sql: &str, params: &Params) -> Result<ExecResult>;
}

/// An open transaction. Ends with [`Transaction::commit`] or
/// [`Transaction::rollback`]; dropping it unfinished rolls it back.
#[async_trait]
pub trait Transaction: Connection + Sized {
    async fn commit(self) -> Result<()>;
    async fn rollback(self) -> Result<()>;
}

/// Transaction isolation level.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    #[default]
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::ReadUncommitted => "READ UNCOMMITTED",
            Self::ReadCommitted => "READ COMMITTED",
            Self::RepeatableRead => "REPEATABLE READ",
            Self::Serializable => "SERIALIZABLE",
        }
    }
}

/// A bounded pool of connections.
#[async_trait]
pub trait Backend: Send + Sync {
    type Conn: Connection + 'static;
    type Tx: Transaction + 'static;

    /// Reserves one connection for exclusive use until it is dropped.
    async fn get_conn(&self) -> Result<Self::Conn>;

    /// Opens a transaction on a freshly reserved connection.
    async fn begin(&self, isolation: IsolationLevel) -> Result<Self::Tx>;

    /// Runs a row-returning statement on any available connection.
    async fn query(&self, sql: &str, params: &Params) -> Result<RowSet> {
        let mut conn = self.get_conn().await?;
        conn.query(sql, params).await
    }

    /// Runs a non-row statement on any available connection.
    async fn exec(&self, sql: &str, params: &Params) -> Result<ExecResult> {
        let mut conn = self.get_conn().await?;
        conn.exec(sql, params).await
    }

    /// Closes idle connections and stops handing out new ones.
    async fn close(&self) -> Result<()>;
}
