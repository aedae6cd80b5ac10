use std::fmt;

use crate::backend::{Backend, IsolationLevel};
use crate::context::{with_deadline, Deadline, Pinned};
use crate::{
    DbError, EngineOptions, ExecContext, ExecResult, MySqlBackend, Params, Result, RowSet, Rows,
    StatementOutcome,
};

/// Statement execution engine over a connection pool.
///
/// Build one per process and share it (`&Engine` or `Arc<Engine>`) with every
/// caller. All methods take `&self`; concurrent callers only contend on the
/// pool itself.
pub struct Engine<B: Backend = MySqlBackend> {
    backend: B,
    options: EngineOptions,
}

impl<B: Backend + fmt::Debug> fmt::Debug for Engine<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("backend", &self.backend)
            .field("options", &self.options)
            .finish()
    }
}

impl Engine<MySqlBackend> {
    /// Creates an engine over a `mysql_async` pool for `url`.
    pub fn connect(url: &str, options: EngineOptions) -> Result<Self> {
        let backend = MySqlBackend::from_url(url, &options)?;
        Ok(Self::with_backend(backend, options))
    }
}

impl<B: Backend> Engine<B> {
    pub fn with_backend(backend: B, options: EngineOptions) -> Self {
        Self { backend, options }
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Opens a REPEATABLE READ transaction.
    pub async fn begin_trx(&self) -> Result<B::Tx> {
        self.backend
            .begin(IsolationLevel::RepeatableRead)
            .await
            .map_err(|err| {
                tracing::warn!("Start trx fail. err=[{err}]");
                err
            })
    }

    /// Reserves one connection as a session handle.
    ///
    /// Statements sent through [`ExecContext::Session`] with this handle all
    /// run on the same physical connection. Dropping it returns the
    /// connection to the pool.
    pub async fn get_conn(&self) -> Result<B::Conn> {
        self.backend.get_conn().await.map_err(|err| {
            tracing::warn!("Get conn fail. err=[{err}]");
            err
        })
    }

    /// Runs a row-returning statement.
    ///
    /// `timeout_sec <= 0` runs without a deadline. Otherwise the deadline
    /// covers the call and stays attached to the returned [`Rows`] until the
    /// caller closes them.
    pub async fn query<P: Into<Params>>(
        &self,
        ctx: ExecContext<'_>,
        timeout_sec: i64,
        sql: &str,
        params: P,
    ) -> Result<StatementOutcome> {
        let params = params.into();
        tracing::debug!(
            "Execute query type SQL. sql=[{}] timeout=[{timeout_sec}] context=[{}]",
            params.interpolate(sql),
            ctx.kind()
        );

        let deadline = Deadline::from_timeout_sec(timeout_sec);
        match with_deadline(deadline, self.route_query(ctx, sql, &params)).await {
            Ok(set) => Ok(StatementOutcome::rows(Rows::new(set, deadline))),
            Err(err) => {
                tracing::warn!(
                    "Query failed. sql=[{}] err=[{err}]",
                    params.interpolate(sql)
                );
                Err(err)
            }
        }
    }

    /// Runs a DDL/DML statement. The deadline ends with the call.
    pub async fn exec<P: Into<Params>>(
        &self,
        ctx: ExecContext<'_>,
        timeout_sec: i64,
        sql: &str,
        params: P,
    ) -> Result<StatementOutcome> {
        let params = params.into();
        tracing::debug!(
            "Execute dml/ddl type SQL. sql=[{}] timeout=[{timeout_sec}] context=[{}]",
            params.interpolate(sql),
            ctx.kind()
        );

        let deadline = Deadline::from_timeout_sec(timeout_sec);
        match with_deadline(deadline, self.route_exec(ctx, sql, &params)).await {
            Ok(result) => Ok(StatementOutcome::exec(result)),
            Err(err) => {
                tracing::warn!(
                    "Execute failed. sql=[{}] err=[{err}]",
                    params.interpolate(sql)
                );
                Err(err)
            }
        }
    }

    /// Runs `SHOW <show_tag> LIKE '<variable_name>'` and returns the value
    /// column, e.g. `query_show(ctx, "GLOBAL VARIABLES", "read_only")`.
    pub async fn query_show(
        &self,
        ctx: ExecContext<'_>,
        show_tag: &str,
        variable_name: &str,
    ) -> Result<String> {
        let sql = format!("SHOW {show_tag} LIKE '{variable_name}'");
        let mut rows = self.fetch_rows(ctx, &sql).await.map_err(|err| {
            tracing::warn!("Fail to exec SHOW query. sql=[{sql}] reason=[{err}]");
            err
        })?;

        let row = rows.next()?.ok_or_else(|| DbError::NoRows { sql: sql.clone() })?;
        if row.len() != 2 {
            return Err(DbError::Decode(format!(
                "expected 2 destination arguments in scan, not {}",
                row.len()
            )));
        }
        row.get::<String>(1).map_err(|err| {
            tracing::warn!("Fail to read SHOW query value. sql=[{sql}] reason=[{err}]");
            err
        })
    }

    /// Disconnects every pooled connection.
    pub async fn close(&self) -> Result<()> {
        self.backend.close().await
    }

    /// Runs a parameterless query with the configured read-write timeout.
    pub(crate) async fn fetch_rows(&self, ctx: ExecContext<'_>, sql: &str) -> Result<Rows> {
        let outcome = self
            .query(ctx, self.options.rw_timeout_sec, sql, Params::default())
            .await?;
        outcome
            .into_rows()
            .ok_or_else(|| DbError::Decode(format!("no rows handle for query. sql=[{sql}]")))
    }

    async fn route_query(&self, ctx: ExecContext<'_>, sql: &str, params: &Params) -> Result<RowSet> {
        match ctx {
            ExecContext::Transaction(Pinned(tx)) => tx.query(sql, params).await,
            ExecContext::Session(Pinned(conn)) => conn.query(sql, params).await,
            ExecContext::Pool => self.backend.query(sql, params).await,
        }
    }

    async fn route_exec(
        &self,
        ctx: ExecContext<'_>,
        sql: &str,
        params: &Params,
    ) -> Result<ExecResult> {
        match ctx {
            ExecContext::Transaction(Pinned(tx)) => tx.exec(sql, params).await,
            ExecContext::Session(Pinned(conn)) => conn.exec(sql, params).await,
            ExecContext::Pool => self.backend.exec(sql, params).await,
        }
    }
}
