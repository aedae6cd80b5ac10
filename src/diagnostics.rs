//! Follow-up statements about the previous statement on a pinned connection.
//!
//! `SHOW WARNINGS` and `last_query_cost` describe the last statement of the
//! *session*, so they only mean something on the connection that ran it.
//! Every entry point takes the pinned handle itself rather than an
//! [`ExecContext`], so a pool-routed statement cannot be diagnosed by mistake.

use crate::backend::Connection;
use crate::{Backend, DbError, Diagnostics, Engine, ExecContext, Result, Warning};

impl<B: Backend> Engine<B> {
    /// Runs `SHOW WARNINGS` on `conn`.
    pub async fn show_warnings(&self, conn: &mut dyn Connection) -> Result<Vec<Warning>> {
        let mut rows = self
            .fetch_rows(ExecContext::pinned_session(conn), "SHOW WARNINGS")
            .await
            .map_err(|err| {
                tracing::warn!("Fail to exec SHOW WARNINGS. reason=[{err}]");
                err
            })?;

        let mut warnings = Vec::with_capacity(rows.remaining());
        while let Some(row) = rows.next()? {
            let warning = Warning {
                level: row.get(0)?,
                code: row.get(1)?,
                message: row.get(2)?,
            };
            warnings.push(warning);
        }
        Ok(warnings)
    }

    /// Reads `last_query_cost` of the session behind `conn`.
    pub async fn last_query_cost(&self, conn: &mut dyn Connection) -> Result<f64> {
        let raw = self
            .query_show(ExecContext::pinned_session(conn), "SESSION STATUS", "last_query_cost")
            .await?;
        raw.trim().parse::<f64>().map_err(|err| {
            tracing::warn!("Fail to parse last_query_cost. reason=[{err}] value=[{raw}]");
            DbError::Decode(format!("invalid last_query_cost '{raw}': {err}"))
        })
    }

    /// Warnings and cost of the previous statement on `conn`.
    pub async fn show_affect(&self, conn: &mut dyn Connection) -> Result<Diagnostics> {
        let warnings = self.show_warnings(&mut *conn).await?;
        let cost = self.last_query_cost(conn).await.map_err(|err| {
            tracing::warn!("Fail to get SQL last_query_cost. reason=[{err}]");
            err
        })?;
        Ok(Diagnostics { warnings, cost })
    }
}
