use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

use crate::backend::{Connection, Transaction};
use crate::{DbError, Result};

/// Routing target of a statement.
///
/// `Transaction` and `Session` pin every statement to the one physical
/// connection behind the handle; `Pool` lets the pool pick any idle
/// connection per statement. Pinned contexts are built with
/// [`ExecContext::transaction`] and [`ExecContext::session`]:
///
/// ```compile_fail
/// # fn wrap(conn: &mut mysql_ops::MySqlConn) {
/// // A plain connection cannot be passed off as a transaction.
/// let _ = mysql_ops::ExecContext::Transaction(conn);
/// # }
/// ```
#[derive(Default)]
pub enum ExecContext<'a> {
    #[default]
    Pool,
    Transaction(Pinned<'a>),
    Session(Pinned<'a>),
}

/// Borrowed handle of a pinned context. Only constructible inside the crate.
pub struct Pinned<'a>(pub(crate) &'a mut dyn Connection);

impl<'a> ExecContext<'a> {
    pub fn transaction<T: Transaction + 'a>(tx: &'a mut T) -> Self {
        Self::Transaction(Pinned(tx))
    }

    pub fn session<C: Connection + 'a>(conn: &'a mut C) -> Self {
        Self::Session(Pinned(conn))
    }

    pub(crate) fn pinned_session(conn: &'a mut dyn Connection) -> Self {
        Self::Session(Pinned(conn))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Pool => "pool",
            Self::Transaction(_) => "transaction",
            Self::Session(_) => "session",
        }
    }

    pub fn is_pinned(&self) -> bool {
        !matches!(self, Self::Pool)
    }
}

impl std::fmt::Debug for ExecContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.kind())
    }
}

/// Point in time after which a statement is cancelled.
#[derive(Clone, Copy, Debug)]
pub struct Deadline {
    at: Instant,
    timeout_sec: i64,
}

impl Deadline {
    /// Derives a deadline from a timeout in whole seconds; `<= 0` means none,
    /// as does a timeout too far out to be represented as an instant.
    pub fn from_timeout_sec(timeout_sec: i64) -> Option<Self> {
        let secs = u64::try_from(timeout_sec).ok().filter(|secs| *secs > 0)?;
        let at = Instant::now().checked_add(Duration::from_secs(secs))?;
        Some(Self { at, timeout_sec })
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.at
    }

    pub fn timeout_sec(&self) -> i64 {
        self.timeout_sec
    }

    fn exceeded(&self) -> DbError {
        DbError::DeadlineExceeded {
            timeout_sec: self.timeout_sec,
        }
    }
}

/// Drives `fut` to completion, cancelling it once `deadline` passes.
pub(crate) async fn with_deadline<T, F>(deadline: Option<Deadline>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match deadline {
        None => fut.await,
        Some(deadline) => tokio::time::timeout_at(deadline.at, fut)
            .await
            .map_err(|_| deadline.exceeded())?,
    }
}
