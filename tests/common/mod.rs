#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use async_trait::async_trait;
use mysql_ops::replication::SlaveColumn;
use mysql_ops::{
    Backend, Connection, DbError, ExecResult, IsolationLevel, Params, Result, RowSet, Transaction,
    Value,
};

/// Server-wide state shared by every mock connection.
#[derive(Debug, Default)]
pub struct ServerState {
    pub master_status: Option<RowSet>,
    pub slave_status: Option<RowSet>,
    pub fail_master_status: bool,
    pub global_variables: HashMap<String, String>,
    pub dial_failures: usize,
    pub next_insert_id: u64,
    pub commits: usize,
    pub rollbacks: usize,
    pub closed: bool,
    /// `(connection id, statement)` in arrival order.
    pub statements: Vec<(u32, String)>,
}

/// In-process stand-in for a MySQL server and its pool.
///
/// Every [`Backend::get_conn`] opens a new connection with fresh session
/// state, so pool-routed statements never share a session.
#[derive(Clone, Default)]
pub struct MockBackend {
    pub server: Arc<Mutex<ServerState>>,
    next_id: Arc<AtomicU32>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(self, f: impl FnOnce(&mut ServerState)) -> Self {
        f(&mut self.server.lock().expect("server state mutex must not be poisoned"));
        self
    }

    pub fn statements(&self) -> Vec<(u32, String)> {
        self.server
            .lock()
            .expect("server state mutex must not be poisoned")
            .statements
            .clone()
    }

    pub fn connections_used_for(&self, sql: &str) -> Vec<u32> {
        self.statements()
            .into_iter()
            .filter(|(_, stmt)| stmt.eq_ignore_ascii_case(sql))
            .map(|(id, _)| id)
            .collect()
    }

    fn open(&self) -> Result<MockConn> {
        let mut server = self
            .server
            .lock()
            .expect("server state mutex must not be poisoned");
        if server.closed {
            return Err(DbError::Connection("pool is closed".to_owned()));
        }
        if server.dial_failures > 0 {
            server.dial_failures -= 1;
            return Err(DbError::Connection(
                "dial tcp 127.0.0.1:3306: connect: connection refused".to_owned(),
            ));
        }
        drop(server);

        Ok(MockConn {
            id: self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            server: Arc::clone(&self.server),
            database: "test".to_owned(),
            warnings: Vec::new(),
            last_query_cost: 0.0,
        })
    }
}

#[async_trait]
impl Backend for MockBackend {
    type Conn = MockConn;
    type Tx = MockTx;

    async fn get_conn(&self) -> Result<MockConn> {
        self.open()
    }

    async fn begin(&self, isolation: IsolationLevel) -> Result<MockTx> {
        let mut conn = self.open()?;
        conn.exec(
            &format!("SET TRANSACTION ISOLATION LEVEL {}", isolation.as_sql()),
            &Params::default(),
        )
        .await?;
        conn.exec("START TRANSACTION", &Params::default()).await?;
        Ok(MockTx { conn })
    }

    async fn close(&self) -> Result<()> {
        self.server
            .lock()
            .expect("server state mutex must not be poisoned")
            .closed = true;
        Ok(())
    }
}

pub struct MockConn {
    pub id: u32,
    server: Arc<Mutex<ServerState>>,
    database: String,
    warnings: Vec<(String, u32, String)>,
    last_query_cost: f64,
}

enum Reply {
    Rows(RowSet),
    Exec(ExecResult),
}

fn exec_reply(affected_row_count: u64, last_insert_id: Option<u64>) -> Reply {
    Reply::Exec(ExecResult {
        affected_row_count,
        last_insert_id,
    })
}

fn single_column(name: &str, value: Value) -> RowSet {
    RowSet::new(vec![name.to_owned()], vec![vec![value]])
}

fn variable_rows(name: &str, value: Option<String>) -> RowSet {
    let columns = vec!["Variable_name".to_owned(), "Value".to_owned()];
    match value {
        Some(value) => RowSet::new(columns, vec![vec![Value::text(name), Value::text(value)]]),
        None => RowSet::new(columns, Vec::new()),
    }
}

fn like_pattern(upper: &str, stmt: &str) -> Option<String> {
    let at = upper.find(" LIKE '")? + " LIKE '".len();
    let rest = &stmt[at..];
    rest.find('\'').map(|end| rest[..end].to_owned())
}

impl MockConn {
    async fn run(&mut self, sql: &str, params: &Params) -> Result<Reply> {
        let stmt = sql.trim().trim_end_matches(';').trim();
        let upper = stmt.to_ascii_uppercase();
        self.server
            .lock()
            .expect("server state mutex must not be poisoned")
            .statements
            .push((self.id, stmt.to_owned()));

        let is_diagnostic =
            upper.starts_with("SHOW WARNINGS") || upper.starts_with("SHOW SESSION STATUS");
        if !is_diagnostic {
            self.warnings.clear();
        }

        if upper == "SELECT DATABASE()" || upper == "SELECT DATABASE() DB" {
            return Ok(Reply::Rows(single_column(
                "database()",
                Value::text(self.database.clone()),
            )));
        }
        if let Some(db) = upper.strip_prefix("USE ") {
            self.database = stmt[stmt.len() - db.len()..].trim().to_owned();
            return Ok(exec_reply(0, None));
        }
        if let Some(rest) = upper.strip_prefix("SELECT SLEEP(") {
            let secs: u64 = rest.trim_end_matches(')').trim().parse().unwrap_or(0);
            tokio::time::sleep(Duration::from_secs(secs)).await;
            return Ok(Reply::Rows(single_column(
                &format!("sleep({secs})"),
                Value::integer(0),
            )));
        }
        if upper == "SHOW WARNINGS" {
            let rows = self
                .warnings
                .iter()
                .map(|(level, code, message)| {
                    vec![
                        Value::text(level.clone()),
                        Value::text(code.to_string()),
                        Value::text(message.clone()),
                    ]
                })
                .collect();
            return Ok(Reply::Rows(RowSet::new(
                vec!["Level".to_owned(), "Code".to_owned(), "Message".to_owned()],
                rows,
            )));
        }
        if upper == "SHOW MASTER STATUS" {
            let server = self
                .server
                .lock()
                .expect("server state mutex must not be poisoned");
            if server.fail_master_status {
                return Err(DbError::Sql {
                    code: 1227,
                    state: "42000".to_owned(),
                    message: "Access denied; you need (at least one of) the SUPER, REPLICATION CLIENT privilege(s) for this operation".to_owned(),
                });
            }
            return Ok(Reply::Rows(server.master_status.clone().unwrap_or_default()));
        }
        if upper == "SHOW SLAVE STATUS" {
            let server = self
                .server
                .lock()
                .expect("server state mutex must not be poisoned");
            return Ok(Reply::Rows(server.slave_status.clone().unwrap_or_default()));
        }
        if upper.starts_with("SHOW SESSION STATUS") {
            let name = like_pattern(&upper, stmt).unwrap_or_default();
            let value = name
                .eq_ignore_ascii_case("last_query_cost")
                .then(|| format!("{:.6}", self.last_query_cost));
            return Ok(Reply::Rows(variable_rows("Last_query_cost", value)));
        }
        if upper.starts_with("SHOW GLOBAL VARIABLES") {
            let name = like_pattern(&upper, stmt).unwrap_or_default();
            let server = self
                .server
                .lock()
                .expect("server state mutex must not be poisoned");
            let value = server.global_variables.get(&name).cloned();
            return Ok(Reply::Rows(variable_rows(&name, value)));
        }
        if let Some(rest) = upper.strip_prefix("DROP TABLE IF EXISTS ") {
            let table = rest.trim().to_ascii_lowercase();
            self.warnings.push((
                "Note".to_owned(),
                1051,
                format!("Unknown table '{}.{table}'", self.database),
            ));
            return Ok(exec_reply(0, None));
        }
        if upper.starts_with("INSERT INTO ") {
            let placeholders = stmt.matches('?').count();
            if placeholders != params.len() {
                return Err(DbError::Sql {
                    code: 1210,
                    state: "HY000".to_owned(),
                    message: "Incorrect arguments to mysqld_stmt_execute".to_owned(),
                });
            }
            let mut server = self
                .server
                .lock()
                .expect("server state mutex must not be poisoned");
            server.next_insert_id += 1;
            self.last_query_cost = 1.0;
            return Ok(exec_reply(1, Some(server.next_insert_id)));
        }
        if upper.starts_with("SET ")
            || matches!(upper.as_str(), "START TRANSACTION" | "COMMIT" | "ROLLBACK")
        {
            return Ok(exec_reply(0, None));
        }

        Err(DbError::Sql {
            code: 1064,
            state: "42000".to_owned(),
            message: format!("You have an error in your SQL syntax near '{stmt}'"),
        })
    }
}

#[async_trait]
impl Connection for MockConn {
    async fn query(&mut self, sql: &str, params: &Params) -> Result<RowSet> {
        match self.run(sql, params).await? {
            Reply::Rows(set) => Ok(set),
            Reply::Exec(_) => Ok(RowSet::default()),
        }
    }

    async fn exec(&mut self, sql: &str, params: &Params) -> Result<ExecResult> {
        match self.run(sql, params).await? {
            Reply::Exec(result) => Ok(result),
            Reply::Rows(_) => Ok(ExecResult {
                affected_row_count: 0,
                last_insert_id: None,
            }),
        }
    }
}

pub struct MockTx {
    pub conn: MockConn,
}

#[async_trait]
impl Connection for MockTx {
    async fn query(&mut self, sql: &str, params: &Params) -> Result<RowSet> {
        self.conn.query(sql, params).await
    }

    async fn exec(&mut self, sql: &str, params: &Params) -> Result<ExecResult> {
        self.conn.exec(sql, params).await
    }
}

#[async_trait]
impl Transaction for MockTx {
    async fn commit(mut self) -> Result<()> {
        self.conn.exec("COMMIT", &Params::default()).await?;
        self.conn
            .server
            .lock()
            .expect("server state mutex must not be poisoned")
            .commits += 1;
        Ok(())
    }

    async fn rollback(mut self) -> Result<()> {
        self.conn.exec("ROLLBACK", &Params::default()).await?;
        self.conn
            .server
            .lock()
            .expect("server state mutex must not be poisoned")
            .rollbacks += 1;
        Ok(())
    }
}

/// Log sink for a test-local `tracing` subscriber.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Routes DEBUG and above on the current thread into this sink until the
    /// guard is dropped.
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let sink = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .without_time()
            .with_writer(move || sink.clone())
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn lines_at(&self, level: &str) -> Vec<String> {
        let buf = self.0.lock().expect("log sink mutex must not be poisoned");
        String::from_utf8_lossy(&buf)
            .lines()
            .filter(|line| line.trim_start().starts_with(level))
            .map(str::to_owned)
            .collect()
    }
}

impl std::io::Write for CapturedLogs {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<usize> {
        self.0
            .lock()
            .expect("log sink mutex must not be poisoned")
            .extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

/// Builds a one-row `SHOW SLAVE STATUS` result for `layout`; columns not in
/// `overrides` hold `"0"`.
pub fn slave_status_rows(layout: &[SlaveColumn], overrides: &[(SlaveColumn, Value)]) -> RowSet {
    let columns = layout.iter().map(|col| col.name().to_owned()).collect();
    let row = layout
        .iter()
        .map(|col| {
            overrides
                .iter()
                .find(|(c, _)| c == col)
                .map(|(_, value)| value.clone())
                .unwrap_or_else(|| Value::text("0"))
        })
        .collect();
    RowSet::new(columns, vec![row])
}

pub fn master_status_rows(file: &str, position: i64, gtid: &str, extra: Option<&str>) -> RowSet {
    let mut columns: Vec<String> = [
        "File",
        "Position",
        "Binlog_Do_DB",
        "Binlog_Ignore_DB",
        "Executed_Gtid_Set",
    ]
    .iter()
    .map(|name| (*name).to_owned())
    .collect();
    let mut row = vec![
        Value::text(file),
        Value::text(position.to_string()),
        Value::text(""),
        Value::text(""),
        Value::text(gtid),
    ];
    if let Some(extra) = extra {
        columns.push("Xa_Cid".to_owned());
        row.push(Value::text(extra));
    }
    RowSet::new(columns, vec![row])
}
