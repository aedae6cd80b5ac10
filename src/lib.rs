//! `mysql-ops` runs statements against a MySQL-compatible server for
//! cluster-management tooling and decodes its replication status.
//!
//! The entry point is [`Engine`]:
//! - [`Engine::query`] / [`Engine::exec`] route a statement through the pool,
//!   a transaction or a reserved session ([`ExecContext`])
//! - [`Engine::show_affect`] reads warnings and cost of the previous statement
//! - [`Engine::query_master_status`] / [`Engine::query_slave_status`]

pub mod backend;
mod context;
mod diagnostics;
mod engine;
mod error;
mod mysql;
mod options;
mod params;
pub mod replication;
mod rows;
pub mod scan;
mod types;
pub mod value;

pub use backend::{Backend, Connection, IsolationLevel, Transaction};
pub use context::{Deadline, ExecContext, Pinned};
pub use engine::Engine;
pub use error::DbError;
pub use mysql::{MySqlBackend, MySqlConn, MySqlTransaction};
pub use options::{EngineOptions, Flavor};
pub use params::Params;
pub use replication::{MasterStatus, SlaveStatus};
pub use rows::{Row, RowSet, Rows};
pub use scan::{DecodeStatus, Decoded};
pub use types::{Diagnostics, ExecResult, Output, StatementOutcome, Warning, COST_NOT_MEASURED};
pub use value::Value;

pub type Result<T> = std::result::Result<T, DbError>;
