//! `SHOW MASTER STATUS` / `SHOW SLAVE STATUS` decoding.
//!
//! Each flavor has its own named column layout and decode function; the
//! engine picks one by [`Flavor`] at call time.

use serde::Serialize;

use crate::scan::{classify_scan_error, scan_row, DecodeStatus, Decoded};
use crate::value::{ConvertError, FromValue};
use crate::{Backend, DbError, Engine, ExecContext, Flavor, Result, Row, Value};

pub const SHOW_MASTER_STATUS: &str = "SHOW MASTER STATUS";
pub const SHOW_SLAVE_STATUS: &str = "SHOW SLAVE STATUS";

/// Decoded `SHOW MASTER STATUS` row.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MasterStatus {
    pub file: String,
    pub position: i64,
    pub binlog_do_db: String,
    pub binlog_ignore_db: String,
    pub executed_gtid_set: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MasterColumn {
    File,
    Position,
    BinlogDoDb,
    BinlogIgnoreDb,
    ExecutedGtidSet,
    /// Scanned as text and dropped.
    Placeholder,
}

impl MasterColumn {
    fn assign(
        self,
        status: &mut MasterStatus,
        value: &Value,
    ) -> std::result::Result<(), ConvertError> {
        match self {
            Self::File => status.file = String::from_value(value)?,
            Self::Position => status.position = i64::from_value(value)?,
            Self::BinlogDoDb => status.binlog_do_db = String::from_value(value)?,
            Self::BinlogIgnoreDb => status.binlog_ignore_db = String::from_value(value)?,
            Self::ExecutedGtidSet => status.executed_gtid_set = String::from_value(value)?,
            Self::Placeholder => {
                String::from_value(value)?;
            }
        }
        Ok(())
    }
}

pub const STANDARD_MASTER_LAYOUT: &[MasterColumn] = &[
    MasterColumn::File,
    MasterColumn::Position,
    MasterColumn::BinlogDoDb,
    MasterColumn::BinlogIgnoreDb,
    MasterColumn::ExecutedGtidSet,
];

/// FDB appends a transaction-id column after the GTID set.
pub const FDB_MASTER_LAYOUT: &[MasterColumn] = &[
    MasterColumn::File,
    MasterColumn::Position,
    MasterColumn::BinlogDoDb,
    MasterColumn::BinlogIgnoreDb,
    MasterColumn::ExecutedGtidSet,
    MasterColumn::Placeholder,
];

pub fn decode_master_standard(row: &Row) -> Result<MasterStatus> {
    decode_master(row, STANDARD_MASTER_LAYOUT)
}

pub fn decode_master_fdb(row: &Row) -> Result<MasterStatus> {
    decode_master(row, FDB_MASTER_LAYOUT)
}

fn decode_master(row: &Row, layout: &[MasterColumn]) -> Result<MasterStatus> {
    let mut status = MasterStatus::default();
    scan_row(row, layout, &mut status, MasterColumn::assign)?;
    Ok(status)
}

macro_rules! slave_status {
    ($($column:ident => $field:ident: $ty:ty = $name:literal),+ $(,)?) => {
        /// Decoded `SHOW SLAVE STATUS` row.
        ///
        /// `semi_sync_group` and `io_cached_gtid_set` only exist in the FDB
        /// layout and stay empty otherwise.
        #[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
        pub struct SlaveStatus {
            $(pub $field: $ty,)+
        }

        #[derive(Clone, Copy, Debug, PartialEq, Eq)]
        pub enum SlaveColumn {
            $($column,)+
        }

        impl SlaveColumn {
            /// Column name as printed by the server.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$column => $name,)+
                }
            }

            fn assign(
                self,
                status: &mut SlaveStatus,
                value: &Value,
            ) -> std::result::Result<(), ConvertError> {
                match self {
                    $(Self::$column => status.$field = <$ty as FromValue>::from_value(value)?,)+
                }
                Ok(())
            }
        }
    };
}

slave_status! {
    SlaveIoState => slave_io_state: String = "Slave_IO_State",
    MasterHost => master_host: String = "Master_Host",
    MasterUser => master_user: String = "Master_User",
    MasterPort => master_port: i32 = "Master_Port",
    ConnectRetry => connect_retry: String = "Connect_Retry",
    MasterLogFile => master_log_file: String = "Master_Log_File",
    ReadMasterLogPos => read_master_log_pos: i64 = "Read_Master_Log_Pos",
    RelayLogFile => relay_log_file: String = "Relay_Log_File",
    RelayLogPos => relay_log_pos: i64 = "Relay_Log_Pos",
    RelayMasterLogFile => relay_master_log_file: String = "Relay_Master_Log_File",
    SlaveIoRunning => slave_io_running: String = "Slave_IO_Running",
    SlaveSqlRunning => slave_sql_running: String = "Slave_SQL_Running",
    ReplicateDoDb => replicate_do_db: String = "Replicate_Do_DB",
    ReplicateIgnoreDb => replicate_ignore_db: String = "Replicate_Ignore_DB",
    ReplicateDoTable => replicate_do_table: String = "Replicate_Do_Table",
    ReplicateIgnoreTable => replicate_ignore_table: String = "Replicate_Ignore_Table",
    ReplicateWildDoTable => replicate_wild_do_table: String = "Replicate_Wild_Do_Table",
    ReplicateWildIgnoreTable => replicate_wild_ignore_table: String = "Replicate_Wild_Ignore_Table",
    LastErrno => last_errno: String = "Last_Errno",
    LastError => last_error: String = "Last_Error",
    SkipCounter => skip_counter: String = "Skip_Counter",
    ExecMasterLogPos => exec_master_log_pos: i64 = "Exec_Master_Log_Pos",
    RelayLogSpace => relay_log_space: String = "Relay_Log_Space",
    UntilCondition => until_condition: String = "Until_Condition",
    UntilLogFile => until_log_file: String = "Until_Log_File",
    UntilLogPos => until_log_pos: String = "Until_Log_Pos",
    MasterSslAllowed => master_ssl_allowed: String = "Master_SSL_Allowed",
    MasterSslCaFile => master_ssl_ca_file: String = "Master_SSL_CA_File",
    MasterSslCaPath => master_ssl_ca_path: String = "Master_SSL_CA_Path",
    MasterSslCert => master_ssl_cert: String = "Master_SSL_Cert",
    MasterSslCipher => master_ssl_cipher: String = "Master_SSL_Cipher",
    MasterSslKey => master_ssl_key: String = "Master_SSL_Key",
    SecondsBehindMaster => seconds_behind_master: i32 = "Seconds_Behind_Master",
    MasterSslVerifyServerCert => master_ssl_verify_server_cert: String = "Master_SSL_Verify_Server_Cert",
    LastIoErrno => last_io_errno: String = "Last_IO_Errno",
    LastIoError => last_io_error: String = "Last_IO_Error",
    LastSqlErrno => last_sql_errno: String = "Last_SQL_Errno",
    LastSqlError => last_sql_error: String = "Last_SQL_Error",
    ReplicateIgnoreServerIds => replicate_ignore_server_ids: String = "Replicate_Ignore_Server_Ids",
    MasterServerId => master_server_id: String = "Master_Server_Id",
    MasterUuid => master_uuid: String = "Master_UUID",
    MasterInfoFile => master_info_file: String = "Master_Info_File",
    SqlDelay => sql_delay: String = "SQL_Delay",
    SqlRemainingDelay => sql_remaining_delay: String = "SQL_Remaining_Delay",
    SlaveSqlRunningState => slave_sql_running_state: String = "Slave_SQL_Running_State",
    SemiSyncGroup => semi_sync_group: String = "Semi_Sync_Group",
    MasterRetryCount => master_retry_count: String = "Master_Retry_Count",
    MasterBind => master_bind: String = "Master_Bind",
    LastIoErrorTimestamp => last_io_error_timestamp: String = "Last_IO_Error_Timestamp",
    LastSqlErrorTimestamp => last_sql_error_timestamp: String = "Last_SQL_Error_Timestamp",
    MasterSslCrl => master_ssl_crl: String = "Master_SSL_Crl",
    MasterSslCrlpath => master_ssl_crlpath: String = "Master_SSL_Crlpath",
    IoCachedGtidSet => io_cached_gtid_set: String = "IO_Cached_Gtid_Set",
    RetrievedGtidSet => retrieved_gtid_set: String = "Retrieved_Gtid_Set",
    ExecutedGtidSet => executed_gtid_set: String = "Executed_Gtid_Set",
    AutoPosition => auto_position: String = "Auto_Position",
    ReplicateRewriteDb => replicate_rewrite_db: String = "Replicate_Rewrite_DB",
    ChannelName => channel_name: String = "Channel_Name",
    MasterTlsVersion => master_tls_version: String = "Master_TLS_Version",
}

use SlaveColumn as S;

/// MySQL 5.7 column order, 57 columns.
pub const STANDARD_SLAVE_LAYOUT: &[SlaveColumn] = &[
    S::SlaveIoState,
    S::MasterHost,
    S::MasterUser,
    S::MasterPort,
    S::ConnectRetry,
    S::MasterLogFile,
    S::ReadMasterLogPos,
    S::RelayLogFile,
    S::RelayLogPos,
    S::RelayMasterLogFile,
    S::SlaveIoRunning,
    S::SlaveSqlRunning,
    S::ReplicateDoDb,
    S::ReplicateIgnoreDb,
    S::ReplicateDoTable,
    S::ReplicateIgnoreTable,
    S::ReplicateWildDoTable,
    S::ReplicateWildIgnoreTable,
    S::LastErrno,
    S::LastError,
    S::SkipCounter,
    S::ExecMasterLogPos,
    S::RelayLogSpace,
    S::UntilCondition,
    S::UntilLogFile,
    S::UntilLogPos,
    S::MasterSslAllowed,
    S::MasterSslCaFile,
    S::MasterSslCaPath,
    S::MasterSslCert,
    S::MasterSslCipher,
    S::MasterSslKey,
    S::SecondsBehindMaster,
    S::MasterSslVerifyServerCert,
    S::LastIoErrno,
    S::LastIoError,
    S::LastSqlErrno,
    S::LastSqlError,
    S::ReplicateIgnoreServerIds,
    S::MasterServerId,
    S::MasterUuid,
    S::MasterInfoFile,
    S::SqlDelay,
    S::SqlRemainingDelay,
    S::SlaveSqlRunningState,
    S::MasterRetryCount,
    S::MasterBind,
    S::LastIoErrorTimestamp,
    S::LastSqlErrorTimestamp,
    S::MasterSslCrl,
    S::MasterSslCrlpath,
    S::RetrievedGtidSet,
    S::ExecutedGtidSet,
    S::AutoPosition,
    S::ReplicateRewriteDb,
    S::ChannelName,
    S::MasterTlsVersion,
];

/// FDB column order, 56 columns: adds the semi-sync group and the IO cached
/// GTID set, drops the rewrite/channel/TLS tail.
pub const FDB_SLAVE_LAYOUT: &[SlaveColumn] = &[
    S::SlaveIoState,
    S::MasterHost,
    S::MasterUser,
    S::MasterPort,
    S::ConnectRetry,
    S::MasterLogFile,
    S::ReadMasterLogPos,
    S::RelayLogFile,
    S::RelayLogPos,
    S::RelayMasterLogFile,
    S::SlaveIoRunning,
    S::SlaveSqlRunning,
    S::ReplicateDoDb,
    S::ReplicateIgnoreDb,
    S::ReplicateDoTable,
    S::ReplicateIgnoreTable,
    S::ReplicateWildDoTable,
    S::ReplicateWildIgnoreTable,
    S::LastErrno,
    S::LastError,
    S::SkipCounter,
    S::ExecMasterLogPos,
    S::RelayLogSpace,
    S::UntilCondition,
    S::UntilLogFile,
    S::UntilLogPos,
    S::MasterSslAllowed,
    S::MasterSslCaFile,
    S::MasterSslCaPath,
    S::MasterSslCert,
    S::MasterSslCipher,
    S::MasterSslKey,
    S::SecondsBehindMaster,
    S::MasterSslVerifyServerCert,
    S::LastIoErrno,
    S::LastIoError,
    S::LastSqlErrno,
    S::LastSqlError,
    S::ReplicateIgnoreServerIds,
    S::MasterServerId,
    S::MasterUuid,
    S::MasterInfoFile,
    S::SqlDelay,
    S::SqlRemainingDelay,
    S::SlaveSqlRunningState,
    S::SemiSyncGroup,
    S::MasterRetryCount,
    S::MasterBind,
    S::LastIoErrorTimestamp,
    S::LastSqlErrorTimestamp,
    S::MasterSslCrl,
    S::MasterSslCrlpath,
    S::IoCachedGtidSet,
    S::RetrievedGtidSet,
    S::ExecutedGtidSet,
    S::AutoPosition,
];

pub fn decode_slave_standard(row: &Row) -> Result<Decoded<SlaveStatus>> {
    decode_slave(row, STANDARD_SLAVE_LAYOUT)
}

pub fn decode_slave_fdb(row: &Row) -> Result<Decoded<SlaveStatus>> {
    decode_slave(row, FDB_SLAVE_LAYOUT)
}

// A healthy replica reports NULL for SQL_Remaining_Delay, which stops the
// scan there; everything after it (Executed_Gtid_Set included) stays empty.
fn decode_slave(row: &Row, layout: &[SlaveColumn]) -> Result<Decoded<SlaveStatus>> {
    let mut record = SlaveStatus::default();
    let status = match scan_row(row, layout, &mut record, SlaveColumn::assign) {
        Ok(()) => DecodeStatus::Complete,
        Err(err) => classify_scan_error(err)?,
    };
    Ok(Decoded { record, status })
}

impl<B: Backend> Engine<B> {
    /// Runs `SHOW MASTER STATUS` through the pool.
    ///
    /// A server with binary logging off returns no row, reported as
    /// [`DbError::NoRows`].
    pub async fn query_master_status(&self) -> Result<MasterStatus> {
        let mut rows = self
            .fetch_rows(ExecContext::Pool, SHOW_MASTER_STATUS)
            .await
            .map_err(|err| {
                tracing::warn!("Fail to exec SHOW MASTER STATUS. reason=[{err}]");
                err
            })?;

        let Some(row) = rows.next()? else {
            tracing::debug!(
                "No row from SHOW MASTER STATUS, binlog may be disabled. sql=[{SHOW_MASTER_STATUS}]"
            );
            return Err(DbError::NoRows {
                sql: SHOW_MASTER_STATUS.to_owned(),
            });
        };

        let decode = match self.options().flavor {
            Flavor::Standard => decode_master_standard,
            Flavor::Fdb => decode_master_fdb,
        };
        decode(&row).map_err(|err| {
            tracing::warn!("Fail to decode SHOW MASTER STATUS. reason=[{err}]");
            err
        })
    }

    /// Runs `SHOW SLAVE STATUS` and reconciles `executed_gtid_set` from
    /// `SHOW MASTER STATUS`.
    ///
    /// `Ok(None)` means the server is not a replica.
    pub async fn inspect_slave_status(&self) -> Result<Option<Decoded<SlaveStatus>>> {
        let mut rows = self
            .fetch_rows(ExecContext::Pool, SHOW_SLAVE_STATUS)
            .await
            .map_err(|err| {
                tracing::warn!("Fail to exec SHOW SLAVE STATUS. reason=[{err}]");
                err
            })?;

        let Some(row) = rows.next()? else {
            tracing::debug!("No row from SHOW SLAVE STATUS, this node may be a master");
            return Ok(None);
        };
        rows.close();

        let decode = match self.options().flavor {
            Flavor::Standard => decode_slave_standard,
            Flavor::Fdb => decode_slave_fdb,
        };
        let mut decoded = decode(&row).map_err(|err| {
            tracing::warn!("Fail to decode SHOW SLAVE STATUS. reason=[{err}]");
            err
        })?;
        if let DecodeStatus::PartialTruncatedAt(index) = decoded.status {
            tracing::debug!(
                "SHOW SLAVE STATUS scan stopped at column {index} ({}), later fields left empty",
                row.column_name(index)
            );
        }

        let master = self.query_master_status().await.map_err(|err| {
            tracing::warn!("Fail to get Executed_Gtid_Set from SHOW MASTER STATUS. reason=[{err}]");
            err
        })?;
        decoded.record.executed_gtid_set = master.executed_gtid_set;

        Ok(Some(decoded))
    }

    /// Same as [`Engine::inspect_slave_status`], returning a default record
    /// for a non-replica.
    pub async fn query_slave_status(&self) -> Result<SlaveStatus> {
        Ok(self
            .inspect_slave_status()
            .await?
            .map(|decoded| decoded.record)
            .unwrap_or_default())
    }
}
