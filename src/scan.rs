//! Left-to-right assignment of row columns into record fields.
//!
//! Assignment stops at the first column whose value cannot be converted into
//! its destination field. Fields before that column keep their decoded value,
//! fields at or after it keep their default.

use crate::value::ConvertError;
use crate::{DbError, Result, Row, Value};

/// Text carried by the error of a column assignment that stopped midway.
pub const PARTIAL_SCAN_MARKER: &str = "Scan error on column index";

/// How much of a row made it into the record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeStatus {
    Complete,
    /// Assignment stopped at this column index; later fields are defaults.
    PartialTruncatedAt(usize),
}

impl DecodeStatus {
    pub fn is_complete(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// A decoded record together with its [`DecodeStatus`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoded<T> {
    pub record: T,
    pub status: DecodeStatus,
}

/// Returns `true` for the known, recoverable column-assignment failure.
pub fn is_partial_scan_error(err: &DbError) -> bool {
    err.to_string().contains(PARTIAL_SCAN_MARKER)
}

/// Turns a partial-scan failure into a [`DecodeStatus`]; any other error is
/// handed back unchanged.
pub fn classify_scan_error(err: DbError) -> Result<DecodeStatus> {
    if !is_partial_scan_error(&err) {
        return Err(err);
    }
    let index = match &err {
        DbError::Scan { index, .. } => *index,
        other => marker_index(&other.to_string()).unwrap_or_default(),
    };
    Ok(DecodeStatus::PartialTruncatedAt(index))
}

fn marker_index(message: &str) -> Option<usize> {
    let (_, tail) = message.split_once(PARTIAL_SCAN_MARKER)?;
    let digits: String = tail
        .trim_start()
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse().ok()
}

/// Assigns `row` into `record` following `layout`, one destination per column.
pub(crate) fn scan_row<F, R>(
    row: &Row,
    layout: &[F],
    record: &mut R,
    assign: impl Fn(F, &mut R, &Value) -> std::result::Result<(), ConvertError>,
) -> Result<()>
where
    F: Copy,
{
    if row.len() != layout.len() {
        return Err(DbError::Decode(format!(
            "expected {} destination arguments in scan, not {}",
            row.len(),
            layout.len()
        )));
    }

    for (index, (field, value)) in layout.iter().zip(row.values()).enumerate() {
        assign(*field, record, value).map_err(|err| DbError::Scan {
            index,
            column: row.column_name(index).to_owned(),
            reason: err.0,
        })?;
    }
    Ok(())
}
