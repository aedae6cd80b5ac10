use std::collections::VecDeque;
use std::sync::Arc;

use crate::context::Deadline;
use crate::value::FromValue;
use crate::{DbError, Result, Value};

/// Result set as delivered by a backend connection.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }
}

/// One row with its column names.
#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    pub fn new(columns: impl Into<Arc<[String]>>, values: Vec<Value>) -> Self {
        Self {
            columns: columns.into(),
            values,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the raw value at `index`.
    pub fn value(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Converts the value at `index` into `T`.
    pub fn get<T: FromValue>(&self, index: usize) -> Result<T> {
        let value = self.values.get(index).ok_or_else(|| {
            DbError::Decode(format!(
                "column index {index} out of range for row of {} columns",
                self.values.len()
            ))
        })?;
        T::from_value(value).map_err(|err| DbError::Scan {
            index,
            column: self.column_name(index).to_owned(),
            reason: err.0,
        })
    }

    /// Converts a value by case-insensitive column name.
    pub fn get_by_name<T: FromValue>(&self, name: &str) -> Result<T> {
        let index = self
            .columns
            .iter()
            .position(|col| col.eq_ignore_ascii_case(name))
            .ok_or_else(|| DbError::Decode(format!("no column named '{name}'")))?;
        self.get(index)
    }

    pub(crate) fn column_name(&self, index: usize) -> &str {
        self.columns.get(index).map_or("", String::as_str)
    }
}

/// Cursor over the rows of a query.
///
/// The statement deadline stays armed while the cursor is open: once it
/// passes, [`Rows::next`] fails with [`DbError::DeadlineExceeded`]. Closing
/// or dropping the handle releases it.
#[derive(Debug)]
pub struct Rows {
    columns: Arc<[String]>,
    pending: VecDeque<Vec<Value>>,
    deadline: Option<Deadline>,
}

impl Rows {
    pub(crate) fn new(set: RowSet, deadline: Option<Deadline>) -> Self {
        Self {
            columns: set.columns.into(),
            pending: set.rows.into(),
            deadline,
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows not yet consumed.
    pub fn remaining(&self) -> usize {
        self.pending.len()
    }

    /// Advances the cursor. `Ok(None)` marks the end of the result set.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Option<Row>> {
        if let Some(deadline) = &self.deadline {
            if deadline.is_expired() {
                self.pending.clear();
                return Err(DbError::DeadlineExceeded {
                    timeout_sec: deadline.timeout_sec(),
                });
            }
        }
        Ok(self.pending.pop_front().map(|values| Row {
            columns: Arc::clone(&self.columns),
            values,
        }))
    }

    /// Drains the remaining rows.
    pub fn collect_rows(mut self) -> Result<Vec<Row>> {
        let mut out = Vec::with_capacity(self.pending.len());
        while let Some(row) = self.next()? {
            out.push(row);
        }
        Ok(out)
    }

    /// Releases the cursor and its deadline.
    pub fn close(self) {
        drop(self);
    }
}
