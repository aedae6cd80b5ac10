use serde::Serialize;

use crate::Rows;

/// Execution metadata of a statement that returns no rows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ExecResult {
    pub affected_row_count: u64,
    pub last_insert_id: Option<u64>,
}

/// One row of `SHOW WARNINGS`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Warning {
    pub level: String,
    pub code: u32,
    pub message: String,
}

/// Warnings and cost of the previous statement on a pinned connection.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostics {
    pub warnings: Vec<Warning>,
    pub cost: f64,
}

/// Cost value meaning "not measured".
pub const COST_NOT_MEASURED: f64 = -1.0;

#[derive(Debug)]
pub enum Output {
    Rows(Rows),
    Exec(ExecResult),
}

/// Result of one statement invocation.
///
/// Row-returning statements carry a [`Rows`] cursor, everything else an
/// [`ExecResult`]. `warnings` and `cost` stay empty/unmeasured until
/// [`StatementOutcome::with_diagnostics`] fills them in.
#[derive(Debug)]
pub struct StatementOutcome {
    pub output: Output,
    pub warnings: Vec<Warning>,
    pub cost: f64,
}

impl StatementOutcome {
    pub(crate) fn rows(rows: Rows) -> Self {
        Self::from_output(Output::Rows(rows))
    }

    pub(crate) fn exec(result: ExecResult) -> Self {
        Self::from_output(Output::Exec(result))
    }

    fn from_output(output: Output) -> Self {
        Self {
            output,
            warnings: Vec::new(),
            cost: COST_NOT_MEASURED,
        }
    }

    pub fn as_rows(&mut self) -> Option<&mut Rows> {
        match &mut self.output {
            Output::Rows(rows) => Some(rows),
            Output::Exec(_) => None,
        }
    }

    pub fn into_rows(self) -> Option<Rows> {
        match self.output {
            Output::Rows(rows) => Some(rows),
            Output::Exec(_) => None,
        }
    }

    pub fn exec_result(&self) -> Option<&ExecResult> {
        match &self.output {
            Output::Exec(result) => Some(result),
            Output::Rows(_) => None,
        }
    }

    pub fn is_cost_measured(&self) -> bool {
        self.cost >= 0.0
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.warnings = diagnostics.warnings;
        self.cost = diagnostics.cost;
        self
    }
}
