//! Result-set selection and the gateway service.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use super::{CellValue, ProcedureCall, RawResultSet, Row};
use crate::domain::CaptureError;
use crate::domain::ports::ProcedureExecutor;

/// Primary rows plus the optional scalar note of a procedure call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProcedureOutcome {
    /// Normalised rows of the primary set.
    pub rows: Vec<Row>,
    /// Declared columns of the primary set.
    pub columns: Vec<String>,
    /// Single-value note from a later one-column set, e.g. a rejection reason.
    pub note: Option<String>,
}

fn note_text(value: CellValue) -> Option<String> {
    let text = match value {
        CellValue::Null => return None,
        CellValue::Bool(flag) => flag.to_string(),
        CellValue::Int(number) => number.to_string(),
        CellValue::Float(number) => number.to_string(),
        CellValue::Text(text) | CellValue::Other(text) => text,
        CellValue::Bytes(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Pick the primary set and the note out of every set a procedure returned.
///
/// The first set with more than one column is the primary payload. A later
/// set with exactly one column and a non-empty first value is the note.
/// Sets without a column description are skipped.
pub fn select_outcome(sets: Vec<RawResultSet>) -> ProcedureOutcome {
    let mut outcome = ProcedureOutcome::default();
    let mut primary_seen = false;
    for set in sets {
        let Some(width) = set.column_count() else {
            continue;
        };
        if !primary_seen && width > 1 {
            primary_seen = true;
            outcome.columns = set.columns.clone().unwrap_or_default();
            outcome.rows = set.normalize();
        } else if primary_seen && width == 1 && outcome.note.is_none() {
            outcome.note = set.first_value().and_then(note_text);
        }
    }
    outcome
}

/// Executes procedures through the executor port and shapes their results.
#[derive(Clone)]
pub struct ProcedureGateway {
    executor: Arc<dyn ProcedureExecutor>,
}

impl ProcedureGateway {
    /// Wrap an executor.
    pub fn new(executor: Arc<dyn ProcedureExecutor>) -> Self {
        Self { executor }
    }

    /// Run `call` and select its primary rows and note.
    ///
    /// # Errors
    /// [`CaptureError::ProcedureExecution`] when the executor fails. The
    /// failure is logged with the attempted parameters; the caller must
    /// re-query state rather than assume the call had no effect.
    pub async fn execute(&self, call: &ProcedureCall) -> Result<ProcedureOutcome, CaptureError> {
        match self.executor.run(call).await {
            Ok(sets) => {
                let outcome = select_outcome(sets);
                debug!(
                    procedure = call.procedure(),
                    rows = outcome.rows.len(),
                    has_note = outcome.note.is_some(),
                    "procedure executed"
                );
                Ok(outcome)
            }
            Err(err) => {
                error!(
                    procedure = call.procedure(),
                    params = %call.params_json(),
                    error = %err,
                    "procedure execution failed"
                );
                Err(CaptureError::procedure(call.procedure(), err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RowBatch;
    use crate::domain::ports::{MockProcedureExecutor, ProcedureExecutorError};
    use serde_json::json;

    fn set(columns: Option<&[&str]>, rows: Vec<Vec<CellValue>>) -> RawResultSet {
        RawResultSet {
            columns: columns.map(|c| c.iter().map(|n| (*n).to_owned()).collect()),
            rows: RowBatch::Positional(rows),
        }
    }

    #[test]
    fn first_wide_set_is_primary_and_later_single_column_set_is_note() {
        let outcome = select_outcome(vec![
            set(None, Vec::new()),
            set(Some(&["Nota"]), vec![vec![CellValue::Text("ignored".into())]]),
            set(
                Some(&["Semestre", "Id_Semaforo"]),
                vec![vec![CellValue::Text("Primer".into()), CellValue::Int(3)]],
            ),
            set(
                Some(&["A", "B"]),
                vec![vec![CellValue::Int(1), CellValue::Int(2)]],
            ),
            set(Some(&["Nota"]), vec![vec![CellValue::Text(" Faltan datos ".into())]]),
        ]);
        assert_eq!(outcome.columns, vec!["Semestre", "Id_Semaforo"]);
        assert_eq!(outcome.rows.len(), 1);
        assert_eq!(outcome.rows[0]["Id_Semaforo"], json!(3));
        assert_eq!(outcome.note.as_deref(), Some("Faltan datos"));
    }

    #[test]
    fn empty_or_null_note_is_ignored() {
        let outcome = select_outcome(vec![
            set(Some(&["A", "B"]), Vec::new()),
            set(Some(&["Nota"]), vec![vec![CellValue::Null]]),
            set(Some(&["Nota"]), vec![vec![CellValue::Text("  ".into())]]),
        ]);
        assert!(outcome.rows.is_empty());
        assert!(outcome.note.is_none());
    }

    #[test]
    fn empty_primary_set_still_claims_the_primary_slot() {
        let outcome = select_outcome(vec![
            set(Some(&["Semestre", "Id_Semaforo"]), Vec::new()),
            set(
                Some(&["Motivo"]),
                vec![vec![CellValue::Text("Revisar primer semestre".into())]],
            ),
        ]);
        assert_eq!(outcome.columns, vec!["Semestre", "Id_Semaforo"]);
        assert!(outcome.rows.is_empty());
        assert_eq!(outcome.note.as_deref(), Some("Revisar primer semestre"));
    }

    #[tokio::test]
    async fn execution_failures_become_typed_errors() {
        let mut executor = MockProcedureExecutor::new();
        executor
            .expect_run()
            .times(1)
            .return_once(|_| Err(ProcedureExecutorError::execution("deadlock")));
        let gateway = ProcedureGateway::new(Arc::new(executor));

        let error = gateway
            .execute(&ProcedureCall::new("SP_Finaliza_Captura_Matricula"))
            .await
            .expect_err("failure surfaces");
        assert!(matches!(
            error,
            CaptureError::ProcedureExecution { ref procedure, .. }
                if procedure == "SP_Finaliza_Captura_Matricula"
        ));
    }
}
