//! Port for running stored procedures.
//!
//! The procedures themselves are external: adapters only bind parameters,
//! run the call inside one transaction, and hand back every result set the
//! procedure produced, in order.

use async_trait::async_trait;

use crate::domain::{CellValue, ProcedureCall, RawResultSet};

use super::define_port_error;

define_port_error! {
    /// Errors raised by procedure executor adapters.
    pub enum ProcedureExecutorError {
        /// No connection could be obtained.
        Connection { message: String } =>
            "procedure host unavailable: {message}",
        /// The procedure raised or the driver failed mid-call.
        Execution { message: String } =>
            "procedure execution failed: {message}",
        /// The call could not be rendered (bad identifier or value).
        InvalidCall { message: String } =>
            "invalid procedure call: {message}",
    }
}

/// Runs a procedure and returns its raw result sets.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProcedureExecutor: Send + Sync {
    /// Execute `call`, committing on success and rolling back on failure.
    async fn run(&self, call: &ProcedureCall) -> Result<Vec<RawResultSet>, ProcedureExecutorError>;
}

/// Fixture executor for running the HTTP surface without a database.
///
/// Consult procedures return two rows for `ESCOM`; every other procedure
/// returns a single empty row-count set.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProcedureExecutor;

fn text(value: &str) -> CellValue {
    CellValue::Text(value.to_owned())
}

fn fixture_consult_set() -> RawResultSet {
    let columns = [
        "Periodo",
        "Sigla",
        "Nombre_Programa",
        "Modalidad",
        "Semestre",
        "Turno",
        "Grupo_Edad",
        "Tipo_de_Ingreso",
        "Aprovechamiento",
        "Sexo",
        "Matricula",
        "Id_Semaforo",
    ]
    .into_iter()
    .map(str::to_owned)
    .collect();
    let row = |shift: &str, sex: &str, count: i64| {
        vec![
            text("2025-2026/1"),
            text("ESCOM"),
            text("Ingeniería en Sistemas Computacionales"),
            text("Escolarizada"),
            text("Primer Semestre"),
            text(shift),
            text("18 a 20"),
            text("Nuevo Ingreso"),
            text("Aprobados"),
            text(sex),
            CellValue::Int(count),
            CellValue::Int(2),
        ]
    };
    RawResultSet::positional(
        columns,
        vec![row("Matutino", "Hombre", 30), row("Vespertino", "Mujer", 25)],
    )
}

#[async_trait]
impl ProcedureExecutor for FixtureProcedureExecutor {
    async fn run(&self, call: &ProcedureCall) -> Result<Vec<RawResultSet>, ProcedureExecutorError> {
        if call.procedure().starts_with("SP_Consulta_") {
            return Ok(vec![fixture_consult_set()]);
        }
        Ok(vec![RawResultSet {
            columns: None,
            rows: crate::domain::RowBatch::Positional(Vec::new()),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fixture_returns_rows_only_for_consult_procedures() {
        let consult = FixtureProcedureExecutor
            .run(&ProcedureCall::new("SP_Consulta_Matricula_Unidad_Academica"))
            .await
            .expect("fixture call");
        assert_eq!(consult[0].row_count(), 2);

        let update = FixtureProcedureExecutor
            .run(&ProcedureCall::new("SP_Finaliza_Captura_Matricula"))
            .await
            .expect("fixture call");
        assert!(update[0].columns.is_none());
    }
}
