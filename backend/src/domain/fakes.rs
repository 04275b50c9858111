//! In-memory port implementations for workflow scenarios in tests.
//!
//! The procedure fake mimics the procedures' effects on the status lights:
//! a semester update completes that semester and finalize completes the
//! unit. Every call is recorded so tests can count them.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::ports::{
    ProcedureExecutor, ProcedureExecutorError, StagingRepository, StagingRepositoryError,
    UnitStatusRepository, UnitStatusRepositoryError, ValidationRepository,
    ValidationRepositoryError,
};
use super::{
    CellValue, FormKind, ParamValue, ProcedureCall, RawResultSet, StagedFigure, StagingKey,
    ValidationRecord,
};

fn locked<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().expect("fake state lock")
}

/// Staging tables keyed by natural key, in first-insert order.
#[derive(Default)]
pub struct InMemoryStaging {
    rows: Mutex<Vec<StagedFigure>>,
}

impl InMemoryStaging {
    /// Stored figure for a key.
    pub fn get(&self, key: &StagingKey) -> Option<StagedFigure> {
        locked(&self.rows)
            .iter()
            .find(|figure| &figure.key == key)
            .cloned()
    }

    /// Every stored figure.
    pub fn all(&self) -> Vec<StagedFigure> {
        locked(&self.rows).clone()
    }
}

#[async_trait]
impl StagingRepository for InMemoryStaging {
    async fn upsert_batch(&self, figures: &[StagedFigure]) -> Result<usize, StagingRepositoryError> {
        let mut rows = locked(&self.rows);
        for figure in figures {
            match rows.iter_mut().find(|row| row.key == figure.key) {
                Some(row) => *row = figure.clone(),
                None => rows.push(figure.clone()),
            }
        }
        Ok(figures.len())
    }

    async fn count(&self, form: FormKind) -> Result<u64, StagingRepositoryError> {
        let rows = locked(&self.rows);
        Ok(rows.iter().filter(|row| row.key.dimension.form() == form).count() as u64)
    }

    async fn count_for(
        &self,
        form: FormKind,
        period: &str,
        unit_code: &str,
    ) -> Result<u64, StagingRepositoryError> {
        let rows = locked(&self.rows);
        Ok(rows
            .iter()
            .map(|row| &row.key)
            .filter(|key| {
                key.dimension.form() == form && key.period == period && key.unit_code == unit_code
            })
            .count() as u64)
    }

    async fn list(&self, form: FormKind) -> Result<Vec<StagedFigure>, StagingRepositoryError> {
        let rows = locked(&self.rows);
        Ok(rows
            .iter()
            .filter(|row| row.key.dimension.form() == form)
            .cloned()
            .collect())
    }

    async fn truncate(&self, form: FormKind) -> Result<u64, StagingRepositoryError> {
        let mut rows = locked(&self.rows);
        let before = rows.len();
        rows.retain(|row| row.key.dimension.form() != form);
        Ok((before - rows.len()) as u64)
    }
}

/// Status lights shared by the procedure fake and the unit status fake.
#[derive(Default)]
pub struct StatusBoard {
    unit: Mutex<Option<i32>>,
    semesters: Mutex<BTreeMap<String, i64>>,
}

impl StatusBoard {
    /// Board with the unit light and one light per semester.
    pub fn new(unit: Option<i32>, semesters: &[(&str, i64)]) -> Arc<Self> {
        Arc::new(Self {
            unit: Mutex::new(unit),
            semesters: Mutex::new(
                semesters
                    .iter()
                    .map(|(label, status)| ((*label).to_owned(), *status))
                    .collect(),
            ),
        })
    }

    /// Overwrite one semester light.
    pub fn set_semester(&self, label: &str, status: i64) {
        locked(&self.semesters).insert(label.to_owned(), status);
    }

    /// Current unit light.
    pub fn unit(&self) -> Option<i32> {
        *locked(&self.unit)
    }
}

#[async_trait]
impl UnitStatusRepository for StatusBoard {
    async fn find_unit_status(
        &self,
        _period_id: i32,
        _unit_id: i32,
        _form: FormKind,
    ) -> Result<Option<i32>, UnitStatusRepositoryError> {
        Ok(self.unit())
    }
}

/// Procedure fake driving a [`StatusBoard`].
pub struct BoardExecutor {
    board: Arc<StatusBoard>,
    calls: Mutex<Vec<ProcedureCall>>,
    failing: Mutex<Option<&'static str>>,
}

impl BoardExecutor {
    /// Executor over `board`.
    pub fn new(board: Arc<StatusBoard>) -> Self {
        Self {
            board,
            calls: Mutex::new(Vec::new()),
            failing: Mutex::new(None),
        }
    }

    /// Make every call to `procedure` fail.
    pub fn fail_on(&self, procedure: &'static str) {
        *locked(&self.failing) = Some(procedure);
    }

    /// Number of calls made to `procedure`.
    pub fn calls_to(&self, procedure: &str) -> usize {
        locked(&self.calls)
            .iter()
            .filter(|call| call.procedure() == procedure)
            .count()
    }

    /// Every call, in order.
    pub fn calls(&self) -> Vec<ProcedureCall> {
        locked(&self.calls).clone()
    }

    fn consult_set(&self) -> RawResultSet {
        let columns = ["Nombre_Programa", "Modalidad", "Semestre", "Id_Semaforo"]
            .into_iter()
            .map(str::to_owned)
            .collect();
        let rows = locked(&self.board.semesters)
            .iter()
            .map(|(semester, status)| {
                vec![
                    CellValue::Text("Ingeniería en Sistemas Computacionales".to_owned()),
                    CellValue::Text("Escolarizada".to_owned()),
                    CellValue::Text(semester.clone()),
                    CellValue::Int(*status),
                ]
            })
            .collect();
        RawResultSet::positional(columns, rows)
    }
}

#[async_trait]
impl ProcedureExecutor for BoardExecutor {
    async fn run(&self, call: &ProcedureCall) -> Result<Vec<RawResultSet>, ProcedureExecutorError> {
        locked(&self.calls).push(call.clone());
        if *locked(&self.failing) == Some(call.procedure()) {
            return Err(ProcedureExecutorError::execution("forced failure"));
        }
        let name = call.procedure();
        if name.starts_with("SP_Consulta_") {
            return Ok(vec![self.consult_set()]);
        }
        if name.contains("_Por_Semestre_") {
            if let Some(ParamValue::Text(semester)) = call.param("SSemestre") {
                locked(&self.board.semesters).insert(semester.clone(), 3);
            }
        } else if name.starts_with("SP_Finaliza_") {
            *locked(&self.board.unit) = Some(3);
        }
        Ok(Vec::new())
    }
}

/// Validation records held in a vector.
#[derive(Default)]
pub struct InMemoryValidations {
    records: Mutex<Vec<ValidationRecord>>,
    clear_fails: Mutex<bool>,
}

impl InMemoryValidations {
    /// Every live record.
    pub fn all(&self) -> Vec<ValidationRecord> {
        locked(&self.records).clone()
    }

    /// Make every later `clear` fail.
    pub fn fail_clear(&self) {
        *locked(&self.clear_fails) = true;
    }
}

#[async_trait]
impl ValidationRepository for InMemoryValidations {
    async fn find(
        &self,
        period_id: i32,
        user_id: i32,
        form: FormKind,
    ) -> Result<Option<ValidationRecord>, ValidationRepositoryError> {
        Ok(locked(&self.records)
            .iter()
            .find(|r| r.period_id == period_id && r.user_id == user_id && r.form == form)
            .cloned())
    }

    async fn latest_rejection(
        &self,
        period_id: i32,
        form: FormKind,
    ) -> Result<Option<ValidationRecord>, ValidationRepositoryError> {
        Ok(locked(&self.records)
            .iter()
            .filter(|r| r.period_id == period_id && r.form == form && !r.validated)
            .max_by_key(|r| r.recorded_at)
            .cloned())
    }

    async fn upsert(&self, record: &ValidationRecord) -> Result<(), ValidationRepositoryError> {
        let mut records = locked(&self.records);
        records.retain(|r| {
            !(r.period_id == record.period_id && r.user_id == record.user_id && r.form == record.form)
        });
        records.push(record.clone());
        Ok(())
    }

    async fn replace_all(&self, record: &ValidationRecord) -> Result<(), ValidationRepositoryError> {
        let mut records = locked(&self.records);
        records.retain(|r| !(r.period_id == record.period_id && r.form == record.form));
        records.push(record.clone());
        Ok(())
    }

    async fn clear(&self, period_id: i32, form: FormKind) -> Result<u64, ValidationRepositoryError> {
        if *locked(&self.clear_fails) {
            return Err(ValidationRepositoryError::connection("forced failure"));
        }
        let mut records = locked(&self.records);
        let before = records.len();
        records.retain(|r| !(r.period_id == period_id && r.form == form));
        Ok((before - records.len()) as u64)
    }
}
