//! Workflow orchestration over the procedure gateway and status tables.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::decision::{
    FinalizeDecision, Semaforo, decide_finalize, row_status, semester_completion,
};
use crate::domain::ports::{
    CatalogRepository, ProcedureExecutor, StagingRepository, UnitStatusRepository,
    UnitStatusRepositoryError, ValidationRepository, ValidationRepositoryError, WorkflowLock,
    WorkflowLockError, lock_key,
};
use crate::domain::staging::map_staging_error;
use crate::domain::{
    Actor, CaptureError, CatalogKind, CatalogResolver, FormKind, PeriodRef, PortalSettings,
    ProcedureCall, ProcedureGateway, ProcedureOutcome, RejectionNotice, ReviewState, Row,
    UnitContext, ValidationRecord, blank_nulls, extract_unique,
};

const MISSING_PARAMETERS: &str = "Faltan parámetros obligatorios";
const REVIEW_ONLY: &str = "Solo los roles de validación pueden usar esta función";
const CAPTURE_ONLY: &str = "Solo el rol de captura puede modificar la captura";
const UNIT_UNAVAILABLE: &str = "No se pudo obtener la Unidad Académica";
const REASON_REQUIRED: &str = "El motivo del rechazo es obligatorio";

/// Ports the workflow needs, grouped for construction.
#[derive(Clone)]
pub struct WorkflowPorts {
    /// Catalog lookups.
    pub catalog: Arc<dyn CatalogRepository>,
    /// Procedure execution.
    pub executor: Arc<dyn ProcedureExecutor>,
    /// Staging tables.
    pub staging: Arc<dyn StagingRepository>,
    /// Unit status reads.
    pub unit_status: Arc<dyn UnitStatusRepository>,
    /// Reviewer decisions.
    pub validations: Arc<dyn ValidationRepository>,
    /// Finalize lock.
    pub lock: Arc<dyn WorkflowLock>,
}

/// Shift validation request; every field is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShiftRequest {
    /// Period id or literal.
    pub period: Option<String>,
    /// Program id.
    pub program_id: Option<i32>,
    /// Modality id.
    pub modality_id: Option<i32>,
    /// Semester id.
    pub semester_id: Option<i32>,
    /// Shift id.
    pub shift_id: Option<i32>,
}

/// Semester consolidation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SemesterRequest {
    /// Period id or literal.
    pub period: Option<String>,
    /// Program id.
    pub program_id: Option<i32>,
    /// Modality id.
    pub modality_id: Option<i32>,
    /// Semester id.
    pub semester_id: Option<i32>,
    /// Room count for the semester.
    pub total_groups: i64,
}

/// Consult procedure output prepared for a data view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsultView {
    /// Period consulted.
    pub period: PeriodRef,
    /// Unit consulted.
    #[serde(skip)]
    pub unit: UnitContext,
    /// Rows with null markers blanked, plus the rejection note if any.
    pub outcome: ProcedureOutcome,
    /// Choice lists per metadata key.
    pub metadata: BTreeMap<String, Vec<String>>,
}

/// Successful stage-to-permanent commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommitReceipt {
    /// Rows staged before the commit.
    pub processed: u64,
    /// Whether staging is empty afterwards.
    pub staging_cleared: bool,
    /// `@UUsuario` used.
    pub user: String,
    /// Period literal.
    pub period: String,
    /// Reviewer decisions invalidated by the commit.
    pub validations_cleared: u64,
}

/// Result of a stage-to-permanent commit.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CommitOutcome {
    /// Staging was empty; no procedure ran.
    NothingStaged,
    /// The unit update ran and staging was truncated.
    Committed(CommitReceipt),
}

/// Result of validating one shift.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShiftValidation {
    /// Shift label.
    pub shift: String,
    /// Semester label.
    pub semester: String,
    /// Procedure run.
    pub procedure: &'static str,
    /// Rows returned by the procedure.
    pub rows: Vec<Row>,
    /// Staged rows seen for the unit before the call.
    pub staged: u64,
}

/// Result of consolidating one semester.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SemesterConsolidation {
    /// Semester label.
    pub semester: String,
    /// Procedures run, in order.
    pub procedures: Vec<&'static str>,
    /// Finalize check outcome.
    pub decision: FinalizeDecision,
    /// Whether finalize ran in this request.
    pub finalized: bool,
    /// Light of the consolidated semester after the calls, re-queried.
    pub semester_status: Option<Semaforo>,
    /// Parameters sent to the semester procedure.
    pub params: Value,
}

/// Result of a reviewer approval or rejection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewReceipt {
    /// Reviewer display name.
    pub reviewer: String,
    /// `@UUsuario` used.
    pub login: String,
    /// Reviewer id.
    pub user_id: i32,
    /// Reviewer role id.
    pub role_id: i32,
    /// Decision time.
    pub at: DateTime<Utc>,
    /// Period literal.
    pub period: String,
    /// Unit `Sigla`.
    pub unit_code: String,
    /// Rejection reason.
    pub reason: Option<String>,
}

struct SemesterTarget {
    period: PeriodRef,
    unit: UnitContext,
    program: String,
    modality: String,
    semester: String,
}

/// Drives the capture workflow.
#[derive(Clone)]
pub struct WorkflowService {
    resolver: CatalogResolver,
    gateway: ProcedureGateway,
    staging: Arc<dyn StagingRepository>,
    unit_status: Arc<dyn UnitStatusRepository>,
    validations: Arc<dyn ValidationRepository>,
    lock: Arc<dyn WorkflowLock>,
    settings: PortalSettings,
}

fn map_validation_error(error: ValidationRepositoryError) -> CaptureError {
    CaptureError::persistence(format!("validation records unavailable: {error}"))
}

fn map_status_error(error: UnitStatusRepositoryError) -> CaptureError {
    CaptureError::persistence(format!("unit status unavailable: {error}"))
}

fn map_lock_error(error: WorkflowLockError) -> CaptureError {
    CaptureError::persistence(format!("workflow lock unavailable: {error}"))
}

fn require_present(fields: &[(&'static str, bool)]) -> Result<(), CaptureError> {
    let missing: Vec<&'static str> = fields
        .iter()
        .filter_map(|(name, present)| (!present).then_some(*name))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(CaptureError::missing(missing, MISSING_PARAMETERS))
    }
}

fn has_text(value: Option<&String>) -> bool {
    value.is_some_and(|text| !text.trim().is_empty())
}

impl WorkflowService {
    /// Build the service.
    pub fn new(ports: WorkflowPorts, settings: PortalSettings) -> Self {
        Self {
            resolver: CatalogResolver::new(ports.catalog),
            gateway: ProcedureGateway::new(ports.executor),
            staging: ports.staging,
            unit_status: ports.unit_status,
            validations: ports.validations,
            lock: ports.lock,
            settings,
        }
    }

    /// Catalog resolver shared with views.
    pub fn resolver(&self) -> &CatalogResolver {
        &self.resolver
    }

    /// Portal settings.
    pub fn settings(&self) -> &PortalSettings {
        &self.settings
    }

    /// Run the consult procedure for the actor's unit.
    ///
    /// # Errors
    /// [`CaptureError::Forbidden`] for roles without capture or review
    /// capability, [`CaptureError::Resolution`] for an unknown unit or level,
    /// and [`CaptureError::ProcedureExecution`] when the query fails.
    pub async fn consult(
        &self,
        form: FormKind,
        actor: &Actor,
        period: Option<&str>,
    ) -> Result<ConsultView, CaptureError> {
        let role = actor.role();
        if !role.can_capture() && !role.can_review() {
            return Err(CaptureError::forbidden("Acceso denegado"));
        }
        let unit = self
            .resolver
            .require_unit_context(actor.unit_id, actor.level_id)
            .await?;
        let period = self
            .resolver
            .resolve_period(period, &self.settings.default_period)
            .await;
        let mut outcome = self
            .gateway
            .execute(&consult_call(form, actor, &unit, &period.literal))
            .await?;
        blank_nulls(&mut outcome.rows);
        let metadata = extract_unique(&outcome.rows, form.metadata_columns());
        Ok(ConsultView {
            period,
            unit,
            outcome,
            metadata,
        })
    }

    /// Move staged rows to the permanent table and truncate staging.
    ///
    /// With nothing staged no procedure runs. Otherwise reviewer decisions
    /// for the period are cleared so the new figures get reviewed, then the
    /// unit update runs and staging is truncated.
    ///
    /// # Errors
    /// [`CaptureError::ProcedureExecution`] leaves staging untouched;
    /// [`CaptureError::Persistence`] for staging or record failures, raised
    /// before the procedure when the decisions cannot be cleared.
    pub async fn commit_staging(
        &self,
        form: FormKind,
        actor: &Actor,
        period: Option<&str>,
        total_groups: i64,
    ) -> Result<CommitOutcome, CaptureError> {
        require_capturist(actor)?;
        let unit = self
            .resolver
            .require_unit_context(actor.unit_id, actor.level_id)
            .await?;
        let period = self
            .resolver
            .resolve_period(period, &self.settings.default_period)
            .await;
        let staged = self.staging.count(form).await.map_err(map_staging_error)?;
        if staged == 0 {
            warn!(%form, period = %period.literal, "nothing staged, skipping unit update");
            return Ok(CommitOutcome::NothingStaged);
        }

        let validations_cleared = self.clear_reviews(form, &period).await?;
        self.gateway
            .execute(&unit_update_call(form, actor, &unit, &period.literal, total_groups))
            .await?;
        self.staging.truncate(form).await.map_err(map_staging_error)?;
        let remaining = self.staging.count(form).await.map_err(map_staging_error)?;
        info!(%form, period = %period.literal, unit = %unit.unit_code, staged, "staging committed");
        Ok(CommitOutcome::Committed(CommitReceipt {
            processed: staged,
            staging_cleared: remaining == 0,
            user: actor.procedure_user(),
            period: period.literal,
            validations_cleared,
        }))
    }

    /// Validate one shift.
    ///
    /// Clears reviewer decisions, then runs the unit update with zero rooms
    /// whether or not the unit has staged rows. Semester lights are not
    /// touched; shift locking is client state.
    ///
    /// # Errors
    /// [`CaptureError::MissingParameter`] before any side effect when a
    /// field is absent; resolution and procedure errors otherwise.
    pub async fn prepare_shift(
        &self,
        form: FormKind,
        actor: &Actor,
        request: ShiftRequest,
    ) -> Result<ShiftValidation, CaptureError> {
        require_capturist(actor)?;
        require_present(&[
            ("periodo", has_text(request.period.as_ref())),
            ("programa", request.program_id.is_some()),
            ("modalidad", request.modality_id.is_some()),
            ("semestre", request.semester_id.is_some()),
            ("turno", request.shift_id.is_some()),
        ])?;
        let (Some(program_id), Some(modality_id), Some(semester_id), Some(shift_id)) = (
            request.program_id,
            request.modality_id,
            request.semester_id,
            request.shift_id,
        ) else {
            return Err(CaptureError::missing(Vec::new(), MISSING_PARAMETERS));
        };
        let target = self
            .resolve_semester(actor, request.period.as_deref(), program_id, modality_id, semester_id)
            .await?;
        let shift = self
            .resolver
            .require_entry(CatalogKind::Shift, shift_id)
            .await?;

        let staged = self
            .staging
            .count_for(form, &target.period.literal, &target.unit.unit_code)
            .await
            .map_err(map_staging_error)?;
        if staged == 0 {
            info!(%form, shift = %shift.label, "no staged rows for unit, updating with zero rooms");
        }
        self.clear_reviews(form, &target.period).await?;
        let call = unit_update_call(form, actor, &target.unit, &target.period.literal, 0);
        let outcome = self.gateway.execute(&call).await?;
        Ok(ShiftValidation {
            shift: shift.label,
            semester: target.semester,
            procedure: call.procedure(),
            rows: outcome.rows,
            staged,
        })
    }

    /// Consolidate a semester, then finalize the unit if every semester is
    /// complete.
    ///
    /// The finalize check re-reads the unit light and the consult rows under
    /// the `(period, unit, form)` lock, so two requests never both finalize.
    ///
    /// # Errors
    /// Missing and resolution errors before any call; procedure errors
    /// after the semester call leave the outcome to be re-queried.
    pub async fn consolidate_semester(
        &self,
        form: FormKind,
        actor: &Actor,
        request: SemesterRequest,
    ) -> Result<SemesterConsolidation, CaptureError> {
        require_capturist(actor)?;
        require_present(&[
            ("periodo", has_text(request.period.as_ref())),
            ("programa", request.program_id.is_some()),
            ("modalidad", request.modality_id.is_some()),
            ("semestre", request.semester_id.is_some()),
        ])?;
        let (Some(program_id), Some(modality_id), Some(semester_id)) =
            (request.program_id, request.modality_id, request.semester_id)
        else {
            return Err(CaptureError::missing(Vec::new(), MISSING_PARAMETERS));
        };
        let target = self
            .resolve_semester(actor, request.period.as_deref(), program_id, modality_id, semester_id)
            .await?;

        self.clear_reviews(form, &target.period).await?;
        let procedures = form.procedures();
        let semester_call = semester_call(procedures.update_semester, form, actor, &target, request.total_groups);
        let params = semester_call.params_json();
        self.gateway.execute(&semester_call).await?;
        let mut executed = vec![procedures.update_semester];

        let key = lock_key(&target.period.literal, &target.unit.unit_code, form);
        let guard = self.lock.acquire(&key).await.map_err(map_lock_error)?;
        let decided = self
            .finalize_if_complete(form, actor, &target, request.total_groups)
            .await;
        if let Err(error) = guard.release().await {
            warn!(%error, lock = %key, "workflow lock release failed");
        }
        let decision = decided?;
        let finalized = decision.should_finalize();
        if finalized {
            executed.push(procedures.finalize);
        }

        let semester_status = self.semester_status(form, actor, &target).await;
        Ok(SemesterConsolidation {
            semester: target.semester,
            procedures: executed,
            decision,
            finalized,
            semester_status,
            params,
        })
    }

    /// Approve the actor's unit capture for a period.
    ///
    /// # Errors
    /// [`CaptureError::Forbidden`] for non-reviewers,
    /// [`CaptureError::Resolution`] for an unknown unit, and procedure or
    /// record failures.
    pub async fn approve(
        &self,
        form: FormKind,
        actor: &Actor,
        period: Option<&str>,
    ) -> Result<ReviewReceipt, CaptureError> {
        let (period, unit_code, reviewer) = self.review_context(actor, period).await?;
        let note = format!("Validado por {reviewer}");
        let call = review_call(form.procedures().validate, actor, &period, &unit_code)
            .int("semaforo", i64::from(Semaforo::Completed.value()))
            .text("NNota", note.clone());
        self.gateway.execute(&call).await?;
        self.validations
            .upsert(&ValidationRecord::approval(period.id, actor.user_id, form, note))
            .await
            .map_err(map_validation_error)?;
        info!(%form, period = %period.literal, unit = %unit_code, reviewer = %reviewer, "capture validated");
        Ok(review_receipt(actor, reviewer, period, unit_code, None))
    }

    /// Reject the actor's unit capture for a period.
    ///
    /// Every reviewer decision for the period and form is replaced by this
    /// rejection.
    ///
    /// # Errors
    /// [`CaptureError::MissingParameter`] for a blank reason, otherwise as
    /// [`WorkflowService::approve`].
    pub async fn reject(
        &self,
        form: FormKind,
        actor: &Actor,
        period: Option<&str>,
        reason: &str,
    ) -> Result<ReviewReceipt, CaptureError> {
        if !actor.role().can_review() {
            return Err(CaptureError::forbidden(REVIEW_ONLY));
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(CaptureError::missing(vec!["motivo"], REASON_REQUIRED));
        }
        let (period, unit_code, reviewer) = self.review_context(actor, period).await?;
        let call = review_call(form.procedures().reject, actor, &period, &unit_code)
            .text("NNota", reason);
        self.gateway.execute(&call).await?;
        self.validations
            .replace_all(&ValidationRecord::rejection(period.id, actor.user_id, form, reason))
            .await
            .map_err(map_validation_error)?;
        info!(%form, period = %period.literal, unit = %unit_code, reviewer = %reviewer, "capture rejected");
        Ok(review_receipt(actor, reviewer, period, unit_code, Some(reason.to_owned())))
    }

    /// The reviewer's live decision for a period and form.
    ///
    /// # Errors
    /// [`CaptureError::Persistence`] when records cannot be read.
    pub async fn review_state(
        &self,
        form: FormKind,
        period_id: i32,
        user_id: i32,
    ) -> Result<ReviewState, CaptureError> {
        let record = self
            .validations
            .find(period_id, user_id, form)
            .await
            .map_err(map_validation_error)?;
        Ok(ReviewState::from(record.as_ref()))
    }

    /// Latest rejection for a period and form, ready for display.
    ///
    /// # Errors
    /// [`CaptureError::Persistence`] when records cannot be read.
    pub async fn rejection_notice(
        &self,
        form: FormKind,
        period_id: i32,
        procedure_note: Option<&str>,
    ) -> Result<Option<RejectionNotice>, CaptureError> {
        let Some(record) = self
            .validations
            .latest_rejection(period_id, form)
            .await
            .map_err(map_validation_error)?
        else {
            if procedure_note.is_some() {
                warn!(%form, period_id, "procedure returned a note without a rejection record");
            }
            return Ok(None);
        };
        let reviewer = match self.resolver.repository().find_user_name(record.user_id).await {
            Ok(Some(name)) => name,
            Ok(None) => format!("Usuario {}", record.user_id),
            Err(error) => {
                warn!(%error, user_id = record.user_id, "reviewer name lookup failed");
                format!("Usuario {}", record.user_id)
            }
        };
        Ok(Some(RejectionNotice::new(&record, procedure_note, reviewer)))
    }

    async fn finalize_if_complete(
        &self,
        form: FormKind,
        actor: &Actor,
        target: &SemesterTarget,
        total_groups: i64,
    ) -> Result<FinalizeDecision, CaptureError> {
        let status = self
            .unit_status
            .find_unit_status(target.period.id, target.unit.unit_id, form)
            .await
            .map_err(map_status_error)?;
        let semesters = if status == Some(Semaforo::InCapture.value()) {
            let outcome = self
                .gateway
                .execute(&consult_call(form, actor, &target.unit, &target.period.literal))
                .await?;
            semester_completion(&outcome.rows)
        } else {
            BTreeMap::new()
        };
        let decision = decide_finalize(status, &semesters);
        match &decision {
            FinalizeDecision::Finalize => {
                let call = semester_call(form.procedures().finalize, form, actor, target, total_groups);
                self.gateway.execute(&call).await?;
                info!(%form, period = %target.period.literal, unit = %target.unit.unit_code, "unit finalized");
            }
            FinalizeDecision::UnexpectedUnitStatus { status } => {
                warn!(
                    %form,
                    period = %target.period.literal,
                    unit = %target.unit.unit_code,
                    ?status,
                    "unexpected unit status, finalize skipped"
                );
            }
            other => info!(%form, unit = %target.unit.unit_code, decision = ?other, "finalize not needed"),
        }
        Ok(decision)
    }

    async fn semester_status(
        &self,
        form: FormKind,
        actor: &Actor,
        target: &SemesterTarget,
    ) -> Option<Semaforo> {
        let call = consult_call(form, actor, &target.unit, &target.period.literal);
        let outcome = match self.gateway.execute(&call).await {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(%error, "semester status re-query failed");
                return None;
            }
        };
        outcome
            .rows
            .iter()
            .find(|row| {
                row_matches(row, "Nombre_Programa", &target.program)
                    && row_matches(row, "Modalidad", &target.modality)
                    && row_matches(row, "Semestre", &target.semester)
            })
            .and_then(row_status)
    }

    async fn resolve_semester(
        &self,
        actor: &Actor,
        period: Option<&str>,
        program_id: i32,
        modality_id: i32,
        semester_id: i32,
    ) -> Result<SemesterTarget, CaptureError> {
        let period = self
            .resolver
            .resolve_period(period, &self.settings.default_period)
            .await;
        let unit = self
            .resolver
            .require_unit_context(actor.unit_id, actor.level_id)
            .await?;
        let program = self.resolver.require_program(program_id).await?;
        let modality = self
            .resolver
            .require_entry(CatalogKind::Modality, modality_id)
            .await?;
        let semester = self
            .resolver
            .require_entry(CatalogKind::Semester, semester_id)
            .await?;
        Ok(SemesterTarget {
            period,
            unit,
            program: program.name,
            modality: modality.label,
            semester: semester.label,
        })
    }

    async fn review_context(
        &self,
        actor: &Actor,
        period: Option<&str>,
    ) -> Result<(PeriodRef, String, String), CaptureError> {
        if !actor.role().can_review() {
            return Err(CaptureError::forbidden(REVIEW_ONLY));
        }
        let period = self
            .resolver
            .resolve_period(period, &self.settings.default_period)
            .await;
        let unit_code = self
            .resolver
            .repository()
            .find_unit_code(actor.unit_id)
            .await
            .map_err(|error| {
                warn!(%error, unit_id = actor.unit_id, "unit lookup failed");
                CaptureError::resolution("id_unidad_academica", UNIT_UNAVAILABLE)
            })?
            .filter(|code| !code.trim().is_empty())
            .ok_or_else(|| CaptureError::resolution("id_unidad_academica", UNIT_UNAVAILABLE))?;
        let reviewer = self.reviewer_name(actor).await;
        Ok((period, unit_code, reviewer))
    }

    async fn reviewer_name(&self, actor: &Actor) -> String {
        let name = actor.full_name();
        if !name.is_empty() {
            return name;
        }
        match self.resolver.repository().find_user_name(actor.user_id).await {
            Ok(Some(name)) => name,
            Ok(None) | Err(_) => actor.review_user(),
        }
    }

    async fn clear_reviews(&self, form: FormKind, period: &PeriodRef) -> Result<u64, CaptureError> {
        let cleared = self
            .validations
            .clear(period.id, form)
            .await
            .map_err(map_validation_error)?;
        if cleared > 0 {
            info!(%form, period = %period.literal, cleared, "stale reviewer decisions cleared");
        }
        Ok(cleared)
    }
}

fn require_capturist(actor: &Actor) -> Result<(), CaptureError> {
    if actor.role().can_capture() {
        Ok(())
    } else {
        Err(CaptureError::forbidden(CAPTURE_ONLY))
    }
}

fn row_matches(row: &Row, column: &str, expected: &str) -> bool {
    row.get(column)
        .and_then(Value::as_str)
        .is_some_and(|value| value.trim() == expected.trim())
}

fn consult_call(form: FormKind, actor: &Actor, unit: &UnitContext, period: &str) -> ProcedureCall {
    ProcedureCall::new(form.procedures().consult)
        .text("UUnidad_Academica", &unit.unit_code)
        .text("PPeriodo", period)
        .text("NNivel", &unit.level)
        .text("UUsuario", actor.procedure_user())
        .text("HHost", &actor.host)
}

fn unit_update_call(
    form: FormKind,
    actor: &Actor,
    unit: &UnitContext,
    period: &str,
    rooms: i64,
) -> ProcedureCall {
    let mut call = ProcedureCall::new(form.procedures().update_unit)
        .text("UUnidad_Academica", &unit.unit_code);
    if form.takes_room_count() {
        call = call.int("SSalones", rooms);
    }
    call.text("UUsuario", actor.procedure_user())
        .text("PPeriodo", period)
        .text("HHost", &actor.host)
        .text("NNivel", &unit.level)
}

fn semester_call(
    procedure: &'static str,
    form: FormKind,
    actor: &Actor,
    target: &SemesterTarget,
    rooms: i64,
) -> ProcedureCall {
    let mut call = ProcedureCall::new(procedure)
        .text("UUnidad_Academica", &target.unit.unit_code)
        .text("PPrograma", &target.program)
        .text("MModalidad", &target.modality)
        .text("SSemestre", &target.semester);
    if form.takes_room_count() {
        call = call.int("SSalones", rooms);
    }
    call.text("UUsuario", actor.procedure_user())
        .text("PPeriodo", &target.period.literal)
        .text("HHost", &actor.host)
        .text("NNivel", &target.unit.level)
}

fn review_call(procedure: &'static str, actor: &Actor, period: &PeriodRef, unit_code: &str) -> ProcedureCall {
    ProcedureCall::new(procedure)
        .text("PPeriodo", &period.literal)
        .text("UUnidad_Academica", unit_code)
        .text("UUsuario", actor.review_user())
        .text("HHost", &actor.host)
}

fn review_receipt(
    actor: &Actor,
    reviewer: String,
    period: PeriodRef,
    unit_code: String,
    reason: Option<String>,
) -> ReviewReceipt {
    ReviewReceipt {
        reviewer,
        login: actor.review_user(),
        user_id: actor.user_id,
        role_id: actor.role_id,
        at: Utc::now(),
        period: period.literal,
        unit_code,
        reason,
    }
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
