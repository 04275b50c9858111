//! Tests for the workflow service.

use std::sync::Arc;

use rstest::{fixture, rstest};

use super::*;
use crate::domain::fakes::{BoardExecutor, InMemoryStaging, InMemoryValidations, StatusBoard};
use crate::domain::ports::{
    FixtureCatalogRepository, FixtureWorkflowLock, MockWorkflowLock, StagingRepository,
    WorkflowLockError,
};
use crate::domain::{Dimension, PeriodRef, StagedFigure, StagingKey};

const SEMESTER_PROC: &str = "SP_Actualiza_Matricula_Por_Semestre_AU";
const FINALIZE_PROC: &str = "SP_Finaliza_Captura_Matricula";
const UNIT_PROC: &str = "SP_Actualiza_Matricula_Por_Unidad_Academica";

struct Harness {
    service: WorkflowService,
    board: Arc<StatusBoard>,
    executor: Arc<BoardExecutor>,
    staging: Arc<InMemoryStaging>,
    validations: Arc<InMemoryValidations>,
}

fn harness_with(board: Arc<StatusBoard>, lock: Arc<dyn WorkflowLock>) -> Harness {
    let executor = Arc::new(BoardExecutor::new(board.clone()));
    let staging = Arc::new(InMemoryStaging::default());
    let validations = Arc::new(InMemoryValidations::default());
    let service = WorkflowService::new(
        WorkflowPorts {
            catalog: Arc::new(FixtureCatalogRepository),
            executor: executor.clone(),
            staging: staging.clone(),
            unit_status: board.clone(),
            validations: validations.clone(),
            lock,
        },
        PortalSettings::new(PeriodRef::new(7, "2025-2026/1")),
    );
    Harness {
        service,
        board,
        executor,
        staging,
        validations,
    }
}

fn harness(board: Arc<StatusBoard>) -> Harness {
    harness_with(board, Arc::new(FixtureWorkflowLock))
}

fn actor(role_id: i32, user_id: i32) -> Actor {
    Actor {
        user_id,
        role_id,
        login: format!("user{user_id}"),
        given_name: "Ana".into(),
        paternal_name: "López".into(),
        unit_id: 1,
        level_id: 1,
        host: "10.0.0.5".into(),
        ..Actor::default()
    }
}

#[fixture]
fn capturist() -> Actor {
    actor(3, 42)
}

fn semester_request(semester_id: i32) -> SemesterRequest {
    SemesterRequest {
        period: Some("7".into()),
        program_id: Some(10),
        modality_id: Some(1),
        semester_id: Some(semester_id),
        total_groups: 4,
    }
}

fn staged_key() -> StagingKey {
    StagingKey {
        period: "2025-2026/1".into(),
        unit_code: "ESCOM".into(),
        program: "Ingeniería en Sistemas Computacionales".into(),
        branch: "NULL".into(),
        level: "Superior".into(),
        modality: "Escolarizada".into(),
        shift: "Matutino".into(),
        semester: "Primer Semestre".into(),
        dimension: Dimension::Enrollment {
            age_group: "18 a 20".into(),
            admission_type: "Nuevo Ingreso".into(),
            sex: "Hombre".into(),
        },
    }
}

#[rstest]
#[tokio::test]
async fn finalize_waits_for_every_semester_then_fires_once(capturist: Actor) {
    let board = StatusBoard::new(
        Some(2),
        &[
            ("Primer Semestre", 3),
            ("Segundo Semestre", 3),
            ("Tercer Semestre", 2),
        ],
    );
    let h = harness(board);

    // Consolidating an already complete semester leaves the third open.
    let first = h
        .service
        .consolidate_semester(FormKind::Enrollment, &capturist, semester_request(1))
        .await
        .expect("consolidation succeeds");
    assert!(!first.finalized);
    assert_eq!(
        first.decision,
        FinalizeDecision::SemestersPending {
            pending: vec!["Tercer Semestre".to_owned()]
        }
    );
    assert_eq!(h.executor.calls_to(FINALIZE_PROC), 0);

    h.board.set_semester("Tercer Semestre", 3);
    let second = h
        .service
        .consolidate_semester(FormKind::Enrollment, &capturist, semester_request(2))
        .await
        .expect("consolidation succeeds");
    assert!(second.finalized);

    let third = h
        .service
        .consolidate_semester(FormKind::Enrollment, &capturist, semester_request(1))
        .await
        .expect("consolidation succeeds");
    assert_eq!(third.decision, FinalizeDecision::AlreadyFinalized);
    assert_eq!(h.executor.calls_to(FINALIZE_PROC), 1);
}

#[rstest]
#[tokio::test]
async fn completing_the_last_semester_finalizes_exactly_once(capturist: Actor) {
    let board = StatusBoard::new(Some(2), &[("Primer Semestre", 3), ("Segundo Semestre", 2)]);
    let h = harness(board);

    let done = h
        .service
        .consolidate_semester(FormKind::Enrollment, &capturist, semester_request(2))
        .await
        .expect("consolidation succeeds");
    assert!(done.finalized);
    assert_eq!(done.procedures, vec![SEMESTER_PROC, FINALIZE_PROC]);
    assert_eq!(done.semester_status, Some(Semaforo::Completed));
    assert_eq!(h.board.unit(), Some(3));

    let again = h
        .service
        .consolidate_semester(FormKind::Enrollment, &capturist, semester_request(2))
        .await
        .expect("repeat consolidation succeeds");
    assert!(!again.finalized);
    assert_eq!(again.decision, FinalizeDecision::AlreadyFinalized);
    assert_eq!(h.executor.calls_to(FINALIZE_PROC), 1);
}

#[rstest]
#[tokio::test]
async fn semester_call_carries_literal_names(capturist: Actor) {
    let h = harness(StatusBoard::new(Some(2), &[("Primer Semestre", 2)]));
    let result = h
        .service
        .consolidate_semester(FormKind::Enrollment, &capturist, semester_request(1))
        .await
        .expect("consolidation succeeds");
    assert_eq!(result.params["PPrograma"], "Ingeniería en Sistemas Computacionales");
    assert_eq!(result.params["SSemestre"], "Primer Semestre");
    assert_eq!(result.params["SSalones"], 4);
    assert_eq!(result.params["UUsuario"], "Ana López");
    assert_eq!(result.params["PPeriodo"], "2025-2026/1");
    assert_eq!(result.params["NNivel"], "Superior");
}

#[rstest]
#[tokio::test]
async fn unexpected_unit_status_skips_finalize(capturist: Actor) {
    let h = harness(StatusBoard::new(None, &[("Primer Semestre", 2)]));
    let result = h
        .service
        .consolidate_semester(FormKind::Enrollment, &capturist, semester_request(1))
        .await
        .expect("consolidation succeeds");
    assert_eq!(
        result.decision,
        FinalizeDecision::UnexpectedUnitStatus { status: None }
    );
    assert_eq!(h.executor.calls_to(FINALIZE_PROC), 0);
}

#[rstest]
#[tokio::test]
async fn missing_semester_fields_fail_before_any_call(capturist: Actor) {
    let h = harness(StatusBoard::new(Some(2), &[]));
    let request = SemesterRequest {
        period: Some(" ".into()),
        modality_id: None,
        ..semester_request(1)
    };
    let error = h
        .service
        .consolidate_semester(FormKind::Enrollment, &capturist, request)
        .await
        .expect_err("missing fields");
    assert_eq!(
        error,
        CaptureError::missing(vec!["periodo", "modalidad"], "Faltan parámetros obligatorios")
    );
    assert!(h.executor.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn failed_semester_call_stops_the_transition(capturist: Actor) {
    let h = harness(StatusBoard::new(Some(2), &[("Primer Semestre", 2)]));
    h.executor.fail_on(SEMESTER_PROC);
    let error = h
        .service
        .consolidate_semester(FormKind::Enrollment, &capturist, semester_request(1))
        .await
        .expect_err("procedure failure");
    assert!(matches!(error, CaptureError::ProcedureExecution { .. }));
    assert_eq!(h.executor.calls_to(FINALIZE_PROC), 0);
}

#[rstest]
#[tokio::test]
async fn lock_failure_prevents_finalize(capturist: Actor) {
    let mut lock = MockWorkflowLock::new();
    lock.expect_acquire()
        .withf(|key| key.starts_with("2025-2026/1|ESCOM|matricula"))
        .times(1)
        .return_once(|_| Err(WorkflowLockError::connection("pool exhausted")));
    let h = harness_with(
        StatusBoard::new(Some(2), &[("Primer Semestre", 2)]),
        Arc::new(lock),
    );
    let error = h
        .service
        .consolidate_semester(FormKind::Enrollment, &capturist, semester_request(1))
        .await
        .expect_err("lock failure");
    assert!(matches!(error, CaptureError::Persistence { .. }));
    assert_eq!(h.executor.calls_to(FINALIZE_PROC), 0);
}

#[rstest]
#[tokio::test]
async fn rejection_clears_other_reviewers_approvals() {
    let h = harness(StatusBoard::new(Some(3), &[]));
    let reviewer_a = actor(4, 100);
    let reviewer_b = actor(5, 200);

    h.service
        .approve(FormKind::Enrollment, &reviewer_a, Some("7"))
        .await
        .expect("approval succeeds");
    assert_eq!(
        h.service
            .review_state(FormKind::Enrollment, 7, 100)
            .await
            .expect("state"),
        ReviewState::Validated
    );

    let receipt = h
        .service
        .reject(FormKind::Enrollment, &reviewer_b, Some("7"), "  Cifras incompletas ")
        .await
        .expect("rejection succeeds");
    assert_eq!(receipt.reason.as_deref(), Some("Cifras incompletas"));

    assert_eq!(
        h.service
            .review_state(FormKind::Enrollment, 7, 100)
            .await
            .expect("state"),
        ReviewState::NotReviewed
    );
    assert_eq!(
        h.service
            .review_state(FormKind::Enrollment, 7, 200)
            .await
            .expect("state"),
        ReviewState::Rejected
    );
}

#[rstest]
#[tokio::test]
async fn approval_passes_terminal_light_and_note() {
    let h = harness(StatusBoard::new(Some(3), &[]));
    let receipt = h
        .service
        .approve(FormKind::Enrollment, &actor(6, 100), None)
        .await
        .expect("approval succeeds");
    assert_eq!(receipt.reviewer, "Ana López");
    assert_eq!(receipt.login, "user100");
    assert_eq!(receipt.unit_code, "ESCOM");

    let calls = h.executor.calls();
    let call = calls.first().expect("validate call");
    assert_eq!(call.procedure(), "SP_Valida_Matricula");
    let params = call.params_json();
    assert_eq!(params["semaforo"], 3);
    assert_eq!(params["NNota"], "Validado por Ana López");
    assert_eq!(params["UUsuario"], "user100");
}

#[rstest]
#[case(3)]
#[case(1)]
#[case(0)]
#[tokio::test]
async fn only_reviewers_may_approve(#[case] role_id: i32) {
    let h = harness(StatusBoard::new(Some(3), &[]));
    let error = h
        .service
        .approve(FormKind::Enrollment, &actor(role_id, 1), None)
        .await
        .expect_err("forbidden");
    assert_eq!(
        error,
        CaptureError::forbidden("Solo los roles de validación pueden usar esta función")
    );
    assert!(h.executor.calls().is_empty());
}

#[tokio::test]
async fn blank_rejection_reason_is_rejected() {
    let h = harness(StatusBoard::new(Some(3), &[]));
    let error = h
        .service
        .reject(FormKind::Performance, &actor(4, 1), None, "   ")
        .await
        .expect_err("reason required");
    assert!(matches!(error, CaptureError::MissingParameter { ref fields, .. } if fields == &vec!["motivo"]));
}

#[tokio::test]
async fn unknown_unit_blocks_review() {
    let h = harness(StatusBoard::new(Some(3), &[]));
    let reviewer = Actor {
        unit_id: 99,
        ..actor(4, 1)
    };
    let error = h
        .service
        .approve(FormKind::Enrollment, &reviewer, None)
        .await
        .expect_err("unit required");
    assert_eq!(error.to_string(), "No se pudo obtener la Unidad Académica");
}

#[rstest]
#[tokio::test]
async fn capturist_edits_clear_stale_reviews(capturist: Actor) {
    let h = harness(StatusBoard::new(Some(2), &[("Primer Semestre", 2)]));
    h.service
        .reject(FormKind::Enrollment, &actor(4, 100), Some("7"), "Revisar")
        .await
        .expect("rejection succeeds");
    assert_eq!(h.validations.all().len(), 1);

    h.service
        .prepare_shift(
            FormKind::Enrollment,
            &capturist,
            ShiftRequest {
                period: Some("7".into()),
                program_id: Some(10),
                modality_id: Some(1),
                semester_id: Some(1),
                shift_id: Some(1),
            },
        )
        .await
        .expect("shift validated");
    assert!(h.validations.all().is_empty());
}

fn shift_request() -> ShiftRequest {
    ShiftRequest {
        period: Some("2025-2026/1".into()),
        program_id: Some(10),
        modality_id: Some(1),
        semester_id: Some(1),
        shift_id: Some(2),
    }
}

#[rstest]
#[tokio::test]
async fn shift_validation_runs_unit_update_with_zero_rooms_even_when_nothing_is_staged(
    capturist: Actor,
) {
    let h = harness(StatusBoard::new(Some(2), &[]));

    let idle = h
        .service
        .prepare_shift(FormKind::Enrollment, &capturist, shift_request())
        .await
        .expect("shift validated");

    assert_eq!(idle.procedure, UNIT_PROC);
    assert_eq!(idle.staged, 0);
    assert_eq!(idle.shift, "Vespertino");
    assert_eq!(h.executor.calls_to(UNIT_PROC), 1);
    let calls = h.executor.calls();
    let call = calls.last().expect("unit call");
    assert_eq!(call.params_json()["SSalones"], 0);
}

#[rstest]
#[tokio::test]
async fn shift_validation_never_truncates_staging(capturist: Actor) {
    let h = harness(StatusBoard::new(Some(2), &[]));
    h.staging
        .upsert_batch(&[StagedFigure {
            key: staged_key(),
            count: 12,
            rooms: Some(2),
        }])
        .await
        .expect("staged");

    let active = h
        .service
        .prepare_shift(FormKind::Enrollment, &capturist, shift_request())
        .await
        .expect("shift validated");

    assert_eq!(active.staged, 1);
    assert_eq!(h.executor.calls()[0].params_json()["SSalones"], 0);
    assert_eq!(h.staging.all().len(), 1);
}

#[rstest]
#[tokio::test]
async fn review_clearing_failure_stops_every_capture_procedure(capturist: Actor) {
    let h = harness(StatusBoard::new(Some(2), &[("Primer Semestre", 2)]));
    h.staging
        .upsert_batch(&[StagedFigure {
            key: staged_key(),
            count: 5,
            rooms: Some(1),
        }])
        .await
        .expect("staged");
    h.validations.fail_clear();

    let commit = h
        .service
        .commit_staging(FormKind::Enrollment, &capturist, None, 2)
        .await
        .expect_err("clear fails");
    let shift = h
        .service
        .prepare_shift(FormKind::Enrollment, &capturist, shift_request())
        .await
        .expect_err("clear fails");
    let semester = h
        .service
        .consolidate_semester(FormKind::Enrollment, &capturist, semester_request(1))
        .await
        .expect_err("clear fails");

    for error in [commit, shift, semester] {
        assert!(matches!(error, CaptureError::Persistence { .. }), "{error:?}");
    }
    assert!(h.executor.calls().is_empty());
    assert_eq!(h.staging.all().len(), 1);
}

#[rstest]
#[tokio::test]
async fn commit_skips_empty_staging(capturist: Actor) {
    let h = harness(StatusBoard::new(Some(2), &[]));
    let outcome = h
        .service
        .commit_staging(FormKind::Enrollment, &capturist, None, 3)
        .await
        .expect("commit succeeds");
    assert_eq!(outcome, CommitOutcome::NothingStaged);
    assert!(h.executor.calls().is_empty());
}

#[rstest]
#[tokio::test]
async fn commit_truncates_after_the_procedure(capturist: Actor) {
    let h = harness(StatusBoard::new(Some(2), &[]));
    h.staging
        .upsert_batch(&[StagedFigure {
            key: staged_key(),
            count: 0,
            rooms: Some(1),
        }])
        .await
        .expect("staged");

    let outcome = h
        .service
        .commit_staging(FormKind::Enrollment, &capturist, Some("7"), 3)
        .await
        .expect("commit succeeds");
    let CommitOutcome::Committed(receipt) = outcome else {
        panic!("expected a commit");
    };
    assert_eq!(receipt.processed, 1);
    assert!(receipt.staging_cleared);
    assert_eq!(receipt.user, "Ana López");
    assert!(h.staging.all().is_empty());
    assert_eq!(h.executor.calls()[0].params_json()["SSalones"], 3);
}

#[rstest]
#[tokio::test]
async fn failed_commit_keeps_staged_rows(capturist: Actor) {
    let h = harness(StatusBoard::new(Some(2), &[]));
    h.staging
        .upsert_batch(&[StagedFigure {
            key: staged_key(),
            count: 5,
            rooms: Some(1),
        }])
        .await
        .expect("staged");
    h.executor.fail_on(UNIT_PROC);

    let error = h
        .service
        .commit_staging(FormKind::Enrollment, &capturist, None, 0)
        .await
        .expect_err("procedure failure");
    assert!(matches!(error, CaptureError::ProcedureExecution { .. }));
    assert_eq!(h.staging.all().len(), 1);
}

#[rstest]
#[tokio::test]
async fn consult_blanks_nulls_and_extracts_metadata(capturist: Actor) {
    let h = harness(StatusBoard::new(
        Some(2),
        &[("Segundo Semestre", 2), ("Primer Semestre", 3)],
    ));
    let view = h
        .service
        .consult(FormKind::Enrollment, &capturist, Some("9999"))
        .await
        .expect("consult succeeds");
    assert_eq!(view.period.literal, "2025-2026/1");
    assert_eq!(
        view.metadata["semestres"],
        vec!["Primer Semestre", "Segundo Semestre"]
    );
    assert!(view.metadata["turnos"].is_empty());
}

#[tokio::test]
async fn consult_denies_roles_without_capability() {
    let h = harness(StatusBoard::new(Some(2), &[]));
    let error = h
        .service
        .consult(FormKind::Enrollment, &actor(1, 1), None)
        .await
        .expect_err("denied");
    assert!(matches!(error, CaptureError::Forbidden { .. }));
}

#[tokio::test]
async fn rejection_notice_names_the_reviewer() {
    let h = harness(StatusBoard::new(Some(2), &[]));
    h.service
        .reject(FormKind::Enrollment, &actor(4, 42), Some("7"), "Faltan turnos")
        .await
        .expect("rejection succeeds");
    let notice = h
        .service
        .rejection_notice(FormKind::Enrollment, 7, None)
        .await
        .expect("lookup")
        .expect("notice present");
    assert_eq!(notice.motivo, "Faltan turnos");
    assert_eq!(notice.rechazado_por, "Ana López Pérez");
    assert!(
        h.service
            .rejection_notice(FormKind::Performance, 7, None)
            .await
            .expect("lookup")
            .is_none()
    );
}
