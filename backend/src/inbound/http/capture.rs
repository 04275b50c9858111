//! Capture endpoints shared by both forms.
//!
//! ```text
//! POST /{formato}/obtener_datos_existentes_sp
//! POST /{formato}/guardar_captura_completa
//! POST /{formato}/guardar_progreso
//! POST /{formato}/actualizar_matricula
//! POST /{formato}/limpiar_temp_matricula
//! POST /{formato}/preparar_turno
//! POST /{formato}/validar_captura_semestre
//! GET  /{formato}/semestres_map
//! GET  /{formato}/debug_sp
//! GET  /{formato}/diagnostico_sp
//! ```
//!
//! `{formato}` is `matricula` or `aprovechamiento`. Each scope carries its
//! [`FormKind`] as app data so the handlers stay form-agnostic.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, Scope, get, post, web};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info};

use crate::domain::{
    Actor, CaptureError, CatalogKind, CommitOutcome, ConsultView, Error, FormKind, StagedFigure,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::capture_dto::{
    CaptureBody, CommitBody, PeriodBody, ProgressRow, SemesterBody,
};
use crate::inbound::http::consulta::consulta;
use crate::inbound::http::error::{bare_failure_body, failure_body};
use crate::inbound::http::responses::{
    ClearResponse, CommitResponse, ConsultDebug, DebugResponse, DiagnosisResponse,
    ExistingDataResponse, NothingStagedResponse, ProgressResponse, SemesterDebug,
    SemesterResponse, ShiftResponse, StagedResponse,
};
use crate::inbound::http::review::{rechazar_semestre_rol, validar_semestre_rol};
use crate::inbound::http::state::HttpState;

/// Route scope for one form, e.g. `/matricula`.
pub fn form_scope(form: FormKind) -> Scope {
    web::scope(&format!("/{}", form.slug()))
        .app_data(web::Data::new(form))
        .service(consulta)
        .service(obtener_datos_existentes_sp)
        .service(guardar_captura_completa)
        .service(guardar_progreso)
        .service(actualizar_matricula)
        .service(limpiar_temp_matricula)
        .service(preparar_turno)
        .service(validar_captura_semestre)
        .service(validar_semestre_rol)
        .service(rechazar_semestre_rol)
        .service(semestres_map)
        .service(debug_sp)
        .service(diagnostico_sp)
}

/// Capitalised form name used in confirmations.
pub(crate) fn form_title(form: FormKind) -> &'static str {
    match form {
        FormKind::Enrollment => "Matrícula",
        FormKind::Performance => "Aprovechamiento",
    }
}

/// Confirmation with the participle agreeing with the form's noun,
/// e.g. `"Matrícula validada"` or `"Aprovechamiento validado"`.
pub(crate) fn form_done(form: FormKind, stem: &str) -> String {
    let ending = match form {
        FormKind::Enrollment => 'a',
        FormKind::Performance => 'o',
    };
    format!("{} {stem}{ending}", form_title(form))
}

/// Staging table name as the capture pages know it.
pub(crate) fn staging_table(form: FormKind) -> &'static str {
    match form {
        FormKind::Enrollment => "Temp_Matricula",
        FormKind::Performance => "Temp_Aprovechamiento",
    }
}

/// 200 with the legacy failure body, or 403 when the role lacks the
/// capability.
pub(crate) fn legacy_failure(context: &str, err: &CaptureError) -> HttpResponse {
    let body = failure_body(context, err);
    if matches!(err, CaptureError::Forbidden { .. }) {
        HttpResponse::Forbidden().json(body)
    } else {
        HttpResponse::Ok().json(body)
    }
}

fn bare_failure(context: &str, err: &CaptureError) -> HttpResponse {
    let body = bare_failure_body(context, err);
    if matches!(err, CaptureError::Forbidden { .. }) {
        HttpResponse::Forbidden().json(body)
    } else {
        HttpResponse::Ok().json(body)
    }
}

fn require_capture_role(actor: &Actor) -> Result<(), CaptureError> {
    if actor.role().can_capture() {
        Ok(())
    } else {
        Err(CaptureError::forbidden(
            "Solo el rol de captura puede modificar la información",
        ))
    }
}

/// `Id_Semestre` to label for every semester in the catalog.
pub(crate) async fn semester_labels(
    state: &HttpState,
) -> Result<BTreeMap<String, String>, CaptureError> {
    let entries = state
        .resolver()
        .repository()
        .list_entries(CatalogKind::Semester)
        .await
        .map_err(|err| CaptureError::persistence(format!("semester catalog unavailable: {err}")))?;
    Ok(entries
        .into_iter()
        .map(|entry| (entry.id.to_string(), entry.label))
        .collect())
}

fn consult_debug(form: FormKind, view: &ConsultView) -> ConsultDebug {
    ConsultDebug {
        procedimiento: form.procedures().consult.to_owned(),
        periodo: view.period.literal.clone(),
        unidad_academica: view.unit.unit_code.clone(),
        nivel: view.unit.level.clone(),
        total_filas: view.outcome.rows.len(),
        columnas: view.outcome.columns.clone(),
    }
}

/// Run the consult procedure and return rows plus metadata.
#[utoipa::path(
    post,
    path = "/{formato}/obtener_datos_existentes_sp",
    params(("formato" = FormKind, Path, description = "matricula or aprovechamiento")),
    request_body = PeriodBody,
    responses(
        (status = 200, description = "Rows and metadata, or `{error}`", body = ExistingDataResponse),
        (status = 403, description = "Role cannot consult")
    ),
    tags = ["capture"],
    operation_id = "obtenerDatosExistentes",
    security(("SessionCookie" = []))
)]
#[post("/obtener_datos_existentes_sp")]
pub async fn obtener_datos_existentes_sp(
    form: web::Data<FormKind>,
    state: web::Data<HttpState>,
    actor: Actor,
    payload: web::Json<PeriodBody>,
) -> HttpResponse {
    let form = **form;
    match state
        .workflow
        .consult(form, &actor, payload.periodo.as_deref())
        .await
    {
        Ok(view) => {
            let debug = consult_debug(form, &view);
            HttpResponse::Ok().json(ExistingDataResponse {
                rows: view.outcome.rows,
                metadata: view.metadata,
                debug,
            })
        }
        Err(err) => bare_failure("Error al obtener datos existentes", &err),
    }
}

/// Validate a shift's grid and merge it into staging.
///
/// An empty grid answers 200 with `{error}`; every other failure maps to
/// the error payload and its status.
#[utoipa::path(
    post,
    path = "/{formato}/guardar_captura_completa",
    params(("formato" = FormKind, Path, description = "matricula or aprovechamiento")),
    request_body = CaptureBody,
    responses(
        (status = 200, description = "Staging summary, or `{error}` for an empty grid", body = StagedResponse),
        (status = 400, description = "Missing or unknown catalog id", body = Error),
        (status = 403, description = "Role cannot capture", body = Error),
        (status = 500, description = "Internal server error", body = Error),
        (status = 503, description = "Staging unavailable", body = Error)
    ),
    tags = ["capture"],
    operation_id = "guardarCapturaCompleta",
    security(("SessionCookie" = []))
)]
#[post("/guardar_captura_completa")]
pub async fn guardar_captura_completa(
    form: web::Data<FormKind>,
    state: web::Data<HttpState>,
    actor: Actor,
    payload: web::Json<CaptureBody>,
) -> ApiResult<HttpResponse> {
    let form = **form;
    let payload = payload.into_inner();
    if payload.datos_matricula.is_empty() {
        return Ok(HttpResponse::Ok().json(json!({
            "error": format!(
                "No se encontraron datos de {} para guardar",
                form_title(form).to_lowercase()
            ),
        })));
    }
    let summary = state
        .staging
        .stage_submission(form, &actor, payload.into())
        .await
        .map_err(Error::from)?;
    Ok(HttpResponse::Ok().json(StagedResponse::from(summary)))
}

/// Merge rows that already carry literal names into staging.
#[utoipa::path(
    post,
    path = "/{formato}/guardar_progreso",
    params(("formato" = FormKind, Path, description = "matricula or aprovechamiento")),
    request_body = Vec<ProgressRow>,
    responses(
        (status = 200, description = "Rows merged", body = ProgressResponse),
        (status = 403, description = "Role cannot capture", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["capture"],
    operation_id = "guardarProgreso",
    security(("SessionCookie" = []))
)]
#[post("/guardar_progreso")]
pub async fn guardar_progreso(
    form: web::Data<FormKind>,
    state: web::Data<HttpState>,
    actor: Actor,
    payload: web::Json<Vec<ProgressRow>>,
) -> ApiResult<web::Json<ProgressResponse>> {
    let form = **form;
    require_capture_role(&actor).map_err(Error::from)?;
    let rows = payload.into_inner();
    let total = rows.len();
    let figures: Vec<StagedFigure> = rows
        .into_iter()
        .filter_map(|row| row.into_figure(form))
        .collect();
    let skipped = total - figures.len();
    let saved = state.staging.stage_rows(figures).await.map_err(|err| {
        error!(error = %err, %form, "progress save failed");
        Error::internal(format!("Error al guardar progreso: {err}"))
    })?;
    info!(%form, saved, skipped, "progress saved");
    Ok(web::Json(ProgressResponse {
        message: "Progreso guardado exitosamente.".to_owned(),
        registros_guardados: saved,
        registros_omitidos: skipped,
    }))
}

/// Move staged rows to the permanent table.
#[utoipa::path(
    post,
    path = "/{formato}/actualizar_matricula",
    params(("formato" = FormKind, Path, description = "matricula or aprovechamiento")),
    request_body = CommitBody,
    responses(
        (status = 200, description = "Rows committed, or a warning when nothing was staged", body = CommitResponse),
        (status = 400, description = "Unknown session unit", body = Error),
        (status = 403, description = "Role cannot capture", body = Error),
        (status = 500, description = "Procedure failed", body = Error),
        (status = 503, description = "Staging unavailable", body = Error)
    ),
    tags = ["capture"],
    operation_id = "actualizarMatricula",
    security(("SessionCookie" = []))
)]
#[post("/actualizar_matricula")]
pub async fn actualizar_matricula(
    form: web::Data<FormKind>,
    state: web::Data<HttpState>,
    actor: Actor,
    payload: web::Json<CommitBody>,
) -> ApiResult<HttpResponse> {
    let form = **form;
    let outcome = state
        .workflow
        .commit_staging(form, &actor, payload.periodo.as_deref(), payload.total_grupos)
        .await
        .map_err(Error::from)?;
    let response = match outcome {
        CommitOutcome::NothingStaged => HttpResponse::Ok().json(NothingStagedResponse {
            warning: format!("No hay datos en {} para actualizar", staging_table(form)),
            registros_temp: 0,
            registros_actualizados: 0,
        }),
        CommitOutcome::Committed(receipt) => HttpResponse::Ok().json(CommitResponse {
            mensaje: format!("{} exitosamente", form_done(form, "actualizad")),
            registros_procesados: receipt.processed,
            temp_matricula_limpiada: receipt.staging_cleared,
            usuario: receipt.user,
            periodo: receipt.period,
            validaciones_reiniciadas: receipt.validations_cleared,
            timestamp: Utc::now().to_rfc3339(),
        }),
    };
    Ok(response)
}

/// Empty the form's staging table.
#[utoipa::path(
    post,
    path = "/{formato}/limpiar_temp_matricula",
    params(("formato" = FormKind, Path, description = "matricula or aprovechamiento")),
    responses(
        (status = 200, description = "Rows removed, or `{error}`", body = ClearResponse),
        (status = 403, description = "Role cannot capture")
    ),
    tags = ["capture"],
    operation_id = "limpiarTemp",
    security(("SessionCookie" = []))
)]
#[post("/limpiar_temp_matricula")]
pub async fn limpiar_temp_matricula(
    form: web::Data<FormKind>,
    state: web::Data<HttpState>,
    actor: Actor,
) -> HttpResponse {
    let form = **form;
    let table = staging_table(form);
    let context = format!("Error al limpiar {table}");
    if let Err(err) = require_capture_role(&actor) {
        return bare_failure(&context, &err);
    }
    match state.staging.clear(form).await {
        Ok(removed) => HttpResponse::Ok().json(ClearResponse {
            mensaje: format!("Tabla {table} limpiada exitosamente"),
            registros_eliminados: removed,
        }),
        Err(err) => bare_failure(&context, &err),
    }
}

/// Validate one shift of a semester.
#[utoipa::path(
    post,
    path = "/{formato}/preparar_turno",
    params(("formato" = FormKind, Path, description = "matricula or aprovechamiento")),
    request_body = SemesterBody,
    responses(
        (status = 200, description = "Shift validated, or `{error, success: false}`", body = ShiftResponse),
        (status = 403, description = "Role cannot capture")
    ),
    tags = ["capture"],
    operation_id = "prepararTurno",
    security(("SessionCookie" = []))
)]
#[post("/preparar_turno")]
pub async fn preparar_turno(
    form: web::Data<FormKind>,
    state: web::Data<HttpState>,
    actor: Actor,
    payload: web::Json<SemesterBody>,
) -> HttpResponse {
    let form = **form;
    match state
        .workflow
        .prepare_shift(form, &actor, payload.into_inner().into())
        .await
    {
        Ok(validation) => HttpResponse::Ok().json(ShiftResponse {
            success: true,
            mensaje: format!(
                "Turno {} del {} validado exitosamente",
                validation.shift, validation.semester
            ),
            turno_validado: validation.shift,
            semestre: validation.semester,
            fase: "turno_individual".to_owned(),
            sp_ejecutado: validation.procedure.to_owned(),
            rows: validation.rows,
            registros_temp: validation.staged,
            nota: "El turno está bloqueado. El SP final se ejecutará cuando todos los turnos estén completos".to_owned(),
        }),
        Err(err) => legacy_failure("Error al validar el turno", &err),
    }
}

/// Consolidate a semester and finalize the capture when complete.
#[utoipa::path(
    post,
    path = "/{formato}/validar_captura_semestre",
    params(("formato" = FormKind, Path, description = "matricula or aprovechamiento")),
    request_body = SemesterBody,
    responses(
        (status = 200, description = "Semester consolidated, or `{error, success: false}`", body = SemesterResponse),
        (status = 403, description = "Role cannot capture")
    ),
    tags = ["capture"],
    operation_id = "validarCapturaSemestre",
    security(("SessionCookie" = []))
)]
#[post("/validar_captura_semestre")]
pub async fn validar_captura_semestre(
    form: web::Data<FormKind>,
    state: web::Data<HttpState>,
    actor: Actor,
    payload: web::Json<SemesterBody>,
) -> HttpResponse {
    let form = **form;
    let consolidation = match state
        .workflow
        .consolidate_semester(form, &actor, payload.into_inner().into())
        .await
    {
        Ok(consolidation) => consolidation,
        Err(err) => return legacy_failure("Error al validar la captura del semestre", &err),
    };
    let (mensaje, fase) = if consolidation.finalized {
        (
            format!(
                "Semestre {} consolidado. ¡TODA LA CAPTURA FINALIZADA!",
                consolidation.semester
            ),
            "sp_final_consolidado",
        )
    } else {
        (
            format!(
                "Semestre {} consolidado (aún faltan semestres por completar)",
                consolidation.semester
            ),
            "sp_semestre_actualizado",
        )
    };
    HttpResponse::Ok().json(SemesterResponse {
        success: true,
        mensaje,
        estado_semaforo: consolidation.semester_status.map(|status| status.value()),
        sp_final_ejecutado: consolidation.finalized,
        fase: fase.to_owned(),
        decision: serde_json::to_value(&consolidation.decision).unwrap_or_default(),
        debug: SemesterDebug {
            sp_ejecutados: consolidation
                .procedures
                .iter()
                .map(|name| (*name).to_owned())
                .collect(),
            parametros: consolidation.params,
        },
        semestre_validado: consolidation.semester,
    })
}

/// `Id_Semestre` to label.
#[utoipa::path(
    get,
    path = "/{formato}/semestres_map",
    params(("formato" = FormKind, Path, description = "matricula or aprovechamiento")),
    responses((status = 200, description = "Semester labels by id, or `{error}`", body = BTreeMap<String, String>)),
    tags = ["capture"],
    operation_id = "semestresMap"
)]
#[get("/semestres_map")]
pub async fn semestres_map(state: web::Data<HttpState>) -> HttpResponse {
    match semester_labels(&state).await {
        Ok(labels) => HttpResponse::Ok().json(labels),
        Err(err) => HttpResponse::Ok().json(bare_failure_body("Error al obtener semestres", &err)),
    }
}

/// Consult with the default period and summarise the result.
#[utoipa::path(
    get,
    path = "/{formato}/debug_sp",
    params(("formato" = FormKind, Path, description = "matricula or aprovechamiento")),
    responses(
        (status = 200, description = "Consult summary, or `{error}`", body = DebugResponse),
        (status = 403, description = "Role cannot consult")
    ),
    tags = ["capture"],
    operation_id = "debugSp",
    security(("SessionCookie" = []))
)]
#[get("/debug_sp")]
pub async fn debug_sp(
    form: web::Data<FormKind>,
    state: web::Data<HttpState>,
    actor: Actor,
) -> HttpResponse {
    match state.workflow.consult(**form, &actor, None).await {
        Ok(view) => HttpResponse::Ok().json(DebugResponse {
            mensaje: "Debug SP ejecutado".to_owned(),
            total_filas: view.outcome.rows.len(),
            columnas: view.outcome.columns,
            primera_fila: view.outcome.rows.into_iter().next(),
            metadata: view.metadata,
        }),
        Err(err) => bare_failure("Error en debug", &err),
    }
}

/// Report which catalog joins each staged row would miss during
/// consolidation. Reads only.
#[utoipa::path(
    get,
    path = "/{formato}/diagnostico_sp",
    params(("formato" = FormKind, Path, description = "matricula or aprovechamiento")),
    responses(
        (status = 200, description = "Per-row join outcomes, or `{error}` when staging is empty", body = DiagnosisResponse),
        (status = 403, description = "Role cannot capture")
    ),
    tags = ["capture"],
    operation_id = "diagnosticoSp",
    security(("SessionCookie" = []))
)]
#[get("/diagnostico_sp")]
pub async fn diagnostico_sp(
    form: web::Data<FormKind>,
    state: web::Data<HttpState>,
    actor: Actor,
) -> HttpResponse {
    let form = **form;
    match state.staging.diagnose(form, &actor).await {
        Ok(diagnosis) if diagnosis.records.is_empty() => HttpResponse::Ok().json(json!({
            "error": format!("No hay datos en {} para diagnosticar", staging_table(form)),
        })),
        Ok(diagnosis) => HttpResponse::Ok().json(DiagnosisResponse::from(diagnosis)),
        Err(err) => bare_failure("Error en diagnóstico", &err),
    }
}

#[cfg(test)]
#[path = "capture_tests.rs"]
mod tests;
