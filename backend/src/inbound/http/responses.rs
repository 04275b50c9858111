//! Success payloads of the capture endpoints.
//!
//! Field names follow the JSON the capture pages already consume, so they
//! stay in Spanish and snake case.

use std::collections::BTreeMap;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{
    CatalogEntry, FormKind, JoinMatch, ProgramInfo, RejectionNotice, ReviewReceipt, Row,
    StagedFigure, StagingDiagnosis, StagingSummary, StatusLight,
};

/// Context of a consult call echoed for troubleshooting.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConsultDebug {
    /// Procedure that produced the rows.
    pub procedimiento: String,
    /// Period literal consulted.
    pub periodo: String,
    /// Unit `Sigla`.
    pub unidad_academica: String,
    /// Level name.
    pub nivel: String,
    /// Number of rows returned.
    pub total_filas: usize,
    /// Declared columns.
    pub columnas: Vec<String>,
}

/// `POST /obtener_datos_existentes_sp`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExistingDataResponse {
    /// Normalised consult rows.
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Row>,
    /// Unique values per metadata key.
    pub metadata: BTreeMap<String, Vec<String>>,
    /// Call context.
    pub debug: ConsultDebug,
}

/// `GET /debug_sp`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DebugResponse {
    /// Fixed banner.
    pub mensaje: String,
    /// Number of rows returned.
    pub total_filas: usize,
    /// Declared columns.
    pub columnas: Vec<String>,
    /// First row, when any.
    #[schema(value_type = Option<Object>)]
    pub primera_fila: Option<Row>,
    /// Unique values per metadata key.
    pub metadata: BTreeMap<String, Vec<String>>,
}

/// `POST /guardar_captura_completa`.
#[derive(Debug, Serialize, ToSchema)]
pub struct StagedResponse {
    /// Summary message.
    pub mensaje: String,
    /// Rows merged into staging.
    pub registros_insertados: usize,
    /// Rows excluded by the admission rule.
    pub registros_rechazados: usize,
    /// Rows ignored for an invalid count.
    pub registros_omitidos: usize,
    /// Whether the admission rule ran.
    pub validacion_aplicada: bool,
}

impl From<StagingSummary> for StagedResponse {
    fn from(summary: StagingSummary) -> Self {
        Self {
            mensaje: summary.message(),
            registros_insertados: summary.inserted,
            registros_rechazados: summary.rejected,
            registros_omitidos: summary.skipped,
            validacion_aplicada: summary.validation_applied,
        }
    }
}

/// One staged row of `GET /diagnostico_sp`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DiagnosisRecord {
    /// One-based position in the staging table.
    pub registro: usize,
    /// Staged literals and counts.
    #[schema(value_type = Object)]
    pub temp_data: StagedFigure,
    /// Matched catalog rows keyed by table.
    #[schema(value_type = Object)]
    pub joins_encontrados: BTreeMap<&'static str, JoinMatch>,
    /// Catalog tables the row misses.
    pub joins_faltantes: Vec<String>,
}

/// Totals of `GET /diagnostico_sp`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DiagnosisSummary {
    /// Rows that match every catalog join.
    pub registros_con_todos_joins: usize,
}

/// `GET /diagnostico_sp`.
#[derive(Debug, Serialize, ToSchema)]
pub struct DiagnosisResponse {
    /// Rows in the staging table.
    pub total_temp_records: usize,
    /// Per-row join outcomes.
    pub diagnostico_por_registro: Vec<DiagnosisRecord>,
    /// Totals.
    pub resumen: DiagnosisSummary,
}

impl From<StagingDiagnosis> for DiagnosisResponse {
    fn from(diagnosis: StagingDiagnosis) -> Self {
        let total_temp_records = diagnosis.total();
        let resumen = DiagnosisSummary {
            registros_con_todos_joins: diagnosis.fully_joined(),
        };
        let diagnostico_por_registro = diagnosis
            .records
            .into_iter()
            .map(|record| DiagnosisRecord {
                registro: record.position,
                temp_data: record.figure,
                joins_encontrados: record.found,
                joins_faltantes: record.missing.into_iter().map(str::to_owned).collect(),
            })
            .collect();
        Self {
            total_temp_records,
            diagnostico_por_registro,
            resumen,
        }
    }
}

/// `POST /guardar_progreso`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ProgressResponse {
    /// Fixed confirmation.
    pub message: String,
    /// Rows merged into staging.
    pub registros_guardados: usize,
    /// Rows dropped for missing key columns or counts.
    pub registros_omitidos: usize,
}

/// `POST /actualizar_matricula` when rows were committed.
#[derive(Debug, Serialize, ToSchema)]
pub struct CommitResponse {
    /// Confirmation.
    pub mensaje: String,
    /// Staged rows processed.
    pub registros_procesados: u64,
    /// Whether staging is empty afterwards.
    pub temp_matricula_limpiada: bool,
    /// `@UUsuario` used.
    pub usuario: String,
    /// Period literal.
    pub periodo: String,
    /// Reviewer decisions cleared by the commit.
    pub validaciones_reiniciadas: u64,
    /// RFC 3339 completion time.
    pub timestamp: String,
}

/// `POST /actualizar_matricula` with nothing staged.
#[derive(Debug, Serialize, ToSchema)]
pub struct NothingStagedResponse {
    /// Why nothing ran.
    pub warning: String,
    /// Always zero.
    pub registros_temp: u64,
    /// Always zero.
    pub registros_actualizados: u64,
}

/// `POST /limpiar_temp_matricula`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ClearResponse {
    /// Confirmation.
    pub mensaje: String,
    /// Rows removed.
    pub registros_eliminados: u64,
}

/// `POST /preparar_turno`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ShiftResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation.
    pub mensaje: String,
    /// Shift label.
    pub turno_validado: String,
    /// Semester label.
    pub semestre: String,
    /// Always `turno_individual`.
    pub fase: String,
    /// Procedure run.
    pub sp_ejecutado: String,
    /// Procedure rows.
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Row>,
    /// Staged rows seen for the unit.
    pub registros_temp: u64,
    /// Reminder that finalize waits for every shift.
    pub nota: String,
}

/// Procedures and parameters of a semester consolidation.
#[derive(Debug, Serialize, ToSchema)]
pub struct SemesterDebug {
    /// Procedures in execution order.
    pub sp_ejecutados: Vec<String>,
    /// Parameters sent to the semester procedure.
    #[schema(value_type = Object)]
    pub parametros: serde_json::Value,
}

/// `POST /validar_captura_semestre`.
#[derive(Debug, Serialize, ToSchema)]
pub struct SemesterResponse {
    /// Always `true`.
    pub success: bool,
    /// Confirmation, mentioning whether the whole capture finished.
    pub mensaje: String,
    /// Semester label.
    pub semestre_validado: String,
    /// Light of the semester after the calls (1 to 3).
    pub estado_semaforo: Option<i32>,
    /// Whether finalize ran.
    pub sp_final_ejecutado: bool,
    /// `sp_final_consolidado` or `sp_semestre_actualizado`.
    pub fase: String,
    /// Finalize check outcome.
    #[schema(value_type = Object)]
    pub decision: serde_json::Value,
    /// Call details.
    pub debug: SemesterDebug,
}

/// Reviewer and scope of an approval.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApprovalData {
    /// Reviewer display name.
    pub validado_por: String,
    /// Login passed to the procedure.
    pub usuario_login: String,
    /// Reviewer id.
    pub id_usuario: i32,
    /// Reviewer role id.
    pub id_rol: i32,
    /// `%Y-%m-%d %H:%M:%S`.
    pub fecha_validacion: String,
    /// Period literal.
    pub periodo: String,
    /// Unit `Sigla`.
    pub unidad_academica: String,
}

/// Reviewer, reason and scope of a rejection.
#[derive(Debug, Serialize, ToSchema)]
pub struct RejectionData {
    /// Reviewer display name.
    pub rechazado_por: String,
    /// Login passed to the procedure.
    pub usuario_login: String,
    /// Reviewer id.
    pub id_usuario: i32,
    /// Reviewer role id.
    pub id_rol: i32,
    /// Rejection reason.
    pub motivo: String,
    /// `%Y-%m-%d %H:%M:%S`.
    pub fecha_rechazo: String,
    /// Period literal.
    pub periodo: String,
    /// Unit `Sigla`.
    pub unidad_academica: String,
}

const REVIEW_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

impl From<ReviewReceipt> for ApprovalData {
    fn from(receipt: ReviewReceipt) -> Self {
        Self {
            validado_por: receipt.reviewer,
            usuario_login: receipt.login,
            id_usuario: receipt.user_id,
            id_rol: receipt.role_id,
            fecha_validacion: receipt.at.format(REVIEW_TIME_FORMAT).to_string(),
            periodo: receipt.period,
            unidad_academica: receipt.unit_code,
        }
    }
}

impl From<ReviewReceipt> for RejectionData {
    fn from(receipt: ReviewReceipt) -> Self {
        Self {
            rechazado_por: receipt.reviewer,
            usuario_login: receipt.login,
            id_usuario: receipt.user_id,
            id_rol: receipt.role_id,
            motivo: receipt.reason.unwrap_or_default(),
            fecha_rechazo: receipt.at.format(REVIEW_TIME_FORMAT).to_string(),
            periodo: receipt.period,
            unidad_academica: receipt.unit_code,
        }
    }
}

/// `POST /validar_semestre_rol` and `POST /rechazar_semestre_rol`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ReviewResponse<T> {
    /// Always `true`.
    pub success: bool,
    /// Confirmation.
    pub mensaje: String,
    /// Decision details.
    pub data: T,
}

/// Period selected by default in the view.
#[derive(Debug, Serialize, ToSchema)]
pub struct DefaultPeriod {
    /// `Id_Periodo`.
    pub id: i32,
    /// Period literal.
    pub literal: String,
}

/// Session identity shown in the view header.
#[derive(Debug, Serialize, ToSchema)]
pub struct ViewUser {
    /// Full name.
    pub nombre: String,
    /// Role display name.
    pub rol: String,
    /// Role id.
    pub id_rol: i32,
    /// Login.
    pub login: String,
}

/// Status light as rendered by the capture grid.
#[derive(Debug, Serialize, ToSchema)]
pub struct LightView {
    /// `Id_Semaforo`.
    pub id: i32,
    /// Description.
    pub descripcion: String,
    /// `#`-prefixed color.
    pub color: String,
}

impl From<StatusLight> for LightView {
    fn from(light: StatusLight) -> Self {
        Self {
            id: light.id,
            descripcion: light.label,
            color: light.color,
        }
    }
}

/// Catalog choices offered by the view.
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct ViewCatalogs {
    /// Programs of the actor's level.
    pub programas: Vec<ProgramInfo>,
    /// Id/label catalogs keyed like the metadata.
    pub catalogos: BTreeMap<String, Vec<CatalogEntry>>,
    /// Label to id maps keyed like the metadata.
    pub mapas: BTreeMap<String, BTreeMap<String, i32>>,
}

/// Rejection banner shown to the capturist.
#[derive(Debug, Serialize, ToSchema)]
pub struct RejectionInfo {
    /// Reason.
    pub motivo: String,
    /// Reviewer display name.
    pub rechazado_por: String,
    /// `%d/%m/%Y %H:%M`.
    pub fecha: String,
    /// Period literal.
    pub periodo: String,
    /// Unit `Sigla`.
    pub unidad: String,
}

impl RejectionInfo {
    /// Attach the period and unit to a notice.
    pub fn new(notice: RejectionNotice, periodo: String, unidad: String) -> Self {
        Self {
            motivo: notice.motivo,
            rechazado_por: notice.rechazado_por,
            fecha: notice.fecha,
            periodo,
            unidad,
        }
    }
}

/// Mode-specific part of the view.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "modo")]
pub enum ViewMode {
    /// Capturist grid.
    #[serde(rename = "captura")]
    Capture {
        /// Latest rejection, if any.
        rechazo_info: Option<RejectionInfo>,
    },
    /// Reviewer panel.
    #[serde(rename = "validacion")]
    Review {
        /// Whether this reviewer approved the period.
        usuario_ya_valido: bool,
        /// Whether this reviewer rejected the period.
        usuario_ya_rechazo: bool,
    },
}

/// `GET /consulta`.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConsultaResponse {
    /// Form shown.
    pub formato: FormKind,
    /// Mode and its fields.
    #[serde(flatten)]
    pub modo: ViewMode,
    /// Session identity.
    pub usuario: ViewUser,
    /// Unit `Sigla`, empty when the session unit is unknown.
    pub unidad_academica: String,
    /// Level name, empty when unknown.
    pub nivel: String,
    /// Period consulted.
    pub periodo_default: DefaultPeriod,
    /// Consult rows.
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Row>,
    /// Unique values per metadata key.
    pub metadata: BTreeMap<String, Vec<String>>,
    /// Catalog choices.
    #[serde(flatten)]
    pub catalogs: ViewCatalogs,
    /// `Id_Semestre` to label.
    pub semestres_map: BTreeMap<String, String>,
    /// Light definitions.
    pub semaforo_estados: Vec<LightView>,
}
