//! Capture request bodies and their translation into domain requests.
//!
//! The capture pages post catalog ids as numbers or numeric strings and
//! periods as ids or literals. Fields are lenient: an unparsable id is
//! treated as absent so the domain reports it as a missing parameter.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;

use crate::domain::{
    CaptureEntry, CaptureSubmission, Dimension, FormKind, SemesterRequest, ShiftRequest,
    StagedFigure, StagingKey,
};

/// Scalar that may arrive as a JSON number or string.
#[derive(Deserialize)]
#[serde(untagged)]
enum Loose {
    Int(i64),
    Text(String),
}

impl Loose {
    fn into_text(self) -> String {
        match self {
            Self::Int(number) => number.to_string(),
            Self::Text(text) => text,
        }
    }

    fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(number) => Some(*number),
            Self::Text(text) => text.trim().parse().ok(),
        }
    }
}

fn loose_id<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Loose>::deserialize(deserializer)?
        .and_then(|value| value.as_int())
        .and_then(|number| i32::try_from(number).ok()))
}

fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Loose>::deserialize(deserializer)?
        .map(Loose::into_text)
        .filter(|text| !text.trim().is_empty()))
}

fn loose_label<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Loose>::deserialize(deserializer)?
        .map(Loose::into_text)
        .unwrap_or_default())
}

fn loose_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Loose>::deserialize(deserializer)?
        .and_then(|value| value.as_int())
        .unwrap_or_default())
}

fn loose_optional_count<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Loose>::deserialize(deserializer)?.and_then(|value| value.as_int()))
}

/// Body carrying only a period.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct PeriodBody {
    /// Period id (`"7"`) or literal (`"2025-2026/1"`).
    #[serde(default, deserialize_with = "loose_text")]
    #[schema(value_type = Option<String>, example = "7")]
    pub periodo: Option<String>,
}

/// Body of the stage-to-permanent commit.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CommitBody {
    /// Period id or literal.
    #[serde(default, deserialize_with = "loose_text")]
    #[schema(value_type = Option<String>)]
    pub periodo: Option<String>,
    /// Room count passed as `@SSalones`.
    #[serde(default, deserialize_with = "loose_count")]
    #[schema(value_type = i64)]
    pub total_grupos: i64,
}

/// Body of a reviewer rejection.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RejectBody {
    /// Period id or literal.
    #[serde(default, deserialize_with = "loose_text")]
    #[schema(value_type = Option<String>)]
    pub periodo: Option<String>,
    /// Rejection reason; mandatory.
    #[serde(default)]
    pub motivo: Option<String>,
}

/// One grid cell of a capture submission.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CaptureCell {
    /// `Id_Tipo_Ingreso` (enrollment).
    #[serde(default, deserialize_with = "loose_label")]
    #[schema(value_type = String)]
    pub tipo_ingreso: String,
    /// `Id_Grupo_Edad` (enrollment).
    #[serde(default, deserialize_with = "loose_label")]
    #[schema(value_type = String)]
    pub grupo_edad: String,
    /// `Id_Aprovechamiento` (performance).
    #[serde(default, deserialize_with = "loose_label")]
    #[schema(value_type = String)]
    pub aprovechamiento: String,
    /// `M`, `F`, or a full label.
    #[serde(default)]
    pub sexo: String,
    /// Student count.
    #[serde(default, alias = "cantidad", deserialize_with = "loose_count")]
    #[schema(value_type = i64)]
    pub matricula: i64,
    /// Per-cell room count.
    #[serde(default, deserialize_with = "loose_optional_count")]
    #[schema(value_type = Option<i64>)]
    pub salones: Option<i64>,
}

impl From<CaptureCell> for CaptureEntry {
    fn from(cell: CaptureCell) -> Self {
        Self {
            admission_type: cell.tipo_ingreso,
            age_group: cell.grupo_edad,
            category: cell.aprovechamiento,
            sex: cell.sexo,
            count: cell.matricula,
            rooms: cell.salones,
        }
    }
}

/// Body of a full shift submission.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CaptureBody {
    /// Period id or literal.
    #[serde(default, deserialize_with = "loose_text")]
    #[schema(value_type = Option<String>)]
    pub periodo: Option<String>,
    /// `Id_Programa`.
    #[serde(default, deserialize_with = "loose_id")]
    #[schema(value_type = Option<i32>)]
    pub programa: Option<i32>,
    /// `Id_Semestre`.
    #[serde(default, deserialize_with = "loose_id")]
    #[schema(value_type = Option<i32>)]
    pub semestre: Option<i32>,
    /// `Id_Modalidad`.
    #[serde(default, deserialize_with = "loose_id")]
    #[schema(value_type = Option<i32>)]
    pub modalidad: Option<i32>,
    /// `Id_Turno`.
    #[serde(default, deserialize_with = "loose_id")]
    #[schema(value_type = Option<i32>)]
    pub turno: Option<i32>,
    /// Room count for the shift.
    #[serde(default, deserialize_with = "loose_count")]
    #[schema(value_type = i64)]
    pub total_grupos: i64,
    /// Cells keyed by the client's grid identifier.
    #[serde(default, alias = "datos_aprovechamiento")]
    pub datos_matricula: BTreeMap<String, CaptureCell>,
}

impl From<CaptureBody> for CaptureSubmission {
    fn from(body: CaptureBody) -> Self {
        Self {
            period: body.periodo,
            program_id: body.programa,
            modality_id: body.modalidad,
            semester_id: body.semestre,
            shift_id: body.turno,
            total_groups: body.total_grupos,
            entries: body
                .datos_matricula
                .into_values()
                .map(CaptureEntry::from)
                .collect(),
        }
    }
}

/// Body identifying one shift or one semester.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct SemesterBody {
    /// Period id or literal.
    #[serde(default, deserialize_with = "loose_text")]
    #[schema(value_type = Option<String>)]
    pub periodo: Option<String>,
    /// `Id_Programa`.
    #[serde(default, deserialize_with = "loose_id")]
    #[schema(value_type = Option<i32>)]
    pub programa: Option<i32>,
    /// `Id_Modalidad`.
    #[serde(default, deserialize_with = "loose_id")]
    #[schema(value_type = Option<i32>)]
    pub modalidad: Option<i32>,
    /// `Id_Semestre`.
    #[serde(default, deserialize_with = "loose_id")]
    #[schema(value_type = Option<i32>)]
    pub semestre: Option<i32>,
    /// `Id_Turno`; shift validation only.
    #[serde(default, deserialize_with = "loose_id")]
    #[schema(value_type = Option<i32>)]
    pub turno: Option<i32>,
    /// Room count; semester consolidation only.
    #[serde(default, deserialize_with = "loose_count")]
    #[schema(value_type = i64)]
    pub total_grupos: i64,
}

impl From<SemesterBody> for ShiftRequest {
    fn from(body: SemesterBody) -> Self {
        Self {
            period: body.periodo,
            program_id: body.programa,
            modality_id: body.modalidad,
            semester_id: body.semestre,
            shift_id: body.turno,
        }
    }
}

impl From<SemesterBody> for SemesterRequest {
    fn from(body: SemesterBody) -> Self {
        Self {
            period: body.periodo,
            program_id: body.programa,
            modality_id: body.modalidad,
            semester_id: body.semestre,
            total_groups: body.total_grupos,
        }
    }
}

const NULL_BRANCH: &str = "NULL";

/// A staging row whose catalog values are already literal names.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "PascalCase")]
pub struct ProgressRow {
    /// Period literal.
    #[serde(default)]
    pub periodo: String,
    /// Unit `Sigla`.
    #[serde(default)]
    pub sigla: String,
    /// `Nombre_Programa`.
    #[serde(default, rename = "Nombre_Programa")]
    pub nombre_programa: String,
    /// `Nombre_Rama`; `NULL` when absent.
    #[serde(default, rename = "Nombre_Rama")]
    pub nombre_rama: Option<String>,
    /// Level name.
    #[serde(default)]
    pub nivel: String,
    /// `Modalidad`.
    #[serde(default)]
    pub modalidad: String,
    /// `Turno`.
    #[serde(default)]
    pub turno: String,
    /// `Semestre`.
    #[serde(default)]
    pub semestre: String,
    /// `Grupo_Edad` (enrollment).
    #[serde(default, rename = "Grupo_Edad")]
    pub grupo_edad: String,
    /// `Tipo_Ingreso` (enrollment).
    #[serde(default, rename = "Tipo_Ingreso")]
    pub tipo_ingreso: String,
    /// `Aprovechamiento` (performance).
    #[serde(default)]
    pub aprovechamiento: String,
    /// `Hombre` / `Mujer`.
    #[serde(default)]
    pub sexo: String,
    /// Student count.
    #[serde(default, alias = "Alumnos", alias = "Cantidad", deserialize_with = "loose_optional_count")]
    #[schema(value_type = Option<i64>)]
    pub matricula: Option<i64>,
    /// Room count (enrollment).
    #[serde(default, deserialize_with = "loose_optional_count")]
    #[schema(value_type = Option<i64>)]
    pub salones: Option<i64>,
}

impl ProgressRow {
    /// Staged figure for `form`, or `None` when a key column or the count is
    /// missing or the count does not fit.
    pub fn into_figure(self, form: FormKind) -> Option<StagedFigure> {
        let dimension = match form {
            FormKind::Enrollment => Dimension::Enrollment {
                age_group: self.grupo_edad,
                admission_type: self.tipo_ingreso,
                sex: self.sexo,
            },
            FormKind::Performance => Dimension::Performance {
                category: self.aprovechamiento,
                sex: self.sexo,
            },
        };
        let dimension_complete = match &dimension {
            Dimension::Enrollment {
                age_group,
                admission_type,
                sex,
            } => ![age_group, admission_type, sex].iter().any(|part| part.trim().is_empty()),
            Dimension::Performance { category, sex } => {
                !category.trim().is_empty() && !sex.trim().is_empty()
            }
        };
        let key_complete = ![&self.periodo, &self.sigla, &self.nombre_programa, &self.semestre]
            .iter()
            .any(|part| part.trim().is_empty());
        if !dimension_complete || !key_complete {
            return None;
        }
        let count = i32::try_from(self.matricula?).ok().filter(|count| *count >= 0)?;
        let rooms = if form.takes_room_count() {
            self.salones.and_then(|rooms| i32::try_from(rooms.max(0)).ok())
        } else {
            None
        };
        Some(StagedFigure {
            key: StagingKey {
                period: self.periodo,
                unit_code: self.sigla,
                program: self.nombre_programa,
                branch: self
                    .nombre_rama
                    .filter(|branch| !branch.trim().is_empty())
                    .unwrap_or_else(|| NULL_BRANCH.to_owned()),
                level: self.nivel,
                modality: self.modalidad,
                shift: self.turno,
                semester: self.semestre,
                dimension,
            },
            count,
            rooms,
        })
    }
}
