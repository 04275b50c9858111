//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{Dimension, FormKind, StagedFigure, StagingKey, ValidationRecord};

use super::schema::{cat_semaforo, temp_aprovechamiento, temp_matricula, usuario, validacion};

/// Insertable enrollment staging row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = temp_matricula)]
pub(crate) struct NewEnrollmentRow<'a> {
    pub periodo: &'a str,
    pub sigla: &'a str,
    pub nombre_programa: &'a str,
    pub nombre_rama: &'a str,
    pub nivel: &'a str,
    pub modalidad: &'a str,
    pub turno: &'a str,
    pub semestre: &'a str,
    pub grupo_edad: &'a str,
    pub tipo_ingreso: &'a str,
    pub sexo: &'a str,
    pub matricula: i32,
    pub salones: Option<i32>,
}

/// Insertable performance staging row.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = temp_aprovechamiento)]
pub(crate) struct NewPerformanceRow<'a> {
    pub periodo: &'a str,
    pub sigla: &'a str,
    pub nombre_programa: &'a str,
    pub nombre_rama: &'a str,
    pub nivel: &'a str,
    pub modalidad: &'a str,
    pub turno: &'a str,
    pub semestre: &'a str,
    pub aprovechamiento: &'a str,
    pub sexo: &'a str,
    pub cantidad: i32,
}

/// Staged figures split by destination table.
#[derive(Debug, Default)]
pub(crate) struct StagingRows<'a> {
    pub enrollment: Vec<NewEnrollmentRow<'a>>,
    pub performance: Vec<NewPerformanceRow<'a>>,
}

impl<'a> StagingRows<'a> {
    /// Route each figure to the table of its dimension.
    pub fn split(figures: &'a [StagedFigure]) -> Self {
        let mut rows = Self::default();
        for figure in figures {
            let key = &figure.key;
            match &key.dimension {
                Dimension::Enrollment {
                    age_group,
                    admission_type,
                    sex,
                } => rows.enrollment.push(NewEnrollmentRow {
                    periodo: &key.period,
                    sigla: &key.unit_code,
                    nombre_programa: &key.program,
                    nombre_rama: &key.branch,
                    nivel: &key.level,
                    modalidad: &key.modality,
                    turno: &key.shift,
                    semestre: &key.semester,
                    grupo_edad: age_group,
                    tipo_ingreso: admission_type,
                    sexo: sex,
                    matricula: figure.count,
                    salones: figure.rooms,
                }),
                Dimension::Performance { category, sex } => {
                    rows.performance.push(NewPerformanceRow {
                        periodo: &key.period,
                        sigla: &key.unit_code,
                        nombre_programa: &key.program,
                        nombre_rama: &key.branch,
                        nivel: &key.level,
                        modalidad: &key.modality,
                        turno: &key.shift,
                        semestre: &key.semester,
                        aprovechamiento: category,
                        sexo: sex,
                        cantidad: figure.count,
                    });
                }
            }
        }
        rows
    }
}

/// Stored enrollment staging row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = temp_matricula)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct EnrollmentRow {
    pub periodo: String,
    pub sigla: String,
    pub nombre_programa: String,
    pub nombre_rama: String,
    pub nivel: String,
    pub modalidad: String,
    pub turno: String,
    pub semestre: String,
    pub grupo_edad: String,
    pub tipo_ingreso: String,
    pub sexo: String,
    pub matricula: i32,
    pub salones: Option<i32>,
}

impl From<EnrollmentRow> for StagedFigure {
    fn from(row: EnrollmentRow) -> Self {
        Self {
            key: StagingKey {
                period: row.periodo,
                unit_code: row.sigla,
                program: row.nombre_programa,
                branch: row.nombre_rama,
                level: row.nivel,
                modality: row.modalidad,
                shift: row.turno,
                semester: row.semestre,
                dimension: Dimension::Enrollment {
                    age_group: row.grupo_edad,
                    admission_type: row.tipo_ingreso,
                    sex: row.sexo,
                },
            },
            count: row.matricula,
            rooms: row.salones,
        }
    }
}

/// Stored performance staging row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = temp_aprovechamiento)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PerformanceRow {
    pub periodo: String,
    pub sigla: String,
    pub nombre_programa: String,
    pub nombre_rama: String,
    pub nivel: String,
    pub modalidad: String,
    pub turno: String,
    pub semestre: String,
    pub aprovechamiento: String,
    pub sexo: String,
    pub cantidad: i32,
}

impl From<PerformanceRow> for StagedFigure {
    fn from(row: PerformanceRow) -> Self {
        Self {
            key: StagingKey {
                period: row.periodo,
                unit_code: row.sigla,
                program: row.nombre_programa,
                branch: row.nombre_rama,
                level: row.nivel,
                modality: row.modalidad,
                shift: row.turno,
                semester: row.semestre,
                dimension: Dimension::Performance {
                    category: row.aprovechamiento,
                    sex: row.sexo,
                },
            },
            count: row.cantidad,
            rooms: None,
        }
    }
}

/// Row struct for reading status light definitions.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = cat_semaforo)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct StatusLightRow {
    pub id_semaforo: i32,
    pub descripcion: String,
    pub color: String,
}

/// Name parts of a portal user.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = usuario)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserNameRow {
    pub nombre: String,
    pub apellido_paterno: String,
    pub apellido_materno: Option<String>,
}

impl UserNameRow {
    /// Non-empty name parts joined by spaces.
    pub fn full_name(&self) -> Option<String> {
        let name = [
            self.nombre.as_str(),
            self.apellido_paterno.as_str(),
            self.apellido_materno.as_deref().unwrap_or_default(),
        ]
        .into_iter()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
        (!name.is_empty()).then_some(name)
    }
}

/// Row struct for reading reviewer decisions.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = validacion)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ValidationRow {
    pub id_periodo: i32,
    pub id_usuario: i32,
    pub validado: bool,
    pub nota: Option<String>,
    pub fecha: DateTime<Utc>,
}

impl ValidationRow {
    /// Domain record for `form`; the caller filtered on its format id.
    pub fn into_record(self, form: FormKind) -> ValidationRecord {
        ValidationRecord {
            period_id: self.id_periodo,
            user_id: self.id_usuario,
            form,
            validated: self.validado,
            note: self.nota,
            recorded_at: self.fecha,
        }
    }
}

/// Insertable reviewer decision.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = validacion)]
pub(crate) struct NewValidationRow<'a> {
    pub id_periodo: i32,
    pub id_usuario: i32,
    pub id_formato: i32,
    pub validado: bool,
    pub nota: Option<&'a str>,
    pub fecha: DateTime<Utc>,
}

impl<'a> From<&'a ValidationRecord> for NewValidationRow<'a> {
    fn from(record: &'a ValidationRecord) -> Self {
        Self {
            id_periodo: record.period_id,
            id_usuario: record.user_id,
            id_formato: record.form.format_id(),
            validado: record.validated,
            nota: record.note.as_deref(),
            fecha: record.recorded_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn figure(dimension: Dimension, count: i32, rooms: Option<i32>) -> StagedFigure {
        StagedFigure {
            key: StagingKey {
                period: "2025-2026/1".into(),
                unit_code: "ESCOM".into(),
                program: "Ingeniería en Sistemas Computacionales".into(),
                branch: "NULL".into(),
                level: "Superior".into(),
                modality: "Escolarizada".into(),
                shift: "Matutino".into(),
                semester: "Primer Semestre".into(),
                dimension,
            },
            count,
            rooms,
        }
    }

    #[rstest]
    fn split_routes_figures_by_dimension() {
        let figures = vec![
            figure(
                Dimension::Enrollment {
                    age_group: "18 a 20".into(),
                    admission_type: "Nuevo Ingreso".into(),
                    sex: "Hombre".into(),
                },
                0,
                Some(3),
            ),
            figure(
                Dimension::Performance {
                    category: "Aprobados".into(),
                    sex: "Mujer".into(),
                },
                12,
                None,
            ),
        ];

        let rows = StagingRows::split(&figures);

        assert_eq!(rows.enrollment.len(), 1);
        assert_eq!(rows.performance.len(), 1);
        let enrollment = rows.enrollment.first().expect("enrollment row");
        assert_eq!(enrollment.matricula, 0);
        assert_eq!(enrollment.salones, Some(3));
        assert_eq!(enrollment.nombre_rama, "NULL");
        let performance = rows.performance.first().expect("performance row");
        assert_eq!(performance.aprovechamiento, "Aprobados");
        assert_eq!(performance.cantidad, 12);
    }

    #[rstest]
    fn stored_performance_rows_carry_no_room_count() {
        let figure = StagedFigure::from(PerformanceRow {
            periodo: "2025-2026/1".into(),
            sigla: "ESCOM".into(),
            nombre_programa: "Ingeniería en Sistemas Computacionales".into(),
            nombre_rama: "NULL".into(),
            nivel: "Superior".into(),
            modalidad: "Escolarizada".into(),
            turno: "Matutino".into(),
            semestre: "Primer Semestre".into(),
            aprovechamiento: "Aprobados".into(),
            sexo: "Mujer".into(),
            cantidad: 14,
        });

        assert_eq!(figure.count, 14);
        assert_eq!(figure.rooms, None);
        assert_eq!(figure.key.dimension.form(), FormKind::Performance);
        assert_eq!(figure.key.branch, "NULL");
    }

    #[rstest]
    #[case("Ana", "López", Some("Pérez"), Some("Ana López Pérez"))]
    #[case("Ana", "", None, Some("Ana"))]
    #[case(" ", "", Some(""), None)]
    fn user_full_name_skips_blank_parts(
        #[case] nombre: &str,
        #[case] paterno: &str,
        #[case] materno: Option<&str>,
        #[case] expected: Option<&str>,
    ) {
        let row = UserNameRow {
            nombre: nombre.into(),
            apellido_paterno: paterno.into(),
            apellido_materno: materno.map(str::to_owned),
        };
        assert_eq!(row.full_name().as_deref(), expected);
    }
}
