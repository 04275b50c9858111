//! Capture forms and the procedure family each one drives.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::CatalogKind;

/// A capture form. Both forms share the workflow; they differ in procedure
/// names, staging table, and the catalog columns offered as choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FormKind {
    /// Enrollment figures (`matricula`, `Id_Formato` 1).
    Enrollment,
    /// Academic performance figures (`aprovechamiento`, `Id_Formato` 2).
    Performance,
}

/// Procedure names used by one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormProcedures {
    /// Primary data query for a unit.
    pub consult: &'static str,
    /// Unit-level update (stage to permanent, shift validation).
    pub update_unit: &'static str,
    /// Semester-level consolidation.
    pub update_semester: &'static str,
    /// Unit-level finalization.
    pub finalize: &'static str,
    /// Reviewer approval.
    pub validate: &'static str,
    /// Reviewer rejection.
    pub reject: &'static str,
}

const ENROLLMENT_PROCEDURES: FormProcedures = FormProcedures {
    consult: "SP_Consulta_Matricula_Unidad_Academica",
    update_unit: "SP_Actualiza_Matricula_Por_Unidad_Academica",
    update_semester: "SP_Actualiza_Matricula_Por_Semestre_AU",
    finalize: "SP_Finaliza_Captura_Matricula",
    validate: "SP_Valida_Matricula",
    reject: "SP_Rechaza_Matricula",
};

const PERFORMANCE_PROCEDURES: FormProcedures = FormProcedures {
    consult: "SP_Consulta_Aprovechamiento_Unidad_Academica",
    update_unit: "SP_Actualiza_Aprovechamiento_Por_Unidad_Academica",
    update_semester: "SP_Actualiza_Aprovechamiento_Por_Semestre_AU",
    finalize: "SP_Finaliza_Captura_Aprovechamiento",
    validate: "SP_Valida_Aprovechamiento",
    reject: "SP_Rechaza_Aprovechamiento",
};

const ENROLLMENT_METADATA: &[(&str, &str)] = &[
    ("grupos_edad", "Grupo_Edad"),
    ("tipos_ingreso", "Tipo_de_Ingreso"),
    ("programas", "Nombre_Programa"),
    ("modalidades", "Modalidad"),
    ("semestres", "Semestre"),
    ("turnos", "Turno"),
];

const PERFORMANCE_METADATA: &[(&str, &str)] = &[
    ("aprovechamientos", "Aprovechamiento"),
    ("programas", "Nombre_Programa"),
    ("modalidades", "Modalidad"),
    ("semestres", "Semestre"),
    ("turnos", "Turno"),
];

impl FormKind {
    /// Every form, in route order.
    pub const ALL: [Self; 2] = [Self::Enrollment, Self::Performance];

    /// Route segment and log label.
    pub fn slug(self) -> &'static str {
        match self {
            Self::Enrollment => "matricula",
            Self::Performance => "aprovechamiento",
        }
    }

    /// `Id_Formato` used by the status and validation tables.
    pub fn format_id(self) -> i32 {
        match self {
            Self::Enrollment => 1,
            Self::Performance => 2,
        }
    }

    /// Procedure family for this form.
    pub fn procedures(self) -> &'static FormProcedures {
        match self {
            Self::Enrollment => &ENROLLMENT_PROCEDURES,
            Self::Performance => &PERFORMANCE_PROCEDURES,
        }
    }

    /// Metadata output keys and the result column each one reads.
    pub fn metadata_columns(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::Enrollment => ENROLLMENT_METADATA,
            Self::Performance => PERFORMANCE_METADATA,
        }
    }

    /// Whether the unit and semester procedures take a `@SSalones` count.
    pub fn takes_room_count(self) -> bool {
        matches!(self, Self::Enrollment)
    }

    /// Catalogs whose ids a staged row carries as its category dimension.
    pub fn category_catalogs(self) -> &'static [CatalogKind] {
        match self {
            Self::Enrollment => &[CatalogKind::AgeGroup, CatalogKind::AdmissionType],
            Self::Performance => &[CatalogKind::PerformanceCategory],
        }
    }

    /// Whether the semester/admission-type cross-check applies.
    pub fn applies_admission_rule(self) -> bool {
        matches!(self, Self::Enrollment)
    }
}

impl std::fmt::Display for FormKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forms_use_distinct_procedures_and_format_ids() {
        let [enrollment, performance] = FormKind::ALL;
        assert_ne!(enrollment.format_id(), performance.format_id());
        assert_ne!(
            enrollment.procedures().finalize,
            performance.procedures().finalize
        );
    }

    #[test]
    fn only_enrollment_carries_room_counts_and_admission_rule() {
        assert!(FormKind::Enrollment.takes_room_count());
        assert!(FormKind::Enrollment.applies_admission_rule());
        assert!(!FormKind::Performance.takes_room_count());
        assert!(!FormKind::Performance.applies_admission_rule());
    }
}
