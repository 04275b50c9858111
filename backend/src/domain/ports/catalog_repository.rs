//! Port for read-only catalog lookups.
//!
//! Procedures take literal names (`Sigla`, `Nombre_Programa`, `Turno`, ...)
//! while sessions and request bodies carry numeric ids. Adapters implementing
//! [`CatalogRepository`] translate between the two; they never write.

use async_trait::async_trait;

use crate::domain::{CatalogEntry, CatalogKind, PeriodRef, ProgramInfo, StagingJoin, StatusLight};

use super::define_port_error;

define_port_error! {
    /// Errors raised by catalog adapters.
    pub enum CatalogRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "catalog repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "catalog repository query failed: {message}",
    }
}

/// Lookups from catalog ids to literal names and back.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Find a period by its numeric id.
    async fn find_period_by_id(&self, id: i32)
    -> Result<Option<PeriodRef>, CatalogRepositoryError>;

    /// Find a period by its literal label.
    async fn find_period_by_literal(
        &self,
        literal: &str,
    ) -> Result<Option<PeriodRef>, CatalogRepositoryError>;

    /// Short code (`Sigla`) of an academic unit.
    async fn find_unit_code(&self, unit_id: i32) -> Result<Option<String>, CatalogRepositoryError>;

    /// Display name of an academic level.
    async fn find_level_name(&self, level_id: i32)
    -> Result<Option<String>, CatalogRepositoryError>;

    /// Program name, branch and level.
    async fn find_program(
        &self,
        program_id: i32,
    ) -> Result<Option<ProgramInfo>, CatalogRepositoryError>;

    /// Programs offered at a level, ordered by name.
    async fn list_programs(&self, level_id: i32)
    -> Result<Vec<ProgramInfo>, CatalogRepositoryError>;

    /// One entry of a simple id/label catalog.
    async fn find_entry(
        &self,
        kind: CatalogKind,
        id: i32,
    ) -> Result<Option<CatalogEntry>, CatalogRepositoryError>;

    /// Every entry of a simple id/label catalog, ordered by id.
    async fn list_entries(
        &self,
        kind: CatalogKind,
    ) -> Result<Vec<CatalogEntry>, CatalogRepositoryError>;

    /// Status light definitions (ids 1 to 3).
    async fn list_status_lights(&self) -> Result<Vec<StatusLight>, CatalogRepositoryError>;

    /// Full display name of a portal user.
    async fn find_user_name(&self, user_id: i32) -> Result<Option<String>, CatalogRepositoryError>;

    /// Id of the catalog row a staged literal joins to.
    async fn find_join_id(
        &self,
        join: StagingJoin,
        label: &str,
    ) -> Result<Option<i32>, CatalogRepositoryError>;
}

/// Fixture catalog with one unit, one level, one program and the standard
/// status lights.
///
/// Period 7 maps to `2025-2026/1`; unit 1 is `ESCOM`; level 1 is
/// `Superior`; program 10 is `Ingeniería en Sistemas Computacionales`.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCatalogRepository;

const FIXTURE_PERIOD: (i32, &str) = (7, "2025-2026/1");

fn fixture_entries(kind: CatalogKind) -> Vec<CatalogEntry> {
    let labels: &[(i32, &str)] = match kind {
        CatalogKind::AgeGroup => &[(1, "18 a 20"), (2, "21 a 23")],
        CatalogKind::AdmissionType => &[(1, "Nuevo Ingreso"), (2, "Reingreso")],
        CatalogKind::Modality => &[(1, "Escolarizada"), (2, "No Escolarizada")],
        CatalogKind::Semester => &[(1, "Primer Semestre"), (2, "Segundo Semestre")],
        CatalogKind::Shift => &[(1, "Matutino"), (2, "Vespertino")],
        CatalogKind::PerformanceCategory => &[(1, "Aprobados"), (2, "Reprobados")],
    };
    labels
        .iter()
        .map(|(id, label)| CatalogEntry::new(*id, *label))
        .collect()
}

fn fixture_program() -> ProgramInfo {
    ProgramInfo {
        id: 10,
        name: "Ingeniería en Sistemas Computacionales".to_owned(),
        branch: Some("Ingeniería y Ciencias Físico Matemáticas".to_owned()),
        level_id: 1,
    }
}

#[async_trait]
impl CatalogRepository for FixtureCatalogRepository {
    async fn find_period_by_id(
        &self,
        id: i32,
    ) -> Result<Option<PeriodRef>, CatalogRepositoryError> {
        Ok((id == FIXTURE_PERIOD.0).then(|| PeriodRef::new(FIXTURE_PERIOD.0, FIXTURE_PERIOD.1)))
    }

    async fn find_period_by_literal(
        &self,
        literal: &str,
    ) -> Result<Option<PeriodRef>, CatalogRepositoryError> {
        Ok((literal == FIXTURE_PERIOD.1)
            .then(|| PeriodRef::new(FIXTURE_PERIOD.0, FIXTURE_PERIOD.1)))
    }

    async fn find_unit_code(&self, unit_id: i32) -> Result<Option<String>, CatalogRepositoryError> {
        Ok((unit_id == 1).then(|| "ESCOM".to_owned()))
    }

    async fn find_level_name(
        &self,
        level_id: i32,
    ) -> Result<Option<String>, CatalogRepositoryError> {
        Ok((level_id == 1).then(|| "Superior".to_owned()))
    }

    async fn find_program(
        &self,
        program_id: i32,
    ) -> Result<Option<ProgramInfo>, CatalogRepositoryError> {
        Ok((program_id == 10).then(fixture_program))
    }

    async fn list_programs(
        &self,
        level_id: i32,
    ) -> Result<Vec<ProgramInfo>, CatalogRepositoryError> {
        Ok(if level_id == 1 {
            vec![fixture_program()]
        } else {
            Vec::new()
        })
    }

    async fn find_entry(
        &self,
        kind: CatalogKind,
        id: i32,
    ) -> Result<Option<CatalogEntry>, CatalogRepositoryError> {
        Ok(fixture_entries(kind).into_iter().find(|entry| entry.id == id))
    }

    async fn list_entries(
        &self,
        kind: CatalogKind,
    ) -> Result<Vec<CatalogEntry>, CatalogRepositoryError> {
        Ok(fixture_entries(kind))
    }

    async fn list_status_lights(&self) -> Result<Vec<StatusLight>, CatalogRepositoryError> {
        Ok(vec![
            StatusLight::new(1, "Sin iniciar", "#E74C3C"),
            StatusLight::new(2, "En captura", "#F1C40F"),
            StatusLight::new(3, "Completado", "#2ECC71"),
        ])
    }

    async fn find_user_name(&self, user_id: i32) -> Result<Option<String>, CatalogRepositoryError> {
        Ok((user_id == 42).then(|| "Ana López Pérez".to_owned()))
    }

    async fn find_join_id(
        &self,
        join: StagingJoin,
        label: &str,
    ) -> Result<Option<i32>, CatalogRepositoryError> {
        let program = fixture_program();
        let known = match join {
            StagingJoin::Period => (label == FIXTURE_PERIOD.1).then_some(FIXTURE_PERIOD.0),
            StagingJoin::Unit => (label == "ESCOM").then_some(1),
            StagingJoin::Program => (label == program.name).then_some(program.id),
            StagingJoin::Branch => (program.branch.as_deref() == Some(label)).then_some(1),
        };
        Ok(known)
    }
}
