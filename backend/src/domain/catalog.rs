//! Catalog resolution: numeric ids to the literal names procedures expect.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::ToSchema;

use super::ports::{CatalogRepository, CatalogRepositoryError};
use super::{CaptureError, PeriodInput, PeriodRef};

/// Simple id/label catalogs consulted by capture and review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogKind {
    /// `Cat_Grupo_Edad`.
    AgeGroup,
    /// `Cat_Tipo_Ingreso`.
    AdmissionType,
    /// `Cat_Modalidad`.
    Modality,
    /// `Cat_Semestre`.
    Semester,
    /// `Cat_Turno`.
    Shift,
    /// `Cat_Aprovechamiento`.
    PerformanceCategory,
}

impl CatalogKind {
    /// Request field that carries ids of this catalog.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::AgeGroup => "grupo_edad",
            Self::AdmissionType => "tipo_ingreso",
            Self::Modality => "modalidad",
            Self::Semester => "semestre",
            Self::Shift => "turno",
            Self::PerformanceCategory => "aprovechamiento",
        }
    }
}

/// One row of an id/label catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CatalogEntry {
    /// Catalog id.
    pub id: i32,
    /// Literal label.
    pub label: String,
}

impl CatalogEntry {
    /// Build an entry.
    pub fn new(id: i32, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
        }
    }
}

/// A program with the branch and level it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ProgramInfo {
    /// `Id_Programa`.
    pub id: i32,
    /// `Nombre_Programa`.
    pub name: String,
    /// `Nombre_Rama`, when the program has one.
    pub branch: Option<String>,
    /// `Id_Nivel`.
    pub level_id: i32,
}

/// A status light definition from `Cat_Semaforo`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusLight {
    /// `Id_Semaforo`.
    pub id: i32,
    /// Description shown next to the light.
    pub label: String,
    /// CSS color, always `#`-prefixed.
    pub color: String,
}

impl StatusLight {
    /// Build a light, normalising the color to carry a leading `#`.
    pub fn new(id: i32, label: impl Into<String>, color: impl AsRef<str>) -> Self {
        let raw = color.as_ref().trim();
        let color = if raw.starts_with('#') || raw.is_empty() {
            raw.to_owned()
        } else {
            format!("#{raw}")
        };
        Self {
            id,
            label: label.into(),
            color,
        }
    }
}

/// Literal identity of the capturist's unit, required by every procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitContext {
    /// `Id_Unidad_Academica` from the session.
    pub unit_id: i32,
    /// `Sigla`, passed as `@UUnidad_Academica`.
    pub unit_code: String,
    /// Level name, passed as `@NNivel`.
    pub level: String,
}

/// Translates session and body ids into the literals procedures expect.
#[derive(Clone)]
pub struct CatalogResolver {
    repo: Arc<dyn CatalogRepository>,
}

fn resolution_failure(field: &'static str, error: &CatalogRepositoryError) -> CaptureError {
    CaptureError::resolution(field, format!("catálogo no disponible: {error}"))
}

impl CatalogResolver {
    /// Wrap a catalog repository.
    pub fn new(repo: Arc<dyn CatalogRepository>) -> Self {
        Self { repo }
    }

    /// Access the underlying repository for plain listings.
    pub fn repository(&self) -> &Arc<dyn CatalogRepository> {
        &self.repo
    }

    /// Normalise a period input to a known period.
    ///
    /// Numeric inputs are looked up by id; anything still unresolved is
    /// looked up as a literal; when both fail, `default` is returned. Lookup
    /// failures are logged and treated as "not found", so this never fails.
    pub async fn resolve_period(&self, input: Option<&str>, default: &PeriodRef) -> PeriodRef {
        let parsed = PeriodInput::parse(input);
        if let PeriodInput::Id(id) = parsed {
            match self.repo.find_period_by_id(id).await {
                Ok(Some(period)) => return period,
                Ok(None) => {}
                Err(error) => warn!(%error, period_id = id, "period lookup by id failed"),
            }
        }
        let literal = match parsed {
            PeriodInput::Absent => return default.clone(),
            PeriodInput::Id(_) => input.map(str::trim).unwrap_or_default(),
            PeriodInput::Literal(literal) => literal,
        };
        match self.repo.find_period_by_literal(literal).await {
            Ok(Some(period)) => period,
            Ok(None) => {
                warn!(period = literal, fallback = %default.literal, "unknown period, using default");
                default.clone()
            }
            Err(error) => {
                warn!(%error, period = literal, "period lookup by literal failed");
                default.clone()
            }
        }
    }

    /// Look up the unit code and level name, each `None` when unknown.
    ///
    /// # Errors
    /// Propagates adapter failures; absence is not an error here.
    pub async fn resolve_unit_and_level(
        &self,
        unit_id: i32,
        level_id: i32,
    ) -> Result<(Option<String>, Option<String>), CatalogRepositoryError> {
        let code = self.repo.find_unit_code(unit_id).await?;
        let level = self.repo.find_level_name(level_id).await?;
        Ok((code, level))
    }

    /// Resolve unit and level, treating either absence as a hard failure.
    ///
    /// # Errors
    /// [`CaptureError::Resolution`] when the unit or level is unknown or the
    /// catalog is unreachable.
    pub async fn require_unit_context(
        &self,
        unit_id: i32,
        level_id: i32,
    ) -> Result<UnitContext, CaptureError> {
        let (code, level) = self
            .resolve_unit_and_level(unit_id, level_id)
            .await
            .map_err(|err| resolution_failure("id_unidad_academica", &err))?;
        let unit_code = code.filter(|c| !c.trim().is_empty()).ok_or_else(|| {
            CaptureError::resolution(
                "id_unidad_academica",
                format!("Unidad Académica con id {unit_id} no encontrada"),
            )
        })?;
        let level = level.filter(|l| !l.trim().is_empty()).ok_or_else(|| {
            CaptureError::resolution("id_nivel", format!("Nivel con id {level_id} no encontrado"))
        })?;
        Ok(UnitContext {
            unit_id,
            unit_code,
            level,
        })
    }

    /// Resolve a required catalog id to its entry.
    ///
    /// # Errors
    /// [`CaptureError::Resolution`] when the id is unknown.
    pub async fn require_entry(
        &self,
        kind: CatalogKind,
        id: i32,
    ) -> Result<CatalogEntry, CaptureError> {
        let field = kind.field_name();
        self.repo
            .find_entry(kind, id)
            .await
            .map_err(|err| resolution_failure(field, &err))?
            .ok_or_else(|| CaptureError::resolution(field, format!("{field} con id {id} no encontrado")))
    }

    /// Resolve a required program id.
    ///
    /// # Errors
    /// [`CaptureError::Resolution`] when the program is unknown.
    pub async fn require_program(&self, id: i32) -> Result<ProgramInfo, CaptureError> {
        self.repo
            .find_program(id)
            .await
            .map_err(|err| resolution_failure("programa", &err))?
            .ok_or_else(|| {
                CaptureError::resolution("programa", format!("programa con id {id} no encontrado"))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{FixtureCatalogRepository, MockCatalogRepository};
    use rstest::{fixture, rstest};

    #[fixture]
    fn resolver() -> CatalogResolver {
        CatalogResolver::new(Arc::new(FixtureCatalogRepository))
    }

    fn default_period() -> PeriodRef {
        PeriodRef::new(7, "2025-2026/1")
    }

    #[rstest]
    #[case(Some("7"), "2025-2026/1")]
    #[case(None, "2025-2026/1")]
    #[case(Some("9999"), "2025-2026/1")]
    #[case(Some("99999999999999"), "2025-2026/1")]
    #[case(Some("2025-2026/1"), "2025-2026/1")]
    #[case(Some("1999-2000/9"), "2025-2026/1")]
    #[tokio::test]
    async fn resolve_period_scenarios(
        resolver: CatalogResolver,
        #[case] input: Option<&str>,
        #[case] expected: &str,
    ) {
        let period = resolver.resolve_period(input, &default_period()).await;
        assert_eq!(period.literal, expected);
        assert!(!period.literal.bytes().all(|b| b.is_ascii_digit()));
    }

    #[tokio::test]
    async fn resolve_period_falls_back_to_literal_lookup_for_unknown_ids() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_find_period_by_id()
            .times(1)
            .return_once(|_| Ok(None));
        repo.expect_find_period_by_literal()
            .withf(|literal| literal.starts_with("2024"))
            .times(1)
            .return_once(|_| Ok(Some(PeriodRef::new(3, "2024"))));
        let resolver = CatalogResolver::new(Arc::new(repo));

        let period = resolver.resolve_period(Some("2024"), &default_period()).await;
        assert_eq!(period, PeriodRef::new(3, "2024"));
    }

    #[tokio::test]
    async fn resolve_period_never_fails_on_adapter_errors() {
        let mut repo = MockCatalogRepository::new();
        repo.expect_find_period_by_id()
            .return_once(|_| Err(CatalogRepositoryError::connection("down")));
        repo.expect_find_period_by_literal()
            .return_once(|_| Err(CatalogRepositoryError::connection("down")));
        let resolver = CatalogResolver::new(Arc::new(repo));

        let period = resolver.resolve_period(Some("7"), &default_period()).await;
        assert_eq!(period, default_period());
    }

    #[rstest]
    #[case(1, 1, true)]
    #[case(99, 1, false)]
    #[case(1, 99, false)]
    #[tokio::test]
    async fn unit_context_requires_both_literals(
        resolver: CatalogResolver,
        #[case] unit: i32,
        #[case] level: i32,
        #[case] ok: bool,
    ) {
        let result = resolver.require_unit_context(unit, level).await;
        assert_eq!(result.is_ok(), ok);
        if let Err(error) = result {
            assert!(matches!(error, CaptureError::Resolution { .. }));
        }
    }

    #[test]
    fn status_light_colors_gain_hash_prefix() {
        assert_eq!(StatusLight::new(1, "a", "FF0000").color, "#FF0000");
        assert_eq!(StatusLight::new(1, "a", "#00FF00").color, "#00FF00");
    }
}
