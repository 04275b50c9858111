//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every capture, review, view and health endpoint plus
//! the error payload. Capture paths are documented once with a `{formato}`
//! segment because both form scopes share the same handlers. Swagger UI
//! serves the document in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, FormKind};
use crate::inbound::http::capture_dto::{
    CaptureBody, CaptureCell, CommitBody, PeriodBody, ProgressRow, RejectBody, SemesterBody,
};
use crate::inbound::http::responses::{
    ClearResponse, CommitResponse, ConsultaResponse, DebugResponse, DiagnosisRecord,
    DiagnosisResponse, DiagnosisSummary, ExistingDataResponse, NothingStagedResponse,
    ProgressResponse, SemesterResponse, ShiftResponse, StagedResponse,
};

/// Enrich the generated document with the identity cookie scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "id_rol",
                "Identity cookies (id_rol, id_usuario, id_unidad_academica, ...) set by the portal login.",
            ))),
        );
    }
}

/// OpenAPI document for the capture portal.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Captura API",
        description = "Enrollment and academic performance capture, consolidation and review."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::consulta::consulta,
        crate::inbound::http::capture::obtener_datos_existentes_sp,
        crate::inbound::http::capture::guardar_captura_completa,
        crate::inbound::http::capture::guardar_progreso,
        crate::inbound::http::capture::actualizar_matricula,
        crate::inbound::http::capture::limpiar_temp_matricula,
        crate::inbound::http::capture::preparar_turno,
        crate::inbound::http::capture::validar_captura_semestre,
        crate::inbound::http::capture::semestres_map,
        crate::inbound::http::capture::debug_sp,
        crate::inbound::http::capture::diagnostico_sp,
        crate::inbound::http::review::validar_semestre_rol,
        crate::inbound::http::review::rechazar_semestre_rol,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        FormKind,
        PeriodBody,
        CommitBody,
        RejectBody,
        CaptureCell,
        CaptureBody,
        SemesterBody,
        ProgressRow,
        ExistingDataResponse,
        DebugResponse,
        DiagnosisResponse,
        DiagnosisRecord,
        DiagnosisSummary,
        StagedResponse,
        ProgressResponse,
        CommitResponse,
        NothingStagedResponse,
        ClearResponse,
        ShiftResponse,
        SemesterResponse,
        ConsultaResponse,
    )),
    tags(
        (name = "views", description = "View models for the capture and review pages"),
        (name = "capture", description = "Staging, consolidation and finalization"),
        (name = "review", description = "Reviewer approval and rejection"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    //! Tests verifying OpenAPI paths and schema field structure.

    use super::*;
    use rstest::rstest;
    use utoipa::openapi::RefOr;
    use utoipa::openapi::schema::Schema;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn error_schema_has_code_and_message() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[rstest]
    #[case("CaptureBody", "datos_matricula")]
    #[case("CommitBody", "total_grupos")]
    #[case("StagedResponse", "registros_rechazados")]
    #[case("ShiftResponse", "turno_validado")]
    #[case("SemesterResponse", "sp_final_ejecutado")]
    fn capture_schemas_use_the_portal_field_names(#[case] name: &str, #[case] field: &str) {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let schema = schemas
            .get(name)
            .unwrap_or_else(|| panic!("{name} schema"));

        assert_object_schema_has_field(schema, field);
    }

    #[rstest]
    #[case("/{formato}/consulta")]
    #[case("/{formato}/guardar_captura_completa")]
    #[case("/{formato}/validar_captura_semestre")]
    #[case("/{formato}/rechazar_semestre_rol")]
    #[case("/health/ready")]
    fn every_route_is_documented(#[case] path: &str) {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }

    #[test]
    fn session_cookie_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("SessionCookie"));
    }
}
