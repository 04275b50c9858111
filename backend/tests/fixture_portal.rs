//! End-to-end checks of the public HTTP surface over fixture ports.

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::http::StatusCode;
use actix_web::{App, test, web};
use captura::ApiDoc;
use captura::Trace;
use captura::domain::ports::{
    FixtureCatalogRepository, FixtureProcedureExecutor, FixtureStagingRepository,
    FixtureUnitStatusRepository, FixtureValidationRepository, FixtureWorkflowLock,
};
use captura::domain::{FormKind, PeriodRef, PortalSettings};
use captura::inbound::http::capture::form_scope;
use captura::inbound::http::state::{HttpState, HttpStatePorts};
use rstest::{fixture, rstest};
use serde_json::{Value, json};
use utoipa::OpenApi;

#[fixture]
fn state() -> web::Data<HttpState> {
    web::Data::new(HttpState::new(
        HttpStatePorts {
            catalog: Arc::new(FixtureCatalogRepository),
            executor: Arc::new(FixtureProcedureExecutor),
            staging: Arc::new(FixtureStagingRepository),
            unit_status: Arc::new(FixtureUnitStatusRepository),
            validations: Arc::new(FixtureValidationRepository),
            lock: Arc::new(FixtureWorkflowLock),
        },
        PortalSettings::new(PeriodRef::new(7, "2025-2026/1")),
    ))
}

fn session(request: test::TestRequest, role_id: &str, role_name: &str) -> test::TestRequest {
    [
        ("id_unidad_academica", "1"),
        ("id_nivel", "1"),
        ("id_rol", role_id),
        ("nombre_rol", role_name),
        ("id_usuario", "42"),
        ("usuario", "alopez"),
        ("nombre_usuario", "Ana"),
        ("apellidoP_usuario", "López"),
        ("apellidoM_usuario", "Pérez"),
    ]
    .into_iter()
    .fold(request, |request, (name, value)| {
        request.cookie(Cookie::new(name, value.to_owned()))
    })
}

#[rstest]
#[case("/matricula/consulta", "enrollment")]
#[case("/aprovechamiento/consulta", "performance")]
#[actix_web::test]
async fn capturist_opens_each_form(
    state: web::Data<HttpState>,
    #[case] uri: &str,
    #[case] formato: &str,
) {
    let app = test::init_service(
        App::new()
            .app_data(state)
            .wrap(Trace)
            .service(form_scope(FormKind::Enrollment))
            .service(form_scope(FormKind::Performance)),
    )
    .await;

    let request = session(test::TestRequest::get().uri(uri), "3", "Capturista").to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("trace-id"));
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["formato"], json!(formato));
    assert_eq!(body["modo"], json!("captura"));
}

#[rstest]
#[actix_web::test]
async fn missing_session_is_denied(state: web::Data<HttpState>) {
    let app = test::init_service(
        App::new()
            .app_data(state)
            .service(form_scope(FormKind::Enrollment)),
    )
    .await;

    let request = test::TestRequest::get()
        .uri("/matricula/consulta")
        .to_request();
    let response = test::call_service(&app, request).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[core::prelude::v1::test]
fn openapi_document_lists_review_routes() {
    let doc = ApiDoc::openapi();

    for path in [
        "/{formato}/validar_semestre_rol",
        "/{formato}/rechazar_semestre_rol",
        "/{formato}/diagnostico_sp",
    ] {
        assert!(doc.paths.paths.contains_key(path), "missing {path}");
    }
}
