//! Tests for the capture and review view model.

use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{Value, json};

use crate::inbound::http::test_utils::{
    CAPTURIST, REVIEWER, VISITOR, Workbench, fixture_state, init_app, with_session,
};

fn get(uri: &str, role_id: i32) -> actix_http::Request {
    with_session(test::TestRequest::get().uri(uri), role_id).to_request()
}

#[actix_web::test]
async fn capturist_view_filters_catalogs_to_consulted_labels() {
    let app = init_app(fixture_state()).await;

    let body: Value =
        test::call_and_read_body_json(&app, get("/matricula/consulta?periodo=7", CAPTURIST)).await;

    assert_eq!(body["modo"], json!("captura"));
    assert_eq!(body["rechazo_info"], Value::Null);
    assert_eq!(body["formato"], json!("enrollment"));
    assert_eq!(body["unidad_academica"], json!("ESCOM"));
    assert_eq!(body["periodo_default"], json!({"id": 7, "literal": "2025-2026/1"}));
    assert_eq!(body["rows"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["mapas"]["modalidades"], json!({"Escolarizada": 1}));
    assert_eq!(
        body["mapas"]["turnos"],
        json!({"Matutino": 1, "Vespertino": 2})
    );
    assert!(body["catalogos"].get("grupos_edad").is_some());
    assert_eq!(body["programas"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["semestres_map"]["2"], json!("Segundo Semestre"));
    assert_eq!(body["semaforo_estados"][0]["color"], json!("#E74C3C"));
    assert_eq!(body["usuario"]["nombre"], json!("Ana López Pérez"));
}

#[actix_web::test]
async fn performance_view_offers_performance_categories() {
    let app = init_app(fixture_state()).await;

    let body: Value =
        test::call_and_read_body_json(&app, get("/aprovechamiento/consulta", CAPTURIST)).await;

    assert_eq!(body["formato"], json!("performance"));
    assert_eq!(body["mapas"]["aprovechamientos"], json!({"Aprobados": 1}));
    assert!(body["catalogos"].get("grupos_edad").is_none());
}

#[actix_web::test]
async fn capturist_sees_the_latest_rejection() {
    let bench = Workbench::new(&[]);
    let app = init_app(bench.state()).await;
    let reject = with_session(
        test::TestRequest::post().uri("/matricula/rechazar_semestre_rol"),
        REVIEWER,
    )
    .set_json(json!({"periodo": "7", "motivo": "Cifras incompletas"}))
    .to_request();
    test::call_service(&app, reject).await;

    let body: Value =
        test::call_and_read_body_json(&app, get("/matricula/consulta", CAPTURIST)).await;

    let notice = &body["rechazo_info"];
    assert_eq!(notice["motivo"], json!("Cifras incompletas"));
    assert_eq!(notice["rechazado_por"], json!("Ana López Pérez"));
    assert_eq!(notice["periodo"], json!("2025-2026/1"));
    assert_eq!(notice["unidad"], json!("ESCOM"));
}

#[actix_web::test]
async fn reviewer_view_reports_own_decision() {
    let bench = Workbench::new(&[]);
    let app = init_app(bench.state()).await;
    let approve = with_session(
        test::TestRequest::post().uri("/matricula/validar_semestre_rol"),
        REVIEWER,
    )
    .set_json(json!({"periodo": "7"}))
    .to_request();
    test::call_service(&app, approve).await;

    let body: Value =
        test::call_and_read_body_json(&app, get("/matricula/consulta", REVIEWER)).await;

    assert_eq!(body["modo"], json!("validacion"));
    assert_eq!(body["usuario_ya_valido"], json!(true));
    assert_eq!(body["usuario_ya_rechazo"], json!(false));
    assert!(body.get("rechazo_info").is_none());
}

#[actix_web::test]
async fn other_roles_are_denied() {
    let app = init_app(fixture_state()).await;

    let response = test::call_service(&app, get("/matricula/consulta", VISITOR)).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(
        body["error"],
        json!("Acceso denegado: Su rol (Consulta) no tiene permisos para acceder a esta funcionalidad.")
    );
}

#[actix_web::test]
async fn failed_consult_still_renders_an_empty_grid() {
    let bench = Workbench::new(&[]);
    bench
        .executor
        .fail_on("SP_Consulta_Matricula_Unidad_Academica");
    let app = init_app(bench.state()).await;

    let response = test::call_service(&app, get("/matricula/consulta", CAPTURIST)).await;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = test::read_body_json(response).await;
    assert_eq!(body["rows"], json!([]));
    assert_eq!(body["unidad_academica"], json!("ESCOM"));
    assert_eq!(body["nivel"], json!("Superior"));
    assert_eq!(
        body["mapas"]["modalidades"],
        json!({"Escolarizada": 1, "No Escolarizada": 2})
    );
}
