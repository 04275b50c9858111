//! View model for the capture and review pages.
//!
//! ```text
//! GET /{formato}/consulta?periodo=7
//! ```
//!
//! Capturists get the grid catalogs and the latest rejection; reviewers get
//! their own decision for the period. A failed consult degrades to an empty
//! grid so the page still renders.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use serde_json::json;
use tracing::warn;
use utoipa::IntoParams;

use crate::domain::{
    Actor, CatalogEntry, CatalogKind, FormKind, PeriodRef, ReviewState, Role, Row,
};
use crate::inbound::http::capture::semester_labels;
use crate::inbound::http::responses::{
    ConsultaResponse, DefaultPeriod, LightView, RejectionInfo, ViewCatalogs, ViewMode, ViewUser,
};
use crate::inbound::http::state::HttpState;

/// Query string of the view.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ConsultaQuery {
    /// Period id or literal; the configured default when absent.
    pub periodo: Option<String>,
}

struct Snapshot {
    period: PeriodRef,
    unit_code: String,
    level: String,
    rows: Vec<Row>,
    metadata: BTreeMap<String, Vec<String>>,
    note: Option<String>,
}

fn metadata_key(kind: CatalogKind) -> &'static str {
    match kind {
        CatalogKind::AgeGroup => "grupos_edad",
        CatalogKind::AdmissionType => "tipos_ingreso",
        CatalogKind::Modality => "modalidades",
        CatalogKind::Semester => "semestres",
        CatalogKind::Shift => "turnos",
        CatalogKind::PerformanceCategory => "aprovechamientos",
    }
}

/// Keep only labels the consult returned; keep everything when it returned
/// none so a first capture still has choices.
fn shown(label: &str, allowed: Option<&Vec<String>>) -> bool {
    allowed.is_none_or(|labels| labels.is_empty() || labels.iter().any(|l| l == label))
}

async fn snapshot(state: &HttpState, form: FormKind, actor: &Actor, period: Option<&str>) -> Snapshot {
    match state.workflow.consult(form, actor, period).await {
        Ok(view) => Snapshot {
            period: view.period,
            unit_code: view.unit.unit_code,
            level: view.unit.level,
            rows: view.outcome.rows,
            metadata: view.metadata,
            note: view.outcome.note,
        },
        Err(error) => {
            warn!(%error, %form, unit_id = actor.unit_id, "consult failed, rendering empty view");
            let period = state
                .resolver()
                .resolve_period(period, &state.settings().default_period)
                .await;
            let (unit_code, level) = state
                .resolver()
                .resolve_unit_and_level(actor.unit_id, actor.level_id)
                .await
                .unwrap_or_default();
            Snapshot {
                period,
                unit_code: unit_code.unwrap_or_default(),
                level: level.unwrap_or_default(),
                rows: Vec::new(),
                metadata: BTreeMap::new(),
                note: None,
            }
        }
    }
}

async fn catalogs(
    state: &HttpState,
    form: FormKind,
    actor: &Actor,
    metadata: &BTreeMap<String, Vec<String>>,
) -> ViewCatalogs {
    let repo = state.resolver().repository();
    let mut view = ViewCatalogs::default();
    match repo.list_programs(actor.level_id).await {
        Ok(programs) => {
            view.programas = programs
                .into_iter()
                .filter(|program| shown(&program.name, metadata.get("programas")))
                .collect();
        }
        Err(error) => warn!(%error, level_id = actor.level_id, "program catalog unavailable"),
    }
    let kinds = [CatalogKind::Modality, CatalogKind::Semester, CatalogKind::Shift]
        .into_iter()
        .chain(form.category_catalogs().iter().copied());
    for kind in kinds {
        let key = metadata_key(kind);
        let entries: Vec<CatalogEntry> = match repo.list_entries(kind).await {
            Ok(entries) => entries
                .into_iter()
                .filter(|entry| shown(&entry.label, metadata.get(key)))
                .collect(),
            Err(error) => {
                warn!(%error, ?kind, "catalog unavailable");
                Vec::new()
            }
        };
        view.mapas.insert(
            key.to_owned(),
            entries
                .iter()
                .map(|entry| (entry.label.clone(), entry.id))
                .collect(),
        );
        view.catalogos.insert(key.to_owned(), entries);
    }
    view
}

async fn mode(state: &HttpState, form: FormKind, actor: &Actor, snapshot: &Snapshot) -> ViewMode {
    if actor.role() == Role::Capturist {
        let notice = state
            .workflow
            .rejection_notice(form, snapshot.period.id, snapshot.note.as_deref())
            .await
            .unwrap_or_else(|error| {
                warn!(%error, %form, "rejection lookup failed");
                None
            });
        return ViewMode::Capture {
            rechazo_info: notice.map(|notice| {
                RejectionInfo::new(
                    notice,
                    snapshot.period.literal.clone(),
                    snapshot.unit_code.clone(),
                )
            }),
        };
    }
    let review = state
        .workflow
        .review_state(form, snapshot.period.id, actor.user_id)
        .await
        .unwrap_or_else(|error| {
            warn!(%error, %form, "review state lookup failed");
            ReviewState::NotReviewed
        });
    ViewMode::Review {
        usuario_ya_valido: review == ReviewState::Validated,
        usuario_ya_rechazo: review == ReviewState::Rejected,
    }
}

/// Capture or review view model for the session's unit.
#[utoipa::path(
    get,
    path = "/{formato}/consulta",
    params(
        ("formato" = FormKind, Path, description = "matricula or aprovechamiento"),
        ConsultaQuery
    ),
    responses(
        (status = 200, description = "View model", body = ConsultaResponse),
        (status = 403, description = "Role has no access to capture or review")
    ),
    tags = ["views"],
    operation_id = "consulta",
    security(("SessionCookie" = []))
)]
#[get("/consulta")]
pub async fn consulta(
    form: web::Data<FormKind>,
    state: web::Data<HttpState>,
    actor: Actor,
    query: web::Query<ConsultaQuery>,
) -> HttpResponse {
    let form = **form;
    let role = actor.role();
    if !role.can_capture() && !role.can_review() {
        warn!(role_id = actor.role_id, %form, "view denied for role");
        return HttpResponse::Forbidden().json(json!({
            "error": format!(
                "Acceso denegado: Su rol ({}) no tiene permisos para acceder a esta funcionalidad.",
                actor.role_name
            ),
        }));
    }

    let snapshot = snapshot(&state, form, &actor, query.periodo.as_deref()).await;
    let catalogs = catalogs(&state, form, &actor, &snapshot.metadata).await;
    let semestres_map = semester_labels(&state).await.unwrap_or_else(|error| {
        warn!(%error, "semester catalog unavailable");
        BTreeMap::new()
    });
    let semaforo_estados = match state.resolver().repository().list_status_lights().await {
        Ok(lights) => lights.into_iter().map(LightView::from).collect(),
        Err(error) => {
            warn!(%error, "status lights unavailable");
            Vec::new()
        }
    };
    let modo = mode(&state, form, &actor, &snapshot).await;

    HttpResponse::Ok().json(ConsultaResponse {
        formato: form,
        modo,
        usuario: ViewUser {
            nombre: actor.full_name(),
            rol: actor.role_name.clone(),
            id_rol: actor.role_id,
            login: actor.login.clone(),
        },
        unidad_academica: snapshot.unit_code,
        nivel: snapshot.level,
        periodo_default: DefaultPeriod {
            id: snapshot.period.id,
            literal: snapshot.period.literal,
        },
        rows: snapshot.rows,
        metadata: snapshot.metadata,
        catalogs,
        semestres_map,
        semaforo_estados,
    })
}

#[cfg(test)]
#[path = "consulta_tests.rs"]
mod tests;
