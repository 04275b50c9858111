//! Reviewer decisions.
//!
//! ```text
//! POST /{formato}/validar_semestre_rol
//! POST /{formato}/rechazar_semestre_rol
//! ```

use actix_web::{HttpResponse, post, web};

use crate::domain::{Actor, FormKind};
use crate::inbound::http::capture::{form_done, legacy_failure};
use crate::inbound::http::capture_dto::{PeriodBody, RejectBody};
use crate::inbound::http::responses::{ApprovalData, RejectionData, ReviewResponse};
use crate::inbound::http::state::HttpState;

/// Approve the unit's capture for a period.
#[utoipa::path(
    post,
    path = "/{formato}/validar_semestre_rol",
    params(("formato" = FormKind, Path, description = "matricula or aprovechamiento")),
    request_body = PeriodBody,
    responses(
        (status = 200, description = "Capture approved, or `{error, success: false}`", body = ReviewResponse<ApprovalData>),
        (status = 403, description = "Only reviewer roles may approve")
    ),
    tags = ["review"],
    operation_id = "validarSemestreRol",
    security(("SessionCookie" = []))
)]
#[post("/validar_semestre_rol")]
pub async fn validar_semestre_rol(
    form: web::Data<FormKind>,
    state: web::Data<HttpState>,
    actor: Actor,
    payload: web::Json<PeriodBody>,
) -> HttpResponse {
    let form = **form;
    let context = match form {
        FormKind::Enrollment => "Error al validar la matrícula",
        FormKind::Performance => "Error al validar el aprovechamiento",
    };
    match state
        .workflow
        .approve(form, &actor, payload.periodo.as_deref())
        .await
    {
        Ok(receipt) => HttpResponse::Ok().json(ReviewResponse {
            success: true,
            mensaje: format!("{} exitosamente", form_done(form, "validad")),
            data: ApprovalData::from(receipt),
        }),
        Err(err) => legacy_failure(context, &err),
    }
}

/// Reject the unit's capture for a period; `motivo` is mandatory.
#[utoipa::path(
    post,
    path = "/{formato}/rechazar_semestre_rol",
    params(("formato" = FormKind, Path, description = "matricula or aprovechamiento")),
    request_body = RejectBody,
    responses(
        (status = 200, description = "Capture rejected, or `{error, success: false}`", body = ReviewResponse<RejectionData>),
        (status = 403, description = "Only reviewer roles may reject")
    ),
    tags = ["review"],
    operation_id = "rechazarSemestreRol",
    security(("SessionCookie" = []))
)]
#[post("/rechazar_semestre_rol")]
pub async fn rechazar_semestre_rol(
    form: web::Data<FormKind>,
    state: web::Data<HttpState>,
    actor: Actor,
    payload: web::Json<RejectBody>,
) -> HttpResponse {
    let form = **form;
    let payload = payload.into_inner();
    let reason = payload.motivo.unwrap_or_default();
    match state
        .workflow
        .reject(form, &actor, payload.periodo.as_deref(), &reason)
        .await
    {
        Ok(receipt) => HttpResponse::Ok().json(ReviewResponse {
            success: true,
            mensaje: form_done(form, "rechazad"),
            data: RejectionData::from(receipt),
        }),
        Err(err) => legacy_failure("Error al rechazar el semestre", &err),
    }
}

#[cfg(test)]
#[path = "review_tests.rs"]
mod tests;
