//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes. Most capture endpoints answer workflow failures with a 200
//! `{error, success: false}` body instead; see [`failure_body`].

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::{Value, json};
use tracing::{error, warn};

use crate::domain::{CaptureError, Error, ErrorCode, TRACE_ID_HEADER};

pub use crate::domain::ApiResult;

const REDACTED: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Payload safe to hand to the browser. Procedure and driver messages stay
/// in the logs; only the trace id survives.
fn client_payload(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    match error.trace_id() {
        Some(id) => Error::internal(REDACTED).with_trace_id(id),
        None => Error::internal(REDACTED),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(client_payload(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(REDACTED)
    }
}

/// Legacy failure body: `{error, success: false}` served with HTTP 200.
///
/// Callers of the capture endpoints check the `success`/`error` fields rather
/// than the status code. Client-side failures carry their own message and are
/// logged at `warn`; failures whose effect is unknown are prefixed with
/// `context` and logged at `error`.
pub fn failure_body(context: &str, err: &CaptureError) -> Value {
    let message = if err.is_client_error() {
        warn!(error = %err, context, "capture request rejected");
        err.to_string()
    } else {
        error!(error = ?err, context, "capture request failed");
        format!("{context}: {err}")
    };
    json!({
        "success": false,
        "error": message,
    })
}

/// Failure body for the legacy endpoints that only ever report `error`.
pub fn bare_failure_body(context: &str, err: &CaptureError) -> Value {
    let mut body = failure_body(context, err);
    if let Some(object) = body.as_object_mut() {
        object.remove("success");
    }
    body
}
