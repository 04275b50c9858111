//! Typed failures for capture and workflow operations.
//!
//! Each variant corresponds to one outcome callers must tell apart:
//! a client or session problem detected before any side effect
//! ([`CaptureError::Resolution`], [`CaptureError::MissingParameter`],
//! [`CaptureError::Forbidden`]) versus a side effect whose outcome is unknown
//! ([`CaptureError::ProcedureExecution`], [`CaptureError::Persistence`]).
//! Rows excluded by the admission rule are not errors; they are counted in
//! [`crate::domain::StagingSummary`].

use serde_json::json;

use super::Error;

/// Failure raised by capture staging or the workflow orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    /// A catalog id from the session or body has no literal name.
    #[error("{message}")]
    Resolution {
        /// Name of the field that failed to resolve.
        field: &'static str,
        /// Human readable explanation.
        message: String,
    },
    /// One or more mandatory request fields are absent.
    #[error("{message}")]
    MissingParameter {
        /// Names of the missing fields.
        fields: Vec<&'static str>,
        /// Human readable explanation.
        message: String,
    },
    /// The stored procedure call failed; its effect must be re-queried.
    #[error("{message}")]
    ProcedureExecution {
        /// Procedure that was invoked.
        procedure: String,
        /// Driver or database message.
        message: String,
    },
    /// The caller's role lacks the capability for this action.
    #[error("{message}")]
    Forbidden {
        /// Human readable explanation.
        message: String,
    },
    /// A staging, status, or validation table operation failed.
    #[error("{message}")]
    Persistence {
        /// Adapter message.
        message: String,
    },
}

impl CaptureError {
    /// Build a resolution failure for `field`.
    pub fn resolution(field: &'static str, message: impl Into<String>) -> Self {
        Self::Resolution {
            field,
            message: message.into(),
        }
    }

    /// Build a missing-parameter failure listing every absent field.
    pub fn missing(fields: Vec<&'static str>, message: impl Into<String>) -> Self {
        Self::MissingParameter {
            fields,
            message: message.into(),
        }
    }

    /// Build a procedure failure for `procedure`.
    pub fn procedure(procedure: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ProcedureExecution {
            procedure: procedure.into(),
            message: message.into(),
        }
    }

    /// Build a capability failure.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
        }
    }

    /// Build a persistence failure.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::Persistence {
            message: message.into(),
        }
    }

    /// True when the failure was detected before any side effect ran.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Resolution { .. } | Self::MissingParameter { .. } | Self::Forbidden { .. }
        )
    }
}

impl From<CaptureError> for Error {
    fn from(value: CaptureError) -> Self {
        match value {
            CaptureError::Resolution { field, message } => {
                Error::invalid_request(message).with_details(json!({
                    "field": field,
                    "code": "unresolved_catalog_id",
                }))
            }
            CaptureError::MissingParameter { fields, message } => {
                Error::invalid_request(message).with_details(json!({
                    "missing": fields,
                    "code": "missing_parameter",
                }))
            }
            CaptureError::ProcedureExecution { procedure, message } => {
                Error::internal(message).with_details(json!({ "procedure": procedure }))
            }
            CaptureError::Forbidden { message } => Error::forbidden(message),
            CaptureError::Persistence { message } => Error::service_unavailable(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    #[case(CaptureError::resolution("programa", "x"), true, ErrorCode::InvalidRequest)]
    #[case(CaptureError::missing(vec!["motivo"], "x"), true, ErrorCode::InvalidRequest)]
    #[case(CaptureError::forbidden("x"), true, ErrorCode::Forbidden)]
    #[case(CaptureError::procedure("SP_X", "x"), false, ErrorCode::InternalError)]
    #[case(CaptureError::persistence("x"), false, ErrorCode::ServiceUnavailable)]
    fn classifies_and_maps(
        #[case] error: CaptureError,
        #[case] client: bool,
        #[case] code: ErrorCode,
    ) {
        assert_eq!(error.is_client_error(), client);
        assert_eq!(Error::from(error).code(), code);
    }

    #[test]
    fn missing_parameter_lists_fields_in_details() {
        let error = Error::from(CaptureError::missing(
            vec!["programa", "turno"],
            "Faltan parámetros obligatorios",
        ));
        let details = error.details().expect("details present");
        assert_eq!(details["missing"], json!(["programa", "turno"]));
    }
}
