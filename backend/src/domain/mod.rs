//! Domain primitives, services and ports.
//!
//! Purpose: model the capture workflow independently of HTTP and storage.
//! Sessions become an [`Actor`], catalog ids become literals through the
//! [`CatalogResolver`], procedures run through the [`ProcedureGateway`], and
//! the [`WorkflowService`] sequences them.
//!
//! Public surface:
//! - Error / ErrorCode: API error payload and stable identifiers.
//! - CaptureError: typed workflow failures.
//! - CaptureStagingService and WorkflowService: the driving services.

mod actor;
mod capture_error;
mod catalog;
mod diagnosis;
pub mod error;
mod forms;
mod metadata;
mod period;
pub mod ports;
mod procedure;
mod review;
mod roles;
mod staging;
mod trace_id;
mod workflow;

#[cfg(test)]
pub(crate) mod fakes;

pub use self::actor::Actor;
pub use self::capture_error::CaptureError;
pub use self::catalog::{
    CatalogEntry, CatalogKind, CatalogResolver, ProgramInfo, StatusLight, UnitContext,
};
pub use self::diagnosis::{JoinMatch, RecordDiagnosis, StagingDiagnosis, StagingJoin};
pub use self::error::{Error, ErrorCode};
pub use self::forms::{FormKind, FormProcedures};
pub use self::metadata::{blank_nulls, extract_unique};
pub use self::period::{PeriodInput, PeriodRef, PortalSettings};
pub use self::procedure::{
    CellValue, ParamValue, ProcedureCall, ProcedureGateway, ProcedureOutcome, ProcedureParam,
    RawResultSet, Row, RowBatch, select_outcome,
};
pub use self::review::{RejectionNotice, ReviewState, ValidationRecord};
pub use self::roles::Role;
pub use self::staging::{
    AdmissionType, CaptureEntry, CaptureStagingService, CaptureSubmission, Dimension,
    StagedFigure, StagingKey, StagingSummary, last_per_key, semester_number, sex_label,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::workflow::{
    CommitOutcome, CommitReceipt, ConsultView, FinalizeDecision, ReviewReceipt, Semaforo,
    SemesterConsolidation, SemesterRequest, ShiftRequest, ShiftValidation, WorkflowPorts,
    WorkflowService, decide_finalize, row_status, semester_completion,
};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use captura::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::forbidden("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
