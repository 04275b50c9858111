//! Capture workflow: shift validation, semester consolidation, unit
//! finalization and reviewer decisions.
//!
//! Status lights live in tables the procedures own. The orchestrator only
//! invokes procedures in order and re-reads state before deciding to
//! finalize a unit.

mod decision;
mod service;

pub use decision::{FinalizeDecision, Semaforo, decide_finalize, row_status, semester_completion};
pub use service::{
    CommitOutcome, CommitReceipt, ConsultView, ReviewReceipt, SemesterConsolidation,
    SemesterRequest, ShiftRequest, ShiftValidation, WorkflowPorts, WorkflowService,
};
