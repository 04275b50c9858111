//! Reviewer decisions recorded per period, reviewer and form.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::FormKind;

/// A reviewer's approval or rejection.
///
/// At most one record exists per `(period_id, user_id, form)`; a later
/// decision by the same reviewer replaces the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationRecord {
    /// `Id_Periodo`.
    pub period_id: i32,
    /// Reviewer `Id_Usuario`.
    pub user_id: i32,
    /// Form reviewed.
    pub form: FormKind,
    /// `true` for approval, `false` for rejection.
    pub validated: bool,
    /// Approval note or rejection reason.
    pub note: Option<String>,
    /// When the decision was made.
    pub recorded_at: DateTime<Utc>,
}

impl ValidationRecord {
    /// An approval recorded now.
    pub fn approval(period_id: i32, user_id: i32, form: FormKind, note: impl Into<String>) -> Self {
        Self {
            period_id,
            user_id,
            form,
            validated: true,
            note: Some(note.into()),
            recorded_at: Utc::now(),
        }
    }

    /// A rejection recorded now.
    pub fn rejection(period_id: i32, user_id: i32, form: FormKind, reason: impl Into<String>) -> Self {
        Self {
            validated: false,
            ..Self::approval(period_id, user_id, form, reason)
        }
    }
}

/// What a reviewer has done for a period and form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewState {
    /// No live record.
    NotReviewed,
    /// Approved.
    Validated,
    /// Rejected.
    Rejected,
}

impl From<Option<&ValidationRecord>> for ReviewState {
    fn from(record: Option<&ValidationRecord>) -> Self {
        match record {
            None => Self::NotReviewed,
            Some(record) if record.validated => Self::Validated,
            Some(_) => Self::Rejected,
        }
    }
}

const NO_REASON: &str = "Sin especificar motivo";

/// Rejection details shown to the capturist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RejectionNotice {
    /// Reason: the procedure note, else the stored note.
    pub motivo: String,
    /// Reviewer display name.
    pub rechazado_por: String,
    /// `%d/%m/%Y %H:%M`.
    pub fecha: String,
}

impl RejectionNotice {
    /// Combine the latest rejection record with the consult procedure note.
    pub fn new(record: &ValidationRecord, procedure_note: Option<&str>, reviewer: String) -> Self {
        let motivo = procedure_note
            .map(str::trim)
            .filter(|note| !note.is_empty())
            .or_else(|| {
                record
                    .note
                    .as_deref()
                    .map(str::trim)
                    .filter(|note| !note.is_empty())
            })
            .unwrap_or(NO_REASON)
            .to_owned();
        Self {
            motivo,
            rechazado_por: reviewer,
            fecha: record.recorded_at.format("%d/%m/%Y %H:%M").to_string(),
        }
    }
}
