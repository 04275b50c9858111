//! Status lights and the unit finalize decision.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;

use crate::domain::Row;

/// Tri-state status light.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Semaforo {
    /// 1: nothing captured.
    NotStarted,
    /// 2: capture open.
    InCapture,
    /// 3: closed.
    Completed,
}

impl Semaforo {
    /// Map a stored light id; anything outside 1 to 3 is `None`.
    pub fn from_value(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::NotStarted),
            2 => Some(Self::InCapture),
            3 => Some(Self::Completed),
            _ => None,
        }
    }

    /// Stored light id.
    pub fn value(self) -> i32 {
        match self {
            Self::NotStarted => 1,
            Self::InCapture => 2,
            Self::Completed => 3,
        }
    }
}

const STATUS_COLUMNS: &[&str] = &["Id_Semaforo", "id_semaforo", "ID_Semaforo"];

/// Status light carried by a consult row, if any.
pub fn row_status(row: &Row) -> Option<Semaforo> {
    STATUS_COLUMNS
        .iter()
        .find_map(|column| row.get(*column))
        .and_then(|value| match value {
            Value::Number(number) => number.as_i64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        })
        .and_then(Semaforo::from_value)
}

/// Whether every semester in the consult rows is complete, per semester.
///
/// Rows are grouped by `Semestre`; a semester is complete only when each of
/// its rows reports [`Semaforo::Completed`]. Rows without a semester label
/// are ignored.
pub fn semester_completion(rows: &[Row]) -> BTreeMap<String, bool> {
    let mut semesters: BTreeMap<String, bool> = BTreeMap::new();
    for row in rows {
        let Some(semester) = row
            .get("Semestre")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|label| !label.is_empty())
        else {
            continue;
        };
        let complete = row_status(row) == Some(Semaforo::Completed);
        semesters
            .entry(semester.to_owned())
            .and_modify(|all| *all &= complete)
            .or_insert(complete);
    }
    semesters
}

/// Outcome of the finalize check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum FinalizeDecision {
    /// Unit in capture and every semester complete: run finalize.
    Finalize,
    /// Unit already complete; finalize already ran.
    AlreadyFinalized,
    /// At least one semester is still open.
    SemestersPending {
        /// Labels of the open semesters, sorted.
        pending: Vec<String>,
    },
    /// The consult returned no semesters at all.
    NoSemesters,
    /// The unit light is missing or not a known value.
    UnexpectedUnitStatus {
        /// Raw stored value.
        status: Option<i32>,
    },
}

impl FinalizeDecision {
    /// Whether finalize should run.
    pub fn should_finalize(&self) -> bool {
        matches!(self, Self::Finalize)
    }
}

/// Decide whether to finalize a unit.
///
/// Finalize runs only when the unit light is [`Semaforo::InCapture`] and
/// every semester is complete. A completed unit is never finalized again.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use captura::domain::{FinalizeDecision, decide_finalize};
///
/// let semesters = BTreeMap::from([("Primer".to_owned(), true), ("Segundo".to_owned(), false)]);
/// assert!(!decide_finalize(Some(2), &semesters).should_finalize());
/// assert_eq!(decide_finalize(Some(3), &semesters), FinalizeDecision::AlreadyFinalized);
/// ```
pub fn decide_finalize(unit_status: Option<i32>, semesters: &BTreeMap<String, bool>) -> FinalizeDecision {
    match unit_status.map(i64::from).and_then(Semaforo::from_value) {
        Some(Semaforo::Completed) => FinalizeDecision::AlreadyFinalized,
        Some(Semaforo::InCapture) => {
            if semesters.is_empty() {
                return FinalizeDecision::NoSemesters;
            }
            let pending: Vec<String> = semesters
                .iter()
                .filter(|(_, complete)| !**complete)
                .map(|(label, _)| label.clone())
                .collect();
            if pending.is_empty() {
                FinalizeDecision::Finalize
            } else {
                FinalizeDecision::SemestersPending { pending }
            }
        }
        Some(Semaforo::NotStarted) | None => FinalizeDecision::UnexpectedUnitStatus {
            status: unit_status,
        },
    }
}
