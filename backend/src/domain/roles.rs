//! Role capabilities, evaluated once per request.

use serde::Serialize;
use utoipa::ToSchema;

const CAPTURIST_ROLE_ID: i32 = 3;
const VALIDATOR_ROLE_IDS: [i32; 5] = [4, 5, 6, 7, 8];

/// What the caller's role allows them to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Enters and submits figures for their own unit.
    Capturist,
    /// Approves or rejects a unit's submitted figures.
    Validator,
    /// Any other role; neither captures nor reviews.
    Unprivileged,
}

impl Role {
    /// Classify a numeric role id from the session.
    ///
    /// # Examples
    /// ```
    /// use captura::domain::Role;
    ///
    /// assert_eq!(Role::from_id(3), Role::Capturist);
    /// assert_eq!(Role::from_id(6), Role::Validator);
    /// assert_eq!(Role::from_id(0), Role::Unprivileged);
    /// ```
    pub fn from_id(id: i32) -> Self {
        if id == CAPTURIST_ROLE_ID {
            Self::Capturist
        } else if VALIDATOR_ROLE_IDS.contains(&id) {
            Self::Validator
        } else {
            Self::Unprivileged
        }
    }

    /// Whether the role may stage and advance capture.
    pub fn can_capture(self) -> bool {
        matches!(self, Self::Capturist)
    }

    /// Whether the role may approve or reject.
    pub fn can_review(self) -> bool {
        matches!(self, Self::Validator)
    }
}
