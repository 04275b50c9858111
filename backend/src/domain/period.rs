//! Academic periods and the portal-wide settings that default them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// An academic period: the catalog id plus the literal label procedures
/// expect (e.g. `2025-2026/1`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PeriodRef {
    /// Catalog identifier used by the status and validation tables.
    pub id: i32,
    /// Literal label passed as `@PPeriodo`.
    pub literal: String,
}

impl PeriodRef {
    /// Build a period reference.
    pub fn new(id: i32, literal: impl Into<String>) -> Self {
        Self {
            id,
            literal: literal.into(),
        }
    }
}

/// How a raw period input should be looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodInput<'a> {
    /// Nothing usable was supplied.
    Absent,
    /// A numeric id such as `"7"`.
    Id(i32),
    /// A literal label such as `"2025-2026/1"`.
    Literal(&'a str),
}

impl<'a> PeriodInput<'a> {
    /// Classify a raw request value.
    ///
    /// Digit-only strings that fit an `i32` are ids. Longer digit strings
    /// are literals, which the catalog lookup then fails to find.
    ///
    /// # Examples
    /// ```
    /// use captura::domain::PeriodInput;
    ///
    /// assert_eq!(PeriodInput::parse(Some("7")), PeriodInput::Id(7));
    /// assert_eq!(PeriodInput::parse(Some(" ")), PeriodInput::Absent);
    /// assert_eq!(
    ///     PeriodInput::parse(Some("2025-2026/1")),
    ///     PeriodInput::Literal("2025-2026/1")
    /// );
    /// ```
    pub fn parse(raw: Option<&'a str>) -> Self {
        let Some(value) = raw.map(str::trim).filter(|v| !v.is_empty()) else {
            return Self::Absent;
        };
        let digits_only = value.bytes().all(|b| b.is_ascii_digit());
        match value.parse() {
            Ok(id) if digits_only => Self::Id(id),
            _ => Self::Literal(value),
        }
    }
}

/// Explicit configuration threaded through the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalSettings {
    /// Period used when a request supplies none or an unknown one.
    pub default_period: PeriodRef,
}

impl PortalSettings {
    /// Build settings around a default period.
    pub fn new(default_period: PeriodRef) -> Self {
        Self { default_period }
    }
}
