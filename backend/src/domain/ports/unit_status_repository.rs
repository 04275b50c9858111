//! Port for the unit-level status light.

use async_trait::async_trait;

use crate::domain::FormKind;

use super::define_port_error;

define_port_error! {
    /// Errors raised by unit status adapters.
    pub enum UnitStatusRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "unit status repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "unit status repository query failed: {message}",
    }
}

/// Reads `Semaforo_Unidad_Academica`. Procedures own every write.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UnitStatusRepository: Send + Sync {
    /// Raw `Id_Semaforo` for a period, unit and form, if a row exists.
    async fn find_unit_status(
        &self,
        period_id: i32,
        unit_id: i32,
        form: FormKind,
    ) -> Result<Option<i32>, UnitStatusRepositoryError>;
}

/// Fixture reporting every unit as in capture.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUnitStatusRepository;

#[async_trait]
impl UnitStatusRepository for FixtureUnitStatusRepository {
    async fn find_unit_status(
        &self,
        _period_id: i32,
        _unit_id: i32,
        _form: FormKind,
    ) -> Result<Option<i32>, UnitStatusRepositoryError> {
        Ok(Some(2))
    }
}
