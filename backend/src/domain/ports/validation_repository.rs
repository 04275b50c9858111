//! Port for reviewer decisions.

use async_trait::async_trait;

use crate::domain::{FormKind, ValidationRecord};

use super::define_port_error;

define_port_error! {
    /// Errors raised by validation record adapters.
    pub enum ValidationRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "validation repository connection failed: {message}",
        /// Query failed during execution.
        Query { message: String } =>
            "validation repository query failed: {message}",
    }
}

/// Storage for [`ValidationRecord`]s keyed by period, reviewer and form.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ValidationRepository: Send + Sync {
    /// The reviewer's live record, if any.
    async fn find(
        &self,
        period_id: i32,
        user_id: i32,
        form: FormKind,
    ) -> Result<Option<ValidationRecord>, ValidationRepositoryError>;

    /// Most recent rejection for a period and form.
    async fn latest_rejection(
        &self,
        period_id: i32,
        form: FormKind,
    ) -> Result<Option<ValidationRecord>, ValidationRepositoryError>;

    /// Insert or replace the record for its key.
    async fn upsert(&self, record: &ValidationRecord) -> Result<(), ValidationRepositoryError>;

    /// Delete every record for the period and form, then insert `record`,
    /// in one transaction.
    async fn replace_all(&self, record: &ValidationRecord) -> Result<(), ValidationRepositoryError>;

    /// Delete every record for a period and form. Returns the rows removed.
    async fn clear(&self, period_id: i32, form: FormKind) -> Result<u64, ValidationRepositoryError>;
}

/// Fixture with no stored decisions.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureValidationRepository;

#[async_trait]
impl ValidationRepository for FixtureValidationRepository {
    async fn find(
        &self,
        _period_id: i32,
        _user_id: i32,
        _form: FormKind,
    ) -> Result<Option<ValidationRecord>, ValidationRepositoryError> {
        Ok(None)
    }

    async fn latest_rejection(
        &self,
        _period_id: i32,
        _form: FormKind,
    ) -> Result<Option<ValidationRecord>, ValidationRepositoryError> {
        Ok(None)
    }

    async fn upsert(&self, _record: &ValidationRecord) -> Result<(), ValidationRepositoryError> {
        Ok(())
    }

    async fn replace_all(&self, _record: &ValidationRecord) -> Result<(), ValidationRepositoryError> {
        Ok(())
    }

    async fn clear(&self, _period_id: i32, _form: FormKind) -> Result<u64, ValidationRepositoryError> {
        Ok(0)
    }
}
