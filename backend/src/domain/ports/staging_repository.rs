//! Port for the per-form capture staging tables.

use async_trait::async_trait;

use crate::domain::{FormKind, StagedFigure};

use super::define_port_error;

define_port_error! {
    /// Errors raised by staging adapters.
    pub enum StagingRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "staging repository connection failed: {message}",
        /// Query failed during execution; the batch was rolled back.
        Query { message: String } =>
            "staging repository query failed: {message}",
    }
}

/// Insert-or-update storage for staged figures.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StagingRepository: Send + Sync {
    /// Merge figures by natural key inside one transaction.
    ///
    /// Each figure lands in the table of its dimension's form. A repeated
    /// key overwrites the stored count. Returns the number merged.
    async fn upsert_batch(&self, figures: &[StagedFigure]) -> Result<usize, StagingRepositoryError>;

    /// Rows currently staged for a form.
    async fn count(&self, form: FormKind) -> Result<u64, StagingRepositoryError>;

    /// Rows staged for one period and unit.
    async fn count_for(
        &self,
        form: FormKind,
        period: &str,
        unit_code: &str,
    ) -> Result<u64, StagingRepositoryError>;

    /// Every row staged for a form, oldest first.
    async fn list(&self, form: FormKind) -> Result<Vec<StagedFigure>, StagingRepositoryError>;

    /// Remove every staged row of a form. Returns the rows removed.
    async fn truncate(&self, form: FormKind) -> Result<u64, StagingRepositoryError>;
}

/// Fixture staging table that accepts writes and never holds rows.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureStagingRepository;

#[async_trait]
impl StagingRepository for FixtureStagingRepository {
    async fn upsert_batch(&self, figures: &[StagedFigure]) -> Result<usize, StagingRepositoryError> {
        Ok(figures.len())
    }

    async fn count(&self, _form: FormKind) -> Result<u64, StagingRepositoryError> {
        Ok(0)
    }

    async fn count_for(
        &self,
        _form: FormKind,
        _period: &str,
        _unit_code: &str,
    ) -> Result<u64, StagingRepositoryError> {
        Ok(0)
    }

    async fn list(&self, _form: FormKind) -> Result<Vec<StagedFigure>, StagingRepositoryError> {
        Ok(Vec::new())
    }

    async fn truncate(&self, _form: FormKind) -> Result<u64, StagingRepositoryError> {
        Ok(0)
    }
}
