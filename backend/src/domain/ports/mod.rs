//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod catalog_repository;
mod procedure_executor;
mod staging_repository;
mod unit_status_repository;
mod validation_repository;
mod workflow_lock;

#[cfg(test)]
pub use catalog_repository::MockCatalogRepository;
pub use catalog_repository::{
    CatalogRepository, CatalogRepositoryError, FixtureCatalogRepository,
};
#[cfg(test)]
pub use procedure_executor::MockProcedureExecutor;
pub use procedure_executor::{
    FixtureProcedureExecutor, ProcedureExecutor, ProcedureExecutorError,
};
#[cfg(test)]
pub use staging_repository::MockStagingRepository;
pub use staging_repository::{
    FixtureStagingRepository, StagingRepository, StagingRepositoryError,
};
#[cfg(test)]
pub use unit_status_repository::MockUnitStatusRepository;
pub use unit_status_repository::{
    FixtureUnitStatusRepository, UnitStatusRepository, UnitStatusRepositoryError,
};
#[cfg(test)]
pub use validation_repository::MockValidationRepository;
pub use validation_repository::{
    FixtureValidationRepository, ValidationRepository, ValidationRepositoryError,
};
#[cfg(test)]
pub use workflow_lock::MockWorkflowLock;
pub use workflow_lock::{FixtureWorkflowLock, LockGuard, WorkflowLock, WorkflowLockError, lock_key};
