//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain services and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CatalogRepository, ProcedureExecutor, StagingRepository, UnitStatusRepository,
    ValidationRepository, WorkflowLock,
};
use crate::domain::{
    CaptureStagingService, CatalogResolver, PortalSettings, WorkflowPorts, WorkflowService,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    /// Catalog lookups.
    pub catalog: Arc<dyn CatalogRepository>,
    /// Stored-procedure execution.
    pub executor: Arc<dyn ProcedureExecutor>,
    /// Staging tables.
    pub staging: Arc<dyn StagingRepository>,
    /// Unit status lights.
    pub unit_status: Arc<dyn UnitStatusRepository>,
    /// Reviewer decisions.
    pub validations: Arc<dyn ValidationRepository>,
    /// Finalize lock.
    pub lock: Arc<dyn WorkflowLock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Procedure-driven workflow.
    pub workflow: Arc<WorkflowService>,
    /// Submission staging.
    pub staging: Arc<CaptureStagingService>,
}

impl HttpState {
    /// Build both services over the same ports and settings.
    pub fn new(ports: HttpStatePorts, settings: PortalSettings) -> Self {
        let staging = CaptureStagingService::new(
            CatalogResolver::new(ports.catalog.clone()),
            ports.staging.clone(),
            settings.clone(),
        );
        let workflow = WorkflowService::new(
            WorkflowPorts {
                catalog: ports.catalog,
                executor: ports.executor,
                staging: ports.staging,
                unit_status: ports.unit_status,
                validations: ports.validations,
                lock: ports.lock,
            },
            settings,
        );
        Self {
            workflow: Arc::new(workflow),
            staging: Arc::new(staging),
        }
    }

    /// Catalog resolver shared by views.
    pub fn resolver(&self) -> &CatalogResolver {
        self.workflow.resolver()
    }

    /// Portal settings.
    pub fn settings(&self) -> &PortalSettings {
        self.workflow.settings()
    }
}
