//! Builders choosing database adapters or fixtures for each port.

use std::sync::Arc;

use actix_web::web;

use captura::domain::ports::{
    CatalogRepository, FixtureCatalogRepository, FixtureProcedureExecutor,
    FixtureStagingRepository, FixtureUnitStatusRepository, FixtureValidationRepository,
    FixtureWorkflowLock, ProcedureExecutor, StagingRepository, UnitStatusRepository,
    ValidationRepository, WorkflowLock,
};
use captura::inbound::http::state::{HttpState, HttpStatePorts};
use captura::outbound::persistence::{
    DieselCatalogRepository, DieselStagingRepository, DieselUnitStatusRepository,
    DieselValidationRepository,
};
use captura::outbound::procedures::{PgAdvisoryLock, SqlxProcedureExecutor};
use tracing::warn;

use super::ServerConfig;

struct TablePorts {
    catalog: Arc<dyn CatalogRepository>,
    staging: Arc<dyn StagingRepository>,
    unit_status: Arc<dyn UnitStatusRepository>,
    validations: Arc<dyn ValidationRepository>,
}

struct ProcedurePorts {
    executor: Arc<dyn ProcedureExecutor>,
    lock: Arc<dyn WorkflowLock>,
}

fn build_table_ports(config: &ServerConfig) -> TablePorts {
    match &config.db_pool {
        Some(pool) => TablePorts {
            catalog: Arc::new(DieselCatalogRepository::new(pool.clone())),
            staging: Arc::new(DieselStagingRepository::new(pool.clone())),
            unit_status: Arc::new(DieselUnitStatusRepository::new(pool.clone())),
            validations: Arc::new(DieselValidationRepository::new(pool.clone())),
        },
        None => {
            warn!("no database pool configured, serving fixture catalogs and tables");
            TablePorts {
                catalog: Arc::new(FixtureCatalogRepository),
                staging: Arc::new(FixtureStagingRepository),
                unit_status: Arc::new(FixtureUnitStatusRepository),
                validations: Arc::new(FixtureValidationRepository),
            }
        }
    }
}

fn build_procedure_ports(config: &ServerConfig) -> std::io::Result<ProcedurePorts> {
    match &config.procedures {
        Some(backend) => {
            let executor = SqlxProcedureExecutor::new(backend.pool.clone(), backend.schema.clone())
                .map_err(|err| std::io::Error::other(format!("procedure executor: {err}")))?;
            Ok(ProcedurePorts {
                executor: Arc::new(executor),
                lock: Arc::new(PgAdvisoryLock::new(backend.lock_pool.clone())),
            })
        }
        None => {
            warn!("no procedure pool configured, serving fixture procedures");
            Ok(ProcedurePorts {
                executor: Arc::new(FixtureProcedureExecutor),
                lock: Arc::new(FixtureWorkflowLock),
            })
        }
    }
}

/// Build the shared HTTP state from the configured pools.
///
/// # Errors
/// Returns [`std::io::Error`] when the procedure schema is not a plain
/// identifier.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let tables = build_table_ports(config);
    let procedures = build_procedure_ports(config)?;
    Ok(web::Data::new(HttpState::new(
        HttpStatePorts {
            catalog: tables.catalog,
            executor: procedures.executor,
            staging: tables.staging,
            unit_status: tables.unit_status,
            validations: tables.validations,
            lock: procedures.lock,
        },
        config.settings.clone(),
    )))
}
