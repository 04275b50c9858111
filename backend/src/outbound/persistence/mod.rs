//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the catalog, staging, unit status and
//! validation ports, backed by `diesel-async` over a `bb8` pool.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types.
//! - **Internal models**: `models.rs` and `schema.rs` never leak into the
//!   domain.
//! - **Strongly typed errors**: every database error maps to the port's
//!   error enum.
//!
//! # Example
//!
//! ```ignore
//! use captura::outbound::persistence::{DbPool, DieselCatalogRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/captura")).await?;
//! let catalog = DieselCatalogRepository::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_catalog_repository;
mod diesel_staging_repository;
mod diesel_unit_status_repository;
mod diesel_validation_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_catalog_repository::DieselCatalogRepository;
pub use diesel_staging_repository::DieselStagingRepository;
pub use diesel_unit_status_repository::DieselUnitStatusRepository;
pub use diesel_validation_repository::DieselValidationRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
