//! Stored-procedure adapters backed by sqlx.
//!
//! Procedure result sets have no static shape, so they are read through
//! sqlx cursors rather than Diesel. The advisory lock that serialises the
//! finalize decision holds its connection from a separate small pool.

mod advisory_lock;
mod sql;
mod sqlx_executor;

pub use advisory_lock::PgAdvisoryLock;
pub use sqlx_executor::{SqlxProcedureExecutor, connect_procedure_pool};
