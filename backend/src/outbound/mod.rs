//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: Diesel repositories for catalogs, staging, unit status
//!   and reviewer decisions.
//! - **procedures**: sqlx adapters for stored-procedure calls and the
//!   workflow advisory lock.
//!
//! Adapters translate between domain types and database representations.
//! They contain no business logic.

pub mod persistence;
pub mod procedures;
