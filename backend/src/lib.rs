//! Capture portal for academic enrollment and performance figures.
//!
//! The [`domain`] models the capture workflow behind ports; [`inbound`]
//! exposes it over HTTP and [`outbound`] implements the ports against
//! PostgreSQL.

pub mod config;
pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
