//! HTTP inbound adapter exposing the capture portal.
//!
//! Every capture route lives under a form scope (`/matricula`,
//! `/aprovechamiento`) built by [`capture::form_scope`]; probes sit at the
//! root.

pub mod capture;
pub mod capture_dto;
pub mod consulta;
pub mod error;
pub mod health;
pub mod responses;
pub mod review;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;

pub use error::ApiResult;
