//! Core types, configuration, and errors for RustCAS.
//!
//! This crate holds the pieces shared by the integrity and authentication
//! crates: the client configuration ([`CasConfig`]), the region and endpoint
//! host types, and the umbrella [`CasError`] that collaborators use when they
//! combine hashing and signing into one upload call.

mod config;
mod error;
mod types;

pub use config::CasConfig;
pub use error::{CasError, CasResult};
pub use types::{CasHost, CasRegion};
