//! Declarative CRUD glue for Scaleway managed resources.
//!
//! For each managed resource family — serverless containers with their
//! triggers and custom domains, DocumentDB private-network endpoints,
//! inference deployments, Apple silicon servers — the crate turns a
//! declared configuration into create/read/update/delete calls against
//! the Scaleway API and turns API responses back into recorded state.
//!
//! Every operation blocks until the remote resource converges: the flow
//! is builder → API call → [`wait::wait_for_converged`] → flattener.
//! Partial updates are driven by explicit [`delta::Delta`] fields, so a
//! request never carries a field the engine did not mark as changed.

pub mod api;
pub mod applesilicon;
pub mod config;
pub mod containers;
pub mod delta;
pub mod diagnostics;
pub mod documentdb;
pub mod error;
pub mod inference;
mod naming;
pub mod retry;
pub mod wait;

pub use api::locality::{LocalityError, Region, RegionalId, Zone, ZonalId, expand_id};
pub use api::{ApiError, ApiFuture, DEFAULT_API_ROOT, ResponseError};
pub use config::{ConfigError, ProviderConfig};
pub use delta::Delta;
pub use diagnostics::{Diagnostic, Diagnostics, IntoDiagnostics, Severity};
pub use error::ResourceError;
pub use retry::retry_while_transient;
pub use wait::{
    DEFAULT_POLL_INTERVAL, StatusClass, Timeouts, WaitError, WaitOptions, wait_for_converged,
};
