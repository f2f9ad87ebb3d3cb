//! DocumentDB private-network endpoints.

mod client;
mod resource;
mod types;

use std::time::Duration;

pub use client::{DocumentDbClient, EndpointApi};
pub use resource::{EndpointResource, EndpointSpecInput, EndpointState, EndpointUpdate};
pub use types::{
    CreateEndpointRequest, Endpoint, EndpointPrivateNetwork, EndpointSpec,
    EndpointSpecPrivateNetwork, Instance, InstanceStatus, IpamConfig, MigrateEndpointRequest,
};

/// Default convergence budget for the owning instance. Endpoints have no
/// lifecycle of their own.
pub const INSTANCE_TIMEOUT: Duration = Duration::from_secs(15 * 60);
