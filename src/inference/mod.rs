//! Managed Inference deployments.

mod client;
mod resource;
mod types;

use std::time::Duration;

pub use client::{DeploymentApi, InferenceClient};
pub use resource::{DeploymentResource, DeploymentSpec, DeploymentState, DeploymentUpdate};
pub use types::{
    CreateDeploymentRequest, Deployment, DeploymentEndpoint, DeploymentStatus, EndpointSpec,
    EndpointSpecPrivateNetwork, EndpointSpecPublic, UpdateDeploymentRequest,
};

/// Default convergence budget for deployments. Model rollouts are the
/// slowest operation this crate waits on.
pub const DEPLOYMENT_TIMEOUT: Duration = Duration::from_secs(80 * 60);
