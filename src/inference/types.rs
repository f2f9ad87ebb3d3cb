//! Wire-level DTOs for the Managed Inference API (`v1beta1`).

use serde::{Deserialize, Serialize};

use crate::wait::StatusClass;

/// Lifecycle status of a deployment.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeploymentStatus {
    /// Initial provisioning in progress.
    Creating,
    /// Model rollout in progress.
    Deploying,
    /// Serving inference requests.
    Ready,
    /// Rollout failed; see the error message.
    Error,
    /// Deletion in progress.
    Deleting,
    /// Administratively locked.
    Locked,
    /// Status not recognized by this crate.
    #[serde(other)]
    UnknownStatus,
}

impl DeploymentStatus {
    /// Maps the API status onto the waiter's classification.
    #[must_use]
    pub const fn classify(self) -> StatusClass {
        match self {
            Self::Ready => StatusClass::Ready,
            Self::Error | Self::Locked => StatusClass::Errored,
            Self::UnknownStatus | Self::Creating | Self::Deploying | Self::Deleting => {
                StatusClass::Pending
            }
        }
    }
}

/// Marker for a publicly reachable endpoint.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EndpointSpecPublic {}

/// Private-network attachment for an endpoint.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EndpointSpecPrivateNetwork {
    /// Private network the endpoint is exposed on.
    pub private_network_id: String,
}

/// Endpoint requested on a deployment.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct EndpointSpec {
    /// Set when the endpoint is publicly reachable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<EndpointSpecPublic>,
    /// Set when the endpoint lives on a private network.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_network: Option<EndpointSpecPrivateNetwork>,
    /// Disables token authentication on the endpoint.
    #[serde(default)]
    pub disable_auth: bool,
}

/// An endpoint as returned by the API.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct DeploymentEndpoint {
    /// Provider identifier.
    pub id: String,
    /// URL serving the model.
    pub url: String,
    /// Present when the endpoint is publicly reachable.
    #[serde(default)]
    pub public: Option<EndpointSpecPublic>,
    /// Present when the endpoint lives on a private network.
    #[serde(default)]
    pub private_network: Option<EndpointSpecPrivateNetwork>,
    /// Whether token authentication is disabled.
    #[serde(default)]
    pub disable_auth: bool,
}

/// A deployment as returned by the API.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Deployment {
    /// Provider identifier.
    pub id: String,
    /// Deployment name.
    pub name: String,
    /// Project owning the deployment.
    pub project_id: String,
    /// Lifecycle status.
    pub status: DeploymentStatus,
    /// Message accompanying the error status.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Node type backing the pool.
    pub node_type: String,
    /// Model served by the deployment.
    pub model_name: String,
    /// Minimum pool size.
    #[serde(default)]
    pub min_size: u32,
    /// Maximum pool size.
    #[serde(default)]
    pub max_size: u32,
    /// Current pool size.
    #[serde(default)]
    pub size: u32,
    /// Tags attached to the deployment.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Endpoints exposing the model.
    #[serde(default)]
    pub endpoints: Vec<DeploymentEndpoint>,
}

/// Deployment creation body.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CreateDeploymentRequest {
    /// Deployment name.
    pub name: String,
    /// Project that will own the deployment.
    pub project_id: String,
    /// Node type backing the pool.
    pub node_type: String,
    /// Model to serve.
    pub model_name: String,
    /// Acceptance of the model's end-user license agreement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept_eula: Option<bool>,
    /// Tags to attach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Minimum pool size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u32>,
    /// Maximum pool size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u32>,
    /// Endpoints to expose.
    pub endpoints: Vec<EndpointSpec>,
}

/// Deployment partial-update body.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct UpdateDeploymentRequest {
    /// Target deployment, carried in the URL rather than the body.
    #[serde(skip_serializing)]
    pub deployment_id: String,
    /// Deployment name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Minimum pool size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u32>,
    /// Maximum pool size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_classify_for_the_waiter() {
        assert_eq!(DeploymentStatus::Ready.classify(), StatusClass::Ready);
        assert_eq!(DeploymentStatus::Locked.classify(), StatusClass::Errored);
        assert_eq!(DeploymentStatus::Deploying.classify(), StatusClass::Pending);
    }

    #[test]
    fn endpoint_spec_omits_absent_networks() {
        let json = serde_json::to_value(EndpointSpec {
            public: Some(EndpointSpecPublic {}),
            private_network: None,
            disable_auth: false,
        })
        .unwrap_or_default();
        assert!(json.get("public").is_some());
        assert!(json.get("private_network").is_none());
    }
}
