//! Wire-level DTOs for the DocumentDB API (`v1beta1`).

use serde::{Deserialize, Serialize};

use crate::wait::StatusClass;

/// Lifecycle status of a DocumentDB instance.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceStatus {
    /// Serving queries.
    Ready,
    /// Initial provisioning in progress.
    Provisioning,
    /// Settings rollout in progress.
    Configuring,
    /// Deletion in progress.
    Deleting,
    /// Provisioning failed.
    Error,
    /// Self-repair in progress.
    Autohealing,
    /// Administratively locked.
    Locked,
    /// First boot in progress.
    Initializing,
    /// Storage exhausted; writes are refused.
    DiskFull,
    /// Backup in progress.
    Backuping,
    /// Snapshot in progress.
    Snapshotting,
    /// Restart in progress.
    Restarting,
    /// Status not recognized by this crate.
    #[serde(other)]
    Unknown,
}

impl InstanceStatus {
    /// Maps the API status onto the waiter's classification.
    #[must_use]
    pub const fn classify(self) -> StatusClass {
        match self {
            Self::Ready => StatusClass::Ready,
            Self::Error | Self::Locked | Self::DiskFull => StatusClass::Errored,
            Self::Unknown
            | Self::Provisioning
            | Self::Configuring
            | Self::Deleting
            | Self::Autohealing
            | Self::Initializing
            | Self::Backuping
            | Self::Snapshotting
            | Self::Restarting => StatusClass::Pending,
        }
    }
}

/// A DocumentDB instance, fetched only to gate endpoint operations on its
/// convergence.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Instance {
    /// Provider identifier.
    pub id: String,
    /// Instance name.
    #[serde(default)]
    pub name: String,
    /// Lifecycle status.
    pub status: InstanceStatus,
}

/// Private-network details of an endpoint response.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct EndpointPrivateNetwork {
    /// Private network the endpoint is exposed on.
    pub private_network_id: String,
    /// Static service address inside the subnet, CIDR notation.
    #[serde(default)]
    pub service_ip: Option<String>,
    /// Zone of the private network.
    #[serde(default)]
    pub zone: Option<String>,
}

/// An endpoint as returned by the API.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Endpoint {
    /// Provider identifier.
    pub id: String,
    /// Address of the endpoint.
    #[serde(default)]
    pub ip: Option<String>,
    /// Port of the endpoint.
    #[serde(default)]
    pub port: u16,
    /// Endpoint name.
    #[serde(default)]
    pub name: Option<String>,
    /// Hostname of the endpoint.
    #[serde(default)]
    pub hostname: Option<String>,
    /// Private-network details.
    #[serde(default)]
    pub private_network: Option<EndpointPrivateNetwork>,
}

/// IPAM-managed address configuration: the API picks the address.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct IpamConfig {}

/// Private-network slot of an endpoint creation.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EndpointSpecPrivateNetwork {
    /// Private network to expose the endpoint on.
    pub private_network_id: String,
    /// Static service address, CIDR notation. Mutually exclusive with
    /// `ipam_config`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_ip: Option<String>,
    /// IPAM-managed addressing. Mutually exclusive with `service_ip`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipam_config: Option<IpamConfig>,
}

/// Endpoint specification submitted on creation.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct EndpointSpec {
    /// Private-network attachment.
    pub private_network: EndpointSpecPrivateNetwork,
}

/// Endpoint creation body.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CreateEndpointRequest {
    /// Instance the endpoint is attached to.
    pub instance_id: String,
    /// Endpoint specification.
    pub endpoint_spec: EndpointSpec,
}

/// Endpoint migration body, moving the endpoint to another instance.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct MigrateEndpointRequest {
    /// Target endpoint, carried in the URL rather than the body.
    #[serde(skip_serializing)]
    pub endpoint_id: String,
    /// Instance the endpoint moves to.
    pub instance_id: String,
}
