//! Wire-level DTOs for the Apple silicon API (`v1alpha1`).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::wait::StatusClass;

/// Lifecycle status of an Apple silicon server.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerStatus {
    /// Hardware boot in progress.
    Starting,
    /// Reachable and ready for use.
    Ready,
    /// Provisioning failed.
    Error,
    /// Reboot in progress.
    Rebooting,
    /// OS update in progress.
    Updating,
    /// Lock in progress.
    Locking,
    /// Administratively locked.
    Locked,
    /// Reinstallation in progress.
    Reinstalling,
    /// Temporarily unavailable.
    Busy,
    /// Status not recognized by this crate.
    #[serde(other)]
    UnknownStatus,
}

impl ServerStatus {
    /// Maps the API status onto the waiter's classification.
    #[must_use]
    pub const fn classify(self) -> StatusClass {
        match self {
            Self::Ready => StatusClass::Ready,
            Self::Error | Self::Locked => StatusClass::Errored,
            Self::UnknownStatus
            | Self::Starting
            | Self::Rebooting
            | Self::Updating
            | Self::Locking
            | Self::Reinstalling
            | Self::Busy => StatusClass::Pending,
        }
    }
}

/// An Apple silicon server as returned by the API.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Server {
    /// Provider identifier.
    pub id: String,
    /// Server name.
    pub name: String,
    /// Commercial type (for example `M2-M`).
    #[serde(rename = "type")]
    pub server_type: String,
    /// Lifecycle status.
    pub status: ServerStatus,
    /// Project owning the server.
    pub project_id: String,
    /// Public address of the server.
    #[serde(default)]
    pub ip: Option<String>,
    /// VNC console URL.
    #[serde(default)]
    pub vnc_url: Option<String>,
    /// VPC attachment status reported by the API.
    #[serde(default)]
    pub vpc_status: Option<String>,
    /// Creation timestamp, RFC 3339.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last-update timestamp, RFC 3339.
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Server creation body.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CreateServerRequest {
    /// Server name.
    pub name: String,
    /// Project that will own the server.
    pub project_id: String,
    /// Commercial type to provision.
    #[serde(rename = "type")]
    pub server_type: String,
    /// Attaches the server to the VPC; required for private networks.
    pub enable_vpc: bool,
}

/// Server partial-update body.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct UpdateServerRequest {
    /// Target server, carried in the URL rather than the body.
    #[serde(skip_serializing)]
    pub server_id: String,
    /// Server name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Attaches or detaches the server from the VPC.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_vpc: Option<bool>,
}

/// A private-network attachment as returned by the API.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ServerPrivateNetwork {
    /// Private network attached to the server.
    pub private_network_id: String,
    /// IPAM addresses booked for the attachment.
    #[serde(default)]
    pub ipam_ip_ids: Vec<String>,
    /// VLAN carrying the attachment.
    #[serde(default)]
    pub vlan: Option<u32>,
    /// Attachment status reported by the API.
    #[serde(default)]
    pub status: Option<String>,
    /// Creation timestamp, RFC 3339.
    #[serde(default)]
    pub created_at: Option<String>,
    /// Last-update timestamp, RFC 3339.
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// Replaces the full set of private-network attachments of a server.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct SetServerPrivateNetworksRequest {
    /// Target server, carried in the URL rather than the body.
    #[serde(skip_serializing)]
    pub server_id: String,
    /// Private network id → IPAM addresses to book (empty books one
    /// automatically).
    pub per_private_network_ipam_ip_ids: BTreeMap<String, Vec<String>>,
}

/// Response of the private-network listing.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct ListServerPrivateNetworksResponse {
    /// Attachments of the server.
    #[serde(default)]
    pub server_private_networks: Vec<ServerPrivateNetwork>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_classify_for_the_waiter() {
        assert_eq!(ServerStatus::Ready.classify(), StatusClass::Ready);
        assert_eq!(ServerStatus::Error.classify(), StatusClass::Errored);
        assert_eq!(ServerStatus::Rebooting.classify(), StatusClass::Pending);
    }

    #[test]
    fn server_type_round_trips_through_the_wire_name() {
        let server: Server = serde_json::from_value(serde_json::json!({
            "id": "srv-1",
            "name": "mac-1",
            "type": "M2-M",
            "status": "ready",
            "project_id": "proj",
        }))
        .unwrap_or_else(|err| panic!("server should deserialize: {err}"));
        assert_eq!(server.server_type, "M2-M");

        let request = serde_json::to_value(CreateServerRequest {
            name: String::from("mac-1"),
            project_id: String::from("proj"),
            server_type: String::from("M2-M"),
            enable_vpc: false,
        })
        .unwrap_or_default();
        assert_eq!(request.get("type").and_then(|v| v.as_str()), Some("M2-M"));
    }
}
