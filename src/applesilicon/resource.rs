//! CRUD front-end for Apple silicon servers.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::api::locality::{Zone, ZonalId, expand_id};
use crate::delta::Delta;
use crate::error::ResourceError;
use crate::naming::name_or_generated;
use crate::wait::{DEFAULT_POLL_INTERVAL, Timeouts, WaitError, WaitOptions, wait_for_converged};

use super::SERVER_TIMEOUT;
use super::client::ServerApi;
use super::types::{
    CreateServerRequest, Server, ServerPrivateNetwork, ServerStatus,
    SetServerPrivateNetworksRequest, UpdateServerRequest,
};

/// A declared private-network attachment.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PrivateNetworkAttachment {
    /// Private network to attach. Accepts region-qualified ids.
    pub id: String,
    /// IPAM addresses to book; empty books one automatically. Accepts
    /// region-qualified ids.
    pub ipam_ip_ids: Vec<String>,
}

/// Expands declared attachments into the API's replacement map.
#[must_use]
pub fn expand_private_networks(
    declared: &[PrivateNetworkAttachment],
) -> BTreeMap<String, Vec<String>> {
    declared
        .iter()
        .map(|attachment| {
            (
                expand_id(&attachment.id).to_owned(),
                attachment
                    .ipam_ip_ids
                    .iter()
                    .map(|id| expand_id(id).to_owned())
                    .collect(),
            )
        })
        .collect()
}

/// Recorded state of one private-network attachment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PrivateNetworkState {
    /// Private network, region-qualified.
    pub id: String,
    /// IPAM addresses booked for the attachment, region-qualified.
    pub ipam_ip_ids: Vec<String>,
    /// VLAN carrying the attachment.
    pub vlan: Option<u32>,
    /// Attachment status reported by the API.
    pub status: Option<String>,
    /// Creation timestamp, RFC 3339.
    pub created_at: Option<String>,
    /// Last-update timestamp, RFC 3339.
    pub updated_at: Option<String>,
}

/// Flattens API attachments into recorded state, qualifying identifiers
/// with the region the zone belongs to.
#[must_use]
pub fn flatten_private_networks(
    zone: &Zone,
    attachments: Vec<ServerPrivateNetwork>,
) -> Vec<PrivateNetworkState> {
    let region = zone.region();
    attachments
        .into_iter()
        .map(|attachment| PrivateNetworkState {
            id: format!("{region}/{}", attachment.private_network_id),
            ipam_ip_ids: attachment
                .ipam_ip_ids
                .into_iter()
                .map(|id| format!("{region}/{id}"))
                .collect(),
            vlan: attachment.vlan,
            status: attachment.status,
            created_at: attachment.created_at,
            updated_at: attachment.updated_at,
        })
        .collect()
}

/// Desired configuration for a server creation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ServerSpec {
    /// Project that will own the server.
    pub project_id: String,
    /// Commercial type to provision (for example `M2-M`).
    pub server_type: String,
    /// Server name; generated with the `asrv` prefix when omitted.
    pub name: Option<String>,
    /// Attaches the server to the VPC.
    pub enable_vpc: bool,
    /// Private networks to attach after creation.
    pub private_networks: Vec<PrivateNetworkAttachment>,
}

impl ServerSpec {
    /// Builds the creation body.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] when a required field is
    /// empty or private networks are declared without enabling the VPC.
    pub fn into_request(self) -> Result<(CreateServerRequest, Vec<PrivateNetworkAttachment>), ResourceError> {
        if self.project_id.is_empty() {
            return Err(ResourceError::missing_field("project_id"));
        }
        if self.server_type.is_empty() {
            return Err(ResourceError::missing_field("server_type"));
        }
        if !self.private_networks.is_empty() && !self.enable_vpc {
            return Err(ResourceError::Validation(String::from(
                "private networks require the vpc to be enabled",
            )));
        }

        let request = CreateServerRequest {
            name: name_or_generated(self.name, "asrv"),
            project_id: self.project_id,
            server_type: self.server_type,
            enable_vpc: self.enable_vpc,
        };
        Ok((request, self.private_networks))
    }
}

/// Changed-field set for a server update.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ServerUpdate {
    /// Server name.
    pub name: Delta<String>,
    /// Attaches or detaches the server from the VPC.
    pub enable_vpc: Delta<bool>,
    /// Full replacement set of private-network attachments.
    pub private_networks: Delta<Vec<PrivateNetworkAttachment>>,
}

/// Recorded state of a server.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerState {
    /// Zone-qualified identifier persisted by the engine.
    pub id: ZonalId,
    /// Server name.
    pub name: String,
    /// Commercial type.
    pub server_type: String,
    /// Lifecycle status at flatten time.
    pub status: ServerStatus,
    /// Project owning the server.
    pub project_id: String,
    /// Public address of the server.
    pub ip: Option<String>,
    /// VNC console URL.
    pub vnc_url: Option<String>,
    /// Private-network attachments.
    pub private_networks: Vec<PrivateNetworkState>,
}

impl ServerState {
    /// Flattens an API response and its attachments into recorded state.
    #[must_use]
    pub fn from_api(
        zone: &Zone,
        server: Server,
        attachments: Vec<ServerPrivateNetwork>,
    ) -> Self {
        Self {
            id: ZonalId::new(zone.clone(), server.id),
            name: server.name,
            server_type: server.server_type,
            status: server.status,
            project_id: server.project_id,
            ip: server.ip,
            vnc_url: server.vnc_url,
            private_networks: flatten_private_networks(zone, attachments),
        }
    }
}

/// CRUD front-end for servers.
pub struct ServerResource<A> {
    api: A,
    zone: Zone,
    timeouts: Timeouts,
    poll_interval: Duration,
}

impl<A: ServerApi> ServerResource<A> {
    /// Builds a front-end with the default budgets.
    #[must_use]
    pub fn new(api: A, zone: Zone) -> Self {
        Self {
            api,
            zone,
            timeouts: Timeouts::uniform(SERVER_TIMEOUT),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the per-operation wait budgets.
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Overrides the poll pacing.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    async fn wait(&self, id: &str, timeout: Duration) -> Result<Server, WaitError> {
        let options = WaitOptions {
            interval: self.poll_interval,
            timeout,
        };
        wait_for_converged(
            options,
            "apple silicon server",
            id,
            || self.api.get_server(id),
            |server: &Server| server.status.classify(),
        )
        .await
    }

    async fn attachments(&self, id: &str) -> Result<Vec<ServerPrivateNetwork>, ResourceError> {
        Ok(self
            .api
            .list_private_networks(id)
            .await?
            .server_private_networks)
    }

    /// Creates the server, attaches declared private networks, and blocks
    /// until it converges.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] for a malformed spec, and
    /// wait/API errors otherwise.
    pub async fn create(&self, spec: ServerSpec) -> Result<ServerState, ResourceError> {
        let (request, private_networks) = spec.into_request()?;
        let created = self.api.create_server(&request).await?;
        tracing::debug!(id = %created.id, server_type = %created.server_type, "server created, awaiting convergence");

        if !private_networks.is_empty() {
            let attach = SetServerPrivateNetworksRequest {
                server_id: created.id.clone(),
                per_private_network_ipam_ip_ids: expand_private_networks(&private_networks),
            };
            self.api.set_private_networks(&attach).await?;
        }

        let converged = self.wait(&created.id, self.timeouts.create).await?;
        let attachments = self.attachments(&created.id).await?;
        Ok(ServerState::from_api(&self.zone, converged, attachments))
    }

    /// Refreshes recorded state. `Ok(None)` means the server is gone and
    /// the engine should clear local state.
    ///
    /// # Errors
    ///
    /// Returns wait/API errors other than not-found.
    pub async fn read(&self, id: &str) -> Result<Option<ServerState>, ResourceError> {
        let bare_id = expand_id(id);
        match self.wait(bare_id, self.timeouts.read).await {
            Ok(server) => {
                let attachments = self.attachments(bare_id).await?;
                Ok(Some(ServerState::from_api(&self.zone, server, attachments)))
            }
            Err(WaitError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Applies the changed subset — name, VPC flag, private-network set —
    /// and waits for reconvergence. `Ok(None)` means the server
    /// disappeared and the engine should clear state.
    ///
    /// # Errors
    ///
    /// Returns wait/API errors other than not-found.
    pub async fn update(
        &self,
        id: &str,
        update: ServerUpdate,
    ) -> Result<Option<ServerState>, ResourceError> {
        let bare_id = expand_id(id);
        match self.wait(bare_id, self.timeouts.update).await {
            Ok(_) => {}
            Err(WaitError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        }

        let name = update.name.into_changed();
        let enable_vpc = update.enable_vpc.into_changed();
        if name.is_some() || enable_vpc.is_some() {
            let request = UpdateServerRequest {
                server_id: bare_id.to_owned(),
                name,
                enable_vpc,
            };
            self.api.update_server(&request).await?;
        }

        if let Some(private_networks) = update.private_networks.into_changed() {
            let request = SetServerPrivateNetworksRequest {
                server_id: bare_id.to_owned(),
                per_private_network_ipam_ip_ids: expand_private_networks(&private_networks),
            };
            self.api.set_private_networks(&request).await?;
        }

        match self.wait(bare_id, self.timeouts.update).await {
            Ok(server) => {
                let attachments = self.attachments(bare_id).await?;
                Ok(Some(ServerState::from_api(&self.zone, server, attachments)))
            }
            Err(WaitError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes the server and waits until the API stops returning it.
    ///
    /// # Errors
    ///
    /// Returns wait/API errors other than not-found.
    pub async fn delete(&self, id: &str) -> Result<(), ResourceError> {
        let bare_id = expand_id(id);
        match self.wait(bare_id, self.timeouts.delete).await {
            Ok(_) => {}
            Err(WaitError::NotFound { .. }) => return Ok(()),
            Err(err) => return Err(err.into()),
        }

        match self.api.delete_server(bare_id).await {
            Ok(()) => {}
            Err(err) if err.is_not_found() => return Ok(()),
            Err(err) => return Err(err.into()),
        }

        match self.wait(bare_id, self.timeouts.delete).await {
            Ok(_) | Err(WaitError::NotFound { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expand_strips_locality_qualifiers() {
        let expanded = expand_private_networks(&[PrivateNetworkAttachment {
            id: String::from("fr-par/pn-1"),
            ipam_ip_ids: vec![String::from("fr-par/ip-1"), String::from("ip-2")],
        }]);
        assert_eq!(
            expanded.get("pn-1"),
            Some(&vec![String::from("ip-1"), String::from("ip-2")])
        );
    }

    #[test]
    fn flatten_qualifies_with_the_zone_region() {
        let flattened = flatten_private_networks(
            &Zone::from("fr-par-1"),
            vec![ServerPrivateNetwork {
                private_network_id: String::from("pn-1"),
                ipam_ip_ids: vec![String::from("ip-1")],
                vlan: Some(42),
                status: Some(String::from("ready")),
                created_at: None,
                updated_at: None,
            }],
        );
        let first = flattened.first();
        assert_eq!(first.map(|pn| pn.id.as_str()), Some("fr-par/pn-1"));
        assert_eq!(
            first.and_then(|pn| pn.ipam_ip_ids.first()).map(String::as_str),
            Some("fr-par/ip-1")
        );
        assert_eq!(first.and_then(|pn| pn.vlan), Some(42));
    }

    #[test]
    fn spec_rejects_private_networks_without_vpc() {
        let result = ServerSpec {
            project_id: String::from("proj"),
            server_type: String::from("M2-M"),
            private_networks: vec![PrivateNetworkAttachment {
                id: String::from("pn-1"),
                ipam_ip_ids: Vec::new(),
            }],
            ..ServerSpec::default()
        }
        .into_request();
        assert!(matches!(result, Err(ResourceError::Validation(_))));
    }

    #[test]
    fn spec_generates_a_name_when_omitted() {
        let (request, _) = ServerSpec {
            project_id: String::from("proj"),
            server_type: String::from("M2-M"),
            ..ServerSpec::default()
        }
        .into_request()
        .unwrap_or_else(|err| panic!("spec should build: {err}"));
        assert!(request.name.starts_with("asrv-"));
    }
}
