//! CRUD front-end for DocumentDB private-network endpoints.
//!
//! An endpoint has no lifecycle of its own: waits gate on the owning
//! INSTANCE converging, and deletion returns as soon as the API accepts
//! it.

use std::net::IpAddr;
use std::time::Duration;

use crate::api::locality::{Region, RegionalId, Zone, expand_id};
use crate::delta::Delta;
use crate::error::ResourceError;
use crate::wait::{DEFAULT_POLL_INTERVAL, Timeouts, WaitError, WaitOptions, wait_for_converged};

use super::INSTANCE_TIMEOUT;
use super::client::EndpointApi;
use super::types::{
    CreateEndpointRequest, Endpoint, EndpointSpec, EndpointSpecPrivateNetwork, Instance,
    IpamConfig, MigrateEndpointRequest,
};

/// Checks `addr/prefix` notation without pulling in a CIDR crate.
fn validate_cidr(raw: &str) -> Result<(), ResourceError> {
    let invalid =
        || ResourceError::Validation(format!("invalid CIDR notation for service ip: {raw}"));
    let Some((address, prefix)) = raw.split_once('/') else {
        return Err(invalid());
    };
    let parsed: IpAddr = address.parse().map_err(|_| invalid())?;
    let bits: u8 = prefix.parse().map_err(|_| invalid())?;
    let max_bits: u8 = match parsed {
        IpAddr::V4(_) => 32,
        IpAddr::V6(_) => 128,
    };
    if bits > max_bits {
        return Err(invalid());
    }
    Ok(())
}

/// Desired configuration for an endpoint creation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EndpointSpecInput {
    /// Instance the endpoint attaches to. Accepts region-qualified ids.
    pub instance_id: String,
    /// Private network to expose the endpoint on. Accepts
    /// region-qualified ids.
    pub private_network_id: String,
    /// Static service address in CIDR notation; IPAM assigns one when
    /// omitted.
    pub ip_net: Option<String>,
}

impl EndpointSpecInput {
    /// Builds the creation body, choosing static or IPAM addressing.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] when a required field is
    /// empty or the declared address is not valid CIDR notation.
    pub fn into_request(self) -> Result<CreateEndpointRequest, ResourceError> {
        if self.instance_id.is_empty() {
            return Err(ResourceError::missing_field("instance_id"));
        }
        if self.private_network_id.is_empty() {
            return Err(ResourceError::missing_field("private_network_id"));
        }

        let private_network = match self.ip_net {
            Some(ip_net) => {
                validate_cidr(&ip_net)?;
                EndpointSpecPrivateNetwork {
                    private_network_id: expand_id(&self.private_network_id).to_owned(),
                    service_ip: Some(ip_net),
                    ipam_config: None,
                }
            }
            None => EndpointSpecPrivateNetwork {
                private_network_id: expand_id(&self.private_network_id).to_owned(),
                service_ip: None,
                ipam_config: Some(IpamConfig {}),
            },
        };

        Ok(CreateEndpointRequest {
            instance_id: expand_id(&self.instance_id).to_owned(),
            endpoint_spec: EndpointSpec { private_network },
        })
    }
}

/// Changed-field set for an endpoint update. The only mutable field is the
/// owning instance; a change migrates the endpoint.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct EndpointUpdate {
    /// Instance the endpoint attaches to. Accepts region-qualified ids.
    pub instance_id: Delta<String>,
}

/// Recorded state of an endpoint.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EndpointState {
    /// Region-qualified identifier persisted by the engine.
    pub id: RegionalId,
    /// Private network the endpoint is exposed on, region-qualified.
    pub private_network_id: Option<String>,
    /// Static service address in CIDR notation.
    pub ip_net: Option<String>,
    /// Address of the endpoint.
    pub ip: Option<String>,
    /// Port of the endpoint.
    pub port: u16,
    /// Endpoint name.
    pub name: Option<String>,
    /// Hostname of the endpoint.
    pub hostname: Option<String>,
    /// Zone of the private network.
    pub zone: Option<Zone>,
}

impl EndpointState {
    /// Flattens an API response into recorded state.
    #[must_use]
    pub fn from_api(region: &Region, endpoint: Endpoint) -> Self {
        let private_network = endpoint.private_network;
        Self {
            id: RegionalId::new(region.clone(), endpoint.id),
            private_network_id: private_network.as_ref().map(|pn| {
                RegionalId::new(region.clone(), pn.private_network_id.clone()).to_string()
            }),
            ip_net: private_network.as_ref().and_then(|pn| pn.service_ip.clone()),
            ip: endpoint.ip,
            port: endpoint.port,
            name: endpoint.name,
            hostname: endpoint.hostname,
            zone: private_network.and_then(|pn| pn.zone.map(Zone::from)),
        }
    }
}

/// CRUD front-end for private-network endpoints.
pub struct EndpointResource<A> {
    api: A,
    region: Region,
    timeouts: Timeouts,
    poll_interval: Duration,
}

impl<A: EndpointApi> EndpointResource<A> {
    /// Builds a front-end with the default budgets.
    #[must_use]
    pub fn new(api: A, region: Region) -> Self {
        Self {
            api,
            region,
            timeouts: Timeouts::uniform(INSTANCE_TIMEOUT),
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

    async fn wait_instance(&self, id: &str, timeout: Duration) -> Result<Instance, WaitError> {
        let options = WaitOptions {
            interval: self.poll_interval,
            timeout,
        };
        wait_for_converged(
            options,
            "documentdb instance",
            id,
            || self.api.get_instance(id),
            |instance: &Instance| instance.status.classify(),
        )
        .await
    }

    /// Creates the endpoint, gating on the owning instance before and
    /// after the call. `Ok(None)` means the instance is gone and the
    /// engine should clear local state.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] for a malformed spec, and
    /// wait/API errors otherwise.
    pub async fn create(
        &self,
        spec: EndpointSpecInput,
    ) -> Result<Option<EndpointState>, ResourceError> {
        let request = spec.into_request()?;

        match self
            .wait_instance(&request.instance_id, self.timeouts.create)
            .await
        {
            Ok(_) => {}
            Err(WaitError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        }

        let endpoint = self.api.create_endpoint(&request).await?;
        tracing::debug!(id = %endpoint.id, instance = %request.instance_id, "endpoint created");

        match self
            .wait_instance(&request.instance_id, self.timeouts.create)
            .await
        {
            Ok(_) => {}
            Err(WaitError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        }

        Ok(Some(EndpointState::from_api(&self.region, endpoint)))
    }

    /// Refreshes recorded state. `Ok(None)` means the endpoint is gone
    /// and the engine should clear local state.
    ///
    /// # Errors
    ///
    /// Returns API errors other than not-found.
    pub async fn read(&self, id: &str) -> Result<Option<EndpointState>, ResourceError> {
        let bare_id = expand_id(id);
        match self.api.get_endpoint(bare_id).await {
            Ok(endpoint) => Ok(Some(EndpointState::from_api(&self.region, endpoint))),
            Err(err) if err.is_not_found() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Migrates the endpoint when the owning instance changed; otherwise
    /// just re-reads.
    ///
    /// # Errors
    ///
    /// Returns wait/API errors other than not-found.
    pub async fn update(
        &self,
        id: &str,
        update: EndpointUpdate,
    ) -> Result<Option<EndpointState>, ResourceError> {
        let bare_id = expand_id(id);

        if let Some(instance_id) = update.instance_id.into_changed() {
            let request = MigrateEndpointRequest {
                endpoint_id: bare_id.to_owned(),
                instance_id: expand_id(&instance_id).to_owned(),
            };
            self.api.migrate_endpoint(&request).await?;
            self.wait_instance(&request.instance_id, self.timeouts.update)
                .await?;
        }

        self.read(bare_id).await
    }

    /// Deletes the endpoint. The API call returns immediately; there is
    /// no endpoint lifecycle to wait out.
    ///
    /// # Errors
    ///
    /// Returns API errors other than not-found.
    pub async fn delete(&self, id: &str) -> Result<(), ResourceError> {
        let bare_id = expand_id(id);
        match self.api.delete_endpoint(bare_id).await {
            Ok(()) => Ok(()),
            Err(err) if err.is_not_found() => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex, PoisonError};

    use super::*;
    use crate::api::{ApiError, ApiFuture, ResponseError};
    use crate::documentdb::types::InstanceStatus;

    #[test]
    fn spec_prefers_a_declared_service_ip() {
        let request = EndpointSpecInput {
            instance_id: String::from("fr-par/db-1"),
            private_network_id: String::from("fr-par/pn-1"),
            ip_net: Some(String::from("192.168.1.4/24")),
        }
        .into_request()
        .unwrap_or_else(|err| panic!("spec should build: {err}"));
        let pn = request.endpoint_spec.private_network;
        assert_eq!(pn.service_ip.as_deref(), Some("192.168.1.4/24"));
        assert_eq!(pn.ipam_config, None);
        assert_eq!(request.instance_id, "db-1");
    }

    #[test]
    fn spec_falls_back_to_ipam_addressing() {
        let request = EndpointSpecInput {
            instance_id: String::from("db-1"),
            private_network_id: String::from("pn-1"),
            ip_net: None,
        }
        .into_request()
        .unwrap_or_else(|err| panic!("spec should build: {err}"));
        let pn = request.endpoint_spec.private_network;
        assert_eq!(pn.service_ip, None);
        assert_eq!(pn.ipam_config, Some(IpamConfig {}));
    }

    #[test]
    fn spec_rejects_malformed_cidr() {
        for bad in ["192.168.1.4", "not-an-ip/24", "192.168.1.4/33", "10.0.0.1/x"] {
            let result = EndpointSpecInput {
                instance_id: String::from("db-1"),
                private_network_id: String::from("pn-1"),
                ip_net: Some(bad.to_owned()),
            }
            .into_request();
            assert!(
                matches!(result, Err(ResourceError::Validation(_))),
                "{bad} should be rejected"
            );
        }
    }

    struct FakeApi {
        instances: Mutex<VecDeque<Result<Instance, ApiError>>>,
        migrations: Arc<Mutex<u32>>,
        endpoint: Endpoint,
    }

    impl FakeApi {
        fn new(instances: Vec<Result<Instance, ApiError>>) -> Self {
            Self {
                instances: Mutex::new(VecDeque::from(instances)),
                migrations: Arc::new(Mutex::new(0)),
                endpoint: Endpoint {
                    id: String::from("ep-1"),
                    ip: Some(String::from("192.168.1.4")),
                    port: 5432,
                    name: Some(String::from("pn-endpoint")),
                    hostname: None,
                    private_network: None,
                },
            }
        }
    }

    fn ready_instance() -> Instance {
        Instance {
            id: String::from("db-1"),
            name: String::from("main"),
            status: InstanceStatus::Ready,
        }
    }

    fn not_found() -> ApiError {
        ApiError::Response(ResponseError {
            status: 404,
            message: String::from("resource is not found"),
            ..ResponseError::default()
        })
    }

    impl EndpointApi for FakeApi {
        fn get_instance<'a>(&'a self, _id: &'a str) -> ApiFuture<'a, Instance> {
            let next = self
                .instances
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .pop_front()
                .unwrap_or_else(|| Ok(ready_instance()));
            Box::pin(async move { next })
        }

        fn get_endpoint<'a>(&'a self, _id: &'a str) -> ApiFuture<'a, Endpoint> {
            let endpoint = self.endpoint.clone();
            Box::pin(async move { Ok(endpoint) })
        }

        fn create_endpoint<'a>(
            &'a self,
            _request: &'a CreateEndpointRequest,
        ) -> ApiFuture<'a, Endpoint> {
            let endpoint = self.endpoint.clone();
            Box::pin(async move { Ok(endpoint) })
        }

        fn migrate_endpoint<'a>(
            &'a self,
            _request: &'a MigrateEndpointRequest,
        ) -> ApiFuture<'a, Endpoint> {
            *self.migrations.lock().unwrap_or_else(PoisonError::into_inner) += 1;
            let endpoint = self.endpoint.clone();
            Box::pin(async move { Ok(endpoint) })
        }

        fn delete_endpoint<'a>(&'a self, _id: &'a str) -> ApiFuture<'a, ()> {
            Box::pin(async move { Ok(()) })
        }
    }

    fn resource(api: FakeApi) -> EndpointResource<FakeApi> {
        EndpointResource::new(api, Region::from("fr-par"))
            .with_poll_interval(Duration::from_millis(1))
    }

    #[tokio::test]
    async fn create_gates_on_the_owning_instance() {
        let api = FakeApi::new(vec![
            Ok(Instance {
                status: InstanceStatus::Configuring,
                ..ready_instance()
            }),
            Ok(ready_instance()),
        ]);
        let state = resource(api)
            .create(EndpointSpecInput {
                instance_id: String::from("db-1"),
                private_network_id: String::from("pn-1"),
                ip_net: None,
            })
            .await
            .unwrap_or_else(|err| panic!("create should converge: {err}"));
        let state = state.unwrap_or_else(|| panic!("instance should exist"));
        assert_eq!(state.id.to_string(), "fr-par/ep-1");
        assert_eq!(state.port, 5432);
    }

    #[tokio::test]
    async fn create_clears_state_when_the_instance_is_gone() {
        let api = FakeApi::new(vec![Err(not_found())]);
        let state = resource(api)
            .create(EndpointSpecInput {
                instance_id: String::from("db-1"),
                private_network_id: String::from("pn-1"),
                ip_net: None,
            })
            .await
            .unwrap_or_else(|err| panic!("create should not fail on 404: {err}"));
        assert!(state.is_none());
    }

    #[tokio::test]
    async fn update_migrates_only_when_the_instance_changed() {
        let api = FakeApi::new(Vec::new());
        let migrations = Arc::clone(&api.migrations);
        let front = resource(api);

        let unchanged = front.update("ep-1", EndpointUpdate::default()).await;
        assert!(unchanged.is_ok());
        assert_eq!(
            *migrations.lock().unwrap_or_else(PoisonError::into_inner),
            0
        );

        let moved = front
            .update(
                "ep-1",
                EndpointUpdate {
                    instance_id: Delta::changed(String::from("fr-par/db-2")),
                },
            )
            .await;
        assert!(moved.is_ok());
        assert_eq!(
            *migrations.lock().unwrap_or_else(PoisonError::into_inner),
            1
        );
    }
}
