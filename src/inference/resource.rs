//! CRUD front-end for inference deployments.

use std::time::Duration;

use crate::api::locality::{Region, RegionalId, expand_id};
use crate::delta::Delta;
use crate::error::ResourceError;
use crate::naming::name_or_generated;
use crate::wait::{DEFAULT_POLL_INTERVAL, Timeouts, WaitError, WaitOptions, wait_for_converged};

use super::DEPLOYMENT_TIMEOUT;
use super::client::DeploymentApi;
use super::types::{
    CreateDeploymentRequest, Deployment, DeploymentStatus, EndpointSpec,
    EndpointSpecPrivateNetwork, EndpointSpecPublic, UpdateDeploymentRequest,
};

/// Desired configuration for a deployment creation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DeploymentSpec {
    /// Project that will own the deployment.
    pub project_id: String,
    /// Deployment name; generated with the `deployment` prefix when
    /// omitted.
    pub name: Option<String>,
    /// Node type backing the pool.
    pub node_type: String,
    /// Model to serve.
    pub model_name: String,
    /// Acceptance of the model's end-user license agreement.
    pub accept_eula: Option<bool>,
    /// Tags to attach.
    pub tags: Option<Vec<String>>,
    /// Minimum pool size.
    pub min_size: Option<u32>,
    /// Maximum pool size.
    pub max_size: Option<u32>,
    /// Exposes a public endpoint.
    pub public_endpoint: bool,
    /// Exposes an endpoint on this private network. Accepts
    /// region-qualified ids.
    pub private_network_id: Option<String>,
    /// Disables token authentication on the endpoint.
    pub disable_endpoint_auth: bool,
}

impl DeploymentSpec {
    /// Builds the creation body.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] when a required field is
    /// empty or no endpoint is declared.
    pub fn into_request(self) -> Result<CreateDeploymentRequest, ResourceError> {
        if self.project_id.is_empty() {
            return Err(ResourceError::missing_field("project_id"));
        }
        if self.node_type.is_empty() {
            return Err(ResourceError::missing_field("node_type"));
        }
        if self.model_name.is_empty() {
            return Err(ResourceError::missing_field("model_name"));
        }
        if !self.public_endpoint && self.private_network_id.is_none() {
            return Err(ResourceError::Validation(String::from(
                "at least one endpoint must be declared",
            )));
        }

        let endpoint = EndpointSpec {
            public: self.public_endpoint.then_some(EndpointSpecPublic {}),
            private_network: self.private_network_id.map(|id| EndpointSpecPrivateNetwork {
                private_network_id: expand_id(&id).to_owned(),
            }),
            disable_auth: self.disable_endpoint_auth,
        };

        Ok(CreateDeploymentRequest {
            name: name_or_generated(self.name, "deployment"),
            project_id: self.project_id,
            node_type: self.node_type,
            model_name: self.model_name,
            accept_eula: self.accept_eula,
            tags: self.tags,
            min_size: self.min_size,
            max_size: self.max_size,
            endpoints: vec![endpoint],
        })
    }
}

/// Changed-field set for a deployment update.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DeploymentUpdate {
    /// Deployment name.
    pub name: Delta<String>,
    /// Minimum pool size.
    pub min_size: Delta<u32>,
    /// Maximum pool size.
    pub max_size: Delta<u32>,
}

impl DeploymentUpdate {
    /// Builds the partial-update body from the changed subset.
    #[must_use]
    pub fn into_request(self, deployment_id: &str) -> UpdateDeploymentRequest {
        UpdateDeploymentRequest {
            deployment_id: expand_id(deployment_id).to_owned(),
            name: self.name.into_changed(),
            min_size: self.min_size.into_changed(),
            max_size: self.max_size.into_changed(),
        }
    }
}

/// Recorded state of a deployment.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeploymentState {
    /// Region-qualified identifier persisted by the engine.
    pub id: RegionalId,
    /// Deployment name.
    pub name: String,
    /// Project owning the deployment.
    pub project_id: String,
    /// Node type backing the pool.
    pub node_type: String,
    /// Model served by the deployment.
    pub model_name: String,
    /// Lifecycle status at flatten time.
    pub status: DeploymentStatus,
    /// Message accompanying the error status.
    pub error_message: Option<String>,
    /// Minimum pool size.
    pub min_size: u32,
    /// Maximum pool size.
    pub max_size: u32,
    /// Current pool size.
    pub size: u32,
    /// Tags attached to the deployment.
    pub tags: Vec<String>,
    /// Identifier of the public endpoint, when one exists.
    pub endpoint_public_id: Option<String>,
    /// URL of the public endpoint, when one exists.
    pub endpoint_public_url: Option<String>,
    /// Identifier of the private-network endpoint, when one exists.
    pub endpoint_private_id: Option<String>,
    /// URL of the private-network endpoint, when one exists.
    pub endpoint_private_url: Option<String>,
}

impl DeploymentState {
    /// Flattens an API response into recorded state.
    #[must_use]
    pub fn from_api(region: &Region, deployment: Deployment) -> Self {
        let public = deployment
            .endpoints
            .iter()
            .find(|endpoint| endpoint.public.is_some());
        let private = deployment
            .endpoints
            .iter()
            .find(|endpoint| endpoint.private_network.is_some());

        Self {
            endpoint_public_id: public.map(|endpoint| endpoint.id.clone()),
            endpoint_public_url: public.map(|endpoint| endpoint.url.clone()),
            endpoint_private_id: private.map(|endpoint| endpoint.id.clone()),
            endpoint_private_url: private.map(|endpoint| endpoint.url.clone()),
            id: RegionalId::new(region.clone(), deployment.id),
            name: deployment.name,
            project_id: deployment.project_id,
            node_type: deployment.node_type,
            model_name: deployment.model_name,
            status: deployment.status,
            error_message: deployment.error_message,
            min_size: deployment.min_size,
            max_size: deployment.max_size,
            size: deployment.size,
            tags: deployment.tags,
        }
    }
}

/// CRUD front-end for deployments.
pub struct DeploymentResource<A> {
    api: A,
    region: Region,
    timeouts: Timeouts,
    poll_interval: Duration,
}

impl<A: DeploymentApi> DeploymentResource<A> {
    /// Builds a front-end with the default budgets.
    #[must_use]
    pub fn new(api: A, region: Region) -> Self {
        Self {
            api,
            region,
            timeouts: Timeouts::uniform(DEPLOYMENT_TIMEOUT),
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

    async fn wait(&self, id: &str, timeout: Duration) -> Result<Deployment, WaitError> {
        let options = WaitOptions {
            interval: self.poll_interval,
            timeout,
        };
        wait_for_converged(
            options,
            "deployment",
            id,
            || self.api.get_deployment(id),
            |deployment: &Deployment| deployment.status.classify(),
        )
        .await
    }

    /// Creates the deployment and blocks until it converges.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] for a malformed spec, and
    /// wait/API errors otherwise.
    pub async fn create(&self, spec: DeploymentSpec) -> Result<DeploymentState, ResourceError> {
        let request = spec.into_request()?;
        let created = self.api.create_deployment(&request).await?;
        tracing::debug!(id = %created.id, model = %created.model_name, "deployment created, awaiting convergence");
        let converged = self.wait(&created.id, self.timeouts.create).await?;
        Ok(DeploymentState::from_api(&self.region, converged))
    }

    /// Refreshes recorded state. `Ok(None)` means the deployment is gone
    /// and the engine should clear local state.
    ///
    /// # Errors
    ///
    /// Returns wait/API errors other than not-found.
    pub async fn read(&self, id: &str) -> Result<Option<DeploymentState>, ResourceError> {
        let bare_id = expand_id(id);
        match self.wait(bare_id, self.timeouts.read).await {
            Ok(deployment) => Ok(Some(DeploymentState::from_api(&self.region, deployment))),
            Err(WaitError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Applies the changed subset and waits for reconvergence. `Ok(None)`
    /// means the deployment disappeared and the engine should clear state.
    ///
    /// # Errors
    ///
    /// Returns wait/API errors other than not-found.
    pub async fn update(
        &self,
        id: &str,
        update: DeploymentUpdate,
    ) -> Result<Option<DeploymentState>, ResourceError> {
        let bare_id = expand_id(id);
        match self.wait(bare_id, self.timeouts.update).await {
            Ok(_) => {}
            Err(WaitError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        }

        let request = update.into_request(bare_id);
        self.api.update_deployment(&request).await?;

        match self.wait(bare_id, self.timeouts.update).await {
            Ok(deployment) => Ok(Some(DeploymentState::from_api(&self.region, deployment))),
            Err(WaitError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes the deployment and waits until the API stops returning it.
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

        match self.api.delete_deployment(bare_id).await {
            Ok(_) => {}
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
    fn spec_requires_an_endpoint() {
        let result = DeploymentSpec {
            project_id: String::from("proj"),
            node_type: String::from("H100"),
            model_name: String::from("llama-3-8b"),
            ..DeploymentSpec::default()
        }
        .into_request();
        assert!(matches!(result, Err(ResourceError::Validation(_))));
    }

    #[test]
    fn spec_maps_pool_bounds_to_their_own_slots() {
        let request = DeploymentSpec {
            project_id: String::from("proj"),
            node_type: String::from("H100"),
            model_name: String::from("llama-3-8b"),
            min_size: Some(1),
            max_size: Some(4),
            public_endpoint: true,
            ..DeploymentSpec::default()
        }
        .into_request()
        .unwrap_or_else(|err| panic!("spec should build: {err}"));
        assert_eq!(request.min_size, Some(1));
        assert_eq!(request.max_size, Some(4));
    }

    #[test]
    fn spec_builds_a_combined_endpoint() {
        let request = DeploymentSpec {
            project_id: String::from("proj"),
            node_type: String::from("H100"),
            model_name: String::from("llama-3-8b"),
            public_endpoint: true,
            private_network_id: Some(String::from("fr-par/pn-1")),
            ..DeploymentSpec::default()
        }
        .into_request()
        .unwrap_or_else(|err| panic!("spec should build: {err}"));
        let endpoint = request.endpoints.first();
        assert!(endpoint.is_some_and(|spec| spec.public.is_some()));
        assert_eq!(
            endpoint
                .and_then(|spec| spec.private_network.as_ref())
                .map(|pn| pn.private_network_id.as_str()),
            Some("pn-1")
        );
    }

    #[test]
    fn update_skips_unchanged_fields() {
        let request = DeploymentUpdate {
            min_size: Delta::changed(2),
            ..DeploymentUpdate::default()
        }
        .into_request("fr-par/dep-1");
        assert_eq!(request.deployment_id, "dep-1");
        assert_eq!(request.min_size, Some(2));
        assert_eq!(request.max_size, None);
        assert_eq!(request.name, None);
    }

    #[test]
    fn state_splits_public_and_private_endpoints() {
        let deployment: Deployment = serde_json::from_value(serde_json::json!({
            "id": "dep-1",
            "name": "chat",
            "project_id": "proj",
            "status": "ready",
            "node_type": "H100",
            "model_name": "llama-3-8b",
            "endpoints": [
                {"id": "ep-pub", "url": "https://pub.example", "public": {}},
                {"id": "ep-priv", "url": "https://priv.example",
                 "private_network": {"private_network_id": "pn-1"}},
            ],
        }))
        .unwrap_or_else(|err| panic!("deployment should deserialize: {err}"));
        let state = DeploymentState::from_api(&Region::from("fr-par"), deployment);
        assert_eq!(state.endpoint_public_id.as_deref(), Some("ep-pub"));
        assert_eq!(state.endpoint_private_url.as_deref(), Some("https://priv.example"));
        assert_eq!(state.id.to_string(), "fr-par/dep-1");
    }
}
