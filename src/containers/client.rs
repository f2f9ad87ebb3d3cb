//! HTTP client and API seam for the Serverless Containers service.

use crate::api::locality::Region;
use crate::api::{self, ApiFuture};
use crate::config::ProviderConfig;

use super::types::{
    Container, CreateContainerRequest, CreateDomainRequest, CreateTriggerRequest, Domain, Trigger,
    UpdateContainerRequest, UpdateTriggerRequest,
};

/// Container operations consumed by the container front-end.
pub trait ContainerApi {
    /// Fetches a container by id.
    fn get_container<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Container>;
    /// Creates a container.
    fn create_container<'a>(
        &'a self,
        request: &'a CreateContainerRequest,
    ) -> ApiFuture<'a, Container>;
    /// Applies a partial update to a container.
    fn update_container<'a>(
        &'a self,
        request: &'a UpdateContainerRequest,
    ) -> ApiFuture<'a, Container>;
    /// Deletes a container.
    fn delete_container<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Container>;
}

/// Trigger operations consumed by the trigger front-end.
pub trait TriggerApi {
    /// Fetches a trigger by id.
    fn get_trigger<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Trigger>;
    /// Creates a trigger.
    fn create_trigger<'a>(&'a self, request: &'a CreateTriggerRequest) -> ApiFuture<'a, Trigger>;
    /// Applies a partial update to a trigger.
    fn update_trigger<'a>(&'a self, request: &'a UpdateTriggerRequest) -> ApiFuture<'a, Trigger>;
    /// Deletes a trigger.
    fn delete_trigger<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Trigger>;
}

/// Custom domain operations consumed by the domain front-end.
pub trait DomainApi {
    /// Fetches a domain by id.
    fn get_domain<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Domain>;
    /// Creates a domain. Fails with the DNS validation signature until the
    /// customer's record propagates.
    fn create_domain<'a>(&'a self, request: &'a CreateDomainRequest) -> ApiFuture<'a, Domain>;
    /// Deletes a domain.
    fn delete_domain<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Domain>;
}

/// HTTP client for the Serverless Containers API, scoped to one region.
#[derive(Clone)]
pub struct ContainersClient {
    base_url: String,
    secret_key: String,
}

impl ContainersClient {
    /// Builds a client from the provider configuration.
    #[must_use]
    pub fn new(config: &ProviderConfig, region: &Region) -> Self {
        Self {
            base_url: format!("{}/containers/v1beta1/regions/{region}", config.api_url),
            secret_key: config.secret_key.clone(),
        }
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        api::HTTP_CLIENT
            .get(format!("{}{path}", self.base_url))
            .header(api::AUTH_HEADER, &self.secret_key)
    }

    fn post<B: serde::Serialize>(&self, path: &str, body: &B) -> reqwest::RequestBuilder {
        api::HTTP_CLIENT
            .post(format!("{}{path}", self.base_url))
            .header(api::AUTH_HEADER, &self.secret_key)
            .json(body)
    }

    fn patch<B: serde::Serialize>(&self, path: &str, body: &B) -> reqwest::RequestBuilder {
        api::HTTP_CLIENT
            .patch(format!("{}{path}", self.base_url))
            .header(api::AUTH_HEADER, &self.secret_key)
            .json(body)
    }

    fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        api::HTTP_CLIENT
            .delete(format!("{}{path}", self.base_url))
            .header(api::AUTH_HEADER, &self.secret_key)
    }
}

impl ContainerApi for ContainersClient {
    fn get_container<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Container> {
        Box::pin(async move { api::send_json(self.get(&format!("/containers/{id}"))).await })
    }

    fn create_container<'a>(
        &'a self,
        request: &'a CreateContainerRequest,
    ) -> ApiFuture<'a, Container> {
        Box::pin(async move { api::send_json(self.post("/containers", request)).await })
    }

    fn update_container<'a>(
        &'a self,
        request: &'a UpdateContainerRequest,
    ) -> ApiFuture<'a, Container> {
        Box::pin(async move {
            let path = format!("/containers/{}", request.container_id);
            api::send_json(self.patch(&path, request)).await
        })
    }

    fn delete_container<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Container> {
        Box::pin(async move { api::send_json(self.delete(&format!("/containers/{id}"))).await })
    }
}

impl TriggerApi for ContainersClient {
    fn get_trigger<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Trigger> {
        Box::pin(async move { api::send_json(self.get(&format!("/triggers/{id}"))).await })
    }

    fn create_trigger<'a>(&'a self, request: &'a CreateTriggerRequest) -> ApiFuture<'a, Trigger> {
        Box::pin(async move { api::send_json(self.post("/triggers", request)).await })
    }

    fn update_trigger<'a>(&'a self, request: &'a UpdateTriggerRequest) -> ApiFuture<'a, Trigger> {
        Box::pin(async move {
            let path = format!("/triggers/{}", request.trigger_id);
            api::send_json(self.patch(&path, request)).await
        })
    }

    fn delete_trigger<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Trigger> {
        Box::pin(async move { api::send_json(self.delete(&format!("/triggers/{id}"))).await })
    }
}

impl DomainApi for ContainersClient {
    fn get_domain<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Domain> {
        Box::pin(async move { api::send_json(self.get(&format!("/domains/{id}"))).await })
    }

    fn create_domain<'a>(&'a self, request: &'a CreateDomainRequest) -> ApiFuture<'a, Domain> {
        Box::pin(async move { api::send_json(self.post("/domains", request)).await })
    }

    fn delete_domain<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Domain> {
        Box::pin(async move { api::send_json(self.delete(&format!("/domains/{id}"))).await })
    }
}
