//! HTTP client and API seam for the DocumentDB service.

use crate::api::locality::Region;
use crate::api::{self, ApiFuture};
use crate::config::ProviderConfig;

use super::types::{CreateEndpointRequest, Endpoint, Instance, MigrateEndpointRequest};

/// Endpoint and instance operations consumed by the endpoint front-end.
pub trait EndpointApi {
    /// Fetches an instance by id; endpoint operations gate on its
    /// convergence.
    fn get_instance<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Instance>;
    /// Fetches an endpoint by id.
    fn get_endpoint<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Endpoint>;
    /// Creates a private-network endpoint.
    fn create_endpoint<'a>(&'a self, request: &'a CreateEndpointRequest)
    -> ApiFuture<'a, Endpoint>;
    /// Moves an endpoint to another instance.
    fn migrate_endpoint<'a>(
        &'a self,
        request: &'a MigrateEndpointRequest,
    ) -> ApiFuture<'a, Endpoint>;
    /// Deletes an endpoint.
    fn delete_endpoint<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()>;
}

/// HTTP client for the DocumentDB API, scoped to one region.
#[derive(Clone)]
pub struct DocumentDbClient {
    base_url: String,
    secret_key: String,
}

impl DocumentDbClient {
    /// Builds a client from the provider configuration.
    #[must_use]
    pub fn new(config: &ProviderConfig, region: &Region) -> Self {
        Self {
            base_url: format!("{}/document-db/v1beta1/regions/{region}", config.api_url),
            secret_key: config.secret_key.clone(),
        }
    }
}

impl EndpointApi for DocumentDbClient {
    fn get_instance<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Instance> {
        Box::pin(async move {
            let url = format!("{}/instances/{id}", self.base_url);
            api::send_json(
                api::HTTP_CLIENT
                    .get(url)
                    .header(api::AUTH_HEADER, &self.secret_key),
            )
            .await
        })
    }

    fn get_endpoint<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Endpoint> {
        Box::pin(async move {
            let url = format!("{}/endpoints/{id}", self.base_url);
            api::send_json(
                api::HTTP_CLIENT
                    .get(url)
                    .header(api::AUTH_HEADER, &self.secret_key),
            )
            .await
        })
    }

    fn create_endpoint<'a>(
        &'a self,
        request: &'a CreateEndpointRequest,
    ) -> ApiFuture<'a, Endpoint> {
        Box::pin(async move {
            let url = format!("{}/endpoints", self.base_url);
            api::send_json(
                api::HTTP_CLIENT
                    .post(url)
                    .header(api::AUTH_HEADER, &self.secret_key)
                    .json(request),
            )
            .await
        })
    }

    fn migrate_endpoint<'a>(
        &'a self,
        request: &'a MigrateEndpointRequest,
    ) -> ApiFuture<'a, Endpoint> {
        Box::pin(async move {
            let url = format!("{}/endpoints/{}/migrate", self.base_url, request.endpoint_id);
            api::send_json(
                api::HTTP_CLIENT
                    .post(url)
                    .header(api::AUTH_HEADER, &self.secret_key)
                    .json(request),
            )
            .await
        })
    }

    fn delete_endpoint<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let url = format!("{}/endpoints/{id}", self.base_url);
            api::send_no_content(
                api::HTTP_CLIENT
                    .delete(url)
                    .header(api::AUTH_HEADER, &self.secret_key),
            )
            .await
        })
    }
}
