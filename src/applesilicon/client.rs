//! HTTP client and API seam for the Apple silicon service.

use crate::api::locality::Zone;
use crate::api::{self, ApiFuture};
use crate::config::ProviderConfig;

use super::types::{
    CreateServerRequest, ListServerPrivateNetworksResponse, Server,
    SetServerPrivateNetworksRequest, UpdateServerRequest,
};

/// Server operations consumed by the server front-end.
pub trait ServerApi {
    /// Fetches a server by id.
    fn get_server<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Server>;
    /// Creates a server.
    fn create_server<'a>(&'a self, request: &'a CreateServerRequest) -> ApiFuture<'a, Server>;
    /// Applies a partial update to a server.
    fn update_server<'a>(&'a self, request: &'a UpdateServerRequest) -> ApiFuture<'a, Server>;
    /// Deletes a server.
    fn delete_server<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()>;
    /// Lists the private-network attachments of a server.
    fn list_private_networks<'a>(
        &'a self,
        server_id: &'a str,
    ) -> ApiFuture<'a, ListServerPrivateNetworksResponse>;
    /// Replaces the private-network attachments of a server.
    fn set_private_networks<'a>(
        &'a self,
        request: &'a SetServerPrivateNetworksRequest,
    ) -> ApiFuture<'a, ListServerPrivateNetworksResponse>;
}

/// HTTP client for the Apple silicon API, scoped to one zone.
#[derive(Clone)]
pub struct AppleSiliconClient {
    base_url: String,
    secret_key: String,
}

impl AppleSiliconClient {
    /// Builds a client from the provider configuration.
    #[must_use]
    pub fn new(config: &ProviderConfig, zone: &Zone) -> Self {
        Self {
            base_url: format!("{}/apple-silicon/v1alpha1/zones/{zone}", config.api_url),
            secret_key: config.secret_key.clone(),
        }
    }
}

impl ServerApi for AppleSiliconClient {
    fn get_server<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Server> {
        Box::pin(async move {
            let url = format!("{}/servers/{id}", self.base_url);
            api::send_json(
                api::HTTP_CLIENT
                    .get(url)
                    .header(api::AUTH_HEADER, &self.secret_key),
            )
            .await
        })
    }

    fn create_server<'a>(&'a self, request: &'a CreateServerRequest) -> ApiFuture<'a, Server> {
        Box::pin(async move {
            let url = format!("{}/servers", self.base_url);
            api::send_json(
                api::HTTP_CLIENT
                    .post(url)
                    .header(api::AUTH_HEADER, &self.secret_key)
                    .json(request),
            )
            .await
        })
    }

    fn update_server<'a>(&'a self, request: &'a UpdateServerRequest) -> ApiFuture<'a, Server> {
        Box::pin(async move {
            let url = format!("{}/servers/{}", self.base_url, request.server_id);
            api::send_json(
                api::HTTP_CLIENT
                    .patch(url)
                    .header(api::AUTH_HEADER, &self.secret_key)
                    .json(request),
            )
            .await
        })
    }

    fn delete_server<'a>(&'a self, id: &'a str) -> ApiFuture<'a, ()> {
        Box::pin(async move {
            let url = format!("{}/servers/{id}", self.base_url);
            api::send_no_content(
                api::HTTP_CLIENT
                    .delete(url)
                    .header(api::AUTH_HEADER, &self.secret_key),
            )
            .await
        })
    }

    fn list_private_networks<'a>(
        &'a self,
        server_id: &'a str,
    ) -> ApiFuture<'a, ListServerPrivateNetworksResponse> {
        Box::pin(async move {
            let url = format!("{}/servers/{server_id}/private-networks", self.base_url);
            api::send_json(
                api::HTTP_CLIENT
                    .get(url)
                    .header(api::AUTH_HEADER, &self.secret_key),
            )
            .await
        })
    }

    fn set_private_networks<'a>(
        &'a self,
        request: &'a SetServerPrivateNetworksRequest,
    ) -> ApiFuture<'a, ListServerPrivateNetworksResponse> {
        Box::pin(async move {
            let url = format!(
                "{}/servers/{}/private-networks",
                self.base_url, request.server_id
            );
            api::send_json(
                api::HTTP_CLIENT
                    .put(url)
                    .header(api::AUTH_HEADER, &self.secret_key)
                    .json(request),
            )
            .await
        })
    }
}
