//! HTTP client and API seam for the Managed Inference service.

use crate::api::locality::Region;
use crate::api::{self, ApiFuture};
use crate::config::ProviderConfig;

use super::types::{CreateDeploymentRequest, Deployment, UpdateDeploymentRequest};

/// Deployment operations consumed by the deployment front-end.
pub trait DeploymentApi {
    /// Fetches a deployment by id.
    fn get_deployment<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Deployment>;
    /// Creates a deployment.
    fn create_deployment<'a>(
        &'a self,
        request: &'a CreateDeploymentRequest,
    ) -> ApiFuture<'a, Deployment>;
    /// Applies a partial update to a deployment.
    fn update_deployment<'a>(
        &'a self,
        request: &'a UpdateDeploymentRequest,
    ) -> ApiFuture<'a, Deployment>;
    /// Deletes a deployment.
    fn delete_deployment<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Deployment>;
}

/// HTTP client for the Managed Inference API, scoped to one region.
#[derive(Clone)]
pub struct InferenceClient {
    base_url: String,
    secret_key: String,
}

impl InferenceClient {
    /// Builds a client from the provider configuration.
    #[must_use]
    pub fn new(config: &ProviderConfig, region: &Region) -> Self {
        Self {
            base_url: format!("{}/inference/v1beta1/regions/{region}", config.api_url),
            secret_key: config.secret_key.clone(),
        }
    }
}

impl DeploymentApi for InferenceClient {
    fn get_deployment<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Deployment> {
        Box::pin(async move {
            let url = format!("{}/deployments/{id}", self.base_url);
            api::send_json(
                api::HTTP_CLIENT
                    .get(url)
                    .header(api::AUTH_HEADER, &self.secret_key),
            )
            .await
        })
    }

    fn create_deployment<'a>(
        &'a self,
        request: &'a CreateDeploymentRequest,
    ) -> ApiFuture<'a, Deployment> {
        Box::pin(async move {
            let url = format!("{}/deployments", self.base_url);
            api::send_json(
                api::HTTP_CLIENT
                    .post(url)
                    .header(api::AUTH_HEADER, &self.secret_key)
                    .json(request),
            )
            .await
        })
    }

    fn update_deployment<'a>(
        &'a self,
        request: &'a UpdateDeploymentRequest,
    ) -> ApiFuture<'a, Deployment> {
        Box::pin(async move {
            let url = format!("{}/deployments/{}", self.base_url, request.deployment_id);
            api::send_json(
                api::HTTP_CLIENT
                    .patch(url)
                    .header(api::AUTH_HEADER, &self.secret_key)
                    .json(request),
            )
            .await
        })
    }

    fn delete_deployment<'a>(&'a self, id: &'a str) -> ApiFuture<'a, Deployment> {
        Box::pin(async move {
            let url = format!("{}/deployments/{id}", self.base_url);
            api::send_json(
                api::HTTP_CLIENT
                    .delete(url)
                    .header(api::AUTH_HEADER, &self.secret_key),
            )
            .await
        })
    }
}
