//! Typed creation and partial-update builders for the containers surface.
//!
//! Builders consume the declared configuration (creation) or the per-field
//! deltas reported by the engine (update) and produce the wire bodies. An
//! update request never carries a field whose delta is unchanged.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::api::locality::{Region, expand_id};
use crate::delta::Delta;
use crate::error::ResourceError;
use crate::naming::name_or_generated;

use super::secrets::{expand_secrets, filter_secret_patch};
use super::types::{
    CreateContainerRequest, CreateDomainRequest, CreateTriggerNatsConfig, CreateTriggerRequest,
    CreateTriggerSqsConfig, HealthCheckSpec, HttpOption, Privacy, Protocol, Sandbox,
    ScalingOption, UpdateContainerRequest, UpdateTriggerRequest,
};

impl ScalingOption {
    /// Rejects configurations with more than one threshold set.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] when two or more thresholds
    /// are declared.
    pub fn validate(&self) -> Result<(), ResourceError> {
        let set = [
            self.concurrent_requests_threshold,
            self.cpu_usage_threshold,
            self.memory_usage_threshold,
        ]
        .iter()
        .filter(|slot| slot.is_some())
        .count();

        if set > 1 {
            return Err(ResourceError::Validation(String::from(
                "a maximum of one scaling option can be set",
            )));
        }
        Ok(())
    }
}

/// Desired configuration for a container creation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ContainerSpec {
    /// Namespace that owns the container. Accepts region-qualified ids.
    pub namespace_id: String,
    /// Container name; generated with the `co` prefix when omitted.
    pub name: Option<String>,
    /// Visibility of the deployed endpoint.
    pub privacy: Privacy,
    /// Protocol spoken by the workload.
    pub protocol: Protocol,
    /// HTTP/HTTPS redirection policy.
    pub http_option: HttpOption,
    /// Plain environment variables.
    pub environment_variables: Option<BTreeMap<String, String>>,
    /// Write-only secret environment variables.
    pub secret_environment_variables: BTreeMap<String, String>,
    /// Minimum number of instances.
    pub min_scale: Option<u32>,
    /// Maximum number of instances.
    pub max_scale: Option<u32>,
    /// Memory limit in MB.
    pub memory_limit: Option<u32>,
    /// CPU limit in mvCPU.
    pub cpu_limit: Option<u32>,
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Port the workload listens on.
    pub port: Option<u32>,
    /// Free-form description.
    pub description: Option<String>,
    /// Registry image to deploy.
    pub registry_image: Option<String>,
    /// Requests handled concurrently by one instance.
    pub max_concurrency: Option<u32>,
    /// Sandboxing technology.
    pub sandbox: Option<Sandbox>,
    /// Health check configuration.
    pub health_check: Option<HealthCheckSpec>,
    /// Autoscaling configuration.
    pub scaling_option: Option<ScalingOption>,
    /// Ephemeral storage limit in MB.
    pub local_storage_limit: Option<u32>,
    /// Tags to attach.
    pub tags: Option<Vec<String>>,
    /// Entrypoint override.
    pub command: Option<Vec<String>>,
    /// Entrypoint arguments.
    pub args: Option<Vec<String>>,
    /// Private network to attach. Accepts region-qualified ids.
    pub private_network_id: Option<String>,
}

impl ContainerSpec {
    /// Builds the creation body, generating a name when none was declared.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] when the namespace id is
    /// empty or the scaling option declares more than one threshold.
    pub fn into_request(self) -> Result<CreateContainerRequest, ResourceError> {
        if self.namespace_id.is_empty() {
            return Err(ResourceError::missing_field("namespace_id"));
        }
        if let Some(scaling) = &self.scaling_option {
            scaling.validate()?;
        }

        Ok(CreateContainerRequest {
            namespace_id: expand_id(&self.namespace_id).to_owned(),
            name: name_or_generated(self.name, "co"),
            privacy: self.privacy,
            protocol: self.protocol,
            http_option: self.http_option,
            environment_variables: self.environment_variables,
            secret_environment_variables: expand_secrets(&self.secret_environment_variables),
            min_scale: self.min_scale,
            max_scale: self.max_scale,
            memory_limit: self.memory_limit,
            cpu_limit: self.cpu_limit,
            timeout: self.timeout,
            port: self.port,
            description: self.description,
            registry_image: self.registry_image,
            max_concurrency: self.max_concurrency,
            sandbox: self.sandbox,
            health_check: self.health_check,
            scaling_option: self.scaling_option,
            local_storage_limit: self.local_storage_limit,
            tags: self.tags,
            command: self.command,
            args: self.args,
            private_network_id: self
                .private_network_id
                .map(|id| expand_id(&id).to_owned()),
        })
    }
}

/// Changed-field set for a container update.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ContainerUpdate {
    /// Plain environment variables.
    pub environment_variables: Delta<BTreeMap<String, String>>,
    /// Write-only secret environment variables; the previous map drives
    /// the deletion entries of the patch.
    pub secret_environment_variables: Delta<BTreeMap<String, String>>,
    /// Tags replacement.
    pub tags: Delta<Vec<String>>,
    /// Minimum number of instances.
    pub min_scale: Delta<u32>,
    /// Maximum number of instances.
    pub max_scale: Delta<u32>,
    /// Memory limit in MB.
    pub memory_limit: Delta<u32>,
    /// CPU limit in mvCPU.
    pub cpu_limit: Delta<u32>,
    /// Request timeout.
    pub timeout: Delta<Duration>,
    /// Visibility of the endpoint.
    pub privacy: Delta<Privacy>,
    /// Free-form description.
    pub description: Delta<String>,
    /// Registry image to deploy.
    pub registry_image: Delta<String>,
    /// Requests handled concurrently by one instance.
    pub max_concurrency: Delta<u32>,
    /// Protocol spoken by the workload.
    pub protocol: Delta<Protocol>,
    /// Port the workload listens on.
    pub port: Delta<u32>,
    /// HTTP/HTTPS redirection policy.
    pub http_option: Delta<HttpOption>,
    /// Explicit redeploy request.
    pub deploy: Delta<bool>,
    /// Sandboxing technology.
    pub sandbox: Delta<Sandbox>,
    /// Health check configuration.
    pub health_check: Delta<HealthCheckSpec>,
    /// Autoscaling configuration.
    pub scaling_option: Delta<ScalingOption>,
    /// Digest of the deployed registry image. A changed digest forces a
    /// redeploy even when no other field changed.
    pub registry_sha256: Delta<String>,
    /// Ephemeral storage limit in MB.
    pub local_storage_limit: Delta<u32>,
    /// Entrypoint override.
    pub command: Delta<Vec<String>>,
    /// Entrypoint arguments.
    pub args: Delta<Vec<String>>,
    /// Private network to attach; empty detaches.
    pub private_network_id: Delta<String>,
}

impl ContainerUpdate {
    /// Builds the partial-update body from the changed subset.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] when a changed scaling option
    /// declares more than one threshold.
    pub fn into_request(self, container_id: &str) -> Result<UpdateContainerRequest, ResourceError> {
        if let Some(scaling) = self.scaling_option.if_changed() {
            scaling.validate()?;
        }

        let secret_environment_variables = if self.secret_environment_variables.is_changed() {
            let empty = BTreeMap::new();
            let previous = self
                .secret_environment_variables
                .previous()
                .unwrap_or(&empty);
            filter_secret_patch(previous, self.secret_environment_variables.get())
        } else {
            Vec::new()
        };

        let mut redeploy = self.deploy.into_changed();
        if self.registry_sha256.is_changed() {
            redeploy = Some(true);
        }

        Ok(UpdateContainerRequest {
            container_id: expand_id(container_id).to_owned(),
            environment_variables: self.environment_variables.into_changed(),
            secret_environment_variables,
            tags: self.tags.into_changed(),
            min_scale: self.min_scale.into_changed(),
            max_scale: self.max_scale.into_changed(),
            memory_limit: self.memory_limit.into_changed(),
            cpu_limit: self.cpu_limit.into_changed(),
            timeout: self.timeout.into_changed(),
            privacy: self.privacy.into_changed(),
            description: self.description.into_changed(),
            registry_image: self.registry_image.into_changed(),
            max_concurrency: self.max_concurrency.into_changed(),
            protocol: self.protocol.into_changed(),
            port: self.port.into_changed(),
            http_option: self.http_option.into_changed(),
            redeploy,
            sandbox: self.sandbox.into_changed(),
            health_check: self.health_check.into_changed(),
            scaling_option: self.scaling_option.into_changed(),
            local_storage_limit: self.local_storage_limit.into_changed(),
            command: self.command.into_changed(),
            args: self.args.into_changed(),
            private_network_id: self
                .private_network_id
                .into_changed()
                .map(|id| expand_id(&id).to_owned()),
        })
    }
}

/// SQS event source declared on a trigger.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SqsSource {
    /// Name of the queue to consume.
    pub queue: String,
    /// Project owning the queue; defaults to the provider project.
    pub project_id: Option<String>,
    /// Region hosting the queue; defaults to the trigger's region.
    pub region: Option<String>,
}

/// NATS event source declared on a trigger.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct NatsSource {
    /// NATS account hosting the subject.
    pub account_id: Option<String>,
    /// Subject to listen to.
    pub subject: String,
    /// Project owning the account; defaults to the provider project.
    pub project_id: Option<String>,
    /// Region hosting the account; defaults to the trigger's region.
    pub region: Option<String>,
}

/// Desired configuration for a trigger creation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TriggerSpec {
    /// Container receiving the events. Accepts region-qualified ids.
    pub container_id: String,
    /// Trigger name; generated with the `trigger` prefix when omitted.
    pub name: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
    /// SQS event source (mutually exclusive with `nats`).
    pub sqs: Option<SqsSource>,
    /// NATS event source (mutually exclusive with `sqs`).
    pub nats: Option<NatsSource>,
}

impl TriggerSpec {
    /// Builds the creation body, filling source project and region from
    /// the provider defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] when the container id is
    /// empty or both event sources are declared.
    pub fn into_request(
        self,
        region: &Region,
        default_project_id: &str,
    ) -> Result<CreateTriggerRequest, ResourceError> {
        if self.container_id.is_empty() {
            return Err(ResourceError::missing_field("container_id"));
        }
        if self.sqs.is_some() && self.nats.is_some() {
            return Err(ResourceError::Validation(String::from(
                "sqs and nats configurations are mutually exclusive",
            )));
        }

        let scw_sqs_config = self.sqs.map(|sqs| CreateTriggerSqsConfig {
            queue: sqs.queue,
            mnq_project_id: sqs
                .project_id
                .unwrap_or_else(|| default_project_id.to_owned()),
            mnq_region: sqs.region.unwrap_or_else(|| region.to_string()),
        });
        let scw_nats_config = self.nats.map(|nats| CreateTriggerNatsConfig {
            mnq_nats_account_id: nats.account_id.map(|id| expand_id(&id).to_owned()),
            subject: nats.subject,
            mnq_project_id: nats
                .project_id
                .unwrap_or_else(|| default_project_id.to_owned()),
            mnq_region: nats.region.unwrap_or_else(|| region.to_string()),
        });

        Ok(CreateTriggerRequest {
            name: name_or_generated(self.name, "trigger"),
            container_id: expand_id(&self.container_id).to_owned(),
            description: self.description,
            scw_sqs_config,
            scw_nats_config,
        })
    }
}

/// Changed-field set for a trigger update.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct TriggerUpdate {
    /// Trigger name.
    pub name: Delta<String>,
    /// Free-form description.
    pub description: Delta<String>,
}

impl TriggerUpdate {
    /// Builds the partial-update body from the changed subset.
    #[must_use]
    pub fn into_request(self, trigger_id: &str) -> UpdateTriggerRequest {
        UpdateTriggerRequest {
            trigger_id: expand_id(trigger_id).to_owned(),
            name: self.name.into_changed(),
            description: self.description.into_changed(),
        }
    }
}

/// Desired configuration for a custom domain creation.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DomainSpec {
    /// Hostname to route.
    pub hostname: String,
    /// Container that will serve the domain. Accepts region-qualified ids.
    pub container_id: String,
}

impl DomainSpec {
    /// Builds the creation body.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] when the hostname or the
    /// container id is empty.
    pub fn into_request(self) -> Result<CreateDomainRequest, ResourceError> {
        if self.hostname.is_empty() {
            return Err(ResourceError::missing_field("hostname"));
        }
        if self.container_id.is_empty() {
            return Err(ResourceError::missing_field("container_id"));
        }
        Ok(CreateDomainRequest {
            hostname: self.hostname,
            container_id: expand_id(&self.container_id).to_owned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::none(None, None, None, true)]
    #[case::single(Some(50), None, None, true)]
    #[case::two(Some(50), Some(80), None, false)]
    #[case::all(Some(50), Some(80), Some(90), false)]
    fn scaling_option_allows_at_most_one_threshold(
        #[case] concurrent: Option<u32>,
        #[case] cpu: Option<u32>,
        #[case] memory: Option<u32>,
        #[case] accepted: bool,
    ) {
        let result = ScalingOption {
            concurrent_requests_threshold: concurrent,
            cpu_usage_threshold: cpu,
            memory_usage_threshold: memory,
        }
        .validate();
        assert_eq!(result.is_ok(), accepted, "unexpected outcome: {result:?}");
    }

    #[test]
    fn create_requires_a_namespace() {
        let result = ContainerSpec::default().into_request();
        assert!(matches!(result, Err(ResourceError::Validation(_))));
    }

    #[test]
    fn create_strips_locality_qualifiers() {
        let request = ContainerSpec {
            namespace_id: String::from("fr-par/ns-1"),
            private_network_id: Some(String::from("fr-par/pn-1")),
            ..ContainerSpec::default()
        }
        .into_request()
        .unwrap_or_else(|err| panic!("spec should build: {err}"));
        assert_eq!(request.namespace_id, "ns-1");
        assert_eq!(request.private_network_id.as_deref(), Some("pn-1"));
    }

    #[test]
    fn update_skips_unchanged_fields() {
        let request = ContainerUpdate {
            port: Delta::changed(8080),
            ..ContainerUpdate::default()
        }
        .into_request("c1")
        .unwrap_or_else(|err| panic!("update should build: {err}"));
        assert_eq!(request.port, Some(8080));
        assert_eq!(request.min_scale, None);
        assert_eq!(request.environment_variables, None);
        assert!(request.secret_environment_variables.is_empty());
        assert_eq!(request.redeploy, None);
    }

    #[test]
    fn digest_change_forces_a_redeploy() {
        let request = ContainerUpdate {
            registry_sha256: Delta::changed(String::from("sha256:abcd")),
            ..ContainerUpdate::default()
        }
        .into_request("c1")
        .unwrap_or_else(|err| panic!("update should build: {err}"));
        assert_eq!(request.redeploy, Some(true));
    }

    #[test]
    fn digest_change_overrides_an_explicit_deploy_false() {
        let request = ContainerUpdate {
            deploy: Delta::changed(false),
            registry_sha256: Delta::changed(String::from("sha256:abcd")),
            ..ContainerUpdate::default()
        }
        .into_request("c1")
        .unwrap_or_else(|err| panic!("update should build: {err}"));
        assert_eq!(request.redeploy, Some(true));
    }

    #[test]
    fn changed_secrets_go_through_the_patch_filter() {
        let mut previous = BTreeMap::new();
        previous.insert(String::from("db"), String::from("$argon2id$v=19$old"));
        previous.insert(String::from("gone"), String::from("$argon2id$v=19$x"));
        let mut desired = BTreeMap::new();
        desired.insert(String::from("db"), String::from("$argon2id$v=19$old"));
        desired.insert(String::from("api"), String::from("fresh"));

        let request = ContainerUpdate {
            secret_environment_variables: Delta::changed_from(previous, desired),
            ..ContainerUpdate::default()
        }
        .into_request("c1")
        .unwrap_or_else(|err| panic!("update should build: {err}"));

        let keys: Vec<&str> = request
            .secret_environment_variables
            .iter()
            .map(|secret| secret.key.as_str())
            .collect();
        assert_eq!(keys, vec!["api", "gone"]);
    }

    #[test]
    fn trigger_sources_are_mutually_exclusive() {
        let result = TriggerSpec {
            container_id: String::from("c1"),
            sqs: Some(SqsSource {
                queue: String::from("jobs"),
                ..SqsSource::default()
            }),
            nats: Some(NatsSource {
                subject: String::from("events"),
                ..NatsSource::default()
            }),
            ..TriggerSpec::default()
        }
        .into_request(&Region::from("fr-par"), "proj");
        assert!(matches!(result, Err(ResourceError::Validation(_))));
    }

    #[test]
    fn trigger_sqs_source_inherits_provider_defaults() {
        let request = TriggerSpec {
            container_id: String::from("fr-par/c1"),
            sqs: Some(SqsSource {
                queue: String::from("jobs"),
                ..SqsSource::default()
            }),
            ..TriggerSpec::default()
        }
        .into_request(&Region::from("fr-par"), "proj")
        .unwrap_or_else(|err| panic!("spec should build: {err}"));

        assert_eq!(request.container_id, "c1");
        let sqs = match request.scw_sqs_config {
            Some(sqs) => sqs,
            None => panic!("sqs config should be present"),
        };
        assert_eq!(sqs.mnq_project_id, "proj");
        assert_eq!(sqs.mnq_region, "fr-par");
    }
}
