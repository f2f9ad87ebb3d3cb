//! Wire-level DTOs for the Serverless Containers API (`v1beta1`).

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::wait::StatusClass;

/// Scaleway renders protobuf durations as strings such as `300s`.
pub(crate) mod duration_secs {
    use std::time::Duration;

    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub(crate) fn serialize<S: Serializer>(
        value: &Option<Duration>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(duration) => serializer.serialize_str(&format!("{}s", duration.as_secs())),
            None => serializer.serialize_none(),
        }
    }

    pub(crate) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Duration>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        raw.map(|text| {
            let trimmed = text.strip_suffix('s').unwrap_or(&text);
            // Fractional seconds are truncated; convergence pacing does not
            // need sub-second resolution.
            let whole = trimmed.split_once('.').map_or(trimmed, |(whole, _)| whole);
            whole
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|err| D::Error::custom(format!("invalid duration {text:?}: {err}")))
        })
        .transpose()
    }
}

/// Visibility of a deployed container endpoint.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Privacy {
    /// Reported by the API when the privacy is not yet known.
    UnknownPrivacy,
    /// Anyone can reach the endpoint.
    #[default]
    Public,
    /// Requests must carry a valid authentication token.
    Private,
}

/// Protocol spoken by the container workload.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    /// Reported by the API when the protocol is not yet known.
    UnknownProtocol,
    /// Plain HTTP/1.x.
    #[default]
    Http1,
    /// HTTP/2 cleartext.
    H2c,
}

/// HTTP/HTTPS redirection policy for the endpoint.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HttpOption {
    /// Reported by the API when the option is not yet known.
    UnknownHttpOption,
    /// Plain HTTP is served alongside HTTPS.
    #[default]
    Enabled,
    /// Plain HTTP requests are redirected to HTTPS.
    Redirected,
}

/// Sandboxing technology isolating the workload.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Sandbox {
    /// Reported by the API when the sandbox is not yet known.
    UnknownSandbox,
    /// First-generation sandbox.
    V1,
    /// Second-generation sandbox, the platform default.
    #[default]
    V2,
}

/// Lifecycle status of a container.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainerStatus {
    /// Deployed and serving.
    Ready,
    /// Deletion in progress.
    Deleting,
    /// Deployment failed; see the error message.
    Error,
    /// Administratively locked.
    Locked,
    /// Initial provisioning in progress.
    Creating,
    /// Waiting on a deployment to roll out.
    Pending,
    /// Created but never deployed.
    Created,
    /// Status not recognized by this crate.
    #[serde(other)]
    Unknown,
}

impl ContainerStatus {
    /// Maps the API status onto the waiter's classification.
    #[must_use]
    pub const fn classify(self) -> StatusClass {
        match self {
            Self::Ready | Self::Created => StatusClass::Ready,
            Self::Error | Self::Locked => StatusClass::Errored,
            Self::Unknown | Self::Deleting | Self::Creating | Self::Pending => StatusClass::Pending,
        }
    }
}

/// Lifecycle status of a trigger.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerStatus {
    /// Connected to its event source.
    Ready,
    /// Deletion in progress.
    Deleting,
    /// Setup failed; see the error message.
    Error,
    /// Initial provisioning in progress.
    Creating,
    /// Waiting on the event source.
    Pending,
    /// Status not recognized by this crate.
    #[serde(other)]
    UnknownStatus,
}

impl TriggerStatus {
    /// Maps the API status onto the waiter's classification.
    #[must_use]
    pub const fn classify(self) -> StatusClass {
        match self {
            Self::Ready => StatusClass::Ready,
            Self::Error => StatusClass::Errored,
            Self::UnknownStatus | Self::Deleting | Self::Creating | Self::Pending => {
                StatusClass::Pending
            }
        }
    }
}

/// Lifecycle status of a custom domain.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainStatus {
    /// Validated and routing traffic.
    Ready,
    /// Deletion in progress.
    Deleting,
    /// Validation failed; see the error message.
    Error,
    /// Initial validation in progress.
    Creating,
    /// Waiting on DNS propagation.
    Pending,
    /// Status not recognized by this crate.
    #[serde(other)]
    UnknownStatus,
}

impl DomainStatus {
    /// Maps the API status onto the waiter's classification.
    #[must_use]
    pub const fn classify(self) -> StatusClass {
        match self {
            Self::Ready => StatusClass::Ready,
            Self::Error => StatusClass::Errored,
            Self::UnknownStatus | Self::Deleting | Self::Creating | Self::Pending => {
                StatusClass::Pending
            }
        }
    }
}

/// A write-only secret submitted to the API. An absent value deletes the
/// key server-side.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Secret {
    /// Environment variable name.
    pub key: String,
    /// Secret material; `None` requests deletion of the key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// A secret as echoed back by the API: the value is irreversibly hashed.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct SecretHashedValue {
    /// Environment variable name.
    pub key: String,
    /// Hashed value, a display artifact only.
    pub hashed_value: String,
}

/// Health check probing configuration.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct HealthCheckSpec {
    /// HTTP probe configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http: Option<HttpProbe>,
    /// Consecutive failures before the container is marked unhealthy.
    pub failure_threshold: u32,
    /// Delay between probes.
    #[serde(default, with = "duration_secs", skip_serializing_if = "Option::is_none")]
    pub interval: Option<Duration>,
}

/// HTTP probe target.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct HttpProbe {
    /// Path probed on the container port.
    pub path: String,
}

/// Autoscaling trigger; at most one threshold may be set.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ScalingOption {
    /// Concurrent requests per instance triggering scale-out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrent_requests_threshold: Option<u32>,
    /// CPU usage percentage triggering scale-out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_usage_threshold: Option<u32>,
    /// Memory usage percentage triggering scale-out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_usage_threshold: Option<u32>,
}

/// A deployed container as returned by the API.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Container {
    /// Provider identifier.
    pub id: String,
    /// Namespace owning the container.
    pub namespace_id: String,
    /// Container name.
    pub name: String,
    /// Lifecycle status.
    pub status: ContainerStatus,
    /// Message accompanying the error status.
    #[serde(default)]
    pub error_message: Option<String>,
    /// Plain environment variables.
    #[serde(default)]
    pub environment_variables: BTreeMap<String, String>,
    /// Secrets, hashed by the API.
    #[serde(default)]
    pub secret_environment_variables: Vec<SecretHashedValue>,
    /// Minimum number of instances.
    #[serde(default)]
    pub min_scale: u32,
    /// Maximum number of instances.
    #[serde(default)]
    pub max_scale: u32,
    /// Memory limit in MB.
    #[serde(default)]
    pub memory_limit: u32,
    /// CPU limit in mvCPU.
    #[serde(default)]
    pub cpu_limit: u32,
    /// Request timeout.
    #[serde(default, with = "duration_secs")]
    pub timeout: Option<Duration>,
    /// Visibility of the endpoint.
    #[serde(default)]
    pub privacy: Privacy,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Registry image deployed by the container.
    #[serde(default)]
    pub registry_image: Option<String>,
    /// Requests handled concurrently by one instance.
    #[serde(default)]
    pub max_concurrency: u32,
    /// Generated endpoint hostname.
    #[serde(default)]
    pub domain_name: String,
    /// Protocol spoken by the workload.
    #[serde(default)]
    pub protocol: Protocol,
    /// Port the workload listens on.
    #[serde(default)]
    pub port: u32,
    /// HTTP/HTTPS redirection policy.
    #[serde(default)]
    pub http_option: HttpOption,
    /// Sandboxing technology.
    #[serde(default)]
    pub sandbox: Sandbox,
    /// Ephemeral storage limit in MB.
    #[serde(default)]
    pub local_storage_limit: u32,
    /// Health check configuration.
    #[serde(default)]
    pub health_check: Option<HealthCheckSpec>,
    /// Autoscaling configuration.
    #[serde(default)]
    pub scaling_option: Option<ScalingOption>,
    /// Tags attached to the container.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Entrypoint override.
    #[serde(default)]
    pub command: Vec<String>,
    /// Entrypoint arguments.
    #[serde(default)]
    pub args: Vec<String>,
    /// Private network the container is attached to.
    #[serde(default)]
    pub private_network_id: Option<String>,
}

/// Container creation body.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CreateContainerRequest {
    /// Namespace that will own the container.
    pub namespace_id: String,
    /// Container name.
    pub name: String,
    /// Visibility of the endpoint.
    pub privacy: Privacy,
    /// Protocol spoken by the workload.
    pub protocol: Protocol,
    /// HTTP/HTTPS redirection policy.
    pub http_option: HttpOption,
    /// Plain environment variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<BTreeMap<String, String>>,
    /// Write-only secrets.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secret_environment_variables: Vec<Secret>,
    /// Minimum number of instances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_scale: Option<u32>,
    /// Maximum number of instances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scale: Option<u32>,
    /// Memory limit in MB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u32>,
    /// CPU limit in mvCPU.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<u32>,
    /// Request timeout.
    #[serde(with = "duration_secs", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    /// Port the workload listens on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Registry image to deploy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_image: Option<String>,
    /// Requests handled concurrently by one instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<u32>,
    /// Sandboxing technology.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<Sandbox>,
    /// Health check configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheckSpec>,
    /// Autoscaling configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling_option: Option<ScalingOption>,
    /// Ephemeral storage limit in MB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_storage_limit: Option<u32>,
    /// Tags to attach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Entrypoint override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    /// Entrypoint arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    /// Private network to attach.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_network_id: Option<String>,
}

/// Container partial-update body. Every slot is optional; absent slots are
/// left untouched server-side.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct UpdateContainerRequest {
    /// Target container, carried in the URL rather than the body.
    #[serde(skip_serializing)]
    pub container_id: String,
    /// Plain environment variables.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub environment_variables: Option<BTreeMap<String, String>>,
    /// Minimal secret mutation list (see the patch filter).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub secret_environment_variables: Vec<Secret>,
    /// Tags replacement.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    /// Minimum number of instances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_scale: Option<u32>,
    /// Maximum number of instances.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_scale: Option<u32>,
    /// Memory limit in MB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u32>,
    /// CPU limit in mvCPU.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_limit: Option<u32>,
    /// Request timeout.
    #[serde(with = "duration_secs", skip_serializing_if = "Option::is_none")]
    pub timeout: Option<Duration>,
    /// Visibility of the endpoint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub privacy: Option<Privacy>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Registry image to deploy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registry_image: Option<String>,
    /// Requests handled concurrently by one instance.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrency: Option<u32>,
    /// Protocol spoken by the workload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<Protocol>,
    /// Port the workload listens on.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u32>,
    /// HTTP/HTTPS redirection policy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_option: Option<HttpOption>,
    /// Forces a redeploy of the current image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redeploy: Option<bool>,
    /// Sandboxing technology.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sandbox: Option<Sandbox>,
    /// Health check configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check: Option<HealthCheckSpec>,
    /// Autoscaling configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scaling_option: Option<ScalingOption>,
    /// Ephemeral storage limit in MB.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_storage_limit: Option<u32>,
    /// Entrypoint override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command: Option<Vec<String>>,
    /// Entrypoint arguments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    /// Private network to attach; empty detaches.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private_network_id: Option<String>,
}

/// A trigger as returned by the API.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Trigger {
    /// Provider identifier.
    pub id: String,
    /// Trigger name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Container receiving the events.
    pub container_id: String,
    /// Kind of event source feeding the trigger.
    #[serde(default)]
    pub input_type: Option<String>,
    /// Lifecycle status.
    pub status: TriggerStatus,
    /// Message accompanying the error status.
    #[serde(default)]
    pub error_message: Option<String>,
}

/// SQS source configuration submitted on trigger creation.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CreateTriggerSqsConfig {
    /// Name of the queue to consume.
    pub queue: String,
    /// Project owning the queue.
    pub mnq_project_id: String,
    /// Region hosting the queue.
    pub mnq_region: String,
}

/// NATS source configuration submitted on trigger creation.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct CreateTriggerNatsConfig {
    /// NATS account hosting the subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mnq_nats_account_id: Option<String>,
    /// Subject to listen to.
    pub subject: String,
    /// Project owning the account.
    pub mnq_project_id: String,
    /// Region hosting the account.
    pub mnq_region: String,
}

/// Trigger creation body.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CreateTriggerRequest {
    /// Trigger name.
    pub name: String,
    /// Container receiving the events.
    pub container_id: String,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// SQS event source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scw_sqs_config: Option<CreateTriggerSqsConfig>,
    /// NATS event source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scw_nats_config: Option<CreateTriggerNatsConfig>,
}

/// Trigger partial-update body.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
pub struct UpdateTriggerRequest {
    /// Target trigger, carried in the URL rather than the body.
    #[serde(skip_serializing)]
    pub trigger_id: String,
    /// Trigger name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A custom domain as returned by the API.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Domain {
    /// Provider identifier.
    pub id: String,
    /// Hostname routed to the container.
    pub hostname: String,
    /// Container serving the domain.
    pub container_id: String,
    /// URL the domain resolves to.
    #[serde(default)]
    pub url: Option<String>,
    /// Lifecycle status.
    pub status: DomainStatus,
    /// Message accompanying the error status.
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Custom domain creation body.
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct CreateDomainRequest {
    /// Hostname to route.
    pub hostname: String,
    /// Container that will serve the domain.
    pub container_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_classify_for_the_waiter() {
        assert_eq!(ContainerStatus::Ready.classify(), StatusClass::Ready);
        assert_eq!(ContainerStatus::Locked.classify(), StatusClass::Errored);
        assert_eq!(ContainerStatus::Deleting.classify(), StatusClass::Pending);
        assert_eq!(TriggerStatus::Error.classify(), StatusClass::Errored);
        assert_eq!(DomainStatus::Pending.classify(), StatusClass::Pending);
    }

    #[test]
    fn unknown_statuses_deserialize_to_the_fallback() {
        let status: ContainerStatus =
            serde_json::from_str("\"some_future_status\"").unwrap_or(ContainerStatus::Ready);
        assert_eq!(status, ContainerStatus::Unknown);
    }

    #[test]
    fn durations_serialize_in_api_syntax() {
        let request = CreateContainerRequest {
            timeout: Some(Duration::from_secs(300)),
            ..minimal_request()
        };
        let json = serde_json::to_value(&request).unwrap_or_default();
        assert_eq!(json.get("timeout").and_then(|v| v.as_str()), Some("300s"));
    }

    #[test]
    fn durations_deserialize_with_and_without_fraction() {
        let container: Container = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "namespace_id": "ns",
            "name": "web",
            "status": "ready",
            "timeout": "12.5s",
        }))
        .unwrap_or_else(|err| panic!("container should deserialize: {err}"));
        assert_eq!(container.timeout, Some(Duration::from_secs(12)));
    }

    #[test]
    fn absent_optional_slots_are_not_serialized() {
        let json = serde_json::to_value(minimal_request()).unwrap_or_default();
        assert!(json.get("min_scale").is_none());
        assert!(json.get("secret_environment_variables").is_none());
        assert!(json.get("timeout").is_none());
    }

    fn minimal_request() -> CreateContainerRequest {
        CreateContainerRequest {
            namespace_id: String::from("ns"),
            name: String::from("web"),
            privacy: Privacy::Public,
            protocol: Protocol::Http1,
            http_option: HttpOption::Enabled,
            environment_variables: None,
            secret_environment_variables: Vec::new(),
            min_scale: None,
            max_scale: None,
            memory_limit: None,
            cpu_limit: None,
            timeout: None,
            port: None,
            description: None,
            registry_image: None,
            max_concurrency: None,
            sandbox: None,
            health_check: None,
            scaling_option: None,
            local_storage_limit: None,
            tags: None,
            command: None,
            args: None,
            private_network_id: None,
        }
    }
}
