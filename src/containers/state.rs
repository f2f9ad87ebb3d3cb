//! Response flatteners: API DTOs → recorded declarative state.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::api::locality::{Region, RegionalId};
use crate::diagnostics::{Diagnostic, Diagnostics};

use super::secrets::flatten_hashed_secrets;
use super::types::{
    Container, ContainerStatus, Domain, DomainStatus, HealthCheckSpec, HttpOption, Privacy,
    Protocol, Sandbox, ScalingOption, Trigger, TriggerStatus,
};

/// Recorded state of a container.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ContainerState {
    /// Region-qualified identifier persisted by the engine.
    pub id: RegionalId,
    /// Namespace owning the container.
    pub namespace_id: String,
    /// Container name.
    pub name: String,
    /// Lifecycle status at flatten time.
    pub status: ContainerStatus,
    /// Message accompanying the error status.
    pub error_message: Option<String>,
    /// Plain environment variables.
    pub environment_variables: BTreeMap<String, String>,
    /// Secrets as hashed display artifacts.
    pub secret_environment_variables: BTreeMap<String, String>,
    /// Minimum number of instances.
    pub min_scale: u32,
    /// Maximum number of instances.
    pub max_scale: u32,
    /// Memory limit in MB.
    pub memory_limit: u32,
    /// CPU limit in mvCPU.
    pub cpu_limit: u32,
    /// Request timeout.
    pub timeout: Option<Duration>,
    /// Visibility of the endpoint.
    pub privacy: Privacy,
    /// Free-form description.
    pub description: Option<String>,
    /// Registry image deployed by the container.
    pub registry_image: Option<String>,
    /// Requests handled concurrently by one instance.
    pub max_concurrency: u32,
    /// Generated endpoint hostname.
    pub domain_name: String,
    /// Protocol spoken by the workload.
    pub protocol: Protocol,
    /// Port the workload listens on.
    pub port: u32,
    /// HTTP/HTTPS redirection policy.
    pub http_option: HttpOption,
    /// Sandboxing technology.
    pub sandbox: Sandbox,
    /// Ephemeral storage limit in MB.
    pub local_storage_limit: u32,
    /// Health check configuration.
    pub health_check: Option<HealthCheckSpec>,
    /// Autoscaling configuration.
    pub scaling_option: Option<ScalingOption>,
    /// Tags attached to the container.
    pub tags: Vec<String>,
    /// Entrypoint override.
    pub command: Vec<String>,
    /// Entrypoint arguments.
    pub args: Vec<String>,
    /// Private network the container is attached to, region-qualified.
    pub private_network_id: Option<String>,
}

impl ContainerState {
    /// Flattens an API response into recorded state.
    #[must_use]
    pub fn from_api(region: &Region, container: Container) -> Self {
        Self {
            id: RegionalId::new(region.clone(), container.id),
            namespace_id: container.namespace_id,
            name: container.name,
            status: container.status,
            error_message: container.error_message,
            environment_variables: container.environment_variables,
            secret_environment_variables: flatten_hashed_secrets(
                &container.secret_environment_variables,
            ),
            min_scale: container.min_scale,
            max_scale: container.max_scale,
            memory_limit: container.memory_limit,
            cpu_limit: container.cpu_limit,
            timeout: container.timeout,
            privacy: container.privacy,
            description: container.description,
            registry_image: container.registry_image,
            max_concurrency: container.max_concurrency,
            domain_name: container.domain_name,
            protocol: container.protocol,
            port: container.port,
            http_option: container.http_option,
            sandbox: container.sandbox,
            local_storage_limit: container.local_storage_limit,
            health_check: container.health_check,
            scaling_option: container.scaling_option,
            tags: container.tags,
            command: container.command,
            args: container.args,
            private_network_id: container
                .private_network_id
                .map(|id| RegionalId::new(region.clone(), id).to_string()),
        }
    }
}

/// Recorded state of a trigger.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TriggerState {
    /// Region-qualified identifier persisted by the engine.
    pub id: RegionalId,
    /// Trigger name.
    pub name: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Container receiving the events, region-qualified.
    pub container_id: String,
    /// Kind of event source feeding the trigger.
    pub input_type: Option<String>,
    /// Lifecycle status at flatten time.
    pub status: TriggerStatus,
    /// Message accompanying the error status.
    pub error_message: Option<String>,
}

impl TriggerState {
    /// Flattens an API response into recorded state.
    #[must_use]
    pub fn from_api(region: &Region, trigger: Trigger) -> Self {
        Self {
            id: RegionalId::new(region.clone(), trigger.id),
            name: trigger.name,
            description: trigger.description,
            container_id: RegionalId::new(region.clone(), trigger.container_id).to_string(),
            input_type: trigger.input_type,
            status: trigger.status,
            error_message: trigger.error_message,
        }
    }

    /// Non-fatal diagnostics for the engine: a trigger that settled in the
    /// error status is surfaced as a warning, not a failed read.
    #[must_use]
    pub fn diagnostics(&self) -> Diagnostics {
        let mut diagnostics = Diagnostics::new();
        if self.status == TriggerStatus::Error {
            diagnostics.push(
                Diagnostic::warning("Trigger in error state")
                    .with_detail(self.error_message.clone().unwrap_or_default()),
            );
        }
        diagnostics
    }
}

/// Recorded state of a custom domain.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DomainState {
    /// Region-qualified identifier persisted by the engine.
    pub id: RegionalId,
    /// Hostname routed to the container.
    pub hostname: String,
    /// Container serving the domain, region-qualified.
    pub container_id: String,
    /// URL the domain resolves to.
    pub url: Option<String>,
    /// Lifecycle status at flatten time.
    pub status: DomainStatus,
    /// Message accompanying the error status.
    pub error_message: Option<String>,
}

impl DomainState {
    /// Flattens an API response into recorded state.
    #[must_use]
    pub fn from_api(region: &Region, domain: Domain) -> Self {
        Self {
            id: RegionalId::new(region.clone(), domain.id),
            hostname: domain.hostname,
            container_id: RegionalId::new(region.clone(), domain.container_id).to_string(),
            url: domain.url,
            status: domain.status,
            error_message: domain.error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::containers::types::SecretHashedValue;

    #[test]
    fn container_state_qualifies_identifiers() {
        let container: Container = serde_json::from_value(serde_json::json!({
            "id": "c1",
            "namespace_id": "ns",
            "name": "web",
            "status": "ready",
            "private_network_id": "pn-1",
        }))
        .unwrap_or_else(|err| panic!("container should deserialize: {err}"));
        let state = ContainerState::from_api(&Region::from("fr-par"), container);
        assert_eq!(state.id.to_string(), "fr-par/c1");
        assert_eq!(state.private_network_id.as_deref(), Some("fr-par/pn-1"));
    }

    #[test]
    fn container_state_flattens_hashed_secrets() {
        let container = Container {
            secret_environment_variables: vec![SecretHashedValue {
                key: String::from("db"),
                hashed_value: String::from("$argon2id$v=19$x"),
            }],
            ..ready_container()
        };
        let state = ContainerState::from_api(&Region::from("fr-par"), container);
        assert_eq!(
            state.secret_environment_variables.get("db").map(String::as_str),
            Some("$argon2id$v=19$x")
        );
    }

    #[test]
    fn errored_trigger_yields_a_warning_diagnostic() {
        let state = TriggerState {
            id: RegionalId::new(Region::from("fr-par"), "t1"),
            name: String::from("trigger-1"),
            description: None,
            container_id: String::from("fr-par/c1"),
            input_type: None,
            status: TriggerStatus::Error,
            error_message: Some(String::from("queue is gone")),
        };
        let diagnostics = state.diagnostics();
        assert!(!diagnostics.is_empty());
        assert!(!diagnostics.has_errors());
        let first = diagnostics.iter().next();
        assert_eq!(
            first.map(|diagnostic| diagnostic.detail.as_str()),
            Some("queue is gone")
        );
    }

    #[test]
    fn ready_trigger_yields_no_diagnostics() {
        let state = TriggerState {
            id: RegionalId::new(Region::from("fr-par"), "t1"),
            name: String::from("trigger-1"),
            description: None,
            container_id: String::from("fr-par/c1"),
            input_type: None,
            status: TriggerStatus::Ready,
            error_message: None,
        };
        assert!(state.diagnostics().is_empty());
    }

    fn ready_container() -> Container {
        serde_json::from_value(serde_json::json!({
            "id": "c1",
            "namespace_id": "ns",
            "name": "web",
            "status": "ready",
        }))
        .unwrap_or_else(|err| panic!("container should deserialize: {err}"))
    }
}
