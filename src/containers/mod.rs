//! Serverless Containers: containers, triggers, and custom domains.
//!
//! The flow for every operation is builder → API call → convergence wait →
//! flattener. Builders live in `request`, flatteners in `state`, and the
//! front-ends tying them together in `resource`.

mod client;
mod request;
mod resource;
mod secrets;
mod state;
mod types;

use std::time::Duration;

pub use client::{ContainerApi, ContainersClient, DomainApi, TriggerApi};
pub use request::{
    ContainerSpec, ContainerUpdate, DomainSpec, NatsSource, SqsSource, TriggerSpec, TriggerUpdate,
};
pub use resource::{ContainerResource, DomainResource, TriggerResource};
pub use secrets::{HASHED_SECRET_PREFIX, filter_secret_patch};
pub use state::{ContainerState, DomainState, TriggerState};
pub use types::{
    Container, ContainerStatus, CreateContainerRequest, CreateDomainRequest,
    CreateTriggerNatsConfig, CreateTriggerRequest, CreateTriggerSqsConfig, Domain, DomainStatus,
    HealthCheckSpec, HttpOption, HttpProbe, Privacy, Protocol, Sandbox, ScalingOption, Secret,
    SecretHashedValue, Trigger, TriggerStatus, UpdateContainerRequest, UpdateTriggerRequest,
};

/// Default convergence budget for containers.
pub const CONTAINER_TIMEOUT: Duration = Duration::from_secs(12 * 60 + 30);
/// Default convergence budget for triggers.
pub const TRIGGER_TIMEOUT: Duration = Duration::from_secs(5 * 60);
/// Default convergence budget for custom domains.
pub const DOMAIN_TIMEOUT: Duration = Duration::from_secs(10 * 60);
/// Interval between domain creation attempts while DNS propagates.
pub const DOMAIN_RETRY_INTERVAL: Duration = Duration::from_secs(5);
