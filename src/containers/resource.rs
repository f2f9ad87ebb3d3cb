//! CRUD front-ends for containers, triggers, and custom domains.
//!
//! Every operation blocks until the remote resource converges, so the
//! engine's recorded state always reflects a terminal status.

use std::time::Duration;

use crate::api::ApiError;
use crate::api::locality::{Region, expand_id};
use crate::error::ResourceError;
use crate::retry::retry_while_transient;
use crate::wait::{DEFAULT_POLL_INTERVAL, Timeouts, WaitError, WaitOptions, wait_for_converged};

use super::client::{ContainerApi, DomainApi, TriggerApi};
use super::request::{ContainerSpec, ContainerUpdate, DomainSpec, TriggerSpec, TriggerUpdate};
use super::state::{ContainerState, DomainState, TriggerState};
use super::types::{Container, Domain, Trigger};
use super::{CONTAINER_TIMEOUT, DOMAIN_RETRY_INTERVAL, DOMAIN_TIMEOUT, TRIGGER_TIMEOUT};

/// Message prefix the API answers with while a domain's DNS record is not
/// yet resolvable.
const DOMAIN_VALIDATION_PREFIX: &str = "could not validate domain";

pub(crate) fn is_domain_validation_error(err: &ApiError) -> bool {
    matches!(err, ApiError::Response(body) if body.message.starts_with(DOMAIN_VALIDATION_PREFIX))
}

/// CRUD front-end for containers.
pub struct ContainerResource<A> {
    api: A,
    region: Region,
    timeouts: Timeouts,
    poll_interval: Duration,
}

impl<A: ContainerApi> ContainerResource<A> {
    /// Builds a front-end with the default budgets.
    #[must_use]
    pub fn new(api: A, region: Region) -> Self {
        Self {
            api,
            region,
            timeouts: Timeouts::uniform(CONTAINER_TIMEOUT),
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

    async fn wait(&self, id: &str, timeout: Duration) -> Result<Container, WaitError> {
        let options = WaitOptions {
            interval: self.poll_interval,
            timeout,
        };
        wait_for_converged(
            options,
            "container",
            id,
            || self.api.get_container(id),
            |container: &Container| container.status.classify(),
        )
        .await
    }

    /// Creates the container and blocks until it converges.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] for a malformed spec, and
    /// wait/API errors otherwise.
    pub async fn create(&self, spec: ContainerSpec) -> Result<ContainerState, ResourceError> {
        let request = spec.into_request()?;
        let created = self.api.create_container(&request).await?;
        tracing::debug!(id = %created.id, name = %created.name, "container created, awaiting convergence");
        let converged = self.wait(&created.id, self.timeouts.create).await?;
        Ok(ContainerState::from_api(&self.region, converged))
    }

    /// Refreshes recorded state. `Ok(None)` means the container is gone
    /// and the engine should clear local state.
    ///
    /// # Errors
    ///
    /// Returns wait/API errors other than not-found.
    pub async fn read(&self, id: &str) -> Result<Option<ContainerState>, ResourceError> {
        let bare_id = expand_id(id);
        match self.wait(bare_id, self.timeouts.read).await {
            Ok(container) => Ok(Some(ContainerState::from_api(&self.region, container))),
            Err(WaitError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Applies the changed subset and waits for reconvergence. `Ok(None)`
    /// means the container disappeared and the engine should clear state.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] for a malformed update, and
    /// wait/API errors otherwise.
    pub async fn update(
        &self,
        id: &str,
        update: ContainerUpdate,
    ) -> Result<Option<ContainerState>, ResourceError> {
        let bare_id = expand_id(id);
        match self.wait(bare_id, self.timeouts.update).await {
            Ok(_) => {}
            Err(WaitError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        }

        let request = update.into_request(bare_id)?;
        self.api.update_container(&request).await?;

        match self.wait(bare_id, self.timeouts.update).await {
            Ok(container) => Ok(Some(ContainerState::from_api(&self.region, container))),
            Err(WaitError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes the container and waits until the API stops returning it.
    /// A container that is already gone is a success.
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

        match self.api.delete_container(bare_id).await {
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

/// CRUD front-end for triggers.
pub struct TriggerResource<A> {
    api: A,
    region: Region,
    default_project_id: String,
    timeouts: Timeouts,
    poll_interval: Duration,
}

impl<A: TriggerApi> TriggerResource<A> {
    /// Builds a front-end with the default budgets. The project id seeds
    /// event-source configurations that do not declare their own.
    #[must_use]
    pub fn new(api: A, region: Region, default_project_id: impl Into<String>) -> Self {
        Self {
            api,
            region,
            default_project_id: default_project_id.into(),
            timeouts: Timeouts::uniform(TRIGGER_TIMEOUT),
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

    async fn wait(&self, id: &str, timeout: Duration) -> Result<Trigger, WaitError> {
        let options = WaitOptions {
            interval: self.poll_interval,
            timeout,
        };
        wait_for_converged(
            options,
            "trigger",
            id,
            || self.api.get_trigger(id),
            |trigger: &Trigger| trigger.status.classify(),
        )
        .await
    }

    /// Creates the trigger and blocks until it converges. A trigger that
    /// settles in its error status is still returned; its state carries
    /// the warning diagnostic.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] for a malformed spec, and
    /// wait/API errors otherwise.
    pub async fn create(&self, spec: TriggerSpec) -> Result<TriggerState, ResourceError> {
        let request = spec.into_request(&self.region, &self.default_project_id)?;
        let created = self.api.create_trigger(&request).await?;
        tracing::debug!(id = %created.id, name = %created.name, "trigger created, awaiting convergence");
        let converged = self.wait(&created.id, self.timeouts.create).await?;
        Ok(TriggerState::from_api(&self.region, converged))
    }

    /// Refreshes recorded state. `Ok(None)` means the trigger is gone and
    /// the engine should clear local state.
    ///
    /// # Errors
    ///
    /// Returns wait/API errors other than not-found.
    pub async fn read(&self, id: &str) -> Result<Option<TriggerState>, ResourceError> {
        let bare_id = expand_id(id);
        match self.wait(bare_id, self.timeouts.read).await {
            Ok(trigger) => Ok(Some(TriggerState::from_api(&self.region, trigger))),
            Err(WaitError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Applies the changed subset and re-reads. `Ok(None)` means the
    /// trigger disappeared and the engine should clear state.
    ///
    /// # Errors
    ///
    /// Returns wait/API errors other than not-found.
    pub async fn update(
        &self,
        id: &str,
        update: TriggerUpdate,
    ) -> Result<Option<TriggerState>, ResourceError> {
        let bare_id = expand_id(id);
        match self.wait(bare_id, self.timeouts.update).await {
            Ok(_) => {}
            Err(WaitError::NotFound { .. }) => return Ok(None),
            Err(err) => return Err(err.into()),
        }

        let request = update.into_request(bare_id);
        self.api.update_trigger(&request).await?;

        match self.wait(bare_id, self.timeouts.update).await {
            Ok(trigger) => Ok(Some(TriggerState::from_api(&self.region, trigger))),
            Err(WaitError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes the trigger and waits until the API stops returning it.
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

        match self.api.delete_trigger(bare_id).await {
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

/// CRUD front-end for custom domains.
pub struct DomainResource<A> {
    api: A,
    region: Region,
    timeouts: Timeouts,
    poll_interval: Duration,
    retry_interval: Duration,
}

impl<A: DomainApi> DomainResource<A> {
    /// Builds a front-end with the default budgets.
    #[must_use]
    pub fn new(api: A, region: Region) -> Self {
        Self {
            api,
            region,
            timeouts: Timeouts::uniform(DOMAIN_TIMEOUT),
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry_interval: DOMAIN_RETRY_INTERVAL,
        }
    }

    /// Overrides the per-operation wait budgets.
    #[must_use]
    pub fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Overrides the poll and retry pacing.
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self.retry_interval = interval;
        self
    }

    async fn wait(&self, id: &str, timeout: Duration) -> Result<Domain, WaitError> {
        let options = WaitOptions {
            interval: self.poll_interval,
            timeout,
        };
        wait_for_converged(
            options,
            "domain",
            id,
            || self.api.get_domain(id),
            |domain: &Domain| domain.status.classify(),
        )
        .await
    }

    /// Creates the domain, retrying while the customer's DNS record
    /// propagates, and blocks until it converges.
    ///
    /// # Errors
    ///
    /// Returns [`ResourceError::Validation`] for a malformed spec, and
    /// wait/API errors otherwise — including the DNS validation error if
    /// it persists past the creation budget.
    pub async fn create(&self, spec: DomainSpec) -> Result<DomainState, ResourceError> {
        let request = spec.into_request()?;
        let created = retry_while_transient(
            self.retry_interval,
            self.timeouts.create,
            is_domain_validation_error,
            || self.api.create_domain(&request),
        )
        .await?;
        tracing::debug!(id = %created.id, hostname = %created.hostname, "domain created, awaiting convergence");
        let converged = self.wait(&created.id, self.timeouts.create).await?;
        Ok(DomainState::from_api(&self.region, converged))
    }

    /// Refreshes recorded state. `Ok(None)` means the domain is gone and
    /// the engine should clear local state.
    ///
    /// # Errors
    ///
    /// Returns wait/API errors other than not-found.
    pub async fn read(&self, id: &str) -> Result<Option<DomainState>, ResourceError> {
        let bare_id = expand_id(id);
        match self.wait(bare_id, self.timeouts.read).await {
            Ok(domain) => Ok(Some(DomainState::from_api(&self.region, domain))),
            Err(WaitError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes the domain and waits until the API stops returning it.
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

        match self.api.delete_domain(bare_id).await {
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
