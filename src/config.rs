//! Provider configuration loading via `ortho-config`.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::api::DEFAULT_API_ROOT;
use crate::api::locality::{Region, Zone};

/// Credentials and defaults shared by every resource front-end, merged
/// from configuration files and environment variables.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(prefix = "SCW")]
pub struct ProviderConfig {
    /// Access key assigned to the API application. Not required for API
    /// calls, but captured to support future audit logging.
    pub access_key: Option<String>,
    /// Secret key used for authentication. This value is required.
    pub secret_key: String,
    /// Organisation identifier used by some endpoints.
    pub default_organization_id: Option<String>,
    /// Project identifier used for billing and resource scoping.
    pub default_project_id: String,
    /// Preferred region for regional resources. Defaults to `fr-par`.
    #[ortho_config(default = "fr-par".to_owned())]
    pub default_region: String,
    /// Preferred zone for zonal resources. Defaults to `fr-par-1`.
    #[ortho_config(default = "fr-par-1".to_owned())]
    pub default_zone: String,
    /// Root of the API, overridable for test stubs.
    #[ortho_config(default = "https://api.scaleway.com".to_owned())]
    pub api_url: String,
}

/// Metadata for a configuration field, used to generate actionable error
/// messages.
struct FieldMetadata {
    description: &'static str,
    env_var: &'static str,
    toml_key: &'static str,
}

impl FieldMetadata {
    const fn new(description: &'static str, env_var: &'static str, toml_key: &'static str) -> Self {
        Self {
            description,
            env_var,
            toml_key,
        }
    }
}

impl ProviderConfig {
    fn require_field(value: &str, metadata: &FieldMetadata) -> Result<(), ConfigError> {
        if value.trim().is_empty() {
            return Err(ConfigError::MissingField(format!(
                "missing {}: set {} or add {} to the provider configuration",
                metadata.description, metadata.env_var, metadata.toml_key
            )));
        }
        Ok(())
    }

    /// Loads configuration without parsing CLI arguments. Values merge
    /// defaults, configuration files, and environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge
    /// sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load_from_iter([std::ffi::OsString::from("nuage")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// The configured default region as a typed locality.
    #[must_use]
    pub fn region(&self) -> Region {
        Region::from(self.default_region.as_str())
    }

    /// The configured default zone as a typed locality.
    #[must_use]
    pub fn zone(&self) -> Zone {
        Zone::from(self.default_zone.as_str())
    }

    /// Performs semantic validation on required fields. Error messages
    /// include guidance on how to provide missing values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when a required field is
    /// empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Self::require_field(
            &self.secret_key,
            &FieldMetadata::new("API secret key", "SCW_SECRET_KEY", "secret_key"),
        )?;
        Self::require_field(
            &self.default_project_id,
            &FieldMetadata::new("project ID", "SCW_DEFAULT_PROJECT_ID", "default_project_id"),
        )?;
        Self::require_field(
            &self.default_region,
            &FieldMetadata::new("region", "SCW_DEFAULT_REGION", "default_region"),
        )?;
        Self::require_field(
            &self.default_zone,
            &FieldMetadata::new("availability zone", "SCW_DEFAULT_ZONE", "default_zone"),
        )?;
        Self::require_field(
            &self.api_url,
            &FieldMetadata::new("API root URL", "SCW_API_URL", "api_url"),
        )?;
        Ok(())
    }
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// Indicates a required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProviderConfig {
        ProviderConfig {
            access_key: None,
            secret_key: String::from("secret"),
            default_organization_id: None,
            default_project_id: String::from("proj"),
            default_region: String::from("fr-par"),
            default_zone: String::from("fr-par-1"),
            api_url: String::from(DEFAULT_API_ROOT),
        }
    }

    #[test]
    fn complete_config_validates() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn blank_secret_key_is_rejected_with_guidance() {
        let mut broken = config();
        broken.secret_key = String::from("  ");
        let err = match broken.validate() {
            Err(err) => err,
            Ok(()) => panic!("expected a validation failure"),
        };
        assert!(err.to_string().contains("SCW_SECRET_KEY"));
    }

    #[test]
    fn localities_are_exposed_typed() {
        let loaded = config();
        assert_eq!(loaded.region().as_str(), "fr-par");
        assert_eq!(loaded.zone().region().as_str(), "fr-par");
    }
}
