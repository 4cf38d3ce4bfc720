//! Persisted CLI settings.
//!
//! Settings live in `config.yml` under the user's configuration directory
//! (`NIMBUS_CONFIG_DIR` overrides the directory). They supply defaults for the
//! global flags, the access token and service endpoints.

use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::debug;

use crate::{format::OutputFormat, print::Verbosity, sdk::Service};

pub const DEFAULT_APPLICATION_ID: &str = "nimbus";
pub const DEFAULT_CONFIGURATION_FILE_NAME: &str = "config.yml";
pub const CONFIG_DIR_ENV: &str = "NIMBUS_CONFIG_DIR";
pub const ACCESS_TOKEN_ENV: &str = "NIMBUS_ACCESS_TOKEN";

pub const KEY_PROJECT_ID: &str = "project-id";
pub const KEY_REGION: &str = "region";
pub const KEY_OUTPUT_FORMAT: &str = "output-format";
pub const KEY_VERBOSITY: &str = "verbosity";
pub const KEY_ACCESS_TOKEN: &str = "access-token";
pub const KEY_WAIT_TIMEOUT: &str = "wait-timeout-seconds";

/// Every key that `config unset` accepts.
pub fn keys() -> Vec<&'static str> {
    let mut keys = vec![
        KEY_PROJECT_ID,
        KEY_REGION,
        KEY_OUTPUT_FORMAT,
        KEY_VERBOSITY,
        KEY_ACCESS_TOKEN,
        KEY_WAIT_TIMEOUT,
    ];
    keys.extend(Service::ALL.iter().map(|service| service.endpoint_key()));
    keys
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigurationError {
    #[error("failed to resolve the configuration directory")]
    FailedToFindConfigurationDirectory,
    #[error("failed to load configuration data, because of: {cause}")]
    FailedToLoadData {
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("failed to write configuration data to file, because of: {cause}")]
    FailedToWriteData {
        cause: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("unknown configuration key {key:?}")]
    UnknownKey { key: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_format: Option<OutputFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verbosity: Option<Verbosity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_timeout_seconds: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redis_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iaas_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub service_account_endpoint: Option<String>,
}

impl Configuration {
    pub fn get_default_configuration_file_path() -> Result<PathBuf, ConfigurationError> {
        if let Ok(config_dir_str) = std::env::var(CONFIG_DIR_ENV) {
            let mut config_path = PathBuf::from(config_dir_str);
            config_path.push(DEFAULT_CONFIGURATION_FILE_NAME);
            return Ok(config_path);
        }

        let mut path = config_dir().ok_or(ConfigurationError::FailedToFindConfigurationDirectory)?;
        path.push(DEFAULT_APPLICATION_ID);
        path.push(DEFAULT_CONFIGURATION_FILE_NAME);
        Ok(path)
    }

    /// Load the default configuration file. A missing file yields defaults.
    pub fn load_default() -> Result<Configuration, ConfigurationError> {
        let path = Configuration::get_default_configuration_file_path()?;
        debug!("Loading configuration from {}...", path.display());
        Configuration::load_from_file(&path)
    }

    pub fn load_from_file(path: &Path) -> Result<Configuration, ConfigurationError> {
        match fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Ok(Configuration::default()),
            Ok(content) => serde_yaml::from_str(&content)
                .map_err(|cause| ConfigurationError::FailedToLoadData {
                    cause: Box::new(cause),
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Configuration file not found, using defaults");
                Ok(Configuration::default())
            }
            Err(cause) => Err(ConfigurationError::FailedToLoadData {
                cause: Box::new(cause),
            }),
        }
    }

    pub fn write(&self, writer: impl Write) -> Result<(), ConfigurationError> {
        serde_yaml::to_writer(writer, self)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigurationError> {
        let directory = path
            .parent()
            .ok_or(ConfigurationError::FailedToFindConfigurationDirectory)?;
        fs::create_dir_all(directory)
            .map_err(|_| ConfigurationError::FailedToFindConfigurationDirectory)?;

        let file = File::create(path)
            .map_err(|e| ConfigurationError::FailedToWriteData { cause: Box::new(e) })?;
        self.write(file)
    }

    /// The access token, from the environment first.
    pub fn access_token(&self) -> Option<String> {
        std::env::var(ACCESS_TOKEN_ENV)
            .ok()
            .or_else(|| self.access_token.clone())
            .filter(|token| !token.trim().is_empty())
    }

    fn endpoint_slot(&mut self, service: Service) -> &mut Option<String> {
        match service {
            Service::Dns => &mut self.dns_endpoint,
            Service::Redis => &mut self.redis_endpoint,
            Service::Iaas => &mut self.iaas_endpoint,
            Service::ServiceAccount => &mut self.service_account_endpoint,
        }
    }

    pub fn configured_endpoint(&self, service: Service) -> Option<&str> {
        match service {
            Service::Dns => self.dns_endpoint.as_deref(),
            Service::Redis => self.redis_endpoint.as_deref(),
            Service::Iaas => self.iaas_endpoint.as_deref(),
            Service::ServiceAccount => self.service_account_endpoint.as_deref(),
        }
    }

    /// Base URL of a service: environment, then configuration, then built-in.
    pub fn endpoint(&self, service: Service) -> String {
        std::env::var(service.endpoint_env())
            .ok()
            .or_else(|| self.configured_endpoint(service).map(str::to_string))
            .unwrap_or_else(|| service.default_endpoint().to_string())
    }

    pub fn set_endpoint(&mut self, service: Service, endpoint: Option<String>) {
        *self.endpoint_slot(service) = endpoint;
    }

    pub fn wait_timeout(&self) -> Option<Duration> {
        self.wait_timeout_seconds.map(Duration::from_secs)
    }

    /// Remove one setting by key.
    pub fn unset(&mut self, key: &str) -> Result<(), ConfigurationError> {
        match key {
            KEY_PROJECT_ID => self.project_id = None,
            KEY_REGION => self.region = None,
            KEY_OUTPUT_FORMAT => self.output_format = None,
            KEY_VERBOSITY => self.verbosity = None,
            KEY_ACCESS_TOKEN => self.access_token = None,
            KEY_WAIT_TIMEOUT => self.wait_timeout_seconds = None,
            other => {
                let service = Service::ALL
                    .iter()
                    .find(|service| service.endpoint_key() == other)
                    .ok_or_else(|| ConfigurationError::UnknownKey {
                        key: other.to_string(),
                    })?;
                self.set_endpoint(*service, None);
            }
        }
        Ok(())
    }

    /// Settings as key/value pairs, in a stable order. The token is masked.
    pub fn entries(&self) -> Vec<(&'static str, String)> {
        let mut entries = Vec::new();
        if let Some(project_id) = &self.project_id {
            entries.push((KEY_PROJECT_ID, project_id.clone()));
        }
        if let Some(region) = &self.region {
            entries.push((KEY_REGION, region.clone()));
        }
        if let Some(output_format) = self.output_format {
            entries.push((KEY_OUTPUT_FORMAT, output_format.to_string()));
        }
        if let Some(verbosity) = self.verbosity {
            entries.push((KEY_VERBOSITY, verbosity.to_string()));
        }
        if self.access_token.is_some() {
            entries.push((KEY_ACCESS_TOKEN, "<set>".to_string()));
        }
        if let Some(seconds) = self.wait_timeout_seconds {
            entries.push((KEY_WAIT_TIMEOUT, seconds.to_string()));
        }
        for service in Service::ALL {
            if let Some(endpoint) = self.configured_endpoint(service) {
                entries.push((service.endpoint_key(), endpoint.to_string()));
            }
        }
        entries
    }
}
