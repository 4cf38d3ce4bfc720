//! Typed clients for the cloud service APIs.
//!
//! Each service exposes an async trait that the commands depend on, and an
//! implementation backed by the shared [`HttpClient`]. Clients are built on
//! demand through a [`ClientFactory`], so commands that never reach the
//! network never need credentials.

pub mod dns;
#[cfg(test)]
pub(crate) mod fake;
pub mod iaas;
pub mod redis;
pub mod service_account;
mod transport;

pub use transport::HttpClient;

use tracing::debug;

use crate::{configuration::Configuration, error::CliError};

use self::{
    dns::{DnsApi, HttpDnsClient},
    iaas::{HttpIaasClient, IaasApi},
    redis::{HttpRedisClient, RedisApi},
    service_account::{HttpServiceAccountClient, ServiceAccountApi},
};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("request was not authorized (HTTP {status})")]
    Unauthorized { status: u16 },
    #[error("resource not found")]
    NotFound,
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("JSON parsing error: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("query encoding error: {0}")]
    Query(#[from] serde_urlencoded::ser::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

/// The services the CLI talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Dns,
    Redis,
    Iaas,
    ServiceAccount,
}

impl Service {
    pub const ALL: [Service; 4] = [
        Service::Dns,
        Service::Redis,
        Service::Iaas,
        Service::ServiceAccount,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Service::Dns => "dns",
            Service::Redis => "redis",
            Service::Iaas => "iaas",
            Service::ServiceAccount => "service-account",
        }
    }

    /// Configuration key and flag name of the endpoint override.
    pub fn endpoint_key(&self) -> &'static str {
        match self {
            Service::Dns => "dns-endpoint",
            Service::Redis => "redis-endpoint",
            Service::Iaas => "iaas-endpoint",
            Service::ServiceAccount => "service-account-endpoint",
        }
    }

    pub fn endpoint_env(&self) -> &'static str {
        match self {
            Service::Dns => "NIMBUS_DNS_ENDPOINT",
            Service::Redis => "NIMBUS_REDIS_ENDPOINT",
            Service::Iaas => "NIMBUS_IAAS_ENDPOINT",
            Service::ServiceAccount => "NIMBUS_SERVICE_ACCOUNT_ENDPOINT",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            Service::Dns => "https://dns.api.nimbus.cloud",
            Service::Redis => "https://redis.api.nimbus.cloud",
            Service::Iaas => "https://iaas.api.nimbus.cloud",
            Service::ServiceAccount => "https://service-account.api.nimbus.cloud",
        }
    }
}

/// Builds service clients for one invocation.
pub trait ClientFactory {
    fn dns(&self) -> Result<Box<dyn DnsApi>, CliError>;
    fn redis(&self) -> Result<Box<dyn RedisApi>, CliError>;
    fn iaas(&self) -> Result<Box<dyn IaasApi>, CliError>;
    fn service_account(&self) -> Result<Box<dyn ServiceAccountApi>, CliError>;
}

/// Factory producing HTTP clients from the loaded configuration.
pub struct HttpClientFactory {
    configuration: Configuration,
}

impl HttpClientFactory {
    pub fn new(configuration: Configuration) -> Self {
        Self { configuration }
    }

    fn client(&self, service: Service) -> Result<HttpClient, CliError> {
        let token = self
            .configuration
            .access_token()
            .ok_or(CliError::AuthenticationFailed)?;
        let endpoint = self.configuration.endpoint(service);
        debug!("Configuring the {} client for {}", service.name(), endpoint);
        HttpClient::new(&endpoint, token).map_err(CliError::upstream(format!(
            "configure the {} API client",
            service.name()
        )))
    }
}

impl ClientFactory for HttpClientFactory {
    fn dns(&self) -> Result<Box<dyn DnsApi>, CliError> {
        Ok(Box::new(HttpDnsClient::new(self.client(Service::Dns)?)))
    }

    fn redis(&self) -> Result<Box<dyn RedisApi>, CliError> {
        Ok(Box::new(HttpRedisClient::new(self.client(Service::Redis)?)))
    }

    fn iaas(&self) -> Result<Box<dyn IaasApi>, CliError> {
        Ok(Box::new(HttpIaasClient::new(self.client(Service::Iaas)?)))
    }

    fn service_account(&self) -> Result<Box<dyn ServiceAccountApi>, CliError> {
        Ok(Box::new(HttpServiceAccountClient::new(
            self.client(Service::ServiceAccount)?,
        )))
    }
}
