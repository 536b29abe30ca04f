//! Client configuration.
//!
//! Loaded from an optional YAML file and `GCLOUD_IAM__*` environment
//! variables, with the standard `GOOGLE_API_USE_MTLS_ENDPOINT` and
//! `GOOGLE_API_USE_CLIENT_CERTIFICATE` variables consulted for mTLS.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::transport::{ChannelSettings, ClientIdentity, DEFAULT_TRANSPORT};

/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "GCLOUD_IAM_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "GCLOUD_IAM";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "GCLOUD_IAM_LOG";
/// `auto`, `never` or `always`.
pub const USE_MTLS_ENDPOINT_ENV_VAR: &str = "GOOGLE_API_USE_MTLS_ENDPOINT";
/// `true` or `false`.
pub const USE_CLIENT_CERTIFICATE_ENV_VAR: &str = "GOOGLE_API_USE_CLIENT_CERTIFICATE";

/// Default host for the IAM v2 Policies service.
pub const DEFAULT_POLICIES_ENDPOINT: &str = "iam.googleapis.com";
/// Default host for the IAM Credentials service.
pub const DEFAULT_CREDENTIALS_ENDPOINT: &str = "iamcredentials.googleapis.com";

/// When to switch to the mTLS variant of the default endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MtlsEndpointMode {
    /// Use the mTLS endpoint only when a client certificate is in use.
    #[default]
    Auto,
    Never,
    Always,
}

impl std::str::FromStr for MtlsEndpointMode {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "auto" => Ok(Self::Auto),
            "never" => Ok(Self::Never),
            "always" => Ok(Self::Always),
            other => Err(ClientError::Config(format!(
                "{} must be one of auto, never, always; got '{}'",
                USE_MTLS_ENDPOINT_ENV_VAR, other
            ))),
        }
    }
}

/// Settings shared by both service clients.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Overrides the Policies endpoint (host, host:port or full URI).
    pub endpoint: Option<String>,
    /// Overrides the IAM Credentials endpoint.
    pub credentials_endpoint: Option<String>,
    /// Registry name of the transport.
    pub transport: String,
    /// Falls back to `GOOGLE_API_USE_MTLS_ENDPOINT`.
    pub use_mtls_endpoint: Option<MtlsEndpointMode>,
    /// Falls back to `GOOGLE_API_USE_CLIENT_CERTIFICATE`.
    pub use_client_certificate: Option<bool>,
    pub client_cert_path: Option<PathBuf>,
    pub client_key_path: Option<PathBuf>,
    /// Project billed for quota (`x-goog-user-project`).
    pub quota_project_id: Option<String>,
    pub api_key: Option<String>,
    pub access_token: Option<String>,
    pub connect_timeout_secs: Option<u64>,
    /// Per-attempt timeout applied to every method.
    pub request_timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            credentials_endpoint: None,
            transport: DEFAULT_TRANSPORT.to_string(),
            use_mtls_endpoint: None,
            use_client_certificate: None,
            client_cert_path: None,
            client_key_path: None,
            quota_project_id: None,
            api_key: None,
            access_token: None,
            connect_timeout_secs: None,
            request_timeout_secs: None,
            user_agent: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. File specified by `path` argument (if provided)
    /// 2. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 3. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// As [`load`](Self::load), reading prefixed variables from `env` instead
    /// of the process environment when given.
    pub fn load_with_env(
        path: Option<&str>,
        env: Option<::config::Map<String, String>>,
    ) -> Result<Self> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder();

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if env.is_none() {
            if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
                builder =
                    builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
            }
        }

        let config = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()?;

        let config: ClientConfig = config.try_deserialize()?;
        config.validate()?;
        debug!(transport = %config.transport, "Loaded client configuration");
        Ok(config)
    }

    /// Reject combinations the clients cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.is_some() && self.access_token.is_some() {
            return Err(ClientError::Config(
                "api_key and access_token are mutually exclusive".to_string(),
            ));
        }
        if self.client_cert_path.is_some() != self.client_key_path.is_some() {
            return Err(ClientError::Config(
                "client_cert_path and client_key_path must be set together".to_string(),
            ));
        }
        Ok(())
    }

    /// The mTLS endpoint mode, from the config or the environment.
    pub fn mtls_mode(&self) -> Result<MtlsEndpointMode> {
        match self.use_mtls_endpoint {
            Some(mode) => Ok(mode),
            None => match std::env::var(USE_MTLS_ENDPOINT_ENV_VAR) {
                Ok(value) => value.parse(),
                Err(_) => Ok(MtlsEndpointMode::Auto),
            },
        }
    }

    /// Whether the configured client certificate should be presented.
    pub fn use_client_cert(&self) -> Result<bool> {
        match self.use_client_certificate {
            Some(flag) => Ok(flag),
            None => match std::env::var(USE_CLIENT_CERTIFICATE_ENV_VAR) {
                Ok(value) => parse_bool_flag(&value),
                Err(_) => Ok(false),
            },
        }
    }

    /// True when a client certificate will be sent.
    pub fn has_client_cert(&self) -> Result<bool> {
        Ok(self.use_client_cert()? && self.client_cert_path.is_some())
    }

    /// Effective URI for the Policies service.
    pub fn policies_endpoint(&self) -> Result<String> {
        self.resolve_endpoint(self.endpoint.as_deref(), DEFAULT_POLICIES_ENDPOINT)
    }

    /// Effective URI for the IAM Credentials service.
    pub fn credentials_endpoint(&self) -> Result<String> {
        self.resolve_endpoint(
            self.credentials_endpoint.as_deref(),
            DEFAULT_CREDENTIALS_ENDPOINT,
        )
    }

    fn resolve_endpoint(&self, explicit: Option<&str>, default: &str) -> Result<String> {
        if let Some(endpoint) = explicit {
            return Ok(endpoint_uri(endpoint));
        }
        let use_mtls = match self.mtls_mode()? {
            MtlsEndpointMode::Always => true,
            MtlsEndpointMode::Never => false,
            MtlsEndpointMode::Auto => self.has_client_cert()?,
        };
        let host = if use_mtls {
            mtls_endpoint(default)
        } else {
            default.to_string()
        };
        Ok(endpoint_uri(&host))
    }

    /// Per-attempt timeout override for every method.
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Channel settings for `uri`, reading the client certificate if one is in use.
    pub async fn channel_settings(&self, uri: String) -> Result<ChannelSettings> {
        let identity = match (&self.client_cert_path, &self.client_key_path) {
            (Some(cert), Some(key)) if self.use_client_cert()? => Some(ClientIdentity {
                cert_pem: read_pem(cert).await?,
                key_pem: read_pem(key).await?,
            }),
            _ => None,
        };
        Ok(ChannelSettings {
            uri,
            identity,
            connect_timeout: self.connect_timeout_secs.map(Duration::from_secs),
            user_agent: self.user_agent.clone(),
        })
    }
}

async fn read_pem(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))
}

fn parse_bool_flag(value: &str) -> Result<bool> {
    match value {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(ClientError::Config(format!(
            "{} must be 'true' or 'false'; got '{}'",
            USE_CLIENT_CERTIFICATE_ENV_VAR, other
        ))),
    }
}

/// Convert a `*.googleapis.com` host to its mTLS variant.
///
/// `foo.googleapis.com` becomes `foo.mtls.googleapis.com` and
/// `foo.sandbox.googleapis.com` becomes `foo.mtls.sandbox.googleapis.com`.
/// Hosts already on mTLS and non-Google hosts are returned unchanged.
pub fn mtls_endpoint(endpoint: &str) -> String {
    let (host, port) = match endpoint.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => {
            (host, Some(port))
        }
        _ => (endpoint, None),
    };

    let converted = match host.split_once('.') {
        Some((name, rest))
            if rest == "googleapis.com" || rest == "sandbox.googleapis.com" =>
        {
            format!("{}.mtls.{}", name, rest)
        }
        _ => host.to_string(),
    };

    match port {
        Some(port) => format!("{}:{}", converted, port),
        None => converted,
    }
}

/// Turn a bare host into an `https://host:443` URI; URIs pass through.
pub fn endpoint_uri(endpoint: &str) -> String {
    if endpoint.contains("://") {
        return endpoint.to_string();
    }
    if endpoint.rsplit_once(':').is_some_and(|(_, port)| {
        !port.is_empty() && port.chars().all(|c| c.is_ascii_digit())
    }) {
        format!("https://{}", endpoint)
    } else {
        format!("https://{}:443", endpoint)
    }
}
