//! Connection settings for the management service
//!
//! Resolves the server URL and TLS material once per invocation. Everything
//! here is checked before the first request is sent.

use std::path::PathBuf;
use std::time::Duration;

use tracing::{debug, warn};
use url::Url;

use crate::error::{CoreError, Result};

/// Port the management service listens on
pub const DEFAULT_MANAGE_SERVICE_PORT: u16 = 27040;

/// Default per-request timeout for management service calls
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MANAGE_SERVICE_NAME: &str = "catalog-manageserver";
const DOMAIN_SUFFIX: &str = "catalog.local";

/// CA, certificate and key used to secure the management channel
///
/// Either all three paths are configured or none; see [`TlsMaterial::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsMaterial {
    pub ca_path: PathBuf,
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

impl TlsMaterial {
    /// Build TLS material from the raw flag values
    ///
    /// Empty strings count as unset. One or two paths is always an error;
    /// TLS enabled without paths is an error; three paths with TLS disabled
    /// are ignored.
    pub fn resolve(
        enabled: bool,
        ca: Option<&str>,
        cert: Option<&str>,
        key: Option<&str>,
    ) -> Result<Option<Self>> {
        let (ca, cert, key) = (present(ca), present(cert), present(key));

        match (ca, cert, key) {
            (Some(ca), Some(cert), Some(key)) => {
                if !enabled {
                    warn!("TLS files configured but TLS is not enabled, ignoring them");
                    return Ok(None);
                }
                Ok(Some(Self {
                    ca_path: expand_path(ca)?,
                    cert_path: expand_path(cert)?,
                    key_path: expand_path(key)?,
                }))
            }
            (None, None, None) if !enabled => Ok(None),
            (ca, cert, key) => Err(CoreError::Config(format!(
                "tls {} with incomplete material: ca file {}, cert file {}, key file {}",
                if enabled { "enabled" } else { "disabled" },
                ca.unwrap_or("<unset>"),
                cert.unwrap_or("<unset>"),
                key.unwrap_or("<unset>")
            ))),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn expand_path(raw: &str) -> Result<PathBuf> {
    shellexpand::full(raw)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| CoreError::Config(format!("failed to expand path '{}': {}", raw, e)))
}

/// Default management service URL for a cluster
pub fn default_server_url(cluster: &str, tls: bool) -> String {
    format!(
        "{}://{}.{}-{}:{}/",
        scheme(tls),
        MANAGE_SERVICE_NAME,
        cluster,
        DOMAIN_SUFFIX,
        DEFAULT_MANAGE_SERVICE_PORT
    )
}

/// Rewrite a user supplied URL for the scheme in use
///
/// Any existing `http://`/`https://` prefix is replaced and a trailing slash
/// is added so relative API paths join underneath it.
pub fn format_server_url(raw: &str, tls: bool) -> String {
    let trimmed = raw.trim();
    let lower = trimmed.to_ascii_lowercase();
    let host = if lower.starts_with("https://") {
        &trimmed["https://".len()..]
    } else if lower.starts_with("http://") {
        &trimmed["http://".len()..]
    } else {
        trimmed
    };

    let mut url = format!("{}://{}", scheme(tls), host);
    if !url.ends_with('/') {
        url.push('/');
    }
    url
}

fn scheme(tls: bool) -> &'static str {
    if tls { "https" } else { "http" }
}

/// Everything needed to build a management client for one invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub server_url: Url,
    pub tls: Option<TlsMaterial>,
    pub request_timeout: Duration,
}

impl ConnectionSettings {
    /// Resolve the server URL: explicit if given, otherwise derived from the cluster
    pub fn resolve(
        server_url: Option<&str>,
        cluster: &str,
        tls: Option<TlsMaterial>,
        request_timeout: Duration,
    ) -> Result<Self> {
        let tls_enabled = tls.is_some();
        let raw = match server_url.map(str::trim).filter(|s| !s.is_empty()) {
            Some(url) => format_server_url(url, tls_enabled),
            None => default_server_url(cluster, tls_enabled),
        };
        debug!("Management service URL: {}", raw);

        let server_url = Url::parse(&raw)
            .map_err(|e| CoreError::Config(format!("invalid server url '{}': {}", raw, e)))?;

        Ok(Self {
            server_url,
            tls,
            request_timeout,
        })
    }
}
