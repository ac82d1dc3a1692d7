//! HTTP adapter for the management service
//!
//! Every operation is a JSON `POST` under the versioned API root. TLS, when
//! configured, is set up once here and reused for every call.

use async_trait::async_trait;
use reqwest::{Certificate, Identity, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, trace};
use url::Url;

use super::{ManageClient, RemoteResult};
use crate::connection::{ConnectionSettings, TlsMaterial};
use crate::error::{CoreError, RemoteError, Result};
use crate::model::{
    CheckInitRequest, ConfigFile, GetConfigFileRequest, ListServicesRequest, ServiceAttributes,
    ServiceIdentity, ServiceMember,
};
use crate::request::CreateServiceRequest;

/// User agent string for catalogctl HTTP requests
const CATALOGCTL_USER_AGENT: &str = concat!("catalogctl/", env!("CARGO_PKG_VERSION"));

const CREATE_SERVICE_PATH: &str = "v1/services/create";
const CHECK_INIT_PATH: &str = "v1/services/check-init";
const LIST_SERVICES_PATH: &str = "v1/services/list";
const GET_SERVICE_PATH: &str = "v1/services/get";
const LIST_MEMBERS_PATH: &str = "v1/services/members";
const DELETE_SERVICE_PATH: &str = "v1/services/delete";
const GET_CONFIG_FILE_PATH: &str = "v1/config-files/get";

#[derive(serde::Deserialize)]
struct CheckInitResponse {
    initialized: bool,
}

#[derive(serde::Deserialize)]
struct ListServicesResponse {
    #[serde(default)]
    services: Vec<ServiceAttributes>,
}

#[derive(serde::Deserialize)]
struct ListMembersResponse {
    #[serde(default)]
    members: Vec<ServiceMember>,
}

/// [`ManageClient`] over HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpManageClient {
    http: reqwest::Client,
    base_url: Url,
}

impl HttpManageClient {
    /// Build the client, loading TLS material from disk if configured
    pub fn new(settings: &ConnectionSettings) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(CATALOGCTL_USER_AGENT)
            .timeout(settings.request_timeout);

        if let Some(tls) = &settings.tls {
            let (ca, identity) = load_tls_material(tls)?;
            builder = builder.add_root_certificate(ca).identity(identity);
            debug!("Client TLS configured from {}", tls.cert_path.display());
        }

        let http = builder
            .build()
            .map_err(|e| CoreError::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: settings.server_url.clone(),
        })
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> RemoteResult<T>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let bytes = self.send(path, body).await?;
        serde_json::from_slice(&bytes).map_err(|e| {
            RemoteError::network(format!("invalid response from {}: {}", path, e))
        })
    }

    async fn post_no_content<B>(&self, path: &str, body: &B) -> RemoteResult<()>
    where
        B: Serialize + ?Sized + Sync,
    {
        self.send(path, body).await.map(|_| ())
    }

    async fn send<B>(&self, path: &str, body: &B) -> RemoteResult<Vec<u8>>
    where
        B: Serialize + ?Sized + Sync,
    {
        let url = self
            .base_url
            .join(path)
            .map_err(|e| RemoteError::network(format!("invalid request url {}: {}", path, e)))?;
        trace!("POST {}", url);

        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(transport_error)?;
        debug!("POST {} -> {}", path, status);

        if status.is_success() {
            Ok(bytes.to_vec())
        } else {
            Err(status_error(status, &bytes))
        }
    }
}

fn load_tls_material(tls: &TlsMaterial) -> Result<(Certificate, Identity)> {
    let read = |path: &std::path::Path, what: &str| {
        std::fs::read(path).map_err(|e| {
            CoreError::Config(format!("failed to read {} {}: {}", what, path.display(), e))
        })
    };

    let ca_pem = read(&tls.ca_path, "ca file")?;
    let ca = Certificate::from_pem(&ca_pem)
        .map_err(|e| CoreError::Config(format!("invalid ca file: {}", e)))?;

    let mut identity_pem = read(&tls.cert_path, "cert file")?;
    identity_pem.push(b'\n');
    identity_pem.extend(read(&tls.key_path, "key file")?);
    let identity = Identity::from_pem(&identity_pem)
        .map_err(|e| CoreError::Config(format!("invalid cert or key file: {}", e)))?;

    Ok((ca, identity))
}

fn transport_error(err: reqwest::Error) -> RemoteError {
    if err.is_timeout() {
        RemoteError::network(format!("request timed out: {}", err))
    } else {
        RemoteError::network(err.to_string())
    }
}

fn status_error(status: StatusCode, body: &[u8]) -> RemoteError {
    let message = serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|v| {
            v.get("error")
                .or_else(|| v.get("message"))
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| String::from_utf8_lossy(body).trim().to_string());
    let message = format!("HTTP {}: {}", status.as_u16(), message);

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::auth(message),
        StatusCode::NOT_FOUND => RemoteError::not_found(message),
        StatusCode::BAD_REQUEST
        | StatusCode::CONFLICT
        | StatusCode::PRECONDITION_FAILED
        | StatusCode::UNPROCESSABLE_ENTITY => RemoteError::validation(message),
        _ => RemoteError::network(message),
    }
}

#[async_trait]
impl ManageClient for HttpManageClient {
    async fn create_service(&self, request: &CreateServiceRequest) -> RemoteResult<()> {
        self.post_no_content(CREATE_SERVICE_PATH, request).await
    }

    async fn check_service_init(&self, request: &CheckInitRequest) -> RemoteResult<bool> {
        let response: CheckInitResponse = self.post(CHECK_INIT_PATH, request).await?;
        Ok(response.initialized)
    }

    async fn list_services(
        &self,
        request: &ListServicesRequest,
    ) -> RemoteResult<Vec<ServiceAttributes>> {
        let response: ListServicesResponse = self.post(LIST_SERVICES_PATH, request).await?;
        Ok(response.services)
    }

    async fn get_service_attributes(
        &self,
        service: &ServiceIdentity,
    ) -> RemoteResult<ServiceAttributes> {
        self.post(GET_SERVICE_PATH, service).await
    }

    async fn list_service_members(
        &self,
        service: &ServiceIdentity,
    ) -> RemoteResult<Vec<ServiceMember>> {
        let response: ListMembersResponse = self.post(LIST_MEMBERS_PATH, service).await?;
        Ok(response.members)
    }

    async fn delete_service(&self, service: &ServiceIdentity) -> RemoteResult<()> {
        self.post_no_content(DELETE_SERVICE_PATH, service).await
    }

    async fn get_config_file(&self, request: &GetConfigFileRequest) -> RemoteResult<ConfigFile> {
        self.post(GET_CONFIG_FILE_PATH, request).await
    }
}
