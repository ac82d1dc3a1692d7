//! Management service client contract
//!
//! The core never talks to the management service directly; every call goes
//! through [`ManageClient`]. [`HttpManageClient`] is the production adapter,
//! tests substitute a mock.

use async_trait::async_trait;

use crate::error::RemoteError;
use crate::model::{
    CheckInitRequest, ConfigFile, GetConfigFileRequest, ListServicesRequest, ServiceAttributes,
    ServiceIdentity, ServiceMember,
};
use crate::request::CreateServiceRequest;

pub mod http;

pub use http::HttpManageClient;

/// Result of a single management service call
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Request/response operations offered by the management service
///
/// Each call completes (or fails) before the next one is issued.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ManageClient: Send + Sync {
    /// Create a catalog service; initialization continues asynchronously
    async fn create_service(&self, request: &CreateServiceRequest) -> RemoteResult<()>;

    /// Whether the service finished its post-creation initialization
    async fn check_service_init(&self, request: &CheckInitRequest) -> RemoteResult<bool>;

    async fn list_services(
        &self,
        request: &ListServicesRequest,
    ) -> RemoteResult<Vec<ServiceAttributes>>;

    async fn get_service_attributes(
        &self,
        service: &ServiceIdentity,
    ) -> RemoteResult<ServiceAttributes>;

    async fn list_service_members(
        &self,
        service: &ServiceIdentity,
    ) -> RemoteResult<Vec<ServiceMember>>;

    /// Remove the service metadata; member volumes are left in place
    async fn delete_service(&self, service: &ServiceIdentity) -> RemoteResult<()>;

    async fn get_config_file(&self, request: &GetConfigFileRequest) -> RemoteResult<ConfigFile>;
}
