//! Multi-step workflows over [`ManageClient`]
//!
//! - create a service, then wait for it to initialize
//! - delete a service while keeping track of the volumes it leaves behind

use serde::Serialize;
use tracing::{info, warn};

use crate::client::ManageClient;
use crate::error::{CoreError, Result};
use crate::model::ServiceIdentity;
use crate::progress::{InitProgressCallback, PollConfig, poll_service_init};
use crate::request::CreateServiceRequest;

/// Create a catalog service and wait for it to finish initializing
///
/// The initialization check reuses the identity and admin credentials of the
/// create request.
pub async fn create_service_and_wait(
    client: &dyn ManageClient,
    request: &CreateServiceRequest,
    config: &PollConfig,
    on_progress: Option<InitProgressCallback>,
) -> Result<()> {
    client.create_service(request).await?;
    info!(
        "The catalog service {} is created, wait till it gets initialized",
        request.spec().service().service_name
    );

    poll_service_init(client, &request.check_init_request(), config, on_progress).await
}

/// Outcome of a successful service deletion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub service: ServiceIdentity,
    /// Volumes of the deleted members, in member order; these still exist
    pub volume_ids: Vec<String>,
}

/// Delete a service's metadata, reporting the volumes that must be removed by hand
///
/// Members are enumerated first because the member list may no longer be
/// available once the service record is gone. Volumes are never deleted.
///
/// If enumeration fails nothing is deleted. If the delete call fails the
/// captured volume IDs travel with the error as [`CoreError::DeleteFailed`].
///
/// Enumeration and deletion are separate calls, so a member added in between
/// is deleted with the service but missing from the report.
pub async fn delete_service_retaining_volumes(
    client: &dyn ManageClient,
    service: &ServiceIdentity,
) -> Result<DeletionReport> {
    let members = client.list_service_members(service).await?;
    let volume_ids: Vec<String> = members.into_iter().map(|m| m.volume_id).collect();
    info!(
        "Service {} has {} member volumes",
        service.service_name,
        volume_ids.len()
    );

    if let Err(source) = client.delete_service(service).await {
        warn!("DeleteService error for {}: {}", service.service_name, source);
        return Err(CoreError::DeleteFailed { volume_ids, source });
    }

    Ok(DeletionReport {
        service: service.clone(),
        volume_ids,
    })
}
