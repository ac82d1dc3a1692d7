//! # catalogctl-core
//!
//! Service-lifecycle orchestration for catalog database services (document
//! stores, relational stores) running on a managed cluster.
//!
//! The crate owns the control flow of the `catalogctl` CLI and nothing else:
//!
//! - **[`dispatch`](mod@dispatch)** validates raw input into an [`Invocation`] and routes the
//!   resulting [`Command`] to one handler
//! - **[`request`]** builds typed create requests per service type
//! - **[`progress`]** waits for a newly created service to finish initializing
//! - **[`workflows`]** sequences create-and-wait and volume-preserving deletion
//! - **[`client`]** defines the [`ManageClient`] contract and its HTTP adapter
//! - **[`connection`]** resolves the server URL and TLS material
//! - **[`config`]** reads optional connection profiles from disk
//!
//! Rendering results and mapping errors to exit codes stays in the binary.

pub mod client;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod progress;
pub mod request;
pub mod workflows;

pub use client::{HttpManageClient, ManageClient, RemoteResult};
pub use config::{Config, ConfigError, Profile};
pub use connection::{ConnectionSettings, TlsMaterial};
pub use dispatch::{Command, CommandArgs, Invocation, Operation, OperationOutput, dispatch};
pub use error::{CoreError, RemoteError, RemoteErrorKind, Result};
pub use model::{
    CheckInitRequest, ConfigFile, Credentials, GetConfigFileRequest, ListServicesRequest,
    MemberConfig, ResourceSpec, ServiceAttributes, ServiceIdentity, ServiceMember, ServiceType,
};
pub use progress::{
    InitPoller, InitProgressCallback, InitProgressEvent, PollConfig, PollState, poll_service_init,
};
pub use request::{CreateServiceParams, CreateServiceRequest, CreateServiceSpec};
pub use workflows::{DeletionReport, create_service_and_wait, delete_service_retaining_volumes};
