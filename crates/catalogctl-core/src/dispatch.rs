//! Operation dispatch
//!
//! [`Invocation::from_args`] turns raw command arguments into one immutable,
//! fully validated value. Nothing is sent before validation passes.
//! [`dispatch`] then routes the validated [`Command`] to exactly one handler
//! and returns what happened as an [`OperationOutput`]. Printing and exit codes
//! are left to the caller.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info};

use crate::client::ManageClient;
use crate::connection::{ConnectionSettings, DEFAULT_REQUEST_TIMEOUT, TlsMaterial};
use crate::error::{CoreError, Result};
use crate::model::{
    CheckInitRequest, ConfigFile, Credentials, GetConfigFileRequest, ListServicesRequest,
    ResourceSpec, ServiceAttributes, ServiceIdentity, ServiceMember, ServiceType,
};
use crate::progress::{
    DEFAULT_INIT_INTERVAL, DEFAULT_INIT_TIMEOUT, InitProgressCallback, PollConfig,
};
use crate::request::{
    CreateServiceParams, CreateServiceRequest, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USER,
    DEFAULT_REPLICAS, RELATIONAL_STORE_ADMIN_USER,
};
use crate::workflows::{DeletionReport, create_service_and_wait, delete_service_retaining_volumes};

/// Operations the CLI can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    Create,
    CheckInit,
    Delete,
    List,
    Get,
    ListMembers,
    GetConfig,
}

impl Operation {
    pub const ALL: [Operation; 7] = [
        Operation::Create,
        Operation::CheckInit,
        Operation::Delete,
        Operation::List,
        Operation::Get,
        Operation::ListMembers,
        Operation::GetConfig,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::CheckInit => "check-init",
            Operation::Delete => "delete",
            Operation::List => "list",
            Operation::Get => "get",
            Operation::ListMembers => "list-members",
            Operation::GetConfig => "get-config",
        }
    }

    /// Whether the operation targets a single named service
    pub fn requires_service_name(&self) -> bool {
        !matches!(self, Operation::List)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "create" | "create-service" => Ok(Operation::Create),
            "check-init" | "check-service-init" => Ok(Operation::CheckInit),
            "delete" | "delete-service" => Ok(Operation::Delete),
            "list" | "list-services" => Ok(Operation::List),
            "get" | "get-service" => Ok(Operation::Get),
            "list-members" => Ok(Operation::ListMembers),
            "get-config" => Ok(Operation::GetConfig),
            other => {
                let valid: Vec<&str> = Operation::ALL.iter().map(Operation::as_str).collect();
                Err(CoreError::Validation(format!(
                    "invalid operation '{}', please specify {}",
                    other,
                    valid.join("|")
                )))
            }
        }
    }
}

/// Raw command arguments, after flag/env/profile layering but before validation
#[derive(Debug, Clone)]
pub struct CommandArgs {
    pub operation: String,
    pub service_type: Option<String>,
    pub region: Option<String>,
    pub cluster: String,
    pub service: Option<String>,
    pub prefix: Option<String>,

    pub replicas: i64,
    pub volume_size_gb: i64,
    pub cpu_units: i64,
    pub max_cpu_units: Option<i64>,
    pub soft_memory_mb: i64,
    pub max_memory_mb: Option<i64>,

    pub admin: Option<String>,
    pub password: Option<String>,
    pub replication_user: Option<String>,
    pub replication_password: Option<String>,

    pub service_uuid: Option<String>,
    pub file_id: Option<String>,

    pub server_url: Option<String>,
    pub tls_enabled: bool,
    pub ca_file: Option<String>,
    pub cert_file: Option<String>,
    pub key_file: Option<String>,
    pub request_timeout: Duration,

    /// Wait for initialization after create
    pub wait: bool,
    pub wait_interval: Duration,
    pub wait_timeout: Duration,
}

impl Default for CommandArgs {
    fn default() -> Self {
        Self {
            operation: String::new(),
            service_type: None,
            region: None,
            cluster: "default".to_string(),
            service: None,
            prefix: None,
            replicas: DEFAULT_REPLICAS,
            volume_size_gb: 0,
            cpu_units: crate::model::DEFAULT_RESERVE_CPU_UNITS,
            max_cpu_units: None,
            soft_memory_mb: crate::model::DEFAULT_RESERVE_MEMORY_MB,
            max_memory_mb: None,
            admin: None,
            password: None,
            replication_user: None,
            replication_password: None,
            service_uuid: None,
            file_id: None,
            server_url: None,
            tls_enabled: false,
            ca_file: None,
            cert_file: None,
            key_file: None,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            wait: true,
            wait_interval: DEFAULT_INIT_INTERVAL,
            wait_timeout: DEFAULT_INIT_TIMEOUT,
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// A validated request for exactly one operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Create(CreateServiceRequest),
    CheckInit(CheckInitRequest),
    Delete(ServiceIdentity),
    List(ListServicesRequest),
    Get(ServiceIdentity),
    ListMembers(ServiceIdentity),
    GetConfig(GetConfigFileRequest),
}

impl Command {
    pub fn operation(&self) -> Operation {
        match self {
            Command::Create(_) => Operation::Create,
            Command::CheckInit(_) => Operation::CheckInit,
            Command::Delete(_) => Operation::Delete,
            Command::List(_) => Operation::List,
            Command::Get(_) => Operation::Get,
            Command::ListMembers(_) => Operation::ListMembers,
            Command::GetConfig(_) => Operation::GetConfig,
        }
    }

    fn build(operation: Operation, args: &CommandArgs, region: &str) -> Result<Self> {
        let identity = || {
            ServiceIdentity::new(
                region,
                args.cluster.as_str(),
                non_empty(args.service.as_deref()).unwrap_or_default(),
            )
        };
        let password = non_empty(args.password.as_deref()).unwrap_or(DEFAULT_ADMIN_PASSWORD);

        let command = match operation {
            Operation::Create => {
                let service_type: ServiceType = non_empty(args.service_type.as_deref())
                    .ok_or_else(|| {
                        CoreError::Validation(
                            "please specify the service type: document-store|relational-store"
                                .to_string(),
                        )
                    })?
                    .parse()?;

                let resources = ResourceSpec {
                    max_cpu_units: args.max_cpu_units.unwrap_or(args.cpu_units),
                    reserve_cpu_units: args.cpu_units,
                    max_mem_mb: args.max_memory_mb.unwrap_or(args.soft_memory_mb),
                    reserve_mem_mb: args.soft_memory_mb,
                };
                let admin = Credentials::new(
                    non_empty(args.admin.as_deref()).unwrap_or(DEFAULT_ADMIN_USER),
                    password,
                );

                let mut params = CreateServiceParams::new(service_type, identity())
                    .with_replicas(args.replicas)
                    .with_volume_size_gb(args.volume_size_gb)
                    .with_resources(resources)
                    .with_admin(admin);

                let repl_user = non_empty(args.replication_user.as_deref());
                let repl_password = non_empty(args.replication_password.as_deref());
                if repl_user.is_some() || repl_password.is_some() {
                    params = params.with_replication(Credentials::new(
                        repl_user.unwrap_or(crate::request::DEFAULT_REPLICATION_USER),
                        repl_password.unwrap_or(crate::request::DEFAULT_REPLICATION_PASSWORD),
                    ));
                }

                Command::Create(params.into_request()?)
            }
            Operation::CheckInit => {
                let service_type = match non_empty(args.service_type.as_deref()) {
                    Some(raw) => raw.parse()?,
                    None => ServiceType::Generic,
                };
                let user = match service_type {
                    ServiceType::RelationalStore => RELATIONAL_STORE_ADMIN_USER,
                    _ => non_empty(args.admin.as_deref()).unwrap_or(DEFAULT_ADMIN_USER),
                };
                Command::CheckInit(CheckInitRequest {
                    service_type,
                    service: identity(),
                    admin: Credentials::new(user, password),
                })
            }
            Operation::Delete => Command::Delete(identity()),
            Operation::List => Command::List(ListServicesRequest {
                region: region.to_string(),
                cluster: args.cluster.clone(),
                prefix: non_empty(args.prefix.as_deref())
                    .unwrap_or_default()
                    .to_string(),
            }),
            Operation::Get => Command::Get(identity()),
            Operation::ListMembers => Command::ListMembers(identity()),
            Operation::GetConfig => {
                let (Some(service_uuid), Some(file_id)) = (
                    non_empty(args.service_uuid.as_deref()),
                    non_empty(args.file_id.as_deref()),
                ) else {
                    return Err(CoreError::Validation(
                        "please specify the service uuid and config file id".to_string(),
                    ));
                };
                Command::GetConfig(GetConfigFileRequest {
                    region: region.to_string(),
                    cluster: args.cluster.clone(),
                    service_uuid: service_uuid.to_string(),
                    file_id: file_id.to_string(),
                })
            }
        };

        Ok(command)
    }
}

/// Everything one run of the CLI needs, validated up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub command: Command,
    pub connection: ConnectionSettings,
    /// Initialization wait settings; `None` when waiting is disabled
    pub wait: Option<PollConfig>,
}

impl Invocation {
    /// Validate raw arguments into an invocation
    ///
    /// Checks run in order: operation, service name, region, TLS material,
    /// request timeout, server URL, then operation-specific fields.
    pub fn from_args(args: &CommandArgs) -> Result<Self> {
        let operation: Operation = args.operation.parse()?;

        if operation.requires_service_name() && non_empty(args.service.as_deref()).is_none() {
            return Err(CoreError::Validation(
                "please specify the valid service name".to_string(),
            ));
        }

        let region = non_empty(args.region.as_deref())
            .ok_or_else(|| CoreError::Validation("please specify the region".to_string()))?;

        if args.cluster.trim().is_empty() {
            return Err(CoreError::Validation(
                "please specify the cluster".to_string(),
            ));
        }

        let tls = TlsMaterial::resolve(
            args.tls_enabled,
            args.ca_file.as_deref(),
            args.cert_file.as_deref(),
            args.key_file.as_deref(),
        )?;
        if args.request_timeout.is_zero() {
            return Err(CoreError::Validation(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        let connection = ConnectionSettings::resolve(
            args.server_url.as_deref(),
            &args.cluster,
            tls,
            args.request_timeout,
        )?;

        let wait = if args.wait {
            Some(PollConfig::new(args.wait_interval, args.wait_timeout)?)
        } else {
            None
        };

        let command = Command::build(operation, args, region)?;
        debug!("Validated {} command", operation);

        Ok(Self {
            command,
            connection,
            wait,
        })
    }
}

/// Result of a dispatched operation
#[derive(Debug, Clone, PartialEq)]
pub enum OperationOutput {
    Created {
        service: ServiceIdentity,
        service_type: ServiceType,
        /// Whether initialization was awaited and completed
        initialized: bool,
    },
    InitStatus {
        service: ServiceIdentity,
        initialized: bool,
    },
    Deleted(DeletionReport),
    Services(Vec<ServiceAttributes>),
    Service(ServiceAttributes),
    Members(Vec<ServiceMember>),
    ConfigFile(ConfigFile),
}

/// Run one validated command against the management service
///
/// `wait` applies to `create` only. Remote failures abort immediately except
/// inside the initialization poller.
pub async fn dispatch(
    client: &dyn ManageClient,
    command: &Command,
    wait: Option<&PollConfig>,
    on_progress: Option<InitProgressCallback>,
) -> Result<OperationOutput> {
    info!("Operation: {}", command.operation());

    let output = match command {
        Command::Create(request) => {
            let service = request.spec().service().clone();
            let service_type = request.service_type();
            match wait {
                Some(config) => {
                    create_service_and_wait(client, request, config, on_progress).await?;
                    OperationOutput::Created {
                        service,
                        service_type,
                        initialized: true,
                    }
                }
                None => {
                    client.create_service(request).await?;
                    OperationOutput::Created {
                        service,
                        service_type,
                        initialized: false,
                    }
                }
            }
        }
        Command::CheckInit(request) => {
            let initialized = client.check_service_init(request).await?;
            OperationOutput::InitStatus {
                service: request.service.clone(),
                initialized,
            }
        }
        Command::Delete(service) => {
            OperationOutput::Deleted(delete_service_retaining_volumes(client, service).await?)
        }
        Command::List(request) => OperationOutput::Services(client.list_services(request).await?),
        Command::Get(service) => {
            OperationOutput::Service(client.get_service_attributes(service).await?)
        }
        Command::ListMembers(service) => {
            OperationOutput::Members(client.list_service_members(service).await?)
        }
        Command::GetConfig(request) => {
            OperationOutput::ConfigFile(client.get_config_file(request).await?)
        }
    };

    Ok(output)
}
