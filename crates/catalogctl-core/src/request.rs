//! Create-service request construction
//!
//! [`CreateServiceParams`] collects caller input and [`CreateServiceParams::into_request`]
//! validates it into an immutable [`CreateServiceRequest`]. Validation happens
//! here, before any request is sent, so a bad replica count or volume size never
//! costs a round trip to the management service.
//!
//! # Example
//!
//! ```rust
//! use catalogctl_core::{CreateServiceParams, ServiceIdentity, ServiceType};
//!
//! let request = CreateServiceParams::new(
//!     ServiceType::DocumentStore,
//!     ServiceIdentity::new("us-west-1", "default", "mymongo"),
//! )
//! .with_replicas(3)
//! .with_volume_size_gb(20)
//! .into_request()
//! .unwrap();
//!
//! assert_eq!(request.spec().replicas(), 3);
//! assert_eq!(request.spec().admin().user, "dbadmin");
//! ```

use serde::Serialize;
use tracing::warn;

use crate::error::{CoreError, Result};
use crate::model::{CheckInitRequest, Credentials, ResourceSpec, ServiceIdentity, ServiceType};

/// Admin user used when the caller does not name one
pub const DEFAULT_ADMIN_USER: &str = "dbadmin";

/// Admin password used when the caller does not supply one
pub const DEFAULT_ADMIN_PASSWORD: &str = "changeme";

/// Relational stores always bootstrap with their own superuser name
pub const RELATIONAL_STORE_ADMIN_USER: &str = "postgres";

/// User the standby replicas replicate from the primary with
pub const DEFAULT_REPLICATION_USER: &str = "repluser";

pub const DEFAULT_REPLICATION_PASSWORD: &str = "replpassword";

/// Default number of replicas for a new service
pub const DEFAULT_REPLICAS: i64 = 3;

/// Fields shared by every create request variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateServiceSpec {
    service: ServiceIdentity,
    resources: ResourceSpec,
    replicas: i64,
    volume_size_gb: i64,
    admin: Credentials,
}

impl CreateServiceSpec {
    pub fn service(&self) -> &ServiceIdentity {
        &self.service
    }

    pub fn resources(&self) -> &ResourceSpec {
        &self.resources
    }

    pub fn replicas(&self) -> i64 {
        self.replicas
    }

    pub fn volume_size_gb(&self) -> i64 {
        self.volume_size_gb
    }

    pub fn admin(&self) -> &Credentials {
        &self.admin
    }
}

/// A validated create request, one variant per service type
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "service_type", rename_all = "kebab-case")]
pub enum CreateServiceRequest {
    DocumentStore(CreateServiceSpec),
    RelationalStore {
        #[serde(flatten)]
        spec: CreateServiceSpec,
        replication: Credentials,
    },
    Generic(CreateServiceSpec),
}

impl CreateServiceRequest {
    pub fn service_type(&self) -> ServiceType {
        match self {
            CreateServiceRequest::DocumentStore(_) => ServiceType::DocumentStore,
            CreateServiceRequest::RelationalStore { .. } => ServiceType::RelationalStore,
            CreateServiceRequest::Generic(_) => ServiceType::Generic,
        }
    }

    pub fn spec(&self) -> &CreateServiceSpec {
        match self {
            CreateServiceRequest::DocumentStore(spec)
            | CreateServiceRequest::Generic(spec)
            | CreateServiceRequest::RelationalStore { spec, .. } => spec,
        }
    }

    /// Replication credentials, present only for relational stores
    pub fn replication(&self) -> Option<&Credentials> {
        match self {
            CreateServiceRequest::RelationalStore { replication, .. } => Some(replication),
            _ => None,
        }
    }

    /// The follow-up initialization check for this service
    ///
    /// Uses the same identity and the admin credentials that were actually sent,
    /// which for relational stores is the fixed superuser.
    pub fn check_init_request(&self) -> CheckInitRequest {
        let spec = self.spec();
        CheckInitRequest {
            service_type: self.service_type(),
            service: spec.service.clone(),
            admin: spec.admin.clone(),
        }
    }
}

/// Parameters for creating a catalog service
#[derive(Debug, Clone)]
pub struct CreateServiceParams {
    pub service_type: ServiceType,
    pub service: ServiceIdentity,
    pub replicas: i64,
    /// Size of each member's volume in GB (required, no default)
    pub volume_size_gb: i64,
    pub resources: ResourceSpec,
    pub admin: Credentials,
    /// Relational stores only; defaults apply when unset
    pub replication: Option<Credentials>,
}

impl CreateServiceParams {
    /// Create new params with required fields
    #[must_use]
    pub fn new(service_type: ServiceType, service: ServiceIdentity) -> Self {
        Self {
            service_type,
            service,
            replicas: DEFAULT_REPLICAS,
            volume_size_gb: 0,
            resources: ResourceSpec::default(),
            admin: Credentials::new(DEFAULT_ADMIN_USER, DEFAULT_ADMIN_PASSWORD),
            replication: None,
        }
    }

    #[must_use]
    pub fn with_replicas(mut self, replicas: i64) -> Self {
        self.replicas = replicas;
        self
    }

    #[must_use]
    pub fn with_volume_size_gb(mut self, volume_size_gb: i64) -> Self {
        self.volume_size_gb = volume_size_gb;
        self
    }

    #[must_use]
    pub fn with_resources(mut self, resources: ResourceSpec) -> Self {
        self.resources = resources;
        self
    }

    #[must_use]
    pub fn with_admin(mut self, admin: Credentials) -> Self {
        self.admin = admin;
        self
    }

    #[must_use]
    pub fn with_replication(mut self, replication: Credentials) -> Self {
        self.replication = Some(replication);
        self
    }

    /// Validate and build the request for the selected service type
    pub fn into_request(self) -> Result<CreateServiceRequest> {
        if self.replicas <= 0 || self.volume_size_gb <= 0 {
            return Err(CoreError::Validation(format!(
                "please specify the valid replica number and volume size (replicas {}, volume size {}GB)",
                self.replicas, self.volume_size_gb
            )));
        }
        self.resources.validate()?;

        if self.replication.is_some() && self.service_type != ServiceType::RelationalStore {
            return Err(CoreError::Validation(format!(
                "replication credentials only apply to relational-store, not {}",
                self.service_type
            )));
        }

        let mut spec = CreateServiceSpec {
            service: self.service,
            resources: self.resources,
            replicas: self.replicas,
            volume_size_gb: self.volume_size_gb,
            admin: self.admin,
        };

        let request = match self.service_type {
            ServiceType::DocumentStore => CreateServiceRequest::DocumentStore(spec),
            ServiceType::Generic => CreateServiceRequest::Generic(spec),
            ServiceType::RelationalStore => {
                if spec.admin.user != RELATIONAL_STORE_ADMIN_USER
                    && spec.admin.user != DEFAULT_ADMIN_USER
                {
                    warn!(
                        "Admin user '{}' is ignored for relational-store, using '{}'",
                        spec.admin.user, RELATIONAL_STORE_ADMIN_USER
                    );
                }
                spec.admin.user = RELATIONAL_STORE_ADMIN_USER.to_string();
                CreateServiceRequest::RelationalStore {
                    spec,
                    replication: self.replication.unwrap_or_else(|| {
                        Credentials::new(DEFAULT_REPLICATION_USER, DEFAULT_REPLICATION_PASSWORD)
                    }),
                }
            }
        };

        Ok(request)
    }
}
