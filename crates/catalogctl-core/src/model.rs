//! Data model shared by requests, the management client and the CLI
//!
//! Everything here is built fresh for a single invocation and is never
//! persisted.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;

/// Catalog service flavours the management service knows how to create
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServiceType {
    /// Replica-set based document store (MongoDB)
    DocumentStore,
    /// Primary/standby relational store (PostgreSQL)
    RelationalStore,
    /// Plain stateful service without catalog-specific setup
    Generic,
}

impl ServiceType {
    pub const ALL: [ServiceType; 3] = [
        ServiceType::DocumentStore,
        ServiceType::RelationalStore,
        ServiceType::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::DocumentStore => "document-store",
            ServiceType::RelationalStore => "relational-store",
            ServiceType::Generic => "generic",
        }
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ServiceType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "document-store" | "mongodb" => Ok(ServiceType::DocumentStore),
            "relational-store" | "postgresql" | "postgres" => Ok(ServiceType::RelationalStore),
            "generic" => Ok(ServiceType::Generic),
            other => Err(CoreError::Validation(format!(
                "invalid service type '{}', please specify document-store|relational-store|generic",
                other
            ))),
        }
    }
}

/// Identifies one service on one cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceIdentity {
    pub region: String,
    pub cluster: String,
    pub service_name: String,
}

impl ServiceIdentity {
    pub fn new(
        region: impl Into<String>,
        cluster: impl Into<String>,
        service_name: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            cluster: cluster.into(),
            service_name: service_name.into(),
        }
    }
}

/// Default CPU units reserved for each service container
pub const DEFAULT_RESERVE_CPU_UNITS: i64 = 256;

/// Default memory reserved for each service container, in MB
pub const DEFAULT_RESERVE_MEMORY_MB: i64 = 256;

/// Container resource limits and reservations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    pub max_cpu_units: i64,
    pub reserve_cpu_units: i64,
    pub max_mem_mb: i64,
    pub reserve_mem_mb: i64,
}

impl Default for ResourceSpec {
    fn default() -> Self {
        Self::reserved(DEFAULT_RESERVE_CPU_UNITS, DEFAULT_RESERVE_MEMORY_MB)
    }
}

impl ResourceSpec {
    /// A spec whose maximums equal its reservations
    pub fn reserved(cpu_units: i64, mem_mb: i64) -> Self {
        Self {
            max_cpu_units: cpu_units,
            reserve_cpu_units: cpu_units,
            max_mem_mb: mem_mb,
            reserve_mem_mb: mem_mb,
        }
    }

    /// Check that every value is positive and no reservation exceeds its maximum
    pub fn validate(&self) -> crate::Result<()> {
        if self.reserve_cpu_units <= 0 || self.max_cpu_units <= 0 {
            return Err(CoreError::Validation(format!(
                "cpu units must be positive (reserve {}, max {})",
                self.reserve_cpu_units, self.max_cpu_units
            )));
        }
        if self.reserve_mem_mb <= 0 || self.max_mem_mb <= 0 {
            return Err(CoreError::Validation(format!(
                "memory must be positive (reserve {}MB, max {}MB)",
                self.reserve_mem_mb, self.max_mem_mb
            )));
        }
        if self.reserve_cpu_units > self.max_cpu_units {
            return Err(CoreError::Validation(format!(
                "reserved cpu units {} exceed max cpu units {}",
                self.reserve_cpu_units, self.max_cpu_units
            )));
        }
        if self.reserve_mem_mb > self.max_mem_mb {
            return Err(CoreError::Validation(format!(
                "reserved memory {}MB exceeds max memory {}MB",
                self.reserve_mem_mb, self.max_mem_mb
            )));
        }
        Ok(())
    }
}

/// A user/password pair
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Request for the initialization status of a created service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckInitRequest {
    pub service_type: ServiceType,
    pub service: ServiceIdentity,
    pub admin: Credentials,
}

/// Request to list the services of a cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListServicesRequest {
    pub region: String,
    pub cluster: String,
    /// Only services whose name starts with this prefix; empty lists all
    #[serde(default)]
    pub prefix: String,
}

/// Request for one config file of a service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetConfigFileRequest {
    pub region: String,
    pub cluster: String,
    pub service_uuid: String,
    pub file_id: String,
}

/// Service metadata as returned by the management service
///
/// The payload is kept as-is; only a few well-known fields get accessors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceAttributes(pub Map<String, Value>);

impl ServiceAttributes {
    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn service_uuid(&self) -> Option<&str> {
        self.str_field("service_uuid")
    }

    pub fn service_name(&self) -> Option<&str> {
        self.str_field("service_name")
    }

    pub fn service_status(&self) -> Option<&str> {
        self.str_field("service_status")
    }
}

/// A config file attached to a service member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberConfig {
    pub file_name: String,
    pub file_id: String,
    #[serde(default)]
    pub file_md5: String,
}

/// One replica of a service together with its durable volume
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceMember {
    #[serde(default)]
    pub member_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_zone: Option<String>,
    pub volume_id: String,
    #[serde(default)]
    pub configs: Vec<MemberConfig>,
}

/// Content of one config file, identified by `(service_uuid, file_id)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub service_uuid: String,
    pub file_id: String,
    #[serde(default)]
    pub file_name: String,
    pub content: String,
}
