//! CLI structure and argument layering
//!
//! The CLI is flat: one `--op` flag selects the operation and the remaining
//! flags feed it. Values are layered flag > environment > profile > default
//! before being handed to the core for validation.

use std::time::Duration;

use catalogctl_core::connection::DEFAULT_REQUEST_TIMEOUT;
use catalogctl_core::model::{DEFAULT_RESERVE_CPU_UNITS, DEFAULT_RESERVE_MEMORY_MB};
use catalogctl_core::progress::{DEFAULT_INIT_INTERVAL, DEFAULT_INIT_TIMEOUT};
use catalogctl_core::request::DEFAULT_REPLICAS;
use catalogctl_core::{CommandArgs, Profile};
use clap::Parser;

/// Cluster used when neither a flag nor the profile names one
pub const DEFAULT_CLUSTER: &str = "default";

/// Catalog service CLI for managed clusters
#[derive(Parser, Debug)]
#[command(name = "catalogctl")]
#[command(
    version,
    about = "Create, inspect and delete catalog database services on a managed cluster"
)]
#[command(long_about = "
Create, inspect and delete catalog database services on a managed cluster

OPERATIONS:
    create          Create a service and wait for it to initialize
    check-init      Check whether a service finished initializing
    delete          Delete a service (volumes are kept and listed)
    list            List services of a cluster
    get             Show a service's attributes
    list-members    List a service's members and their volumes
    get-config      Print a member config file

EXAMPLES:
    # Create a 3 replica document store with 20GB volumes
    catalogctl --op create --service-type document-store --region us-west-1 \\
        --service mymongo --replicas 3 --volume-size 20 --admin admin --passwd secret

    # Create a relational store (the admin user is always 'postgres')
    catalogctl --op create --service-type relational-store --region us-west-1 \\
        --service mypg --volume-size 10 --passwd secret

    # Delete a service; the member volume IDs are printed for manual cleanup
    catalogctl --op delete --region us-west-1 --service mymongo

    # List services as JSON over TLS
    catalogctl --op list --region us-west-1 --tls-enabled \\
        --ca-file ca.pem --cert-file cert.pem --key-file key.pem -o json
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, env = "CATALOGCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, env = "CATALOGCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// The operation: create|check-init|delete|list|get|list-members|get-config
    #[arg(long = "op", value_name = "OPERATION")]
    pub op: String,

    /// The catalog service type: document-store|relational-store|generic
    #[arg(long)]
    pub service_type: Option<String>,

    /// The target region
    #[arg(long, env = "CATALOGCTL_REGION")]
    pub region: Option<String>,

    /// The target cluster [default: default]
    #[arg(long, env = "CATALOGCTL_CLUSTER")]
    pub cluster: Option<String>,

    /// The target service name
    #[arg(long)]
    pub service: Option<String>,

    /// Only list services whose name starts with this prefix
    #[arg(long)]
    pub prefix: Option<String>,

    /// The number of replicas for the service
    #[arg(long, default_value_t = DEFAULT_REPLICAS, allow_negative_numbers = true)]
    pub replicas: i64,

    /// The size of each member volume, unit: GB
    #[arg(long = "volume-size", default_value_t = 0, allow_negative_numbers = true)]
    pub volume_size: i64,

    /// The number of cpu units to reserve for each container
    #[arg(long, default_value_t = DEFAULT_RESERVE_CPU_UNITS, allow_negative_numbers = true)]
    pub cpu_units: i64,

    /// The cpu unit limit for each container [default: --cpu-units]
    #[arg(long, allow_negative_numbers = true)]
    pub max_cpu_units: Option<i64>,

    /// The memory reserved for each container, unit: MB
    #[arg(long = "soft-memory", default_value_t = DEFAULT_RESERVE_MEMORY_MB, allow_negative_numbers = true)]
    pub soft_memory: i64,

    /// The memory limit for each container, unit: MB [default: --soft-memory]
    #[arg(long = "max-memory", allow_negative_numbers = true)]
    pub max_memory: Option<i64>,

    /// The DB admin. Relational stores always use "postgres" [default: dbadmin]
    #[arg(long)]
    pub admin: Option<String>,

    /// The DB admin password [default: changeme]
    #[arg(long, env = "CATALOGCTL_ADMIN_PASSWORD", hide_env_values = true)]
    pub passwd: Option<String>,

    /// The user standby replicas replicate from the primary with (relational-store only)
    #[arg(long)]
    pub replication_user: Option<String>,

    /// The password of the replication user (relational-store only)
    #[arg(long = "replication-passwd", hide_env_values = true)]
    pub replication_passwd: Option<String>,

    /// Whether TLS is enabled for the management channel
    #[arg(long)]
    pub tls_enabled: bool,

    /// The CA file
    #[arg(long)]
    pub ca_file: Option<String>,

    /// The client certificate file
    #[arg(long)]
    pub cert_file: Option<String>,

    /// The client key file
    #[arg(long)]
    pub key_file: Option<String>,

    /// The management service URL [default: derived from the cluster name]
    #[arg(long, env = "CATALOGCTL_SERVER_URL")]
    pub server_url: Option<String>,

    /// The service uuid (get-config)
    #[arg(long)]
    pub service_uuid: Option<String>,

    /// The config file id (get-config)
    #[arg(long = "fileid")]
    pub file_id: Option<String>,

    /// Return right after create instead of waiting for initialization
    #[arg(long)]
    pub no_wait: bool,

    /// Maximum time to wait for initialization in seconds [default: 600]
    #[arg(long)]
    pub wait_timeout: Option<u64>,

    /// Initialization polling interval in seconds [default: 10]
    #[arg(long)]
    pub wait_interval: Option<u64>,

    /// Timeout for each management service request in seconds [default: 30]
    #[arg(long)]
    pub request_timeout: Option<u64>,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable messages, tables for listings
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Table format
    Table,
}

impl Cli {
    /// Layer flags over the selected profile into raw command arguments
    pub fn command_args(&self, profile: Option<&Profile>) -> CommandArgs {
        let profile = profile.cloned().unwrap_or_default();
        let secs = |flag: Option<u64>, from_profile: Option<u64>, default: Duration| {
            flag.or(from_profile)
                .map(Duration::from_secs)
                .unwrap_or(default)
        };

        CommandArgs {
            operation: self.op.clone(),
            service_type: self.service_type.clone(),
            region: self.region.clone().or(profile.region),
            cluster: self
                .cluster
                .clone()
                .or(profile.cluster)
                .unwrap_or_else(|| DEFAULT_CLUSTER.to_string()),
            service: self.service.clone(),
            prefix: self.prefix.clone(),
            replicas: self.replicas,
            volume_size_gb: self.volume_size,
            cpu_units: self.cpu_units,
            max_cpu_units: self.max_cpu_units,
            soft_memory_mb: self.soft_memory,
            max_memory_mb: self.max_memory,
            admin: self.admin.clone(),
            password: self.passwd.clone(),
            replication_user: self.replication_user.clone(),
            replication_password: self.replication_passwd.clone(),
            service_uuid: self.service_uuid.clone(),
            file_id: self.file_id.clone(),
            server_url: self.server_url.clone().or(profile.server_url),
            tls_enabled: self.tls_enabled || profile.tls_enabled.unwrap_or(false),
            ca_file: self.ca_file.clone().or(profile.ca_file),
            cert_file: self.cert_file.clone().or(profile.cert_file),
            key_file: self.key_file.clone().or(profile.key_file),
            request_timeout: secs(
                self.request_timeout,
                profile.request_timeout_secs,
                DEFAULT_REQUEST_TIMEOUT,
            ),
            wait: !self.no_wait,
            wait_interval: secs(
                self.wait_interval,
                profile.wait_interval_secs,
                DEFAULT_INIT_INTERVAL,
            ),
            wait_timeout: secs(
                self.wait_timeout,
                profile.wait_timeout_secs,
                DEFAULT_INIT_TIMEOUT,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["catalogctl"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_defaults_without_profile() {
        let cli = parse(&["--op", "create", "--service", "svc1", "--volume-size", "20"]);
        let args = cli.command_args(None);

        assert_eq!(args.operation, "create");
        assert_eq!(args.cluster, DEFAULT_CLUSTER);
        assert_eq!(args.replicas, 3);
        assert_eq!(args.volume_size_gb, 20);
        assert_eq!(args.cpu_units, DEFAULT_RESERVE_CPU_UNITS);
        assert_eq!(args.soft_memory_mb, DEFAULT_RESERVE_MEMORY_MB);
        assert!(args.wait);
        assert_eq!(args.wait_interval, DEFAULT_INIT_INTERVAL);
        assert_eq!(args.wait_timeout, DEFAULT_INIT_TIMEOUT);
        assert!(!args.tls_enabled);
    }

    #[test]
    fn test_profile_fills_unset_flags() {
        let profile = Profile {
            region: Some("eu-west-1".to_string()),
            cluster: Some("prod".to_string()),
            server_url: Some("manage.prod:27040".to_string()),
            tls_enabled: Some(true),
            ca_file: Some("ca.pem".to_string()),
            cert_file: Some("cert.pem".to_string()),
            key_file: Some("key.pem".to_string()),
            wait_timeout_secs: Some(900),
            wait_interval_secs: None,
            request_timeout_secs: Some(5),
        };
        let cli = parse(&["--op", "list", "--cluster", "staging"]);
        let args = cli.command_args(Some(&profile));

        assert_eq!(args.region.as_deref(), Some("eu-west-1"));
        assert_eq!(args.cluster, "staging");
        assert_eq!(args.server_url.as_deref(), Some("manage.prod:27040"));
        assert!(args.tls_enabled);
        assert_eq!(args.key_file.as_deref(), Some("key.pem"));
        assert_eq!(args.wait_timeout, Duration::from_secs(900));
        assert_eq!(args.wait_interval, DEFAULT_INIT_INTERVAL);
        assert_eq!(args.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_negative_sizes_reach_validation() {
        let cli = parse(&["--op", "create", "--replicas", "-1", "--volume-size", "-5"]);
        let args = cli.command_args(None);
        assert_eq!(args.replicas, -1);
        assert_eq!(args.volume_size_gb, -5);
    }

    #[test]
    fn test_no_wait_and_overrides() {
        let cli = parse(&[
            "--op",
            "create",
            "--no-wait",
            "--wait-interval",
            "2",
            "--fileid",
            "f1",
            "--service-uuid",
            "u1",
        ]);
        let args = cli.command_args(None);
        assert!(!args.wait);
        assert_eq!(args.wait_interval, Duration::from_secs(2));
        assert_eq!(args.file_id.as_deref(), Some("f1"));
        assert_eq!(args.service_uuid.as_deref(), Some("u1"));
    }
}
