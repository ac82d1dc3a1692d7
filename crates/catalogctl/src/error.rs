//! Error types for catalogctl
//!
//! Every failure ends the process with exit status 1; these types only decide
//! what the operator reads on stderr.

use catalogctl_core::{ConfigError, CoreError, RemoteErrorKind};
use colored::Colorize;
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Delete service failed: network error: connection reset
///   retained volumes: vol-1, vol-2
///
///   tip: Check whether the service still exists:
///       catalogctl --op get --service <name>
/// ```
pub struct CliDiagnostic {
    message: String,
    detail: Option<String>,
    tips: Vec<(String, Vec<String>)>,
}

impl CliDiagnostic {
    /// Start a new error diagnostic with the given message.
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            detail: None,
            tips: Vec::new(),
        }
    }

    /// Add a detail line below the error message.
    pub fn detail(mut self, text: &str) -> Self {
        self.detail = Some(text.to_string());
        self
    }

    /// Add a tip with optional example commands.
    pub fn tip(mut self, description: &str, commands: &[&str]) -> Self {
        self.tips.push((
            description.to_string(),
            commands.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        if let Some(detail) = &self.detail {
            eprintln!("  {}", detail);
        }

        for (description, commands) in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", description);
            for cmd in commands {
                eprintln!("      {}", cmd);
            }
        }
    }
}

/// Main error type for the catalogctl application
#[derive(Error, Debug)]
pub enum CatalogCtlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Not found: {message}")]
    NotFound { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Delete service failed: {message}")]
    DeleteFailed {
        message: String,
        volume_ids: Vec<String>,
    },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for catalogctl operations
pub type Result<T> = std::result::Result<T, CatalogCtlError>;

impl CatalogCtlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            CatalogCtlError::ProfileNotFound { name } => vec![
                format!("Add a [profiles.{}] table to the config file", name),
                "Check profile name spelling".to_string(),
            ],
            CatalogCtlError::Configuration(message) if message.contains("tls") => vec![
                "Provide all of --ca-file, --cert-file and --key-file, or none of them".to_string(),
                "Pass --tls-enabled when the TLS files are set".to_string(),
            ],
            CatalogCtlError::InvalidInput { message } if message.contains("operation") => vec![
                "Valid operations: create, check-init, delete, list, get, list-members, get-config"
                    .to_string(),
            ],
            CatalogCtlError::InvalidInput { .. } => vec![
                "Check the command syntax: catalogctl --help".to_string(),
            ],
            CatalogCtlError::AuthenticationFailed { .. } => vec![
                "Verify the CA, certificate and key files belong to this cluster".to_string(),
                "Check that --tls-enabled matches the management service".to_string(),
            ],
            CatalogCtlError::ConnectionError { .. } => vec![
                "Check network connectivity".to_string(),
                "Verify the server URL: --server-url or the profile's server_url".to_string(),
                "Check that --cluster names the right cluster".to_string(),
            ],
            CatalogCtlError::NotFound { .. } => vec![
                "Check that --region and --cluster are correct".to_string(),
            ],
            CatalogCtlError::Timeout { .. } => vec![
                "Wait longer next time with --wait-timeout".to_string(),
            ],
            CatalogCtlError::DeleteFailed { .. } => vec![
                "Remove the retained volumes by hand once the service is gone".to_string(),
            ],
            _ => vec![],
        }
    }

    /// A tip with follow-up commands the operator can run next
    pub fn follow_up(&self) -> Option<(&'static str, Vec<&'static str>)> {
        match self {
            CatalogCtlError::NotFound { .. } => Some((
                "List services to find the correct name:",
                vec!["catalogctl --op list --region <region>"],
            )),
            CatalogCtlError::Timeout { .. } => Some((
                "Check the initialization later:",
                vec!["catalogctl --op check-init --service <name>"],
            )),
            CatalogCtlError::DeleteFailed { .. } => Some((
                "Check whether the service still exists:",
                vec![
                    "catalogctl --op get --service <name>",
                    "catalogctl --op list-members --service <name>",
                ],
            )),
            _ => None,
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&format!("{}", self));

        if let CatalogCtlError::DeleteFailed { volume_ids, .. } = self {
            let detail = if volume_ids.is_empty() {
                "retained volumes: none".to_string()
            } else {
                format!("retained volumes: {}", volume_ids.join(", "))
            };
            diag = diag.detail(&detail);
        }

        if let Some((description, commands)) = self.follow_up() {
            diag = diag.tip(description, &commands);
        }

        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion, &[]);
        }

        diag.print();
    }
}

impl From<CoreError> for CatalogCtlError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => CatalogCtlError::InvalidInput { message },
            CoreError::Config(message) => CatalogCtlError::Configuration(message),
            CoreError::Remote(remote) => match remote.kind {
                RemoteErrorKind::Auth => CatalogCtlError::AuthenticationFailed {
                    message: remote.message,
                },
                RemoteErrorKind::NotFound => CatalogCtlError::NotFound {
                    message: remote.message,
                },
                RemoteErrorKind::Validation => CatalogCtlError::ApiError {
                    message: remote.message,
                },
                RemoteErrorKind::Network => CatalogCtlError::ConnectionError {
                    message: remote.message,
                },
            },
            err @ CoreError::InitTimeout(_) => CatalogCtlError::Timeout {
                message: err.to_string(),
            },
            CoreError::DeleteFailed { volume_ids, source } => CatalogCtlError::DeleteFailed {
                message: source.to_string(),
                volume_ids,
            },
        }
    }
}

impl From<ConfigError> for CatalogCtlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => CatalogCtlError::ProfileNotFound { name },
            other => CatalogCtlError::Configuration(other.to_string()),
        }
    }
}

impl From<anyhow::Error> for CatalogCtlError {
    fn from(err: anyhow::Error) -> Self {
        CatalogCtlError::OutputError {
            message: format!("{:#}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalogctl_core::RemoteError;
    use std::time::Duration;

    #[test]
    fn test_remote_kinds_map_to_cli_errors() {
        let err: CatalogCtlError = CoreError::from(RemoteError::auth("HTTP 401: denied")).into();
        assert!(matches!(err, CatalogCtlError::AuthenticationFailed { .. }));

        let err: CatalogCtlError = CoreError::from(RemoteError::not_found("no svc")).into();
        assert!(matches!(err, CatalogCtlError::NotFound { .. }));

        let err: CatalogCtlError = CoreError::from(RemoteError::network("refused")).into();
        assert!(matches!(err, CatalogCtlError::ConnectionError { .. }));
    }

    #[test]
    fn test_timeout_message_names_budget() {
        let err: CatalogCtlError = CoreError::InitTimeout(Duration::from_secs(600)).into();
        assert_eq!(
            err.to_string(),
            "Timeout: The catalog service is not initialized after 600 seconds"
        );
        assert!(!err.suggestions().is_empty());
    }

    #[test]
    fn test_delete_failure_keeps_volume_ids() {
        let err: CatalogCtlError = CoreError::DeleteFailed {
            volume_ids: vec!["vol-1".to_string(), "vol-2".to_string()],
            source: RemoteError::network("connection reset"),
        }
        .into();

        match err {
            CatalogCtlError::DeleteFailed { volume_ids, message } => {
                assert_eq!(volume_ids, vec!["vol-1", "vol-2"]);
                assert!(message.contains("connection reset"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_follow_up_commands() {
        let err = CatalogCtlError::DeleteFailed {
            message: "network error: connection reset".to_string(),
            volume_ids: vec!["vol-1".to_string()],
        };
        let (_, commands) = err.follow_up().unwrap();
        assert_eq!(
            commands,
            vec![
                "catalogctl --op get --service <name>",
                "catalogctl --op list-members --service <name>",
            ]
        );

        let err = CatalogCtlError::InvalidInput {
            message: "please specify the region".to_string(),
        };
        assert!(err.follow_up().is_none());
    }

    #[test]
    fn test_profile_not_found_passes_through() {
        let err: CatalogCtlError = ConfigError::ProfileNotFound {
            name: "prod".to_string(),
        }
        .into();
        assert_eq!(err.to_string(), "Profile 'prod' not found");
    }

    #[test]
    fn test_tls_configuration_suggestions() {
        let err = CatalogCtlError::Configuration(
            "tls enabled with incomplete material: ca file ca.pem, cert file <unset>, key file <unset>"
                .to_string(),
        );
        assert!(
            err.suggestions()
                .iter()
                .any(|s| s.contains("--ca-file"))
        );
    }
}
