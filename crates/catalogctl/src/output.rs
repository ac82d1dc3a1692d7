//! Rendering of operation results
//!
//! `auto` prints the operator-facing messages for state changes and tables for
//! listings. `json`/`yaml` print the same data in machine-readable form.

use anyhow::{Context, Result};
use catalogctl_core::{OperationOutput, ServiceMember};
use comfy_table::Table;
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::OutputFormat;

/// Print one operation's result to stdout
pub fn print_operation_output(output: &OperationOutput, format: OutputFormat) -> Result<()> {
    if format == OutputFormat::Auto {
        if let Some(message) = human_message(output) {
            println!("{}", message);
            return Ok(());
        }
        if let OperationOutput::Services(services) = output {
            println!("List {} services:", services.len());
        }
    }

    if let OperationOutput::Members(members) = output
        && matches!(format, OutputFormat::Auto | OutputFormat::Table)
    {
        println!("{}", members_table(members));
        return Ok(());
    }

    print_output(operation_payload(output)?, format)
}

pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> Result<()> {
    let json_value = serde_json::to_value(data)?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json_value)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&json_value)?);
        }
        OutputFormat::Table | OutputFormat::Auto => {
            print_as_table(&json_value);
        }
    }

    Ok(())
}

/// Machine-readable form of an operation result
pub fn operation_payload(output: &OperationOutput) -> Result<Value> {
    let value = match output {
        OperationOutput::Created {
            service,
            service_type,
            initialized,
        } => json!({
            "service": service,
            "service_type": service_type,
            "initialized": initialized,
        }),
        OperationOutput::InitStatus {
            service,
            initialized,
        } => json!({
            "service": service,
            "initialized": initialized,
        }),
        OperationOutput::Deleted(report) => {
            serde_json::to_value(report).context("Failed to serialize deletion report")?
        }
        OperationOutput::Services(services) => serde_json::to_value(services)?,
        OperationOutput::Service(attributes) => serde_json::to_value(attributes)?,
        OperationOutput::Members(members) => serde_json::to_value(members)?,
        OperationOutput::ConfigFile(file) => serde_json::to_value(file)?,
    };
    Ok(value)
}

/// Message printed for state changes in `auto` mode; `None` means render a table
pub fn human_message(output: &OperationOutput) -> Option<String> {
    match output {
        OperationOutput::Created {
            service,
            initialized: true,
            ..
        } => Some(format!(
            "The catalog service {} is created and initialized",
            service.service_name
        )),
        OperationOutput::Created { service, .. } => Some(format!(
            "The catalog service {} is created, check its initialization with --op check-init",
            service.service_name
        )),
        OperationOutput::InitStatus {
            service,
            initialized,
        } => Some(format!(
            "The catalog service {} is {}",
            service.service_name,
            if *initialized {
                "initialized"
            } else {
                "initializing"
            }
        )),
        OperationOutput::Deleted(report) if report.volume_ids.is_empty() => Some(format!(
            "Service {} deleted, it had no member volumes",
            report.service.service_name
        )),
        OperationOutput::Deleted(report) => {
            let mut message = format!(
                "Service {} deleted, please manually delete the volumes:",
                report.service.service_name
            );
            for volume_id in &report.volume_ids {
                message.push_str("\n  ");
                message.push_str(volume_id);
            }
            Some(message)
        }
        OperationOutput::ConfigFile(file) => Some(file.content.trim_end_matches('\n').to_string()),
        OperationOutput::Services(_) | OperationOutput::Service(_) | OperationOutput::Members(_) => {
            None
        }
    }
}

/// One row per member config file, so the file IDs for `get-config` are visible
fn members_table(members: &[ServiceMember]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Member", "Zone", "Volume", "Config File", "File ID", "MD5"]);

    for member in members {
        let zone = member.available_zone.as_deref().unwrap_or("-");
        if member.configs.is_empty() {
            table.add_row(vec![
                member.member_name.as_str(),
                zone,
                member.volume_id.as_str(),
                "-",
                "-",
                "-",
            ]);
            continue;
        }
        for (i, config) in member.configs.iter().enumerate() {
            let (name, zone, volume) = if i == 0 {
                (member.member_name.as_str(), zone, member.volume_id.as_str())
            } else {
                ("", "", "")
            };
            table.add_row(vec![
                name,
                zone,
                volume,
                config.file_name.as_str(),
                config.file_id.as_str(),
                config.file_md5.as_str(),
            ]);
        }
    }

    table
}

fn print_as_table(value: &Value) {
    match value {
        Value::Array(arr) if !arr.is_empty() => {
            let mut table = Table::new();

            // Get headers from first object
            if let Value::Object(first) = &arr[0] {
                let headers: Vec<String> = first.keys().cloned().collect();
                table.set_header(&headers);

                for item in arr {
                    if let Value::Object(obj) = item {
                        let row: Vec<String> = headers
                            .iter()
                            .map(|h| format_value(obj.get(h).unwrap_or(&Value::Null)))
                            .collect();
                        table.add_row(row);
                    }
                }
            } else {
                table.set_header(vec!["Value"]);
                for item in arr {
                    table.add_row(vec![format_value(item)]);
                }
            }

            println!("{}", table);
        }
        Value::Object(obj) => {
            let mut table = Table::new();
            table.set_header(vec!["Key", "Value"]);

            for (key, val) in obj {
                table.add_row(vec![key.clone(), format_value(val)]);
            }

            println!("{}", table);
        }
        _ => {
            println!("{}", format_value(value));
        }
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}
