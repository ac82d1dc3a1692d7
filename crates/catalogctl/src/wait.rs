//! Spinner shown while a newly created service initializes

use std::time::Duration;

use catalogctl_core::{InitProgressCallback, InitProgressEvent};
use indicatif::{ProgressBar, ProgressStyle};

use crate::cli::OutputFormat;

/// Create the spinner and the progress callback that drives it
///
/// The spinner is hidden for machine-readable output. indicatif also skips
/// drawing when stderr is not a terminal.
pub fn init_spinner(format: OutputFormat) -> (ProgressBar, InitProgressCallback) {
    let pb = match format {
        OutputFormat::Json | OutputFormat::Yaml => ProgressBar::hidden(),
        OutputFormat::Auto | OutputFormat::Table => {
            let pb = ProgressBar::new_spinner();
            if let Ok(style) =
                ProgressStyle::default_spinner().template("{spinner:.green} {msg} [{elapsed_precise}]")
            {
                pb.set_style(style);
            }
            pb
        }
    };

    let pb_clone = pb.clone();
    let callback: InitProgressCallback = Box::new(move |event| {
        if let Some(message) = spinner_message(&event) {
            pb_clone.set_message(message);
        }
        match event {
            InitProgressEvent::Started { .. } => {
                pb_clone.enable_steady_tick(Duration::from_millis(120));
            }
            InitProgressEvent::Initialized { .. } | InitProgressEvent::TimedOut { .. } => {
                pb_clone.finish_and_clear();
            }
            _ => {}
        }
    });

    (pb, callback)
}

fn spinner_message(event: &InitProgressEvent) -> Option<String> {
    match event {
        InitProgressEvent::Started { service_name } => {
            Some(format!("Waiting for {} to initialize", service_name))
        }
        InitProgressEvent::Polling {
            service_name,
            attempt,
            elapsed,
        } => Some(format!(
            "Waiting for {} to initialize (check {}, {}s elapsed)",
            service_name,
            attempt,
            elapsed.as_secs()
        )),
        InitProgressEvent::TransientError {
            service_name,
            attempt,
            error,
        } => Some(format!(
            "Waiting for {}: check {} failed: {}",
            service_name, attempt, error
        )),
        InitProgressEvent::Initialized { .. } | InitProgressEvent::TimedOut { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_polling_message() {
        let message = spinner_message(&InitProgressEvent::Polling {
            service_name: "svcA".to_string(),
            attempt: 3,
            elapsed: Duration::from_secs(20),
        })
        .unwrap();
        assert_eq!(
            message,
            "Waiting for svcA to initialize (check 3, 20s elapsed)"
        );
    }

    #[test]
    fn test_terminal_events_clear_spinner() {
        let (pb, callback) = init_spinner(OutputFormat::Json);
        callback(InitProgressEvent::Started {
            service_name: "svcA".to_string(),
        });
        callback(InitProgressEvent::Initialized {
            service_name: "svcA".to_string(),
            elapsed: Duration::from_secs(10),
        });
        assert!(pb.is_finished());
    }
}
