//! Initialization polling for newly created catalog services
//!
//! Creating a service returns as soon as the management service accepted the
//! request; replica bootstrap carries on in the background. [`InitPoller`]
//! checks the service at a fixed interval until it reports itself initialized
//! or the wait budget is spent.
//!
//! Elapsed time is counted in intervals, not wall clock: the check issued at
//! tick `k` (starting from 0) happens only while `k * interval < max_wait`.
//! Errors from the check call are treated as transient. They are logged and
//! reported to the progress callback, and polling carries on without touching
//! the budget.
//!
//! # Example
//!
//! ```rust,ignore
//! use catalogctl_core::{poll_service_init, InitProgressEvent, PollConfig};
//!
//! poll_service_init(
//!     &client,
//!     &request.check_init_request(),
//!     &PollConfig::default(),
//!     Some(Box::new(|event| {
//!         if let InitProgressEvent::Polling { elapsed, .. } = event {
//!             println!("waiting ({}s)", elapsed.as_secs());
//!         }
//!     })),
//! )
//! .await?;
//! ```

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::client::ManageClient;
use crate::error::{CoreError, Result};
use crate::model::CheckInitRequest;

/// Default time between initialization checks (10 seconds)
pub const DEFAULT_INIT_INTERVAL: Duration = Duration::from_secs(10);

/// Default budget for a service to finish initializing (10 minutes)
pub const DEFAULT_INIT_TIMEOUT: Duration = Duration::from_secs(600);

/// Interval and budget for [`InitPoller`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_wait: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INIT_INTERVAL,
            max_wait: DEFAULT_INIT_TIMEOUT,
        }
    }
}

impl PollConfig {
    pub fn new(interval: Duration, max_wait: Duration) -> Result<Self> {
        if interval.is_zero() {
            return Err(CoreError::Validation(
                "wait interval must be greater than zero".to_string(),
            ));
        }
        Ok(Self { interval, max_wait })
    }
}

/// Progress events emitted while waiting for initialization
#[derive(Debug, Clone, PartialEq)]
pub enum InitProgressEvent {
    /// Polling has begun
    Started { service_name: String },
    /// About to issue check number `attempt`
    Polling {
        service_name: String,
        attempt: u32,
        elapsed: Duration,
    },
    /// A check failed; polling continues
    TransientError {
        service_name: String,
        attempt: u32,
        error: String,
    },
    /// The service reported itself initialized
    Initialized {
        service_name: String,
        elapsed: Duration,
    },
    /// The budget ran out
    TimedOut {
        service_name: String,
        max_wait: Duration,
    },
}

/// Callback type for initialization progress updates
///
/// The CLI uses this to drive its spinner.
pub type InitProgressCallback = Box<dyn Fn(InitProgressEvent) + Send + Sync>;

/// Poller state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling { elapsed: Duration },
    Initialized,
    TimedOut,
}

impl PollState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, PollState::Polling { .. })
    }
}

/// Waits for one service to finish initializing
pub struct InitPoller<'a> {
    client: &'a dyn ManageClient,
    request: &'a CheckInitRequest,
    config: PollConfig,
    state: PollState,
    attempts: u32,
    on_progress: Option<InitProgressCallback>,
}

impl<'a> InitPoller<'a> {
    pub fn new(
        client: &'a dyn ManageClient,
        request: &'a CheckInitRequest,
        config: PollConfig,
        on_progress: Option<InitProgressCallback>,
    ) -> Self {
        Self {
            client,
            request,
            config,
            state: PollState::Polling {
                elapsed: Duration::ZERO,
            },
            attempts: 0,
            on_progress,
        }
    }

    pub fn state(&self) -> PollState {
        self.state
    }

    /// Number of checks issued so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    fn service_name(&self) -> String {
        self.request.service.service_name.clone()
    }

    fn emit(&self, event: InitProgressEvent) {
        if let Some(cb) = &self.on_progress {
            cb(event);
        }
    }

    /// Advance the state machine by one check
    ///
    /// A non-terminal check is followed by one interval of sleep. Calling
    /// `tick` in a terminal state is a no-op.
    pub async fn tick(&mut self) -> PollState {
        let PollState::Polling { elapsed } = self.state else {
            return self.state;
        };

        if elapsed >= self.config.max_wait {
            self.state = PollState::TimedOut;
            return self.state;
        }

        self.attempts += 1;
        self.emit(InitProgressEvent::Polling {
            service_name: self.service_name(),
            attempt: self.attempts,
            elapsed,
        });

        match self.client.check_service_init(self.request).await {
            Ok(true) => {
                self.state = PollState::Initialized;
                return self.state;
            }
            Ok(false) => {
                debug!(
                    "Service {} is initializing ({}s elapsed)",
                    self.request.service.service_name,
                    elapsed.as_secs()
                );
            }
            Err(e) => {
                warn!(
                    "Check service init error for {}: {}",
                    self.request.service.service_name, e
                );
                self.emit(InitProgressEvent::TransientError {
                    service_name: self.service_name(),
                    attempt: self.attempts,
                    error: e.to_string(),
                });
            }
        }

        tokio::time::sleep(self.config.interval).await;
        let elapsed = elapsed + self.config.interval;
        self.state = if elapsed >= self.config.max_wait {
            PollState::TimedOut
        } else {
            PollState::Polling { elapsed }
        };
        self.state
    }

    /// Poll until a terminal state is reached
    pub async fn run(mut self) -> Result<()> {
        self.emit(InitProgressEvent::Started {
            service_name: self.service_name(),
        });

        let mut elapsed = Duration::ZERO;
        loop {
            match self.tick().await {
                PollState::Polling { elapsed: now } => elapsed = now,
                PollState::Initialized => {
                    info!(
                        "Service {} initialized after {} checks",
                        self.request.service.service_name, self.attempts
                    );
                    self.emit(InitProgressEvent::Initialized {
                        service_name: self.service_name(),
                        elapsed,
                    });
                    return Ok(());
                }
                PollState::TimedOut => {
                    self.emit(InitProgressEvent::TimedOut {
                        service_name: self.service_name(),
                        max_wait: self.config.max_wait,
                    });
                    return Err(CoreError::InitTimeout(self.config.max_wait));
                }
            }
        }
    }
}

/// Poll a service until it is initialized or the budget in `config` is spent
pub async fn poll_service_init(
    client: &dyn ManageClient,
    request: &CheckInitRequest,
    config: &PollConfig,
    on_progress: Option<InitProgressCallback>,
) -> Result<()> {
    InitPoller::new(client, request, *config, on_progress)
        .run()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockManageClient;
    use crate::error::RemoteError;
    use crate::model::{Credentials, ServiceIdentity, ServiceType};
    use std::sync::{Arc, Mutex};

    fn check_request() -> CheckInitRequest {
        CheckInitRequest {
            service_type: ServiceType::DocumentStore,
            service: ServiceIdentity::new("us-west-1", "default", "mymongo"),
            admin: Credentials::new("dbadmin", "changeme"),
        }
    }

    fn config(interval_secs: u64, max_wait_secs: u64) -> PollConfig {
        PollConfig::new(
            Duration::from_secs(interval_secs),
            Duration::from_secs(max_wait_secs),
        )
        .unwrap()
    }

    /// Mock that reports "not initialized" for the first `k` checks
    fn initialized_after(k: u32, expected_calls: usize) -> MockManageClient {
        let expected = check_request();
        let mut client = MockManageClient::new();
        let mut calls = 0;
        client
            .expect_check_service_init()
            .withf(move |req| *req == expected)
            .times(expected_calls)
            .returning(move |_| {
                calls += 1;
                Ok(calls > k)
            });
        client
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_when_initialized_within_budget() {
        // ticks happen at 0, 10, ..., 50; the 6th check succeeds
        let client = initialized_after(5, 6);
        let request = check_request();
        let result = poll_service_init(&client, &request, &config(10, 60), None).await;
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_when_budget_spent() {
        // k * interval == budget, so the succeeding check never happens
        let client = initialized_after(6, 6);
        let request = check_request();
        let result = poll_service_init(&client, &request, &config(10, 60), None).await;
        assert!(matches!(result, Err(CoreError::InitTimeout(d)) if d == Duration::from_secs(60)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_iff_k_times_interval_below_budget() {
        let interval: u64 = 10;
        let budget: u64 = 45;
        for k in 0..8u32 {
            let ticks_in_budget = budget.div_ceil(interval) as u32;
            let succeeds = u64::from(k) * interval < budget;
            let expected_calls = if succeeds { k + 1 } else { ticks_in_budget };
            let client = initialized_after(k, expected_calls as usize);
            let request = check_request();
            let result =
                poll_service_init(&client, &request, &config(interval, budget), None).await;
            assert_eq!(result.is_ok(), succeeds, "k={k}");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_errors_do_not_abort_or_reset_budget() {
        let mut client = MockManageClient::new();
        let mut tick = 0;
        client
            .expect_check_service_init()
            .times(6)
            .returning(move |_| {
                tick += 1;
                match tick {
                    2 | 4 => Err(RemoteError::network("connection reset")),
                    6 => Ok(true),
                    _ => Ok(false),
                }
            });

        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let request = check_request();
        let result = poll_service_init(
            &client,
            &request,
            &config(10, 100),
            Some(Box::new(move |e| sink.lock().unwrap().push(e))),
        )
        .await;
        assert!(result.is_ok());

        let events = events.lock().unwrap();
        let transient: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                InitProgressEvent::TransientError { attempt, .. } => Some(*attempt),
                _ => None,
            })
            .collect();
        assert_eq!(transient, vec![2, 4]);
        assert!(matches!(
            events.last(),
            Some(InitProgressEvent::Initialized { elapsed, .. }) if *elapsed == Duration::from_secs(50)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_persistent_errors_end_in_timeout() {
        let mut client = MockManageClient::new();
        client
            .expect_check_service_init()
            .times(3)
            .returning(|_| Err(RemoteError::auth("bad certificate")));

        let request = check_request();
        let result = poll_service_init(&client, &request, &config(10, 30), None).await;
        assert!(matches!(result, Err(CoreError::InitTimeout(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_tick_walks_the_state_machine() {
        let client = initialized_after(1, 2);
        let request = check_request();
        let mut poller = InitPoller::new(&client, &request, config(10, 60), None);

        assert_eq!(
            poller.state(),
            PollState::Polling {
                elapsed: Duration::ZERO
            }
        );
        assert_eq!(
            poller.tick().await,
            PollState::Polling {
                elapsed: Duration::from_secs(10)
            }
        );
        assert_eq!(poller.tick().await, PollState::Initialized);
        assert!(poller.state().is_terminal());
        // terminal states do not issue further checks
        assert_eq!(poller.tick().await, PollState::Initialized);
        assert_eq!(poller.attempts(), 2);
    }

    #[test]
    fn test_zero_interval_rejected() {
        assert!(PollConfig::new(Duration::ZERO, Duration::from_secs(60)).is_err());
    }

    #[test]
    fn test_zero_budget_times_out_without_checking() {
        let client = MockManageClient::new();
        let request = check_request();
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .unwrap();
        let result = rt.block_on(poll_service_init(
            &client,
            &request,
            &config(10, 0),
            None,
        ));
        assert!(matches!(result, Err(CoreError::InitTimeout(_))));
    }
}
