//! Orchestration loop.
//!
//! The single driver on the watcher machine: poll the supervisor, let the
//! detector classify failures, restart the cheap ones, and escalate the
//! rest through the exchange. Terminal conditions (no fix received, a
//! failed rebuild) stop the loop and leave the rest to a human. The
//! policy is "stop trying and surface", never "retry forever".

use std::time::Duration;

use tokio::signal::unix::{signal, SignalKind};
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::domain::models::{ExchangeConfig, Issue, IssueKind, WatcherConfig};
use crate::domain::ports::errors::WatcherError;
use crate::services::builder::{PullOutcome, Rebuilder};
use crate::services::detector::IssueDetector;
use crate::services::exchange::ExchangeClient;
use crate::services::supervisor::Supervisor;

/// What the policy decided for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Nothing to do, the process is healthy.
    Continue,
    /// Stop and relaunch without escalating.
    Restart,
    /// Hand the issue to a remote responder.
    Escalate,
}

/// The restart/escalate decision table.
///
/// A crash inside the restart budget restarts directly; a stuck state or
/// an exhausted budget escalates. Escalation is the expensive path and
/// only runs when restarts cannot help.
pub fn plan(issue: Option<&Issue>, restart_count: u32, max_restart_attempts: u32) -> Action {
    match issue {
        None => Action::Continue,
        Some(Issue::Crash { .. }) if restart_count < max_restart_attempts => Action::Restart,
        Some(_) => Action::Escalate,
    }
}

/// The orchestration loop over supervisor, detector, exchange client, and
/// rebuilder.
pub struct Watcher {
    supervisor: Supervisor,
    detector: IssueDetector,
    exchange: ExchangeClient,
    rebuilder: Rebuilder,
    config: WatcherConfig,
    routing: Routing,
    escalation_timeout: Duration,
    restart_count: u32,
}

/// Which responder tag answers which failure kind.
struct Routing {
    crash_responder: String,
    stuck_responder: String,
}

impl Watcher {
    /// Wire the loop from its parts.
    pub fn new(
        supervisor: Supervisor,
        detector: IssueDetector,
        exchange: ExchangeClient,
        rebuilder: Rebuilder,
        config: WatcherConfig,
        exchange_config: &ExchangeConfig,
    ) -> Self {
        Self {
            supervisor,
            detector,
            exchange,
            rebuilder,
            config,
            routing: Routing {
                crash_responder: exchange_config.crash_responder.clone(),
                stuck_responder: exchange_config.stuck_responder.clone(),
            },
            escalation_timeout: Duration::from_secs(exchange_config.escalation_timeout_secs),
            restart_count: 0,
        }
    }

    /// Run until a terminal condition or an external signal.
    ///
    /// SIGINT/SIGTERM at any await point stops the supervised process
    /// (two-phase) before returning, so the child is never abandoned.
    pub async fn run(&mut self) -> Result<(), WatcherError> {
        let mut sigterm = signal(SignalKind::terminate())
            .map_err(|e| WatcherError::Supervisor(e.into()))?;
        let check_interval = Duration::from_secs(self.config.check_interval_secs);

        self.supervisor.start().await?;
        info!(
            check_interval_secs = self.config.check_interval_secs,
            max_restart_attempts = self.config.max_restart_attempts,
            "watcher started"
        );

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupt received; shutting down");
                    break;
                }
                _ = sigterm.recv() => {
                    info!("termination requested; shutting down");
                    break;
                }
                () = sleep(check_interval) => {}
            }

            if let Err(e) = self.tick().await {
                error!(error = %e, "watcher stopping on terminal condition");
                let _ = self.supervisor.stop().await;
                return Err(e);
            }
        }

        self.supervisor.stop().await?;
        Ok(())
    }

    /// One monitoring tick.
    async fn tick(&mut self) -> Result<(), WatcherError> {
        let running = self.supervisor.is_running();
        let uptime = self.supervisor.uptime_secs();
        let Some(issue) = self.detector.check(running, uptime) else {
            debug!(uptime_secs = uptime, "running ok");
            return Ok(());
        };

        match plan(Some(&issue), self.restart_count, self.config.max_restart_attempts) {
            Action::Continue => Ok(()),
            Action::Restart => {
                warn!(
                    issue = %issue.description(),
                    attempt = self.restart_count + 1,
                    max = self.config.max_restart_attempts,
                    "restarting after crash"
                );
                self.supervisor.stop().await?;
                self.restart_count += 1;
                self.restart().await;
                Ok(())
            }
            Action::Escalate => self.escalate(&issue).await,
        }
    }

    /// The escalation path: publish the issue, wait for a fix, pull and
    /// rebuild, restart.
    async fn escalate(&mut self, issue: &Issue) -> Result<(), WatcherError> {
        warn!(
            kind = issue.kind().as_str(),
            description = %issue.description(),
            "escalating to remote responder"
        );
        self.supervisor.stop().await?;

        let responder = match issue.kind() {
            // Stuck analysis needs to look at the screenshot
            IssueKind::Stuck => self.routing.stuck_responder.as_str(),
            IssueKind::Crash => self.routing.crash_responder.as_str(),
        };
        let prompt = render_issue_prompt(issue);

        let task_id = match self.exchange.submit(responder, &prompt).await {
            Ok(task_id) => task_id,
            Err(e) => {
                // The task never became visible to any responder, so no
                // fix can ever arrive for it.
                error!(error = %e, "failed to publish escalation");
                return Err(WatcherError::NoFixReceived);
            }
        };

        let Some(response) = self.exchange.await_result(&task_id, self.escalation_timeout).await
        else {
            return Err(WatcherError::NoFixReceived);
        };
        info!(response_chars = response.len(), "fix received");

        match self.rebuilder.pull_latest().await {
            Ok(PullOutcome::Updated) => {
                self.rebuilder.rebuild().await?;
                info!("rebuild succeeded; restart budget reset");
                self.restart_count = 0;
            }
            Ok(PullOutcome::AlreadyUpToDate) => {
                warn!("no new code to pull; restarting anyway");
            }
            Err(e) => {
                warn!(error = %e, "pull failed; restarting anyway");
            }
        }

        self.restart().await;
        Ok(())
    }

    /// Delay, then relaunch. A failed launch is not terminal here: the
    /// next tick sees the dead process and the budget decides.
    async fn restart(&mut self) {
        sleep(Duration::from_secs(self.config.restart_delay_secs)).await;
        if let Err(e) = self.supervisor.start().await {
            warn!(error = %e, "restart failed; will retry on a later tick");
        }
    }
}

/// The escalation prompt sent to the responder.
fn render_issue_prompt(issue: &Issue) -> String {
    let mut prompt = format!(
        "ISSUE DETECTED\n\nType: {}\nDescription: {}\n",
        issue.kind().as_str().to_uppercase(),
        issue.description(),
    );

    match issue {
        Issue::Crash { uptime_secs } => {
            prompt.push_str(&format!("Uptime before crash: {uptime_secs} seconds\n"));
        }
        Issue::Stuck { screenshot } => {
            prompt.push_str(&format!(
                "Screenshot: {} (available in the shared screenshot directory)\n",
                screenshot.display()
            ));
        }
    }

    prompt.push_str(
        "\nPlease analyze this issue and provide:\n\
         1. Likely cause\n\
         2. How to fix it\n\
         3. Any code changes needed\n\
         \n\
         If code changes are needed, commit complete files to the shared repository.\n",
    );
    prompt
}
