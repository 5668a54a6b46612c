//! Process supervisor.
//!
//! Owns the supervised child process: launches it behind the configured
//! SOCKS proxy, reports liveness and uptime, and stops it with a
//! two-phase SIGTERM-then-SIGKILL shutdown so no child is ever orphaned.
//! Retry policy lives in the watcher, not here: a failed launch is
//! reported once and left to the caller.

use std::process::Stdio;
use std::time::{Duration, Instant};

use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::SupervisorConfig;
use crate::domain::ports::errors::SupervisorError;

/// Lifecycle state of the supervised process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Never launched in this supervisor's lifetime.
    NotStarted,
    /// Child is alive.
    Running,
    /// Child has exited or was stopped.
    Stopped,
}

/// Manages the supervised executable.
pub struct Supervisor {
    config: SupervisorConfig,
    child: Option<Child>,
    started_at: Option<Instant>,
    start_count: u32,
}

impl Supervisor {
    /// Create a supervisor for the configured executable. Nothing is
    /// launched until `start`.
    pub fn new(config: SupervisorConfig) -> Self {
        Self {
            config,
            child: None,
            started_at: None,
            start_count: 0,
        }
    }

    /// Launch the supervised process.
    ///
    /// Verifies the proxy is accepting connections first and fails fast
    /// with `DependencyUnavailable` if not; the caller may retry later.
    /// Stdout/stderr are captured and drained into the log at debug level.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), SupervisorError> {
        self.probe_dependency().await?;

        let mut command = Command::new(&self.config.java_path);
        command
            .args(self.launch_args())
            .current_dir(&self.config.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = command.spawn().map_err(SupervisorError::Launch)?;

        // Drain captured output so the child never blocks on a full pipe.
        if let Some(stdout) = child.stdout.take() {
            tokio::spawn(drain(stdout, "stdout"));
        }
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(drain(stderr, "stderr"));
        }

        info!(
            pid = child.id(),
            proxy = format!("{}:{}", self.config.proxy_host, self.config.proxy_port),
            "supervised process started"
        );

        self.child = Some(child);
        self.started_at = Some(Instant::now());
        self.start_count += 1;
        Ok(())
    }

    /// Non-blocking liveness check.
    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Current lifecycle state.
    pub fn state(&mut self) -> SupervisorState {
        if self.is_running() {
            SupervisorState::Running
        } else if self.start_count == 0 {
            SupervisorState::NotStarted
        } else {
            SupervisorState::Stopped
        }
    }

    /// Seconds since the last successful start, 0 when not running.
    pub fn uptime_secs(&self) -> u64 {
        self.started_at.map_or(0, |t| t.elapsed().as_secs())
    }

    /// Cumulative successful launches.
    pub fn start_count(&self) -> u32 {
        self.start_count
    }

    /// Stop the supervised process.
    ///
    /// Two phases, always: SIGTERM, wait out the grace period, SIGKILL if
    /// the child has not exited. Runs regardless of caller-visible state
    /// so a half-dead child is still reaped.
    #[instrument(skip(self))]
    pub async fn stop(&mut self) -> Result<(), SupervisorError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        self.started_at = None;

        if child.try_wait()?.is_some() {
            debug!("child already exited");
            return Ok(());
        }

        if let Some(pid) = child.id() {
            info!(pid, "sending SIGTERM");
            if let Err(e) = kill(Pid::from_raw(pid as i32), Signal::SIGTERM) {
                warn!(pid, error = %e, "SIGTERM failed; escalating to SIGKILL");
            }
        }

        let grace = Duration::from_secs(self.config.grace_period_secs);
        match timeout(grace, child.wait()).await {
            Ok(status) => {
                let status = status?;
                info!(?status, "supervised process exited");
            }
            Err(_) => {
                warn!(
                    grace_secs = self.config.grace_period_secs,
                    "grace period elapsed; force killing"
                );
                child.kill().await?;
            }
        }

        Ok(())
    }

    /// Verify the proxy port is accepting connections.
    async fn probe_dependency(&self) -> Result<(), SupervisorError> {
        let addr = (self.config.proxy_host.as_str(), self.config.proxy_port);
        let probe = Duration::from_secs(self.config.probe_timeout_secs);

        match timeout(probe, TcpStream::connect(addr)).await {
            Ok(Ok(_)) => Ok(()),
            _ => Err(SupervisorError::DependencyUnavailable {
                host: self.config.proxy_host.clone(),
                port: self.config.proxy_port,
            }),
        }
    }

    /// The fixed argument list encoding the proxy settings.
    fn launch_args(&self) -> Vec<String> {
        vec![
            format!("-DsocksProxyHost={}", self.config.proxy_host),
            format!("-DsocksProxyPort={}", self.config.proxy_port),
            "-Djava.net.preferIPv4Stack=true".to_string(),
            "-jar".to_string(),
            self.config.jar_path.clone(),
        ]
    }
}

/// Forward a captured child stream into the log.
async fn drain(stream: impl tokio::io::AsyncRead + Unpin, name: &'static str) {
    let mut lines = BufReader::new(stream).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "vigil::supervised", stream = name, "{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_args_encode_proxy() {
        let supervisor = Supervisor::new(SupervisorConfig::default());
        let args = supervisor.launch_args();

        assert!(args.contains(&"-DsocksProxyHost=127.0.0.1".to_string()));
        assert!(args.contains(&"-DsocksProxyPort=9150".to_string()));
        assert!(args.contains(&"-jar".to_string()));
        assert_eq!(args.last().unwrap(), "app.jar");
    }

    #[test]
    fn test_initial_state() {
        let mut supervisor = Supervisor::new(SupervisorConfig::default());
        assert_eq!(supervisor.state(), SupervisorState::NotStarted);
        assert!(!supervisor.is_running());
        assert_eq!(supervisor.uptime_secs(), 0);
        assert_eq!(supervisor.start_count(), 0);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_noop() {
        let mut supervisor = Supervisor::new(SupervisorConfig::default());
        supervisor.stop().await.unwrap();
        assert_eq!(supervisor.state(), SupervisorState::NotStarted);
    }

    #[tokio::test]
    async fn test_probe_fails_on_closed_port() {
        // Bind then drop to obtain a port nobody is listening on.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let config = SupervisorConfig {
            proxy_port: port,
            probe_timeout_secs: 1,
            ..SupervisorConfig::default()
        };
        let mut supervisor = Supervisor::new(config);

        match supervisor.start().await {
            Err(SupervisorError::DependencyUnavailable { port: p, .. }) => {
                assert_eq!(p, port);
            }
            other => panic!("expected DependencyUnavailable, got {other:?}"),
        }
    }
}
