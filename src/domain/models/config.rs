//! Configuration model.
//!
//! Every path, port, interval, and threshold the system uses lives here
//! as one defaulted structure passed to components at construction.

use serde::{Deserialize, Serialize};

/// Main configuration structure for Vigil.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Supervised process settings
    #[serde(default)]
    pub supervisor: SupervisorConfig,

    /// Task exchange settings
    #[serde(default)]
    pub exchange: ExchangeConfig,

    /// Issue detection settings
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Orchestration loop settings
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Rebuild settings
    #[serde(default)]
    pub builder: BuilderConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Supervised process configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SupervisorConfig {
    /// Path to the jar the supervised process is launched from
    #[serde(default = "default_jar_path")]
    pub jar_path: String,

    /// Working directory for the supervised process
    #[serde(default = "default_working_dir")]
    pub working_dir: String,

    /// Java executable used to launch the jar
    #[serde(default = "default_java_path")]
    pub java_path: String,

    /// SOCKS proxy host the process is pointed at
    #[serde(default = "default_proxy_host")]
    pub proxy_host: String,

    /// SOCKS proxy port, also the readiness-probe target
    #[serde(default = "default_proxy_port")]
    pub proxy_port: u16,

    /// Seconds to wait between SIGTERM and SIGKILL on stop
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,

    /// Timeout for the TCP readiness probe
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

fn default_jar_path() -> String {
    "app.jar".to_string()
}

fn default_working_dir() -> String {
    ".".to_string()
}

fn default_java_path() -> String {
    "java".to_string()
}

fn default_proxy_host() -> String {
    "127.0.0.1".to_string()
}

const fn default_proxy_port() -> u16 {
    9150
}

const fn default_grace_period_secs() -> u64 {
    10
}

const fn default_probe_timeout_secs() -> u64 {
    2
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        Self {
            jar_path: default_jar_path(),
            working_dir: default_working_dir(),
            java_path: default_java_path(),
            proxy_host: default_proxy_host(),
            proxy_port: default_proxy_port(),
            grace_period_secs: default_grace_period_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

/// Task exchange configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExchangeConfig {
    /// Root of the synchronized bridge checkout holding tasks/ and results/
    #[serde(default = "default_bridge_dir")]
    pub bridge_dir: String,

    /// Milliseconds between result polls
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Seconds to wait for a responder before giving up on an escalation
    #[serde(default = "default_escalation_timeout_secs")]
    pub escalation_timeout_secs: u64,

    /// Timeout for a single git synchronization command
    #[serde(default = "default_sync_timeout_secs")]
    pub sync_timeout_secs: u64,

    /// Responder tag for code-oriented escalations (crashes)
    #[serde(default = "default_crash_responder")]
    pub crash_responder: String,

    /// Responder tag for vision-capable escalations (stuck states)
    #[serde(default = "default_stuck_responder")]
    pub stuck_responder: String,
}

fn default_bridge_dir() -> String {
    ".vigil/bridge".to_string()
}

const fn default_poll_interval_ms() -> u64 {
    5000
}

const fn default_escalation_timeout_secs() -> u64 {
    120
}

const fn default_sync_timeout_secs() -> u64 {
    30
}

fn default_crash_responder() -> String {
    "gemini_1".to_string()
}

fn default_stuck_responder() -> String {
    "claude".to_string()
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            bridge_dir: default_bridge_dir(),
            poll_interval_ms: default_poll_interval_ms(),
            escalation_timeout_secs: default_escalation_timeout_secs(),
            sync_timeout_secs: default_sync_timeout_secs(),
            crash_responder: default_crash_responder(),
            stuck_responder: default_stuck_responder(),
        }
    }
}

/// Issue detection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DetectorConfig {
    /// Directory the screenshot plugin writes into
    #[serde(default = "default_screenshot_dir")]
    pub screenshot_dir: String,

    /// Seconds an unchanged screenshot must persist before STUCK
    #[serde(default = "default_stuck_threshold_secs")]
    pub stuck_threshold_secs: u64,
}

fn default_screenshot_dir() -> String {
    ".vigil/screenshots".to_string()
}

const fn default_stuck_threshold_secs() -> u64 {
    300
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            screenshot_dir: default_screenshot_dir(),
            stuck_threshold_secs: default_stuck_threshold_secs(),
        }
    }
}

/// Orchestration loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WatcherConfig {
    /// Seconds between monitoring ticks
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,

    /// Seconds to wait after stopping before restarting
    #[serde(default = "default_restart_delay_secs")]
    pub restart_delay_secs: u64,

    /// Consecutive crash restarts before escalating
    #[serde(default = "default_max_restart_attempts")]
    pub max_restart_attempts: u32,
}

const fn default_check_interval_secs() -> u64 {
    30
}

const fn default_restart_delay_secs() -> u64 {
    10
}

const fn default_max_restart_attempts() -> u32 {
    3
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            check_interval_secs: default_check_interval_secs(),
            restart_delay_secs: default_restart_delay_secs(),
            max_restart_attempts: default_max_restart_attempts(),
        }
    }
}

/// Rebuild configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct BuilderConfig {
    /// Source checkout of the supervised executable
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Build tool executable
    #[serde(default = "default_build_command")]
    pub build_command: String,

    /// Build tool arguments
    #[serde(default = "default_build_args")]
    pub build_args: Vec<String>,

    /// Timeout for git pull
    #[serde(default = "default_pull_timeout_secs")]
    pub pull_timeout_secs: u64,

    /// Timeout for the build itself
    #[serde(default = "default_build_timeout_secs")]
    pub build_timeout_secs: u64,
}

fn default_source_dir() -> String {
    ".".to_string()
}

fn default_build_command() -> String {
    "mvn".to_string()
}

fn default_build_args() -> Vec<String> {
    vec![
        "clean".to_string(),
        "install".to_string(),
        "-DskipTests".to_string(),
    ]
}

const fn default_pull_timeout_secs() -> u64 {
    30
}

const fn default_build_timeout_secs() -> u64 {
    600
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            build_command: default_build_command(),
            build_args: default_build_args(),
            pull_timeout_secs: default_pull_timeout_secs(),
            build_timeout_secs: default_build_timeout_secs(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Optional directory for daily-rolling log files
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: None,
        }
    }
}
