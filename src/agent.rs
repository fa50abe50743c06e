//! External agent process lifecycle
//!
//! Builds the command line for one agency member, spawns it in a per-case
//! working directory, and tears it down again: graceful HTTP shutdown with
//! a bounded timeout first, forced kill on any failure. Directory cleanup
//! is unconditional so repeated runs never accumulate stale state.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::process::{Child, Command};
use tracing::{debug, error, info, warn};

use crate::topology::NodeIndex;

/// Harness-wide configuration
#[derive(Clone, Debug)]
pub struct HarnessConfig {
    /// Path to the external agent executable
    pub agent_binary: PathBuf,
    /// JavaScript startup directory handed to the agent
    pub js_startup_dir: PathBuf,
    /// Host the agents bind and advertise on
    pub host: String,
    /// Port of node 0; node k listens on `base_port + k`
    pub base_port: u16,
    /// Root under which per-case agent directories are created
    pub work_root: PathBuf,
    /// Pause inserted between launches when the delay pattern says so
    pub start_delay: Duration,
    /// Interval between liveness/agreement polls
    pub poll_interval: Duration,
    /// Time allowed for the graceful HTTP shutdown before a forced kill
    pub shutdown_timeout: Duration,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            agent_binary: PathBuf::from("./build/bin/arangod"),
            js_startup_dir: PathBuf::from("./js"),
            host: "localhost".to_string(),
            base_port: 4001,
            work_root: PathBuf::from("."),
            start_delay: Duration::from_secs(1),
            poll_interval: Duration::from_secs(1),
            shutdown_timeout: Duration::from_secs(15),
        }
    }
}

impl HarnessConfig {
    /// Config with a custom pause between delayed launches
    pub fn with_start_delay(mut self, delay: Duration) -> Self {
        self.start_delay = delay;
        self
    }

    /// Config with a custom poll interval
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Config with a custom graceful-shutdown timeout
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    /// Port node `node` listens on
    pub fn port(&self, node: NodeIndex) -> u16 {
        self.base_port + node as u16
    }

    /// Base URL of node `node`'s HTTP API
    pub fn endpoint(&self, node: NodeIndex) -> String {
        format!("http://{}:{}", self.host, self.port(node))
    }

    /// Working directory for node `node` in case `seq`
    pub fn agent_dir(&self, seq: u64, node: NodeIndex) -> PathBuf {
        self.work_root.join(format!("{}agent{}", seq, self.port(node)))
    }
}

/// Reasons an agent can fail to come up
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The per-case working directory could not be created
    #[error("failed to create working directory: {0}")]
    Workspace(#[source] std::io::Error),
    /// The agent executable could not be spawned
    #[error("failed to spawn agent process: {0}")]
    Spawn(#[source] std::io::Error),
}

/// One agency member owned for the duration of a single case
#[derive(Debug)]
pub struct AgentHandle {
    /// Cluster position of this agent
    pub node: NodeIndex,
    /// Port the agent listens on
    pub port: u16,
    /// Per-case working directory, removed on stop
    pub dir: PathBuf,
    process: Option<Child>,
}

impl AgentHandle {
    /// Handle with no underlying process.
    ///
    /// Used when the spawn failed, and by tests that only exercise the
    /// teardown path.
    pub fn detached(node: NodeIndex, port: u16, dir: PathBuf) -> Self {
        AgentHandle {
            node,
            port,
            dir,
            process: None,
        }
    }

    /// Whether the underlying process was actually spawned
    pub fn is_running(&self) -> bool {
        self.process.is_some()
    }
}

/// Starts and stops external agent processes
#[derive(Clone)]
pub struct AgentLauncher {
    config: HarnessConfig,
    http: reqwest::Client,
}

impl AgentLauncher {
    /// Launcher whose shutdown requests are bounded by the configured
    /// timeout.
    pub fn new(config: HarnessConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.shutdown_timeout)
            .build()
            .expect("Failed to create HTTP client");
        AgentLauncher { config, http }
    }

    /// Launch the agent for `node`, namespaced under case `seq`.
    ///
    /// `links` is the node's intended reachability from the current
    /// topology; it is logged with the launch but not handed to the agent,
    /// which always receives the full peer set.
    ///
    /// A launch failure is logged and yields a detached handle; the
    /// follow-up liveness poll then never succeeds, which is how a dead
    /// agent surfaces in this harness.
    pub fn start(&self, seq: u64, node: NodeIndex, links: &[NodeIndex]) -> AgentHandle {
        let port = self.config.port(node);
        let dir = self.config.agent_dir(seq, node);
        info!(node, port, ?links, "starting agent");
        match self.spawn(node, port, &dir) {
            Ok(child) => AgentHandle {
                node,
                port,
                dir,
                process: Some(child),
            },
            Err(e) => {
                error!(node, error = %e, "agent failed to start");
                AgentHandle::detached(node, port, dir)
            }
        }
    }

    fn spawn(&self, node: NodeIndex, port: u16, dir: &Path) -> Result<Child, LaunchError> {
        std::fs::create_dir_all(dir.join("data")).map_err(LaunchError::Workspace)?;
        std::fs::create_dir_all(dir.join("apps")).map_err(LaunchError::Workspace)?;
        Command::new(&self.config.agent_binary)
            .args(self.agent_args(node, port, dir))
            .stdin(Stdio::inherit())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(LaunchError::Spawn)
    }

    /// Full command line for one agency member.
    ///
    /// Peer endpoints are always all-to-all: the topology restriction is a
    /// test input describing intended reachability, not configuration the
    /// agent consumes.
    fn agent_args(&self, node: NodeIndex, port: u16, dir: &Path) -> Vec<String> {
        let c = &self.config;
        let mut args: Vec<String> = vec![
            "-c".into(),
            "none".into(),
            "--server.endpoint".into(),
            format!("tcp://0.0.0.0:{}", port),
            "--database.directory".into(),
            dir.join("data").display().to_string(),
            "--javascript.startup-directory".into(),
            c.js_startup_dir.display().to_string(),
            "--javascript.app-path".into(),
            dir.join("apps").display().to_string(),
            "--log.file".into(),
            dir.join("agency.log").display().to_string(),
            "--log.level".into(),
            "INFO".into(),
            "--log.force-direct".into(),
            "false".into(),
            "--server.authentication".into(),
            "false".into(),
            "--agency.activate".into(),
            "true".into(),
            "--agency.my-address".into(),
            format!("tcp://{}:{}", c.host, port),
            "--agency.size".into(),
            "3".into(),
            "--agency.supervision".into(),
            "true".into(),
            "--foxx.queues".into(),
            "false".into(),
            "--javascript.v8-contexts".into(),
            "1".into(),
            "--server.statistics".into(),
            "false".into(),
            "--server.threads".into(),
            "8".into(),
        ];
        for peer in 0..3 {
            if peer != node {
                args.push("--agency.endpoint".into());
                args.push(format!("tcp://{}:{}", c.host, c.base_port + peer as u16));
            }
        }
        args
    }

    /// Tear down one agent.
    ///
    /// Tries a graceful HTTP shutdown first and falls back to a forced
    /// kill on any network error, non-success status, or timeout. The
    /// working directory is removed in both paths.
    pub async fn stop(&self, mut handle: AgentHandle) {
        info!(node = handle.node, "stopping agent");
        let url = format!(
            "http://{}:{}/_admin/shutdown",
            self.config.host, handle.port
        );
        let graceful = match self.http.delete(&url).send().await {
            Ok(resp) => resp.status() == reqwest::StatusCode::OK,
            Err(e) => {
                debug!(node = handle.node, error = %e, "shutdown request failed");
                false
            }
        };

        if let Some(child) = handle.process.as_mut() {
            if graceful {
                if let Err(e) = child.wait().await {
                    warn!(node = handle.node, error = %e, "wait after graceful shutdown failed");
                }
            } else {
                warn!(node = handle.node, "graceful shutdown failed, killing agent");
                if let Err(e) = child.kill().await {
                    warn!(node = handle.node, error = %e, "kill failed");
                }
            }
        }

        if let Err(e) = tokio::fs::remove_dir_all(&handle.dir).await {
            debug!(node = handle.node, error = %e, "could not remove agent directory");
        }
    }
}
