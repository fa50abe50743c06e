//! Convergence verification
//!
//! Polls the agents' control API until the cluster reports a consistent
//! pool, active set, and leader across all members. Waiting is unbounded
//! on purpose: a case that never converges is exactly the signal this
//! harness exists to surface, and the external test runner's timeout is
//! the failure detector.

use std::time::Duration;

use tracing::{debug, info, warn};

use crate::control::{fetch_config, probe_version};

/// Polls agents for liveness and membership agreement
#[derive(Clone)]
pub struct ConvergenceMonitor {
    http: reqwest::Client,
    poll_interval: Duration,
}

impl ConvergenceMonitor {
    /// Monitor polling at `poll_interval`, with a bounded per-request
    /// timeout so a wedged agent shows up as a retried error rather than
    /// a stuck connection.
    pub fn new(poll_interval: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .expect("Failed to create HTTP client");
        ConvergenceMonitor {
            http,
            poll_interval,
        }
    }

    /// Block until the agent at `endpoint` answers its version probe.
    ///
    /// Retries forever at the poll interval; an agent that never comes up
    /// manifests as a hang.
    pub async fn await_version(&self, endpoint: &str) {
        loop {
            match probe_version(&self.http, endpoint).await {
                Ok(()) => {
                    info!(endpoint, "version endpoint reachable");
                    return;
                }
                Err(e) => debug!(endpoint, error = %e, "waiting for version endpoint"),
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }

    /// Block until every endpoint reports the same leader over a full pool
    /// of three active members, returning the agreed leader id.
    ///
    /// The first endpoint to report a complete, led configuration sets the
    /// reference leader. A later endpoint reporting a different non-empty
    /// leader is treated as a transient fork: the reference is dropped and
    /// the walk restarts from the first endpoint.
    pub async fn await_agreement(&self, endpoints: &[String]) -> String {
        let mut leader = String::new();
        let mut idx = 0;
        while idx < endpoints.len() {
            self.await_member_view(&endpoints[idx], &mut leader).await;
            if leader.is_empty() {
                idx = 0;
            } else {
                idx += 1;
            }
        }
        leader
    }

    /// Poll one endpoint until it reports a full, led configuration, then
    /// reconcile its leader with the reference.
    async fn await_member_view(&self, endpoint: &str, leader: &mut String) {
        loop {
            match fetch_config(&self.http, endpoint).await {
                Ok(control) => {
                    let pool = control.configuration.pool.len();
                    let active = control.configuration.active.len();
                    if pool < 3 {
                        debug!(endpoint, pool, "pool not yet complete");
                    } else if active < 3 {
                        debug!(endpoint, active, "not all members active");
                    } else if control.leader_id.is_empty() {
                        debug!(endpoint, "no leader yet");
                    } else if leader.is_empty() || *leader == control.leader_id {
                        *leader = control.leader_id;
                        info!(endpoint, leader = %leader, "member agrees");
                        return;
                    } else {
                        warn!(
                            endpoint,
                            reference = %leader,
                            reported = %control.leader_id,
                            "leader fork observed, restarting agreement check"
                        );
                        leader.clear();
                        return;
                    }
                }
                Err(e) => debug!(endpoint, error = %e, "waiting for agency config"),
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
