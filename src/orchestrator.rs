//! Sequential case driver
//!
//! Runs the enumerated cases one at a time: launch the three agents in the
//! case's start order with its delay pattern, wait for the cluster to
//! converge, then tear all three agents down concurrently before moving
//! on. Ports and working directories are namespaced per case and node, so
//! the teardown tasks never contend on shared state.

use futures::future::join_all;
use tracing::info;

use crate::agent::{AgentLauncher, HarnessConfig};
use crate::cases::{cases, TestCase};
use crate::monitor::ConvergenceMonitor;

/// Drives the full case sweep against the external agent binary
pub struct Orchestrator {
    config: HarnessConfig,
    launcher: AgentLauncher,
    monitor: ConvergenceMonitor,
}

impl Orchestrator {
    /// Orchestrator for the given configuration
    pub fn new(config: HarnessConfig) -> Self {
        let launcher = AgentLauncher::new(config.clone());
        let monitor = ConvergenceMonitor::new(config.poll_interval);
        Orchestrator {
            config,
            launcher,
            monitor,
        }
    }

    /// Run every connected case, resuming after `skip` combinations in
    /// unfiltered enumeration order.
    pub async fn run(&self, skip: u64) {
        if skip > 0 {
            info!(skip, "resuming enumeration");
        }
        for case in cases(skip) {
            self.run_case(&case).await;
        }
    }

    /// One full case: start the agents, verify convergence, tear down.
    pub async fn run_case(&self, case: &TestCase) {
        info!(
            seq = case.seq,
            order = ?case.order,
            topology = ?case.topology.links,
            delays = ?case.delays,
            "running case"
        );

        // Starting: launch in permutation order, pausing where the delay
        // pattern says.
        let mut agents = Vec::with_capacity(3);
        for (slot, &node) in case.order.iter().enumerate() {
            agents.push(
                self.launcher
                    .start(case.seq, node, &case.topology.links[node]),
            );
            if slot < 2 && case.delays[slot] {
                tokio::time::sleep(self.config.start_delay).await;
            }
        }

        // Verifying: liveness per agent, then agreement across all three.
        let endpoints: Vec<String> = (0..3).map(|node| self.config.endpoint(node)).collect();
        for endpoint in &endpoints {
            self.monitor.await_version(endpoint).await;
        }
        let leader = self.monitor.await_agreement(&endpoints).await;
        info!(seq = case.seq, leader = %leader, "cluster converged");

        // TearingDown: all three concurrently, advancing only once every
        // stop has completed.
        let stops: Vec<_> = agents
            .into_iter()
            .map(|handle| {
                let launcher = self.launcher.clone();
                tokio::spawn(async move { launcher.stop(handle).await })
            })
            .collect();
        join_all(stops).await;
    }
}
