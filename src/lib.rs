//! Combinatorial fault-and-topology exerciser for a three-node agency
//!
//! Sweeps every combination of agent start order, intended connectivity
//! restriction, and startup-delay pattern against an external consensus
//! agent binary, verifying after each launch that the cluster converges on
//! a single leader and a stable membership view. The agent itself is a
//! black box reached only through its process handle and HTTP control API.

pub mod agent;
pub mod cases;
pub mod control;
pub mod monitor;
pub mod orchestrator;
pub mod topology;

pub use agent::{AgentHandle, AgentLauncher, HarnessConfig, LaunchError};
pub use cases::{candidates, cases, Candidate, TestCase, START_ORDERS};
pub use control::{AgencyConfiguration, AgencyControl};
pub use monitor::ConvergenceMonitor;
pub use orchestrator::Orchestrator;
pub use topology::{NodeIndex, Topology, CONNECTION_TEMPLATES, DELAY_PATTERNS};
