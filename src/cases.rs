//! Test-case enumeration
//!
//! Produces the fixed, reproducible sweep of start order × topology ×
//! delay pattern. A counter is threaded through the enumeration (instead
//! of living in a global) so that interrupted runs can resume at an exact
//! position in the unfiltered order.

use crate::topology::{NodeIndex, Topology, CONNECTION_TEMPLATES, DELAY_PATTERNS};

/// The six orders in which the three agents can be launched
pub const START_ORDERS: [[NodeIndex; 3]; 6] = [
    [0, 1, 2],
    [0, 2, 1],
    [1, 0, 2],
    [1, 2, 0],
    [2, 0, 1],
    [2, 1, 0],
];

/// One fully specified exerciser case
#[derive(Clone, Debug)]
pub struct TestCase {
    /// Position in the unfiltered enumeration, 1-based. Addresses
    /// skip/resume and namespaces the per-agent working directories.
    pub seq: u64,
    /// Launch order for the three agents
    pub order: [NodeIndex; 3],
    /// Intended connectivity between the agents
    pub topology: Topology,
    /// Whether to pause after the 1st and 2nd launch
    pub delays: [bool; 2],
}

/// An enumerated combination before the connectivity filter
#[derive(Clone, Debug)]
pub struct Candidate {
    /// The case this combination would run as
    pub case: TestCase,
    /// Whether its topology passed the connectivity check
    pub connected: bool,
}

/// Enumerate every combination in fixed order: the six start orders, then
/// the 4×4×4 per-node template choices, then the four delay patterns.
///
/// The sequence counter increments once per combination, connected or not,
/// so 6 × 64 × 4 = 1536 candidates are always produced.
pub fn candidates() -> impl Iterator<Item = Candidate> {
    let templates = CONNECTION_TEMPLATES.len();
    START_ORDERS
        .into_iter()
        .flat_map(move |order| {
            (0..templates).flat_map(move |c0| {
                (0..templates).flat_map(move |c1| {
                    (0..templates).flat_map(move |c2| {
                        DELAY_PATTERNS
                            .into_iter()
                            .map(move |delays| (order, [c0, c1, c2], delays))
                    })
                })
            })
        })
        .enumerate()
        .map(|(i, (order, choices, delays))| {
            let topology = Topology::from_templates(choices);
            let connected = topology.is_connected();
            Candidate {
                case: TestCase {
                    seq: i as u64 + 1,
                    order,
                    topology,
                    delays,
                },
                connected,
            }
        })
}

/// The cases to actually execute: connected topologies only, resuming
/// after `skip` combinations in unfiltered enumeration order.
///
/// Skipped combinations are still counted, so the sequence numbers of the
/// remaining cases are identical with and without a skip.
pub fn cases(skip: u64) -> impl Iterator<Item = TestCase> {
    candidates()
        .filter(move |c| c.case.seq > skip && c.connected)
        .map(|c| c.case)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn six_distinct_start_orders() {
        for (i, a) in START_ORDERS.iter().enumerate() {
            let mut sorted = *a;
            sorted.sort_unstable();
            assert_eq!(sorted, [0, 1, 2], "not a permutation: {:?}", a);
            for b in &START_ORDERS[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }

    #[test]
    fn first_executed_case_is_the_first_connected_combination() {
        // Template choices (0,0,0) through (0,0,2) are all disconnected;
        // (0,0,3) gives node 2 the peers {0,1} and is the first connected
        // topology, so execution starts at sequence 13.
        let first = cases(0).next().unwrap();
        assert_eq!(first.seq, 13);
        assert_eq!(first.order, [0, 1, 2]);
        assert_eq!(first.topology.links, [vec![], vec![], vec![0, 1]]);
        assert_eq!(first.delays, [false, false]);
    }

    #[test]
    fn delay_patterns_cycle_fastest() {
        let first_four: Vec<[bool; 2]> = candidates()
            .take(4)
            .map(|c| c.case.delays)
            .collect();
        assert_eq!(first_four, DELAY_PATTERNS.to_vec());
    }
}
