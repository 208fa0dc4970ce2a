use std::collections::{BTreeMap, BTreeSet, VecDeque};

use dvnet::network::{LinkSpec, Topology};
use dvnet::{Address, RouterConfig};

use crate::common::virtual_network::addr;

fn topology(
    hosts: &[&str],
    routers: &[&str],
    links: &[(&str, &str, u32)],
    config: RouterConfig,
) -> Topology {
    Topology {
        router: config,
        hosts: hosts.iter().map(|h| addr(h)).collect(),
        routers: routers.iter().map(|r| addr(r)).collect(),
        links: links
            .iter()
            .map(|(a, b, cost)| LinkSpec {
                a: addr(a),
                b: addr(b),
                cost: *cost,
            })
            .collect(),
    }
}

/// Two equal cost paths between A and D.
pub fn diamond() -> Topology {
    Topology::diamond()
}

pub fn diamond_with(config: RouterConfig) -> Topology {
    Topology {
        router: config,
        ..Topology::diamond()
    }
}

/// Routers only. Some direct links are more expensive than a detour, which the routers keep
/// anyway.
pub fn weighted() -> Topology {
    topology(
        &[],
        &["R1", "R2", "R3", "R4", "R5"],
        &[
            ("R1", "R2", 2),
            ("R1", "R3", 1),
            ("R2", "R3", 4),
            ("R2", "R4", 5),
            ("R3", "R4", 100),
            ("R3", "R5", 8),
            ("R4", "R5", 1),
        ],
        RouterConfig::default(),
    )
}

/// H1 - R1 - R2 - R3 - R4 - H2
pub fn line() -> Topology {
    topology(
        &["H1", "H2"],
        &["R1", "R2", "R3", "R4"],
        &[
            ("H1", "R1", 1),
            ("R1", "R2", 1),
            ("R2", "R3", 1),
            ("R3", "R4", 1),
            ("R4", "H2", 1),
        ],
        RouterConfig::default(),
    )
}

pub fn names(topology: &Topology) -> Vec<Address> {
    topology.hosts.iter().chain(&topology.routers).cloned().collect()
}

/// Longest shortest path, in hops, between any two nodes.
pub fn diameter(topology: &Topology) -> usize {
    let mut adjacent: BTreeMap<&Address, Vec<&Address>> = BTreeMap::new();
    for link in &topology.links {
        adjacent.entry(&link.a).or_default().push(&link.b);
        adjacent.entry(&link.b).or_default().push(&link.a);
    }
    let mut longest = 0;
    for start in adjacent.keys() {
        let mut seen = BTreeSet::from([*start]);
        let mut queue = VecDeque::from([(*start, 0)]);
        while let Some((node, hops)) = queue.pop_front() {
            longest = longest.max(hops);
            for next in &adjacent[node] {
                if seen.insert(*next) {
                    queue.push_back((*next, hops + 1));
                }
            }
        }
    }
    longest
}
