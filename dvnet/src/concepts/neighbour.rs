use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::concepts::address::Address;
use crate::feedback::RouterError;
use crate::util::Cost;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum NodeKind {
    Host,
    Router,
}

/// A node at the far end of one of our links.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Neighbour {
    /// local interface index the neighbour is reached through
    pub interface: usize,
    /// direct one-hop cost
    pub cost: Cost,
    /// hosts never receive advertisements
    pub kind: NodeKind,
}

/// Direct costs to immediate neighbours. Fixed when the router is built.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct CostTable {
    neighbours: BTreeMap<Address, Neighbour>,
}

impl CostTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder style insert, used when wiring up topologies by hand.
    pub fn with(mut self, addr: Address, interface: usize, cost: Cost, kind: NodeKind) -> Self {
        self.insert(addr, interface, cost, kind);
        self
    }

    pub fn insert(&mut self, addr: Address, interface: usize, cost: Cost, kind: NodeKind) {
        self.neighbours.insert(
            addr,
            Neighbour {
                interface,
                cost,
                kind,
            },
        );
    }

    pub fn get(&self, addr: &Address) -> Option<&Neighbour> {
        self.neighbours.get(addr)
    }

    pub fn contains(&self, addr: &Address) -> bool {
        self.neighbours.contains_key(addr)
    }

    pub fn len(&self) -> usize {
        self.neighbours.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbours.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Neighbour)> {
        self.neighbours.iter()
    }

    /// Interfaces that lead to other routers, in index order.
    pub fn router_interfaces(&self) -> Vec<usize> {
        let mut interfaces: Vec<usize> = self
            .neighbours
            .values()
            .filter(|n| n.kind == NodeKind::Router)
            .map(|n| n.interface)
            .collect();
        interfaces.sort_unstable();
        interfaces
    }

    /// Checks that interface indices are exactly `0..len`, each used once.
    pub fn validate(&self, owner: &Address) -> Result<(), RouterError> {
        if self.neighbours.contains_key(owner) {
            return Err(RouterError::SelfNeighbour(owner.clone()));
        }
        let mut seen = vec![false; self.neighbours.len()];
        for (addr, neigh) in &self.neighbours {
            match seen.get_mut(neigh.interface) {
                Some(used) if !*used => *used = true,
                Some(_) => {
                    return Err(RouterError::InvalidCostTable {
                        reason: format!(
                            "interface {} is used twice (again by {addr})",
                            neigh.interface
                        ),
                    })
                }
                None => {
                    return Err(RouterError::InvalidCostTable {
                        reason: format!(
                            "interface {} of {addr} is out of range for {} neighbours",
                            neigh.interface,
                            self.neighbours.len()
                        ),
                    })
                }
            }
        }
        Ok(())
    }
}

impl FromIterator<(Address, Neighbour)> for CostTable {
    fn from_iter<I: IntoIterator<Item = (Address, Neighbour)>>(iter: I) -> Self {
        Self {
            neighbours: iter.into_iter().collect(),
        }
    }
}
