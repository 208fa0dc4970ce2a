use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::concepts::address::Address;
use crate::concepts::advert::{AdvertisedRoute, Advertisement};
use crate::concepts::neighbour::CostTable;
use crate::util::Cost;

/// The best known way to reach one destination.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Route {
    /// outgoing interface
    pub interface: usize,
    pub cost: Cost,
}

/// destination -> best (interface, cost). Exactly one route is kept per destination.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct RoutingTable {
    routes: BTreeMap<Address, Route>,
}

impl RoutingTable {
    /// Everything starts out reachable only through direct neighbours.
    pub fn from_costs(costs: &CostTable) -> Self {
        Self {
            routes: costs
                .iter()
                .map(|(addr, neigh)| {
                    (
                        addr.clone(),
                        Route {
                            interface: neigh.interface,
                            cost: neigh.cost,
                        },
                    )
                })
                .collect(),
        }
    }

    pub fn get(&self, dest: &Address) -> Option<&Route> {
        self.routes.get(dest)
    }

    pub fn contains(&self, dest: &Address) -> bool {
        self.routes.contains_key(dest)
    }

    pub fn cost_to(&self, dest: &Address) -> Option<Cost> {
        self.routes.get(dest).map(|r| r.cost)
    }

    pub fn interface_to(&self, dest: &Address) -> Option<usize> {
        self.routes.get(dest).map(|r| r.interface)
    }

    /// Replaces the route and reports whether anything changed.
    pub fn set(&mut self, dest: Address, route: Route) -> bool {
        self.routes.insert(dest, route) != Some(route)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Address, &Route)> {
        self.routes.iter()
    }

    /// Builds the advertisement for this table. With `skip_interface` set, routes leaving
    /// through that interface are left out (split horizon).
    pub fn advertise(&self, advertiser: &Address, skip_interface: Option<usize>) -> Advertisement {
        Advertisement {
            advertiser: advertiser.clone(),
            routes: self
                .routes
                .iter()
                .filter(|(_, route)| Some(route.interface) != skip_interface)
                .map(|(dest, route)| AdvertisedRoute {
                    destination: dest.clone(),
                    interface: route.interface,
                    cost: route.cost,
                })
                .collect(),
        }
    }
}

/// advertiser -> destination -> cost, for every advertisement ever seen.
/// Only kept for inspection, forwarding never looks at it.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(transparent))]
pub struct GlobalView {
    rows: BTreeMap<Address, BTreeMap<Address, Cost>>,
}

impl GlobalView {
    pub fn record(&mut self, advertiser: &Address, dest: &Address, cost: Cost) {
        self.rows
            .entry(advertiser.clone())
            .or_default()
            .insert(dest.clone(), cost);
    }

    pub fn get(&self, advertiser: &Address, dest: &Address) -> Option<Cost> {
        self.rows.get(advertiser)?.get(dest).copied()
    }

    pub fn row(&self, advertiser: &Address) -> Option<&BTreeMap<Address, Cost>> {
        self.rows.get(advertiser)
    }

    pub fn advertisers(&self) -> impl Iterator<Item = &Address> {
        self.rows.keys()
    }
}
