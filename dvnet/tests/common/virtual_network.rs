use std::collections::BTreeMap;

use dvnet::concepts::route::Route;
use dvnet::network::Topology;
use dvnet::util::Cost;
use dvnet::{Address, Network, NetworkPacket, Router};

pub fn addr(name: &str) -> Address {
    Address::new(name).unwrap_or_else(|e| panic!("bad test address {name}: {e}"))
}

/// Builds the network, kicks off the protocol and waits for it to settle.
pub fn converged(topology: &Topology) -> Network {
    let mut network = Network::build(topology).expect("valid topology");
    network.announce();
    network.run_until_quiet(100).expect("network converges");
    network
}

pub fn router<'a>(network: &'a Network, name: &str) -> &'a Router {
    network
        .router(&addr(name))
        .unwrap_or_else(|| panic!("No router {name} found"))
}

pub fn get_cost(network: &Network, cur: &str, dest: &str) -> Cost {
    router(network, cur)
        .routing_table()
        .cost_to(&addr(dest))
        .unwrap_or_else(|| panic!("No route from {cur} to {dest}"))
}

pub fn get_interface(network: &Network, cur: &str, dest: &str) -> usize {
    router(network, cur)
        .routing_table()
        .interface_to(&addr(dest))
        .unwrap_or_else(|| panic!("No route from {cur} to {dest}"))
}

/// Interface on `cur` that leads to the neighbour `next`.
pub fn interface_towards(network: &Network, cur: &str, next: &str) -> usize {
    router(network, cur)
        .cost_table()
        .get(&addr(next))
        .unwrap_or_else(|| panic!("{next} is not a neighbour of {cur}"))
        .interface
}

/// Every router's table, minus its own entry, whose interface follows whichever neighbour
/// mentioned it last.
pub fn snapshot(network: &Network) -> BTreeMap<Address, BTreeMap<Address, Route>> {
    network
        .routers()
        .iter()
        .map(|r| {
            let routes = r
                .routing_table()
                .iter()
                .filter(|(d, _)| *d != r.name())
                .map(|(d, route)| (d.clone(), *route))
                .collect();
            (r.name().clone(), routes)
        })
        .collect()
}

/// The control packet `from` would send right now.
pub fn advertisement_of(network: &Network, from: &str) -> NetworkPacket {
    let router = router(network, from);
    let advert = router.routing_table().advertise(router.name(), None);
    NetworkPacket::control(advert.to_payload())
}

pub fn received(network: &Network, host: &str) -> Vec<String> {
    network
        .host(&addr(host))
        .unwrap_or_else(|| panic!("No host {host} found"))
        .received()
        .iter()
        .map(|p| String::from_utf8_lossy(p).into_owned())
        .collect()
}
