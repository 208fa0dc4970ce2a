use std::collections::BTreeMap;

use log::{debug, info, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::concepts::address::Address;
use crate::concepts::interface::LinkPort;
use crate::concepts::neighbour::{CostTable, NodeKind};
use crate::feedback::{NetworkError, TopologyError};
use crate::framework::{Node, RouterConfig};
use crate::host::{Host, HostHandle};
use crate::link::{Link, LinkLayer};
use crate::router::Router;
use crate::util::Cost;
use crate::worker::Worker;

#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkSpec {
    pub a: Address,
    pub b: Address,
    /// cost seen by routers at either end
    #[cfg_attr(feature = "serde", serde(default = "default_cost"))]
    pub cost: Cost,
}

#[cfg(feature = "serde")]
fn default_cost() -> Cost {
    1
}

/// Which nodes exist and how they are wired. Interfaces are numbered per node in the order
/// its links appear.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Topology {
    #[cfg_attr(feature = "serde", serde(default))]
    pub router: RouterConfig,
    pub hosts: Vec<Address>,
    pub routers: Vec<Address>,
    pub links: Vec<LinkSpec>,
}

impl Topology {
    /// H1 and H2 on router A, A connected to B and C, both of which connect to D, which
    /// serves H3. All links cost 1.
    pub fn diamond() -> Self {
        let addr = |name: &str| Address::new(name).expect("static name is valid");
        let link = |a: &str, b: &str| LinkSpec {
            a: addr(a),
            b: addr(b),
            cost: 1,
        };
        Self {
            router: RouterConfig::default(),
            hosts: vec![addr("H1"), addr("H2"), addr("H3")],
            routers: vec![addr("A"), addr("B"), addr("C"), addr("D")],
            links: vec![
                link("H1", "A"),
                link("H2", "A"),
                link("A", "B"),
                link("A", "C"),
                link("B", "D"),
                link("C", "D"),
                link("D", "H3"),
            ],
        }
    }

    /// Derives every router's cost table from the link list.
    pub fn cost_tables(&self) -> Result<BTreeMap<Address, CostTable>, TopologyError> {
        let mut kinds = BTreeMap::new();
        for (addr, kind) in self
            .hosts
            .iter()
            .map(|h| (h, NodeKind::Host))
            .chain(self.routers.iter().map(|r| (r, NodeKind::Router)))
        {
            if kinds.insert(addr.clone(), kind).is_some() {
                return Err(TopologyError::DuplicateNode(addr.clone()));
            }
        }

        let mut next_interface: BTreeMap<&Address, usize> = BTreeMap::new();
        let mut tables: BTreeMap<Address, CostTable> = self
            .routers
            .iter()
            .map(|r| (r.clone(), CostTable::new()))
            .collect();
        for LinkSpec { a, b, cost } in &self.links {
            let kind_a = *kinds.get(a).ok_or_else(|| TopologyError::UnknownNode(a.clone()))?;
            let kind_b = *kinds.get(b).ok_or_else(|| TopologyError::UnknownNode(b.clone()))?;
            if a == b {
                return Err(TopologyError::SelfLink(a.clone()));
            }
            for (this, other, other_kind) in [(a, b, kind_b), (b, a, kind_a)] {
                let itf = next_interface.entry(this).or_default();
                if let Some(table) = tables.get_mut(this) {
                    if table.contains(other) {
                        return Err(TopologyError::DuplicateLink(this.clone(), other.clone()));
                    }
                    table.insert(other.clone(), *itf, *cost, other_kind);
                }
                *itf += 1;
            }
        }

        for host in &self.hosts {
            let links = next_interface.get(host).copied().unwrap_or(0);
            if links != 1 {
                return Err(TopologyError::HostLinks {
                    host: host.clone(),
                    links,
                });
            }
        }
        Ok(tables)
    }
}

/// Every node of a topology plus the link layer between them, driven either step by step
/// from the calling thread or by one worker per node through [`Network::spawn`].
#[derive(Debug)]
pub struct Network {
    hosts: Vec<Host>,
    routers: Vec<Router>,
    links: LinkLayer,
}

impl Network {
    pub fn build(topology: &Topology) -> Result<Self, TopologyError> {
        let mut tables = topology.cost_tables()?;
        let hosts: Vec<Host> = topology.hosts.iter().cloned().map(Host::new).collect();
        let routers = topology
            .routers
            .iter()
            .map(|name| {
                let costs = tables.remove(name).unwrap_or_default();
                let mut router = Router::new(name.clone(), costs, topology.router)?;
                router.set_step_driven(true);
                Ok(router)
            })
            .collect::<Result<Vec<_>, TopologyError>>()?;
        if topology.router.blocking_adverts {
            warn!("Blocking advertisements only take effect once the network is spawned");
        }

        let mut network = Self {
            hosts,
            routers,
            links: LinkLayer::new(),
        };
        let mut next_interface: BTreeMap<Address, usize> = BTreeMap::new();
        for spec in &topology.links {
            let mut ends = Vec::with_capacity(2);
            for addr in [&spec.a, &spec.b] {
                let itf = next_interface.entry(addr.clone()).or_default();
                let port = network
                    .port(addr, *itf)
                    .ok_or_else(|| TopologyError::UnknownNode(addr.clone()))?;
                ends.push((addr.to_string(), *itf, port));
                *itf += 1;
            }
            let b = ends.pop();
            let a = ends.pop();
            if let (Some(a), Some(b)) = (a, b) {
                network.links.add_link(Link::new(a, b));
            }
        }
        info!(
            "Built network with {} hosts, {} routers and {} links",
            network.hosts.len(),
            network.routers.len(),
            network.links.links().len()
        );
        Ok(network)
    }

    fn port(&self, addr: &Address, interface: usize) -> Option<LinkPort> {
        if let Some(host) = self.host(addr) {
            return (interface == 0).then(|| host.port());
        }
        self.router(addr)?.port(interface)
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    pub fn routers(&self) -> &[Router] {
        &self.routers
    }

    pub fn link_layer(&self) -> &LinkLayer {
        &self.links
    }

    pub fn host(&self, addr: &Address) -> Option<&Host> {
        self.hosts.iter().find(|h| h.address() == addr)
    }

    pub fn host_mut(&mut self, addr: &Address) -> Option<&mut Host> {
        self.hosts.iter_mut().find(|h| h.address() == addr)
    }

    pub fn router(&self, addr: &Address) -> Option<&Router> {
        self.routers.iter().find(|r| r.name() == addr)
    }

    pub fn router_mut(&mut self, addr: &Address) -> Option<&mut Router> {
        self.routers.iter_mut().find(|r| r.name() == addr)
    }

    pub fn send(
        &mut self,
        from: &Address,
        to: Address,
        payload: impl Into<Vec<u8>>,
    ) -> Result<(), NetworkError> {
        let host = self
            .host_mut(from)
            .ok_or_else(|| NetworkError::UnknownHost(from.clone()))?;
        host.send(to, payload);
        Ok(())
    }

    /// Has every router send its table to its router neighbours.
    pub fn announce(&mut self) {
        for router in &mut self.routers {
            router.announce();
        }
    }

    /// One synchronous round: the link layer moves everything that is queued, then every
    /// router and host polls its interfaces once, in declaration order.
    pub fn step(&mut self) -> usize {
        let mut handled = self.links.transfer();
        for router in &mut self.routers {
            handled += router.process_queues();
        }
        for host in &mut self.hosts {
            handled += host.poll_round();
        }
        handled
    }

    /// Steps until a round moves and handles nothing. Returns the number of busy rounds.
    pub fn run_until_quiet(&mut self, max_rounds: usize) -> Result<usize, NetworkError> {
        for round in 0..max_rounds {
            if self.step() == 0 {
                debug!("Network quiet after {round} rounds");
                return Ok(round);
            }
        }
        Err(NetworkError::NotConverged { rounds: max_rounds })
    }

    /// Runs every node on its own worker thread until [`RunningNetwork::stop`].
    pub fn spawn(self) -> Result<RunningNetwork, NetworkError> {
        let token = CancellationToken::new();
        let handles = self
            .hosts
            .iter()
            .map(|h| (h.address().clone(), h.handle()))
            .collect();

        let spawned = (|| {
            let hosts = self
                .hosts
                .into_iter()
                .map(|h| Worker::spawn(h, token.clone()))
                .collect::<Result<Vec<_>, _>>()?;
            let routers = self
                .routers
                .into_iter()
                .map(|mut r| {
                    // a link worker drains the queues now, blocking is safe
                    r.set_step_driven(false);
                    Worker::spawn(r, token.clone())
                })
                .collect::<Result<Vec<_>, _>>()?;
            let links = Worker::spawn(self.links, token.clone())?;
            Ok::<_, NetworkError>((hosts, routers, links))
        })();
        let (hosts, routers, links) = match spawned {
            Ok(workers) => workers,
            Err(err) => {
                // whatever did start must not outlive us
                token.cancel();
                return Err(err);
            }
        };

        Ok(RunningNetwork {
            token,
            handles,
            hosts,
            routers,
            links,
        })
    }
}

/// A network whose nodes are running on worker threads.
#[derive(Debug)]
pub struct RunningNetwork {
    token: CancellationToken,
    handles: BTreeMap<Address, HostHandle>,
    hosts: Vec<Worker<Host>>,
    routers: Vec<Worker<Router>>,
    links: Worker<LinkLayer>,
}

impl RunningNetwork {
    pub fn host_handle(&self, addr: &Address) -> Option<HostHandle> {
        self.handles.get(addr).cloned()
    }

    pub fn send(
        &self,
        from: &Address,
        to: Address,
        payload: impl Into<Vec<u8>>,
    ) -> Result<(), NetworkError> {
        self.handles
            .get(from)
            .ok_or_else(|| NetworkError::UnknownHost(from.clone()))?
            .send(to, payload);
        Ok(())
    }

    /// Cancelling this token stops every worker.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Signals every worker, waits for all of them and hands the nodes back.
    pub fn stop(self) -> Result<Network, NetworkError> {
        self.token.cancel();
        let hosts = self
            .hosts
            .into_iter()
            .map(Worker::join)
            .collect::<Result<Vec<_>, _>>()?;
        let routers = self
            .routers
            .into_iter()
            .map(|w| {
                let mut router = w.join()?;
                router.set_step_driven(true);
                Ok(router)
            })
            .collect::<Result<Vec<_>, NetworkError>>()?;
        let links = self.links.join()?;
        Ok(Network { hosts, routers, links })
    }
}
