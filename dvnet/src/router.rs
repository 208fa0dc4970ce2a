use log::{debug, error, trace, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::concepts::address::Address;
use crate::concepts::advert::Advertisement;
use crate::concepts::interface::{Interface, LinkPort};
use crate::concepts::neighbour::CostTable;
use crate::concepts::packet::{NetworkPacket, PacketKind};
use crate::concepts::route::{GlobalView, Route, RoutingTable};
use crate::feedback::{RouterError, RoutingError};
use crate::framework::{Node, RouterConfig};
use crate::util::path_cost;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RouterStats {
    pub data_forwarded: u64,
    /// data packets addressed to the router itself
    pub data_delivered: u64,
    pub data_undeliverable: u64,
    /// lost to a full outbound queue
    pub data_dropped: u64,
    pub adverts_received: u64,
    pub adverts_sent: u64,
    /// lost to a full outbound queue
    pub adverts_dropped: u64,
    /// malformed or from a stranger
    pub adverts_rejected: u64,
    /// routing table entries learned or improved
    pub route_updates: u64,
    pub protocol_violations: u64,
}

/// A multi-interface router running distance-vector routing.
///
/// All state is owned by the router and only touched from the worker driving it, so none of
/// it is locked.
#[derive(Debug)]
pub struct Router {
    name: Address,
    /// direct neighbour costs, never modified after construction
    costs: CostTable,
    routes: RoutingTable,
    global: GlobalView,
    interfaces: Vec<Interface>,
    config: RouterConfig,
    /// set while a caller drives the router and the links from one thread, where a blocking
    /// put could never be drained
    step_driven: bool,
    stats: RouterStats,
}

impl Router {
    /// Creates one interface per neighbour in `costs`, and seeds the routing table with the
    /// direct costs.
    pub fn new(
        name: Address,
        costs: CostTable,
        config: RouterConfig,
    ) -> Result<Self, RouterError> {
        costs.validate(&name)?;
        let interfaces = (0..costs.len())
            .map(|_| Interface::new(config.queue_capacity))
            .collect();
        let router = Self {
            routes: RoutingTable::from_costs(&costs),
            name,
            costs,
            global: GlobalView::default(),
            interfaces,
            config,
            step_driven: false,
            stats: RouterStats::default(),
        };
        debug!("{}: initialized with {} interfaces", router.name, router.interfaces.len());
        router.log_table();
        Ok(router)
    }

    pub fn name(&self) -> &Address {
        &self.name
    }

    pub fn cost_table(&self) -> &CostTable {
        &self.costs
    }

    pub fn routing_table(&self) -> &RoutingTable {
        &self.routes
    }

    pub fn global_view(&self) -> &GlobalView {
        &self.global
    }

    pub fn stats(&self) -> &RouterStats {
        &self.stats
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn interface_count(&self) -> usize {
        self.interfaces.len()
    }

    pub fn interface(&self, index: usize) -> Option<&Interface> {
        self.interfaces.get(index)
    }

    pub fn port(&self, index: usize) -> Option<LinkPort> {
        self.interfaces.get(index).map(Interface::port)
    }

    pub(crate) fn set_step_driven(&mut self, step_driven: bool) {
        self.step_driven = step_driven;
    }

    /// One polling round: every interface is checked once, in index order.
    pub fn process_queues(&mut self) -> usize {
        let mut handled = 0;
        for i in 0..self.interfaces.len() {
            let Some(frame) = self.interfaces[i].get() else {
                continue;
            };
            handled += 1;
            trace!("{}: got {:?} on interface {i}", self.name, String::from_utf8_lossy(&frame));
            let packet = match NetworkPacket::decode(&frame) {
                Ok(packet) => packet,
                Err(err) => {
                    self.reject(i, err.into());
                    continue;
                }
            };
            // failures are logged and counted where they happen
            let _ = match packet.kind {
                PacketKind::Data => self.forward_packet(&packet, i).map(|_| ()),
                PacketKind::Control => self.update_routes(&packet, i).map(|_| ()),
            };
        }
        handled
    }

    /// Sends our routing table to every neighbouring router, used to bootstrap the protocol.
    pub fn announce(&mut self) {
        self.broadcast_routes();
    }

    /// Forwards a data packet according to the routing table.
    ///
    /// Returns the outgoing interface, or `None` if the packet was addressed to this router.
    pub fn forward_packet(
        &mut self,
        packet: &NetworkPacket,
        in_interface: usize,
    ) -> Result<Option<usize>, RoutingError> {
        if packet.destination == self.name {
            self.stats.data_delivered += 1;
            debug!(
                "{}: packet \"{packet}\" from interface {in_interface} is addressed to us",
                self.name
            );
            return Ok(None);
        }
        let Some(out) = self.routes.interface_to(&packet.destination) else {
            let err = RoutingError::Undeliverable(packet.destination.clone());
            return Err(self.reject(in_interface, err));
        };
        let queued = self.interfaces[out].put(packet.encode(), false);
        match queued {
            Ok(()) => {
                self.stats.data_forwarded += 1;
                debug!(
                    "{}: forwarding packet \"{packet}\" from interface {in_interface} to {out}",
                    self.name
                );
                Ok(Some(out))
            }
            Err(source) => Err(self.reject(
                in_interface,
                RoutingError::Dropped {
                    interface: out,
                    source,
                },
            )),
        }
    }

    /// Serializes the routing table into a control packet and queues it on `interface`.
    ///
    /// `blocking_adverts` is ignored while the router is stepped by [`crate::Network::step`],
    /// the advertisement is dropped instead.
    pub fn send_routes(&mut self, interface: usize) -> Result<(), RoutingError> {
        let skip = self.config.split_horizon.then_some(interface);
        let advert = self.routes.advertise(&self.name, skip);
        let packet = NetworkPacket::control(advert.to_payload());
        let Some(itf) = self.interfaces.get(interface) else {
            error!("{}: no interface {interface} to send routes on", self.name);
            return Err(RoutingError::NoInterface(interface));
        };
        let block = self.config.blocking_adverts && !self.step_driven;
        match itf.put(packet.encode(), block) {
            Ok(()) => {
                self.stats.adverts_sent += 1;
                debug!(
                    "{}: sending routing update \"{packet}\" from interface {interface}",
                    self.name
                );
                Ok(())
            }
            Err(source) => {
                self.stats.adverts_dropped += 1;
                warn!("{}: routing update lost on interface {interface}: {source}", self.name);
                Err(RoutingError::Dropped { interface, source })
            }
        }
    }

    /// Relaxes the routing table against a neighbour's advertisement.
    ///
    /// Returns whether any route was learned or improved, in which case the new table has
    /// already been sent to every neighbouring router.
    pub fn update_routes(
        &mut self,
        packet: &NetworkPacket,
        in_interface: usize,
    ) -> Result<bool, RoutingError> {
        self.stats.adverts_received += 1;
        let advert = match Advertisement::parse(&packet.payload) {
            Ok(advert) => advert,
            Err(err) => return Err(self.reject(in_interface, err.into())),
        };
        let Some(neigh) = self.costs.get(&advert.advertiser) else {
            let err = RoutingError::UnknownAdvertiser(advert.advertiser);
            return Err(self.reject(in_interface, err));
        };
        if neigh.interface != in_interface {
            warn!(
                "{}: advertisement from {} arrived on interface {in_interface}, expected {}",
                self.name, advert.advertiser, neigh.interface
            );
        }
        let link_cost = neigh.cost;

        let mut updated = false;
        for adv in &advert.routes {
            self.global.record(&advert.advertiser, &adv.destination, adv.cost);

            if adv.destination == self.name {
                // the neighbour knows about us, we are 0 away from ourselves
                let own = Route {
                    interface: in_interface,
                    cost: 0,
                };
                if self.routes.set(self.name.clone(), own) {
                    self.global.record(&self.name, &self.name, 0);
                }
                continue;
            }
            // direct costs always win over multi-hop advertisements
            if self.costs.contains(&adv.destination) {
                continue;
            }

            let candidate = path_cost(link_cost, adv.cost);
            match self.routes.cost_to(&adv.destination) {
                Some(current) if candidate >= current => {}
                current => {
                    debug!(
                        "{}: route to {} via interface {in_interface} costs {candidate} \
                         (was {current:?})",
                        self.name, adv.destination
                    );
                    self.routes.set(
                        adv.destination.clone(),
                        Route {
                            interface: in_interface,
                            cost: candidate,
                        },
                    );
                    self.global.record(&self.name, &adv.destination, candidate);
                    self.stats.route_updates += 1;
                    updated = true;
                }
            }
        }

        if updated {
            self.log_table();
            self.broadcast_routes();
        }
        Ok(updated)
    }

    fn broadcast_routes(&mut self) {
        for interface in self.costs.router_interfaces() {
            // drops are already logged and counted
            let _ = self.send_routes(interface);
        }
    }

    /// Logs and counts a per-packet failure, then hands the error back.
    fn reject(&mut self, interface: usize, err: RoutingError) -> RoutingError {
        match &err {
            RoutingError::Malformed(_) => {
                self.stats.protocol_violations += 1;
                error!(
                    "{}: protocol violation on interface {interface}, discarding packet: {err}",
                    self.name
                );
            }
            RoutingError::Advertisement(_) | RoutingError::UnknownAdvertiser(_) => {
                self.stats.adverts_rejected += 1;
                warn!("{}: dropping advertisement from interface {interface}: {err}", self.name);
            }
            RoutingError::Undeliverable(_) => {
                self.stats.data_undeliverable += 1;
                warn!("{}: packet from interface {interface} is undeliverable: {err}", self.name);
            }
            RoutingError::Dropped { .. } => {
                self.stats.data_dropped += 1;
                warn!("{}: packet from interface {interface} lost: {err}", self.name);
            }
            RoutingError::NoInterface(_) => {
                error!("{}: {err}", self.name);
            }
        }
        err
    }

    fn log_table(&self) {
        cfg_if::cfg_if! {
            if #[cfg(feature = "serde")] {
                debug!("{}: routing table {}", self.name, serde_json::json!(self.routes));
            } else {
                debug!("{}: routing table {:?}", self.name, self.routes);
            }
        }
    }
}

impl Node for Router {
    fn label(&self) -> String {
        format!("router-{}", self.name)
    }

    fn poll_round(&mut self) -> usize {
        self.process_queues()
    }
}
