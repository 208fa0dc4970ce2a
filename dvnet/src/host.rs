use crossbeam_channel::Sender;
use log::{debug, info, warn};

use crate::concepts::address::Address;
use crate::concepts::interface::{Frame, Interface, LinkPort};
use crate::concepts::packet::{NetworkPacket, PacketKind};
use crate::framework::Node;

/// An end host with a single, unbounded interface. Originates and terminates data packets.
#[derive(Debug)]
pub struct Host {
    address: Address,
    interface: Interface,
    received: Vec<Vec<u8>>,
    sent: u64,
}

impl Host {
    pub fn new(address: Address) -> Self {
        Self {
            address,
            interface: Interface::new(0),
            received: Vec::new(),
            sent: 0,
        }
    }

    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn port(&self) -> LinkPort {
        self.interface.port()
    }

    /// Creates a data packet and queues it for transmission. Always succeeds.
    pub fn send(&mut self, dst: Address, payload: impl Into<Vec<u8>>) {
        let packet = NetworkPacket::data(dst, payload);
        info!("{}: sending packet \"{packet}\"", self.address);
        // unbounded, a non-blocking put cannot fail
        let _ = self.interface.put(packet.encode(), false);
        self.sent += 1;
    }

    /// A cloneable sender for other threads, usable while the host runs inside a worker.
    pub fn handle(&self) -> HostHandle {
        HostHandle {
            address: self.address.clone(),
            outbound: self.interface.outbound_sender(),
        }
    }

    /// Polls the interface once. Returns the payload of a received data packet, if any.
    pub fn receive(&mut self) -> Option<Vec<u8>> {
        let frame = self.interface.get()?;
        match NetworkPacket::decode(&frame) {
            Ok(packet) if packet.kind == PacketKind::Data => {
                info!("{}: received packet \"{packet}\"", self.address);
                self.received.push(packet.payload.clone());
                Some(packet.payload)
            }
            Ok(packet) => {
                debug!("{}: ignoring control packet \"{packet}\"", self.address);
                None
            }
            Err(err) => {
                warn!("{}: discarding malformed packet: {err}", self.address);
                None
            }
        }
    }

    /// Every payload received so far, oldest first.
    pub fn received(&self) -> &[Vec<u8>] {
        &self.received
    }

    pub fn sent(&self) -> u64 {
        self.sent
    }
}

impl Node for Host {
    fn label(&self) -> String {
        format!("host-{}", self.address)
    }

    fn poll_round(&mut self) -> usize {
        let waiting = self.interface.pending_in();
        self.receive();
        waiting.min(1)
    }
}

/// Sends data from a host without owning it.
#[derive(Clone, Debug)]
pub struct HostHandle {
    address: Address,
    outbound: Sender<Frame>,
}

impl HostHandle {
    pub fn address(&self) -> &Address {
        &self.address
    }

    pub fn send(&self, dst: Address, payload: impl Into<Vec<u8>>) {
        let packet = NetworkPacket::data(dst, payload);
        info!("{}: sending packet \"{packet}\"", self.address);
        // the host's outbound queue is unbounded
        let _ = self.outbound.try_send(packet.encode());
    }
}
