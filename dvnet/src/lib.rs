//! A packet network of hosts and distance-vector routers that talk only through bounded
//! interface queues.

pub mod concepts;
pub mod feedback;
pub mod framework;
pub mod host;
pub mod link;
pub mod network;
pub mod router;
pub mod util;
pub mod worker;

pub use concepts::address::Address;
pub use concepts::packet::{NetworkPacket, PacketKind};
pub use framework::{Node, RouterConfig};
pub use host::Host;
pub use network::{Network, RunningNetwork, Topology};
pub use router::Router;
