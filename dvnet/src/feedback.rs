use thiserror::Error;

use crate::concepts::address::Address;

/// Rejected node names. Raised when an address is constructed, never while packets are in flight.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address is empty")]
    Empty,
    #[error("Address {name:?} is longer than {max} characters")]
    TooLong { name: String, max: usize },
    /// Only ASCII letters and digits survive the zero-padded wire field.
    #[error("Address {name:?} contains a character that is not ASCII alphanumeric")]
    InvalidCharacter { name: String },
    /// A leading '0' would be eaten by the padding on decode.
    #[error("Address {name:?} starts with '0'")]
    LeadingZero { name: String },
}

/// A packet that could not be decoded. Fatal for that packet only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PacketError {
    #[error("Packet of {len} bytes is shorter than the {header} byte header")]
    TooShort { len: usize, header: usize },
    #[error("Unknown packet kind discriminator {0:#04x}")]
    UnknownKind(u8),
    #[error("Malformed destination field: {0}")]
    BadAddress(#[from] AddressError),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueError {
    #[error("Queue is at capacity")]
    Full,
}

/// Problems with the text of a routing advertisement.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdvertError {
    #[error("Advertisement payload is not valid UTF-8")]
    NotUtf8,
    #[error("Advertisement is missing the '///' separator after the advertiser name")]
    MissingSeparator,
    #[error("Advertisement route list must end with '//'")]
    Unterminated,
    #[error("Route entry {entry:?} does not have exactly three fields")]
    FieldCount { entry: String },
    #[error("Route entry {entry:?} has a non-numeric {field}")]
    BadNumber { entry: String, field: &'static str },
    #[error("Bad address in advertisement: {0}")]
    BadAddress(#[from] AddressError),
}

/// Errors raised while building a router.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouterError {
    /// Interface indices must be exactly 0..n, one per neighbour.
    #[error("Invalid cost table: {reason}")]
    InvalidCostTable { reason: String },
    #[error("Router {0} lists itself as a neighbour")]
    SelfNeighbour(Address),
}

/// Everything that can go wrong with a single packet inside a router round.
/// These are logged and counted, they never stop the worker.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    #[error(transparent)]
    Malformed(#[from] PacketError),
    #[error("Malformed advertisement: {0}")]
    Advertisement(#[from] AdvertError),
    /// There is no link cost to add for an advertiser we are not adjacent to.
    #[error("Advertisement from {0}, which is not a neighbour")]
    UnknownAdvertiser(Address),
    #[error("No route to {0}")]
    Undeliverable(Address),
    #[error("No interface {0}")]
    NoInterface(usize),
    #[error("Interface {interface} dropped a packet: {source}")]
    Dropped {
        interface: usize,
        #[source]
        source: QueueError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TopologyError {
    #[error("Node {0} is declared more than once")]
    DuplicateNode(Address),
    #[error("Link endpoint {0} is not a declared node")]
    UnknownNode(Address),
    #[error("Link from {0} to itself")]
    SelfLink(Address),
    #[error("Nodes {0} and {1} are linked more than once")]
    DuplicateLink(Address, Address),
    /// Hosts own exactly one interface.
    #[error("Host {host} has {links} links, expected exactly one")]
    HostLinks { host: Address, links: usize },
    #[error(transparent)]
    Router(#[from] RouterError),
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Network did not go quiet within {rounds} rounds")]
    NotConverged { rounds: usize },
    #[error("No host named {0}")]
    UnknownHost(Address),
    #[error("Failed to spawn worker thread")]
    Spawn(#[from] std::io::Error),
    #[error("Worker {0} panicked")]
    WorkerPanicked(String),
}
