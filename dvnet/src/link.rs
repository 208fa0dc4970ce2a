use log::{trace, warn};

use crate::concepts::interface::LinkPort;
use crate::framework::Node;

/// A bidirectional link between two interfaces.
#[derive(Clone, Debug)]
pub struct Link {
    /// `(node name, interface index)` of each end, for logging
    pub ends: [(String, usize); 2],
    ports: [LinkPort; 2],
}

impl Link {
    pub fn new(a: (String, usize, LinkPort), b: (String, usize, LinkPort)) -> Self {
        Self {
            ends: [(a.0, a.1), (b.0, b.1)],
            ports: [a.2, b.2],
        }
    }

    /// Moves everything queued at either end to the other end.
    /// Returns `(moved, lost)`.
    fn transfer(&self) -> (usize, usize) {
        let mut moved = 0;
        let mut lost = 0;
        for (from, to) in [(0, 1), (1, 0)] {
            while let Some(frame) = self.ports[from].take() {
                let (ref name, itf) = self.ends[to];
                trace!(
                    "link: {}[{}] -> {name}[{itf}]: {:?}",
                    self.ends[from].0,
                    self.ends[from].1,
                    String::from_utf8_lossy(&frame)
                );
                match self.ports[to].deliver(frame) {
                    Ok(()) => moved += 1,
                    Err(err) => {
                        lost += 1;
                        warn!("link: frame for {name}[{itf}] lost: {err}");
                    }
                }
            }
        }
        (moved, lost)
    }

    pub fn in_flight(&self) -> usize {
        self.ports.iter().map(LinkPort::pending).sum()
    }
}

/// Ferries frames between node interfaces. No delay and no MTU handling: a frame taken
/// from one outbound queue is immediately offered to the inbound queue on the other side.
#[derive(Debug, Default)]
pub struct LinkLayer {
    links: Vec<Link>,
    lost: u64,
}

impl LinkLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_link(&mut self, link: Link) {
        self.links.push(link);
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Frames dropped because the receiving inbound queue was full.
    pub fn lost(&self) -> u64 {
        self.lost
    }

    /// Frames waiting in outbound queues.
    pub fn in_flight(&self) -> usize {
        self.links.iter().map(Link::in_flight).sum()
    }

    /// One pass over all links, returns the number of frames handled.
    pub fn transfer(&mut self) -> usize {
        let mut handled = 0;
        for link in &self.links {
            let (moved, lost) = link.transfer();
            self.lost += lost as u64;
            handled += moved + lost;
        }
        handled
    }
}

impl Node for LinkLayer {
    fn label(&self) -> String {
        "link-layer".to_string()
    }

    fn poll_round(&mut self) -> usize {
        self.transfer()
    }
}
