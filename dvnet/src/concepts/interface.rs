use crossbeam_channel::{bounded, unbounded, Receiver, Sender, TryRecvError, TrySendError};

use crate::feedback::QueueError;

/// Raw packet bytes as they sit in an interface queue.
pub type Frame = Vec<u8>;

fn queue(capacity: usize) -> (Sender<Frame>, Receiver<Frame>) {
    if capacity == 0 {
        unbounded()
    } else {
        bounded(capacity)
    }
}

/// A pair of queues through which one node talks to the neighbour at the far end of a link.
///
/// The owning node only ever reads `inbound` and writes `outbound`. The opposite ends are
/// handed to the link layer through [`Interface::port`].
#[derive(Debug)]
pub struct Interface {
    capacity: usize,
    in_tx: Sender<Frame>,
    in_rx: Receiver<Frame>,
    out_tx: Sender<Frame>,
    out_rx: Receiver<Frame>,
}

impl Interface {
    /// `capacity` applies to both queues, 0 means unbounded.
    pub fn new(capacity: usize) -> Self {
        let (in_tx, in_rx) = queue(capacity);
        let (out_tx, out_rx) = queue(capacity);
        Self {
            capacity,
            in_tx,
            in_rx,
            out_tx,
            out_rx,
        }
    }

    pub fn capacity(&self) -> Option<usize> {
        (self.capacity != 0).then_some(self.capacity)
    }

    /// Takes the next inbound frame without blocking.
    pub fn get(&self) -> Option<Frame> {
        match self.in_rx.try_recv() {
            Ok(frame) => Some(frame),
            // we hold a sender ourselves, so the queue can only be empty
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Enqueues an outbound frame.
    ///
    /// With `block` set this waits for room, otherwise a full queue returns [`QueueError::Full`]
    /// and the frame is gone. Unbounded interfaces never report full.
    pub fn put(&self, frame: Frame, block: bool) -> Result<(), QueueError> {
        if block {
            // the receiver lives in self, send can only fail if that is dropped
            self.out_tx.send(frame).map_err(|_| QueueError::Full)
        } else {
            self.out_tx.try_send(frame).map_err(|e| match e {
                TrySendError::Full(_) | TrySendError::Disconnected(_) => QueueError::Full,
            })
        }
    }

    /// Number of frames waiting to be picked up by the link layer.
    pub fn pending_out(&self) -> usize {
        self.out_rx.len()
    }

    pub fn pending_in(&self) -> usize {
        self.in_rx.len()
    }

    pub(crate) fn outbound_sender(&self) -> Sender<Frame> {
        self.out_tx.clone()
    }

    pub fn port(&self) -> LinkPort {
        LinkPort {
            inbound: self.in_tx.clone(),
            outbound: self.out_rx.clone(),
        }
    }
}

/// The link layer's view of an interface: it may write the inbound queue and read the
/// outbound queue, nothing else.
#[derive(Clone, Debug)]
pub struct LinkPort {
    inbound: Sender<Frame>,
    outbound: Receiver<Frame>,
}

impl LinkPort {
    /// Takes the next frame the node wants to send.
    pub fn take(&self) -> Option<Frame> {
        self.outbound.try_recv().ok()
    }

    /// Hands a frame to the node, never blocks.
    pub fn deliver(&self, frame: Frame) -> Result<(), QueueError> {
        self.inbound.try_send(frame).map_err(|_| QueueError::Full)
    }

    pub fn pending(&self) -> usize {
        self.outbound.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_is_non_blocking() {
        let itf = Interface::new(2);
        assert_eq!(itf.get(), None);
        itf.port().deliver(b"x".to_vec()).unwrap();
        assert_eq!(itf.get(), Some(b"x".to_vec()));
        assert_eq!(itf.get(), None);
    }

    #[test]
    fn full_queue_rejects_without_blocking() {
        let itf = Interface::new(3);
        let results: Vec<_> = (0..5u8).map(|i| itf.put(vec![i], false)).collect();
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 2);
        assert_eq!(results[4], Err(QueueError::Full));
        assert_eq!(itf.pending_out(), 3);

        let port = itf.port();
        assert_eq!(port.take(), Some(vec![0]));
        assert_eq!(port.take(), Some(vec![1]));
        assert_eq!(port.take(), Some(vec![2]));
        assert_eq!(port.take(), None);
    }

    #[test]
    fn unbounded_never_fills() {
        let itf = Interface::new(0);
        assert_eq!(itf.capacity(), None);
        for i in 0..10_000u32 {
            itf.put(i.to_be_bytes().to_vec(), false).unwrap();
        }
        assert_eq!(itf.pending_out(), 10_000);
    }

    #[test]
    fn blocking_put_waits_for_room() {
        let itf = Interface::new(1);
        let port = itf.port();
        itf.put(vec![1], false).unwrap();
        let drain = std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(20));
            port.take()
        });
        itf.put(vec![2], true).unwrap();
        assert_eq!(drain.join().unwrap(), Some(vec![1]));
        assert_eq!(itf.port().take(), Some(vec![2]));
    }

    #[test]
    fn inbound_is_bounded_too() {
        let itf = Interface::new(1);
        let port = itf.port();
        port.deliver(vec![1]).unwrap();
        assert_eq!(port.deliver(vec![2]), Err(QueueError::Full));
    }
}
