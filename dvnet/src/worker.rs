use std::thread::{self, JoinHandle};

use educe::Educe;
use log::info;
use tokio_util::sync::CancellationToken;

use crate::feedback::NetworkError;
use crate::framework::Node;

/// A node running on its own thread.
///
/// The loop polls the node round after round and checks the token once per round, so a
/// cancelled worker always finishes the round it is in before exiting.
#[derive(Educe)]
#[educe(Debug(bound()))]
pub struct Worker<N: Node + 'static> {
    label: String,
    token: CancellationToken,
    #[educe(Debug(ignore))]
    handle: JoinHandle<N>,
}

impl<N: Node + 'static> Worker<N> {
    pub fn spawn(mut node: N, token: CancellationToken) -> Result<Self, NetworkError> {
        let label = node.label();
        let thread_token = token.clone();
        let handle = thread::Builder::new().name(label.clone()).spawn(move || {
            info!("{}: Starting", node.label());
            while !thread_token.is_cancelled() {
                if node.poll_round() == 0 {
                    // nothing queued anywhere, let the other workers run
                    thread::yield_now();
                }
            }
            info!("{}: Ending", node.label());
            node
        })?;
        Ok(Self { label, token, handle })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Cancels the worker (and everything sharing its token) and waits for it to hand the
    /// node back.
    pub fn stop(self) -> Result<N, NetworkError> {
        self.token.cancel();
        self.join()
    }

    /// Waits for the worker to exit on its own, after the token was cancelled elsewhere.
    pub fn join(self) -> Result<N, NetworkError> {
        self.handle
            .join()
            .map_err(|_| NetworkError::WorkerPanicked(self.label))
    }
}
