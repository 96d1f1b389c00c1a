//! Process-wide network runtime
//!
//! Every socket lives on a single current-thread tokio runtime that is
//! created once by the process entry point and shared by reference count.
//! Nothing runs in the background: the runtime only makes progress while a
//! caller is blocked inside [`NetRuntime::block_on`].

use std::future::Future;
use std::io;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::{Builder, Runtime};

/// How long teardown waits for in-flight I/O to be dropped
const SHUTDOWN_GRACE: Duration = Duration::from_millis(100);

/// Owner of the sockets subsystem
pub struct NetRuntime {
    runtime: Runtime,
}

impl NetRuntime {
    /// Initialize the sockets subsystem.
    ///
    /// Must happen before any connection is created. The returned handle is
    /// cloned into each [`P2pConnection`](super::P2pConnection).
    pub fn init() -> io::Result<Arc<Self>> {
        let runtime = Builder::new_current_thread().enable_all().build()?;
        tracing::debug!("Network runtime initialized");
        Ok(Arc::new(Self { runtime }))
    }

    /// Tear down the sockets subsystem.
    ///
    /// Only the last reference actually shuts the runtime down; earlier
    /// calls just release the caller's share.
    pub fn shutdown(this: Arc<Self>) {
        match Arc::try_unwrap(this) {
            Ok(net) => {
                net.runtime.shutdown_timeout(SHUTDOWN_GRACE);
                tracing::debug!("Network runtime shut down");
            }
            Err(shared) => {
                tracing::warn!(
                    "Network runtime still referenced by {} handle(s); deferring shutdown",
                    Arc::strong_count(&shared) - 1
                );
            }
        }
    }

    /// Run a socket operation to completion on the calling thread
    pub(crate) fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_and_shutdown() {
        let net = NetRuntime::init().unwrap();
        assert_eq!(net.block_on(async { 7 }), 7);
        NetRuntime::shutdown(net);
    }

    #[test]
    fn test_shutdown_with_outstanding_reference() {
        let net = NetRuntime::init().unwrap();
        let held = Arc::clone(&net);
        NetRuntime::shutdown(net);

        // The remaining handle keeps the runtime usable
        assert_eq!(held.block_on(async { 1 + 1 }), 2);
        assert_eq!(Arc::strong_count(&held), 1);
        NetRuntime::shutdown(held);
    }
}
