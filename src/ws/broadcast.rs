use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

const CHANNEL_CAPACITY: usize = 64;

/// Central fan-out for enriched samples.  Clone-able via internal Arc.
///
/// Every connection task holds a `broadcast::Receiver`; publishing sends the
/// already-serialized payload to each live receiver.  A receiver dropped
/// mid-broadcast (socket closed) only affects that connection — the channel
/// simply stops counting it.
#[derive(Clone)]
pub struct FeedHub {
    tx: broadcast::Sender<String>,
    viewers: Arc<AtomicUsize>,
}

/// Decrements the viewer count when the connection task ends, however it
/// ends.
pub struct ViewerGuard {
    viewers: Arc<AtomicUsize>,
}

impl Drop for ViewerGuard {
    fn drop(&mut self) {
        self.viewers.fetch_sub(1, Ordering::Relaxed);
    }
}

impl FeedHub {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            tx,
            viewers: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Subscribe to the feed.  Call once per accepted connection.
    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    /// Register a viewer for lifecycle accounting.
    pub fn register(&self) -> ViewerGuard {
        self.viewers.fetch_add(1, Ordering::Relaxed);
        ViewerGuard {
            viewers: Arc::clone(&self.viewers),
        }
    }

    /// Publish one serialized payload to every subscriber, returning the
    /// number of receivers it reached.  Returns 0 when nobody is connected.
    pub fn publish(&self, message: String) -> usize {
        self.tx.send(message).unwrap_or(0)
    }

    pub fn viewer_count(&self) -> usize {
        self.viewers.load(Ordering::Relaxed)
    }
}

impl Default for FeedHub {
    fn default() -> Self {
        Self::new()
    }
}
