//! Caller-facing cancellation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crossbeam_channel::{bounded, Receiver, Sender};

/// A cooperative cancellation signal shared between the caller and a running sort, merge or diff.
///
/// Cloning a token shares the same underlying signal; calling [`cancel`] on any clone cancels all
/// of them. Every suspension point in the pipeline (channel send, channel receive, a merge step
/// about to block on a full output channel) is also selecting on this token, so cancellation is
/// observed promptly rather than only between chunks.
///
/// [`cancel`]: CancellationToken::cancel
#[derive(Clone)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
    sender: Arc<Mutex<Option<Sender<()>>>>,
    receiver: Receiver<()>,
}

impl CancellationToken {
    /// Creates a fresh, uncancelled token.
    pub fn new() -> Self {
        let (sender, receiver) = bounded(0);
        Self {
            flag: Arc::new(AtomicBool::new(false)),
            sender: Arc::new(Mutex::new(Some(sender))),
            receiver,
        }
    }

    /// Requests cancellation. Idempotent: cancelling an already-cancelled token is a no-op.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
        // Dropping the sender disconnects every clone of `receiver`, which wakes any thread
        // blocked in a `select!` on this token immediately.
        self.sender.lock().unwrap().take();
    }

    /// Returns whether [`cancel`](CancellationToken::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// A receiver that becomes ready (disconnected) exactly when this token is cancelled.
    /// Internal plumbing, not part of the public contract.
    pub(crate) fn subscribe(&self) -> Receiver<()> {
        self.receiver.clone()
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}
