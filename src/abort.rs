//! Internal abort signalling: the user's [`CancellationToken`] OR'd with a pipeline-internal one.
//!
//! A real I/O failure in one pipeline stage (say, the run writer failing to create a temp file)
//! needs to stop every sibling stage just as promptly as a user cancellation does, without the
//! library reaching into the caller's own token to cancel it on their behalf. `AbortSignal` keeps
//! a second, library-owned token for that purpose and exposes a single combined view to the rest
//! of the pipeline.

use crossbeam_channel::Receiver;

use crate::cancel::CancellationToken;

#[derive(Clone)]
pub(crate) struct AbortSignal {
    user: CancellationToken,
    internal: CancellationToken,
}

impl AbortSignal {
    pub(crate) fn new(user: CancellationToken) -> Self {
        Self { user, internal: CancellationToken::new() }
    }

    /// Trips the library-internal half of the signal. Called by the stage that discovered the
    /// real error, so every other stage unwinds too.
    pub(crate) fn abort_internal(&self) {
        self.internal.cancel();
    }

    pub(crate) fn is_aborted(&self) -> bool {
        self.user.is_cancelled() || self.internal.is_cancelled()
    }

    pub(crate) fn user_rx(&self) -> Receiver<()> {
        self.user.subscribe()
    }

    pub(crate) fn internal_rx(&self) -> Receiver<()> {
        self.internal.subscribe()
    }
}
