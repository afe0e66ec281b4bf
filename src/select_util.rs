//! Shared `select!` idioms so every channel hand-off in the pipeline observes cancellation.

use crossbeam_channel::{select, Receiver, Sender};

use crate::abort::AbortSignal;
use crate::error::Error;

/// Receives from `rx`, but returns [`Error::Canceled`] as soon as `abort` fires instead of
/// blocking until the next item arrives. `Ok(None)` means `rx` is disconnected (the upstream
/// stage finished normally).
pub(crate) fn recv_cancelable<T>(rx: &Receiver<T>, abort: &AbortSignal) -> Result<Option<T>, Error> {
    let user_rx = abort.user_rx();
    let internal_rx = abort.internal_rx();
    select! {
        recv(rx) -> msg => Ok(msg.ok()),
        recv(user_rx) -> _ => Err(Error::Canceled),
        recv(internal_rx) -> _ => Err(Error::Canceled),
    }
}

/// Sends `item` on `tx`, but returns [`Error::Canceled`] as soon as `abort` fires or the
/// receiving end is gone, instead of blocking forever on a full or abandoned channel.
pub(crate) fn send_cancelable<T>(tx: &Sender<T>, item: T, abort: &AbortSignal) -> Result<(), Error> {
    let user_rx = abort.user_rx();
    let internal_rx = abort.internal_rx();
    select! {
        send(tx, item) -> res => res.map_err(|_| Error::Canceled),
        recv(user_rx) -> _ => Err(Error::Canceled),
        recv(internal_rx) -> _ => Err(Error::Canceled),
    }
}
