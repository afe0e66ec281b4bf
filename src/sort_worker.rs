//! A pool of worker threads that sorts chunks in place.

use crossbeam_channel::{Receiver, Sender};

use crate::abort::AbortSignal;
use crate::chunk::Chunk;
use crate::codec::LessFn;
use crate::select_util::{recv_cancelable, send_cancelable};

/// Receives unsorted chunks, sorts each with `less`, forwards it. Exits when `unsorted_rx`
/// disconnects or `abort` fires, closing `sorted_tx` by dropping it on return.
pub(crate) fn run<E: Send + 'static>(
    unsorted_rx: Receiver<Chunk<E>>,
    sorted_tx: Sender<Chunk<E>>,
    less: LessFn<E>,
    abort: AbortSignal,
) {
    loop {
        match recv_cancelable(&unsorted_rx, &abort) {
            Ok(Some(mut chunk)) => {
                chunk.sort(&less);
                if send_cancelable(&sorted_tx, chunk, &abort).is_err() {
                    return;
                }
            }
            Ok(None) => return,
            Err(_) => return,
        }
    }
}
