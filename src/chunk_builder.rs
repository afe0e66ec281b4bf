//! Drains the caller's input sequence into fixed-size chunks for the sort workers.

use crossbeam_channel::{Receiver, Sender};

use crate::abort::AbortSignal;
use crate::chunk::Chunk;
use crate::select_util::{recv_cancelable, send_cancelable};

/// Runs until `input_rx` disconnects (normal end of input) or `abort` fires. Emits every full
/// chunk as soon as it fills, plus one final partial chunk on normal completion if anything is
/// left over. Closes `unsorted_tx` by dropping it on return.
pub(crate) fn run<E: Send + 'static>(
    input_rx: Receiver<E>,
    unsorted_tx: Sender<Chunk<E>>,
    chunk_size: usize,
    abort: AbortSignal,
) {
    let mut chunk = Chunk::new(chunk_size);
    loop {
        match recv_cancelable(&input_rx, &abort) {
            Ok(Some(item)) => {
                if let Err(item) = chunk.push(item) {
                    let full = std::mem::replace(&mut chunk, Chunk::new(chunk_size));
                    if send_cancelable(&unsorted_tx, full, &abort).is_err() {
                        return;
                    }
                    // chunk_size is validated to be at least 1, so the fresh chunk has room.
                    let _ = chunk.push(item);
                }
            }
            Ok(None) => break,
            Err(_) => return,
        }
    }
    if !chunk.is_empty() {
        let _ = send_cancelable(&unsorted_tx, chunk, &abort);
    }
    log::debug!("chunk builder finished");
}
