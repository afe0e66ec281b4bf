//! The build phase's final stage: spills sorted chunks to run files.

use std::path::{Path, PathBuf};

use crossbeam_channel::Receiver;

use crate::abort::AbortSignal;
use crate::chunk::Chunk;
use crate::codec::Codec;
use crate::error::Error;
use crate::run::{RunWriter, SealedRun};
use crate::select_util::recv_cancelable;

/// Receives sorted chunks and seals each into its own run file, until `sorted_rx` disconnects
/// (every sort worker finished normally) or an error/cancellation cuts the phase short.
///
/// On any failure -- the writer's own I/O error, or cancellation observed while waiting -- every
/// run sealed so far by this call is deleted before the error is returned, matching the build
/// phase's "failure leaves no temporary files behind" contract.
pub(crate) fn run_writer_loop<E: Send + 'static>(
    sorted_rx: Receiver<Chunk<E>>,
    dir: PathBuf,
    codec: Codec<E>,
    abort: AbortSignal,
) -> Result<Vec<SealedRun>, Error> {
    let mut runs = Vec::new();
    loop {
        match recv_cancelable(&sorted_rx, &abort) {
            Ok(Some(chunk)) => {
                if chunk.is_empty() {
                    continue;
                }
                match write_run(&dir, &codec, chunk) {
                    Ok(run) => runs.push(run),
                    Err(e) => {
                        abort.abort_internal();
                        delete_all(&runs);
                        return Err(e);
                    }
                }
            }
            Ok(None) => return Ok(runs),
            Err(e) => {
                delete_all(&runs);
                return Err(e);
            }
        }
    }
}

fn write_run<E>(dir: &Path, codec: &Codec<E>, chunk: Chunk<E>) -> Result<SealedRun, Error> {
    let mut writer = RunWriter::create(dir, codec.clone())?;
    for item in chunk.into_vec() {
        if let Err(e) = writer.write(&item) {
            writer.abort();
            return Err(e);
        }
    }
    writer.close()
}

fn delete_all(runs: &[SealedRun]) {
    for run in runs {
        run.delete();
    }
}
