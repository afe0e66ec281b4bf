//! The top-level orchestrator: wires the build phase (chunk, sort, spill) to the merge phase
//! (hierarchical reduce, k-way merge) behind a small two-method API.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::abort::AbortSignal;
use crate::build;
use crate::cancel::CancellationToken;
use crate::chunk_builder;
use crate::codec::{Codec, LessFn};
use crate::config::Config;
use crate::error::Error;
use crate::merger;
use crate::resource::RlimitGuard;
use crate::sort_worker;

struct Pending<E> {
    input_rx: Receiver<E>,
    output_tx: Sender<E>,
    error_tx: Sender<Error>,
}

enum State<E> {
    Ready(Pending<E>),
    Started,
}

/// A sort in progress: chunks the input sequence, sorts each chunk with `less`, spills sorted
/// chunks to temporary run files, then merges those runs back into a single ordered stream.
///
/// Construction ([`new`](Sorter::new)) validates the configuration and wires up the channels but
/// does no I/O and starts no threads. [`sort`](Sorter::sort) is one-shot: a second call on the
/// same handle returns [`Error::UsageError`] without touching the pipeline.
pub struct Sorter<E> {
    started: Arc<AtomicBool>,
    state: Mutex<State<E>>,
    config: Config,
    codec: Codec<E>,
    less: LessFn<E>,
}

impl<E: Send + 'static> Sorter<E> {
    /// Builds a sorter over `input`, using `codec` to frame elements in run files and `less` as
    /// the strict weak ordering. Returns the sorter plus the output and error sequences the
    /// caller drains after calling [`sort`](Sorter::sort).
    ///
    /// Fails synchronously, before any temp file or thread is created, if `config` is invalid.
    pub fn new(
        input: Receiver<E>,
        codec: Codec<E>,
        less: impl Fn(&E, &E) -> bool + Send + Sync + 'static,
        config: Config,
    ) -> Result<(Self, Receiver<E>, Receiver<Error>), Error> {
        config.validate()?;
        let (output_tx, output_rx) = bounded(config.sorted_chan_buffer());
        let (error_tx, error_rx) = bounded(1);
        let sorter = Sorter {
            started: Arc::new(AtomicBool::new(false)),
            state: Mutex::new(State::Ready(Pending { input_rx: input, output_tx, error_tx })),
            config,
            codec,
            less: Arc::new(less),
        };
        Ok((sorter, output_rx, error_rx))
    }

    /// Starts the sort on a background thread and returns immediately. Pipeline failures (not
    /// usage errors) are reported on the `error_seq` returned by [`new`](Sorter::new), not through
    /// this method's return value.
    pub fn sort(&self, cancel: CancellationToken) -> Result<(), Error> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(Error::UsageError("sort() called more than once on the same handle".into()));
        }
        let pending = {
            let mut guard = self.state.lock().unwrap();
            match std::mem::replace(&mut *guard, State::Started) {
                State::Ready(pending) => pending,
                State::Started => {
                    // Raced with another sort() call that lost the atomic swap above; unreachable
                    // in practice since the swap already serializes entry, kept defensive.
                    return Err(Error::UsageError("sort() called more than once on the same handle".into()));
                }
            }
        };
        let config = self.config.clone();
        let codec = self.codec.clone();
        let less = self.less.clone();
        thread::spawn(move || {
            run_pipeline_reporting(pending.input_rx, codec, less, config, cancel, pending.output_tx, pending.error_tx);
        });
        Ok(())
    }
}

fn run_pipeline_reporting<E: Send + 'static>(
    input_rx: Receiver<E>,
    codec: Codec<E>,
    less: LessFn<E>,
    config: Config,
    cancel: CancellationToken,
    output_tx: Sender<E>,
    error_tx: Sender<Error>,
) {
    if let Err(e) = run_pipeline(input_rx, codec, less, &config, cancel, &output_tx) {
        log::warn!("sort failed: {e}");
        let _ = error_tx.try_send(e);
    }
    // Dropping output_tx/error_tx here closes both channels, signalling the caller there is
    // nothing more to read.
}

fn run_pipeline<E: Send + 'static>(
    input_rx: Receiver<E>,
    codec: Codec<E>,
    less: LessFn<E>,
    config: &Config,
    cancel: CancellationToken,
    output_tx: &Sender<E>,
) -> Result<(), Error> {
    let tmp_dir = config.tmp_dir();
    let abort = AbortSignal::new(cancel);

    let runs = run_build_phase(input_rx, &codec, &less, config, &abort)?;
    if runs.is_empty() {
        return Ok(());
    }

    let _rlimit_guard = RlimitGuard::raise(runs.len().min(config.merge_fan_in()) + 8)?;
    let reduced = merger::hierarchical_reduce(
        runs,
        &tmp_dir,
        &codec,
        &less,
        config.merge_fan_in(),
        config.prefetch_capacity(),
        &abort,
    )?;
    let readers = merger::open_readers(&reduced, &codec, config.prefetch_capacity())?;
    merger::merge_to_output(readers, &less, output_tx, &abort)
}

fn run_build_phase<E: Send + 'static>(
    input_rx: Receiver<E>,
    codec: &Codec<E>,
    less: &LessFn<E>,
    config: &Config,
    abort: &AbortSignal,
) -> Result<Vec<crate::run::SealedRun>, Error> {
    let (unsorted_tx, unsorted_rx) = bounded(config.chan_buffer());
    let (sorted_tx, sorted_rx) = bounded(config.chan_buffer());

    let producer = {
        let unsorted_tx = unsorted_tx.clone();
        let abort = abort.clone();
        let chunk_size = config.chunk_size();
        thread::spawn(move || chunk_builder::run(input_rx, unsorted_tx, chunk_size, abort))
    };
    drop(unsorted_tx);

    let num_workers = config.resolved_num_workers();
    let workers: Vec<_> = (0..num_workers)
        .map(|_| {
            let unsorted_rx = unsorted_rx.clone();
            let sorted_tx = sorted_tx.clone();
            let less = less.clone();
            let abort = abort.clone();
            thread::spawn(move || sort_worker::run(unsorted_rx, sorted_tx, less, abort))
        })
        .collect();
    drop(unsorted_rx);
    drop(sorted_tx);

    let dir = config.tmp_dir();
    let runs_result = build::run_writer_loop(sorted_rx, dir, codec.clone(), abort.clone());

    if producer.join().is_err() {
        log::warn!("chunk builder thread panicked");
    }
    for worker in workers {
        if worker.join().is_err() {
            log::warn!("sort worker thread panicked");
        }
    }

    runs_result
}
