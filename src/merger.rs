//! The k-way merge: combines sealed runs into a single ordered stream via a priority queue keyed
//! by each run's current head element.
//!
//! When there are more runs than [`Config::merge_fan_in`](crate::config::Config), they are first
//! reduced hierarchically -- merging `merge_fan_in` runs into one intermediate run at a time --
//! so the final pass never holds more than `merge_fan_in` file descriptors open at once.

use std::path::Path;

use crossbeam_channel::Sender;

use crate::abort::AbortSignal;
use crate::codec::{Codec, LessFn};
use crate::error::Error;
use crate::priority_queue::PriorityQueue;
use crate::run::{RunReader, RunWriter, SealedRun};
use crate::select_util::send_cancelable;

struct HeapEntry<E> {
    head: E,
    reader: RunReader<E>,
}

/// Streams the ordered merge of `readers` through `emit`, one element at a time. On success every
/// reader has reached EOF and deleted its own file (see [`RunReader`]). On failure, every reader
/// still holding an open run is deleted before the error is returned.
fn merge_streaming<E>(
    readers: Vec<RunReader<E>>,
    less: LessFn<E>,
    mut emit: impl FnMut(E) -> Result<(), Error>,
    abort: &AbortSignal,
) -> Result<(), Error> {
    let cmp_less = less.clone();
    let mut heap: PriorityQueue<HeapEntry<E>, _> =
        PriorityQueue::new(move |a: &HeapEntry<E>, b: &HeapEntry<E>| cmp_less(&a.head, &b.head));

    let mut iter = readers.into_iter();
    let mut seed_err = None;
    for mut reader in iter.by_ref() {
        if reader.has_next() {
            match reader.take() {
                Ok(head) => heap.push(HeapEntry { head, reader }),
                Err(e) => {
                    reader.delete();
                    seed_err = Some(e);
                    break;
                }
            }
        }
    }
    if let Some(e) = seed_err {
        for reader in iter {
            reader.delete();
        }
        while let Some(entry) = heap.pop() {
            entry.reader.delete();
        }
        return Err(e);
    }

    let result = (|| -> Result<(), Error> {
        loop {
            if abort.is_aborted() {
                return Err(Error::Canceled);
            }
            let Some(HeapEntry { head, mut reader }) = heap.pop() else {
                return Ok(());
            };
            emit(head)?;
            if reader.has_next() {
                let next_head = reader.take()?;
                heap.push(HeapEntry { head: next_head, reader });
            }
        }
    })();

    if result.is_err() {
        while let Some(entry) = heap.pop() {
            entry.reader.delete();
        }
    }
    result
}

/// Opens every run in `runs` as a reader, in order. If any `open` call fails, every reader already
/// opened and every not-yet-opened run -- including the one that failed -- is deleted before the
/// error is returned, so callers never have to separately account for a partially-opened group.
pub(crate) fn open_readers<E>(
    runs: &[SealedRun],
    codec: &Codec<E>,
    prefetch_capacity: usize,
) -> Result<Vec<RunReader<E>>, Error> {
    let mut readers = Vec::with_capacity(runs.len());
    for (i, run) in runs.iter().enumerate() {
        match RunReader::open(run.clone(), codec.clone(), prefetch_capacity) {
            Ok(reader) => readers.push(reader),
            Err(e) => {
                for reader in readers {
                    reader.delete();
                }
                for leftover in &runs[i..] {
                    leftover.delete();
                }
                return Err(e);
            }
        }
    }
    Ok(readers)
}

/// Merges one group of runs into a single new intermediate run.
fn reduce_group<E>(
    group: &[SealedRun],
    dir: &Path,
    codec: &Codec<E>,
    less: &LessFn<E>,
    prefetch_capacity: usize,
    abort: &AbortSignal,
) -> Result<SealedRun, Error> {
    let readers = open_readers(group, codec, prefetch_capacity)?;
    let mut writer = RunWriter::create(dir, codec.clone())?;
    let result = merge_streaming(readers, less.clone(), |item| writer.write(&item), abort);
    match result {
        Ok(()) => writer.close(),
        Err(e) => {
            writer.abort();
            Err(e)
        }
    }
}

/// Reduces `runs` down to at most `fan_in` sealed runs, merging `fan_in` at a time. On every exit
/// other than the final `Ok`, every run still on disk -- completed intermediates in `next`, the
/// group being reduced when the failure happened, and every group not yet reached -- is deleted.
pub(crate) fn hierarchical_reduce<E>(
    mut runs: Vec<SealedRun>,
    dir: &Path,
    codec: &Codec<E>,
    less: &LessFn<E>,
    fan_in: usize,
    prefetch_capacity: usize,
    abort: &AbortSignal,
) -> Result<Vec<SealedRun>, Error> {
    while runs.len() > fan_in {
        log::debug!("hierarchical merge: reducing {} runs (fan-in {fan_in})", runs.len());
        let mut next: Vec<SealedRun> = Vec::with_capacity(runs.len().div_ceil(fan_in));
        let mut remaining: &[SealedRun] = &runs;
        while !remaining.is_empty() {
            if abort.is_aborted() {
                for run in &next {
                    run.delete();
                }
                for run in remaining {
                    run.delete();
                }
                return Err(Error::Canceled);
            }
            let take = remaining.len().min(fan_in);
            let (group, rest) = remaining.split_at(take);
            match reduce_group(group, dir, codec, less, prefetch_capacity, abort) {
                Ok(merged) => next.push(merged),
                Err(e) => {
                    for run in &next {
                        run.delete();
                    }
                    for run in group {
                        run.delete();
                    }
                    for run in rest {
                        run.delete();
                    }
                    return Err(e);
                }
            }
            remaining = rest;
        }
        runs = next;
    }
    Ok(runs)
}

/// The final merge pass: streams the ordered union of `readers` to `output_tx`.
pub(crate) fn merge_to_output<E>(
    readers: Vec<RunReader<E>>,
    less: &LessFn<E>,
    output_tx: &Sender<E>,
    abort: &AbortSignal,
) -> Result<(), Error> {
    merge_streaming(
        readers,
        less.clone(),
        |item| send_cancelable(output_tx, item, abort),
        abort,
    )
}
