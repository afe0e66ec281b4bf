//! Ordered symmetric difference of two already-sorted sequences.
//!
//! Unlike [`crate::sort::Sorter`], the diff operator does no chunking and creates no temporary
//! files: both inputs are assumed already sorted under the same ordering, so a single merge-join
//! pass is enough.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender};

use crate::abort::AbortSignal;
use crate::cancel::CancellationToken;
use crate::codec::LessFn;
use crate::error::Error;
use crate::select_util::{recv_cancelable, send_cancelable};

type EqFn<E> = Arc<dyn Fn(&E, &E) -> bool + Send + Sync>;

struct Pending<E> {
    left: Receiver<E>,
    right: Receiver<E>,
    output_tx: Sender<E>,
    error_tx: Sender<Error>,
}

enum State<E> {
    Ready(Pending<E>),
    Started,
}

/// A diff in progress between two pre-sorted sequences. One-shot, like
/// [`crate::sort::Sorter`]: calling [`run`](DiffHandle::run) a second time is a usage error.
pub struct DiffHandle<E> {
    started: Arc<AtomicBool>,
    state: Mutex<State<E>>,
    less: LessFn<E>,
    equal: EqFn<E>,
}

/// Builds a diff over two already-sorted sequences. `less` must agree with whatever ordering
/// produced `left` and `right`; `equal` decides which elements are considered the same element
/// for the purpose of the difference (often, but not necessarily, `!less(a,b) && !less(b,a)`).
///
/// Returns a handle plus the output and error sequences; call
/// [`DiffHandle::run`] to start it.
pub fn new<E: Send + 'static>(
    left: Receiver<E>,
    right: Receiver<E>,
    less: impl Fn(&E, &E) -> bool + Send + Sync + 'static,
    equal: impl Fn(&E, &E) -> bool + Send + Sync + 'static,
    config: crate::config::Config,
) -> (DiffHandle<E>, Receiver<E>, Receiver<Error>) {
    let (output_tx, output_rx) = bounded(config.sorted_chan_buffer());
    let (error_tx, error_rx) = bounded(1);
    let handle = DiffHandle {
        started: Arc::new(AtomicBool::new(false)),
        state: Mutex::new(State::Ready(Pending { left, right, output_tx, error_tx })),
        less: Arc::new(less),
        equal: Arc::new(equal),
    };
    (handle, output_rx, error_rx)
}

impl<E: Send + 'static> DiffHandle<E> {
    /// Starts the diff on a background thread and returns immediately. Failures are reported on
    /// the `error_seq` returned by [`new`], not through this method's return value.
    pub fn run(&self, cancel: CancellationToken) -> Result<(), Error> {
        if self.started.swap(true, Ordering::SeqCst) {
            return Err(Error::UsageError("diff already started on this handle".into()));
        }
        let pending = {
            let mut guard = self.state.lock().unwrap();
            match std::mem::replace(&mut *guard, State::Started) {
                State::Ready(pending) => pending,
                State::Started => {
                    return Err(Error::UsageError("diff already started on this handle".into()));
                }
            }
        };
        let less = self.less.clone();
        let equal = self.equal.clone();
        thread::spawn(move || {
            let abort = AbortSignal::new(cancel);
            let result = run_diff(pending.left, pending.right, less, equal, &pending.output_tx, &abort);
            if let Err(e) = result {
                log::warn!("diff failed: {e}");
                let _ = pending.error_tx.try_send(e);
            }
        });
        Ok(())
    }
}

fn run_diff<E: Send + 'static>(
    left: Receiver<E>,
    right: Receiver<E>,
    less: LessFn<E>,
    equal: EqFn<E>,
    output_tx: &Sender<E>,
    abort: &AbortSignal,
) -> Result<(), Error> {
    let mut l = recv_cancelable(&left, abort)?;
    let mut r = recv_cancelable(&right, abort)?;

    loop {
        match (l.is_some(), r.is_some()) {
            (false, false) => break,
            (true, false) => {
                send_cancelable(output_tx, l.take().unwrap(), abort)?;
                l = recv_cancelable(&left, abort)?;
            }
            (false, true) => {
                send_cancelable(output_tx, r.take().unwrap(), abort)?;
                r = recv_cancelable(&right, abort)?;
            }
            (true, true) => {
                let lv = l.as_ref().unwrap();
                let rv = r.as_ref().unwrap();
                if equal(lv, rv) {
                    l = recv_cancelable(&left, abort)?;
                    r = recv_cancelable(&right, abort)?;
                } else if less(lv, rv) {
                    send_cancelable(output_tx, l.take().unwrap(), abort)?;
                    l = recv_cancelable(&left, abort)?;
                } else {
                    send_cancelable(output_tx, r.take().unwrap(), abort)?;
                    r = recv_cancelable(&right, abort)?;
                }
            }
        }
    }
    Ok(())
}
