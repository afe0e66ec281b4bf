mod common;

use std::thread;
use std::time::Duration;

use crossbeam_channel::bounded;
use ext_merge_sort::cancel::CancellationToken;
use ext_merge_sort::config::Config;
use ext_merge_sort::error::Error;
use ext_merge_sort::sort::Sorter;

#[test]
fn cancellation_mid_merge_stops_the_pipeline_and_reports_canceled() {
    let (input_tx, input_rx) = bounded(0);
    // Rendezvous output channel: the merge phase blocks on every send until we read, so we can
    // read a handful of elements and then cancel while it is still working.
    let config = Config::default().with_chunk_size(50).with_num_workers(2).with_sorted_chan_buffer(0);
    let (sorter, output_rx, error_rx) =
        Sorter::new(input_rx, common::int_codec(), |a: &i64, b: &i64| a < b, config).unwrap();
    let cancel = CancellationToken::new();
    sorter.sort(cancel.clone()).unwrap();

    thread::spawn(move || {
        for v in (0..200_000i64).rev() {
            if input_tx.send(v).is_err() {
                break;
            }
        }
    });

    // Let a few elements flow so the build phase has genuinely started before cancelling.
    for _ in 0..3 {
        let _ = output_rx.recv_timeout(Duration::from_secs(5));
    }
    cancel.cancel();

    // Drain whatever trickles through until the channel closes.
    while output_rx.recv_timeout(Duration::from_secs(5)).is_ok() {}

    let err = error_rx.recv_timeout(Duration::from_secs(5));
    assert!(matches!(err, Ok(Error::Canceled)), "expected Canceled, got {err:?}");
}

#[test]
fn cancellation_during_hierarchical_merge_leaves_no_temp_files() {
    let dir = tempfile::tempdir().unwrap();
    let (input_tx, input_rx) = bounded(0);
    // chunk_size 5 against 2_000 elements makes hundreds of runs, well above merge_fan_in, so the
    // hierarchical reduce has many groups still queued when cancellation lands.
    let config = Config::default()
        .with_tmp_dir(dir.path())
        .with_chunk_size(5)
        .with_num_workers(2)
        .with_merge_fan_in(3);
    let (sorter, output_rx, error_rx) =
        Sorter::new(input_rx, common::int_codec(), |a: &i64, b: &i64| a < b, config).unwrap();
    let cancel = CancellationToken::new();
    sorter.sort(cancel.clone()).unwrap();

    thread::spawn(move || {
        for v in (0..2_000i64).rev() {
            if input_tx.send(v).is_err() {
                break;
            }
        }
    });

    // Cancel immediately, before draining any output, so the cancellation has every chance of
    // landing while the build phase or the hierarchical reduce is still working rather than
    // after the pipeline has already finished and cleaned up on its own.
    cancel.cancel();

    while output_rx.recv_timeout(Duration::from_secs(5)).is_ok() {}
    let err = error_rx.recv_timeout(Duration::from_secs(5));
    assert!(matches!(err, Ok(Error::Canceled)), "expected Canceled, got {err:?}");

    assert!(
        std::fs::read_dir(dir.path()).unwrap().next().is_none(),
        "temp dir still has leftover run files after cancellation"
    );
}
