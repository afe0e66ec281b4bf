mod common;

use std::thread;

use crossbeam_channel::bounded;
use ext_merge_sort::cancel::CancellationToken;
use ext_merge_sort::config::Config;
use ext_merge_sort::sort::Sorter;

#[test]
fn sorts_many_chunks_across_several_workers() {
    let (input_tx, input_rx) = bounded(0);
    let config = Config::default().with_chunk_size(97).with_num_workers(4).with_chan_buffer(2);
    let (sorter, output_rx, error_rx) =
        Sorter::new(input_rx, common::int_codec(), |a: &i64, b: &i64| a < b, config).unwrap();
    sorter.sort(CancellationToken::new()).unwrap();

    // Enough elements, with a chunk size of 97, to force many runs and a genuine k-way merge.
    let mut values: Vec<i64> = (0..5000).collect();
    values.reverse();
    let mut expected = values.clone();
    expected.sort();

    let sender = thread::spawn(move || {
        for v in values {
            input_tx.send(v).unwrap();
        }
    });

    let mut output = Vec::new();
    while let Ok(v) = output_rx.recv() {
        output.push(v);
    }
    sender.join().unwrap();

    assert_eq!(output, expected, "output must be sorted and preserve the input multiset");
    assert!(error_rx.try_recv().is_err(), "a successful sort must not emit an error");
}

#[test]
fn duplicate_keys_survive_the_priority_queue_merge() {
    let (input_tx, input_rx) = bounded(0);
    let config = Config::default().with_chunk_size(8).with_num_workers(3);
    let (sorter, output_rx, error_rx) =
        Sorter::new(input_rx, common::int_codec(), |a: &i64, b: &i64| a < b, config).unwrap();
    sorter.sort(CancellationToken::new()).unwrap();

    // Every value appears several times, spread across many chunks so duplicates land in
    // different runs and must be merged back together by the priority queue.
    let mut values = Vec::new();
    for _ in 0..20 {
        values.extend([1i64, 2, 2, 3, 3, 3]);
    }
    let mut expected = values.clone();
    expected.sort();

    thread::spawn(move || {
        for v in values {
            input_tx.send(v).unwrap();
        }
    });

    let mut output = Vec::new();
    while let Ok(v) = output_rx.recv() {
        output.push(v);
    }
    assert_eq!(output, expected);
    assert!(error_rx.try_recv().is_err());
}

#[test]
fn single_element_and_empty_chunk_size_boundaries() {
    let (input_tx, input_rx) = bounded(0);
    let config = Config::default().with_chunk_size(1).with_num_workers(1);
    let (sorter, output_rx, error_rx) =
        Sorter::new(input_rx, common::int_codec(), |a: &i64, b: &i64| a < b, config).unwrap();
    sorter.sort(CancellationToken::new()).unwrap();

    thread::spawn(move || {
        input_tx.send(42i64).unwrap();
    });

    assert_eq!(output_rx.recv(), Ok(42));
    assert_eq!(output_rx.recv(), Err(crossbeam_channel::RecvError));
    assert!(error_rx.try_recv().is_err());
}
