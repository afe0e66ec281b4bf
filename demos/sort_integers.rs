use std::thread;

use anyhow::Error;
use crossbeam_channel::bounded;

use ext_merge_sort::cancel::CancellationToken;
use ext_merge_sort::codec::Codec;
use ext_merge_sort::config::Config;
use ext_merge_sort::diff;
use ext_merge_sort::sort::Sorter;
use ext_merge_sort::strings::new_strings;

fn sort_integers(values: Vec<i64>) -> Result<Vec<i64>, Error> {
    let (input_tx, input_rx) = bounded(0);
    let codec = Codec::new(
        |e: &i64| e.to_le_bytes().to_vec(),
        |bytes: &[u8]| Ok(i64::from_le_bytes(bytes.try_into()?)),
    );
    let config = Config::default().with_chunk_size(4096).with_num_workers(num_cpus::get());
    let (sorter, output_rx, error_rx) = Sorter::new(input_rx, codec, |a: &i64, b: &i64| a < b, config)?;
    sorter.sort(CancellationToken::new())?;

    thread::spawn(move || {
        for v in values {
            let _ = input_tx.send(v);
        }
    });

    let mut sorted = Vec::new();
    while let Ok(v) = output_rx.recv() {
        sorted.push(v);
    }
    if let Ok(e) = error_rx.try_recv() {
        return Err(e.into());
    }
    Ok(sorted)
}

fn sort_words(words: Vec<&str>) -> Result<Vec<String>, Error> {
    let (input_tx, input_rx) = bounded(0);
    let (sorter, output_rx, error_rx) = new_strings(input_rx, Config::default())?;
    sorter.sort(CancellationToken::new())?;

    thread::spawn(move || {
        for w in words {
            let _ = input_tx.send(w.as_bytes().to_vec());
        }
    });

    let mut sorted = Vec::new();
    while let Ok(v) = output_rx.recv() {
        sorted.push(String::from_utf8_lossy(&v).into_owned());
    }
    if let Ok(e) = error_rx.try_recv() {
        return Err(e.into());
    }
    Ok(sorted)
}

fn diff_sorted_sequences(left: Vec<i64>, right: Vec<i64>) -> Result<Vec<i64>, Error> {
    let (left_tx, left_rx) = bounded(0);
    let (right_tx, right_rx) = bounded(0);
    let (handle, output_rx, error_rx) = diff::new(
        left_rx,
        right_rx,
        |a: &i64, b: &i64| a < b,
        |a: &i64, b: &i64| a == b,
        Config::default(),
    );
    handle.run(CancellationToken::new())?;

    thread::spawn(move || {
        for v in left {
            let _ = left_tx.send(v);
        }
    });
    thread::spawn(move || {
        for v in right {
            let _ = right_tx.send(v);
        }
    });

    let mut out = Vec::new();
    while let Ok(v) = output_rx.recv() {
        out.push(v);
    }
    if let Ok(e) = error_rx.try_recv() {
        return Err(e.into());
    }
    Ok(out)
}

// cargo run -r --example sort_integers
pub fn main() -> Result<(), Error> {
    let sorted = sort_integers(vec![9, 3, 7, 1, 8, 2, 6, 4, 0, 5])?;
    println!("sorted integers: {sorted:?}");

    let sorted_words = sort_words(vec!["mergesort", "quicksort", "heapsort", "bubblesort"])?;
    println!("sorted words: {sorted_words:?}");

    let difference = diff_sorted_sequences(vec![1, 2, 3, 5, 8], vec![2, 3, 4, 8, 9])?;
    println!("symmetric difference: {difference:?}");

    Ok(())
}
