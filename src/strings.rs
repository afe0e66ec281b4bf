//! A ready-made [`Sorter`] over byte strings, sorted lexicographically.

use crossbeam_channel::Receiver;

use crate::codec::Codec;
use crate::config::Config;
use crate::error::Error;
use crate::sort::Sorter;

/// Builds a [`Sorter`] for `Vec<u8>` elements using the identity codec (no framing beyond the
/// run's own length prefix) and byte-lexicographic ordering. Equivalent to calling
/// [`Sorter::new`] with a codec that clones bytes in and out and a `less` of `a < b`.
pub fn new_strings(
    input: Receiver<Vec<u8>>,
    config: Config,
) -> Result<(Sorter<Vec<u8>>, Receiver<Vec<u8>>, Receiver<Error>), Error> {
    let codec = Codec::new(
        |e: &Vec<u8>| e.clone(),
        |bytes: &[u8]| Ok(bytes.to_vec()),
    );
    Sorter::new(input, codec, |a: &Vec<u8>, b: &Vec<u8>| a < b, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancellationToken;
    use crossbeam_channel::bounded;
    use std::thread;

    #[test]
    fn sorts_byte_strings_lexicographically() {
        let (input_tx, input_rx) = bounded(0);
        let (sorter, output_rx, error_rx) = new_strings(input_rx, Config::default()).unwrap();
        sorter.sort(CancellationToken::new()).unwrap();

        let words = ["banana", "apple", "cherry", "apricot", "blueberry"];
        thread::spawn(move || {
            for w in words {
                input_tx.send(w.as_bytes().to_vec()).unwrap();
            }
        });

        let mut out = Vec::new();
        while let Ok(v) = output_rx.recv() {
            out.push(String::from_utf8(v).unwrap());
        }
        assert_eq!(out, vec!["apple", "apricot", "banana", "blueberry", "cherry"]);
        assert!(error_rx.try_recv().is_err());
    }
}
