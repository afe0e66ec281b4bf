//! External merge sort for sequences too large to hold in memory.
//!
//! Elements arrive on a channel, are batched into bounded in-memory chunks, sorted in parallel by
//! a pool of workers, and spilled to temporary run files on disk. Once every element has been
//! spilled, the runs are merged back into a single ordered stream via a k-way merge over a
//! priority queue, with a hierarchical reduction pass first if there are more runs than the
//! configured merge fan-in. The caller drains the result from a channel as it is produced, rather
//! than waiting for the whole sort to finish.
//!
//! Two building blocks sit beside the sorter itself: [`strings::new_strings`], a ready-made
//! sorter over byte strings, and [`diff`], an operator that streams the ordered symmetric
//! difference of two already-sorted sequences without spilling anything to disk.
//!
//! # Examples
//! ```
//! use crossbeam_channel::bounded;
//! use ext_merge_sort::cancel::CancellationToken;
//! use ext_merge_sort::codec::Codec;
//! use ext_merge_sort::config::Config;
//! use ext_merge_sort::sort::Sorter;
//!
//! fn sort_integers() -> Result<(), ext_merge_sort::error::Error> {
//!     let (input_tx, input_rx) = bounded(0);
//!     let codec = Codec::new(
//!         |e: &i64| e.to_le_bytes().to_vec(),
//!         |bytes: &[u8]| Ok(i64::from_le_bytes(bytes.try_into()?)),
//!     );
//!     let config = Config::default().with_chunk_size(4096).with_num_workers(4);
//!     let (sorter, output_rx, error_rx) = Sorter::new(input_rx, codec, |a: &i64, b| a < b, config)?;
//!     sorter.sort(CancellationToken::new())?;
//!
//!     std::thread::spawn(move || {
//!         for v in [5, 3, 1, 4, 2] {
//!             input_tx.send(v).unwrap();
//!         }
//!     });
//!
//!     let mut sorted = Vec::new();
//!     while let Ok(v) = output_rx.recv() {
//!         sorted.push(v);
//!     }
//!     assert!(error_rx.try_recv().is_err());
//!     assert_eq!(sorted, vec![1, 2, 3, 4, 5]);
//!     Ok(())
//! }
//! ```

pub(crate) mod abort;
pub(crate) mod build;
pub(crate) mod chunk;
pub(crate) mod chunk_builder;
pub(crate) mod merger;
pub(crate) mod resource;
pub(crate) mod run;
pub(crate) mod select_util;
pub(crate) mod sort_worker;

pub mod cancel;
pub mod codec;
pub mod config;
pub mod diff;
pub mod error;
pub mod priority_queue;
pub mod sort;
pub mod strings;
