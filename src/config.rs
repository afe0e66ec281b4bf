//! Tunables for a sort/merge/diff run.

use std::path::PathBuf;

use crate::error::Error;

/// Builder-style configuration, consumed with `with_*` methods the way
/// [`crate::codec::Codec`]'s sibling types are built. All fields have defaults chosen to behave
/// reasonably for a few hundred megabytes of input without any tuning.
#[derive(Clone, Debug)]
pub struct Config {
    chunk_size: usize,
    num_workers: usize,
    chan_buffer: usize,
    sorted_chan_buffer: usize,
    tmp_dir: Option<PathBuf>,
    merge_fan_in: usize,
    prefetch_capacity: usize,
}

impl Config {
    /// Maximum number of elements buffered in memory per chunk before it is handed off to a sort
    /// worker. Must be at least 1.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Number of concurrent sort workers. `0` means "one per available core"
    /// ([`num_cpus::get`]), resolved when [`sort`](crate::sort::Sorter::sort) is called.
    pub fn with_num_workers(mut self, num_workers: usize) -> Self {
        self.num_workers = num_workers;
        self
    }

    /// Capacity of the bounded channels carrying unsorted and sorted chunks between pipeline
    /// stages. Small values increase backpressure (and hence bound memory more tightly); large
    /// values smooth out scheduling jitter at the cost of more buffered chunks in flight.
    pub fn with_chan_buffer(mut self, chan_buffer: usize) -> Self {
        self.chan_buffer = chan_buffer;
        self
    }

    /// Capacity of the output channel returned to the caller. `0` is a rendezvous channel: the
    /// merge step blocks until the caller is ready for the next element.
    pub fn with_sorted_chan_buffer(mut self, sorted_chan_buffer: usize) -> Self {
        self.sorted_chan_buffer = sorted_chan_buffer;
        self
    }

    /// Directory in which run files are created. Defaults to [`std::env::temp_dir`].
    pub fn with_tmp_dir(mut self, tmp_dir: impl Into<PathBuf>) -> Self {
        self.tmp_dir = Some(tmp_dir.into());
        self
    }

    /// Maximum number of runs merged in a single pass. When more runs than this are produced by
    /// the build phase, they are reduced hierarchically (merging `merge_fan_in` runs into one
    /// intermediate run at a time) before the final pass streams to the caller. Bounds the number
    /// of file descriptors the merge phase holds open at once. Must be at least 2.
    pub fn with_merge_fan_in(mut self, merge_fan_in: usize) -> Self {
        self.merge_fan_in = merge_fan_in;
        self
    }

    /// Number of decoded elements a [`crate::run::RunReader`] keeps buffered ahead of the merge
    /// step, amortizing the cost of a file read across several elements.
    pub fn with_prefetch_capacity(mut self, prefetch_capacity: usize) -> Self {
        self.prefetch_capacity = prefetch_capacity;
        self
    }

    pub(crate) fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub(crate) fn resolved_num_workers(&self) -> usize {
        if self.num_workers == 0 {
            num_cpus::get().max(1)
        } else {
            self.num_workers
        }
    }

    pub(crate) fn chan_buffer(&self) -> usize {
        self.chan_buffer
    }

    pub(crate) fn sorted_chan_buffer(&self) -> usize {
        self.sorted_chan_buffer
    }

    pub(crate) fn tmp_dir(&self) -> PathBuf {
        self.tmp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    pub(crate) fn merge_fan_in(&self) -> usize {
        self.merge_fan_in
    }

    pub(crate) fn prefetch_capacity(&self) -> usize {
        self.prefetch_capacity.max(1)
    }

    pub(crate) fn validate(&self) -> Result<(), Error> {
        if self.chunk_size == 0 {
            return Err(Error::UsageError("chunk_size must be at least 1".into()));
        }
        if self.merge_fan_in < 2 {
            return Err(Error::UsageError("merge_fan_in must be at least 2".into()));
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chunk_size: 64 * 1024,
            num_workers: 2,
            chan_buffer: 1,
            sorted_chan_buffer: 0,
            tmp_dir: None,
            merge_fan_in: 64,
            prefetch_capacity: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_chunk_size() {
        let config = Config::default().with_chunk_size(0);
        assert!(matches!(config.validate(), Err(Error::UsageError(_))));
    }

    #[test]
    fn rejects_merge_fan_in_below_two() {
        let config = Config::default().with_merge_fan_in(1);
        assert!(matches!(config.validate(), Err(Error::UsageError(_))));
    }

    #[test]
    fn zero_num_workers_resolves_to_at_least_one() {
        let config = Config::default().with_num_workers(0);
        assert!(config.resolved_num_workers() >= 1);
    }

    #[test]
    fn default_config_validates() {
        assert!(Config::default().validate().is_ok());
    }
}
