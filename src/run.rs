//! A run is one sorted chunk spilled to a temporary file, framed as a sequence of
//! length-prefixed records: a little-endian `u32` byte length followed by that many
//! codec-encoded bytes.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::codec::Codec;
use crate::error::Error;

/// Frames larger than this are treated as a corrupt length prefix rather than an honest oversized
/// element -- it is many times larger than any reasonable single encoded element and catches a
/// torn write or a bit-flipped length field well before an allocation of that size is attempted.
const MAX_FRAME_LEN: u32 = 1 << 30;

/// A completed, on-disk run: every element it contains is sorted relative to the run's own
/// comparator, already encoded, already flushed.
#[derive(Clone, Debug)]
pub(crate) struct SealedRun {
    path: PathBuf,
    len: usize,
}

impl SealedRun {
    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    #[allow(dead_code)]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Best-effort removal of the backing file. Safe to call more than once.
    pub(crate) fn delete(&self) {
        delete_path(&self.path);
    }
}

fn delete_path(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        if e.kind() != io::ErrorKind::NotFound {
            log::warn!("failed to delete temp run {}: {}", path.display(), e);
        }
    }
}

/// Creates one run file and appends encoded elements to it in order.
pub(crate) struct RunWriter<E> {
    file: BufWriter<File>,
    path: PathBuf,
    codec: Codec<E>,
    count: usize,
}

impl<E> RunWriter<E> {
    pub(crate) fn create(dir: &Path, codec: Codec<E>) -> Result<Self, Error> {
        let named = tempfile::Builder::new()
            .prefix("ext-merge-sort-run-")
            .suffix(".run")
            .tempfile_in(dir)
            .map_err(Error::TempFileCreateError)?;
        let (file, path) = named.keep().map_err(|e| Error::TempFileCreateError(e.error))?;
        Ok(Self { file: BufWriter::new(file), path, codec, count: 0 })
    }

    pub(crate) fn write(&mut self, item: &E) -> Result<(), Error> {
        let bytes = self.codec.encode(item);
        let len = u32::try_from(bytes.len())
            .map_err(|_| Error::CorruptRun("encoded element exceeds 4 GiB".into()))?;
        self.file.write_all(&len.to_le_bytes()).map_err(Error::IOError)?;
        self.file.write_all(&bytes).map_err(Error::IOError)?;
        self.count += 1;
        Ok(())
    }

    /// Flushes and seals the run, returning a handle to the finished file.
    pub(crate) fn close(mut self) -> Result<SealedRun, Error> {
        self.file.flush().map_err(Error::IOError)?;
        Ok(SealedRun { path: self.path, len: self.count })
    }

    /// Abandons the run: whatever was written so far is discarded and the file removed.
    pub(crate) fn abort(self) {
        let path = self.path.clone();
        drop(self);
        delete_path(&path);
    }
}

/// Reads a sealed run back, prefetching decoded elements in batches rather than one frame at a
/// time so the merge step's hot loop is mostly working against an in-memory queue.
pub(crate) struct RunReader<E> {
    path: PathBuf,
    file: Option<BufReader<File>>,
    codec: Codec<E>,
    buf: VecDeque<E>,
    prefetch_capacity: usize,
    exhausted: bool,
}

impl<E> RunReader<E> {
    pub(crate) fn open(run: SealedRun, codec: Codec<E>, prefetch_capacity: usize) -> Result<Self, Error> {
        let file = File::open(run.path()).map_err(Error::IOError)?;
        let prefetch_capacity = prefetch_capacity.max(1);
        let mut reader = Self {
            path: run.path().to_path_buf(),
            file: Some(BufReader::new(file)),
            codec,
            buf: VecDeque::with_capacity(prefetch_capacity),
            prefetch_capacity,
            exhausted: false,
        };
        reader.refill()?;
        Ok(reader)
    }

    pub(crate) fn has_next(&self) -> bool {
        !self.buf.is_empty()
    }

    /// Pops the current head and refills the prefetch buffer if it has run low. Must only be
    /// called when [`has_next`](Self::has_next) is true.
    pub(crate) fn take(&mut self) -> Result<E, Error> {
        let item = self.buf.pop_front().ok_or_else(|| {
            Error::IOError(io::Error::new(
                io::ErrorKind::Other,
                "run reader drained without a pending element",
            ))
        })?;
        if self.buf.len() < self.prefetch_capacity && !self.exhausted {
            self.refill()?;
        }
        Ok(item)
    }

    fn refill(&mut self) -> Result<(), Error> {
        while self.buf.len() < self.prefetch_capacity && !self.exhausted {
            let Some(file) = self.file.as_mut() else { break };
            let mut len_bytes = [0u8; 4];
            match file.read_exact(&mut len_bytes) {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    self.mark_exhausted();
                    break;
                }
                Err(e) => return Err(Error::IOError(e)),
            }
            let len = u32::from_le_bytes(len_bytes);
            if len > MAX_FRAME_LEN {
                return Err(Error::CorruptRun(format!(
                    "frame length {len} exceeds maximum {MAX_FRAME_LEN}"
                )));
            }
            let mut payload = vec![0u8; len as usize];
            file.read_exact(&mut payload).map_err(|e| {
                if e.kind() == io::ErrorKind::UnexpectedEof {
                    Error::CorruptRun("truncated frame payload".into())
                } else {
                    Error::IOError(e)
                }
            })?;
            let item = self.codec.decode(&payload).map_err(Error::InputError)?;
            self.buf.push_back(item);
        }
        Ok(())
    }

    fn mark_exhausted(&mut self) {
        self.exhausted = true;
        self.file = None;
        self.delete();
    }

    /// Best-effort removal of the backing file. Safe to call more than once, and safe to call
    /// while some of the reader's prefetched elements are still unconsumed: once the reader has
    /// reached end of file the file itself is no longer needed.
    pub(crate) fn delete(&self) {
        delete_path(&self.path);
    }
}
