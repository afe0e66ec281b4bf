use std::io;

/// Errors produced by a sort, merge or diff invocation.
///
/// Every invocation terminates on the first error. The error reaches the caller exactly once, on
/// the `error_seq` channel returned alongside the output sequence; construction-time usage errors
/// (invalid [`crate::config::Config`], re-entry) are returned synchronously instead.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The caller's `decode` callback failed while reading an element back from a run.
    #[error("failed to decode element: {0}")]
    InputError(#[source] anyhow::Error),

    /// A temporary run file could not be created (permission denied, out of space, ...).
    #[error("failed to create temp file: {0}")]
    TempFileCreateError(#[source] io::Error),

    /// A read, write or close on a run file failed.
    #[error("I/O error: {0}")]
    IOError(#[source] io::Error),

    /// A run's frame was truncated or declared a length outside the accepted range.
    #[error("corrupt run: {0}")]
    CorruptRun(String),

    /// The cancellation token fired, or the consumer dropped the output channel.
    #[error("operation canceled")]
    Canceled,

    /// Invalid configuration, or a handle was driven more than once.
    #[error("usage error: {0}")]
    UsageError(String),
}
