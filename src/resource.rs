//! Raises the open-file-descriptor limit for the duration of the merge phase.

use crate::error::Error;

/// RAII guard around `setrlimit(RLIMIT_NOFILE, ...)`. The merge phase may hold one reader open
/// per run being merged (bounded by `merge_fan_in`, plus a handful for the writer and the
/// caller's own files); raising the soft limit up front avoids a late `EMFILE` partway through a
/// large merge. The original soft limit is restored when the guard drops, win or lose.
pub(crate) struct RlimitGuard {
    soft: u64,
    hard: u64,
}

impl RlimitGuard {
    pub(crate) fn raise(wanted_open_files: usize) -> Result<Self, Error> {
        let (soft, hard) = rlimit::getrlimit(rlimit::Resource::NOFILE).map_err(Error::IOError)?;
        let wanted = (wanted_open_files as u64).saturating_add(256);
        let target = wanted.min(hard).max(soft);
        if target > soft {
            log::info!("raising NOFILE rlimit: soft {soft} -> {target} (hard {hard})");
            rlimit::setrlimit(rlimit::Resource::NOFILE, target, hard).map_err(Error::IOError)?;
        }
        Ok(Self { soft, hard })
    }
}

impl Drop for RlimitGuard {
    fn drop(&mut self) {
        if let Err(e) = rlimit::setrlimit(rlimit::Resource::NOFILE, self.soft, self.hard) {
            log::warn!("failed to restore NOFILE rlimit to {}: {}", self.soft, e);
        }
    }
}
