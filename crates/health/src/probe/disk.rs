//! Filesystem statistics probe.

use std::path::Path;

use super::{DiskStats, DiskUsage};
use crate::error::Result;

/// Reads usage of the filesystem containing a path via `statvfs(3)`.
///
/// Free space counts only blocks available to unprivileged users, so a
/// filesystem with reserved root blocks reports as fuller than `df` shows.
#[derive(Debug, Clone, Copy, Default)]
pub struct RootFilesystem;

impl RootFilesystem {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
impl DiskStats for RootFilesystem {
    fn usage(&self, path: &Path) -> Result<DiskUsage> {
        use std::ffi::CString;
        use std::os::unix::ffi::OsStrExt;

        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

        // SAFETY: statvfs is plain old data, valid when zeroed.
        let mut stat: libc::statvfs = unsafe { std::mem::zeroed() };
        // SAFETY: c_path is NUL-terminated and stat is a valid out-pointer.
        let rc = unsafe { libc::statvfs(c_path.as_ptr(), &mut stat) };
        if rc != 0 {
            return Err(std::io::Error::last_os_error().into());
        }

        #[allow(clippy::useless_conversion)]
        let (fragment, available, blocks) = (
            u64::from(stat.f_frsize),
            u64::from(stat.f_bavail),
            u64::from(stat.f_blocks),
        );
        Ok(DiskUsage {
            free_bytes: available.saturating_mul(fragment),
            total_bytes: blocks.saturating_mul(fragment),
        })
    }
}

#[cfg(not(unix))]
impl DiskStats for RootFilesystem {
    fn usage(&self, _path: &Path) -> Result<DiskUsage> {
        Err(crate::error::ProbeError::Unsupported(
            "filesystem statistics require statvfs".to_string(),
        ))
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::error::ProbeError;

    #[test]
    fn root_filesystem_has_capacity() {
        let usage = RootFilesystem::new().usage(Path::new("/")).unwrap();
        assert!(usage.total_bytes > 0);
        assert!(usage.free_bytes <= usage.total_bytes);
    }

    #[test]
    fn missing_path_is_an_io_error() {
        let err = RootFilesystem::new()
            .usage(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(matches!(err, ProbeError::Io(_)));
    }
}
