use crate::error::Result;
use crate::metadata::Metadata;
use bitflags::bitflags;
use std::time::SystemTime;

bitflags! {
    /// Flags accepted by [`Vfs::open_with`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct OpenFlags: u32 {
        const READ = 0x0001;
        const WRITE = 0x0002;
        const APPEND = 0x0004;
        const CREATE = 0x0008;
        const TRUNCATE = 0x0010;
    }
}

impl OpenFlags {
    /// Flags that would modify the filesystem.
    pub const MUTATING: Self = Self::WRITE
        .union(Self::APPEND)
        .union(Self::CREATE)
        .union(Self::TRUNCATE);

    pub fn is_read_only(self) -> bool {
        !self.intersects(Self::MUTATING)
    }
}

impl Default for OpenFlags {
    fn default() -> Self {
        OpenFlags::READ
    }
}

/// The conventional filesystem capability set.
///
/// Read-only implementations answer every mutating call with
/// [`FsError::PermissionDenied`](crate::FsError::PermissionDenied), so code
/// that only reads can take any implementation.
pub trait Vfs {
    /// What `open` hands back: a file or a directory.
    type Entry<'a>
    where
        Self: 'a;

    /// Name of this filesystem implementation.
    fn name(&self) -> &str;

    fn open(&self, name: &str) -> Result<Self::Entry<'_>>;

    fn open_with(&self, name: &str, flags: OpenFlags, mode: u32) -> Result<Self::Entry<'_>>;

    fn stat(&self, name: &str) -> Result<Metadata>;

    fn create(&self, name: &str) -> Result<Self::Entry<'_>>;

    fn mkdir(&self, name: &str, mode: u32) -> Result<()>;

    fn mkdir_all(&self, path: &str, mode: u32) -> Result<()>;

    fn remove(&self, name: &str) -> Result<()>;

    fn remove_all(&self, path: &str) -> Result<()>;

    fn rename(&self, from: &str, to: &str) -> Result<()>;

    fn chmod(&self, name: &str, mode: u32) -> Result<()>;

    fn chown(&self, name: &str, uid: u32, gid: u32) -> Result<()>;

    fn chtimes(&self, name: &str, accessed: SystemTime, modified: SystemTime) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_only_flags() {
        assert!(OpenFlags::READ.is_read_only());
        assert!(OpenFlags::empty().is_read_only());
        assert!(!(OpenFlags::READ | OpenFlags::APPEND).is_read_only());
        assert!(!OpenFlags::TRUNCATE.is_read_only());
    }
}
