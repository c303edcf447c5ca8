use std::time::SystemTime;

/// Permission bits reported for every entry: read-only for everyone.
pub const READ_ONLY_MODE: u32 = 0o444;

/// Whether a [`Metadata`] describes a resource or a synthetic directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Directory,
}

/// Information about a file or directory, as returned by `stat`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Resource name with extension, or the directory's type extension.
    pub name: String,
    pub kind: EntryKind,
    /// Length in bytes for files; number of entries for directories.
    /// `None` while the owning archive has not been parsed.
    pub size: Option<u64>,
    pub mode: u32,
    pub modified: Option<SystemTime>,
}

impl Metadata {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_dir(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    pub fn len(&self) -> Option<u64> {
        self.size
    }

    pub fn is_read_only(&self) -> bool {
        self.mode & 0o222 == 0
    }
}
