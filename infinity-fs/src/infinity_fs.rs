use crate::archive_view::ArchiveView;
use crate::catalog::{Catalog, DirectoryRecord, Resolution, ResourceRecord};
use crate::error::{FsError, Result};
use crate::handle_pool::{HandlePool, PoolStats};
use crate::infinity_dir::InfinityDir;
use crate::infinity_file::InfinityFile;
use crate::key_file::KeyFile;
use crate::metadata::Metadata;
use crate::options::FsOptions;
use crate::resource_type::ResourceType;
use crate::vfs::{OpenFlags, Vfs};
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// A read-only filesystem over an Infinity Engine KEY file and its BIF
/// archives.
///
/// Every resource is a file named `NAME.EXT`; every resource type present is
/// a directory named after its extension. Names are case-insensitive.
///
/// # Usage
///
/// ```rust,no_run
/// use infinity_fs::{FsEntry, FsOptions, InfinityFs, Vfs};
/// use std::io::Read;
///
/// let fs = InfinityFs::new("path/to/chitin.key", FsOptions::default()).unwrap();
///
/// // List all dialogs
/// if let FsEntry::Dir(dir) = fs.open("DLG").unwrap() {
///     for name in dir.read_dir_names(None) {
///         println!("{name}");
///     }
/// }
///
/// // Read one resource
/// let mut file = fs.open("ABAZIGAL.CRE").unwrap().into_file().unwrap();
/// let mut bytes = Vec::new();
/// file.read_to_end(&mut bytes).unwrap();
/// ```
///
/// # Archive handles
///
/// BIF archives are opened and parsed on first use. An archive stays open
/// while any file from it is open, then sits in a bounded idle cache (see
/// [`FsOptions::with_cache_capacity`]) until it is evicted.
///
/// # Thread Safety
///
/// `InfinityFs` is `Send + Sync`. Handle bookkeeping sits behind a single
/// mutex; reads from different files do not share a cursor.
#[derive(Debug)]
pub struct InfinityFs {
    key_path: PathBuf,
    catalog: Catalog,
    pool: Mutex<HandlePool>,
}

/// What `open` returns: a resource or a type directory.
#[derive(Debug)]
pub enum FsEntry<'fs> {
    File(InfinityFile<'fs>),
    Dir(InfinityDir<'fs>),
}

impl<'fs> FsEntry<'fs> {
    pub fn name(&self) -> &'fs str {
        match self {
            FsEntry::File(file) => file.name(),
            FsEntry::Dir(dir) => dir.name(),
        }
    }

    pub fn metadata(&self) -> Metadata {
        match self {
            FsEntry::File(file) => file.metadata(),
            FsEntry::Dir(dir) => dir.metadata(),
        }
    }

    pub fn is_dir(&self) -> bool {
        matches!(self, FsEntry::Dir(_))
    }

    pub fn into_file(self) -> Option<InfinityFile<'fs>> {
        match self {
            FsEntry::File(file) => Some(file),
            FsEntry::Dir(_) => None,
        }
    }

    pub fn into_dir(self) -> Option<InfinityDir<'fs>> {
        match self {
            FsEntry::File(_) => None,
            FsEntry::Dir(dir) => Some(dir),
        }
    }

    pub fn close(self) -> Result<()> {
        match self {
            FsEntry::File(mut file) => file.close(),
            FsEntry::Dir(dir) => {
                dir.close();
                Ok(())
            }
        }
    }
}

/// Where an archive currently sits in the handle pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveState {
    /// Not open.
    Closed,
    /// Open with this many users.
    Active(usize),
    /// Open with no users, waiting in the idle cache.
    Idle,
}

impl InfinityFs {
    /// Reads the KEY file at `key_path` and builds the catalog.
    ///
    /// Archives are not opened here, only stat'ed for their modification
    /// time. A malformed KEY file or a resource pointing at an archive the
    /// KEY does not list is an error.
    pub fn new<P: AsRef<Path>>(key_path: P, options: FsOptions) -> Result<Self> {
        let key_path = key_path.as_ref().to_path_buf();
        let base_dir = key_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let capacity =
            NonZeroUsize::new(options.cache_capacity()).ok_or(FsError::InvalidCapacity)?;

        let key = KeyFile::open(&key_path)?;
        debug!(
            "Read KEY file {}: {} archives, {} resources",
            key_path.display(),
            key.archives.len(),
            key.resources.len()
        );
        let catalog = Catalog::build(&key, &base_dir, options.filters())?;

        Ok(InfinityFs {
            key_path,
            catalog,
            pool: Mutex::new(HandlePool::new(base_dir, capacity)),
        })
    }

    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Looks up a resource record by name, ignoring case.
    pub fn record(&self, name: &str) -> Option<&ResourceRecord> {
        self.catalog.record(name)
    }

    /// The archive a resource is stored in, relative to the KEY file.
    pub fn archive_path_of(&self, name: &str) -> Result<&str> {
        self.catalog
            .record(name)
            .map(ResourceRecord::archive_path)
            .ok_or_else(|| FsError::NotFound(name.to_string()))
    }

    /// Every cataloged resource, in KEY order.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.catalog.records()
    }

    pub fn resources_of_type(
        &self,
        resource_type: ResourceType,
    ) -> impl Iterator<Item = &ResourceRecord> {
        self.catalog.records_of_type(resource_type)
    }

    /// One directory per resource type present in the catalog.
    pub fn directories(&self) -> impl Iterator<Item = &DirectoryRecord> {
        self.catalog.directories()
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.len() == 0
    }

    pub fn stats(&self) -> PoolStats {
        self.pool.lock().stats()
    }

    pub fn archive_state(&self, archive_path: &str) -> ArchiveState {
        let pool = self.pool.lock();
        match pool.ref_count(archive_path) {
            0 if pool.is_idle(archive_path) => ArchiveState::Idle,
            0 => ArchiveState::Closed,
            n => ArchiveState::Active(n),
        }
    }

    /// Closes every archive that no open file is using.
    pub fn close_idle(&self) {
        self.pool.lock().close_idle();
    }

    pub(crate) fn release(&self, archive_path: &str) -> Result<()> {
        self.pool.lock().release(archive_path)
    }

    fn open_resource(&self, name: &str) -> Result<InfinityFile<'_>> {
        let record = self
            .catalog
            .record(name)
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;
        let archive_path = record.archive_path();

        let source = self.pool.lock().acquire(archive_path, &self.catalog)?;
        match record.resolution() {
            Resolution::Resolved(span) => Ok(InfinityFile::new(
                self,
                record,
                ArchiveView::new(source, span),
            )),
            Resolution::Unresolved => {
                drop(source);
                self.release(archive_path)?;
                Err(FsError::Unresolved(name.to_string()))
            }
        }
    }

    fn stat_resource(&self, name: &str) -> Result<Metadata> {
        let record = self
            .catalog
            .record(name)
            .ok_or_else(|| FsError::NotFound(name.to_string()))?;

        if record.resolution() == Resolution::Unresolved {
            // Open and release the archive just to parse its header.
            let mut pool = self.pool.lock();
            pool.acquire(record.archive_path(), &self.catalog)?;
            pool.release(record.archive_path())?;
        }

        match record.resolution() {
            Resolution::Resolved(_) => Ok(record.metadata()),
            Resolution::Unresolved => Err(FsError::Unresolved(name.to_string())),
        }
    }

    /// A bare type extension names a directory; anything else is a resource.
    fn directory_for(&self, name: &str) -> Option<Result<&DirectoryRecord>> {
        if let Some(dir) = self.catalog.directory(name) {
            return Some(Ok(dir));
        }
        ResourceType::from_extension(name).map(|_| Err(FsError::NotFound(name.to_string())))
    }
}

impl Vfs for InfinityFs {
    type Entry<'a> = FsEntry<'a>;

    fn name(&self) -> &str {
        "InfinityFs"
    }

    fn open(&self, name: &str) -> Result<FsEntry<'_>> {
        match self.directory_for(name) {
            Some(dir) => Ok(FsEntry::Dir(InfinityDir::new(&self.catalog, dir?))),
            None => self.open_resource(name).map(FsEntry::File),
        }
    }

    fn open_with(&self, name: &str, flags: OpenFlags, mode: u32) -> Result<FsEntry<'_>> {
        if !flags.is_read_only() || mode & 0o222 != 0 {
            return Err(FsError::PermissionDenied("open for writing"));
        }
        self.open(name)
    }

    fn stat(&self, name: &str) -> Result<Metadata> {
        match self.directory_for(name) {
            Some(dir) => Ok(dir?.metadata()),
            None => self.stat_resource(name),
        }
    }

    fn create(&self, _name: &str) -> Result<FsEntry<'_>> {
        Err(FsError::PermissionDenied("create"))
    }

    fn mkdir(&self, _name: &str, _mode: u32) -> Result<()> {
        Err(FsError::PermissionDenied("mkdir"))
    }

    fn mkdir_all(&self, _path: &str, _mode: u32) -> Result<()> {
        Err(FsError::PermissionDenied("mkdir"))
    }

    fn remove(&self, _name: &str) -> Result<()> {
        Err(FsError::PermissionDenied("remove"))
    }

    fn remove_all(&self, _path: &str) -> Result<()> {
        Err(FsError::PermissionDenied("remove"))
    }

    fn rename(&self, _from: &str, _to: &str) -> Result<()> {
        Err(FsError::PermissionDenied("rename"))
    }

    fn chmod(&self, _name: &str, _mode: u32) -> Result<()> {
        Err(FsError::PermissionDenied("chmod"))
    }

    fn chown(&self, _name: &str, _uid: u32, _gid: u32) -> Result<()> {
        Err(FsError::PermissionDenied("chown"))
    }

    fn chtimes(&self, _name: &str, _accessed: SystemTime, _modified: SystemTime) -> Result<()> {
        Err(FsError::PermissionDenied("chtimes"))
    }
}
