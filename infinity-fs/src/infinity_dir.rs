use crate::catalog::{Catalog, DirectoryRecord, ResourceRecord};
use crate::error::{FsError, Result};
use crate::metadata::Metadata;
use crate::resource_type::ResourceType;

/// A synthetic directory listing every resource of one type.
///
/// Listing is a catalog query: no archive is opened, and entries are sorted
/// by name.
#[derive(Debug, Clone)]
pub struct InfinityDir<'fs> {
    catalog: &'fs Catalog,
    record: &'fs DirectoryRecord,
}

impl<'fs> InfinityDir<'fs> {
    pub(crate) fn new(catalog: &'fs Catalog, record: &'fs DirectoryRecord) -> Self {
        Self { catalog, record }
    }

    /// The type extension, e.g. `DLG`.
    pub fn name(&self) -> &'fs str {
        self.record.name()
    }

    pub fn resource_type(&self) -> ResourceType {
        self.record.resource_type()
    }

    pub fn metadata(&self) -> Metadata {
        self.record.metadata()
    }

    /// Sorted resource names, truncated to `limit` if given.
    pub fn read_dir_names(&self, limit: Option<usize>) -> Vec<String> {
        self.sorted_records(limit)
            .into_iter()
            .map(|record| record.full_name().to_string())
            .collect()
    }

    /// Sorted resource metadata, truncated to `limit` if given.
    ///
    /// Sizes are `None` for resources whose archive has not been opened yet.
    pub fn read_dir(&self, limit: Option<usize>) -> Vec<Metadata> {
        self.sorted_records(limit)
            .into_iter()
            .map(ResourceRecord::metadata)
            .collect()
    }

    pub fn write(&self, _buf: &[u8]) -> Result<usize> {
        Err(FsError::PermissionDenied("write"))
    }

    pub fn set_len(&self, _size: u64) -> Result<()> {
        Err(FsError::PermissionDenied("truncate"))
    }

    pub fn set_permissions(&self, _mode: u32) -> Result<()> {
        Err(FsError::PermissionDenied("chmod"))
    }

    pub fn sync_all(&self) -> Result<()> {
        Ok(())
    }

    /// Directories hold no native resources; closing just drops the view.
    pub fn close(self) {}

    fn sorted_records(&self, limit: Option<usize>) -> Vec<&'fs ResourceRecord> {
        let mut records: Vec<&ResourceRecord> = self
            .catalog
            .records_of_type(self.record.resource_type())
            .collect();
        records.sort_by(|a, b| a.full_name().cmp(b.full_name()));
        if let Some(limit) = limit {
            records.truncate(limit);
        }
        records
    }
}
