//! The in-memory catalog of every resource listed in the KEY file.
//!
//! The catalog is built once and never changes shape. The only mutable part
//! of a record is its span, which is filled in the first time the owning
//! archive's header is parsed.
use crate::error::FsError;
use crate::filter::{accepts, Filter};
use crate::key_file::KeyFile;
use crate::locator::{EntryLocator, LocatorSlot};
use crate::metadata::{EntryKind, Metadata, READ_ONLY_MODE};
use crate::resource_type::ResourceType;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::OnceLock;
use std::time::SystemTime;
use tracing::{info, warn};

/// Byte range of a resource inside its archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSpan {
    pub offset: u64,
    pub length: u64,
}

/// Whether a record's location in its archive is known yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The owning archive has not been parsed.
    Unresolved,
    Resolved(ResourceSpan),
}

/// One resource in the catalog.
#[derive(Debug)]
pub struct ResourceRecord {
    full_name: String,
    resource_type: ResourceType,
    archive_path: String,
    locator: EntryLocator,
    modified: Option<SystemTime>,
    span: OnceLock<ResourceSpan>,
}

impl ResourceRecord {
    /// Name with extension, e.g. `ABAZIGAL.CRE`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Owning archive, relative to the KEY file's directory.
    pub fn archive_path(&self) -> &str {
        &self.archive_path
    }

    pub fn locator(&self) -> EntryLocator {
        self.locator
    }

    /// Modification time of the owning archive, if it could be read.
    pub fn modified(&self) -> Option<SystemTime> {
        self.modified
    }

    pub fn resolution(&self) -> Resolution {
        match self.span.get() {
            Some(span) => Resolution::Resolved(*span),
            None => Resolution::Unresolved,
        }
    }

    pub fn span(&self) -> Option<ResourceSpan> {
        self.span.get().copied()
    }

    /// Records the span read from the archive header. A record resolves
    /// once; later calls keep the first value.
    pub(crate) fn resolve(&self, span: ResourceSpan) {
        let _ = self.span.set(span);
    }

    pub fn metadata(&self) -> Metadata {
        Metadata {
            name: self.full_name.clone(),
            kind: EntryKind::File,
            size: self.span().map(|span| span.length),
            mode: READ_ONLY_MODE,
            modified: self.modified,
        }
    }
}

/// A synthetic directory holding every resource of one type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectoryRecord {
    resource_type: ResourceType,
    name: String,
    count: usize,
}

impl DirectoryRecord {
    /// The type's extension, e.g. `DLG`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn resource_type(&self) -> ResourceType {
        self.resource_type
    }

    /// Number of resources of this type in the catalog.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn metadata(&self) -> Metadata {
        Metadata {
            name: self.name.clone(),
            kind: EntryKind::Directory,
            size: Some(self.count as u64),
            mode: READ_ONLY_MODE,
            modified: None,
        }
    }
}

/// Filters applied while building the catalog. Every filter that is set
/// must accept a resource for it to be cataloged.
#[derive(Debug, Clone, Default)]
pub struct CatalogFilters {
    /// Allowed types; empty allows every type.
    pub types: Vec<ResourceType>,
    /// Matched against the owning archive's path.
    pub archive: Option<Filter>,
    /// Matched against the resource's full name.
    pub name: Option<Filter>,
}

#[derive(Debug, Default)]
pub(crate) struct Catalog {
    records: Vec<ResourceRecord>,
    /// Lower-case full name to record.
    by_name: HashMap<String, usize>,
    by_type: BTreeMap<ResourceType, Vec<usize>>,
    /// Archive path, then header slot, to record. Used to backfill spans.
    by_archive: HashMap<String, HashMap<LocatorSlot, usize>>,
    /// Upper-case directory name to directory.
    dirs: HashMap<String, DirectoryRecord>,
}

impl Catalog {
    /// Builds the catalog from a parsed KEY file in a single pass.
    ///
    /// `base_dir` is the KEY file's directory; archive paths are relative to it.
    pub(crate) fn build(
        key: &KeyFile,
        base_dir: &Path,
        filters: &CatalogFilters,
    ) -> Result<Self, FsError> {
        let mut catalog = Catalog::default();
        let mut archive_matches: HashMap<&str, bool> = HashMap::new();
        let mut archive_times: HashMap<&str, Option<SystemTime>> = HashMap::new();

        for resource in &key.resources {
            let resource_type = resource.resource_type;
            if !filters.types.is_empty() && !filters.types.contains(&resource_type) {
                continue;
            }

            let archive = key.archive_for(resource)?;
            let archive_path = archive.path.as_str();

            // Decided once per archive so skipped archives are never stat'ed.
            let matched = *archive_matches
                .entry(archive_path)
                .or_insert_with(|| accepts(filters.archive.as_ref(), archive_path));
            if !matched {
                continue;
            }

            let modified = *archive_times
                .entry(archive_path)
                .or_insert_with(|| archive_mod_time(base_dir, archive_path));

            let full_name = format!("{}.{}", resource.name, resource_type);
            if !accepts(filters.name.as_ref(), &full_name) {
                continue;
            }

            catalog.insert(ResourceRecord {
                full_name,
                resource_type,
                archive_path: archive_path.to_string(),
                locator: EntryLocator::new(resource.locator, resource_type.is_tileset()),
                modified,
                span: OnceLock::new(),
            });
        }

        catalog.derive_directories();
        info!(
            "Cataloged {} resources of {} types from {} archives",
            catalog.records.len(),
            catalog.dirs.len(),
            catalog.by_archive.len()
        );
        Ok(catalog)
    }

    fn insert(&mut self, record: ResourceRecord) {
        let key = record.full_name.to_lowercase();
        let slot = record.locator.slot();

        let index = match self.by_name.get(&key) {
            Some(&existing) => {
                // Later KEY entries override earlier ones with the same name.
                let old = &self.records[existing];
                warn!(
                    "Duplicate resource {} in {} overrides the entry in {}",
                    record.full_name, record.archive_path, old.archive_path
                );
                if let Some(slots) = self.by_archive.get_mut(&old.archive_path) {
                    slots.remove(&old.locator.slot());
                }
                self.records[existing] = record;
                existing
            }
            None => {
                let index = self.records.len();
                self.by_type
                    .entry(record.resource_type)
                    .or_default()
                    .push(index);
                self.records.push(record);
                self.by_name.insert(key, index);
                index
            }
        };

        let record = &self.records[index];
        self.by_archive
            .entry(record.archive_path.clone())
            .or_default()
            .insert(slot, index);
    }

    fn derive_directories(&mut self) {
        for (resource_type, records) in &self.by_type {
            let name = resource_type.name().into_owned();
            self.dirs.insert(
                name.to_ascii_uppercase(),
                DirectoryRecord {
                    resource_type: *resource_type,
                    name,
                    count: records.len(),
                },
            );
        }
    }

    pub(crate) fn record(&self, name: &str) -> Option<&ResourceRecord> {
        self.by_name
            .get(&name.to_lowercase())
            .map(|&index| &self.records[index])
    }

    pub(crate) fn directory(&self, name: &str) -> Option<&DirectoryRecord> {
        self.dirs.get(&name.to_ascii_uppercase())
    }

    pub(crate) fn directories(&self) -> impl Iterator<Item = &DirectoryRecord> {
        self.dirs.values()
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &ResourceRecord> {
        self.records.iter()
    }

    /// All records of one type, in catalog order.
    pub(crate) fn records_of_type(
        &self,
        resource_type: ResourceType,
    ) -> impl Iterator<Item = &ResourceRecord> {
        self.by_type
            .get(&resource_type)
            .into_iter()
            .flatten()
            .map(|&index| &self.records[index])
    }

    /// The record occupying `slot` in `archive_path`'s header tables.
    pub(crate) fn record_at(
        &self,
        archive_path: &str,
        slot: LocatorSlot,
    ) -> Option<&ResourceRecord> {
        self.by_archive
            .get(archive_path)
            .and_then(|slots| slots.get(&slot))
            .map(|&index| &self.records[index])
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }
}

fn archive_mod_time(base_dir: &Path, archive_path: &str) -> Option<SystemTime> {
    match base_dir.join(archive_path).metadata().and_then(|m| m.modified()) {
        Ok(time) => Some(time),
        Err(err) => {
            warn!("Error stating BIF file {archive_path}: {err}");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key_file::{KeyArchiveEntry, KeyResourceEntry};
    use crate::locator::ResourceLocator;

    fn key() -> KeyFile {
        let archive = |path: &str| KeyArchiveEntry {
            file_size: 0,
            path: path.to_string(),
            location: 1,
        };
        let resource = |name: &str, ty: ResourceType, locator: ResourceLocator| KeyResourceEntry {
            name: name.to_string(),
            resource_type: ty,
            locator,
        };
        KeyFile {
            archives: vec![archive("data/A.bif"), archive("data/B.bif")],
            resources: vec![
                resource("FOO", ResourceType::ITM, ResourceLocator::new(0, 0, 0)),
                resource("BAR", ResourceType::CRE, ResourceLocator::new(1, 0, 0)),
                resource("ZED", ResourceType::DLG, ResourceLocator::new(1, 0, 1)),
                resource("ABC", ResourceType::DLG, ResourceLocator::new(0, 0, 1)),
                resource("AR0100", ResourceType::TIS, ResourceLocator::new(1, 1, 0)),
            ],
        }
    }

    fn names(catalog: &Catalog) -> Vec<&str> {
        let mut names: Vec<&str> = catalog.records().map(|r| r.full_name()).collect();
        names.sort();
        names
    }

    #[test]
    fn indexes_every_resource() {
        let catalog = Catalog::build(&key(), Path::new("."), &CatalogFilters::default()).unwrap();

        assert_eq!(catalog.len(), 5);
        assert_eq!(catalog.record("foo.itm").unwrap().archive_path(), "data/A.bif");
        assert_eq!(catalog.directory("dlg").unwrap().count(), 2);
        assert_eq!(
            catalog.record_at("data/B.bif", LocatorSlot::Tileset(1)).unwrap().full_name(),
            "AR0100.TIS"
        );
        assert_eq!(
            catalog.record_at("data/A.bif", LocatorSlot::File(1)).unwrap().full_name(),
            "ABC.DLG"
        );
        assert!(catalog
            .records()
            .all(|r| r.resolution() == Resolution::Unresolved));
    }

    #[test]
    fn filters_intersect() {
        let filters = CatalogFilters {
            types: vec![ResourceType::DLG, ResourceType::CRE],
            archive: Filter::archive("b").unwrap(),
            name: None,
        };
        let catalog = Catalog::build(&key(), Path::new("."), &filters).unwrap();
        assert_eq!(names(&catalog), vec!["BAR.CRE", "ZED.DLG"]);
        assert!(catalog.directory("TIS").is_none());

        let filters = CatalogFilters {
            name: Filter::resource("*.dlg").unwrap(),
            ..filters
        };
        let catalog = Catalog::build(&key(), Path::new("."), &filters).unwrap();
        assert_eq!(names(&catalog), vec!["ZED.DLG"]);
    }

    #[test]
    fn dangling_archive_aborts_build() {
        let mut key = key();
        key.resources.push(KeyResourceEntry {
            name: "LOST".to_string(),
            resource_type: ResourceType::ITM,
            locator: ResourceLocator::new(9, 0, 0),
        });
        let err = Catalog::build(&key, Path::new("."), &CatalogFilters::default()).unwrap_err();
        assert!(matches!(err, FsError::MissingArchive { index: 9, .. }));
    }

    #[test]
    fn later_duplicate_overrides_earlier_entry() {
        let mut key = key();
        key.resources.push(KeyResourceEntry {
            name: "foo".to_string(),
            resource_type: ResourceType::ITM,
            locator: ResourceLocator::new(1, 0, 5),
        });
        let catalog = Catalog::build(&key, Path::new("."), &CatalogFilters::default()).unwrap();

        assert_eq!(catalog.len(), 5);
        let foo = catalog.record("FOO.ITM").unwrap();
        assert_eq!(foo.full_name(), "foo.ITM");
        assert_eq!(foo.archive_path(), "data/B.bif");
        assert_eq!(catalog.records_of_type(ResourceType::ITM).count(), 1);
        assert_eq!(catalog.directory("ITM").unwrap().count(), 1);

        // The stale slot no longer resolves to anything.
        assert!(catalog.record_at("data/A.bif", LocatorSlot::File(0)).is_none());
        assert_eq!(
            catalog
                .record_at("data/B.bif", LocatorSlot::File(5))
                .unwrap()
                .full_name(),
            "foo.ITM"
        );
    }

    #[test]
    fn resolution_is_set_once() {
        let catalog = Catalog::build(&key(), Path::new("."), &CatalogFilters::default()).unwrap();
        let record = catalog.record("FOO.ITM").unwrap();
        record.resolve(ResourceSpan {
            offset: 4096,
            length: 120,
        });
        record.resolve(ResourceSpan {
            offset: 1,
            length: 1,
        });
        assert_eq!(record.metadata().size, Some(120));
        assert_eq!(record.span().unwrap().offset, 4096);
    }
}
