//! Pool of open archive handles.
//!
//! Archives that are in use live in the active map with a positive reference
//! count. When the last user releases an archive it moves to a bounded LRU
//! of idle handles, and is only closed when it falls off the end of that
//! LRU. An archive is never in both places at once.
use crate::archive_view::ArchiveSource;
use crate::catalog::{Catalog, ResourceRecord, ResourceSpan};
use crate::error::FsError;
use crate::locator::LocatorSlot;
use lru::LruCache;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Counters describing the pool's activity, mostly for tests and diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Native archive opens.
    pub archives_opened: usize,
    /// Native archive closes caused by eviction or purging.
    pub archives_closed: usize,
    /// Archive headers parsed (at most once per archive).
    pub headers_parsed: usize,
    /// Archives currently referenced by open files.
    pub active: usize,
    /// Archives kept open with no users.
    pub idle: usize,
}

#[derive(Debug)]
struct HandleEntry {
    source: Arc<ArchiveSource>,
    ref_count: usize,
    parsed: bool,
}

#[derive(Debug)]
pub(crate) struct HandlePool {
    base_dir: PathBuf,
    active: HashMap<String, HandleEntry>,
    idle: LruCache<String, HandleEntry>,
    /// Archives whose header could not be parsed, with the reason.
    failed: HashMap<String, String>,
    stats: PoolStats,
}

impl HandlePool {
    pub(crate) fn new(base_dir: PathBuf, capacity: NonZeroUsize) -> Self {
        Self {
            base_dir,
            active: HashMap::new(),
            idle: LruCache::new(capacity),
            failed: HashMap::new(),
            stats: PoolStats::default(),
        }
    }

    /// Takes a reference to `archive_path`, opening and parsing it if needed.
    ///
    /// On the first acquisition the archive header is parsed and every
    /// cataloged record of that archive gets its span. The returned source
    /// stays open until the matching [`release`](Self::release).
    pub(crate) fn acquire(
        &mut self,
        archive_path: &str,
        catalog: &Catalog,
    ) -> Result<Arc<ArchiveSource>, FsError> {
        if let Some(reason) = self.failed.get(archive_path) {
            return Err(FsError::InvalidArchive {
                path: archive_path.to_string(),
                reason: reason.clone(),
            });
        }

        if !self.active.contains_key(archive_path) {
            let entry = match self.idle.pop(archive_path) {
                Some(entry) => {
                    debug!("Reusing idle BIF file {archive_path}");
                    entry
                }
                None => self.open_entry(archive_path)?,
            };
            self.active.insert(archive_path.to_string(), entry);
        }

        let entry = self
            .active
            .get_mut(archive_path)
            .ok_or_else(|| FsError::NotAcquired(archive_path.to_string()))?;
        entry.ref_count += 1;
        let source = entry.source.clone();

        if !entry.parsed {
            match backfill(archive_path, &source, catalog) {
                Ok(()) => {
                    entry.parsed = true;
                    self.stats.headers_parsed += 1;
                }
                Err(reason) => {
                    // The first acquisition is the only one that can reach an
                    // unparsed entry, so nobody else holds it.
                    warn!("Error reading BIF file {archive_path}: {reason}");
                    self.active.remove(archive_path);
                    self.stats.archives_closed += 1;
                    self.failed.insert(archive_path.to_string(), reason.clone());
                    return Err(FsError::InvalidArchive {
                        path: archive_path.to_string(),
                        reason,
                    });
                }
            }
        }

        Ok(source)
    }

    /// Drops one reference to `archive_path`. The last release moves the
    /// handle to the idle LRU, which may close a colder idle handle.
    pub(crate) fn release(&mut self, archive_path: &str) -> Result<(), FsError> {
        let entry = self
            .active
            .get_mut(archive_path)
            .ok_or_else(|| FsError::NotAcquired(archive_path.to_string()))?;
        entry.ref_count -= 1;
        if entry.ref_count > 0 {
            return Ok(());
        }

        let (key, entry) = self
            .active
            .remove_entry(archive_path)
            .ok_or_else(|| FsError::NotAcquired(archive_path.to_string()))?;
        if let Some((evicted, _)) = self.idle.push(key, entry) {
            // `push` also hands back a replaced entry for the same key, which
            // cannot happen here since the archive was active.
            debug!("Closing idle BIF file {evicted}");
            self.stats.archives_closed += 1;
        }
        Ok(())
    }

    /// Closes every idle handle.
    pub(crate) fn close_idle(&mut self) {
        let closed = self.idle.len();
        self.idle.clear();
        self.stats.archives_closed += closed;
        debug!("Closed {closed} idle BIF files");
    }

    pub(crate) fn ref_count(&self, archive_path: &str) -> usize {
        self.active.get(archive_path).map_or(0, |entry| entry.ref_count)
    }

    pub(crate) fn is_idle(&self, archive_path: &str) -> bool {
        self.idle.contains(archive_path)
    }

    pub(crate) fn stats(&self) -> PoolStats {
        PoolStats {
            active: self.active.len(),
            idle: self.idle.len(),
            ..self.stats
        }
    }

    fn open_entry(&mut self, archive_path: &str) -> Result<HandleEntry, FsError> {
        let path = self.base_dir.join(archive_path);
        let source = ArchiveSource::open(&path).map_err(|err| {
            warn!("Can't open BIF file {archive_path}: {err}");
            FsError::from(err)
        })?;
        debug!(
            "Opened BIF file {archive_path} ({} bytes{})",
            source.len(),
            if source.is_inflated() { ", inflated" } else { "" }
        );
        self.stats.archives_opened += 1;
        Ok(HandleEntry {
            source: Arc::new(source),
            ref_count: 0,
            parsed: false,
        })
    }
}

/// Parses the archive header and fills in the span of every cataloged
/// record in it. Returns the parse failure as a message.
fn backfill(archive_path: &str, source: &ArchiveSource, catalog: &Catalog) -> Result<(), String> {
    let header = source.read_header().map_err(|err| err.to_string())?;
    debug!(
        "Parsed BIF file {archive_path}: {} files, {} tilesets",
        header.files.len(),
        header.tilesets.len()
    );
    let archive_len = source.len();

    for (index, entry) in header.files.iter().enumerate() {
        let Some(record) = catalog.record_at(archive_path, LocatorSlot::File(index as u32)) else {
            continue;
        };
        let expected = record.locator().file_index;
        if entry.locator.file_index() != expected {
            warn!(
                "File index mismatch in BIF file {archive_path}: expected {expected}, got {}",
                entry.locator.file_index()
            );
        }
        resolve(
            record,
            archive_path,
            archive_len,
            ResourceSpan {
                offset: entry.offset as u64,
                length: entry.size as u64,
            },
        );
    }

    // Tileset indices start at 1.
    for (index, entry) in header.tilesets.iter().enumerate() {
        let slot = LocatorSlot::Tileset(index as u32 + 1);
        let Some(record) = catalog.record_at(archive_path, slot) else {
            continue;
        };
        let expected = record.locator().tileset_index;
        if entry.locator.tileset_index() != expected {
            warn!(
                "Tileset index mismatch in BIF file {archive_path}: expected {expected}, got {}",
                entry.locator.tileset_index()
            );
        }
        resolve(
            record,
            archive_path,
            archive_len,
            ResourceSpan {
                offset: entry.offset as u64,
                length: entry.data_len(),
            },
        );
    }
    Ok(())
}

fn resolve(
    record: &ResourceRecord,
    archive_path: &str,
    archive_len: u64,
    span: ResourceSpan,
) {
    if span.offset.saturating_add(span.length) > archive_len {
        warn!(
            "{} extends past the end of BIF file {archive_path} ({} + {} > {archive_len})",
            record.full_name(),
            span.offset,
            span.length
        );
    }
    record.resolve(span);
}
