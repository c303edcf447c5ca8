use crate::archive_view::ArchiveView;
use crate::catalog::ResourceRecord;
use crate::error::{FsError, Result};
use crate::infinity_fs::InfinityFs;
use crate::metadata::Metadata;
use std::io::{self, Read, Seek, SeekFrom, Write};
use tracing::warn;

/// An open resource.
///
/// Reads see exactly the resource's bytes. The owning archive stays open
/// until the file is closed, either explicitly with [`close`](Self::close)
/// or by dropping it.
///
/// Every mutating operation fails with [`FsError::PermissionDenied`].
#[derive(Debug)]
pub struct InfinityFile<'fs> {
    fs: &'fs InfinityFs,
    record: &'fs ResourceRecord,
    view: Option<ArchiveView>,
}

impl<'fs> InfinityFile<'fs> {
    pub(crate) fn new(fs: &'fs InfinityFs, record: &'fs ResourceRecord, view: ArchiveView) -> Self {
        Self {
            fs,
            record,
            view: Some(view),
        }
    }

    /// Full resource name, e.g. `ABAZIGAL.CRE`.
    pub fn name(&self) -> &'fs str {
        self.record.full_name()
    }

    pub fn record(&self) -> &'fs ResourceRecord {
        self.record
    }

    pub fn metadata(&self) -> Metadata {
        self.record.metadata()
    }

    /// Size of the resource in bytes.
    pub fn len(&self) -> u64 {
        self.view.as_ref().map_or(0, ArchiveView::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.view.is_none()
    }

    /// Reads at `offset` from the start of the resource without moving
    /// the cursor.
    pub fn read_at(&self, buf: &mut [u8], offset: u64) -> Result<usize> {
        let view = self.view.as_ref().ok_or_else(|| self.closed())?;
        Ok(view.read_at(buf, offset)?)
    }

    /// Releases the owning archive. Closing twice is an error.
    pub fn close(&mut self) -> Result<()> {
        match self.view.take() {
            Some(_) => self.fs.release(self.record.archive_path()),
            None => Err(self.closed()),
        }
    }

    pub fn write_at(&self, _buf: &[u8], _offset: u64) -> Result<usize> {
        Err(FsError::PermissionDenied("write"))
    }

    pub fn set_len(&mut self, _size: u64) -> Result<()> {
        Err(FsError::PermissionDenied("truncate"))
    }

    pub fn set_permissions(&self, _mode: u32) -> Result<()> {
        Err(FsError::PermissionDenied("chmod"))
    }

    /// Nothing is ever buffered for writing.
    pub fn sync_all(&self) -> Result<()> {
        Ok(())
    }

    fn view_mut(&mut self) -> Result<&mut ArchiveView> {
        let record = self.record;
        self.view
            .as_mut()
            .ok_or_else(|| FsError::Closed(record.full_name().to_string()))
    }

    fn closed(&self) -> FsError {
        FsError::Closed(self.record.full_name().to_string())
    }
}

impl Read for InfinityFile<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.view_mut()?.read(buf)
    }
}

impl Seek for InfinityFile<'_> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.view_mut()?.seek(pos)
    }
}

impl Write for InfinityFile<'_> {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(FsError::PermissionDenied("write").into())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for InfinityFile<'_> {
    fn drop(&mut self) {
        if self.view.is_some() {
            if let Err(err) = self.close() {
                warn!("Error releasing {}: {err}", self.record.full_name());
            }
        }
    }
}
