use crate::bif::{compressed, BifArchive, BifKind};
use crate::catalog::ResourceSpan;
use crate::ext::io_ext::FixedStringReadExt;
use parking_lot::Mutex;
use std::fs::File;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

/// The bytes behind one open archive.
///
/// Plain archives are read straight from the native handle. Compressed
/// archives are inflated once when opened and served from memory.
#[derive(Debug)]
pub(crate) enum ArchiveSource {
    Disk { file: Mutex<File>, len: u64 },
    Inflated(Vec<u8>),
}

impl ArchiveSource {
    /// Opens the archive at `path`, inflating it if it is compressed.
    pub(crate) fn open(path: &Path) -> io::Result<Self> {
        let mut file = File::open(path)?;
        let len = file.metadata()?.len();
        let signature = file.read_signature()?;
        match BifKind::from_signature(&signature)? {
            BifKind::Plain => Ok(ArchiveSource::Disk {
                file: Mutex::new(file),
                len,
            }),
            BifKind::BlockCompressed | BifKind::StreamCompressed => {
                let mut reader = io::BufReader::new(file);
                Ok(ArchiveSource::Inflated(compressed::inflate(&mut reader)?))
            }
        }
    }

    /// Total length of the (inflated) archive.
    pub(crate) fn len(&self) -> u64 {
        match self {
            ArchiveSource::Disk { len, .. } => *len,
            ArchiveSource::Inflated(image) => image.len() as u64,
        }
    }

    pub(crate) fn is_inflated(&self) -> bool {
        matches!(self, ArchiveSource::Inflated(_))
    }

    /// Parses the archive's header tables.
    pub(crate) fn read_header(&self) -> io::Result<BifArchive> {
        match self {
            ArchiveSource::Disk { file, .. } => {
                let mut file = file.lock();
                BifArchive::read(&mut io::BufReader::new(&mut *file))
            }
            ArchiveSource::Inflated(image) => BifArchive::read(&mut Cursor::new(image)),
        }
    }

    /// Reads at an absolute archive offset without any shared cursor.
    pub(crate) fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        match self {
            ArchiveSource::Disk { file, .. } => {
                let mut file = file.lock();
                file.seek(SeekFrom::Start(offset))?;
                file.read(buf)
            }
            ArchiveSource::Inflated(image) => {
                let start = usize::try_from(offset)
                    .unwrap_or(usize::MAX)
                    .min(image.len());
                let n = buf.len().min(image.len() - start);
                buf[..n].copy_from_slice(&image[start..start + n]);
                Ok(n)
            }
        }
    }
}

/// A bounded, independently positioned view of one resource's bytes.
///
/// Only `span` is visible; the surrounding archive bytes are not. Every view
/// has its own cursor, so several views over one archive can be read in
/// any interleaving.
#[derive(Debug)]
pub(crate) struct ArchiveView {
    source: Arc<ArchiveSource>,
    start: u64,
    len: u64,
    position: u64,
}

impl ArchiveView {
    pub(crate) fn new(source: Arc<ArchiveSource>, span: ResourceSpan) -> Self {
        Self {
            source,
            start: span.offset,
            len: span.length,
            position: 0,
        }
    }

    pub(crate) fn len(&self) -> u64 {
        self.len
    }

    /// Reads at `offset` relative to the start of the resource. Does not
    /// move the cursor.
    pub(crate) fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        if offset >= self.len {
            return Ok(0);
        }
        let available = (self.len - offset).min(buf.len() as u64) as usize;
        let mut filled = 0;
        while filled < available {
            let n = self
                .source
                .read_at(&mut buf[filled..available], self.start + offset + filled as u64)?;
            if n == 0 {
                break;
            }
            filled += n;
        }
        Ok(filled)
    }
}

impl Read for ArchiveView {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.read_at(buf, self.position)?;
        self.position += n as u64;
        Ok(n)
    }
}

impl Seek for ArchiveView {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(offset) => Some(offset),
            SeekFrom::Current(offset) => self.position.checked_add_signed(offset),
            SeekFrom::End(offset) => self.len.checked_add_signed(offset),
        };
        match target {
            Some(position) => {
                self.position = position;
                Ok(position)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "Invalid seek to a negative position",
            )),
        }
    }
}
