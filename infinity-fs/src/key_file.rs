//! Reader for the KEY index file, which lists every BIF archive and every
//! resource stored in them.
//!
//! The KEY file is read once when the filesystem is built. Only the two
//! entry tables are kept; resource data is never touched here.
use crate::error::FsError;
use crate::ext::io_ext::{invalid_data, FixedStringReadExt, SeekExt};
use crate::locator::ResourceLocator;
use crate::resource_type::ResourceType;
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

const KEY_SIGNATURE: &[u8; 8] = b"KEY V1  ";

/// Length of the NUL-padded resource name in a resource entry.
const RESOURCE_NAME_LENGTH: usize = 8;

/// Upper bound on entries preallocated from a header count; the counts are
/// not trusted until the tables have actually been read.
const MAX_PREALLOCATED_ENTRIES: u32 = 0x4000;

/// A parsed KEY file.
#[derive(Debug, Default)]
pub struct KeyFile {
    /// Archives in KEY order; a locator's archive index points into this list.
    pub archives: Vec<KeyArchiveEntry>,
    /// Resource entries in KEY order.
    pub resources: Vec<KeyResourceEntry>,
}

/// One archive listed in the KEY file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyArchiveEntry {
    /// Size of the archive on disk, as recorded in the KEY.
    pub file_size: u32,
    /// Path relative to the KEY file's directory, with `/` separators.
    pub path: String,
    /// Install location flags (hard disk / CD bits). Informational only.
    pub location: u16,
}

/// One resource listed in the KEY file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyResourceEntry {
    /// Resource name without extension, e.g. `ABAZIGAL`.
    pub name: String,
    pub resource_type: ResourceType,
    pub locator: ResourceLocator,
}

impl KeyFile {
    /// Opens and parses the KEY file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FsError> {
        let path = path.as_ref();
        let wrap = |source: io::Error| FsError::InvalidKey {
            path: path.display().to_string(),
            source,
        };
        let file = File::open(path).map_err(wrap)?;
        Self::read(&mut BufReader::new(file)).map_err(wrap)
    }

    /// Parses a KEY file from any seekable reader.
    pub fn read<R: Read + Seek>(reader: &mut R) -> io::Result<Self> {
        let signature = reader.read_signature()?;
        if &signature != KEY_SIGNATURE {
            return Err(invalid_data(format!(
                "Invalid KEY signature {:?}",
                String::from_utf8_lossy(&signature)
            )));
        }

        let archive_count = reader.read_u32::<LittleEndian>()?;
        let resource_count = reader.read_u32::<LittleEndian>()?;
        let archive_table_offset = reader.read_u32::<LittleEndian>()?;
        let resource_table_offset = reader.read_u32::<LittleEndian>()?;

        reader.seek(SeekFrom::Start(archive_table_offset as u64))?;
        let mut archives =
            Vec::with_capacity(archive_count.min(MAX_PREALLOCATED_ENTRIES) as usize);
        for _ in 0..archive_count {
            let file_size = reader.read_u32::<LittleEndian>()?;
            let name_offset = reader.read_u32::<LittleEndian>()?;
            let name_length = reader.read_u16::<LittleEndian>()?;
            let location = reader.read_u16::<LittleEndian>()?;

            let raw = reader.read_string_at(name_offset as u64, name_length as usize)?;
            archives.push(KeyArchiveEntry {
                file_size,
                path: normalize_archive_path(&raw),
                location,
            });
        }

        reader.seek(SeekFrom::Start(resource_table_offset as u64))?;
        let mut resources =
            Vec::with_capacity(resource_count.min(MAX_PREALLOCATED_ENTRIES) as usize);
        for _ in 0..resource_count {
            let name = reader.read_fixed_string(RESOURCE_NAME_LENGTH)?;
            let resource_type = ResourceType(reader.read_u16::<LittleEndian>()?);
            let locator = ResourceLocator(reader.read_u32::<LittleEndian>()?);
            resources.push(KeyResourceEntry {
                name,
                resource_type,
                locator,
            });
        }

        Ok(KeyFile {
            archives,
            resources,
        })
    }

    /// Resolves the archive that owns `resource`.
    ///
    /// The KEY format guarantees every locator points at a listed archive, so
    /// a miss here means the archive set is corrupt.
    pub fn archive_for(&self, resource: &KeyResourceEntry) -> Result<&KeyArchiveEntry, FsError> {
        let index = resource.locator.archive_index();
        self.archives
            .get(index as usize)
            .ok_or_else(|| FsError::MissingArchive {
                resource: format!("{}.{}", resource.name, resource.resource_type),
                index,
            })
    }
}

/// KEY files store DOS-style paths (`data\AREA000A.bif`); the catalog keys
/// archives by forward-slash relative paths.
fn normalize_archive_path(raw: &str) -> String {
    raw.replace('\\', "/").trim_start_matches('/').to_string()
}
