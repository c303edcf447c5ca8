//! BIF archive headers.
//!
//! A BIF packs resources back to back behind a header with two tables: one
//! for ordinary files and one for tilesets. Only the header is read here;
//! resource bytes are served later through bounded views.

pub mod bif_entry;
pub(crate) mod compressed;

use crate::ext::io_ext::{invalid_data, FixedStringReadExt};
use crate::locator::ResourceLocator;
use crate::resource_type::ResourceType;
use bif_entry::{BifFileEntry, BifTilesetEntry};
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{self, Read, Seek, SeekFrom};

pub(crate) const BIFF_SIGNATURE: &[u8; 8] = b"BIFFV1  ";
pub(crate) const BIFC_SIGNATURE: &[u8; 8] = b"BIFCV1.0";
pub(crate) const BIF_SIGNATURE: &[u8; 8] = b"BIF V1.0";

/// The on-disk flavor of an archive, decided by its first eight bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BifKind {
    /// Plain `BIFF V1`, read directly from disk.
    Plain,
    /// `BIFC V1.0`: a `BIFF V1` image split into zlib blocks.
    BlockCompressed,
    /// `BIF V1.0`: a `BIFF V1` image stored as a single zlib stream.
    StreamCompressed,
}

impl BifKind {
    pub fn from_signature(signature: &[u8; 8]) -> io::Result<Self> {
        match signature {
            s if s == BIFF_SIGNATURE => Ok(BifKind::Plain),
            s if s == BIFC_SIGNATURE => Ok(BifKind::BlockCompressed),
            s if s == BIF_SIGNATURE => Ok(BifKind::StreamCompressed),
            _ => Err(invalid_data(format!(
                "Unknown BIF signature {:?}",
                String::from_utf8_lossy(signature)
            ))),
        }
    }
}

/// The parsed header tables of a `BIFF V1` archive.
#[derive(Debug, Default)]
pub struct BifArchive {
    pub files: Vec<BifFileEntry>,
    pub tilesets: Vec<BifTilesetEntry>,
}

impl BifArchive {
    /// Reads the header and both entry tables from the start of `reader`.
    pub fn read<R: Read + Seek>(reader: &mut R) -> io::Result<Self> {
        reader.seek(SeekFrom::Start(0))?;
        let signature = reader.read_signature()?;
        if &signature != BIFF_SIGNATURE {
            return Err(invalid_data(format!(
                "Invalid BIFF signature {:?}",
                String::from_utf8_lossy(&signature)
            )));
        }

        let file_count = reader.read_u32::<LittleEndian>()?;
        let tileset_count = reader.read_u32::<LittleEndian>()?;
        let table_offset = reader.read_u32::<LittleEndian>()?;

        reader.seek(SeekFrom::Start(table_offset as u64))?;

        let mut files = Vec::with_capacity(file_count.min(0x4000) as usize);
        for _ in 0..file_count {
            let locator = ResourceLocator(reader.read_u32::<LittleEndian>()?);
            let offset = reader.read_u32::<LittleEndian>()?;
            let size = reader.read_u32::<LittleEndian>()?;
            let resource_type = ResourceType(reader.read_u16::<LittleEndian>()?);
            let _reserved = reader.read_u16::<LittleEndian>()?;
            files.push(BifFileEntry {
                locator,
                offset,
                size,
                resource_type,
            });
        }

        // The tileset table follows the file table directly.
        let mut tilesets = Vec::with_capacity(tileset_count.min(0x40) as usize);
        for _ in 0..tileset_count {
            let locator = ResourceLocator(reader.read_u32::<LittleEndian>()?);
            let offset = reader.read_u32::<LittleEndian>()?;
            let tile_count = reader.read_u32::<LittleEndian>()?;
            let tile_size = reader.read_u32::<LittleEndian>()?;
            let resource_type = ResourceType(reader.read_u16::<LittleEndian>()?);
            let _reserved = reader.read_u16::<LittleEndian>()?;
            tilesets.push(BifTilesetEntry {
                locator,
                offset,
                tile_count,
                tile_size,
                resource_type,
            });
        }

        Ok(BifArchive { files, tilesets })
    }
}
