use crate::locator::ResourceLocator;
use crate::resource_type::ResourceType;

/// An ordinary resource in a BIF file-entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BifFileEntry {
    /// The archive's own locator for this entry.
    pub locator: ResourceLocator,
    /// Offset of the resource data from the start of the archive.
    pub offset: u32,
    /// Length of the resource data in bytes.
    pub size: u32,
    pub resource_type: ResourceType,
}

/// A tileset in a BIF tileset-entry table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BifTilesetEntry {
    /// The archive's own locator for this entry.
    pub locator: ResourceLocator,
    /// Offset of the first tile from the start of the archive.
    pub offset: u32,
    pub tile_count: u32,
    /// Size of a single tile in bytes.
    pub tile_size: u32,
    pub resource_type: ResourceType,
}

impl BifTilesetEntry {
    /// Tiles are stored back to back, so the data length is count × size.
    pub fn data_len(&self) -> u64 {
        self.tile_count as u64 * self.tile_size as u64
    }
}
