/// A packed resource locator as stored in KEY and BIF entries.
///
/// Bits 31..20 select the archive, bits 19..14 the tileset and bits 13..0
/// the file within the archive.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ResourceLocator(pub u32);

impl ResourceLocator {
    const ARCHIVE_SHIFT: u32 = 20;
    const TILESET_SHIFT: u32 = 14;
    const TILESET_MASK: u32 = 0x3f;
    const FILE_MASK: u32 = 0x3fff;

    pub fn new(archive_index: u32, tileset_index: u32, file_index: u32) -> Self {
        Self(
            (archive_index << Self::ARCHIVE_SHIFT)
                | ((tileset_index & Self::TILESET_MASK) << Self::TILESET_SHIFT)
                | (file_index & Self::FILE_MASK),
        )
    }

    pub fn archive_index(self) -> u32 {
        self.0 >> Self::ARCHIVE_SHIFT
    }

    pub fn tileset_index(self) -> u32 {
        (self.0 >> Self::TILESET_SHIFT) & Self::TILESET_MASK
    }

    pub fn file_index(self) -> u32 {
        self.0 & Self::FILE_MASK
    }
}

/// Where a resource sits inside its archive: an ordinary file slot or a
/// tileset slot. The two index spaces are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocatorSlot {
    File(u32),
    Tileset(u32),
}

/// The catalog's view of a locator, without the archive index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryLocator {
    pub file_index: u32,
    pub tileset_index: u32,
    pub is_tileset: bool,
}

impl EntryLocator {
    pub(crate) fn new(locator: ResourceLocator, is_tileset: bool) -> Self {
        Self {
            file_index: locator.file_index(),
            tileset_index: locator.tileset_index(),
            is_tileset,
        }
    }

    /// The slot this entry occupies in its archive's header tables.
    pub fn slot(&self) -> LocatorSlot {
        if self.is_tileset {
            LocatorSlot::Tileset(self.tileset_index)
        } else {
            LocatorSlot::File(self.file_index)
        }
    }
}
