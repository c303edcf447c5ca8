#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::write::ZlibEncoder;
use flate2::Compression;
use infinity_fs::{ResourceLocator, ResourceType};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// A game directory: `chitin.key` plus archives under `data/`.
pub struct GameDir {
    pub dir: TempDir,
}

impl GameDir {
    pub fn new() -> Self {
        init_tracing();
        GameDir {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn key_path(&self) -> PathBuf {
        self.dir.path().join("chitin.key")
    }

    pub fn write_key(&self, key: &KeyBuilder) -> PathBuf {
        let path = self.key_path();
        fs::write(&path, key.build()).unwrap();
        path
    }

    pub fn write(&self, relative: &str, bytes: &[u8]) {
        let path = self.dir.path().join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, bytes).unwrap();
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[derive(Default)]
pub struct KeyBuilder {
    archives: Vec<String>,
    resources: Vec<(String, ResourceType, ResourceLocator)>,
}

impl KeyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored with DOS separators, the way shipped KEY files have them.
    pub fn archive(mut self, path: &str) -> Self {
        self.archives.push(path.replace('/', "\\"));
        self
    }

    pub fn resource(mut self, name: &str, ty: ResourceType, locator: ResourceLocator) -> Self {
        self.resources.push((name.to_string(), ty, locator));
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let archive_table = 24u32;
        let mut names_at = archive_table + 12 * self.archives.len() as u32;
        let names_len: u32 = self.archives.iter().map(|a| a.len() as u32 + 1).sum();
        let resource_table = names_at + names_len;

        let mut out = Vec::new();
        out.write_all(b"KEY V1  ").unwrap();
        out.write_u32::<LittleEndian>(self.archives.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(self.resources.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(archive_table).unwrap();
        out.write_u32::<LittleEndian>(resource_table).unwrap();

        for archive in &self.archives {
            out.write_u32::<LittleEndian>(0).unwrap();
            out.write_u32::<LittleEndian>(names_at).unwrap();
            out.write_u16::<LittleEndian>(archive.len() as u16 + 1).unwrap();
            out.write_u16::<LittleEndian>(1).unwrap();
            names_at += archive.len() as u32 + 1;
        }
        for archive in &self.archives {
            out.write_all(archive.as_bytes()).unwrap();
            out.write_u8(0).unwrap();
        }

        for (name, ty, locator) in &self.resources {
            let mut raw = [0u8; 8];
            raw[..name.len()].copy_from_slice(name.as_bytes());
            out.write_all(&raw).unwrap();
            out.write_u16::<LittleEndian>(ty.0).unwrap();
            out.write_u32::<LittleEndian>(locator.0).unwrap();
        }
        out
    }
}

/// A `BIFF V1` image. Unless labeled otherwise, file `i` gets file index
/// `i` and tileset `i` gets tileset index `i + 1`.
#[derive(Default)]
pub struct BifBuilder {
    files: Vec<(ResourceType, Vec<u8>, u32)>,
    tilesets: Vec<(ResourceType, u32, u32, Vec<u8>, u32)>,
    data_start: u32,
}

impl BifBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn file(self, ty: ResourceType, data: &[u8]) -> Self {
        let file_index = self.files.len() as u32;
        self.file_labeled(ty, data, file_index)
    }

    /// A file entry whose own locator claims `file_index`, wherever it sits
    /// in the table.
    pub fn file_labeled(mut self, ty: ResourceType, data: &[u8], file_index: u32) -> Self {
        self.files.push((ty, data.to_vec(), file_index));
        self
    }

    pub fn tileset(self, tile_count: u32, tile_size: u32) -> Self {
        let tileset_index = self.tilesets.len() as u32 + 1;
        self.tileset_labeled(tile_count, tile_size, tileset_index)
    }

    /// A tileset entry whose own locator claims `tileset_index`.
    pub fn tileset_labeled(mut self, tile_count: u32, tile_size: u32, tileset_index: u32) -> Self {
        let data = (0..tile_count * tile_size).map(|i| (i % 256) as u8).collect();
        self.tilesets
            .push((ResourceType::TIS, tile_count, tile_size, data, tileset_index));
        self
    }

    /// Place resource data no earlier than `offset`.
    pub fn data_start(mut self, offset: u32) -> Self {
        self.data_start = offset;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let header_len = 20 + 16 * self.files.len() as u32 + 20 * self.tilesets.len() as u32;
        let start = header_len.max(self.data_start);
        let mut offset = start;

        let mut out = Vec::new();
        out.write_all(b"BIFFV1  ").unwrap();
        out.write_u32::<LittleEndian>(self.files.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(self.tilesets.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(20).unwrap();
        for (ty, data, file_index) in &self.files {
            out.write_u32::<LittleEndian>(ResourceLocator::new(0, 0, *file_index).0)
                .unwrap();
            out.write_u32::<LittleEndian>(offset).unwrap();
            out.write_u32::<LittleEndian>(data.len() as u32).unwrap();
            out.write_u16::<LittleEndian>(ty.0).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            offset += data.len() as u32;
        }
        for (ty, count, size, data, tileset_index) in &self.tilesets {
            out.write_u32::<LittleEndian>(ResourceLocator::new(0, *tileset_index, 0).0)
                .unwrap();
            out.write_u32::<LittleEndian>(offset).unwrap();
            out.write_u32::<LittleEndian>(*count).unwrap();
            out.write_u32::<LittleEndian>(*size).unwrap();
            out.write_u16::<LittleEndian>(ty.0).unwrap();
            out.write_u16::<LittleEndian>(0).unwrap();
            offset += data.len() as u32;
        }

        out.resize(start as usize, 0);
        for (_, data, _) in &self.files {
            out.write_all(data).unwrap();
        }
        for (_, _, _, data, _) in &self.tilesets {
            out.write_all(data).unwrap();
        }
        out
    }
}

fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

/// Wraps a `BIFF V1` image as `BIFC V1.0` with blocks of `block_size`.
pub fn block_compress(image: &[u8], block_size: usize) -> Vec<u8> {
    let mut out = Vec::new();
    out.write_all(b"BIFCV1.0").unwrap();
    out.write_u32::<LittleEndian>(image.len() as u32).unwrap();
    for chunk in image.chunks(block_size) {
        let deflated = deflate(chunk);
        out.write_u32::<LittleEndian>(chunk.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(deflated.len() as u32).unwrap();
        out.write_all(&deflated).unwrap();
    }
    out
}

/// Wraps a `BIFF V1` image as `BIF V1.0`.
pub fn stream_compress(image: &[u8], name: &str) -> Vec<u8> {
    let deflated = deflate(image);
    let mut out = Vec::new();
    out.write_all(b"BIF V1.0").unwrap();
    out.write_u32::<LittleEndian>(name.len() as u32 + 1).unwrap();
    out.write_all(name.as_bytes()).unwrap();
    out.write_u8(0).unwrap();
    out.write_u32::<LittleEndian>(image.len() as u32).unwrap();
    out.write_u32::<LittleEndian>(deflated.len() as u32).unwrap();
    out.write_all(&deflated).unwrap();
    out
}

/// Two archives: `data/A.bif` with `FOO.ITM` (120 bytes at offset 4096)
/// and `ABC.DLG`, and `data/B.bif` with `BAR.CRE`.
pub fn two_archive_game() -> GameDir {
    let game = GameDir::new();
    game.write(
        "data/A.bif",
        &BifBuilder::new()
            .file(ResourceType::ITM, &[0xAA; 120])
            .file(ResourceType::DLG, b"dialog")
            .data_start(4096)
            .build(),
    );
    game.write(
        "data/B.bif",
        &BifBuilder::new()
            .file(ResourceType::CRE, b"creature")
            .build(),
    );
    game.write_key(
        &KeyBuilder::new()
            .archive("data/A.bif")
            .archive("data/B.bif")
            .resource("FOO", ResourceType::ITM, ResourceLocator::new(0, 0, 0))
            .resource("ABC", ResourceType::DLG, ResourceLocator::new(0, 0, 1))
            .resource("BAR", ResourceType::CRE, ResourceLocator::new(1, 0, 0)),
    );
    game
}
