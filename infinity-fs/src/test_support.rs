//! On-disk archive fixtures for unit tests.
use crate::catalog::{Catalog, CatalogFilters};
use crate::key_file::{KeyArchiveEntry, KeyFile, KeyResourceEntry};
use crate::locator::ResourceLocator;
use crate::resource_type::ResourceType;
use byteorder::{LittleEndian, WriteBytesExt};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;

pub(crate) struct GameFixture {
    pub(crate) dir: TempDir,
    pub(crate) key: KeyFile,
}

impl GameFixture {
    /// `data/A.bif` holds `FOO.ITM` (120 bytes at 4096) and `ABC.DLG`;
    /// `data/B.bif` holds `BAR.CRE`.
    pub(crate) fn two_archives() -> Self {
        let dir = TempDir::new().unwrap();
        write_bif(
            &dir.path().join("data/A.bif"),
            &bif_bytes(&[vec![0xAA; 120], b"dialog".to_vec()], 4096),
        );
        write_bif(
            &dir.path().join("data/B.bif"),
            &bif_bytes(&[b"creature".to_vec()], 0),
        );
        let key = KeyFile {
            archives: vec![archive("data/A.bif"), archive("data/B.bif")],
            resources: vec![
                resource("FOO", ResourceType::ITM, ResourceLocator::new(0, 0, 0)),
                resource("ABC", ResourceType::DLG, ResourceLocator::new(0, 0, 1)),
                resource("BAR", ResourceType::CRE, ResourceLocator::new(1, 0, 0)),
            ],
        };
        GameFixture { dir, key }
    }

    /// `count` archives `data/N<i>.bif`, each holding `ITEM<i>.ITM`.
    pub(crate) fn numbered(count: u32) -> Self {
        let dir = TempDir::new().unwrap();
        let mut key = KeyFile::default();
        for i in 0..count {
            let path = format!("data/N{i}.bif");
            write_bif(&dir.path().join(&path), &bif_bytes(&[vec![i as u8; 16]], 0));
            key.archives.push(archive(&path));
            key.resources.push(resource(
                &format!("ITEM{i}"),
                ResourceType::ITM,
                ResourceLocator::new(i, 0, 0),
            ));
        }
        GameFixture { dir, key }
    }

    pub(crate) fn catalog(&self, filters: &CatalogFilters) -> Catalog {
        Catalog::build(&self.key, self.dir.path(), filters).unwrap()
    }
}

pub(crate) fn write_bif(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, bytes).unwrap();
}

/// A `BIFF V1` image with one file entry per payload, data starting no
/// earlier than `data_start`.
pub(crate) fn bif_bytes(payloads: &[Vec<u8>], data_start: u32) -> Vec<u8> {
    let header_len = 20 + 16 * payloads.len() as u32;
    let mut offset = header_len.max(data_start);

    let mut out = Vec::new();
    out.write_all(b"BIFFV1  ").unwrap();
    out.write_u32::<LittleEndian>(payloads.len() as u32).unwrap();
    out.write_u32::<LittleEndian>(0).unwrap();
    out.write_u32::<LittleEndian>(20).unwrap();
    for (index, payload) in payloads.iter().enumerate() {
        out.write_u32::<LittleEndian>(index as u32).unwrap();
        out.write_u32::<LittleEndian>(offset).unwrap();
        out.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        offset += payload.len() as u32;
    }
    out.resize(header_len.max(data_start) as usize, 0);
    for payload in payloads {
        out.write_all(payload).unwrap();
    }
    out
}

fn archive(path: &str) -> KeyArchiveEntry {
    KeyArchiveEntry {
        file_size: 0,
        path: path.to_string(),
        location: 1,
    }
}

fn resource(name: &str, resource_type: ResourceType, locator: ResourceLocator) -> KeyResourceEntry {
    KeyResourceEntry {
        name: name.to_string(),
        resource_type,
        locator,
    }
}
