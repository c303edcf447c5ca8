//! Inflation of compressed archives into an in-memory `BIFF V1` image.
use super::BifKind;
use crate::ext::io_ext::{invalid_data, FixedStringReadExt, SeekExt};
use byteorder::{LittleEndian, ReadBytesExt};
use flate2::read::ZlibDecoder;
use std::io::{self, Read, Seek, SeekFrom};

/// Reads a whole compressed archive and returns the inflated `BIFF V1` bytes.
pub(crate) fn inflate<R: Read + Seek>(reader: &mut R) -> io::Result<Vec<u8>> {
    reader.seek(SeekFrom::Start(0))?;
    let signature = reader.read_signature()?;
    match BifKind::from_signature(&signature)? {
        BifKind::BlockCompressed => inflate_blocks(reader),
        BifKind::StreamCompressed => inflate_stream(reader),
        BifKind::Plain => Err(invalid_data("Archive is not compressed")),
    }
}

/// `BIFC V1.0`: total length, then `{inflated, deflated, zlib data}` blocks
/// until the total is reached.
fn inflate_blocks<R: Read>(reader: &mut R) -> io::Result<Vec<u8>> {
    let total = reader.read_u32::<LittleEndian>()? as usize;
    let mut image = Vec::new();
    image
        .try_reserve_exact(total)
        .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;

    while image.len() < total {
        let inflated = reader.read_u32::<LittleEndian>()? as usize;
        let deflated = reader.read_u32::<LittleEndian>()? as u64;
        let before = image.len();
        let mut block = reader.by_ref().take(deflated);
        ZlibDecoder::new(&mut block).read_to_end(&mut image)?;
        // Keep the reader aligned on the next block header.
        io::copy(&mut block, &mut io::sink())?;
        if image.len() - before != inflated {
            return Err(invalid_data(format!(
                "BIFC block inflated to {} bytes, expected {inflated}",
                image.len() - before
            )));
        }
    }
    if image.len() != total {
        return Err(invalid_data(format!(
            "BIFC image is {} bytes, expected {total}",
            image.len()
        )));
    }
    Ok(image)
}

/// `BIF V1.0`: embedded file name, then one zlib stream.
fn inflate_stream<R: Read + Seek>(reader: &mut R) -> io::Result<Vec<u8>> {
    let name_length = reader.read_u32::<LittleEndian>()?;
    reader.skip(name_length)?;
    let inflated = reader.read_u32::<LittleEndian>()? as usize;
    let deflated = reader.read_u32::<LittleEndian>()? as u64;

    let mut image = Vec::new();
    image
        .try_reserve_exact(inflated)
        .map_err(|e| io::Error::new(io::ErrorKind::OutOfMemory, e))?;
    ZlibDecoder::new(reader.take(deflated)).read_to_end(&mut image)?;
    if image.len() != inflated {
        return Err(invalid_data(format!(
            "BIF V1.0 stream inflated to {} bytes, expected {inflated}",
            image.len()
        )));
    }
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::WriteBytesExt;
    use flate2::write::ZlibEncoder;
    use flate2::Compression;
    use std::io::{Cursor, Write};

    fn deflate(data: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn inflates_block_archive() {
        let image: Vec<u8> = (0..300u32).map(|i| (i % 251) as u8).collect();
        let mut out = Vec::new();
        out.write_all(b"BIFCV1.0").unwrap();
        out.write_u32::<LittleEndian>(image.len() as u32).unwrap();
        for chunk in image.chunks(128) {
            let packed = deflate(chunk);
            out.write_u32::<LittleEndian>(chunk.len() as u32).unwrap();
            out.write_u32::<LittleEndian>(packed.len() as u32).unwrap();
            out.write_all(&packed).unwrap();
        }

        assert_eq!(inflate(&mut Cursor::new(out)).unwrap(), image);
    }

    #[test]
    fn inflates_stream_archive() {
        let image = b"BIFFV1  rest of the image".to_vec();
        let packed = deflate(&image);
        let mut out = Vec::new();
        out.write_all(b"BIF V1.0").unwrap();
        out.write_u32::<LittleEndian>(6).unwrap();
        out.write_all(b"A.bif\0").unwrap();
        out.write_u32::<LittleEndian>(image.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(packed.len() as u32).unwrap();
        out.write_all(&packed).unwrap();

        assert_eq!(inflate(&mut Cursor::new(out)).unwrap(), image);
    }

    #[test]
    fn short_block_is_rejected() {
        let packed = deflate(b"abc");
        let mut out = Vec::new();
        out.write_all(b"BIFCV1.0").unwrap();
        out.write_u32::<LittleEndian>(3).unwrap();
        out.write_u32::<LittleEndian>(4).unwrap();
        out.write_u32::<LittleEndian>(packed.len() as u32).unwrap();
        out.write_all(&packed).unwrap();

        assert!(inflate(&mut Cursor::new(out)).is_err());
    }
}
