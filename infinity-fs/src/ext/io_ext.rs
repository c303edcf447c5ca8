use std::io;
use std::io::Read;
use std::io::Seek;
use std::io::SeekFrom;

/// Reads the fixed-width text fields used by KEY and BIF headers.
pub trait FixedStringReadExt: Read {
    /// Reads an 8-byte signature + version block, e.g. `BIFFV1  `.
    fn read_signature(&mut self) -> io::Result<[u8; 8]>;

    /// Reads `length` bytes and returns the text up to the first NUL.
    fn read_fixed_string(&mut self, length: usize) -> io::Result<String>;
}

impl<T> FixedStringReadExt for T
where
    T: Read,
{
    fn read_signature(&mut self) -> io::Result<[u8; 8]> {
        let mut buf = [0u8; 8];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    fn read_fixed_string(&mut self, length: usize) -> io::Result<String> {
        let mut buf = vec![0u8; length];
        self.read_exact(&mut buf)?;
        let end = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
        Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
    }
}

/// Utility methods for working with seekable streams.
pub trait SeekExt: Seek {
    /// Skips over the given number of bytes from the current position.
    fn skip<P: Copy + 'static>(&mut self, size: P) -> io::Result<u64>
    where
        u64: TryFrom<P>;

    /// Reads a NUL-terminated string stored at `offset`, restoring the
    /// stream position afterwards.
    fn read_string_at(&mut self, offset: u64, length: usize) -> io::Result<String>
    where
        Self: Read;
}

impl<T> SeekExt for T
where
    T: Seek,
{
    fn skip<P: Copy + 'static>(&mut self, size: P) -> io::Result<u64>
    where
        u64: TryFrom<P>,
    {
        let size = u64::try_from(size).map_err(|_| io::Error::from(io::ErrorKind::InvalidData))?;
        let size = i64::try_from(size).map_err(|_| io::Error::from(io::ErrorKind::InvalidData))?;

        self.seek(SeekFrom::Current(size))
    }

    fn read_string_at(&mut self, offset: u64, length: usize) -> io::Result<String>
    where
        Self: Read,
    {
        let pos = self.stream_position()?;
        self.seek(SeekFrom::Start(offset))?;
        let text = self.read_fixed_string(length);
        self.seek(SeekFrom::Start(pos))?;
        text
    }
}

/// Shorthand for the `InvalidData` errors the format readers produce.
pub(crate) fn invalid_data(message: impl Into<String>) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.into())
}
