//! Random-access byte sources
//!
//! The decoder never touches files directly. It reads through a
//! [`ByteSource`], which exposes an absolute cursor, absolute and relative
//! seeks, buffered reads and the total stream length.
//!
//! # Thread safety
//! A source is owned by exactly one decoder. The cursor is plain mutable
//! state with no locking, so sources are never shared between queries running
//! at the same time.

use std::fs::File;
use std::io::{self, BufReader, Read, Seek, SeekFrom};
use std::path::Path;

/// Random-access, read-only byte stream
pub trait ByteSource {
    /// Current absolute position
    fn position(&self) -> u64;

    /// Move the cursor to an absolute offset
    fn seek_to(&mut self, offset: u64) -> io::Result<u64>;

    /// Move the cursor relative to the current position
    fn seek_by(&mut self, delta: i64) -> io::Result<u64>;

    /// Read up to `buf.len()` bytes. Returns 0 at end of stream.
    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Total length of the stream in bytes
    fn length(&self) -> u64;
}

/// Adapter turning any `Read + Seek` into a [`ByteSource`].
///
/// The stream length is captured once at construction and the cursor is
/// tracked locally so `position()` never hits the underlying reader.
pub struct SeekableSource<R> {
    inner: R,
    position: u64,
    length: u64,
}

impl<R: Read + Seek> SeekableSource<R> {
    /// Wrap a reader, measuring its length and rewinding to the start
    pub fn new(mut inner: R) -> io::Result<Self> {
        let length = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;

        Ok(Self {
            inner,
            position: 0,
            length,
        })
    }

    /// Give back the wrapped reader
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read + Seek> ByteSource for SeekableSource<R> {
    fn position(&self) -> u64 {
        self.position
    }

    fn seek_to(&mut self, offset: u64) -> io::Result<u64> {
        self.position = self.inner.seek(SeekFrom::Start(offset))?;
        Ok(self.position)
    }

    fn seek_by(&mut self, delta: i64) -> io::Result<u64> {
        self.position = self.inner.seek(SeekFrom::Current(delta))?;
        Ok(self.position)
    }

    fn read_into(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        loop {
            match self.inner.read(buf) {
                Ok(n) => {
                    self.position += n as u64;
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
    }

    fn length(&self) -> u64 {
        self.length
    }
}

/// Buffered, read-only file source
pub type FileSource = SeekableSource<BufReader<File>>;

/// Open a file read-only as a [`ByteSource`]
pub fn open_file<P: AsRef<Path>>(path: P) -> io::Result<FileSource> {
    let file = File::options().read(true).open(path.as_ref())?;
    SeekableSource::new(BufReader::new(file))
}
