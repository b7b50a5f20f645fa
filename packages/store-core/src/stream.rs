//! Seekable byte streams backing a table file.
//!
//! The engine is generic over anything that can seek, read and write bytes
//! and be explicitly flushed and closed. [`FileStream`] backs a table with a
//! regular file; [`MemStream`] backs it with an in-memory buffer, used by
//! unit tests and anywhere a table is scratch rather than durable.

use std::fs::{File, OpenOptions};
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// A seekable stream a [`crate::engine::TableEngine`] can read and write.
///
/// Implementors must behave like a `Read + Write + Seek` file: a `write`
/// at an offset before the end overwrites in place, a `write` at or past
/// the end extends the stream, and `seek` addresses absolute byte offsets.
pub trait ByteStream: Read + Write + Seek + std::fmt::Debug + Send {
    /// Total length of the stream in bytes. Leaves the cursor unmoved.
    fn stream_len(&mut self) -> io::Result<u64> {
        let current = self.stream_position()?;
        let end = self.seek(SeekFrom::End(0))?;
        self.seek(SeekFrom::Start(current))?;
        Ok(end)
    }

    /// Flushes pending writes to the backing medium.
    fn sync(&mut self) -> io::Result<()>;

    /// Closes the stream. Idempotent; further reads or writes fail with
    /// [`io::ErrorKind::NotConnected`].
    fn close(&mut self) -> io::Result<()>;
}

fn closed_error() -> io::Error {
    io::Error::new(io::ErrorKind::NotConnected, "stream is closed")
}

/// A table file on disk.
#[derive(Debug)]
pub struct FileStream {
    file: Option<File>,
}

impl FileStream {
    /// Opens (creating if absent) the file at `path` for reading and writing.
    pub fn open(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(Self { file: Some(file) })
    }

    fn file_mut(&mut self) -> io::Result<&mut File> {
        self.file.as_mut().ok_or_else(closed_error)
    }
}

impl Read for FileStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file_mut()?.read(buf)
    }
}

impl Write for FileStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.file_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file_mut()?.flush()
    }
}

impl Seek for FileStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file_mut()?.seek(pos)
    }
}

impl ByteStream for FileStream {
    fn sync(&mut self) -> io::Result<()> {
        self.file_mut()?.sync_all()
    }

    fn close(&mut self) -> io::Result<()> {
        self.file.take();
        Ok(())
    }
}

/// An in-memory table, backed by a growable buffer rather than a file.
#[derive(Debug, Default)]
pub struct MemStream {
    buf: Option<Cursor<Vec<u8>>>,
}

impl MemStream {
    /// An empty in-memory table.
    pub fn new() -> Self {
        Self {
            buf: Some(Cursor::new(Vec::new())),
        }
    }

    /// An in-memory table seeded with existing bytes, cursor at the start.
    pub fn with_data(data: Vec<u8>) -> Self {
        Self {
            buf: Some(Cursor::new(data)),
        }
    }

    fn buf_mut(&mut self) -> io::Result<&mut Cursor<Vec<u8>>> {
        self.buf.as_mut().ok_or_else(closed_error)
    }

    /// Consumes the stream, returning its bytes. Used by tests that need to
    /// reopen the same content as a fresh stream.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.map(Cursor::into_inner).unwrap_or_default()
    }
}

impl Read for MemStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.buf_mut()?.read(buf)
    }
}

impl Write for MemStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf_mut()?.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.buf_mut()?.flush()
    }
}

impl Seek for MemStream {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.buf_mut()?.seek(pos)
    }
}

impl ByteStream for MemStream {
    fn sync(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        self.buf.take();
        Ok(())
    }
}
