//! The byte-stream abstraction constructs read from and write to.
//!
//! Built directly on `std::io::{Read, Write, Seek}` — every concrete stream
//! we hand to a construct (an in-memory `Cursor<Vec<u8>>`, a bounded
//! sub-window, an open file) already implements it, so there is no value in
//! a bespoke trait duplicating the same three methods.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::error::{Error, ErrorKind, Result};

/// Any seekable byte stream a construct can read from and write to.
pub trait Stream: Read + Write + Seek {}
impl<T: Read + Write + Seek + ?Sized> Stream for T {}

/// Current position, as `u64`.
pub fn tell(stream: &mut (impl Stream + ?Sized)) -> Result<u64> {
    stream.stream_position().map_err(|e| Error::new(io_to_seek(e)))
}

/// Reposition the stream.
pub fn seek(stream: &mut (impl Stream + ?Sized), pos: SeekFrom) -> Result<u64> {
    stream.seek(pos).map_err(|e| Error::new(io_to_seek(e)))
}

/// Read exactly `buf.len()` bytes, reporting a precise short-read error
/// (byte-oriented streams otherwise only report "unexpected EOF").
pub fn read_exact(stream: &mut (impl Stream + ?Sized), buf: &mut [u8]) -> Result<()> {
    let before = tell(stream)?;
    match stream.read_exact(buf) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
            // Figure out how many bytes we actually managed to get by
            // re-reading from `before` with `read` (best effort) — cheaper
            // alternative: just report the request size, since streams that
            // raise UnexpectedEof from read_exact don't tell us the partial
            // count directly.
            let end = seek(stream, SeekFrom::End(0))?;
            let available = end.saturating_sub(before);
            seek(stream, SeekFrom::Start(before))?;
            Err(Error::new(ErrorKind::ShortRead {
                needed: buf.len(),
                available: available as usize,
            }))
        }
        Err(e) => Err(Error::new(ErrorKind::Write(e.to_string()))),
    }
}

/// Write all of `buf`.
pub fn write_all(stream: &mut (impl Stream + ?Sized), buf: &[u8]) -> Result<()> {
    stream
        .write_all(buf)
        .map_err(|e| Error::new(ErrorKind::Write(e.to_string())))
}

/// Bytes remaining to the end of the stream, restoring position afterwards.
pub fn remaining(stream: &mut (impl Stream + ?Sized)) -> Result<u64> {
    let here = tell(stream)?;
    let end = seek(stream, SeekFrom::End(0))?;
    seek(stream, SeekFrom::Start(here))?;
    Ok(end.saturating_sub(here))
}

fn io_to_seek(e: io::Error) -> ErrorKind {
    ErrorKind::SeekOutOfRange(e.raw_os_error().unwrap_or(-1) as i64)
}

/// A fixed-length window onto an inner stream, used by `Prefixed`/`Union` to
/// give a subconstruct a stream that reports EOF at the declared boundary
/// instead of the underlying stream's real end.
pub struct BoundedStream<'a> {
    inner: &'a mut dyn Stream,
    start: u64,
    len: u64,
}

impl<'a> BoundedStream<'a> {
    /// Wrap `inner` (already positioned at `start`) to expose exactly `len`
    /// bytes from here.
    pub fn new(inner: &'a mut dyn Stream, start: u64, len: u64) -> Result<Self> {
        seek(inner, SeekFrom::Start(start))?;
        Ok(BoundedStream { inner, start, len })
    }

    fn relative_pos(&mut self) -> io::Result<u64> {
        Ok(self.inner.stream_position()?.saturating_sub(self.start))
    }
}

impl<'a> Read for BoundedStream<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let pos = self.relative_pos()?;
        let remaining = self.len.saturating_sub(pos);
        let cap = remaining.min(buf.len() as u64) as usize;
        self.inner.read(&mut buf[..cap])
    }
}

impl<'a> Write for BoundedStream<'a> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let pos = self.relative_pos()?;
        let remaining = self.len.saturating_sub(pos);
        let cap = remaining.min(buf.len() as u64) as usize;
        self.inner.write(&buf[..cap])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<'a> Seek for BoundedStream<'a> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let target = match pos {
            SeekFrom::Start(n) => n,
            SeekFrom::Current(n) => {
                let cur = self.relative_pos()? as i64;
                (cur + n).max(0) as u64
            }
            SeekFrom::End(n) => (self.len as i64 + n).max(0) as u64,
        };
        self.inner.seek(SeekFrom::Start(self.start + target))?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn read_exact_reports_short_read() {
        let mut cur = Cursor::new(vec![1u8, 2, 3]);
        let mut buf = [0u8; 8];
        let err = read_exact(&mut cur, &mut buf).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::ShortRead {
                needed: 8,
                available: 3
            }
        );
    }

    #[test]
    fn bounded_stream_hides_the_rest() {
        let mut cur = Cursor::new(vec![1u8, 2, 3, 4, 5]);
        let mut bounded = BoundedStream::new(&mut cur, 1, 2).unwrap();
        let mut buf = [0u8; 4];
        let err = read_exact(&mut bounded, &mut buf).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::ShortRead {
                needed: 4,
                available: 2
            }
        );
    }

    #[test]
    fn bounded_stream_reads_its_window() {
        let mut cur = Cursor::new(vec![1u8, 2, 3, 4, 5]);
        let mut bounded = BoundedStream::new(&mut cur, 1, 3).unwrap();
        let mut buf = [0u8; 3];
        read_exact(&mut bounded, &mut buf).unwrap();
        assert_eq!(buf, [2, 3, 4]);
    }
}
