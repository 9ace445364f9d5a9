//! The bit-restreamed view over a byte stream (`Bitwise`'s engine).
//!
//! `BitStream` implements [`Stream`] itself: each unit read or written through
//! it is a single *bit*, represented as a `0x00`/`0x01` byte, MSB-first within
//! the underlying byte. That means every ordinary byte-oriented construct
//! (`BitsInteger`, `Flag`, `Padding`, ...) works unmodified whether it sits
//! directly over a byte stream or is nested under `Bitwise` — the adapter's
//! only job is handing subconstructs a stream whose "bytes" happen to be
//! bits. The underlying shift-register packing mirrors the fixed-layout
//! immediate-value packing in `fuel-asm/src/args/{narrowint,wideint}.rs`
//! (`bits |= (x as u8) << n`), generalized to an arbitrary run of bits.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::stream::Stream;

/// A bit-granularity [`Stream`] layered over an inner byte [`Stream`].
///
/// Reads and writes one bit at a time, each presented to callers as a
/// `0x00`/`0x01` byte. Bits are MSB-first within each underlying byte,
/// matching the source toolkit's default `Bitwise` orientation.
pub struct BitStream<'a> {
    inner: &'a mut dyn Stream,
    read_register: u8,
    read_bits_left: u8,
    write_register: u8,
    write_bits_filled: u8,
    bit_pos: u64,
}

impl<'a> BitStream<'a> {
    /// Wrap `inner` (assumed positioned at a byte boundary) as a bit stream.
    pub fn new(inner: &'a mut dyn Stream) -> Self {
        BitStream {
            inner,
            read_register: 0,
            read_bits_left: 0,
            write_register: 0,
            write_bits_filled: 0,
            bit_pos: 0,
        }
    }

    /// Total bits read/written so far, relative to where this stream began.
    pub fn tell_bits(&self) -> u64 {
        self.bit_pos
    }

    fn read_one_bit(&mut self) -> io::Result<u8> {
        if self.read_bits_left == 0 {
            let mut byte = [0u8; 1];
            self.inner.read_exact(&mut byte)?;
            self.read_register = byte[0];
            self.read_bits_left = 8;
        }
        let shift = self.read_bits_left - 1;
        let bit = (self.read_register >> shift) & 1;
        self.read_bits_left -= 1;
        self.bit_pos += 1;
        Ok(bit)
    }

    fn write_one_bit(&mut self, bit: u8) -> io::Result<()> {
        let shift = 7 - self.write_bits_filled;
        self.write_register |= bit << shift;
        self.write_bits_filled += 1;
        self.bit_pos += 1;
        if self.write_bits_filled == 8 {
            self.flush_byte()?;
        }
        Ok(())
    }

    fn flush_byte(&mut self) -> io::Result<()> {
        self.inner.write_all(&[self.write_register])?;
        self.write_register = 0;
        self.write_bits_filled = 0;
        Ok(())
    }

    /// Flush any partially-written byte, zero-padding the remaining bits.
    /// Must be called once the caller is done writing; a fallible flush
    /// can't usefully report its error from a `Drop` impl, so this isn't one.
    pub fn flush(&mut self) -> io::Result<()> {
        if self.write_bits_filled > 0 {
            self.flush_byte()?;
        }
        Ok(())
    }

    /// True if neither a partial read byte nor a partial write byte is
    /// pending — i.e. the stream sits on a byte boundary.
    pub fn is_aligned(&self) -> bool {
        self.read_bits_left == 0 && self.write_bits_filled == 0
    }
}

impl<'a> Read for BitStream<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        for slot in buf.iter_mut() {
            *slot = self.read_one_bit()?;
        }
        Ok(buf.len())
    }
}

impl<'a> Write for BitStream<'a> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &b in buf {
            if b > 1 {
                return Err(io::Error::new(io::ErrorKind::InvalidInput, "bit stream write expects 0 or 1"));
            }
            self.write_one_bit(b)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> Seek for BitStream<'a> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match pos {
            SeekFrom::Current(0) => Ok(self.bit_pos),
            _ => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "bit streams only support querying the current position",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn read_bits(bits: &mut BitStream, n: usize) -> u64 {
        let mut buf = vec![0u8; n];
        bits.read_exact(&mut buf).unwrap();
        buf.iter().fold(0u64, |acc, &b| (acc << 1) | b as u64)
    }

    fn write_bits(bits: &mut BitStream, value: u64, n: usize) {
        let mut buf = vec![0u8; n];
        for i in 0..n {
            buf[n - 1 - i] = ((value >> i) & 1) as u8;
        }
        bits.write_all(&buf).unwrap();
    }

    #[test]
    fn round_trip_bit_struct() {
        // BitStruct(a=Flag(1 bit), b=BitsInteger(4), c=BitsInteger(10), d=Padding(1))
        // over b'\xbe\xef' -> {a=True, b=7, c=887, d=_}
        let mut buf = Cursor::new(vec![0xbeu8, 0xef]);
        let mut bits = BitStream::new(&mut buf);
        assert_eq!(read_bits(&mut bits, 1), 1);
        assert_eq!(read_bits(&mut bits, 4), 7);
        assert_eq!(read_bits(&mut bits, 10), 887);
        assert_eq!(read_bits(&mut bits, 1), 0);
        assert_eq!(bits.tell_bits(), 16);
    }

    #[test]
    fn write_then_read_back() {
        let mut buf = Cursor::new(Vec::<u8>::new());
        {
            let mut bits = BitStream::new(&mut buf);
            write_bits(&mut bits, 1, 1);
            write_bits(&mut bits, 7, 4);
            write_bits(&mut bits, 887, 10);
            write_bits(&mut bits, 0, 1);
            bits.flush().unwrap();
        }
        assert_eq!(buf.get_ref(), &vec![0xbeu8, 0xef]);

        buf.set_position(0);
        let mut bits = BitStream::new(&mut buf);
        assert_eq!(read_bits(&mut bits, 1), 1);
        assert_eq!(read_bits(&mut bits, 4), 7);
        assert_eq!(read_bits(&mut bits, 10), 887);
        assert_eq!(read_bits(&mut bits, 1), 0);
    }

    #[test]
    fn flush_pads_partial_byte_with_zero() {
        let mut buf = Cursor::new(Vec::<u8>::new());
        {
            let mut bits = BitStream::new(&mut buf);
            write_bits(&mut bits, 0b101, 3);
            bits.flush().unwrap();
        }
        assert_eq!(buf.get_ref(), &vec![0b1010_0000u8]);
    }
}
