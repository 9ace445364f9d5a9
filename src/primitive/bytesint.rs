//! Arbitrary-width byte-granular integers (no power-of-two width constraint).

use crate::construct::Construct;
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::{self, Stream};
use crate::value::Value;

/// An `n`-byte integer of arbitrary width, optionally signed, optionally
/// byte-swapped (little-endian) rather than the default big-endian order.
#[derive(Debug, Clone, Copy)]
pub struct BytesInteger {
    n: usize,
    signed: bool,
    swapped: bool,
}

impl BytesInteger {
    /// `n` bytes, unsigned, big-endian.
    pub fn new(n: usize) -> Self {
        BytesInteger { n, signed: false, swapped: false }
    }

    /// Treat the encoded value as two's-complement signed.
    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    /// Store/read least-significant byte first.
    pub fn swapped(mut self) -> Self {
        self.swapped = true;
        self
    }
}

impl Construct for BytesInteger {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let mut buf = vec![0u8; self.n];
        stream::read_exact(stream, &mut buf)?;
        if self.swapped {
            buf.reverse();
        }
        let mut magnitude: i128 = 0;
        for &b in &buf {
            magnitude = (magnitude << 8) | b as i128;
        }
        if self.signed && self.n > 0 && buf[0] & 0x80 != 0 {
            let full = 1i128 << (self.n * 8);
            magnitude -= full;
        }
        Ok(Value::Int(magnitude))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let i = value.as_int()?;
        let (lo, hi) = if self.signed {
            let half = 1i128 << (self.n * 8 - 1);
            (-half, half - 1)
        } else {
            (0, (1i128 << (self.n * 8)) - 1)
        };
        if !(lo..=hi).contains(&i) {
            return Err(Error::new(ErrorKind::IntegerOutOfRange));
        }
        let unsigned = if i < 0 { i + (1i128 << (self.n * 8)) } else { i };
        let mut buf = vec![0u8; self.n];
        let mut rem = unsigned;
        for idx in (0..self.n).rev() {
            buf[idx] = (rem & 0xFF) as u8;
            rem >>= 8;
        }
        if self.swapped {
            buf.reverse();
        }
        stream::write_all(stream, &buf)?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Ok(self.n)
    }

    fn is_fixed_size(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::ConstructExt;

    #[test]
    fn unsigned_five_byte_round_trip() {
        let con = BytesInteger::new(5);
        let v = con.parse(&[0, 0, 0, 1, 0]).unwrap();
        assert_eq!(v, Value::Int(256));
        assert_eq!(con.build(&v).unwrap(), vec![0, 0, 0, 1, 0]);
    }

    #[test]
    fn signed_negative_round_trip() {
        let con = BytesInteger::new(3).signed();
        let v = con.parse(&[0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(v, Value::Int(-1));
        assert_eq!(con.build(&v).unwrap(), vec![0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn swapped_reads_little_endian() {
        let con = BytesInteger::new(2).swapped();
        let v = con.parse(&[0x01, 0x00]).unwrap();
        assert_eq!(v, Value::Int(1));
    }
}
