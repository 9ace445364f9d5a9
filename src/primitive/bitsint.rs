//! `BitsInteger`: an integer packed into a run of individual bits rather
//! than whole bytes. Only meaningful nested under a `Bitwise` region, where
//! each unit the underlying stream hands back is one bit — this construct
//! doesn't know or care that it isn't reading real bytes.

use crate::construct::Construct;
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::{self, Stream};
use crate::value::Value;

/// An `n`-bit integer, optionally signed, optionally bit-reversed.
#[derive(Debug, Clone, Copy)]
pub struct BitsInteger {
    n: u32,
    signed: bool,
    swapped: bool,
}

impl BitsInteger {
    /// `n` bits, unsigned, MSB-first.
    pub fn new(n: u32) -> Self {
        BitsInteger { n, signed: false, swapped: false }
    }

    /// Treat the packed value as two's-complement signed.
    pub fn signed(mut self) -> Self {
        self.signed = true;
        self
    }

    /// Reverse bit order before packing/unpacking.
    pub fn swapped(mut self) -> Self {
        self.swapped = true;
        self
    }
}

impl Construct for BitsInteger {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let n = self.n as usize;
        let mut units = vec![0u8; n];
        stream::read_exact(stream, &mut units)?;
        if self.swapped {
            units.reverse();
        }
        let mut magnitude: i128 = 0;
        for &bit in &units {
            magnitude = (magnitude << 1) | (bit & 1) as i128;
        }
        if self.signed && n > 0 && units[0] & 1 != 0 {
            magnitude -= 1i128 << n;
        }
        Ok(Value::Int(magnitude))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let i = value.as_int()?;
        let n = self.n as usize;
        let (lo, hi) = if self.signed {
            let half = 1i128 << (n - 1);
            (-half, half - 1)
        } else {
            (0, (1i128 << n) - 1)
        };
        if !(lo..=hi).contains(&i) {
            return Err(Error::new(ErrorKind::IntegerOutOfRange));
        }
        let unsigned = if i < 0 { i + (1i128 << n) } else { i };
        let mut units = vec![0u8; n];
        let mut rem = unsigned;
        for idx in (0..n).rev() {
            units[idx] = (rem & 1) as u8;
            rem >>= 1;
        }
        if self.swapped {
            units.reverse();
        }
        stream::write_all(stream, &units)?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Ok(self.n as usize)
    }

    fn is_fixed_size(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::BitStream;
    use std::io::Cursor;

    #[test]
    fn ten_bit_unsigned_inside_bit_region() {
        let mut buf = Cursor::new(vec![0xbeu8, 0xef]);
        let mut bits = BitStream::new(&mut buf);
        let mut ctx = Context::root(crate::context::Mode::Parsing, crate::value::Record::new());
        // Skip the leading Flag(1 bit).
        let flag_skip = crate::primitive::bytes::Flag;
        let _ = flag_skip.parse_in(&mut bits, &mut ctx, "").unwrap();
        let con = BitsInteger::new(4);
        let v = con.parse_in(&mut bits, &mut ctx, "").unwrap();
        assert_eq!(v, Value::Int(7));
        let con10 = BitsInteger::new(10);
        let v10 = con10.parse_in(&mut bits, &mut ctx, "").unwrap();
        assert_eq!(v10, Value::Int(887));
    }

    #[test]
    fn signed_bits_round_trip() {
        let mut backing = Cursor::new(Vec::<u8>::new());
        {
            let mut bits = BitStream::new(&mut backing);
            let mut ctx = Context::root(crate::context::Mode::Building, crate::value::Record::new());
            let con = BitsInteger::new(4).signed();
            con.build_in(&Value::Int(-3), &mut bits, &mut ctx, "").unwrap();
            bits.flush().unwrap();
        }
        backing.set_position(0);
        let mut bits = BitStream::new(&mut backing);
        let mut ctx = Context::root(crate::context::Mode::Parsing, crate::value::Record::new());
        let con = BitsInteger::new(4).signed();
        let v = con.parse_in(&mut bits, &mut ctx, "").unwrap();
        assert_eq!(v, Value::Int(-3));
    }
}
