//! Fixed-width integers, in every endianness the source toolkit supports.
//!
//! Follows `fuel-types/src/canonical.rs`'s `impl_for_primitives!` macro
//! almost exactly — `to_be_bytes`/`from_be_bytes` round-tripping is how that
//! module encodes its own fixed-width numerics — generalized from "always
//! big-endian, always 8-byte aligned" to "caller picks width and
//! endianness".

use crate::construct::Construct;
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::{self, Stream};
use crate::value::Value;

/// Byte order for a fixed-width integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    /// Most significant byte first.
    Big,
    /// Least significant byte first.
    Little,
    /// Whatever this machine's native order is (rarely what you want in a
    /// wire format, but the source toolkit offers it).
    Native,
}

macro_rules! fixed_int {
    ($name:ident, $native:ty, $width:expr, $signed:expr) => {
        #[doc = concat!("A ", stringify!($width), "-byte ", if $signed { "signed" } else { "unsigned" }, " integer.")]
        #[derive(Debug, Clone, Copy)]
        pub struct $name {
            endian: Endian,
        }

        impl $name {
            /// Big-endian (network byte order).
            pub fn be() -> Self {
                $name { endian: Endian::Big }
            }
            /// Little-endian.
            pub fn le() -> Self {
                $name { endian: Endian::Little }
            }
            /// This machine's native endianness.
            pub fn ne() -> Self {
                $name { endian: Endian::Native }
            }

            fn decode(&self, bytes: [u8; $width]) -> $native {
                match self.endian {
                    Endian::Big => <$native>::from_be_bytes(bytes),
                    Endian::Little => <$native>::from_le_bytes(bytes),
                    Endian::Native => <$native>::from_ne_bytes(bytes),
                }
            }

            fn encode(&self, v: $native) -> [u8; $width] {
                match self.endian {
                    Endian::Big => v.to_be_bytes(),
                    Endian::Little => v.to_le_bytes(),
                    Endian::Native => v.to_ne_bytes(),
                }
            }
        }

        impl Construct for $name {
            fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
                let mut buf = [0u8; $width];
                stream::read_exact(stream, &mut buf)?;
                Ok(Value::Int(self.decode(buf) as i128))
            }

            fn build_in(
                &self,
                value: &Value,
                stream: &mut dyn Stream,
                _ctx: &mut Context,
                _path: &str,
            ) -> Result<Value> {
                let i = value.as_int()?;
                let native = <$native>::try_from(i).map_err(|_| Error::new(ErrorKind::IntegerOutOfRange))?;
                stream::write_all(stream, &self.encode(native))?;
                Ok(value.clone())
            }

            fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
                Ok($width)
            }

            fn is_fixed_size(&self) -> bool {
                true
            }
        }
    };
}

fixed_int!(IntU16, u16, 2, false);
fixed_int!(IntU32, u32, 4, false);
fixed_int!(IntU64, u64, 8, false);
fixed_int!(IntS16, i16, 2, true);
fixed_int!(IntS32, i32, 4, true);
fixed_int!(IntS64, i64, 8, true);

/// A single unsigned byte. Endianness is meaningless at one byte, so this
/// doesn't carry an `Endian` the way the wider widths do.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntU8;

impl IntU8 {
    /// The only constructor; kept symmetric with the wider families'
    /// `be()`/`le()` so callers don't need a special case.
    pub fn be() -> Self {
        IntU8
    }
}

impl Construct for IntU8 {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let mut buf = [0u8; 1];
        stream::read_exact(stream, &mut buf)?;
        Ok(Value::Int(buf[0] as i128))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let i = value.as_int()?;
        let b = u8::try_from(i).map_err(|_| Error::new(ErrorKind::IntegerOutOfRange))?;
        stream::write_all(stream, &[b])?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Ok(1)
    }

    fn is_fixed_size(&self) -> bool {
        true
    }
}

/// A single signed byte.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntS8;

impl IntS8 {
    /// The only constructor.
    pub fn be() -> Self {
        IntS8
    }
}

impl Construct for IntS8 {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let mut buf = [0u8; 1];
        stream::read_exact(stream, &mut buf)?;
        Ok(Value::Int(buf[0] as i8 as i128))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let i = value.as_int()?;
        let b = i8::try_from(i).map_err(|_| Error::new(ErrorKind::IntegerOutOfRange))?;
        stream::write_all(stream, &[b as u8])?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Ok(1)
    }

    fn is_fixed_size(&self) -> bool {
        true
    }
}

/// A 24-bit integer (3 bytes), stored widened to `u32`/`i32` in memory —
/// there is no native Rust 24-bit type, so this can't reuse the `fixed_int!`
/// macro and is written out by hand.
#[derive(Debug, Clone, Copy)]
pub struct IntU24 {
    endian: Endian,
}

impl IntU24 {
    /// Big-endian.
    pub fn be() -> Self {
        IntU24 { endian: Endian::Big }
    }
    /// Little-endian.
    pub fn le() -> Self {
        IntU24 { endian: Endian::Little }
    }

    fn decode(&self, b: [u8; 3]) -> u32 {
        match self.endian {
            Endian::Big => u32::from_be_bytes([0, b[0], b[1], b[2]]),
            Endian::Little | Endian::Native => u32::from_le_bytes([b[0], b[1], b[2], 0]),
        }
    }

    fn encode(&self, v: u32) -> [u8; 3] {
        match self.endian {
            Endian::Big => {
                let b = v.to_be_bytes();
                [b[1], b[2], b[3]]
            }
            Endian::Little | Endian::Native => {
                let b = v.to_le_bytes();
                [b[0], b[1], b[2]]
            }
        }
    }
}

impl Construct for IntU24 {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let mut buf = [0u8; 3];
        stream::read_exact(stream, &mut buf)?;
        Ok(Value::Int(self.decode(buf) as i128))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let i = value.as_int()?;
        if !(0..=0xFF_FFFF).contains(&i) {
            return Err(Error::new(ErrorKind::IntegerOutOfRange));
        }
        stream::write_all(stream, &self.encode(i as u32))?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Ok(3)
    }

    fn is_fixed_size(&self) -> bool {
        true
    }
}

/// A signed 24-bit integer, sign-extended through `i32` on parse.
#[derive(Debug, Clone, Copy)]
pub struct IntS24 {
    endian: Endian,
}

impl IntS24 {
    /// Big-endian.
    pub fn be() -> Self {
        IntS24 { endian: Endian::Big }
    }
    /// Little-endian.
    pub fn le() -> Self {
        IntS24 { endian: Endian::Little }
    }
}

impl Construct for IntS24 {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let unsigned = IntU24 { endian: self.endian };
        let v = unsigned.parse_in(stream, ctx, path).map_err(|e| e.attach_path(path))?.as_int()?;
        let raw = v as u32;
        let sign_extended = ((raw << 8) as i32) >> 8;
        Ok(Value::Int(sign_extended as i128))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let i = value.as_int()?;
        if !(-0x80_0000..=0x7F_FFFF).contains(&i) {
            return Err(Error::new(ErrorKind::IntegerOutOfRange));
        }
        let unsigned = IntU24 { endian: self.endian };
        unsigned.build_in(&Value::Int((i as u32 & 0xFF_FFFF) as i128), stream, ctx, path).map_err(|e| e.attach_path(path))?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Ok(3)
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
    fn be_le_roundtrip() {
        let be = IntU32::be();
        let le = IntU32::le();
        let v = be.parse(&[0, 0, 1, 0]).unwrap();
        assert_eq!(v, Value::Int(256));
        assert_eq!(be.build(&v).unwrap(), vec![0, 0, 1, 0]);
        assert_eq!(le.build(&v).unwrap(), vec![0, 1, 0, 0]);
    }

    #[test]
    fn endianness_symmetry() {
        // IntNu_be.parse(reverse(b)) == IntNu_le.parse(b)
        let bytes = vec![0x12u8, 0x34, 0x56, 0x78];
        let mut reversed = bytes.clone();
        reversed.reverse();
        let be = IntU32::be().parse(&reversed).unwrap();
        let le = IntU32::le().parse(&bytes).unwrap();
        assert_eq!(be, le);
    }

    #[test]
    fn u24_round_trip() {
        let be = IntU24::be();
        let v = be.parse(&[0x01, 0x02, 0x03]).unwrap();
        assert_eq!(v, Value::Int(0x010203));
        assert_eq!(be.build(&v).unwrap(), vec![0x01, 0x02, 0x03]);
    }

    #[test]
    fn s24_sign_extends() {
        let be = IntS24::be();
        let v = be.parse(&[0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(v, Value::Int(-1));
    }

    #[test]
    fn out_of_range_build_errors() {
        let con = IntU8::be();
        let err = con.build(&Value::Int(256)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::IntegerOutOfRange);
    }
}
