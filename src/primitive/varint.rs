//! Variable-length integer encodings: LEB128-style groups and zigzag signing.

use crate::construct::Construct;
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::{self, Stream};
use crate::value::Value;

/// An unsigned integer encoded as a little-endian sequence of 7-bit groups,
/// each continued by the high bit of its byte (LEB128).
#[derive(Debug, Clone, Copy, Default)]
pub struct VarInt;

impl VarInt {
    /// The only constructor.
    pub fn new() -> Self {
        VarInt
    }
}

impl Construct for VarInt {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let mut result: u128 = 0;
        let mut shift = 0u32;
        loop {
            let mut byte = [0u8; 1];
            stream::read_exact(stream, &mut byte)?;
            let b = byte[0];
            if shift >= 128 {
                return Err(Error::new(ErrorKind::IntegerOutOfRange));
            }
            result |= ((b & 0x7F) as u128) << shift;
            if b & 0x80 == 0 {
                break;
            }
            shift += 7;
        }
        Ok(Value::Int(result as i128))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let i = value.as_int()?;
        if i < 0 {
            return Err(Error::new(ErrorKind::IntegerOutOfRange));
        }
        let mut n = i as u128;
        let mut out = Vec::new();
        loop {
            let mut byte = (n & 0x7F) as u8;
            n >>= 7;
            if n != 0 {
                byte |= 0x80;
            }
            out.push(byte);
            if n == 0 {
                break;
            }
        }
        stream::write_all(stream, &out)?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Err(Error::new(ErrorKind::SizeUnknown))
    }

    fn is_fixed_size(&self) -> bool {
        false
    }
}

/// Signed wrapper over [`VarInt`], mapping `n` to `(n << 1) ^ (n >> 127)`
/// before encoding so small-magnitude negatives stay small on the wire.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZigZag;

impl ZigZag {
    /// The only constructor.
    pub fn new() -> Self {
        ZigZag
    }
}

fn zigzag_encode(n: i128) -> u128 {
    ((n << 1) ^ (n >> 127)) as u128
}

fn zigzag_decode(n: u128) -> i128 {
    ((n >> 1) as i128) ^ -((n & 1) as i128)
}

impl Construct for ZigZag {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let raw = VarInt.parse_in(stream, ctx, path).map_err(|e| e.attach_path(path))?.as_int()?;
        Ok(Value::Int(zigzag_decode(raw as u128)))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let i = value.as_int()?;
        let encoded = zigzag_encode(i) as i128;
        VarInt.build_in(&Value::Int(encoded), stream, ctx, path).map_err(|e| e.attach_path(path))?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Err(Error::new(ErrorKind::SizeUnknown))
    }

    fn is_fixed_size(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::ConstructExt;

    #[test]
    fn varint_small_value_is_one_byte() {
        let con = VarInt::new();
        assert_eq!(con.build(&Value::Int(5)).unwrap(), vec![5]);
        assert_eq!(con.parse(&[5]).unwrap(), Value::Int(5));
    }

    #[test]
    fn varint_multi_byte_round_trip() {
        let con = VarInt::new();
        let built = con.build(&Value::Int(300)).unwrap();
        assert_eq!(built, vec![0xAC, 0x02]);
        assert_eq!(con.parse(&built).unwrap(), Value::Int(300));
    }

    #[test]
    fn zigzag_keeps_small_negatives_small() {
        let con = ZigZag::new();
        assert_eq!(con.build(&Value::Int(-1)).unwrap(), vec![1]);
        assert_eq!(con.parse(&[1]).unwrap(), Value::Int(-1));
        assert_eq!(con.build(&Value::Int(1)).unwrap(), vec![2]);
    }
}
