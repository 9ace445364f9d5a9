//! `Bitwise`/`Bytewise`: switch a region of the tree between byte- and
//! bit-granular streaming.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::bitstream::BitStream;
use crate::construct::{Con, Construct};
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::Stream;
use crate::value::Value;

/// Regroups 8 consecutive bit-units (as produced by [`BitStream`]) back into
/// one real byte — `Bytewise`'s engine, the exact inverse of `BitStream`
/// itself.
struct ByteRegroup<'a> {
    inner: &'a mut dyn Stream,
}

impl<'a> Read for ByteRegroup<'a> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        for slot in buf.iter_mut() {
            let mut bits = [0u8; 8];
            self.inner.read_exact(&mut bits)?;
            *slot = bits.iter().fold(0u8, |acc, &b| (acc << 1) | (b & 1));
        }
        Ok(buf.len())
    }
}

impl<'a> Write for ByteRegroup<'a> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for &byte in buf {
            let mut bits = [0u8; 8];
            for (i, slot) in bits.iter_mut().enumerate() {
                *slot = (byte >> (7 - i)) & 1;
            }
            self.inner.write_all(&bits)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<'a> Seek for ByteRegroup<'a> {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match pos {
            SeekFrom::Current(0) => self.inner.seek(SeekFrom::Current(0)).map(|bits| bits / 8),
            _ => Err(io::Error::new(io::ErrorKind::Unsupported, "Bytewise streams only support querying position")),
        }
    }
}

/// Re-streams `subcon` over a bit-granular view of the underlying bytes.
/// `subcon`'s total size, in bits, must be a multiple of 8 when statically
/// known — a region that doesn't land on a byte boundary can't be handed
/// back to ordinary byte-oriented constructs above it.
#[derive(Clone)]
pub struct Bitwise {
    subcon: Con,
}

impl std::fmt::Debug for Bitwise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bitwise").finish()
    }
}

impl Bitwise {
    /// Wrap `subcon`, restreaming it over individual bits.
    pub fn new(subcon: Con) -> Self {
        Bitwise { subcon }
    }

    fn check_byte_multiple(&self, ctx: &Context, path: &str) -> Result<()> {
        if self.subcon.is_fixed_size() {
            let bits = self.subcon.size_of_in(ctx, path)?;
            if bits % 8 != 0 {
                return Err(Error::new(ErrorKind::Misaligned(format!(
                    "Bitwise region is {bits} bits, not a multiple of 8"
                )))
                .attach_path(path));
            }
        }
        Ok(())
    }
}

impl Construct for Bitwise {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        self.check_byte_multiple(ctx, path)?;
        let mut bits = BitStream::new(stream);
        self.subcon.parse_in(&mut bits, ctx, path).map_err(|e| e.attach_path(path))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        self.check_byte_multiple(ctx, path)?;
        let mut bits = BitStream::new(stream);
        let built = self.subcon.build_in(value, &mut bits, ctx, path).map_err(|e| e.attach_path(path))?;
        bits.flush().map_err(Error::from)?;
        Ok(built)
    }

    fn size_of_in(&self, ctx: &Context, path: &str) -> Result<usize> {
        let bits = self.subcon.size_of_in(ctx, path)?;
        Ok((bits + 7) / 8)
    }

    fn is_fixed_size(&self) -> bool {
        self.subcon.is_fixed_size()
    }
}

/// Re-streams `subcon` back over whole bytes from inside a `Bitwise` region;
/// the exact inverse. Only meaningful when the stream it's handed is itself
/// bit-granular (i.e. nested under `Bitwise`).
#[derive(Clone)]
pub struct Bytewise {
    subcon: Con,
}

impl std::fmt::Debug for Bytewise {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bytewise").finish()
    }
}

impl Bytewise {
    /// Wrap `subcon`, regrouping the enclosing bit stream into bytes.
    pub fn new(subcon: Con) -> Self {
        Bytewise { subcon }
    }
}

impl Construct for Bytewise {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let mut regrouped = ByteRegroup { inner: stream };
        self.subcon.parse_in(&mut regrouped, ctx, path).map_err(|e| e.attach_path(path))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let mut regrouped = ByteRegroup { inner: stream };
        self.subcon.build_in(value, &mut regrouped, ctx, path).map_err(|e| e.attach_path(path))
    }

    fn size_of_in(&self, ctx: &Context, path: &str) -> Result<usize> {
        self.subcon.size_of_in(ctx, path).map(|n| n * 8)
    }

    fn is_fixed_size(&self) -> bool {
        self.subcon.is_fixed_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::{Field, Struct};
    use crate::construct::ConstructExt;
    use crate::primitive::bitsint::BitsInteger;
    use crate::primitive::bytes::Flag;
    use crate::primitive::bytesint::BytesInteger;
    use std::sync::Arc;

    #[test]
    fn bit_struct_round_trip() {
        let bit_struct = Struct::new(vec![
            Field::new("a", Arc::new(Flag)),
            Field::new("b", Arc::new(BitsInteger::new(4))),
            Field::new("c", Arc::new(BitsInteger::new(10))),
            Field::new("d", Arc::new(BitsInteger::new(1))),
        ]);
        let con = Bitwise::new(Arc::new(bit_struct));
        let v = con.parse(&[0xbe, 0xef]).unwrap();
        let record = v.as_record().unwrap();
        assert_eq!(record.get("a"), Some(&Value::Bool(true)));
        assert_eq!(record.get("b"), Some(&Value::Int(7)));
        assert_eq!(record.get("c"), Some(&Value::Int(887)));
        assert_eq!(con.build(&v).unwrap(), vec![0xbe, 0xef]);
    }

    #[test]
    fn rejects_non_byte_multiple_region() {
        let con = Bitwise::new(Arc::new(BitsInteger::new(3)));
        assert!(con.parse(&[0xFF]).is_err());
    }

    #[test]
    fn bytewise_regroups_inside_bitwise() {
        let con = Bitwise::new(Arc::new(Bytewise::new(Arc::new(BytesInteger::new(2)))));
        let v = con.parse(&[0x01, 0x02]).unwrap();
        assert_eq!(v, Value::Int(0x0102));
    }
}
