//! Byte-oriented leaves that don't interpret their payload as a number:
//! raw byte runs, flags, padding, and the no-op/terminator sentinels.

use crate::construct::Construct;
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::{self, Stream};
use crate::value::Value;

/// Exactly `n` raw bytes.
#[derive(Debug, Clone)]
pub struct Bytes {
    n: usize,
}

impl Bytes {
    /// `n` bytes, no interpretation.
    pub fn new(n: usize) -> Self {
        Bytes { n }
    }
}

impl Construct for Bytes {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let mut buf = vec![0u8; self.n];
        stream::read_exact(stream, &mut buf)?;
        Ok(Value::Bytes(buf))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, path: &str) -> Result<Value> {
        let bytes = value.as_bytes()?;
        if bytes.len() != self.n {
            return Err(Error::new(ErrorKind::WrongCount { expected: self.n, actual: bytes.len() }).attach_path(path));
        }
        stream::write_all(stream, bytes)?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Ok(self.n)
    }

    fn is_fixed_size(&self) -> bool {
        true
    }
}

/// A fixed byte sequence that must match exactly on parse, and is emitted
/// verbatim on build regardless of the value passed in.
#[derive(Debug, Clone)]
pub struct Const {
    expected: Vec<u8>,
}

impl Const {
    /// The literal bytes every parse must match.
    pub fn new(expected: impl Into<Vec<u8>>) -> Self {
        Const { expected: expected.into() }
    }
}

impl Construct for Const {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, path: &str) -> Result<Value> {
        let mut buf = vec![0u8; self.expected.len()];
        stream::read_exact(stream, &mut buf)?;
        if buf != self.expected {
            return Err(Error::new(ErrorKind::ConstMismatch {
                expected: self.expected.clone(),
                actual: buf,
            })
            .attach_path(path));
        }
        Ok(Value::Bytes(buf))
    }

    fn build_in(&self, _value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        stream::write_all(stream, &self.expected)?;
        Ok(Value::Bytes(self.expected.clone()))
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Ok(self.expected.len())
    }

    fn is_fixed_size(&self) -> bool {
        true
    }
}

/// All remaining bytes in the stream, consumed to EOF.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreedyBytes;

impl Construct for GreedyBytes {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let mut buf = Vec::new();
        std::io::Read::read_to_end(stream, &mut buf).map_err(Error::from)?;
        Ok(Value::Bytes(buf))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let bytes = value.as_bytes()?;
        stream::write_all(stream, bytes)?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, path: &str) -> Result<usize> {
        Err(Error::new(ErrorKind::SizeUnknown).attach_path(path))
    }

    fn is_fixed_size(&self) -> bool {
        false
    }

    fn needs_progress(&self) -> bool {
        false
    }
}

/// A single byte, read/written as a boolean (`0` is `false`, anything else
/// is `true`; builds `false` as `0x00` and `true` as `0x01`).
#[derive(Debug, Clone, Copy, Default)]
pub struct Flag;

impl Construct for Flag {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let mut buf = [0u8; 1];
        stream::read_exact(stream, &mut buf)?;
        Ok(Value::Bool(buf[0] != 0))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let b = value.as_bool()?;
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

/// `n` bytes of filler, discarded on parse and written as zero on build.
#[derive(Debug, Clone)]
pub struct Padding {
    n: usize,
}

impl Padding {
    /// `n` bytes of padding.
    pub fn new(n: usize) -> Self {
        Padding { n }
    }
}

impl Construct for Padding {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let mut buf = vec![0u8; self.n];
        stream::read_exact(stream, &mut buf)?;
        Ok(Value::Unit)
    }

    fn build_in(&self, _value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        stream::write_all(stream, &vec![0u8; self.n])?;
        Ok(Value::Unit)
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Ok(self.n)
    }

    fn is_fixed_size(&self) -> bool {
        true
    }
}

/// Consumes no input and produces [`Value::Unit`]; used as a struct field's
/// placeholder or as `Select`'s unconditional fallback arm.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pass;

impl Construct for Pass {
    fn parse_in(&self, _stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        Ok(Value::Unit)
    }

    fn build_in(&self, _value: &Value, _stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        Ok(Value::Unit)
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Ok(0)
    }

    fn is_fixed_size(&self) -> bool {
        true
    }

    fn needs_progress(&self) -> bool {
        false
    }
}

/// Asserts the stream is exhausted; parsing fails if any bytes remain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Terminated;

impl Construct for Terminated {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, path: &str) -> Result<Value> {
        let remaining = stream::remaining(stream)?;
        if remaining != 0 {
            return Err(Error::new(ErrorKind::MissingTerminator).attach_path(path));
        }
        Ok(Value::Unit)
    }

    fn build_in(&self, _value: &Value, _stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        Ok(Value::Unit)
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Ok(0)
    }

    fn is_fixed_size(&self) -> bool {
        true
    }

    fn needs_progress(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::ConstructExt;

    #[test]
    fn bytes_round_trip() {
        let con = Bytes::new(3);
        let v = con.parse(&[1, 2, 3]).unwrap();
        assert_eq!(v, Value::Bytes(vec![1, 2, 3]));
        assert_eq!(con.build(&v).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn const_rejects_mismatch() {
        let con = Const::new(vec![0x4D, 0x5A]);
        assert!(con.parse(&[0x4D, 0x5A]).is_ok());
        assert!(con.parse(&[0x00, 0x00]).is_err());
    }

    #[test]
    fn greedy_bytes_reads_to_eof() {
        let con = GreedyBytes;
        let v = con.parse(&[1, 2, 3, 4]).unwrap();
        assert_eq!(v, Value::Bytes(vec![1, 2, 3, 4]));
    }

    #[test]
    fn flag_maps_nonzero_to_true() {
        let con = Flag;
        assert_eq!(con.parse(&[0x00]).unwrap(), Value::Bool(false));
        assert_eq!(con.parse(&[0x07]).unwrap(), Value::Bool(true));
        assert_eq!(con.build(&Value::Bool(true)).unwrap(), vec![1]);
    }

    #[test]
    fn padding_discards_and_zero_fills() {
        let con = Padding::new(4);
        assert_eq!(con.parse(&[9, 9, 9, 9]).unwrap(), Value::Unit);
        assert_eq!(con.build(&Value::Unit).unwrap(), vec![0, 0, 0, 0]);
    }

    #[test]
    fn terminated_requires_exhausted_stream() {
        let con = Terminated;
        assert!(con.parse(&[]).is_ok());
        assert!(con.parse(&[1]).is_err());
    }
}
