//! `NullTerminated`: scans ahead for a terminator byte sequence, parses the
//! subconstruct from everything before it, then consumes the terminator.

use std::io::Cursor;

use crate::construct::{extend_path, Con, Construct};
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::{self, Stream};
use crate::value::Value;

/// Wraps `subcon`, delimited on the wire by `terminator` (a single `0x00`
/// byte by default, but any fixed byte sequence works).
#[derive(Clone)]
pub struct NullTerminated {
    subcon: Con,
    terminator: Vec<u8>,
}

impl std::fmt::Debug for NullTerminated {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NullTerminated").field("terminator", &self.terminator).finish()
    }
}

impl NullTerminated {
    /// Wrap `subcon`, terminated by a single NUL byte.
    pub fn new(subcon: Con) -> Self {
        NullTerminated { subcon, terminator: vec![0u8] }
    }

    /// Wrap `subcon`, terminated by an arbitrary fixed byte sequence.
    pub fn with_terminator(subcon: Con, terminator: Vec<u8>) -> Self {
        NullTerminated { subcon, terminator }
    }
}

impl Construct for NullTerminated {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let remaining = stream::remaining(stream)? as usize;
        let mut tail = vec![0u8; remaining];
        stream::read_exact(stream, &mut tail)?;
        let pos = tail
            .windows(self.terminator.len().max(1))
            .position(|w| w == self.terminator.as_slice())
            .ok_or_else(|| Error::new(ErrorKind::MissingTerminator).attach_path(path))?;
        let mut cursor = Cursor::new(tail[..pos].to_vec());
        let value_path = extend_path(path, "value");
        let v = self.subcon.parse_in(&mut cursor, ctx, &value_path).map_err(|e| e.attach_path(&value_path))?;
        let start = stream::tell(stream)? - remaining as u64;
        stream::seek(stream, std::io::SeekFrom::Start(start + (pos + self.terminator.len()) as u64))?;
        Ok(v)
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let mut buf = Cursor::new(Vec::new());
        let value_path = extend_path(path, "value");
        let built = self.subcon.build_in(value, &mut buf, ctx, &value_path).map_err(|e| e.attach_path(&value_path))?;
        stream::write_all(stream, &buf.into_inner())?;
        stream::write_all(stream, &self.terminator)?;
        Ok(built)
    }

    fn size_of_in(&self, _ctx: &Context, path: &str) -> Result<usize> {
        Err(Error::new(ErrorKind::SizeUnknown).attach_path(path))
    }

    fn is_fixed_size(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::ConstructExt;
    use crate::primitive::bytes::GreedyBytes;
    use std::sync::Arc;

    #[test]
    fn stops_at_terminator_and_consumes_it() {
        let con = NullTerminated::new(Arc::new(GreedyBytes));
        let v = con.parse(&[1, 2, 3, 0, 9, 9]).unwrap();
        assert_eq!(v, Value::Bytes(vec![1, 2, 3]));
    }

    #[test]
    fn missing_terminator_errors() {
        let con = NullTerminated::new(Arc::new(GreedyBytes));
        assert!(con.parse(&[1, 2, 3]).is_err());
    }

    #[test]
    fn build_appends_terminator() {
        let con = NullTerminated::new(Arc::new(GreedyBytes));
        assert_eq!(con.build(&Value::Bytes(vec![1, 2])).unwrap(), vec![1, 2, 0]);
    }
}
