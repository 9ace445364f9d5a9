//! `Restreamed`: applies an arbitrary byte-level transform to the raw bytes
//! a subconstruct reads from or writes to (XOR, compression, checksums
//! stripped before the payload is interpreted, ...).
//!
//! Unlike `Transformed`, which maps the *decoded value*, this maps the
//! *bytes on the wire* before the subcon ever sees them. The subcon is
//! expected to consume the whole transformed region — there's no general
//! way to know how many raw bytes correspond to a partial decode, so (like
//! `NullTerminated`) this buffers the remainder of the stream rather than
//! interleaving the transform with the subcon's own reads.

use std::io::Cursor;

use crate::construct::{extend_path, Con, Construct};
use crate::context::Context;
use crate::error::Result;
use crate::stream::{self, Stream};
use crate::value::Value;

type ByteMap = std::sync::Arc<dyn Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync>;

/// Wraps `subcon`, decoding the raw bytes ahead of it with `decode` before
/// parsing and encoding the bytes behind it with `encode` after building.
#[derive(Clone)]
pub struct Restreamed {
    subcon: Con,
    decode: ByteMap,
    encode: ByteMap,
}

impl std::fmt::Debug for Restreamed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Restreamed").finish()
    }
}

impl Restreamed {
    /// Wrap `subcon` behind a raw byte transform.
    pub fn new(
        subcon: Con,
        decode: impl Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync + 'static,
        encode: impl Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync + 'static,
    ) -> Self {
        Restreamed {
            subcon,
            decode: std::sync::Arc::new(decode),
            encode: std::sync::Arc::new(encode),
        }
    }
}

impl Construct for Restreamed {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let remaining = stream::remaining(stream)? as usize;
        let mut raw = vec![0u8; remaining];
        stream::read_exact(stream, &mut raw)?;
        let decoded = (self.decode)(&raw).map_err(|e| e.attach_path(path))?;
        let mut cursor = Cursor::new(decoded);
        let value_path = extend_path(path, "value");
        self.subcon.parse_in(&mut cursor, ctx, &value_path).map_err(|e| e.attach_path(&value_path))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let mut scratch = Cursor::new(Vec::new());
        let value_path = extend_path(path, "value");
        let built = self.subcon.build_in(value, &mut scratch, ctx, &value_path).map_err(|e| e.attach_path(&value_path))?;
        let encoded = (self.encode)(&scratch.into_inner()).map_err(|e| e.attach_path(path))?;
        stream::write_all(stream, &encoded)?;
        Ok(built)
    }

    fn size_of_in(&self, _ctx: &Context, path: &str) -> Result<usize> {
        Err(crate::error::Error::new(crate::error::ErrorKind::SizeUnknown).attach_path(path))
    }

    fn is_fixed_size(&self) -> bool {
        false
    }

    fn needs_progress(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::ConstructExt;
    use crate::primitive::bytes::GreedyBytes;
    use std::sync::Arc;

    fn xor_all(key: u8) -> impl Fn(&[u8]) -> Result<Vec<u8>> + Send + Sync + Clone + 'static {
        move |bytes: &[u8]| Ok(bytes.iter().map(|b| b ^ key).collect())
    }

    #[test]
    fn xor_round_trip() {
        let con = Restreamed::new(Arc::new(GreedyBytes), xor_all(0xFF), xor_all(0xFF));
        let v = con.parse(&[0x00, 0xFF, 0x0F]).unwrap();
        assert_eq!(v, Value::Bytes(vec![0xFF, 0x00, 0xF0]));
        assert_eq!(con.build(&v).unwrap(), vec![0x00, 0xFF, 0x0F]);
    }
}
