//! `Aligned`: pads a subconstruct's region up to a multiple of `modulus`
//! bytes, discarding the pad bytes on parse and zero-filling them on build.

use crate::construct::{extend_path, Con, Construct};
use crate::context::Context;
use crate::error::Result;
use crate::stream::{self, Stream};
use crate::value::Value;

fn pad_len(size: usize, modulus: usize) -> usize {
    let rem = size % modulus;
    if rem == 0 {
        0
    } else {
        modulus - rem
    }
}

/// Rounds `subcon`'s footprint up to the next multiple of `modulus` bytes.
#[derive(Clone)]
pub struct Aligned {
    modulus: usize,
    subcon: Con,
}

impl std::fmt::Debug for Aligned {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Aligned").field("modulus", &self.modulus).finish()
    }
}

impl Aligned {
    /// Wrap `subcon`, padded out to a multiple of `modulus` bytes.
    pub fn new(modulus: usize, subcon: Con) -> Self {
        Aligned { modulus, subcon }
    }
}

impl Construct for Aligned {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let before = stream::tell(stream)?;
        let value_path = extend_path(path, "value");
        let v = self.subcon.parse_in(stream, ctx, &value_path).map_err(|e| e.attach_path(&value_path))?;
        let consumed = (stream::tell(stream)? - before) as usize;
        let pad = pad_len(consumed, self.modulus);
        let mut buf = vec![0u8; pad];
        stream::read_exact(stream, &mut buf)?;
        Ok(v)
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let mut scratch = std::io::Cursor::new(Vec::new());
        let value_path = extend_path(path, "value");
        let built = self.subcon.build_in(value, &mut scratch, ctx, &value_path).map_err(|e| e.attach_path(&value_path))?;
        let bytes = scratch.into_inner();
        stream::write_all(stream, &bytes)?;
        let pad = pad_len(bytes.len(), self.modulus);
        stream::write_all(stream, &vec![0u8; pad])?;
        Ok(built)
    }

    fn size_of_in(&self, ctx: &Context, path: &str) -> Result<usize> {
        let inner = self.subcon.size_of_in(ctx, path)?;
        Ok(inner + pad_len(inner, self.modulus))
    }

    fn is_fixed_size(&self) -> bool {
        self.subcon.is_fixed_size()
    }
}
