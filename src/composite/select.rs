//! `Select`: try each alternative in order, committing to the first one that
//! actually parses.

use std::io::Cursor;

use crate::construct::{extend_path, Con, Construct};
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::{self, Stream};
use crate::value::Value;

/// The first subconstruct in `alts` that parses successfully wins; its
/// result (unwrapped, not tagged by name) is this construct's output.
#[derive(Clone)]
pub struct Select {
    alts: Vec<Con>,
}

impl std::fmt::Debug for Select {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Select").field("len", &self.alts.len()).finish()
    }
}

impl Select {
    /// Try each of `alts` in order.
    pub fn new(alts: Vec<Con>) -> Self {
        Select { alts }
    }
}

impl Construct for Select {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let start = stream::tell(stream)?;
        let snapshot_len = stream::remaining(stream)?;
        let mut snapshot = vec![0u8; snapshot_len as usize];
        stream::read_exact(stream, &mut snapshot)?;
        stream::seek(stream, std::io::SeekFrom::Start(start))?;

        for (i, alt) in self.alts.iter().enumerate() {
            let mut cursor = Cursor::new(snapshot.clone());
            let mut alt_ctx = ctx.child();
            let alt_path = extend_path(path, &i.to_string());
            if let Ok(v) = alt.parse_in(&mut cursor, &mut alt_ctx, &alt_path) {
                let consumed = cursor.position();
                stream::seek(stream, std::io::SeekFrom::Start(start + consumed))?;
                return Ok(v);
            }
        }
        Err(Error::new(ErrorKind::SelectExhausted).attach_path(path))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        for (i, alt) in self.alts.iter().enumerate() {
            let mut probe = Cursor::new(Vec::new());
            let mut probe_ctx = ctx.child();
            if alt.build_in(value, &mut probe, &mut probe_ctx, &extend_path(path, &i.to_string())).is_ok() {
                let mut child = ctx.child();
                return alt.build_in(value, stream, &mut child, &extend_path(path, &i.to_string()));
            }
        }
        Err(Error::new(ErrorKind::SelectExhausted).attach_path(path))
    }

    fn size_of_in(&self, ctx: &Context, path: &str) -> Result<usize> {
        for alt in &self.alts {
            if let Ok(n) = alt.size_of_in(&ctx.child(), path) {
                return Ok(n);
            }
        }
        Err(Error::new(ErrorKind::SizeUnknown).attach_path(path))
    }

    fn is_fixed_size(&self) -> bool {
        false
    }
}
