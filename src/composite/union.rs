//! `Union`: parse several alternatives at the same stream offset, keeping
//! all their results but only actually advancing the stream by the width of
//! one designated alternative.

use std::io::Cursor;

use crate::construct::{extend_path, Con, Construct};
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::{self, Stream};
use crate::value::{Record, Value};

/// One named alternative of a [`Union`].
#[derive(Clone)]
pub struct Alt {
    pub(crate) name: String,
    pub(crate) con: Con,
}

impl Alt {
    /// An alternative named `name`, parsed/built by `con`.
    pub fn new(name: impl Into<String>, con: Con) -> Self {
        Alt { name: name.into(), con }
    }
}

/// Parses every alternative against a private snapshot of the bytes at the
/// current offset, binding every one that succeeds into the output record
/// under its name. Only `parse_from` (an index into `alts`, or `None`)
/// determines how far the *real* stream advances afterwards.
///
/// `parse_from: None` means no alternative commits any bytes — this crate
/// resolves the "mileage may vary" behavior by making that choice explicit
/// and refusing to nest such a `Union` inside a greedy range
/// ([`Construct::needs_progress`] reports `false` in that case).
#[derive(Clone)]
pub struct Union {
    alts: Vec<Alt>,
    parse_from: Option<usize>,
}

impl std::fmt::Debug for Union {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Union")
            .field("alts", &self.alts.iter().map(|a| &a.name).collect::<Vec<_>>())
            .field("parse_from", &self.parse_from)
            .finish()
    }
}

impl Union {
    /// Build a union over `alts`, advancing the real stream by whichever
    /// alternative `parse_from` names (`None` commits nothing).
    pub fn new(alts: Vec<Alt>, parse_from: Option<usize>) -> Self {
        Union { alts, parse_from }
    }
}

impl Construct for Union {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let start = stream::tell(stream)?;
        let snapshot_len = stream::remaining(stream)?;
        let mut snapshot = vec![0u8; snapshot_len as usize];
        stream::read_exact(stream, &mut snapshot)?;
        stream::seek(stream, std::io::SeekFrom::Start(start))?;

        let mut out = Record::new();
        let mut consumed = 0u64;
        for (i, alt) in self.alts.iter().enumerate() {
            let mut cursor = Cursor::new(snapshot.clone());
            let mut alt_ctx = ctx.child();
            let alt_path = extend_path(path, &alt.name);
            match alt.con.parse_in(&mut cursor, &mut alt_ctx, &alt_path) {
                Ok(v) => {
                    out.insert(alt.name.clone(), v);
                    if self.parse_from == Some(i) {
                        consumed = cursor.position();
                    }
                }
                Err(e) => {
                    if self.parse_from == Some(i) {
                        return Err(e.attach_path(&alt_path));
                    }
                }
            }
        }
        stream::seek(stream, std::io::SeekFrom::Start(start + consumed))?;
        Ok(Value::Record(out))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let record = value.as_record()?;
        let idx = self
            .parse_from
            .or_else(|| self.alts.iter().position(|a| record.get(&a.name).is_some()))
            .ok_or_else(|| Error::new(ErrorKind::NoSuchAlternative("no union field present in value".to_string())).attach_path(path))?;
        let alt = &self.alts[idx];
        let field_value = record
            .get(&alt.name)
            .ok_or_else(|| Error::new(ErrorKind::NoSuchAlternative(alt.name.clone())).attach_path(path))?;
        let mut child = ctx.child();
        let alt_path = extend_path(path, &alt.name);
        let built = alt.con.build_in(field_value, stream, &mut child, &alt_path).map_err(|e| e.attach_path(&alt_path))?;
        let mut out = Record::new();
        out.insert(alt.name.clone(), built);
        Ok(Value::Record(out))
    }

    fn size_of_in(&self, ctx: &Context, path: &str) -> Result<usize> {
        match self.parse_from {
            Some(idx) => self.alts[idx].con.size_of_in(&ctx.child(), path),
            None => Err(Error::new(ErrorKind::SizeUnknown).attach_path(path)),
        }
    }

    fn is_fixed_size(&self) -> bool {
        match self.parse_from {
            Some(idx) => self.alts[idx].con.is_fixed_size(),
            None => false,
        }
    }

    fn needs_progress(&self) -> bool {
        self.parse_from.is_some()
    }
}
