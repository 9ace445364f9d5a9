//! Meta constructs: nodes whose job is about the stream or the tree itself
//! rather than about decoding a particular value — computed fields, forward
//! references, lookahead, position queries, and raw-byte capture.

use std::io::SeekFrom;

use crate::construct::{Con, Construct};
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::expr::Expr;
use crate::stream::{self, Stream};
use crate::value::{Record, Value};

/// A field with no wire representation: its value is derived entirely from
/// `expr`, evaluated fresh on every parse/build/size-of.
#[derive(Clone)]
pub struct Computed {
    expr: Expr,
}

impl std::fmt::Debug for Computed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Computed").field("expr", &self.expr).finish()
    }
}

impl Computed {
    /// A field computed from `expr`, consuming no bytes either direction.
    pub fn new(expr: Expr) -> Self {
        Computed { expr }
    }
}

impl Construct for Computed {
    fn parse_in(&self, _stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        self.expr.evaluate(ctx).map_err(|e| e.attach_path(path))
    }

    fn build_in(&self, _value: &Value, _stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        self.expr.evaluate(ctx).map_err(|e| e.attach_path(path))
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

/// Jumps to an absolute offset (given by `offset`, evaluated against `ctx`),
/// runs `subcon` there, then restores the original stream position. The
/// enclosing tree's own cursor never moves — a forward/backward reference,
/// not a relocation.
#[derive(Clone)]
pub struct Pointer {
    offset: Expr,
    subcon: Con,
}

impl std::fmt::Debug for Pointer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pointer").finish()
    }
}

impl Pointer {
    /// Wrap `subcon`, read/written at the absolute position `offset`.
    pub fn new(offset: Expr, subcon: Con) -> Self {
        Pointer { offset, subcon }
    }
}

impl Construct for Pointer {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let target = self.offset.evaluate(ctx)?.as_count()? as u64;
        let back = stream::tell(stream)?;
        stream::seek(stream, SeekFrom::Start(target))?;
        let v = self.subcon.parse_in(stream, ctx, path).map_err(|e| e.attach_path(path));
        stream::seek(stream, SeekFrom::Start(back))?;
        v
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let target = self.offset.evaluate(ctx)?.as_count()? as u64;
        let back = stream::tell(stream)?;
        stream::seek(stream, SeekFrom::Start(target))?;
        let built = self.subcon.build_in(value, stream, ctx, path).map_err(|e| e.attach_path(path));
        stream::seek(stream, SeekFrom::Start(back))?;
        built
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

/// Parses `subcon` without consuming it — the stream is rewound to its
/// original position afterwards. Builds as a no-op, writing nothing.
#[derive(Clone)]
pub struct Peek {
    subcon: Con,
}

impl std::fmt::Debug for Peek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Peek").finish()
    }
}

impl Peek {
    /// Wrap `subcon`, parsed for its value only — never actually advancing
    /// the stream.
    pub fn new(subcon: Con) -> Self {
        Peek { subcon }
    }
}

impl Construct for Peek {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let back = stream::tell(stream)?;
        let v = self.subcon.parse_in(stream, ctx, path).map_err(|e| e.attach_path(path));
        stream::seek(stream, SeekFrom::Start(back))?;
        v
    }

    fn build_in(&self, value: &Value, _stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        Ok(value.clone())
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

/// Reports the current stream position as a value; consumes nothing either
/// direction.
#[derive(Debug, Clone, Default)]
pub struct Tell;

impl Construct for Tell {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        Ok(Value::Int(stream::tell(stream)? as i128))
    }

    fn build_in(&self, _value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        Ok(Value::Int(stream::tell(stream)? as i128))
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

/// Jumps the stream's cursor to an absolute offset (given by `offset`,
/// evaluated against `ctx`) and leaves it there — unlike `Pointer`, this
/// relocates the enclosing tree's own read/write position permanently.
#[derive(Clone)]
pub struct Seek {
    offset: Expr,
}

impl std::fmt::Debug for Seek {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Seek").finish()
    }
}

impl Seek {
    /// Relocate the stream to the absolute position `offset`.
    pub fn new(offset: Expr) -> Self {
        Seek { offset }
    }
}

impl Construct for Seek {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, _path: &str) -> Result<Value> {
        let target = self.offset.evaluate(ctx)?.as_count()? as u64;
        let pos = stream::seek(stream, SeekFrom::Start(target))?;
        Ok(Value::Int(pos as i128))
    }

    fn build_in(&self, _value: &Value, stream: &mut dyn Stream, ctx: &mut Context, _path: &str) -> Result<Value> {
        let target = self.offset.evaluate(ctx)?.as_count()? as u64;
        let pos = stream::seek(stream, SeekFrom::Start(target))?;
        Ok(Value::Int(pos as i128))
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

/// Wraps `subcon`, additionally capturing the raw bytes it consumed/produced
/// alongside its decoded value. Parses to a `Record` with `value`, `data`,
/// `offset`, and `length` fields; builds from the same shape, writing `data`
/// back verbatim if present (bypassing `subcon` entirely) or else building
/// `value` through `subcon` and capturing what it wrote.
#[derive(Clone)]
pub struct RawCopy {
    subcon: Con,
}

impl std::fmt::Debug for RawCopy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawCopy").finish()
    }
}

impl RawCopy {
    /// Wrap `subcon`, also capturing its raw wire bytes.
    pub fn new(subcon: Con) -> Self {
        RawCopy { subcon }
    }
}

impl Construct for RawCopy {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let offset = stream::tell(stream)?;
        let value = self.subcon.parse_in(stream, ctx, path).map_err(|e| e.attach_path(path))?;
        let end = stream::tell(stream)?;
        let length = end - offset;
        stream::seek(stream, SeekFrom::Start(offset))?;
        let mut data = vec![0u8; length as usize];
        stream::read_exact(stream, &mut data)?;

        let mut out = Record::new();
        out.insert("value", value);
        out.insert("data", Value::Bytes(data));
        out.insert("offset", Value::Int(offset as i128));
        out.insert("length", Value::Int(length as i128));
        Ok(Value::Record(out))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let record = value.as_record()?;
        let offset = stream::tell(stream)?;

        if let Some(Value::Bytes(raw)) = record.get("data") {
            stream::write_all(stream, raw)?;
            let length = raw.len() as u64;
            let mut out = Record::new();
            if let Some(v) = record.get("value") {
                out.insert("value", v.clone());
            }
            out.insert("data", Value::Bytes(raw.clone()));
            out.insert("offset", Value::Int(offset as i128));
            out.insert("length", Value::Int(length as i128));
            return Ok(Value::Record(out));
        }

        let inner = record
            .get("value")
            .ok_or_else(|| Error::new(ErrorKind::MissingContextKey("value".to_string())).attach_path(path))?;
        let built = self.subcon.build_in(inner, stream, ctx, path).map_err(|e| e.attach_path(path))?;
        let end = stream::tell(stream)?;
        let length = end - offset;
        stream::seek(stream, SeekFrom::Start(offset))?;
        let mut data = vec![0u8; length as usize];
        stream::read_exact(stream, &mut data)?;

        let mut out = Record::new();
        out.insert("value", built);
        out.insert("data", Value::Bytes(data));
        out.insert("offset", Value::Int(offset as i128));
        out.insert("length", Value::Int(length as i128));
        Ok(Value::Record(out))
    }

    fn size_of_in(&self, ctx: &Context, path: &str) -> Result<usize> {
        self.subcon.size_of_in(ctx, path)
    }

    fn is_fixed_size(&self) -> bool {
        self.subcon.is_fixed_size()
    }
}

/// Raise this from inside a `RepeatUntil` predicate's subcon, or any item
/// construct wrapped by `GreedyRange`, to stop the enclosing range cleanly
/// without including the triggering item and without treating the stop as
/// an error. Only `GreedyRange`/`RepeatUntil` catch it; anywhere else it
/// surfaces as [`ErrorKind::StrayCancelParsing`].
pub fn cancel_parsing() -> Error {
    Error::new(ErrorKind::StrayCancelParsing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composite::{Field, GreedyRange, Struct};
    use crate::construct::ConstructExt;
    use crate::context::Mode;
    use crate::primitive::int::{IntU16, IntU8};
    use std::sync::Arc;

    #[test]
    fn computed_derives_from_context() {
        let s = Struct::new(vec![
            Field::new("width", Arc::new(IntU8::be())),
            Field::new("height", Arc::new(IntU8::be())),
            Field::new("area", Arc::new(Computed::new(Expr::field("width") * Expr::field("height")))),
        ]);
        let v = s.parse(&[3, 4]).unwrap();
        assert_eq!(v.as_record().unwrap().get("area"), Some(&Value::Int(12)));
    }

    #[test]
    fn pointer_reads_elsewhere_and_restores_position() {
        let s = Struct::new(vec![
            Field::new("ptr", Arc::new(IntU8::be())),
            Field::new("value", Arc::new(Pointer::new(Expr::field("ptr"), Arc::new(IntU16::be())))),
            Field::new("next", Arc::new(IntU8::be())),
        ]);
        let v = s.parse(&[2, 0xAA, 0, 0, 0xCD]).unwrap();
        let record = v.as_record().unwrap();
        assert_eq!(record.get("value"), Some(&Value::Int(0)));
        assert_eq!(record.get("next"), Some(&Value::Int(0xAA)));
    }

    #[test]
    fn peek_does_not_advance_the_stream() {
        let s = Struct::new(vec![
            Field::new("peeked", Arc::new(Peek::new(Arc::new(IntU8::be())))),
            Field::new("real", Arc::new(IntU8::be())),
        ]);
        let v = s.parse(&[9]).unwrap();
        let record = v.as_record().unwrap();
        assert_eq!(record.get("peeked"), Some(&Value::Int(9)));
        assert_eq!(record.get("real"), Some(&Value::Int(9)));
    }

    #[test]
    fn tell_reports_position() {
        let s = Struct::new(vec![
            Field::new("a", Arc::new(IntU8::be())),
            Field::new("pos", Arc::new(Tell)),
        ]);
        let v = s.parse(&[1]).unwrap();
        assert_eq!(v.as_record().unwrap().get("pos"), Some(&Value::Int(1)));
    }

    #[test]
    fn raw_copy_captures_wire_bytes() {
        let con = RawCopy::new(Arc::new(IntU16::be()));
        let v = con.parse(&[0x01, 0x02]).unwrap();
        let record = v.as_record().unwrap();
        assert_eq!(record.get("value"), Some(&Value::Int(0x0102)));
        assert_eq!(record.get("data"), Some(&Value::Bytes(vec![0x01, 0x02])));
    }

    #[test]
    fn cancel_parsing_stops_greedy_range_without_erroring() {
        let item = Arc::new(crate::adapter::one_way(Arc::new(IntU8::be()), |v| {
            if v.as_int()? == 0 {
                Err(cancel_parsing())
            } else {
                Ok(v)
            }
        }));
        let range = GreedyRange::new(item).unwrap();
        let v = range.parse(&[1, 2, 0, 9]).unwrap();
        assert_eq!(v, Value::List(crate::value::List::from_vec(vec![Value::Int(1), Value::Int(2)])));
    }

    #[test]
    fn tell_and_seek_share_mode_marker_path() {
        let ctx = Context::root(Mode::Parsing, Record::new());
        assert_eq!(ctx.mode_marker(), "(parsing)");
    }
}
