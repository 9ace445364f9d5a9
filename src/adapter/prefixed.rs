//! Length-prefixed wrappers: `Prefixed` (a byte-length header ahead of an
//! arbitrary subconstruct) and `PrefixedArray` (a count header ahead of a
//! homogeneous repetition).

use crate::construct::{extend_path, Con, Construct};
use crate::context::Context;
use crate::error::Result;
use crate::stream::{self, BoundedStream, Stream};
use crate::value::{List, Value};

/// `length_con` reads/writes a byte count; `subcon` is parsed/built from
/// exactly that many bytes, bounded so it cannot overrun into what follows.
#[derive(Clone)]
pub struct Prefixed {
    length_con: Con,
    subcon: Con,
}

impl std::fmt::Debug for Prefixed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Prefixed").finish()
    }
}

impl Prefixed {
    /// Wrap `subcon`, preceded on the wire by a byte count read via
    /// `length_con`.
    pub fn new(length_con: Con, subcon: Con) -> Self {
        Prefixed { length_con, subcon }
    }
}

impl Construct for Prefixed {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let len = self.length_con.parse_in(stream, ctx, path).map_err(|e| e.attach_path(path))?.as_count()?;
        let start = stream::tell(stream)?;
        let mut bounded = BoundedStream::new(stream, start, len as u64)?;
        let value_path = extend_path(path, "value");
        let v = self.subcon.parse_in(&mut bounded, ctx, &value_path).map_err(|e| e.attach_path(&value_path))?;
        stream::seek(stream, std::io::SeekFrom::Start(start + len as u64))?;
        Ok(v)
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let mut buf = std::io::Cursor::new(Vec::new());
        let value_path = extend_path(path, "value");
        let built = self.subcon.build_in(value, &mut buf, ctx, &value_path).map_err(|e| e.attach_path(&value_path))?;
        let bytes = buf.into_inner();
        self.length_con.build_in(&Value::Int(bytes.len() as i128), stream, ctx, path).map_err(|e| e.attach_path(path))?;
        stream::write_all(stream, &bytes)?;
        Ok(built)
    }

    fn size_of_in(&self, ctx: &Context, path: &str) -> Result<usize> {
        let len_size = self.length_con.size_of_in(ctx, path)?;
        let payload_size = self.subcon.size_of_in(ctx, path)?;
        Ok(len_size + payload_size)
    }

    fn is_fixed_size(&self) -> bool {
        self.length_con.is_fixed_size() && self.subcon.is_fixed_size()
    }
}

/// `length_con` reads/writes an item count; exactly that many `item`s follow.
#[derive(Clone)]
pub struct PrefixedArray {
    length_con: Con,
    item: Con,
}

impl std::fmt::Debug for PrefixedArray {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrefixedArray").finish()
    }
}

impl PrefixedArray {
    /// Wrap `item`, repeated a count read via `length_con`.
    pub fn new(length_con: Con, item: Con) -> Self {
        PrefixedArray { length_con, item }
    }
}

impl Construct for PrefixedArray {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let count = self.length_con.parse_in(stream, ctx, path).map_err(|e| e.attach_path(path))?.as_count()?;
        let mut out = List::new();
        for i in 0..count {
            let mut item_ctx = ctx.child_at_index(i as u64);
            let item_path = extend_path(path, &i.to_string());
            out.push(self.item.parse_in(stream, &mut item_ctx, &item_path).map_err(|e| e.attach_path(&item_path))?);
        }
        Ok(Value::List(out))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let list = value.as_list()?;
        self.length_con.build_in(&Value::Int(list.len() as i128), stream, ctx, path).map_err(|e| e.attach_path(path))?;
        let mut out = List::new();
        for (i, item) in list.iter().enumerate() {
            let mut item_ctx = ctx.child_at_index(i as u64);
            let item_path = extend_path(path, &i.to_string());
            out.push(self.item.build_in(item, stream, &mut item_ctx, &item_path).map_err(|e| e.attach_path(&item_path))?);
        }
        Ok(Value::List(out))
    }

    fn size_of_in(&self, _ctx: &Context, path: &str) -> Result<usize> {
        Err(crate::error::Error::new(crate::error::ErrorKind::SizeUnknown).attach_path(path))
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
    use crate::primitive::int::IntU8;
    use std::sync::Arc;

    #[test]
    fn prefixed_bounds_the_subcon() {
        let con = Prefixed::new(Arc::new(IntU8::be()), Arc::new(GreedyBytes));
        let v = con.parse(&[2, 0xAA, 0xBB, 0xFF]).unwrap();
        assert_eq!(v, Value::Bytes(vec![0xAA, 0xBB]));
    }

    #[test]
    fn prefixed_build_round_trip() {
        let con = Prefixed::new(Arc::new(IntU8::be()), Arc::new(GreedyBytes));
        let built = con.build(&Value::Bytes(vec![1, 2, 3])).unwrap();
        assert_eq!(built, vec![3, 1, 2, 3]);
    }

    #[test]
    fn prefixed_array_round_trip() {
        let con = PrefixedArray::new(Arc::new(IntU8::be()), Arc::new(IntU8::be()));
        let built = con.build(&Value::List(List::from_vec(vec![Value::Int(7), Value::Int(8)]))).unwrap();
        assert_eq!(built, vec![2, 7, 8]);
        assert_eq!(con.parse(&built).unwrap(), Value::List(List::from_vec(vec![Value::Int(7), Value::Int(8)])));
    }
}
