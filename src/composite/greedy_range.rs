//! `GreedyRange`: repeat a subconstruct until the stream is exhausted (on
//! build: until the supplied list runs out).

use crate::construct::{extend_path, Con, Construct};
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::{self, Stream};
use crate::value::{List, Value};

/// Repeats `item` for as long as bytes remain. Refuses to wrap a subcon that
/// answers `false` from [`Construct::needs_progress`] — such a subcon could
/// succeed without consuming input, looping forever.
#[derive(Clone)]
pub struct GreedyRange {
    item: Con,
}

impl std::fmt::Debug for GreedyRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GreedyRange").finish()
    }
}

impl GreedyRange {
    /// Wrap `item`; fails fast if `item` cannot guarantee forward progress.
    pub fn new(item: Con) -> Result<Self> {
        if !item.needs_progress() {
            return Err(Error::new(ErrorKind::Misaligned(
                "GreedyRange cannot wrap a subconstruct that may not consume input".to_string(),
            )));
        }
        Ok(GreedyRange { item })
    }
}

impl Construct for GreedyRange {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let mut out = List::new();
        let mut i = 0u64;
        loop {
            if stream::remaining(stream)? == 0 {
                break;
            }
            let mut item_ctx = ctx.child_at_index(i);
            let item_path = extend_path(path, &i.to_string());
            match self.item.parse_in(stream, &mut item_ctx, &item_path) {
                Ok(v) => out.push(v),
                Err(_) => break,
            }
            i += 1;
        }
        Ok(Value::List(out))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let list = value.as_list()?;
        let mut out = List::new();
        for (i, item) in list.iter().enumerate() {
            let mut item_ctx = ctx.child_at_index(i as u64);
            let item_path = extend_path(path, &i.to_string());
            out.push(self.item.build_in(item, stream, &mut item_ctx, &item_path).map_err(|e| e.attach_path(&item_path))?);
        }
        Ok(Value::List(out))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::ConstructExt;
    use crate::primitive::bytes::Pass;
    use crate::primitive::int::IntU8;
    use std::sync::Arc;

    #[test]
    fn consumes_until_eof() {
        let range = GreedyRange::new(Arc::new(IntU8::be())).unwrap();
        let v = range.parse(&[1, 2, 3]).unwrap();
        assert_eq!(v, Value::List(List::from_vec(vec![Value::Int(1), Value::Int(2), Value::Int(3)])));
    }

    #[test]
    fn empty_input_yields_empty_list() {
        let range = GreedyRange::new(Arc::new(IntU8::be())).unwrap();
        assert_eq!(range.parse(&[]).unwrap(), Value::List(List::new()));
    }

    #[test]
    fn rejects_non_progressing_subcon() {
        let err = GreedyRange::new(Arc::new(Pass));
        assert!(err.is_err());
    }
}
