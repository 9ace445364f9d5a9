//! `RepeatUntil`: repeat a subconstruct until a predicate over the just-
//! produced item says to stop (the stopping item is included in the result).

use std::rc::Rc;

use crate::construct::{extend_path, Con, Construct};
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::value::{List, Value};

/// The predicate signature: given the most recently parsed/built item and
/// the context it happened under, decide whether to stop.
pub type Predicate = Rc<dyn Fn(&Value, &Context) -> Result<bool>>;

/// Repeats `item`, checking `predicate(item, ctx)` after every iteration;
/// stops (including that item) the first time it returns `true`.
#[derive(Clone)]
pub struct RepeatUntil {
    predicate: Predicate,
    item: Con,
}

impl std::fmt::Debug for RepeatUntil {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RepeatUntil").finish()
    }
}

impl RepeatUntil {
    /// Wrap `item`, stopping once `predicate` returns `true`.
    pub fn new(predicate: impl Fn(&Value, &Context) -> Result<bool> + 'static, item: Con) -> Self {
        RepeatUntil { predicate: Rc::new(predicate), item }
    }
}

impl Construct for RepeatUntil {
    fn parse_in(&self, stream: &mut dyn crate::stream::Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let mut out = List::new();
        let mut i = 0u64;
        loop {
            let mut item_ctx = ctx.child_at_index(i);
            let item_path = extend_path(path, &i.to_string());
            let v = match self.item.parse_in(stream, &mut item_ctx, &item_path) {
                Ok(v) => v,
                Err(e) if e.kind == ErrorKind::StrayCancelParsing => break,
                Err(e) => return Err(e.attach_path(&item_path)),
            };
            let stop = (self.predicate)(&v, &item_ctx)?;
            out.push(v);
            if stop {
                break;
            }
            i += 1;
            if i > 10_000_000 {
                return Err(Error::new(ErrorKind::PredicateNeverSatisfied).attach_path(path));
            }
        }
        Ok(Value::List(out))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn crate::stream::Stream, ctx: &mut Context, path: &str) -> Result<Value> {
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
    use crate::primitive::int::IntU8;
    use std::sync::Arc;

    #[test]
    fn stops_on_sentinel_value() {
        let repeat = RepeatUntil::new(|v, _ctx| Ok(v.as_int()? == 0), Arc::new(IntU8::be()));
        let v = repeat.parse(&[1, 2, 0, 99]).unwrap();
        assert_eq!(v, Value::List(List::from_vec(vec![Value::Int(1), Value::Int(2), Value::Int(0)])));
    }

    #[test]
    fn predicate_never_satisfied_errors() {
        let repeat = RepeatUntil::new(|v, _ctx| Ok(v.as_int()? == 255), Arc::new(IntU8::be()));
        assert!(repeat.parse(&[1, 2, 3]).is_err());
    }
}
