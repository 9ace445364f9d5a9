//! `Array`: a homogeneous repetition of one subconstruct, repeated either a
//! fixed number of times or a number computed from context at parse/build
//! time (`this.width * this.height`-style counts).

use crate::construct::{extend_path, Con, Construct};
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::expr::Expr;
use crate::stream::Stream;
use crate::value::{List, Value};

/// How many times an [`Array`] repeats its item.
#[derive(Clone)]
enum Count {
    Fixed(usize),
    Expr(Expr),
}

/// `count` repetitions of `item`, each parsed/built under a fresh
/// `_index`-tagged child frame.
#[derive(Clone)]
pub struct Array {
    count: Count,
    item: Con,
}

impl std::fmt::Debug for Array {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Array").finish()
    }
}

impl Array {
    /// A statically known number of repetitions.
    pub fn new(count: usize, item: Con) -> Self {
        Array { count: Count::Fixed(count), item }
    }

    /// A repetition count evaluated from context on every parse/build (e.g.
    /// `Expr::field("width") * Expr::field("height")`).
    pub fn with_count(count: Expr, item: Con) -> Self {
        Array { count: Count::Expr(count), item }
    }

    fn resolve_count(&self, ctx: &Context, path: &str) -> Result<usize> {
        match &self.count {
            Count::Fixed(n) => Ok(*n),
            Count::Expr(expr) => expr.evaluate(ctx)?.as_count().map_err(|e| e.attach_path(path)),
        }
    }
}

impl Construct for Array {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let count = self.resolve_count(ctx, path)?;
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
        let count = self.resolve_count(ctx, path)?;
        if list.len() != count {
            return Err(Error::new(ErrorKind::WrongCount { expected: count, actual: list.len() }).attach_path(path));
        }
        let mut out = List::new();
        for (i, item) in list.iter().enumerate() {
            let mut item_ctx = ctx.child_at_index(i as u64);
            let item_path = extend_path(path, &i.to_string());
            out.push(self.item.build_in(item, stream, &mut item_ctx, &item_path).map_err(|e| e.attach_path(&item_path))?);
        }
        Ok(Value::List(out))
    }

    fn size_of_in(&self, ctx: &Context, path: &str) -> Result<usize> {
        let count = self.resolve_count(ctx, path)?;
        let item_ctx = ctx.child_at_index(0);
        Ok(self.item.size_of_in(&item_ctx, path)? * count)
    }

    fn is_fixed_size(&self) -> bool {
        matches!(self.count, Count::Fixed(_)) && self.item.is_fixed_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::ConstructExt;
    use crate::context::Mode;
    use crate::primitive::int::IntU8;
    use crate::value::Record;
    use std::sync::Arc;

    #[test]
    fn fixed_count_round_trip() {
        let arr = Array::new(3, Arc::new(IntU8::be()));
        let v = arr.parse(&[1, 2, 3]).unwrap();
        assert_eq!(v, Value::List(List::from_vec(vec![Value::Int(1), Value::Int(2), Value::Int(3)])));
        assert_eq!(arr.build(&v).unwrap(), vec![1, 2, 3]);
        assert_eq!(arr.sizeof().unwrap(), 3);
    }

    #[test]
    fn wrong_count_rejected_on_build() {
        let arr = Array::new(2, Arc::new(IntU8::be()));
        let v = Value::List(List::from_vec(vec![Value::Int(1)]));
        assert!(arr.build(&v).is_err());
    }

    #[test]
    fn context_expression_count() {
        let arr = Array::with_count(Expr::field("width") * Expr::field("height"), Arc::new(IntU8::be()));
        let mut ctx = Context::root(Mode::Parsing, Record::new());
        ctx.bind("width", Value::Int(2)).unwrap();
        ctx.bind("height", Value::Int(3)).unwrap();
        let v = arr.parse_in(&mut std::io::Cursor::new(vec![1, 2, 3, 4, 5, 6]), &mut ctx, "(parsing)").unwrap();
        assert_eq!(v.as_list().unwrap().len(), 6);
    }
}
