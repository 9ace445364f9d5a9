//! `Sequence`: an ordered, unnamed list of (possibly heterogeneous)
//! subconstructs, parsed into (and built from) a [`List`].

use crate::construct::{extend_path, Con, Construct};
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::Stream;
use crate::value::{List, Value};

/// An ordered list of subconstructs, each parsed/built independently in
/// sequence (unlike `Struct`, elements have no names to bind as peers).
#[derive(Clone)]
pub struct Sequence {
    cons: Vec<Con>,
}

impl std::fmt::Debug for Sequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequence").field("len", &self.cons.len()).finish()
    }
}

impl Sequence {
    /// Build a sequence from its ordered subconstructs.
    pub fn new(cons: Vec<Con>) -> Self {
        Sequence { cons }
    }
}

impl Construct for Sequence {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let mut child = ctx.child();
        let mut out = List::new();
        for (i, con) in self.cons.iter().enumerate() {
            let item_path = extend_path(path, &i.to_string());
            out.push(con.parse_in(stream, &mut child, &item_path).map_err(|e| e.attach_path(&item_path))?);
        }
        Ok(Value::List(out))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let list = value.as_list()?;
        if list.len() != self.cons.len() {
            return Err(Error::new(ErrorKind::WrongCount { expected: self.cons.len(), actual: list.len() }).attach_path(path));
        }
        let mut child = ctx.child();
        let mut out = List::new();
        for (i, (con, item)) in self.cons.iter().zip(list.iter()).enumerate() {
            let item_path = extend_path(path, &i.to_string());
            out.push(con.build_in(item, stream, &mut child, &item_path).map_err(|e| e.attach_path(&item_path))?);
        }
        Ok(Value::List(out))
    }

    fn size_of_in(&self, ctx: &Context, path: &str) -> Result<usize> {
        let child = ctx.child();
        let mut total = 0;
        for (i, con) in self.cons.iter().enumerate() {
            total += con.size_of_in(&child, &extend_path(path, &i.to_string()))?;
        }
        Ok(total)
    }

    fn is_fixed_size(&self) -> bool {
        self.cons.iter().all(|c| c.is_fixed_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::ConstructExt;
    use crate::primitive::int::{IntU16, IntU8};
    use std::sync::Arc;

    #[test]
    fn heterogeneous_round_trip() {
        let seq = Sequence::new(vec![Arc::new(IntU8::be()), Arc::new(IntU16::be())]);
        let v = seq.parse(&[1, 0, 2]).unwrap();
        assert_eq!(v, Value::List(List::from_vec(vec![Value::Int(1), Value::Int(2)])));
        assert_eq!(seq.build(&v).unwrap(), vec![1, 0, 2]);
    }

    #[test]
    fn wrong_length_errors_on_build() {
        let seq = Sequence::new(vec![Arc::new(IntU8::be())]);
        let v = Value::List(List::from_vec(vec![Value::Int(1), Value::Int(2)]));
        assert!(seq.build(&v).is_err());
    }
}
