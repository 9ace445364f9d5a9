//! `Transformed`: maps a subconstruct's parsed/built value through an
//! arbitrary pair of forward/inverse functions.

use crate::construct::{Con, Construct};
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::Stream;
use crate::value::Value;

type MapFn = std::sync::Arc<dyn Fn(Value) -> Result<Value> + Send + Sync>;

/// Wraps `subcon`, applying `decode` to every parsed value and `encode` to
/// every value about to be built, the inverse of `decode`.
#[derive(Clone)]
pub struct Transformed {
    subcon: Con,
    decode: MapFn,
    encode: MapFn,
}

impl std::fmt::Debug for Transformed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transformed").finish()
    }
}

impl Transformed {
    /// Wrap `subcon`, running every parsed value through `decode` and every
    /// value about to be built through `encode`.
    pub fn new(
        subcon: Con,
        decode: impl Fn(Value) -> Result<Value> + Send + Sync + 'static,
        encode: impl Fn(Value) -> Result<Value> + Send + Sync + 'static,
    ) -> Self {
        Transformed {
            subcon,
            decode: std::sync::Arc::new(decode),
            encode: std::sync::Arc::new(encode),
        }
    }
}

impl Construct for Transformed {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let raw = self.subcon.parse_in(stream, ctx, path).map_err(|e| e.attach_path(path))?;
        (self.decode)(raw).map_err(|e| e.attach_path(path))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let encoded = (self.encode)(value.clone()).map_err(|e| e.attach_path(path))?;
        self.subcon.build_in(&encoded, stream, ctx, path).map_err(|e| e.attach_path(path))
    }

    fn size_of_in(&self, ctx: &Context, path: &str) -> Result<usize> {
        self.subcon.size_of_in(ctx, path)
    }

    fn is_fixed_size(&self) -> bool {
        self.subcon.is_fixed_size()
    }
}

/// A `Transformed` whose forward function has no meaningful inverse — builds
/// always fail with [`ErrorKind::Other`].
pub fn one_way(subcon: Con, decode: impl Fn(Value) -> Result<Value> + Send + Sync + 'static) -> Transformed {
    Transformed::new(subcon, decode, |_| {
        Err(Error::new(ErrorKind::Other(
            "this transform has no inverse and cannot be built".to_string(),
        )))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::ConstructExt;
    use crate::primitive::int::IntU32;
    use std::sync::Arc;

    #[test]
    fn doubles_on_parse_and_halves_on_build() {
        let con = Transformed::new(
            Arc::new(IntU32::be()),
            |v| Ok(Value::Int(v.as_count()? as i128 * 2)),
            |v| Ok(Value::Int(v.as_count()? as i128 / 2)),
        );
        let parsed = con.parse(&[0, 0, 0, 21]).unwrap();
        assert_eq!(parsed, Value::Int(42));
        assert_eq!(con.build(&parsed).unwrap(), vec![0, 0, 0, 21]);
    }

    #[test]
    fn one_way_transform_rejects_build() {
        let con = one_way(Arc::new(IntU32::be()), |v| Ok(v));
        assert!(con.build(&Value::Int(5)).is_err());
    }
}
