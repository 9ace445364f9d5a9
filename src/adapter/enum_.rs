//! `Enum`: maps an underlying integer to (and from) a symbolic name.

use crate::construct::{Con, Construct};
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::Stream;
use crate::value::Value;

/// Decodes `subcon`'s integer through a name<->value table. Unknown values
/// parse to `Value::Enum { name: None, value }` rather than erroring —
/// matching the source toolkit's permissive parse side — but building an
/// unmapped name is always an error (there is no integer to emit).
#[derive(Clone)]
pub struct Enum {
    subcon: Con,
    mapping: Vec<(String, i128)>,
}

impl std::fmt::Debug for Enum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Enum").field("mapping", &self.mapping).finish()
    }
}

impl Enum {
    /// `subcon` supplies the wire integer; `mapping` is the name<->value
    /// table, checked in order.
    pub fn new(subcon: Con, mapping: Vec<(String, i128)>) -> Self {
        Enum { subcon, mapping }
    }

    fn name_for(&self, value: i128) -> Option<String> {
        self.mapping.iter().find(|(_, v)| *v == value).map(|(n, _)| n.clone())
    }

    fn value_for(&self, name: &str) -> Option<i128> {
        self.mapping.iter().find(|(n, _)| n == name).map(|(_, v)| *v)
    }
}

impl Construct for Enum {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let value = self.subcon.parse_in(stream, ctx, path).map_err(|e| e.attach_path(path))?.as_int()?;
        Ok(Value::Enum { name: self.name_for(value), value })
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let raw = match value {
            Value::Str(name) => self
                .value_for(name)
                .ok_or_else(|| Error::new(ErrorKind::UnknownSymbol(name.clone())).attach_path(path))?,
            Value::Enum { name: Some(name), .. } => self
                .value_for(name)
                .ok_or_else(|| Error::new(ErrorKind::UnknownSymbol(name.clone())).attach_path(path))?,
            Value::Enum { name: None, value } | Value::Int(value) => *value,
            other => {
                return Err(Error::new(ErrorKind::Other(format!("cannot build Enum from {other:?}"))).attach_path(path))
            }
        };
        self.subcon.build_in(&Value::Int(raw), stream, ctx, path).map_err(|e| e.attach_path(path))?;
        Ok(Value::Enum { name: self.name_for(raw), value: raw })
    }

    fn size_of_in(&self, ctx: &Context, path: &str) -> Result<usize> {
        self.subcon.size_of_in(ctx, path)
    }

    fn is_fixed_size(&self) -> bool {
        self.subcon.is_fixed_size()
    }
}
