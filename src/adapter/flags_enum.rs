//! `FlagsEnum`: decomposes an integer into named bit flags.

use crate::construct::{Con, Construct};
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::Stream;
use crate::value::{Record, Value};

/// Reads `subcon`'s integer and reports, for every `(name, bit_mask)` pair,
/// whether that mask was set — a `Record` of `name -> Bool`. Building ORs
/// together the masks of every field present and truthy.
#[derive(Clone)]
pub struct FlagsEnum {
    subcon: Con,
    flags: Vec<(String, i128)>,
}

impl std::fmt::Debug for FlagsEnum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FlagsEnum").field("flags", &self.flags).finish()
    }
}

impl FlagsEnum {
    /// `subcon` supplies the wire integer; `flags` names each bit mask.
    pub fn new(subcon: Con, flags: Vec<(String, i128)>) -> Self {
        FlagsEnum { subcon, flags }
    }
}

impl Construct for FlagsEnum {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let raw = self.subcon.parse_in(stream, ctx, path).map_err(|e| e.attach_path(path))?.as_int()?;
        let mut out = Record::new();
        for (name, mask) in &self.flags {
            out.insert(name.clone(), Value::Bool(raw & mask == *mask && *mask != 0));
        }
        Ok(Value::Record(out))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let record = value.as_record()?;
        let mut raw: i128 = 0;
        for (name, mask) in &self.flags {
            let set = record
                .get(name)
                .ok_or_else(|| Error::new(ErrorKind::MissingContextKey(name.clone())).attach_path(path))?
                .as_bool()?;
            if set {
                raw |= mask;
            }
        }
        self.subcon.build_in(&Value::Int(raw), stream, ctx, path).map_err(|e| e.attach_path(path))?;
        self.parse_in_memory(raw)
    }

    fn size_of_in(&self, ctx: &Context, path: &str) -> Result<usize> {
        self.subcon.size_of_in(ctx, path)
    }

    fn is_fixed_size(&self) -> bool {
        self.subcon.is_fixed_size()
    }
}

impl FlagsEnum {
    fn parse_in_memory(&self, raw: i128) -> Result<Value> {
        let mut out = Record::new();
        for (name, mask) in &self.flags {
            out.insert(name.clone(), Value::Bool(raw & mask == *mask && *mask != 0));
        }
        Ok(Value::Record(out))
    }
}
