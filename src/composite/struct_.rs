//! `Struct`: an ordered sequence of named subconstructs, parsed into (and
//! built from) a [`Record`], each field visible to every later field's
//! expressions via the shared child [`Context`].

use crate::construct::{extend_path, Con, Construct};
use crate::context::Context;
use crate::error::Result;
use crate::stream::Stream;
use crate::value::{Record, Value};

/// One named field of a [`Struct`].
#[derive(Clone)]
pub struct Field {
    pub(crate) name: String,
    pub(crate) con: Con,
}

impl Field {
    /// A field named `name`, parsed/built by `con`.
    pub fn new(name: impl Into<String>, con: Con) -> Self {
        Field { name: name.into(), con }
    }
}

/// An ordered record of named fields.
#[derive(Clone)]
pub struct Struct {
    fields: Vec<Field>,
}

impl std::fmt::Debug for Struct {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Struct")
            .field("fields", &self.fields.iter().map(|fld| &fld.name).collect::<Vec<_>>())
            .finish()
    }
}

impl Struct {
    /// Build a struct from its ordered fields.
    pub fn new(fields: Vec<Field>) -> Self {
        Struct { fields }
    }

    /// Append one more field, for the `+` composition sugar.
    pub fn push(&mut self, field: Field) {
        self.fields.push(field);
    }

    /// Append every field of `other`, for the `+` composition sugar.
    pub fn extend(&mut self, other: Struct) {
        self.fields.extend(other.fields);
    }
}

impl Construct for Struct {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let mut child = ctx.child();
        for field in &self.fields {
            let field_path = extend_path(path, &field.name);
            let v = field.con.parse_in(stream, &mut child, &field_path).map_err(|e| e.attach_path(&field_path))?;
            child.bind(field.name.clone(), v)?;
        }
        Ok(Value::Record(child.bindings().clone()))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let record = value.as_record()?;
        let mut child = ctx.child();
        let mut out = Record::new();
        for field in &self.fields {
            let field_path = extend_path(path, &field.name);
            let input = record.get(&field.name).cloned().unwrap_or(Value::Unit);
            // Earlier fields must already be bound before later ones build,
            // in case a later field's size/value is computed from them.
            child.bind(field.name.clone(), input.clone())?;
            let built = field.con.build_in(&input, stream, &mut child, &field_path).map_err(|e| e.attach_path(&field_path))?;
            child.bind(field.name.clone(), built.clone())?;
            out.insert(field.name.clone(), built);
        }
        Ok(Value::Record(out))
    }

    fn size_of_in(&self, ctx: &Context, path: &str) -> Result<usize> {
        let child = ctx.child();
        let mut total = 0;
        for field in &self.fields {
            let field_path = extend_path(path, &field.name);
            total += field.con.size_of_in(&child, &field_path)?;
        }
        Ok(total)
    }

    fn is_fixed_size(&self) -> bool {
        self.fields.iter().all(|f| f.con.is_fixed_size())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::ConstructExt;
    use crate::primitive::int::IntU8;
    use std::sync::Arc;

    #[test]
    fn parses_fields_in_order() {
        let s = Struct::new(vec![
            Field::new("a", Arc::new(IntU8::be())),
            Field::new("b", Arc::new(IntU8::be())),
        ]);
        let v = s.parse(&[1, 2]).unwrap();
        let record = v.as_record().unwrap();
        assert_eq!(record.get("a"), Some(&Value::Int(1)));
        assert_eq!(record.get("b"), Some(&Value::Int(2)));
    }

    #[test]
    fn builds_fields_in_order() {
        let s = Struct::new(vec![
            Field::new("a", Arc::new(IntU8::be())),
            Field::new("b", Arc::new(IntU8::be())),
        ]);
        let mut record = Record::new();
        record.insert("a", Value::Int(9));
        record.insert("b", Value::Int(10));
        assert_eq!(s.build(&Value::Record(record)).unwrap(), vec![9, 10]);
    }

    #[test]
    fn sizeof_sums_fixed_fields() {
        let s = Struct::new(vec![
            Field::new("a", Arc::new(IntU8::be())),
            Field::new("b", Arc::new(IntU8::be())),
        ]);
        assert_eq!(s.sizeof().unwrap(), 2);
    }
}
