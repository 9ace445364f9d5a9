//! Composition sugar: a thin, optionally-named wrapper around a [`Con`] with
//! `Add`/`Shr` operator impls for assembling `Struct`/`Sequence` trees
//! without spelling out `Struct::new(vec![...])` by hand, plus a handful of
//! chainable builder methods.
//!
//! Rust has no dynamic `/` operator to spell the source toolkit's
//! `"name" / subcon` naming idiom (the orphan rule forbids implementing
//! `Div` for a foreign `&str`), so naming goes through the [`field`]
//! constructor function instead.

use std::sync::Arc;

use crate::adapter::one_way;
use crate::composite::{self, Array, GreedyRange, Sequence, Struct};
use crate::construct::Con;
use crate::error::Result;
use crate::value::Value;

/// A subconstruct, optionally named, carrying optional documentation —
/// the unit `Add`/`Shr` operate over.
#[derive(Clone)]
pub struct Field {
    name: Option<String>,
    con: Con,
    docs: Option<String>,
}

impl Field {
    /// Wrap `con` with no name.
    pub fn anonymous(con: Con) -> Field {
        Field { name: None, con, docs: None }
    }

    /// Wrap `con`, named `name`.
    pub fn named(name: impl Into<String>, con: Con) -> Field {
        Field { name: Some(name.into()), con, docs: None }
    }

    /// This field's name, if it has one.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Unwrap into the plain subconstruct, discarding the name/docs.
    pub fn into_con(self) -> Con {
        self.con
    }

    /// Attached documentation, if any.
    pub fn docs_text(&self) -> Option<&str> {
        self.docs.as_deref()
    }

    /// `subcon.array(n)` sugar: repeat this field exactly `n` times.
    pub fn array(self, n: usize) -> Field {
        Field { name: self.name, con: Arc::new(Array::new(n, self.con)), docs: self.docs }
    }

    /// `subcon.greedy()` sugar: repeat this field until the stream runs out.
    pub fn greedy(self) -> Result<Field> {
        let con = Arc::new(GreedyRange::new(self.con)?);
        Ok(Field { name: self.name, con, docs: self.docs })
    }

    /// Attach a post-parse processing hook: `f` runs on every parsed value
    /// before it's bound; builds pass through unchanged, so `f` must not be
    /// relied on to be invertible.
    pub fn hooked(self, f: impl Fn(Value) -> Result<Value> + Send + Sync + 'static) -> Field {
        let con = Arc::new(one_way(self.con, f));
        Field { name: self.name, con, docs: self.docs }
    }

    /// Attach free-text documentation, carried alongside the field for
    /// tooling (schema dumps, generated docs) to pick up.
    pub fn docs(mut self, text: impl Into<String>) -> Field {
        self.docs = Some(text.into());
        self
    }

    fn require_name(&self, context: &str) -> String {
        self.name.clone().unwrap_or_else(|| panic!("{context} requires every operand to be named via `field(name, con)`"))
    }
}

/// Name `con` as `name`, the entry point into the `+`/`>>` sugar.
pub fn field(name: impl Into<String>, con: Con) -> Field {
    Field::named(name, con)
}

/// Wrap `con` with no name, for use on the right of `>>` (`Sequence`
/// members don't need one).
pub fn anon(con: Con) -> Field {
    Field::anonymous(con)
}

impl std::ops::Add<Field> for Field {
    type Output = Struct;
    fn add(self, rhs: Field) -> Struct {
        Struct::new(vec![
            composite::Field::new(self.require_name("Field + Field"), self.con),
            composite::Field::new(rhs.require_name("Field + Field"), rhs.con),
        ])
    }
}

impl std::ops::Add<Field> for Struct {
    type Output = Struct;
    fn add(mut self, rhs: Field) -> Struct {
        self.push(composite::Field::new(rhs.require_name("Struct + Field"), rhs.con));
        self
    }
}

impl std::ops::Add<Struct> for Field {
    type Output = Struct;
    fn add(self, rhs: Struct) -> Struct {
        let mut out = Struct::new(vec![composite::Field::new(self.require_name("Field + Struct"), self.con)]);
        out.extend(rhs);
        out
    }
}

impl std::ops::Add<Struct> for Struct {
    type Output = Struct;
    fn add(mut self, rhs: Struct) -> Struct {
        self.extend(rhs);
        self
    }
}

impl std::ops::Shr<Field> for Field {
    type Output = Field;
    fn shr(self, rhs: Field) -> Field {
        Field::anonymous(Arc::new(Sequence::new(vec![self.con, rhs.con])))
    }
}
