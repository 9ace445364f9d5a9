//! The construct protocol: the one contract every node in the tree
//! implements, and the top-level entry points built on top of it.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use std::rc::Rc;
use std::sync::Arc;

use crate::context::{Context, Mode};
use crate::error::{Error, ErrorKind, Result};
use crate::value::{Record, Value};

/// The uniform contract every construct node implements.
///
/// Modeled as a `dyn` trait object family rather than a closed enum:
/// composition sugar (`A + B`, `A >> B`) and third-party adapters both need
/// to mix arbitrary construct kinds in one tree, which an open trait object
/// set supports and a closed enum does not.
pub trait Construct: std::fmt::Debug {
    /// Parse a value from `stream` under `ctx`, with `path` naming where in
    /// the tree this call is happening (for error messages only).
    fn parse_in(&self, stream: &mut dyn crate::stream::Stream, ctx: &mut Context, path: &str)
        -> Result<Value>;

    /// Build `value` into `stream` under `ctx`; returns the value that was
    /// actually written (composites may need to reflect computed fields back
    /// to the caller).
    fn build_in(
        &self,
        value: &Value,
        stream: &mut dyn crate::stream::Stream,
        ctx: &mut Context,
        path: &str,
    ) -> Result<Value>;

    /// The byte length this construct would occupy, if statically
    /// determinable from `ctx` alone.
    fn size_of_in(&self, ctx: &Context, path: &str) -> Result<usize>;

    /// Whether [`Construct::size_of_in`] ever depends on `ctx` (false) or is
    /// always the same regardless of context (true).
    fn is_fixed_size(&self) -> bool;

    /// The name this subconstruct was given by its enclosing composite, if
    /// any.
    fn name(&self) -> Option<&str> {
        None
    }

    /// Whether this construct is guaranteed to consume input (or otherwise
    /// make progress) on every successful parse. `GreedyRange`/`RepeatUntil`
    /// refuse to wrap a repeated element that answers `false` here, which is
    /// how this crate forecloses the `Union(parsefrom=None)`-inside-a-greedy-
    /// consumer infinite-loop hazard documented as an open question.
    fn needs_progress(&self) -> bool {
        true
    }
}

/// A shared, reusable construct node. `Arc` because constructs are built
/// once and parsed/built against many times, often from multiple places in
/// a tree (and, per the concurrency model, potentially from multiple
/// threads as long as the `Stream`/`Context` passed in aren't shared).
pub type Con = Arc<dyn Construct>;

/// The path marker prepended at the very top of a call, before any composite
/// has extended it with a child name.
fn mode_path(mode: Mode) -> &'static str {
    match mode {
        Mode::Parsing => "(parsing)",
        Mode::Building => "(building)",
        Mode::Sizing => "(sizing)",
    }
}

/// Public entry points built once per `Arc<dyn Construct>`; the thin,
/// un-overridable half of the protocol described in spec 4.1.
pub trait ConstructExt {
    /// Parse `data` in full, with no external parameters.
    fn parse(&self, data: &[u8]) -> Result<Value>;
    /// Parse `data`, making `params` available as `_params`.
    fn parse_with(&self, data: &[u8], params: Record) -> Result<Value>;
    /// Parse directly from an arbitrary stream.
    fn parse_stream(&self, stream: &mut dyn crate::stream::Stream, params: Record) -> Result<Value>;
    /// Open `path` for binary reading and parse it.
    fn parse_file(&self, path: &Path) -> Result<Value>;

    /// Build `value` into a fresh byte vector.
    fn build(&self, value: &Value) -> Result<Vec<u8>>;
    /// Build `value`, making `params` available as `_params`.
    fn build_with(&self, value: &Value, params: Record) -> Result<Vec<u8>>;
    /// Build `value` directly into an arbitrary stream.
    fn build_stream(
        &self,
        value: &Value,
        stream: &mut dyn crate::stream::Stream,
        params: Record,
    ) -> Result<()>;
    /// Build `value` and write it to a new file at `path`.
    fn build_file(&self, value: &Value, path: &Path) -> Result<()>;

    /// The static size of this construct, if determinable with no context.
    fn sizeof(&self) -> Result<usize>;
    /// The static size of this construct, with `params` available.
    fn sizeof_with(&self, params: Record) -> Result<usize>;
}

impl<T: Construct + ?Sized> ConstructExt for T {
    #[tracing::instrument(name = "construct_parse", skip(self, data))]
    fn parse(&self, data: &[u8]) -> Result<Value> {
        self.parse_with(data, Record::new())
    }

    fn parse_with(&self, data: &[u8], params: Record) -> Result<Value> {
        let mut cursor = Cursor::new(data.to_vec());
        self.parse_stream(&mut cursor, params)
    }

    fn parse_stream(&self, stream: &mut dyn crate::stream::Stream, params: Record) -> Result<Value> {
        let mut ctx = Context::root(Mode::Parsing, params);
        let path = mode_path(Mode::Parsing);
        self.parse_in(stream, &mut ctx, path)
    }

    fn parse_file(&self, path: &Path) -> Result<Value> {
        let mut file = File::open(path).map_err(Error::from)?;
        self.parse_stream(&mut file, Record::new())
    }

    #[tracing::instrument(name = "construct_build", skip(self, value))]
    fn build(&self, value: &Value) -> Result<Vec<u8>> {
        self.build_with(value, Record::new())
    }

    fn build_with(&self, value: &Value, params: Record) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        self.build_stream(value, &mut cursor, params)?;
        Ok(cursor.into_inner())
    }

    fn build_stream(
        &self,
        value: &Value,
        stream: &mut dyn crate::stream::Stream,
        params: Record,
    ) -> Result<()> {
        let mut ctx = Context::root(Mode::Building, params);
        let path = mode_path(Mode::Building);
        self.build_in(value, stream, &mut ctx, path)?;
        Ok(())
    }

    fn build_file(&self, value: &Value, path: &Path) -> Result<()> {
        let mut file = File::create(path).map_err(Error::from)?;
        self.build_stream(value, &mut file, Record::new())
    }

    fn sizeof(&self) -> Result<usize> {
        self.sizeof_with(Record::new())
    }

    fn sizeof_with(&self, params: Record) -> Result<usize> {
        let ctx = Context::root(Mode::Sizing, params);
        let path = mode_path(Mode::Sizing);
        self.size_of_in(&ctx, path)
    }
}

/// Extend `path` with a child composite's field name, the way every
/// composite does before dispatching to a subconstruct (spec 4.8).
pub fn extend_path(path: &str, child: &str) -> String {
    format!("{path} -> {child}")
}

/// `Rc`-share a freshly built child [`Context`], the common pattern every
/// composite's `parse_in`/`build_in` needs (a frame is built once per call
/// and may need to be handed out as a `Parent`/`Root` anchor to nested
/// expressions).
pub fn child_context(ctx: &Context) -> Rc<Context> {
    Rc::new(ctx.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::int::IntU8;

    #[test]
    fn top_level_parse_build_roundtrip() {
        let con: Con = Arc::new(IntU8::be());
        let v = con.parse(&[42]).unwrap();
        assert_eq!(v, Value::Int(42));
        assert_eq!(con.build(&v).unwrap(), vec![42]);
    }

    #[test]
    fn sizeof_fixed_primitive() {
        let con: Con = Arc::new(IntU8::be());
        assert_eq!(con.sizeof().unwrap(), 1);
    }
}
