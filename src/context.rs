//! The chained, parent-linked context frame threaded through parse/build.

use std::rc::Rc;

use crate::error::{Error, ErrorKind, Result};
use crate::value::{Record, Value};

/// Reserved context key names a user-declared field may never shadow.
pub const RESERVED_KEYS: &[&str] = &[
    "_", "_root", "_params", "_io", "_index", "_parsing", "_building", "_sizing", "_subcons",
];

/// Reject a field name that collides with a [`RESERVED_KEYS`] entry.
pub fn check_not_reserved(name: &str) -> Result<()> {
    if RESERVED_KEYS.contains(&name) {
        Err(Error::new(ErrorKind::ReservedName(name.to_string())))
    } else {
        Ok(())
    }
}

/// Which of the three mutually-exclusive operations is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `_parsing = true`
    Parsing,
    /// `_building = true`
    Building,
    /// `_sizing = true`
    Sizing,
}

/// A single frame of the context chain.
///
/// Frames form a parent-linked tree for the duration of one top-level
/// `parse`/`build`/`size_of` invocation: every composite pushes a child frame
/// before descending, and that frame (plus everything above it) is dropped
/// once the composite returns.
#[derive(Debug, Clone)]
pub struct Context {
    bindings: Record,
    parent: Option<Rc<Context>>,
    params: Rc<Record>,
    mode: Mode,
    index: Option<u64>,
}

impl Context {
    /// Build the outermost (root) frame for a fresh invocation.
    pub fn root(mode: Mode, params: Record) -> Self {
        Context {
            bindings: Record::new(),
            parent: None,
            params: Rc::new(params),
            mode,
            index: None,
        }
    }

    /// Build a standalone frame pre-seeded with `bindings`, bypassing the
    /// reserved-key gate. Used internally to give `_params`/`_root` lookups
    /// a record-shaped receiver for `Expr::Attr` to index into.
    pub fn root_with_bindings(bindings: Record) -> Self {
        Context {
            bindings,
            parent: None,
            params: Rc::new(Record::new()),
            mode: Mode::Parsing,
            index: None,
        }
    }

    /// Push a child frame linked to `self`, inheriting mode and params.
    /// Takes `&self` rather than `&Rc<Self>`: the parent link is an owned
    /// `Rc` clone of the frame's current state, so callers don't need to
    /// have wrapped their `Context` in an `Rc` up front.
    pub fn child(&self) -> Context {
        Context {
            bindings: Record::new(),
            parent: Some(Rc::new(self.clone())),
            params: Rc::clone(&self.params),
            mode: self.mode,
            index: None,
        }
    }

    /// Same as [`Context::child`], but also sets `_index` for the new frame
    /// (used by `Array`/range composites on each iteration).
    pub fn child_at_index(&self, index: u64) -> Context {
        let mut c = self.child();
        c.index = Some(index);
        c
    }

    /// Record a parsed/built named peer in this frame.
    pub fn bind(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let name = name.into();
        check_not_reserved(&name)?;
        self.bindings.insert(name, value);
        Ok(())
    }

    /// Look up a peer bound directly in this frame (not the parent chain).
    pub fn get_local(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// This frame's bindings as a record (used by `Expr::This`).
    pub fn bindings(&self) -> &Record {
        &self.bindings
    }

    /// The parent frame, if any.
    pub fn parent(&self) -> Option<&Context> {
        self.parent.as_deref()
    }

    /// Walk up to the outermost frame.
    pub fn root_frame(&self) -> &Context {
        let mut cur = self;
        while let Some(p) = cur.parent() {
            cur = p;
        }
        cur
    }

    /// External parameters supplied to the top-level call.
    pub fn params(&self) -> &Record {
        &self.params
    }

    /// The active operation.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The nearest enclosing `_index`, if this frame (or an ancestor
    /// created by an `Array`/range) set one.
    pub fn index(&self) -> Option<u64> {
        self.index
    }

    /// Path-marker prefix for the active operation, e.g. `(parsing)`.
    pub fn mode_marker(&self) -> &'static str {
        match self.mode {
            Mode::Parsing => "(parsing)",
            Mode::Building => "(building)",
            Mode::Sizing => "(sizing)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_names_rejected() {
        let mut ctx = Context::root(Mode::Parsing, Record::new());
        assert!(ctx.bind("_root", Value::Int(1)).is_err());
        assert!(ctx.bind("width", Value::Int(1)).is_ok());
    }

    #[test]
    fn child_isolated_from_parent() {
        let mut root = Context::root(Mode::Parsing, Record::new());
        root.bind("a", Value::Int(1)).unwrap();
        let root = Rc::new(root);
        let mut child = root.child();
        child.bind("b", Value::Int(2)).unwrap();
        assert_eq!(child.get_local("a"), None);
        assert_eq!(root.get_local("b"), None);
        assert_eq!(child.parent().unwrap().get_local("a"), Some(&Value::Int(1)));
    }

    #[test]
    fn root_frame_is_stable_across_depth() {
        let root = Rc::new(Context::root(Mode::Building, Record::new()));
        let mid = Rc::new(root.child());
        let leaf = mid.child();
        assert_eq!(leaf.root_frame().mode(), Mode::Building);
        assert!(leaf.root_frame().parent().is_none());
    }
}
