//! The dynamic value space that flows through parse/build.

use crate::error::{Error, ErrorKind, Result};

/// A value produced by parsing, or consumed by building.
///
/// A single closed enum rather than a generic type parameter per construct:
/// construct trees are assembled and introspected at runtime, so the value
/// space has to be runtime-uniform too.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Value {
    /// Any integer width/signedness collapses to this; wide enough to hold
    /// `u64::MAX` and negative zig-zag values alike.
    Int(i128),
    /// An IEEE-754 float (16/32/64 bit all decode into this).
    Float(f64),
    /// A boolean flag.
    Bool(bool),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// Decoded text.
    Str(String),
    /// An ordered, named mapping (`Struct` output).
    Record(Record),
    /// An ordered, unnamed list (`Sequence`/`Array`/range output).
    List(List),
    /// A symbol tagged with both its name (when known) and its integer value
    /// (`Enum`'s parse result).
    Enum {
        /// `None` when the integer had no matching mapping entry.
        name: Option<String>,
        /// The underlying integer discriminant.
        value: i128,
    },
    /// The unit value (`Computed`, `Pass`, `Padding`, ...).
    Unit,
}

impl Value {
    /// View as an integer, if this value is one.
    pub fn as_int(&self) -> Result<i128> {
        match self {
            Value::Int(i) => Ok(*i),
            Value::Enum { value, .. } => Ok(*value),
            Value::Bool(b) => Ok(*b as i128),
            other => Err(Error::new(ErrorKind::Other(format!(
                "expected an integer, got {other:?}"
            )))),
        }
    }

    /// View as a `usize` count, if this value is a non-negative integer.
    pub fn as_count(&self) -> Result<usize> {
        let i = self.as_int()?;
        usize::try_from(i).map_err(|_| Error::new(ErrorKind::IntegerOutOfRange))
    }

    /// View as a float, if this value is a float or integer.
    pub fn as_float(&self) -> Result<f64> {
        match self {
            Value::Float(f) => Ok(*f),
            Value::Int(i) => Ok(*i as f64),
            other => Err(Error::new(ErrorKind::Other(format!(
                "expected a float, got {other:?}"
            )))),
        }
    }

    /// View as a bool.
    pub fn as_bool(&self) -> Result<bool> {
        match self {
            Value::Bool(b) => Ok(*b),
            Value::Int(i) => Ok(*i != 0),
            other => Err(Error::new(ErrorKind::Other(format!(
                "expected a bool, got {other:?}"
            )))),
        }
    }

    /// View as bytes.
    pub fn as_bytes(&self) -> Result<&[u8]> {
        match self {
            Value::Bytes(b) => Ok(b),
            other => Err(Error::new(ErrorKind::Other(format!(
                "expected bytes, got {other:?}"
            )))),
        }
    }

    /// View as text.
    pub fn as_str(&self) -> Result<&str> {
        match self {
            Value::Str(s) => Ok(s),
            other => Err(Error::new(ErrorKind::Other(format!(
                "expected a string, got {other:?}"
            )))),
        }
    }

    /// View as a record.
    pub fn as_record(&self) -> Result<&Record> {
        match self {
            Value::Record(r) => Ok(r),
            other => Err(Error::new(ErrorKind::Other(format!(
                "expected a record, got {other:?}"
            )))),
        }
    }

    /// View as a list.
    pub fn as_list(&self) -> Result<&List> {
        match self {
            Value::List(l) => Ok(l),
            other => Err(Error::new(ErrorKind::Other(format!(
                "expected a list, got {other:?}"
            )))),
        }
    }
}

impl From<i128> for Value {
    fn from(i: i128) -> Self {
        Value::Int(i)
    }
}
impl From<u64> for Value {
    fn from(i: u64) -> Self {
        Value::Int(i as i128)
    }
}
impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i as i128)
    }
}
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}
impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}
impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

/// An ordered mapping from field name to [`Value`], preserving insertion
/// order (a `Vec` of pairs, not a hash map, so parsed records round-trip
/// byte-for-byte in field order).
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    entries: Vec<(String, Value)>,
}

impl Record {
    /// An empty record.
    pub fn new() -> Self {
        Record::default()
    }

    /// Insert or overwrite a field, preserving the original position on
    /// overwrite and appending on new insertion.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        if let Some(slot) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }

    /// Look up a field by name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Iterate `(name, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this record has no fields.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recursively find the first value whose field name equals `name`,
    /// descending into nested records/lists.
    pub fn find(&self, name: &str) -> Option<&Value> {
        self.find_all(name).into_iter().next()
    }

    /// Recursively find every value whose field name equals `name`.
    pub fn find_all(&self, name: &str) -> Vec<&Value> {
        let mut out = Vec::new();
        for (n, v) in self.iter() {
            if n == name {
                out.push(v);
            }
            collect_nested(v, &mut |nested_name, nested_value| {
                if nested_name == name {
                    out.push(nested_value);
                }
            });
        }
        out
    }

    /// Recursively find every value whose field name matches `pattern`.
    #[cfg(feature = "regex-search")]
    pub fn find_all_regex(&self, pattern: &str) -> Result<Vec<&Value>> {
        let re = regex::Regex::new(pattern)
            .map_err(|e| Error::new(ErrorKind::Other(format!("bad regex: {e}"))))?;
        let mut out = Vec::new();
        for (n, v) in self.iter() {
            if re.is_match(n) {
                out.push(v);
            }
            collect_nested(v, &mut |nested_name, nested_value| {
                if re.is_match(nested_name) {
                    out.push(nested_value);
                }
            });
        }
        Ok(out)
    }
}

/// Walk nested records/lists, invoking `f(name, value)` for every named
/// field reachable below `value` (not including `value`'s own top-level
/// siblings, which the caller already iterates).
fn collect_nested<'a>(value: &'a Value, f: &mut dyn FnMut(&'a str, &'a Value)) {
    match value {
        Value::Record(r) => {
            for (n, v) in r.iter() {
                f(n, v);
                collect_nested(v, f);
            }
        }
        Value::List(l) => {
            for v in l.iter() {
                collect_nested(v, f);
            }
        }
        _ => {}
    }
}

/// An ordered, unnamed sequence of values.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct List {
    items: Vec<Value>,
}

impl List {
    /// An empty list.
    pub fn new() -> Self {
        List::default()
    }

    /// Build a list from an existing vector of values.
    pub fn from_vec(items: Vec<Value>) -> Self {
        List { items }
    }

    /// Append a value.
    pub fn push(&mut self, value: Value) {
        self.items.push(value);
    }

    /// Number of items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether this list has no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate items in order.
    pub fn iter(&self) -> impl Iterator<Item = &Value> {
        self.items.iter()
    }

    /// Borrow the underlying vector.
    pub fn as_slice(&self) -> &[Value] {
        &self.items
    }

    /// Consume into the underlying vector.
    pub fn into_vec(self) -> Vec<Value> {
        self.items
    }

    /// Recursively find the first value whose field name equals `name`,
    /// descending into nested records/lists carried by this list's items.
    pub fn find(&self, name: &str) -> Option<&Value> {
        self.find_all(name).into_iter().next()
    }

    /// Recursively find every value whose field name equals `name`.
    pub fn find_all(&self, name: &str) -> Vec<&Value> {
        let mut out = Vec::new();
        for v in self.iter() {
            collect_nested(v, &mut |nested_name, nested_value| {
                if nested_name == name {
                    out.push(nested_value);
                }
            });
        }
        out
    }
}

impl FromIterator<Value> for List {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        List {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_preserves_insertion_order() {
        let mut r = Record::new();
        r.insert("b", Value::Int(2));
        r.insert("a", Value::Int(1));
        let names: Vec<_> = r.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn record_overwrite_keeps_position() {
        let mut r = Record::new();
        r.insert("a", Value::Int(1));
        r.insert("b", Value::Int(2));
        r.insert("a", Value::Int(99));
        let names: Vec<_> = r.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(r.get("a"), Some(&Value::Int(99)));
    }

    #[test]
    fn recursive_find_descends_nested_records() {
        let mut inner = Record::new();
        inner.insert("width", Value::Int(3));
        let mut outer = Record::new();
        outer.insert("header", Value::Record(inner));
        assert_eq!(outer.find("width"), Some(&Value::Int(3)));
        assert!(outer.find("height").is_none());
    }

    #[test]
    fn find_all_collects_every_match() {
        let mut a = Record::new();
        a.insert("x", Value::Int(1));
        let mut b = Record::new();
        b.insert("x", Value::Int(2));
        let list = List::from_vec(vec![Value::Record(a), Value::Record(b)]);
        assert_eq!(list.find_all("x").len(), 2);
    }
}
