//! Error taxonomy shared by parse, build, and size-of.

use std::fmt;
use thiserror::Error;

/// Classifies *why* a parse/build/size-of operation failed, independent of
/// where in the construct tree it happened.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ErrorKind {
    /// Short read: the stream ran out of bytes before `needed` could be read.
    #[error("short read: needed {needed} bytes, {available} available")]
    ShortRead {
        /// Bytes requested.
        needed: usize,
        /// Bytes actually available.
        available: usize,
    },
    /// The underlying stream rejected a write.
    #[error("write failed: {0}")]
    Write(String),
    /// A seek landed outside the addressable range of the stream.
    #[error("seek out of range: offset {0}")]
    SeekOutOfRange(i64),
    /// A value did not fit the target integer encoding.
    #[error("integer out of range for the target encoding")]
    IntegerOutOfRange,
    /// A float was non-finite where finiteness was required.
    #[error("float is not finite")]
    NonFiniteFloat,
    /// Encoding/decoding text failed.
    #[error("string codec failure: {0}")]
    StringCodec(String),
    /// The requested encoding is not on the supported allow-list.
    #[error("encoding `{0}` is not supported")]
    UnsupportedEncoding(String),
    /// An `Array`/`Sequence` got the wrong number of items on build.
    #[error("expected count {expected}, got {actual}")]
    WrongCount {
        /// Expected item count.
        expected: usize,
        /// Actual item count supplied.
        actual: usize,
    },
    /// `RepeatUntil`'s predicate never returned true.
    #[error("repeat-until predicate was never satisfied")]
    PredicateNeverSatisfied,
    /// `Enum`/`FlagsEnum` build was given a name with no mapping.
    #[error("unknown symbol `{0}` for enum build")]
    UnknownSymbol(String),
    /// Every alternative of a `Select` failed to parse/accept.
    #[error("all alternatives failed")]
    SelectExhausted,
    /// `NullTerminated` (or similar) required a terminator that was absent.
    #[error("terminator sentinel was not found")]
    MissingTerminator,
    /// `Aligned`/`Padded` parse found the wrong pad pattern.
    #[error("padding pattern mismatch at offset {0}")]
    PaddingMismatch(usize),
    /// `size_of` was invoked on a construct whose size is not statically
    /// known from the context supplied.
    #[error("size is not statically known in this context")]
    SizeUnknown,
    /// An expression referenced a context key that does not exist.
    #[error("context is missing key `{0}`")]
    MissingContextKey(String),
    /// A `Bitwise` region was not a multiple of 8 bits, or a `ByteSwapped`/
    /// `BitsSwapped` wrapped a non-fixed-size subconstruct.
    #[error("misaligned region ({0})")]
    Misaligned(String),
    /// A field name collided with a reserved context key.
    #[error("field name `{0}` collides with a reserved context key")]
    ReservedName(String),
    /// `CancelParsing` escaped a context that cannot catch it (only
    /// `GreedyRange`/`RepeatUntil` hook callbacks may emit it).
    #[error("CancelParsing signal was raised outside of a range consumer")]
    StrayCancelParsing,
    /// A `Union`/`Select` member was referenced by name or index that does
    /// not exist among its subconstructs.
    #[error("no such alternative: {0}")]
    NoSuchAlternative(String),
    /// Data read did not match the bytes a `Const` construct requires.
    #[error("constant mismatch: expected {expected:?}, got {actual:?}")]
    ConstMismatch {
        /// Expected bytes.
        expected: Vec<u8>,
        /// Bytes actually read.
        actual: Vec<u8>,
    },
    /// Catch-all for adapter-supplied transform failures.
    #[error("{0}")]
    Other(String),
}

/// An error raised while parsing, building, or sizing a construct tree.
///
/// Carries a `path` breadcrumb that is attached exactly once, at the
/// innermost enclosing composite that observes the error without a path
/// already set (see [`Error::attach_path`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// The reason the operation failed.
    pub kind: ErrorKind,
    /// `(parsing) -> a -> b -> c` style breadcrumb; empty until a composite
    /// attaches it.
    pub path: String,
}

impl Error {
    /// Build a fresh, not-yet-path-tagged error.
    pub fn new(kind: ErrorKind) -> Self {
        Error {
            kind,
            path: String::new(),
        }
    }

    /// Attach `path` to this error if (and only if) it doesn't already carry
    /// one. Safe to call redundantly at every enclosing level: only the
    /// first call that sees an empty path has any effect.
    #[must_use]
    pub fn attach_path(mut self, path: &str) -> Self {
        if self.path.is_empty() {
            self.path = path.to_string();
        }
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.kind)
    }
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        use std::io::ErrorKind as IoKind;
        match e.kind() {
            IoKind::UnexpectedEof => Error::new(ErrorKind::ShortRead {
                needed: 0,
                available: 0,
            }),
            _ => Error::new(ErrorKind::Write(e.to_string())),
        }
    }
}

/// Shorthand used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_attaches_once() {
        let e = Error::new(ErrorKind::SizeUnknown);
        let e = e.attach_path("(sizing) -> a -> b");
        let e = e.attach_path("(sizing) -> a");
        assert_eq!(e.path, "(sizing) -> a -> b");
    }

    #[test]
    fn display_includes_path() {
        let e = Error::new(ErrorKind::MissingContextKey("width".into()))
            .attach_path("(parsing) -> hdr");
        assert_eq!(
            e.to_string(),
            "(parsing) -> hdr: context is missing key `width`"
        );
    }
}
