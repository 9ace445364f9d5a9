//! A declarative, symmetric binary parse/build engine over composable
//! constructs: describe a binary format once as a tree of [`construct::Con`]
//! nodes, then parse bytes into a [`value::Value`] or build a `Value` back
//! into bytes from the very same tree.

pub mod adapter;
pub mod bitstream;
pub mod composite;
pub mod construct;
pub mod context;
pub mod error;
pub mod expr;
pub mod meta;
pub mod primitive;
pub mod print_config;
pub mod stream;
pub mod string;
pub mod sugar;
pub mod value;

pub use construct::{Con, Construct, ConstructExt};
pub use context::{Context, Mode};
pub use error::{Error, ErrorKind, Result};
pub use expr::{BinOp, Expr, UnOp};
pub use value::{List, Record, Value};

/// Everything needed to assemble a construct tree in one `use bincons::prelude::*;`.
pub mod prelude {
    pub use crate::adapter::{
        Aligned, BitsSwapped, Bitwise, ByteSwapped, Bytewise, Enum, FlagsEnum, NullTerminated,
        Prefixed, PrefixedArray, Restreamed, Transformed,
    };
    pub use crate::composite::{Alt, Array, GreedyRange, RepeatUntil, Select, Sequence, Struct, Union};
    pub use crate::construct::{Con, Construct, ConstructExt};
    pub use crate::context::Context;
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::expr::Expr;
    pub use crate::meta::{cancel_parsing, Computed, Peek, Pointer, RawCopy, Seek, Tell};
    pub use crate::primitive::{
        BitsInteger, Bytes, BytesInteger, Const, Endian, Flag, Float32, Float64, GreedyBytes,
        IntS16, IntS24, IntS32, IntS64, IntS8, IntU16, IntU24, IntU32, IntU64, IntU8, Padding,
        Pass, Terminated, VarInt, ZigZag,
    };
    pub use crate::string::{CString, Encoding, GreedyString, PaddedString, PascalString};
    pub use crate::sugar::{anon, field, Field as SugarField};
    pub use crate::value::{List, Record, Value};
    pub use crate::composite::Field as StructField;
}
