//! Primitive constructs: the leaves that actually touch stream bytes.

pub mod bytes;
pub mod bitsint;
pub mod bytesint;
pub mod float;
pub mod int;
pub mod varint;

pub use bytes::{Bytes, Const, Flag, GreedyBytes, Padding, Pass, Terminated};
pub use bitsint::BitsInteger;
pub use bytesint::BytesInteger;
pub use float::{Float32, Float64};
pub use int::{Endian, IntS16, IntS24, IntS32, IntS64, IntS8, IntU16, IntU24, IntU32, IntU64, IntU8};
pub use varint::{VarInt, ZigZag};
