//! Adapters: constructs that wrap one subconstruct and change how its bytes
//! or values are interpreted, rather than introducing new named fields.

mod aligned;
mod bitwise;
mod byte_swapped;
mod enum_;
mod flags_enum;
mod null_terminated;
mod prefixed;
mod restreamed;
mod transformed;

pub use aligned::Aligned;
pub use bitwise::{Bitwise, Bytewise};
pub use byte_swapped::{BitsSwapped, ByteSwapped};
pub use enum_::Enum;
pub use flags_enum::FlagsEnum;
pub use null_terminated::NullTerminated;
pub use prefixed::{Prefixed, PrefixedArray};
pub use restreamed::Restreamed;
pub use transformed::{one_way, Transformed};
