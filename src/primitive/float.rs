//! IEEE-754 floating point constructs.

use crate::construct::Construct;
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::primitive::int::Endian;
use crate::stream::{self, Stream};
use crate::value::Value;

/// A 32-bit IEEE-754 float.
#[derive(Debug, Clone, Copy)]
pub struct Float32 {
    endian: Endian,
}

impl Float32 {
    /// Big-endian.
    pub fn be() -> Self {
        Float32 { endian: Endian::Big }
    }
    /// Little-endian.
    pub fn le() -> Self {
        Float32 { endian: Endian::Little }
    }
}

impl Construct for Float32 {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let mut buf = [0u8; 4];
        stream::read_exact(stream, &mut buf)?;
        let v = match self.endian {
            Endian::Big => f32::from_be_bytes(buf),
            Endian::Little | Endian::Native => f32::from_le_bytes(buf),
        };
        Ok(Value::Float(v as f64))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let f = value.as_float()?;
        if !f.is_finite() && f.is_nan() {
            return Err(Error::new(ErrorKind::NonFiniteFloat));
        }
        let f32v = f as f32;
        let buf = match self.endian {
            Endian::Big => f32v.to_be_bytes(),
            Endian::Little | Endian::Native => f32v.to_le_bytes(),
        };
        stream::write_all(stream, &buf)?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Ok(4)
    }

    fn is_fixed_size(&self) -> bool {
        true
    }
}

/// A 64-bit IEEE-754 float.
#[derive(Debug, Clone, Copy)]
pub struct Float64 {
    endian: Endian,
}

impl Float64 {
    /// Big-endian.
    pub fn be() -> Self {
        Float64 { endian: Endian::Big }
    }
    /// Little-endian.
    pub fn le() -> Self {
        Float64 { endian: Endian::Little }
    }
}

impl Construct for Float64 {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let mut buf = [0u8; 8];
        stream::read_exact(stream, &mut buf)?;
        let v = match self.endian {
            Endian::Big => f64::from_be_bytes(buf),
            Endian::Little | Endian::Native => f64::from_le_bytes(buf),
        };
        Ok(Value::Float(v))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let f = value.as_float()?;
        let buf = match self.endian {
            Endian::Big => f.to_be_bytes(),
            Endian::Little | Endian::Native => f.to_le_bytes(),
        };
        stream::write_all(stream, &buf)?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Ok(8)
    }

    fn is_fixed_size(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::ConstructExt;

    #[test]
    fn f32_round_trip() {
        let con = Float32::be();
        let v = con.parse(&1.5f32.to_be_bytes()).unwrap();
        assert_eq!(v, Value::Float(1.5));
        assert_eq!(con.build(&v).unwrap(), 1.5f32.to_be_bytes().to_vec());
    }

    #[test]
    fn f64_round_trip_le() {
        let con = Float64::le();
        let bytes = (-2.25f64).to_le_bytes();
        let v = con.parse(&bytes).unwrap();
        assert_eq!(v, Value::Float(-2.25));
        assert_eq!(con.build(&v).unwrap(), bytes.to_vec());
    }
}
