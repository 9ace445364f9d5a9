//! Text constructs: fixed-width, length-prefixed, null-terminated, and
//! greedy-to-EOF strings, each parameterized by an [`Encoding`].

use crate::construct::{Con, Construct};
use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::stream::{self, Stream};
use crate::value::Value;

/// The allow-list of text encodings this crate actually decodes/encodes.
/// Deliberately closed, unlike `encoding_rs`'s full web-encoding surface —
/// everything this format family actually needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// 7-bit ASCII; any byte `>= 0x80` is a codec error.
    Ascii,
    /// UTF-8.
    Utf8,
    /// UTF-16, big-endian.
    Utf16Be,
    /// UTF-16, little-endian.
    Utf16Le,
    /// UTF-32, big-endian.
    Utf32Be,
    /// UTF-32, little-endian.
    Utf32Le,
    /// ISO-8859-1 (every byte maps to the identically-numbered code point).
    Latin1,
}

impl Encoding {
    /// Width in bytes of this encoding's smallest code unit (used by
    /// `PaddedString`/`CString` to find the unit size for padding/NUL scans).
    fn unit_width(self) -> usize {
        match self {
            Encoding::Ascii | Encoding::Utf8 | Encoding::Latin1 => 1,
            Encoding::Utf16Be | Encoding::Utf16Le => 2,
            Encoding::Utf32Be | Encoding::Utf32Le => 4,
        }
    }

    fn decode(self, bytes: &[u8]) -> Result<String> {
        match self {
            Encoding::Ascii => {
                if bytes.iter().any(|&b| b >= 0x80) {
                    return Err(Error::new(ErrorKind::StringCodec("byte >= 0x80 in ascii text".into())));
                }
                Ok(bytes.iter().map(|&b| b as char).collect())
            }
            Encoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_owned)
                .map_err(|e| Error::new(ErrorKind::StringCodec(e.to_string()))),
            Encoding::Utf16Be | Encoding::Utf16Le => {
                if bytes.len() % 2 != 0 {
                    return Err(Error::new(ErrorKind::StringCodec("odd byte length for utf-16".into())));
                }
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|c| {
                        if self == Encoding::Utf16Be {
                            u16::from_be_bytes([c[0], c[1]])
                        } else {
                            u16::from_le_bytes([c[0], c[1]])
                        }
                    })
                    .collect();
                String::from_utf16(&units).map_err(|e| Error::new(ErrorKind::StringCodec(e.to_string())))
            }
            Encoding::Utf32Be | Encoding::Utf32Le => {
                if bytes.len() % 4 != 0 {
                    return Err(Error::new(ErrorKind::StringCodec("byte length not a multiple of 4 for utf-32".into())));
                }
                let mut out = String::new();
                for c in bytes.chunks_exact(4) {
                    let code = if self == Encoding::Utf32Be {
                        u32::from_be_bytes([c[0], c[1], c[2], c[3]])
                    } else {
                        u32::from_le_bytes([c[0], c[1], c[2], c[3]])
                    };
                    let ch = char::from_u32(code)
                        .ok_or_else(|| Error::new(ErrorKind::StringCodec(format!("invalid code point {code:#x}"))))?;
                    out.push(ch);
                }
                Ok(out)
            }
            Encoding::Latin1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }

    fn encode(self, s: &str) -> Result<Vec<u8>> {
        match self {
            Encoding::Ascii => {
                if !s.is_ascii() {
                    return Err(Error::new(ErrorKind::StringCodec("non-ascii character in ascii text".into())));
                }
                Ok(s.as_bytes().to_vec())
            }
            Encoding::Utf8 => Ok(s.as_bytes().to_vec()),
            Encoding::Utf16Be | Encoding::Utf16Le => {
                let mut out = Vec::with_capacity(s.len() * 2);
                for unit in s.encode_utf16() {
                    let b = if self == Encoding::Utf16Be { unit.to_be_bytes() } else { unit.to_le_bytes() };
                    out.extend_from_slice(&b);
                }
                Ok(out)
            }
            Encoding::Utf32Be | Encoding::Utf32Le => {
                let mut out = Vec::with_capacity(s.len() * 4);
                for ch in s.chars() {
                    let code = ch as u32;
                    let b = if self == Encoding::Utf32Be { code.to_be_bytes() } else { code.to_le_bytes() };
                    out.extend_from_slice(&b);
                }
                Ok(out)
            }
            Encoding::Latin1 => {
                let mut out = Vec::with_capacity(s.len());
                for ch in s.chars() {
                    let code = ch as u32;
                    if code > 0xFF {
                        return Err(Error::new(ErrorKind::StringCodec(format!("{ch:?} is not representable in latin-1"))));
                    }
                    out.push(code as u8);
                }
                Ok(out)
            }
        }
    }

    fn terminator(self) -> Vec<u8> {
        vec![0u8; self.unit_width()]
    }
}

/// A fixed-width, zero-padded string: exactly `n` bytes, decoded/encoded
/// under `encoding`, with trailing NUL units trimmed on parse.
#[derive(Debug, Clone, Copy)]
pub struct PaddedString {
    n: usize,
    encoding: Encoding,
}

impl PaddedString {
    /// `n` raw bytes, interpreted under `encoding`.
    pub fn new(n: usize, encoding: Encoding) -> Self {
        PaddedString { n, encoding }
    }
}

impl Construct for PaddedString {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let mut buf = vec![0u8; self.n];
        stream::read_exact(stream, &mut buf)?;
        let unit = self.encoding.unit_width();
        let mut end = buf.len();
        while end >= unit && buf[end - unit..end].iter().all(|&b| b == 0) {
            end -= unit;
        }
        Ok(Value::Str(self.encoding.decode(&buf[..end])?))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let s = value.as_str()?;
        let mut encoded = self.encoding.encode(s)?;
        if encoded.len() > self.n {
            return Err(Error::new(ErrorKind::WrongCount { expected: self.n, actual: encoded.len() }));
        }
        encoded.resize(self.n, 0);
        stream::write_all(stream, &encoded)?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, _path: &str) -> Result<usize> {
        Ok(self.n)
    }

    fn is_fixed_size(&self) -> bool {
        true
    }
}

/// A string prefixed by its byte length, encoded with `length_con`.
pub struct PascalString {
    length_con: Con,
    encoding: Encoding,
}

impl std::fmt::Debug for PascalString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PascalString").field("encoding", &self.encoding).finish()
    }
}

impl PascalString {
    /// `length_con` parses/builds the byte count prefix; `encoding` governs
    /// the payload.
    pub fn new(length_con: Con, encoding: Encoding) -> Self {
        PascalString { length_con, encoding }
    }
}

impl Construct for PascalString {
    fn parse_in(&self, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let len = self.length_con.parse_in(stream, ctx, path).map_err(|e| e.attach_path(path))?.as_count()?;
        let mut buf = vec![0u8; len];
        stream::read_exact(stream, &mut buf)?;
        Ok(Value::Str(self.encoding.decode(&buf)?))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, ctx: &mut Context, path: &str) -> Result<Value> {
        let s = value.as_str()?;
        let encoded = self.encoding.encode(s)?;
        self.length_con.build_in(&Value::Int(encoded.len() as i128), stream, ctx, path).map_err(|e| e.attach_path(path))?;
        stream::write_all(stream, &encoded)?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, path: &str) -> Result<usize> {
        Err(Error::new(ErrorKind::SizeUnknown).attach_path(path))
    }

    fn is_fixed_size(&self) -> bool {
        false
    }
}

/// A string terminated by a single NUL code unit.
#[derive(Debug, Clone, Copy)]
pub struct CString {
    encoding: Encoding,
}

impl CString {
    /// Read/write until (and consuming) one NUL code unit.
    pub fn new(encoding: Encoding) -> Self {
        CString { encoding }
    }
}

impl Construct for CString {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let unit = self.encoding.unit_width();
        let mut collected = Vec::new();
        loop {
            let mut chunk = vec![0u8; unit];
            stream::read_exact(stream, &mut chunk)?;
            if chunk.iter().all(|&b| b == 0) {
                break;
            }
            collected.extend_from_slice(&chunk);
        }
        Ok(Value::Str(self.encoding.decode(&collected)?))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let s = value.as_str()?;
        let encoded = self.encoding.encode(s)?;
        stream::write_all(stream, &encoded)?;
        stream::write_all(stream, &self.encoding.terminator())?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, path: &str) -> Result<usize> {
        Err(Error::new(ErrorKind::SizeUnknown).attach_path(path))
    }

    fn is_fixed_size(&self) -> bool {
        false
    }
}

/// All remaining bytes in the stream, decoded as text.
#[derive(Debug, Clone, Copy)]
pub struct GreedyString {
    encoding: Encoding,
}

impl GreedyString {
    /// Consume to EOF, decoding under `encoding`.
    pub fn new(encoding: Encoding) -> Self {
        GreedyString { encoding }
    }
}

impl Construct for GreedyString {
    fn parse_in(&self, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let mut buf = Vec::new();
        std::io::Read::read_to_end(stream, &mut buf).map_err(Error::from)?;
        Ok(Value::Str(self.encoding.decode(&buf)?))
    }

    fn build_in(&self, value: &Value, stream: &mut dyn Stream, _ctx: &mut Context, _path: &str) -> Result<Value> {
        let s = value.as_str()?;
        let encoded = self.encoding.encode(s)?;
        stream::write_all(stream, &encoded)?;
        Ok(value.clone())
    }

    fn size_of_in(&self, _ctx: &Context, path: &str) -> Result<usize> {
        Err(Error::new(ErrorKind::SizeUnknown).attach_path(path))
    }

    fn is_fixed_size(&self) -> bool {
        false
    }

    fn needs_progress(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::construct::ConstructExt;
    use crate::primitive::int::IntU8;
    use std::sync::Arc;

    #[test]
    fn padded_string_trims_trailing_nul() {
        let con = PaddedString::new(8, Encoding::Ascii);
        let v = con.parse(b"hello\0\0\0").unwrap();
        assert_eq!(v, Value::Str("hello".into()));
        assert_eq!(con.build(&v).unwrap(), b"hello\0\0\0".to_vec());
    }

    #[test]
    fn pascal_string_round_trip() {
        let con = PascalString::new(Arc::new(IntU8::be()), Encoding::Utf8);
        let built = con.build(&Value::Str("hi".into())).unwrap();
        assert_eq!(built, vec![2, b'h', b'i']);
        assert_eq!(con.parse(&built).unwrap(), Value::Str("hi".into()));
    }

    #[test]
    fn cstring_stops_at_nul() {
        let con = CString::new(Encoding::Ascii);
        let v = con.parse(b"abc\0trailing-ignored").unwrap();
        assert_eq!(v, Value::Str("abc".into()));
        assert_eq!(con.build(&v).unwrap(), b"abc\0".to_vec());
    }

    #[test]
    fn greedy_string_reads_to_eof() {
        let con = GreedyString::new(Encoding::Utf8);
        assert_eq!(con.parse("hola".as_bytes()).unwrap(), Value::Str("hola".into()));
    }

    #[test]
    fn utf16_round_trip() {
        let con = PaddedString::new(8, Encoding::Utf16Le);
        let built = con.build(&Value::Str("hi".into())).unwrap();
        assert_eq!(con.parse(&built).unwrap(), Value::Str("hi".into()));
    }
}
