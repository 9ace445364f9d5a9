//! End-to-end scenarios exercising a whole construct tree at once, as
//! opposed to the per-module unit tests living alongside each construct.

use std::sync::Arc;

use bincons::prelude::*;

#[test]
fn bmp_like_header_round_trips() {
    let header = Struct::new(vec![
        StructField::new("signature", Arc::new(Const::new(b"BMP".to_vec()))),
        StructField::new("width", Arc::new(IntU8::be())),
        StructField::new("height", Arc::new(IntU8::be())),
        StructField::new(
            "pixels",
            Arc::new(Array::with_count(Expr::field("width") * Expr::field("height"), Arc::new(IntU8::be()))),
        ),
    ]);

    let wire = b"BMP\x03\x02\x07\x08\x09\x0b\x0c\x0d";

    let mut pixels = Record::new();
    pixels.insert("signature", Value::Bytes(b"BMP".to_vec()));
    pixels.insert("width", Value::Int(3));
    pixels.insert("height", Value::Int(2));
    pixels.insert(
        "pixels",
        Value::List(List::from_vec(vec![
            Value::Int(7),
            Value::Int(8),
            Value::Int(9),
            Value::Int(11),
            Value::Int(12),
            Value::Int(13),
        ])),
    );
    let value = Value::Record(pixels);

    assert_eq!(header.build(&value).unwrap(), wire.to_vec());
    assert_eq!(header.parse(wire).unwrap(), value);
}

#[test]
fn bit_struct_packs_flags_and_subfields() {
    let bit_struct = Bitwise::new(Arc::new(Struct::new(vec![
        StructField::new("a", Arc::new(Flag)),
        StructField::new("b", Arc::new(BitsInteger::new(4))),
        StructField::new("c", Arc::new(BitsInteger::new(10))),
        StructField::new("d", Arc::new(Padding::new(1))),
    ])));

    let wire = [0xbeu8, 0xef];
    let v = bit_struct.parse(&wire).unwrap();
    let record = v.as_record().unwrap();
    assert_eq!(record.get("a"), Some(&Value::Bool(true)));
    assert_eq!(record.get("b"), Some(&Value::Int(7)));
    assert_eq!(record.get("c"), Some(&Value::Int(887)));
    assert_eq!(record.get("d"), Some(&Value::Unit));
    assert_eq!(bit_struct.sizeof().unwrap(), 2);
    assert_eq!(bit_struct.build(&v).unwrap(), wire.to_vec());
}

#[test]
fn enum_names_known_values_and_passes_through_unknown_ones() {
    let con = Enum::new(Arc::new(IntU8::be()), vec![("g".to_string(), 8), ("h".to_string(), 11)]);

    assert_eq!(con.parse(&[0x08]).unwrap(), Value::Enum { name: Some("g".to_string()), value: 8 });
    assert_eq!(con.build(&Value::Str("g".to_string())).unwrap(), vec![0x08]);
    assert_eq!(con.build(&Value::Int(11)).unwrap(), vec![0x0b]);
    assert_eq!(con.parse(&[0xff]).unwrap(), Value::Enum { name: None, value: 255 });
}

#[test]
fn repeat_until_stops_after_the_item_that_satisfies_the_predicate() {
    let con = RepeatUntil::new(|v, _ctx| Ok(v.as_int()? > 10), Arc::new(IntU8::be()));

    let data = [0x01u8, 0x05, 0x08, 0xff, 0x01, 0x02, 0x03];
    let mut cursor = std::io::Cursor::new(data.to_vec());
    let mut ctx = Context::root(bincons::Mode::Parsing, Record::new());
    let v = con.parse_in(&mut cursor, &mut ctx, "(parsing)").unwrap();
    assert_eq!(
        v,
        Value::List(List::from_vec(vec![Value::Int(1), Value::Int(5), Value::Int(8), Value::Int(255)])),
    );
    assert_eq!(std::io::Seek::stream_position(&mut cursor).unwrap(), 4);
}

#[test]
fn varint_prefixed_string_round_trips_non_ascii_text() {
    let con = PascalString::new(Arc::new(VarInt::new()), Encoding::Utf8);

    let wire = [0x08u8, 0xd0, 0x90, 0xd1, 0x84, 0xd0, 0xbe, 0xd0, 0xbd];
    assert_eq!(con.build(&Value::Str("Афон".to_string())).unwrap(), wire.to_vec());
    assert_eq!(con.parse(&wire).unwrap(), Value::Str("Афон".to_string()));
}

#[test]
fn short_read_carries_the_full_nested_field_path() {
    // four levels deep: a -> b -> c -> foo, foo needs 8 bytes but only 3 remain
    let leaf = Struct::new(vec![StructField::new("foo", Arc::new(Bytes::new(8)))]);
    let c = Struct::new(vec![StructField::new("c", Arc::new(leaf))]);
    let b = Struct::new(vec![StructField::new("b", Arc::new(c))]);
    let a = Struct::new(vec![StructField::new("a", Arc::new(b))]);

    let err = a.parse(&[1, 2, 3]).unwrap_err();
    assert_eq!(err.path, "(parsing) -> a -> b -> c -> foo");
}
