//! `quickcheck`-driven invariants: round-trip symmetry for primitives, and
//! a handful of boundary behaviors called out explicitly for the
//! variable-length encodings and the range/selection composites.

use std::sync::Arc;

use bincons::prelude::*;
use quickcheck_macros::quickcheck;

#[quickcheck]
fn int_u8_round_trips(n: u8) -> bool {
    let con = IntU8::be();
    con.parse(&con.build(&Value::Int(n as i128)).unwrap()).unwrap() == Value::Int(n as i128)
}

#[quickcheck]
fn int_u16_round_trips_both_endiannesses(n: u16) -> bool {
    let be = IntU16::be();
    let le = IntU16::le();
    let v = Value::Int(n as i128);
    be.parse(&be.build(&v).unwrap()).unwrap() == v && le.parse(&le.build(&v).unwrap()).unwrap() == v
}

#[quickcheck]
fn int_u32_round_trips(n: u32) -> bool {
    let con = IntU32::be();
    let v = Value::Int(n as i128);
    con.parse(&con.build(&v).unwrap()).unwrap() == v
}

#[quickcheck]
fn int_u64_round_trips(n: u64) -> bool {
    let con = IntU64::be();
    let v = Value::Int(n as i128);
    con.parse(&con.build(&v).unwrap()).unwrap() == v
}

#[quickcheck]
fn int_s32_round_trips(n: i32) -> bool {
    let con = IntS32::be();
    let v = Value::Int(n as i128);
    con.parse(&con.build(&v).unwrap()).unwrap() == v
}

#[quickcheck]
fn varint_round_trips_any_non_negative_i128_that_fits_u64(n: u64) -> bool {
    let con = VarInt::new();
    let v = Value::Int(n as i128);
    con.parse(&con.build(&v).unwrap()).unwrap() == v
}

#[quickcheck]
fn zigzag_round_trips_any_i64(n: i64) -> bool {
    let con = ZigZag::new();
    let v = Value::Int(n as i128);
    con.parse(&con.build(&v).unwrap()).unwrap() == v
}

#[quickcheck]
fn float32_round_trips_finite_values(n: f32) -> bool {
    if !n.is_finite() {
        return true;
    }
    let con = Float32::be();
    let v = Value::Float(n as f64);
    matches!(con.parse(&con.build(&v).unwrap()).unwrap(), Value::Float(f) if (f as f32) == n)
}

#[quickcheck]
fn array_sizeof_matches_built_length(count: u8) -> bool {
    let count = (count % 8) as usize;
    let arr = Array::new(count, Arc::new(IntU8::be()));
    let items = (0..count as i128).map(Value::Int).collect();
    let built = arr.build(&Value::List(List::from_vec(items))).unwrap();
    built.len() == arr.sizeof().unwrap() && built.len() == count
}

#[test]
fn varint_boundary_values_use_the_expected_byte_counts() {
    let con = VarInt::new();
    let cases: &[(i128, usize)] = &[(0, 1), (127, 1), (128, 2), (16383, 2), (16384, 3), (u64::MAX as i128, 10)];
    for &(n, expected_len) in cases {
        let built = con.build(&Value::Int(n)).unwrap();
        assert_eq!(built.len(), expected_len, "n={n}");
        assert_eq!(con.parse(&built).unwrap(), Value::Int(n));
    }
}

#[test]
fn zigzag_maps_small_magnitudes_as_expected() {
    let con = ZigZag::new();
    assert_eq!(con.build(&Value::Int(-1)).unwrap(), con_build_varint(1));
    assert_eq!(con.build(&Value::Int(-2)).unwrap(), con_build_varint(3));
    assert_eq!(con.build(&Value::Int(1)).unwrap(), con_build_varint(2));
}

fn con_build_varint(n: i128) -> Vec<u8> {
    VarInt::new().build(&Value::Int(n)).unwrap()
}

#[test]
fn greedy_range_on_empty_input_yields_an_empty_list() {
    let range = GreedyRange::new(Arc::new(IntU8::be())).unwrap();
    assert_eq!(range.parse(&[]).unwrap(), Value::List(List::new()));
}

#[test]
fn select_with_no_alternatives_matching_raises_select_exhausted() {
    let sel = Select::new(Vec::new());
    let err = sel.parse(&[1, 2, 3]).unwrap_err();
    assert_eq!(err.kind, bincons::ErrorKind::SelectExhausted);
}

#[test]
fn size_of_is_consistent_with_actual_built_length_for_fixed_trees() {
    let con = Struct::new(vec![
        StructField::new("a", Arc::new(IntU16::be())),
        StructField::new("b", Arc::new(IntU8::be())),
        StructField::new("c", Arc::new(Float32::be())),
    ]);
    let mut record = Record::new();
    record.insert("a", Value::Int(300));
    record.insert("b", Value::Int(9));
    record.insert("c", Value::Float(1.5));
    let built = con.build(&Value::Record(record)).unwrap();
    assert_eq!(built.len(), con.sizeof().unwrap());
}

#[test]
fn context_bindings_from_sibling_structs_do_not_leak_across_array_items() {
    // each element of an Array over a Struct gets its own child context;
    // an expression referencing a field only bound in one sibling must fail.
    let item = Struct::new(vec![StructField::new("tag", Arc::new(IntU8::be()))]);
    let arr = Array::new(2, Arc::new(item));
    let v = arr.parse(&[1, 2]).unwrap();
    let items = v.as_list().unwrap();
    assert_eq!(items.as_slice()[0].as_record().unwrap().get("tag"), Some(&Value::Int(1)));
    assert_eq!(items.as_slice()[1].as_record().unwrap().get("tag"), Some(&Value::Int(2)));
}

#[test]
fn path_is_attached_exactly_once_reporting_the_innermost_failure() {
    let inner = Struct::new(vec![StructField::new("x", Arc::new(IntU8::be()))]);
    let outer = Struct::new(vec![StructField::new("inner", Arc::new(inner))]);
    let err = outer.parse(&[]).unwrap_err();
    assert_eq!(err.path, "(parsing) -> inner -> x");
}
