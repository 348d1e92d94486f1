use alloc::{string::ToString, vec, vec::Vec};

use num_bigint::BigInt;
use rstest::rstest;

use crate::{
    Decimal, Element, IonType, IterSource, Precision, ReaderOptions, StrSource, TextReader, Value,
    load_all,
};

fn reader(text: &str) -> TextReader<StrSource<'_>> {
    TextReader::with_options(
        StrSource::new(text),
        ReaderOptions {
            panic_on_error: true,
            ..Default::default()
        },
    )
}

fn single(text: &str) -> Element {
    let mut elements = load_all(text).unwrap();
    assert_eq!(elements.len(), 1, "{text}");
    elements.remove(0)
}

#[rstest]
#[case("0x1A", 26)]
#[case("-0x1a", -26)]
#[case("0b101", 5)]
#[case("0B1_1", 3)]
#[case("1_000", 1000)]
#[case("-42", -42)]
#[case("0", 0)]
fn int_literals(#[case] text: &str, #[case] expected: i64) {
    let mut r = reader(text);
    assert_eq!(r.next().unwrap(), Some(IonType::Int));
    assert_eq!(r.read_i64().unwrap(), expected);
    assert_eq!(r.next().unwrap(), None);
}

#[test]
fn big_int() {
    let mut r = reader("170141183460469231731687303715884105728");
    r.next().unwrap();
    let value = r.read_int().unwrap();
    assert_eq!(value, BigInt::from(i128::MAX) + 1);
    assert!(r.read_i64().is_err());
}

#[rstest]
#[case("2020T", Precision::Year)]
#[case("2020-01T", Precision::Month)]
#[case("2020-01-01", Precision::Day)]
#[case("2020-01-01T", Precision::Day)]
#[case("2020-01-01T00:00Z", Precision::Minute)]
#[case("2020-01-01T00:00:30+01:00", Precision::Second)]
#[case("2020-01-01T00:00:30.25-00:00", Precision::Fractional)]
fn timestamp_literals(#[case] text: &str, #[case] precision: Precision) {
    let mut r = reader(text);
    assert_eq!(r.next().unwrap(), Some(IonType::Timestamp));
    let ts = r.read_timestamp().unwrap();
    assert_eq!(ts.precision(), precision);
    assert_eq!(ts.year(), 2020);
}

#[test]
fn floats_and_decimals() {
    let mut r = reader("1.5e0 -2E+3 nan +inf -inf 1.50 1.5d2 -0.0");
    r.next().unwrap();
    assert_eq!(r.read_f64().unwrap(), 1.5);
    r.next().unwrap();
    assert_eq!(r.read_f64().unwrap(), -2000.0);
    r.next().unwrap();
    assert!(r.read_f64().unwrap().is_nan());
    r.next().unwrap();
    assert_eq!(r.read_f64().unwrap(), f64::INFINITY);
    r.next().unwrap();
    assert_eq!(r.read_f64().unwrap(), f64::NEG_INFINITY);
    assert_eq!(r.next().unwrap(), Some(IonType::Decimal));
    assert_eq!(r.read_decimal().unwrap(), Decimal::new(150, -2));
    r.next().unwrap();
    assert_eq!(r.read_decimal().unwrap(), Decimal::new(15, 1));
    r.next().unwrap();
    assert!(r.read_decimal().unwrap().is_negative_zero());
}

#[test]
fn long_strings_concatenate() {
    let mut r = reader("'''ab''' '''cd'''");
    assert_eq!(r.next().unwrap(), Some(IonType::String));
    assert_eq!(r.read_string().unwrap(), "abcd");
    assert_eq!(r.next().unwrap(), None);

    let mut r = reader("['''a''' /* gap */ '''b''', '''c''']");
    r.next().unwrap();
    r.step_in().unwrap();
    r.next().unwrap();
    assert_eq!(r.read_string().unwrap(), "ab");
    r.next().unwrap();
    assert_eq!(r.read_string().unwrap(), "c");
}

#[test]
fn annotations_stack_in_order() {
    let mut r = reader("foo::bar::123");
    assert_eq!(r.next().unwrap(), Some(IonType::Int));
    assert_eq!(r.annotations().unwrap(), ["foo", "bar"]);
    assert!(r.has_annotation("bar"));
    assert!(!r.has_annotation("baz"));
    assert_eq!(r.read_i64().unwrap(), 123);
}

#[test]
fn typed_nulls() {
    let mut r = reader("null null.null null.int null.struct null.blob");
    let mut types = Vec::new();
    while let Some(t) = r.next().unwrap() {
        assert!(r.is_null());
        types.push(t);
    }
    assert_eq!(
        types,
        [IonType::Null, IonType::Null, IonType::Int, IonType::Struct, IonType::Blob]
    );
}

#[test]
fn struct_navigation() {
    let mut r = reader("{a: 1, 'b c': [x, y], \"d\": (+ 1 2),}");
    assert_eq!(r.next().unwrap(), Some(IonType::Struct));
    r.step_in().unwrap();
    assert_eq!(r.depth(), 1);
    assert_eq!(r.next().unwrap(), Some(IonType::Int));
    assert_eq!(r.field_name().unwrap(), Some("a"));
    assert_eq!(r.next().unwrap(), Some(IonType::List));
    assert_eq!(r.field_name().unwrap(), Some("b c"));
    assert_eq!(r.next().unwrap(), Some(IonType::Sexp));
    assert_eq!(r.field_name().unwrap(), Some("d"));
    r.step_in().unwrap();
    assert_eq!(r.next().unwrap(), Some(IonType::Symbol));
    assert_eq!(r.read_string().unwrap(), "+");
    r.step_out().unwrap();
    assert_eq!(r.next().unwrap(), None);
    r.step_out().unwrap();
    assert_eq!(r.depth(), 0);
    assert_eq!(r.next().unwrap(), None);
}

#[test]
fn step_out_skips_unread_values() {
    let mut r = reader("[1, [2, {x: \"}\"}], '''s'''] after");
    r.next().unwrap();
    r.step_in().unwrap();
    r.next().unwrap();
    r.step_out().unwrap();
    assert_eq!(r.next().unwrap(), Some(IonType::Symbol));
    assert_eq!(r.read_symbol().unwrap().text(), Some("after"));
}

#[test]
fn lobs() {
    let mut r = reader("{{aGk=}} {{\"hi\\x21\"}} {{'''a''' '''b'''}}");
    assert_eq!(r.next().unwrap(), Some(IonType::Blob));
    assert_eq!(r.read_lob().unwrap(), b"hi");
    assert_eq!(r.next().unwrap(), Some(IonType::Clob));
    assert_eq!(r.read_lob().unwrap(), b"hi!");
    assert_eq!(r.next().unwrap(), Some(IonType::Clob));
    assert_eq!(r.read_lob().unwrap(), b"ab");
    assert_eq!(r.next().unwrap(), None);
}

#[rstest]
#[case("{{//8=}}")]
#[case("{{ //8= }} 1")]
#[case("[{{//8=}}] 1")]
fn blobs_starting_with_slash(#[case] text: &str) {
    let mut r = reader(text);
    let ion_type = r.next().unwrap();
    if ion_type == Some(IonType::List) {
        r.step_in().unwrap();
        assert_eq!(r.next().unwrap(), Some(IonType::Blob));
    } else {
        assert_eq!(ion_type, Some(IonType::Blob));
    }
    assert_eq!(r.read_lob().unwrap(), [0xFF, 0xFF]);

    // the same document, stepping over the blob without reading it
    let mut skipped = reader(text);
    let mut after = Vec::new();
    skipped.next().unwrap();
    while let Some(ion_type) = skipped.next().unwrap() {
        after.push(ion_type);
    }
    let expected: &[IonType] = if text.ends_with(" 1") { &[IonType::Int] } else { &[] };
    assert_eq!(after, expected);
}

#[test]
fn strings_and_symbols_share_read_string() {
    let mut r = reader("\"caf\\u00e9\" 'quoted' bare");
    r.next().unwrap();
    assert_eq!(r.read_string().unwrap(), "café");
    r.next().unwrap();
    assert_eq!(r.read_string().unwrap(), "quoted");
    r.next().unwrap();
    assert_eq!(r.read_string().unwrap(), "bare");
}

#[test]
fn bytes_with_bom() {
    let mut r = TextReader::for_bytes(b"\xEF\xBB\xBF\"\xC3\xA9\"");
    assert_eq!(r.next().unwrap(), Some(IonType::String));
    assert_eq!(r.read_string().unwrap(), "é");
}

#[test]
fn iterator_source() {
    let mut r = TextReader::new(IterSource::new("[1, 2]".chars()));
    let elements = Element::read_all(&mut r).unwrap();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].to_string(), "[1, 2]");
}

#[test]
fn comments_are_whitespace() {
    let elements = load_all("// line\n1 /* block */ 2 // trailing").unwrap();
    assert_eq!(elements.len(), 2);
}

#[test]
fn sexp_operators_and_signs() {
    let element = single("(a+-b -1 - 1 +inf -inf)");
    let Value::Sexp(items) = &element.value else {
        panic!("{element:?}");
    };
    let rendered: Vec<_> = items.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec!["a", "'+-'", "b", "-1", "'-'", "1", "+inf", "-inf"]
    );
}

#[test]
fn load_all_renders_values() {
    let element = single("ann::{a: 1.0, b: 2020-01-01T00:00Z, c: null.string, d: '$ion_1_0'}");
    assert_eq!(
        element.to_string(),
        "ann::{a: 1.0, b: 2020-01-01T00:00Z, c: null.string, d: '$ion_1_0'}"
    );
}

#[test]
fn positions_advance() {
    let mut r = reader("a\n  b");
    r.next().unwrap();
    r.next().unwrap();
    let (line, column) = r.position();
    assert_eq!(line, 2);
    assert!(column >= 3);
}
