use alloc::{
    string::{String, ToString},
    vec::Vec,
};
use std::dbg;

use quickcheck::{QuickCheck, TestResult};

use crate::{Element, IterSource, TextReader, load_all};

fn render(elements: &[Element]) -> String {
    elements
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn tests() -> u64 {
    #[cfg(not(miri))]
    let tests = if is_ci::cached() { 10_000 } else { 1_000 };
    #[cfg(miri)]
    let tests = 10;
    tests
}

/// Property: rendering elements as text and reading them back gives
/// equivalent elements, and rendering those gives the same text.
#[test]
fn text_roundtrip_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(elements: Vec<Element>) -> TestResult {
        let text = render(&elements);
        let read = match load_all(&text) {
            Ok(read) => read,
            Err(err) => {
                dbg!(&text, &elements, err);
                return TestResult::failed();
            }
        };
        if read != elements {
            dbg!(&text, &elements, &read);
            return TestResult::failed();
        }
        let again = render(&read);
        if again != text {
            dbg!(&text, &again);
            return TestResult::failed();
        }
        TestResult::passed()
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Vec<Element>) -> TestResult);
}

/// Property: every character source reads the same values.
#[test]
fn sources_agree_quickcheck() {
    #[allow(clippy::needless_pass_by_value)]
    fn prop(elements: Vec<Element>) -> TestResult {
        if elements.is_empty() {
            return TestResult::discard();
        }
        let text = render(&elements);
        let from_str = load_all(&text);
        let from_bytes = Element::read_all(&mut TextReader::for_bytes(text.as_bytes()));
        let from_chars = Element::read_all(&mut TextReader::new(IterSource::new(text.chars())));
        let agree = from_str == from_bytes && from_bytes == from_chars;
        if !agree {
            dbg!(&text, &from_str, &from_bytes, &from_chars);
        }
        TestResult::from_bool(agree && from_str.is_ok())
    }

    QuickCheck::new()
        .tests(tests())
        .quickcheck(prop as fn(Vec<Element>) -> TestResult);
}

#[test]
fn roundtrip_repro_nested_unknown_symbols() {
    let text = "$0::{$0: ($0 '' '$10'), '': [null.sexp, -0., {{}}]}";
    let elements = load_all(text).unwrap();
    assert_eq!(render(&elements), text);
}
