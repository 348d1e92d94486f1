#![no_main]
use std::cell::RefCell;

use arbitrary::{Arbitrary, Unstructured};
use iontext::{
    Decimal, Element, IonType, ReaderOptions, StrSource, TextReader, Utf8Source, Value,
};
use libfuzzer_sys::{fuzz_mutator, fuzz_target, fuzzer_mutate};
use rand::rngs::SmallRng; // faster than StdRng
use rand::{Rng, RngCore, SeedableRng};

const HEADER: usize = 1; // flags

thread_local! {
    // One SmallRng per thread, seeded once from the host OS
    static RNG: RefCell<SmallRng> =
        RefCell::new(SmallRng::from_os_rng());
}

/// Fragments that reach the corners of the grammar random bytes rarely hit.
static TOKEN_TABLE: &[&str] = &[
    " ",
    "\n",
    "/* c */",
    "// c\n",
    "$ion_1_0 ",
    "$ion_symbol_table::{symbols:[\"a\", null, \"b\"]}",
    "$ion_symbol_table::{imports:$ion_symbol_table, symbols:[\"c\"]}",
    "$ion_symbol_table::{imports:[{name:\"t\", version:2, max_id:3}]}",
    "$ion_shared_symbol_table::{name:\"t\", symbols:[\"x\"]}",
    "$3::",
    "$10",
    "$12",
    "'''long''' ",
    "{{aGk=}}",
    "{{\"clob\\x21\"}}",
    "{{'''a''' '''b'''}}",
    "2020-02-29T",
    "2001-01-01T12:30:59.125-08:00",
    "0x1F",
    "-0b1_0",
    "1.5d-2",
    "-0.",
    "+inf",
    "nan",
    "null.sexp",
    "(a+-b)",
    "::",
    ":",
    ",",
    "[",
    "]",
    "(",
    ")",
    "{",
    "}",
];

/// Helper: borrow the thread-local RNG and run a closure with it.
fn with_rng<F, R>(f: F) -> R
where
    F: FnOnce(&mut SmallRng) -> R,
{
    RNG.with(|cell| f(&mut cell.borrow_mut()))
}

fn mutator(data: &mut [u8], size: usize, max_size: usize, seed: u32) -> usize {
    if size < HEADER || seed.is_multiple_of(10) {
        data[0] = with_rng(|rng| rng.next_u32() as u8 & 0x0F);

        let mut prefix = HEADER;
        while prefix < size.max(HEADER + 1) && prefix < max_size {
            let limit = max_size - prefix;
            let written = if with_rng(|rng| rng.random_bool(0.5)) {
                append_token(&mut data[prefix..], limit)
            } else {
                append_value(&mut data[prefix..], size, limit)
            };
            if written == 0 {
                break;
            }
            prefix += written;
        }
        prefix
    } else {
        fuzzer_mutate(data, size, max_size)
    }
}

/// Append one entry of `TOKEN_TABLE`, if it fits in `limit`.
fn append_token(buf: &mut [u8], limit: usize) -> usize {
    let token = with_rng(|rng| TOKEN_TABLE[rng.random_range(0..TOKEN_TABLE.len())]);
    if token.len() > limit {
        return 0;
    }
    buf[..token.len()].copy_from_slice(token.as_bytes());
    token.len()
}

fn append_value(data: &mut [u8], size: usize, limit: usize) -> usize {
    let value = loop {
        let s = with_rng(|rng| rng.random_range(size / 2..size * 2 + 2).min(limit.max(1)));
        let bytes: Vec<u8> = with_rng(|rng| (0..s).map(|_| rng.random::<u8>()).collect());
        if let Ok(value) = ArbitraryElement::arbitrary(&mut Unstructured::new(&bytes)) {
            break value;
        }
    };

    let serialized = format!("{} ", value.0);
    let len = serialized.len().min(limit);
    data[..len].copy_from_slice(&serialized.as_bytes()[..len]);
    len
}

fuzz_mutator!(|data: &mut [u8], size: usize, max_size: usize, seed: u32| {
    mutator(data, size, max_size, seed)
});

#[derive(Debug)]
struct ArbitraryElement(Element);

const NULL_TYPES: [IonType; 5] = [
    IonType::Null,
    IonType::Int,
    IonType::String,
    IonType::List,
    IonType::Struct,
];

fn symbol(u: &mut Unstructured<'_>) -> arbitrary::Result<Option<String>> {
    Ok(match u.choose_index(4)? {
        0 => None,
        1 => Some((*u.choose(&["$ion_symbol_table", "$ion_1_0", "null", "+", "$10"])?).into()),
        _ => Some(u.arbitrary()?),
    })
}

fn element(u: &mut Unstructured<'_>, depth: usize) -> arbitrary::Result<Element> {
    let node_type = u.choose_index(if depth == 0 { 12 } else { 18 })?;
    let value = match node_type {
        0 => Value::Null(*u.choose(&NULL_TYPES)?),
        1 => Value::Bool(u.arbitrary()?),
        2 => Value::Int(u.arbitrary::<i64>()?.into()),
        3 => Value::Float(u.arbitrary()?),
        4 => Value::Decimal(Decimal::new(
            u.arbitrary::<i64>()?,
            i64::from(u.arbitrary::<i8>()?),
        )),
        5 | 6 => Value::Symbol(symbol(u)?),
        7..=9 => Value::String(u.arbitrary()?),
        10 => Value::Clob(u.arbitrary()?),
        11 => Value::Blob(u.arbitrary()?),
        12 | 13 => Value::List(children(u, depth)?),
        14 | 15 => Value::Sexp(children(u, depth)?),
        16 | 17 => {
            let mut fields = Vec::new();
            for _ in 0..u.choose_index(4)? {
                fields.push((symbol(u)?, element(u, depth - 1)?));
            }
            Value::Struct(fields)
        }
        _ => Err(arbitrary::Error::IncorrectFormat)?,
    };
    let mut annotations = Vec::new();
    if u.ratio(1, 4)? {
        annotations.push(symbol(u)?);
    }
    Ok(Element { annotations, value })
}

fn children(u: &mut Unstructured<'_>, depth: usize) -> arbitrary::Result<Vec<Element>> {
    (0..u.choose_index(4)?)
        .map(|_| element(u, depth - 1))
        .collect()
}

impl<'a> Arbitrary<'a> for ArbitraryElement {
    fn arbitrary(u: &mut Unstructured<'a>) -> arbitrary::Result<Self> {
        let depth = u.choose_index(4)?;
        element(u, depth).map(ArbitraryElement)
    }
}

fn options(flags: u8) -> ReaderOptions {
    ReaderOptions {
        max_depth: match flags & 0x07 {
            0 => None,
            n => Some(usize::from(n) * 4),
        },
        panic_on_error: false,
        ..Default::default()
    }
}

fn render(elements: &[Element]) -> String {
    elements
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

fn reader(data: &[u8]) {
    if data.len() < HEADER {
        return;
    }
    let flags = data[0];
    let data = &data[HEADER..];

    let read = if flags & 0x08 != 0 {
        Element::read_all(&mut TextReader::with_options(Utf8Source::new(data), options(flags)))
    } else {
        let text = String::from_utf8_lossy(data);
        Element::read_all(&mut TextReader::with_options(StrSource::new(&text), options(flags)))
    };
    let Ok(elements) = read else {
        return;
    };

    // Whatever was read must render as text that reads back the same.
    let text = render(&elements);
    let again = Element::read_all(&mut TextReader::with_options(
        StrSource::new(&text),
        options(flags),
    ))
    .unwrap_or_else(|err| panic!("re-reading {text:?} failed: {err}"));
    assert_eq!(elements, again, "{text}");
}

fuzz_target!(|data: &[u8]| reader(data));
