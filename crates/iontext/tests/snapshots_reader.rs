#![expect(missing_docs)]
#![expect(clippy::needless_raw_string_hashes)]

use core::fmt::Write;

use iontext::{CharSource, IonResult, IonType, SymbolToken, TextReader, load_all};

fn token(symbol: &SymbolToken) -> String {
    match (symbol.text(), symbol.sid) {
        (Some(text), _) => text.to_string(),
        (None, Some(sid)) => format!("${sid}?"),
        (None, None) => "?".to_string(),
    }
}

fn walk<S: CharSource>(reader: &mut TextReader<S>, out: &mut String) -> IonResult<()> {
    while let Some(ion_type) = reader.next()? {
        out.push_str(&"  ".repeat(reader.depth()));
        if let Some(name) = reader.field_name_symbol() {
            write!(out, "{}: ", token(&name)).unwrap();
        }
        for annotation in reader.annotation_symbols() {
            write!(out, "{}::", token(&annotation)).unwrap();
        }
        if ion_type == IonType::Null {
            writeln!(out, "null").unwrap();
            continue;
        }
        if reader.is_null() {
            writeln!(out, "null.{ion_type}").unwrap();
            continue;
        }
        match ion_type {
            IonType::List | IonType::Sexp | IonType::Struct => {
                writeln!(out, "{ion_type}").unwrap();
                reader.step_in()?;
                walk(reader, out)?;
                reader.step_out()?;
            }
            IonType::Bool => writeln!(out, "bool {}", reader.read_bool()?).unwrap(),
            IonType::Int => writeln!(out, "int {}", reader.read_int()?).unwrap(),
            IonType::Float => writeln!(out, "float {:?}", reader.read_f64()?).unwrap(),
            IonType::Decimal => writeln!(out, "decimal {}", reader.read_decimal()?).unwrap(),
            IonType::Timestamp => {
                writeln!(out, "timestamp {}", reader.read_timestamp()?).unwrap();
            }
            IonType::Symbol => writeln!(out, "symbol {}", token(&reader.read_symbol()?)).unwrap(),
            IonType::String => writeln!(out, "string {:?}", reader.read_string()?).unwrap(),
            IonType::Clob | IonType::Blob => {
                let bytes = bstr::BStr::new(reader.read_lob()?);
                writeln!(out, "{ion_type} {bytes:?}").unwrap();
            }
            IonType::Null => unreachable!(),
        }
    }
    Ok(())
}

fn render_events(text: &str) -> String {
    let mut reader = TextReader::for_text(text);
    let mut out = String::new();
    if let Err(err) = walk(&mut reader, &mut out) {
        writeln!(out, "error: {err}").unwrap();
    }
    out
}

fn render_elements(text: &str) -> String {
    let mut out = String::new();
    for element in load_all(text).expect("load error") {
        writeln!(out, "{element}").unwrap();
    }
    out
}

#[test]
fn snapshot_events_mixed_document() {
    let text = r#"
        $ion_symbol_table::{symbols:["price"]}
        order::{
            id: 0x1F,
            $10: 12.50,
            tags: [fast, 'two words'],
            at: 2024-03-01T10:15:30Z,
            note: null.string,
            raw: {{aGk=}},
        }
        (+ 1 2e0)
    "#;
    insta::assert_snapshot!(render_events(text), @r#"
    order::struct
      id: int 31
      price: decimal 12.50
      tags: list
        symbol fast
        symbol two words
      at: timestamp 2024-03-01T10:15:30Z
      note: null.string
      raw: blob "hi"
    sexp
      symbol +
      int 1
      float 2.0
    "#);
}

#[test]
fn snapshot_events_unknown_symbols() {
    let text = r#"
        $ion_symbol_table::{
            imports: [{name: "missing", version: 2, max_id: 2}],
            symbols: ["local"],
        }
        $10::{$11: $12, $4: local}
    "#;
    insta::assert_snapshot!(render_events(text), @r#"
    $10?::struct
      $11?: symbol local
      name: symbol local
    "#);
}

#[test]
fn snapshot_events_scalars_and_version_marker() {
    let text = r#"'''one ''' '''two''' $ion_1_0 {{"clob\x21"}} {{'''a''' '''b'''}} [null, null.list, true, -inf, nan, -0.0, 1.5e3]"#;
    insta::assert_snapshot!(render_events(text), @r#"
    string "one two"
    clob "clob!"
    clob "ab"
    list
      null
      null.list
      bool true
      float -inf
      float NaN
      decimal -0.0
      float 1500.0
    "#);
}

#[test]
fn snapshot_events_stop_at_the_first_error() {
    insta::assert_snapshot!(render_events("[1, 2)"), @r#"
    list
      int 1
      int 2
    error: syntax error: mismatched closing delimiter: expected ']', found ')' at 1:6
    "#);
}

#[test]
fn snapshot_elements_with_local_symbols() {
    let text = r#"$ion_symbol_table::{symbols:["a b", null, "c"]} $10::$11::{$12: [$10, "x"], 'd': (1 + 2.5e0)}"#;
    insta::assert_snapshot!(render_elements(text), @r#"'a b'::$0::{c: ['a b', "x"], d: (1 '+' 2.5e0)}"#);
}
