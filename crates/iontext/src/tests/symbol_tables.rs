use alloc::{
    string::{String, ToString},
    sync::Arc,
    vec,
    vec::Vec,
};

use crate::{
    Element, ErrorKind, ImportLocation, IonType, MemoryCatalog, ReaderOptions, SharedSymbolTable,
    StrSource, SymbolError, SymbolToken, TextReader, Value,
};

fn colors() -> MemoryCatalog {
    MemoryCatalog::new().with_table(SharedSymbolTable::new("colors", 1, ["red", "green", "blue"]))
}

fn with_catalog(text: &str) -> TextReader<StrSource<'_>> {
    let options = ReaderOptions {
        catalog: Some(Arc::new(colors())),
        ..Default::default()
    };
    TextReader::with_options(StrSource::new(text), options)
}

/// Text of every top-level symbol value, `None` where unknown.
fn symbol_texts(reader: &mut TextReader<StrSource<'_>>) -> Vec<Option<String>> {
    let mut texts = Vec::new();
    while let Some(ion_type) = reader.next().unwrap() {
        assert_eq!(ion_type, IonType::Symbol);
        texts.push(reader.read_symbol().unwrap().text);
    }
    texts
}

fn some(text: &str) -> Option<String> {
    Some(text.into())
}

fn symbol_error(err: &crate::IonError) -> &SymbolError {
    match err.kind() {
        ErrorKind::Symbol(e) => e,
        other => panic!("expected a symbol error, got {other:?}"),
    }
}

#[test]
fn local_symbols_start_at_10() {
    let mut r = TextReader::for_text("$ion_symbol_table::{symbols:[\"foo\", \"bar\"]} $10 $11 foo");
    assert_eq!(
        symbol_texts(&mut r),
        [some("foo"), some("bar"), some("foo")]
    );
    assert!(r.symbol_table().is_local());
    assert_eq!(r.symbol_table().max_id(), 11);
}

#[test]
fn symbol_tokens_carry_sids() {
    let mut r = TextReader::for_text("$ion_symbol_table::{symbols:[\"foo\"]} foo other $4");
    r.next().unwrap();
    assert_eq!(r.read_symbol().unwrap(), SymbolToken::new(Some("foo".into()), Some(10)));
    r.next().unwrap();
    assert_eq!(r.read_symbol().unwrap(), SymbolToken::new(Some("other".into()), None));
    r.next().unwrap();
    let name = r.read_symbol().unwrap();
    assert_eq!(name.text(), Some("name"));
    assert_eq!(name.sid, Some(4));
    assert_eq!(
        name.import_location,
        Some(ImportLocation {
            table: "$ion".into(),
            sid: 4
        })
    );
}

#[test]
fn version_marker_resets_to_system_table() {
    let mut r = TextReader::for_text("$ion_symbol_table::{symbols:[\"foo\"]} $10 $ion_1_0 $10");
    r.next().unwrap();
    assert_eq!(r.read_string().unwrap(), "foo");
    r.next().unwrap();
    assert!(r.symbol_table().is_system());
    assert_eq!(r.read_symbol().unwrap().text, None);
    let err = r.read_string().unwrap_err();
    assert_eq!(
        symbol_error(&err),
        &SymbolError::OutOfRange { sid: 10, max_id: 9 }
    );
}

#[test]
fn new_tables_replace_the_old_one() {
    let mut r = TextReader::for_text(
        "$ion_symbol_table::{symbols:[\"a\"]} $ion_symbol_table::{symbols:[\"b\"]} $10",
    );
    assert_eq!(symbol_texts(&mut r), [some("b")]);
    assert_eq!(r.symbol_table().max_id(), 10);
}

#[test]
fn importing_the_current_table_appends() {
    let mut r = TextReader::for_text(
        "$ion_symbol_table::{symbols:[\"a\"]} \
         $ion_symbol_table::{imports:$ion_symbol_table, symbols:[\"b\"]} \
         $10 $11",
    );
    assert_eq!(symbol_texts(&mut r), [some("a"), some("b")]);
}

#[test]
fn appending_to_the_system_table_starts_fresh() {
    let mut r =
        TextReader::for_text("$ion_symbol_table::{imports:$ion_symbol_table, symbols:[\"a\"]} $10");
    assert_eq!(symbol_texts(&mut r), [some("a")]);
}

#[test]
fn system_symbols_by_sid() {
    let mut r = TextReader::for_text("$3::{symbols:[\"a\"]} $10 $ion_symbol_table::{$7:[\"b\"]} $10");
    assert_eq!(symbol_texts(&mut r), [some("a"), some("b")]);
}

#[test]
fn symbol_list_gaps() {
    let mut r = TextReader::for_text(
        "$ion_symbol_table::{symbols:[\"a\", 1, null.string, \"b\", \"a\"]} $10 $11 $12 $13 $14 a",
    );
    let mut tokens = Vec::new();
    while r.next().unwrap().is_some() {
        tokens.push(r.read_symbol().unwrap());
    }
    let texts: Vec<_> = tokens.iter().map(SymbolToken::text).collect();
    assert_eq!(texts, [Some("a"), None, None, Some("b"), Some("a"), Some("a")]);
    // text declared twice resolves to its first SID
    assert_eq!(tokens[5].sid, Some(10));
}

#[test]
fn gaps_fail_only_when_text_is_required() {
    let mut r = TextReader::for_text("$ion_symbol_table::{symbols:[1]} $10");
    r.next().unwrap();
    assert_eq!(r.read_symbol().unwrap(), SymbolToken::new(None, Some(10)));
    let err = r.read_string().unwrap_err();
    assert_eq!(symbol_error(&err), &SymbolError::UnknownText(10));
}

#[test]
fn duplicate_fields_are_rejected() {
    let mut r = TextReader::for_text("$ion_symbol_table::{symbols:[\"a\"], symbols:[\"b\"]}");
    let err = r.next().unwrap_err();
    assert_eq!(symbol_error(&err), &SymbolError::DuplicateField("symbols"));

    let mut r = TextReader::for_text("$ion_symbol_table::{imports:[], imports:$ion_symbol_table}");
    let err = r.next().unwrap_err();
    assert_eq!(symbol_error(&err), &SymbolError::DuplicateField("imports"));
}

#[test]
fn wrongly_typed_fields_count_as_absent() {
    let mut r = TextReader::for_text("$ion_symbol_table::{symbols:\"a\", imports:1} $10");
    r.next().unwrap();
    assert_eq!(r.symbol_table().max_id(), 9);
    assert!(r.read_string().is_err());

    // still counted when looking for duplicates
    let mut r = TextReader::for_text("$ion_symbol_table::{symbols:\"a\", symbols:[\"b\"]}");
    let err = r.next().unwrap_err();
    assert_eq!(symbol_error(&err), &SymbolError::DuplicateField("symbols"));
}

#[test]
fn other_fields_are_ignored() {
    let mut r = TextReader::for_text(
        "$ion_symbol_table::{name:\"x\", max_id:3, extra:[1, {a:2}], symbols:[\"a\"]} $10",
    );
    assert_eq!(symbol_texts(&mut r), [some("a")]);
}

#[test]
fn imports_from_the_catalog() {
    let mut r = with_catalog(
        "$ion_symbol_table::{imports:[{name:\"colors\", version:1, max_id:3}], symbols:[\"mine\"]} \
         $10 $12 $13 green",
    );
    r.next().unwrap();
    assert_eq!(r.read_string().unwrap(), "red");
    let table = r.symbol_table();
    assert_eq!(table.max_id(), 13);
    assert_eq!(table.imports().len(), 2);
    assert!(table.imports()[1].is_shared());

    r.next().unwrap();
    assert_eq!(r.read_string().unwrap(), "blue");
    r.next().unwrap();
    assert_eq!(r.read_string().unwrap(), "mine");
    r.next().unwrap();
    let green = r.read_symbol().unwrap();
    assert_eq!(green.sid, Some(11));
    assert_eq!(
        green.import_location,
        Some(ImportLocation {
            table: "colors".into(),
            sid: 2
        })
    );
    assert_eq!(r.next().unwrap(), None);
}

#[test]
fn imports_without_max_id_use_the_catalog_size() {
    let mut r = with_catalog("$ion_symbol_table::{imports:[{name:\"colors\", version:1}]} $12");
    r.next().unwrap();
    assert_eq!(r.read_string().unwrap(), "blue");
}

#[test]
fn smaller_max_id_hides_symbols() {
    let mut r = with_catalog(
        "$ion_symbol_table::{imports:[{name:\"colors\", version:1, max_id:2}], symbols:[\"x\"]} \
         $11 $12 blue",
    );
    r.next().unwrap();
    assert_eq!(r.read_string().unwrap(), "green");
    assert!(r.symbol_table().imports()[1].is_substitute());
    r.next().unwrap();
    assert_eq!(r.read_string().unwrap(), "x");
    r.next().unwrap();
    // past the substitute's range, so not found
    assert_eq!(r.read_symbol().unwrap().sid, None);
}

#[test]
fn missing_import_has_unknown_symbols() {
    let mut r = TextReader::for_text(
        "$ion_symbol_table::{imports:[{name:\"x\", version:1, max_id:5}]} $12 $14 $15",
    );
    r.next().unwrap();
    assert_eq!(r.symbol_table().max_id(), 14);
    assert_eq!(r.read_symbol().unwrap(), {
        let mut token = SymbolToken::new(None, Some(12));
        token.import_location = Some(ImportLocation {
            table: "x".into(),
            sid: 3,
        });
        token
    });
    let err = r.read_string().unwrap_err();
    assert_eq!(symbol_error(&err), &SymbolError::UnknownText(12));

    r.next().unwrap();
    assert_eq!(r.read_symbol().unwrap().text, None);

    r.next().unwrap();
    let err = r.read_string().unwrap_err();
    assert_eq!(
        symbol_error(&err),
        &SymbolError::OutOfRange { sid: 15, max_id: 14 }
    );
    // lazy errors leave the stream usable
    assert_eq!(r.next().unwrap(), None);
}

#[test]
fn missing_import_without_max_id_fails() {
    let mut r = TextReader::for_text("$ion_symbol_table::{imports:[{name:\"x\", version:1}]} 1");
    let err = r.next().unwrap_err();
    assert!(matches!(symbol_error(&err), SymbolError::InvalidImport(_)));
    assert_eq!(r.next().unwrap_err(), err);
}

#[test]
fn malformed_imports_are_skipped() {
    let mut r = with_catalog(
        "$ion_symbol_table::{imports:[1, {version:1, max_id:4}, {name:\"$ion\", max_id:9}, \
         {name:\"colors\", max_id:3}]} $10",
    );
    r.next().unwrap();
    assert_eq!(r.read_string().unwrap(), "red");
    assert_eq!(r.symbol_table().max_id(), 12);
}

#[test]
fn unknown_field_names_and_annotations() {
    let mut r = TextReader::for_text(
        "$ion_symbol_table::{imports:[{name:\"x\", version:1, max_id:2}]} $10::{$11: 1}",
    );
    assert_eq!(r.next().unwrap(), Some(IonType::Struct));
    let err = r.annotations().unwrap_err();
    assert_eq!(symbol_error(&err), &SymbolError::UnknownText(10));
    let annotations = r.annotation_symbols();
    assert_eq!(annotations.len(), 1);
    assert_eq!(annotations[0].text, None);
    assert_eq!(annotations[0].sid, Some(10));

    r.step_in().unwrap();
    assert_eq!(r.next().unwrap(), Some(IonType::Int));
    let err = r.field_name().unwrap_err();
    assert_eq!(symbol_error(&err), &SymbolError::UnknownText(11));
    let name = r.field_name_symbol().unwrap();
    assert_eq!((name.text, name.sid), (None, Some(11)));
    assert_eq!(r.read_i64().unwrap(), 1);
}

#[test]
fn elements_keep_unknown_text_as_none() {
    let mut r = TextReader::for_text(
        "$ion_symbol_table::{imports:[{name:\"x\", version:1, max_id:3}]} $10::{$11: $12}",
    );
    let elements = Element::read_all(&mut r).unwrap();
    assert_eq!(elements.len(), 1);
    assert_eq!(elements[0].annotations, vec![None]);
    assert_eq!(
        elements[0].value,
        Value::Struct(vec![(None, Value::Symbol(None).into())])
    );
    assert_eq!(elements[0].to_string(), "$0::{$0: $0}");
}

#[test]
fn null_symbol_table_is_a_value() {
    let mut r = TextReader::for_text("$ion_symbol_table::null.struct 1");
    assert_eq!(r.next().unwrap(), Some(IonType::Struct));
    assert!(r.is_null());
    assert!(r.has_annotation("$ion_symbol_table"));
    assert_eq!(r.next().unwrap(), Some(IonType::Int));
}

#[test]
fn nested_symbol_tables_are_values() {
    let mut r = TextReader::for_text("[$ion_symbol_table::{symbols:[\"a\"]}] $10");
    r.next().unwrap();
    r.step_in().unwrap();
    assert_eq!(r.next().unwrap(), Some(IonType::Struct));
    assert!(r.has_annotation("$ion_symbol_table"));
    r.step_out().unwrap();
    assert!(r.symbol_table().is_system());
    r.next().unwrap();
    assert!(r.read_string().is_err());
}

#[test]
fn second_annotation_is_not_a_symbol_table() {
    let mut r = TextReader::for_text("a::$ion_symbol_table::{symbols:[\"a\"]}");
    assert_eq!(r.next().unwrap(), Some(IonType::Struct));
    assert_eq!(r.annotations().unwrap(), ["a", "$ion_symbol_table"]);
}

#[test]
fn only_bare_version_markers_reset() {
    let mut r = TextReader::for_text(
        "$ion_symbol_table::{symbols:[\"a\"]} '$ion_1_0' a::$ion_1_0 $2 '$ion_2_0' $10",
    );
    assert_eq!(
        symbol_texts(&mut r),
        [
            some("$ion_1_0"),
            some("$ion_1_0"),
            some("$ion_1_0"),
            some("$ion_2_0"),
            some("a"),
        ]
    );
}

#[test]
fn version_marker_like_symbols_below_top_level() {
    let elements = crate::load_all("[$ion_1_0, $ion_2_0]").unwrap();
    assert_eq!(elements[0].to_string(), "['$ion_1_0', '$ion_2_0']");
}

#[test]
fn shared_table_with_catalog() {
    let mut r = with_catalog(
        "$ion_shared_symbol_table::{name:\"colors\", version:2, \
         imports:[{name:\"colors\", version:1, max_id:3}], symbols:[\"cyan\"]}",
    );
    assert_eq!(r.next().unwrap(), Some(IonType::Struct));
    let table = r.read_shared_symbol_table().unwrap();
    assert_eq!(table.name(), "colors");
    assert_eq!(table.version(), 2);
    assert_eq!(table.max_id(), 4);
    assert_eq!(table.find_sid("cyan"), Some(4));
    assert_eq!(table.find_known_symbol(1), Some("red"));
    assert_eq!(r.next().unwrap(), None);
}

#[test]
fn shared_table_without_catalog() {
    let mut r = TextReader::for_text(
        "$ion_shared_symbol_table::{name:\"colors\", \
         imports:[{name:\"colors\", version:1, max_id:3}], symbols:[\"cyan\"]}",
    );
    r.next().unwrap();
    let table = r.read_shared_symbol_table().unwrap();
    assert_eq!(table.version(), 1);
    assert_eq!(
        table.symbols(),
        [None, None, None, some("cyan")]
    );
}

#[test]
fn shared_table_requires_a_name() {
    let mut r = TextReader::for_text("$ion_shared_symbol_table::{symbols:[\"a\"]}");
    r.next().unwrap();
    let err = r.read_shared_symbol_table().unwrap_err();
    assert!(matches!(symbol_error(&err), SymbolError::InvalidSharedTable(_)));
}

#[test]
fn shared_table_requires_the_annotation() {
    let mut r = TextReader::for_text("{name:\"t\", symbols:[\"a\"]}");
    r.next().unwrap();
    let err = r.read_shared_symbol_table().unwrap_err();
    assert!(matches!(symbol_error(&err), SymbolError::InvalidSharedTable(_)));
}

#[test]
fn shared_table_round_trips_through_a_catalog() {
    let mut r = TextReader::for_text(
        "$ion_shared_symbol_table::{name:\"animals\", version:3, symbols:[\"cat\", \"dog\"]}",
    );
    r.next().unwrap();
    let animals = r.read_shared_symbol_table().unwrap();

    let options = ReaderOptions {
        catalog: Some(Arc::new(MemoryCatalog::new().with_table(animals))),
        ..Default::default()
    };
    let text = "$ion_symbol_table::{imports:[{name:\"animals\", version:3}]} $11";
    let mut r = TextReader::with_options(StrSource::new(text), options);
    r.next().unwrap();
    assert_eq!(r.read_string().unwrap(), "dog");
}
