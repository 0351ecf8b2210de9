use sougraph_core::{Symbol, SymbolKind};
use sougraph_parse::{SouReader, SouStats, method_names_from_reader};

fn collect(source: &str) -> Vec<Symbol> {
    SouReader::from_reader(source.as_bytes())
        .collect::<Result<Vec<_>, _>>()
        .expect("parse .sou source")
}

#[test]
fn commented_class_with_two_methods_emits_in_document_order() {
    let source = include_str!("fixtures/todo_basic.sou");
    let symbols = collect(source);

    assert_eq!(symbols.len(), 3);

    assert_eq!(symbols[0].kind, SymbolKind::Type);
    assert_eq!(symbols[0].name, "TaskQueue");
    assert_eq!(symbols[0].comment, "A FIFO queue of pending tasks.");
    assert!(symbols[0].body.contains("<superclass>Object</superclass>"));
    assert!(
        symbols[0]
            .body
            .contains("<name>Todo.Core.TaskQueue</name>")
    );

    assert_eq!(symbols[1].kind, SymbolKind::Method);
    assert_eq!(symbols[1].name, "TaskQueue.push:");
    assert!(symbols[1].body.contains("items add: aTask"));

    assert_eq!(symbols[2].kind, SymbolKind::Method);
    assert_eq!(symbols[2].name, "TaskQueue.pop");
    assert!(symbols[2].body.contains("^items removeFirst"));
}

#[test]
fn symbol_ids_are_fresh_per_parse() {
    let source = include_str!("fixtures/todo_basic.sou");
    let first = collect(source);
    let second = collect(source);

    for (a, b) in first.iter().zip(&second) {
        assert_eq!(a.name, b.name);
        assert_ne!(a.id, b.id);
    }
}

#[test]
fn uncommented_class_is_flushed_when_supplanted() {
    let source = r#"<sou>
  <class>
    <name>Alpha</name>
    <superclass>Object</superclass>
  </class>
  <class>
    <name>Beta</name>
    <superclass>Object</superclass>
  </class>
  <comment>
    <class-id>Beta</class-id>
    <body>Second class.</body>
  </comment>
</sou>"#;

    let symbols = collect(source);
    assert_eq!(symbols.len(), 2);
    assert_eq!(symbols[0].name, "Alpha");
    assert_eq!(symbols[0].comment, "");
    assert_eq!(symbols[1].name, "Beta");
    assert_eq!(symbols[1].comment, "Second class.");
}

#[test]
fn uncommented_class_is_flushed_at_methods_boundary() {
    let source = r#"<sou>
  <class>
    <name>Gamma</name>
  </class>
  <methods>
    <class-id>Gamma</class-id>
    <body selector="run">run
    ^self</body>
  </methods>
</sou>"#;

    let symbols = collect(source);
    assert_eq!(symbols.len(), 2);
    assert_eq!(symbols[0].kind, SymbolKind::Type);
    assert_eq!(symbols[0].name, "Gamma");
    assert_eq!(symbols[0].comment, "");
    assert_eq!(symbols[1].name, "Gamma.run");
}

#[test]
fn uncommented_trailing_class_is_flushed_at_end_of_input() {
    let source = r#"<sou>
  <class>
    <name>Omega</name>
  </class>
</sou>"#;

    let symbols = collect(source);
    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].name, "Omega");
    assert_eq!(symbols[0].comment, "");
}

#[test]
fn mismatched_comment_flushes_pending_class_unmerged() {
    let source = r#"<sou>
  <class>
    <name>Delta</name>
  </class>
  <comment>
    <class-id>SomethingElse</class-id>
    <body>Not for Delta.</body>
  </comment>
</sou>"#;

    let symbols = collect(source);
    assert_eq!(symbols.len(), 1);
    assert_eq!(symbols[0].name, "Delta");
    assert_eq!(symbols[0].comment, "");
}

#[test]
fn method_names_keep_the_full_class_id() {
    let source = include_str!("fixtures/todo_basic.sou");
    let names = method_names_from_reader(source.as_bytes()).expect("method names");

    assert_eq!(names.len(), 2);
    assert!(names.contains("Todo.Core.TaskQueue.push:"));
    assert!(names.contains("Todo.Core.TaskQueue.pop"));
}

#[test]
fn stats_accumulate_type_and_method_counts() {
    let source = include_str!("fixtures/todo_basic.sou");
    let mut stats = SouStats::default();
    for symbol in collect(source) {
        stats.record(&symbol);
    }

    assert_eq!(stats.types, 1);
    assert_eq!(stats.methods, 2);
    assert_eq!(stats.total(), 3);
    assert!(stats.mean_body_lines() > 0.0);
}
