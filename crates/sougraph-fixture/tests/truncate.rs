use std::fmt::Write as _;
use std::fs;
use std::path::PathBuf;

use sougraph_fixture::{
    balance_xml_tags, truncate_to_lines, truncate_with_priorities, verify,
};
use tempfile::tempdir;

fn write_fixture(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write fixture");
    path
}

/// A .sou-shaped document: `filler` plain classes followed by one class named
/// `FooWidget` with its methods block.
fn sou_with_trailing_priority_class(filler: usize) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<sou>\n");
    for i in 0..filler {
        writeln!(out, "  <class>").unwrap();
        writeln!(out, "    <name>Plain{i}</name>").unwrap();
        writeln!(out, "    <superclass>Object</superclass>").unwrap();
        writeln!(out, "  </class>").unwrap();
    }
    out.push_str(
        "  <class>\n    <name>FooWidget</name>\n    <superclass>Object</superclass>\n  </class>\n",
    );
    out.push_str(
        "  <methods>\n    <class-id>FooWidget</class-id>\n    <body selector=\"render\">render\n    ^self</body>\n  </methods>\n",
    );
    out.push_str("</sou>\n");
    out
}

#[test]
fn truncating_a_complete_document_keeps_it_well_formed() {
    let dir = tempdir().expect("tempdir");
    let path = write_fixture(&dir, "small.sou", &sou_with_trailing_priority_class(1));

    let truncated = truncate_to_lines(&path, 1000).expect("truncate");
    let report = verify(&truncated).expect("well-formed output");

    assert_eq!(report.root, "sou");
    assert!(report.children >= 3);
}

#[test]
fn truncating_mid_element_yields_well_formed_output() {
    let dir = tempdir().expect("tempdir");
    let path = write_fixture(&dir, "cut.sou", &sou_with_trailing_priority_class(4));

    // 5 lines ends inside the first <class> element.
    let truncated = truncate_to_lines(&path, 5).expect("truncate");
    let report = verify(&truncated).expect("well-formed output");

    assert_eq!(report.root, "sou");
}

#[test]
fn balance_xml_tags_output_parses_as_well_formed_xml() {
    let cut = "<sou>\n  <class>\n    <name>Half</name>";
    let balanced = balance_xml_tags(cut);

    let report = verify(&balanced).expect("balanced output parses");
    assert_eq!(report.root, "sou");

    let class_close = balanced.find("</class>").expect("class closed");
    let sou_close = balanced.find("</sou>").expect("root closed");
    assert!(class_close < sou_close);
}

#[test]
fn priority_classes_survive_aggressive_truncation() {
    let dir = tempdir().expect("tempdir");
    // 20 filler classes of 4 lines each push FooWidget well past line 50.
    let path = write_fixture(&dir, "large.sou", &sou_with_trailing_priority_class(20));

    let prefixes = vec!["Foo".to_owned()];
    let truncated = truncate_with_priorities(&path, 50, &prefixes).expect("truncate");

    assert!(truncated.contains("<name>FooWidget</name>"));
    assert!(truncated.contains("<class-id>FooWidget</class-id>"));
    assert!(truncated.contains("selector=\"render\""));

    let report = verify(&truncated).expect("well-formed output");
    assert_eq!(report.root, "sou");
}

#[test]
fn non_priority_content_is_capped_at_max_lines() {
    let dir = tempdir().expect("tempdir");
    let path = write_fixture(&dir, "capped.sou", &sou_with_trailing_priority_class(20));

    let prefixes = vec!["Foo".to_owned()];
    let truncated = truncate_with_priorities(&path, 20, &prefixes).expect("truncate");

    // Early filler classes fit under the cap; later ones must not.
    assert!(truncated.contains("<name>Plain0</name>"));
    assert!(!truncated.contains("<name>Plain19</name>"));
    assert!(truncated.contains("<name>FooWidget</name>"));
}
