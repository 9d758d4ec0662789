//! Tests for S-expression parsing and tree queries

use kipack::{parse_sexpr, SExp};

#[test]
fn test_parse_nested_list_with_escapes() {
    let tree = parse_sexpr(r#"(a (b "c\"d"))"#);

    let items = tree.as_list().expect("Should be a list");
    assert_eq!(items.len(), 2);
    assert_eq!(items[0], SExp::Atom("a".to_string()));

    let inner = items[1].as_list().expect("Should be a nested list");
    assert_eq!(inner[0], SExp::Atom("b".to_string()));
    assert_eq!(inner[1], SExp::Atom("c\"d".to_string()));
}

#[test]
fn test_find_elements_in_document_order() {
    let tree = parse_sexpr("(root (sheet (at 0 0)) (sheet (at 1 1)))");
    let sheets = tree.find_elements("sheet");

    assert_eq!(sheets.len(), 2, "Should match both sheet elements");

    // Each match is the full subtree, in document order.
    assert_eq!(sheets[0].element_value("at"), Some("0"));
    assert_eq!(sheets[1].element_value("at"), Some("1"));
}

#[test]
fn test_find_elements_returns_nested_matches() {
    let tree = parse_sexpr(r#"(sheet (name "outer") (sheet (name "inner")))"#);
    let sheets = tree.find_elements("sheet");

    assert_eq!(sheets.len(), 2, "Should match outer and nested sheet");
    assert_eq!(sheets[0].element_value("name"), Some("outer"));
    assert_eq!(sheets[1].element_value("name"), Some("inner"));
}

#[test]
fn test_property_lookup() {
    let tree = parse_sexpr(r#"(sheet (property "Sheetfile" "sub.kicad_sch"))"#);

    assert_eq!(tree.property("Sheetfile"), Some("sub.kicad_sch"));
    assert_eq!(tree.property("Sheetname"), None);
}

#[test]
fn test_property_requires_a_value() {
    let tree = parse_sexpr(r#"(sheet (property "Sheetfile"))"#);
    assert_eq!(tree.property("Sheetfile"), None);
}

#[test]
fn test_property_scans_immediate_children_only() {
    let tree = parse_sexpr(r#"(sheet (instances (property "Sheetfile" "x.kicad_sch")))"#);
    assert_eq!(tree.property("Sheetfile"), None);
}

#[test]
fn test_element_value_lookup() {
    let tree = parse_sexpr(
        r#"(lib (name "mylib") (type "KiCad") (uri "${KIPRJMOD}/mylib.kicad_sym"))"#,
    );

    assert_eq!(tree.element_value("name"), Some("mylib"));
    assert_eq!(tree.element_value("uri"), Some("${KIPRJMOD}/mylib.kicad_sym"));
    assert_eq!(tree.element_value("descr"), None);
}

#[test]
fn test_element_value_requires_a_value() {
    let tree = parse_sexpr("(lib (uri))");
    assert_eq!(tree.element_value("uri"), None);
}

#[test]
fn test_realistic_schematic_fragment() {
    let text = r#"(kicad_sch
        (version 20231120)
        (generator "eeschema")
        (uuid "e63e39d7-6ac0-4ffd-8aa3-1841a4541b55")
        (sheet
            (at 86.36 48.26)
            (size 29.21 19.05)
            (uuid "1d33ec8a-3ef0-4e0b-a4a4-1f04e84f7b3e")
            (property "Sheetname" "Power Supply"
                (at 86.36 47.5486 0)
            )
            (property "Sheetfile" "power.kicad_sch"
                (at 86.36 67.8946 0)
            )
        )
    )"#;

    let tree = parse_sexpr(text);
    let sheets = tree.find_elements("sheet");

    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].property("Sheetname"), Some("Power Supply"));
    assert_eq!(sheets[0].property("Sheetfile"), Some("power.kicad_sch"));
}

#[test]
fn test_truncated_input_still_yields_partial_tree() {
    // A schematic cut off mid-file keeps everything parsed so far.
    let tree = parse_sexpr(r#"(kicad_sch (sheet (property "Sheetfile" "a.kicad_sch""#);
    let sheets = tree.find_elements("sheet");

    assert_eq!(sheets.len(), 1);
    assert_eq!(sheets[0].property("Sheetfile"), Some("a.kicad_sch"));
}

#[test]
fn test_stray_close_parens_are_tolerated() {
    let tree = parse_sexpr("(root (lib (uri \"a.kicad_sym\"))))");
    let libs = tree.find_elements("lib");

    assert_eq!(libs.len(), 1);
    assert_eq!(libs[0].element_value("uri"), Some("a.kicad_sym"));
}

#[test]
fn test_deeply_nested_input_degrades_to_partial_tree() {
    // Nesting far beyond any real file must not abort; the tree is
    // clamped but the innermost content survives.
    let depth = 100_000;
    let text = format!("{}leaf{}", "(".repeat(depth), ")".repeat(depth));
    let tree = parse_sexpr(&text);

    let mut node = &tree;
    let mut levels = 0;
    while let Some(items) = node.as_list() {
        match items.first() {
            Some(child) => {
                node = child;
                levels += 1;
            }
            None => break,
        }
    }
    assert_eq!(node.as_atom(), Some("leaf"));
    assert!(levels < depth, "Nesting is clamped: {} levels", levels);
}
