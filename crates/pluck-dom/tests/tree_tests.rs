//! Tests for tree construction, navigation and text content.

use pluck_dom::{Attributes, DomTree, ElementData, NodeId, NodeType};

/// Helper to create an element node and return its NodeId.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData::new(tag)))
}

fn alloc_text(tree: &mut DomTree, text: &str) -> NodeId {
    tree.alloc(NodeType::Text(text.to_string()))
}

// ========== structure ==========

#[test]
fn test_new_tree_has_only_document() {
    let tree = DomTree::new();
    assert_eq!(tree.len(), 1);
    assert!(!tree.is_empty());
    assert!(matches!(
        tree.get(tree.root()).map(|n| &n.node_type),
        Some(NodeType::Document)
    ));
    assert!(tree.children(NodeId::ROOT).is_empty());
}

#[test]
fn test_append_child_sets_parent_and_order() {
    let mut tree = DomTree::new();
    let div = alloc_element(&mut tree, "div");
    tree.append_child(NodeId::ROOT, div);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    tree.append_child(div, a);
    tree.append_child(div, b);

    assert_eq!(tree.children(div), &[a, b]);
    assert_eq!(tree.parent(a), Some(div));
    assert_eq!(tree.parent(div), Some(NodeId::ROOT));
    assert_eq!(tree.parent(NodeId::ROOT), None);
}

#[test]
fn test_unknown_id_is_harmless() {
    let tree = DomTree::new();
    let missing = NodeId(42);
    assert!(tree.get(missing).is_none());
    assert!(tree.children(missing).is_empty());
    assert_eq!(tree.parent(missing), None);
    assert!(!tree.is_element(missing));
    assert_eq!(tree.text_content(missing), "");
}

// ========== text content ==========

#[test]
fn test_text_content_concatenates_descendants() {
    let mut tree = DomTree::new();
    let p = alloc_element(&mut tree, "p");
    tree.append_child(NodeId::ROOT, p);

    let hello = alloc_text(&mut tree, "Hello ");
    tree.append_child(p, hello);
    let b = alloc_element(&mut tree, "b");
    tree.append_child(p, b);
    let world = alloc_text(&mut tree, "world");
    tree.append_child(b, world);
    let comment = tree.alloc(NodeType::Comment("hidden".to_string()));
    tree.append_child(p, comment);

    assert_eq!(tree.text_content(p), "Hello world");
    assert_eq!(tree.text_content(NodeId::ROOT), "Hello world");
    assert_eq!(tree.text_content(world), "world");
    assert_eq!(tree.as_text(hello), Some("Hello "));
    assert_eq!(tree.text_content(comment), "");
}

// ========== attributes ==========

#[test]
fn test_attributes_keep_source_order() {
    let attrs: Attributes = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
    let names: Vec<&str> = attrs.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["b", "a", "c"]);
    assert_eq!(attrs.len(), 3);
}

#[test]
fn test_attribute_lookup_ignores_case() {
    let mut attrs = Attributes::new();
    attrs.insert("Href", "/index");
    assert_eq!(attrs.get("href"), Some("/index"));
    assert!(attrs.contains("HREF"));
    assert!(!attrs.contains("src"));
}

#[test]
fn test_attribute_insert_replaces_in_place() {
    let mut attrs = Attributes::new();
    attrs.insert("id", "one");
    attrs.insert("class", "x");
    attrs.insert("ID", "two");

    assert_eq!(attrs.len(), 2);
    assert_eq!(attrs.get("id"), Some("two"));
    assert_eq!(attrs.iter().next().map(|a| a.name.as_str()), Some("id"));
}

#[test]
fn test_element_id_and_classes() {
    let mut element = ElementData::new("p");
    element.attrs.insert("id", "intro");
    element.attrs.insert("class", "  lead   wide ");

    assert_eq!(element.id(), Some("intro"));
    assert_eq!(element.classes(), vec!["lead", "wide"]);
    assert!(ElementData::new("span").classes().is_empty());
}
