use html5ever::QualName;
use markup5ever_rcdom::{Handle, NodeData, RcDom};
use pluck_dom::{Attributes, DomTree, ElementData, NodeId, NodeType};

/// Copy an `RcDom` into a fresh [`DomTree`].
pub fn to_dom_tree(dom: &RcDom) -> DomTree {
    let mut tree = DomTree::new();
    convert_node(&dom.document, &mut tree, NodeId::ROOT);
    tree
}

/// `prefix:local` when the parser recorded a prefix, otherwise just `local`.
fn qualified_name(name: &QualName) -> String {
    match &name.prefix {
        Some(prefix) => format!("{prefix}:{}", name.local),
        None => name.local.to_string(),
    }
}

fn convert_node(handle: &Handle, tree: &mut DomTree, parent: NodeId) {
    match &handle.data {
        NodeData::Document => {
            for child in handle.children.borrow().iter() {
                convert_node(child, tree, parent);
            }
        }
        NodeData::Text { contents } => {
            let text = contents.borrow().to_string();
            // Whitespace between tags is not kept.
            if !text.trim().is_empty() {
                let id = tree.alloc(NodeType::Text(text));
                tree.append_child(parent, id);
            }
        }
        NodeData::Comment { contents } => {
            let id = tree.alloc(NodeType::Comment(contents.to_string()));
            tree.append_child(parent, id);
        }
        NodeData::Element { name, attrs, .. } => {
            let attrs: Attributes = attrs
                .borrow()
                .iter()
                .map(|attr| (qualified_name(&attr.name), attr.value.to_string()))
                .collect();
            let id = tree.alloc(NodeType::Element(ElementData {
                tag_name: qualified_name(name),
                attrs,
            }));
            tree.append_child(parent, id);

            for child in handle.children.borrow().iter() {
                convert_node(child, tree, id);
            }
        }
        NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => {}
    }
}
