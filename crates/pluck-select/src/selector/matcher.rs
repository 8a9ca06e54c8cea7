use pluck_dom::{DomTree, ElementData, NodeId};

use super::{Operator, PLAINTEXT, SelectorStep, TagFilter};

/// Test one step against one node.
///
/// Non-element nodes never match. The tag is checked first, then attribute
/// presence (or absence for `[!key]`), then the value comparison. A failed
/// comparison on the `class` attribute is retried against each class token,
/// so `.bar` and `[class^=ba]` both match `class="foo bar"`.
#[must_use]
pub fn step_matches(step: &SelectorStep, tree: &DomTree, id: NodeId) -> bool {
    let Some(element) = tree.as_element(id) else {
        return false;
    };

    if let TagFilter::Name(name) = &step.tag
        && !element.tag_name.eq_ignore_ascii_case(name)
    {
        return false;
    }

    let Some(key) = step.attribute.as_deref() else {
        return true;
    };

    if step.negated {
        return !element.attrs.contains(key);
    }
    if key != PLAINTEXT && !element.attrs.contains(key) {
        return false;
    }
    if !step.compares_value() {
        return true;
    }

    let candidate = candidate_value(tree, id, element, key);
    if compare(step, &candidate) {
        return true;
    }

    key == "class"
        && element
            .classes()
            .into_iter()
            .any(|class_token| compare(step, class_token))
}

/// The string a value comparison runs against.
fn candidate_value(tree: &DomTree, id: NodeId, element: &ElementData, key: &str) -> String {
    if key == PLAINTEXT {
        tree.text_content(id)
    } else {
        element.attrs.get(key).unwrap_or_default().to_string()
    }
}

fn compare(step: &SelectorStep, candidate: &str) -> bool {
    let candidate = candidate.to_lowercase();
    let expected = || step.value.as_deref().unwrap_or_default().to_lowercase();
    match step.operator {
        Operator::Equals => candidate == expected(),
        Operator::NotEquals => candidate != expected(),
        Operator::StartsWith => candidate.starts_with(&expected()),
        Operator::EndsWith => candidate.ends_with(&expected()),
        Operator::ContainsPattern => step
            .pattern
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(&candidate)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pluck_dom::NodeType;

    fn element(tree: &mut DomTree, tag: &str, attrs: &[(&str, &str)]) -> NodeId {
        let mut data = ElementData::new(tag);
        for (name, value) in attrs {
            data.attrs.insert(*name, *value);
        }
        let id = tree.alloc(NodeType::Element(data));
        tree.append_child(NodeId::ROOT, id);
        id
    }

    fn step(attribute: &str, value: &str, operator: Operator) -> SelectorStep {
        SelectorStep::with_attribute(
            TagFilter::Any,
            attribute,
            false,
            Some(value.to_string()),
            operator,
        )
        .unwrap()
    }

    #[test]
    fn test_class_token_retry_uses_same_operator() {
        let mut tree = DomTree::new();
        let id = element(&mut tree, "p", &[("class", "alpha beta")]);

        assert!(step_matches(&step("class", "beta", Operator::Equals), &tree, id));
        assert!(step_matches(&step("class", "bet", Operator::StartsWith), &tree, id));
        assert!(step_matches(&step("class", "lph", Operator::ContainsPattern), &tree, id));
        assert!(!step_matches(&step("class", "gamma", Operator::Equals), &tree, id));
    }

    #[test]
    fn test_class_retry_does_not_apply_to_other_attributes() {
        let mut tree = DomTree::new();
        let id = element(&mut tree, "p", &[("rel", "alpha beta")]);

        assert!(!step_matches(&step("rel", "beta", Operator::Equals), &tree, id));
        assert!(step_matches(&step("rel", "alpha beta", Operator::Equals), &tree, id));
    }

    #[test]
    fn test_comparison_ignores_case_on_both_sides() {
        let mut tree = DomTree::new();
        let id = element(&mut tree, "A", &[("HREF", "HTTPS://Example.com/")]);

        assert!(step_matches(&step("href", "https://", Operator::StartsWith), &tree, id));
        assert!(step_matches(&step("href", "EXAMPLE.COM/", Operator::EndsWith), &tree, id));
        assert!(step_matches(&SelectorStep::for_tag("a"), &tree, id));
    }

    #[test]
    fn test_text_nodes_never_match() {
        let mut tree = DomTree::new();
        let text = tree.alloc(NodeType::Text("p".to_string()));
        tree.append_child(NodeId::ROOT, text);

        assert!(!step_matches(&SelectorStep::for_tag("p"), &tree, text));
        assert!(!step_matches(&step(PLAINTEXT, "p", Operator::Equals), &tree, text));
    }

    #[test]
    fn test_not_equals_on_class_checks_whole_string_first() {
        let mut tree = DomTree::new();
        let both = element(&mut tree, "p", &[("class", "foo bar")]);
        let only = element(&mut tree, "p", &[("class", "foo")]);
        let not_foo = step("class", "foo", Operator::NotEquals);

        assert!(step_matches(&not_foo, &tree, both));
        assert!(!step_matches(&not_foo, &tree, only));
    }

    #[test]
    fn test_not_equals_excludes_equal_value() {
        let mut tree = DomTree::new();
        let x = element(&mut tree, "a", &[("rel", "X")]);
        let y = element(&mut tree, "a", &[("rel", "y")]);
        let bare = element(&mut tree, "a", &[]);
        let not_x = step("rel", "x", Operator::NotEquals);

        assert!(!step_matches(&not_x, &tree, x));
        assert!(step_matches(&not_x, &tree, y));
        // The attribute still has to be there.
        assert!(!step_matches(&not_x, &tree, bare));
    }

    #[test]
    fn test_plaintext_presence_and_absence_always_hold() {
        let mut tree = DomTree::new();
        let empty = element(&mut tree, "p", &[]);
        let full = element(&mut tree, "p", &[("title", "t")]);
        let text = tree.alloc(NodeType::Text("words".to_string()));
        tree.append_child(full, text);

        let present = SelectorStep::with_attribute(
            TagFilter::Name("p".to_string()),
            PLAINTEXT,
            false,
            None,
            Operator::Equals,
        )
        .unwrap();
        let absent = SelectorStep::with_attribute(
            TagFilter::Name("p".to_string()),
            PLAINTEXT,
            true,
            None,
            Operator::Equals,
        )
        .unwrap();

        for id in [empty, full] {
            assert!(step_matches(&present, &tree, id));
            // No element carries a real `plaintext` attribute.
            assert!(step_matches(&absent, &tree, id));
        }
    }
}
