//! Node Selector Matcher Tests
//!
//! Selector bytecode matched against static node data, in directive and
//! projection mode.

use angular_core::attrs;
use angular_core::core::{AttributeMarker, SelectorFlags};
use angular_core::css_selector;
use angular_core::render3::interfaces::node::{TAttributes, TNode, TNodeKind};
use angular_core::render3::node_selector_matcher::{
    extract_attrs_and_classes_from_selector, get_project_as_attr_value, is_node_matching_selector,
    is_node_matching_selector_list, is_selector_in_selector_list, stringify_css_selector,
    stringify_css_selector_list,
};
use angular_core::render3::CssSelector;

fn test_node(tag: &str, attrs: TAttributes) -> TNode {
    TNode::new(TNodeKind::Element, Some(tag), Some(attrs))
}

fn is_matching(tag: &str, attrs: TAttributes, selector: CssSelector) -> bool {
    is_node_matching_selector(&test_node(tag, attrs), &selector, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod is_node_matching_selector {
        use super::*;

        #[test]
        fn should_match_element_name_only_if_names_are_the_same() {
            assert!(is_matching("span", attrs![], css_selector!["span"]));
            assert!(!is_matching("span", attrs![], css_selector!["div"]));
        }

        #[test]
        fn should_not_match_when_only_an_empty_tag_is_given() {
            assert!(!is_matching("span", attrs![], css_selector![""]));
        }

        #[test]
        fn should_match_attribute_names_only() {
            assert!(is_matching("span", attrs!["title", ""], css_selector!["", "title", ""]));
            assert!(is_matching("span", attrs!["title", "my title"], css_selector!["", "title", ""]));
            assert!(!is_matching("span", attrs!["name", "name"], css_selector!["", "title", ""]));
        }

        #[test]
        fn should_match_attribute_values_case_insensitively() {
            assert!(is_matching(
                "span",
                attrs!["title", "My Title"],
                css_selector!["", "title", "my title"]
            ));
            assert!(!is_matching(
                "span",
                attrs!["title", "other"],
                css_selector!["", "title", "my title"]
            ));
        }

        #[test]
        fn should_match_all_attributes_of_the_selector() {
            let node_attrs = || attrs!["attr1", "val1", "attr2", ""];
            assert!(is_matching("span", node_attrs(), css_selector!["", "attr1", "val1", "attr2", ""]));
            assert!(!is_matching("span", node_attrs(), css_selector!["", "attr1", "val1", "attr3", ""]));
        }

        #[test]
        fn should_match_classes_from_the_classes_region() {
            let node_attrs = || attrs![AttributeMarker::Classes, "foo", "bar"];
            assert!(is_matching("span", node_attrs(), css_selector!["", SelectorFlags::CLASS, "foo"]));
            assert!(is_matching(
                "span",
                node_attrs(),
                css_selector!["", SelectorFlags::CLASS, "bar", "foo"]
            ));
            assert!(!is_matching("span", node_attrs(), css_selector!["", SelectorFlags::CLASS, "baz"]));
        }

        #[test]
        fn should_match_a_compound_selector() {
            // div.foo.bar[attr1=val1][attr2]
            let selector = css_selector![
                "div",
                "attr1",
                "val1",
                "attr2",
                "",
                SelectorFlags::CLASS,
                "foo",
                "bar"
            ];
            let node_attrs = || attrs!["attr1", "val1", "attr2", "", AttributeMarker::Classes, "foo", "bar"];
            assert!(is_matching("div", node_attrs(), selector.clone()));
            assert!(!is_matching("span", node_attrs(), selector.clone()));
            assert!(!is_matching(
                "div",
                attrs!["attr1", "val1", AttributeMarker::Classes, "foo", "bar"],
                selector
            ));
        }

        #[test]
        fn should_never_match_namespaced_attributes() {
            let node_attrs = attrs![
                AttributeMarker::NamespaceURI,
                "http://www.example.com/2014/test",
                "title",
                "abc"
            ];
            assert!(!is_matching("span", node_attrs, css_selector!["", "title", ""]));
        }

        #[test]
        fn should_match_names_from_the_bindings_region() {
            let node_attrs = || attrs!["id", "x", AttributeMarker::Bindings, "title", "name"];
            assert!(is_matching("span", node_attrs(), css_selector!["", "title", ""]));
            assert!(is_matching("span", node_attrs(), css_selector!["", "name", ""]));
            // Bound attributes have no static value to compare.
            assert!(!is_matching("span", node_attrs(), css_selector!["", "title", "a"]));
        }
    }

    mod negation {
        use super::*;

        #[test]
        fn should_match_when_the_not_part_does_not() {
            let selector = css_selector!["", SelectorFlags::NOT | SelectorFlags::CLASS, "foo"];
            assert!(is_matching("span", attrs![], selector.clone()));
            assert!(!is_matching("span", attrs![AttributeMarker::Classes, "foo"], selector));
        }

        #[test]
        fn should_treat_a_compound_not_as_a_whole() {
            // div[attr1]:not(.foo[attr2])
            let selector = css_selector![
                "div",
                "attr1",
                "",
                SelectorFlags::NOT | SelectorFlags::CLASS,
                "foo",
                SelectorFlags::ATTRIBUTE,
                "attr2",
                ""
            ];
            assert!(is_matching(
                "div",
                attrs!["attr1", "", AttributeMarker::Classes, "foo"],
                selector.clone()
            ));
            assert!(is_matching("div", attrs!["attr1", "", "attr2", ""], selector.clone()));
            assert!(!is_matching(
                "div",
                attrs!["attr1", "", "attr2", "", AttributeMarker::Classes, "foo"],
                selector.clone()
            ));
            assert!(!is_matching("div", attrs!["attr2", ""], selector));
        }

        #[test]
        fn should_reject_when_any_of_several_nots_matches() {
            // :not(.a):not(.b)
            let selector = css_selector![
                "",
                SelectorFlags::NOT | SelectorFlags::CLASS,
                "a",
                SelectorFlags::NOT | SelectorFlags::CLASS,
                "b"
            ];
            assert!(is_matching("span", attrs![AttributeMarker::Classes, "c"], selector.clone()));
            assert!(!is_matching("span", attrs![AttributeMarker::Classes, "a"], selector.clone()));
            assert!(!is_matching("span", attrs![AttributeMarker::Classes, "b"], selector));
        }
    }

    mod inline_templates {
        use super::*;

        fn inline_template(attrs: TAttributes) -> TNode {
            TNode::new(TNodeKind::Container, Some("div"), Some(attrs))
        }

        #[test]
        fn should_match_only_template_attributes_for_directives() {
            let tnode = inline_template(attrs!["id", "x", AttributeMarker::Template, "ngFor", "ngForOf"]);
            assert!(is_node_matching_selector(&tnode, &css_selector!["", "ngForOf", ""], false));
            assert!(!is_node_matching_selector(&tnode, &css_selector!["", "id", ""], false));
        }

        #[test]
        fn should_match_element_attributes_in_projection_mode() {
            let tnode = inline_template(attrs!["id", "x", AttributeMarker::Template, "ngFor"]);
            assert!(is_node_matching_selector(&tnode, &css_selector!["", "id", ""], true));
            assert!(!is_node_matching_selector(&tnode, &css_selector!["", "ngFor", ""], true));
        }

        #[test]
        fn should_compare_tag_only_in_projection_mode() {
            let tnode = inline_template(attrs![AttributeMarker::Template, "ngIf"]);
            assert!(is_node_matching_selector(&tnode, &css_selector!["div"], true));
            assert!(!is_node_matching_selector(&tnode, &css_selector!["div"], false));
            assert!(is_node_matching_selector(&tnode, &css_selector!["ng-template"], false));
        }

        #[test]
        fn should_ignore_classes_of_inline_templates_for_directives() {
            let tnode = inline_template(attrs![AttributeMarker::Classes, "foo"]);
            let selector = css_selector!["", SelectorFlags::CLASS, "foo"];
            assert!(!is_node_matching_selector(&tnode, &selector, false));
            assert!(is_node_matching_selector(&tnode, &selector, true));
        }
    }

    mod projection_mode {
        use super::*;

        #[test]
        fn should_match_literal_class_attribute_only_when_projecting() {
            let tnode = test_node("span", attrs!["class", "Foo bar"]);
            let selector = css_selector!["", SelectorFlags::CLASS, "foo"];
            assert!(is_node_matching_selector(&tnode, &selector, true));
            assert!(!is_node_matching_selector(&tnode, &selector, false));
        }

        #[test]
        fn should_match_any_selector_of_a_list() {
            let tnode = test_node("span", attrs![]);
            let list = vec![css_selector!["div"], css_selector!["span"]];
            assert!(is_node_matching_selector_list(&tnode, &list, true));
            assert!(!is_node_matching_selector_list(&tnode, &vec![css_selector!["div"]], true));
        }
    }

    mod project_as {
        use super::*;

        #[test]
        fn should_read_the_parsed_project_as_selector() {
            let tnode = test_node(
                "div",
                attrs!["id", "x", AttributeMarker::ProjectAs, css_selector!["", "title", ""]],
            );
            assert_eq!(get_project_as_attr_value(&tnode), Some(&css_selector!["", "title", ""]));
            assert_eq!(get_project_as_attr_value(&test_node("div", attrs!["id", "x"])), None);
        }

        #[test]
        fn should_compare_selectors_structurally() {
            let list = vec![css_selector!["span"], css_selector!["", "title", ""]];
            assert!(is_selector_in_selector_list(&css_selector!["", "title", ""], &list));
            assert!(!is_selector_in_selector_list(&css_selector!["", "title", "x"], &list));
        }
    }

    mod stringify {
        use super::*;

        #[test]
        fn should_stringify_tag_attributes_and_classes() {
            let selector = css_selector!["div", "attr", "", "type", "text", SelectorFlags::CLASS, "foo"];
            assert_eq!(stringify_css_selector(&selector), "div[attr][type=\"text\"].foo");
        }

        #[test]
        fn should_wrap_negative_chunks_in_not() {
            let selector = css_selector![
                "div",
                SelectorFlags::CLASS,
                "foo",
                SelectorFlags::NOT | SelectorFlags::ELEMENT,
                "p",
                SelectorFlags::CLASS,
                "bar"
            ];
            assert_eq!(stringify_css_selector(&selector), "div.foo:not(p.bar)");
        }

        #[test]
        fn should_join_lists_with_commas() {
            let list = vec![css_selector!["a"], css_selector!["", SelectorFlags::CLASS, "b"]];
            assert_eq!(stringify_css_selector_list(&list), "a,.b");
        }
    }

    mod extract_attrs {
        use super::*;

        #[test]
        fn should_extract_attributes_and_classes() {
            let selector = css_selector!["", "id", "main", "hidden", "", SelectorFlags::CLASS, "a", "b"];
            assert_eq!(
                extract_attrs_and_classes_from_selector(&selector),
                attrs!["id", "main", "hidden", "", AttributeMarker::Classes, "a", "b"]
            );
        }

        #[test]
        fn should_ignore_negative_parts() {
            let selector = css_selector!["div", SelectorFlags::NOT | SelectorFlags::CLASS, "x"];
            assert!(extract_attrs_and_classes_from_selector(&selector).is_empty());
        }
    }
}
