//! Matches selector bytecode against static node data.
//!
//! Used for directive matching (`is_projection_mode == false`) and for
//! distributing content into projection slots (`is_projection_mode == true`).

use crate::core::{AttributeMarker, SelectorFlags};
use crate::render3::assert::assert_equal;
use crate::render3::interfaces::node::{TAttribute, TAttributes, TNode, TNodeKind};
use crate::render3::interfaces::projection::{CssSelector, CssSelectorList, SelectorToken};

const NG_TEMPLATE_SELECTOR: &str = "ng-template";

/// Finds `class_to_search` as a whole whitespace-separated token of
/// `class_name`, starting at byte `starting_index`.
pub fn class_index_of(class_name: &str, class_to_search: &str, mut starting_index: usize) -> Option<usize> {
    let bytes = class_name.as_bytes();
    let end = class_name.len();
    loop {
        let found = starting_index + class_name.get(starting_index..)?.find(class_to_search)?;
        if found == 0 || bytes[found - 1] <= b' ' {
            let after = found + class_to_search.len();
            if after == end || bytes[after] <= b' ' {
                return Some(found);
            }
        }
        starting_index = found + 1;
    }
}

/// Inline templates (`<div *ngIf>`) are containers that keep the tag of the
/// element they were written on.
pub fn is_inline_template(tnode: &TNode) -> bool {
    tnode.kind == TNodeKind::Container && tnode.tag_name.as_deref() != Some(NG_TEMPLATE_SELECTOR)
        && tnode.tag_name.is_some()
}

fn is_css_class_matching(
    tnode: &TNode,
    attrs: &TAttributes,
    css_class_to_match: &str,
    is_projection_mode: bool,
) -> bool {
    assert_equal(
        css_class_to_match,
        css_class_to_match.to_lowercase().as_str(),
        "Class name expected to be lowercase.",
    );
    let mut i = 0;
    if is_projection_mode {
        // A literal `class` attribute can only appear among the leading pairs.
        while i + 1 < attrs.len() {
            let (Some(name), Some(value)) = (attrs[i].as_value(), attrs[i + 1].as_value()) else {
                break;
            };
            if name == "class" && class_index_of(&value.to_lowercase(), css_class_to_match, 0).is_some() {
                return true;
            }
            i += 2;
        }
    } else if is_inline_template(tnode) {
        // Class bindings do not apply to the template created by `*` syntax.
        return false;
    }

    let classes_start = attrs[i..]
        .iter()
        .position(|attr| attr.as_marker() == Some(AttributeMarker::Classes));
    if let Some(offset) = classes_start {
        for attr in &attrs[i + offset + 1..] {
            match attr.as_value() {
                Some(class) if class.to_lowercase() == css_class_to_match => return true,
                Some(_) => {}
                None => break,
            }
        }
    }
    false
}

fn has_tag_and_type_match(tnode: &TNode, current_selector: &str, is_projection_mode: bool) -> bool {
    let tag_name_to_compare = if tnode.kind == TNodeKind::Container && !is_projection_mode {
        Some(NG_TEMPLATE_SELECTOR)
    } else {
        tnode.tag_name.as_deref()
    };
    tag_name_to_compare == Some(current_selector)
}

/// Index of the first name-only region, or `attrs.len()`.
fn get_name_only_marker_index(attrs: &TAttributes) -> usize {
    attrs
        .iter()
        .position(|attr| attr.as_marker().is_some_and(AttributeMarker::is_name_only))
        .unwrap_or(attrs.len())
}

/// Finds the index of the attribute named `name`.
///
/// Namespaced attributes are never matched. Which regions are searched
/// depends on the node and the mode:
///
/// ```text
/// Modes                   | Normal | Bindings | Template | I18n
/// ------------------------+--------+----------+----------+-----
/// Inline + Projection     | YES    | YES      | NO       | YES
/// Inline + Directive      | NO     | NO       | YES      | NO
/// Non-inline + Projection | YES    | YES      | NO       | YES
/// Non-inline + Directive  | YES    | YES      | NO       | YES
/// ```
fn find_attr_index_in_node(
    name: &str,
    attrs: Option<&TAttributes>,
    is_inline_template: bool,
    is_projection_mode: bool,
) -> Option<usize> {
    let attrs = attrs?;
    if !is_projection_mode && is_inline_template {
        return match_template_attribute(attrs, name);
    }

    let mut i = 0;
    let mut bindings_mode = false;
    while i < attrs.len() {
        match &attrs[i] {
            TAttribute::Value(attr_name) if attr_name == name => return Some(i),
            TAttribute::Marker(AttributeMarker::Bindings | AttributeMarker::I18n) => {
                bindings_mode = true;
            }
            TAttribute::Marker(AttributeMarker::Classes | AttributeMarker::Styles) => {
                // Classes are matched separately; styles never are.
                i += 1;
                while i < attrs.len() && attrs[i].as_value().is_some() {
                    i += 1;
                }
                continue;
            }
            TAttribute::Marker(AttributeMarker::Template) => break,
            TAttribute::Marker(AttributeMarker::NamespaceURI) => {
                // marker, namespace URI, name, value
                i += 4;
                continue;
            }
            _ => {}
        }
        i += if bindings_mode { 1 } else { 2 };
    }
    None
}

fn match_template_attribute(attrs: &TAttributes, name: &str) -> Option<usize> {
    let start = attrs
        .iter()
        .position(|attr| attr.as_marker() == Some(AttributeMarker::Template))?;
    for (offset, attr) in attrs[start + 1..].iter().enumerate() {
        match attr {
            TAttribute::Value(attr_name) if attr_name == name => return Some(start + 1 + offset),
            TAttribute::Value(_) => {}
            _ => return None,
        }
    }
    None
}

/// Whether `tnode` satisfies one compound selector.
pub fn is_node_matching_selector(tnode: &TNode, selector: &CssSelector, is_projection_mode: bool) -> bool {
    let mut mode = SelectorFlags::ELEMENT;
    let empty = TAttributes::new();
    let node_attrs = tnode.attrs.as_ref().unwrap_or(&empty);
    let name_only_marker_idx = get_name_only_marker_index(node_attrs);
    let inline_template = is_inline_template(tnode);

    // A not() chunk that never failed rejects the node once the next
    // negative chunk (or the end of the selector) is reached.
    let mut skip_to_next_selector = false;

    let mut i = 0;
    while i < selector.len() {
        let current = match &selector[i] {
            SelectorToken::Flags(flags) => {
                let flags = *flags;
                if !skip_to_next_selector && !mode.is_positive() && !flags.is_positive() {
                    return false;
                }
                // Positive flags inside a skipped not() belong to that not().
                if skip_to_next_selector && flags.is_positive() {
                    i += 1;
                    continue;
                }
                skip_to_next_selector = false;
                mode = flags | (mode & SelectorFlags::NOT);
                i += 1;
                continue;
            }
            SelectorToken::Value(value) => value.as_str(),
        };

        if skip_to_next_selector {
            i += 1;
            continue;
        }

        if mode.contains(SelectorFlags::ELEMENT) {
            mode = SelectorFlags::ATTRIBUTE | (mode & SelectorFlags::NOT);
            if (!current.is_empty() && !has_tag_and_type_match(tnode, current, is_projection_mode))
                || (current.is_empty() && selector.len() == 1)
            {
                if mode.is_positive() {
                    return false;
                }
                skip_to_next_selector = true;
            }
        } else if mode.contains(SelectorFlags::CLASS) {
            if !is_css_class_matching(tnode, node_attrs, current, is_projection_mode) {
                if mode.is_positive() {
                    return false;
                }
                skip_to_next_selector = true;
            }
        } else {
            i += 1;
            let selector_attr_value = selector.get(i).and_then(SelectorToken::as_value).unwrap_or("");
            let attr_index =
                find_attr_index_in_node(current, tnode.attrs.as_ref(), inline_template, is_projection_mode);

            match attr_index {
                None => {
                    if mode.is_positive() {
                        return false;
                    }
                    skip_to_next_selector = true;
                }
                Some(index) if !selector_attr_value.is_empty() => {
                    let node_attr_value = if index > name_only_marker_idx {
                        String::new()
                    } else {
                        node_attrs
                            .get(index + 1)
                            .and_then(TAttribute::as_value)
                            .map(str::to_lowercase)
                            .unwrap_or_default()
                    };
                    if selector_attr_value != node_attr_value {
                        if mode.is_positive() {
                            return false;
                        }
                        skip_to_next_selector = true;
                    }
                }
                Some(_) => {}
            }
        }
        i += 1;
    }

    mode.is_positive() || skip_to_next_selector
}

/// Whether `tnode` satisfies any selector of the list.
pub fn is_node_matching_selector_list(
    tnode: &TNode,
    selectors: &CssSelectorList,
    is_projection_mode: bool,
) -> bool {
    selectors
        .iter()
        .any(|selector| is_node_matching_selector(tnode, selector, is_projection_mode))
}

/// The parsed `ngProjectAs` selector of a node, if any.
pub fn get_project_as_attr_value(tnode: &TNode) -> Option<&CssSelector> {
    let attrs = tnode.attrs.as_ref()?;
    let index = attrs
        .iter()
        .position(|attr| attr.as_marker() == Some(AttributeMarker::ProjectAs))?;
    match attrs.get(index + 1) {
        Some(TAttribute::Selector(selector)) => Some(selector),
        _ => None,
    }
}

pub fn is_selector_in_selector_list(selector: &CssSelector, list: &CssSelectorList) -> bool {
    list.iter().any(|candidate| candidate == selector)
}

fn maybe_wrap_in_not_selector(is_negative_mode: bool, chunk: &str) -> String {
    if is_negative_mode {
        format!(":not({})", chunk.trim())
    } else {
        chunk.to_string()
    }
}

/// Renders one selector back to CSS text.
pub fn stringify_css_selector(selector: &CssSelector) -> String {
    let mut result = selector
        .first()
        .and_then(SelectorToken::as_value)
        .unwrap_or("")
        .to_string();
    let mut mode = SelectorFlags::ATTRIBUTE;
    let mut current_chunk = String::new();
    let mut is_negative_mode = false;

    let mut i = 1;
    while i < selector.len() {
        match &selector[i] {
            SelectorToken::Value(value) => {
                if mode.contains(SelectorFlags::ATTRIBUTE) {
                    i += 1;
                    let attr_value = selector.get(i).and_then(SelectorToken::as_value).unwrap_or("");
                    current_chunk.push('[');
                    current_chunk.push_str(value);
                    if !attr_value.is_empty() {
                        current_chunk.push_str(&format!("=\"{}\"", attr_value));
                    }
                    current_chunk.push(']');
                } else if mode.contains(SelectorFlags::CLASS) {
                    current_chunk.push('.');
                    current_chunk.push_str(value);
                } else if mode.contains(SelectorFlags::ELEMENT) {
                    current_chunk.push(' ');
                    current_chunk.push_str(value);
                }
            }
            SelectorToken::Flags(flags) => {
                // Everything between two negative markers is one :not() chunk,
                // so `:not(p.foo)` stays together.
                if !current_chunk.is_empty() && !flags.is_positive() {
                    result.push_str(&maybe_wrap_in_not_selector(is_negative_mode, &current_chunk));
                    current_chunk.clear();
                }
                mode = *flags;
                is_negative_mode = is_negative_mode || !mode.is_positive();
            }
        }
        i += 1;
    }

    if !current_chunk.is_empty() {
        result.push_str(&maybe_wrap_in_not_selector(is_negative_mode, &current_chunk));
    }
    result
}

pub fn stringify_css_selector_list(selectors: &CssSelectorList) -> String {
    selectors
        .iter()
        .map(stringify_css_selector)
        .collect::<Vec<_>>()
        .join(",")
}

/// Static attributes for a host element created from a component's own
/// selector. Only the positive part of the selector contributes.
pub fn extract_attrs_and_classes_from_selector(selector: &CssSelector) -> TAttributes {
    let mut attrs = TAttributes::new();
    let mut classes = Vec::new();
    let mut mode = SelectorFlags::ATTRIBUTE;

    let mut i = 1;
    while i < selector.len() {
        match &selector[i] {
            SelectorToken::Value(value) => {
                if mode == SelectorFlags::ATTRIBUTE {
                    i += 1;
                    if !value.is_empty() {
                        let attr_value = selector.get(i).and_then(SelectorToken::as_value).unwrap_or("");
                        attrs.push(TAttribute::from(value.as_str()));
                        attrs.push(TAttribute::from(attr_value));
                    }
                } else if mode == SelectorFlags::CLASS {
                    classes.push(TAttribute::from(value.as_str()));
                }
            }
            SelectorToken::Flags(flags) => {
                if !mode.is_positive() {
                    break;
                }
                mode = *flags;
            }
        }
        i += 1;
    }

    if !classes.is_empty() {
        attrs.push(TAttribute::Marker(AttributeMarker::Classes));
        attrs.extend(classes);
    }
    attrs
}
