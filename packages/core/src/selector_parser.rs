use once_cell::sync::Lazy;
/**
 * Selector Parser - CSS selector strings to selector bytecode
 *
 * Parses the selector strings found on directive definitions and in
 * `ngProjectAs` attributes into the token form the runtime matcher walks.
 */
use regex::Regex;

use crate::core::SelectorFlags;
use crate::error::SelectorParseError;
use crate::render3::interfaces::projection::{CssSelector, CssSelectorList, SelectorToken};

/// Regex for parsing CSS selectors
static SELECTOR_REGEXP: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(\:not\()|(([\.\#]?)[-\w]+)|(?:\[([-.\w*\\$]+)(?:=(?:"([^"]*)"|'([^']*)'|([^\]]*)))?\])|(\))|(\s*,\s*)"#)
        .expect("selector regex is valid")
});

/// Match groups in the selector regex
#[derive(Debug, Clone, Copy)]
enum SelectorRegexp {
    Not = 1,
    Tag = 2,
    Prefix = 3,
    Attribute = 4,
    AttributeValueDouble = 5,
    AttributeValueSingle = 6,
    AttributeValueUnquoted = 7,
    NotEnd = 8,
    Separator = 9,
}

/// One compound selector as written, before lowering to bytecode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedSelector {
    pub element: Option<String>,
    pub class_names: Vec<String>,
    /// Attributes stored in pairs: [name, value, name, value, ...]
    pub attrs: Vec<String>,
    pub not_selectors: Vec<ParsedSelector>,
}

impl ParsedSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse CSS selector string into one entry per comma-separated alternative
    pub fn parse(selector: &str) -> Result<Vec<ParsedSelector>, SelectorParseError> {
        let mut results = Vec::new();
        let mut current = ParsedSelector::new();
        let mut in_not = false;

        for cap in SELECTOR_REGEXP.captures_iter(selector) {
            if cap.get(SelectorRegexp::Not as usize).is_some() {
                if in_not {
                    return Err(SelectorParseError::NestedNot);
                }
                in_not = true;
                current.not_selectors.push(ParsedSelector::new());
            }

            if let Some(tag_match) = cap.get(SelectorRegexp::Tag as usize) {
                let tag = tag_match.as_str();
                let prefix = cap
                    .get(SelectorRegexp::Prefix as usize)
                    .map(|m| m.as_str())
                    .unwrap_or("");
                let target = current.target(in_not);
                match prefix {
                    "#" => target.add_attribute("id", &tag[1..]),
                    "." => target.add_class_name(&tag[1..]),
                    _ => target.element = Some(tag.to_string()),
                }
            }

            if let Some(attr_match) = cap.get(SelectorRegexp::Attribute as usize) {
                let value = [
                    SelectorRegexp::AttributeValueDouble,
                    SelectorRegexp::AttributeValueSingle,
                    SelectorRegexp::AttributeValueUnquoted,
                ]
                .iter()
                .find_map(|group| cap.get(*group as usize))
                .map(|m| m.as_str())
                .unwrap_or("");
                let name = unescape_attribute(attr_match.as_str())?;
                current.target(in_not).add_attribute(&name, value);
            }

            if cap.get(SelectorRegexp::NotEnd as usize).is_some() {
                in_not = false;
            }

            if cap.get(SelectorRegexp::Separator as usize).is_some() {
                if in_not {
                    return Err(SelectorParseError::MultipleInNot);
                }
                add_result(&mut results, std::mem::take(&mut current));
            }
        }

        add_result(&mut results, current);
        Ok(results)
    }

    fn target(&mut self, in_not: bool) -> &mut ParsedSelector {
        if in_not && !self.not_selectors.is_empty() {
            let last = self.not_selectors.len() - 1;
            return &mut self.not_selectors[last];
        }
        self
    }

    pub fn add_attribute(&mut self, name: &str, value: &str) {
        self.attrs.push(name.to_string());
        self.attrs.push(value.to_lowercase());
    }

    pub fn add_class_name(&mut self, name: &str) {
        self.class_names.push(name.to_lowercase());
    }

    /// Lowers to bytecode: the positive compound first, then one negative
    /// chunk per `:not()`.
    pub fn to_r3_selector(&self) -> CssSelector {
        let mut tokens = self.to_simple_selector();
        for not_selector in &self.not_selectors {
            tokens.extend(not_selector.to_negative_selector());
        }
        tokens
    }

    fn to_simple_selector(&self) -> CssSelector {
        let element = match self.element.as_deref() {
            Some("*") | None => "",
            Some(element) => element,
        };
        let mut tokens = vec![SelectorToken::from(element)];
        tokens.extend(self.attrs.iter().map(|a| SelectorToken::from(a.as_str())));
        tokens.extend(self.class_tokens());
        tokens
    }

    fn to_negative_selector(&self) -> CssSelector {
        let mut tokens = Vec::new();
        if let Some(element) = &self.element {
            tokens.push(SelectorToken::Flags(SelectorFlags::NOT | SelectorFlags::ELEMENT));
            tokens.push(SelectorToken::from(element.as_str()));
            tokens.extend(self.attrs.iter().map(|a| SelectorToken::from(a.as_str())));
            tokens.extend(self.class_tokens());
        } else if !self.attrs.is_empty() {
            tokens.push(SelectorToken::Flags(SelectorFlags::NOT | SelectorFlags::ATTRIBUTE));
            tokens.extend(self.attrs.iter().map(|a| SelectorToken::from(a.as_str())));
            tokens.extend(self.class_tokens());
        } else if !self.class_names.is_empty() {
            tokens.push(SelectorToken::Flags(SelectorFlags::NOT | SelectorFlags::CLASS));
            tokens.extend(self.class_names.iter().map(|c| SelectorToken::from(c.as_str())));
        }
        tokens
    }

    fn class_tokens(&self) -> Vec<SelectorToken> {
        if self.class_names.is_empty() {
            return Vec::new();
        }
        let mut tokens = vec![SelectorToken::Flags(SelectorFlags::CLASS)];
        tokens.extend(self.class_names.iter().map(|c| SelectorToken::from(c.as_str())));
        tokens
    }
}

fn add_result(results: &mut Vec<ParsedSelector>, mut selector: ParsedSelector) {
    if !selector.not_selectors.is_empty()
        && selector.element.is_none()
        && selector.class_names.is_empty()
        && selector.attrs.is_empty()
    {
        selector.element = Some("*".to_string());
    }
    results.push(selector);
}

/// Unescape \$ sequences from CSS attribute selector
fn unescape_attribute(attr: &str) -> Result<String, SelectorParseError> {
    let mut result = String::new();
    let mut escaping = false;

    for ch in attr.chars() {
        if ch == '\\' {
            escaping = true;
            continue;
        }
        if ch == '$' && !escaping {
            return Err(SelectorParseError::UnescapedDollar(attr.to_string()));
        }
        escaping = false;
        result.push(ch);
    }

    Ok(result)
}

/// Parses a selector string straight to the runtime selector list.
pub fn parse_selector_to_r3_selector(
    selector: &str,
) -> Result<CssSelectorList, SelectorParseError> {
    if selector.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(ParsedSelector::parse(selector)?
        .iter()
        .map(ParsedSelector::to_r3_selector)
        .collect())
}
