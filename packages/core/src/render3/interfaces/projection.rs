//! Selector bytecode.
//!
//! A selector is a flat list of tokens. The first token is always the tag
//! name (`""` when absent); every following value token is interpreted
//! according to the last flag token seen. Attribute tokens come in
//! name/value pairs, class tokens are single names.
//!
//! `div.foo[attr]:not(.bar)` compiles to
//! `["div", "attr", "", CLASS, "foo", NOT|CLASS, "bar"]`.

use crate::core::SelectorFlags;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SelectorToken {
    Flags(SelectorFlags),
    Value(String),
}

impl SelectorToken {
    pub fn as_value(&self) -> Option<&str> {
        match self {
            SelectorToken::Value(value) => Some(value),
            SelectorToken::Flags(_) => None,
        }
    }
}

impl From<&str> for SelectorToken {
    fn from(value: &str) -> Self {
        SelectorToken::Value(value.to_string())
    }
}

impl From<String> for SelectorToken {
    fn from(value: String) -> Self {
        SelectorToken::Value(value)
    }
}

impl From<SelectorFlags> for SelectorToken {
    fn from(flags: SelectorFlags) -> Self {
        SelectorToken::Flags(flags)
    }
}

pub type CssSelector = Vec<SelectorToken>;

/// Comma-separated alternatives; a node matches if any of them matches.
pub type CssSelectorList = Vec<CssSelector>;

/// Builds a [`CssSelector`] from a mix of strings and flags.
///
/// ```
/// use angular_core::core::SelectorFlags;
/// use angular_core::css_selector;
///
/// let sel = css_selector!["div", SelectorFlags::CLASS, "foo"];
/// assert_eq!(sel.len(), 3);
/// ```
#[macro_export]
macro_rules! css_selector {
    ($($token:expr),* $(,)?) => {
        vec![$($crate::render3::interfaces::projection::SelectorToken::from($token)),*]
    };
}
