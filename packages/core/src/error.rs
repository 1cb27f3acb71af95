//! Runtime errors.
//!
//! Invariant violations in compiled output are dev-mode assertions (see
//! `render3::assert`), not variants here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RenderError {
    /// Nameless components are not supported yet.
    #[error("for now name is required: component `{0}` has no host tag")]
    MissingHostName(String),

    #[error("Host node with selector not found: {0}")]
    HostNotFound(String),

    #[error("directive `{0}` is not a component")]
    NotAComponent(String),

    #[error("template context for `{0}` has an unexpected type")]
    ContextMismatch(String),

    /// The handle outlived `destroy_component`.
    #[error("component has already been destroyed")]
    Destroyed,

    #[error(transparent)]
    Selector(#[from] SelectorParseError),

    /// Failure raised by user code (lifecycle hook, template body).
    #[error(transparent)]
    Hook(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectorParseError {
    #[error("Nesting :not in a selector is not allowed")]
    NestedNot,

    #[error("Multiple selectors in :not are not supported")]
    MultipleInNot,

    #[error(
        "Error in attribute selector \"{0}\". Unescaped \"$\" is not supported. Please escape with \"\\$\"."
    )]
    UnescapedDollar(String),
}

pub type Result<T, E = RenderError> = std::result::Result<T, E>;
