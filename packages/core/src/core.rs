//! Core Types
//!
//! Flag sets and markers shared between compiled templates and the runtime.
//! The numeric values are part of the compiled-output contract.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum ViewEncapsulation {
    #[default]
    Emulated = 0,
    // Historically the 1 value was for `Native` encapsulation (removed in v11)
    None = 2,
    ShadowDom = 3,
}

bitflags! {
    /// Passed to a template function to select which blocks run.
    ///
    /// The first pass over a template typically carries both bits.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct RenderFlags: u8 {
        const CREATE = 0b01;
        const UPDATE = 0b10;
    }
}

impl RenderFlags {
    pub fn is_create(self) -> bool {
        self.contains(RenderFlags::CREATE)
    }

    pub fn is_update(self) -> bool {
        self.contains(RenderFlags::UPDATE)
    }
}

bitflags! {
    /// Mode markers embedded in selector bytecode.
    ///
    /// `NOT` is sticky: once seen it applies to every following chunk.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SelectorFlags: u8 {
        const NOT = 0b0001;
        const ATTRIBUTE = 0b0010;
        const ELEMENT = 0b0100;
        const CLASS = 0b1000;
    }
}

impl SelectorFlags {
    pub fn is_positive(self) -> bool {
        !self.contains(SelectorFlags::NOT)
    }
}

bitflags! {
    /// Which lifecycle hooks a directive type implements.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LifecycleHooks: u8 {
        const ON_INIT = 1 << 0;
        const DO_CHECK = 1 << 1;
        const AFTER_CONTENT_INIT = 1 << 2;
        const AFTER_CONTENT_CHECKED = 1 << 3;
        const AFTER_VIEW_INIT = 1 << 4;
        const AFTER_VIEW_CHECKED = 1 << 5;
        const ON_DESTROY = 1 << 6;
    }
}

/// Markers splitting a static attribute array into regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeMarker {
    /// Followed by namespace URI, name and value.
    NamespaceURI = 0,
    /// Followed by class names.
    Classes = 1,
    /// Followed by style name/value pairs.
    Styles = 2,
    /// Followed by names of bound properties (no values).
    Bindings = 3,
    /// Followed by names of attributes from an inline template (`*ngFor="..."`).
    Template = 4,
    /// Followed by a parsed `ngProjectAs` selector.
    ProjectAs = 5,
    /// Followed by names of i18n attributes (no values).
    I18n = 6,
}

impl AttributeMarker {
    /// Regions holding bare names rather than name/value pairs.
    pub fn is_name_only(self) -> bool {
        matches!(
            self,
            AttributeMarker::Bindings | AttributeMarker::Template | AttributeMarker::I18n
        )
    }
}
