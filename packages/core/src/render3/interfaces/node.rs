//! Node model.
//!
//! An [`LNode`] is a per-instance node: a common header plus a payload
//! for its kind. A [`TNode`] is the per-template static counterpart,
//! shared by every instance of the same template.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use smallvec::SmallVec;

use crate::core::AttributeMarker;
use crate::render3::arena::arena_id;
use crate::render3::interfaces::definition::DirectiveDef;
use crate::render3::interfaces::projection::CssSelector;
use crate::render3::interfaces::renderer::RNode;
use crate::render3::interfaces::view::{TView, ViewId};

arena_id!(
    /// Index of an [`LNode`] in the runtime's node arena.
    NodeId
);

arena_id!(
    /// Index of a bloom-filter injector record.
    InjectorId
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum NodeKind {
    Container = 0,
    Projection = 1,
    View = 2,
    Element = 3,
    Text = 4,
}

impl NodeKind {
    fn from_bits(bits: u32) -> NodeKind {
        match bits {
            0 => NodeKind::Container,
            1 => NodeKind::Projection,
            2 => NodeKind::View,
            3 => NodeKind::Element,
            _ => NodeKind::Text,
        }
    }
}

/// Packed node flags.
///
/// ```text
/// bits 0..3   node kind
/// bits 3..12  number of directives on the node
/// bits 12..32 data index of the first directive
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeFlags(u32);

impl NodeFlags {
    const TYPE_MASK: u32 = 0b111;
    const SIZE_SHIFT: u32 = 3;
    const SIZE_SKIP: u32 = 1 << Self::SIZE_SHIFT;
    const SIZE_MASK: u32 = 0b1_1111_1111 << Self::SIZE_SHIFT;
    const INDX_SHIFT: u32 = 12;

    pub fn new(kind: NodeKind) -> Self {
        NodeFlags(kind as u32)
    }

    pub fn kind(self) -> NodeKind {
        NodeKind::from_bits(self.0 & Self::TYPE_MASK)
    }

    pub fn directive_count(self) -> usize {
        ((self.0 & Self::SIZE_MASK) >> Self::SIZE_SHIFT) as usize
    }

    pub fn directive_start(self) -> usize {
        (self.0 >> Self::INDX_SHIFT) as usize
    }

    /// Data indices of the directives on this node.
    pub fn directive_range(self) -> std::ops::Range<usize> {
        let start = self.directive_start();
        start..start + self.directive_count()
    }

    /// Extends the directive range by one directive stored at `index`.
    /// The first directive fixes the start; later ones must be contiguous.
    pub fn with_directive(self, index: usize) -> Self {
        if self.directive_count() == 0 {
            NodeFlags(
                ((index as u32) << Self::INDX_SHIFT) | Self::SIZE_SKIP | (self.0 & Self::TYPE_MASK),
            )
        } else {
            NodeFlags(self.0 + Self::SIZE_SKIP)
        }
    }
}

impl std::fmt::Debug for NodeFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeFlags")
            .field("kind", &self.kind())
            .field("directives", &self.directive_range())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct LContainer {
    /// View nodes currently rendered, in order.
    pub views: Vec<NodeId>,
    /// Refresh cursor; reset by `container_refresh_start`.
    pub next_index: usize,
    /// Element whose native node receives the views' nodes, if any yet.
    pub render_parent: Option<NodeId>,
}

#[derive(Debug)]
pub enum NodePayload {
    Element { component_view: Option<ViewId> },
    Text,
    Container(LContainer),
    View(ViewId),
    /// Flattened list of nodes projected here.
    Projection(Vec<NodeId>),
}

impl NodePayload {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodePayload::Element { .. } => NodeKind::Element,
            NodePayload::Text => NodeKind::Text,
            NodePayload::Container(_) => NodeKind::Container,
            NodePayload::View(_) => NodeKind::View,
            NodePayload::Projection(_) => NodeKind::Projection,
        }
    }
}

#[derive(Debug)]
pub struct LNode {
    pub flags: NodeFlags,
    pub native: Option<RNode>,
    pub parent: Option<NodeId>,
    pub child: Option<NodeId>,
    pub next: Option<NodeId>,
    /// View whose template created this node.
    pub view: ViewId,
    pub tnode: Option<Rc<RefCell<TNode>>>,
    pub injector: Option<InjectorId>,
    pub payload: NodePayload,
}

impl LNode {
    pub fn kind(&self) -> NodeKind {
        self.flags.kind()
    }

    pub fn component_view(&self) -> Option<ViewId> {
        match self.payload {
            NodePayload::Element { component_view } => component_view,
            _ => None,
        }
    }

    pub fn container(&self) -> Option<&LContainer> {
        match &self.payload {
            NodePayload::Container(container) => Some(container),
            _ => None,
        }
    }

    pub fn container_mut(&mut self) -> Option<&mut LContainer> {
        match &mut self.payload {
            NodePayload::Container(container) => Some(container),
            _ => None,
        }
    }

    pub fn embedded_view(&self) -> Option<ViewId> {
        match self.payload {
            NodePayload::View(view) => Some(view),
            _ => None,
        }
    }
}

/// One entry of a static attribute array.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TAttribute {
    Marker(AttributeMarker),
    Value(String),
    /// Payload of the `ProjectAs` region.
    Selector(CssSelector),
}

impl TAttribute {
    pub fn as_value(&self) -> Option<&str> {
        match self {
            TAttribute::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_marker(&self) -> Option<AttributeMarker> {
        match self {
            TAttribute::Marker(marker) => Some(*marker),
            _ => None,
        }
    }
}

impl From<&str> for TAttribute {
    fn from(value: &str) -> Self {
        TAttribute::Value(value.to_string())
    }
}

impl From<AttributeMarker> for TAttribute {
    fn from(marker: AttributeMarker) -> Self {
        TAttribute::Marker(marker)
    }
}

impl From<CssSelector> for TAttribute {
    fn from(selector: CssSelector) -> Self {
        TAttribute::Selector(selector)
    }
}

/// Static attributes: name/value pairs, then marker-introduced regions.
pub type TAttributes = Vec<TAttribute>;

/// Builds [`TAttributes`] from strings, markers and selectors.
#[macro_export]
macro_rules! attrs {
    ($($item:expr),* $(,)?) => {
        vec![$($crate::render3::interfaces::node::TAttribute::from($item)),*]
    };
}

/// Directive data index and declared property name for one public name.
pub type PropertyAliasValue = SmallVec<[(usize, String); 1]>;

pub type PropertyAliases = IndexMap<String, PropertyAliasValue>;

/// Declared input name / attribute value pairs, per directive on a node.
pub type InitialInputs = Vec<(String, String)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TNodeKind {
    Element,
    Container,
}

/// Per-template metadata for an element or container slot.
#[derive(Debug)]
pub struct TNode {
    pub kind: TNodeKind,
    pub tag_name: Option<String>,
    pub attrs: Option<TAttributes>,
    /// Indexed by directive position on the node; `None` once computed
    /// means the directive has no attribute-initialized inputs.
    pub initial_inputs: Option<Vec<Option<InitialInputs>>>,
    /// `None` until computed; `Some(None)` when no directive declares any.
    pub inputs: Option<Option<PropertyAliases>>,
    pub outputs: Option<Option<PropertyAliases>>,
    /// Static data of each embedded view block, keyed by view block id.
    pub container_static: Vec<Option<Rc<RefCell<TView>>>>,
    /// Registry directives matched on the first template pass.
    pub directive_matches: Option<Vec<Rc<DirectiveDef>>>,
}

impl TNode {
    pub fn new(kind: TNodeKind, tag_name: Option<&str>, attrs: Option<TAttributes>) -> Self {
        TNode {
            kind,
            tag_name: tag_name.map(str::to_string),
            attrs,
            initial_inputs: None,
            inputs: None,
            outputs: None,
            container_static: Vec::new(),
            directive_matches: None,
        }
    }
}
