//! View state.
//!
//! [`LView`] is the per-instance flat storage of a template; [`TView`] is
//! the per-template static data indexed the same way.

use std::cell::RefCell;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::render3::arena::arena_id;
use crate::render3::event_emitter::Subscription;
use crate::render3::interfaces::definition::{DirectiveDef, DirectiveRef, TemplateFn};
use crate::render3::interfaces::node::{NodeId, TNode};
use crate::render3::interfaces::renderer::{Renderer3, Unlisten};
use crate::render3::value::Value;

arena_id!(
    /// Index of an [`LView`] in the runtime's view arena.
    ViewId
);

/// One slot of [`LView::data`].
pub enum Slot {
    Node(NodeId),
    /// A directive instance and the node it is attached to.
    Directive { instance: DirectiveRef, host: NodeId },
    /// Projection buckets computed by `projection_def`.
    Projection(Vec<Vec<NodeId>>),
    Binding(Value),
    /// All arguments of one interpolation.
    Bindings(SmallVec<[Value; 4]>),
}

impl Slot {
    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Slot::Node(node) => Some(*node),
            _ => None,
        }
    }
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Slot::Node(node) => f.debug_tuple("Node").field(node).finish(),
            Slot::Directive { host, .. } => f.debug_struct("Directive").field("host", host).finish(),
            Slot::Projection(buckets) => f.debug_tuple("Projection").field(buckets).finish(),
            Slot::Binding(value) => f.debug_tuple("Binding").field(value).finish(),
            Slot::Bindings(values) => f.debug_tuple("Bindings").field(values).finish(),
        }
    }
}

/// Teardown work recorded while a view is built.
pub enum CleanupRecord {
    Listener(Unlisten),
    Subscription(Subscription),
}

/// One slot of [`TView::data`].
#[derive(Debug, Clone, Default)]
pub enum TData {
    /// Nothing beyond what the instance slot holds.
    #[default]
    Empty,
    Node(Rc<RefCell<TNode>>),
    Directive(Rc<DirectiveDef>),
}

impl TData {
    pub fn as_node(&self) -> Option<&Rc<RefCell<TNode>>> {
        match self {
            TData::Node(tnode) => Some(tnode),
            _ => None,
        }
    }

    pub fn as_directive(&self) -> Option<&Rc<DirectiveDef>> {
        match self {
            TData::Directive(def) => Some(def),
            _ => None,
        }
    }
}

/// Static data of one template, shared by all its instances.
#[derive(Debug, Default)]
pub struct TView {
    pub data: Vec<TData>,
    pub first_template_pass: bool,
    /// Directives available to elements of this template.
    pub registry: Vec<Rc<DirectiveDef>>,
}

impl TView {
    pub fn new(registry: Vec<Rc<DirectiveDef>>) -> Self {
        TView {
            data: Vec::new(),
            first_template_pass: true,
            registry,
        }
    }

    /// Stores `value` at `index`, back-filling any gap so the vector stays
    /// dense. Entries already present are kept.
    pub fn ensure(&mut self, index: usize, value: impl FnOnce() -> TData) -> TData {
        if index >= self.data.len() {
            self.data.resize_with(index, TData::default);
            self.data.push(value());
        }
        self.data[index].clone()
    }
}

pub struct LView {
    /// View block id for embedded views; `None` for component and root views.
    pub id: Option<usize>,
    /// View node for embedded views, host element for component views.
    pub node: Option<NodeId>,
    pub parent: Option<ViewId>,
    pub data: Vec<Slot>,
    pub binding_start_index: Option<usize>,
    pub cleanup: Vec<CleanupRecord>,
    pub renderer: Rc<dyn Renderer3>,
    pub tview: Rc<RefCell<TView>>,
    pub creation_mode: bool,
    /// Component instance rendered by this view's template.
    pub context: Option<DirectiveRef>,
    pub template: Option<TemplateFn>,
    /// Data indices of directives created in this view, in creation order.
    pub directives: Vec<usize>,
    /// Host elements of child components declared in this view.
    pub components: Vec<NodeId>,
}

impl LView {
    pub fn new(
        id: Option<usize>,
        renderer: Rc<dyn Renderer3>,
        tview: Rc<RefCell<TView>>,
        capacity: usize,
    ) -> Self {
        LView {
            id,
            node: None,
            parent: None,
            data: Vec::with_capacity(capacity),
            binding_start_index: None,
            cleanup: Vec::new(),
            renderer,
            tview,
            creation_mode: true,
            context: None,
            template: None,
            directives: Vec::new(),
            components: Vec::new(),
        }
    }
}
