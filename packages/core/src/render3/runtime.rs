//! The render context and the arenas every instruction works against.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::Result;
use crate::render3::arena::Arena;
use crate::render3::assert::{assert_equal, assert_true};
use crate::render3::di::NodeInjector;
use crate::render3::interfaces::definition::DirectiveDef;
use crate::render3::interfaces::node::{InjectorId, LNode, NodeFlags, NodeId, NodeKind, NodePayload, TNode};
use crate::render3::interfaces::renderer::{RNode, Renderer3, RendererFactory3};
use crate::render3::interfaces::view::{LView, Slot, TData, TView, ViewId};

/// Where the next instruction reads and writes.
///
/// Saved on [`Runtime::enter_view`] and restored on [`Runtime::leave_view`].
#[derive(Debug, Clone, Default)]
pub(crate) struct RenderState {
    pub view: Option<ViewId>,
    /// Last node created or entered.
    pub previous_or_parent: Option<NodeId>,
    /// Whether the next node is a child of `previous_or_parent` (else a sibling).
    pub is_parent: bool,
    /// Next binding slot to compare in update mode.
    pub binding_index: usize,
    pub creation_mode: bool,
}

/// Owns every node, view and injector record and executes instructions
/// issued by compiled templates.
pub struct Runtime {
    pub(crate) nodes: Arena<NodeId, LNode>,
    pub(crate) views: Arena<ViewId, LView>,
    pub(crate) injectors: Arena<InjectorId, NodeInjector>,
    pub(crate) state: RenderState,
    saved: Vec<RenderState>,
    pub(crate) renderer_factory: Rc<dyn RendererFactory3>,
}

impl Runtime {
    pub fn new(renderer_factory: Rc<dyn RendererFactory3>) -> Self {
        Runtime {
            nodes: Arena::new(),
            views: Arena::new(),
            injectors: Arena::new(),
            state: RenderState::default(),
            saved: Vec::new(),
            renderer_factory,
        }
    }

    pub fn node(&self, id: NodeId) -> &LNode {
        &self.nodes[id]
    }

    pub fn get_node(&self, id: NodeId) -> Option<&LNode> {
        self.nodes.get(id)
    }

    pub fn view(&self, id: ViewId) -> &LView {
        &self.views[id]
    }

    pub fn get_view(&self, id: ViewId) -> Option<&LView> {
        self.views.get(id)
    }

    /// Live node count, for leak checks.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn view_count(&self) -> usize {
        self.views.len()
    }

    /// View the current template writes into.
    ///
    /// Panics outside of rendering.
    pub fn current_view(&self) -> ViewId {
        match self.state.view {
            Some(view) => view,
            None => panic!("ASSERTION ERROR: no view is being rendered"),
        }
    }

    pub fn is_creation_mode(&self) -> bool {
        self.state.creation_mode
    }

    /// Node stored in the current view at `index`.
    pub fn load_node(&self, index: usize) -> NodeId {
        let view = &self.views[self.current_view()];
        match view.data.get(index).and_then(Slot::as_node) {
            Some(node) => node,
            None => panic!("ASSERTION ERROR: no node at index {}", index),
        }
    }

    pub(crate) fn renderer(&self) -> Rc<dyn Renderer3> {
        self.views[self.current_view()].renderer.clone()
    }

    pub(crate) fn tview(&self) -> Rc<RefCell<TView>> {
        self.views[self.current_view()].tview.clone()
    }

    pub(crate) fn previous_or_parent(&self) -> NodeId {
        match self.state.previous_or_parent {
            Some(node) => node,
            None => panic!("ASSERTION ERROR: previousOrParentNode should exist"),
        }
    }

    /// Node the next created node attaches under.
    pub(crate) fn current_parent(&self) -> Option<NodeId> {
        let previous = self.state.previous_or_parent?;
        if self.state.is_parent {
            Some(previous)
        } else {
            self.nodes[previous].parent
        }
    }

    /// Swaps in `view`, saving the current state.
    pub(crate) fn enter_view(&mut self, view: ViewId, host: Option<NodeId>) {
        let lview = &self.views[view];
        let next = RenderState {
            view: Some(view),
            previous_or_parent: host,
            is_parent: true,
            binding_index: lview.binding_start_index.unwrap_or(0),
            creation_mode: lview.creation_mode,
        };
        self.saved.push(std::mem::replace(&mut self.state, next));
    }

    /// Marks the current view as created and restores the saved state.
    pub(crate) fn leave_view(&mut self) {
        if let Some(view) = self.state.view {
            let lview = &mut self.views[view];
            lview.creation_mode = false;
            lview.tview.borrow_mut().first_template_pass = false;
        }
        self.state = self.saved.pop().unwrap_or_default();
    }

    pub(crate) fn depth(&self) -> usize {
        self.saved.len()
    }

    /// Drops any views left entered by a failed instruction stream.
    ///
    /// Embedded views abandoned before `view_end` inserted them are
    /// unreachable afterwards, so they are destroyed here.
    pub(crate) fn unwind_to(&mut self, depth: usize) {
        while self.saved.len() > depth {
            if let Some(view) = self.state.view {
                self.release_detached_view(view);
            }
            self.state = self.saved.pop().unwrap_or_default();
        }
    }

    /// Runs `f` inside `view`, restoring the render context even on error.
    pub(crate) fn in_view<T>(
        &mut self,
        view: ViewId,
        host: Option<NodeId>,
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let depth = self.depth();
        self.enter_view(view, host);
        match f(self) {
            Ok(value) => {
                self.leave_view();
                Ok(value)
            }
            Err(err) => {
                self.unwind_to(depth);
                Err(err)
            }
        }
    }

    /// Allocates a node, links it into the tree and, for structural slots,
    /// stores it at `data[index]`.
    ///
    /// On the first template pass `tdata` is cached in the static data at the
    /// same index; later passes reuse the cached entry.
    pub(crate) fn create_node(
        &mut self,
        index: Option<usize>,
        native: Option<RNode>,
        payload: NodePayload,
        tdata: impl FnOnce() -> TData,
    ) -> NodeId {
        let view = self.current_view();
        let parent = self.current_parent();
        let injector = parent.and_then(|parent| self.nodes[parent].injector);
        let kind = payload.kind();

        let node = self.nodes.alloc(LNode {
            flags: NodeFlags::new(kind),
            native,
            parent,
            child: None,
            next: None,
            view,
            tnode: None,
            injector,
            payload,
        });
        assert_equal(self.nodes[node].kind(), kind, "node kind must match its payload");

        if let Some(index) = index {
            let lview = &mut self.views[view];
            assert_equal(lview.data.len(), index, "data.length not in sequence");
            lview.data.push(Slot::Node(node));
            let tnode = lview.tview.borrow_mut().ensure(index, tdata).as_node().cloned();
            self.nodes[node].tnode = tnode;

            if let Some(previous) = self.state.previous_or_parent {
                if self.state.is_parent {
                    let previous_node = &self.nodes[previous];
                    // Component view roots are not children of their host.
                    if previous_node.view == view || previous_node.kind() == NodeKind::View {
                        assert_true(
                            previous_node.child.is_none(),
                            "previousOrParentNode's child should not have been set.",
                        );
                        self.nodes[previous].child = Some(node);
                    }
                } else {
                    assert_true(
                        self.nodes[previous].next.is_none(),
                        "previousOrParentNode's next property should not have been set.",
                    );
                    self.nodes[previous].next = Some(node);
                }
            }
        }

        self.state.previous_or_parent = Some(node);
        self.state.is_parent = true;
        node
    }

    /// Creates a view with no parent and no host; used to bootstrap.
    pub(crate) fn create_root_view(&mut self, renderer: Rc<dyn Renderer3>) -> ViewId {
        let tview = Rc::new(RefCell::new(TView::new(Vec::new())));
        self.views.alloc(LView::new(None, renderer, tview, 2))
    }

    pub(crate) fn tnode_of(&self, node: NodeId) -> Option<Rc<RefCell<TNode>>> {
        self.nodes[node].tnode.clone()
    }

    /// Directive definition cached at `index` of `view`'s template.
    pub(crate) fn directive_def_at(&self, view: ViewId, index: usize) -> Option<Rc<DirectiveDef>> {
        self.views[view]
            .tview
            .borrow()
            .data
            .get(index)
            .and_then(TData::as_directive)
            .cloned()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("nodes", &self.nodes.len())
            .field("views", &self.views.len())
            .field("injectors", &self.injectors.len())
            .field("state", &self.state)
            .finish()
    }
}
