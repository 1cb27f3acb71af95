//! Attaching, detaching and tearing down native nodes and views.

use tracing::debug;

use crate::core::LifecycleHooks;
use crate::error::{RenderError, Result};
use crate::render3::assert::assert_equal;
use crate::render3::interfaces::node::{NodeId, NodeKind, NodePayload};
use crate::render3::interfaces::renderer::RNode;
use crate::render3::interfaces::view::{CleanupRecord, Slot, ViewId};
use crate::render3::runtime::Runtime;

impl Runtime {
    /// Whether natives created under `parent` in the current view can be
    /// attached right away.
    ///
    /// Only elements receive natives. A component host receives them only
    /// from its own view; its light DOM waits for projection.
    pub(crate) fn can_insert_native_node(&self, parent: Option<NodeId>) -> bool {
        let Some(parent) = parent else {
            return false;
        };
        let parent = &self.nodes[parent];
        parent.kind() == NodeKind::Element
            && (parent.view != self.current_view() || parent.component_view().is_none())
    }

    pub(crate) fn append_child(&self, parent: Option<NodeId>, child: RNode) {
        if !self.can_insert_native_node(parent) {
            return;
        }
        if let Some(parent_native) = parent.and_then(|parent| self.nodes[parent].native) {
            self.renderer().append_child(parent_native, child);
        }
    }

    /// Top-level natives of `node` in document order.
    ///
    /// Also reports every container walked through so the caller can point
    /// it at its new render parent.
    pub(crate) fn collect_natives(&self, node: NodeId, natives: &mut Vec<RNode>, containers: &mut Vec<NodeId>) {
        let lnode = &self.nodes[node];
        match &lnode.payload {
            NodePayload::Element { .. } | NodePayload::Text => natives.extend(lnode.native),
            NodePayload::Container(container) => {
                containers.push(node);
                for &view_node in &container.views {
                    self.collect_natives(view_node, natives, containers);
                }
                natives.extend(lnode.native);
            }
            NodePayload::View(_) => {
                let mut child = lnode.child;
                while let Some(current) = child {
                    self.collect_natives(current, natives, containers);
                    child = self.nodes[current].next;
                }
            }
            NodePayload::Projection(projected) => {
                for &projected_node in projected {
                    self.collect_natives(projected_node, natives, containers);
                }
            }
        }
    }

    /// Attaches the natives of `node` under `render_parent`, before `before`
    /// (or at the end).
    pub(crate) fn attach_natives(&mut self, node: NodeId, render_parent: NodeId, before: Option<RNode>) {
        let mut natives = Vec::new();
        let mut containers = Vec::new();
        self.collect_natives(node, &mut natives, &mut containers);
        for container in containers {
            if let Some(container) = self.nodes[container].container_mut() {
                container.render_parent = Some(render_parent);
            }
        }

        let Some(parent_native) = self.nodes[render_parent].native else {
            return;
        };
        let renderer = self.views[self.nodes[render_parent].view].renderer.clone();
        for native in natives {
            renderer.insert_before(parent_native, native, before);
        }
    }

    fn detach_natives(&mut self, node: NodeId, render_parent: NodeId) {
        let mut natives = Vec::new();
        let mut containers = Vec::new();
        self.collect_natives(node, &mut natives, &mut containers);
        for container in containers {
            if let Some(container) = self.nodes[container].container_mut() {
                container.render_parent = None;
            }
        }

        let Some(parent_native) = self.nodes[render_parent].native else {
            return;
        };
        let renderer = self.views[self.nodes[render_parent].view].renderer.clone();
        for native in natives {
            renderer.remove_child(parent_native, native);
        }
    }

    /// First native node rendered by the views of `container` from `start`
    /// on, falling back to the container's anchor.
    fn find_before_node(&self, container: NodeId, start: usize) -> Option<RNode> {
        let lnode = &self.nodes[container];
        let views = lnode.container().map(|c| c.views.as_slice()).unwrap_or_default();
        for &view_node in views.iter().skip(start) {
            let mut natives = Vec::new();
            self.collect_natives(view_node, &mut natives, &mut Vec::new());
            if let Some(first) = natives.first() {
                return Some(*first);
            }
        }
        lnode.native
    }

    /// Inserts `view_node` into `container` at `index`.
    ///
    /// Natives are attached only when the container already knows its render
    /// parent; otherwise they are attached when the container itself is.
    pub(crate) fn insert_view(&mut self, container: NodeId, view_node: NodeId, index: usize) {
        let render_parent = {
            let Some(lcontainer) = self.nodes[container].container_mut() else {
                panic!("ASSERTION ERROR: insert_view target is not a container");
            };
            let index = index.min(lcontainer.views.len());
            lcontainer.views.insert(index, view_node);
            lcontainer.render_parent
        };
        self.nodes[view_node].parent = Some(container);
        debug!(?container, ?view_node, index, "insert view");

        if let Some(render_parent) = render_parent {
            let before = self.find_before_node(container, index + 1);
            self.attach_natives(view_node, render_parent, before);
        }
    }

    /// Detaches the view at `index` of `container` and destroys it.
    pub(crate) fn remove_view(&mut self, container: NodeId, index: usize) -> Result<()> {
        let (view_node, render_parent) = {
            let Some(lcontainer) = self.nodes[container].container_mut() else {
                panic!("ASSERTION ERROR: remove_view target is not a container");
            };
            (lcontainer.views.remove(index), lcontainer.render_parent)
        };
        debug!(?container, ?view_node, index, "remove view");

        if let Some(render_parent) = render_parent {
            self.detach_natives(view_node, render_parent);
        }
        let result = match self.nodes[view_node].embedded_view() {
            Some(view) => self.destroy_view_tree(view),
            None => Ok(()),
        };
        self.nodes.remove(view_node);
        result
    }

    /// Destroys `view` and frees its view node if it is an embedded view its
    /// container does not list.
    pub(crate) fn release_detached_view(&mut self, view: ViewId) {
        let Some(view_node) = self.views.get(view).and_then(|lview| lview.node) else {
            return;
        };
        let Some(lnode) = self.nodes.get(view_node) else {
            return;
        };
        if lnode.embedded_view() != Some(view) {
            return;
        }
        let attached = lnode
            .parent
            .and_then(|container| self.nodes.get(container))
            .and_then(|container| container.container())
            .is_some_and(|container| container.views.contains(&view_node));
        if attached {
            return;
        }

        if let Err(err) = self.destroy_view_tree(view) {
            debug!(error = %err, ?view, "teardown of detached view");
        }
        self.nodes.remove(view_node);
        debug!(?view, ?view_node, "release detached view");
    }

    /// Destroys `view` and every view nested in it, depth first.
    ///
    /// Teardown always completes; the first hook failure is reported.
    pub(crate) fn destroy_view_tree(&mut self, view: ViewId) -> Result<()> {
        let mut first_error = None;
        let nodes: Vec<NodeId> = self.views[view].data.iter().filter_map(Slot::as_node).collect();

        for &node in &nodes {
            let nested: Vec<(Option<NodeId>, ViewId)> = match &self.nodes[node].payload {
                NodePayload::Element {
                    component_view: Some(component_view),
                } => vec![(None, *component_view)],
                NodePayload::Container(container) => container
                    .views
                    .iter()
                    .filter_map(|&view_node| Some((Some(view_node), self.nodes[view_node].embedded_view()?)))
                    .collect(),
                _ => Vec::new(),
            };
            for (view_node, nested_view) in nested {
                if let Err(err) = self.destroy_view_tree(nested_view) {
                    first_error.get_or_insert(err);
                }
                if let Some(view_node) = view_node {
                    self.nodes.remove(view_node);
                }
            }
        }

        if let Err(err) = self.cleanup_view(view) {
            first_error.get_or_insert(err);
        }

        for node in nodes {
            if let Some(lnode) = self.nodes.remove(node) {
                if let Some(injector) = lnode.injector {
                    if self.injectors.get(injector).is_some_and(|record| record.node == node) {
                        self.injectors.remove(injector);
                    }
                }
            }
        }
        self.views.remove(view);
        debug!(?view, "destroy view");

        first_error.map_or(Ok(()), Err)
    }

    /// Removes listeners and subscriptions, then runs `on_destroy` hooks.
    fn cleanup_view(&mut self, view: ViewId) -> Result<()> {
        let lview = &mut self.views[view];
        for record in lview.cleanup.drain(..) {
            match record {
                CleanupRecord::Listener(unlisten) => unlisten(),
                CleanupRecord::Subscription(subscription) => subscription.unsubscribe(),
            }
        }

        let mut first_error: Option<RenderError> = None;
        for index in self.views[view].directives.clone() {
            let Some(def) = self.directive_def_at(view, index) else {
                continue;
            };
            if !def.hooks.contains(LifecycleHooks::ON_DESTROY) {
                continue;
            }
            if let Some(Slot::Directive { instance, .. }) = self.views[view].data.get(index) {
                if let Err(err) = instance.borrow_mut().on_destroy() {
                    first_error.get_or_insert(err.into());
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub(crate) fn assert_container(&self, node: NodeId) {
        assert_equal(self.nodes[node].kind(), NodeKind::Container, "expected a container node");
    }
}
