//! JSON snapshots of view trees, for tests and diagnostics.

use serde_json::{json, Value as Json};

use crate::render3::interfaces::node::{NodeId, NodeKind, NodePayload};
use crate::render3::interfaces::view::{Slot, ViewId};
use crate::render3::runtime::Runtime;

const MAX_DEPTH: usize = 32;

impl Runtime {
    /// Snapshot of `view` and everything rendered below it.
    pub fn debug_view(&self, view: ViewId) -> Json {
        self.view_to_json(view, 0, MAX_DEPTH)
    }

    fn view_to_json(&self, view: ViewId, depth: usize, max_depth: usize) -> Json {
        if depth >= max_depth {
            return json!({"type": "MaxDepthReached"});
        }
        let Some(lview) = self.views.get(view) else {
            return json!({"type": "Destroyed"});
        };

        let roots: Vec<Json> = lview
            .data
            .iter()
            .filter_map(Slot::as_node)
            .filter(|&node| self.is_view_root(view, node))
            .map(|node| self.node_to_json(node, depth + 1, max_depth))
            .collect();
        let bindings: Vec<Json> = lview
            .binding_start_index
            .map(|start| lview.data[start..].iter().map(binding_to_json).collect())
            .unwrap_or_default();

        json!({
            "type": "View",
            "id": lview.id,
            "creationMode": lview.creation_mode,
            "bindingStartIndex": lview.binding_start_index,
            "directives": lview.directives.len(),
            "nodes": roots,
            "bindings": bindings
        })
    }

    fn is_view_root(&self, view: ViewId, node: NodeId) -> bool {
        match self.nodes[node].parent {
            Some(parent) => {
                let parent = &self.nodes[parent];
                parent.view != view || parent.kind() == NodeKind::View
            }
            None => true,
        }
    }

    fn node_to_json(&self, node: NodeId, depth: usize, max_depth: usize) -> Json {
        if depth >= max_depth {
            return json!({"type": "MaxDepthReached"});
        }
        let lnode = &self.nodes[node];
        let tag = lnode.tnode.as_ref().and_then(|tnode| tnode.borrow().tag_name.clone());
        let native = lnode.native.map(|native| native.0);

        match &lnode.payload {
            NodePayload::Element { component_view } => {
                let mut children = Vec::new();
                let mut child = lnode.child;
                while let Some(current) = child {
                    children.push(self.node_to_json(current, depth + 1, max_depth));
                    child = self.nodes[current].next;
                }
                let component = component_view.map(|view| self.view_to_json(view, depth + 1, max_depth));
                json!({
                    "type": "Element",
                    "tag": tag,
                    "native": native,
                    "directives": lnode.flags.directive_count(),
                    "children": children,
                    "componentView": component
                })
            }
            NodePayload::Text => json!({"type": "Text", "native": native}),
            NodePayload::Container(container) => {
                let views: Vec<Json> = container
                    .views
                    .iter()
                    .filter_map(|&view_node| self.nodes[view_node].embedded_view())
                    .map(|view| self.view_to_json(view, depth + 1, max_depth))
                    .collect();
                json!({
                    "type": "Container",
                    "tag": tag,
                    "nextIndex": container.next_index,
                    "attached": container.render_parent.is_some(),
                    "views": views
                })
            }
            NodePayload::View(view) => self.view_to_json(*view, depth + 1, max_depth),
            NodePayload::Projection(projected) => json!({
                "type": "Projection",
                "projected": projected.len()
            }),
        }
    }
}

fn binding_to_json(slot: &Slot) -> Json {
    match slot {
        Slot::Binding(value) => Json::String(value.to_string()),
        Slot::Bindings(values) => Json::Array(values.iter().map(|value| Json::String(value.to_string())).collect()),
        _ => Json::Null,
    }
}
