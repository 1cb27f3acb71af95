//! Content projection (`<ng-content>`).

use tracing::trace;

use crate::render3::assert::assert_equal;
use crate::render3::interfaces::node::{NodeId, NodeKind, NodePayload, TNode};
use crate::render3::interfaces::projection::CssSelectorList;
use crate::render3::interfaces::view::{Slot, TData, ViewId};
use crate::render3::node_selector_matcher::{
    get_project_as_attr_value, is_node_matching_selector_list, is_selector_in_selector_list,
};
use crate::render3::runtime::Runtime;

impl Runtime {
    /// Distributes the light DOM of the current component's host into
    /// buckets, one per selector plus the default bucket 0, and stores them
    /// at `index`.
    ///
    /// A node goes to the first selector it matches. A node with
    /// `ngProjectAs` is compared by that selector instead of its own
    /// attributes. Runs on creation only; buckets are never recomputed.
    pub fn projection_def(&mut self, index: usize, selectors: Option<&[CssSelectorList]>) {
        if !self.state.creation_mode {
            return;
        }
        let view = self.current_view();
        let host = self.find_component_host(view);
        let bucket_count = selectors.map_or(1, |selectors| selectors.len() + 1);
        let mut buckets: Vec<Vec<NodeId>> = vec![Vec::new(); bucket_count];

        let mut child = self.nodes[host].child;
        while let Some(node) = child {
            let bucket = match (selectors, self.tnode_of(node)) {
                (Some(selectors), Some(tnode)) => matching_selector_index(&tnode.borrow(), selectors),
                _ => 0,
            };
            buckets[bucket].push(node);
            child = self.nodes[node].next;
        }
        trace!(?host, buckets = ?buckets.iter().map(Vec::len).collect::<Vec<_>>(), "projection def");

        let lview = &mut self.views[view];
        assert_equal(lview.data.len(), index, "data.length not in sequence");
        lview.data.push(Slot::Projection(buckets));
        lview.tview.borrow_mut().ensure(index, TData::default);
    }

    /// Inserts the nodes of bucket `selector_index` (from the buckets stored
    /// at `local_index` of the component view) at `node_index`.
    ///
    /// Nodes that were themselves projected into the host are flattened.
    pub fn content_projection(&mut self, node_index: usize, local_index: usize, selector_index: usize) {
        let view = self.current_view();
        let host = self.find_component_host(view);
        let Some(component_view) = self.nodes[host].component_view() else {
            panic!("ASSERTION ERROR: projection outside of a component view");
        };

        let bucket = match self.views[component_view].data.get(local_index) {
            Some(Slot::Projection(buckets)) => buckets.get(selector_index).cloned().unwrap_or_default(),
            other => panic!("ASSERTION ERROR: expected projection buckets at {}, found {:?}", local_index, other),
        };
        let mut projected = Vec::with_capacity(bucket.len());
        for node in bucket {
            match &self.nodes[node].payload {
                NodePayload::Projection(previously_projected) => projected.extend_from_slice(previously_projected),
                _ => projected.push(node),
            }
        }

        let node = self.create_node(
            Some(node_index),
            None,
            NodePayload::Projection(projected.clone()),
            TData::default,
        );
        self.state.is_parent = false;
        trace!(?node, projected = projected.len(), "content projection");

        let parent = self.nodes[node].parent;
        if !self.can_insert_native_node(parent) {
            return;
        }
        let Some(parent) = parent else {
            return;
        };
        for projected_node in projected {
            match self.nodes[projected_node].kind() {
                NodeKind::Container => self.attach_natives(projected_node, parent, None),
                _ => {
                    if let Some(native) = self.nodes[projected_node].native {
                        self.append_child(Some(parent), native);
                    }
                }
            }
        }
    }

    /// Host element of the component whose template created `view`,
    /// looking through embedded views.
    pub(crate) fn find_component_host(&self, mut view: ViewId) -> NodeId {
        loop {
            let lview = &self.views[view];
            let Some(node) = lview.node else {
                panic!("ASSERTION ERROR: view has no host node");
            };
            if self.nodes[node].kind() != NodeKind::View {
                return node;
            }
            match lview.parent {
                Some(parent) => view = parent,
                None => panic!("ASSERTION ERROR: embedded view without a parent"),
            }
        }
    }
}

fn matching_selector_index(tnode: &TNode, selectors: &[CssSelectorList]) -> usize {
    let project_as = get_project_as_attr_value(tnode);
    for (i, selector_list) in selectors.iter().enumerate() {
        let matched = match project_as {
            Some(project_as) => is_selector_in_selector_list(project_as, selector_list),
            None => is_node_matching_selector_list(tnode, selector_list, true),
        };
        if matched {
            return i + 1;
        }
    }
    0
}
