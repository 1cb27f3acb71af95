//! Renderer abstraction.
//!
//! The runtime never touches a concrete DOM. Every native operation goes
//! through a [`Renderer3`] chosen once per view by a [`RendererFactory3`].

use std::rc::Rc;

use crate::render3::interfaces::definition::DirectiveDef;
use crate::render3::value::Value;

/// Opaque handle to a native node, meaningful only to the renderer that
/// created it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RNode(pub u64);

pub type EventListener = Rc<dyn Fn(&Value)>;

/// Returned by [`Renderer3::listen`]; calling it removes the listener.
pub type Unlisten = Box<dyn FnOnce()>;

pub trait Renderer3 {
    fn create_element(&self, name: &str, namespace: Option<&str>) -> RNode;
    fn create_text(&self, value: &str) -> RNode;
    fn create_comment(&self, value: &str) -> RNode;

    fn append_child(&self, parent: RNode, child: RNode);
    /// Inserts `child` before `before`, or appends when `before` is `None`.
    fn insert_before(&self, parent: RNode, child: RNode, before: Option<RNode>);
    fn remove_child(&self, parent: RNode, child: RNode);

    fn set_attribute(&self, el: RNode, name: &str, value: &str, namespace: Option<&str>);
    fn remove_attribute(&self, el: RNode, name: &str, namespace: Option<&str>);
    fn set_property(&self, el: RNode, name: &str, value: &Value);
    fn add_class(&self, el: RNode, name: &str);
    fn remove_class(&self, el: RNode, name: &str);
    fn set_style(&self, el: RNode, style: &str, value: &str);
    fn remove_style(&self, el: RNode, style: &str);
    fn set_value(&self, node: RNode, value: &str);

    fn listen(&self, target: RNode, event_name: &str, callback: EventListener) -> Unlisten;

    /// Locates an existing element to bootstrap into.
    fn select_root_element(&self, _selector: &str) -> Option<RNode> {
        None
    }

    /// Called once a node is detached for good.
    fn destroy_node(&self, _node: RNode) {}
}

pub trait RendererFactory3 {
    fn create_renderer(&self, host: Option<RNode>, def: Option<&DirectiveDef>) -> Rc<dyn Renderer3>;

    fn begin(&self) {}
    fn end(&self) {}
}
