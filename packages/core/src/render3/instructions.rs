//! Instructions emitted by compiled templates.
//!
//! Creation instructions (`element_start`, `text`, `container_create`, ...)
//! run once per view instance; update instructions (`element_property`,
//! `text_binding`, ...) run on every refresh and skip their side effect when
//! handed [`Bound::NoChange`].

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::core::{AttributeMarker, RenderFlags};
use crate::error::{RenderError, Result};
use crate::render3::assert::{assert_equal, assert_none, assert_true};
use crate::render3::interfaces::definition::{DirectiveDef, DirectiveRef};
use crate::render3::interfaces::node::{
    InitialInputs, LContainer, NodeId, NodeKind, NodePayload, PropertyAliasValue, PropertyAliases,
    TAttribute, TAttributes, TNode, TNodeKind,
};
use crate::render3::interfaces::renderer::{EventListener, RNode, Renderer3};
use crate::render3::interfaces::view::{CleanupRecord, LView, Slot, TData, TView};
use crate::render3::node_selector_matcher::is_node_matching_selector_list;
use crate::render3::runtime::Runtime;
use crate::render3::value::{stringify, Bound, Value};

/// What `element_start` creates: a plain tag, or the host of a component.
#[derive(Debug, Clone, Copy)]
pub enum ElementName<'a> {
    Tag(&'a str),
    Component(&'a Rc<DirectiveDef>),
}

impl<'a> From<&'a str> for ElementName<'a> {
    fn from(tag: &'a str) -> Self {
        ElementName::Tag(tag)
    }
}

impl<'a> From<&'a Rc<DirectiveDef>> for ElementName<'a> {
    fn from(def: &'a Rc<DirectiveDef>) -> Self {
        ElementName::Component(def)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BindingDirection {
    Input,
    Output,
}

impl Runtime {
    /// Creates an element at `index` and makes it the parent of the nodes
    /// that follow, until the matching [`Runtime::element_end`].
    ///
    /// A component name instantiates the component into `index + 1`. A plain
    /// tag is matched against the template's directive registry and every
    /// match is instantiated into the following slots, components first.
    pub fn element_start<'a>(
        &mut self,
        index: usize,
        name: impl Into<ElementName<'a>>,
        attrs: Option<TAttributes>,
    ) -> Result<()> {
        assert_none(
            &self.views[self.current_view()].binding_start_index,
            "elements should be created before any bindings",
        );
        let (tag, component) = match name.into() {
            ElementName::Tag(tag) => (tag.to_string(), None),
            ElementName::Component(def) => match def.host_tag() {
                Some(tag) => (tag.to_string(), Some(def.clone())),
                None => return Err(RenderError::MissingHostName(def.name.clone())),
            },
        };

        let renderer = self.renderer();
        let native = renderer.create_element(&tag, None);
        let node = self.create_node(
            Some(index),
            Some(native),
            NodePayload::Element { component_view: None },
            || TData::Node(Rc::new(RefCell::new(TNode::new(TNodeKind::Element, Some(tag.as_str()), attrs)))),
        );
        if let Some(tnode) = self.tnode_of(node) {
            if let Some(attrs) = &tnode.borrow().attrs {
                set_up_attributes(&*renderer, native, attrs);
            }
        }
        let parent = self.nodes[node].parent;
        self.append_child(parent, native);

        match component {
            Some(def) => {
                self.directive_create(index + 1, &def);
            }
            None => self.create_matched_directives(index, node),
        }
        Ok(())
    }

    pub fn element_end(&mut self) {
        if self.state.is_parent {
            self.state.is_parent = false;
        } else {
            let previous = self.previous_or_parent();
            self.state.previous_or_parent = self.nodes[previous].parent;
        }
        assert_equal(
            self.nodes[self.previous_or_parent()].kind(),
            NodeKind::Element,
            "element_end should close an element",
        );
    }

    /// Creates a text node at `index`.
    pub fn text(&mut self, index: usize, value: Option<&str>) {
        assert_none(
            &self.views[self.current_view()].binding_start_index,
            "text nodes should be created before any bindings",
        );
        let native = self.renderer().create_text(value.unwrap_or(""));
        let node = self.create_node(Some(index), Some(native), NodePayload::Text, TData::default);
        self.state.is_parent = false;
        let parent = self.nodes[node].parent;
        self.append_child(parent, native);
    }

    pub fn text_binding(&mut self, index: usize, value: Bound) {
        let Some(value) = value.changed() else {
            return;
        };
        let node = self.load_node(index);
        assert_equal(self.nodes[node].kind(), NodeKind::Text, "text_binding target");
        if let Some(native) = self.nodes[node].native {
            self.renderer().set_value(native, &stringify(&value));
        }
    }

    /// Sets a property, routing it to directive inputs of the same public
    /// name when the element has any.
    pub fn element_property(&mut self, index: usize, name: &str, value: Bound) {
        let Some(value) = value.changed() else {
            return;
        };
        let node = self.load_node(index);
        match self.aliases_for(node, BindingDirection::Input, name) {
            Some(targets) => self.set_inputs_for_property(node, &targets, &value),
            None => {
                if let Some(native) = self.nodes[node].native {
                    self.renderer().set_property(native, name, &value);
                }
            }
        }
    }

    /// Sets an attribute, or removes it when the value is nullish.
    pub fn element_attribute(&mut self, index: usize, name: &str, value: Bound) {
        let Some(value) = value.changed() else {
            return;
        };
        let Some(native) = self.nodes[self.load_node(index)].native else {
            return;
        };
        let renderer = self.renderer();
        if value.is_nullish() {
            renderer.remove_attribute(native, name, None);
        } else {
            renderer.set_attribute(native, name, &stringify(&value), None);
        }
    }

    /// Toggles one class by the truthiness of `value`.
    pub fn element_class_named(&mut self, index: usize, class_name: &str, value: Bound) {
        let Some(value) = value.changed() else {
            return;
        };
        let Some(native) = self.nodes[self.load_node(index)].native else {
            return;
        };
        let renderer = self.renderer();
        if value.is_truthy() {
            renderer.add_class(native, class_name);
        } else {
            renderer.remove_class(native, class_name);
        }
    }

    /// Sets one style, appending `suffix` (a unit such as `px`) when given.
    pub fn element_style_named(&mut self, index: usize, style_name: &str, value: Bound, suffix: Option<&str>) {
        let Some(value) = value.changed() else {
            return;
        };
        let Some(native) = self.nodes[self.load_node(index)].native else {
            return;
        };
        let renderer = self.renderer();
        if value.is_nullish() {
            renderer.remove_style(native, style_name);
        } else {
            let mut style_value = stringify(&value);
            style_value.push_str(suffix.unwrap_or(""));
            renderer.set_style(native, style_name, &style_value);
        }
    }

    /// Registers `callback` for `event_name` on the current element.
    ///
    /// The native listener is always registered; directive outputs with the
    /// same public name are subscribed as well. Both are undone when the
    /// view is destroyed.
    pub fn listener(&mut self, event_name: &str, callback: EventListener) {
        let node = self.previous_or_parent();
        assert_true(self.state.is_parent, "listener should be called on the current element");
        let view = self.current_view();

        if let Some(native) = self.nodes[node].native {
            let unlisten = self.renderer().listen(native, event_name, callback.clone());
            self.views[view].cleanup.push(CleanupRecord::Listener(unlisten));
        }

        let Some(targets) = self.aliases_for(node, BindingDirection::Output, event_name) else {
            return;
        };
        for (index, declared) in targets {
            let emitter = match self.views[view].data.get(index) {
                Some(Slot::Directive { instance, .. }) => instance.borrow().output(&declared),
                _ => None,
            };
            if let Some(emitter) = emitter {
                let subscription = emitter.subscribe(callback.clone());
                self.views[view].cleanup.push(CleanupRecord::Subscription(subscription));
            }
        }
    }

    /// Instantiates `def` into `index` on the current element.
    ///
    /// Registers the type in the element's bloom filter, applies inputs
    /// initialized from static attributes and, for components, creates the
    /// component's view.
    pub fn directive_create(&mut self, index: usize, def: &Rc<DirectiveDef>) -> DirectiveRef {
        let view = self.current_view();
        let host = self.previous_or_parent();
        assert_true(self.state.is_parent, "directives are created on the current element");
        let instance = def.create_instance();

        {
            let lview = &mut self.views[view];
            assert_equal(lview.data.len(), index, "data.length not in sequence");
            lview.data.push(Slot::Directive {
                instance: instance.clone(),
                host,
            });
            lview.directives.push(index);
            lview.tview.borrow_mut().ensure(index, || TData::Directive(def.clone()));
        }

        let flags = self.nodes[host].flags.with_directive(index);
        assert_equal(flags.directive_range().end, index + 1, "directives on a node must be contiguous");
        self.nodes[host].flags = flags;

        let injector = self.get_or_create_node_injector(host);
        self.bloom_add(injector, def);
        self.set_inputs_from_attrs(host, &instance, def);

        if def.is_component() && self.nodes[host].component_view().is_none() {
            self.add_component_view(host, def, &instance);
        }
        instance
    }

    /// Directive instance stored at `index` of the current view.
    pub fn load_directive(&self, index: usize) -> DirectiveRef {
        match self.views[self.current_view()].data.get(index) {
            Some(Slot::Directive { instance, .. }) => instance.clone(),
            _ => panic!("ASSERTION ERROR: no directive at index {}", index),
        }
    }

    /// Creates an anchor for embedded views at `index`.
    ///
    /// `tag` is the element an inline template was written on; `None`
    /// stands for an explicit `<ng-template>`. Directives matching the
    /// container are instantiated like for elements. Close with
    /// [`Runtime::container_end`].
    pub fn container_create(&mut self, index: usize, tag: Option<&str>, attrs: Option<TAttributes>) {
        assert_none(
            &self.views[self.current_view()].binding_start_index,
            "containers should be created before any bindings",
        );
        let anchor = self.renderer().create_comment("container");
        let parent = self.current_parent();
        // Views of a container whose parent is a view root are attached when
        // that view is inserted.
        let render_parent = if self.can_insert_native_node(parent) {
            parent
        } else {
            None
        };
        let node = self.create_node(
            Some(index),
            Some(anchor),
            NodePayload::Container(LContainer {
                views: Vec::new(),
                next_index: 0,
                render_parent,
            }),
            || TData::Node(Rc::new(RefCell::new(TNode::new(TNodeKind::Container, tag, attrs)))),
        );
        self.append_child(parent, anchor);
        self.create_matched_directives(index, node);
    }

    pub fn container_end(&mut self) {
        if self.state.is_parent {
            self.state.is_parent = false;
        } else {
            let previous = self.previous_or_parent();
            self.state.previous_or_parent = self.nodes[previous].parent;
        }
        self.assert_container(self.previous_or_parent());
    }

    /// Starts a refresh pass over the views of the container at `index`.
    pub fn container_refresh_start(&mut self, index: usize) {
        let node = self.load_node(index);
        self.assert_container(node);
        self.state.previous_or_parent = Some(node);
        self.state.is_parent = true;
        if let Some(container) = self.nodes[node].container_mut() {
            container.next_index = 0;
        }
        trace!(?node, "container refresh start");
    }

    /// Removes the views not visited since `container_refresh_start`.
    pub fn container_refresh_end(&mut self) -> Result<()> {
        if !self.state.is_parent {
            let previous = self.previous_or_parent();
            assert_equal(self.nodes[previous].kind(), NodeKind::View, "previous node should be a view");
            self.state.previous_or_parent = self.nodes[previous].parent;
        }
        let container = self.previous_or_parent();
        self.assert_container(container);
        self.state.is_parent = false;

        let next_index = self.nodes[container].container().map_or(0, |c| c.next_index);
        while self.nodes[container].container().is_some_and(|c| c.views.len() > next_index) {
            self.remove_view(container, next_index)?;
        }
        trace!(?container, views = next_index, "container refresh end");
        Ok(())
    }

    /// Enters the next embedded view of the current container.
    ///
    /// The view at the container's cursor is reused when it was created from
    /// the same view block; otherwise a new view is created. The returned
    /// flags tell the caller which template blocks to run.
    pub fn view_create(&mut self, view_block_id: usize) -> RenderFlags {
        let container = if self.state.is_parent {
            self.previous_or_parent()
        } else {
            match self.nodes[self.previous_or_parent()].parent {
                Some(parent) => parent,
                None => panic!("ASSERTION ERROR: embedded view outside of a container"),
            }
        };
        self.assert_container(container);

        let existing = {
            let Some(lcontainer) = self.nodes[container].container_mut() else {
                panic!("ASSERTION ERROR: embedded view outside of a container");
            };
            let existing = lcontainer.views.get(lcontainer.next_index).copied();
            lcontainer.next_index += 1;
            existing
        };
        let reusable = existing
            .filter(|_| !self.state.creation_mode)
            .and_then(|view_node| Some((view_node, self.nodes[view_node].embedded_view()?)))
            .filter(|&(_, view)| self.views[view].id == Some(view_block_id));

        match reusable {
            Some((view_node, view)) => {
                self.enter_view(view, Some(view_node));
                RenderFlags::UPDATE
            }
            None => {
                let tview = self.embedded_tview(container, view_block_id);
                let mut lview = LView::new(Some(view_block_id), self.renderer(), tview, 0);
                lview.parent = Some(self.current_view());
                let view = self.views.alloc(lview);
                let view_node = self.create_node(None, None, NodePayload::View(view), TData::default);
                self.views[view].node = Some(view_node);
                debug!(?view, view_block_id, "create embedded view");
                self.enter_view(view, Some(view_node));
                RenderFlags::CREATE | RenderFlags::UPDATE
            }
        }
    }

    /// Finishes the current embedded view, inserting it into its container
    /// unless it was reused in place.
    pub fn view_end(&mut self) -> Result<()> {
        let view = self.current_view();
        self.refresh_descendants(view)?;

        let Some(view_node) = self.views[view].node else {
            panic!("ASSERTION ERROR: embedded view without a view node");
        };
        if let Some(container) = self.nodes[view_node].parent {
            let (next_index, previous) = match self.nodes[container].container() {
                Some(lcontainer) if lcontainer.next_index > 0 => (
                    lcontainer.next_index,
                    lcontainer.views.get(lcontainer.next_index - 1).copied(),
                ),
                _ => (1, None),
            };
            let id = self.views[view].id;
            let id_changed = previous
                .and_then(|previous| self.nodes[previous].embedded_view())
                .map_or(true, |previous| self.views[previous].id != id);
            if id_changed {
                self.insert_view(container, view_node, next_index - 1);
            }
        }

        self.leave_view();
        self.state.previous_or_parent = Some(view_node);
        self.state.is_parent = false;
        assert_equal(self.nodes[view_node].kind(), NodeKind::View, "view_end should close a view");
        Ok(())
    }

    /// Static data for view block `id` of `container`, created on first use.
    fn embedded_tview(&self, container: NodeId, id: usize) -> Rc<RefCell<TView>> {
        let registry = self.tview().borrow().registry.clone();
        let Some(tnode) = self.tnode_of(container) else {
            return Rc::new(RefCell::new(TView::new(registry)));
        };
        let mut tnode = tnode.borrow_mut();
        if tnode.container_static.len() <= id {
            tnode.container_static.resize_with(id + 1, || None);
        }
        tnode.container_static[id]
            .get_or_insert_with(|| Rc::new(RefCell::new(TView::new(registry))))
            .clone()
    }

    /// Instantiates the registry directives whose selectors match `node`.
    /// Matching runs once per template; the result is cached on the TNode.
    fn create_matched_directives(&mut self, index: usize, node: NodeId) {
        let Some(tnode) = self.tnode_of(node) else {
            return;
        };
        let matches = {
            let mut tnode = tnode.borrow_mut();
            if tnode.directive_matches.is_none() {
                let tview = self.tview();
                let tview = tview.borrow();
                let mut matched: Vec<Rc<DirectiveDef>> = tview
                    .registry
                    .iter()
                    .filter(|def| is_node_matching_selector_list(&tnode, &def.selectors, false))
                    .cloned()
                    .collect();
                matched.sort_by_key(|def| !def.is_component());
                tnode.directive_matches = Some(matched);
            }
            tnode.directive_matches.clone().unwrap_or_default()
        };
        for (offset, def) in matches.iter().enumerate() {
            self.directive_create(index + 1 + offset, def);
        }
    }

    fn add_component_view(&mut self, host: NodeId, def: &Rc<DirectiveDef>, instance: &DirectiveRef) {
        let Some(component) = def.component.as_ref() else {
            return;
        };
        let parent = self.current_view();
        let renderer = self.renderer_factory.create_renderer(self.nodes[host].native, Some(def));
        let mut lview = LView::new(None, renderer, component.tview(), component.decls + component.vars);
        lview.node = Some(host);
        lview.parent = Some(parent);
        lview.context = Some(instance.clone());
        lview.template = Some(component.template.clone());
        let component_view = self.views.alloc(lview);

        if let NodePayload::Element { component_view: slot } = &mut self.nodes[host].payload {
            *slot = Some(component_view);
        }
        self.views[parent].components.push(host);
        debug!(component = %def.name, ?component_view, "create component view");
    }

    fn set_inputs_from_attrs(&mut self, host: NodeId, instance: &DirectiveRef, def: &DirectiveDef) {
        let Some(tnode) = self.tnode_of(host) else {
            return;
        };
        let position = self.nodes[host].flags.directive_count() - 1;
        let initial_inputs = {
            let mut tnode = tnode.borrow_mut();
            let cached = tnode.initial_inputs.as_ref().is_some_and(|data| position < data.len());
            if !cached {
                let generated = generate_initial_inputs(tnode.attrs.as_ref(), def);
                let data = tnode.initial_inputs.get_or_insert_with(Vec::new);
                if data.len() <= position {
                    data.resize(position + 1, None);
                }
                data[position] = generated;
            }
            tnode
                .initial_inputs
                .as_ref()
                .and_then(|data| data.get(position).cloned())
                .flatten()
        };

        if let Some(initial_inputs) = initial_inputs {
            let mut instance = instance.borrow_mut();
            for (declared, value) in initial_inputs {
                instance.set_input(&declared, Value::from(value));
            }
        }
    }

    /// Directive inputs or outputs exposed under `public_name` on `node`.
    /// The alias map is computed once per template.
    fn aliases_for(
        &self,
        node: NodeId,
        direction: BindingDirection,
        public_name: &str,
    ) -> Option<PropertyAliasValue> {
        let tnode = self.tnode_of(node)?;
        let mut tnode = tnode.borrow_mut();
        let cache = match direction {
            BindingDirection::Input => &mut tnode.inputs,
            BindingDirection::Output => &mut tnode.outputs,
        };
        cache
            .get_or_insert_with(|| self.generate_property_aliases(node, direction))
            .as_ref()
            .and_then(|aliases| aliases.get(public_name))
            .cloned()
    }

    fn generate_property_aliases(&self, node: NodeId, direction: BindingDirection) -> Option<PropertyAliases> {
        let lnode = &self.nodes[node];
        let mut store: Option<PropertyAliases> = None;
        for index in lnode.flags.directive_range() {
            let Some(def) = self.directive_def_at(lnode.view, index) else {
                continue;
            };
            let aliases = match direction {
                BindingDirection::Input => &def.inputs,
                BindingDirection::Output => &def.outputs,
            };
            for (public_name, declared) in aliases {
                store
                    .get_or_insert_with(IndexMap::new)
                    .entry(public_name.clone())
                    .or_default()
                    .push((index, declared.clone()));
            }
        }
        store
    }

    fn set_inputs_for_property(&self, node: NodeId, targets: &PropertyAliasValue, value: &Value) {
        let view = &self.views[self.nodes[node].view];
        for (index, declared) in targets {
            if let Some(Slot::Directive { instance, .. }) = view.data.get(*index) {
                instance.borrow_mut().set_input(declared, value.clone());
            }
        }
    }
}

/// Declared input name and static value for every leading attribute pair
/// that `def` declares as an input.
fn generate_initial_inputs(attrs: Option<&TAttributes>, def: &DirectiveDef) -> Option<InitialInputs> {
    let attrs = attrs?;
    let mut inputs: Option<InitialInputs> = None;
    for pair in attrs.chunks(2) {
        let [name, value] = pair else {
            break;
        };
        let (Some(name), Some(value)) = (name.as_value(), value.as_value()) else {
            break;
        };
        if let Some(declared) = def.inputs.get(name) {
            inputs
                .get_or_insert_with(Vec::new)
                .push((declared.clone(), value.to_string()));
        }
    }
    inputs
}

/// Applies static attributes, classes and styles to a freshly created
/// element. Binding, template, projection and i18n regions are not
/// rendered.
pub(crate) fn set_up_attributes(renderer: &dyn Renderer3, native: RNode, attrs: &TAttributes) {
    let mut mode: Option<AttributeMarker> = None;
    let mut i = 0;
    while i < attrs.len() {
        match &attrs[i] {
            TAttribute::Marker(AttributeMarker::NamespaceURI) => {
                let namespace = attrs.get(i + 1).and_then(TAttribute::as_value);
                let name = attrs.get(i + 2).and_then(TAttribute::as_value);
                let value = attrs.get(i + 3).and_then(TAttribute::as_value);
                if let (Some(name), Some(value)) = (name, value) {
                    renderer.set_attribute(native, name, value, namespace);
                }
                i += 4;
            }
            TAttribute::Marker(marker @ (AttributeMarker::Classes | AttributeMarker::Styles)) => {
                mode = Some(*marker);
                i += 1;
            }
            TAttribute::Marker(_) | TAttribute::Selector(_) => break,
            TAttribute::Value(name) => match mode {
                Some(AttributeMarker::Classes) => {
                    renderer.add_class(native, name);
                    i += 1;
                }
                Some(AttributeMarker::Styles) => {
                    let value = attrs.get(i + 1).and_then(TAttribute::as_value).unwrap_or("");
                    renderer.set_style(native, name, value);
                    i += 2;
                }
                _ => {
                    let value = attrs.get(i + 1).and_then(TAttribute::as_value).unwrap_or("");
                    renderer.set_attribute(native, name, value, None);
                    i += 2;
                }
            },
        }
    }
}
