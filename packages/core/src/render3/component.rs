//! Bootstrapping a root component and driving change detection on it.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::debug;

use crate::error::{RenderError, Result};
use crate::render3::instructions::set_up_attributes;
use crate::render3::interfaces::definition::{downcast_directive_mut, DirectiveDef, DirectiveRef};
use crate::render3::interfaces::node::{NodeId, NodePayload, TNode, TNodeKind};
use crate::render3::interfaces::renderer::{RNode, RendererFactory3};
use crate::render3::interfaces::view::{TData, ViewId};
use crate::render3::node_selector_matcher::extract_attrs_and_classes_from_selector;
use crate::render3::runtime::Runtime;

/// Runs once on a freshly created root component, before its first check.
pub type ComponentFeature = Rc<dyn Fn(&DirectiveRef, &DirectiveDef)>;

#[derive(Clone, Default)]
pub struct CreateComponentOptions {
    /// Replaces the runtime's renderer factory from this bootstrap on.
    pub renderer_factory: Option<Rc<dyn RendererFactory3>>,
    /// Selector of an existing element to render into. When absent a host
    /// element is created from the component's tag.
    pub host: Option<String>,
    pub features: Vec<ComponentFeature>,
}

impl CreateComponentOptions {
    pub fn with_host(mut self, selector: &str) -> Self {
        self.host = Some(selector.to_string());
        self
    }

    pub fn with_renderer_factory(mut self, factory: Rc<dyn RendererFactory3>) -> Self {
        self.renderer_factory = Some(factory);
        self
    }

    pub fn with_feature(mut self, feature: ComponentFeature) -> Self {
        self.features.push(feature);
        self
    }
}

/// Handle to a bootstrapped component.
#[derive(Clone)]
pub struct ComponentRef {
    pub instance: DirectiveRef,
    pub host: NodeId,
    pub host_native: RNode,
    pub root_view: ViewId,
}

impl ComponentRef {
    /// Runs `f` on the component instance if it is a `T`.
    pub fn with_instance<T: 'static, R>(&self, f: impl FnOnce(&mut T) -> R) -> Option<R> {
        let mut instance = self.instance.borrow_mut();
        downcast_directive_mut::<T>(&mut *instance).map(f)
    }
}

impl std::fmt::Debug for ComponentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRef")
            .field("host", &self.host)
            .field("host_native", &self.host_native)
            .field("root_view", &self.root_view)
            .finish()
    }
}

impl Runtime {
    /// Creates `def` in a new root view, renders it once and returns a
    /// handle for later [`Runtime::detect_changes`] calls.
    pub fn render_component(
        &mut self,
        def: &Rc<DirectiveDef>,
        options: CreateComponentOptions,
    ) -> Result<ComponentRef> {
        if !def.is_component() {
            return Err(RenderError::NotAComponent(def.name.clone()));
        }
        if let Some(factory) = options.renderer_factory.clone() {
            self.renderer_factory = factory;
        }
        let factory = self.renderer_factory.clone();
        let renderer = factory.create_renderer(None, None);
        let root_view = self.create_root_view(renderer);
        debug!(component = %def.name, ?root_view, "bootstrap component");

        factory.begin();
        let result = self.in_view(root_view, None, |rt| rt.create_root_component(def, &options));
        factory.end();

        match result {
            Ok((host, host_native, instance)) => Ok(ComponentRef {
                instance,
                host,
                host_native,
                root_view,
            }),
            Err(err) => {
                if self.views.get(root_view).is_some() {
                    // The bootstrap error is the one worth reporting.
                    if let Err(teardown) = self.destroy_view_tree(root_view) {
                        debug!(error = %teardown, ?root_view, "teardown after failed bootstrap");
                    }
                }
                Err(err)
            }
        }
    }

    fn create_root_component(
        &mut self,
        def: &Rc<DirectiveDef>,
        options: &CreateComponentOptions,
    ) -> Result<(NodeId, RNode, DirectiveRef)> {
        let renderer = self.renderer();
        let tag = def.host_tag();
        let (host_native, attrs) = match &options.host {
            Some(selector) => {
                let native = renderer
                    .select_root_element(selector)
                    .ok_or_else(|| RenderError::HostNotFound(selector.clone()))?;
                (native, None)
            }
            None => {
                let tag = tag.ok_or_else(|| RenderError::MissingHostName(def.name.clone()))?;
                let attrs = def
                    .selectors
                    .first()
                    .map(extract_attrs_and_classes_from_selector)
                    .filter(|attrs| !attrs.is_empty());
                (renderer.create_element(tag, None), attrs)
            }
        };
        if let Some(attrs) = &attrs {
            set_up_attributes(&*renderer, host_native, attrs);
        }

        let host = self.create_node(
            Some(0),
            Some(host_native),
            NodePayload::Element { component_view: None },
            || TData::Node(Rc::new(RefCell::new(TNode::new(TNodeKind::Element, tag, attrs)))),
        );
        let instance = self.directive_create(1, def);
        self.element_end();

        for feature in &options.features {
            feature(&instance, def);
        }
        self.refresh_descendants(self.current_view())?;
        Ok((host, host_native, instance))
    }

    /// Checks the component and everything below it.
    pub fn detect_changes(&mut self, component: &ComponentRef) -> Result<()> {
        if self.views.get(component.root_view).is_none() {
            return Err(RenderError::Destroyed);
        }
        let factory = self.renderer_factory.clone();
        factory.begin();
        let root_view = component.root_view;
        let result = self.in_view(root_view, None, |rt| rt.refresh_descendants(root_view));
        factory.end();
        result
    }

    /// Destroys the component's views, running cleanup and `on_destroy`
    /// hooks, and releases the host element.
    pub fn destroy_component(&mut self, component: ComponentRef) -> Result<()> {
        let Some(lview) = self.views.get(component.root_view) else {
            return Err(RenderError::Destroyed);
        };
        let renderer = lview.renderer.clone();
        let result = self.destroy_view_tree(component.root_view);
        renderer.destroy_node(component.host_native);
        debug!(host = ?component.host, "destroy component");
        result
    }
}
