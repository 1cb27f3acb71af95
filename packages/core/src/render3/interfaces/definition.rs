//! Directive and component definitions.
//!
//! Definitions are built once per type and shared by every instance. The
//! only state they carry after construction is the lazily created static
//! data of a component template.

use std::any::{type_name, Any};
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};

use indexmap::IndexMap;

use crate::core::{LifecycleHooks, RenderFlags, ViewEncapsulation};
use crate::error::{RenderError, Result};
use crate::render3::event_emitter::EventEmitter;
use crate::render3::interfaces::projection::CssSelectorList;
use crate::render3::interfaces::view::TView;
use crate::render3::runtime::Runtime;
use crate::render3::value::Value;

static NEXT_ELEMENT_ID: AtomicUsize = AtomicUsize::new(0);

/// Upcast helper so templates can recover their concrete context type.
pub trait AsAny {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A directive or component instance.
///
/// Hooks only run when the matching [`LifecycleHooks`] flag is set on the
/// definition.
pub trait Directive: AsAny {
    /// Receives an input by its declared (private) name.
    fn set_input(&mut self, _name: &str, _value: Value) {}

    /// Looks up an output by its declared (private) name.
    fn output(&self, _name: &str) -> Option<EventEmitter> {
        None
    }

    fn on_init(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn do_check(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn after_content_init(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn after_content_checked(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn after_view_init(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn after_view_checked(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn on_destroy(&mut self) -> anyhow::Result<()> {
        Ok(())
    }
}

pub type DirectiveRef = Rc<RefCell<dyn Directive>>;

pub type DirectiveFactory = Rc<dyn Fn() -> DirectiveRef>;

/// Compiled template: `(runtime, flags, context)`.
pub type TemplateFn = Rc<dyn Fn(&mut Runtime, RenderFlags, &dyn Directive) -> Result<()>>;

/// Recovers the concrete type of a directive instance.
pub fn downcast_directive<T: 'static>(directive: &dyn Directive) -> Option<&T> {
    directive.as_any().downcast_ref::<T>()
}

pub fn downcast_directive_mut<T: 'static>(directive: &mut dyn Directive) -> Option<&mut T> {
    directive.as_any_mut().downcast_mut::<T>()
}

pub struct DirectiveDef {
    id: usize,
    pub name: String,
    pub selectors: CssSelectorList,
    /// Public binding name to declared property name.
    pub inputs: IndexMap<String, String>,
    /// Public event name to declared property name.
    pub outputs: IndexMap<String, String>,
    pub hooks: LifecycleHooks,
    pub factory: DirectiveFactory,
    pub component: Option<ComponentDef>,
}

impl DirectiveDef {
    pub fn new<T, F>(name: &str, factory: F) -> Self
    where
        T: Directive + 'static,
        F: Fn() -> T + 'static,
    {
        DirectiveDef {
            id: NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed),
            name: name.to_string(),
            selectors: Vec::new(),
            inputs: IndexMap::new(),
            outputs: IndexMap::new(),
            hooks: LifecycleHooks::empty(),
            factory: Rc::new(move || Rc::new(RefCell::new(factory())) as DirectiveRef),
            component: None,
        }
    }

    pub fn with_selectors(mut self, selectors: CssSelectorList) -> Self {
        self.selectors = selectors;
        self
    }

    pub fn with_input(mut self, public_name: &str, declared_name: &str) -> Self {
        self.inputs
            .insert(public_name.to_string(), declared_name.to_string());
        self
    }

    pub fn with_output(mut self, public_name: &str, declared_name: &str) -> Self {
        self.outputs
            .insert(public_name.to_string(), declared_name.to_string());
        self
    }

    pub fn with_hooks(mut self, hooks: LifecycleHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn with_component(mut self, component: ComponentDef) -> Self {
        self.component = Some(component);
        self
    }

    /// Unique per definition; hashed into bloom filters.
    pub fn element_id(&self) -> usize {
        self.id
    }

    pub fn is_component(&self) -> bool {
        self.component.is_some()
    }

    pub fn create_instance(&self) -> DirectiveRef {
        (self.factory)()
    }

    /// Tag used when the runtime creates a host element for this component:
    /// the explicit tag, else the element of the first selector.
    pub fn host_tag(&self) -> Option<&str> {
        let component = self.component.as_ref()?;
        if let Some(tag) = component.tag.as_deref() {
            return Some(tag);
        }
        self.selectors
            .first()
            .and_then(|selector| selector.first())
            .and_then(|token| token.as_value())
            .filter(|tag| !tag.is_empty())
    }
}

impl fmt::Debug for DirectiveDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectiveDef")
            .field("name", &self.name)
            .field("selectors", &self.selectors)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("hooks", &self.hooks)
            .field("component", &self.component.is_some())
            .finish()
    }
}

pub struct ComponentDef {
    pub tag: Option<String>,
    pub template: TemplateFn,
    pub encapsulation: ViewEncapsulation,
    /// Structural slots the template declares; sizes `LView::data` up front.
    pub decls: usize,
    /// Binding slots the template declares.
    pub vars: usize,
    /// Directives matched against elements created by this template.
    pub directive_defs: Vec<Rc<DirectiveDef>>,
    tview: RefCell<Option<Rc<RefCell<TView>>>>,
}

impl ComponentDef {
    pub fn new<C, F>(template: F) -> Self
    where
        C: Directive + 'static,
        F: Fn(&mut Runtime, RenderFlags, &C) -> Result<()> + 'static,
    {
        let context_name = type_name::<C>();
        let template: TemplateFn = Rc::new(move |rt: &mut Runtime, rf: RenderFlags, ctx: &dyn Directive| {
            match downcast_directive::<C>(ctx) {
                Some(ctx) => template(rt, rf, ctx),
                None => Err(RenderError::ContextMismatch(context_name.to_string())),
            }
        });
        ComponentDef {
            tag: None,
            template,
            encapsulation: ViewEncapsulation::default(),
            decls: 0,
            vars: 0,
            directive_defs: Vec::new(),
            tview: RefCell::new(None),
        }
    }

    pub fn with_tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn with_encapsulation(mut self, encapsulation: ViewEncapsulation) -> Self {
        self.encapsulation = encapsulation;
        self
    }

    pub fn with_consts(mut self, decls: usize, vars: usize) -> Self {
        self.decls = decls;
        self.vars = vars;
        self
    }

    pub fn with_directives(mut self, defs: Vec<Rc<DirectiveDef>>) -> Self {
        self.directive_defs = defs;
        self
    }

    /// Static data shared by every instance of this template.
    pub fn tview(&self) -> Rc<RefCell<TView>> {
        self.tview
            .borrow_mut()
            .get_or_insert_with(|| Rc::new(RefCell::new(TView::new(self.directive_defs.clone()))))
            .clone()
    }
}
