//! Lifecycle hooks and the refresh of child views.

use tracing::trace;

use crate::core::{LifecycleHooks, RenderFlags};
use crate::error::Result;
use crate::render3::interfaces::definition::Directive;
use crate::render3::interfaces::node::NodeId;
use crate::render3::interfaces::view::{Slot, ViewId};
use crate::render3::runtime::Runtime;

#[derive(Debug, Clone, Copy)]
enum Hook {
    OnInit,
    DoCheck,
    AfterContentInit,
    AfterContentChecked,
    AfterViewInit,
    AfterViewChecked,
}

impl Hook {
    fn flag(self) -> LifecycleHooks {
        match self {
            Hook::OnInit => LifecycleHooks::ON_INIT,
            Hook::DoCheck => LifecycleHooks::DO_CHECK,
            Hook::AfterContentInit => LifecycleHooks::AFTER_CONTENT_INIT,
            Hook::AfterContentChecked => LifecycleHooks::AFTER_CONTENT_CHECKED,
            Hook::AfterViewInit => LifecycleHooks::AFTER_VIEW_INIT,
            Hook::AfterViewChecked => LifecycleHooks::AFTER_VIEW_CHECKED,
        }
    }

    fn call(self, directive: &mut dyn Directive) -> anyhow::Result<()> {
        match self {
            Hook::OnInit => directive.on_init(),
            Hook::DoCheck => directive.do_check(),
            Hook::AfterContentInit => directive.after_content_init(),
            Hook::AfterContentChecked => directive.after_content_checked(),
            Hook::AfterViewInit => directive.after_view_init(),
            Hook::AfterViewChecked => directive.after_view_checked(),
        }
    }
}

impl Runtime {
    /// Runs after a view's template: init and check hooks of the view's
    /// directives, then content hooks, then the views of child components,
    /// then view hooks. `*_init` hooks run on the first pass only.
    pub(crate) fn refresh_descendants(&mut self, view: ViewId) -> Result<()> {
        let first_pass = self.views[view].creation_mode;

        if first_pass {
            self.call_hooks(view, Hook::OnInit)?;
        }
        self.call_hooks(view, Hook::DoCheck)?;
        if first_pass {
            self.call_hooks(view, Hook::AfterContentInit)?;
        }
        self.call_hooks(view, Hook::AfterContentChecked)?;

        for host in self.views[view].components.clone() {
            self.refresh_component(host)?;
        }

        if first_pass {
            self.call_hooks(view, Hook::AfterViewInit)?;
        }
        self.call_hooks(view, Hook::AfterViewChecked)
    }

    /// Runs the template of the component hosted on `host`, then refreshes
    /// its descendants.
    pub(crate) fn refresh_component(&mut self, host: NodeId) -> Result<()> {
        let Some(component_view) = self.nodes[host].component_view() else {
            return Ok(());
        };
        let lview = &self.views[component_view];
        let (Some(template), Some(context)) = (lview.template.clone(), lview.context.clone()) else {
            return Ok(());
        };
        trace!(?host, ?component_view, "refresh component");

        self.in_view(component_view, Some(host), |rt| {
            let flags = if rt.state.creation_mode {
                RenderFlags::CREATE | RenderFlags::UPDATE
            } else {
                RenderFlags::UPDATE
            };
            {
                let context = context.borrow();
                template(rt, flags, &*context)?;
            }
            rt.refresh_descendants(component_view)
        })
    }

    fn call_hooks(&mut self, view: ViewId, hook: Hook) -> Result<()> {
        for index in self.views[view].directives.clone() {
            let Some(def) = self.directive_def_at(view, index) else {
                continue;
            };
            if !def.hooks.contains(hook.flag()) {
                continue;
            }
            let instance = match self.views[view].data.get(index) {
                Some(Slot::Directive { instance, .. }) => instance.clone(),
                _ => continue,
            };
            hook.call(&mut *instance.borrow_mut())?;
        }
        Ok(())
    }
}
