//! Component Tests
//!
//! Bootstrapping root components, change detection and teardown.

use std::rc::Rc;

use angular_core::core::{LifecycleHooks, SelectorFlags};
use angular_core::css_selector;
use angular_core::render3::{
    downcast_directive_mut, ComponentDef, CreateComponentOptions, Directive, DirectiveDef, DirectiveRef, Value,
};
use angular_core::RenderError;

#[path = "util/renderer.rs"]
mod renderer_util;
use renderer_util::{component_def, new_runtime, render, MockRendererFactory};

struct Empty;

impl Directive for Empty {}

struct Greeting {
    id: &'static str,
    value: Value,
}

impl Directive for Greeting {}

/// `<span [id]="id">_{{value}}_</span>`
fn greeting_component() -> Rc<DirectiveDef> {
    component_def(
        "greeting-comp",
        || Greeting {
            id: "one",
            value: Value::from(1),
        },
        |rt, rf, ctx: &Greeting| {
            if rf.is_create() {
                rt.element_start(0, "span", None)?;
                rt.text(1, None);
                rt.element_end();
            }
            if rf.is_update() {
                let id = rt.bind(ctx.id);
                rt.element_property(0, "id", id);
                let text = rt.bind1("_", ctx.value.clone(), "_");
                rt.text_binding(1, text);
            }
            Ok(())
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    mod render_component {
        use super::*;

        #[test]
        fn should_render_and_update_only_changed_bindings() {
            let (mut rt, factory, component) = render(&greeting_component());
            assert_eq!(
                factory.renderer.outer_html(component.host_native),
                r#"<greeting-comp><span id="one">_1_</span></greeting-comp>"#
            );
            assert_eq!(factory.renderer.calls("set_property"), vec!["set_property id=one"]);
            assert_eq!(factory.renderer.calls("set_value"), vec!["set_value _1_"]);

            factory.renderer.clear_log();
            component
                .with_instance::<Greeting, _>(|greeting| greeting.value = Value::from(2))
                .unwrap();
            rt.detect_changes(&component).unwrap();
            assert_eq!(factory.renderer.log(), vec!["set_value _2_"]);

            factory.renderer.clear_log();
            rt.detect_changes(&component).unwrap();
            assert!(factory.renderer.log().is_empty());
        }

        #[test]
        fn should_render_host_attributes_from_the_selector() {
            let def = Rc::new(
                DirectiveDef::new("Selected", || Empty)
                    .with_selectors(vec![css_selector!["my-comp", "role", "main", SelectorFlags::CLASS, "x"]])
                    .with_component(ComponentDef::new::<Empty, _>(|_rt, _rf, _ctx| Ok(()))),
            );
            let (_rt, factory, component) = render(&def);
            assert_eq!(
                factory.renderer.outer_html(component.host_native),
                r#"<my-comp role="main" class="x"></my-comp>"#
            );
        }

        #[test]
        fn should_render_into_an_existing_host() {
            let (mut rt, factory) = new_runtime();
            let host = factory.renderer.create_root("greeting-comp");

            let component = rt
                .render_component(
                    &greeting_component(),
                    CreateComponentOptions::default().with_host("greeting-comp"),
                )
                .unwrap();
            assert_eq!(component.host_native, host);
            assert_eq!(factory.renderer.inner_html(host), r#"<span id="one">_1_</span>"#);
            assert!(factory.renderer.calls("create_element greeting-comp").is_empty());
        }

        #[test]
        fn should_run_features_before_the_first_check() {
            let (mut rt, factory) = new_runtime();
            let feature = |instance: &DirectiveRef, def: &DirectiveDef| {
                assert_eq!(def.name, "greeting-comp");
                if let Some(greeting) = downcast_directive_mut::<Greeting>(&mut *instance.borrow_mut()) {
                    greeting.value = Value::from("feature");
                }
            };
            let options = CreateComponentOptions::default().with_feature(Rc::new(feature));

            let component = rt.render_component(&greeting_component(), options).unwrap();
            assert_eq!(
                factory.renderer.inner_html(component.host_native),
                r#"<span id="one">_feature_</span>"#
            );
        }

        #[test]
        fn should_use_the_renderer_factory_of_the_options() {
            let (mut rt, default_factory) = new_runtime();
            let factory = MockRendererFactory::new();

            let component = rt
                .render_component(
                    &greeting_component(),
                    CreateComponentOptions::default().with_renderer_factory(factory.clone()),
                )
                .unwrap();
            assert!(factory.renderers_created.get() > 0);
            assert_eq!(default_factory.renderers_created.get(), 0);
            assert_eq!(factory.renderer.inner_html(component.host_native), r#"<span id="one">_1_</span>"#);
        }

        #[test]
        fn should_bracket_passes_with_begin_and_end() {
            let (mut rt, factory, component) = render(&greeting_component());
            assert_eq!((factory.begin_count.get(), factory.end_count.get()), (1, 1));

            rt.detect_changes(&component).unwrap();
            assert_eq!((factory.begin_count.get(), factory.end_count.get()), (2, 2));
        }

        #[test]
        fn should_share_static_data_between_instances() {
            let def = greeting_component();
            let (mut rt, _factory) = new_runtime();
            let first = rt.render_component(&def, CreateComponentOptions::default()).unwrap();
            let second = rt.render_component(&def, CreateComponentOptions::default()).unwrap();

            let first_view = rt.node(first.host).component_view().unwrap();
            let second_view = rt.node(second.host).component_view().unwrap();
            assert_ne!(first_view, second_view);
            assert!(Rc::ptr_eq(&rt.view(first_view).tview, &rt.view(second_view).tview));
            assert!(Rc::ptr_eq(
                &rt.view(first_view).tview,
                &def.component.as_ref().unwrap().tview()
            ));
        }

        #[test]
        fn should_render_child_components_inside_their_host() {
            let child = component_def("child-comp", || Empty, |rt, rf, _ctx: &Empty| {
                if rf.is_create() {
                    rt.element_start(0, "b", None)?;
                    rt.text(1, Some("hi"));
                    rt.element_end();
                }
                Ok(())
            });
            let parent = component_def("parent-comp", || Empty, move |rt, rf, _ctx: &Empty| {
                if rf.is_create() {
                    rt.element_start(0, &child, None)?;
                    rt.element_end();
                }
                Ok(())
            });
            let (_rt, factory, component) = render(&parent);
            assert_eq!(
                factory.renderer.inner_html(component.host_native),
                "<child-comp><b>hi</b></child-comp>"
            );
        }

        #[test]
        fn should_expose_the_instance_by_type() {
            let (_rt, _factory, component) = render(&greeting_component());
            assert_eq!(component.with_instance::<Greeting, _>(|greeting| greeting.id), Some("one"));
            assert_eq!(component.with_instance::<Empty, _>(|_| ()), None);
        }
    }

    mod errors {
        use super::*;

        #[test]
        fn should_reject_definitions_without_a_template() {
            let (mut rt, _factory) = new_runtime();
            let def = Rc::new(DirectiveDef::new("Plain", || Empty));
            let err = rt.render_component(&def, CreateComponentOptions::default()).unwrap_err();
            assert!(matches!(err, RenderError::NotAComponent(name) if name == "Plain"));
        }

        #[test]
        fn should_require_a_host_tag() {
            let (mut rt, _factory) = new_runtime();
            let def = Rc::new(
                DirectiveDef::new("Tagless", || Empty)
                    .with_component(ComponentDef::new::<Empty, _>(|_rt, _rf, _ctx| Ok(()))),
            );
            let err = rt.render_component(&def, CreateComponentOptions::default()).unwrap_err();
            assert!(matches!(err, RenderError::MissingHostName(name) if name == "Tagless"));
            assert_eq!(rt.view_count(), 0);
        }

        #[test]
        fn should_require_a_host_tag_for_child_components() {
            let tagless = Rc::new(
                DirectiveDef::new("Tagless", || Empty)
                    .with_component(ComponentDef::new::<Empty, _>(|_rt, _rf, _ctx| Ok(()))),
            );
            let parent = component_def("parent-comp", || Empty, move |rt, rf, _ctx: &Empty| {
                if rf.is_create() {
                    rt.element_start(0, &tagless, None)?;
                    rt.element_end();
                }
                Ok(())
            });
            let (mut rt, _factory) = new_runtime();
            let err = rt.render_component(&parent, CreateComponentOptions::default()).unwrap_err();
            assert!(matches!(err, RenderError::MissingHostName(name) if name == "Tagless"));
        }

        #[test]
        fn should_report_a_missing_host_element() {
            let (mut rt, _factory) = new_runtime();
            let err = rt
                .render_component(&greeting_component(), CreateComponentOptions::default().with_host("nowhere"))
                .unwrap_err();
            assert!(matches!(err, RenderError::HostNotFound(selector) if selector == "nowhere"));
        }

        struct Broken;

        impl Directive for Broken {
            fn on_init(&mut self) -> anyhow::Result<()> {
                anyhow::bail!("broken component")
            }
        }

        #[test]
        fn should_release_everything_when_the_first_check_fails() {
            let def = Rc::new(
                DirectiveDef::new("Broken", || Broken)
                    .with_hooks(LifecycleHooks::ON_INIT)
                    .with_component(
                        ComponentDef::new::<Broken, _>(|rt, rf, _ctx| {
                            if rf.is_create() {
                                rt.element_start(0, "div", None)?;
                                rt.element_end();
                            }
                            Ok(())
                        })
                        .with_tag("broken-comp"),
                    ),
            );
            let (mut rt, factory) = new_runtime();
            let err = rt.render_component(&def, CreateComponentOptions::default()).unwrap_err();
            assert_eq!(err.to_string(), "broken component");
            assert_eq!(rt.node_count(), 0);
            assert_eq!(rt.view_count(), 0);
            assert_eq!(factory.end_count.get(), 1);
        }

        struct Stubborn;

        impl Directive for Stubborn {
            fn on_init(&mut self) -> anyhow::Result<()> {
                anyhow::bail!("broken component")
            }

            fn on_destroy(&mut self) -> anyhow::Result<()> {
                anyhow::bail!("destroy failed")
            }
        }

        #[test]
        fn should_report_the_first_check_error_over_teardown_errors() {
            let def = Rc::new(
                DirectiveDef::new("Stubborn", || Stubborn)
                    .with_hooks(LifecycleHooks::ON_INIT | LifecycleHooks::ON_DESTROY)
                    .with_component(ComponentDef::new::<Stubborn, _>(|_rt, _rf, _ctx| Ok(())).with_tag("stubborn-comp")),
            );
            let (mut rt, _factory) = new_runtime();
            let err = rt.render_component(&def, CreateComponentOptions::default()).unwrap_err();
            assert_eq!(err.to_string(), "broken component");
            assert_eq!(rt.node_count(), 0);
            assert_eq!(rt.view_count(), 0);
        }
    }

    mod teardown {
        use super::*;

        #[test]
        fn should_release_views_nodes_and_the_host() {
            let (mut rt, factory, component) = render(&greeting_component());
            let host_native = component.host_native;
            factory.renderer.clear_log();

            rt.destroy_component(component).unwrap();
            assert_eq!(factory.renderer.log(), vec![format!("destroy_node {}", host_native.0)]);
            assert_eq!(rt.node_count(), 0);
            assert_eq!(rt.view_count(), 0);
        }

        #[test]
        fn should_reject_handles_to_a_destroyed_component() {
            let (mut rt, _factory, component) = render(&greeting_component());
            let stale = component.clone();
            rt.destroy_component(component).unwrap();
            assert!(matches!(rt.detect_changes(&stale), Err(RenderError::Destroyed)));

            // The freed slots are handed to the next component.
            let fresh = rt
                .render_component(&greeting_component(), CreateComponentOptions::default())
                .unwrap();
            assert!(matches!(rt.detect_changes(&stale), Err(RenderError::Destroyed)));
            assert!(matches!(rt.destroy_component(stale), Err(RenderError::Destroyed)));
            rt.detect_changes(&fresh).unwrap();
            assert_eq!(rt.view_count(), 2);
        }
    }

    mod debug {
        use super::*;

        #[test]
        fn should_snapshot_the_view_tree() {
            let (rt, _factory, component) = render(&greeting_component());
            let snapshot = rt.debug_view(component.root_view);

            assert_eq!(snapshot["type"], "View");
            assert_eq!(snapshot["creationMode"], false);
            let host = &snapshot["nodes"][0];
            assert_eq!(host["type"], "Element");
            assert_eq!(host["tag"], "greeting-comp");
            assert_eq!(host["directives"], 1);

            let view = &host["componentView"];
            assert_eq!(view["nodes"][0]["tag"], "span");
            assert_eq!(view["nodes"][0]["children"][0]["type"], "Text");
            assert_eq!(view["bindings"][0], "one");
            assert_eq!(view["bindings"][1], serde_json::json!(["1"]));
        }
    }
}
