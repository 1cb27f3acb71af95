//! Content Projection Tests
//!
//! Distribution of a component's light DOM into `<ng-content>` slots.

use std::rc::Rc;

use angular_core::attrs;
use angular_core::core::AttributeMarker;
use angular_core::css_selector;
use angular_core::render3::interfaces::view::Slot;
use angular_core::render3::{ComponentRef, CssSelectorList, Directive, DirectiveDef, NodeId, Runtime, ViewId};

#[path = "util/renderer.rs"]
mod renderer_util;
use renderer_util::{component_def, render};

struct Empty;

impl Directive for Empty {}

/// `<main><ng-content select="..."></ng-content></main><ng-content></ng-content>`
///
/// With selectors, the first selector's bucket goes inside `<main>` and the
/// default bucket after it.
fn child_component(selectors: Option<Vec<CssSelectorList>>) -> Rc<DirectiveDef> {
    component_def("child-comp", || Empty, move |rt, rf, _ctx: &Empty| {
        if rf.is_create() {
            rt.projection_def(0, selectors.as_deref());
            rt.element_start(1, "main", None)?;
            let mut next = 2;
            if selectors.is_some() {
                rt.content_projection(next, 0, 1);
                next += 1;
            }
            rt.element_end();
            rt.content_projection(next, 0, 0);
        }
        Ok(())
    })
}

/// `<child-comp><span></span><div></div></child-comp>`
fn parent_component(child: Rc<DirectiveDef>) -> Rc<DirectiveDef> {
    component_def("parent-comp", || Empty, move |rt, rf, _ctx: &Empty| {
        if rf.is_create() {
            rt.element_start(0, &child, None)?;
            rt.element_start(2, "span", None)?;
            rt.element_end();
            rt.element_start(3, "div", None)?;
            rt.element_end();
            rt.element_end();
        }
        Ok(())
    })
}

fn component_view(rt: &Runtime, host: NodeId) -> ViewId {
    rt.node(host).component_view().unwrap()
}

/// Host of the child component and its component view.
fn child_of(rt: &Runtime, parent: &ComponentRef) -> (NodeId, ViewId) {
    let parent_view = component_view(rt, parent.host);
    let child_host = rt.view(parent_view).data[0].as_node().unwrap();
    (child_host, component_view(rt, child_host))
}

fn buckets(rt: &Runtime, view: ViewId, index: usize) -> Vec<Vec<NodeId>> {
    match &rt.view(view).data[index] {
        Slot::Projection(buckets) => buckets.clone(),
        other => panic!("expected projection buckets, found {:?}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_distribute_by_first_matching_selector() {
        let child = child_component(Some(vec![vec![css_selector!["span"]]]));
        let (rt, factory, component) = render(&parent_component(child));

        let parent_view = component_view(&rt, component.host);
        let span = rt.view(parent_view).data[2].as_node().unwrap();
        let div = rt.view(parent_view).data[3].as_node().unwrap();
        let (_, child_view) = child_of(&rt, &component);

        let buckets = buckets(&rt, child_view, 0);
        assert_eq!(buckets, vec![vec![div], vec![span]]);
        assert_eq!(
            factory.renderer.inner_html(component.host_native),
            "<child-comp><main><span></span></main><div></div></child-comp>"
        );
    }

    #[test]
    fn should_put_everything_in_the_default_bucket_without_selectors() {
        let (rt, factory, component) = render(&parent_component(child_component(None)));

        let parent_view = component_view(&rt, component.host);
        let span = rt.view(parent_view).data[2].as_node().unwrap();
        let div = rt.view(parent_view).data[3].as_node().unwrap();
        let (_, child_view) = child_of(&rt, &component);

        assert_eq!(buckets(&rt, child_view, 0), vec![vec![span, div]]);
        assert_eq!(
            factory.renderer.inner_html(component.host_native),
            "<child-comp><main></main><span></span><div></div></child-comp>"
        );
    }

    #[test]
    fn should_not_render_light_dom_before_projection() {
        let child = component_def("blank-comp", || Empty, |_rt, _rf, _ctx: &Empty| Ok(()));
        let (_rt, factory, component) = render(&parent_component(child));
        // Light DOM is only attached by content_projection.
        assert_eq!(
            factory.renderer.inner_html(component.host_native),
            "<blank-comp></blank-comp>"
        );
    }

    #[test]
    fn should_put_text_nodes_in_the_default_bucket() {
        let child = child_component(Some(vec![vec![css_selector![""]]]));
        let parent = component_def("text-parent", || Empty, move |rt, rf, _ctx: &Empty| {
            if rf.is_create() {
                rt.element_start(0, &child, None)?;
                rt.text(2, Some("hello"));
                rt.element_end();
            }
            Ok(())
        });
        let (rt, factory, component) = render(&parent);

        let (_, child_view) = child_of(&rt, &component);
        let buckets = buckets(&rt, child_view, 0);
        assert_eq!(buckets[0].len(), 1);
        assert!(buckets[1].is_empty());
        assert_eq!(
            factory.renderer.inner_html(component.host_native),
            "<child-comp><main></main>hello</child-comp>"
        );
    }

    #[test]
    fn should_match_by_project_as_instead_of_own_attributes() {
        let child = child_component(Some(vec![vec![css_selector!["", "title", ""]]]));
        let parent = component_def("project-as-parent", || Empty, move |rt, rf, _ctx: &Empty| {
            if rf.is_create() {
                rt.element_start(0, &child, None)?;
                rt.element_start(
                    2,
                    "span",
                    Some(attrs![AttributeMarker::ProjectAs, css_selector!["", "title", ""]]),
                )?;
                rt.element_end();
                rt.element_start(
                    3,
                    "b",
                    Some(attrs!["title", "x", AttributeMarker::ProjectAs, css_selector!["b"]]),
                )?;
                rt.element_end();
                rt.element_end();
            }
            Ok(())
        });
        let (_rt, factory, component) = render(&parent);
        assert_eq!(
            factory.renderer.inner_html(component.host_native),
            r#"<child-comp><main><span></span></main><b title="x"></b></child-comp>"#
        );
    }

    #[test]
    fn should_flatten_reprojected_content() {
        // <outer-comp>: <middle-comp><ng-content></ng-content></middle-comp>
        // <middle-comp>: <section><ng-content></ng-content></section>
        let middle = component_def("middle-comp", || Empty, |rt, rf, _ctx: &Empty| {
            if rf.is_create() {
                rt.projection_def(0, None);
                rt.element_start(1, "section", None)?;
                rt.content_projection(2, 0, 0);
                rt.element_end();
            }
            Ok(())
        });
        let outer = component_def("outer-comp", || Empty, move |rt, rf, _ctx: &Empty| {
            if rf.is_create() {
                rt.projection_def(0, None);
                rt.element_start(1, &middle, None)?;
                rt.content_projection(3, 0, 0);
                rt.element_end();
            }
            Ok(())
        });
        let app = component_def("app-comp", || Empty, move |rt, rf, _ctx: &Empty| {
            if rf.is_create() {
                rt.element_start(0, &outer, None)?;
                rt.text(2, Some("content"));
                rt.element_end();
            }
            Ok(())
        });
        let (_rt, factory, component) = render(&app);
        assert_eq!(
            factory.renderer.inner_html(component.host_native),
            "<outer-comp><middle-comp><section>content</section></middle-comp></outer-comp>"
        );
    }

    #[test]
    fn should_compute_buckets_once() {
        let child = child_component(Some(vec![vec![css_selector!["span"]]]));
        let (mut rt, factory, component) = render(&parent_component(child));
        let (_, child_view) = child_of(&rt, &component);
        let before = buckets(&rt, child_view, 0);
        factory.renderer.clear_log();

        rt.detect_changes(&component).unwrap();
        assert_eq!(buckets(&rt, child_view, 0), before);
        assert!(factory.renderer.log().is_empty());
    }
}
