// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The route view: picks what to render at its nesting depth.

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::string::String;
use core::{fmt, ptr};

use crate::binding::{ConflictHandling, InstanceBinding, LifecycleEvents, LifecycleHooks};
use crate::context::RenderContext;
use crate::location::RouteLocation;
use crate::name::ViewName;
use crate::node::{KeepAlive, SlotChild, SlotChildren, SlottedNode, ViewHost, ViewNode};
use crate::props::Props;
use crate::reactive::{Memo, Observable, Revision};
use crate::record::MatchedRecord;

/// What a slot sees when it is asked to render.
pub struct SlotScope<'a, H: ViewHost> {
    /// The component resolved for this view.
    pub component: &'a H::Component,
    /// The route the view rendered for.
    pub route: &'a Rc<RouteLocation<H>>,
}

impl<H: ViewHost> fmt::Debug for SlotScope<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotScope")
            .field("component", self.component)
            .field("route", &self.route.path())
            .finish()
    }
}

/// Slot callback signature.
pub type SlotFn<H> = dyn FnMut(SlotScope<'_, H>) -> SlotChildren<H>;

/// Why a render produced nothing. None of these are failures.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EmptyReason {
    /// The matched chain is not deep enough for this view.
    NoMatchAtDepth,
    /// The record at this depth has no component under the view's name.
    NoComponentForName,
    /// The slot returned only placeholders.
    EmptySlot,
    /// The slot returned a keep-alive wrapper with no cached child.
    NoCachedChild,
}

/// A recoverable oddity noticed while rendering.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Advisory {
    /// The slot returned more than one root; only the first was used.
    MultipleSlotRoots {
        /// Number of non-placeholder roots returned.
        count: usize,
    },
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MultipleSlotRoots { count } => write!(
                f,
                "route view expects exactly one slot root but received {count}; \
                 the first is used and the rest are ignored"
            ),
        }
    }
}

/// The result of [`RouteView::render`].
pub struct Rendered<H: ViewHost> {
    node: Option<ViewNode<H>>,
    empty: Option<EmptyReason>,
    advisory: Option<Advisory>,
}

impl<H: ViewHost> Rendered<H> {
    fn node(node: ViewNode<H>) -> Self {
        Self {
            node: Some(node),
            empty: None,
            advisory: None,
        }
    }

    fn empty(reason: EmptyReason) -> Self {
        Self {
            node: None,
            empty: Some(reason),
            advisory: None,
        }
    }

    fn with_advisory(mut self, advisory: Option<Advisory>) -> Self {
        self.advisory = advisory;
        self
    }

    /// The node to build, if any.
    #[must_use]
    pub fn as_node(&self) -> Option<&ViewNode<H>> {
        self.node.as_ref()
    }

    /// Takes the node to build.
    #[must_use]
    pub fn into_node(self) -> Option<ViewNode<H>> {
        self.node
    }

    /// Returns `true` if nothing is to be rendered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.node.is_none()
    }

    /// Why nothing is rendered, when [`is_empty`](Self::is_empty).
    #[must_use]
    pub fn empty_reason(&self) -> Option<EmptyReason> {
        self.empty
    }

    /// A recoverable issue noticed while rendering.
    #[must_use]
    pub fn advisory(&self) -> Option<Advisory> {
        self.advisory
    }
}

impl<H: ViewHost> fmt::Debug for Rendered<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rendered")
            .field("node", &self.node)
            .field("empty", &self.empty)
            .field("advisory", &self.advisory)
            .finish()
    }
}

/// Identifies the route a view reads: its override when set, the ambient
/// route otherwise. Changes to one source do not invalidate the other.
///
/// The ambient cell is identified by address, so a view handed a context
/// backed by another cell recomputes even when both cells sit at the same
/// revision.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RouteStamp {
    Ambient(*const (), Revision),
    Override(Revision),
}

/// A slot root that survived placeholder filtering.
enum SlotRoot<H: ViewHost> {
    Node(H::Node),
    KeepAlive(KeepAlive<H>),
}

impl<H: ViewHost> SlotRoot<H> {
    fn from_child(child: SlotChild<H>) -> Option<Self> {
        match child {
            SlotChild::Placeholder => None,
            SlotChild::Node(node) => Some(Self::Node(node)),
            SlotChild::KeepAlive(keep_alive) => Some(Self::KeepAlive(keep_alive)),
        }
    }
}

/// Renders the component of the matched record at this view's depth.
///
/// A view's depth is fixed at creation from its [`RenderContext`]; views built
/// from [`child_context`](Self::child_context) render one level deeper, which
/// mirrors route nesting.
///
/// Record, component, and props are memoized against the route and name they
/// were derived from. In particular a props function runs once per
/// navigation, not once per render.
///
/// # Example
///
/// ```rust
/// use understory_route_view::{
///     MatchedRecord, Props, RenderContext, RouteCell, RouteLocation, RouteView, ViewHost,
///     ViewNode,
/// };
///
/// #[derive(Debug)]
/// struct Host;
/// impl ViewHost for Host {
///     type Component = &'static str;
///     type Instance = u32;
///     type Node = &'static str;
///     fn clone_with_props(&self, node: &Self::Node, _: &Props) -> Self::Node {
///         *node
///     }
/// }
///
/// let user = MatchedRecord::<Host>::new("/users/:id")
///     .with_component("default", "User")
///     .with_props("default", true)
///     .into_shared();
/// let current = RouteCell::new(
///     RouteLocation::new("/users/42")
///         .with_matched(user)
///         .with_param("id", "42")
///         .into_shared(),
/// );
///
/// let ctx = RenderContext::root(&current);
/// let mut view = RouteView::new(&ctx);
/// let rendered = view.render(&ctx, &Host);
///
/// let Some(ViewNode::Direct { component, props, .. }) = rendered.as_node() else {
///     panic!("expected a direct node");
/// };
/// assert_eq!(*component, "User");
/// assert_eq!(props, &Props::new().with("id", "42"));
/// ```
pub struct RouteView<H: ViewHost> {
    depth: usize,
    name: Observable<ViewName>,
    route_override: Observable<Option<Rc<RouteLocation<H>>>>,
    attrs: Props,
    slot: Option<Box<SlotFn<H>>>,
    conflict: ConflictHandling,
    matched: Memo<RouteStamp, Option<Rc<MatchedRecord<H>>>>,
    component: Memo<(RouteStamp, Revision), Option<H::Component>>,
    props: Memo<(RouteStamp, Revision), Props>,
}

impl<H: ViewHost> RouteView<H> {
    /// Creates a view at the depth `ctx` assigns, rendering the default name.
    #[must_use]
    pub fn new(ctx: &RenderContext<'_, H>) -> Self {
        Self {
            depth: ctx.depth(),
            name: Observable::new(ViewName::DEFAULT),
            route_override: Observable::new(None),
            attrs: Props::new(),
            slot: None,
            conflict: ConflictHandling::default(),
            matched: Memo::new(),
            component: Memo::new(),
            props: Memo::new(),
        }
    }

    /// Renders the view `name` of the matched record instead of the default.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<ViewName>) -> Self {
        self.set_name(name);
        self
    }

    /// Renders for `route` instead of the ambient current route.
    #[must_use]
    pub fn with_route(mut self, route: Rc<RouteLocation<H>>) -> Self {
        self.set_route(Some(route));
        self
    }

    /// Pass-through attributes merged over the resolved props.
    #[must_use]
    pub fn with_attrs(mut self, attrs: Props) -> Self {
        self.attrs = attrs;
        self
    }

    /// Customizes rendering through `slot`.
    #[must_use]
    pub fn with_slot(
        mut self,
        slot: impl FnMut(SlotScope<'_, H>) -> SlotChildren<H> + 'static,
    ) -> Self {
        self.slot = Some(Box::new(slot));
        self
    }

    /// Sets how attaching over a different live instance is handled.
    #[must_use]
    pub fn with_conflict_handling(mut self, conflict: ConflictHandling) -> Self {
        self.conflict = conflict;
        self
    }

    /// Changes the rendered view name.
    pub fn set_name(&mut self, name: impl Into<ViewName>) {
        self.name.set_if_changed(name.into());
    }

    /// Sets or clears the route override.
    pub fn set_route(&mut self, route: Option<Rc<RouteLocation<H>>>) {
        let unchanged = self.route_override.with(|current| match (current, &route) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        });
        if !unchanged {
            self.route_override.set(route);
        }
    }

    /// Replaces the pass-through attributes.
    pub fn set_attrs(&mut self, attrs: Props) {
        self.attrs = attrs;
    }

    /// This view's nesting depth.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The rendered view name.
    #[must_use]
    pub fn name(&self) -> ViewName {
        self.name.get()
    }

    /// The route this view renders for: its override, or the ambient route.
    #[must_use]
    pub fn route(&self, ctx: &RenderContext<'_, H>) -> Rc<RouteLocation<H>> {
        self.route_override
            .get()
            .unwrap_or_else(|| ctx.current_route().get())
    }

    fn route_stamp(&self, ctx: &RenderContext<'_, H>) -> RouteStamp {
        if self.route_override.with(Option::is_some) {
            RouteStamp::Override(self.route_override.revision())
        } else {
            let cell = ctx.current_route();
            RouteStamp::Ambient(ptr::from_ref(cell).cast(), cell.revision())
        }
    }

    /// The record matched at this view's depth.
    pub fn matched(&mut self, ctx: &RenderContext<'_, H>) -> Option<Rc<MatchedRecord<H>>> {
        let stamp = self.route_stamp(ctx);
        let route = self.route(ctx);
        let depth = self.depth;
        self.matched
            .get_or_update(stamp, || route.matched_at(depth).cloned())
            .clone()
    }

    /// The component registered under this view's name on the matched record.
    pub fn component(&mut self, ctx: &RenderContext<'_, H>) -> Option<H::Component> {
        let stamp = (self.route_stamp(ctx), self.name.revision());
        let record = self.matched(ctx);
        let name = self.name.get();
        let lookup = move || record?.component(name.as_str()).cloned();
        self.component.get_or_update(stamp, lookup).clone()
    }

    /// The props for the resolved component, without pass-through attributes.
    ///
    /// Returns `None`, without evaluating any props function, when no
    /// component resolves.
    pub fn props(&mut self, ctx: &RenderContext<'_, H>) -> Option<Props> {
        self.component(ctx)?;
        let record = self.matched(ctx)?;
        let stamp = (self.route_stamp(ctx), self.name.revision());
        let route = self.route(ctx);
        let name = self.name.get();
        let resolve = || record.resolve_props(name.as_str(), &route);
        Some(self.props.get_or_update(stamp, resolve).clone())
    }

    /// How many times props have been computed; for introspection.
    #[must_use]
    pub fn props_computations(&self) -> u64 {
        self.props.computations()
    }

    /// The context for views nested inside what this view renders.
    pub fn child_context<'a>(&mut self, ctx: &RenderContext<'a, H>) -> RenderContext<'a, H> {
        let matched = self.matched(ctx);
        ctx.nested(self.depth, matched)
    }

    /// Decides what to render for the current route.
    pub fn render(&mut self, ctx: &RenderContext<'_, H>, host: &H) -> Rendered<H> {
        let route = self.route(ctx);
        let record = self.matched(ctx);
        let has_record = record.is_some();
        // Hooks fire later, possibly after another navigation; they must use
        // the pair in effect now.
        let name = self.name.get();
        let binding = Rc::new(InstanceBinding::new(record, name, self.conflict));

        let Some(component) = self.component(ctx) else {
            let reason = if has_record {
                EmptyReason::NoComponentForName
            } else {
                EmptyReason::NoMatchAtDepth
            };
            return Rendered::empty(reason);
        };
        let mut props = self.props(ctx).unwrap_or_default();
        props.merge(&self.attrs);

        let Some(slot) = self.slot.as_mut() else {
            return Rendered::node(ViewNode::Direct {
                component,
                props,
                hooks: LifecycleHooks::new(binding, LifecycleEvents::all()),
            });
        };

        let mut roots = slot(SlotScope {
            component: &component,
            route: &route,
        })
        .into_iter()
        .filter_map(SlotRoot::from_child);
        let first = roots.next();
        let extra = roots.count();
        let advisory = match extra {
            0 => None,
            _ => Some(Advisory::MultipleSlotRoots { count: extra + 1 }),
        };
        if cfg!(debug_assertions) && extra > 0 {
            tracing::warn!(
                depth = self.depth,
                count = extra + 1,
                "route view expects exactly one slot root; using the first"
            );
        }

        let rendered = match first {
            None => Rendered::empty(EmptyReason::EmptySlot),
            Some(SlotRoot::Node(node)) => {
                let node = host.clone_with_props(&node, &props);
                let hooks = LifecycleHooks::new(binding, LifecycleEvents::all());
                Rendered::node(ViewNode::Slotted(SlottedNode::Plain { node, hooks }))
            }
            Some(SlotRoot::KeepAlive(keep_alive)) => match keep_alive.into_parts() {
                (_, None) => Rendered::empty(EmptyReason::NoCachedChild),
                (wrapper, Some(child)) => {
                    let child = host.clone_with_props(&child, &props);
                    let keep_alive = KeepAlive::new(wrapper, Some(child));
                    let shared = Rc::clone(&binding);
                    let wrapper_hooks = LifecycleHooks::new(shared, LifecycleEvents::DETACH);
                    let child_hooks = LifecycleHooks::new(binding, LifecycleEvents::ATTACH);
                    Rendered::node(ViewNode::Slotted(SlottedNode::CachedWrapper {
                        keep_alive,
                        wrapper_hooks,
                        child_hooks,
                    }))
                }
            },
        };
        rendered.with_advisory(advisory)
    }
}

impl<H: ViewHost> fmt::Debug for RouteView<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let route_override = self.route_override.get().map(|r| String::from(r.path()));
        f.debug_struct("RouteView")
            .field("depth", &self.depth)
            .field("name", &self.name)
            .field("route_override", &route_override)
            .field("attrs", &self.attrs)
            .field("slot", &self.slot.is_some())
            .field("conflict", &self.conflict)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::RouteCell;
    use crate::props::{PropValue, PropsDescriptor};
    use crate::testing::{TestHost, TestNode, record};
    use alloc::vec::Vec;
    use core::cell::{Cell, RefCell};
    use smallvec::smallvec;

    type Record = Rc<MatchedRecord<TestHost>>;

    fn located(path: &'static str, record: Record) -> RouteCell<TestHost> {
        RouteCell::new(RouteLocation::new(path).with_matched(record).into_shared())
    }

    fn counting_props_record(calls: Rc<Cell<u32>>) -> Record {
        let props = PropsDescriptor::computed(move |route: &RouteLocation<TestHost>| {
            calls.set(calls.get() + 1);
            Props::new().with("path", route.path())
        });
        MatchedRecord::new("/users/:id")
            .with_component("default", "User")
            .with_props("default", props)
            .into_shared()
    }

    #[test]
    fn props_function_runs_once_per_navigation() {
        let calls = Rc::new(Cell::new(0));
        let user = counting_props_record(calls.clone());
        let cell = located("/users/1", user.clone());
        let ctx = RenderContext::root(&cell);
        let mut view = RouteView::new(&ctx);

        let _ = view.render(&ctx, &TestHost);
        view.set_attrs(Props::new().with("class", "wide"));
        let _ = view.render(&ctx, &TestHost);
        assert_eq!(calls.get(), 1);
        assert_eq!(view.props_computations(), 1);

        let next = RouteLocation::new("/users/2").with_matched(user);
        cell.set(next.into_shared());
        let rendered = view.render(&ctx, &TestHost);
        assert_eq!(calls.get(), 2);
        let Some(ViewNode::Direct { props, .. }) = rendered.as_node() else {
            panic!("expected a direct node, got {rendered:?}");
        };
        assert_eq!(props.get("path"), Some(&PropValue::from("/users/2")));
        assert_eq!(props.get("class"), Some(&PropValue::from("wide")));
    }

    #[test]
    fn props_are_not_computed_without_a_component() {
        let calls = Rc::new(Cell::new(0));
        let cell = located("/users/1", counting_props_record(calls.clone()));
        let ctx = RenderContext::root(&cell);
        let mut view = RouteView::new(&ctx).with_name("sidebar");

        let reason = view.render(&ctx, &TestHost).empty_reason();
        assert_eq!(reason, Some(EmptyReason::NoComponentForName));
        assert!(view.props(&ctx).is_none());
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn override_route_ignores_ambient_changes() {
        let calls = Rc::new(Cell::new(0));
        let user = counting_props_record(calls.clone());
        let cell = RouteCell::new(RouteLocation::new("/").into_shared());
        let ctx = RenderContext::root(&cell);
        let pinned = RouteLocation::new("/users/9")
            .with_matched(user.clone())
            .into_shared();
        let mut view = RouteView::new(&ctx).with_route(pinned.clone());

        assert_eq!(view.component(&ctx), Some("User"));
        let _ = view.props(&ctx);
        cell.set(RouteLocation::new("/elsewhere").into_shared());
        let _ = view.props(&ctx);
        assert_eq!(calls.get(), 1);
        assert!(Rc::ptr_eq(&view.route(&ctx), &pinned));

        view.set_route(Some(pinned));
        let _ = view.props(&ctx);
        assert_eq!(calls.get(), 1);

        view.set_route(None);
        assert!(view.matched(&ctx).is_none());
    }

    #[test]
    fn another_ambient_cell_at_the_same_revision_is_not_cached() {
        let cell_a = located("/a", record("/a", "A"));
        let cell_b = located("/b", record("/b", "B"));
        assert_eq!(cell_a.revision(), cell_b.revision());
        let ctx_a = RenderContext::root(&cell_a);
        let ctx_b = RenderContext::root(&cell_b);

        let mut view = RouteView::new(&ctx_a);
        assert_eq!(view.component(&ctx_a), Some("A"));
        assert_eq!(view.component(&ctx_b), Some("B"));
        assert_eq!(view.route(&ctx_b).path(), "/b");
        assert_eq!(view.component(&ctx_a), Some("A"));

        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = seen.clone();
        let mut slotted = RouteView::new(&ctx_a).with_slot(move |scope| {
            let entry = (*scope.component, String::from(scope.route.path()));
            log.borrow_mut().push(entry);
            smallvec![SlotChild::Placeholder]
        });
        let _ = slotted.render(&ctx_a, &TestHost);
        let _ = slotted.render(&ctx_b, &TestHost);
        let expected = [("A", String::from("/a")), ("B", String::from("/b"))];
        assert_eq!(*seen.borrow(), expected);
    }

    #[test]
    fn renaming_switches_component() {
        let layout = MatchedRecord::<TestHost>::new("/")
            .with_component("default", "Main")
            .with_component("sidebar", "Nav")
            .into_shared();
        let cell = located("/", layout);
        let ctx = RenderContext::root(&cell);
        let mut view = RouteView::new(&ctx);
        assert_eq!(view.component(&ctx), Some("Main"));
        view.set_name("sidebar");
        assert_eq!(view.component(&ctx), Some("Nav"));
        assert_eq!(view.name(), ViewName::from("sidebar"));
    }

    #[test]
    fn child_context_exposes_the_selected_record() {
        let outer = record("/", "Layout");
        let cell = located("/", outer.clone());
        let ctx = RenderContext::root(&cell);
        let mut view = RouteView::new(&ctx);
        let child_ctx = view.child_context(&ctx);
        assert_eq!(child_ctx.depth(), 1);
        assert!(Rc::ptr_eq(child_ctx.matched().unwrap(), &outer));
    }

    #[test]
    fn keep_alive_without_cached_child_renders_nothing() {
        let cell = located("/", record("/", "Home"));
        let ctx = RenderContext::root(&cell);
        let wrapper = TestNode {
            tag: "keep-alive",
            props: Props::new(),
        };
        let mut view = RouteView::new(&ctx).with_slot(move |_| {
            let keep_alive = KeepAlive::new(wrapper.clone(), None);
            smallvec![SlotChild::KeepAlive(keep_alive)]
        });
        let rendered = view.render(&ctx, &TestHost);
        assert!(rendered.is_empty());
        assert_eq!(rendered.empty_reason(), Some(EmptyReason::NoCachedChild));
        assert_eq!(rendered.advisory(), None);
    }

    #[test]
    fn slot_node_is_cloned_with_props() {
        let cell = located("/", record("/", "Home"));
        let ctx = RenderContext::root(&cell);
        let mut view = RouteView::new(&ctx)
            .with_attrs(Props::new().with("id", "main"))
            .with_slot(|scope| {
                let props = Props::new().with("id", "slot").with("lang", "en");
                let tag = *scope.component;
                smallvec![SlotChild::Node(TestNode { tag, props })]
            });
        let node = view.render(&ctx, &TestHost).into_node();
        let Some(ViewNode::Slotted(SlottedNode::Plain { node, hooks })) = node else {
            panic!("expected a plain slotted node");
        };
        let expected = Props::new().with("id", "main").with("lang", "en");
        assert_eq!(node.tag, "Home");
        assert_eq!(node.props, expected);
        assert_eq!(hooks.events(), LifecycleEvents::all());
    }

    #[test]
    fn leading_placeholders_are_skipped() {
        let cell = located("/", record("/", "Home"));
        let ctx = RenderContext::root(&cell);
        let mut view = RouteView::new(&ctx).with_slot(|scope| {
            let tag = *scope.component;
            let node = TestNode {
                tag,
                props: Props::new(),
            };
            smallvec![SlotChild::Placeholder, SlotChild::Node(node)]
        });
        let rendered = view.render(&ctx, &TestHost);
        assert_eq!(rendered.advisory(), None);
        let Some(ViewNode::Slotted(SlottedNode::Plain { node, .. })) = rendered.into_node() else {
            panic!("expected a plain slotted node");
        };
        assert_eq!(node.tag, "Home");
    }
}
