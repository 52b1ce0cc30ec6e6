// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Understory Route View: nested route view rendering.
//!
//! A client-side router resolves a URL into a chain of matched records, one
//! per nesting level. This crate renders that chain: a [`RouteView`] placed at
//! depth `d` renders the component of `route.matched()[d]`, and every route
//! view nested inside what it renders sits at depth `d + 1`.
//!
//! The crate deliberately stops at the decision of *what* to render:
//!
//! - URL matching, navigation guards, and history live in the router.
//! - Building and diffing nodes lives in the host UI runtime, reached through
//!   the [`ViewHost`] trait.
//!
//! ## Core Concepts
//!
//! - **Context** ([`RenderContext`]): the current route cell plus the depth a
//!   new view renders at. Passed explicitly from parent to child.
//! - **Records** ([`MatchedRecord`]): components per [`ViewName`], a
//!   [`PropsDescriptor`] per name, and an [`InstanceTable`] of live instances.
//! - **Rendering** ([`RouteView::render`]): returns a [`ViewNode`] (or
//!   nothing, with an [`EmptyReason`]) for the host to build.
//! - **Binding** ([`LifecycleHooks`]): the host fires attach/update/detach on
//!   the nodes it built; these keep the record's instance table current.
//! - **Reactivity** ([`Observable`], [`Memo`]): record, component, and props
//!   are recomputed only when the route or view name change.
//!
//! ## Minimal example
//!
//! ```rust
//! use understory_route_view::{
//!     Lifecycle, MatchedRecord, Props, RenderContext, RouteCell, RouteLocation, RouteView,
//!     ViewHost,
//! };
//!
//! #[derive(Debug)]
//! struct Host;
//! impl ViewHost for Host {
//!     type Component = &'static str;
//!     type Instance = u32;
//!     type Node = &'static str;
//!     fn clone_with_props(&self, node: &Self::Node, _: &Props) -> Self::Node {
//!         *node
//!     }
//! }
//!
//! let layout = MatchedRecord::<Host>::new("/").with_component("default", "Layout").into_shared();
//! let home = MatchedRecord::<Host>::new("/home").with_component("default", "Home").into_shared();
//! let current = RouteCell::new(
//!     RouteLocation::new("/home")
//!         .with_matched(layout.clone())
//!         .with_matched(home.clone())
//!         .into_shared(),
//! );
//!
//! // The app root renders the outer view...
//! let root = RenderContext::root(&current);
//! let mut outer = RouteView::new(&root);
//! let outer_node = outer.render(&root, &Host).into_node().unwrap();
//!
//! // ...and `Layout` renders a nested one.
//! let nested = outer.child_context(&root);
//! let mut inner = RouteView::new(&nested);
//! let inner_node = inner.render(&nested, &Host).into_node().unwrap();
//!
//! // The host mounts both and reports the instances it created.
//! outer_node.instance_hooks().on_attach(Some(&1)).unwrap();
//! inner_node.instance_hooks().on_attach(Some(&2)).unwrap();
//! assert_eq!(layout.instance("default"), Some(1));
//! assert_eq!(home.instance("default"), Some(2));
//! ```
//!
//! ## Slots and keep-alive
//!
//! A slot ([`RouteView::with_slot`]) receives the resolved component and
//! route and returns the node to use. Placeholders are dropped; if more than
//! one root remains the first is used and [`Advisory::MultipleSlotRoots`] is
//! reported (and logged through `tracing` in debug builds). A returned
//! [`KeepAlive`] wrapper keeps its identity: only its cached child is replaced
//! by a props-merged clone, and the wrapper, not the child, carries the detach
//! hook.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. The `std` feature (on by default)
//! only forwards to `tracing`.

#![no_std]

extern crate alloc;

mod binding;
mod context;
mod location;
mod name;
mod node;
mod props;
mod reactive;
mod record;
mod view;

#[cfg(test)]
mod testing;

pub use binding::{
    Attached, BindingConflict, ConflictHandling, InstanceBinding, Lifecycle, LifecycleEvents,
    LifecycleHooks,
};
pub use context::{RenderContext, RouteCell};
pub use location::{ParamValue, Params, RouteLocation};
pub use name::ViewName;
pub use node::{KeepAlive, SlotChild, SlotChildren, SlottedNode, ViewHost, ViewNode};
pub use props::{PropValue, Props, PropsDescriptor, PropsFn};
pub use reactive::{Memo, Observable, Revision};
pub use record::{InstanceTable, MatchedRecord};
pub use view::{Advisory, EmptyReason, Rendered, RouteView, SlotFn, SlotScope};
