// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Host seam and the shapes of what a view produces.
//!
//! The crate never builds host nodes itself. A [`RouteView`](crate::RouteView)
//! returns a [`ViewNode`] describing what to build; the host tree-builder
//! constructs it and fires the attached [`LifecycleHooks`] at mount, update,
//! and unmount time.

use core::fmt;

use smallvec::SmallVec;

use crate::binding::LifecycleHooks;
use crate::props::Props;

/// The hosting UI runtime, as seen by a route view.
pub trait ViewHost: Sized + 'static {
    /// A component descriptor registered on matched records.
    type Component: Clone + fmt::Debug;
    /// A handle to a mounted component instance.
    type Instance: Clone + PartialEq + fmt::Debug;
    /// A node returned by a slot.
    type Node: Clone + fmt::Debug;

    /// Clones `node`, merging `props` over its own props (`props` win).
    fn clone_with_props(&self, node: &Self::Node, props: &Props) -> Self::Node;
}

/// A cache-preserving wrapper returned by a slot.
///
/// The wrapper keeps its content alive across removal and reinsertion. The
/// view only ever swaps its cached child; the wrapper itself (and with it the
/// host's cache identity) passes through untouched.
pub struct KeepAlive<H: ViewHost> {
    wrapper: H::Node,
    child: Option<H::Node>,
}

impl<H: ViewHost> KeepAlive<H> {
    /// Wraps `child` in the cache node `wrapper`.
    #[must_use]
    pub fn new(wrapper: H::Node, child: Option<H::Node>) -> Self {
        Self { wrapper, child }
    }

    /// The wrapper node.
    #[must_use]
    pub fn wrapper(&self) -> &H::Node {
        &self.wrapper
    }

    /// The cached inner child, if any.
    #[must_use]
    pub fn child(&self) -> Option<&H::Node> {
        self.child.as_ref()
    }

    /// Splits into wrapper and child.
    #[must_use]
    pub fn into_parts(self) -> (H::Node, Option<H::Node>) {
        (self.wrapper, self.child)
    }
}

impl<H: ViewHost> Clone for KeepAlive<H> {
    fn clone(&self) -> Self {
        Self {
            wrapper: self.wrapper.clone(),
            child: self.child.clone(),
        }
    }
}

impl<H: ViewHost> fmt::Debug for KeepAlive<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeepAlive")
            .field("wrapper", &self.wrapper)
            .field("child", &self.child)
            .finish()
    }
}

/// One root returned by a slot.
pub enum SlotChild<H: ViewHost> {
    /// An empty node (comment, conditional that rendered nothing); ignored.
    Placeholder,
    /// A plain node.
    Node(H::Node),
    /// A cache-preserving wrapper.
    KeepAlive(KeepAlive<H>),
}

impl<H: ViewHost> SlotChild<H> {
    /// Returns `true` for [`SlotChild::Placeholder`].
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }
}

impl<H: ViewHost> fmt::Debug for SlotChild<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Placeholder => f.write_str("Placeholder"),
            Self::Node(node) => f.debug_tuple("Node").field(node).finish(),
            Self::KeepAlive(keep_alive) => f.debug_tuple("KeepAlive").field(keep_alive).finish(),
        }
    }
}

/// Roots returned by a slot. Exactly one meaningful root is expected.
pub type SlotChildren<H> = SmallVec<[SlotChild<H>; 1]>;

/// A node produced by a slot, after props and hooks were applied.
pub enum SlottedNode<H: ViewHost> {
    /// A plain node cloned with the resolved props.
    Plain {
        /// The clone, carrying resolved props and pass-through attributes.
        node: H::Node,
        /// Attach, update, and detach hooks.
        hooks: LifecycleHooks<H>,
    },
    /// A keep-alive wrapper whose cached child was replaced.
    CachedWrapper {
        /// The original wrapper, holding the props-merged clone of its child.
        keep_alive: KeepAlive<H>,
        /// Detach hook for the wrapper: eviction is observed there.
        wrapper_hooks: LifecycleHooks<H>,
        /// Attach hook for the inner child.
        child_hooks: LifecycleHooks<H>,
    },
}

/// What a view asks the host to build.
pub enum ViewNode<H: ViewHost> {
    /// Construct `component` directly.
    Direct {
        /// The component to instantiate.
        component: H::Component,
        /// Resolved props merged with pass-through attributes.
        props: Props,
        /// Attach, update, and detach hooks.
        hooks: LifecycleHooks<H>,
    },
    /// Use the node a slot returned.
    Slotted(SlottedNode<H>),
}

impl<H: ViewHost> ViewNode<H> {
    /// Hooks the host must call when the rendered component instance mounts
    /// or updates.
    #[must_use]
    pub fn instance_hooks(&self) -> &LifecycleHooks<H> {
        match self {
            Self::Direct { hooks, .. } | Self::Slotted(SlottedNode::Plain { hooks, .. }) => hooks,
            Self::Slotted(SlottedNode::CachedWrapper { child_hooks, .. }) => child_hooks,
        }
    }

    /// Hooks the host must call when the outermost node unmounts.
    #[must_use]
    pub fn outer_hooks(&self) -> &LifecycleHooks<H> {
        match self {
            Self::Direct { hooks, .. } | Self::Slotted(SlottedNode::Plain { hooks, .. }) => hooks,
            Self::Slotted(SlottedNode::CachedWrapper { wrapper_hooks, .. }) => wrapper_hooks,
        }
    }
}

impl<H: ViewHost> fmt::Debug for SlottedNode<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain { node, hooks } => f
                .debug_struct("Plain")
                .field("node", node)
                .field("hooks", hooks)
                .finish(),
            Self::CachedWrapper {
                keep_alive,
                wrapper_hooks,
                child_hooks,
            } => f
                .debug_struct("CachedWrapper")
                .field("keep_alive", keep_alive)
                .field("wrapper_hooks", wrapper_hooks)
                .field("child_hooks", child_hooks)
                .finish(),
        }
    }
}

impl<H: ViewHost> fmt::Debug for ViewNode<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct {
                component,
                props,
                hooks,
            } => f
                .debug_struct("Direct")
                .field("component", component)
                .field("props", props)
                .field("hooks", hooks)
                .finish(),
            Self::Slotted(node) => f.debug_tuple("Slotted").field(node).finish(),
        }
    }
}
