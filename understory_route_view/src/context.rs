// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render context threaded from ancestor views to descendants.
//!
//! Instead of an implicit injection channel, every view receives a
//! [`RenderContext`] from whoever builds it and hands a deeper one to the
//! components it renders (see [`RouteView::child_context`]).
//!
//! [`RouteView::child_context`]: crate::RouteView::child_context

use alloc::rc::Rc;
use alloc::string::String;
use core::fmt;

use crate::location::RouteLocation;
use crate::node::ViewHost;
use crate::reactive::Observable;
use crate::record::MatchedRecord;

/// The router-owned cell holding the current route snapshot.
pub type RouteCell<H> = Observable<Rc<RouteLocation<H>>>;

/// What a view learns from its ancestors.
///
/// - the current route cell (always present: a tree without a router is a
///   setup error, so there is no way to build a context without one);
/// - the nesting depth at which a view created from this context renders;
/// - the record selected by the nearest enclosing view, for tooling.
pub struct RenderContext<'a, H: ViewHost> {
    current_route: &'a RouteCell<H>,
    depth: usize,
    matched: Option<Rc<MatchedRecord<H>>>,
}

impl<'a, H: ViewHost> RenderContext<'a, H> {
    /// A top-level context: depth zero, no enclosing view.
    #[must_use]
    pub fn root(current_route: &'a RouteCell<H>) -> Self {
        Self {
            current_route,
            depth: 0,
            matched: None,
        }
    }

    /// The router's current route cell.
    #[must_use]
    pub fn current_route(&self) -> &'a RouteCell<H> {
        self.current_route
    }

    /// Depth for a view created in this context.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// The record rendered by the nearest enclosing view, if any.
    #[must_use]
    pub fn matched(&self) -> Option<&Rc<MatchedRecord<H>>> {
        self.matched.as_ref()
    }

    /// The context an enclosing view at `depth` exposes to its subtree.
    pub(crate) fn nested(&self, depth: usize, matched: Option<Rc<MatchedRecord<H>>>) -> Self {
        Self {
            current_route: self.current_route,
            depth: depth + 1,
            matched,
        }
    }
}

impl<H: ViewHost> Clone for RenderContext<'_, H> {
    fn clone(&self) -> Self {
        Self {
            current_route: self.current_route,
            depth: self.depth,
            matched: self.matched.clone(),
        }
    }
}

impl<H: ViewHost> fmt::Debug for RenderContext<'_, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let route = self.current_route.with(|r| String::from(r.path()));
        f.debug_struct("RenderContext")
            .field("route", &route)
            .field("depth", &self.depth)
            .field("matched", &self.matched.as_ref().map(|r| r.path()))
            .finish()
    }
}
