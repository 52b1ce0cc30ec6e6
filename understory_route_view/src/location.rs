// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Route location snapshots.
//!
//! A [`RouteLocation`] is the immutable result of one navigation: the matched
//! record chain (one record per nesting depth) plus the parameters extracted
//! from the URL. Matching itself happens elsewhere; this crate only reads
//! snapshots.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::node::ViewHost;
use crate::record::MatchedRecord;

/// A single route parameter: either one segment or a repeated segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamValue {
    /// A single value, e.g. `:id`.
    One(String),
    /// A repeatable value, e.g. `:path+`.
    Many(Vec<String>),
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::One(value.into())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        Self::One(value)
    }
}

impl From<Vec<String>> for ParamValue {
    fn from(values: Vec<String>) -> Self {
        Self::Many(values)
    }
}

/// Parameter name to value mapping.
pub type Params = BTreeMap<String, ParamValue>;

/// An immutable snapshot of the current route.
///
/// Snapshots are shared behind an [`Rc`]; a new navigation produces a new
/// snapshot rather than mutating the old one.
///
/// # Example
///
/// ```rust
/// # use understory_route_view::{MatchedRecord, Props, RouteLocation, ViewHost};
/// # #[derive(Debug)]
/// # struct Host;
/// # impl ViewHost for Host {
/// #     type Component = &'static str;
/// #     type Instance = u32;
/// #     type Node = &'static str;
/// #     fn clone_with_props(&self, node: &Self::Node, _: &Props) -> Self::Node { *node }
/// # }
/// let user = MatchedRecord::<Host>::new("/users/:id")
///     .with_component("default", "User")
///     .into_shared();
/// let route = RouteLocation::new("/users/42")
///     .with_matched(user)
///     .with_param("id", "42");
///
/// assert_eq!(route.matched().len(), 1);
/// assert!(route.matched_at(1).is_none());
/// ```
pub struct RouteLocation<H: ViewHost> {
    path: String,
    matched: Vec<Rc<MatchedRecord<H>>>,
    params: Params,
    query: Params,
    hash: String,
}

impl<H: ViewHost> RouteLocation<H> {
    /// Creates an empty location for `path` with no matched records.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            matched: Vec::new(),
            params: Params::new(),
            query: Params::new(),
            hash: String::new(),
        }
    }

    /// Appends the record for the next nesting depth.
    #[must_use]
    pub fn with_matched(mut self, record: Rc<MatchedRecord<H>>) -> Self {
        self.matched.push(record);
        self
    }

    /// Adds a path parameter.
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Adds a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    /// Sets the hash fragment, including the leading `#` if any.
    #[must_use]
    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    /// Wraps the snapshot for sharing between views.
    #[must_use]
    pub fn into_shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    /// The normalized path of this location.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The matched record chain; index is nesting depth.
    #[must_use]
    pub fn matched(&self) -> &[Rc<MatchedRecord<H>>] {
        &self.matched
    }

    /// The record matched at `depth`, if the chain is deep enough.
    #[must_use]
    pub fn matched_at(&self, depth: usize) -> Option<&Rc<MatchedRecord<H>>> {
        self.matched.get(depth)
    }

    /// Path parameters.
    #[must_use]
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Query parameters.
    #[must_use]
    pub fn query(&self) -> &Params {
        &self.query
    }

    /// The hash fragment.
    #[must_use]
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl<H: ViewHost> fmt::Debug for RouteLocation<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let matched: Vec<&str> = self.matched.iter().map(|r| r.path()).collect();
        f.debug_struct("RouteLocation")
            .field("path", &self.path)
            .field("matched", &matched)
            .field("params", &self.params)
            .field("query", &self.query)
            .field("hash", &self.hash)
            .finish()
    }
}
