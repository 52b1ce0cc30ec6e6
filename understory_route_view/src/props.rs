// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Component props and their per-record descriptors.
//!
//! A matched record decides, per view name, how the rendered component gets
//! its props:
//!
//! | descriptor | resulting props |
//! |---|---|
//! | [`PropsDescriptor::Disabled`] | empty |
//! | [`PropsDescriptor::Params`] | the route's params |
//! | [`PropsDescriptor::Static`] | the stored props, unchanged |
//! | [`PropsDescriptor::Computed`] | `f(route)` |

use alloc::collections::BTreeMap;
use alloc::collections::btree_map;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use crate::location::{ParamValue, Params, RouteLocation};
use crate::node::ViewHost;

/// A single prop value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// A boolean flag.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    Text(String),
    /// A list of strings, as produced by repeatable params.
    List(Vec<String>),
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for PropValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for PropValue {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for PropValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<ParamValue> for PropValue {
    fn from(value: ParamValue) -> Self {
        match value {
            ParamValue::One(v) => Self::Text(v),
            ParamValue::Many(vs) => Self::List(vs),
        }
    }
}

/// An ordered set of named props.
///
/// Merging is last-writer-wins: [`Props::merge`] overwrites keys that are
/// already present.
///
/// ```rust
/// use understory_route_view::{PropValue, Props};
///
/// let mut props = Props::new().with("id", "42").with("admin", false);
/// props.merge(&Props::new().with("admin", true));
///
/// assert_eq!(props.get("id"), Some(&PropValue::from("42")));
/// assert_eq!(props.get("admin"), Some(&PropValue::Bool(true)));
/// ```
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Props(BTreeMap<String, PropValue>);

impl Props {
    /// Creates an empty prop set.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style [`Props::insert`].
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<PropValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key`, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PropValue>,
    ) -> Option<PropValue> {
        self.0.insert(key.into(), value.into())
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<PropValue> {
        self.0.remove(key)
    }

    /// Returns the value under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PropValue> {
        self.0.get(key)
    }

    /// Returns `true` if `key` is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of props.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no props are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates props in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, PropValue> {
        self.0.iter()
    }

    /// Copies every prop of `other` into `self`, overwriting on collision.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in other.iter() {
            self.0.insert(key.clone(), value.clone());
        }
    }

    /// Converts route params into props, preserving their names.
    #[must_use]
    pub fn from_params(params: &Params) -> Self {
        Self(
            params
                .iter()
                .map(|(k, v)| (k.clone(), PropValue::from(v.clone())))
                .collect(),
        )
    }
}

impl<K: Into<String>, V: Into<PropValue>> FromIterator<(K, V)> for Props {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let props = iter.into_iter().map(|(k, v)| (k.into(), v.into()));
        Self(props.collect())
    }
}

impl<'a> IntoIterator for &'a Props {
    type Item = (&'a String, &'a PropValue);
    type IntoIter = btree_map::Iter<'a, String, PropValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Props function signature for [`PropsDescriptor::Computed`].
pub type PropsFn<H> = dyn Fn(&RouteLocation<H>) -> Props;

/// How a matched record computes props for one of its views.
pub enum PropsDescriptor<H: ViewHost> {
    /// No props are passed.
    Disabled,
    /// The route's params are passed as props.
    Params,
    /// A fixed set of props, independent of the route.
    Static(Props),
    /// Props derived from the route on every navigation.
    Computed(Rc<PropsFn<H>>),
}

impl<H: ViewHost> PropsDescriptor<H> {
    /// Wraps a props function.
    #[must_use]
    pub fn computed(f: impl Fn(&RouteLocation<H>) -> Props + 'static) -> Self {
        Self::Computed(Rc::new(f))
    }

    /// Computes the props for `route`.
    ///
    /// Computed descriptors call their function every time; caching is up to
    /// the caller (see [`Memo`](crate::Memo)).
    #[must_use]
    pub fn resolve(&self, route: &RouteLocation<H>) -> Props {
        match self {
            Self::Disabled => Props::new(),
            Self::Params => Props::from_params(route.params()),
            Self::Static(props) => props.clone(),
            Self::Computed(f) => f(route),
        }
    }
}

impl<H: ViewHost> Default for PropsDescriptor<H> {
    fn default() -> Self {
        Self::Disabled
    }
}

impl<H: ViewHost> Clone for PropsDescriptor<H> {
    fn clone(&self) -> Self {
        match self {
            Self::Disabled => Self::Disabled,
            Self::Params => Self::Params,
            Self::Static(props) => Self::Static(props.clone()),
            Self::Computed(f) => Self::Computed(Rc::clone(f)),
        }
    }
}

impl<H: ViewHost> From<bool> for PropsDescriptor<H> {
    fn from(pass_params: bool) -> Self {
        if pass_params {
            Self::Params
        } else {
            Self::Disabled
        }
    }
}

impl<H: ViewHost> From<Props> for PropsDescriptor<H> {
    fn from(props: Props) -> Self {
        Self::Static(props)
    }
}

impl<H: ViewHost> fmt::Debug for PropsDescriptor<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("Disabled"),
            Self::Params => f.write_str("Params"),
            Self::Static(props) => f.debug_tuple("Static").field(props).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHost;
    use alloc::format;
    use alloc::vec;

    fn route() -> RouteLocation<TestHost> {
        RouteLocation::new("/users/42")
            .with_param("id", "42")
            .with_param("tags", vec![String::from("a"), String::from("b")])
            .with_query("tab", "posts")
    }

    #[test]
    fn disabled_yields_empty() {
        let props = PropsDescriptor::<TestHost>::from(false).resolve(&route());
        assert!(props.is_empty());
    }

    #[test]
    fn params_are_passed_through_exactly() {
        let props = PropsDescriptor::<TestHost>::from(true).resolve(&route());
        let tags = PropValue::List(vec![String::from("a"), String::from("b")]);
        assert_eq!(props, Props::new().with("id", "42").with("tags", tags));
    }

    #[test]
    fn static_props_ignore_the_route() {
        let fixed = Props::new().with("title", "Home");
        let descriptor = PropsDescriptor::<TestHost>::from(fixed.clone());
        let elsewhere = RouteLocation::new("/elsewhere");
        assert_eq!(descriptor.resolve(&route()), fixed);
        assert_eq!(descriptor.resolve(&elsewhere), fixed);
    }

    #[test]
    fn computed_props_read_the_route() {
        let descriptor = PropsDescriptor::<TestHost>::computed(|route| {
            let tab = match route.query().get("tab") {
                Some(ParamValue::One(tab)) => tab.clone(),
                _ => String::from("overview"),
            };
            Props::new().with("tab", tab).with("path", route.path())
        });
        let props = descriptor.resolve(&route());
        assert_eq!(props.get("tab"), Some(&PropValue::from("posts")));
        assert_eq!(props.get("path"), Some(&PropValue::from("/users/42")));
    }

    #[test]
    fn merge_is_last_writer_wins() {
        let mut props = Props::new().with("a", 1).with("b", 2);
        props.merge(&Props::new().with("b", 3).with("c", 4));
        let keys: Vec<_> = props.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["a", "b", "c"]);
        assert_eq!(props.get("b"), Some(&PropValue::Number(3.0)));
    }

    #[test]
    fn debug_hides_props_functions() {
        let descriptor = PropsDescriptor::<TestHost>::computed(|_| Props::new());
        assert_eq!(format!("{descriptor:?}"), "Computed(..)");
    }
}
