// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Matched route records and their live-instance table.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::RefCell;
use core::fmt;

use hashbrown::HashMap;

use crate::location::RouteLocation;
use crate::name::ViewName;
use crate::node::ViewHost;
use crate::props::{Props, PropsDescriptor};

/// One level of the matched chain: the components to render at a nesting
/// depth, how to compute their props, and which instances are currently live.
///
/// Records are built by the route table and shared behind an [`Rc`] by every
/// location that matches them. Routing never touches
/// [`instances`](Self::instances); only the views rendering this record write
/// to it.
pub struct MatchedRecord<H: ViewHost> {
    path: String,
    components: HashMap<ViewName, H::Component>,
    props: HashMap<ViewName, PropsDescriptor<H>>,
    instances: InstanceTable<H::Instance>,
}

impl<H: ViewHost> MatchedRecord<H> {
    /// Creates a record for the route pattern `path` with no components.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            components: HashMap::new(),
            props: HashMap::new(),
            instances: InstanceTable::new(),
        }
    }

    /// Registers `component` under `name`.
    #[must_use]
    pub fn with_component(mut self, name: impl Into<ViewName>, component: H::Component) -> Self {
        self.components.insert(name.into(), component);
        self
    }

    /// Sets the props descriptor for the view `name`.
    ///
    /// Views without a descriptor receive no props.
    #[must_use]
    pub fn with_props(
        mut self,
        name: impl Into<ViewName>,
        props: impl Into<PropsDescriptor<H>>,
    ) -> Self {
        self.props.insert(name.into(), props.into());
        self
    }

    /// Wraps the record for sharing between locations.
    #[must_use]
    pub fn into_shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    /// The route pattern this record was built from.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The component registered under `name`.
    #[must_use]
    pub fn component(&self, name: &str) -> Option<&H::Component> {
        self.components.get(name)
    }

    /// The props descriptor registered for `name`.
    ///
    /// A missing descriptor behaves like [`PropsDescriptor::Disabled`].
    #[must_use]
    pub fn props(&self, name: &str) -> Option<&PropsDescriptor<H>> {
        self.props.get(name)
    }

    /// Computes the props for the view `name` under `route`.
    #[must_use]
    pub fn resolve_props(&self, name: &str, route: &RouteLocation<H>) -> Props {
        self.props
            .get(name)
            .map_or_else(Props::new, |descriptor| descriptor.resolve(route))
    }

    /// The live-instance table for this record.
    #[must_use]
    pub fn instances(&self) -> &InstanceTable<H::Instance> {
        &self.instances
    }

    /// Shorthand for `self.instances().get(name)`.
    #[must_use]
    pub fn instance(&self, name: &str) -> Option<H::Instance> {
        self.instances.get(name)
    }
}

impl<H: ViewHost> fmt::Debug for MatchedRecord<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.components.keys().map(ViewName::as_str).collect();
        names.sort_unstable();
        f.debug_struct("MatchedRecord")
            .field("path", &self.path)
            .field("components", &names)
            .field("instances", &self.instances)
            .finish_non_exhaustive()
    }
}

/// Per-record mapping from view name to the currently mounted instance.
///
/// Readable by anyone for introspection. Writes happen only through
/// [`InstanceBinding`](crate::InstanceBinding), each binding touching nothing
/// but its own captured key.
pub struct InstanceTable<I> {
    slots: RefCell<HashMap<ViewName, I>>,
}

impl<I: Clone> InstanceTable<I> {
    fn new() -> Self {
        Self {
            slots: RefCell::new(HashMap::new()),
        }
    }

    /// The instance mounted under `name`, if any.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<I> {
        self.slots.borrow().get(name).cloned()
    }

    /// Returns `true` if an instance is mounted under `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.slots.borrow().contains_key(name)
    }

    /// Number of occupied names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    /// Returns `true` if no instance is mounted for any name.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    pub(crate) fn set(&self, name: &ViewName, instance: I) -> Option<I> {
        self.slots.borrow_mut().insert(name.clone(), instance)
    }

    pub(crate) fn clear(&self, name: &str) -> Option<I> {
        self.slots.borrow_mut().remove(name)
    }
}

impl<I: fmt::Debug> fmt::Debug for InstanceTable<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slots = self.slots.borrow();
        let mut entries: Vec<_> = slots.iter().collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        f.debug_map().entries(entries).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestHost;

    #[test]
    fn component_lookup_by_name() {
        let record = MatchedRecord::<TestHost>::new("/")
            .with_component("default", "Home")
            .with_component("sidebar", "Nav");
        assert_eq!(record.component("default"), Some(&"Home"));
        assert_eq!(record.component("sidebar"), Some(&"Nav"));
        assert_eq!(record.component("footer"), None);
    }

    #[test]
    fn missing_props_descriptor_is_disabled() {
        let record = MatchedRecord::<TestHost>::new("/")
            .with_component("default", "Home")
            .with_props("default", Props::new().with("a", 1));
        let route = RouteLocation::new("/");
        let descriptor = record.props("default");
        assert!(matches!(descriptor, Some(PropsDescriptor::Static(_))));
        assert!(record.props("sidebar").is_none());
        let expected = Props::new().with("a", 1);
        assert_eq!(record.resolve_props("default", &route), expected);
        assert!(record.resolve_props("sidebar", &route).is_empty());
    }

    #[test]
    fn instance_table_set_and_clear() {
        let record = MatchedRecord::<TestHost>::new("/");
        let table = record.instances();
        assert!(table.is_empty());

        assert_eq!(table.set(&ViewName::DEFAULT, 1), None);
        assert_eq!(table.set(&ViewName::DEFAULT, 2), Some(1));
        assert_eq!(record.instance("default"), Some(2));
        assert!(table.contains("default"));
        assert_eq!(table.len(), 1);

        assert_eq!(table.clear("default"), Some(2));
        assert_eq!(table.clear("default"), None);
        assert!(record.instance("default").is_none());
    }
}
