// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binding live instances into their matched record.
//!
//! Every render captures the `(record, name)` pair it rendered for in an
//! [`InstanceBinding`]. The host calls the [`Lifecycle`] hooks on the nodes it
//! builds; attach writes the instance into that captured slot and detach
//! clears it, as long as the slot still holds the instance this binding
//! wrote. Because the pair is captured, a view that unmounts after a
//! navigation clears the slot it registered, never the slot of the record
//! that replaced it. A fast remount of the same record is safe too: the stale
//! detach finds the newer instance in the slot and leaves it alone.
//!
//! ```rust
//! # use understory_route_view::{Props, ViewHost};
//! # #[derive(Debug)]
//! # struct Host;
//! # impl ViewHost for Host {
//! #     type Component = &'static str;
//! #     type Instance = u32;
//! #     type Node = &'static str;
//! #     fn clone_with_props(&self, node: &Self::Node, _: &Props) -> Self::Node { *node }
//! # }
//! use understory_route_view::{
//!     ConflictHandling, InstanceBinding, Lifecycle, LifecycleEvents, LifecycleHooks,
//!     MatchedRecord, ViewName,
//! };
//!
//! let record = MatchedRecord::<Host>::new("/").into_shared();
//! let binding = InstanceBinding::new(
//!     Some(record.clone()),
//!     ViewName::DEFAULT,
//!     ConflictHandling::Replace,
//! )
//! .into_shared();
//! let hooks = LifecycleHooks::new(binding, LifecycleEvents::all());
//!
//! hooks.on_attach(Some(&7)).unwrap();
//! assert_eq!(record.instance("default"), Some(7));
//! hooks.on_detach();
//! assert_eq!(record.instance("default"), None);
//! ```

use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;
use core::fmt;

use bitflags::bitflags;

use crate::name::ViewName;
use crate::node::ViewHost;
use crate::record::MatchedRecord;

/// What to do when attaching an instance to a key that already holds a
/// different one.
///
/// Re-attaching the instance that is already registered is always a no-op;
/// the update hook relies on that.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ConflictHandling {
    /// Last writer wins.
    #[default]
    Replace,
    /// Panic in debug builds, replace in release builds.
    DebugAssert,
    /// Return a [`BindingConflict`] and keep the existing instance.
    Error,
}

/// Error returned when attaching would displace another live instance.
#[derive(Clone, PartialEq, Eq)]
pub struct BindingConflict {
    /// Path of the record whose slot is occupied.
    pub record: String,
    /// The occupied view name.
    pub name: ViewName,
}

impl fmt::Debug for BindingConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "BindingConflict {{ record: {:?}, name: {:?} }}",
            self.record, self.name
        )
    }
}

impl fmt::Display for BindingConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "view `{}` of record `{}` already holds a different live instance",
            self.name, self.record
        )
    }
}

impl core::error::Error for BindingConflict {}

/// Result of a successful attach.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Attached {
    /// The instance was written into an empty slot.
    Registered,
    /// The instance replaced a different one.
    Replaced,
    /// The slot already held this instance.
    Unchanged,
    /// Nothing to do: no record was matched or no instance exists yet.
    Skipped,
}

/// The `(record, name)` pair captured when a node was rendered, plus the
/// instance this binding last wrote into it.
pub struct InstanceBinding<H: ViewHost> {
    record: Option<Rc<MatchedRecord<H>>>,
    name: ViewName,
    conflict: ConflictHandling,
    attached: RefCell<Option<H::Instance>>,
}

impl<H: ViewHost> InstanceBinding<H> {
    /// Captures `record` and `name`.
    #[must_use]
    pub fn new(
        record: Option<Rc<MatchedRecord<H>>>,
        name: ViewName,
        conflict: ConflictHandling,
    ) -> Self {
        Self {
            record,
            name,
            conflict,
            attached: RefCell::new(None),
        }
    }

    /// Wraps the binding for sharing between the hooks of one render.
    #[must_use]
    pub fn into_shared(self) -> Rc<Self> {
        Rc::new(self)
    }

    /// The captured record.
    #[must_use]
    pub fn record(&self) -> Option<&Rc<MatchedRecord<H>>> {
        self.record.as_ref()
    }

    /// The captured view name.
    #[must_use]
    pub fn name(&self) -> &ViewName {
        &self.name
    }

    /// The instance this binding wrote and has not detached yet.
    #[must_use]
    pub fn attached(&self) -> Option<H::Instance> {
        self.attached.borrow().clone()
    }

    /// Publishes `instance` into the captured slot.
    ///
    /// `None` means the host has no instance yet (content inside a transition
    /// that has not appeared); that is not an error and leaves the slot alone.
    pub fn attach(&self, instance: Option<&H::Instance>) -> Result<Attached, BindingConflict> {
        let (Some(record), Some(instance)) = (self.record.as_ref(), instance) else {
            return Ok(Attached::Skipped);
        };
        let table = record.instances();
        match table.get(self.name.as_str()) {
            Some(current) if current == *instance => {
                *self.attached.borrow_mut() = Some(current);
                return Ok(Attached::Unchanged);
            }
            Some(_) => match self.conflict {
                ConflictHandling::Replace => {}
                ConflictHandling::DebugAssert => {
                    debug_assert!(
                        false,
                        "view `{}` of record `{}` already holds a different live instance",
                        self.name,
                        record.path()
                    );
                }
                ConflictHandling::Error => {
                    tracing::debug!(
                        record = record.path(),
                        name = self.name.as_str(),
                        "refusing to displace live instance"
                    );
                    return Err(BindingConflict {
                        record: record.path().into(),
                        name: self.name.clone(),
                    });
                }
            },
            None => {}
        }
        tracing::trace!(record = record.path(), name = self.name.as_str(), "attach");
        *self.attached.borrow_mut() = Some(instance.clone());
        Ok(match table.set(&self.name, instance.clone()) {
            Some(_) => Attached::Replaced,
            None => Attached::Registered,
        })
    }

    /// Clears the captured slot if it still holds the instance this binding
    /// attached, returning `true` if it cleared anything.
    ///
    /// A slot that was taken over by another binding's instance is left as
    /// is.
    pub fn detach(&self) -> bool {
        let Some(record) = self.record.as_ref() else {
            return false;
        };
        let Some(own) = self.attached.borrow_mut().take() else {
            return false;
        };
        let table = record.instances();
        if table.get(self.name.as_str()).as_ref() != Some(&own) {
            tracing::trace!(
                record = record.path(),
                name = self.name.as_str(),
                "detach skipped; slot holds a newer instance"
            );
            return false;
        }
        tracing::trace!(record = record.path(), name = self.name.as_str(), "detach");
        table.clear(self.name.as_str()).is_some()
    }
}

impl<H: ViewHost> fmt::Debug for InstanceBinding<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstanceBinding")
            .field("record", &self.record.as_ref().map(|r| r.path()))
            .field("name", &self.name)
            .field("conflict", &self.conflict)
            .field("attached", &self.attached.borrow())
            .finish()
    }
}

bitflags! {
    /// The lifecycle events a set of hooks responds to.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct LifecycleEvents: u8 {
        /// The node's instance finished mounting.
        const ATTACH = 1 << 0;
        /// The node was patched in place.
        const UPDATE = 1 << 1;
        /// The node was removed from the tree.
        const DETACH = 1 << 2;
    }
}

/// Lifecycle callbacks the host tree-builder invokes on a node it built.
pub trait Lifecycle<I> {
    /// Called once the node's instance is mounted.
    fn on_attach(&self, instance: Option<&I>) -> Result<Attached, BindingConflict>;

    /// Called after the node was updated in place.
    fn on_update(&self, instance: Option<&I>) -> Result<Attached, BindingConflict>;

    /// Called after the node was unmounted.
    fn on_detach(&self) -> bool;
}

/// Hooks sharing one captured [`InstanceBinding`], filtered by event.
///
/// The update hook runs the attach logic: content that first renders empty
/// (for instance inside a transition) gets registered once it appears.
pub struct LifecycleHooks<H: ViewHost> {
    binding: Rc<InstanceBinding<H>>,
    events: LifecycleEvents,
}

impl<H: ViewHost> LifecycleHooks<H> {
    /// Creates hooks that respond to `events` only.
    #[must_use]
    pub fn new(binding: Rc<InstanceBinding<H>>, events: LifecycleEvents) -> Self {
        Self { binding, events }
    }

    /// The events these hooks respond to.
    #[must_use]
    pub fn events(&self) -> LifecycleEvents {
        self.events
    }

    /// The shared binding.
    #[must_use]
    pub fn binding(&self) -> &Rc<InstanceBinding<H>> {
        &self.binding
    }
}

impl<H: ViewHost> Lifecycle<H::Instance> for LifecycleHooks<H> {
    fn on_attach(&self, instance: Option<&H::Instance>) -> Result<Attached, BindingConflict> {
        if !self.events.contains(LifecycleEvents::ATTACH) {
            return Ok(Attached::Skipped);
        }
        self.binding.attach(instance)
    }

    fn on_update(&self, instance: Option<&H::Instance>) -> Result<Attached, BindingConflict> {
        if !self.events.contains(LifecycleEvents::UPDATE) {
            return Ok(Attached::Skipped);
        }
        self.binding.attach(instance)
    }

    fn on_detach(&self) -> bool {
        self.events.contains(LifecycleEvents::DETACH) && self.binding.detach()
    }
}

impl<H: ViewHost> Clone for LifecycleHooks<H> {
    fn clone(&self) -> Self {
        Self {
            binding: Rc::clone(&self.binding),
            events: self.events,
        }
    }
}

impl<H: ViewHost> fmt::Debug for LifecycleHooks<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LifecycleHooks")
            .field("binding", &self.binding)
            .field("events", &self.events)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{TestHost, record};

    type Record = Rc<MatchedRecord<TestHost>>;

    fn binding(
        record: &Record,
        name: &'static str,
        conflict: ConflictHandling,
    ) -> Rc<InstanceBinding<TestHost>> {
        let name = ViewName::from(name);
        InstanceBinding::new(Some(record.clone()), name, conflict)
            .into_shared()
    }

    fn hooks(record: &Record, conflict: ConflictHandling) -> LifecycleHooks<TestHost> {
        let binding = binding(record, "default", conflict);
        LifecycleHooks::new(binding, LifecycleEvents::all())
    }

    #[test]
    fn attach_then_detach_round_trips_the_slot() {
        let r = record("/", "Home");
        let h = hooks(&r, ConflictHandling::Replace);
        assert_eq!(h.on_attach(Some(&1)), Ok(Attached::Registered));
        assert_eq!(r.instance("default"), Some(1));
        assert_eq!(h.binding().attached(), Some(1));
        assert!(h.on_detach());
        assert_eq!(r.instance("default"), None);
        assert_eq!(h.binding().attached(), None);
        assert!(!h.on_detach());
    }

    #[test]
    fn missing_instance_or_record_is_skipped() {
        let r = record("/", "Home");
        let h = hooks(&r, ConflictHandling::Replace);
        assert_eq!(h.on_attach(None), Ok(Attached::Skipped));
        assert!(r.instances().is_empty());
        assert!(!h.on_detach());

        let unbound = InstanceBinding::<TestHost>::new(
            None,
            ViewName::DEFAULT,
            ConflictHandling::Error,
        );
        assert_eq!(unbound.attach(Some(&3)), Ok(Attached::Skipped));
        assert!(!unbound.detach());
    }

    #[test]
    fn update_reattach_is_idempotent() {
        let r = record("/", "Home");
        let h = hooks(&r, ConflictHandling::Error);
        assert_eq!(h.on_update(None), Ok(Attached::Skipped));
        assert_eq!(h.on_update(Some(&5)), Ok(Attached::Registered));
        assert_eq!(h.on_update(Some(&5)), Ok(Attached::Unchanged));
        assert_eq!(r.instance("default"), Some(5));
    }

    #[test]
    fn conflict_policies() {
        let r = record("/", "Home");
        let first = hooks(&r, ConflictHandling::Replace);
        first.on_attach(Some(&1)).unwrap();

        let strict = hooks(&r, ConflictHandling::Error);
        let err = strict.on_attach(Some(&2)).unwrap_err();
        assert_eq!(err.name, ViewName::DEFAULT);
        assert_eq!(err.record, "/");
        assert_eq!(r.instance("default"), Some(1));
        assert_eq!(strict.binding().attached(), None);

        let lenient = hooks(&r, ConflictHandling::Replace);
        assert_eq!(lenient.on_attach(Some(&2)), Ok(Attached::Replaced));
        assert_eq!(r.instance("default"), Some(2));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "already holds a different live instance")]
    fn debug_assert_policy_panics_in_debug() {
        let r = record("/", "Home");
        hooks(&r, ConflictHandling::Replace)
            .on_attach(Some(&1))
            .unwrap();
        let strict = hooks(&r, ConflictHandling::DebugAssert);
        let _ = strict.on_attach(Some(&2));
    }

    #[test]
    fn filtered_events_are_no_ops() {
        let r = record("/", "Home");
        let shared = binding(&r, "default", ConflictHandling::Replace);
        let detach_only = LifecycleHooks::new(shared.clone(), LifecycleEvents::DETACH);
        let attach_only = LifecycleHooks::new(shared, LifecycleEvents::ATTACH);

        assert_eq!(detach_only.on_attach(Some(&1)), Ok(Attached::Skipped));
        assert_eq!(detach_only.on_update(Some(&1)), Ok(Attached::Skipped));
        assert!(r.instances().is_empty());

        attach_only.on_attach(Some(&1)).unwrap();
        assert!(!attach_only.on_detach());
        assert_eq!(r.instance("default"), Some(1));
        assert!(detach_only.on_detach());
        assert!(r.instances().is_empty());
    }

    #[test]
    fn stale_detach_keeps_a_newer_instance() {
        let r = record("/", "Home");
        let old = hooks(&r, ConflictHandling::Replace);
        let new = hooks(&r, ConflictHandling::Replace);
        old.on_attach(Some(&1)).unwrap();

        // Same record rendered again; the new instance mounts first.
        assert_eq!(new.on_attach(Some(&2)), Ok(Attached::Replaced));
        assert!(!old.on_detach());
        assert_eq!(r.instance("default"), Some(2));

        assert!(new.on_detach());
        assert!(r.instances().is_empty());
    }

    #[test]
    fn bindings_only_touch_their_own_key() {
        let r = record("/", "Home");
        let main = hooks(&r, ConflictHandling::Replace);
        let side = binding(&r, "sidebar", ConflictHandling::Replace);
        main.on_attach(Some(&1)).unwrap();
        side.attach(Some(&2)).unwrap();
        assert!(main.on_detach());
        assert_eq!(r.instance("sidebar"), Some(2));
    }
}
