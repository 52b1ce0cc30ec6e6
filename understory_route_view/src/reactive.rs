// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Revision-stamped cells and memoized derived values.
//!
//! The model is pull-based. An [`Observable`] bumps a revision counter on every
//! write. A [`Memo`] remembers the stamp (usually a tuple of revisions) it was
//! computed for and only re-runs its computation when asked with a different
//! stamp. There is no subscription list; whoever renders asks again and gets
//! either the cached value or a fresh one.
//!
//! ```rust
//! use understory_route_view::{Memo, Observable};
//!
//! let count = Observable::new(2_u32);
//! let mut doubled = Memo::new();
//!
//! assert_eq!(*doubled.get_or_update(count.revision(), || count.get() * 2), 4);
//! // Same revision: cached.
//! assert_eq!(*doubled.get_or_update(count.revision(), || unreachable!()), 4);
//!
//! count.set(5);
//! assert_eq!(*doubled.get_or_update(count.revision(), || count.get() * 2), 10);
//! assert_eq!(doubled.computations(), 2);
//! ```

use core::cell::{Cell, RefCell};
use core::fmt;

/// Monotonic change counter of an [`Observable`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Revision(u64);

impl Revision {
    /// Returns the raw counter value.
    #[must_use]
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }

    fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A value cell that records a new [`Revision`] on every write.
///
/// Writes go through `&self` so that a cell can be shared by reference with
/// every view in a tree while the owner (typically the router) updates it.
pub struct Observable<T> {
    value: RefCell<T>,
    revision: Cell<Revision>,
}

impl<T> Observable<T> {
    /// Creates a cell at revision zero.
    #[must_use]
    pub fn new(value: T) -> Self {
        Self {
            value: RefCell::new(value),
            revision: Cell::new(Revision::default()),
        }
    }

    /// The current revision.
    #[must_use]
    #[inline]
    pub fn revision(&self) -> Revision {
        self.revision.get()
    }

    /// Replaces the value and bumps the revision.
    pub fn set(&self, value: T) {
        self.replace(value);
    }

    /// Replaces the value, bumps the revision, and returns the old value.
    pub fn replace(&self, value: T) -> T {
        let old = self.value.replace(value);
        self.revision.set(self.revision.get().next());
        old
    }

    /// Runs `f` with a shared borrow of the value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.borrow())
    }
}

impl<T: Clone> Observable<T> {
    /// Returns a clone of the value.
    #[must_use]
    pub fn get(&self) -> T {
        self.value.borrow().clone()
    }
}

impl<T: PartialEq> Observable<T> {
    /// Sets the value only if it differs, returning whether it changed.
    ///
    /// Unchanged writes keep the revision, so nothing derived from this cell
    /// is recomputed.
    pub fn set_if_changed(&self, value: T) -> bool {
        if *self.value.borrow() == value {
            return false;
        }
        self.set(value);
        true
    }
}

impl<T: Default> Default for Observable<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Observable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observable")
            .field("value", &self.value.borrow())
            .field("revision", &self.revision.get())
            .finish()
    }
}

/// A cached derived value keyed by the stamp of its inputs.
///
/// `S` is whatever identifies the state the value was derived from; a tuple of
/// [`Revision`]s is typical. Stamps are compared with `==`, so two different
/// input states must never produce equal stamps.
pub struct Memo<S, T> {
    stamp: Option<S>,
    value: Option<T>,
    computations: u64,
}

impl<S: PartialEq, T> Memo<S, T> {
    /// Creates an empty memo; the first read always computes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stamp: None,
            value: None,
            computations: 0,
        }
    }

    /// Returns `true` if a read with `stamp` would recompute.
    #[must_use]
    pub fn is_stale(&self, stamp: &S) -> bool {
        self.value.is_none() || self.stamp.as_ref() != Some(stamp)
    }

    /// Returns the cached value for `stamp`, computing it with `f` if stale.
    pub fn get_or_update(&mut self, stamp: S, f: impl FnOnce() -> T) -> &T {
        if self.is_stale(&stamp) {
            self.value = None;
            self.stamp = Some(stamp);
            self.computations += 1;
        }
        self.value.get_or_insert_with(f)
    }

    /// Returns the cached value regardless of staleness.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Drops the cached value, forcing the next read to recompute.
    pub fn invalidate(&mut self) {
        self.stamp = None;
        self.value = None;
    }

    /// How many times the value has been computed.
    #[must_use]
    pub fn computations(&self) -> u64 {
        self.computations
    }
}

impl<S: PartialEq, T> Default for Memo<S, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: fmt::Debug, T: fmt::Debug> fmt::Debug for Memo<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("stamp", &self.stamp)
            .field("value", &self.value)
            .field("computations", &self.computations)
            .finish()
    }
}
