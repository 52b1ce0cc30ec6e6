// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! View-name keys.

use alloc::borrow::Cow;
use alloc::string::String;
use core::borrow::Borrow;
use core::fmt;

/// Label distinguishing one of several components rendered at the same depth.
///
/// Most routes only render a single component per depth, registered under
/// [`ViewName::DEFAULT`]. Named views let a record render, say, a sidebar and
/// a main panel side by side.
///
/// ```rust
/// use understory_route_view::ViewName;
///
/// assert_eq!(ViewName::default().as_str(), "default");
/// assert_eq!(ViewName::from("sidebar").as_str(), "sidebar");
/// ```
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewName(Cow<'static, str>);

impl ViewName {
    /// The name used when a view does not ask for a specific one.
    pub const DEFAULT: Self = Self(Cow::Borrowed("default"));

    /// Creates a view name from a static string without allocating.
    #[must_use]
    pub const fn new_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// Returns the name as a string slice.
    #[must_use]
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ViewName {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<&'static str> for ViewName {
    fn from(name: &'static str) -> Self {
        Self::new_static(name)
    }
}

impl From<String> for ViewName {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl Borrow<str> for ViewName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Debug for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ViewName").field(&self.as_str()).finish()
    }
}

impl fmt::Display for ViewName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
