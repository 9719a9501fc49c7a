// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Event handling: Response type

/// Response from [`Gadget::handle`](crate::Gadget::handle) and
/// [`Page::handle`](crate::Page::handle)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[must_use]
pub enum Response {
    /// Event was consumed; delivery stops here
    Handled,
    /// Event was not consumed
    ///
    /// Declined events may be re-offered to an ancestor or the page.
    #[default]
    Declined,
}

pub use Response::{Declined, Handled};

impl Response {
    /// True if variant is `Handled`
    #[inline]
    pub fn is_handled(self) -> bool {
        matches!(self, Handled)
    }

    /// True if variant is `Declined`
    #[inline]
    pub fn is_declined(self) -> bool {
        matches!(self, Declined)
    }

    /// If `self` is `Declined`, try `f`
    #[inline]
    pub fn or_else(self, f: impl FnOnce() -> Response) -> Response {
        match self {
            Handled => Handled,
            Declined => f(),
        }
    }
}

/// `true` maps to `Handled`
impl From<bool> for Response {
    #[inline]
    fn from(handled: bool) -> Self {
        if handled { Handled } else { Declined }
    }
}

impl std::ops::BitOr for Response {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self {
        (self.is_handled() || rhs.is_handled()).into()
    }
}
