// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Event handling
//!
//! See documentation of [`Event`] values.
//!
//! ## Event intake
//!
//! A platform shim reports [`RawInput`] samples to an [`Input`] translator,
//! which normalises them into [`Event`] values and pushes them onto a
//! [`Queue`]. The queue is the only thread-safe part of the pipeline: any
//! number of [`Sender`] handles may enqueue concurrently while one
//! [`Router`](crate::Router) drains.
//!
//! ## Event delivery
//!
//! Events are delivered by [`Router::pump`](crate::Router::pump), strictly
//! in enqueue order:
//!
//! -   Pointer events go to the deepest gadget under the pointer, after hover
//!     enter/leave notifications
//! -   Key and text events go to the focused gadget, or to the page root when
//!     nothing has focus
//! -   Timer events go to each subscribed gadget
//! -   Custom events go to the page
//!
//! Each gadget returns a [`Response`]. A [`Declined`] pointer, key, text or
//! custom event is re-offered to the parent, and so on up to the page root,
//! then to the [`Page`](crate::Page) itself. Disabled gadgets are skipped for
//! pointer, key and text input.
//!
//! ### Requests
//!
//! Handlers receive an [`EventCx`]. Requests made through it (focus changes,
//! invalidation, timer subscriptions, removal, page navigation) are not
//! applied during delivery. The router applies them once the current event
//! has been fully delivered, before routing the next one.
//!
//! ### Keyboard focus
//!
//! Each page has at most one focused gadget. Focus is granted only on
//! request ([`EventCx::request_focus`]) or by <kbd>Tab</kbd> navigation when
//! no handler consumes the key.

mod cx;
#[allow(clippy::module_inception)]
mod event;
mod input;
mod queue;
mod response;

pub use cx::EventCx;
pub(crate) use cx::{NavRequest, Pending, TimerRequest};
pub use event::*;
pub use input::{Input, MoveCoalescing, Platform, RawInput, default_keymap};
pub use queue::{Drain, OverflowPolicy, Queue, Sender, TrySendError};
pub use response::{Declined, Handled, Response};
