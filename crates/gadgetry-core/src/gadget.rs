// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! The gadget contract

use crate::event::{Event, EventCx, Response};
use crate::geom::{Coord, Size};
use crate::render::Graph;
use std::any::Any;
use std::fmt::Debug;

slotmap::new_key_type! {
    /// Handle to a gadget in a [`Tree`](crate::Tree)
    ///
    /// Handles are never re-used: a handle to a removed gadget stays invalid.
    pub struct GadgetId;
}

bitflags::bitflags! {
    /// Gadget state flags
    ///
    /// `VISIBLE`, `ENABLED`, `FOCUSABLE` and `HOVER_WHEN_DISABLED` are
    /// configuration, set from [`Gadget::flags`] on insertion and changed via
    /// the router afterwards. `HOVERED`, `FOCUSED` and `DIRTY` are status
    /// maintained by the router and may only be read.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
    pub struct GadgetFlags: u16 {
        const VISIBLE = 1 << 0;
        const ENABLED = 1 << 1;
        const FOCUSABLE = 1 << 2;
        /// A disabled gadget with this flag is still hit for hover purposes
        const HOVER_WHEN_DISABLED = 1 << 3;
        const HOVERED = 1 << 8;
        const FOCUSED = 1 << 9;
        /// Awaiting redraw: set on invalidation, cleared by the flush after
        /// the one which requested the redraw
        const DIRTY = 1 << 10;
    }
}

impl GadgetFlags {
    /// Flags which may be set by gadgets and applications
    pub const CONFIG: Self = Self::VISIBLE
        .union(Self::ENABLED)
        .union(Self::FOCUSABLE)
        .union(Self::HOVER_WHEN_DISABLED);

    /// True if visible and enabled
    #[inline]
    pub fn is_interactive(self) -> bool {
        self.contains(Self::VISIBLE | Self::ENABLED)
    }

    /// True if focus may be assigned
    #[inline]
    pub fn can_focus(self) -> bool {
        self.contains(Self::VISIBLE | Self::ENABLED | Self::FOCUSABLE)
    }
}

impl Default for GadgetFlags {
    fn default() -> Self {
        GadgetFlags::VISIBLE | GadgetFlags::ENABLED
    }
}

/// A node in the gadget tree
///
/// Gadgets are owned by the [`Tree`](crate::Tree); tree structure, geometry
/// and flags live in the tree node, not in the gadget. A gadget only decides
/// how to react.
///
/// All methods have default implementations; a gadget which does not
/// override [`Gadget::handle`] declines everything, which is appropriate for
/// containers.
///
/// Handlers never modify tree state directly. Instead they record requests
/// on the [`EventCx`] (focus, invalidation, timers, navigation, removal)
/// which the [`Router`](crate::Router) applies once the handler returns.
pub trait Gadget: Any + Debug {
    /// Flags applied on insertion
    ///
    /// Only [`GadgetFlags::CONFIG`] bits are used.
    fn flags(&self) -> GadgetFlags {
        GadgetFlags::default()
    }

    /// Handle an event
    ///
    /// Return [`Response::Handled`] to stop delivery. Declined pointer, key,
    /// text and custom events bubble to the parent.
    fn handle(&mut self, cx: &mut EventCx<'_>, event: &Event) -> Response {
        let _ = (cx, event);
        Response::Declined
    }

    /// Precise hit test
    ///
    /// Called only when `coord` (relative to this gadget's origin) already
    /// lies within the gadget rect of the given `size` and no child was hit.
    /// Override to exclude transparent regions; `graph` supplies glyph and
    /// shape metrics.
    fn probe(&self, coord: Coord, size: Size, graph: &dyn Graph) -> bool {
        let _ = (coord, size, graph);
        true
    }

    /// Focus was granted
    fn on_focus(&mut self, cx: &mut EventCx<'_>) {
        let _ = cx;
    }

    /// Focus was revoked
    fn on_blur(&mut self, cx: &mut EventCx<'_>) {
        let _ = cx;
    }

    /// The pointer entered (`true`) or left (`false`)
    fn on_hover(&mut self, cx: &mut EventCx<'_>, hovered: bool) {
        let _ = (cx, hovered);
    }

    /// The gadget is being destroyed
    ///
    /// Children are torn down before their parent.
    fn on_remove(&mut self) {}
}

/// The root gadget of each page
///
/// This takes the full window rect and declines everything, leaving
/// page-level handling to the [`Page`](crate::Page).
#[derive(Debug, Default)]
pub(crate) struct Root;

impl Gadget for Root {}

impl dyn Gadget {
    /// Downcast to a concrete type
    #[inline]
    pub fn downcast_ref<T: Gadget>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref()
    }

    /// Downcast to a concrete type
    #[inline]
    pub fn downcast_mut<T: Gadget>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut()
    }
}
