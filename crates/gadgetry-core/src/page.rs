// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Pages
//!
//! A page is one full screen: a root gadget covering the window, the subtree
//! beneath it and page-level logic (global shortcuts, navigation).

use crate::event::{Event, EventCx, Response};
use crate::gadget::{Gadget, GadgetId};
use crate::geom::{Rect, Size};
use crate::tree::Tree;
use std::any::Any;
use std::fmt::Debug;

slotmap::new_key_type! {
    /// Handle to a page registered with a [`Router`](crate::Router)
    pub struct PageId;
}

/// Page lifecycle state
///
/// ```text
/// Dormant -> Entering -> Active -> Leaving -> Dormant | destroyed
/// ```
///
/// Transitions are only caused by page stack navigation. `Entering` and
/// `Leaving` are observable only from within [`Page::on_enter`] and
/// [`Page::on_leave`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PageState {
    #[default]
    Dormant,
    Entering,
    Active,
    Leaving,
}

impl PageState {
    /// True if the page may receive input
    #[inline]
    pub fn is_active(self) -> bool {
        self == PageState::Active
    }
}

/// Application page
///
/// All methods have defaults. Page-level handlers receive an [`EventCx`]
/// whose [`EventCx::id`] is `None`.
pub trait Page: Any + Debug {
    /// Construct the gadget subtree
    ///
    /// Called once, when the page first enters.
    fn build(&mut self, cx: &mut BuildCx<'_>) {
        let _ = cx;
    }

    /// The page became active
    fn on_enter(&mut self, cx: &mut EventCx<'_>) {
        let _ = cx;
    }

    /// The page is no longer active
    ///
    /// Hover and focus have already been cleared.
    fn on_leave(&mut self, cx: &mut EventCx<'_>) {
        let _ = cx;
    }

    /// Handle an event no gadget handled
    ///
    /// Custom events are offered here before reaching any gadget.
    fn handle(&mut self, cx: &mut EventCx<'_>, event: &Event) -> Response {
        let _ = (cx, event);
        Response::Declined
    }

    /// Whether input not consumed by this page reaches the page below
    ///
    /// Pointer events fall through where no gadget other than the page root
    /// is hit. Read once when the page is registered.
    fn pass_through(&self) -> bool {
        false
    }

    /// Whether this page survives being popped
    ///
    /// A cached page returns to `Dormant` when popped and may be pushed
    /// again with [`Router::push_cached`](crate::Router::push_cached). Read
    /// once when the page is registered.
    fn cached(&self) -> bool {
        false
    }
}

impl dyn Page {
    /// Downcast to a concrete type
    #[inline]
    pub fn downcast_ref<T: Page>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref()
    }

    /// Downcast to a concrete type
    #[inline]
    pub fn downcast_mut<T: Page>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut()
    }
}

/// A page with no content
///
/// Suitable as the base of the page stack.
#[derive(Debug, Default)]
pub struct BlankPage;

impl Page for BlankPage {}

/// Context for [`Page::build`]
pub struct BuildCx<'a> {
    tree: &'a mut Tree,
    page: PageId,
    root: GadgetId,
    window: Size,
}

impl<'a> BuildCx<'a> {
    pub(crate) fn new(tree: &'a mut Tree, page: PageId, root: GadgetId, window: Size) -> Self {
        BuildCx {
            tree,
            page,
            root,
            window,
        }
    }

    /// The page being built
    #[inline]
    pub fn page(&self) -> PageId {
        self.page
    }

    /// The page root
    #[inline]
    pub fn root(&self) -> GadgetId {
        self.root
    }

    /// Current window size
    #[inline]
    pub fn window_size(&self) -> Size {
        self.window
    }

    /// Add a gadget under `parent`
    ///
    /// `rect` is relative to `parent`. Returns `None` if `parent` is not a
    /// gadget of this page.
    pub fn add(
        &mut self,
        parent: GadgetId,
        gadget: impl Gadget,
        rect: Rect,
    ) -> Option<GadgetId> {
        self.add_boxed(parent, Box::new(gadget), rect)
    }

    /// Add a boxed gadget under `parent`
    pub fn add_boxed(
        &mut self,
        parent: GadgetId,
        gadget: Box<dyn Gadget>,
        rect: Rect,
    ) -> Option<GadgetId> {
        if self.tree.page(parent) != Some(self.page) {
            return None;
        }
        self.tree.insert(parent, gadget, rect)
    }

    /// Access the tree
    #[inline]
    pub fn tree(&self) -> &Tree {
        &*self.tree
    }
}
