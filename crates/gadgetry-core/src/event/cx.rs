// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Event context

use super::{Custom, TimerId};
use crate::Action;
use crate::gadget::{Gadget, GadgetFlags, GadgetId};
use crate::geom::{Coord, Offset, Rect};
use crate::page::{Page, PageId};
use crate::tree::Tree;

#[derive(Debug)]
pub(crate) enum NavRequest {
    Push(Box<dyn Page>),
    PushCached(PageId),
    Pop,
    Replace(Box<dyn Page>),
}

#[derive(Debug)]
pub(crate) enum TimerRequest {
    Subscribe(TimerId, GadgetId),
    Cancel(TimerId, GadgetId),
}

/// Requests recorded during a handler call
///
/// Applied by the router, in field order, once the handler returns.
#[derive(Debug, Default)]
pub(crate) struct Pending {
    pub action: Action,
    pub removals: Vec<GadgetId>,
    pub flags: Vec<(GadgetId, GadgetFlags, bool)>,
    /// Focus requests; `None` clears the page's focus
    pub focus: Vec<(PageId, Option<GadgetId>)>,
    pub timers: Vec<TimerRequest>,
    pub invalidate: Vec<GadgetId>,
    /// Custom events with target and whether a page handler posted them
    pub posts: Vec<(GadgetId, Custom, bool)>,
    pub nav: Vec<NavRequest>,
}

impl Pending {
    pub fn is_empty(&self) -> bool {
        self.action.is_empty()
            && self.removals.is_empty()
            && self.flags.is_empty()
            && self.focus.is_empty()
            && self.timers.is_empty()
            && self.invalidate.is_empty()
            && self.posts.is_empty()
            && self.nav.is_empty()
    }
}

/// Event context
///
/// Passed to gadget and page handlers. Tree queries are immediate; all
/// requests which change focus, flags, timers, the tree structure or the page
/// stack are recorded and applied by the [`Router`](crate::Router) after the
/// handler returns, before the next event is routed.
pub struct EventCx<'a> {
    tree: &'a mut Tree,
    pending: &'a mut Pending,
    page: PageId,
    root: GadgetId,
    id: Option<GadgetId>,
}

impl<'a> EventCx<'a> {
    pub(crate) fn new(
        tree: &'a mut Tree,
        pending: &'a mut Pending,
        page: PageId,
        root: GadgetId,
        id: Option<GadgetId>,
    ) -> Self {
        EventCx {
            tree,
            pending,
            page,
            root,
            id,
        }
    }

    /// The gadget being called, or `None` for page handlers
    #[inline]
    pub fn id(&self) -> Option<GadgetId> {
        self.id
    }

    /// The page owning the gadget being called
    #[inline]
    pub fn page(&self) -> PageId {
        self.page
    }

    /// The root gadget of [`Self::page`]
    #[inline]
    pub fn root(&self) -> GadgetId {
        self.root
    }

    /// The gadget being called, or the page root for page handlers
    #[inline]
    pub fn target(&self) -> GadgetId {
        self.id.unwrap_or(self.root)
    }

    /// Rect of [`Self::target`] in window coordinates
    pub fn rect(&self) -> Rect {
        self.tree.abs_rect(self.target()).unwrap_or_default()
    }

    /// Translate window coordinates to coordinates relative to
    /// [`Self::target`]
    pub fn to_local(&self, coord: Coord) -> Coord {
        coord - Offset::from(self.rect().pos)
    }

    /// Access the tree
    ///
    /// The gadget being called is not accessible through the tree.
    #[inline]
    pub fn tree(&self) -> &Tree {
        &*self.tree
    }

    /// Access another gadget
    pub fn gadget<T: Gadget>(&self, id: GadgetId) -> Option<&T> {
        self.tree.gadget(id)
    }

    /// Access another gadget mutably
    pub fn gadget_mut<T: Gadget>(&mut self, id: GadgetId) -> Option<&mut T> {
        self.tree.gadget_mut(id)
    }

    /// Add a gadget under `parent`
    ///
    /// Insertion is immediate. Returns `None` if `parent` is not a gadget of
    /// the current page.
    pub fn add(&mut self, parent: GadgetId, gadget: impl Gadget, rect: Rect) -> Option<GadgetId> {
        if self.tree.page(parent) != Some(self.page) {
            return None;
        }
        let id = self.tree.insert(parent, Box::new(gadget), rect)?;
        self.pending.action |= Action::REGION_MOVED;
        self.invalidate_gadget(id);
        Some(id)
    }

    /// Request removal of `id` and its subtree
    ///
    /// Page roots cannot be removed.
    pub fn remove(&mut self, id: GadgetId) {
        self.pending.removals.push(id);
    }

    /// Request a change to the enabled state of `id`
    pub fn set_enabled(&mut self, id: GadgetId, enabled: bool) {
        self.pending.flags.push((id, GadgetFlags::ENABLED, enabled));
    }

    /// Request a change to the visibility of `id`
    pub fn set_visible(&mut self, id: GadgetId, visible: bool) {
        self.pending.flags.push((id, GadgetFlags::VISIBLE, visible));
    }

    /// True if the current gadget has focus
    pub fn has_focus(&self) -> bool {
        self.id
            .is_some_and(|id| self.tree.flags(id).contains(GadgetFlags::FOCUSED))
    }

    /// Request focus for the current gadget
    ///
    /// Ignored unless the gadget is focusable, visible and enabled when the
    /// request is applied.
    pub fn request_focus(&mut self) {
        if let Some(id) = self.id {
            self.set_focus(id);
        }
    }

    /// Request focus for `id`, which must be on the current page
    pub fn set_focus(&mut self, id: GadgetId) {
        self.pending.focus.push((self.page, Some(id)));
    }

    /// Clear focus on the current page
    pub fn clear_focus(&mut self) {
        self.pending.focus.push((self.page, None));
    }

    /// Mark the current gadget for redraw
    pub fn invalidate(&mut self) {
        self.invalidate_gadget(self.target());
    }

    /// Mark a gadget for redraw
    ///
    /// All invalidated regions are combined into one redraw request per pump.
    pub fn invalidate_gadget(&mut self, id: GadgetId) {
        self.tree.set_flags(id, GadgetFlags::DIRTY, true);
        self.pending.invalidate.push(id);
        self.pending.action |= Action::REDRAW;
    }

    /// Subscribe the current gadget to `timer`
    ///
    /// From a page handler this subscribes the page itself: ticks are then
    /// delivered to [`Page::handle`].
    pub fn subscribe_timer(&mut self, timer: TimerId) {
        let id = self.target();
        self.pending.timers.push(TimerRequest::Subscribe(timer, id));
    }

    /// Cancel the current gadget's subscription to `timer`
    pub fn cancel_timer(&mut self, timer: TimerId) {
        let id = self.target();
        self.pending.timers.push(TimerRequest::Cancel(timer, id));
    }

    /// Post a custom event to `target`
    ///
    /// Delivered after the current handler returns, bubbling from `target`
    /// to its page. Events posted from a page handler stop at the page
    /// root: the page has already been offered them.
    pub fn post(&mut self, target: GadgetId, event: Custom) {
        let from_page = self.id.is_none();
        self.pending.posts.push((target, event, from_page));
    }

    /// Push a new page
    pub fn push_page(&mut self, page: impl Page) {
        self.pending.nav.push(NavRequest::Push(Box::new(page)));
        self.pending.action |= Action::NAVIGATE;
    }

    /// Push a cached page
    pub fn push_cached(&mut self, page: PageId) {
        self.pending.nav.push(NavRequest::PushCached(page));
        self.pending.action |= Action::NAVIGATE;
    }

    /// Pop the top page
    pub fn pop_page(&mut self) {
        self.pending.nav.push(NavRequest::Pop);
        self.pending.action |= Action::NAVIGATE;
    }

    /// Replace the top page
    pub fn replace_page(&mut self, page: impl Page) {
        self.pending.nav.push(NavRequest::Replace(Box::new(page)));
        self.pending.action |= Action::NAVIGATE;
    }
}
