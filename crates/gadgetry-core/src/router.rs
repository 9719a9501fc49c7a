// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Event routing

use crate::Action;
use crate::config::{Config, ConfigMsg};
use crate::diag::{Diagnostics, Fault, Reporter};
use crate::event::{
    Custom, Declined, Event, EventCx, Handled, KeyCode, KeyEvent, KeyKind, Modifiers, NavRequest,
    Pending, Queue, Queued, Response, TimerId, TimerRequest,
};
use crate::gadget::{Gadget, GadgetFlags, GadgetId};
use crate::geom::{Coord, Rect, Size};
use crate::page::{BuildCx, Page, PageId, PageState};
use crate::render::Graph;
use crate::stack::PageStack;
use crate::timer::Timers;
use crate::tree::{Path, Tree};
use rustc_hash::FxHashSet;

/// The event router
///
/// The router owns the gadget tree, the page stack, focus and hover state and
/// timer subscriptions. Each call to [`Router::pump`] drains a [`Queue`] and
/// routes every drained event:
///
/// -   **Pointer** events are hit-tested against the active pages. Hover
///     transitions (leave then enter) fire first; the event is then offered
///     to the deepest hit gadget, bubbling through enabled ancestors to the
///     page root and finally to the [`Page`].
/// -   **Key** and **text** events start at the focused gadget of the top
///     page (or its root), bubble to the page root, then reach the page. A
///     [pass-through](Page::pass_through) page passes declined input on to
///     the page below. Unconsumed Tab presses move focus.
/// -   **Timer** events reach each subscribed gadget exactly once.
/// -   **Custom** events reach the page first, which may re-route them with
///     [`EventCx::post`].
///
/// Requests recorded by handlers are applied after each handler pass and
/// before the next event; page transitions thus never interleave with
/// delivery. Undeliverable events are counted (see [`Diagnostics`]).
#[derive(Debug)]
pub struct Router {
    config: Config,
    window: Size,
    tree: Tree,
    pages: PageStack,
    timers: Timers,
    pending: Pending,
    action: Action,
    /// Deepest first
    hover: Path,
    hover_page: Option<PageId>,
    last_pointer: Option<Coord>,
    /// Invalidated since the last flush
    dirty_gadgets: Vec<GadgetId>,
    /// Covered by the last redraw request
    drawn: Vec<GadgetId>,
    last_dropped: u64,
    seq: u64,
    reporter: Reporter,
}

/// Construction and configuration
impl Router {
    /// Construct with a base page
    ///
    /// The base page is entered immediately. It may be replaced but never
    /// popped.
    pub fn new(config: Config, window: Size, base: impl Page) -> Self {
        let mut tree = Tree::new();
        let pages = PageStack::new(&mut tree, Box::new(base), window);
        let base = pages.top();
        let mut router = Router {
            config,
            window,
            tree,
            pages,
            timers: Timers::default(),
            pending: Pending::default(),
            action: Action::empty(),
            hover: Path::new(),
            hover_page: None,
            last_pointer: None,
            dirty_gadgets: vec![],
            drawn: vec![],
            last_dropped: 0,
            seq: 0,
            reporter: Reporter::default(),
        };
        router.enter(base);
        router.settle(None);
        router
    }

    /// Access the configuration
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Update the configuration
    pub fn change_config(&mut self, msg: ConfigMsg) -> bool {
        self.config.change_config(msg)
    }

    /// Current window size
    #[inline]
    pub fn window_size(&self) -> Size {
        self.window
    }

    /// Resize the window
    ///
    /// Every page root is resized to cover the window. Hover is recomputed
    /// on the next pump.
    pub fn resize(&mut self, size: Size) {
        if size == self.window {
            return;
        }
        log::debug!(target: "gadgetry_core::event", "resize: {:?} -> {size:?}", self.window);
        self.window = size;
        let rect = Rect::new(Coord::ZERO, size);
        for entry in self.pages.entries_mut() {
            self.tree.set_rect(entry.root, rect);
        }
        for page in self.pages.active_set() {
            self.mark_dirty(page, rect);
        }
        self.action |= Action::REGION_MOVED;
    }

    /// Set a hook called on each [`Fault`]
    ///
    /// Faults are also logged and counted regardless.
    pub fn set_fault_handler(&mut self, handler: impl FnMut(&Fault) + 'static) {
        self.reporter.handler = Some(Box::new(handler));
    }

    /// Diagnostic counters
    #[inline]
    pub fn diagnostics(&self) -> Diagnostics {
        self.reporter.diagnostics
    }
}

/// Event routing
impl Router {
    /// Drain `queue` and route each event, then request at most one redraw
    ///
    /// Returns the number of events routed.
    pub fn pump(&mut self, queue: &Queue, graph: &mut dyn Graph) -> usize {
        let dropped = queue.dropped();
        if dropped > self.last_dropped {
            let count = dropped - self.last_dropped;
            self.reporter.report(Fault::QueueOverflow { count });
        }
        self.last_dropped = dropped;

        let events = queue.drain();
        let n = events.len();
        for queued in events {
            self.route(queued, &*graph);
        }
        self.flush(graph);
        n
    }

    /// Route a single event
    ///
    /// All requests made by handlers are applied before this returns.
    /// Redraw requests are accumulated until [`Self::flush`].
    pub fn route(&mut self, queued: Queued, graph: &dyn Graph) {
        let Queued { seq, event } = queued;
        log::trace!(target: "gadgetry_core::event", "route: #{seq} {event:?}");
        self.seq = seq;
        self.reporter.diagnostics.routed += 1;
        self.settle(Some(graph));

        let response = match &event {
            Event::Pointer(ev) => self.route_pointer(ev.coord, &event, graph),
            Event::Key(_) | Event::Text(_) => self.route_key(&event),
            Event::Timer(timer) => self.route_timer(seq, *timer),
            Event::Custom(_) => self.route_custom(&event),
        };
        if response.is_declined() {
            self.reporter.report(Fault::UnroutableEvent { seq });
        }

        self.settle(Some(graph));
    }

    /// Apply outstanding requests and issue the combined redraw request
    ///
    /// The union of all regions invalidated on active pages since the last
    /// flush (or the whole window after a page transition) is passed to
    /// [`Graph::request_redraw`] in a single call.
    ///
    /// Gadgets covered by this request keep [`GadgetFlags::DIRTY`] until the
    /// following flush.
    pub fn flush(&mut self, graph: &mut dyn Graph) {
        self.settle(Some(&*graph));

        for id in std::mem::take(&mut self.drawn) {
            self.tree.set_flags(id, GadgetFlags::DIRTY, false);
        }
        for id in &self.dirty_gadgets {
            self.tree.set_flags(*id, GadgetFlags::DIRTY, true);
        }
        self.drawn = std::mem::take(&mut self.dirty_gadgets);

        let window = Rect::new(Coord::ZERO, self.window);
        let mut region: Option<Rect> = None;
        for page in self.pages.active_set() {
            if let Some(dirty) = self.pages.entry_mut(page).and_then(|e| e.dirty.take()) {
                region = Some(region.map_or(dirty, |r| r.union(&dirty)));
            }
        }
        for entry in self.pages.entries_mut() {
            entry.dirty = None;
        }
        if self.action.contains(Action::NAVIGATE) {
            region = Some(window);
        }
        self.action.remove(Action::REDRAW | Action::NAVIGATE);

        if let Some(rect) = region.and_then(|r| r.intersection(&window)) {
            log::trace!(target: "gadgetry_core::event", "flush: request_redraw({rect:?})");
            graph.request_redraw(rect);
            self.reporter.diagnostics.redraw_requests += 1;
        }
    }

    /// Offer `event` to gadget `id` only
    ///
    /// The event does not bubble. Requests made by the handler are applied
    /// before this returns.
    pub fn dispatch(&mut self, id: GadgetId, event: &Event) -> Response {
        let response = self.call_gadget(id, |g, cx| g.handle(cx, event));
        self.settle(None);
        response.unwrap_or(Declined)
    }

    /// Deliver a custom event to `target`, bubbling to its page
    pub fn post(&mut self, target: GadgetId, event: Custom) {
        self.deliver_post(target, event, true);
        self.settle(None);
    }

    fn route_pointer(&mut self, coord: Coord, event: &Event, graph: &dyn Graph) -> Response {
        self.last_pointer = Some(coord);
        self.action.remove(Action::REGION_MOVED);
        self.update_hover(graph);
        self.settle(Some(graph));

        let Some(page) = self.hover_page else {
            return Declined;
        };
        let path = self.hover.clone();
        self.bubble(page, &path, event, true)
    }

    fn route_key(&mut self, event: &Event) -> Response {
        for page in self.pages.active_set() {
            let Some(start) = self.pages.focus(page).or(self.pages.root(page)) else {
                continue;
            };
            let path = self.tree.path(start);
            if self.bubble(page, &path, event, true).is_handled() {
                return Handled;
            }
        }

        if self.config.tab_navigation
            && let Event::Key(KeyEvent {
                kind,
                code: KeyCode::Tab,
                modifiers,
            }) = event
        {
            if *kind == KeyKind::Down {
                let page = self.pages.top();
                self.focus_next(page, modifiers.contains(Modifiers::SHIFT));
            }
            return Handled;
        }
        Declined
    }

    fn route_timer(&mut self, seq: u64, timer: TimerId) -> Response {
        let subscribers = self.timers.subscribers(timer).to_vec();
        if subscribers.is_empty() {
            return Declined;
        }
        let active = self.pages.active_set();
        let event = Event::Timer(timer);
        for id in subscribers {
            let Some(page) = self.tree.page(id) else {
                continue;
            };
            if !active.contains(&page) {
                self.reporter.report(Fault::StaleTarget { seq, page });
                continue;
            }
            log::trace!(target: "gadgetry_core::event", "route_timer: {timer:?} -> {id:?}");
            if self.pages.root(page) == Some(id) {
                // subscribed from a page handler
                let _ = self.call_page(page, |p, cx| p.handle(cx, &event));
            } else {
                let _ = self.call_gadget(id, |g, cx| g.handle(cx, &event));
            }
        }
        Handled
    }

    fn route_custom(&mut self, event: &Event) -> Response {
        for page in self.pages.active_set() {
            let response = self.call_page(page, |p, cx| p.handle(cx, event));
            if response == Some(Handled) {
                return Handled;
            }
        }
        Declined
    }

    fn deliver_post(&mut self, target: GadgetId, custom: Custom, to_page: bool) {
        let seq = self.seq;
        let Some(page) = self.tree.page(target) else {
            self.reporter.report(Fault::UnroutableEvent { seq });
            return;
        };
        if !self.pages.active_set().contains(&page) {
            self.reporter.report(Fault::StaleTarget { seq, page });
            return;
        }
        let path = self.tree.path(target);
        if self.bubble(page, &path, &Event::Custom(custom), to_page).is_declined() {
            self.reporter.report(Fault::UnroutableEvent { seq });
        }
    }

    /// Offer `event` along `path` (deepest first) then, if `to_page`, to
    /// `page`
    fn bubble(
        &mut self,
        page: PageId,
        path: &[GadgetId],
        event: &Event,
        to_page: bool,
    ) -> Response {
        for id in path {
            let flags = self.tree.flags(*id);
            if !flags.contains(GadgetFlags::VISIBLE)
                || !(flags.contains(GadgetFlags::ENABLED) || event.pass_when_disabled())
            {
                continue;
            }
            if self.call_gadget(*id, |g, cx| g.handle(cx, event)) == Some(Handled) {
                log::trace!(target: "gadgetry_core::event", "bubble: handled by {id:?}");
                return Handled;
            }
            if !event.bubbles() {
                return Declined;
            }
        }
        if !to_page {
            return Declined;
        }
        let response = self.call_page(page, |p, cx| p.handle(cx, event));
        response.unwrap_or(Declined)
    }

    fn call_gadget<R>(
        &mut self,
        id: GadgetId,
        f: impl FnOnce(&mut dyn Gadget, &mut EventCx<'_>) -> R,
    ) -> Option<R> {
        let page = self.tree.page(id)?;
        let root = self.pages.root(page)?;
        let mut gadget = self.tree.take(id)?;
        let result = {
            let mut cx = EventCx::new(&mut self.tree, &mut self.pending, page, root, Some(id));
            f(&mut *gadget, &mut cx)
        };
        self.tree.restore(id, gadget);
        Some(result)
    }

    fn call_page<R>(
        &mut self,
        page: PageId,
        f: impl FnOnce(&mut dyn Page, &mut EventCx<'_>) -> R,
    ) -> Option<R> {
        let entry = self.pages.entry_mut(page)?;
        let root = entry.root;
        let mut object = entry.page.take()?;
        let result = {
            let mut cx = EventCx::new(&mut self.tree, &mut self.pending, page, root, None);
            f(&mut *object, &mut cx)
        };
        if let Some(entry) = self.pages.entry_mut(page) {
            entry.page = Some(object);
        }
        Some(result)
    }

    /// Apply pending requests until none remain
    ///
    /// Hover is recomputed only when `graph` is available.
    fn settle(&mut self, graph: Option<&dyn Graph>) {
        let mut rounds = 0;
        loop {
            let hover = graph.filter(|_| self.action.contains(Action::REGION_MOVED));
            if self.pending.is_empty() && hover.is_none() {
                break;
            }
            rounds += 1;
            if rounds > self.config.max_request_rounds {
                log::warn!(
                    target: "gadgetry_core::event",
                    "settle: requests still pending after {} rounds; discarding",
                    self.config.max_request_rounds
                );
                self.pending = Pending::default();
                self.action.remove(Action::REGION_MOVED);
                break;
            }

            if !self.pending.is_empty() {
                let pending = std::mem::take(&mut self.pending);
                self.apply(pending);
            } else if let Some(graph) = hover {
                self.action.remove(Action::REGION_MOVED);
                self.update_hover(graph);
            }
        }
    }

    fn apply(&mut self, pending: Pending) {
        let Pending {
            action,
            removals,
            flags,
            focus,
            timers,
            invalidate,
            posts,
            nav,
        } = pending;
        self.action |= action;

        for id in removals {
            self.remove_gadget(id);
        }
        for (id, flag, state) in flags {
            self.set_flag(id, flag, state);
        }
        for (page, target) in focus {
            self.set_focus_inner(page, target);
        }
        for req in timers {
            match req {
                TimerRequest::Subscribe(timer, id) if self.tree.contains(id) => {
                    self.timers.subscribe(timer, id);
                }
                TimerRequest::Subscribe(..) => (),
                TimerRequest::Cancel(timer, id) => {
                    self.timers.cancel(timer, id);
                }
            }
        }
        for id in invalidate {
            self.invalidate(id);
        }
        for (target, custom, from_page) in posts {
            self.deliver_post(target, custom, !from_page);
        }
        for req in nav {
            self.navigate(req);
        }
    }
}

/// Hover
impl Router {
    /// The deepest hovered gadget
    #[inline]
    pub fn hovered(&self) -> Option<GadgetId> {
        self.hover.first().copied()
    }

    /// Find the gadget under `coord` on the active pages
    ///
    /// Pages are tested top-most first. On a pass-through page a hit on the
    /// page root counts as a miss.
    pub fn hit_test(&self, coord: Coord, graph: &dyn Graph) -> Option<GadgetId> {
        self.hit(coord, graph).map(|(_, id)| id)
    }

    fn hit(&self, coord: Coord, graph: &dyn Graph) -> Option<(PageId, GadgetId)> {
        for page in self.pages.active_set() {
            let Some(root) = self.pages.root(page) else {
                continue;
            };
            match self.tree.hit_test(root, coord, graph) {
                Some(id) if id == root && self.pages.pass_through(page) => (),
                Some(id) => return Some((page, id)),
                None => (),
            }
        }
        None
    }

    fn update_hover(&mut self, graph: &dyn Graph) {
        let (page, new) = match self.last_pointer.and_then(|c| self.hit(c, graph)) {
            Some((page, id)) => (Some(page), self.tree.path(id)),
            None => (None, Path::new()),
        };
        if new == self.hover {
            self.hover_page = page;
            return;
        }
        let old = std::mem::replace(&mut self.hover, new.clone());
        self.hover_page = page;
        log::trace!(target: "gadgetry_core::event", "update_hover: {:?} -> {:?}", old.first(), new.first());

        let common = old
            .iter()
            .rev()
            .zip(new.iter().rev())
            .take_while(|(a, b)| a == b)
            .count();
        for id in &old[..old.len() - common] {
            self.tree.set_flags(*id, GadgetFlags::HOVERED, false);
            let _ = self.call_gadget(*id, |g, cx| g.on_hover(cx, false));
        }
        for id in new[..new.len() - common].iter().rev() {
            self.tree.set_flags(*id, GadgetFlags::HOVERED, true);
            let _ = self.call_gadget(*id, |g, cx| g.on_hover(cx, true));
        }
    }

    fn clear_hover(&mut self) {
        for id in std::mem::take(&mut self.hover) {
            self.tree.set_flags(id, GadgetFlags::HOVERED, false);
            let _ = self.call_gadget(id, |g, cx| g.on_hover(cx, false));
        }
        self.hover_page = None;
    }
}

/// Focus
impl Router {
    /// The focused gadget of `page`
    #[inline]
    pub fn focus(&self, page: PageId) -> Option<GadgetId> {
        self.pages.focus(page)
    }

    /// The focused gadget of the top page
    #[inline]
    pub fn focused(&self) -> Option<GadgetId> {
        self.pages.focus(self.pages.top())
    }

    /// Give focus to `id`
    ///
    /// Returns false if `id` is not a focusable, visible, enabled gadget of
    /// an active page.
    pub fn set_focus(&mut self, id: GadgetId) -> bool {
        let Some(page) = self.tree.page(id) else {
            return false;
        };
        let result = self.set_focus_inner(page, Some(id));
        self.settle(None);
        result
    }

    /// Clear focus on the top page
    pub fn clear_focus(&mut self) {
        let page = self.pages.top();
        self.set_focus_inner(page, None);
        self.settle(None);
    }

    fn focus_next(&mut self, page: PageId, reverse: bool) {
        let Some(root) = self.pages.root(page) else {
            return;
        };
        let from = self.pages.focus(page);
        if let Some(next) = self.tree.next_focusable(root, from, reverse) {
            self.set_focus_inner(page, Some(next));
        }
    }

    fn set_focus_inner(&mut self, page: PageId, target: Option<GadgetId>) -> bool {
        let Some(entry) = self.pages.entry(page) else {
            return false;
        };
        if let Some(id) = target
            && !(entry.state.is_active()
                && self.tree.page(id) == Some(page)
                && self.tree.flags(id).can_focus()
                && self.tree.is_interactive(id))
        {
            log::debug!(target: "gadgetry_core::event", "set_focus: rejected {id:?} on {page:?}");
            return false;
        }

        let old = entry.focus;
        if old == target {
            return true;
        }
        log::debug!(target: "gadgetry_core::event", "set_focus: {page:?}: {old:?} -> {target:?}");

        if let Some(old) = old {
            if let Some(entry) = self.pages.entry_mut(page) {
                entry.focus = None;
            }
            self.tree.set_flags(old, GadgetFlags::FOCUSED, false);
            let _ = self.call_gadget(old, |g, cx| g.on_blur(cx));
            self.invalidate(old);
        }
        if let Some(id) = target {
            if let Some(entry) = self.pages.entry_mut(page) {
                entry.focus = Some(id);
            }
            self.tree.set_flags(id, GadgetFlags::FOCUSED, true);
            let _ = self.call_gadget(id, |g, cx| g.on_focus(cx));
            self.invalidate(id);
        }
        true
    }
}

/// Tree access
impl Router {
    /// Access the gadget tree
    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Access a gadget as a concrete type
    pub fn gadget<T: Gadget>(&self, id: GadgetId) -> Option<&T> {
        self.tree.gadget(id)
    }

    /// Access a gadget mutably as a concrete type
    ///
    /// Changes affecting appearance should be followed by
    /// [`Self::invalidate`].
    pub fn gadget_mut<T: Gadget>(&mut self, id: GadgetId) -> Option<&mut T> {
        self.tree.gadget_mut(id)
    }

    /// Add a gadget as the top-most child of `parent`
    pub fn add(&mut self, parent: GadgetId, gadget: impl Gadget, rect: Rect) -> Option<GadgetId> {
        let id = self.tree.insert(parent, Box::new(gadget), rect)?;
        self.invalidate(id);
        self.action |= Action::REGION_MOVED;
        Some(id)
    }

    /// Remove a gadget and its subtree
    ///
    /// Focus held within the subtree is cleared (reported as
    /// [`Fault::DanglingFocus`]) and timer subscriptions are cancelled.
    /// Page roots cannot be removed.
    pub fn remove(&mut self, id: GadgetId) {
        self.remove_gadget(id);
        self.settle(None);
    }

    /// Move or resize a gadget
    pub fn set_rect(&mut self, id: GadgetId, rect: Rect) {
        let (Some(page), Some(old)) = (self.tree.page(id), self.tree.abs_rect(id)) else {
            return;
        };
        self.mark_dirty(page, old);
        self.tree.set_rect(id, rect);
        self.invalidate(id);
        self.action |= Action::REGION_MOVED;
    }

    /// Enable or disable a gadget
    ///
    /// Disabling the focus holder or one of its ancestors clears focus.
    pub fn set_enabled(&mut self, id: GadgetId, enabled: bool) {
        self.set_flag(id, GadgetFlags::ENABLED, enabled);
        self.settle(None);
    }

    /// Show or hide a gadget
    ///
    /// Hiding the focus holder or one of its ancestors clears focus.
    pub fn set_visible(&mut self, id: GadgetId, visible: bool) {
        self.set_flag(id, GadgetFlags::VISIBLE, visible);
        self.settle(None);
    }

    /// Mark a gadget's region for redraw
    pub fn invalidate(&mut self, id: GadgetId) {
        let (Some(page), Some(rect)) = (self.tree.page(id), self.tree.abs_rect(id)) else {
            return;
        };
        self.tree.set_flags(id, GadgetFlags::DIRTY, true);
        self.dirty_gadgets.push(id);
        self.mark_dirty(page, rect);
    }

    /// Subscribe `id` to `timer`
    pub fn subscribe(&mut self, timer: TimerId, id: GadgetId) {
        if self.tree.contains(id) {
            self.timers.subscribe(timer, id);
        }
    }

    /// Cancel a timer subscription
    pub fn cancel(&mut self, timer: TimerId, id: GadgetId) -> bool {
        self.timers.cancel(timer, id)
    }

    /// Access timer subscriptions
    #[inline]
    pub fn timers(&self) -> &Timers {
        &self.timers
    }

    fn mark_dirty(&mut self, page: PageId, rect: Rect) {
        if let Some(entry) = self.pages.entry_mut(page) {
            entry.dirty = Some(entry.dirty.map_or(rect, |d| d.union(&rect)));
            self.action |= Action::REDRAW;
        }
    }

    fn remove_gadget(&mut self, id: GadgetId) {
        let Some(page) = self.tree.page(id) else {
            return;
        };
        if self.tree.parent(id).is_none() {
            log::warn!(target: "gadgetry_core::event", "remove: {id:?} is a page root");
            return;
        }
        if let Some(rect) = self.tree.abs_rect(id) {
            self.mark_dirty(page, rect);
        }

        if let Some(focus) = self.pages.focus(page)
            && self.tree.is_ancestor_of(id, focus)
        {
            if let Some(entry) = self.pages.entry_mut(page) {
                entry.focus = None;
            }
            self.reporter.report(Fault::DanglingFocus { gadget: focus });
        }

        let tree = &self.tree;
        if let Some(i) = self.hover.iter().rposition(|h| tree.is_ancestor_of(id, *h)) {
            self.hover.drain(..=i);
            if self.hover.is_empty() {
                self.hover_page = None;
            }
        }

        let removed: FxHashSet<GadgetId> = self.tree.remove(id).into_iter().collect();
        let cancelled = self.timers.cancel_where(|g| removed.contains(&g));
        log::debug!(
            target: "gadgetry_core::event",
            "remove: {id:?}: {} gadgets, {cancelled} timer subscriptions",
            removed.len()
        );
        self.action |= Action::REGION_MOVED;
    }

    fn set_flag(&mut self, id: GadgetId, flag: GadgetFlags, state: bool) {
        if !self.tree.contains(id) || self.tree.flags(id).contains(flag) == state {
            return;
        }
        self.tree.set_flags(id, flag, state);
        self.invalidate(id);
        self.action |= Action::REGION_MOVED;

        if !state
            && let Some(page) = self.tree.page(id)
            && let Some(focus) = self.pages.focus(page)
            && self.tree.is_ancestor_of(id, focus)
        {
            self.set_focus_inner(page, None);
        }
    }
}

/// Page navigation
impl Router {
    /// Access the page stack
    #[inline]
    pub fn pages(&self) -> &PageStack {
        &self.pages
    }

    /// The top page
    #[inline]
    pub fn top(&self) -> PageId {
        self.pages.top()
    }

    /// The page stack, base first
    #[inline]
    pub fn stack(&self) -> &[PageId] {
        self.pages.ids()
    }

    /// Lifecycle state of `page`
    ///
    /// Returns `None` for destroyed pages.
    #[inline]
    pub fn page_state(&self, page: PageId) -> Option<PageState> {
        self.pages.state(page)
    }

    /// Access a page as a concrete type
    pub fn page<T: Page>(&self, page: PageId) -> Option<&T> {
        self.pages.page(page)?.downcast_ref()
    }

    /// Access a page mutably as a concrete type
    pub fn page_mut<T: Page>(&mut self, page: PageId) -> Option<&mut T> {
        self.pages.page_mut(page)?.downcast_mut()
    }

    /// Push a page, making it the top page
    pub fn push(&mut self, page: impl Page) -> PageId {
        let id = self.register(Box::new(page));
        self.transition(|stack| {
            stack.push(id);
            None
        });
        self.settle(None);
        id
    }

    /// Push a cached page again
    ///
    /// Fails (reporting [`Fault::InvalidTransition`]) unless `page` is a
    /// cached page not currently on the stack.
    pub fn push_cached(&mut self, page: PageId) -> bool {
        let result = self.push_cached_inner(page);
        self.settle(None);
        result
    }

    /// Pop the top page
    ///
    /// The popped page is destroyed unless [cached](Page::cached). Popping
    /// the base page is a no-op reported as [`Fault::InvalidTransition`].
    pub fn pop(&mut self) -> bool {
        let result = self.pop_inner();
        self.settle(None);
        result
    }

    /// Replace the top page (which may be the base page)
    pub fn replace_top(&mut self, page: impl Page) -> PageId {
        let id = self.register(Box::new(page));
        self.transition(|stack| Some(stack.replace_top(id)));
        self.settle(None);
        id
    }

    fn register(&mut self, page: Box<dyn Page>) -> PageId {
        self.pages.insert(&mut self.tree, page, self.window)
    }

    fn navigate(&mut self, req: NavRequest) {
        match req {
            NavRequest::Push(page) => {
                let id = self.register(page);
                self.transition(|stack| {
                    stack.push(id);
                    None
                });
            }
            NavRequest::PushCached(id) => {
                self.push_cached_inner(id);
            }
            NavRequest::Pop => {
                self.pop_inner();
            }
            NavRequest::Replace(page) => {
                let id = self.register(page);
                self.transition(|stack| Some(stack.replace_top(id)));
            }
        }
    }

    fn push_cached_inner(&mut self, page: PageId) -> bool {
        if !self.pages.contains(page) || self.pages.is_on_stack(page) {
            let fault = Fault::InvalidTransition("push of a page which is not cached and dormant");
            self.reporter.report(fault);
            return false;
        }
        self.transition(|stack| {
            stack.push(page);
            None
        });
        true
    }

    fn pop_inner(&mut self) -> bool {
        if self.pages.len() <= 1 {
            self.reporter.report(Fault::InvalidTransition("pop of the base page"));
            return false;
        }
        self.transition(|stack| stack.pop());
        true
    }

    /// Perform an atomic stack change
    ///
    /// `change` returns the page removed from the stack, if any. Pages no
    /// longer active leave (top-most first), the removed page is retired,
    /// then newly active pages enter (bottom-most first).
    fn transition(&mut self, change: impl FnOnce(&mut PageStack) -> Option<PageId>) {
        let before = self.pages.active_set();
        let removed = change(&mut self.pages);
        let after = self.pages.active_set();
        log::debug!(target: "gadgetry_core::stack", "transition: {before:?} -> {after:?}");

        for page in before.iter().filter(|p| !after.contains(p)) {
            self.leave(*page);
        }
        if let Some(page) = removed {
            self.retire(page);
        }
        for page in after.iter().rev().filter(|p| !before.contains(p)) {
            self.enter(*page);
        }
        self.action |= Action::NAVIGATE | Action::REGION_MOVED;
    }

    fn leave(&mut self, page: PageId) {
        let Some(entry) = self.pages.entry_mut(page) else {
            return;
        };
        entry.state = PageState::Leaving;
        if self.hover_page == Some(page) {
            self.clear_hover();
        }
        self.set_focus_inner(page, None);
        let _ = self.call_page(page, |p, cx| p.on_leave(cx));
        if let Some(entry) = self.pages.entry_mut(page) {
            entry.state = PageState::Dormant;
        }
        log::debug!(target: "gadgetry_core::stack", "leave: {page:?}");
    }

    fn retire(&mut self, page: PageId) {
        let Some(entry) = self.pages.entry(page) else {
            return;
        };
        let (root, cached) = (entry.root, entry.cached);
        let tree = &self.tree;
        let cancelled = self.timers.cancel_where(|g| tree.page(g) == Some(page));
        if cached {
            log::debug!(target: "gadgetry_core::stack", "retire: {page:?} cached ({cancelled} timers cancelled)");
            return;
        }
        let removed = self.tree.remove(root);
        self.pages.remove(page);
        log::debug!(target: "gadgetry_core::stack", "retire: {page:?} destroyed ({} gadgets)", removed.len());
    }

    fn enter(&mut self, page: PageId) {
        let Some(entry) = self.pages.entry_mut(page) else {
            return;
        };
        entry.state = PageState::Entering;
        let root = entry.root;
        if !entry.built {
            entry.built = true;
            if let Some(mut object) = entry.page.take() {
                object.build(&mut BuildCx::new(&mut self.tree, page, root, self.window));
                if let Some(entry) = self.pages.entry_mut(page) {
                    entry.page = Some(object);
                }
            }
        }
        let _ = self.call_page(page, |p, cx| p.on_enter(cx));
        if let Some(entry) = self.pages.entry_mut(page) {
            entry.state = PageState::Active;
        }
        log::debug!(target: "gadgetry_core::stack", "enter: {page:?}");
    }
}
