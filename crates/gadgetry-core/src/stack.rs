// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! The page stack

use crate::gadget::{GadgetId, Root};
use crate::geom::{Rect, Size};
use crate::page::{Page, PageId, PageState};
use crate::tree::Tree;
use slotmap::SlotMap;
use smallvec::SmallVec;

/// Pages receiving input, top-most first
pub type ActivePages = SmallVec<[PageId; 4]>;

#[derive(Debug)]
pub(crate) struct PageEntry {
    /// `None` only while the page is being called
    pub page: Option<Box<dyn Page>>,
    pub root: GadgetId,
    pub state: PageState,
    pub focus: Option<GadgetId>,
    pub built: bool,
    pub pass_through: bool,
    pub cached: bool,
    /// Union of regions invalidated since the last redraw request
    pub dirty: Option<Rect>,
}

/// Registered pages and the navigation stack
///
/// The bottom entry is the base page. The stack is never empty.
#[derive(Debug)]
pub struct PageStack {
    pages: SlotMap<PageId, PageEntry>,
    stack: Vec<PageId>,
}

impl PageStack {
    /// Construct with the base page
    ///
    /// The base page is registered and placed on the stack but not entered.
    pub(crate) fn new(tree: &mut Tree, base: Box<dyn Page>, window: Size) -> Self {
        let mut stack = PageStack {
            pages: SlotMap::with_key(),
            stack: Vec::with_capacity(8),
        };
        let id = stack.insert(tree, base, window);
        stack.stack.push(id);
        stack
    }

    /// Register a page, creating its root gadget
    pub(crate) fn insert(&mut self, tree: &mut Tree, page: Box<dyn Page>, window: Size) -> PageId {
        let rect = Rect::new(Default::default(), window);
        let pass_through = page.pass_through();
        let cached = page.cached();
        self.pages.insert_with_key(|id| {
            let root = tree.insert_root(id, Box::new(Root), rect);
            log::trace!(target: "gadgetry_core::stack", "insert: {id:?} with root {root:?}");
            PageEntry {
                page: Some(page),
                root,
                state: PageState::Dormant,
                focus: None,
                built: false,
                pass_through,
                cached,
                dirty: None,
            }
        })
    }

    /// Unregister a page
    ///
    /// The caller is responsible for the page's gadgets.
    pub(crate) fn remove(&mut self, id: PageId) -> Option<PageEntry> {
        debug_assert!(!self.stack.contains(&id));
        self.pages.remove(id)
    }

    pub(crate) fn entry(&self, id: PageId) -> Option<&PageEntry> {
        self.pages.get(id)
    }

    pub(crate) fn entry_mut(&mut self, id: PageId) -> Option<&mut PageEntry> {
        self.pages.get_mut(id)
    }

    pub(crate) fn entries_mut(&mut self) -> impl Iterator<Item = &mut PageEntry> {
        self.pages.values_mut()
    }

    pub(crate) fn push(&mut self, id: PageId) {
        self.stack.push(id);
    }

    /// Pop the top page unless it is the base page
    pub(crate) fn pop(&mut self) -> Option<PageId> {
        if self.stack.len() > 1 {
            self.stack.pop()
        } else {
            None
        }
    }

    /// Replace the top page (which may be the base page)
    pub(crate) fn replace_top(&mut self, id: PageId) -> PageId {
        let top = self.stack.len() - 1;
        std::mem::replace(&mut self.stack[top], id)
    }

    /// Number of pages on the stack
    #[inline]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    /// Always false
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    /// The stack, base page first
    #[inline]
    pub fn ids(&self) -> &[PageId] {
        &self.stack
    }

    /// The top page
    #[inline]
    pub fn top(&self) -> PageId {
        self.stack[self.stack.len() - 1]
    }

    /// True if `id` is registered (on the stack or cached)
    #[inline]
    pub fn contains(&self, id: PageId) -> bool {
        self.pages.contains_key(id)
    }

    /// True if `id` is on the stack
    #[inline]
    pub fn is_on_stack(&self, id: PageId) -> bool {
        self.stack.contains(&id)
    }

    /// Lifecycle state of a page
    #[inline]
    pub fn state(&self, id: PageId) -> Option<PageState> {
        self.pages.get(id).map(|e| e.state)
    }

    /// Root gadget of a page
    #[inline]
    pub fn root(&self, id: PageId) -> Option<GadgetId> {
        self.pages.get(id).map(|e| e.root)
    }

    /// Focused gadget of a page
    #[inline]
    pub fn focus(&self, id: PageId) -> Option<GadgetId> {
        self.pages.get(id).and_then(|e| e.focus)
    }

    /// Whether a page passes input through
    #[inline]
    pub fn pass_through(&self, id: PageId) -> bool {
        self.pages.get(id).is_some_and(|e| e.pass_through)
    }

    /// Access a page
    ///
    /// Returns `None` while the page is being called.
    pub fn page(&self, id: PageId) -> Option<&dyn Page> {
        self.pages.get(id)?.page.as_deref()
    }

    /// Access a page mutably
    pub fn page_mut(&mut self, id: PageId) -> Option<&mut (dyn Page + 'static)> {
        self.pages.get_mut(id)?.page.as_deref_mut()
    }

    /// Pages which may receive input, top-most first
    ///
    /// This is the top page followed by each page beneath a pass-through
    /// page.
    pub fn active_set(&self) -> ActivePages {
        let mut list = ActivePages::new();
        for id in self.stack.iter().rev() {
            list.push(*id);
            if !self.pass_through(*id) {
                break;
            }
        }
        list
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::page::BlankPage;

    #[derive(Debug)]
    struct Overlay;
    impl Page for Overlay {
        fn pass_through(&self) -> bool {
            true
        }
    }

    #[test]
    fn base_is_never_popped() {
        let mut tree = Tree::new();
        let mut stack = PageStack::new(&mut tree, Box::new(BlankPage), Size(100, 100));
        let base = stack.top();
        assert_eq!(stack.pop(), None);
        assert_eq!(stack.len(), 1);

        let other = stack.insert(&mut tree, Box::new(BlankPage), Size(100, 100));
        assert_eq!(stack.replace_top(other), base);
        assert_eq!(stack.ids(), &[other]);
        assert!(stack.contains(base));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn active_set_spans_overlays() {
        let mut tree = Tree::new();
        let mut stack = PageStack::new(&mut tree, Box::new(BlankPage), Size(100, 100));
        let base = stack.top();
        let a = stack.insert(&mut tree, Box::new(BlankPage), Size(100, 100));
        stack.push(a);
        assert_eq!(stack.active_set().as_slice(), &[a]);

        let o1 = stack.insert(&mut tree, Box::new(Overlay), Size(100, 100));
        let o2 = stack.insert(&mut tree, Box::new(Overlay), Size(100, 100));
        stack.push(o1);
        stack.push(o2);
        assert_eq!(stack.active_set().as_slice(), &[o2, o1, a]);
        assert!(!stack.active_set().contains(&base));
    }
}
