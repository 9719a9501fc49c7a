// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! The gadget tree
//!
//! All gadgets of all pages live in a single arena. Each node stores a
//! non-owning back-reference to its parent and an ordered list of children;
//! the list order is z-order, with later children drawn over (and hit
//! before) earlier ones.

use crate::gadget::{Gadget, GadgetFlags, GadgetId};
use crate::geom::{Coord, Offset, Rect};
use crate::page::PageId;
use crate::render::Graph;
use slotmap::SlotMap;
use smallvec::SmallVec;

/// A path of gadgets, from some gadget up to its page root
pub type Path = SmallVec<[GadgetId; 16]>;

#[derive(Debug)]
struct Node {
    parent: Option<GadgetId>,
    children: SmallVec<[GadgetId; 4]>,
    /// Relative to the parent (or window, for roots)
    rect: Rect,
    flags: GadgetFlags,
    page: PageId,
    /// `None` only while the gadget is being called
    gadget: Option<Box<dyn Gadget>>,
}

/// Arena of gadget nodes
#[derive(Debug, Default)]
pub struct Tree {
    nodes: SlotMap<GadgetId, Node>,
}

impl Tree {
    /// Construct an empty tree
    pub fn new() -> Self {
        Tree::default()
    }

    /// Number of gadgets (over all pages)
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if there are no gadgets
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// True if `id` refers to a live gadget
    #[inline]
    pub fn contains(&self, id: GadgetId) -> bool {
        self.nodes.contains_key(id)
    }

    pub(crate) fn insert_root(&mut self, page: PageId, gadget: Box<dyn Gadget>, rect: Rect) -> GadgetId {
        let flags = gadget.flags() & GadgetFlags::CONFIG;
        self.nodes.insert(Node {
            parent: None,
            children: SmallVec::new(),
            rect,
            flags,
            page,
            gadget: Some(gadget),
        })
    }

    /// Insert `gadget` as the last (top-most) child of `parent`
    ///
    /// Returns `None` if `parent` does not exist.
    pub(crate) fn insert(
        &mut self,
        parent: GadgetId,
        gadget: Box<dyn Gadget>,
        rect: Rect,
    ) -> Option<GadgetId> {
        let page = self.nodes.get(parent)?.page;
        let flags = gadget.flags() & GadgetFlags::CONFIG;
        let id = self.nodes.insert(Node {
            parent: Some(parent),
            children: SmallVec::new(),
            rect,
            flags,
            page,
            gadget: Some(gadget),
        });
        self.nodes[parent].children.push(id);
        log::trace!(target: "gadgetry_core::tree", "insert: {id:?} under {parent:?} at {rect:?}");
        Some(id)
    }

    /// Remove `id` and its whole subtree
    ///
    /// Each removed gadget's [`Gadget::on_remove`] is called, children
    /// before parents. Returns the removed handles in that order.
    pub(crate) fn remove(&mut self, id: GadgetId) -> Vec<GadgetId> {
        let Some(node) = self.nodes.get(id) else {
            return vec![];
        };
        if let Some(parent) = node.parent
            && let Some(p) = self.nodes.get_mut(parent)
        {
            p.children.retain(|c| *c != id);
        }

        // pre-order collection, reversed to give children first
        let mut order = vec![id];
        let mut i = 0;
        while i < order.len() {
            if let Some(node) = self.nodes.get(order[i]) {
                order.extend(node.children.iter().copied());
            }
            i += 1;
        }
        order.reverse();

        for id in &order {
            if let Some(mut node) = self.nodes.remove(*id)
                && let Some(gadget) = node.gadget.as_mut()
            {
                gadget.on_remove();
            }
        }
        log::trace!(target: "gadgetry_core::tree", "remove: {id:?} ({} gadgets)", order.len());
        order
    }

    /// Access a gadget
    ///
    /// Returns `None` if `id` is not live or the gadget is currently being
    /// called.
    pub fn get(&self, id: GadgetId) -> Option<&dyn Gadget> {
        self.nodes.get(id)?.gadget.as_deref()
    }

    /// Access a gadget mutably
    ///
    /// Returns `None` if `id` is not live or the gadget is currently being
    /// called.
    pub fn get_mut(&mut self, id: GadgetId) -> Option<&mut (dyn Gadget + 'static)> {
        self.nodes.get_mut(id)?.gadget.as_deref_mut()
    }

    /// Access a gadget as a concrete type
    pub fn gadget<T: Gadget>(&self, id: GadgetId) -> Option<&T> {
        self.get(id)?.downcast_ref()
    }

    /// Access a gadget mutably as a concrete type
    pub fn gadget_mut<T: Gadget>(&mut self, id: GadgetId) -> Option<&mut T> {
        self.get_mut(id)?.downcast_mut()
    }

    pub(crate) fn take(&mut self, id: GadgetId) -> Option<Box<dyn Gadget>> {
        self.nodes.get_mut(id)?.gadget.take()
    }

    pub(crate) fn restore(&mut self, id: GadgetId, gadget: Box<dyn Gadget>) {
        if let Some(node) = self.nodes.get_mut(id) {
            debug_assert!(node.gadget.is_none());
            node.gadget = Some(gadget);
        }
    }

    /// Get the parent
    #[inline]
    pub fn parent(&self, id: GadgetId) -> Option<GadgetId> {
        self.nodes.get(id)?.parent
    }

    /// Get the children, bottom-most first
    pub fn children(&self, id: GadgetId) -> &[GadgetId] {
        self.nodes.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    /// Get the owning page
    #[inline]
    pub fn page(&self, id: GadgetId) -> Option<PageId> {
        self.nodes.get(id).map(|n| n.page)
    }

    /// Get the flags
    #[inline]
    pub fn flags(&self, id: GadgetId) -> GadgetFlags {
        self.nodes
            .get(id)
            .map(|n| n.flags)
            .unwrap_or(GadgetFlags::empty())
    }

    pub(crate) fn set_flags(&mut self, id: GadgetId, flags: GadgetFlags, state: bool) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.flags.set(flags, state);
        }
    }

    /// Get the rect, relative to the parent
    #[inline]
    pub fn rect(&self, id: GadgetId) -> Option<Rect> {
        self.nodes.get(id).map(|n| n.rect)
    }

    pub(crate) fn set_rect(&mut self, id: GadgetId, rect: Rect) {
        if let Some(node) = self.nodes.get_mut(id) {
            node.rect = rect;
        }
    }

    /// Get the rect in window coordinates
    pub fn abs_rect(&self, id: GadgetId) -> Option<Rect> {
        let mut rect = self.nodes.get(id)?.rect;
        let mut cur = self.nodes[id].parent;
        while let Some(p) = cur {
            let node = &self.nodes[p];
            rect = rect + Offset::from(node.rect.pos);
            cur = node.parent;
        }
        Some(rect)
    }

    /// The path from `id` up to its root (inclusive at both ends)
    pub fn path(&self, id: GadgetId) -> Path {
        let mut path = Path::new();
        let mut cur = Some(id).filter(|id| self.contains(*id));
        while let Some(id) = cur {
            path.push(id);
            cur = self.nodes[id].parent;
        }
        path
    }

    /// True if `ancestor` is `id` or an ancestor of `id`
    pub fn is_ancestor_of(&self, ancestor: GadgetId, id: GadgetId) -> bool {
        let mut cur = Some(id);
        while let Some(c) = cur {
            if c == ancestor {
                return true;
            }
            cur = self.parent(c);
        }
        false
    }

    /// True if `id` and all its ancestors are visible and enabled
    pub fn is_interactive(&self, id: GadgetId) -> bool {
        let path = self.path(id);
        !path.is_empty() && path.iter().all(|id| self.nodes[*id].flags.is_interactive())
    }

    /// Find the deepest gadget under `coord` (window coordinates), starting
    /// from `root`
    ///
    /// Children are tested front-to-back (last child first). A gadget is
    /// hit only if visible and its rect contains the point; disabled gadgets
    /// are skipped (with their subtree) unless flagged
    /// [`GadgetFlags::HOVER_WHEN_DISABLED`], in which case they are hit
    /// without descending. Finally [`Gadget::probe`] may reject the hit.
    ///
    /// The result depends only on the tree state, `coord` and `graph`.
    pub fn hit_test(&self, root: GadgetId, coord: Coord, graph: &dyn Graph) -> Option<GadgetId> {
        let origin = match self.parent(root) {
            Some(parent) => self.abs_rect(parent)?.pos,
            None => Coord::ZERO,
        };
        self.hit_node(root, coord - Offset::from(origin), graph)
    }

    // `coord` is relative to the parent's origin
    fn hit_node(&self, id: GadgetId, coord: Coord, graph: &dyn Graph) -> Option<GadgetId> {
        let node = self.nodes.get(id)?;
        if !node.flags.contains(GadgetFlags::VISIBLE) || !node.rect.contains(coord) {
            return None;
        }
        let local = coord - Offset::from(node.rect.pos);

        if !node.flags.contains(GadgetFlags::ENABLED) {
            let probe = |g: &dyn Gadget| g.probe(local, node.rect.size, graph);
            return (node.flags.contains(GadgetFlags::HOVER_WHEN_DISABLED)
                && node.gadget.as_deref().is_none_or(probe))
            .then_some(id);
        }

        for child in node.children.iter().rev() {
            if let Some(hit) = self.hit_node(*child, local, graph) {
                return Some(hit);
            }
        }

        match node.gadget.as_deref() {
            Some(g) if !g.probe(local, node.rect.size, graph) => None,
            _ => Some(id),
        }
    }

    /// Find the next gadget which [can take focus](GadgetFlags::can_focus)
    /// under `root`, in pre-order
    ///
    /// Starts after `from` (or from the start when `None`), wrapping around.
    /// Invisible and disabled subtrees are skipped. With `reverse`, searches
    /// backwards.
    pub fn next_focusable(
        &self,
        root: GadgetId,
        from: Option<GadgetId>,
        reverse: bool,
    ) -> Option<GadgetId> {
        let mut list = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if !node.flags.is_interactive() {
                continue;
            }
            if node.flags.contains(GadgetFlags::FOCUSABLE) {
                list.push(id);
            }
            stack.extend(node.children.iter().rev().copied());
        }
        if list.is_empty() {
            return None;
        }

        let n = list.len();
        let index = match from.and_then(|f| list.iter().position(|id| *id == f)) {
            Some(i) if reverse => (i + n - 1) % n,
            Some(i) => (i + 1) % n,
            None if reverse => n - 1,
            None => 0,
        };
        Some(list[index])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::geom::Size;
    use crate::render::NullGraph;
    use slotmap::KeyData;

    #[derive(Debug)]
    struct Blank(GadgetFlags);
    impl Gadget for Blank {
        fn flags(&self) -> GadgetFlags {
            self.0
        }
    }

    /// Only the left half is solid
    #[derive(Debug)]
    struct LeftHalf;
    impl Gadget for LeftHalf {
        fn probe(&self, coord: Coord, size: Size, _: &dyn Graph) -> bool {
            coord.0 < size.0 / 2
        }
    }

    fn page() -> PageId {
        PageId::from(KeyData::from_ffi(1))
    }

    fn blank() -> Box<dyn Gadget> {
        Box::new(Blank(GadgetFlags::default()))
    }

    fn sample() -> (Tree, GadgetId, GadgetId, GadgetId, GadgetId) {
        let mut tree = Tree::new();
        let root = tree.insert_root(page(), blank(), Rect::xywh(0, 0, 100, 100));
        let panel = tree.insert(root, blank(), Rect::xywh(10, 10, 50, 50)).unwrap();
        let a = tree.insert(panel, blank(), Rect::xywh(0, 0, 20, 20)).unwrap();
        // overlaps `a`; added later so it is on top
        let b = tree.insert(panel, blank(), Rect::xywh(10, 10, 20, 20)).unwrap();
        (tree, root, panel, a, b)
    }

    #[test]
    fn hit_test_front_to_back() {
        let (tree, root, panel, a, b) = sample();
        let g = NullGraph;
        assert_eq!(tree.hit_test(root, Coord(12, 12), &g), Some(a));
        assert_eq!(tree.hit_test(root, Coord(25, 25), &g), Some(b));
        assert_eq!(tree.hit_test(root, Coord(55, 55), &g), Some(panel));
        assert_eq!(tree.hit_test(root, Coord(80, 80), &g), Some(root));
        assert_eq!(tree.hit_test(root, Coord(100, 5), &g), None);
        assert_eq!(tree.hit_test(root, Coord(-1, 5), &g), None);
    }

    #[test]
    fn hit_test_is_idempotent() {
        let (tree, root, ..) = sample();
        for x in (0..110).step_by(7) {
            let c = Coord(x, x / 2);
            assert_eq!(tree.hit_test(root, c, &NullGraph), tree.hit_test(root, c, &NullGraph));
        }
    }

    #[test]
    fn hidden_disabled_and_empty_miss() {
        let (mut tree, root, panel, a, b) = sample();
        tree.set_flags(b, GadgetFlags::VISIBLE, false);
        assert_eq!(tree.hit_test(root, Coord(25, 25), &NullGraph), Some(a));

        tree.set_flags(a, GadgetFlags::ENABLED, false);
        assert_eq!(tree.hit_test(root, Coord(25, 25), &NullGraph), Some(panel));

        tree.set_flags(a, GadgetFlags::HOVER_WHEN_DISABLED, true);
        assert_eq!(tree.hit_test(root, Coord(25, 25), &NullGraph), Some(a));

        let empty = tree.insert(panel, blank(), Rect::xywh(30, 30, 0, 10)).unwrap();
        assert_ne!(tree.hit_test(root, Coord(40, 45), &NullGraph), Some(empty));
    }

    #[test]
    fn child_outside_parent_misses() {
        let (mut tree, root, panel, ..) = sample();
        let outside = tree.insert(panel, blank(), Rect::xywh(60, 0, 10, 10)).unwrap();
        assert_eq!(tree.hit_test(root, Coord(75, 15), &NullGraph), Some(root));
        assert_eq!(tree.abs_rect(outside), Some(Rect::xywh(70, 10, 10, 10)));
    }

    #[test]
    fn probe_refines_hit() {
        let mut tree = Tree::new();
        let root = tree.insert_root(page(), blank(), Rect::xywh(0, 0, 100, 100));
        let half = tree.insert(root, Box::new(LeftHalf), Rect::xywh(0, 0, 40, 40)).unwrap();
        assert_eq!(tree.hit_test(root, Coord(5, 5), &NullGraph), Some(half));
        assert_eq!(tree.hit_test(root, Coord(30, 5), &NullGraph), Some(root));
    }

    #[test]
    fn remove_subtree_children_first() {
        let (mut tree, root, panel, a, b) = sample();
        let removed = tree.remove(panel);
        assert_eq!(removed.len(), 3);
        assert_eq!(removed.last(), Some(&panel));
        assert!(removed.contains(&a) && removed.contains(&b));
        assert!(!tree.contains(a));
        assert!(tree.children(root).is_empty());
        assert_eq!(tree.len(), 1);
        assert!(tree.remove(panel).is_empty());
    }

    #[test]
    fn paths_and_ancestry() {
        let (tree, root, panel, a, _) = sample();
        assert_eq!(tree.path(a).as_slice(), &[a, panel, root]);
        assert!(tree.is_ancestor_of(root, a));
        assert!(!tree.is_ancestor_of(a, panel));
        assert_eq!(tree.abs_rect(a), Some(Rect::xywh(10, 10, 20, 20)));
    }

    #[test]
    fn focus_order_wraps() {
        let mut tree = Tree::new();
        let f = || -> Box<dyn Gadget> { Box::new(Blank(GadgetFlags::default() | GadgetFlags::FOCUSABLE)) };
        let root = tree.insert_root(page(), blank(), Rect::xywh(0, 0, 100, 100));
        let x = tree.insert(root, f(), Rect::xywh(0, 0, 10, 10)).unwrap();
        let group = tree.insert(root, blank(), Rect::xywh(0, 20, 50, 50)).unwrap();
        let y = tree.insert(group, f(), Rect::xywh(0, 0, 10, 10)).unwrap();
        let z = tree.insert(root, f(), Rect::xywh(60, 0, 10, 10)).unwrap();

        assert_eq!(tree.next_focusable(root, None, false), Some(x));
        assert_eq!(tree.next_focusable(root, Some(x), false), Some(y));
        assert_eq!(tree.next_focusable(root, Some(y), false), Some(z));
        assert_eq!(tree.next_focusable(root, Some(z), false), Some(x));
        assert_eq!(tree.next_focusable(root, Some(x), true), Some(z));

        tree.set_flags(group, GadgetFlags::ENABLED, false);
        assert_eq!(tree.next_focusable(root, Some(x), false), Some(z));
    }
}
