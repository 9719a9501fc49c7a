// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Geometry data types
//!
//! [`Coord`], [`Size`] and [`Offset`] are all 2D integer (`i32`) types,
//! representing positions, sizes and translations respectively. [`Rect`]
//! combines a position with a size.
//!
//! Gadget rectangles are stored relative to the parent gadget; conversion to
//! window coordinates happens in the [tree](crate::tree).

macro_rules! impl_common {
    ($T:ty) => {
        impl $T {
            /// The constant `(0, 0)`
            pub const ZERO: Self = Self(0, 0);

            /// Return the minimum, componentwise
            #[inline]
            #[must_use = "method does not modify self but returns a new value"]
            pub fn min(self, other: Self) -> Self {
                Self(self.0.min(other.0), self.1.min(other.1))
            }

            /// Return the maximum, componentwise
            #[inline]
            #[must_use = "method does not modify self but returns a new value"]
            pub fn max(self, other: Self) -> Self {
                Self(self.0.max(other.0), self.1.max(other.1))
            }
        }

        impl From<(i32, i32)> for $T {
            #[inline]
            fn from(v: (i32, i32)) -> Self {
                Self(v.0, v.1)
            }
        }
    };
}

/// A 2D coordinate, also known as a point
///
/// A coordinate is an absolute position within some coordinate space. The
/// difference between two points is an [`Offset`].
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord(pub i32, pub i32);

impl_common!(Coord);

impl Coord {
    /// Construct
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self(x, y)
    }
}

impl std::ops::Sub for Coord {
    type Output = Offset;

    #[inline]
    fn sub(self, other: Self) -> Offset {
        Offset(self.0 - other.0, self.1 - other.1)
    }
}

impl std::ops::Add<Offset> for Coord {
    type Output = Self;

    #[inline]
    fn add(self, other: Offset) -> Self {
        Coord(self.0 + other.0, self.1 + other.1)
    }
}

impl std::ops::Sub<Offset> for Coord {
    type Output = Self;

    #[inline]
    fn sub(self, other: Offset) -> Self {
        Coord(self.0 - other.0, self.1 - other.1)
    }
}

impl std::ops::Add<Size> for Coord {
    type Output = Self;

    #[inline]
    fn add(self, other: Size) -> Self {
        Coord(self.0 + other.0, self.1 + other.1)
    }
}

/// A 2D size, also known as an extent
///
/// A `Size` is expected to be non-negative; [`Size::new`] checks this in
/// debug mode only.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size(pub i32, pub i32);

impl_common!(Size);

impl Size {
    /// Construct
    ///
    /// In debug mode, this asserts that components are non-negative.
    #[inline]
    pub fn new(w: i32, h: i32) -> Self {
        debug_assert!(w >= 0 && h >= 0, "Size::new({w}, {h}): negative value");
        Self(w, h)
    }

    /// True if either component is zero or negative
    #[inline]
    pub fn is_empty(self) -> bool {
        self.0 <= 0 || self.1 <= 0
    }
}

/// A `(x, y)` translation
///
/// This is a relative position. It can be added to or subtracted from a
/// [`Coord`] and may be negative.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Offset(pub i32, pub i32);

impl_common!(Offset);

impl Offset {
    /// Construct
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self(x, y)
    }
}

impl std::ops::Add for Offset {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Offset(self.0 + other.0, self.1 + other.1)
    }
}

impl std::ops::AddAssign for Offset {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
        self.1 += rhs.1;
    }
}

impl From<Coord> for Offset {
    #[inline]
    fn from(c: Coord) -> Self {
        Offset(c.0, c.1)
    }
}

/// An axis-aligned rectangular region
///
/// The region is defined by a point `pos` and an extent `size`. It is empty
/// unless `size` is positive on both axes; an empty rect contains no point.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    pub pos: Coord,
    pub size: Size,
}

impl Rect {
    /// The empty rect (all fields zero)
    pub const ZERO: Self = Self::new(Coord::ZERO, Size::ZERO);

    /// Construct from a [`Coord`] and [`Size`]
    #[inline]
    pub const fn new(pos: Coord, size: Size) -> Self {
        Rect { pos, size }
    }

    /// Construct from `x, y, w, h` components
    #[inline]
    pub const fn xywh(x: i32, y: i32, w: i32, h: i32) -> Self {
        Rect::new(Coord(x, y), Size(w, h))
    }

    /// Get the second point (pos + size)
    #[inline]
    pub fn pos2(&self) -> Coord {
        self.pos + self.size
    }

    /// True if the rect has zero (or negative) area
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.is_empty()
    }

    /// Check whether the given coordinate is contained within this rect
    ///
    /// An empty rect never contains any coordinate.
    #[inline]
    pub fn contains(&self, c: Coord) -> bool {
        c.0 >= self.pos.0
            && c.0 < self.pos.0 + self.size.0
            && c.1 >= self.pos.1
            && c.1 < self.pos.1 + self.size.1
    }

    /// Calculate the intersection of two rects
    ///
    /// Returns `None` when the intersection is empty.
    #[inline]
    pub fn intersection(&self, rhs: &Rect) -> Option<Rect> {
        let pos = self.pos.max(rhs.pos);
        let pos2 = self.pos2().min(rhs.pos2());
        let size = Size(pos2.0 - pos.0, pos2.1 - pos.1);
        (!size.is_empty()).then_some(Rect::new(pos, size))
    }

    /// Calculate the smallest rect enclosing both `self` and `rhs`
    ///
    /// Empty rects are ignored.
    pub fn union(&self, rhs: &Rect) -> Rect {
        if rhs.is_empty() {
            return *self;
        } else if self.is_empty() {
            return *rhs;
        }
        let pos = self.pos.min(rhs.pos);
        let pos2 = self.pos2().max(rhs.pos2());
        Rect::new(pos, Size(pos2.0 - pos.0, pos2.1 - pos.1))
    }
}

impl std::ops::Add<Offset> for Rect {
    type Output = Self;

    #[inline]
    fn add(self, offset: Offset) -> Self {
        Rect::new(self.pos + offset, self.size)
    }
}

impl std::ops::Sub<Offset> for Rect {
    type Output = Self;

    #[inline]
    fn sub(self, offset: Offset) -> Self {
        Rect::new(self.pos - offset, self.size)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn contains_excludes_far_edge() {
        let r = Rect::xywh(10, 10, 5, 5);
        assert!(r.contains(Coord(10, 10)));
        assert!(r.contains(Coord(14, 14)));
        assert!(!r.contains(Coord(15, 14)));
        assert!(!r.contains(Coord(9, 12)));
    }

    #[test]
    fn empty_rect_contains_nothing() {
        assert!(!Rect::ZERO.contains(Coord::ZERO));
        assert!(!Rect::xywh(3, 3, 0, 10).contains(Coord(3, 4)));
    }

    #[test]
    fn union_and_intersection() {
        let a = Rect::xywh(0, 0, 10, 10);
        let b = Rect::xywh(5, 5, 10, 10);
        assert_eq!(a.union(&b), Rect::xywh(0, 0, 15, 15));
        assert_eq!(a.intersection(&b), Some(Rect::xywh(5, 5, 5, 5)));
        assert_eq!(a.intersection(&Rect::xywh(20, 20, 1, 1)), None);
        assert_eq!(Rect::ZERO.union(&b), b);
    }
}
