// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Interface to the rendering back-end
//!
//! The core never draws. It asks the graph to repaint regions, and queries it
//! for metrics needed by precise hit testing.

use crate::geom::Rect;

/// Metrics of a single glyph, in logical pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphMetrics {
    /// Horizontal distance to the next glyph's origin
    pub advance: i32,
    /// Extent above the baseline
    pub ascent: i32,
    /// Extent below the baseline (positive)
    pub descent: i32,
}

impl Default for GlyphMetrics {
    fn default() -> Self {
        GlyphMetrics {
            advance: 8,
            ascent: 12,
            descent: 4,
        }
    }
}

impl GlyphMetrics {
    /// Line height
    #[inline]
    pub fn height(&self) -> i32 {
        self.ascent + self.descent
    }
}

/// Identifier for a shape registered with the graph
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u32);

/// The rendering back-end
///
/// Only [`Graph::request_redraw`] is required.
pub trait Graph {
    /// Request that `rect` (window coordinates) be repainted
    ///
    /// The router calls this at most once per pump.
    fn request_redraw(&mut self, rect: Rect);

    /// Metrics of glyph `c` in the default font
    fn glyph_metrics(&self, c: char) -> GlyphMetrics {
        let _ = c;
        GlyphMetrics::default()
    }

    /// Bounds of a shape, relative to its owning gadget
    fn shape_bounds(&self, shape: ShapeId) -> Option<Rect> {
        let _ = shape;
        None
    }
}

/// A graph which discards redraw requests
#[derive(Clone, Copy, Debug, Default)]
pub struct NullGraph;

impl Graph for NullGraph {
    fn request_redraw(&mut self, _: Rect) {}
}

/// A graph which records redraw requests
///
/// Useful for tests and headless operation.
#[derive(Clone, Debug, Default)]
pub struct RecordingGraph {
    /// Requests received, oldest first
    pub requests: Vec<Rect>,
}

impl RecordingGraph {
    /// Construct
    pub fn new() -> Self {
        RecordingGraph::default()
    }

    /// Take all recorded requests
    pub fn take(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.requests)
    }
}

impl Graph for RecordingGraph {
    fn request_redraw(&mut self, rect: Rect) {
        self.requests.push(rect);
    }
}
