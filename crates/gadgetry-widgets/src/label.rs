// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Text labels

use gadgetry::event::{Event, EventCx, Handled, Response};
use gadgetry::geom::{Coord, Size};
use gadgetry::{Gadget, GadgetFlags, Graph};

/// A single line of text
///
/// Only the area covered by the text's glyphs (per [`Graph::glyph_metrics`])
/// is hit; the rest of the label's rect is transparent to the pointer.
///
/// The text may be replaced by posting a custom event tagged
/// [`Label::SET_TEXT`] with a `String` payload.
#[derive(Clone, Debug, Default)]
pub struct Label {
    text: String,
    hover_when_disabled: bool,
}

impl Label {
    /// Tag of the custom event replacing the text
    pub const SET_TEXT: &'static str = "label.set_text";

    /// Construct
    pub fn new(text: impl ToString) -> Self {
        Label {
            text: text.to_string(),
            hover_when_disabled: false,
        }
    }

    /// Still take hover when disabled (e.g. for a tooltip)
    #[must_use]
    pub fn with_hover_when_disabled(mut self) -> Self {
        self.hover_when_disabled = true;
        self
    }

    /// Get the text
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Set the text
    ///
    /// The caller should [invalidate](gadgetry::Router::invalidate) the label.
    pub fn set_text(&mut self, text: impl ToString) {
        self.text = text.to_string();
    }

    /// Extent of the text as laid out by `graph`
    pub fn text_size(&self, graph: &dyn Graph) -> Size {
        let mut width = 0;
        let mut height = 0;
        for c in self.text.chars() {
            let m = graph.glyph_metrics(c);
            width += m.advance;
            height = height.max(m.height());
        }
        Size(width, height)
    }
}

impl Gadget for Label {
    fn flags(&self) -> GadgetFlags {
        let mut flags = GadgetFlags::default();
        flags.set(GadgetFlags::HOVER_WHEN_DISABLED, self.hover_when_disabled);
        flags
    }

    fn handle(&mut self, cx: &mut EventCx<'_>, event: &Event) -> Response {
        match event {
            Event::Custom(custom) if custom.is(Self::SET_TEXT) => {
                if let Some(text) = custom.payload::<String>() {
                    self.text.clone_from(text);
                    cx.invalidate();
                } else {
                    log::warn!("Label: {} event without String payload", Self::SET_TEXT);
                }
                Handled
            }
            _ => Response::Declined,
        }
    }

    fn probe(&self, coord: Coord, _: Size, graph: &dyn Graph) -> bool {
        let extent = self.text_size(graph);
        coord.0 < extent.0 && coord.1 < extent.1
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::*;
    use gadgetry::event::Custom;
    use gadgetry::geom::Rect;
    use gadgetry::{GlyphMetrics, NullGraph};

    #[test]
    fn hit_only_over_glyphs() {
        let mut router = router();
        let root = root(&router);
        // default metrics: 8 wide, 16 high
        let label = router.add(root, Label::new("abc"), Rect::xywh(0, 0, 100, 40)).unwrap();
        assert_eq!(NullGraph.glyph_metrics('a'), GlyphMetrics::default());

        assert_eq!(router.hit_test(Coord(23, 15), &NullGraph), Some(label));
        assert_eq!(router.hit_test(Coord(24, 15), &NullGraph), Some(root));
        assert_eq!(router.hit_test(Coord(5, 16), &NullGraph), Some(root));
    }

    #[test]
    fn set_text_by_post() {
        let mut router = router();
        let root = root(&router);
        let label = router.add(root, Label::new("old"), Rect::xywh(0, 0, 100, 20)).unwrap();

        router.post(label, Custom::with_payload(Label::SET_TEXT, String::from("new")));
        assert_eq!(router.gadget::<Label>(label).unwrap().text(), "new");
        assert_eq!(router.diagnostics().unroutable, 0);
    }
}
