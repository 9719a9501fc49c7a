// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Frames

use gadgetry::event::{Event, EventCx, Response};
use gadgetry::{Gadget, GadgetFlags};

/// A container
///
/// A plain frame declines everything, so events bubble through it. An
/// [opaque](Frame::opaque) frame consumes pointer input reaching it, keeping
/// clicks on its background from reaching gadgets' ancestors or the page.
#[derive(Clone, Debug, Default)]
pub struct Frame {
    opaque: bool,
}

impl Frame {
    /// Construct a plain frame
    #[inline]
    pub fn new() -> Self {
        Frame::default()
    }

    /// Construct an opaque frame
    #[inline]
    pub fn opaque() -> Self {
        Frame { opaque: true }
    }

    /// True if opaque
    #[inline]
    pub fn is_opaque(&self) -> bool {
        self.opaque
    }
}

impl Gadget for Frame {
    fn flags(&self) -> GadgetFlags {
        GadgetFlags::default()
    }

    fn handle(&mut self, _: &mut EventCx<'_>, event: &Event) -> Response {
        (self.opaque && matches!(event, Event::Pointer(_))).into()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::*;
    use gadgetry::geom::Rect;

    #[test]
    fn opaque_swallows_pointer() {
        let mut router = router();
        let root = root(&router);
        router.add(root, Frame::new(), Rect::xywh(0, 0, 50, 50));
        router.add(root, Frame::opaque(), Rect::xywh(100, 0, 50, 50));

        click(&mut router, 10, 10);
        assert_eq!(router.diagnostics().unroutable, 2);
        click(&mut router, 110, 10);
        assert_eq!(router.diagnostics().unroutable, 2);
    }
}
