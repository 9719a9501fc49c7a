// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Gadgetry prelude
//!
//! Common items for implementing gadgets and pages:
//! ```
//! use gadgetry::prelude::*;
//! ```

#[doc(no_inline)]
pub use gadgetry_core::event::{
    Custom, Declined, Event, EventCx, Handled, KeyCode, KeyEvent, KeyKind, PointerKind, Response,
    TimerId,
};
#[doc(no_inline)]
pub use gadgetry_core::geom::{Coord, Offset, Rect, Size};
#[doc(no_inline)]
pub use gadgetry_core::{BuildCx, Gadget, GadgetFlags, GadgetId, Graph, Page, PageId, Router};
