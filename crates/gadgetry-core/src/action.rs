// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Action enum

bitflags::bitflags! {
    /// Action required after processing
    ///
    /// The [`Router`](crate::Router) accumulates these while applying the
    /// requests recorded by handlers and acts on them once at the end of a
    /// pump cycle.
    ///
    /// Two `Action` values may be combined via bit-or (`a | b`).
    #[must_use]
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
    pub struct Action: u32 {
        /// Some region was invalidated and must be redrawn
        const REDRAW = 1 << 0;
        /// Gadgets moved, appeared or disappeared
        ///
        /// The hover path is recomputed from the last known pointer position.
        const REGION_MOVED = 1 << 4;
        /// The page stack changed
        ///
        /// Implies [`Action::REGION_MOVED`] and [`Action::REDRAW`] for the
        /// incoming page.
        const NAVIGATE = 1 << 8;
    }
}
