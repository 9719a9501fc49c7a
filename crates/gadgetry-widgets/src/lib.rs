// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Gadgetry stock gadgets
//!
//! These implement input behaviour only; drawing belongs to the renderer,
//! which may query gadget state through the tree.
//!
//! ## Containers
//!
//! -   [`Frame`]: groups children, optionally swallowing pointer input
//!
//! ## Display
//!
//! -   [`Label`]: a line of text, hit only over its glyphs
//!
//! ## Controls
//!
//! -   [`Button`]: a push-button activated by click, Enter or Space
//! -   [`EditField`]: a single-line text entry

mod button;
mod edit_field;
mod frame;
mod label;

pub use button::Button;
pub use edit_field::EditField;
pub use frame::Frame;
pub use label::Label;

#[cfg(test)]
pub(crate) mod testing {
    use gadgetry::config::Config;
    use gadgetry::event::{Buttons, Event, PointerKind, Queued};
    use gadgetry::geom::Size;
    use gadgetry::{BlankPage, GadgetId, NullGraph, Router};

    pub fn router() -> Router {
        Router::new(Config::default(), Size(200, 100), BlankPage)
    }

    pub fn root(router: &Router) -> GadgetId {
        router.pages().root(router.top()).unwrap()
    }

    pub fn send(router: &mut Router, event: Event) {
        router.route(Queued { seq: 0, event }, &NullGraph);
    }

    pub fn click(router: &mut Router, x: i32, y: i32) {
        send(router, Event::pointer(PointerKind::Down, x, y, Buttons::PRIMARY));
        send(router, Event::pointer(PointerKind::Up, x, y, Buttons::empty()));
    }
}
