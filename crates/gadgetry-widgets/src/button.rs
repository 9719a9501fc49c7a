// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Push-buttons

use gadgetry::event::{Buttons, Declined, Event, EventCx, Handled, KeyCode, KeyKind};
use gadgetry::event::{PointerKind, Response};
use gadgetry::{Gadget, GadgetFlags};
use std::fmt;

type OnPress = Box<dyn FnMut(&mut EventCx<'_>)>;

/// A push-button
///
/// The button is activated by a primary-button click (press and release
/// within the button) or by <kbd>Enter</kbd> / <kbd>Space</kbd> while
/// focused. Pressing takes focus.
pub struct Button {
    label: String,
    pressed: bool,
    on_press: Option<OnPress>,
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("label", &self.label)
            .field("pressed", &self.pressed)
            .finish_non_exhaustive()
    }
}

impl Button {
    /// Construct a button with a label
    #[inline]
    pub fn new(label: impl ToString) -> Self {
        Button {
            label: label.to_string(),
            pressed: false,
            on_press: None,
        }
    }

    /// Set the activation handler (chain style)
    ///
    /// The handler receives the button's event context and may use it to
    /// navigate, post events, etc.
    #[inline]
    #[must_use]
    pub fn on_press(mut self, f: impl FnMut(&mut EventCx<'_>) + 'static) -> Self {
        self.on_press = Some(Box::new(f));
        self
    }

    /// Construct with a label and activation handler
    #[inline]
    pub fn new_on(label: impl ToString, f: impl FnMut(&mut EventCx<'_>) + 'static) -> Self {
        Button::new(label).on_press(f)
    }

    /// Get the label
    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// True while held down by the pointer
    #[inline]
    pub fn is_pressed(&self) -> bool {
        self.pressed
    }

    fn activate(&mut self, cx: &mut EventCx<'_>) {
        log::debug!("Button: activate {:?}", self.label);
        if let Some(f) = self.on_press.as_mut() {
            f(cx);
        }
    }

    fn set_pressed(&mut self, cx: &mut EventCx<'_>, pressed: bool) {
        if self.pressed != pressed {
            self.pressed = pressed;
            cx.invalidate();
        }
    }
}

impl Gadget for Button {
    fn flags(&self) -> GadgetFlags {
        GadgetFlags::default() | GadgetFlags::FOCUSABLE
    }

    fn handle(&mut self, cx: &mut EventCx<'_>, event: &Event) -> Response {
        match event {
            Event::Pointer(ev) => match ev.kind {
                PointerKind::Down if ev.buttons.contains(Buttons::PRIMARY) => {
                    self.set_pressed(cx, true);
                    cx.request_focus();
                    Handled
                }
                PointerKind::Up if self.pressed => {
                    self.set_pressed(cx, false);
                    if cx.rect().contains(ev.coord) {
                        self.activate(cx);
                    }
                    Handled
                }
                _ => Declined,
            },
            Event::Key(key) if key.kind == KeyKind::Down => match key.code {
                KeyCode::Enter | KeyCode::Space => {
                    self.activate(cx);
                    Handled
                }
                _ => Declined,
            },
            _ => Declined,
        }
    }

    fn on_hover(&mut self, cx: &mut EventCx<'_>, hovered: bool) {
        if !hovered {
            self.set_pressed(cx, false);
        }
        cx.invalidate();
    }

    fn on_blur(&mut self, cx: &mut EventCx<'_>) {
        self.set_pressed(cx, false);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::*;
    use gadgetry::event::KeyEvent;
    use gadgetry::geom::Rect;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn click_activates_and_focuses() {
        let count = Rc::new(Cell::new(0));
        let c2 = count.clone();
        let mut router = router();
        let root = root(&router);
        let button = Button::new_on("OK", move |_| c2.set(c2.get() + 1));
        let id = router.add(root, button, Rect::xywh(10, 10, 40, 20)).unwrap();

        click(&mut router, 20, 20);
        assert_eq!(count.get(), 1);
        assert_eq!(router.focused(), Some(id));
        assert!(!router.gadget::<Button>(id).unwrap().is_pressed());

        send(&mut router, Event::Key(KeyEvent::down(KeyCode::Enter)));
        send(&mut router, Event::Key(KeyEvent::down(KeyCode::Space)));
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn release_outside_cancels() {
        let count = Rc::new(Cell::new(0));
        let c2 = count.clone();
        let mut router = router();
        let root = root(&router);
        let button = Button::new_on("OK", move |_| c2.set(c2.get() + 1));
        let id = router.add(root, button, Rect::xywh(10, 10, 40, 20)).unwrap();

        send(&mut router, Event::pointer(PointerKind::Down, 20, 20, Buttons::PRIMARY));
        assert!(router.gadget::<Button>(id).unwrap().is_pressed());
        send(&mut router, Event::pointer(PointerKind::Move, 100, 80, Buttons::PRIMARY));
        send(&mut router, Event::pointer(PointerKind::Up, 100, 80, Buttons::empty()));
        assert_eq!(count.get(), 0);
        assert!(!router.gadget::<Button>(id).unwrap().is_pressed());
    }
}
