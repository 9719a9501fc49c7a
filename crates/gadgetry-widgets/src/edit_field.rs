// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Text entry

use gadgetry::event::{Buttons, Declined, Event, EventCx, Handled, KeyCode, KeyKind};
use gadgetry::event::{PointerKind, Response};
use gadgetry::{Gadget, GadgetFlags};
use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

type OnSubmit = Box<dyn FnMut(&mut EventCx<'_>, &str)>;

/// A single-line text entry
///
/// Takes focus when clicked. While focused, text input is appended,
/// <kbd>Backspace</kbd> deletes the last grapheme and <kbd>Enter</kbd>
/// submits. Other keys are declined and bubble.
pub struct EditField {
    text: String,
    max_len: Option<usize>,
    on_submit: Option<OnSubmit>,
}

impl fmt::Debug for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditField")
            .field("text", &self.text)
            .field("max_len", &self.max_len)
            .finish_non_exhaustive()
    }
}

impl EditField {
    /// Construct with initial text
    pub fn new(text: impl ToString) -> Self {
        EditField {
            text: text.to_string(),
            max_len: None,
            on_submit: None,
        }
    }

    /// Limit the length (in chars)
    #[must_use]
    pub fn with_max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }

    /// Set the submit handler (chain style)
    #[must_use]
    pub fn on_submit(mut self, f: impl FnMut(&mut EventCx<'_>, &str) + 'static) -> Self {
        self.on_submit = Some(Box::new(f));
        self
    }

    /// Get the text
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text
    pub fn set_text(&mut self, text: impl ToString) {
        self.text = text.to_string();
    }

    fn insert(&mut self, c: char) -> bool {
        if self.max_len.is_some_and(|max| self.text.chars().count() >= max) {
            return false;
        }
        self.text.push(c);
        true
    }

    fn delete_back(&mut self) -> bool {
        match self.text.grapheme_indices(true).next_back() {
            Some((index, _)) => {
                self.text.truncate(index);
                true
            }
            None => false,
        }
    }
}

impl Gadget for EditField {
    fn flags(&self) -> GadgetFlags {
        GadgetFlags::default() | GadgetFlags::FOCUSABLE
    }

    fn handle(&mut self, cx: &mut EventCx<'_>, event: &Event) -> Response {
        match event {
            Event::Pointer(ev) if ev.kind == PointerKind::Down => {
                if ev.buttons.contains(Buttons::PRIMARY) {
                    cx.request_focus();
                }
                Handled
            }
            Event::Text(c) => {
                if self.insert(*c) {
                    cx.invalidate();
                }
                Handled
            }
            Event::Key(key) if key.kind == KeyKind::Down => match key.code {
                KeyCode::Backspace => {
                    if self.delete_back() {
                        cx.invalidate();
                    }
                    Handled
                }
                KeyCode::Enter => {
                    if let Some(f) = self.on_submit.as_mut() {
                        f(cx, &self.text);
                    }
                    Handled
                }
                _ => Declined,
            },
            _ => Declined,
        }
    }

    fn on_focus(&mut self, cx: &mut EventCx<'_>) {
        cx.invalidate();
    }

    fn on_blur(&mut self, cx: &mut EventCx<'_>) {
        cx.invalidate();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::testing::*;
    use gadgetry::event::KeyEvent;
    use gadgetry::geom::Rect;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn typing_and_submit() {
        let submitted = Rc::new(RefCell::new(String::new()));
        let s2 = submitted.clone();
        let mut router = router();
        let root = root(&router);
        let field = EditField::new("").on_submit(move |_, text| *s2.borrow_mut() = text.to_string());
        let id = router.add(root, field, Rect::xywh(0, 0, 100, 20)).unwrap();

        // not focused: text goes to the page root and is not consumed
        send(&mut router, Event::Text('x'));
        assert_eq!(router.gadget::<EditField>(id).unwrap().text(), "");
        assert_eq!(router.diagnostics().unroutable, 1);

        click(&mut router, 5, 5);
        assert_eq!(router.focused(), Some(id));
        for c in "hé!".chars() {
            send(&mut router, Event::Text(c));
        }
        send(&mut router, Event::Key(KeyEvent::down(KeyCode::Backspace)));
        assert_eq!(router.gadget::<EditField>(id).unwrap().text(), "hé");

        send(&mut router, Event::Key(KeyEvent::down(KeyCode::Enter)));
        assert_eq!(*submitted.borrow(), "hé");
    }

    #[test]
    fn grapheme_delete_and_limit() {
        let mut field = EditField::new("ae\u{301}").with_max_len(3);
        assert!(!field.insert('x'));
        assert!(field.delete_back());
        assert_eq!(field.text(), "a");
        assert!(field.delete_back());
        assert!(!field.delete_back());
    }
}
