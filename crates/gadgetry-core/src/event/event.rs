// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Event handling: `Event` type and dependencies

use crate::geom::Coord;
use smol_str::SmolStr;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

bitflags::bitflags! {
    /// Pointer buttons held while a pointer event was generated
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Buttons: u8 {
        const PRIMARY = 1 << 0;
        const SECONDARY = 1 << 1;
        const MIDDLE = 1 << 2;
    }
}

bitflags::bitflags! {
    /// Keyboard modifier state
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const CTRL = 1 << 1;
        const ALT = 1 << 2;
        /// Cmd on macOS, Win on Windows
        const META = 1 << 3;
    }
}

/// Kind of a [`PointerEvent`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerKind {
    Move,
    Down,
    Up,
}

/// A pointer (mouse, pen or primary touch) sample
///
/// `coord` is in window coordinates (logical pixels).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub coord: Coord,
    /// Buttons held *after* this event
    pub buttons: Buttons,
}

/// Kind of a [`KeyEvent`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyKind {
    Down,
    Up,
}

/// Platform-independent key identifier
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A letter, digit or punctuation key, reported in lower case
    Character(char),
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Space,
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    PageUp,
    PageDown,
    /// Function key `F1..=F24`
    Function(u8),
    /// A platform code with no mapping
    Unknown(u32),
}

/// A key press or release
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub kind: KeyKind,
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    /// Construct a key-down event without modifiers
    pub fn down(code: KeyCode) -> Self {
        KeyEvent {
            kind: KeyKind::Down,
            code,
            modifiers: Modifiers::empty(),
        }
    }

    /// Construct a key-up event without modifiers
    pub fn up(code: KeyCode) -> Self {
        KeyEvent {
            kind: KeyKind::Up,
            code,
            modifiers: Modifiers::empty(),
        }
    }
}

/// A timer identifier
///
/// Timers are driven externally: some scheduler posts [`Event::Timer`] into
/// the queue when due. Gadgets subscribe to an identifier via
/// [`EventCx::subscribe_timer`](super::EventCx::subscribe_timer).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimerId(pub u32);

/// Payload type of [`Custom`] events
pub type Payload = Arc<dyn Any + Send + Sync>;

/// An application-defined signal
///
/// The `tag` identifies the signal; the optional payload may be recovered
/// with [`Custom::payload`].
#[derive(Clone)]
pub struct Custom {
    pub tag: SmolStr,
    payload: Option<Payload>,
}

impl Custom {
    /// Construct without payload
    pub fn new(tag: impl Into<SmolStr>) -> Self {
        Custom {
            tag: tag.into(),
            payload: None,
        }
    }

    /// Construct with a payload
    pub fn with_payload<T: Any + Send + Sync>(tag: impl Into<SmolStr>, payload: T) -> Self {
        Custom {
            tag: tag.into(),
            payload: Some(Arc::new(payload)),
        }
    }

    /// Check the tag
    #[inline]
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Downcast the payload, if any
    pub fn payload<T: Any>(&self) -> Option<&T> {
        self.payload.as_deref().and_then(|p| p.downcast_ref())
    }
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom")
            .field("tag", &self.tag)
            .field("has_payload", &self.payload.is_some())
            .finish()
    }
}

/// Tags are compared by value, payloads by identity
impl PartialEq for Custom {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && match (&self.payload, &other.payload) {
                (None, None) => true,
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                _ => false,
            }
    }
}

/// Events addressed to a gadget or page
///
/// Events are immutable once enqueued. See the [module documentation](super)
/// for delivery rules.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Pointer movement, press or release
    Pointer(PointerEvent),
    /// Key press or release
    Key(KeyEvent),
    /// Committed text input (one code point)
    Text(char),
    /// A timer fired
    Timer(TimerId),
    /// Application-defined signal
    Custom(Custom),
}

impl Event {
    /// Construct a pointer event
    pub fn pointer(kind: PointerKind, x: i32, y: i32, buttons: Buttons) -> Self {
        Event::Pointer(PointerEvent {
            kind,
            coord: Coord(x, y),
            buttons,
        })
    }

    /// Construct a pointer-move event with no buttons held
    pub fn pointer_move(x: i32, y: i32) -> Self {
        Event::pointer(PointerKind::Move, x, y, Buttons::empty())
    }

    /// True for pointer-move events
    #[inline]
    pub fn is_pointer_move(&self) -> bool {
        matches!(self, Event::Pointer(p) if p.kind == PointerKind::Move)
    }

    /// Whether a declined event is re-offered to ancestors
    ///
    /// Timer events are addressed to their subscribers only.
    #[inline]
    pub fn bubbles(&self) -> bool {
        !matches!(self, Event::Timer(_))
    }

    /// Whether this event may be received by disabled gadgets
    ///
    /// Pointer, key and text input never reach a disabled gadget.
    #[inline]
    pub fn pass_when_disabled(&self) -> bool {
        matches!(self, Event::Timer(_) | Event::Custom(_))
    }
}

/// An [`Event`] together with its queue sequence number
///
/// Sequence numbers are assigned by the [`Queue`](super::Queue) on
/// acceptance and strictly increase in enqueue order.
#[derive(Clone, Debug, PartialEq)]
pub struct Queued {
    pub seq: u64,
    pub event: Event,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn custom_payload_downcast() {
        let c = Custom::with_payload("score", 42u32);
        assert!(c.is("score"));
        assert_eq!(c.payload::<u32>(), Some(&42));
        assert_eq!(c.payload::<i64>(), None);
        assert_eq!(Custom::new("x").payload::<u32>(), None);
    }

    #[test]
    fn custom_equality() {
        let a = Custom::with_payload("a", 1u8);
        assert_eq!(a, a.clone());
        assert_ne!(a, Custom::with_payload("a", 1u8));
        assert_eq!(Custom::new("b"), Custom::new("b"));
    }

    #[test]
    fn event_is_send() {
        fn check<T: Send + Sync>() {}
        check::<Event>();
        check::<Queued>();
    }

    #[test]
    fn routing_properties() {
        assert!(Event::pointer_move(1, 2).is_pointer_move());
        assert!(!Event::Text('a').is_pointer_move());
        assert!(!Event::Timer(TimerId(0)).bubbles());
        assert!(Event::Key(KeyEvent::down(KeyCode::Enter)).bubbles());
        assert!(Event::Custom(Custom::new("c")).pass_when_disabled());
        assert!(!Event::Text('a').pass_when_disabled());
    }
}
