// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Input translation
//!
//! Platform shims report [`RawInput`] samples: physical pixel coordinates,
//! raw button indices and raw key codes. [`Input`] normalises these into
//! [`Event`] values and enqueues them.
//!
//! Raw key codes follow the USB HID keyboard usage table (page `0x07`),
//! which every supported platform can map its native codes onto.

use super::{Buttons, Custom, Event, KeyCode, KeyEvent, KeyKind, Modifiers, PointerKind};
use super::{Sender, TimerId};
use crate::cast::CastFloat;
use crate::geom::{Coord, Size};
use linear_map::LinearMap;

/// Policy for consecutive pointer-move events
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveCoalescing {
    /// A move still buffered in the queue is replaced by a newer move
    #[default]
    KeepLatest,
    /// Every move is enqueued
    KeepAll,
}

/// A raw sample from a platform shim
#[derive(Clone, Debug, PartialEq)]
pub enum RawInput {
    /// Pointer moved to `(x, y)` (physical pixels)
    PointerMoved { x: f64, y: f64 },
    /// Pointer button `button` changed state at `(x, y)` (physical pixels)
    ///
    /// Buttons are numbered `0` (primary), `1` (secondary), `2` (middle).
    /// Other buttons are ignored.
    PointerButton {
        x: f64,
        y: f64,
        button: u8,
        pressed: bool,
    },
    /// A key changed state; `code` is a HID usage code
    Key { code: u32, pressed: bool },
    /// Committed text
    Text(char),
    /// A timer fired
    Timer(u32),
    /// Application-defined signal
    Custom(Custom),
}

/// Platform capabilities consumed by the core
pub trait Platform {
    /// Poll the next raw input sample, if any
    fn poll_raw(&mut self) -> Option<RawInput>;

    /// Get the window size in logical pixels
    fn window_size(&self) -> Size;

    /// Get the ratio of physical to logical pixels
    fn scale_factor(&self) -> f64 {
        1.0
    }
}

/// Usage codes of the left/right Ctrl, Shift, Alt and Meta keys
const MODIFIER_KEYS: [(u32, Modifiers); 8] = [
    (0xE0, Modifiers::CTRL),
    (0xE1, Modifiers::SHIFT),
    (0xE2, Modifiers::ALT),
    (0xE3, Modifiers::META),
    (0xE4, Modifiers::CTRL),
    (0xE5, Modifiers::SHIFT),
    (0xE6, Modifiers::ALT),
    (0xE7, Modifiers::META),
];

/// The default key table
pub fn default_keymap() -> LinearMap<u32, KeyCode> {
    let mut map = LinearMap::with_capacity(80);
    for (i, c) in ('a'..='z').enumerate() {
        map.insert(0x04 + i as u32, KeyCode::Character(c));
    }
    for (i, c) in ('1'..='9').chain(std::iter::once('0')).enumerate() {
        map.insert(0x1E + i as u32, KeyCode::Character(c));
    }
    for (code, key) in [
        (0x28, KeyCode::Enter),
        (0x29, KeyCode::Escape),
        (0x2A, KeyCode::Backspace),
        (0x2B, KeyCode::Tab),
        (0x2C, KeyCode::Space),
        (0x2D, KeyCode::Character('-')),
        (0x2E, KeyCode::Character('=')),
        (0x36, KeyCode::Character(',')),
        (0x37, KeyCode::Character('.')),
        (0x38, KeyCode::Character('/')),
        (0x4A, KeyCode::Home),
        (0x4B, KeyCode::PageUp),
        (0x4C, KeyCode::Delete),
        (0x4D, KeyCode::End),
        (0x4E, KeyCode::PageDown),
        (0x4F, KeyCode::ArrowRight),
        (0x50, KeyCode::ArrowLeft),
        (0x51, KeyCode::ArrowDown),
        (0x52, KeyCode::ArrowUp),
    ] {
        map.insert(code, key);
    }
    for n in 1..=12u8 {
        map.insert(0x3A + u32::from(n) - 1, KeyCode::Function(n));
    }
    map
}

/// Input translator
///
/// Tracks held buttons and modifiers across samples so that each emitted
/// event carries the complete state. Modifier keys themselves only update
/// this state and are not enqueued.
#[derive(Debug)]
pub struct Input {
    sender: Sender,
    keymap: LinearMap<u32, KeyCode>,
    coalescing: MoveCoalescing,
    modifiers: Modifiers,
    buttons: Buttons,
    scale_factor: f64,
}

impl Input {
    /// Construct, using the [default key table](default_keymap)
    pub fn new(sender: Sender, coalescing: MoveCoalescing) -> Self {
        Input {
            sender,
            keymap: default_keymap(),
            coalescing,
            modifiers: Modifiers::empty(),
            buttons: Buttons::empty(),
            scale_factor: 1.0,
        }
    }

    /// Construct from configuration
    pub fn from_config(sender: Sender, config: &crate::config::Config) -> Self {
        Input::new(sender, config.move_coalescing)
    }

    /// Replace the key table
    pub fn with_keymap(mut self, keymap: LinearMap<u32, KeyCode>) -> Self {
        self.keymap = keymap;
        self
    }

    /// Map (or re-map) a single raw key code
    pub fn map_key(&mut self, code: u32, key: KeyCode) {
        self.keymap.insert(code, key);
    }

    /// Set the ratio of physical to logical pixels
    ///
    /// Non-positive or non-finite values are ignored.
    pub fn set_scale_factor(&mut self, factor: f64) {
        if factor.is_finite() && factor > 0.0 {
            self.scale_factor = factor;
        } else {
            log::warn!(target: "gadgetry_core::event", "set_scale_factor: ignoring bad factor {factor}");
        }
    }

    /// Current modifier state
    #[inline]
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Current button state
    #[inline]
    pub fn buttons(&self) -> Buttons {
        self.buttons
    }

    fn to_logical(&self, x: f64, y: f64) -> Option<Coord> {
        let lx: Option<i32> = (x / self.scale_factor).try_cast_nearest().ok();
        let ly: Option<i32> = (y / self.scale_factor).try_cast_nearest().ok();
        let coord = lx.zip(ly).map(|(x, y)| Coord(x, y));
        if coord.is_none() {
            log::warn!(target: "gadgetry_core::event", "Input: dropping pointer sample at ({x}, {y})");
        }
        coord
    }

    /// Translate a raw sample, updating tracked state
    ///
    /// Returns `None` for samples which produce no event (modifier keys,
    /// unsupported buttons, a release of a button not held, coordinates
    /// which are not finite or out of range).
    pub fn translate(&mut self, raw: RawInput) -> Option<Event> {
        Some(match raw {
            RawInput::PointerMoved { x, y } => {
                let Coord(x, y) = self.to_logical(x, y)?;
                Event::pointer(PointerKind::Move, x, y, self.buttons)
            }
            RawInput::PointerButton {
                x,
                y,
                button,
                pressed,
            } => {
                let flag = match button {
                    0 => Buttons::PRIMARY,
                    1 => Buttons::SECONDARY,
                    2 => Buttons::MIDDLE,
                    _ => return None,
                };
                // a release is recorded even when its position is unusable
                let coord = self.to_logical(x, y);
                let kind = if pressed && coord.is_some() {
                    self.buttons.insert(flag);
                    PointerKind::Down
                } else if !pressed && self.buttons.contains(flag) {
                    self.buttons.remove(flag);
                    PointerKind::Up
                } else {
                    return None;
                };
                let Coord(x, y) = coord?;
                Event::pointer(kind, x, y, self.buttons)
            }
            RawInput::Key { code, pressed } => {
                if let Some((_, m)) = MODIFIER_KEYS.iter().find(|(c, _)| *c == code) {
                    self.modifiers.set(*m, pressed);
                    return None;
                }
                let code = self
                    .keymap
                    .get(&code)
                    .copied()
                    .unwrap_or(KeyCode::Unknown(code));
                let kind = if pressed { KeyKind::Down } else { KeyKind::Up };
                Event::Key(KeyEvent {
                    kind,
                    code,
                    modifiers: self.modifiers,
                })
            }
            RawInput::Text(c) if c.is_control() => return None,
            RawInput::Text(c) => Event::Text(c),
            RawInput::Timer(id) => Event::Timer(TimerId(id)),
            RawInput::Custom(custom) => Event::Custom(custom),
        })
    }

    /// Translate and enqueue a raw sample
    ///
    /// Returns the sequence number, if an event was enqueued.
    pub fn push(&mut self, raw: RawInput) -> Option<u64> {
        let event = self.translate(raw)?;
        Some(match self.coalescing {
            MoveCoalescing::KeepLatest => self.sender.enqueue_coalescing(event),
            MoveCoalescing::KeepAll => self.sender.enqueue(event),
        })
    }

    /// Poll `platform` until exhausted, enqueueing translated events
    ///
    /// Returns the number of events enqueued.
    pub fn pump(&mut self, platform: &mut dyn Platform) -> usize {
        let factor = platform.scale_factor();
        if factor != self.scale_factor {
            self.set_scale_factor(factor);
        }

        let mut n = 0;
        while let Some(raw) = platform.poll_raw() {
            if self.push(raw).is_some() {
                n += 1;
            }
        }
        n
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::event::{OverflowPolicy, Queue};

    fn setup(coalescing: MoveCoalescing) -> (Queue, Input) {
        let queue = Queue::new(64, OverflowPolicy::DropOldest);
        let input = Input::new(queue.sender(), coalescing);
        (queue, input)
    }

    #[test]
    fn keys_and_modifiers() {
        let (_, mut input) = setup(MoveCoalescing::KeepAll);
        assert_eq!(input.translate(RawInput::Key { code: 0xE1, pressed: true }), None);
        assert_eq!(
            input.translate(RawInput::Key { code: 0x04, pressed: true }),
            Some(Event::Key(KeyEvent {
                kind: KeyKind::Down,
                code: KeyCode::Character('a'),
                modifiers: Modifiers::SHIFT,
            }))
        );
        input.translate(RawInput::Key { code: 0xE1, pressed: false });
        assert_eq!(
            input.translate(RawInput::Key { code: 0x27, pressed: false }),
            Some(Event::Key(KeyEvent::up(KeyCode::Character('0'))))
        );
        assert_eq!(
            input.translate(RawInput::Key { code: 0x3B, pressed: true }),
            Some(Event::Key(KeyEvent::down(KeyCode::Function(2))))
        );
        assert_eq!(
            input.translate(RawInput::Key { code: 0x99, pressed: true }),
            Some(Event::Key(KeyEvent::down(KeyCode::Unknown(0x99))))
        );
    }

    #[test]
    fn buttons_are_tracked_and_scaled() {
        let (_, mut input) = setup(MoveCoalescing::KeepAll);
        input.set_scale_factor(2.0);
        let down = input.translate(RawInput::PointerButton {
            x: 21.0,
            y: 40.0,
            button: 0,
            pressed: true,
        });
        assert_eq!(
            down,
            Some(Event::pointer(PointerKind::Down, 11, 20, Buttons::PRIMARY))
        );
        assert_eq!(
            input.translate(RawInput::PointerMoved { x: 4.0, y: 4.0 }),
            Some(Event::pointer(PointerKind::Move, 2, 2, Buttons::PRIMARY))
        );
        let up = input.translate(RawInput::PointerButton {
            x: 4.0,
            y: 4.0,
            button: 0,
            pressed: false,
        });
        assert_eq!(up, Some(Event::pointer(PointerKind::Up, 2, 2, Buttons::empty())));
        // release without press
        let stray = input.translate(RawInput::PointerButton {
            x: 4.0,
            y: 4.0,
            button: 1,
            pressed: false,
        });
        assert_eq!(stray, None);
    }

    #[test]
    fn control_text_is_filtered() {
        let (_, mut input) = setup(MoveCoalescing::KeepAll);
        assert_eq!(input.translate(RawInput::Text('\u{8}')), None);
        assert_eq!(input.translate(RawInput::Text('é')), Some(Event::Text('é')));
    }

    #[test]
    fn unrepresentable_coords_are_dropped() {
        let (queue, mut input) = setup(MoveCoalescing::KeepAll);
        let moved = |x, y| RawInput::PointerMoved { x, y };
        assert_eq!(input.translate(moved(f64::NAN, 0.0)), None);
        assert_eq!(input.translate(moved(0.0, f64::INFINITY)), None);
        assert_eq!(input.translate(moved(1e12, 5.0)), None);

        let press = RawInput::PointerButton {
            x: -1e12,
            y: 0.0,
            button: 0,
            pressed: true,
        };
        assert_eq!(input.push(press), None);
        assert_eq!(input.buttons(), Buttons::empty());
        assert!(queue.is_empty());

        let button = |x, pressed| RawInput::PointerButton {
            x,
            y: 0.0,
            button: 0,
            pressed,
        };
        assert!(input.translate(button(5.0, true)).is_some());
        assert_eq!(input.translate(button(f64::NAN, false)), None);
        assert_eq!(input.buttons(), Buttons::empty());

        assert_eq!(
            input.translate(moved(10.0, 20.0)),
            Some(Event::pointer_move(10, 20))
        );
    }

    #[test]
    fn keep_latest_coalesces_moves() {
        let (queue, mut input) = setup(MoveCoalescing::KeepLatest);
        for i in 0..10 {
            input.push(RawInput::PointerMoved { x: i as f64, y: 0.0 });
        }
        input.push(RawInput::Text('q'));
        input.push(RawInput::PointerMoved { x: 50.0, y: 0.0 });
        let events: Vec<_> = queue.drain().map(|q| q.event).collect();
        assert_eq!(events, vec![
            Event::pointer_move(9, 0),
            Event::Text('q'),
            Event::pointer_move(50, 0),
        ]);
    }

    #[test]
    fn keep_all_keeps_moves() {
        let (queue, mut input) = setup(MoveCoalescing::KeepAll);
        for i in 0..10 {
            input.push(RawInput::PointerMoved { x: i as f64, y: 0.0 });
        }
        assert_eq!(queue.drain().len(), 10);
    }

    struct Script(Vec<RawInput>);
    impl Platform for Script {
        fn poll_raw(&mut self) -> Option<RawInput> {
            (!self.0.is_empty()).then(|| self.0.remove(0))
        }
        fn window_size(&self) -> Size {
            Size(100, 100)
        }
        fn scale_factor(&self) -> f64 {
            2.0
        }
    }

    #[test]
    fn pump_drains_platform() {
        let (queue, mut input) = setup(MoveCoalescing::KeepAll);
        let mut platform = Script(vec![
            RawInput::PointerMoved { x: 10.0, y: 10.0 },
            RawInput::Key { code: 0xE0, pressed: true },
            RawInput::Timer(7),
        ]);
        assert_eq!(input.pump(&mut platform), 2);
        let events: Vec<_> = queue.drain().map(|q| q.event).collect();
        assert_eq!(events, vec![Event::pointer_move(5, 5), Event::Timer(TimerId(7))]);
        assert_eq!(input.modifiers(), Modifiers::CTRL);
    }
}
