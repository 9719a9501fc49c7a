// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Page navigation demo
//!
//! Drives a small four-page application from a scripted platform: each frame
//! the platform's samples are translated into the queue, then the router
//! pumps the queue and issues at most one redraw request.
//!
//! Run with `RUST_LOG=debug` to follow routing and page transitions. Set
//! `GADGETRY_CONFIG` to read configuration from a file.

use gadgetry::config::{Error, Options};
use gadgetry::event::{Input, Platform, Queue, RawInput};
use gadgetry::prelude::*;
use gadgetry::widgets::{Button, EditField, Frame, Label};
use std::collections::VecDeque;

const ENTER: u32 = 0x28;
const ESCAPE: u32 = 0x29;
const TAB: u32 = 0x2B;
const CLOCK: TimerId = TimerId(1);

fn button_rect(row: i32) -> Rect {
    Rect::xywh(270, 100 + 60 * row, 100, 40)
}

#[derive(Debug, Default)]
struct MainPage {
    ticks: u32,
}

impl Page for MainPage {
    fn build(&mut self, cx: &mut BuildCx<'_>) {
        let root = cx.root();
        cx.add(root, Label::new("Gadgetry"), Rect::xywh(270, 40, 100, 20));
        cx.add(
            root,
            Button::new_on("Setup", |cx| cx.push_page(SetupPage::default())),
            button_rect(0),
        );
        cx.add(
            root,
            Button::new_on("Help", |cx| cx.push_page(HelpPage)),
            button_rect(1),
        );
        cx.add(
            root,
            Button::new_on("Info", |cx| cx.push_page(InfoOverlay)),
            button_rect(2),
        );
    }

    fn on_enter(&mut self, cx: &mut EventCx<'_>) {
        cx.subscribe_timer(CLOCK);
    }

    fn handle(&mut self, _: &mut EventCx<'_>, event: &Event) -> Response {
        match event {
            Event::Timer(CLOCK) => {
                self.ticks += 1;
                log::info!("MainPage: tick {}", self.ticks);
                Handled
            }
            _ => Declined,
        }
    }
}

const SET_NAME: &str = "setup.name";

#[derive(Debug, Default)]
struct SetupPage {
    name: String,
}

impl Page for SetupPage {
    fn build(&mut self, cx: &mut BuildCx<'_>) {
        let root = cx.root();
        cx.add(root, Label::new("Name:"), Rect::xywh(170, 100, 60, 20));
        let field = EditField::new("")
            .with_max_len(24)
            .on_submit(|cx, text| {
                let root = cx.root();
                cx.post(root, Custom::with_payload(SET_NAME, text.to_string()));
            });
        cx.add(root, field, Rect::xywh(240, 100, 200, 20));
        cx.add(root, Button::new_on("Back", |cx| cx.pop_page()), button_rect(2));
    }

    fn handle(&mut self, cx: &mut EventCx<'_>, event: &Event) -> Response {
        match event {
            Event::Key(key) if key.kind == KeyKind::Down && key.code == KeyCode::Escape => {
                cx.pop_page();
                Handled
            }
            Event::Custom(custom) if custom.is(SET_NAME) => {
                if let Some(name) = custom.payload::<String>() {
                    log::info!("SetupPage: name set to {name:?}");
                    self.name = name.clone();
                }
                Handled
            }
            _ => Declined,
        }
    }
}

#[derive(Debug)]
struct HelpPage;

impl Page for HelpPage {
    fn build(&mut self, cx: &mut BuildCx<'_>) {
        let root = cx.root();
        cx.add(root, Label::new("Press Escape to return"), Rect::xywh(200, 200, 240, 20));
    }

    fn handle(&mut self, cx: &mut EventCx<'_>, event: &Event) -> Response {
        match event {
            Event::Key(key) if key.kind == KeyKind::Down && key.code == KeyCode::Escape => {
                cx.pop_page();
                Handled
            }
            _ => Declined,
        }
    }
}

/// Overlay: clicks outside its panel reach the page below
#[derive(Debug)]
struct InfoOverlay;

impl Page for InfoOverlay {
    fn build(&mut self, cx: &mut BuildCx<'_>) {
        let Some(panel) = cx.add(cx.root(), Frame::opaque(), Rect::xywh(420, 280, 200, 160)) else {
            return;
        };
        cx.add(panel, Label::new("gadgetry demo"), Rect::xywh(10, 10, 180, 20));
        cx.add(panel, Button::new_on("Close", |cx| cx.pop_page()), Rect::xywh(50, 100, 100, 40));
    }

    fn pass_through(&self) -> bool {
        true
    }
}

/// A platform replaying recorded frames
struct Script {
    frames: VecDeque<Vec<RawInput>>,
    current: VecDeque<RawInput>,
}

impl Script {
    fn new() -> Self {
        let click = |x: f64, y: f64| {
            vec![
                RawInput::PointerMoved { x, y },
                RawInput::PointerButton { x, y, button: 0, pressed: true },
                RawInput::PointerButton { x, y, button: 0, pressed: false },
            ]
        };
        let key = |code: u32| {
            vec![
                RawInput::Key { code, pressed: true },
                RawInput::Key { code, pressed: false },
            ]
        };

        let mut frames = VecDeque::new();
        frames.push_back(vec![RawInput::Timer(1)]);
        // Setup: enter a name, then leave with Escape
        frames.push_back(click(300.0, 120.0));
        let mut typing = click(300.0, 110.0);
        typing.extend("Ada".chars().map(RawInput::Text));
        typing.extend(key(ENTER));
        frames.push_back(typing);
        frames.push_back(key(ESCAPE));
        // Info overlay, then Help through the overlay
        frames.push_back(click(300.0, 240.0));
        frames.push_back(vec![RawInput::Timer(1)]);
        frames.push_back(click(300.0, 180.0));
        frames.push_back(key(ESCAPE));
        // Close the overlay from the keyboard
        let mut keys = key(TAB);
        keys.extend(key(ENTER));
        frames.push_back(keys);
        frames.push_back(vec![RawInput::Timer(1)]);

        Script {
            frames,
            current: VecDeque::new(),
        }
    }

    fn next_frame(&mut self) -> bool {
        match self.frames.pop_front() {
            Some(frame) => {
                self.current = frame.into();
                true
            }
            None => false,
        }
    }
}

impl Platform for Script {
    fn poll_raw(&mut self) -> Option<RawInput> {
        self.current.pop_front()
    }

    fn window_size(&self) -> Size {
        Size(640, 480)
    }
}

/// Logs redraw requests in place of a renderer
struct Console;

impl Graph for Console {
    fn request_redraw(&mut self, rect: Rect) {
        log::info!("redraw {rect:?}");
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();

    let options = Options::from_env();
    let config = options.read_config()?;
    let mut script = Script::new();
    let queue = Queue::from_config(&config);
    let mut input = Input::from_config(queue.sender(), &config);
    let mut router = Router::new(config, script.window_size(), MainPage::default());
    router.set_fault_handler(|fault| log::warn!("fault: {fault}"));

    let mut frame = 0;
    while script.next_frame() {
        frame += 1;
        input.pump(&mut script);
        let n = router.pump(&queue, &mut Console);
        log::info!("frame {frame}: {n} events, {} page(s) on the stack", router.stack().len());
    }

    let base = router.stack()[0];
    let ticks = router.page::<MainPage>(base).map(|p| p.ticks).unwrap_or(0);
    println!("main page ticks: {ticks}");
    println!("{:#?}", router.diagnostics());
    options.write_config(router.config())
}
