// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

use gadgetry::config::Config;
use gadgetry::event::{Buttons, KeyEvent, Modifiers, OverflowPolicy, PointerKind, Queue, Queued};
use gadgetry::prelude::*;
use gadgetry::widgets::{Button, EditField};
use gadgetry::{BlankPage, Fault, NullGraph, RecordingGraph};
use std::cell::RefCell;
use std::rc::Rc;

fn router() -> Router {
    Router::new(Config::default(), Size(200, 100), BlankPage)
}

fn root(router: &Router) -> GadgetId {
    router.pages().root(router.top()).unwrap()
}

fn send(router: &mut Router, event: Event) {
    router.route(Queued { seq: 0, event }, &NullGraph);
}

fn click(router: &mut Router, x: i32, y: i32) {
    send(router, Event::pointer(PointerKind::Down, x, y, Buttons::PRIMARY));
    send(router, Event::pointer(PointerKind::Up, x, y, Buttons::empty()));
}

fn faults(router: &mut Router) -> Rc<RefCell<Vec<Fault>>> {
    let list = Rc::new(RefCell::new(vec![]));
    let l2 = list.clone();
    router.set_fault_handler(move |f| l2.borrow_mut().push(f.clone()));
    list
}

#[test]
fn removed_focus_holder_releases_focus() {
    let mut router = router();
    let root = root(&router);
    let field = router
        .add(root, EditField::new(""), Rect::xywh(0, 0, 100, 20))
        .unwrap();
    assert!(router.set_focus(field));

    send(&mut router, Event::Text('x'));
    assert_eq!(router.gadget::<EditField>(field).unwrap().text(), "x");

    router.remove(field);
    assert_eq!(router.focused(), None);
    assert!(!router.tree().contains(field));
    assert_eq!(router.diagnostics().dangling_focus, 1);

    // with no focus the key starts at the page root and goes unhandled
    send(&mut router, Event::Text('y'));
    assert_eq!(router.diagnostics().unroutable, 1);
}

#[test]
fn overflow_drops_oldest_and_is_reported() {
    #[derive(Debug, Default)]
    struct Tracker {
        seen: Vec<Coord>,
    }
    impl Page for Tracker {
        fn handle(&mut self, _: &mut EventCx<'_>, event: &Event) -> Response {
            match event {
                Event::Pointer(ev) => {
                    self.seen.push(ev.coord);
                    Handled
                }
                _ => Declined,
            }
        }
    }

    let mut router = Router::new(Config::default(), Size(200, 100), Tracker::default());
    let faults = faults(&mut router);
    let queue = Queue::new(3, OverflowPolicy::DropOldest);
    for i in 1..=5 {
        queue.enqueue(Event::pointer_move(i, i));
    }

    assert_eq!(router.pump(&queue, &mut NullGraph), 3);
    let base = router.top();
    let seen = &router.page::<Tracker>(base).unwrap().seen;
    assert_eq!(seen, &[Coord(3, 3), Coord(4, 4), Coord(5, 5)]);
    assert_eq!(faults.borrow().as_slice(), &[Fault::QueueOverflow { count: 2 }]);
    assert_eq!(router.diagnostics().overflow_dropped, 2);
    assert_eq!(router.diagnostics().routed, 3);

    // the same drops are not reported twice
    router.pump(&queue, &mut NullGraph);
    assert_eq!(router.diagnostics().overflow_dropped, 2);
}

#[test]
fn hit_test_is_stable() {
    let mut router = router();
    let root = root(&router);
    let a = router.add(root, Button::new("a"), Rect::xywh(0, 0, 50, 50)).unwrap();
    let b = router.add(root, Button::new("b"), Rect::xywh(25, 25, 50, 50)).unwrap();

    let first = router.hit_test(Coord(30, 30), &NullGraph);
    assert_eq!(first, Some(b));
    assert_eq!(router.hit_test(Coord(30, 30), &NullGraph), first);
    assert_eq!(router.hit_test(Coord(10, 10), &NullGraph), Some(a));
    assert_eq!(router.hit_test(Coord(150, 80), &NullGraph), Some(root));
    assert_eq!(router.hit_test(Coord(250, 80), &NullGraph), None);

    send(&mut router, Event::pointer_move(30, 30));
    assert_eq!(router.hovered(), first);
}

#[test]
fn at_most_one_focus_per_page() {
    let mut router = router();
    let root = root(&router);
    let ids: Vec<_> = (0..3)
        .map(|i| {
            let rect = Rect::xywh(i * 60, 0, 50, 30);
            router.add(root, Button::new(i), rect).unwrap()
        })
        .collect();

    for (i, id) in ids.iter().enumerate() {
        click(&mut router, i as i32 * 60 + 10, 10);
        assert_eq!(router.focused(), Some(*id));
        let focused = ids
            .iter()
            .filter(|id| router.tree().flags(**id).contains(GadgetFlags::FOCUSED))
            .count();
        assert_eq!(focused, 1);
    }
}

#[test]
fn tab_cycles_focus() {
    let mut router = router();
    let root = root(&router);
    let ids: Vec<_> = (0..3)
        .map(|i| {
            let rect = Rect::xywh(i * 60, 0, 50, 30);
            router.add(root, Button::new(i), rect).unwrap()
        })
        .collect();
    let disabled = router.add(root, Button::new("x"), Rect::xywh(0, 50, 50, 30)).unwrap();
    router.set_enabled(disabled, false);

    let tab = Event::Key(KeyEvent::down(KeyCode::Tab));
    let mut order = vec![];
    for _ in 0..4 {
        send(&mut router, tab.clone());
        order.push(router.focused().unwrap());
    }
    assert_eq!(order, [ids[0], ids[1], ids[2], ids[0]]);

    let back_tab = Event::Key(KeyEvent {
        kind: KeyKind::Down,
        code: KeyCode::Tab,
        modifiers: Modifiers::SHIFT,
    });
    send(&mut router, back_tab);
    assert_eq!(router.focused(), Some(ids[2]));
    assert_eq!(router.diagnostics().unroutable, 0);
}

#[test]
fn one_redraw_per_pump() {
    let mut router = router();
    let mut graph = RecordingGraph::new();
    let queue = Queue::from_config(router.config());
    router.pump(&queue, &mut graph);
    graph.take();

    let root = root(&router);
    let a = router.add(root, Button::new("a"), Rect::xywh(0, 0, 10, 10)).unwrap();
    let b = router.add(root, Button::new("b"), Rect::xywh(50, 50, 10, 10)).unwrap();
    router.invalidate(a);
    router.invalidate(b);
    router.pump(&queue, &mut graph);
    assert_eq!(graph.take(), vec![Rect::xywh(0, 0, 60, 60)]);
    assert!(router.tree().flags(a).contains(GadgetFlags::DIRTY));

    router.pump(&queue, &mut graph);
    assert!(graph.take().is_empty());
    assert!(!router.tree().flags(a).contains(GadgetFlags::DIRTY));

    // pressing a button redraws it, once
    queue.enqueue(Event::pointer(PointerKind::Down, 5, 5, Buttons::PRIMARY));
    queue.enqueue(Event::pointer(PointerKind::Up, 5, 5, Buttons::empty()));
    router.pump(&queue, &mut graph);
    let requests = graph.take();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].contains(Coord(5, 5)));
}

#[test]
fn timers_reach_each_subscriber_once() {
    #[derive(Debug, Default)]
    struct Ticker {
        ticks: u32,
    }
    impl Gadget for Ticker {
        fn handle(&mut self, _: &mut EventCx<'_>, event: &Event) -> Response {
            match event {
                Event::Timer(_) => {
                    self.ticks += 1;
                    Handled
                }
                _ => Declined,
            }
        }
    }

    let mut router = router();
    let root = root(&router);
    let a = router.add(root, Ticker::default(), Rect::xywh(0, 0, 10, 10)).unwrap();
    let b = router.add(root, Ticker::default(), Rect::xywh(20, 0, 10, 10)).unwrap();
    let timer = TimerId(5);
    router.subscribe(timer, a);
    router.subscribe(timer, b);
    router.subscribe(timer, a);

    send(&mut router, Event::Timer(timer));
    assert_eq!(router.gadget::<Ticker>(a).unwrap().ticks, 1);
    assert_eq!(router.gadget::<Ticker>(b).unwrap().ticks, 1);

    // disabled gadgets still receive timers
    router.set_enabled(b, false);
    router.remove(a);
    send(&mut router, Event::Timer(timer));
    assert_eq!(router.gadget::<Ticker>(b).unwrap().ticks, 2);
    assert_eq!(router.timers().subscribers(timer), &[b]);

    send(&mut router, Event::Timer(TimerId(6)));
    assert_eq!(router.diagnostics().unroutable, 1);
}

#[test]
fn custom_events_go_to_the_page_first() {
    type Seen = Rc<RefCell<Vec<String>>>;

    #[derive(Debug)]
    struct Sink {
        seen: Seen,
    }
    impl Gadget for Sink {
        fn handle(&mut self, _: &mut EventCx<'_>, event: &Event) -> Response {
            match event {
                Event::Custom(custom) => {
                    self.seen.borrow_mut().push(format!("sink:{}", custom.tag));
                    Handled
                }
                _ => Declined,
            }
        }
    }

    #[derive(Debug)]
    struct Dispatcher {
        seen: Seen,
        sink: Option<GadgetId>,
    }
    impl Page for Dispatcher {
        fn build(&mut self, cx: &mut BuildCx<'_>) {
            let sink = Sink {
                seen: self.seen.clone(),
            };
            self.sink = cx.add(cx.root(), sink, Rect::xywh(0, 0, 20, 20));
        }

        fn handle(&mut self, cx: &mut EventCx<'_>, event: &Event) -> Response {
            let Event::Custom(custom) = event else {
                return Declined;
            };
            self.seen.borrow_mut().push(format!("page:{}", custom.tag));
            if custom.is("mine") {
                Handled
            } else if custom.is("relay")
                && let Some(sink) = self.sink
            {
                cx.post(sink, custom.clone());
                Handled
            } else {
                Declined
            }
        }
    }

    let seen = Seen::default();
    let page = Dispatcher {
        seen: seen.clone(),
        sink: None,
    };
    let mut router = Router::new(Config::default(), Size(200, 100), page);
    let queue = Queue::from_config(router.config());
    for tag in ["mine", "relay", "other"] {
        queue.enqueue(Event::Custom(Custom::new(tag)));
    }
    assert_eq!(router.pump(&queue, &mut NullGraph), 3);

    assert_eq!(
        *seen.borrow(),
        ["page:mine", "page:relay", "sink:relay", "page:other"]
    );
    assert_eq!(router.diagnostics().unroutable, 1);
}
