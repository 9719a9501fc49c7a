// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Timer subscriptions

use crate::event::TimerId;
use crate::gadget::GadgetId;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

type Subscribers = SmallVec<[GadgetId; 2]>;

/// Map from timer identifier to subscribed gadgets
///
/// Timers themselves are driven externally: the platform enqueues
/// [`Event::Timer`](crate::event::Event::Timer). This table decides who receives
/// each tick.
#[derive(Debug, Default)]
pub struct Timers {
    map: FxHashMap<TimerId, Subscribers>,
}

impl Timers {
    /// Subscribe `gadget` to `timer`
    ///
    /// Subscribing twice has no further effect.
    pub fn subscribe(&mut self, timer: TimerId, gadget: GadgetId) {
        let list = self.map.entry(timer).or_default();
        if !list.contains(&gadget) {
            log::trace!(target: "gadgetry_core::timer", "subscribe: {timer:?} -> {gadget:?}");
            list.push(gadget);
        }
    }

    /// Cancel a subscription
    ///
    /// Returns true if it existed.
    pub fn cancel(&mut self, timer: TimerId, gadget: GadgetId) -> bool {
        let Some(list) = self.map.get_mut(&timer) else {
            return false;
        };
        let len = list.len();
        list.retain(|g| *g != gadget);
        let found = list.len() != len;
        if list.is_empty() {
            self.map.remove(&timer);
        }
        found
    }

    /// Cancel all subscriptions held by any gadget matching `f`
    ///
    /// Returns the number of subscriptions cancelled.
    pub fn cancel_where(&mut self, mut f: impl FnMut(GadgetId) -> bool) -> usize {
        let mut n = 0;
        self.map.retain(|_, list| {
            let len = list.len();
            list.retain(|g| !f(*g));
            n += len - list.len();
            !list.is_empty()
        });
        n
    }

    /// Cancel all subscriptions held by `gadget`
    pub fn cancel_owner(&mut self, gadget: GadgetId) -> usize {
        self.cancel_where(|g| g == gadget)
    }

    /// Subscribers to `timer`, in subscription order
    pub fn subscribers(&self, timer: TimerId) -> &[GadgetId] {
        self.map.get(&timer).map(|l| l.as_slice()).unwrap_or(&[])
    }

    /// True if `gadget` is subscribed to `timer`
    pub fn is_subscribed(&self, timer: TimerId, gadget: GadgetId) -> bool {
        self.subscribers(timer).contains(&gadget)
    }

    /// Total number of subscriptions
    pub fn len(&self) -> usize {
        self.map.values().map(|l| l.len()).sum()
    }

    /// True if there are no subscriptions
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use slotmap::KeyData;

    fn id(n: u64) -> GadgetId {
        GadgetId::from(KeyData::from_ffi(n))
    }

    #[test]
    fn subscribe_and_cancel() {
        let mut timers = Timers::default();
        let t = TimerId(7);
        timers.subscribe(t, id(1));
        timers.subscribe(t, id(2));
        timers.subscribe(t, id(1));
        assert_eq!(timers.subscribers(t), &[id(1), id(2)]);
        assert_eq!(timers.len(), 2);

        assert!(timers.cancel(t, id(1)));
        assert!(!timers.cancel(t, id(1)));
        assert!(timers.cancel(t, id(2)));
        assert!(timers.is_empty());
        assert!(timers.subscribers(t).is_empty());
    }

    #[test]
    fn cancel_owner_spans_timers() {
        let mut timers = Timers::default();
        timers.subscribe(TimerId(1), id(1));
        timers.subscribe(TimerId(2), id(1));
        timers.subscribe(TimerId(2), id(3));
        assert_eq!(timers.cancel_owner(id(1)), 2);
        assert_eq!(timers.len(), 1);
        assert!(timers.is_subscribed(TimerId(2), id(3)));
    }
}
