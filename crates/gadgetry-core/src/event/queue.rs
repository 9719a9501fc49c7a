// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Event queue
//!
//! A bounded multi-producer, single-consumer FIFO. Producers (usually the
//! [`Input`](super::Input) translator, possibly on a capture thread) hold a
//! [`Sender`]; the consumer (the [`Router`](crate::Router)) calls
//! [`Queue::drain`] once per pump cycle.

use super::{Event, Queued};
use std::collections::VecDeque;
use std::collections::vec_deque;
use std::iter::FusedIterator;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// Behaviour when enqueueing to a full queue
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OverflowPolicy {
    /// Discard the oldest buffered event and count it
    #[default]
    DropOldest,
    /// Suspend the producer until the consumer drains
    ///
    /// Only suitable when producers run on a different thread from the
    /// consumer: a consumer-thread producer would wait forever.
    Block,
}

/// Error from [`Sender::try_enqueue`]
#[derive(Error, Debug)]
pub enum TrySendError {
    /// The queue is full and uses [`OverflowPolicy::Block`]
    #[error("event queue is full")]
    Full(Event),
}

#[derive(Debug, Default)]
struct State {
    buf: VecDeque<Queued>,
    next_seq: u64,
    dropped: u64,
    coalesced: u64,
}

impl State {
    fn push(&mut self, event: Event) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.buf.push_back(Queued { seq, event });
        seq
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<State>,
    space: Condvar,
    capacity: usize,
    policy: OverflowPolicy,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, State> {
        // State is consistent after every statement; a panicking producer
        // cannot leave it half-updated.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(&self, event: Event, coalesce: bool) -> u64 {
        match self.push(event, coalesce, true) {
            Ok(seq) => seq,
            Err(_) => unreachable!("blocking push never fails"),
        }
    }

    // Push; if `!wait` and the queue is full under `Block`, return the event
    fn push(&self, event: Event, coalesce: bool, wait: bool) -> Result<u64, Event> {
        let mut state = self.lock();

        if coalesce && event.is_pointer_move() {
            if let Some(last) = state.buf.back()
                && let (Event::Pointer(prev), Event::Pointer(next)) = (&last.event, &event)
                && last.event.is_pointer_move()
                && prev.buttons == next.buttons
            {
                state.buf.pop_back();
                state.coalesced += 1;
                return Ok(state.push(event));
            }
        }

        while state.buf.len() >= self.capacity {
            match self.policy {
                OverflowPolicy::DropOldest => {
                    if let Some(old) = state.buf.pop_front() {
                        state.dropped += 1;
                        log::trace!(target: "gadgetry_core::event", "queue full: dropped #{}", old.seq);
                    }
                }
                OverflowPolicy::Block if !wait => return Err(event),
                OverflowPolicy::Block => {
                    state = self
                        .space
                        .wait(state)
                        .unwrap_or_else(PoisonError::into_inner);
                }
            }
        }

        Ok(state.push(event))
    }
}

/// A bounded FIFO of pending events
///
/// Events are assigned a sequence number on acceptance and are delivered by
/// [`Self::drain`] in that order, each exactly once. When full, the
/// configured [`OverflowPolicy`] applies; the queue never holds more than
/// its capacity.
#[derive(Debug)]
pub struct Queue {
    shared: Arc<Shared>,
}

impl Queue {
    /// Construct with the given capacity and overflow policy
    ///
    /// A capacity of zero is raised to one.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        if capacity == 0 {
            log::warn!(target: "gadgetry_core::event", "Queue::new: capacity 0 raised to 1");
        }
        let capacity = capacity.max(1);
        Queue {
            shared: Arc::new(Shared {
                state: Mutex::new(State {
                    buf: VecDeque::with_capacity(capacity.min(1024)),
                    ..Default::default()
                }),
                space: Condvar::new(),
                capacity,
                policy,
            }),
        }
    }

    /// Construct from configuration
    pub fn from_config(config: &crate::config::Config) -> Self {
        Queue::new(config.queue_capacity, config.overflow)
    }

    /// Get a producer handle
    ///
    /// Handles may be cloned and sent to other threads.
    pub fn sender(&self) -> Sender {
        Sender {
            shared: self.shared.clone(),
        }
    }

    /// Append an event; see [`Sender::enqueue`]
    #[inline]
    pub fn enqueue(&self, event: Event) -> u64 {
        self.shared.enqueue(event, false)
    }

    /// Remove and return all buffered events, oldest first
    ///
    /// The queue is emptied in a single critical section: events enqueued
    /// concurrently either appear in this drain or remain for the next one.
    /// Blocked producers are woken.
    pub fn drain(&self) -> Drain {
        let buf = std::mem::take(&mut self.shared.lock().buf);
        self.shared.space.notify_all();
        Drain {
            iter: buf.into_iter(),
        }
    }

    /// Number of buffered events
    pub fn len(&self) -> usize {
        self.shared.lock().buf.len()
    }

    /// True if no events are buffered
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of buffered events
    #[inline]
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Overflow policy
    #[inline]
    pub fn policy(&self) -> OverflowPolicy {
        self.shared.policy
    }

    /// Total number of events discarded due to overflow
    pub fn dropped(&self) -> u64 {
        self.shared.lock().dropped
    }

    /// Total number of pointer moves replaced by a later move
    pub fn coalesced(&self) -> u64 {
        self.shared.lock().coalesced
    }
}

/// Producer handle to a [`Queue`]
#[derive(Clone, Debug)]
pub struct Sender {
    shared: Arc<Shared>,
}

impl Sender {
    /// Append an event at the tail, returning its sequence number
    ///
    /// Under [`OverflowPolicy::DropOldest`] this never blocks; under
    /// [`OverflowPolicy::Block`] this waits until the consumer drains.
    #[inline]
    pub fn enqueue(&self, event: Event) -> u64 {
        self.shared.enqueue(event, false)
    }

    /// Append an event, replacing a trailing pointer move
    ///
    /// If `event` is a pointer move and the newest buffered event is a pointer
    /// move with the same buttons held, that older move is discarded (it was
    /// never observable) and `event` is appended in its place.
    #[inline]
    pub fn enqueue_coalescing(&self, event: Event) -> u64 {
        self.shared.enqueue(event, true)
    }

    /// Append an event without waiting
    ///
    /// Fails only when the queue is full under [`OverflowPolicy::Block`].
    pub fn try_enqueue(&self, event: Event) -> Result<u64, TrySendError> {
        self.shared
            .push(event, false, false)
            .map_err(TrySendError::Full)
    }
}

/// Events removed by [`Queue::drain`]
///
/// A finite, one-shot iterator in FIFO order.
#[derive(Debug)]
pub struct Drain {
    iter: vec_deque::IntoIter<Queued>,
}

impl Iterator for Drain {
    type Item = Queued;

    #[inline]
    fn next(&mut self) -> Option<Queued> {
        self.iter.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

impl ExactSizeIterator for Drain {}
impl FusedIterator for Drain {}
