// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Diagnostics
//!
//! Nothing the router encounters at run-time is fatal. Anomalies are counted,
//! logged and optionally reported to a user-supplied hook.

use crate::gadget::GadgetId;
use crate::page::PageId;
use thiserror::Error;

/// A recoverable anomaly
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Fault {
    /// Events were discarded by a full queue
    #[error("event queue overflow: {count} events dropped")]
    QueueOverflow { count: u64 },
    /// A page stack operation was rejected
    #[error("invalid page transition: {0}")]
    InvalidTransition(&'static str),
    /// The focus holder was removed
    #[error("focused gadget {gadget:?} was removed")]
    DanglingFocus { gadget: GadgetId },
    /// No recipient accepted the event
    #[error("event #{seq} was not handled")]
    UnroutableEvent { seq: u64 },
    /// The event targeted a page which is no longer active
    #[error("event #{seq} targets inactive page {page:?}")]
    StaleTarget { seq: u64, page: PageId },
}

/// Fault hook
pub type FaultHandler = Box<dyn FnMut(&Fault)>;

/// Router counters
///
/// Counters only increase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// Events dropped by the queue
    pub overflow_dropped: u64,
    /// Rejected page transitions
    pub invalid_transitions: u64,
    /// Focus holders removed while focused
    pub dangling_focus: u64,
    /// Events nobody handled
    pub unroutable: u64,
    /// Events discarded since their target page was inactive
    pub stale_discarded: u64,
    /// Calls to [`Graph::request_redraw`](crate::Graph::request_redraw)
    pub redraw_requests: u64,
    /// Events drained and routed
    pub routed: u64,
}

#[derive(Default)]
pub(crate) struct Reporter {
    pub diagnostics: Diagnostics,
    pub handler: Option<FaultHandler>,
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("diagnostics", &self.diagnostics)
            .field("handler", &self.handler.as_ref().map(|_| ".."))
            .finish()
    }
}

impl Reporter {
    pub fn report(&mut self, fault: Fault) {
        let d = &mut self.diagnostics;
        match &fault {
            Fault::QueueOverflow { count } => {
                d.overflow_dropped += count;
                log::warn!(target: "gadgetry_core::diag", "{fault}");
            }
            Fault::InvalidTransition(_) => {
                d.invalid_transitions += 1;
                log::warn!(target: "gadgetry_core::diag", "{fault}");
            }
            Fault::DanglingFocus { .. } => {
                d.dangling_focus += 1;
                log::debug!(target: "gadgetry_core::diag", "{fault}");
            }
            Fault::UnroutableEvent { .. } => {
                d.unroutable += 1;
                log::trace!(target: "gadgetry_core::diag", "{fault}");
            }
            Fault::StaleTarget { .. } => {
                d.stale_discarded += 1;
                log::debug!(target: "gadgetry_core::diag", "{fault}");
            }
        }
        if let Some(handler) = self.handler.as_mut() {
            handler(&fault);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn counters_and_hook() {
        let seen = Rc::new(RefCell::new(vec![]));
        let mut reporter = Reporter::default();
        let s2 = seen.clone();
        reporter.handler = Some(Box::new(move |f| s2.borrow_mut().push(f.clone())));

        reporter.report(Fault::QueueOverflow { count: 3 });
        reporter.report(Fault::QueueOverflow { count: 2 });
        reporter.report(Fault::InvalidTransition("pop of base page"));
        reporter.report(Fault::UnroutableEvent { seq: 9 });

        let d = reporter.diagnostics;
        assert_eq!(d.overflow_dropped, 5);
        assert_eq!(d.invalid_transitions, 1);
        assert_eq!(d.unroutable, 1);
        assert_eq!(d.dangling_focus, 0);
        assert_eq!(seen.borrow().len(), 4);
        assert_eq!(
            seen.borrow()[2].to_string(),
            "invalid page transition: pop of base page"
        );
    }
}
