// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Top-level configuration struct

use crate::event::{MoveCoalescing, OverflowPolicy};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A message which may be used to update [`Config`]
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigMsg {
    TabNavigation(bool),
    MaxRequestRounds(u32),
    /// Reset all router-level values to default
    ///
    /// Queue and input settings are only read on construction and are not
    /// affected.
    ResetToDefault,
}

/// Base configuration
///
/// This is serializable (using `feature = "serde"`) with the following fields:
///
/// > `queue_capacity`: `usize` \
/// > `overflow`: [`OverflowPolicy`] \
/// > `move_coalescing`: [`MoveCoalescing`] \
/// > `tab_navigation`: `bool` \
/// > `max_request_rounds`: `u32`
///
/// Missing fields take their default value.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Maximum number of buffered events
    #[cfg_attr(feature = "serde", serde(default = "defaults::queue_capacity"))]
    pub queue_capacity: usize,

    /// Behaviour of a full queue
    #[cfg_attr(feature = "serde", serde(default))]
    pub overflow: OverflowPolicy,

    /// Pointer-move coalescing in [`Input`](crate::event::Input)
    #[cfg_attr(feature = "serde", serde(default))]
    pub move_coalescing: MoveCoalescing,

    /// Move focus with Tab / Shift+Tab when no handler consumes the key
    #[cfg_attr(feature = "serde", serde(default = "defaults::tab_navigation"))]
    pub tab_navigation: bool,

    /// Bound on rounds of deferred handler requests applied per event
    ///
    /// Each round may trigger further handler calls and thus further
    /// requests. Requests remaining after this many rounds are discarded.
    #[cfg_attr(feature = "serde", serde(default = "defaults::max_request_rounds"))]
    pub max_request_rounds: u32,

    #[cfg_attr(feature = "serde", serde(skip))]
    is_dirty: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            queue_capacity: defaults::queue_capacity(),
            overflow: OverflowPolicy::default(),
            move_coalescing: MoveCoalescing::default(),
            tab_navigation: defaults::tab_navigation(),
            max_request_rounds: defaults::max_request_rounds(),
            is_dirty: false,
        }
    }
}

impl Config {
    /// Has the config been changed since construction?
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    /// Apply a change
    ///
    /// Returns true if any value changed.
    pub fn change_config(&mut self, msg: ConfigMsg) -> bool {
        let old = self.clone();
        match msg {
            ConfigMsg::TabNavigation(v) => self.tab_navigation = v,
            ConfigMsg::MaxRequestRounds(v) => self.max_request_rounds = v.max(1),
            ConfigMsg::ResetToDefault => {
                self.tab_navigation = defaults::tab_navigation();
                self.max_request_rounds = defaults::max_request_rounds();
            }
        }
        let changed = *self != old;
        self.is_dirty |= changed;
        changed
    }
}

mod defaults {
    pub fn queue_capacity() -> usize {
        256
    }
    pub fn tab_navigation() -> bool {
        true
    }
    pub fn max_request_rounds() -> u32 {
        32
    }
}
