// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Gadgetry core
//!
//! Event routing and the gadget tree: a bounded [`Queue`](event::Queue) of
//! normalised input, the [`Router`] delivering it to a tree of [`Gadget`]s,
//! and a stack of [`Page`]s with enter/leave lifecycle.
//!
//! The core never draws and never talks to the OS directly. Platform shims
//! implement [`event::Platform`]; renderers implement [`Graph`].

#![cfg_attr(docsrs, feature(doc_cfg))]

pub extern crate easy_cast as cast;

mod action;
mod diag;
mod gadget;
mod page;
mod render;
mod router;
mod stack;
mod timer;
mod tree;

pub mod config;
pub mod event;
pub mod geom;

pub use action::Action;
pub use diag::{Diagnostics, Fault, FaultHandler};
pub use gadget::{Gadget, GadgetFlags, GadgetId};
pub use page::{BlankPage, BuildCx, Page, PageId, PageState};
pub use render::{GlyphMetrics, Graph, NullGraph, RecordingGraph, ShapeId};
pub use router::Router;
pub use stack::{ActivePages, PageStack};
pub use timer::Timers;
pub use tree::{Path, Tree};
