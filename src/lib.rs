// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Gadgetry toolkit
//!
//! This, the main Gadgetry crate, is merely a wrapper over other crates:
//!
//! -   [`gadgetry_core`] is the core: event queue and input translation,
//!     the router, the gadget tree and the page stack
//! -   [`gadgetry_widgets`] provides stock gadgets
//!
//! All items from [`gadgetry_core`] are directly re-exported from this crate
//! (e.g. [`gadgetry::geom::Rect`](crate::geom::Rect)); the stock gadgets are
//! re-exported as the [`widgets`] sub-module.
//!
//! The [easy-cast](https://docs.rs/easy-cast/0.5/easy_cast) library is
//! re-exported as `gadgetry::cast`.

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod prelude;

pub use gadgetry_core::*;

pub extern crate gadgetry_widgets as widgets;
