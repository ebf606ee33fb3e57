//! Adapter utilities for the `listwindow` crate.
//!
//! The `listwindow` crate is UI-agnostic and exposes pure state transitions plus a rendering
//! manager. This crate wires them into the event-driven shape most UI layers need:
//!
//! - Frame coalescing (any number of scroll/resize events between frames yield one recompute)
//! - Single-flight paging with cursor and jump-to-page loads
//! - Stale-result rejection after a refresh
//!
//! This crate performs no I/O and holds no UI objects; the caller runs fetches and paints rows.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod frame;
mod load;

#[cfg(test)]
mod tests;

pub use controller::{Frame, ListController};
pub use frame::FrameScheduler;
pub use load::{LoadRequest, LoadTarget};
