//! Adapter utilities for the `fibgrid` crate.
//!
//! The `fibgrid` crate is UI-agnostic and focuses on layout, reconciliation and reuse. This
//! crate provides small, framework-neutral helpers commonly needed by adapters:
//!
//! - Tween-based smooth scrolling to an item, driven by the adapter's frame clock
//! - A transition animator that forwards reload transitions to [`fibgrid::View::animate`]
//! - A content-offset shim contract for correcting platform scroll containers
//!
//! This crate is intentionally framework-agnostic (no toolkit bindings).
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod animator;
mod controller;
mod offset_shim;
mod tween;


pub use animator::TransitionAnimator;
pub use controller::GridController;
pub use offset_shim::{ClampingShim, ContentOffsetShim, NoShim, OffsetContext};
pub use tween::{Easing, Tween};
