//! swipecard - swipe-to-reveal row actions for Linux touchscreens.
//!
//! The gesture engine ([`card`], [`list`] and the components they compose)
//! is pure and clock-free.  [`touch`] translates multi-touch events into
//! engine input, [`manager`] wires real devices to it and [`replay`] drives
//! it from a script.

pub mod action;
pub mod animation;
pub mod card;
pub mod classifier;
pub mod config;
pub mod dispatch;
pub mod geometry;
pub mod haptics;
pub mod list;
pub mod manager;
pub mod offset;
pub mod projector;
pub mod replay;
pub mod reveal;
pub mod touch;
