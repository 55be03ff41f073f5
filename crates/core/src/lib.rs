//! Perception and decision primitives. Keep this crate free of IO, threads and clocks.

pub mod action;
pub mod config;
pub mod events;
pub mod geometry;
pub mod locator;
pub mod navigation;
pub mod observation;
pub mod rng;
pub mod schedule;
pub mod skill;
pub mod snapshot;
pub mod stats;

pub use action::*;
pub use config::*;
pub use events::*;
pub use geometry::*;
pub use locator::*;
pub use navigation::*;
pub use observation::*;
pub use rng::*;
pub use schedule::*;
pub use skill::*;
pub use snapshot::*;
pub use stats::*;
