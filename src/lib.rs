//! ailocator: turn scanned permits into hosted map features.
//!
//! Files are dropped in through [`intake`], read by a vision model in [`ai`],
//! geocoded and published through [`arcgis`], buffered in [`geometry`] and
//! driven one at a time by [`workflow`].

pub mod ai;
pub mod ambient;
pub mod arcgis;
pub mod config;
pub mod error;
pub mod geometry;
pub mod intake;
pub mod workflow;

pub use config::Config;
pub use error::{Error, Result};
