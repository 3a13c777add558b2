// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! Visualization tools: palettes, skeleton topology, and the interactive viewer.

/// Color definitions and palettes.
pub mod color;

/// Skeleton topology.
pub mod skeleton;

/// Interactive window.
#[cfg(feature = "visualize")]
#[cfg_attr(docsrs, doc(cfg(feature = "visualize")))]
pub mod viewer;

pub use color::Color;
pub use skeleton::SKELETON;

#[cfg(feature = "visualize")]
#[cfg_attr(docsrs, doc(cfg(feature = "visualize")))]
pub use viewer::{Viewer, ViewerAction};
