//! # Config Crate
//!
//! Centralized configuration constants for the FDM joint geometry pipeline.
//! Every fixed dimension of the joint (print angle, axle overlap, bridging
//! limit), every input bound and every solver tolerance is defined here so the
//! geometry crates never carry bare literals.
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::{MIN_RESOLUTION, PRINT_ANGLE};
//!
//! let resolution = 6u32.max(MIN_RESOLUTION);
//! assert_eq!(resolution, 8);
//! assert!((PRINT_ANGLE.tan() - 1.0).abs() < 1e-12);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All constants defined once, used everywhere
//! - **Millimeters and radians**: Lengths are mm, angles are radians
//! - **Printer-driven**: Joint constants encode FDM printing limits

pub mod constants;

#[cfg(test)]
mod tests;
