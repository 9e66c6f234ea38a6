//! Frame-driven scrolling for the prompter
//!
//! # Layers
//!
//! ## L4 Atomic Layer
//! - `timing` - Progress calculation and the fire-once timer
//! - `config` - Scroll configuration and the bounds derived from it
//!
//! ## L3 Molecular Layer
//! - `animation` - Scroll position controller combining atoms
//!
//! # Pacing
//!
//! By default every `tick()` adds `speed / 10` regardless of how much time
//! passed, so the perceived speed follows the host's refresh rate. Setting
//! `pacing = "wall_clock"` scales the step by elapsed time normalized to
//! `reference_fps` instead.
//!
//! # Usage
//!
//! ```
//! use std::time::Instant;
//! use prompter_core::scroll::{ScrollAnimator, Viewport};
//!
//! let mut animator = ScrollAnimator::with_defaults();
//! animator.start();
//!
//! let viewport = Viewport { container_height: 600.0, text_height: 4000.0 };
//! let offset = animator.tick(viewport, Instant::now());
//! assert_eq!(offset, 1.0);
//! ```

// L4 Atomic Layer
pub mod config;
pub mod timing;

// L3 Molecular Layer
pub mod animation;

// Re-exports for convenient access
pub use animation::{ScrollAnimator, Viewport};
pub use config::{Pacing, ScrollConfig, ScrollConfigExt};
pub use timing::FireOnceTimer;
