//! Fillbar Core Library
//!
//! A textured two-layer progress bar for 2D scenes.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                    widgets/                         │
//! │         ProgressBar, SharedProgressBar              │
//! │            (the user-facing widget)                 │
//! ├─────────────────┬────────────────┬──────────────────┤
//! │      node       │     atlas      │    scheduler     │
//! │   SpriteNode    │  TextureAtlas  │  Tokio / Manual  │
//! │ (scene element) │ (named PNGs)   │ (injected timer) │
//! ├─────────────────┴────────────────┴──────────────────┤
//! │                    surface                          │
//! │           tiny-skia RGBA pixel buffer               │
//! │              (drawing primitives)                   │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! The widget owns a background track sprite and a foreground fill sprite
//! whose visible width follows a clamped progress fraction. Timer callbacks
//! arrive through the [`Scheduler`] trait injected at construction, so the
//! widget needs no runtime of its own and tests can drive simulated time
//! with [`ManualScheduler`].

pub mod atlas;
pub mod config;
pub mod node;
pub mod scheduler;
pub mod surface;
pub mod widgets;

// Re-export commonly used types
pub use atlas::{AtlasError, Texture, TextureAtlas, TextureKey};
pub use config::{BarConfig, ConfigError};
pub use node::{Drawable, SpriteNode};
pub use scheduler::{ManualScheduler, Scheduler, TimerError, TimerHandle, TokioScheduler};
pub use surface::Surface;
pub use widgets::{ProgressBar, SharedProgressBar};

// Re-export tiny_skia Color for external use
pub use tiny_skia::Color;
