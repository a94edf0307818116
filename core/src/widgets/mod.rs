//! Reusable visual widgets
//!
//! Each widget owns its sprite layers and draws itself into a
//! [`Surface`](crate::surface::Surface) via the
//! [`Drawable`](crate::node::Drawable) trait.

mod progress_bar;
mod shared;


pub use progress_bar::ProgressBar;
pub use shared::SharedProgressBar;
