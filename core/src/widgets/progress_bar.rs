//! Textured progress bar widget

use std::sync::Arc;
use std::time::Duration;

use crate::atlas::{TextureAtlas, TextureKey};
use crate::config::BarConfig;
use crate::node::{Drawable, SpriteNode};
use crate::scheduler::{Scheduler, TimerError, TimerHandle};
use crate::surface::Surface;

/// A two-layer textured progress bar.
///
/// The widget owns a static background `track` sprite and a foreground
/// `fill` sprite whose visible width follows the progress fraction,
/// always clamped to `[0, 1]`. Progress mutation never fails; anomalous
/// input (negative values, zero totals, NaN) is absorbed.
///
/// An optional repeating timer animates progress without caller polling.
/// At most one timer is active per widget; starting a new one replaces
/// the old, and dropping the widget cancels it.
pub struct ProgressBar {
    texture_reference: String,
    fraction: f32,
    track: SpriteNode,
    fill: SpriteNode,
    timer: Option<Box<dyn TimerHandle>>,
    scheduler: Arc<dyn Scheduler>,
}

impl ProgressBar {
    /// Build with the built-in default textures
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self::from_config(scheduler, None, &BarConfig::default())
    }

    /// Build from an atlas. Any texture name the atlas lacks falls back to
    /// the built-in default; construction always succeeds.
    pub fn with_atlas(scheduler: Arc<dyn Scheduler>, atlas: &TextureAtlas) -> Self {
        Self::from_config(scheduler, Some(atlas), &BarConfig::default())
    }

    /// Build from a config, with or without an atlas
    pub fn from_config(
        scheduler: Arc<dyn Scheduler>,
        atlas: Option<&TextureAtlas>,
        config: &BarConfig,
    ) -> Self {
        let resolve = |key: TextureKey| match atlas {
            Some(atlas) => atlas.resolve(key),
            None => key.default_texture(),
        };

        let track = SpriteNode::new(resolve(TextureKey::Track), config.width, config.height);
        let mut fill = SpriteNode::new(resolve(TextureKey::Fill), config.width, config.height);
        fill.set_crop(0.0);

        Self {
            texture_reference: String::from("default"),
            fraction: 0.0,
            track,
            fill,
            timer: None,
            scheduler,
        }
    }

    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.set_size(width, height);
        self
    }

    pub fn with_position(mut self, x: f32, y: f32) -> Self {
        self.set_position(x, y);
        self
    }

    pub fn with_texture_reference(mut self, name: impl Into<String>) -> Self {
        self.texture_reference = name.into();
        self
    }

    /// Move both layers to `(x, y)`
    pub fn set_position(&mut self, x: f32, y: f32) {
        self.track.set_position(x, y);
        self.fill.set_position(x, y);
    }

    pub fn position(&self) -> (f32, f32) {
        self.track.position()
    }

    /// Resize both layers
    pub fn set_size(&mut self, width: f32, height: f32) {
        self.track.set_size(width, height);
        self.fill.set_size(width, height);
    }

    pub fn size(&self) -> (f32, f32) {
        self.track.size()
    }

    /// Name of the texture set this widget draws from. Informational only;
    /// changing it does not retexture or redraw anything.
    pub fn texture_reference(&self) -> &str {
        &self.texture_reference
    }

    pub fn set_texture_reference(&mut self, name: impl Into<String>) {
        self.texture_reference = name.into();
    }

    /// Background track sprite
    pub fn track(&self) -> &SpriteNode {
        &self.track
    }

    /// Foreground fill sprite
    pub fn fill(&self) -> &SpriteNode {
        &self.fill
    }

    /// Current progress in `[0, 1]`
    pub fn fraction(&self) -> f32 {
        self.fraction
    }

    /// Set progress as `value` out of `total`.
    ///
    /// A zero (or negative, or non-finite) total leaves the bar empty
    /// instead of dividing.
    pub fn set_progress(&mut self, value: f32, total: f32) {
        if total <= 0.0 || !total.is_finite() {
            self.set_fraction(0.0);
        } else {
            self.set_fraction(value / total);
        }
    }

    /// Set progress directly, clamped to `[0, 1]`. NaN empties the bar.
    pub fn set_fraction(&mut self, fraction: f32) {
        self.fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.fill.set_crop(self.fraction);
    }

    /// Empty the bar
    pub fn reset(&mut self) {
        self.set_fraction(0.0);
    }

    /// Begin invoking `on_tick` once per `interval` on the scheduler this
    /// widget was constructed with, replacing any running timer.
    ///
    /// A zero interval is rejected and leaves any running timer untouched.
    pub fn start_auto_progress<F>(&mut self, interval: Duration, on_tick: F) -> Result<(), TimerError>
    where
        F: FnMut() + Send + 'static,
    {
        if interval.is_zero() {
            return Err(TimerError::ZeroInterval);
        }
        self.stop_auto_progress();
        tracing::debug!(?interval, "starting auto-progress timer");
        self.timer = Some(self.scheduler.schedule_repeating(interval, Box::new(on_tick)));
        Ok(())
    }

    /// Cancel the running timer, if any. Safe to call repeatedly.
    pub fn stop_auto_progress(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
            tracing::debug!("stopped auto-progress timer");
        }
    }

    /// Whether an auto-progress timer is currently running
    pub fn is_animating(&self) -> bool {
        self.timer.as_ref().is_some_and(|timer| timer.is_active())
    }
}

impl Drawable for ProgressBar {
    fn draw(&self, surface: &mut Surface) {
        self.track.draw(surface);
        self.fill.draw(surface);
    }
}

impl Drop for ProgressBar {
    fn drop(&mut self) {
        self.stop_auto_progress();
    }
}
