//! The panel surface: the box the panel lives in, and the animations on it.
//!
//! The controller is the only writer of this geometry. Animations are
//! requested as [`Tween`]s and the host reports their end with
//! [`crate::PanelEvent::TweenCompleted`].

use std::time::Duration;

use crate::geometry::Rect;

/// Fully opaque panel
pub const OPAQUE: u8 = 255;
/// Fully transparent panel
pub const TRANSPARENT: u8 = 0;

/// Identifies one animation started on the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TweenId(pub u64);

/// Animated property of the panel box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TweenProperty {
    Y,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    OutQuad,
}

impl Easing {
    /// Map linear progress in `[0, 1]` to eased progress.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0., 1.);
        match self {
            Easing::Linear => t,
            Easing::OutQuad => t * (2. - t),
        }
    }
}

/// An animation request for the panel box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub property: TweenProperty,
    pub target: f64,
    pub duration: Duration,
    pub easing: Easing,
}

impl Tween {
    pub fn y(target: f64, duration: Duration) -> Self {
        Self {
            property: TweenProperty::Y,
            target,
            duration,
            easing: Easing::OutQuad,
        }
    }

    /// Value of the property after `elapsed`, starting from `from`.
    pub fn value_at(&self, from: f64, elapsed: Duration) -> f64 {
        if self.duration.is_zero() {
            return self.target;
        }
        let progress = elapsed.as_secs_f64() / self.duration.as_secs_f64();
        from + (self.target - from) * self.easing.apply(progress)
    }
}

/// Host side of the panel: its outer box and the panel actor inside it
pub trait PanelSurface {
    /// Current geometry of the panel box.
    fn geometry(&self) -> Rect;
    /// Natural height of the panel actor, which may change with settings
    /// such as icon size.
    fn panel_height(&self) -> f64;
    fn opacity(&self) -> u8;

    fn set_y(&mut self, y: f64);
    fn set_height(&mut self, height: f64);
    fn set_opacity(&mut self, opacity: u8);

    fn add_tween(&mut self, tween: Tween) -> TweenId;
    /// Cancel every animation on `property`. Cancelled tweens never report
    /// completion.
    fn remove_tweens(&mut self, property: TweenProperty);
}
