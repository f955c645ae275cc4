//! Pressure barrier along the top edge of the primary monitor.
//!
//! Pushing the pointer against the barrier hard enough within the timeout
//! makes the host report [`crate::PanelEvent::BarrierTriggered`]. At most one
//! barrier is alive; changing its parameters destroys it and builds a new one.

use std::time::Duration;

use bitflags::bitflags;

use crate::error::PanelHideError;
use crate::geometry::Monitor;

bitflags! {
    /// Shell modes in which an input action is allowed to fire
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ActionMode: u32 {
        const NORMAL = 1 << 0;
        const OVERVIEW = 1 << 1;
        const LOCK_SCREEN = 1 << 2;
        const UNLOCK_SCREEN = 1 << 3;
        const LOGIN_SCREEN = 1 << 4;
        const SYSTEM_MODAL = 1 << 5;
        const LOOKING_GLASS = 1 << 6;
        const POPUP = 1 << 7;
    }
}

bitflags! {
    /// Directions in which the pointer is held back by the barrier
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BarrierDirections: u32 {
        const POSITIVE_X = 1 << 0;
        const POSITIVE_Y = 1 << 1;
        const NEGATIVE_X = 1 << 2;
        const NEGATIVE_Y = 1 << 3;
    }
}

/// Line segment the barrier occupies
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarrierEdge {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub directions: BarrierDirections,
}

impl BarrierEdge {
    /// Full width of the monitor's top edge, blocking downward motion.
    pub fn top_of(monitor: &Monitor) -> Self {
        let geometry = monitor.geometry;
        Self {
            x1: geometry.x,
            y1: geometry.y,
            x2: geometry.x + geometry.width,
            y2: geometry.y,
            directions: BarrierDirections::POSITIVE_Y,
        }
    }
}

/// A pointer hit on the barrier, as seen by the event filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BarrierEvent {
    /// The pointer is grabbed by some other surface.
    pub grabbed: bool,
    /// Number of modal dialogs currently open.
    pub modal_count: u32,
}

/// Returns true when the hit must not count towards the pressure.
pub type EventFilter = fn(&BarrierEvent) -> bool;

/// Ignore hits the pointer makes while grabbed outside of a modal dialog.
pub fn ignore_grabbed_outside_modal(event: &BarrierEvent) -> bool {
    event.grabbed && event.modal_count == 0
}

#[derive(Debug, Clone, Copy)]
pub struct BarrierConfig {
    pub threshold: i32,
    pub timeout: Duration,
    pub action_mode: ActionMode,
    pub edge: BarrierEdge,
    pub filter: EventFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BarrierId(pub u64);

/// A live barrier and its pressure listener
pub trait PressureBarrier {
    fn id(&self) -> BarrierId;
    /// Release the barrier and stop listening for pressure.
    fn destroy(&mut self);
}

/// Host facility creating barriers
pub trait BarrierFactory {
    fn create(&mut self, config: BarrierConfig) -> Result<Box<dyn PressureBarrier>, PanelHideError>;
}

/// The single barrier owned by the controller
#[derive(Default)]
pub(crate) struct BarrierBinding {
    live: Option<Box<dyn PressureBarrier>>,
}

impl BarrierBinding {
    pub(crate) fn is_live(&self) -> bool {
        self.live.is_some()
    }

    pub(crate) fn owns(&self, id: BarrierId) -> bool {
        self.live.as_ref().is_some_and(|barrier| barrier.id() == id)
    }

    /// Destroy the current barrier, if any, then build a new one.
    pub(crate) fn recreate(
        &mut self,
        factory: &mut dyn BarrierFactory,
        config: BarrierConfig,
    ) -> Result<BarrierId, PanelHideError> {
        self.release();
        let barrier = factory.create(config)?;
        let id = barrier.id();
        log::info!(
            "pressure barrier {:?} armed, threshold {}px, timeout {:?}",
            id,
            config.threshold,
            config.timeout
        );
        self.live = Some(barrier);
        Ok(id)
    }

    pub(crate) fn release(&mut self) {
        if let Some(mut barrier) = self.live.take() {
            log::debug!("pressure barrier {:?} released", barrier.id());
            barrier.destroy();
        }
    }
}
