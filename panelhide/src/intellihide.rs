//! Window overlap detection ("intellihide").
//!
//! The detector watches windows on its own and reports a change through
//! [`crate::PanelEvent::OverlapStatusChanged`]; the controller then reads
//! [`OverlapDetector::overlap_status`].

use crate::geometry::StaticBox;

pub trait OverlapDetector {
    /// Region the detector tests windows against.
    fn update_target_box(&mut self, target: StaticBox);
    fn enable(&mut self);
    fn disable(&mut self);
    /// Only consider the focused window instead of every window.
    fn only_active_window(&mut self, only_active: bool);
    /// Whether a window currently overlaps the target box.
    fn overlap_status(&self) -> bool;
    fn destroy(&mut self);
}
