//! State of the reveal-panel shortcut.

use std::time::Duration;

use crate::settings::{MAX_SETTING_DURATION, duration_from_secs};
use crate::timer::TimerToken;

/// Settings key holding the shortcut accelerator.
pub const SHORTCUT_KEYBIND: &str = "shortcut-keybind";

/// Delays at or below this many seconds keep the panel revealed until the
/// shortcut is pressed again.
pub const MIN_SHORTCUT_DELAY: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShortcutState {
    #[default]
    Idle,
    /// Revealed; the panel may hide again once the timer fires.
    Pending(TimerToken),
    /// Revealed with no dwell timer; only another press hides the panel.
    Held,
}

impl ShortcutState {
    /// Whether a press in this state hides the panel instead of revealing it.
    pub fn toggles_off(&self, delay: f64, toggles: bool) -> bool {
        match self {
            ShortcutState::Idle => false,
            ShortcutState::Held => true,
            ShortcutState::Pending(_) => toggles || delay < MIN_SHORTCUT_DELAY,
        }
    }

    pub fn timer(&self) -> Option<TimerToken> {
        match *self {
            ShortcutState::Pending(token) => Some(token),
            _ => None,
        }
    }
}

/// Whether `delay` seconds uses a dwell timer at all.
pub fn uses_dwell_timer(delay: f64) -> bool {
    delay > MIN_SHORTCUT_DELAY
}

/// Duration of the reveal animation for a dwell of `delay` seconds.
pub fn reveal_duration(delay: f64) -> Duration {
    duration_from_secs(delay / 5.)
}

/// Time the panel stays revealed: `delay * 1200` milliseconds.
pub fn dwell_timeout(delay: f64) -> Duration {
    Duration::from_millis((delay * 1200.).round() as u64).min(MAX_SETTING_DURATION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dwell_is_scaled_from_delay() {
        assert!(!uses_dwell_timer(0.03));
        assert!(!uses_dwell_timer(MIN_SHORTCUT_DELAY));
        assert!(uses_dwell_timer(0.5));
        assert_eq!(reveal_duration(0.5), Duration::from_millis(100));
        assert_eq!(dwell_timeout(0.5), Duration::from_millis(600));
        assert_eq!(dwell_timeout(3.0), Duration::from_millis(3600));
    }

    #[test]
    fn huge_delays_saturate() {
        assert!(uses_dwell_timer(f64::INFINITY));
        assert_eq!(reveal_duration(f64::INFINITY), MAX_SETTING_DURATION);
        assert_eq!(reveal_duration(1e20), MAX_SETTING_DURATION);
        assert_eq!(dwell_timeout(1e20), MAX_SETTING_DURATION);
        assert_eq!(dwell_timeout(f64::INFINITY), MAX_SETTING_DURATION);
        assert!(!uses_dwell_timer(f64::NAN));
    }

    #[test]
    fn only_armed_states_toggle_off() {
        let pending = ShortcutState::Pending(TimerToken(4));
        assert!(!ShortcutState::Idle.toggles_off(0.5, true));
        assert!(ShortcutState::Held.toggles_off(0.5, false));
        assert!(pending.toggles_off(0.5, true));
        assert!(!pending.toggles_off(0.5, false));
        assert!(pending.toggles_off(0.03, false));
        assert_eq!(pending.timer(), Some(TimerToken(4)));
        assert_eq!(ShortcutState::Held.timer(), None);
    }
}
