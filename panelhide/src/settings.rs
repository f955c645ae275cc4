//! Settings consumed by the controller.
//!
//! The controller only reads settings; a change is observed through
//! [`crate::PanelEvent::SettingChanged`]. [`MemorySettings`] is a
//! ready-made store that emits those events on a calloop channel.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;
use std::time::Duration;

use calloop::channel::Sender;

use crate::PanelEvent;
use crate::error::PanelHideError;

/// Every settings key the controller reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    HotCorner,
    MouseSensitive,
    PressureThreshold,
    PressureTimeout,
    EnableIntellihide,
    EnableActiveWindow,
    AnimationTimeOverview,
    AnimationTimeAutohide,
    MouseTriggersOverview,
    ShortcutDelay,
    ShortcutToggles,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Bool,
    Double,
    Int,
}

impl Key {
    pub const ALL: [Key; 11] = [
        Key::HotCorner,
        Key::MouseSensitive,
        Key::PressureThreshold,
        Key::PressureTimeout,
        Key::EnableIntellihide,
        Key::EnableActiveWindow,
        Key::AnimationTimeOverview,
        Key::AnimationTimeAutohide,
        Key::MouseTriggersOverview,
        Key::ShortcutDelay,
        Key::ShortcutToggles,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Key::HotCorner => "hot-corner",
            Key::MouseSensitive => "mouse-sensitive",
            Key::PressureThreshold => "pressure-threshold",
            Key::PressureTimeout => "pressure-timeout",
            Key::EnableIntellihide => "enable-intellihide",
            Key::EnableActiveWindow => "enable-active-window",
            Key::AnimationTimeOverview => "animation-time-overview",
            Key::AnimationTimeAutohide => "animation-time-autohide",
            Key::MouseTriggersOverview => "mouse-triggers-overview",
            Key::ShortcutDelay => "shortcut-delay",
            Key::ShortcutToggles => "shortcut-toggles",
        }
    }

    pub fn kind(self) -> ValueKind {
        match self {
            Key::HotCorner
            | Key::MouseSensitive
            | Key::EnableIntellihide
            | Key::EnableActiveWindow
            | Key::MouseTriggersOverview
            | Key::ShortcutToggles => ValueKind::Bool,
            Key::AnimationTimeOverview | Key::AnimationTimeAutohide | Key::ShortcutDelay => {
                ValueKind::Double
            }
            Key::PressureThreshold | Key::PressureTimeout => ValueKind::Int,
        }
    }

    /// Parse the textual form of a value for this key.
    pub fn parse_value(self, raw: &str) -> Result<SettingValue, PanelHideError> {
        let raw = raw.trim();
        let invalid = || PanelHideError::InvalidSettingValue {
            key: self.as_str(),
            value: raw.to_owned(),
        };
        Ok(match self.kind() {
            ValueKind::Bool => SettingValue::Bool(raw.parse().map_err(|_| invalid())?),
            ValueKind::Double => {
                let value: f64 = raw.parse().map_err(|_| invalid())?;
                if !value.is_finite() {
                    return Err(invalid());
                }
                SettingValue::Double(value)
            }
            ValueKind::Int => SettingValue::Int(raw.parse().map_err(|_| invalid())?),
        })
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Key {
    type Err = PanelHideError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Key::ALL
            .into_iter()
            .find(|key| key.as_str() == s)
            .ok_or_else(|| PanelHideError::UnknownSetting(s.to_owned()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SettingValue {
    Bool(bool),
    Double(f64),
    Int(i32),
}

/// Longest duration a setting can express. Larger values are clamped.
pub const MAX_SETTING_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// `secs` as a duration: negative or NaN reads as zero, anything beyond
/// [`MAX_SETTING_DURATION`] (infinity included) as that maximum.
pub fn duration_from_secs(secs: f64) -> Duration {
    if secs.is_nan() || secs <= 0. {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(secs)
        .map_or(MAX_SETTING_DURATION, |duration| duration.min(MAX_SETTING_DURATION))
}

/// Read side of the settings store
pub trait SettingsStore {
    fn get_bool(&self, key: Key) -> bool;
    fn get_double(&self, key: Key) -> f64;
    fn get_int(&self, key: Key) -> i32;

    /// A duration stored as seconds, see [`duration_from_secs`].
    fn get_seconds(&self, key: Key) -> Duration {
        duration_from_secs(self.get_double(key))
    }

    /// A duration stored as milliseconds. Negative values read as zero.
    fn get_millis(&self, key: Key) -> Duration {
        Duration::from_millis(u64::try_from(self.get_int(key)).unwrap_or(0))
    }
}

/// Snapshot of all settings, with the defaults of the settings schema
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelSettings {
    pub hot_corner: bool,
    pub mouse_sensitive: bool,
    pub pressure_threshold: i32,
    pub pressure_timeout: i32,
    pub enable_intellihide: bool,
    pub enable_active_window: bool,
    pub animation_time_overview: f64,
    pub animation_time_autohide: f64,
    pub mouse_triggers_overview: bool,
    pub shortcut_delay: f64,
    pub shortcut_toggles: bool,
}

impl Default for PanelSettings {
    fn default() -> Self {
        Self {
            hot_corner: false,
            mouse_sensitive: false,
            pressure_threshold: 100,
            pressure_timeout: 1000,
            enable_intellihide: true,
            enable_active_window: true,
            animation_time_overview: 0.4,
            animation_time_autohide: 0.2,
            mouse_triggers_overview: false,
            shortcut_delay: 3.0,
            shortcut_toggles: true,
        }
    }
}

impl PanelSettings {
    pub fn with_hot_corner(mut self, hot_corner: bool) -> Self {
        self.hot_corner = hot_corner;
        self
    }

    pub fn with_mouse_sensitive(mut self, mouse_sensitive: bool) -> Self {
        self.mouse_sensitive = mouse_sensitive;
        self
    }

    pub fn with_pressure(mut self, threshold: i32, timeout_ms: i32) -> Self {
        self.pressure_threshold = threshold;
        self.pressure_timeout = timeout_ms;
        self
    }

    pub fn with_intellihide(mut self, enable: bool, active_window_only: bool) -> Self {
        self.enable_intellihide = enable;
        self.enable_active_window = active_window_only;
        self
    }

    pub fn with_animation_times(mut self, autohide: f64, overview: f64) -> Self {
        self.animation_time_autohide = autohide;
        self.animation_time_overview = overview;
        self
    }

    pub fn with_mouse_triggers_overview(mut self, triggers: bool) -> Self {
        self.mouse_triggers_overview = triggers;
        self
    }

    pub fn with_shortcut(mut self, delay: f64, toggles: bool) -> Self {
        self.shortcut_delay = delay;
        self.shortcut_toggles = toggles;
        self
    }

    pub fn value(&self, key: Key) -> SettingValue {
        match key {
            Key::HotCorner => SettingValue::Bool(self.hot_corner),
            Key::MouseSensitive => SettingValue::Bool(self.mouse_sensitive),
            Key::PressureThreshold => SettingValue::Int(self.pressure_threshold),
            Key::PressureTimeout => SettingValue::Int(self.pressure_timeout),
            Key::EnableIntellihide => SettingValue::Bool(self.enable_intellihide),
            Key::EnableActiveWindow => SettingValue::Bool(self.enable_active_window),
            Key::AnimationTimeOverview => SettingValue::Double(self.animation_time_overview),
            Key::AnimationTimeAutohide => SettingValue::Double(self.animation_time_autohide),
            Key::MouseTriggersOverview => SettingValue::Bool(self.mouse_triggers_overview),
            Key::ShortcutDelay => SettingValue::Double(self.shortcut_delay),
            Key::ShortcutToggles => SettingValue::Bool(self.shortcut_toggles),
        }
    }

    /// Store `value` under `key`. Returns whether anything changed.
    pub fn set(&mut self, key: Key, value: SettingValue) -> Result<bool, PanelHideError> {
        if self.value(key) == value {
            return Ok(false);
        }
        match (key, value) {
            (Key::HotCorner, SettingValue::Bool(v)) => self.hot_corner = v,
            (Key::MouseSensitive, SettingValue::Bool(v)) => self.mouse_sensitive = v,
            (Key::PressureThreshold, SettingValue::Int(v)) => self.pressure_threshold = v,
            (Key::PressureTimeout, SettingValue::Int(v)) => self.pressure_timeout = v,
            (Key::EnableIntellihide, SettingValue::Bool(v)) => self.enable_intellihide = v,
            (Key::EnableActiveWindow, SettingValue::Bool(v)) => self.enable_active_window = v,
            (Key::AnimationTimeOverview, SettingValue::Double(v)) => {
                self.animation_time_overview = v
            }
            (Key::AnimationTimeAutohide, SettingValue::Double(v)) => {
                self.animation_time_autohide = v
            }
            (Key::MouseTriggersOverview, SettingValue::Bool(v)) => {
                self.mouse_triggers_overview = v
            }
            (Key::ShortcutDelay, SettingValue::Double(v)) => self.shortcut_delay = v,
            (Key::ShortcutToggles, SettingValue::Bool(v)) => self.shortcut_toggles = v,
            (key, value) => {
                return Err(PanelHideError::InvalidSettingValue {
                    key: key.as_str(),
                    value: format!("{value:?}"),
                });
            }
        }
        Ok(true)
    }
}

impl SettingsStore for PanelSettings {
    fn get_bool(&self, key: Key) -> bool {
        match self.value(key) {
            SettingValue::Bool(v) => v,
            other => {
                log::warn!("setting {key} read as bool but holds {other:?}");
                false
            }
        }
    }

    fn get_double(&self, key: Key) -> f64 {
        match self.value(key) {
            SettingValue::Double(v) => v,
            SettingValue::Int(v) => f64::from(v),
            other => {
                log::warn!("setting {key} read as double but holds {other:?}");
                0.
            }
        }
    }

    fn get_int(&self, key: Key) -> i32 {
        match self.value(key) {
            SettingValue::Int(v) => v,
            other => {
                log::warn!("setting {key} read as int but holds {other:?}");
                0
            }
        }
    }
}

/// Shared in-memory settings store.
///
/// Clones share the same values. When a notifier is attached, every
/// effective change is announced as [`PanelEvent::SettingChanged`].
#[derive(Clone, Default)]
pub struct MemorySettings {
    values: Rc<RefCell<PanelSettings>>,
    notifier: Option<Sender<PanelEvent>>,
}

impl fmt::Debug for MemorySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySettings")
            .field("values", &self.values.borrow())
            .field("notifying", &self.notifier.is_some())
            .finish()
    }
}

impl MemorySettings {
    pub fn new(values: PanelSettings) -> Self {
        Self {
            values: Rc::new(RefCell::new(values)),
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Sender<PanelEvent>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn snapshot(&self) -> PanelSettings {
        *self.values.borrow()
    }

    pub fn set(&self, key: Key, value: SettingValue) -> Result<bool, PanelHideError> {
        let changed = self.values.borrow_mut().set(key, value)?;
        if changed {
            log::debug!("setting {key} changed to {value:?}");
            if let Some(notifier) = &self.notifier
                && let Err(err) = notifier.send(PanelEvent::SettingChanged(key))
            {
                log::debug!("change of {key} not delivered: {err}");
            }
        }
        Ok(changed)
    }

    /// Set a value from its textual `key`/`value` form.
    pub fn set_str(&self, key: &str, raw: &str) -> Result<bool, PanelHideError> {
        let key: Key = key.parse()?;
        let value = key.parse_value(raw)?;
        self.set(key, value)
    }

    /// Apply a `key=value` assignment.
    pub fn apply_assignment(&self, assignment: &str) -> Result<bool, PanelHideError> {
        let Some((key, raw)) = assignment.split_once('=') else {
            return Err(PanelHideError::InvalidSettingValue {
                key: "",
                value: assignment.to_owned(),
            });
        };
        self.set_str(key.trim(), raw)
    }
}

impl SettingsStore for MemorySettings {
    fn get_bool(&self, key: Key) -> bool {
        self.values.borrow().get_bool(key)
    }

    fn get_double(&self, key: Key) -> f64 {
        self.values.borrow().get_double(key)
    }

    fn get_int(&self, key: Key) -> i32 {
        self.values.borrow().get_int(key)
    }
}
