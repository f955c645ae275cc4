//! Host shell services the controller consumes, and the signal bookkeeping
//! for them.

use bitflags::bitflags;

use crate::barrier::ActionMode;
use crate::geometry::Monitor;
use crate::settings::Key;

/// A dropdown menu anchored to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MenuId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalHandlerId(pub u64);

/// Host signals the controller subscribes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Signal {
    OverviewShowing,
    OverviewHiding,
    PanelLeave,
    MonitorsChanged,
    OverlapStatusChanged,
    SettingChanged(Key),
    MenuOpenStateChanged(MenuId),
}

/// How the layout manager treats the panel box
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChromeMode {
    /// The panel reserves screen space other windows must avoid.
    pub affects_struts: bool,
    pub track_fullscreen: bool,
}

impl ChromeMode {
    /// Panel floats over windows while auto-hide runs.
    pub const AUTOHIDE: ChromeMode = ChromeMode {
        affects_struts: false,
        track_fullscreen: true,
    };
    /// The shell default for a fixed panel.
    pub const DEFAULT: ChromeMode = ChromeMode {
        affects_struts: true,
        track_fullscreen: true,
    };
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct KeyBindingFlags: u32 {
        const NONE = 0;
        const PER_WINDOW = 1 << 0;
        const BUILTIN = 1 << 1;
        const IS_REVERSED = 1 << 2;
        const NON_MASKABLE = 1 << 3;
        const IGNORE_AUTOREPEAT = 1 << 4;
        const NO_AUTO_GRAB = 1 << 5;
    }
}

pub trait Shell {
    /// Pointer position in stage coordinates.
    fn pointer(&self) -> (f64, f64);
    fn primary_monitor(&self) -> Monitor;
    fn overview_visible(&self) -> bool;
    fn show_overview(&mut self);
    /// The panel menu that is currently open, if any.
    fn active_menu(&self) -> Option<MenuId>;
    fn set_chrome(&mut self, mode: ChromeMode);

    fn connect(&mut self, signal: Signal) -> SignalHandlerId;
    fn disconnect(&mut self, id: SignalHandlerId);

    /// Register a global shortcut whose accelerator is read from the
    /// settings key `name`. Returns false when the shell refused it.
    fn add_keybinding(
        &mut self,
        name: &'static str,
        flags: KeyBindingFlags,
        mode: ActionMode,
    ) -> bool;
    fn remove_keybinding(&mut self, name: &'static str);
}

#[derive(Debug)]
struct Subscription {
    signal: Signal,
    handler: SignalHandlerId,
}

/// The signal handlers the controller owns
#[derive(Debug, Default)]
pub(crate) struct Subscriptions {
    entries: Vec<Subscription>,
}

impl Subscriptions {
    pub(crate) fn add(&mut self, shell: &mut dyn Shell, signals: &[Signal]) {
        for &signal in signals {
            let handler = shell.connect(signal);
            self.entries.push(Subscription { signal, handler });
        }
    }

    pub(crate) fn is_connected(&self, signal: Signal) -> bool {
        self.entries.iter().any(|entry| entry.signal == signal)
    }

    pub(crate) fn remove_signal(&mut self, shell: &mut dyn Shell, signal: Signal) {
        self.entries.retain(|entry| {
            if entry.signal == signal {
                shell.disconnect(entry.handler);
                false
            } else {
                true
            }
        });
    }

    pub(crate) fn clear(&mut self, shell: &mut dyn Shell) {
        for entry in self.entries.drain(..) {
            shell.disconnect(entry.handler);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
