//! # Auto-hide for a shell's top panel
//!
//! [`PanelHide`] decides when the top panel is shown and when it slides out
//! of the way. It reconciles several independent inputs:
//!
//! - the overview opening and closing,
//! - the pointer leaving the panel, held back while a panel menu is open,
//! - pressure against the top screen edge ([`barrier`]),
//! - windows overlapping the panel ([`intellihide`]),
//! - a global shortcut that reveals the panel for a while ([`shortcut`]),
//! - live settings changes ([`settings`]).
//!
//! The host owns the event loop. Everything asynchronous reaches the
//! controller as a [`PanelEvent`] through [`PanelHide::handle_event`], and
//! everything the controller does goes through the collaborator traits
//! bundled in [`Collaborators`]. With calloop, [`timer::LoopTimers`] and
//! [`insert_event_channel`] wire the controller to a loop; see the
//! `headless_panel` example for a complete program.
//!
//! The panel box is animated with one [`Tween`] at a time on its `y`
//! property. Starting an animation always removes the previous one first,
//! and completions of removed animations are ignored by id.
use std::time::Duration;

pub mod barrier;
mod error;
mod events;
pub mod geometry;
pub mod intellihide;
pub mod settings;
pub mod shell;
pub mod shortcut;
pub mod surface;
pub mod timer;
mod trigger;

pub use error::PanelHideError;
pub use events::{PanelEvent, PanelEventSink, insert_event_channel};
pub use trigger::Trigger;

use barrier::{
    ActionMode, BarrierBinding, BarrierConfig, BarrierEdge, BarrierFactory, BarrierId,
    ignore_grabbed_outside_modal,
};
use geometry::StaticBox;
use intellihide::OverlapDetector;
use settings::{Key, SettingsStore};
use shell::{ChromeMode, KeyBindingFlags, MenuId, Shell, Signal, Subscriptions};
use shortcut::{SHORTCUT_KEYBIND, ShortcutState};
use surface::{OPAQUE, PanelSurface, TRANSPARENT, Tween, TweenId, TweenProperty};
use timer::{TimerToken, Timers};

/// Give dependent surfaces time to lay themselves out before the first
/// overlap evaluation.
pub const INTELLIHIDE_INIT_DELAY: Duration = Duration::from_millis(100);

/// Duration of the hide that follows a `hot-corner` change.
pub const HOT_CORNER_REHIDE: Duration = Duration::from_millis(100);

/// Settings whose change reconfigures the controller right away. The
/// others are read each time they are used.
const WATCHED_KEYS: [Key; 6] = [
    Key::HotCorner,
    Key::MouseSensitive,
    Key::PressureTimeout,
    Key::PressureThreshold,
    Key::EnableIntellihide,
    Key::EnableActiveWindow,
];

/// External services the controller drives
pub struct Collaborators {
    pub surface: Box<dyn PanelSurface>,
    pub shell: Box<dyn Shell>,
    pub intellihide: Box<dyn OverlapDetector>,
    pub barriers: Box<dyn BarrierFactory>,
    pub settings: Box<dyn SettingsStore>,
    pub timers: Box<dyn Timers>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TweenKind {
    Hide,
    Show,
}

#[derive(Debug, Clone, Copy)]
struct ActiveTween {
    id: TweenId,
    kind: TweenKind,
}

/// The panel visibility controller
pub struct PanelHide {
    surface: Box<dyn PanelSurface>,
    shell: Box<dyn Shell>,
    intellihide: Box<dyn OverlapDetector>,
    barriers: Box<dyn BarrierFactory>,
    settings: Box<dyn SettingsStore>,
    timers: Box<dyn Timers>,

    panel_height: f64,
    static_box: StaticBox,
    prevent_hide: bool,
    intellihide_block: bool,
    tween: Option<ActiveTween>,

    barrier: BarrierBinding,
    shortcut: ShortcutState,
    keybinding_registered: bool,
    init_timer: Option<TimerToken>,
    blocker_menu: Option<MenuId>,
    subscriptions: Subscriptions,
    destroyed: bool,
}

impl PanelHide {
    /// Take over the panel: connect every signal, arm the pressure barrier
    /// and register the shortcut.
    ///
    /// On failure everything already set up is torn down again.
    pub fn new(collaborators: Collaborators) -> Result<Self, PanelHideError> {
        let Collaborators {
            surface,
            shell,
            intellihide,
            barriers,
            settings,
            timers,
        } = collaborators;
        let panel_height = surface.panel_height();
        let mut panel = Self {
            surface,
            shell,
            intellihide,
            barriers,
            settings,
            timers,
            panel_height,
            static_box: StaticBox::default(),
            prevent_hide: false,
            intellihide_block: false,
            tween: None,
            barrier: BarrierBinding::default(),
            shortcut: ShortcutState::Idle,
            keybinding_registered: false,
            init_timer: None,
            blocker_menu: None,
            subscriptions: Subscriptions::default(),
            destroyed: false,
        };
        if let Err(err) = panel.init() {
            panel.destroy();
            return Err(err);
        }
        log::info!("panel auto-hide enabled, panel height {}", panel.panel_height);
        Ok(panel)
    }

    fn init(&mut self) -> Result<(), PanelHideError> {
        self.shell.set_chrome(ChromeMode::AUTOHIDE);

        self.subscriptions
            .add(self.shell.as_mut(), &WATCHED_KEYS.map(Signal::SettingChanged));
        self.update_mouse_sensitive()?;

        self.subscriptions.add(
            self.shell.as_mut(),
            &[
                Signal::OverviewShowing,
                Signal::OverviewHiding,
                Signal::PanelLeave,
                Signal::MonitorsChanged,
                Signal::OverlapStatusChanged,
            ],
        );

        self.update_static_box();
        self.init_timer = Some(self.timers.schedule(INTELLIHIDE_INIT_DELAY)?);

        self.keybinding_registered =
            self.shell
                .add_keybinding(SHORTCUT_KEYBIND, KeyBindingFlags::NONE, ActionMode::NORMAL);
        if !self.keybinding_registered {
            log::warn!("shell refused keybinding {SHORTCUT_KEYBIND}, shortcut disabled");
        }
        Ok(())
    }

    pub fn handle_event(&mut self, event: PanelEvent) {
        if self.destroyed {
            log::debug!("ignoring {event:?} after destroy");
            return;
        }
        if let Some(signal) = event.signal()
            && !self.subscriptions.is_connected(signal)
        {
            log::debug!("ignoring {event:?}, signal not connected");
            return;
        }
        match event {
            PanelEvent::OverviewShowing => {
                self.show(self.seconds(Key::AnimationTimeOverview), Trigger::ShowingOverview)
            }
            PanelEvent::OverviewHiding => {
                self.hide(self.seconds(Key::AnimationTimeOverview), Trigger::HidingOverview)
            }
            PanelEvent::PanelLeave => self.handle_menus(None),
            PanelEvent::MonitorsChanged => self.update_static_box(),
            PanelEvent::OverlapStatusChanged => self.update_prevent_hide(),
            PanelEvent::SettingChanged(key) => self.setting_changed(key),
            PanelEvent::MenuOpenStateChanged { menu, open } => {
                self.menu_open_state_changed(menu, open)
            }
            PanelEvent::TweenCompleted(id) => self.tween_completed(id),
            PanelEvent::TimerFired(token) => self.timer_fired(token),
            PanelEvent::BarrierTriggered(id) => self.barrier_triggered(id),
            PanelEvent::Shortcut => {
                if self.keybinding_registered {
                    self.handle_shortcut();
                }
            }
        }
    }

    /// Slide the panel out of view.
    pub fn hide(&mut self, duration: Duration, trigger: Trigger) {
        log::debug!("hide({trigger})");
        if self.prevent_hide {
            return;
        }
        if self.surface.geometry().height <= 1. {
            return;
        }

        self.panel_height = self.surface.panel_height();

        if trigger == Trigger::MouseLeft {
            let (_, pointer_y) = self.shell.pointer();
            if self.static_box.band_contains(pointer_y, self.panel_height) {
                return;
            }
        }

        self.cancel_tween();

        let strut = if self.settings.get_bool(Key::HotCorner) {
            1.
        } else {
            0.
        };
        self.surface.set_height(strut);

        let target = self.static_box.y1 + strut - self.panel_height;
        self.start_tween(Tween::y(target, duration), TweenKind::Hide);
    }

    /// Bring the panel back to its resting position.
    pub fn show(&mut self, duration: Duration, trigger: Trigger) {
        log::debug!("show({trigger})");
        if trigger == Trigger::MouseEnter && self.settings.get_bool(Key::MouseTriggersOverview) {
            self.shell.show_overview();
        }

        self.cancel_tween();

        self.surface.set_height(self.panel_height);
        self.surface.set_opacity(OPAQUE);

        let snap = match trigger {
            Trigger::Destroy => true,
            Trigger::ShowingOverview => {
                let (_, pointer_y) = self.shell.pointer();
                pointer_y < self.static_box.y1 + self.panel_height
                    && self.settings.get_bool(Key::HotCorner)
            }
            _ => false,
        };
        if snap {
            self.surface.set_y(self.static_box.y1);
        } else {
            self.start_tween(Tween::y(self.static_box.y1, duration), TweenKind::Show);
        }
    }

    /// Release the panel: disconnect everything and leave it shown with
    /// its usual struts. Calling this again does nothing.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.intellihide.destroy();
        self.subscriptions.clear(self.shell.as_mut());
        self.blocker_menu = None;
        if self.keybinding_registered {
            self.shell.remove_keybinding(SHORTCUT_KEYBIND);
            self.keybinding_registered = false;
        }
        self.barrier.release();
        if let Some(token) = self.init_timer.take() {
            self.timers.cancel(token);
        }
        self.clear_shortcut_timer();

        self.show(Duration::ZERO, Trigger::Destroy);

        self.shell.set_chrome(ChromeMode::DEFAULT);
        self.destroyed = true;
        log::info!("panel auto-hide disabled");
    }

    pub fn prevent_hide(&self) -> bool {
        self.prevent_hide
    }

    pub fn intellihide_block(&self) -> bool {
        self.intellihide_block
    }

    pub fn tween_active(&self) -> bool {
        self.tween.is_some()
    }

    pub fn static_box(&self) -> StaticBox {
        self.static_box
    }

    pub fn panel_height(&self) -> f64 {
        self.panel_height
    }

    pub fn shortcut_state(&self) -> ShortcutState {
        self.shortcut
    }

    pub fn barrier_live(&self) -> bool {
        self.barrier.is_live()
    }

    /// The menu whose closing will re-run the hide check, if any.
    pub fn blocker_menu(&self) -> Option<MenuId> {
        self.blocker_menu
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    fn seconds(&self, key: Key) -> Duration {
        self.settings.get_seconds(key)
    }

    fn start_tween(&mut self, tween: Tween, kind: TweenKind) {
        let id = self.surface.add_tween(tween);
        self.tween = Some(ActiveTween { id, kind });
    }

    fn cancel_tween(&mut self) {
        if self.tween.take().is_some() {
            self.surface.remove_tweens(TweenProperty::Y);
        }
    }

    fn tween_completed(&mut self, id: TweenId) {
        let Some(active) = self.tween.filter(|active| active.id == id) else {
            log::debug!("stale completion of {id:?}");
            return;
        };
        self.tween = None;
        match active.kind {
            TweenKind::Hide => self.surface.set_opacity(TRANSPARENT),
            TweenKind::Show => self.update_static_box(),
        }
    }

    /// Hide after the pointer left, unless a panel menu is still open. An
    /// open menu is watched and the check runs again once it closes.
    fn handle_menus(&mut self, just_closed: Option<MenuId>) {
        if self.shell.overview_visible() {
            return;
        }
        // the closing menu may still be reported active while it closes
        let blocker = self
            .shell
            .active_menu()
            .filter(|menu| Some(*menu) != just_closed);
        match blocker {
            None => self.hide(self.seconds(Key::AnimationTimeAutohide), Trigger::MouseLeft),
            Some(menu) => self.watch_menu(menu),
        }
    }

    fn watch_menu(&mut self, menu: MenuId) {
        if self.blocker_menu == Some(menu) {
            return;
        }
        self.release_blocker();
        log::debug!("hide deferred until {menu:?} closes");
        self.blocker_menu = Some(menu);
        self.subscriptions
            .add(self.shell.as_mut(), &[Signal::MenuOpenStateChanged(menu)]);
    }

    fn release_blocker(&mut self) {
        if let Some(menu) = self.blocker_menu.take() {
            self.subscriptions
                .remove_signal(self.shell.as_mut(), Signal::MenuOpenStateChanged(menu));
        }
    }

    fn menu_open_state_changed(&mut self, menu: MenuId, open: bool) {
        if open || self.blocker_menu != Some(menu) {
            return;
        }
        self.release_blocker();
        self.handle_menus(Some(menu));
    }

    /// Press of the reveal shortcut.
    fn handle_shortcut(&mut self) {
        let delay = self.settings.get_double(Key::ShortcutDelay);
        let toggles = self.settings.get_bool(Key::ShortcutToggles);

        if self.shortcut.toggles_off(delay, toggles) {
            self.clear_shortcut_timer();
            self.intellihide_block = false;
            self.prevent_hide = false;
            self.hide(self.seconds(Key::AnimationTimeAutohide), Trigger::Shortcut);
            return;
        }

        self.clear_shortcut_timer();
        self.intellihide_block = true;
        self.prevent_hide = true;

        if !shortcut::uses_dwell_timer(delay) {
            self.show(self.seconds(Key::AnimationTimeAutohide), Trigger::Shortcut);
            self.shortcut = ShortcutState::Held;
            return;
        }

        self.show(shortcut::reveal_duration(delay), Trigger::Shortcut);
        self.shortcut = match self.timers.schedule(shortcut::dwell_timeout(delay)) {
            Ok(token) => ShortcutState::Pending(token),
            Err(err) => {
                log::warn!("cannot arm shortcut timer, holding panel: {err}");
                ShortcutState::Held
            }
        };
    }

    fn clear_shortcut_timer(&mut self) {
        if let Some(token) = self.shortcut.timer() {
            self.timers.cancel(token);
        }
        self.shortcut = ShortcutState::Idle;
    }

    fn timer_fired(&mut self, token: TimerToken) {
        if self.init_timer == Some(token) {
            self.init_timer = None;
            self.update_intellihide_status();
        } else if self.shortcut.timer() == Some(token) {
            self.shortcut = ShortcutState::Idle;
            self.prevent_hide = false;
            self.intellihide_block = false;
            self.handle_menus(None);
        } else {
            log::debug!("stale timer {token:?}");
        }
    }

    fn barrier_triggered(&mut self, id: BarrierId) {
        if !self.barrier.owns(id) {
            log::debug!("trigger from released barrier {id:?}");
            return;
        }
        if self.shell.primary_monitor().in_fullscreen {
            return;
        }
        self.show(self.seconds(Key::AnimationTimeAutohide), Trigger::MouseEnter);
    }

    fn barrier_config(&self) -> BarrierConfig {
        BarrierConfig {
            threshold: self.settings.get_int(Key::PressureThreshold),
            timeout: self.settings.get_millis(Key::PressureTimeout),
            action_mode: ActionMode::NORMAL,
            edge: BarrierEdge::top_of(&self.shell.primary_monitor()),
            filter: ignore_grabbed_outside_modal,
        }
    }

    fn update_mouse_sensitive(&mut self) -> Result<(), PanelHideError> {
        if self.settings.get_bool(Key::MouseSensitive) {
            let config = self.barrier_config();
            self.barrier.recreate(self.barriers.as_mut(), config)?;
        } else {
            self.barrier.release();
        }
        Ok(())
    }

    fn update_static_box(&mut self) {
        self.static_box = StaticBox::from_rect(self.surface.geometry());
        log::debug!("static box now {:?}", self.static_box);
        self.intellihide.update_target_box(self.static_box);
    }

    fn update_intellihide_status(&mut self) {
        if self.settings.get_bool(Key::EnableIntellihide) {
            self.intellihide.enable();
        } else {
            self.intellihide.disable();
            self.hide(Duration::ZERO, Trigger::Init);
        }
        self.intellihide
            .only_active_window(self.settings.get_bool(Key::EnableActiveWindow));
    }

    /// Follow the overlap detector. An open overview keeps the panel shown.
    fn update_prevent_hide(&mut self) {
        if self.intellihide_block {
            return;
        }
        self.prevent_hide = !self.intellihide.overlap_status();
        let duration = self.seconds(Key::AnimationTimeAutohide);
        if self.prevent_hide {
            self.show(duration, Trigger::Intellihide);
        } else if !self.shell.overview_visible() {
            self.hide(duration, Trigger::Intellihide);
        }
    }

    fn setting_changed(&mut self, key: Key) {
        match key {
            Key::HotCorner => self.hide(HOT_CORNER_REHIDE, Trigger::HotCornerSettingChanged),
            Key::MouseSensitive | Key::PressureThreshold | Key::PressureTimeout => {
                if let Err(err) = self.update_mouse_sensitive() {
                    log::warn!("pressure barrier disabled: {err}");
                }
            }
            Key::EnableIntellihide | Key::EnableActiveWindow => self.update_intellihide_status(),
            _ => {}
        }
    }
}

impl PanelEventSink for PanelHide {
    fn dispatch(&mut self, event: PanelEvent) {
        self.handle_event(event);
    }
}
