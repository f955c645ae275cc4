//! Recording doubles for every collaborator of the controller.
#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use panelhide::barrier::{
    ActionMode, BarrierConfig, BarrierFactory, BarrierId, PressureBarrier,
};
use panelhide::geometry::{Monitor, Rect, StaticBox};
use panelhide::intellihide::OverlapDetector;
use panelhide::settings::{Key, MemorySettings, PanelSettings, SettingValue};
use panelhide::shell::{ChromeMode, KeyBindingFlags, MenuId, Shell, Signal, SignalHandlerId};
use panelhide::surface::{PanelSurface, Tween, TweenId, TweenProperty};
use panelhide::timer::{TimerToken, Timers};
use panelhide::{Collaborators, PanelEvent, PanelHide, PanelHideError};

pub const PANEL_HEIGHT: f64 = 32.;

#[derive(Debug)]
pub struct World {
    pub geometry: Rect,
    pub panel_height: f64,
    pub opacity: u8,
    pub active_tweens: Vec<(TweenId, Tween)>,
    pub started_tweens: Vec<Tween>,
    pub removed_tweens: usize,
    pub next_tween: u64,

    pub pointer: (f64, f64),
    pub monitor: Monitor,
    pub overview_visible: bool,
    pub overview_requests: usize,
    pub active_menu: Option<MenuId>,
    pub chrome: Vec<ChromeMode>,
    pub connected: HashMap<SignalHandlerId, Signal>,
    pub next_handler: u64,
    pub keybindings: Vec<(&'static str, KeyBindingFlags, ActionMode)>,
    pub refuse_keybinding: bool,

    pub target_boxes: Vec<StaticBox>,
    pub intellihide_enabled: Option<bool>,
    pub only_active_window: Option<bool>,
    pub overlap: bool,
    pub intellihide_destroyed: bool,

    pub barrier_configs: Vec<BarrierConfig>,
    pub live_barriers: Vec<BarrierId>,
    pub destroyed_barriers: Vec<BarrierId>,
    pub fail_barrier: bool,
    pub next_barrier: u64,

    pub armed_timers: Vec<(TimerToken, Duration)>,
    pub cancelled_timers: Vec<TimerToken>,
    pub next_timer: u64,
}

impl Default for World {
    fn default() -> Self {
        Self {
            geometry: Rect::new(0., 0., 1920., PANEL_HEIGHT),
            panel_height: PANEL_HEIGHT,
            opacity: 255,
            active_tweens: Vec::new(),
            started_tweens: Vec::new(),
            removed_tweens: 0,
            next_tween: 0,
            pointer: (960., 540.),
            monitor: Monitor {
                geometry: Rect::new(0., 0., 1920., 1080.),
                in_fullscreen: false,
            },
            overview_visible: false,
            overview_requests: 0,
            active_menu: None,
            chrome: Vec::new(),
            connected: HashMap::new(),
            next_handler: 0,
            keybindings: Vec::new(),
            refuse_keybinding: false,
            target_boxes: Vec::new(),
            intellihide_enabled: None,
            only_active_window: None,
            overlap: true,
            intellihide_destroyed: false,
            barrier_configs: Vec::new(),
            live_barriers: Vec::new(),
            destroyed_barriers: Vec::new(),
            fail_barrier: false,
            next_barrier: 0,
            armed_timers: Vec::new(),
            cancelled_timers: Vec::new(),
            next_timer: 0,
        }
    }
}

impl World {
    pub fn is_connected(&self, signal: Signal) -> bool {
        self.connected.values().any(|s| *s == signal)
    }

    pub fn last_tween(&self) -> Option<Tween> {
        self.started_tweens.last().copied()
    }

    pub fn timer_with_delay(&self, delay: Duration) -> Option<TimerToken> {
        self.armed_timers
            .iter()
            .find(|(_, d)| *d == delay)
            .map(|(token, _)| *token)
    }
}

pub type Shared = Rc<RefCell<World>>;

struct FakeSurface(Shared);

impl PanelSurface for FakeSurface {
    fn geometry(&self) -> Rect {
        self.0.borrow().geometry
    }

    fn panel_height(&self) -> f64 {
        self.0.borrow().panel_height
    }

    fn opacity(&self) -> u8 {
        self.0.borrow().opacity
    }

    fn set_y(&mut self, y: f64) {
        self.0.borrow_mut().geometry.y = y;
    }

    fn set_height(&mut self, height: f64) {
        self.0.borrow_mut().geometry.height = height;
    }

    fn set_opacity(&mut self, opacity: u8) {
        self.0.borrow_mut().opacity = opacity;
    }

    fn add_tween(&mut self, tween: Tween) -> TweenId {
        let mut world = self.0.borrow_mut();
        assert!(
            world.active_tweens.is_empty(),
            "second tween started while {:?} is in flight",
            world.active_tweens
        );
        let id = TweenId(world.next_tween);
        world.next_tween += 1;
        world.active_tweens.push((id, tween));
        world.started_tweens.push(tween);
        id
    }

    fn remove_tweens(&mut self, property: TweenProperty) {
        let mut world = self.0.borrow_mut();
        let before = world.active_tweens.len();
        world.active_tweens.retain(|(_, t)| t.property != property);
        world.removed_tweens += before - world.active_tweens.len();
    }
}

struct FakeShell(Shared);

impl Shell for FakeShell {
    fn pointer(&self) -> (f64, f64) {
        self.0.borrow().pointer
    }

    fn primary_monitor(&self) -> Monitor {
        self.0.borrow().monitor
    }

    fn overview_visible(&self) -> bool {
        self.0.borrow().overview_visible
    }

    fn show_overview(&mut self) {
        self.0.borrow_mut().overview_requests += 1;
    }

    fn active_menu(&self) -> Option<MenuId> {
        self.0.borrow().active_menu
    }

    fn set_chrome(&mut self, mode: ChromeMode) {
        self.0.borrow_mut().chrome.push(mode);
    }

    fn connect(&mut self, signal: Signal) -> SignalHandlerId {
        let mut world = self.0.borrow_mut();
        let id = SignalHandlerId(world.next_handler);
        world.next_handler += 1;
        world.connected.insert(id, signal);
        id
    }

    fn disconnect(&mut self, id: SignalHandlerId) {
        let removed = self.0.borrow_mut().connected.remove(&id);
        assert!(removed.is_some(), "handler {id:?} disconnected twice");
    }

    fn add_keybinding(
        &mut self,
        name: &'static str,
        flags: KeyBindingFlags,
        mode: ActionMode,
    ) -> bool {
        let mut world = self.0.borrow_mut();
        if world.refuse_keybinding {
            return false;
        }
        world.keybindings.push((name, flags, mode));
        true
    }

    fn remove_keybinding(&mut self, name: &'static str) {
        self.0.borrow_mut().keybindings.retain(|(n, _, _)| *n != name);
    }
}

struct FakeIntellihide(Shared);

impl OverlapDetector for FakeIntellihide {
    fn update_target_box(&mut self, target: StaticBox) {
        self.0.borrow_mut().target_boxes.push(target);
    }

    fn enable(&mut self) {
        self.0.borrow_mut().intellihide_enabled = Some(true);
    }

    fn disable(&mut self) {
        self.0.borrow_mut().intellihide_enabled = Some(false);
    }

    fn only_active_window(&mut self, only_active: bool) {
        self.0.borrow_mut().only_active_window = Some(only_active);
    }

    fn overlap_status(&self) -> bool {
        self.0.borrow().overlap
    }

    fn destroy(&mut self) {
        self.0.borrow_mut().intellihide_destroyed = true;
    }
}

struct FakeBarrier {
    id: BarrierId,
    world: Shared,
}

impl PressureBarrier for FakeBarrier {
    fn id(&self) -> BarrierId {
        self.id
    }

    fn destroy(&mut self) {
        let mut world = self.world.borrow_mut();
        world.live_barriers.retain(|id| *id != self.id);
        world.destroyed_barriers.push(self.id);
    }
}

struct FakeBarriers(Shared);

impl BarrierFactory for FakeBarriers {
    fn create(
        &mut self,
        config: BarrierConfig,
    ) -> Result<Box<dyn PressureBarrier>, PanelHideError> {
        let mut world = self.0.borrow_mut();
        if world.fail_barrier {
            return Err(PanelHideError::BarrierCreateFailed("no display".to_owned()));
        }
        let id = BarrierId(world.next_barrier);
        world.next_barrier += 1;
        world.barrier_configs.push(config);
        world.live_barriers.push(id);
        Ok(Box::new(FakeBarrier {
            id,
            world: self.0.clone(),
        }))
    }
}

struct FakeTimers(Shared);

impl Timers for FakeTimers {
    fn schedule(&mut self, delay: Duration) -> Result<TimerToken, PanelHideError> {
        let mut world = self.0.borrow_mut();
        let token = TimerToken(world.next_timer);
        world.next_timer += 1;
        world.armed_timers.push((token, delay));
        Ok(token)
    }

    fn cancel(&mut self, token: TimerToken) {
        let mut world = self.0.borrow_mut();
        let before = world.armed_timers.len();
        world.armed_timers.retain(|(t, _)| *t != token);
        if world.armed_timers.len() != before {
            world.cancelled_timers.push(token);
        }
    }
}

pub fn collaborators(world: &Shared, settings: &MemorySettings) -> Collaborators {
    Collaborators {
        surface: Box::new(FakeSurface(world.clone())),
        shell: Box::new(FakeShell(world.clone())),
        intellihide: Box::new(FakeIntellihide(world.clone())),
        barriers: Box::new(FakeBarriers(world.clone())),
        settings: Box::new(settings.clone()),
        timers: Box::new(FakeTimers(world.clone())),
    }
}

pub struct Harness {
    pub world: Shared,
    pub settings: MemorySettings,
    pub panel: PanelHide,
}

impl Harness {
    pub fn new(settings: PanelSettings) -> Self {
        Self::with_world(settings, World::default())
    }

    pub fn with_world(settings: PanelSettings, world: World) -> Self {
        let world = Rc::new(RefCell::new(world));
        let settings = MemorySettings::new(settings);
        let panel = PanelHide::new(collaborators(&world, &settings)).unwrap();
        Self {
            world,
            settings,
            panel,
        }
    }

    pub fn send(&mut self, event: PanelEvent) {
        self.panel.handle_event(event);
    }

    pub fn fire_timer(&mut self, token: TimerToken) {
        self.world
            .borrow_mut()
            .armed_timers
            .retain(|(t, _)| *t != token);
        self.send(PanelEvent::TimerFired(token));
    }

    /// Run the deferred intellihide refresh armed at construction.
    pub fn fire_init_timer(&mut self) {
        let token = self
            .world
            .borrow()
            .timer_with_delay(panelhide::INTELLIHIDE_INIT_DELAY)
            .unwrap();
        self.fire_timer(token);
    }

    /// Finish the animation in flight, as the animation engine would.
    pub fn complete_tween(&mut self) {
        let (id, tween) = self.world.borrow_mut().active_tweens.remove(0);
        self.world.borrow_mut().geometry.y = tween.target;
        self.send(PanelEvent::TweenCompleted(id));
    }

    pub fn set(&mut self, key: Key, value: SettingValue) {
        assert!(self.settings.set(key, value).unwrap());
        self.send(PanelEvent::SettingChanged(key));
    }

    /// Hide the panel and let the animation finish.
    pub fn hidden(mut self) -> Self {
        self.world.borrow_mut().pointer = (960., 540.);
        self.send(PanelEvent::PanelLeave);
        self.complete_tween();
        self
    }

    pub fn started_tweens(&self) -> usize {
        self.world.borrow().started_tweens.len()
    }

    pub fn last_tween(&self) -> Tween {
        self.world.borrow().last_tween().unwrap()
    }

    pub fn geometry(&self) -> Rect {
        self.world.borrow().geometry
    }
}

pub fn secs(value: f64) -> Duration {
    Duration::from_secs_f64(value)
}
