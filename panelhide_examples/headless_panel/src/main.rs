//! Runs the auto-hide controller on a calloop loop against a simulated shell
//! and prints what it does. Settings can be overridden as `key=value`
//! arguments, e.g. `headless_panel hot-corner=true shortcut-delay=0.5`.
//! Set `RUST_LOG=panelhide=debug` to see every decision.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use calloop::timer::{TimeoutAction, Timer};
use calloop::{EventLoop, LoopHandle, LoopSignal, RegistrationToken};
use panelhide::barrier::{
    ActionMode, BarrierConfig, BarrierFactory, BarrierId, PressureBarrier,
};
use panelhide::geometry::{Monitor, Rect, StaticBox};
use panelhide::intellihide::OverlapDetector;
use panelhide::settings::{MemorySettings, PanelSettings};
use panelhide::shell::{ChromeMode, KeyBindingFlags, MenuId, Shell, Signal, SignalHandlerId};
use panelhide::surface::{PanelSurface, Tween, TweenId, TweenProperty};
use panelhide::timer::LoopTimers;
use panelhide::{Collaborators, PanelEvent, PanelEventSink, PanelHide, PanelHideError};
use tracing_subscriber::EnvFilter;

const FRAME: Duration = Duration::from_millis(16);
const PANEL_HEIGHT: f64 = 32.;

struct LoopData {
    panel: Option<PanelHide>,
    signal: LoopSignal,
}

impl PanelEventSink for LoopData {
    fn dispatch(&mut self, event: PanelEvent) {
        if let Some(panel) = self.panel.as_mut() {
            panel.handle_event(event);
        }
    }
}

/// Everything the simulated shell knows about
#[derive(Debug)]
struct Sim {
    geometry: Rect,
    opacity: u8,
    tween: Option<RegistrationToken>,
    next_tween: u64,
    pointer: (f64, f64),
    overview: bool,
    menu: Option<MenuId>,
    overlap: bool,
    next_handler: u64,
    barrier: Option<BarrierId>,
    next_barrier: u64,
}

type SharedSim = Rc<RefCell<Sim>>;

struct SimSurface {
    sim: SharedSim,
    handle: LoopHandle<'static, LoopData>,
}

impl PanelSurface for SimSurface {
    fn geometry(&self) -> Rect {
        self.sim.borrow().geometry
    }

    fn panel_height(&self) -> f64 {
        PANEL_HEIGHT
    }

    fn opacity(&self) -> u8 {
        self.sim.borrow().opacity
    }

    fn set_y(&mut self, y: f64) {
        self.sim.borrow_mut().geometry.y = y;
    }

    fn set_height(&mut self, height: f64) {
        self.sim.borrow_mut().geometry.height = height;
    }

    fn set_opacity(&mut self, opacity: u8) {
        log::info!("panel opacity {opacity}");
        self.sim.borrow_mut().opacity = opacity;
    }

    fn add_tween(&mut self, tween: Tween) -> TweenId {
        let mut sim = self.sim.borrow_mut();
        let id = TweenId(sim.next_tween);
        sim.next_tween += 1;
        let from = sim.geometry.y;
        drop(sim);

        let started = Instant::now();
        let state = self.sim.clone();
        let token = self
            .handle
            .insert_source(Timer::immediate(), move |_, _, data| {
                let elapsed = started.elapsed();
                let y = tween.value_at(from, elapsed);
                state.borrow_mut().geometry.y = y;
                if elapsed < tween.duration {
                    return TimeoutAction::ToDuration(FRAME);
                }
                state.borrow_mut().tween = None;
                log::info!("panel settled at y={y}");
                data.dispatch(PanelEvent::TweenCompleted(id));
                TimeoutAction::Drop
            });
        match token {
            Ok(token) => self.sim.borrow_mut().tween = Some(token),
            Err(err) => log::warn!("cannot animate panel: {}", err.error),
        }
        id
    }

    fn remove_tweens(&mut self, _property: TweenProperty) {
        if let Some(token) = self.sim.borrow_mut().tween.take() {
            self.handle.remove(token);
        }
    }
}

struct SimShell(SharedSim);

impl Shell for SimShell {
    fn pointer(&self) -> (f64, f64) {
        self.0.borrow().pointer
    }

    fn primary_monitor(&self) -> Monitor {
        Monitor {
            geometry: Rect::new(0., 0., 1920., 1080.),
            in_fullscreen: false,
        }
    }

    fn overview_visible(&self) -> bool {
        self.0.borrow().overview
    }

    fn show_overview(&mut self) {
        log::info!("overview requested");
        self.0.borrow_mut().overview = true;
    }

    fn active_menu(&self) -> Option<MenuId> {
        self.0.borrow().menu
    }

    fn set_chrome(&mut self, mode: ChromeMode) {
        log::info!("panel chrome {mode:?}");
    }

    fn connect(&mut self, signal: Signal) -> SignalHandlerId {
        let mut sim = self.0.borrow_mut();
        sim.next_handler += 1;
        log::trace!("connect {signal:?}");
        SignalHandlerId(sim.next_handler)
    }

    fn disconnect(&mut self, id: SignalHandlerId) {
        log::trace!("disconnect {id:?}");
    }

    fn add_keybinding(
        &mut self,
        name: &'static str,
        _flags: KeyBindingFlags,
        _mode: ActionMode,
    ) -> bool {
        log::info!("keybinding {name} registered");
        true
    }

    fn remove_keybinding(&mut self, name: &'static str) {
        log::info!("keybinding {name} removed");
    }
}

struct SimIntellihide(SharedSim);

impl OverlapDetector for SimIntellihide {
    fn update_target_box(&mut self, target: StaticBox) {
        log::debug!("intellihide watching {target:?}");
    }

    fn enable(&mut self) {
        log::info!("intellihide enabled");
    }

    fn disable(&mut self) {
        log::info!("intellihide disabled");
    }

    fn only_active_window(&mut self, only_active: bool) {
        log::debug!("intellihide active window only: {only_active}");
    }

    fn overlap_status(&self) -> bool {
        self.0.borrow().overlap
    }

    fn destroy(&mut self) {}
}

struct SimBarrier {
    id: BarrierId,
    sim: SharedSim,
}

impl PressureBarrier for SimBarrier {
    fn id(&self) -> BarrierId {
        self.id
    }

    fn destroy(&mut self) {
        self.sim.borrow_mut().barrier = None;
    }
}

struct SimBarriers(SharedSim);

impl BarrierFactory for SimBarriers {
    fn create(
        &mut self,
        config: BarrierConfig,
    ) -> Result<Box<dyn PressureBarrier>, PanelHideError> {
        let mut sim = self.0.borrow_mut();
        let id = BarrierId(sim.next_barrier);
        sim.next_barrier += 1;
        sim.barrier = Some(id);
        log::debug!("barrier {id:?} on {:?}", config.edge);
        Ok(Box::new(SimBarrier {
            id,
            sim: self.0.clone(),
        }))
    }
}

/// One scripted user or window action
#[derive(Debug, Clone, Copy)]
enum Step {
    WindowOverlaps(bool),
    PointerLeaves,
    OpenMenu(MenuId),
    CloseMenu(MenuId),
    PushTopEdge,
    Shortcut,
    Overview(bool),
    Quit,
}

const SCRIPT: &[(u64, Step)] = &[
    (300, Step::WindowOverlaps(true)),
    (900, Step::PushTopEdge),
    (1300, Step::OpenMenu(MenuId(1))),
    (1400, Step::PointerLeaves),
    (2000, Step::CloseMenu(MenuId(1))),
    (2600, Step::Shortcut),
    (3000, Step::WindowOverlaps(false)),
    (3400, Step::WindowOverlaps(true)),
    (4000, Step::Overview(true)),
    (4800, Step::Overview(false)),
    (5600, Step::Shortcut),
    (6000, Step::Shortcut),
    (6600, Step::Quit),
];

fn play(step: Step, sim: &SharedSim, data: &mut LoopData) {
    log::info!("step {step:?}");
    match step {
        Step::WindowOverlaps(overlap) => {
            sim.borrow_mut().overlap = overlap;
            data.dispatch(PanelEvent::OverlapStatusChanged);
        }
        Step::PointerLeaves => {
            sim.borrow_mut().pointer = (960., 540.);
            data.dispatch(PanelEvent::PanelLeave);
        }
        Step::OpenMenu(menu) => {
            let mut sim = sim.borrow_mut();
            sim.menu = Some(menu);
            sim.pointer = (40., 10.);
        }
        Step::CloseMenu(menu) => {
            sim.borrow_mut().menu = None;
            data.dispatch(PanelEvent::MenuOpenStateChanged { menu, open: false });
        }
        Step::PushTopEdge => {
            let barrier = sim.borrow().barrier;
            match barrier {
                Some(id) => data.dispatch(PanelEvent::BarrierTriggered(id)),
                None => log::info!("no pressure barrier, enable mouse-sensitive"),
            }
        }
        Step::Shortcut => data.dispatch(PanelEvent::Shortcut),
        Step::Overview(true) => {
            sim.borrow_mut().overview = true;
            data.dispatch(PanelEvent::OverviewShowing);
        }
        Step::Overview(false) => {
            sim.borrow_mut().overview = false;
            data.dispatch(PanelEvent::OverviewHiding);
        }
        Step::Quit => {
            if let Some(mut panel) = data.panel.take() {
                panel.destroy();
            }
            data.signal.stop();
        }
    }
}

fn main() -> Result<(), PanelHideError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut event_loop: EventLoop<'static, LoopData> = EventLoop::try_new()?;
    let handle = event_loop.handle();

    let (sender, channel) = calloop::channel::channel();
    panelhide::insert_event_channel(&handle, channel)?;

    let settings = MemorySettings::new(PanelSettings::default().with_mouse_sensitive(true));
    for assignment in std::env::args().skip(1) {
        settings.apply_assignment(&assignment)?;
    }
    let settings = settings.with_notifier(sender);

    let sim = Rc::new(RefCell::new(Sim {
        geometry: Rect::new(0., 0., 1920., PANEL_HEIGHT),
        opacity: 255,
        tween: None,
        next_tween: 0,
        pointer: (960., 540.),
        overview: false,
        menu: None,
        overlap: false,
        next_handler: 0,
        barrier: None,
        next_barrier: 0,
    }));

    let panel = PanelHide::new(Collaborators {
        surface: Box::new(SimSurface {
            sim: sim.clone(),
            handle: handle.clone(),
        }),
        shell: Box::new(SimShell(sim.clone())),
        intellihide: Box::new(SimIntellihide(sim.clone())),
        barriers: Box::new(SimBarriers(sim.clone())),
        settings: Box::new(settings.clone()),
        timers: Box::new(LoopTimers::new(handle.clone())),
    })?;

    for &(at, step) in SCRIPT {
        let sim = sim.clone();
        handle
            .insert_source(
                Timer::from_duration(Duration::from_millis(at)),
                move |_, _, data| {
                    play(step, &sim, data);
                    TimeoutAction::Drop
                },
            )
            .map_err(|e| e.error)?;
    }

    // a live settings change halfway through the script
    let live = settings.clone();
    handle
        .insert_source(
            Timer::from_duration(Duration::from_millis(3200)),
            move |_, _, _| {
                if let Err(err) = live.apply_assignment("hot-corner=true") {
                    log::warn!("{err}");
                }
                TimeoutAction::Drop
            },
        )
        .map_err(|e| e.error)?;

    let mut data = LoopData {
        panel: Some(panel),
        signal: event_loop.get_signal(),
    };
    event_loop.run(FRAME, &mut data, |_| {})?;

    let sim = sim.borrow();
    log::info!(
        "finished with panel at y={} height={} opacity={}",
        sim.geometry.y,
        sim.geometry.height,
        sim.opacity
    );
    Ok(())
}
