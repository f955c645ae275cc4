use calloop::LoopHandle;
use calloop::RegistrationToken;
use calloop::channel::{self, Channel};

use crate::barrier::BarrierId;
use crate::error::PanelHideError;
use crate::settings::Key;
use crate::shell::{MenuId, Signal};
use crate::surface::TweenId;
use crate::timer::TimerToken;

/// Everything that can happen to the controller after construction
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PanelEvent {
    OverviewShowing,
    OverviewHiding,
    /// The pointer left the panel.
    PanelLeave,
    MonitorsChanged,
    OverlapStatusChanged,
    SettingChanged(Key),
    MenuOpenStateChanged { menu: MenuId, open: bool },
    TweenCompleted(TweenId),
    TimerFired(TimerToken),
    BarrierTriggered(BarrierId),
    /// The global shortcut was pressed.
    Shortcut,
}

impl PanelEvent {
    /// The signal this event arrives through, for events that need a
    /// live subscription to be acted on.
    pub fn signal(&self) -> Option<Signal> {
        match *self {
            PanelEvent::OverviewShowing => Some(Signal::OverviewShowing),
            PanelEvent::OverviewHiding => Some(Signal::OverviewHiding),
            PanelEvent::PanelLeave => Some(Signal::PanelLeave),
            PanelEvent::MonitorsChanged => Some(Signal::MonitorsChanged),
            PanelEvent::OverlapStatusChanged => Some(Signal::OverlapStatusChanged),
            PanelEvent::SettingChanged(key) => Some(Signal::SettingChanged(key)),
            PanelEvent::MenuOpenStateChanged { menu, .. } => {
                Some(Signal::MenuOpenStateChanged(menu))
            }
            PanelEvent::TweenCompleted(_)
            | PanelEvent::TimerFired(_)
            | PanelEvent::BarrierTriggered(_)
            | PanelEvent::Shortcut => None,
        }
    }
}

/// Receiver of [`PanelEvent`]s, usually the event loop data holding the
/// controller
pub trait PanelEventSink {
    fn dispatch(&mut self, event: PanelEvent);
}

/// Insert `channel` into the loop, forwarding every message to the loop data.
pub fn insert_event_channel<D: PanelEventSink + 'static>(
    handle: &LoopHandle<'static, D>,
    channel: Channel<PanelEvent>,
) -> Result<RegistrationToken, PanelHideError> {
    handle
        .insert_source(channel, |event, _, data| {
            let channel::Event::Msg(event) = event else {
                return;
            };
            data.dispatch(event);
        })
        .map_err(|e| PanelHideError::EventLoopInsertFailed(e.error))
}
