//! One-shot timers on the event loop.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use calloop::{
    LoopHandle, RegistrationToken,
    timer::{TimeoutAction, Timer},
};

use crate::PanelEvent;
use crate::error::PanelHideError;
use crate::events::PanelEventSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(pub u64);

pub trait Timers {
    /// Arm a one-shot timer. Its expiry is delivered as
    /// [`PanelEvent::TimerFired`] with the returned token.
    fn schedule(&mut self, delay: Duration) -> Result<TimerToken, PanelHideError>;
    /// Disarm a timer. Cancelling a fired or unknown token does nothing.
    fn cancel(&mut self, token: TimerToken);
}

/// [`Timers`] backed by calloop timer sources.
///
/// `D` is the event loop data; it receives the expiry through
/// [`PanelEventSink`].
pub struct LoopTimers<D: 'static> {
    handle: LoopHandle<'static, D>,
    next: u64,
    armed: Rc<RefCell<HashMap<TimerToken, RegistrationToken>>>,
}

impl<D: PanelEventSink + 'static> LoopTimers<D> {
    pub fn new(handle: LoopHandle<'static, D>) -> Self {
        Self {
            handle,
            next: 0,
            armed: Rc::default(),
        }
    }

    pub fn armed_count(&self) -> usize {
        self.armed.borrow().len()
    }
}

impl<D: PanelEventSink + 'static> Timers for LoopTimers<D> {
    fn schedule(&mut self, delay: Duration) -> Result<TimerToken, PanelHideError> {
        let token = TimerToken(self.next);
        self.next += 1;
        let armed = self.armed.clone();
        let registration = self
            .handle
            .insert_source(Timer::from_duration(delay), move |_, _, data| {
                armed.borrow_mut().remove(&token);
                data.dispatch(PanelEvent::TimerFired(token));
                TimeoutAction::Drop
            })
            .map_err(|e| e.error)?;
        self.armed.borrow_mut().insert(token, registration);
        Ok(token)
    }

    fn cancel(&mut self, token: TimerToken) {
        let registration = self.armed.borrow_mut().remove(&token);
        if let Some(registration) = registration {
            self.handle.remove(registration);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calloop::EventLoop;

    #[derive(Default)]
    struct Fired(Vec<TimerToken>);

    impl PanelEventSink for Fired {
        fn dispatch(&mut self, event: PanelEvent) {
            if let PanelEvent::TimerFired(token) = event {
                self.0.push(token);
            }
        }
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let mut event_loop: EventLoop<'static, Fired> = EventLoop::try_new().unwrap();
        let mut timers = LoopTimers::new(event_loop.handle());
        let kept = timers.schedule(Duration::from_millis(1)).unwrap();
        let dropped = timers.schedule(Duration::from_millis(1)).unwrap();
        timers.cancel(dropped);
        timers.cancel(dropped);

        std::thread::sleep(Duration::from_millis(5));
        let mut fired = Fired::default();
        event_loop
            .dispatch(Some(Duration::from_millis(50)), &mut fired)
            .unwrap();
        assert_eq!(fired.0, vec![kept]);
        assert_eq!(timers.armed_count(), 0);

        // already fired
        timers.cancel(kept);
    }
}
