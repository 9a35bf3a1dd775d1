//! Idle-session logout.
//!
//! Any activity event (captured at the document) restarts a fixed idle
//! window. Only one timer is ever pending: restarting replaces the handle,
//! and dropping a `Timeout` clears it. Expiry goes through the session latch
//! so it cannot stack a second redirect on top of a 401.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Event};

use crate::constants::{ACTIVITY_EVENTS, MSG_SESSION_IDLE};
use crate::platform::{self, Platform};
use crate::state::AppContext;

pub struct InactivityGuard {
    ctx: AppContext,
    platform: Rc<dyn Platform>,
    window_ms: u32,
    pending: RefCell<Option<Timeout>>,
    /// Bumped on every reset; lets native tests observe re-arming.
    generation: Cell<u64>,
}

impl InactivityGuard {
    pub fn new(ctx: AppContext, platform: Rc<dyn Platform>, window_ms: u32) -> Rc<Self> {
        Rc::new(Self {
            ctx,
            platform,
            window_ms,
            pending: RefCell::new(None),
            generation: Cell::new(0),
        })
    }

    pub fn window_ms(&self) -> u32 {
        self.window_ms
    }

    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    /// Restart the idle window. A no-op once the session is gone.
    pub fn reset(self: &Rc<Self>) {
        if self.ctx.is_expired() {
            return;
        }
        self.generation.set(self.generation.get() + 1);
        let timer = arm(Rc::downgrade(self), self.window_ms);
        // Replacing drops (and clears) the previous timer.
        *self.pending.borrow_mut() = timer;
    }

    /// The idle window elapsed.
    pub fn expire(&self) {
        if platform::expire_session(&self.ctx, self.platform.as_ref(), MSG_SESSION_IDLE) {
            log::info!("session closed after {} ms without activity", self.window_ms);
        }
    }

    /// Attach the capture-phase activity listeners and start the window.
    pub fn install(self: &Rc<Self>, document: &Document) -> Result<(), JsValue> {
        let guard = Rc::downgrade(self);
        let cb = Closure::wrap(Box::new(move |_e: Event| {
            if let Some(guard) = guard.upgrade() {
                guard.reset();
            }
        }) as Box<dyn FnMut(_)>);
        for event in ACTIVITY_EVENTS {
            document.add_event_listener_with_callback_and_bool(event, cb.as_ref().unchecked_ref(), true)?;
        }
        cb.forget();
        self.reset();
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
fn arm(guard: Weak<InactivityGuard>, window_ms: u32) -> Option<Timeout> {
    Some(Timeout::new(window_ms, move || {
        if let Some(guard) = guard.upgrade() {
            guard.expire();
        }
    }))
}

#[cfg(not(target_arch = "wasm32"))]
fn arm(_guard: Weak<InactivityGuard>, _window_ms: u32) -> Option<Timeout> {
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{IDLE_WINDOW_MS, LOGIN_PATH, MSG_SESSION_EXPIRED};
    use crate::platform::{PlatformEvent, RecordingPlatform};
    use crate::state::Session;

    fn guard() -> (Rc<InactivityGuard>, AppContext, Rc<RecordingPlatform>) {
        let ctx = AppContext::new(Session::new(Some("jwt".into()), None));
        let platform = Rc::new(RecordingPlatform::default());
        let guard = InactivityGuard::new(ctx.clone(), platform.clone(), IDLE_WINDOW_MS);
        (guard, ctx, platform)
    }

    #[test]
    fn idle_window_is_thirty_minutes() {
        let (g, _, _) = guard();
        assert_eq!(g.window_ms(), 30 * 60 * 1000);
    }

    #[test]
    fn expiry_notifies_and_redirects_once() {
        let (g, ctx, platform) = guard();
        g.expire();
        g.expire();
        assert_eq!(ctx.token(), None);
        assert_eq!(platform.count(|e| matches!(e, PlatformEvent::Redirect { path, .. } if path == LOGIN_PATH)), 1);
        assert!(platform.events().contains(&PlatformEvent::Notified {
            message: MSG_SESSION_IDLE.into(),
            severity: crate::toast::Severity::Warning,
            duration_ms: None,
        }));
    }

    #[test]
    fn activity_after_expiry_does_not_rearm() {
        let (g, _, _) = guard();
        g.reset();
        g.reset();
        assert_eq!(g.generation(), 2);
        g.expire();
        g.reset();
        assert_eq!(g.generation(), 2);
    }

    #[test]
    fn idle_expiry_after_401_is_silent() {
        let (g, ctx, platform) = guard();
        platform::expire_session(&ctx, platform.as_ref(), MSG_SESSION_EXPIRED);
        g.expire();
        assert_eq!(platform.count(|e| matches!(e, PlatformEvent::Redirect { .. })), 1);
    }
}
