//! Page side effects behind a trait.
//!
//! The API client and the inactivity guard only need three things from the
//! browser when a session ends. Routing them through [`Platform`] keeps both
//! drivable from native tests with [`RecordingPlatform`].

use gloo_timers::callback::Timeout;

use crate::constants::{LOGIN_PATH, REDIRECT_DELAY_MS};
use crate::state::AppContext;
use crate::storage;
use crate::toast::{self, Severity};

pub trait Platform {
    fn clear_persisted_token(&self);
    fn notify(&self, message: &str, severity: Severity, duration_ms: Option<u32>);
    fn schedule_redirect(&self, path: &str, delay_ms: u32);
}

/// The real page: `localStorage`, the toast stack and `window.location`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserPlatform;

impl Platform for BrowserPlatform {
    fn clear_persisted_token(&self) {
        storage::clear_token();
    }

    fn notify(&self, message: &str, severity: Severity, duration_ms: Option<u32>) {
        toast::notify(message, severity, duration_ms);
    }

    fn schedule_redirect(&self, path: &str, delay_ms: u32) {
        let path = path.to_string();
        Timeout::new(delay_ms, move || {
            if let Some(window) = web_sys::window() {
                if let Err(e) = window.location().set_href(&path) {
                    log::error!("redirect to {} failed: {:?}", path, e);
                }
            }
        })
        .forget();
    }
}

/// End the session with a user-facing reason.
///
/// Goes through the session latch, so only the first caller since the last
/// login clears the token, shows `message` and schedules the login redirect.
/// Returns whether this call performed the side effects.
pub fn expire_session(ctx: &AppContext, platform: &dyn Platform, message: &str) -> bool {
    if !ctx.invalidate_session() {
        debug_log!("session already expired; skipping side effects");
        return false;
    }
    log::warn!("session ended: {}", message);
    platform.clear_persisted_token();
    platform.notify(message, Severity::Warning, None);
    platform.schedule_redirect(LOGIN_PATH, REDIRECT_DELAY_MS);
    true
}

/// Side effect captured by [`RecordingPlatform`].
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformEvent {
    TokenCleared,
    Notified {
        message: String,
        severity: Severity,
        duration_ms: Option<u32>,
    },
    Redirect {
        path: String,
        delay_ms: u32,
    },
}

/// Test double that records every side effect in order.
#[derive(Debug, Default)]
pub struct RecordingPlatform {
    events: std::cell::RefCell<Vec<PlatformEvent>>,
}

impl RecordingPlatform {
    pub fn events(&self) -> Vec<PlatformEvent> {
        self.events.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&PlatformEvent) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| pred(e)).count()
    }
}

impl Platform for RecordingPlatform {
    fn clear_persisted_token(&self) {
        self.events.borrow_mut().push(PlatformEvent::TokenCleared);
    }

    fn notify(&self, message: &str, severity: Severity, duration_ms: Option<u32>) {
        self.events.borrow_mut().push(PlatformEvent::Notified {
            message: message.to_string(),
            severity,
            duration_ms,
        });
    }

    fn schedule_redirect(&self, path: &str, delay_ms: u32) {
        self.events.borrow_mut().push(PlatformEvent::Redirect {
            path: path.to_string(),
            delay_ms,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::Session;

    #[test]
    fn expire_session_runs_side_effects_once() {
        let ctx = AppContext::new(Session::new(Some("jwt".into()), None));
        let platform = RecordingPlatform::default();

        assert!(expire_session(&ctx, &platform, "bye"));
        assert!(!expire_session(&ctx, &platform, "bye"));

        assert_eq!(
            platform.events(),
            vec![
                PlatformEvent::TokenCleared,
                PlatformEvent::Notified {
                    message: "bye".into(),
                    severity: Severity::Warning,
                    duration_ms: None,
                },
                PlatformEvent::Redirect {
                    path: LOGIN_PATH.into(),
                    delay_ms: REDIRECT_DELAY_MS,
                },
            ]
        );
        assert_eq!(ctx.token(), None);
    }
}
