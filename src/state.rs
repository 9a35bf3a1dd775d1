//! Page-wide application context.
//!
//! The session (auth token, CSRF token, current user) is the only shared
//! mutable state of a dashboard page. Instead of a `thread_local!` singleton
//! it lives in an [`AppContext`] that the bootstrapper creates once and hands
//! to the API client, the refresh cycles and the inactivity guard.

use std::cell::RefCell;
use std::rc::Rc;

use crate::models::UserInfo;

/// Raw session data. Readers go through [`AppContext`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub token: Option<String>,
    pub csrf_token: Option<String>,
    pub current_user: Option<UserInfo>,
    /// Set once the session has been invalidated (401 or idle timeout) and
    /// cleared again by an explicit login.
    pub expired: bool,
}

impl Session {
    pub fn new(token: Option<String>, csrf_token: Option<String>) -> Self {
        Self {
            token: token.filter(|t| !t.is_empty()),
            csrf_token: csrf_token.filter(|t| !t.is_empty()),
            current_user: None,
            expired: false,
        }
    }
}

/// Cheap-to-clone handle onto the page session.
#[derive(Debug, Clone, Default)]
pub struct AppContext {
    session: Rc<RefCell<Session>>,
}

impl AppContext {
    pub fn new(session: Session) -> Self {
        Self {
            session: Rc::new(RefCell::new(session)),
        }
    }

    pub fn token(&self) -> Option<String> {
        self.session.borrow().token.clone()
    }

    pub fn csrf_token(&self) -> Option<String> {
        self.session.borrow().csrf_token.clone()
    }

    pub fn current_user(&self) -> Option<UserInfo> {
        self.session.borrow().current_user.clone()
    }

    pub fn is_expired(&self) -> bool {
        self.session.borrow().expired
    }

    pub fn set_current_user(&self, user: Option<UserInfo>) {
        self.session.borrow_mut().current_user = user;
    }

    /// Explicit login: stores the token and re-arms the expiry latch.
    pub fn login(&self, token: String) {
        let mut session = self.session.borrow_mut();
        session.token = Some(token);
        session.expired = false;
    }

    /// Explicit logout. Does not touch the expiry latch.
    pub fn logout(&self) {
        let mut session = self.session.borrow_mut();
        session.token = None;
        session.current_user = None;
    }

    /// Drop the session after an authentication failure.
    ///
    /// Returns `true` only for the first call since the last login, so the
    /// caller runs its one-shot side effects (notification, redirect) exactly
    /// once no matter how many in-flight requests come back with 401.
    pub fn invalidate_session(&self) -> bool {
        let mut session = self.session.borrow_mut();
        if session.expired {
            return false;
        }
        session.expired = true;
        session.token = None;
        session.current_user = None;
        true
    }

    #[cfg(test)]
    pub(crate) fn snapshot(&self) -> Session {
        self.session.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tokens_are_treated_as_absent() {
        let session = Session::new(Some(String::new()), Some("csrf".into()));
        assert_eq!(session.token, None);
        assert_eq!(session.csrf_token.as_deref(), Some("csrf"));
    }

    #[test]
    fn invalidate_fires_once_until_next_login() {
        let ctx = AppContext::new(Session::new(Some("jwt".into()), None));
        assert!(ctx.invalidate_session());
        assert!(!ctx.invalidate_session());
        assert!(!ctx.invalidate_session());
        assert_eq!(ctx.token(), None);
        assert!(ctx.is_expired());

        ctx.login("fresh".into());
        assert!(!ctx.is_expired());
        assert_eq!(ctx.token().as_deref(), Some("fresh"));
        assert!(ctx.invalidate_session());
    }

    #[test]
    fn logout_keeps_the_expiry_latch_untouched() {
        let ctx = AppContext::new(Session::new(Some("jwt".into()), None));
        ctx.logout();
        assert_eq!(ctx.token(), None);
        assert!(!ctx.is_expired());
        assert!(ctx.invalidate_session());
    }

    #[test]
    fn clones_share_the_same_session() {
        let ctx = AppContext::new(Session::new(Some("jwt".into()), Some("c".into())));
        let other = ctx.clone();
        other.invalidate_session();
        assert_eq!(ctx.snapshot().token, None);
        assert_eq!(ctx.csrf_token().as_deref(), Some("c"));
    }
}
