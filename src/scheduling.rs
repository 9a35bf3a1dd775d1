//! Refresh scheduling: one repeating timer per dashboard responsibility.
//!
//! Each registered [`Responsibility`] owns a [`RefreshSlot`] with a
//! two-state machine:
//!
//! • `Idle` – a tick starts a fetch-and-render cycle
//! • `Fetching` – a tick is dropped
//!
//! The slot returns to `Idle` when the cycle settles, success or failure.
//! There is no backoff; the next tick simply tries again. Every cycle gets a
//! [`CancelToken`] so a fetch that resolves after teardown leaves the DOM
//! alone.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use gloo_timers::callback::Interval;

use crate::error::RefreshError;
use crate::network::api_client::LocalFuture;
use crate::platform::Platform;
use crate::toast::Severity;

/// What a timer slot refreshes. One slot per responsibility per page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Responsibility {
    Metrics,
    Charts,
    Alerts,
    Tasks,
    Notifications,
    Stats,
    TableStatus,
    Observations,
    Dashboard,
    Performance,
    Database,
}

impl Responsibility {
    pub fn name(self) -> &'static str {
        match self {
            Responsibility::Metrics => "metrics",
            Responsibility::Charts => "charts",
            Responsibility::Alerts => "alerts",
            Responsibility::Tasks => "tasks",
            Responsibility::Notifications => "notifications",
            Responsibility::Stats => "stats",
            Responsibility::TableStatus => "table-status",
            Responsibility::Observations => "observations",
            Responsibility::Dashboard => "dashboard",
            Responsibility::Performance => "performance",
            Responsibility::Database => "database",
        }
    }
}

impl fmt::Display for Responsibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    Fetching,
}

/// Shared "this view is gone" flag handed to every cycle.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Rc<Cell<bool>>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.get()
    }
}

pub type CycleResult = Result<(), RefreshError>;

/// Produces one fetch-and-render cycle. Must not touch the DOM before its
/// fetch has completed and been decoded.
pub type CycleFn = Rc<dyn Fn(CancelToken) -> LocalFuture<'static, CycleResult>>;

/// Resets the slot to `Idle` when the cycle future completes or is dropped.
struct FetchGuard(Rc<Cell<CycleState>>);

impl Drop for FetchGuard {
    fn drop(&mut self) {
        self.0.set(CycleState::Idle);
    }
}

pub struct RefreshSlot {
    responsibility: Responsibility,
    period_ms: u32,
    state: Rc<Cell<CycleState>>,
    cancel: CancelToken,
    /// Set after a failure has been surfaced; cleared by the next success so
    /// a failing endpoint produces one notification per outage, not per tick.
    failing: Rc<Cell<bool>>,
    cycle: CycleFn,
    platform: Rc<dyn Platform>,
}

impl RefreshSlot {
    pub fn responsibility(&self) -> Responsibility {
        self.responsibility
    }

    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    pub fn state(&self) -> CycleState {
        self.state.get()
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Start a cycle if the slot is idle and live.
    ///
    /// Returns the cycle future to drive, or `None` when the tick is dropped.
    pub fn fire(&self) -> Option<LocalFuture<'static, ()>> {
        if self.cancel.is_cancelled() {
            return None;
        }
        if self.state.get() == CycleState::Fetching {
            debug_log!("{} tick dropped: previous cycle still in flight", self.responsibility);
            return None;
        }

        self.state.set(CycleState::Fetching);
        let guard = FetchGuard(self.state.clone());
        let cycle = (self.cycle)(self.cancel.clone());
        let responsibility = self.responsibility;
        let cancel = self.cancel.clone();
        let failing = self.failing.clone();
        let platform = self.platform.clone();

        Some(Box::pin(async move {
            let _guard = guard;
            match cycle.await {
                Ok(()) => {
                    failing.set(false);
                    debug_log!("{} refreshed", responsibility);
                }
                Err(_) if cancel.is_cancelled() => {}
                // Session expiry already notified the user.
                Err(e) if e.is_unauthorized() => {}
                Err(e) => {
                    log::error!("{} refresh failed: {}", responsibility, e);
                    if !failing.replace(true) {
                        let message = match &e {
                            RefreshError::Api(api) => api.user_message(),
                            RefreshError::Render(_) => format!("Error actualizando {}", responsibility),
                        };
                        platform.notify(&message, Severity::Danger, None);
                    }
                }
            }
        }))
    }
}

struct SlotEntry {
    slot: Rc<RefreshSlot>,
    // Dropping the interval clears the browser timer.
    _timer: Option<Interval>,
}

/// Owns every refresh timer of a page.
pub struct RefreshScheduler {
    slots: RefCell<HashMap<Responsibility, SlotEntry>>,
    platform: Rc<dyn Platform>,
}

impl RefreshScheduler {
    pub fn new(platform: Rc<dyn Platform>) -> Self {
        Self {
            slots: RefCell::new(HashMap::new()),
            platform,
        }
    }

    /// Register `cycle` to run every `period_ms`.
    ///
    /// An existing slot for the same responsibility is cancelled and
    /// replaced. The new slot shares the old slot's state, so a cycle still
    /// in flight keeps blocking ticks until it settles.
    pub fn register<F>(&self, responsibility: Responsibility, period_ms: u32, cycle: F) -> Rc<RefreshSlot>
    where
        F: Fn(CancelToken) -> LocalFuture<'static, CycleResult> + 'static,
    {
        let previous = self.slots.borrow_mut().remove(&responsibility);
        let state = match previous {
            Some(entry) => {
                log::info!("replacing {} refresh slot", responsibility);
                entry.slot.cancel.cancel();
                entry.slot.state.clone()
            }
            None => Rc::new(Cell::new(CycleState::Idle)),
        };

        let slot = Rc::new(RefreshSlot {
            responsibility,
            period_ms,
            state,
            cancel: CancelToken::new(),
            failing: Rc::new(Cell::new(false)),
            cycle: Rc::new(cycle),
            platform: self.platform.clone(),
        });

        let timer = arm(&slot);
        self.slots
            .borrow_mut()
            .insert(responsibility, SlotEntry { slot: slot.clone(), _timer: timer });
        debug_log!("registered {} every {} ms", responsibility, period_ms);
        slot
    }

    pub fn slot(&self, responsibility: Responsibility) -> Option<Rc<RefreshSlot>> {
        self.slots.borrow().get(&responsibility).map(|e| e.slot.clone())
    }

    pub fn is_registered(&self, responsibility: Responsibility) -> bool {
        self.slots.borrow().contains_key(&responsibility)
    }

    pub fn state(&self, responsibility: Responsibility) -> Option<CycleState> {
        self.slots.borrow().get(&responsibility).map(|e| e.slot.state())
    }

    pub fn registered(&self) -> Vec<Responsibility> {
        self.slots.borrow().keys().copied().collect()
    }

    /// Start a cycle for `responsibility` under the usual gating and return
    /// it to the caller to await. `None` when unregistered or busy.
    pub fn fire(&self, responsibility: Responsibility) -> Option<LocalFuture<'static, ()>> {
        self.slot(responsibility)?.fire()
    }

    /// Out-of-band refresh (initial load, after a mutation), spawned on the
    /// event loop.
    pub fn trigger_now(&self, responsibility: Responsibility) -> bool {
        match self.fire(responsibility) {
            Some(cycle) => {
                wasm_bindgen_futures::spawn_local(cycle);
                true
            }
            None => false,
        }
    }

    pub fn cancel(&self, responsibility: Responsibility) {
        if let Some(entry) = self.slots.borrow_mut().remove(&responsibility) {
            entry.slot.cancel.cancel();
            debug_log!("cancelled {} refresh", responsibility);
        }
    }

    /// Page teardown: stop every timer and mark every cycle stale.
    pub fn cancel_all(&self) {
        let drained: Vec<SlotEntry> = self.slots.borrow_mut().drain().map(|(_, e)| e).collect();
        if !drained.is_empty() {
            log::info!("stopping {} refresh timers", drained.len());
        }
        for entry in drained {
            entry.slot.cancel.cancel();
        }
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.cancel_all();
    }
}

/// Browser timers only exist on wasm; native builds (unit tests) drive slots
/// by hand through [`RefreshSlot::fire`].
#[cfg(target_arch = "wasm32")]
fn arm(slot: &Rc<RefreshSlot>) -> Option<Interval> {
    let weak = Rc::downgrade(slot);
    Some(Interval::new(slot.period_ms, move || {
        if let Some(slot) = weak.upgrade() {
            if let Some(cycle) = slot.fire() {
                wasm_bindgen_futures::spawn_local(cycle);
            }
        }
    }))
}

#[cfg(not(target_arch = "wasm32"))]
fn arm(_slot: &Rc<RefreshSlot>) -> Option<Interval> {
    None
}
