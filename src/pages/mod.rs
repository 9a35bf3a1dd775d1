//! Role dashboards.
//!
//! Every server-rendered role page mounts exactly one [`RoleDashboard`]. A
//! dashboard registers its refresh responsibilities with the page's
//! [`RefreshScheduler`] and wires its action buttons and forms by delegation.
//! Everything a dashboard touches (session, client, scheduler, side effects)
//! comes in through the [`PageContext`].

use std::future::Future;
use std::rc::{Rc, Weak};

use gloo_timers::callback::Timeout;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event};

use crate::constants::TIMELINE_BADGE_MS;
use crate::dom_utils;
use crate::error::ApiError;
use crate::network::api_client::LocalFuture;
use crate::network::envelope::DEFAULT_REJECTION;
use crate::network::ApiClient;
use crate::platform::Platform;
use crate::scheduling::{CancelToken, CycleResult, RefreshScheduler, Responsibility};
use crate::state::AppContext;
use crate::toast::Severity;

pub mod admin_municipal;
pub mod coordination;
pub mod coordinator;
pub mod super_admin;
pub mod table_witness;
pub mod voting_jury;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    SuperAdmin,
    AdminMunicipal,
    CoordinadorElectoral,
    CoordinadorMunicipal,
    JuradoVotacion,
    TestigoMesa,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::SuperAdmin,
        Role::AdminMunicipal,
        Role::CoordinadorElectoral,
        Role::CoordinadorMunicipal,
        Role::JuradoVotacion,
        Role::TestigoMesa,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::SuperAdmin => "super_admin",
            Role::AdminMunicipal => "admin_municipal",
            Role::CoordinadorElectoral => "coordinador_electoral",
            Role::CoordinadorMunicipal => "coordinador_municipal",
            Role::JuradoVotacion => "jurado_votacion",
            Role::TestigoMesa => "testigo_mesa",
        }
    }

    /// Accepts both `super_admin` and the CSS spelling `super-admin`.
    pub fn parse(s: &str) -> Option<Self> {
        let key = s.trim().to_ascii_lowercase().replace('-', "_");
        Role::ALL.into_iter().find(|r| r.as_str() == key)
    }

    /// `<body data-role>` first, then the first role class on `<body>`.
    pub fn detect(body: &Element) -> Option<Self> {
        body.get_attribute("data-role")
            .as_deref()
            .and_then(Role::parse)
            .or_else(|| body.class_name().split_whitespace().find_map(Role::parse))
    }
}

/// A role's dashboard behaviour.
pub trait RoleDashboard {
    fn role(&self) -> Role;
    fn mount(&self, page: &Rc<PageContext>) -> Result<(), JsValue>;
}

pub fn dashboard_for(role: Role) -> Box<dyn RoleDashboard> {
    match role {
        Role::SuperAdmin => Box::new(super_admin::SuperAdminDashboard),
        Role::AdminMunicipal => Box::new(admin_municipal::MunicipalDashboard),
        Role::CoordinadorElectoral => Box::new(coordinator::CoordinatorDashboard),
        Role::CoordinadorMunicipal => Box::new(coordination::CoordinationDashboard),
        Role::JuradoVotacion => Box::new(voting_jury::VotingJuryDashboard),
        Role::TestigoMesa => Box::new(table_witness::TableWitnessDashboard),
    }
}

/// Everything a mounted dashboard needs from the page.
pub struct PageContext {
    pub document: Document,
    pub api: Rc<ApiClient>,
    pub scheduler: Rc<RefreshScheduler>,
    pub ctx: AppContext,
    pub platform: Rc<dyn Platform>,
}

impl PageContext {
    pub fn new(
        document: Document,
        api: Rc<ApiClient>,
        scheduler: Rc<RefreshScheduler>,
        platform: Rc<dyn Platform>,
    ) -> Rc<Self> {
        let ctx = api.context().clone();
        Rc::new(Self {
            document,
            api,
            scheduler,
            ctx,
            platform,
        })
    }

    /// Register a periodic refresh and run it once right away.
    pub fn refresh_every<F, Fut>(self: &Rc<Self>, responsibility: Responsibility, period_ms: u32, render: F)
    where
        F: Fn(Rc<PageContext>, CancelToken) -> Fut + 'static,
        Fut: Future<Output = CycleResult> + 'static,
    {
        self.scheduler.register(responsibility, period_ms, cycle(self, render));
        self.scheduler.trigger_now(responsibility);
    }

    pub fn notify(&self, message: &str, severity: Severity) {
        self.platform.notify(message, severity, None);
    }

    /// Native confirmation dialog. A missing window counts as "cancel".
    pub fn confirm(&self, message: &str) -> bool {
        web_sys::window()
            .and_then(|w| w.confirm_with_message(message).ok())
            .unwrap_or(false)
    }

    /// Run a user action on the event loop. A failure becomes a danger
    /// notification built from the server's message or `fallback`.
    pub fn spawn_action<Fut>(self: &Rc<Self>, fallback: &'static str, action: Fut)
    where
        Fut: Future<Output = Result<(), ApiError>> + 'static,
    {
        let page = Rc::downgrade(self);
        spawn_local(async move {
            if let Err(e) = action.await {
                log::warn!("{}: {}", fallback, e);
                if let (Some(page), Some(message)) = (page.upgrade(), failure_message(&e, fallback)) {
                    page.notify(&message, Severity::Danger);
                }
            }
        });
    }
}

/// Adapt an async render function into a scheduler cycle. The cycle holds the
/// page weakly; once the page is gone it completes without doing anything.
pub fn cycle<F, Fut>(page: &Rc<PageContext>, render: F) -> impl Fn(CancelToken) -> LocalFuture<'static, CycleResult> + 'static
where
    F: Fn(Rc<PageContext>, CancelToken) -> Fut + 'static,
    Fut: Future<Output = CycleResult> + 'static,
{
    let page: Weak<PageContext> = Rc::downgrade(page);
    move |cancel: CancelToken| -> LocalFuture<'static, CycleResult> {
        match page.upgrade() {
            Some(page) => Box::pin(render(page, cancel)),
            None => Box::pin(async { Ok(()) }),
        }
    }
}

/// Notification text for a failed action; `None` for 401s, which already
/// produced the session-expired notification.
pub fn failure_message(err: &ApiError, fallback: &str) -> Option<String> {
    match err {
        ApiError::Unauthorized => None,
        ApiError::Rejected(message) if message != DEFAULT_REJECTION => Some(message.clone()),
        ApiError::Http { message, .. } if !message.is_empty() => Some(message.clone()),
        _ => Some(fallback.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Event wiring
// ---------------------------------------------------------------------------

/// Delegated click handling for every element carrying `attr`, including
/// ones rendered after mount. The handler receives the attribute value.
pub fn on_click_attr<F>(document: &Document, attr: &'static str, handler: F) -> Result<(), JsValue>
where
    F: Fn(&str, &Element) + 'static,
{
    let selector = format!("[{}]", attr);
    let cb = Closure::wrap(Box::new(move |e: Event| {
        let Some(target) = e.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
            return;
        };
        let Ok(Some(el)) = target.closest(&selector) else {
            return;
        };
        if let Some(value) = el.get_attribute(attr) {
            e.prevent_default();
            handler(&value, &el);
        }
    }) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

/// Intercept submission of the form `form_id`, when the page has it.
pub fn on_submit<F>(document: &Document, form_id: &str, handler: F) -> Result<(), JsValue>
where
    F: Fn(&Element) + 'static,
{
    let Some(form) = document.get_element_by_id(form_id) else {
        return Ok(());
    };
    let target = form.clone();
    let cb = Closure::wrap(Box::new(move |e: Event| {
        e.prevent_default();
        handler(&target);
    }) as Box<dyn FnMut(_)>);
    form.add_event_listener_with_callback("submit", cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

/// Plain listener on one element.
pub fn on_event<F>(el: &Element, event: &str, handler: F) -> Result<(), JsValue>
where
    F: Fn(&Event) + 'static,
{
    let cb = Closure::wrap(Box::new(move |e: Event| handler(&e)) as Box<dyn FnMut(_)>);
    el.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())?;
    cb.forget();
    Ok(())
}

pub fn navigate(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.location().set_href(path) {
            log::error!("navigation to {} failed: {:?}", path, e);
        }
    }
}

pub fn reload() {
    if let Some(window) = web_sys::window() {
        if let Err(e) = window.location().reload() {
            log::error!("reload failed: {:?}", e);
        }
    }
}

/// Reset a `<form>` after a successful submission.
pub fn reset_form(form: &Element) {
    if let Some(form) = form.dyn_ref::<web_sys::HtmlFormElement>() {
        form.reset();
    }
}

// ---------------------------------------------------------------------------
// Activity timelines
// ---------------------------------------------------------------------------

/// Shape of a role's activity timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeline {
    pub container: &'static str,
    pub item_class: &'static str,
    pub marker_class: &'static str,
    pub content_class: &'static str,
    pub cap: u32,
    /// Show a "Nuevo" badge that clears itself after a few seconds.
    pub new_badge: bool,
}

/// Prepend an entry and drop the oldest ones past the cap.
pub fn push_timeline(document: &Document, timeline: &Timeline, title: &str, time: &str) -> Result<(), JsValue> {
    let Some(container) = document.query_selector(timeline.container)? else {
        return Ok(());
    };

    let item = dom_utils::create(document, "div", Some(timeline.item_class))?;
    item.append_child(&dom_utils::create(
        document,
        "div",
        Some(&format!("{} bg-success", timeline.marker_class)),
    )?.into())?;
    let content = dom_utils::create(document, "div", Some(timeline.content_class))?;
    let text = dom_utils::create(document, "div", None)?;
    text.append_child(&dom_utils::create_text(document, "h6", Some("mb-1"), title)?.into())?;
    text.append_child(&dom_utils::create_text(document, "small", Some("text-muted"), time)?.into())?;
    content.append_child(&text)?;
    if timeline.new_badge {
        let badge = dom_utils::create_text(document, "span", Some("badge bg-primary"), "Nuevo")?;
        content.append_child(&badge)?;
        Timeout::new(TIMELINE_BADGE_MS, move || badge.remove()).forget();
    }
    item.append_child(&content)?;

    container.insert_before(&item, container.first_child().as_ref())?;
    dom_utils::cap_children(&container, timeline.cap);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_parse_from_data_attribute_or_class_spelling() {
        assert_eq!(Role::parse("jurado_votacion"), Some(Role::JuradoVotacion));
        assert_eq!(Role::parse("super-admin"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse(" Testigo_Mesa "), Some(Role::TestigoMesa));
        assert_eq!(Role::parse("card"), None);
    }

    #[test]
    fn every_role_round_trips_through_its_name() {
        for role in Role::ALL {
            assert_eq!(Role::parse(role.as_str()), Some(role));
            assert_eq!(dashboard_for(role).role(), role);
        }
    }

    #[test]
    fn failure_message_prefers_server_text() {
        let fallback = "Error al registrar el voto";
        assert_eq!(
            failure_message(&ApiError::Rejected("Mesa cerrada".into()), fallback).as_deref(),
            Some("Mesa cerrada")
        );
        assert_eq!(
            failure_message(&ApiError::Rejected(DEFAULT_REJECTION.into()), fallback).as_deref(),
            Some(fallback)
        );
        assert_eq!(
            failure_message(&ApiError::Network("offline".into()), fallback).as_deref(),
            Some(fallback)
        );
        assert_eq!(failure_message(&ApiError::Unauthorized, fallback), None);
    }
}
