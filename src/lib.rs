use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, HtmlFormElement};

#[macro_use]
mod macros;

pub mod constants;
pub mod dom_utils;
pub mod error;
pub mod inactivity;
pub mod models;
pub mod network;
pub mod pages;
pub mod platform;
pub mod render;
pub mod scheduling;
pub mod state;
pub mod storage;
pub mod toast;
pub mod utils;
pub mod validation;

use constants::{CSRF_META_NAME, IDLE_WINDOW_MS};
use inactivity::InactivityGuard;
use models::UserInfo;
use network::ApiClient;
use pages::{PageContext, Role};
use platform::{BrowserPlatform, Platform};
use scheduling::RefreshScheduler;
use state::{AppContext, Session};

thread_local! {
    // The mounted page lives as long as the document does.
    static PAGE: RefCell<Option<Rc<PageContext>>> = RefCell::new(None);
    static GUARD: RefCell<Option<Rc<InactivityGuard>>> = RefCell::new(None);
}

// Main entry point for the WASM application
#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    let level = if cfg!(debug_assertions) { log::Level::Debug } else { log::Level::Info };
    wasm_logger::init(wasm_logger::Config::new(level));

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let platform: Rc<dyn Platform> = Rc::new(BrowserPlatform);
    let ctx = AppContext::new(Session::new(storage::load_token(), csrf_token(&document)));
    let api = Rc::new(ApiClient::browser(ctx.clone(), network::current_config()));

    let auth = api.clone();
    let doc = document.clone();
    spawn_local(async move {
        if let Some(user) = auth.check_auth_status().await {
            fill_user_info(&doc, &user);
        }
    });

    let guard = InactivityGuard::new(ctx, platform.clone(), IDLE_WINDOW_MS);
    guard.install(&document)?;
    GUARD.with(|g| *g.borrow_mut() = Some(guard));

    install_confirm_guard(&document)?;
    install_auto_submit(&document)?;
    install_submit_validation(&document)?;
    validation::install_live_validation(&document)?;

    let scheduler = Rc::new(RefreshScheduler::new(platform.clone()));
    install_teardown(&scheduler)?;

    let role = document.body().as_ref().and_then(|b| Role::detect(b));
    let Some(role) = role else {
        log::info!("no dashboard role on this page; common handlers only");
        return Ok(());
    };

    let page = PageContext::new(document, api, scheduler, platform);
    pages::dashboard_for(role).mount(&page)?;
    log::info!("{} dashboard mounted", role.as_str());
    PAGE.with(|p| *p.borrow_mut() = Some(page));
    Ok(())
}

fn csrf_token(document: &Document) -> Option<String> {
    document
        .query_selector(&format!("meta[name=\"{}\"]", CSRF_META_NAME))
        .ok()
        .flatten()
        .and_then(|meta| meta.get_attribute("content"))
        .filter(|t| !t.is_empty())
}

/// `[data-user-info="field"]` elements show the matching user field. Missing
/// fields keep the server-rendered text.
pub fn fill_user_info(document: &Document, user: &UserInfo) {
    for el in dom_utils::query_all_doc(document, "[data-user-info]") {
        let Some(value) = el.get_attribute("data-user-info").and_then(|name| user.field(&name)) else {
            continue;
        };
        el.set_text_content(Some(&value));
    }
}

fn event_element(e: &Event) -> Option<Element> {
    e.target().and_then(|t| t.dyn_into::<Element>().ok())
}

fn listen(document: &Document, event: &str, capture: bool, handler: impl Fn(&Event) + 'static) -> Result<(), JsValue> {
    let cb = Closure::wrap(Box::new(move |e: Event| handler(&e)) as Box<dyn FnMut(_)>);
    document.add_event_listener_with_callback_and_bool(event, cb.as_ref().unchecked_ref(), capture)?;
    cb.forget();
    Ok(())
}

/// Destructive links and buttons carry `data-confirm="message"`.
fn install_confirm_guard(document: &Document) -> Result<(), JsValue> {
    listen(document, "click", true, |e| {
        let Some(el) = event_element(e).and_then(|t| t.closest("[data-confirm]").ok().flatten()) else {
            return;
        };
        let message = el.get_attribute("data-confirm").unwrap_or_default();
        let confirmed = web_sys::window()
            .and_then(|w| w.confirm_with_message(&message).ok())
            .unwrap_or(false);
        if !confirmed {
            e.prevent_default();
            e.stop_immediate_propagation();
        }
    })
}

fn install_auto_submit(document: &Document) -> Result<(), JsValue> {
    listen(document, "change", false, |e| {
        let Some(el) = event_element(e) else {
            return;
        };
        if !el.matches("[data-auto-submit]").unwrap_or(false) {
            return;
        }
        let form = el
            .closest("form")
            .ok()
            .flatten()
            .and_then(|f| f.dyn_into::<HtmlFormElement>().ok());
        if let Some(form) = form {
            if let Err(err) = form.submit() {
                log::warn!("auto-submit failed: {:?}", err);
            }
        }
    })
}

/// Forms with `[data-validate]` controls do not submit while any of them
/// fails. Runs in the capture phase, ahead of page submit handlers.
fn install_submit_validation(document: &Document) -> Result<(), JsValue> {
    let doc = document.clone();
    listen(document, "submit", true, move |e| {
        let Some(form) = event_element(e) else {
            return;
        };
        match validation::validate_form(&doc, &form) {
            Ok(true) => {}
            Ok(false) => {
                debug_log!("submit blocked by field validation");
                e.prevent_default();
                e.stop_immediate_propagation();
            }
            Err(err) => log::warn!("form validation failed: {:?}", err),
        }
    })
}

fn install_teardown(scheduler: &Rc<RefreshScheduler>) -> Result<(), JsValue> {
    let Some(window) = web_sys::window() else {
        return Ok(());
    };
    let scheduler = Rc::downgrade(scheduler);
    let cb = Closure::wrap(Box::new(move |_e: Event| {
        if let Some(scheduler) = scheduler.upgrade() {
            debug_log!("page hidden; cancelling refresh timers");
            scheduler.cancel_all();
        }
    }) as Box<dyn FnMut(_)>);
    for event in ["pagehide", "beforeunload"] {
        window.add_event_listener_with_callback(event, cb.as_ref().unchecked_ref())?;
    }
    cb.forget();
    Ok(())
}
