//! Transient notifications.
//!
//! Creates a `#toast-root` container once per page and prepends one toast
//! per call. Each toast owns its own removal timer and a dismiss button;
//! removal is idempotent so the timer firing after a manual dismiss is a no-op.

use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::{Document, Element};

use crate::constants::{NOTIFY_CRITICAL_MS, NOTIFY_DEFAULT_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Danger,
    /// A danger toast that stays up longer (critical system alerts).
    Critical,
}

impl Severity {
    pub fn css_class(self) -> &'static str {
        match self {
            Severity::Success => "toast-success",
            Severity::Info => "toast-info",
            Severity::Warning => "toast-warning",
            Severity::Danger | Severity::Critical => "toast-danger",
        }
    }

    pub fn default_duration_ms(self) -> u32 {
        match self {
            Severity::Critical => NOTIFY_CRITICAL_MS,
            _ => NOTIFY_DEFAULT_MS,
        }
    }

    /// Map the `type` string used by server-side alert payloads.
    pub fn from_alert_kind(kind: &str) -> Self {
        match kind {
            "success" => Severity::Success,
            "warning" => Severity::Warning,
            "danger" | "error" => Severity::Danger,
            "critical" => Severity::Critical,
            _ => Severity::Info,
        }
    }
}

struct ToastInner {
    id: String,
    element: Element,
    removed: Cell<bool>,
}

impl ToastInner {
    fn remove(&self) {
        if self.removed.replace(true) {
            return;
        }
        self.element.remove();
    }
}

/// Handle onto a displayed toast. Dropping it does not remove the toast.
#[derive(Clone)]
pub struct ToastHandle {
    inner: Rc<ToastInner>,
}

impl ToastHandle {
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    pub fn element(&self) -> &Element {
        &self.inner.element
    }

    pub fn dismiss(&self) {
        self.inner.remove();
    }

    pub fn is_dismissed(&self) -> bool {
        self.inner.removed.get()
    }
}

/// Show a toast. `duration_ms` falls back to the severity default.
/// Returns `None` when there is no document to render into.
pub fn notify(message: &str, severity: Severity, duration_ms: Option<u32>) -> Option<ToastHandle> {
    let document = web_sys::window()?.document()?;
    match build(&document, message, severity, duration_ms) {
        Ok(handle) => Some(handle),
        Err(e) => {
            log::error!("failed to render notification: {:?}", e);
            None
        }
    }
}

fn build(
    document: &Document,
    message: &str,
    severity: Severity,
    duration_ms: Option<u32>,
) -> Result<ToastHandle, JsValue> {
    ensure_styles(document)?;
    let root = ensure_root(document)?;

    let toast = document.create_element("div")?;
    toast.set_class_name(&format!("toast {}", severity.css_class()));
    toast.set_attribute("role", "alert")?;

    let id = format!("toast-{}", uuid::Uuid::new_v4());
    toast.set_id(&id);

    let text = document.create_element("span")?;
    text.set_class_name("toast-message");
    text.set_text_content(Some(message));
    toast.append_child(&text)?;

    let close = document.create_element("button")?;
    close.set_class_name("toast-close");
    close.set_attribute("type", "button")?;
    close.set_attribute("aria-label", "Cerrar")?;
    close.set_text_content(Some("×"));
    toast.append_child(&close)?;

    // Prepend so newest appears on top.
    root.prepend_with_node_1(&toast)?;

    let inner = Rc::new(ToastInner {
        id,
        element: toast,
        removed: Cell::new(false),
    });

    {
        let inner = inner.clone();
        let cb = Closure::wrap(Box::new(move |_e: web_sys::MouseEvent| {
            inner.remove();
        }) as Box<dyn FnMut(_)>);
        close.add_event_listener_with_callback("click", cb.as_ref().unchecked_ref())?;
        cb.forget();
    }

    let duration = duration_ms.unwrap_or_else(|| severity.default_duration_ms());
    let timer_inner = inner.clone();
    Timeout::new(duration, move || timer_inner.remove()).forget();

    Ok(ToastHandle { inner })
}

fn ensure_root(document: &Document) -> Result<Element, JsValue> {
    if let Some(el) = document.get_element_by_id("toast-root") {
        return Ok(el);
    }
    let root = document.create_element("div")?;
    root.set_id("toast-root");
    root.set_class_name("toast-root");
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("document has no body"))?;
    body.append_child(&root)?;
    Ok(root)
}

fn ensure_styles(document: &Document) -> Result<(), JsValue> {
    if document.get_element_by_id("toast-styles").is_some() {
        return Ok(());
    }

    let css = "
.toast-root{position:fixed;top:20px;right:20px;display:flex;flex-direction:column;gap:8px;z-index:9999;min-width:300px}
.toast{display:flex;align-items:center;justify-content:space-between;padding:10px 16px;border-radius:4px;color:#fff;box-shadow:0 2px 4px rgba(0,0,0,.15)}
.toast-success{background:#198754}
.toast-info{background:#0d6efd}
.toast-warning{background:#ffc107;color:#212529}
.toast-danger{background:#dc3545}
.toast-close{background:none;border:0;color:inherit;font-size:18px;margin-left:12px;cursor:pointer}
.metric-pulse{transition:transform .2s ease}
";

    let style = document.create_element("style")?;
    style.set_id("toast-styles");
    style.set_text_content(Some(css));
    if let Some(head) = document.query_selector("head")? {
        head.append_child(&style)?;
    } else if let Some(body) = document.body() {
        body.append_child(&style)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn critical_notifications_stay_longer() {
        assert_eq!(Severity::Info.default_duration_ms(), 5_000);
        assert_eq!(Severity::Critical.default_duration_ms(), 10_000);
        assert_eq!(Severity::Critical.css_class(), Severity::Danger.css_class());
    }

    #[test]
    fn alert_kinds_map_to_severities() {
        assert_eq!(Severity::from_alert_kind("warning"), Severity::Warning);
        assert_eq!(Severity::from_alert_kind("error"), Severity::Danger);
        assert_eq!(Severity::from_alert_kind("whatever"), Severity::Info);
    }
}
