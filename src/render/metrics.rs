//! Metric cards bound through `data-*` attributes.
//!
//! A card is looked up at render time (`[data-metric="key"]`), never cached,
//! so template re-renders between ticks are harmless. The text is only
//! replaced when the normalized value differs, and a change gets a short
//! scale pulse.

use gloo_timers::callback::Timeout;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use crate::constants::{CSS_METRIC_PULSE, METRIC_CHANGE_MS, METRIC_PULSE_MS};

/// Trim and drop one trailing `%` so `"45%"` and `"45"` compare equal.
pub fn normalize_metric_text(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed.strip_suffix('%').map(str::trim_end).unwrap_or(trimmed)
}

pub fn metric_changed(current: &str, new: &str) -> bool {
    normalize_metric_text(current) != normalize_metric_text(new)
}

/// A `data-<attr>="<key>"` binding between a payload field and a card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricBinding {
    pub attr: &'static str,
    pub key: String,
}

impl MetricBinding {
    pub fn new(attr: &'static str, key: impl Into<String>) -> Self {
        Self { attr, key: key.into() }
    }

    pub fn selector(&self) -> String {
        format!("[data-{}=\"{}\"]", self.attr, self.key.replace('"', "\\\""))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUpdate {
    /// No bound element on the page.
    Missing,
    Unchanged,
    Updated,
}

/// Update the card bound to `key` in the whole document.
pub fn update_metric(document: &Document, attr: &'static str, key: &str, value: &str) -> Result<MetricUpdate, JsValue> {
    let binding = MetricBinding::new(attr, key);
    match document.query_selector(&binding.selector())? {
        Some(el) => update_element(&el, value),
        None => Ok(MetricUpdate::Missing),
    }
}

/// Same as [`update_metric`] but scoped below `root` (monitor panels).
pub fn update_metric_in(root: &Element, attr: &'static str, key: &str, value: &str) -> Result<MetricUpdate, JsValue> {
    let binding = MetricBinding::new(attr, key);
    match root.query_selector(&binding.selector())? {
        Some(el) => update_element(&el, value),
        None => Ok(MetricUpdate::Missing),
    }
}

/// Compare-and-replace on an element the caller already holds.
pub fn update_element(el: &Element, value: &str) -> Result<MetricUpdate, JsValue> {
    let current = el.text_content().unwrap_or_default();
    if !metric_changed(&current, value) {
        return Ok(MetricUpdate::Unchanged);
    }

    el.set_text_content(Some(value));
    pulse(el)?;
    Ok(MetricUpdate::Updated)
}

fn pulse(el: &Element) -> Result<(), JsValue> {
    el.class_list().add_1(CSS_METRIC_PULSE)?;
    if let Some(html) = el.dyn_ref::<HtmlElement>() {
        html.style().set_property("transform", "scale(1.1)")?;
    }

    let el = el.clone();
    Timeout::new(METRIC_PULSE_MS, move || {
        let _ = el.class_list().remove_1(CSS_METRIC_PULSE);
        if let Some(html) = el.dyn_ref::<HtmlElement>() {
            let _ = html.style().set_property("transform", "scale(1)");
        }
    })
    .forget();
    Ok(())
}

/// Signed numeric change between two card texts, when both parse and differ.
pub fn numeric_delta(current: &str, new: &str) -> Option<f64> {
    let a: f64 = normalize_metric_text(current).parse().ok()?;
    let b: f64 = normalize_metric_text(new).parse().ok()?;
    let delta = b - a;
    (delta != 0.0 && delta.is_finite()).then_some(delta)
}

/// Up/down indicator next to a changed card, replaced on every change and
/// removed after a few seconds.
pub fn show_metric_change(document: &Document, el: &Element, delta: f64) -> Result<(), JsValue> {
    let Some(card) = el.closest(".metric-card")? else {
        return Ok(());
    };
    if let Some(existing) = card.query_selector(".metric-change")? {
        existing.remove();
    }

    let (class, arrow) = if delta > 0.0 { ("positive", "up") } else { ("negative", "down") };
    let indicator = document.create_element("span")?;
    indicator.set_class_name(&format!("metric-change {}", class));
    let icon = document.create_element("i")?;
    icon.set_class_name(&format!("fas fa-arrow-{}", arrow));
    indicator.append_child(&icon)?;
    indicator.append_child(&document.create_text_node(&format!(" {}", crate::utils::display_number(delta.abs()))))?;
    card.append_child(&indicator)?;

    Timeout::new(METRIC_CHANGE_MS, move || indicator.remove()).forget();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn percent_suffix_is_ignored() {
        assert!(!metric_changed("45%", "45"));
        assert!(!metric_changed(" 45 % ", "45%"));
        assert!(metric_changed("45", "46"));
        assert!(metric_changed("", "0"));
    }

    #[test]
    fn numeric_delta_reports_signed_change() {
        assert_eq!(numeric_delta("10", "12"), Some(2.0));
        assert_eq!(numeric_delta("12%", "10"), Some(-2.0));
        assert_eq!(numeric_delta("10", "10%"), None);
        assert_eq!(numeric_delta("n/a", "10"), None);
    }

    #[test]
    fn selector_quotes_key() {
        let b = MetricBinding::new("stat", "votos_validos");
        assert_eq!(b.selector(), "[data-stat=\"votos_validos\"]");
    }

    proptest! {
        #[test]
        fn applying_same_value_twice_is_unchanged(v in "[0-9]{0,6}%?") {
            // After a render the card holds exactly `v`.
            prop_assert!(!metric_changed(&v, &v));
            prop_assert_eq!(normalize_metric_text(normalize_metric_text(&v)), normalize_metric_text(&v));
        }
    }
}
