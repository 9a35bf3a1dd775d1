//! dom_utils.rs – thin helper layer for repetitive DOM operations.
//!
//! The role pages build every row and list item through these helpers so
//! server data only ever reaches the DOM as text content, never as markup.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement, HtmlSelectElement, HtmlTextAreaElement};

/// Set `style.display` directly. Server templates toggle some panels this way
/// instead of through classes.
pub fn set_display(el: &Element, visible: bool) -> Result<(), JsValue> {
    if let Some(html) = el.dyn_ref::<HtmlElement>() {
        html.style()
            .set_property("display", if visible { "block" } else { "none" })?;
    }
    Ok(())
}

pub fn is_displayed(el: &Element) -> bool {
    el.dyn_ref::<HtmlElement>()
        .map(|h| h.style().get_property_value("display").unwrap_or_default() != "none")
        .unwrap_or(true)
}

/// Create an element with an optional class list.
pub fn create(document: &Document, tag: &str, class: Option<&str>) -> Result<Element, JsValue> {
    let el = document.create_element(tag)?;
    if let Some(class) = class {
        el.set_class_name(class);
    }
    Ok(el)
}

/// Create an element whose only content is `text`.
pub fn create_text(
    document: &Document,
    tag: &str,
    class: Option<&str>,
    text: &str,
) -> Result<Element, JsValue> {
    let el = create(document, tag, class)?;
    el.set_text_content(Some(text));
    Ok(el)
}

/// Set the text of `#id` when it exists.
pub fn set_text_by_id(document: &Document, id: &str, text: &str) {
    if let Some(el) = document.get_element_by_id(id) {
        el.set_text_content(Some(text));
    }
}

/// Every element matching `selector` below `root`.
pub fn query_all(root: &Element, selector: &str) -> Vec<Element> {
    collect_nodes(root.query_selector_all(selector).ok())
}

/// Every element matching `selector` in the document.
pub fn query_all_doc(document: &Document, selector: &str) -> Vec<Element> {
    collect_nodes(document.query_selector_all(selector).ok())
}

fn collect_nodes(list: Option<web_sys::NodeList>) -> Vec<Element> {
    let Some(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|n| n.dyn_into::<Element>().ok())
        .collect()
}

/// Value of a form control (`input`, `select` or `textarea`) by id. Missing
/// or foreign elements read as an empty string.
pub fn control_value(document: &Document, id: &str) -> String {
    document
        .get_element_by_id(id)
        .map(|el| element_value(&el))
        .unwrap_or_default()
}

pub fn element_value(el: &Element) -> String {
    if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
        input.value()
    } else if let Some(select) = el.dyn_ref::<HtmlSelectElement>() {
        select.value()
    } else if let Some(area) = el.dyn_ref::<HtmlTextAreaElement>() {
        area.value()
    } else {
        String::new()
    }
}

/// `(name, value)` pairs of the named controls below `form`, in document
/// order. Unchecked checkboxes and radios and disabled controls are skipped,
/// the same set a browser would submit.
pub fn form_fields(form: &Element) -> Vec<(String, String)> {
    query_all(form, "[name]")
        .into_iter()
        .filter(|el| {
            if el.has_attribute("disabled") {
                return false;
            }
            match el.dyn_ref::<HtmlInputElement>() {
                Some(input) if matches!(input.type_().as_str(), "checkbox" | "radio") => input.checked(),
                Some(input) => !matches!(input.type_().as_str(), "submit" | "button" | "file"),
                None => el.dyn_ref::<HtmlSelectElement>().is_some() || el.dyn_ref::<HtmlTextAreaElement>().is_some(),
            }
        })
        .filter_map(|el| el.get_attribute("name").map(|name| (name, element_value(&el))))
        .collect()
}

/// First value submitted under `name`, empty when absent.
pub fn field<'a>(fields: &'a [(String, String)], name: &str) -> &'a str {
    fields
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, v)| v.as_str())
        .unwrap_or("")
}

/// Replace the options of a `<select>` with a leading placeholder option.
pub fn fill_select(
    document: &Document,
    select: &Element,
    placeholder: &str,
    options: impl IntoIterator<Item = (String, String)>,
) -> Result<(), JsValue> {
    clear_children(select);
    let first = create_text(document, "option", None, placeholder)?;
    first.set_attribute("value", "")?;
    select.append_child(&first)?;
    for (value, label) in options {
        let opt = create_text(document, "option", None, &label)?;
        opt.set_attribute("value", &value)?;
        select.append_child(&opt)?;
    }
    Ok(())
}

pub fn clear_children(el: &Element) {
    while let Some(child) = el.first_child() {
        let _ = el.remove_child(&child);
    }
}

/// Drop trailing children until at most `max` remain.
pub fn cap_children(el: &Element, max: u32) {
    while el.child_element_count() > max {
        match el.last_element_child() {
            Some(last) => last.remove(),
            None => break,
        }
    }
}

// ---------------------------------------------------------------------------
// Browser tests
// ---------------------------------------------------------------------------
