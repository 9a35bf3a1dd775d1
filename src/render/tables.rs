//! Snapshot-driven lists and tables.
//!
//! A container is always cleared and repopulated from the full snapshot; rows
//! are never patched in place. An empty snapshot renders exactly one
//! placeholder row.

use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::constants::CSS_PLACEHOLDER_ROW;
use crate::dom_utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder<'a> {
    pub message: &'a str,
    /// Column span when the container is a `<tbody>`.
    pub colspan: u32,
}

impl<'a> Placeholder<'a> {
    pub fn new(message: &'a str, colspan: u32) -> Self {
        Self { message, colspan }
    }
}

/// Replace the children of `container` with one element per item, or with
/// the placeholder when `items` is empty. Returns the number of data rows.
pub fn rebuild<T, F>(
    document: &Document,
    container: &Element,
    items: &[T],
    placeholder: Placeholder<'_>,
    mut render_row: F,
) -> Result<usize, JsValue>
where
    F: FnMut(&Document, &T) -> Result<Element, JsValue>,
{
    // Build everything first so a failing row leaves the old content intact.
    let mut rows = Vec::with_capacity(items.len().max(1));
    if items.is_empty() {
        rows.push(placeholder_row(document, container, placeholder)?);
    } else {
        for item in items {
            rows.push(render_row(document, item)?);
        }
    }

    dom_utils::clear_children(container);
    for row in &rows {
        container.append_child(row)?;
    }
    Ok(items.len())
}

fn placeholder_row(document: &Document, container: &Element, placeholder: Placeholder<'_>) -> Result<Element, JsValue> {
    if container.tag_name().eq_ignore_ascii_case("tbody") {
        let tr = dom_utils::create(document, "tr", Some(CSS_PLACEHOLDER_ROW))?;
        let td = dom_utils::create_text(document, "td", Some("text-center text-muted"), placeholder.message)?;
        td.set_attribute("colspan", &placeholder.colspan.to_string())?;
        tr.append_child(&td)?;
        Ok(tr)
    } else {
        dom_utils::create_text(
            document,
            "p",
            Some(&format!("text-muted text-center {}", CSS_PLACEHOLDER_ROW)),
            placeholder.message,
        )
    }
}

/// `<td>` with text content.
pub fn cell(document: &Document, text: &str, class: Option<&str>) -> Result<Element, JsValue> {
    dom_utils::create_text(document, "td", class, text)
}

/// `<span class="badge …">` with text content.
pub fn badge(document: &Document, class: &str, text: &str) -> Result<Element, JsValue> {
    dom_utils::create_text(document, "span", Some(&format!("badge {}", class)), text)
}

/// Thin progress bar, `width` clamped to 0..=100.
pub fn progress_bar(document: &Document, pct: f64, bar_class: Option<&str>, height_px: u32) -> Result<Element, JsValue> {
    let outer = dom_utils::create(document, "div", Some("progress"))?;
    outer.set_attribute("style", &format!("height: {}px;", height_px))?;
    let class = match bar_class {
        Some(c) => format!("progress-bar {}", c),
        None => "progress-bar".to_string(),
    };
    let bar = dom_utils::create(document, "div", Some(&class))?;
    let width = if pct.is_finite() { pct.clamp(0.0, 100.0) } else { 0.0 };
    bar.set_attribute("style", &format!("width: {}%", width))?;
    outer.append_child(&bar)?;
    Ok(outer)
}

/// `<tr>` of plain text cells.
pub fn text_row(document: &Document, class: Option<&str>, cells: &[&str]) -> Result<Element, JsValue> {
    let tr = dom_utils::create(document, "tr", class)?;
    for text in cells {
        tr.append_child(&cell(document, text, None)?.into())?;
    }
    Ok(tr)
}
