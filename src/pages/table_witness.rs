//! Table witness dashboard: observations, the verification checklist and the
//! witness report.

use std::rc::Rc;

use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement, HtmlInputElement};

use super::{on_click_attr, on_event, on_submit, push_timeline, PageContext, Role, RoleDashboard, Timeline};
use crate::constants::{ATTR_METRIC, OBSERVATIONS_INTERVAL_MS};
use crate::dom_utils;
use crate::models::WitnessStats;
use crate::network::reports::download_report;
use crate::network::RequestOptions;
use crate::render::metrics::{update_element, update_metric, MetricBinding};
use crate::scheduling::{CancelToken, CycleResult, Responsibility};
use crate::toast::Severity;
use crate::utils::{now_time_label, percent};
use crate::validation::require_fields;

const OBSERVATION_FORM: &str = "observationForm";

const TIMELINE: Timeline = Timeline {
    container: ".event-timeline",
    item_class: "event-item",
    marker_class: "event-marker",
    content_class: "d-flex justify-content-between align-items-start",
    cap: 10,
    new_badge: true,
};

pub struct TableWitnessDashboard;

impl RoleDashboard for TableWitnessDashboard {
    fn role(&self) -> Role {
        Role::TestigoMesa
    }

    fn mount(&self, page: &Rc<PageContext>) -> Result<(), JsValue> {
        page.refresh_every(Responsibility::Observations, OBSERVATIONS_INTERVAL_MS, refresh_stats);

        let submit = page.clone();
        on_submit(&page.document, OBSERVATION_FORM, move |form| submit_observation(&submit, form))?;

        install_checklist(&page.document)?;

        let actions = page.clone();
        on_click_attr(&page.document, "data-action", move |action, _| match action {
            "witness-report" => witness_report(&actions),
            other => debug_log!("unhandled action {}", other),
        })
    }
}

async fn refresh_stats(page: Rc<PageContext>, cancel: CancelToken) -> CycleResult {
    let stats: WitnessStats = page.api.get_data("/witness/stats").await?;
    if cancel.is_cancelled() {
        return Ok(());
    }
    render_stats(&page.document, &stats)?;
    Ok(())
}

pub fn render_stats(document: &Document, stats: &WitnessStats) -> Result<(), JsValue> {
    update_metric(document, ATTR_METRIC, "observations", &stats.total_observations.to_string())?;
    update_metric(document, ATTR_METRIC, "alerts", &stats.alerts.to_string())?;
    update_metric(document, ATTR_METRIC, "progress", &percent(stats.progress))?;
    Ok(())
}

fn submit_observation(page: &Rc<PageContext>, form: &Element) {
    let fields = dom_utils::form_fields(form);
    let kind = dom_utils::field(&fields, "observation_type").to_string();
    if let Err(e) = require_fields(&[
        ("observation_type", kind.as_str()),
        ("description", dom_utils::field(&fields, "description")),
    ]) {
        page.notify(&e.to_string(), Severity::Warning);
        return;
    }

    let (page_in, form) = (page.clone(), form.clone());
    page.spawn_action("Error al registrar la observación", async move {
        let _: Value = page_in
            .api
            .send_data("/witness/observation", RequestOptions::post_form(fields))
            .await?;
        page_in.notify("Observación registrada exitosamente", Severity::Success);
        super::reset_form(&form);
        let doc = &page_in.document;
        if let Err(e) = push_timeline(doc, &TIMELINE, &format!("Observación: {}", kind), &now_time_label())
            .and_then(|_| bump_observation_count(doc))
        {
            log::warn!("observation bookkeeping failed: {:?}", e);
        }
        Ok(())
    });
}

/// Count shown before the next stats tick catches up with the server.
pub fn next_count(current: &str) -> u64 {
    current.trim().parse::<u64>().unwrap_or(0) + 1
}

fn bump_observation_count(document: &Document) -> Result<(), JsValue> {
    let binding = MetricBinding::new(ATTR_METRIC, "observations");
    let Some(el) = document.query_selector(&binding.selector())? else {
        return Ok(());
    };
    let next = next_count(&el.text_content().unwrap_or_default());
    update_element(&el, &next.to_string())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Checklist
// ---------------------------------------------------------------------------

/// Rounded share of completed items. An empty checklist is 0%.
pub fn checklist_progress(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (completed as f64 / total as f64 * 100.0).round() as u32
}

fn install_checklist(document: &Document) -> Result<(), JsValue> {
    for item in dom_utils::query_all_doc(document, ".checklist-item") {
        let Some(checkbox) = item.query_selector("input[type=\"checkbox\"]")? else {
            continue;
        };
        let (doc, target) = (document.clone(), item.clone());
        on_event(&checkbox, "change", move |e| {
            let checked = e
                .target()
                .and_then(|t| t.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.checked())
                .unwrap_or(false);
            if let Err(err) = set_checklist_item(&doc, &target, checked) {
                log::warn!("checklist update failed: {:?}", err);
            }
        })?;
    }
    Ok(())
}

pub fn set_checklist_item(document: &Document, item: &Element, checked: bool) -> Result<(), JsValue> {
    let classes = item.class_list();
    if checked {
        classes.remove_1("pending")?;
        classes.add_1("completed")?;
        let label = item
            .query_selector("label")?
            .and_then(|l| l.text_content())
            .unwrap_or_default();
        push_timeline(document, &TIMELINE, &format!("Verificado: {}", label.trim()), &now_time_label())?;
    } else {
        classes.remove_1("completed")?;
        classes.add_1("pending")?;
    }
    render_checklist_progress(document)
}

fn render_checklist_progress(document: &Document) -> Result<(), JsValue> {
    let total = dom_utils::query_all_doc(document, ".checklist-item").len();
    let completed = dom_utils::query_all_doc(document, ".checklist-item.completed").len();
    let text = format!("{}%", checklist_progress(completed, total));

    if let Some(bar) = document.query_selector(".progress-bar")? {
        if let Some(html) = bar.dyn_ref::<HtmlElement>() {
            html.style().set_property("width", &text)?;
        }
        bar.set_text_content(Some(&text));
    }
    update_metric(document, ATTR_METRIC, "progress", &text)?;
    Ok(())
}

fn witness_report(page: &Rc<PageContext>) {
    if !page.confirm("¿Desea generar el reporte de testigo? Incluirá todas las observaciones registradas.") {
        return;
    }
    let page_in = page.clone();
    page.spawn_action("Error al generar el reporte", async move {
        download_report(&page_in.api, "/witness/generate-report", "reporte_testigo").await?;
        page_in.notify("Reporte generado y descargado exitosamente", Severity::Success);
        if let Err(e) = push_timeline(&page_in.document, &TIMELINE, "Reporte generado", &now_time_label()) {
            log::warn!("timeline update failed: {:?}", e);
        }
        Ok(())
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_rounds_and_handles_empty_lists() {
        assert_eq!(checklist_progress(0, 0), 0);
        assert_eq!(checklist_progress(1, 3), 33);
        assert_eq!(checklist_progress(2, 3), 67);
        assert_eq!(checklist_progress(4, 4), 100);
    }

    #[test]
    fn observation_count_recovers_from_garbage() {
        assert_eq!(next_count("4"), 5);
        assert_eq!(next_count(" 9 "), 10);
        assert_eq!(next_count("—"), 1);
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn checking_an_item_updates_progress_and_timeline() {
        let doc = web_sys::window().unwrap().document().unwrap();
        let root = doc.create_element("div").unwrap();
        root.set_inner_html(
            r#"<div class="progress"><div class="progress-bar"></div></div>
               <span data-metric="progress">0%</span>
               <div class="checklist-item pending"><input type="checkbox"><label>Urna sellada</label></div>
               <div class="checklist-item pending"><input type="checkbox"><label>Cubículo listo</label></div>
               <div class="event-timeline"></div>"#,
        );
        doc.body().unwrap().append_child(&root).unwrap();

        let first = root.query_selector(".checklist-item").unwrap().unwrap();
        set_checklist_item(&doc, &first, true).unwrap();

        assert!(first.class_list().contains("completed"));
        let bar = root.query_selector(".progress-bar").unwrap().unwrap();
        assert_eq!(bar.text_content().unwrap(), "50%");
        let metric = root.query_selector("[data-metric=\"progress\"]").unwrap().unwrap();
        assert_eq!(metric.text_content().unwrap(), "50%");

        let timeline = root.query_selector(".event-timeline").unwrap().unwrap();
        assert_eq!(timeline.child_element_count(), 1);
        assert!(timeline.text_content().unwrap().contains("Verificado: Urna sellada"));
        assert!(timeline.query_selector(".badge").unwrap().is_some());

        set_checklist_item(&doc, &first, false).unwrap();
        assert!(first.class_list().contains("pending"));
        assert_eq!(bar.text_content().unwrap(), "0%");
        root.remove();
    }
}
