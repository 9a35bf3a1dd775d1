//! Browser-side rendering behaviour.
//!
//! Run with: wasm-pack test --headless --chrome
#![cfg(target_arch = "wasm32")]

use electoral_dashboard_frontend::constants::{
    CSS_METRIC_PULSE, CSS_PLACEHOLDER_ROW, ID_ALERTS_CONTENT, ID_ALERTS_SECTION, METRIC_CHANGE_MS, METRIC_PULSE_MS,
};
use electoral_dashboard_frontend::dom_utils;
use electoral_dashboard_frontend::fill_user_info;
use electoral_dashboard_frontend::models::{CoverageStatistics, SystemAlert, UserInfo};
use electoral_dashboard_frontend::render::alerts::{derive_coverage_alerts, render_alert_panel, render_system_alerts};
use electoral_dashboard_frontend::render::metrics::show_metric_change;
use electoral_dashboard_frontend::render::tables::{self, Placeholder};
use electoral_dashboard_frontend::render::{update_metric, MetricUpdate};
use electoral_dashboard_frontend::toast::{self, Severity};
use gloo_timers::future::TimeoutFuture;
use serde_json::json;
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, HtmlElement};

wasm_bindgen_test_configure!(run_in_browser);

fn document() -> Document {
    web_sys::window().unwrap().document().unwrap()
}

fn mount(html: &str) -> Element {
    let doc = document();
    let root = doc.create_element("div").unwrap();
    root.set_inner_html(html);
    doc.body().unwrap().append_child(&root).unwrap();
    root
}

fn transform(el: &Element) -> String {
    el.dyn_ref::<HtmlElement>()
        .unwrap()
        .style()
        .get_property_value("transform")
        .unwrap()
}

#[wasm_bindgen_test]
async fn unchanged_metric_is_left_alone() {
    let root = mount(r#"<span data-metric="usuarios_activos">45%</span>"#);
    let doc = document();
    let el = root.query_selector("[data-metric]").unwrap().unwrap();

    assert_eq!(update_metric(&doc, "metric", "usuarios_activos", "45").unwrap(), MetricUpdate::Unchanged);
    assert_eq!(el.text_content().unwrap(), "45%");
    assert!(!el.class_list().contains(CSS_METRIC_PULSE));

    assert_eq!(update_metric(&doc, "metric", "usuarios_activos", "46%").unwrap(), MetricUpdate::Updated);
    assert_eq!(el.text_content().unwrap(), "46%");
    assert!(el.class_list().contains(CSS_METRIC_PULSE));
    assert_eq!(transform(&el), "scale(1.1)");

    TimeoutFuture::new(METRIC_PULSE_MS + 50).await;
    assert!(!el.class_list().contains(CSS_METRIC_PULSE));
    assert_eq!(transform(&el), "scale(1)");
    assert_eq!(el.text_content().unwrap(), "46%");

    assert_eq!(update_metric(&doc, "metric", "not_on_page", "1").unwrap(), MetricUpdate::Missing);
    root.remove();
}

#[wasm_bindgen_test]
async fn change_indicator_expires_on_its_own_timer() {
    let root = mount(r#"<div class="metric-card"><span data-metric="alertas">3</span></div>"#);
    let doc = document();
    let el = root.query_selector("[data-metric]").unwrap().unwrap();

    show_metric_change(&doc, &el, 2.0).unwrap();
    show_metric_change(&doc, &el, -1.0).unwrap();
    let indicators = root.query_selector_all(".metric-change").unwrap();
    assert_eq!(indicators.length(), 1);
    let indicator = root.query_selector(".metric-change").unwrap().unwrap();
    assert!(indicator.class_list().contains("negative"));

    TimeoutFuture::new(METRIC_CHANGE_MS + 50).await;
    assert!(root.query_selector(".metric-change").unwrap().is_none());
    root.remove();
}

#[wasm_bindgen_test]
fn empty_list_renders_exactly_one_placeholder() {
    let root = mount("<table><tbody><tr><td>stale</td></tr></tbody></table>");
    let doc = document();
    let tbody = root.query_selector("tbody").unwrap().unwrap();

    let rows: Vec<String> = Vec::new();
    let count = tables::rebuild(&doc, &tbody, &rows, Placeholder::new("No hay datos", 3), |d, s: &String| {
        tables::text_row(d, None, &[s.as_str()])
    })
    .unwrap();

    assert_eq!(count, 0);
    assert_eq!(tbody.child_element_count(), 1);
    let placeholder = tbody.first_element_child().unwrap();
    assert!(placeholder.class_list().contains(CSS_PLACEHOLDER_ROW));
    let td = placeholder.first_element_child().unwrap();
    assert_eq!(td.get_attribute("colspan").as_deref(), Some("3"));
    assert_eq!(td.text_content().unwrap(), "No hay datos");
    root.remove();
}

#[wasm_bindgen_test]
fn alert_panel_hides_when_nothing_fires() {
    let root = mount(&format!(
        r#"<div id="{}"><div id="{}"></div></div>"#,
        ID_ALERTS_SECTION, ID_ALERTS_CONTENT
    ));
    let doc = document();
    let section = doc.get_element_by_id(ID_ALERTS_SECTION).unwrap();
    let content = doc.get_element_by_id(ID_ALERTS_CONTENT).unwrap();

    let low = CoverageStatistics {
        mesas_sin_cobertura: 3,
        porcentaje_cobertura: Some(30.0),
        ..CoverageStatistics::default()
    };
    render_alert_panel(&doc, &derive_coverage_alerts(&low)).unwrap();
    assert!(dom_utils::is_displayed(&section));
    assert_eq!(content.query_selector_all("[data-alert-action]").unwrap().length(), 2);

    render_alert_panel(&doc, &derive_coverage_alerts(&CoverageStatistics::default())).unwrap();
    assert!(!dom_utils::is_displayed(&section));
    assert_eq!(content.child_element_count(), 0);
    root.remove();
}

#[wasm_bindgen_test]
fn system_alerts_replace_previous_list() {
    let root = mount(r#"<div class="alerts-container"><p>old</p></div>"#);
    let doc = document();
    let alerts = vec![SystemAlert {
        kind: "danger".into(),
        severity: Some("critical".into()),
        title: "Base de datos".into(),
        message: "Réplica sin respuesta".into(),
        timestamp: None,
    }];
    render_system_alerts(&doc, &alerts).unwrap();

    let container = root.query_selector(".alerts-container").unwrap().unwrap();
    let text = container.text_content().unwrap();
    assert!(text.contains("Réplica sin respuesta"));
    assert!(!text.contains("old"));
    root.remove();
}

#[wasm_bindgen_test]
async fn toast_dismiss_is_idempotent() {
    let handle = toast::notify("Guardado", Severity::Success, Some(10)).unwrap();
    let expiring = toast::notify("Sincronizado", Severity::Info, Some(10)).unwrap();
    assert!(document().get_element_by_id(handle.id()).is_some());

    handle.dismiss();
    handle.dismiss();
    assert!(handle.is_dismissed());
    assert!(document().get_element_by_id(handle.id()).is_none());

    // Both timers fire after this; the dismissed one must be a no-op.
    TimeoutFuture::new(50).await;
    assert!(handle.is_dismissed());
    assert!(document().get_element_by_id(handle.id()).is_none());
    assert!(expiring.is_dismissed());
    assert!(document().get_element_by_id(expiring.id()).is_none());
}

#[wasm_bindgen_test]
fn user_info_fills_known_fields_only() {
    let root = mount(
        r#"<span data-user-info="nombre_completo">Usuario</span>
           <span data-user-info="municipio">Sin municipio</span>"#,
    );
    let user: UserInfo = serde_json::from_value(json!({"nombre_completo": "Ana Pérez", "municipio": ""})).unwrap();
    fill_user_info(&document(), &user);

    let spans = dom_utils::query_all(&root, "[data-user-info]");
    assert_eq!(spans[0].text_content().unwrap(), "Ana Pérez");
    assert_eq!(spans[1].text_content().unwrap(), "Sin municipio");
    root.remove();
}
