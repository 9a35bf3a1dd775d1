//! Municipal administrator dashboard: live municipal totals, the mesa map and
//! report downloads.

use std::rc::Rc;

use serde_json::Value;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use super::{on_click_attr, on_submit, PageContext, Role, RoleDashboard};
use crate::constants::{ATTR_METRIC, MSG_NO_DATA, MUNICIPAL_STATS_INTERVAL_MS};
use crate::dom_utils;
use crate::error::ApiError;
use crate::models::{Mesa, MesaList, MesaStatus, MunicipalStats};
use crate::network::reports::download_report;
use crate::network::RequestOptions;
use crate::render::metrics::{update_metric, MetricBinding};
use crate::render::tables::{self, Placeholder};
use crate::scheduling::{CancelToken, CycleResult, Responsibility};
use crate::toast::Severity;
use crate::utils::{display_number, format_number, percent, value_text};
use crate::validation::require_fields;

const MESA_FORM: &str = "newMesaForm";
const MESA_FIELDS: [&str; 4] = ["numero", "puesto_votacion", "votantes_habilitados", "zona"];

pub struct MunicipalDashboard;

impl RoleDashboard for MunicipalDashboard {
    fn role(&self) -> Role {
        Role::AdminMunicipal
    }

    fn mount(&self, page: &Rc<PageContext>) -> Result<(), JsValue> {
        page.refresh_every(Responsibility::Stats, MUNICIPAL_STATS_INTERVAL_MS, refresh_stats);

        let submit = page.clone();
        on_submit(&page.document, MESA_FORM, move |form| create_mesa(&submit, form))?;

        let actions = page.clone();
        on_click_attr(&page.document, "data-action", move |action, el| match action {
            "create-mesa" => {
                if let Some(form) = actions.document.get_element_by_id(MESA_FORM) {
                    create_mesa(&actions, &form);
                }
            }
            "municipal-report" => municipal_report(&actions),
            "mesa-report" => {
                if let Some(id) = el.get_attribute("data-mesa-id") {
                    mesa_report(&actions, id);
                }
            }
            other => debug_log!("unhandled action {}", other),
        })
    }
}

async fn refresh_stats(page: Rc<PageContext>, cancel: CancelToken) -> CycleResult {
    let stats: MunicipalStats = page.api.get_data("/municipal/stats").await?;
    if cancel.is_cancelled() {
        return Ok(());
    }
    render_stats(&page.document, &stats)?;
    Ok(())
}

pub fn render_stats(document: &Document, stats: &MunicipalStats) -> Result<(), JsValue> {
    update_metric(document, ATTR_METRIC, "mesas_activas", &stats.mesas_activas.to_string())?;
    update_metric(document, ATTR_METRIC, "participacion_total", &percent(stats.participacion_total))?;
    update_metric(document, ATTR_METRIC, "votos_registrados", &format_number(stats.votos_registrados as f64, 0))?;
    update_metric(document, ATTR_METRIC, "incidencias", &stats.incidencias.to_string())?;
    render_mesa_status(document, &stats.mesas_status)
}

/// Recolor the status dot of every mesa the page shows.
fn render_mesa_status(document: &Document, statuses: &[MesaStatus]) -> Result<(), JsValue> {
    for mesa in statuses {
        let binding = MetricBinding::new("mesa-id", mesa.id.to_string());
        let Some(item) = document.query_selector(&binding.selector())? else {
            continue;
        };
        if let Some(dot) = item.query_selector(".mesa-status")? {
            dot.set_class_name(&format!("mesa-status {}", mesa.status));
        }
    }
    Ok(())
}

async fn load_mesas(page: &PageContext) -> Result<(), ApiError> {
    let list: MesaList = page.api.get_data("/municipal/mesas").await?;
    render_mesas(&page.document, &list.mesas).map_err(|e| ApiError::Decode(format!("{:?}", e)))
}

/// Rebuild the `.mesa-map` from the full list.
pub fn render_mesas(document: &Document, mesas: &[Mesa]) -> Result<(), JsValue> {
    let Some(map) = document.query_selector(".mesa-map")? else {
        return Ok(());
    };
    tables::rebuild(document, &map, mesas, Placeholder::new(MSG_NO_DATA, 1), mesa_item)?;
    Ok(())
}

fn mesa_item(document: &Document, mesa: &Mesa) -> Result<Element, JsValue> {
    let item = dom_utils::create(document, "div", Some("mesa-item"))?;
    item.set_attribute("data-mesa-id", &mesa.id.to_string())?;

    let left = dom_utils::create(document, "div", Some("d-flex align-items-center"))?;
    left.append_child(&dom_utils::create(document, "div", Some(&format!("mesa-status {}", mesa.status)))?.into())?;
    let label = dom_utils::create(document, "div", None)?;
    label.append_child(&dom_utils::create_text(
        document,
        "strong",
        None,
        &format!("Mesa {}", value_text(&mesa.numero)),
    )?.into())?;
    label.append_child(&document.create_element("br")?.into())?;
    label.append_child(&dom_utils::create_text(document, "small", Some("text-muted"), &mesa.puesto_votacion)?.into())?;
    left.append_child(&label)?;
    item.append_child(&left)?;

    let right = dom_utils::create(document, "div", Some("text-end"))?;
    right.append_child(&dom_utils::create_text(
        document,
        "small",
        None,
        &format!("{}/{}", mesa.votos_registrados, mesa.votantes_habilitados),
    )?.into())?;
    right.append_child(&document.create_element("br")?.into())?;
    right.append_child(&dom_utils::create_text(
        document,
        "small",
        Some("text-muted"),
        &format!("{}%", display_number(mesa.participacion)),
    )?.into())?;
    item.append_child(&right)?;
    Ok(item)
}

fn create_mesa(page: &Rc<PageContext>, form: &Element) {
    let fields = dom_utils::form_fields(form);
    let required: Vec<(&str, &str)> = MESA_FIELDS
        .iter()
        .map(|name| (*name, dom_utils::field(&fields, name)))
        .collect();
    if let Err(e) = require_fields(&required) {
        page.notify(&e.to_string(), Severity::Warning);
        return;
    }

    let (page_in, form) = (page.clone(), form.clone());
    page.spawn_action("Error al crear la mesa", async move {
        let _: Value = page_in
            .api
            .send_data("/municipal/mesa/create", RequestOptions::post_form(fields))
            .await?;
        page_in.notify("Mesa creada exitosamente", Severity::Success);
        super::reset_form(&form);
        load_mesas(&page_in).await
    });
}

fn municipal_report(page: &Rc<PageContext>) {
    if !page.confirm("¿Desea generar el reporte municipal completo?") {
        return;
    }
    let page_in = page.clone();
    page.spawn_action("Error al generar el reporte municipal", async move {
        download_report(&page_in.api, "/municipal/generate-report", "reporte_municipal").await?;
        page_in.notify("Reporte municipal generado exitosamente", Severity::Success);
        Ok(())
    });
}

fn mesa_report(page: &Rc<PageContext>, id: String) {
    let page_in = page.clone();
    page.spawn_action("Error al generar el reporte de mesa", async move {
        download_report(
            &page_in.api,
            &format!("/municipal/mesa/{}/report", id),
            &format!("reporte_mesa_{}", id),
        )
        .await?;
        page_in.notify("Reporte de mesa generado exitosamente", Severity::Success);
        Ok(())
    });
}

#[cfg(all(test, target_arch = "wasm32"))]
mod tests {
    use super::*;
    use serde_json::json;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    #[wasm_bindgen_test]
    fn mesa_map_is_rebuilt_from_the_list() {
        let doc = document();
        let map = dom_utils::create(&doc, "div", Some("mesa-map")).unwrap();
        doc.body().unwrap().append_child(&map).unwrap();

        let mesas = vec![Mesa {
            id: 4,
            numero: json!(12),
            puesto_votacion: "Escuela Central".into(),
            status: "active".into(),
            votos_registrados: 120,
            votantes_habilitados: 300,
            participacion: 40.0,
        }];
        render_mesas(&doc, &mesas).unwrap();
        render_mesas(&doc, &mesas).unwrap();
        assert_eq!(map.child_element_count(), 1);
        assert!(map.text_content().unwrap().contains("Mesa 12"));

        render_stats(
            &doc,
            &MunicipalStats {
                mesas_status: vec![MesaStatus { id: 4, status: "closed".into() }],
                ..MunicipalStats::default()
            },
        )
        .unwrap();
        let dot = map.query_selector(".mesa-status").unwrap().unwrap();
        assert_eq!(dot.class_name(), "mesa-status closed");

        render_mesas(&doc, &[]).unwrap();
        assert_eq!(map.child_element_count(), 1);
        assert!(map.text_content().unwrap().contains(MSG_NO_DATA));
        map.remove();
    }
}
