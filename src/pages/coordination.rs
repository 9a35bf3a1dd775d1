//! Municipal coordination dashboard.
//!
//! One endpoint returns the whole dashboard snapshot (coordinator, coverage
//! statistics, per-puesto coverage, pending tasks). It is decoded in one
//! piece and painted in one pass, so every section always shows the same
//! snapshot. Witness registration and assignment refresh the snapshot
//! through the scheduler afterwards.

use std::rc::Rc;

use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Document, Element, HtmlElement};

use super::{on_click_attr, on_submit, PageContext, Role, RoleDashboard};
use crate::constants::{
    DASHBOARD_RELOAD_INTERVAL_MS, ID_NOTIFICATION_COUNT, ID_PENDING_TASKS, MSG_NO_COVERAGE, MSG_NO_TASKS,
    SEL_COVERAGE_TBODY,
};
use crate::dom_utils;
use crate::error::ApiError;
use crate::models::{
    AvailableWitness, CoordinationSnapshot, CoordinatorInfo, CoverageStatistics, NewWitness, Party, PendingTask,
    PuestoCoverage, VotingTable, WitnessAssignment,
};
use crate::network::RequestOptions;
use crate::render::alerts::{derive_coverage_alerts, render_alert_panel, AlertAction};
use crate::render::tables::{self, Placeholder};
use crate::render::SeverityTier;
use crate::scheduling::{CancelToken, CycleResult, Responsibility};
use crate::toast::Severity;
use crate::utils::{display_number, priority_class, short_date};
use crate::validation::require_fields;

const CREATE_FORM: &str = "createWitnessForm";
const CREATE_MODAL: &str = "createWitnessModal";
const ASSIGN_MODAL: &str = "assignWitnessModal";
const UNCOVERED_TABLES: &str = "/coordination/voting-tables?sin_cobertura=true";
/// Used when the page does not name the active electoral process.
const DEFAULT_PROCESS_ID: u64 = 1;

pub struct CoordinationDashboard;

impl RoleDashboard for CoordinationDashboard {
    fn role(&self) -> Role {
        Role::CoordinadorMunicipal
    }

    fn mount(&self, page: &Rc<PageContext>) -> Result<(), JsValue> {
        page.refresh_every(Responsibility::Dashboard, DASHBOARD_RELOAD_INTERVAL_MS, refresh_dashboard);
        dom_utils::set_text_by_id(&page.document, ID_NOTIFICATION_COUNT, "0");
        load_parties(page);

        let submit = page.clone();
        on_submit(&page.document, CREATE_FORM, move |_| create_witness(&submit))?;

        let actions = page.clone();
        on_click_attr(&page.document, "data-action", move |action, _| match action {
            "create-witness" => create_witness(&actions),
            "open-assign" => load_assignment_options(&actions),
            "assign-witness" => assign_witness(&actions),
            "coverage-report" => coverage_report(&actions),
            "refresh-dashboard" => {
                actions.scheduler.trigger_now(Responsibility::Dashboard);
            }
            other => debug_log!("unhandled action {}", other),
        })?;

        let alerts = page.clone();
        on_click_attr(&page.document, "data-alert-action", move |action, _| {
            match AlertAction::parse(action) {
                Some(AlertAction::ShowUncoveredTables) => show_uncovered_tables(&alerts),
                Some(AlertAction::CreateWitness) => open_create_witness(&alerts.document),
                Some(AlertAction::CoverageReport) => coverage_report(&alerts),
                None => log::warn!("unknown alert action {}", action),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

async fn refresh_dashboard(page: Rc<PageContext>, cancel: CancelToken) -> CycleResult {
    let snapshot: CoordinationSnapshot = page.api.get_data("/coordination/dashboard").await?;
    if cancel.is_cancelled() {
        return Ok(());
    }
    render_snapshot(&page.document, &snapshot)?;
    Ok(())
}

/// Paint every section from one snapshot. Idempotent.
pub fn render_snapshot(document: &Document, snapshot: &CoordinationSnapshot) -> Result<(), JsValue> {
    if let Some(info) = &snapshot.coordinator_info {
        render_coordinator_info(document, info);
    }
    render_statistics(document, &snapshot.statistics)?;
    render_coverage_table(document, &snapshot.coverage_summary)?;
    render_pending_tasks(document, &snapshot.pending_tasks)?;
    render_alert_panel(document, &derive_coverage_alerts(&snapshot.statistics))
}

fn render_coordinator_info(document: &Document, info: &CoordinatorInfo) {
    let or_dash = |v: &Option<String>| v.clone().filter(|s| !s.is_empty()).unwrap_or_else(|| "-".to_string());
    let name = info.nombre_completo.clone().filter(|s| !s.is_empty());
    dom_utils::set_text_by_id(document, "coordinatorName", name.as_deref().unwrap_or("Coordinador"));
    dom_utils::set_text_by_id(document, "coordinatorFullName", &or_dash(&info.nombre_completo));
    dom_utils::set_text_by_id(document, "municipioName", &or_dash(&info.municipio_nombre));
    dom_utils::set_text_by_id(document, "coordinatorCedula", &or_dash(&info.cedula));
    dom_utils::set_text_by_id(document, "coordinatorTelefono", &or_dash(&info.telefono));
    dom_utils::set_text_by_id(document, "coordinatorEmail", &or_dash(&info.email));
    if let Some(fecha) = &info.fecha_asignacion {
        dom_utils::set_text_by_id(document, "fechaAsignacion", &short_date(fecha));
    }
}

fn render_statistics(document: &Document, stats: &CoverageStatistics) -> Result<(), JsValue> {
    dom_utils::set_text_by_id(document, "totalTestigos", &stats.total_testigos.to_string());
    dom_utils::set_text_by_id(document, "testigosAsignados", &stats.testigos_asignados.to_string());
    dom_utils::set_text_by_id(document, "mesasCubiertas", &stats.mesas_cubiertas.to_string());

    let pct = stats.porcentaje_cobertura.unwrap_or(0.0);
    let Some(coverage) = document.get_element_by_id("porcentajeCobertura") else {
        return Ok(());
    };
    coverage.set_text_content(Some(&format!("{}%", display_number(pct))));
    if let Some(card) = coverage.closest(".card")? {
        card.set_class_name(&format!("card text-white {}", SeverityTier::from_percentage(pct).card_class()));
    }
    Ok(())
}

pub fn render_coverage_table(document: &Document, rows: &[PuestoCoverage]) -> Result<(), JsValue> {
    let Some(tbody) = document.query_selector(SEL_COVERAGE_TBODY)? else {
        return Ok(());
    };
    tables::rebuild(document, &tbody, rows, Placeholder::new(MSG_NO_COVERAGE, 5), coverage_row)?;
    Ok(())
}

fn coverage_row(document: &Document, puesto: &PuestoCoverage) -> Result<Element, JsValue> {
    let pct = puesto.porcentaje_cobertura;
    let tier = SeverityTier::from_percentage(pct);
    let tr = dom_utils::create(document, "tr", Some(tier.row_class()))?;

    let name = document.create_element("td")?;
    let label = puesto.puesto_nombre.as_deref().filter(|s| !s.is_empty()).unwrap_or("Sin nombre");
    name.append_child(&dom_utils::create_text(document, "strong", None, label)?.into())?;
    tr.append_child(&name)?;
    tr.append_child(&tables::cell(document, &puesto.total_mesas.to_string(), Some("text-center"))?.into())?;
    tr.append_child(&tables::cell(document, &puesto.mesas_cubiertas.to_string(), Some("text-center"))?.into())?;

    let progress_cell = dom_utils::create(document, "td", Some("text-center"))?;
    let wrap = dom_utils::create(document, "div", Some("d-flex align-items-center"))?;
    let bar = tables::progress_bar(document, pct, Some(tier.progress_class()), 8)?;
    bar.set_class_name("progress flex-grow-1 me-2");
    wrap.append_child(&bar)?;
    wrap.append_child(&dom_utils::create_text(
        document,
        "small",
        Some("text-muted"),
        &format!("{:.1}%", if pct.is_finite() { pct } else { 0.0 }),
    )?.into())?;
    progress_cell.append_child(&wrap)?;
    tr.append_child(&progress_cell)?;

    let status = dom_utils::create(document, "td", Some("text-center"))?;
    status.append_child(&tables::badge(document, tier.badge_class(), tier.label())?.into())?;
    tr.append_child(&status)?;
    Ok(tr)
}

pub fn priority_icon(priority: Option<u8>) -> &'static str {
    match priority {
        Some(1) => "fas fa-exclamation-circle text-danger",
        Some(2) => "fas fa-exclamation-triangle text-warning",
        Some(3) => "fas fa-info-circle text-info",
        _ => "fas fa-circle text-secondary",
    }
}

pub fn render_pending_tasks(document: &Document, tasks: &[PendingTask]) -> Result<(), JsValue> {
    let list = element_or_return!(document, ID_PENDING_TASKS);
    tables::rebuild(document, &list, tasks, Placeholder::new(MSG_NO_TASKS, 1), task_item)?;
    Ok(())
}

fn task_item(document: &Document, task: &PendingTask) -> Result<Element, JsValue> {
    let item = dom_utils::create(
        document,
        "div",
        Some(&format!("task-item task-priority-{}", priority_class(task.prioridad))),
    )?;

    let title = dom_utils::create(document, "div", Some("task-title"))?;
    title.append_child(&dom_utils::create(document, "i", Some(priority_icon(task.prioridad)))?.into())?;
    title.append_child(&document.create_text_node(&format!(" {}", task.titulo)))?;
    item.append_child(&title)?;

    let due = task.fecha_limite.as_deref().map(short_date).unwrap_or_else(|| "Sin fecha".to_string());
    let meta = dom_utils::create(document, "div", Some("task-meta"))?;
    let small = document.create_element("small")?;
    small.append_child(&dom_utils::create(document, "i", Some("fas fa-calendar me-1"))?.into())?;
    small.append_child(&document.create_text_node(&format!("Vence: {}", due)))?;
    let progress = dom_utils::create(document, "span", Some("ms-2"))?;
    progress.append_child(&dom_utils::create(document, "i", Some("fas fa-tasks me-1"))?.into())?;
    progress.append_child(&document.create_text_node(&format!(
        "Progreso: {}%",
        display_number(task.progreso.unwrap_or(0.0))
    )))?;
    small.append_child(&progress)?;
    meta.append_child(&small)?;
    item.append_child(&meta)?;
    Ok(item)
}

// ---------------------------------------------------------------------------
// Forms and actions
// ---------------------------------------------------------------------------

fn load_parties(page: &Rc<PageContext>) {
    let page_in = page.clone();
    page.spawn_action("Error cargando partidos políticos", async move {
        let parties: Vec<Party> = page_in.api.get_data("/admin/partidos").await?;
        let Some(select) = page_in.document.get_element_by_id("witnessParty") else {
            return Ok(());
        };
        dom_utils::fill_select(
            &page_in.document,
            &select,
            "Seleccionar partido...",
            parties.iter().map(|p| (p.id.to_string(), format!("{} ({})", p.nombre, p.sigla))),
        )
        .map_err(js_failure)
    });
}

/// Witness form as read from the create-witness modal.
pub fn read_new_witness(document: &Document) -> NewWitness {
    let value = |id: &str| dom_utils::control_value(document, id).trim().to_string();
    NewWitness {
        nombre_completo: value("witnessName"),
        cedula: value("witnessCedula"),
        telefono: value("witnessPhone"),
        email: value("witnessEmail"),
        direccion: value("witnessAddress"),
        partido_id: value("witnessParty").parse().ok(),
        tipo_testigo: value("witnessType"),
        observaciones: value("witnessObservations"),
    }
}

fn create_witness(page: &Rc<PageContext>) {
    let witness = read_new_witness(&page.document);
    if let Err(e) = require_fields(&[
        ("nombre_completo", witness.nombre_completo.as_str()),
        ("cedula", witness.cedula.as_str()),
        ("telefono", witness.telefono.as_str()),
    ]) {
        page.notify(&e.to_string(), Severity::Warning);
        return;
    }

    let page_in = page.clone();
    page.spawn_action("Error registrando testigo", async move {
        let body = serde_json::to_value(&witness)?;
        let _: Value = page_in
            .api
            .send_data("/coordination/witnesses", RequestOptions::post_json(body))
            .await?;
        page_in.notify("Testigo registrado exitosamente", Severity::Success);
        if let Some(form) = page_in.document.get_element_by_id(CREATE_FORM) {
            super::reset_form(&form);
        }
        close_modal(&page_in.document, CREATE_MODAL);
        page_in.scheduler.trigger_now(Responsibility::Dashboard);
        Ok(())
    });
}

fn load_assignment_options(page: &Rc<PageContext>) {
    let page_in = page.clone();
    page.spawn_action("Error cargando datos para asignación", async move {
        let witnesses: Vec<AvailableWitness> = page_in.api.get_data("/coordination/witnesses/available").await?;
        let tables: Vec<VotingTable> = page_in.api.get_data(UNCOVERED_TABLES).await?;
        let doc = &page_in.document;
        if let Some(select) = doc.get_element_by_id("assignWitnessSelect") {
            dom_utils::fill_select(
                doc,
                &select,
                "Seleccionar testigo...",
                witnesses
                    .iter()
                    .map(|w| (w.id.to_string(), format!("{} ({})", w.nombre_completo, w.cedula))),
            )
            .map_err(js_failure)?;
        }
        if let Some(select) = doc.get_element_by_id("assignTableSelect") {
            dom_utils::fill_select(
                doc,
                &select,
                "Seleccionar mesa...",
                tables.iter().map(|t| {
                    (
                        t.id.to_string(),
                        format!("Mesa {} - {}", crate::utils::value_text(&t.numero_mesa), t.puesto_nombre),
                    )
                }),
            )
            .map_err(js_failure)?;
        }
        Ok(())
    });
}

/// `<body data-proceso-id>` names the active electoral process.
fn active_process_id(document: &Document) -> u64 {
    document
        .body()
        .and_then(|b| b.get_attribute("data-proceso-id"))
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_PROCESS_ID)
}

/// Assignment from the modal, or `None` when witness or mesa is unselected.
pub fn read_assignment(document: &Document) -> Option<WitnessAssignment> {
    let id = |field: &str| -> Option<u64> {
        dom_utils::control_value(document, field).trim().parse().ok().filter(|v| *v > 0)
    };
    Some(WitnessAssignment {
        testigo_id: id("assignWitnessSelect")?,
        mesa_id: id("assignTableSelect")?,
        proceso_electoral_id: active_process_id(document),
        hora_inicio: dom_utils::control_value(document, "assignStartTime"),
        hora_fin: dom_utils::control_value(document, "assignEndTime"),
        observaciones: dom_utils::control_value(document, "assignObservations"),
    })
}

fn assign_witness(page: &Rc<PageContext>) {
    let Some(assignment) = read_assignment(&page.document) else {
        page.notify("Por favor seleccione testigo y mesa", Severity::Warning);
        return;
    };

    let page_in = page.clone();
    page.spawn_action("Error asignando testigo", async move {
        let body = serde_json::to_value(&assignment)?;
        let _: Value = page_in
            .api
            .send_data("/coordination/assignments", RequestOptions::post_json(body))
            .await?;
        page_in.notify("Testigo asignado exitosamente", Severity::Success);
        close_modal(&page_in.document, ASSIGN_MODAL);
        page_in.scheduler.trigger_now(Responsibility::Dashboard);
        Ok(())
    });
}

fn coverage_report(page: &Rc<PageContext>) {
    let page_in = page.clone();
    page.spawn_action("Error generando reporte", async move {
        let _: Value = page_in.api.get_data("/coordination/reports/coverage").await?;
        page_in.notify("Reporte generado exitosamente", Severity::Success);
        Ok(())
    });
}

fn show_uncovered_tables(page: &Rc<PageContext>) {
    let page_in = page.clone();
    page.spawn_action("Error obteniendo mesas sin cobertura", async move {
        let tables: Vec<VotingTable> = page_in.api.get_data(UNCOVERED_TABLES).await?;
        page_in.notify(&format!("{} mesas sin cobertura encontradas", tables.len()), Severity::Info);
        Ok(())
    });
}

/// Clear the create-witness form and open its modal through the page's own
/// `data-bs-target` trigger.
fn open_create_witness(document: &Document) {
    if let Some(form) = document.get_element_by_id(CREATE_FORM) {
        super::reset_form(&form);
    }
    click_first(document, &format!("[data-bs-target=\"#{}\"]", CREATE_MODAL));
}

fn close_modal(document: &Document, modal_id: &str) {
    click_first(document, &format!("#{} [data-bs-dismiss=\"modal\"]", modal_id));
}

fn click_first(document: &Document, selector: &str) {
    match document.query_selector(selector) {
        Ok(Some(el)) => {
            if let Some(html) = el.dyn_ref::<HtmlElement>() {
                html.click();
            }
        }
        Ok(None) => debug_log!("nothing matches {}", selector),
        Err(e) => log::warn!("bad selector {}: {:?}", selector, e),
    }
}

fn js_failure(e: JsValue) -> ApiError {
    ApiError::Decode(format!("{:?}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_icons_follow_priority() {
        assert_eq!(priority_icon(Some(1)), "fas fa-exclamation-circle text-danger");
        assert_eq!(priority_icon(Some(3)), "fas fa-info-circle text-info");
        assert_eq!(priority_icon(None), "fas fa-circle text-secondary");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use crate::constants::{CSS_PLACEHOLDER_ROW, ID_ALERTS_CONTENT, ID_ALERTS_SECTION};
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn fixture() -> (Document, Element) {
        let doc = web_sys::window().unwrap().document().unwrap();
        let root = doc.create_element("div").unwrap();
        root.set_inner_html(&format!(
            r#"<div class="card"><span id="porcentajeCobertura"></span></div>
               <table id="coverageTable"><tbody></tbody></table>
               <div id="{tasks}"></div>
               <div id="{section}"><div id="{content}"></div></div>"#,
            tasks = ID_PENDING_TASKS,
            section = ID_ALERTS_SECTION,
            content = ID_ALERTS_CONTENT,
        ));
        doc.body().unwrap().append_child(&root).unwrap();
        (doc, root)
    }

    #[wasm_bindgen_test]
    fn empty_snapshot_renders_placeholders_and_hides_alerts() {
        let (doc, root) = fixture();
        let snapshot = CoordinationSnapshot {
            statistics: CoverageStatistics {
                porcentaje_cobertura: Some(90.0),
                ..CoverageStatistics::default()
            },
            ..CoordinationSnapshot::default()
        };
        render_snapshot(&doc, &snapshot).unwrap();
        let first = (root.text_content().unwrap(), root.inner_html());
        render_snapshot(&doc, &snapshot).unwrap();
        assert_eq!((root.text_content().unwrap(), root.inner_html()), first);

        let tbody = doc.query_selector(SEL_COVERAGE_TBODY).unwrap().unwrap();
        assert_eq!(tbody.child_element_count(), 1);
        assert!(tbody.first_element_child().unwrap().class_list().contains(CSS_PLACEHOLDER_ROW));
        assert_eq!(tbody.text_content().unwrap(), MSG_NO_COVERAGE);

        let section = doc.get_element_by_id(ID_ALERTS_SECTION).unwrap();
        assert!(!dom_utils::is_displayed(&section));
        let card = root.query_selector(".card").unwrap().unwrap();
        assert_eq!(card.class_name(), "card text-white bg-success");
        root.remove();
    }

    #[wasm_bindgen_test]
    fn coverage_rows_share_one_tier() {
        let (doc, root) = fixture();
        let snapshot = CoordinationSnapshot {
            statistics: CoverageStatistics {
                mesas_sin_cobertura: 2,
                porcentaje_cobertura: Some(45.0),
                ..CoverageStatistics::default()
            },
            coverage_summary: vec![PuestoCoverage {
                puesto_nombre: None,
                total_mesas: 10,
                mesas_cubiertas: 7,
                porcentaje_cobertura: 70.0,
            }],
            ..CoordinationSnapshot::default()
        };
        render_snapshot(&doc, &snapshot).unwrap();
        let first = root.inner_html();
        render_snapshot(&doc, &snapshot).unwrap();
        assert_eq!(root.inner_html(), first);
        assert_eq!(doc.query_selector_all("#coverageTable tbody tr").unwrap().length(), 1);

        let row = doc.query_selector("#coverageTable tbody tr").unwrap().unwrap();
        assert_eq!(row.class_name(), "table-warning");
        assert!(row.text_content().unwrap().contains("Sin nombre"));
        assert!(row.text_content().unwrap().contains("70.0%"));
        assert!(row.query_selector(".badge.bg-warning").unwrap().is_some());
        assert!(row.query_selector(".progress-bar.bg-warning").unwrap().is_some());

        let content = doc.get_element_by_id(ID_ALERTS_CONTENT).unwrap();
        assert_eq!(content.child_element_count(), 2);
        root.remove();
    }
}
