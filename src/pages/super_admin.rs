//! Super administrator dashboard.
//!
//! Metric cards, the activity and roles charts, the system alert feed and
//! two optional monitors refresh on their own timers. Filters, bulk actions
//! and process actions are user driven.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use serde_json::Value;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlInputElement, UrlSearchParams};

use super::{on_click_attr, on_event, PageContext, Role, RoleDashboard};
use crate::constants::{
    ATTR_METRIC, CHARTS_INTERVAL_MS, DATABASE_INTERVAL_MS, METRICS_INTERVAL_MS, MSG_NO_DATA, NOTIFY_CRITICAL_MS,
    PERFORMANCE_INTERVAL_MS, SYSTEM_ALERTS_INTERVAL_MS,
};
use crate::dom_utils;
use crate::error::{ApiError, RefreshError};
use crate::models::{ActivityData, BulkAction, FilteredData, MetricMap, ProcessRow, RolesData, SystemAlert, UserRow};
use crate::network::RequestOptions;
use crate::render::alerts::{critical_alerts, render_system_alerts};
use crate::render::charts::{update_chart, ChartError, ChartSeries};
use crate::render::metrics::{self, numeric_delta, show_metric_change, MetricBinding, MetricUpdate};
use crate::render::tables::{self, Placeholder};
use crate::scheduling::{CancelToken, CycleResult, Responsibility};
use crate::toast::Severity;
use crate::utils::{percent, short_date, value_text};

const SEARCH_DEBOUNCE_MS: u32 = 500;

pub struct SuperAdminDashboard;

impl RoleDashboard for SuperAdminDashboard {
    fn role(&self) -> Role {
        Role::SuperAdmin
    }

    fn mount(&self, page: &Rc<PageContext>) -> Result<(), JsValue> {
        page.refresh_every(Responsibility::Metrics, METRICS_INTERVAL_MS, refresh_metrics);
        page.refresh_every(Responsibility::Charts, CHARTS_INTERVAL_MS, refresh_charts);
        page.refresh_every(Responsibility::Alerts, SYSTEM_ALERTS_INTERVAL_MS, refresh_alerts);
        for monitor in [Monitor::Performance, Monitor::Database] {
            if page.document.get_element_by_id(monitor.element_id()).is_some() {
                page.refresh_every(monitor.responsibility(), monitor.period_ms(), move |p, c| {
                    refresh_monitor(p, c, monitor)
                });
            }
        }

        install_filters(page)?;
        install_bulk_actions(page)?;

        let actions = page.clone();
        on_click_attr(&page.document, "data-action", move |action, el| {
            let Some(id) = el.get_attribute("data-id") else {
                return;
            };
            match action {
                "view-process" => super::navigate(&format!("/super-admin/processes/{}", id)),
                "edit-process" => super::navigate(&format!("/super-admin/processes/{}/edit", id)),
                "delete-process" => delete_process(&actions, id),
                other => debug_log!("unhandled action {}", other),
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Refresh cycles
// ---------------------------------------------------------------------------

async fn refresh_metrics(page: Rc<PageContext>, cancel: CancelToken) -> CycleResult {
    let values: MetricMap = page.api.get_data("/super-admin/metrics").await?;
    if cancel.is_cancelled() {
        return Ok(());
    }
    render_metrics(&page.document, &values)?;
    Ok(())
}

/// Bind every key to `[data-metric=key]`; numeric changes also get an
/// up/down indicator on the surrounding card.
pub fn render_metrics(document: &Document, values: &MetricMap) -> Result<(), JsValue> {
    for (key, value) in values {
        let binding = MetricBinding::new(ATTR_METRIC, key.as_str());
        let Some(el) = document.query_selector(&binding.selector())? else {
            continue;
        };
        let previous = el.text_content().unwrap_or_default();
        let text = value_text(value);
        if metrics::update_element(&el, &text)? == MetricUpdate::Updated {
            if let Some(delta) = numeric_delta(&previous, &text) {
                show_metric_change(document, &el, delta)?;
            }
        }
    }
    Ok(())
}

async fn refresh_charts(page: Rc<PageContext>, cancel: CancelToken) -> CycleResult {
    let activity: ActivityData = page.api.get_data("/super-admin/activity-data").await?;
    let roles: RolesData = page.api.get_data("/super-admin/roles-data").await?;
    if cancel.is_cancelled() {
        return Ok(());
    }
    let series = validated_chart_series(activity, roles).map_err(|e| RefreshError::Render(e.to_string()))?;
    for (canvas, data) in &series {
        if !update_chart(canvas, data).map_err(|e| RefreshError::Render(e.to_string()))? {
            debug_log!("no chart on #{}", canvas);
        }
    }
    Ok(())
}

/// Canvas id and series for both charts.
pub fn chart_series(activity: ActivityData, roles: RolesData) -> [(&'static str, ChartSeries); 2] {
    [
        (
            "activityChart",
            ChartSeries::new(activity.labels, vec![activity.users, activity.operations]),
        ),
        ("rolesChart", ChartSeries::new(roles.labels, vec![roles.values])),
    ]
}

/// Both series, or the first validation error. No chart is touched unless
/// every series is well formed.
pub fn validated_chart_series(
    activity: ActivityData,
    roles: RolesData,
) -> Result<[(&'static str, ChartSeries); 2], ChartError> {
    let series = chart_series(activity, roles);
    series.iter().try_for_each(|(_, s)| s.validate())?;
    Ok(series)
}

async fn refresh_alerts(page: Rc<PageContext>, cancel: CancelToken) -> CycleResult {
    let alerts: Vec<SystemAlert> = page.api.get_data("/super-admin/system-alerts").await?;
    if cancel.is_cancelled() {
        return Ok(());
    }
    render_system_alerts(&page.document, &alerts)?;
    for alert in critical_alerts(&alerts) {
        page.platform.notify(&alert.message, Severity::Critical, Some(NOTIFY_CRITICAL_MS));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Monitor {
    Performance,
    Database,
}

impl Monitor {
    fn element_id(self) -> &'static str {
        match self {
            Monitor::Performance => "performanceMonitor",
            Monitor::Database => "databaseMonitor",
        }
    }

    fn endpoint(self) -> &'static str {
        match self {
            Monitor::Performance => "/super-admin/performance-metrics",
            Monitor::Database => "/super-admin/database-metrics",
        }
    }

    fn responsibility(self) -> Responsibility {
        match self {
            Monitor::Performance => Responsibility::Performance,
            Monitor::Database => Responsibility::Database,
        }
    }

    fn period_ms(self) -> u32 {
        match self {
            Monitor::Performance => PERFORMANCE_INTERVAL_MS,
            Monitor::Database => DATABASE_INTERVAL_MS,
        }
    }
}

async fn refresh_monitor(page: Rc<PageContext>, cancel: CancelToken, monitor: Monitor) -> CycleResult {
    let values: MetricMap = page.api.get_data(monitor.endpoint()).await?;
    if cancel.is_cancelled() {
        return Ok(());
    }
    let Some(root) = page.document.get_element_by_id(monitor.element_id()) else {
        return Ok(());
    };
    for (key, value) in &values {
        metrics::update_metric_in(&root, ATTR_METRIC, key, &value_text(value))?;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Active filters, keyed by query parameter. Blank values drop the key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    entries: BTreeMap<String, String>,
}

impl FilterState {
    pub fn set(&mut self, key: &str, value: &str) {
        let value = value.trim();
        if value.is_empty() {
            self.entries.remove(key);
        } else {
            self.entries.insert(key.to_string(), value.to_string());
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// URL-encoded query string, without the leading `?`.
    pub fn query(&self) -> Result<String, JsValue> {
        let params = UrlSearchParams::new()?;
        for (k, v) in self.entries() {
            params.append(k, v);
        }
        Ok(params.to_string().into())
    }
}

/// Shared by the filter listeners. `latest` numbers the loads so a slow
/// response never paints over a newer one.
struct Filters {
    state: RefCell<FilterState>,
    latest: Cell<u64>,
    debounce: RefCell<Option<Timeout>>,
}

fn install_filters(page: &Rc<PageContext>) -> Result<(), JsValue> {
    let filters = Rc::new(Filters {
        state: RefCell::new(FilterState::default()),
        latest: Cell::new(0),
        debounce: RefCell::new(None),
    });

    for el in dom_utils::query_all_doc(&page.document, "[data-date-filter]") {
        let key = el.get_attribute("data-date-filter").unwrap_or_else(|| "date".to_string());
        let (page, filters, target) = (page.clone(), filters.clone(), el.clone());
        on_event(&el, "change", move |_| {
            filters.state.borrow_mut().set(&key, &dom_utils::element_value(&target));
            apply_filters(&page, &filters);
        })?;
    }

    for el in dom_utils::query_all_doc(&page.document, "[data-status-filter]") {
        let (page, filters, target) = (page.clone(), filters.clone(), el.clone());
        on_event(&el, "change", move |_| {
            filters.state.borrow_mut().set("status", &dom_utils::element_value(&target));
            apply_filters(&page, &filters);
        })?;
    }

    if let Some(search) = page.document.get_element_by_id("advancedSearch") {
        let (page, filters, target) = (page.clone(), filters.clone(), search.clone());
        on_event(&search, "input", move |_| {
            let (page, filters_in, target) = (page.clone(), filters.clone(), target.clone());
            let timer = Timeout::new(SEARCH_DEBOUNCE_MS, move || {
                filters_in.state.borrow_mut().set("search", &dom_utils::element_value(&target));
                apply_filters(&page, &filters_in);
            });
            // Replacing the pending timer cancels it.
            *filters.debounce.borrow_mut() = Some(timer);
        })?;
    }
    Ok(())
}

fn apply_filters(page: &Rc<PageContext>, filters: &Rc<Filters>) {
    let query = match filters.state.borrow().query() {
        Ok(q) => q,
        Err(e) => {
            log::error!("could not encode filters: {:?}", e);
            return;
        }
    };
    push_query(&query);

    let seq = filters.latest.get() + 1;
    filters.latest.set(seq);
    let (page_in, filters) = (page.clone(), filters.clone());
    page.spawn_action("Error cargando datos filtrados", async move {
        let data: FilteredData = page_in
            .api
            .get_data(&format!("/super-admin/filtered-data?{}", query))
            .await?;
        if filters.latest.get() != seq {
            debug_log!("dropping stale filtered data #{}", seq);
            return Ok(());
        }
        render_filtered(&page_in.document, &data).map_err(|e| ApiError::Decode(format!("{:?}", e)))
    });
}

/// Reflect the filters in the address bar without reloading.
fn push_query(query: &str) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let path = window.location().pathname().unwrap_or_default();
    let url = if query.is_empty() { path } else { format!("{}?{}", path, query) };
    match window.history() {
        Ok(history) => {
            if let Err(e) = history.push_state_with_url(&JsValue::NULL, "", Some(&url)) {
                log::warn!("pushState failed: {:?}", e);
            }
        }
        Err(e) => log::warn!("no history: {:?}", e),
    }
}

/// Rebuild whichever tables the payload carries.
pub fn render_filtered(document: &Document, data: &FilteredData) -> Result<(), JsValue> {
    if let (Some(processes), Some(tbody)) = (&data.processes, document.query_selector("#processesTable tbody")?) {
        tables::rebuild(document, &tbody, processes, Placeholder::new(MSG_NO_DATA, 5), process_row)?;
    }
    if let (Some(users), Some(tbody)) = (&data.users, document.query_selector("#usersTable tbody")?) {
        tables::rebuild(document, &tbody, users, Placeholder::new(MSG_NO_DATA, 4), user_row)?;
    }
    Ok(())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn estado_badge_class(estado: &str) -> &'static str {
    if estado == "activo" {
        "bg-success"
    } else {
        "bg-warning"
    }
}

fn process_row(document: &Document, process: &ProcessRow) -> Result<Element, JsValue> {
    let tr = document.create_element("tr")?;

    let name = document.create_element("td")?;
    name.append_child(&dom_utils::create_text(document, "strong", None, &process.nombre)?.into())?;
    name.append_child(&document.create_element("br")?.into())?;
    let date = process.fecha_inicio.as_deref().map(short_date).unwrap_or_default();
    name.append_child(&dom_utils::create_text(document, "small", Some("text-muted"), &date)?.into())?;
    tr.append_child(&name)?;

    tr.append_child(&tables::cell(document, &process.tipo_eleccion, None)?.into())?;

    let estado = document.create_element("td")?;
    estado.append_child(&tables::badge(
        document,
        estado_badge_class(&process.estado),
        &capitalize(&process.estado),
    )?.into())?;
    tr.append_child(&estado)?;

    let progress = document.create_element("td")?;
    progress.append_child(&tables::progress_bar(document, process.progreso, None, 6)?.into())?;
    progress.append_child(&dom_utils::create_text(
        document,
        "small",
        Some("text-muted"),
        &percent(process.progreso),
    )?.into())?;
    tr.append_child(&progress)?;

    let actions = document.create_element("td")?;
    let group = dom_utils::create(document, "div", Some("btn-group btn-group-sm"))?;
    for (action, class, icon, title) in [
        ("view-process", "btn-outline-primary", "fa-eye", "Ver"),
        ("edit-process", "btn-outline-secondary", "fa-edit", "Editar"),
        ("delete-process", "btn-outline-danger", "fa-trash", "Eliminar"),
    ] {
        let button = dom_utils::create(document, "button", Some(&format!("btn {}", class)))?;
        button.set_attribute("type", "button")?;
        button.set_attribute("title", title)?;
        button.set_attribute("data-action", action)?;
        button.set_attribute("data-id", &process.id.to_string())?;
        button.append_child(&dom_utils::create(document, "i", Some(&format!("fas {}", icon)))?.into())?;
        group.append_child(&button)?;
    }
    actions.append_child(&group)?;
    tr.append_child(&actions)?;
    Ok(tr)
}

fn user_row(document: &Document, user: &UserRow) -> Result<Element, JsValue> {
    let tr = tables::text_row(document, None, &[&user.nombre_completo, &user.email, &user.rol])?;
    let estado = document.create_element("td")?;
    let (class, label) = if user.activo {
        ("bg-success", "Activo")
    } else {
        ("bg-secondary", "Inactivo")
    };
    estado.append_child(&tables::badge(document, class, label)?.into())?;
    tr.append_child(&estado)?;
    Ok(tr)
}

// ---------------------------------------------------------------------------
// Bulk and process actions
// ---------------------------------------------------------------------------

fn install_bulk_actions(page: &Rc<PageContext>) -> Result<(), JsValue> {
    if let Some(select_all) = page.document.get_element_by_id("selectAll") {
        let (doc, source) = (page.document.clone(), select_all.clone());
        on_event(&select_all, "change", move |_| {
            let checked = source.dyn_ref::<HtmlInputElement>().map(|i| i.checked()).unwrap_or(false);
            for el in dom_utils::query_all_doc(&doc, ".item-checkbox") {
                if let Some(input) = el.dyn_ref::<HtmlInputElement>() {
                    input.set_checked(checked);
                }
            }
            update_bulk_panel(&doc);
        })?;
    }

    // Row checkboxes are re-rendered by the filters, so listen at the root.
    if let Some(root) = page.document.document_element() {
        let doc = page.document.clone();
        on_event(&root, "change", move |e| {
            let is_item = e
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .map(|t| t.matches(".item-checkbox").unwrap_or(false))
                .unwrap_or(false);
            if is_item {
                update_bulk_panel(&doc);
            }
        })?;
    }

    let document = page.document.clone();
    let page = page.clone();
    on_click_attr(&document, "data-bulk-action", move |action, _| {
        run_bulk_action(&page, action.to_string());
    })
}

fn selected_items(document: &Document) -> Vec<String> {
    dom_utils::query_all_doc(document, ".item-checkbox:checked")
        .iter()
        .map(dom_utils::element_value)
        .collect()
}

fn update_bulk_panel(document: &Document) {
    let Some(panel) = document.get_element_by_id("bulkActionsPanel") else {
        return;
    };
    let count = selected_items(document).len();
    if let Err(e) = dom_utils::set_display(&panel, count > 0) {
        log::warn!("bulk panel toggle failed: {:?}", e);
    }
    if count > 0 {
        if let Ok(Some(label)) = panel.query_selector(".selected-count") {
            label.set_text_content(Some(&count.to_string()));
        }
    }
}

pub fn bulk_confirm_message(action: &str, count: usize) -> String {
    format!("¿Estás seguro de {} {} elemento(s)?", action, count)
}

fn run_bulk_action(page: &Rc<PageContext>, action: String) {
    let items = selected_items(&page.document);
    if items.is_empty() {
        page.notify("Selecciona al menos un elemento", Severity::Warning);
        return;
    }
    if !page.confirm(&bulk_confirm_message(&action, items.len())) {
        return;
    }

    let page = page.clone();
    spawn_local(async move {
        let body = match serde_json::to_value(BulkAction {
            action: action.clone(),
            items,
        }) {
            Ok(body) => body,
            Err(e) => {
                log::error!("could not encode bulk action: {}", e);
                return;
            }
        };
        let result: Result<Value, ApiError> = page
            .api
            .send_data("/super-admin/bulk-action", RequestOptions::post_json(body))
            .await;
        match result {
            Ok(_) => {
                page.notify(&format!("{} ejecutado exitosamente", action), Severity::Success);
                super::reload();
            }
            Err(ApiError::Unauthorized) => {}
            Err(e) => page.notify(
                &format!("Error ejecutando {}: {}", action, e.user_message()),
                Severity::Danger,
            ),
        }
    });
}

fn delete_process(page: &Rc<PageContext>, id: String) {
    if !page.confirm("¿Estás seguro de eliminar este proceso?") {
        return;
    }
    let page = page.clone();
    spawn_local(async move {
        let result: Result<Value, ApiError> = page
            .api
            .send_data(&format!("/super-admin/processes/{}", id), RequestOptions::delete())
            .await;
        match result {
            Ok(_) => {
                page.notify("Proceso eliminado exitosamente", Severity::Success);
                super::reload();
            }
            Err(ApiError::Unauthorized) => {}
            Err(e) => page.notify(
                &format!("Error eliminando proceso: {}", e.user_message()),
                Severity::Danger,
            ),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_filters_are_dropped() {
        let mut f = FilterState::default();
        f.set("status", "activo");
        f.set("fecha_desde", "2026-10-01");
        f.set("status", "  ");
        assert_eq!(f.get("status"), None);
        assert_eq!(f.entries().collect::<Vec<_>>(), vec![("fecha_desde", "2026-10-01")]);
    }

    #[test]
    fn bulk_confirmation_names_action_and_count() {
        assert_eq!(bulk_confirm_message("activar", 3), "¿Estás seguro de activar 3 elemento(s)?");
    }

    #[test]
    fn only_active_processes_get_the_success_badge() {
        assert_eq!(estado_badge_class("activo"), "bg-success");
        assert_eq!(estado_badge_class("borrador"), "bg-warning");
        assert_eq!(capitalize("borrador"), "Borrador");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn activity_chart_carries_two_datasets() {
        let activity = ActivityData {
            labels: vec!["lun".into(), "mar".into()],
            users: vec![3.0, 4.0],
            operations: vec![10.0, 12.0],
        };
        let roles = RolesData {
            labels: vec!["testigo".into()],
            values: vec![40.0],
        };
        let [(activity_id, activity), (roles_id, roles)] = chart_series(activity, roles);
        assert_eq!(activity_id, "activityChart");
        assert_eq!(activity.datasets.len(), 2);
        assert!(activity.validate().is_ok());
        assert_eq!(roles_id, "rolesChart");
        assert!(roles.validate().is_ok());
    }

    #[test]
    fn malformed_roles_series_rejects_both_charts() {
        let activity = ActivityData {
            labels: vec!["a".into(), "b".into()],
            users: vec![1.0, 2.0],
            operations: vec![3.0, 4.0],
        };
        let roles = RolesData {
            labels: vec!["x".into(), "y".into()],
            values: vec![1.0],
        };
        assert_eq!(
            validated_chart_series(activity.clone(), roles).unwrap_err(),
            ChartError::LengthMismatch {
                index: 0,
                expected: 2,
                found: 1
            }
        );

        let roles = RolesData {
            labels: vec!["x".into()],
            values: vec![1.0],
        };
        let [(first, _), (second, _)] = validated_chart_series(activity, roles).unwrap();
        assert_eq!((first, second), ("activityChart", "rolesChart"));
    }
}
