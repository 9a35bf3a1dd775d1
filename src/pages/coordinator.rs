//! Electoral coordinator dashboard.

use std::rc::Rc;

use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use super::{on_click_attr, PageContext, Role, RoleDashboard};
use crate::constants::{ATTR_METRIC, METRICS_INTERVAL_MS, MSG_NO_TASKS, NOTIFICATIONS_INTERVAL_MS, TASKS_INTERVAL_MS};
use crate::dom_utils;
use crate::models::{CoordinatorMetrics, CoordinatorNotifications, CoordinatorTask, CoordinatorTasks};
use crate::render::metrics::update_metric;
use crate::render::tables::{self, Placeholder};
use crate::scheduling::{CancelToken, CycleResult, Responsibility};
use crate::toast::Severity;

pub struct CoordinatorDashboard;

impl RoleDashboard for CoordinatorDashboard {
    fn role(&self) -> Role {
        Role::CoordinadorElectoral
    }

    fn mount(&self, page: &Rc<PageContext>) -> Result<(), JsValue> {
        page.refresh_every(Responsibility::Metrics, METRICS_INTERVAL_MS, refresh_metrics);
        page.refresh_every(Responsibility::Tasks, TASKS_INTERVAL_MS, refresh_tasks);
        page.refresh_every(Responsibility::Notifications, NOTIFICATIONS_INTERVAL_MS, refresh_notifications);

        on_click_attr(&page.document, "data-action", |action, _| match quick_action_path(action) {
            Some(path) => super::navigate(path),
            None => debug_log!("unhandled action {}", action),
        })
    }
}

/// Quick-action buttons are plain navigations.
pub fn quick_action_path(action: &str) -> Option<&'static str> {
    match action {
        "new-process" => Some("/electoral/create"),
        "register-candidate" => Some("/candidates/create"),
        "generate-report" => Some("/reports/generate"),
        "monitor-processes" => Some("/electoral/monitor"),
        _ => None,
    }
}

async fn refresh_metrics(page: Rc<PageContext>, cancel: CancelToken) -> CycleResult {
    let m: CoordinatorMetrics = page.api.get_data("/coordinator/metrics").await?;
    if cancel.is_cancelled() {
        return Ok(());
    }
    let doc = &page.document;
    update_metric(doc, ATTR_METRIC, "procesos_activos", &m.procesos_activos.to_string())?;
    update_metric(doc, ATTR_METRIC, "mesas_configuradas", &m.mesas_configuradas.to_string())?;
    update_metric(doc, ATTR_METRIC, "candidatos_registrados", &m.candidatos_registrados.to_string())?;
    update_metric(doc, ATTR_METRIC, "reportes_pendientes", &m.reportes_pendientes.to_string())?;
    Ok(())
}

async fn refresh_tasks(page: Rc<PageContext>, cancel: CancelToken) -> CycleResult {
    let tasks: CoordinatorTasks = page.api.get_data("/coordinator/tasks").await?;
    if cancel.is_cancelled() {
        return Ok(());
    }
    render_tasks(&page.document, &tasks.tasks)?;
    Ok(())
}

pub fn render_tasks(document: &Document, tasks: &[CoordinatorTask]) -> Result<(), JsValue> {
    let Some(list) = document.query_selector(".list-group")? else {
        return Ok(());
    };
    tables::rebuild(document, &list, tasks, Placeholder::new(MSG_NO_TASKS, 1), task_item)?;
    Ok(())
}

/// Badge class and label for a task priority.
pub fn task_badge(priority: &str) -> (&'static str, &'static str) {
    match priority {
        "urgent" => ("bg-danger", "Urgente"),
        "pending" => ("bg-warning", "Pendiente"),
        _ => ("bg-info", "En Proceso"),
    }
}

fn task_item(document: &Document, task: &CoordinatorTask) -> Result<Element, JsValue> {
    let item = dom_utils::create(
        document,
        "div",
        Some("list-group-item d-flex justify-content-between align-items-center"),
    )?;
    item.append_child(&document.create_text_node(&task.description))?;
    let (class, label) = task_badge(&task.priority);
    item.append_child(&tables::badge(document, &format!("{} rounded-pill", class), label)?.into())?;
    Ok(item)
}

/// Only the newest notification is surfaced on each tick.
async fn refresh_notifications(page: Rc<PageContext>, cancel: CancelToken) -> CycleResult {
    let feed: CoordinatorNotifications = page.api.get_data("/coordinator/notifications").await?;
    if cancel.is_cancelled() {
        return Ok(());
    }
    if let Some(first) = feed.notifications.first() {
        page.notify(&first.message, Severity::Info);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_priorities_map_to_badges() {
        assert_eq!(task_badge("urgent"), ("bg-danger", "Urgente"));
        assert_eq!(task_badge("pending"), ("bg-warning", "Pendiente"));
        assert_eq!(task_badge("in_progress"), ("bg-info", "En Proceso"));
    }

    #[test]
    fn quick_actions_navigate() {
        assert_eq!(quick_action_path("new-process"), Some("/electoral/create"));
        assert_eq!(quick_action_path("monitor-processes"), Some("/electoral/monitor"));
        assert_eq!(quick_action_path("delete-everything"), None);
    }
}
