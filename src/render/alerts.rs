//! Alert panels.
//!
//! Coverage alerts are derived from the dashboard statistics by three fixed
//! rules. The derivation is pure; rendering rebuilds the panel and hides the
//! section when nothing fires.

use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use crate::constants::{ID_ALERTS_CONTENT, ID_ALERTS_SECTION};
use crate::dom_utils;
use crate::models::{CoverageStatistics, SystemAlert};
use crate::utils;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Warning,
    Danger,
}

impl AlertKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertKind::Warning => "warning",
            AlertKind::Danger => "danger",
        }
    }
}

/// Follow-up offered by an alert button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertAction {
    ShowUncoveredTables,
    CreateWitness,
    CoverageReport,
}

impl AlertAction {
    pub fn as_str(self) -> &'static str {
        match self {
            AlertAction::ShowUncoveredTables => "uncovered-tables",
            AlertAction::CreateWitness => "create-witness",
            AlertAction::CoverageReport => "coverage-report",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "uncovered-tables" => Some(AlertAction::ShowUncoveredTables),
            "create-witness" => Some(AlertAction::CreateWitness),
            "coverage-report" => Some(AlertAction::CoverageReport),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoverageAlert {
    pub kind: AlertKind,
    pub icon: &'static str,
    pub message: String,
    pub action: AlertAction,
}

/// Alerts for the coordination dashboard, in display order.
pub fn derive_coverage_alerts(stats: &CoverageStatistics) -> Vec<CoverageAlert> {
    let mut alerts = Vec::new();

    if stats.mesas_sin_cobertura > 0 {
        alerts.push(CoverageAlert {
            kind: AlertKind::Warning,
            icon: "fas fa-exclamation-triangle",
            message: format!("{} mesas sin cobertura de testigos", stats.mesas_sin_cobertura),
            action: AlertAction::ShowUncoveredTables,
        });
    }

    if stats.testigos_disponibles == Some(0) && stats.mesas_sin_cobertura > 0 {
        alerts.push(CoverageAlert {
            kind: AlertKind::Danger,
            icon: "fas fa-user-times",
            message: "No hay testigos disponibles para asignar".to_string(),
            action: AlertAction::CreateWitness,
        });
    }

    if let Some(pct) = stats.porcentaje_cobertura {
        if pct < 50.0 {
            alerts.push(CoverageAlert {
                kind: AlertKind::Danger,
                icon: "fas fa-chart-line",
                message: format!("Cobertura muy baja: {}", utils::percent(pct)),
                action: AlertAction::CoverageReport,
            });
        }
    }

    alerts
}

/// Rebuild `#alertsContent` and toggle `#alertsSection`. Action buttons
/// carry `data-alert-action`; the page handles clicks by delegation.
pub fn render_alert_panel(document: &Document, alerts: &[CoverageAlert]) -> Result<(), JsValue> {
    let section = element_or_return!(document, ID_ALERTS_SECTION);
    let content = element_or_return!(document, ID_ALERTS_CONTENT);

    dom_utils::clear_children(&content);
    if alerts.is_empty() {
        return dom_utils::set_display(&section, false);
    }

    for alert in alerts {
        content.append_child(&alert_element(document, alert)?.into())?;
    }
    dom_utils::set_display(&section, true)
}

fn alert_element(document: &Document, alert: &CoverageAlert) -> Result<Element, JsValue> {
    let kind = alert.kind.as_str();
    let div = dom_utils::create(
        document,
        "div",
        Some(&format!("alert alert-{} alert-dismissible fade show", kind)),
    )?;
    div.set_attribute("role", "alert")?;

    let icon = dom_utils::create(document, "i", Some(&format!("{} me-2", alert.icon)))?;
    div.append_child(&icon)?;
    div.append_child(&document.create_text_node(&alert.message))?;

    let action = dom_utils::create_text(
        document,
        "button",
        Some(&format!("btn btn-sm btn-outline-{} ms-2", kind)),
        "Acción",
    )?;
    action.set_attribute("type", "button")?;
    action.set_attribute("data-alert-action", alert.action.as_str())?;
    div.append_child(&action)?;

    let close = dom_utils::create(document, "button", Some("btn-close"))?;
    close.set_attribute("type", "button")?;
    close.set_attribute("data-bs-dismiss", "alert")?;
    div.append_child(&close)?;
    Ok(div)
}

/// Rebuild the super-admin `.alerts-container` from the latest alert list.
pub fn render_system_alerts(document: &Document, alerts: &[SystemAlert]) -> Result<(), JsValue> {
    let Some(container) = document.query_selector(".alerts-container")? else {
        return Ok(());
    };
    dom_utils::clear_children(&container);

    for alert in alerts {
        let div = dom_utils::create(document, "div", Some(&format!("alert-admin alert-{} mb-2", alert.kind)))?;

        let title = dom_utils::create(document, "small", None)?;
        title.append_child(&dom_utils::create_text(document, "strong", None, &alert.title)?.into())?;
        div.append_child(&title)?;
        div.append_child(&dom_utils::create(document, "br", None)?.into())?;
        div.append_child(&dom_utils::create_text(document, "small", None, &alert.message)?.into())?;

        if let Some(ts) = &alert.timestamp {
            div.append_child(&dom_utils::create_text(
                document,
                "small",
                Some("text-muted d-block mt-1"),
                &ts.replace('T', " "),
            )?.into())?;
        }
        container.append_child(&div)?;
    }
    Ok(())
}

/// The alerts that should also raise a long-lived notification.
pub fn critical_alerts(alerts: &[SystemAlert]) -> impl Iterator<Item = &SystemAlert> {
    alerts.iter().filter(|a| a.is_critical())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(uncovered: u64, available: Option<u64>, pct: Option<f64>) -> CoverageStatistics {
        CoverageStatistics {
            mesas_sin_cobertura: uncovered,
            testigos_disponibles: available,
            porcentaje_cobertura: pct,
            ..CoverageStatistics::default()
        }
    }

    #[test]
    fn healthy_statistics_raise_nothing() {
        assert!(derive_coverage_alerts(&stats(0, Some(4), Some(92.0))).is_empty());
    }

    #[test]
    fn all_three_rules_fire_in_order() {
        let alerts = derive_coverage_alerts(&stats(3, Some(0), Some(45.0)));
        let kinds: Vec<_> = alerts.iter().map(|a| (a.kind, a.action)).collect();
        assert_eq!(
            kinds,
            vec![
                (AlertKind::Warning, AlertAction::ShowUncoveredTables),
                (AlertKind::Danger, AlertAction::CreateWitness),
                (AlertKind::Danger, AlertAction::CoverageReport),
            ]
        );
        assert_eq!(alerts[0].message, "3 mesas sin cobertura de testigos");
        assert_eq!(alerts[2].message, "Cobertura muy baja: 45%");
    }

    #[test]
    fn missing_values_do_not_fire() {
        // No witness count and no percentage: only the uncovered rule applies.
        let alerts = derive_coverage_alerts(&stats(2, None, None));
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0].action, AlertAction::ShowUncoveredTables);
    }

    #[test]
    fn zero_available_without_uncovered_tables_is_fine() {
        assert!(derive_coverage_alerts(&stats(0, Some(0), Some(80.0))).is_empty());
    }

    #[test]
    fn actions_round_trip_through_attribute() {
        for a in [
            AlertAction::ShowUncoveredTables,
            AlertAction::CreateWitness,
            AlertAction::CoverageReport,
        ] {
            assert_eq!(AlertAction::parse(a.as_str()), Some(a));
        }
        assert_eq!(AlertAction::parse("nope"), None);
    }
}
