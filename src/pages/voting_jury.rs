//! Voting jury dashboard for a single mesa.

use std::rc::Rc;

use serde_json::Value;
use wasm_bindgen::JsValue;
use web_sys::{Document, Element};

use super::{on_click_attr, on_submit, push_timeline, PageContext, Role, RoleDashboard, Timeline};
use crate::constants::{ATTR_STAT, MSG_NO_DATA, VOTING_STATS_INTERVAL_MS};
use crate::dom_utils;
use crate::models::{CandidateTally, TableStatus, VotingStats};
use crate::network::reports::download_report;
use crate::network::RequestOptions;
use crate::render::metrics::update_metric;
use crate::render::tables::{self, Placeholder};
use crate::scheduling::{CancelToken, CycleResult, Responsibility};
use crate::toast::Severity;
use crate::utils::{display_number, now_time_label, percent};

const VOTING_FORM: &str = "votingForm";

const TIMELINE: Timeline = Timeline {
    container: ".timeline",
    item_class: "timeline-item",
    marker_class: "timeline-marker",
    content_class: "timeline-content",
    cap: 5,
    new_badge: false,
};

pub struct VotingJuryDashboard;

impl RoleDashboard for VotingJuryDashboard {
    fn role(&self) -> Role {
        Role::JuradoVotacion
    }

    fn mount(&self, page: &Rc<PageContext>) -> Result<(), JsValue> {
        page.refresh_every(Responsibility::Stats, VOTING_STATS_INTERVAL_MS, refresh_stats);
        page.refresh_every(Responsibility::TableStatus, VOTING_STATS_INTERVAL_MS, refresh_table_status);

        let submit = page.clone();
        on_submit(&page.document, VOTING_FORM, move |form| submit_vote(&submit, form))?;

        let actions = page.clone();
        on_click_attr(&page.document, "data-action", move |action, _| match action {
            "submit-vote" => {
                if let Some(form) = actions.document.get_element_by_id(VOTING_FORM) {
                    submit_vote(&actions, &form);
                }
            }
            "generate-acta" => generate_acta(&actions),
            other => debug_log!("unhandled action {}", other),
        })
    }
}

async fn refresh_stats(page: Rc<PageContext>, cancel: CancelToken) -> CycleResult {
    let stats: VotingStats = page.api.get_data("/voting/stats").await?;
    if cancel.is_cancelled() {
        return Ok(());
    }
    render_stats(&page.document, &stats)?;
    Ok(())
}

async fn refresh_table_status(page: Rc<PageContext>, cancel: CancelToken) -> CycleResult {
    let status: TableStatus = page.api.get_data("/voting/table-status").await?;
    if cancel.is_cancelled() {
        return Ok(());
    }
    render_table_status(&page.document, &status)?;
    Ok(())
}

pub fn render_stats(document: &Document, stats: &VotingStats) -> Result<(), JsValue> {
    update_metric(document, ATTR_STAT, "votos_validos", &stats.votos_validos.to_string())?;
    update_metric(document, ATTR_STAT, "votos_nulos", &stats.votos_nulos.to_string())?;
    update_metric(document, ATTR_STAT, "votos_blanco", &stats.votos_blanco.to_string())?;
    update_metric(document, ATTR_STAT, "participacion", &percent(stats.participacion))?;

    let Some(tbody) = document.query_selector(".table tbody")? else {
        return Ok(());
    };
    tables::rebuild(document, &tbody, &stats.candidates, Placeholder::new(MSG_NO_DATA, 4), candidate_row)?;
    Ok(())
}

fn candidate_row(document: &Document, c: &CandidateTally) -> Result<Element, JsValue> {
    let votes = c.votes.to_string();
    let share = format!("{}%", display_number(c.percentage));
    tables::text_row(document, None, &[c.name.as_str(), c.party.as_str(), votes.as_str(), share.as_str()])
}

/// Text of the `.voting-status` badge.
pub fn status_label(status: &str) -> &'static str {
    if status == "active" {
        "Mesa Activa"
    } else {
        "Mesa Cerrada"
    }
}

pub fn render_table_status(document: &Document, status: &TableStatus) -> Result<(), JsValue> {
    let Some(indicator) = document.query_selector(".voting-status")? else {
        return Ok(());
    };
    indicator.set_class_name(&format!("voting-status {}", status.status));
    indicator.set_text_content(Some(status_label(&status.status)));
    Ok(())
}

fn submit_vote(page: &Rc<PageContext>, form: &Element) {
    let fields = dom_utils::form_fields(form);
    if dom_utils::field(&fields, "candidato").trim().is_empty() {
        page.notify("Por favor seleccione un candidato", Severity::Warning);
        return;
    }
    if !page.confirm("¿Está seguro de registrar este voto? Esta acción no se puede deshacer.") {
        return;
    }

    let (page_in, form) = (page.clone(), form.clone());
    page.spawn_action("Error al registrar el voto", async move {
        let _: Value = page_in
            .api
            .send_data("/voting/submit", RequestOptions::post_form(fields))
            .await?;
        page_in.notify("Voto registrado exitosamente", Severity::Success);
        super::reset_form(&form);
        page_in.scheduler.trigger_now(Responsibility::Stats);
        if let Err(e) = push_timeline(&page_in.document, &TIMELINE, "Voto registrado", &now_time_label()) {
            log::warn!("timeline update failed: {:?}", e);
        }
        Ok(())
    });
}

fn generate_acta(page: &Rc<PageContext>) {
    if !page.confirm("¿Desea generar el acta de votación? Asegúrese de que todos los votos estén registrados.") {
        return;
    }
    let page_in = page.clone();
    page.spawn_action("Error al generar el acta", async move {
        download_report(&page_in.api, "/voting/generate-report", "acta_mesa").await?;
        page_in.notify("Acta generada y descargada exitosamente", Severity::Success);
        Ok(())
    });
}


#[cfg(all(test, target_arch = "wasm32"))]
mod browser_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn stats_fill_cards_and_candidate_table() {
        let doc = web_sys::window().unwrap().document().unwrap();
        let root = doc.create_element("div").unwrap();
        root.set_inner_html(
            r#"<span data-stat="votos_validos">0</span>
               <span data-stat="participacion">0%</span>
               <span class="voting-status"></span>
               <table class="table"><tbody></tbody></table>"#,
        );
        doc.body().unwrap().append_child(&root).unwrap();

        let stats = VotingStats {
            votos_validos: 42,
            participacion: 37.5,
            candidates: vec![CandidateTally {
                name: "Laura Gómez".into(),
                party: "PL".into(),
                votes: 20,
                percentage: 47.6,
            }],
            ..VotingStats::default()
        };
        render_stats(&doc, &stats).unwrap();
        render_table_status(&doc, &TableStatus { status: "active".into() }).unwrap();

        let valid = root.query_selector("[data-stat=\"votos_validos\"]").unwrap().unwrap();
        assert_eq!(valid.text_content().unwrap(), "42");
        let share = root.query_selector("[data-stat=\"participacion\"]").unwrap().unwrap();
        assert_eq!(share.text_content().unwrap(), "37.5%");

        let rows = root.query_selector_all(".table tbody tr").unwrap();
        assert_eq!(rows.length(), 1);
        assert!(root.text_content().unwrap().contains("47.6%"));

        let dot = root.query_selector(".voting-status").unwrap().unwrap();
        assert_eq!(dot.class_name(), "voting-status active");
        assert_eq!(dot.text_content().unwrap(), "Mesa Activa");
        root.remove();
    }
}
