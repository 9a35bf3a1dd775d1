//! View models decoded from the REST endpoints.
//!
//! Every struct here is a transient snapshot: it is decoded in one piece from
//! a response and handed to a renderer, never merged with a previous value.
//! Fields use `#[serde(default)]` generously because the role endpoints omit
//! keys instead of sending zeros.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// Authenticated user as returned by `/auth/me`. Kept as an open map because
/// templates bind arbitrary keys through `data-user-info`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserInfo {
    #[serde(flatten)]
    pub fields: serde_json::Map<String, Value>,
}

impl UserInfo {
    /// Display text for one user field. Empty strings and nulls count as
    /// missing so the template keeps its server-rendered fallback.
    pub fn field(&self, name: &str) -> Option<String> {
        match self.fields.get(name)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthMe {
    pub user: Option<UserInfo>,
}

// ---------------------------------------------------------------------------
// Metric maps (super admin, monitors)
// ---------------------------------------------------------------------------

/// `key -> value` payload where each key is bound to a `[data-metric]` node.
pub type MetricMap = BTreeMap<String, Value>;

// ---------------------------------------------------------------------------
// Coordination dashboard (municipal coordinator)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoordinationSnapshot {
    pub coordinator_info: Option<CoordinatorInfo>,
    pub statistics: CoverageStatistics,
    pub coverage_summary: Vec<PuestoCoverage>,
    pub pending_tasks: Vec<PendingTask>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoordinatorInfo {
    pub nombre_completo: Option<String>,
    pub municipio_nombre: Option<String>,
    pub cedula: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
    pub fecha_asignacion: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoverageStatistics {
    pub total_testigos: u64,
    pub testigos_asignados: u64,
    pub mesas_cubiertas: u64,
    pub mesas_sin_cobertura: u64,
    /// `None` when the backend omits the key; the "no witnesses" alert must
    /// not fire on a missing value.
    pub testigos_disponibles: Option<u64>,
    pub porcentaje_cobertura: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PuestoCoverage {
    pub puesto_nombre: Option<String>,
    pub total_mesas: u64,
    pub mesas_cubiertas: u64,
    pub porcentaje_cobertura: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PendingTask {
    pub titulo: String,
    pub prioridad: Option<u8>,
    pub fecha_limite: Option<String>,
    pub progreso: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Party {
    pub id: u64,
    pub nombre: String,
    #[serde(default)]
    pub sigla: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AvailableWitness {
    pub id: u64,
    pub nombre_completo: String,
    #[serde(default)]
    pub cedula: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct VotingTable {
    pub id: u64,
    pub numero_mesa: Value,
    #[serde(default)]
    pub puesto_nombre: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NewWitness {
    pub nombre_completo: String,
    pub cedula: String,
    pub telefono: String,
    pub email: String,
    pub direccion: String,
    pub partido_id: Option<u64>,
    pub tipo_testigo: String,
    pub observaciones: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WitnessAssignment {
    pub testigo_id: u64,
    pub mesa_id: u64,
    pub proceso_electoral_id: u64,
    pub hora_inicio: String,
    pub hora_fin: String,
    pub observaciones: String,
}

// ---------------------------------------------------------------------------
// Super admin
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActivityData {
    pub labels: Vec<String>,
    pub users: Vec<f64>,
    pub operations: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct RolesData {
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SystemAlert {
    #[serde(rename = "type")]
    pub kind: String,
    pub severity: Option<String>,
    pub title: String,
    pub message: String,
    pub timestamp: Option<String>,
}

impl SystemAlert {
    pub fn is_critical(&self) -> bool {
        self.severity.as_deref() == Some("critical")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilteredData {
    pub processes: Option<Vec<ProcessRow>>,
    pub users: Option<Vec<UserRow>>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ProcessRow {
    pub id: u64,
    pub nombre: String,
    pub fecha_inicio: Option<String>,
    pub tipo_eleccion: String,
    pub estado: String,
    pub progreso: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserRow {
    pub id: u64,
    pub nombre_completo: String,
    pub email: String,
    pub rol: String,
    pub activo: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkAction {
    pub action: String,
    pub items: Vec<String>,
}

// ---------------------------------------------------------------------------
// Municipal administrator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MunicipalStats {
    pub mesas_activas: u64,
    pub participacion_total: f64,
    pub votos_registrados: u64,
    pub incidencias: u64,
    pub mesas_status: Vec<MesaStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MesaStatus {
    pub id: u64,
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct MesaList {
    pub mesas: Vec<Mesa>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Mesa {
    pub id: u64,
    pub numero: Value,
    pub puesto_votacion: String,
    pub status: String,
    pub votos_registrados: u64,
    pub votantes_habilitados: u64,
    pub participacion: f64,
}

// ---------------------------------------------------------------------------
// Electoral coordinator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoordinatorMetrics {
    pub procesos_activos: u64,
    pub mesas_configuradas: u64,
    pub candidatos_registrados: u64,
    pub reportes_pendientes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoordinatorTasks {
    pub tasks: Vec<CoordinatorTask>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoordinatorTask {
    pub description: String,
    pub priority: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CoordinatorNotifications {
    pub notifications: Vec<NotificationItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct NotificationItem {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Voting jury
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct VotingStats {
    pub votos_validos: u64,
    pub votos_nulos: u64,
    pub votos_blanco: u64,
    pub participacion: f64,
    pub candidates: Vec<CandidateTally>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct CandidateTally {
    pub name: String,
    pub party: String,
    pub votes: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TableStatus {
    pub status: String,
}

// ---------------------------------------------------------------------------
// Table witness
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct WitnessStats {
    pub total_observations: u64,
    pub alerts: u64,
    pub progress: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_info_fields_render_strings_and_numbers() {
        let user: UserInfo = serde_json::from_value(json!({
            "nombre_completo": "Ana Pérez",
            "id": 7,
            "email": "",
            "municipio": null
        }))
        .unwrap();
        assert_eq!(user.field("nombre_completo").as_deref(), Some("Ana Pérez"));
        assert_eq!(user.field("id").as_deref(), Some("7"));
        assert_eq!(user.field("email"), None);
        assert_eq!(user.field("municipio"), None);
        assert_eq!(user.field("missing"), None);
    }

    #[test]
    fn coordination_snapshot_tolerates_missing_sections() {
        let snap: CoordinationSnapshot = serde_json::from_value(json!({
            "statistics": { "mesas_sin_cobertura": 3, "porcentaje_cobertura": 45 }
        }))
        .unwrap();
        assert!(snap.coordinator_info.is_none());
        assert!(snap.coverage_summary.is_empty());
        assert_eq!(snap.statistics.mesas_sin_cobertura, 3);
        assert_eq!(snap.statistics.porcentaje_cobertura, Some(45.0));
        assert_eq!(snap.statistics.testigos_disponibles, None);
    }

    #[test]
    fn system_alert_reads_type_and_severity() {
        let alert: SystemAlert = serde_json::from_value(json!({
            "type": "danger",
            "severity": "critical",
            "title": "DB",
            "message": "Replica caída"
        }))
        .unwrap();
        assert_eq!(alert.kind, "danger");
        assert!(alert.is_critical());
    }
}
