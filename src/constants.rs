//! Constants for the dashboard frontend
//!
//! This module centralizes string literals, element ids and timing values so
//! the role pages never hard-code them inline.

// Session / storage
pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const CSRF_META_NAME: &str = "csrf-token";
pub const CSRF_HEADER: &str = "X-CSRF-Token";
pub const LOGIN_PATH: &str = "/login";
pub const DEFAULT_API_BASE: &str = "/api";

// Timing (milliseconds)
pub const REDIRECT_DELAY_MS: u32 = 2_000;
pub const IDLE_WINDOW_MS: u32 = 30 * 60 * 1000;
pub const NOTIFY_DEFAULT_MS: u32 = 5_000;
pub const NOTIFY_CRITICAL_MS: u32 = 10_000;
pub const METRIC_PULSE_MS: u32 = 200;
pub const TIMELINE_BADGE_MS: u32 = 5_000;
pub const METRIC_CHANGE_MS: u32 = 5_000;

// Refresh intervals per role / responsibility
pub const VOTING_STATS_INTERVAL_MS: u32 = 15_000;
pub const MUNICIPAL_STATS_INTERVAL_MS: u32 = 20_000;
pub const METRICS_INTERVAL_MS: u32 = 30_000;
pub const OBSERVATIONS_INTERVAL_MS: u32 = 30_000;
pub const CHARTS_INTERVAL_MS: u32 = 60_000;
pub const TASKS_INTERVAL_MS: u32 = 60_000;
pub const NOTIFICATIONS_INTERVAL_MS: u32 = 60_000;
pub const SYSTEM_ALERTS_INTERVAL_MS: u32 = 120_000;
pub const DASHBOARD_RELOAD_INTERVAL_MS: u32 = 300_000;
pub const PERFORMANCE_INTERVAL_MS: u32 = 10_000;
pub const DATABASE_INTERVAL_MS: u32 = 30_000;

// Activity events that reset the idle window
pub const ACTIVITY_EVENTS: [&str; 5] = ["mousedown", "mousemove", "keypress", "scroll", "touchstart"];

// CSS classes
pub const CSS_METRIC_PULSE: &str = "metric-pulse";
pub const CSS_PLACEHOLDER_ROW: &str = "placeholder-row";
pub const CSS_IS_VALID: &str = "is-valid";
pub const CSS_IS_INVALID: &str = "is-invalid";
pub const CSS_INVALID_FEEDBACK: &str = "invalid-feedback";

// Data attributes used for metric bindings
pub const ATTR_METRIC: &str = "metric";
pub const ATTR_STAT: &str = "stat";

// Element ids / selectors (coordination dashboard)
pub const ID_ALERTS_SECTION: &str = "alertsSection";
pub const ID_ALERTS_CONTENT: &str = "alertsContent";
pub const ID_PENDING_TASKS: &str = "pendingTasksList";
pub const ID_NOTIFICATION_COUNT: &str = "notificationCount";
pub const SEL_COVERAGE_TBODY: &str = "#coverageTable tbody";

// Placeholder messages
pub const MSG_NO_COVERAGE: &str = "No hay datos de cobertura";
pub const MSG_NO_TASKS: &str = "No hay tareas pendientes";
pub const MSG_NO_DATA: &str = "No hay datos disponibles";

// User-facing notification texts
pub const MSG_SESSION_EXPIRED: &str = "Sesión expirada. Por favor, inicia sesión nuevamente.";
pub const MSG_SESSION_IDLE: &str = "Sesión cerrada por inactividad";
pub const MSG_CONNECTION_ERROR: &str = "Error de conexión";
pub const MSG_REQUIRED_FIELDS: &str = "Por favor complete todos los campos requeridos";
