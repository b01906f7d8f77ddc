// --- File: crates/consulta_config/src/models.rs ---

use serde::{Deserialize, Serialize};

// --- General Server Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory with the booking front-end, served at `/` when present.
    #[serde(default)]
    pub static_dir: Option<String>,
}

// --- Database Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. sqlite://data/consulta.db, overridable via CONSULTA__DATABASE__URL
}

/// A professional inserted on first start when the professionals table is empty.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SeedProfessional {
    pub name: String,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub duration_minutes: Option<i64>,
    #[serde(default)]
    pub work_start: Option<String>,
    #[serde(default)]
    pub work_end: Option<String>,
}

// --- Booking Rules ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingConfig {
    /// Session length for professionals created without an explicit duration.
    #[serde(default = "default_session_minutes")]
    pub default_session_minutes: i64,
    /// IANA zone in which booking times are interpreted.
    #[serde(default = "default_time_zone")]
    pub time_zone: String,
    #[serde(default = "default_follow_up_queue_capacity")]
    pub follow_up_queue_capacity: usize,
    /// How long settled follow-up records stay on the status board.
    #[serde(default = "default_follow_up_retention_minutes")]
    pub follow_up_retention_minutes: i64,
    #[serde(default)]
    pub seed_professionals: Vec<SeedProfessional>,
}

fn default_session_minutes() -> i64 {
    30
}

fn default_time_zone() -> String {
    "America/Santiago".to_string()
}

fn default_follow_up_queue_capacity() -> usize {
    256
}

fn default_follow_up_retention_minutes() -> i64 {
    24 * 60
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            default_session_minutes: default_session_minutes(),
            time_zone: default_time_zone(),
            follow_up_queue_capacity: default_follow_up_queue_capacity(),
            follow_up_retention_minutes: default_follow_up_retention_minutes(),
            seed_professionals: Vec::new(),
        }
    }
}

// --- Logging ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    #[serde(default)]
    pub directory: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

// --- Google Calendar Config ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GcalConfig {
    pub key_path: Option<String>,    // service account JSON key
    pub calendar_id: Option<String>, // defaults to "primary"
}

// --- SMTP Config ---
// The password is usually "secret_from_env" in the file and read from MAIL_PASSWORD.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct MailConfig {
    pub smtp_server: String,
    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,
    pub username: String,
    pub password: String,
    pub from_email: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

fn default_smtp_port() -> u16 {
    587
}

fn default_from_name() -> String {
    "Salud Para Chile".to_string()
}

// --- Staff Credentials ---
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StaffRole {
    Admin,
    Professional,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Admin => "admin",
            StaffRole::Professional => "professional",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StaffCredential {
    pub name: String,
    pub password: String,
    pub role: StaffRole,
}

// --- Unified App Configuration ---
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    // Server config is mandatory
    pub server: ServerConfig,

    // --- Runtime Flags (optional in config file, default to false) ---
    #[serde(default)]
    pub use_gcal: bool,
    #[serde(default)]
    pub use_mail: bool,

    #[serde(default)]
    pub database: Option<DatabaseConfig>,
    #[serde(default)]
    pub booking: BookingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // --- Optional Provider Configurations ---
    #[serde(default)]
    pub gcal: Option<GcalConfig>,
    #[serde(default)]
    pub mail: Option<MailConfig>,

    #[serde(default)]
    pub staff: Vec<StaffCredential>,
}
