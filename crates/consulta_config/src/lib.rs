use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub mod models;

pub use models::*;

/// Marker value replaced by the environment variable named after the key path.
pub const SECRET_FROM_ENV: &str = "secret_from_env";

/// Loads the application configuration.
///
/// Sources, later ones win:
/// 1. `<CONFIG_DIR>/default.*`
/// 2. `<CONFIG_DIR>/<RUN_ENV>.*`
/// 3. environment variables `<PREFIX>__SECTION__KEY` (prefix defaults to `CONSULTA`)
///
/// Afterwards every string equal to `secret_from_env` is replaced from the
/// environment (e.g. `mail.password` reads `MAIL_PASSWORD`).
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "CONSULTA".to_string());
    let config_dir =
        PathBuf::from(env::var("CONFIG_DIR").unwrap_or_else(|_| "config".to_string()));

    load_config_from(&config_dir, &run_env, &prefix)
}

/// Same as [`load_config`] with explicit directory, environment name and prefix.
pub fn load_config_from(
    config_dir: &Path,
    run_env: &str,
    prefix: &str,
) -> Result<AppConfig, ConfigError> {
    let default_path = config_dir.join("default");
    let env_path = config_dir.join(run_env);
    debug!(
        "Loading configuration from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(
            Environment::with_prefix(prefix)
                .separator("__")
                .try_parsing(true),
        );

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Recursively replaces all "secret_from_env" string values with environment variable values
fn inject_env_secrets(value: &mut Value) {
    fn walk(path: Vec<String>, obj: &mut Value) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    let mut new_path = path.clone();
                    new_path.push(k.to_string());
                    walk(new_path, v);
                }
            }
            Value::Array(items) => {
                for (index, v) in items.iter_mut().enumerate() {
                    let mut new_path = path.clone();
                    new_path.push(index.to_string());
                    walk(new_path, v);
                }
            }
            Value::String(s) if s == SECRET_FROM_ENV => {
                let env_key = path.join("_").to_uppercase();
                if let Ok(env_val) = env::var(&env_key) {
                    *obj = Value::String(env_val);
                } else {
                    warn!("env var {} not found for secret_from_env", env_key);
                }
            }
            _ => {}
        }
    }

    walk(vec![], value);
}

/// Applies environment overrides based on "secret_from_env" markers in serialized config
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config).map_err(|e| ConfigError::Message(e.to_string()))?;
    inject_env_secrets(&mut json);
    serde_json::from_value(json).map_err(|e| ConfigError::Message(e.to_string()))
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads the dotenv file once per process and returns the path that was used.
///
/// `DOTENV_OVERRIDE` wins over a first command line argument starting with
/// `.env`, which wins over the plain `.env` default.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}
