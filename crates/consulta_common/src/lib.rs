// --- File: crates/consulta_common/src/lib.rs ---

pub mod error; // Error taxonomy
pub mod features; // Runtime feature checks
pub mod http; // Error to HTTP response mapping
pub mod logging; // Tracing setup
pub mod models; // Domain records shared by storage, core and HTTP
#[cfg(test)]
mod models_proptest;
pub mod services; // External provider abstractions

// Re-export error types and utilities for easier access
pub use error::{
    config_error, conflict, internal_error, not_found, provider_error, storage_error,
    validation_error, ConsultaError, HttpStatusCode,
};

pub use http::IntoHttpResponse;

pub use logging::{init, init_from_config, init_with_level};

pub use features::is_feature_enabled;
