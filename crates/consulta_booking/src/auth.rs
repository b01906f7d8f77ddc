//! Staff login against the credential list from configuration.
//!
//! This only tells the front-end which panel to show. It issues no session
//! and guards no route.

use constant_time_eq::constant_time_eq;
use consulta_config::{StaffCredential, StaffRole};
use serde::{Deserialize, Serialize};

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    pub success: bool,
    pub role: Option<String>,
}

/// The role of the matching credential.
///
/// Every entry is compared in constant time, so timing does not reveal which
/// names exist.
pub fn authenticate(staff: &[StaffCredential], name: &str, password: &str) -> Option<StaffRole> {
    let name = name.trim();
    staff.iter().fold(None, |found, credential| {
        let name_matches = constant_time_eq(credential.name.as_bytes(), name.as_bytes());
        let password_matches = constant_time_eq(credential.password.as_bytes(), password.as_bytes());
        if name_matches & password_matches && found.is_none() {
            Some(credential.role)
        } else {
            found
        }
    })
}
