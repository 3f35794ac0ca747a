//! Per-user security preferences.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SecuritySettings {
    pub user_id: Uuid,
    pub two_factor_enabled: bool,
    /// Email the user on every successful login
    pub login_alerts: bool,
    pub password_changed_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl SecuritySettings {
    /// Settings assumed for users that never saved any
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            two_factor_enabled: false,
            login_alerts: true,
            password_changed_at: None,
            updated_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityUpdate {
    pub two_factor_enabled: Option<bool>,
    pub login_alerts: Option<bool>,
}
