//! Audit trail of admin actions.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdminLog {
    pub id: Uuid,
    pub admin_id: Uuid,
    #[schema(example = "host_request.approve")]
    pub action: String,
    #[schema(example = "host_request")]
    pub target_type: String,
    pub target_id: Option<Uuid>,
    #[schema(value_type = Object)]
    pub details: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAdminLog {
    pub admin_id: Uuid,
    pub action: String,
    pub target_type: String,
    pub target_id: Option<Uuid>,
    pub details: serde_json::Value,
}

impl NewAdminLog {
    pub fn new(
        admin_id: Uuid,
        action: impl Into<String>,
        target_type: impl Into<String>,
        target_id: Option<Uuid>,
    ) -> Self {
        Self {
            admin_id,
            action: action.into(),
            target_type: target_type.into(),
            target_id,
            details: serde_json::Value::Null,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = details;
        self
    }
}
