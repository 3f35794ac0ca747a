//! Applications for hosting privileges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HostRequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl HostRequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HostRequestStatus::Pending => "pending",
            HostRequestStatus::Approved => "approved",
            HostRequestStatus::Rejected => "rejected",
        }
    }
}

impl From<&str> for HostRequestStatus {
    fn from(s: &str) -> Self {
        match s {
            "approved" => HostRequestStatus::Approved,
            "rejected" => HostRequestStatus::Rejected,
            _ => HostRequestStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HostRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub status: HostRequestStatus,
    /// Applicant's pitch to the admins
    pub message: String,
    pub reviewed_by: Option<Uuid>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl HostRequest {
    pub fn is_pending(&self) -> bool {
        self.status == HostRequestStatus::Pending
    }
}

/// Admin decision on a pending request
#[derive(Debug, Clone, PartialEq)]
pub enum HostRequestDecision {
    Approve,
    Reject { reason: Option<String> },
}

impl HostRequestDecision {
    pub fn status(&self) -> HostRequestStatus {
        match self {
            HostRequestDecision::Approve => HostRequestStatus::Approved,
            HostRequestDecision::Reject { .. } => HostRequestStatus::Rejected,
        }
    }
}
