use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CrossingProfile, RequestId, RequestStatus};
use crate::risk::RiskLevel;

/// Stored request: intake profile plus classification and review state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossingRecord {
    /// Submission order; breaks ties in the review queue.
    pub sequence: u64,
    pub profile: CrossingProfile,
    pub risk_level: RiskLevel,
    pub status: RequestStatus,
    pub reviewed_by: Option<String>,
    pub review_notes: Option<String>,
}

impl CrossingRecord {
    pub fn status_view(&self) -> CrossingStatusView {
        CrossingStatusView {
            request_id: self.profile.request_id.clone(),
            driver_rut: self.profile.driver_rut.to_string(),
            vehicle_plate: self.profile.vehicle_plate.clone(),
            direction: self.profile.direction.label(),
            status: self.status.label(),
            risk_level: self.risk_level,
            findings: self.profile.findings.clone(),
            reviewed_by: self.reviewed_by.clone(),
        }
    }
}

/// Storage abstraction so the service can be exercised without a database.
pub trait CrossingRepository: Send + Sync {
    fn insert(&self, record: CrossingRecord) -> Result<CrossingRecord, RepositoryError>;
    /// Store a decided record, checking under the same lock that the stored copy
    /// is still open. Fails with `AlreadyResolved` when another decision won.
    fn resolve(&self, record: CrossingRecord) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &RequestId) -> Result<Option<CrossingRecord>, RepositoryError>;
    /// Requests still awaiting a decision, at most `limit` of them.
    fn open(&self, limit: usize) -> Result<Vec<CrossingRecord>, RepositoryError>;
    fn append_audit(&self, entry: AuditEntry) -> Result<(), RepositoryError>;
    fn audit_trail(&self, id: &RequestId) -> Result<Vec<AuditEntry>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("record already {}", .0.label())]
    AlreadyResolved(RequestStatus),
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Submitted,
    Classified,
    Notified,
    Reviewed,
}

/// One line of the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub request_id: RequestId,
    pub action: AuditAction,
    pub actor: String,
    pub detail: String,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn now(
        request_id: RequestId,
        action: AuditAction,
        actor: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            request_id,
            action,
            actor: actor.into(),
            detail: detail.into(),
            recorded_at: Utc::now(),
        }
    }
}

/// Public representation of a request's state.
#[derive(Debug, Clone, Serialize)]
pub struct CrossingStatusView {
    pub request_id: RequestId,
    pub driver_rut: String,
    pub vehicle_plate: String,
    pub direction: &'static str,
    pub status: &'static str,
    pub risk_level: RiskLevel,
    pub findings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewed_by: Option<String>,
}
