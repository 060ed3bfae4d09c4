//! Crossing-request workflow: intake with document checks, risk classification,
//! notification routing, inspector review, and the per-request audit log.

pub mod domain;
pub mod import;
pub(crate) mod intake;
pub mod notify;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    CrossingDirection, CrossingProfile, CrossingSubmission, DocumentDescriptor, DocumentKind,
    RequestId, RequestStatus, ReviewDecision,
};
pub use import::{BatchImporter, ClassifiedRow, ImportError};
pub use intake::{normalize_plate, IntakeViolation};
pub use notify::{Audience, Notification, NotificationRoute, Notifier, NotifyError};
pub use repository::{
    AuditAction, AuditEntry, CrossingRecord, CrossingRepository, CrossingStatusView,
    RepositoryError,
};
pub use router::crossing_router;
pub use service::{CrossingService, CrossingServiceError};
