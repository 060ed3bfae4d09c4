use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use super::domain::{CrossingSubmission, RequestId, RequestStatus, ReviewDecision};
use super::intake::{IntakeGuard, IntakeViolation};
use super::notify::{route_for, route_for_decision, Notification, NotificationRoute, Notifier};
use super::repository::{
    AuditAction, AuditEntry, CrossingRecord, CrossingRepository, RepositoryError,
};
use crate::config::ReviewConfig;
use crate::risk::{classify, RiskInput};

const SYSTEM_ACTOR: &str = "system";

/// Service composing intake checks, classification, storage, and notification routing.
pub struct CrossingService<R, N> {
    guard: IntakeGuard,
    repository: Arc<R>,
    notifier: Arc<N>,
    config: ReviewConfig,
}

static REQUEST_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_request_id() -> (u64, RequestId) {
    let id = REQUEST_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    (id, RequestId(format!("req-{id:06}")))
}

impl<R, N> CrossingService<R, N>
where
    R: CrossingRepository + 'static,
    N: Notifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>, config: ReviewConfig) -> Self {
        Self {
            guard: IntakeGuard,
            repository,
            notifier,
            config,
        }
    }

    pub fn config(&self) -> ReviewConfig {
        self.config
    }

    /// Register a request dated today.
    pub fn submit(
        &self,
        submission: CrossingSubmission,
    ) -> Result<CrossingRecord, CrossingServiceError> {
        self.submit_on(submission, Local::now().date_naive())
    }

    /// Register a request, evaluating document expiry against `today`.
    pub fn submit_on(
        &self,
        submission: CrossingSubmission,
        today: NaiveDate,
    ) -> Result<CrossingRecord, CrossingServiceError> {
        let mut profile = self.guard.accept(submission, today)?;
        let (sequence, request_id) = next_request_id();
        profile.request_id = request_id;

        let risk_level = classify(&RiskInput {
            priority: profile.priority,
            observations: profile.risk_observations(),
            document_count: profile.documents.len(),
        });

        let record = CrossingRecord {
            sequence,
            status: RequestStatus::for_risk(risk_level),
            risk_level,
            profile,
            reviewed_by: None,
            review_notes: None,
        };

        let stored = self.repository.insert(record)?;
        let request_id = stored.profile.request_id.clone();

        info!(
            request_id = %request_id.0,
            risk = %stored.risk_level,
            plate = %stored.profile.vehicle_plate,
            "crossing request registered"
        );

        self.audit(
            &request_id,
            AuditAction::Submitted,
            SYSTEM_ACTOR,
            format!(
                "{} {} ({})",
                stored.profile.direction.label(),
                stored.profile.vehicle_plate,
                stored.profile.driver_rut
            ),
        );
        self.audit(
            &request_id,
            AuditAction::Classified,
            SYSTEM_ACTOR,
            format!("riesgo {}", stored.risk_level),
        );

        if let Some(route) = route_for(stored.risk_level, self.config.notify_low_risk) {
            let notification = Notification::new(route, request_id.clone())
                .with_detail("risk_level", stored.risk_level.label())
                .with_detail("vehicle_plate", stored.profile.vehicle_plate.clone());
            self.dispatch(route, notification);
        }

        Ok(stored)
    }

    /// Record an inspector decision on an open request and tell the driver.
    pub fn review(
        &self,
        request_id: &RequestId,
        decision: ReviewDecision,
    ) -> Result<CrossingRecord, CrossingServiceError> {
        let inspector = decision.inspector.trim().to_string();
        if inspector.is_empty() {
            return Err(CrossingServiceError::MissingInspector);
        }

        let mut record = self
            .repository
            .fetch(request_id)?
            .ok_or(RepositoryError::NotFound)?;

        if !record.status.is_open() {
            return Err(CrossingServiceError::AlreadyResolved {
                request_id: request_id.clone(),
                status: record.status,
            });
        }

        record.status = if decision.approve {
            RequestStatus::Aprobada
        } else {
            RequestStatus::Rechazada
        };
        record.reviewed_by = Some(inspector.clone());
        record.review_notes = decision.notes.clone();
        match self.repository.resolve(record.clone()) {
            Ok(()) => {}
            Err(RepositoryError::AlreadyResolved(status)) => {
                return Err(CrossingServiceError::AlreadyResolved {
                    request_id: request_id.clone(),
                    status,
                });
            }
            Err(err) => return Err(err.into()),
        }

        info!(
            request_id = %request_id.0,
            status = record.status.label(),
            inspector = %inspector,
            "crossing request reviewed"
        );

        let detail = match decision.notes.as_deref().map(str::trim) {
            Some(notes) if !notes.is_empty() => format!("{}: {notes}", record.status.label()),
            _ => record.status.label().to_string(),
        };
        self.audit(request_id, AuditAction::Reviewed, &inspector, detail);

        let route = route_for_decision(decision.approve);
        let notification = Notification::new(route, request_id.clone())
            .with_detail("status", record.status.label())
            .with_detail("driver_name", record.profile.driver_name.clone());
        self.dispatch(route, notification);

        Ok(record)
    }

    pub fn get(&self, request_id: &RequestId) -> Result<CrossingRecord, CrossingServiceError> {
        let record = self
            .repository
            .fetch(request_id)?
            .ok_or(RepositoryError::NotFound)?;
        Ok(record)
    }

    /// Open requests, most severe first; ties keep submission order.
    pub fn pending(&self, limit: usize) -> Result<Vec<CrossingRecord>, CrossingServiceError> {
        let mut records = self.repository.open(usize::MAX)?;
        records.sort_by(|a, b| {
            b.risk_level
                .cmp(&a.risk_level)
                .then_with(|| a.sequence.cmp(&b.sequence))
        });
        records.truncate(limit);
        Ok(records)
    }

    pub fn audit_trail(
        &self,
        request_id: &RequestId,
    ) -> Result<Vec<AuditEntry>, CrossingServiceError> {
        if self.repository.fetch(request_id)?.is_none() {
            return Err(RepositoryError::NotFound.into());
        }
        Ok(self.repository.audit_trail(request_id)?)
    }

    /// Audit writes follow the stored state; a failed write is logged, never
    /// reported as a failed submission or review.
    fn audit(&self, request_id: &RequestId, action: AuditAction, actor: &str, detail: String) {
        let entry = AuditEntry::now(request_id.clone(), action, actor, detail);
        if let Err(err) = self.repository.append_audit(entry) {
            warn!(
                request_id = %request_id.0,
                action = ?action,
                error = %err,
                "audit entry not recorded"
            );
        }
    }

    /// A failed notification is logged and audited but never undoes the stored state.
    fn dispatch(&self, route: NotificationRoute, notification: Notification) {
        let request_id = notification.request_id.clone();
        let detail = match self.notifier.notify(notification) {
            Ok(()) => format!("{:?} <- {}", route.audience, route.template),
            Err(err) => {
                warn!(request_id = %request_id.0, error = %err, "notification failed");
                format!("{:?} <- {} failed: {err}", route.audience, route.template)
            }
        };
        self.audit(&request_id, AuditAction::Notified, SYSTEM_ACTOR, detail);
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CrossingServiceError {
    #[error(transparent)]
    Intake(#[from] IntakeViolation),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("request {} is already {}", .request_id.0, .status.label())]
    AlreadyResolved {
        request_id: RequestId,
        status: RequestStatus,
    },
    #[error("review requires an inspector name")]
    MissingInspector,
}
