use std::collections::HashMap;
use std::sync::{Arc, Barrier, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::Value;

use crate::config::ReviewConfig;
use crate::crossings::domain::{
    CrossingDirection, CrossingSubmission, DocumentDescriptor, DocumentKind, RequestId,
};
use crate::crossings::intake::IntakeGuard;
use crate::crossings::notify::{Notification, Notifier, NotifyError};
use crate::crossings::repository::{
    AuditEntry, CrossingRecord, CrossingRepository, RepositoryError,
};
use crate::crossings::{crossing_router, CrossingService};
use crate::risk::Priority;

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).expect("valid date")
}

fn document(kind: DocumentKind, number: &str, expires_on: Option<NaiveDate>) -> DocumentDescriptor {
    DocumentDescriptor {
        kind,
        number: number.to_string(),
        expires_on,
    }
}

pub(super) fn full_documents() -> Vec<DocumentDescriptor> {
    let valid_until = NaiveDate::from_ymd_opt(2099, 12, 31).expect("valid date");
    vec![
        document(DocumentKind::Licencia, "LIC-88213", Some(valid_until)),
        document(DocumentKind::PermisoCirculacion, "PC-2025-0091", Some(valid_until)),
        document(DocumentKind::SeguroObligatorio, "SOAP-55102", Some(valid_until)),
        document(DocumentKind::RevisionTecnica, "RT-7781", Some(valid_until)),
    ]
}

/// Complete, in-date paperwork: classifies as `Bajo`.
pub(super) fn submission() -> CrossingSubmission {
    CrossingSubmission {
        driver_name: "Ana Rojas".to_string(),
        driver_rut: "12.345.678-5".to_string(),
        vehicle_plate: "bc-df 12".to_string(),
        direction: CrossingDirection::Entrada,
        priority: Priority::Normal,
        observations: "Todo en orden".to_string(),
        documents: full_documents(),
        submitted_on: None,
    }
}

pub(super) fn urgent_submission() -> CrossingSubmission {
    let mut submission = submission();
    submission.priority = Priority::Alta;
    submission
}

pub(super) fn expired_insurance_submission() -> CrossingSubmission {
    let mut submission = submission();
    for doc in &mut submission.documents {
        if doc.kind == DocumentKind::SeguroObligatorio {
            doc.expires_on = NaiveDate::from_ymd_opt(2025, 1, 1);
        }
    }
    submission
}

pub(super) fn guard() -> IntakeGuard {
    IntakeGuard
}

#[derive(Default, Clone)]
pub(super) struct MemoryRepository {
    records: Arc<Mutex<HashMap<RequestId, CrossingRecord>>>,
    audit: Arc<Mutex<Vec<AuditEntry>>>,
}

impl CrossingRepository for MemoryRepository {
    fn insert(&self, record: CrossingRecord) -> Result<CrossingRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.profile.request_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.profile.request_id.clone(), record.clone());
        Ok(record)
    }

    fn resolve(&self, record: CrossingRecord) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let stored = guard
            .get_mut(&record.profile.request_id)
            .ok_or(RepositoryError::NotFound)?;
        if !stored.status.is_open() {
            return Err(RepositoryError::AlreadyResolved(stored.status));
        }
        *stored = record;
        Ok(())
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<CrossingRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn open(&self, limit: usize) -> Result<Vec<CrossingRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard
            .values()
            .filter(|record| record.status.is_open())
            .take(limit)
            .cloned()
            .collect())
    }

    fn append_audit(&self, entry: AuditEntry) -> Result<(), RepositoryError> {
        self.audit.lock().expect("audit mutex poisoned").push(entry);
        Ok(())
    }

    fn audit_trail(&self, id: &RequestId) -> Result<Vec<AuditEntry>, RepositoryError> {
        let guard = self.audit.lock().expect("audit mutex poisoned");
        Ok(guard
            .iter()
            .filter(|entry| &entry.request_id == id)
            .cloned()
            .collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryNotifier {
    events: Arc<Mutex<Vec<Notification>>>,
}

impl MemoryNotifier {
    pub(super) fn events(&self) -> Vec<Notification> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}

impl Notifier for MemoryNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        self.events
            .lock()
            .expect("notifier mutex poisoned")
            .push(notification);
        Ok(())
    }
}

pub(super) struct OfflineNotifier;

impl Notifier for OfflineNotifier {
    fn notify(&self, _notification: Notification) -> Result<(), NotifyError> {
        Err(NotifyError::Transport("sms gateway offline".to_string()))
    }
}

pub(super) struct ConflictRepository;

impl CrossingRepository for ConflictRepository {
    fn insert(&self, _record: CrossingRecord) -> Result<CrossingRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn resolve(&self, _record: CrossingRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("read only".to_string()))
    }

    fn fetch(&self, _id: &RequestId) -> Result<Option<CrossingRecord>, RepositoryError> {
        Ok(None)
    }

    fn open(&self, _limit: usize) -> Result<Vec<CrossingRecord>, RepositoryError> {
        Ok(Vec::new())
    }

    fn append_audit(&self, _entry: AuditEntry) -> Result<(), RepositoryError> {
        Ok(())
    }

    fn audit_trail(&self, _id: &RequestId) -> Result<Vec<AuditEntry>, RepositoryError> {
        Ok(Vec::new())
    }
}

pub(super) struct UnavailableRepository;

impl CrossingRepository for UnavailableRepository {
    fn insert(&self, _record: CrossingRecord) -> Result<CrossingRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn resolve(&self, _record: CrossingRecord) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &RequestId) -> Result<Option<CrossingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn open(&self, _limit: usize) -> Result<Vec<CrossingRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn append_audit(&self, _entry: AuditEntry) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn audit_trail(&self, _id: &RequestId) -> Result<Vec<AuditEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Holds every `fetch` result until two callers have read, so both reviews
/// see the request while it is still open.
pub(super) struct GatedRepository {
    pub(super) inner: MemoryRepository,
    gate: Barrier,
}

impl GatedRepository {
    pub(super) fn new(inner: MemoryRepository) -> Self {
        Self {
            inner,
            gate: Barrier::new(2),
        }
    }
}

impl CrossingRepository for GatedRepository {
    fn insert(&self, record: CrossingRecord) -> Result<CrossingRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn resolve(&self, record: CrossingRecord) -> Result<(), RepositoryError> {
        self.inner.resolve(record)
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<CrossingRecord>, RepositoryError> {
        let record = self.inner.fetch(id);
        self.gate.wait();
        record
    }

    fn open(&self, limit: usize) -> Result<Vec<CrossingRecord>, RepositoryError> {
        self.inner.open(limit)
    }

    fn append_audit(&self, entry: AuditEntry) -> Result<(), RepositoryError> {
        self.inner.append_audit(entry)
    }

    fn audit_trail(&self, id: &RequestId) -> Result<Vec<AuditEntry>, RepositoryError> {
        self.inner.audit_trail(id)
    }
}

/// Stores requests but refuses every audit write.
#[derive(Default)]
pub(super) struct AuditDownRepository {
    pub(super) inner: MemoryRepository,
}

impl CrossingRepository for AuditDownRepository {
    fn insert(&self, record: CrossingRecord) -> Result<CrossingRecord, RepositoryError> {
        self.inner.insert(record)
    }

    fn resolve(&self, record: CrossingRecord) -> Result<(), RepositoryError> {
        self.inner.resolve(record)
    }

    fn fetch(&self, id: &RequestId) -> Result<Option<CrossingRecord>, RepositoryError> {
        self.inner.fetch(id)
    }

    fn open(&self, limit: usize) -> Result<Vec<CrossingRecord>, RepositoryError> {
        self.inner.open(limit)
    }

    fn append_audit(&self, _entry: AuditEntry) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("audit log offline".to_string()))
    }

    fn audit_trail(&self, _id: &RequestId) -> Result<Vec<AuditEntry>, RepositoryError> {
        Err(RepositoryError::Unavailable("audit log offline".to_string()))
    }
}

pub(super) fn build_service() -> (
    CrossingService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    build_service_with(ReviewConfig::default())
}

pub(super) fn build_service_with(
    config: ReviewConfig,
) -> (
    CrossingService<MemoryRepository, MemoryNotifier>,
    Arc<MemoryRepository>,
    Arc<MemoryNotifier>,
) {
    let repository = Arc::new(MemoryRepository::default());
    let notifier = Arc::new(MemoryNotifier::default());
    let service = CrossingService::new(repository.clone(), notifier.clone(), config);
    (service, repository, notifier)
}

pub(super) fn crossing_router_with_service(
    service: CrossingService<MemoryRepository, MemoryNotifier>,
) -> axum::Router {
    crossing_router(Arc::new(service))
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
