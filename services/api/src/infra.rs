use border_crossing::crossings::{
    AuditEntry, CrossingRecord, CrossingRepository, Notification, Notifier, NotifyError,
    RepositoryError, RequestId,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCrossingRepository {
    records: Arc<Mutex<HashMap<RequestId, CrossingRecord>>>,
    audit: Arc<Mutex<Vec<AuditEntry>>>,
}

impl CrossingRepository for InMemoryCrossingRepository {
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
        let mut open: Vec<CrossingRecord> = guard
            .values()
            .filter(|record| record.status.is_open())
            .cloned()
            .collect();
        open.sort_by_key(|record| record.sequence);
        open.truncate(limit);
        Ok(open)
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

/// Writes notifications to the service log.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) -> Result<(), NotifyError> {
        info!(
            audience = ?notification.audience,
            template = %notification.template,
            request_id = %notification.request_id.0,
            "notification dispatched"
        );
        Ok(())
    }
}
