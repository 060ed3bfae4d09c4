use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::domain::{CrossingProfile, CrossingSubmission, DocumentKind, RequestId};
use crate::rut::{Rut, RutError};

const MIN_PLATE_LEN: usize = 4;
const MAX_PLATE_LEN: usize = 8;

/// Reasons a submission is refused at the registration desk.
#[derive(Debug, thiserror::Error)]
pub enum IntakeViolation {
    #[error("driver name is required")]
    MissingDriverName,
    #[error("driver RUT rejected: {0}")]
    InvalidRut(#[from] RutError),
    #[error("vehicle plate '{0}' must be 4-8 letters or digits")]
    InvalidPlate(String),
    #[error("document '{}' declared more than once", .0.label())]
    DuplicateDocument(DocumentKind),
}

/// Produces [`CrossingProfile`]s from raw submissions and records document findings.
#[derive(Debug, Clone, Default)]
pub struct IntakeGuard;

impl IntakeGuard {
    pub fn accept(
        &self,
        submission: CrossingSubmission,
        today: NaiveDate,
    ) -> Result<CrossingProfile, IntakeViolation> {
        let driver_name = submission.driver_name.trim().to_string();
        if driver_name.is_empty() {
            return Err(IntakeViolation::MissingDriverName);
        }

        let driver_rut: Rut = submission.driver_rut.parse()?;
        let vehicle_plate = normalize_plate(&submission.vehicle_plate)?;

        let mut seen = BTreeSet::new();
        for document in &submission.documents {
            if !seen.insert(document.kind) {
                return Err(IntakeViolation::DuplicateDocument(document.kind));
            }
        }

        let mut findings = Vec::new();
        for document in &submission.documents {
            if matches!(document.expires_on, Some(expiry) if expiry < today) {
                findings.push(format!("Documento vencido: {}", document.kind.label()));
            }
        }
        for kind in DocumentKind::required() {
            if !seen.contains(&kind) {
                findings.push(format!("Falta documento: {}", kind.label()));
            }
        }

        Ok(CrossingProfile {
            request_id: RequestId("pending".to_string()),
            driver_name,
            driver_rut,
            vehicle_plate,
            direction: submission.direction,
            priority: submission.priority,
            observations: submission.observations,
            documents: submission.documents,
            findings,
            submitted_on: submission.submitted_on.unwrap_or(today),
        })
    }
}

/// Uppercase and drop separators; Chilean plates read `ABCD12` or `AB1234`.
pub fn normalize_plate(raw: &str) -> Result<String, IntakeViolation> {
    let plate: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '.' | '·'))
        .map(|c| c.to_ascii_uppercase())
        .collect();

    let len_ok = (MIN_PLATE_LEN..=MAX_PLATE_LEN).contains(&plate.len());
    if !len_ok || !plate.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(IntakeViolation::InvalidPlate(raw.trim().to_string()));
    }
    Ok(plate)
}
